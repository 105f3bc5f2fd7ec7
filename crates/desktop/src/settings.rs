use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use murmur_core::shared::model_catalog;
use murmur_core::transcription::domain::device::Device;

/// Persisted UI preferences: the last successfully loaded model and the
/// selected compute backend. Saved on every transition into the ready
/// model state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub last_model: Option<String>,
    pub device: Device,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            last_model: None,
            device: Device::Cpu,
        }
    }
}

impl Settings {
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("Murmur").join("settings.json"))
    }

    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| fs::read_to_string(path).ok())
            .and_then(|json| serde_json::from_str::<Settings>(&json).ok())
            .map(Settings::validated)
            .unwrap_or_default()
    }

    /// Discard a persisted model id that is no longer in the catalog.
    fn validated(mut self) -> Self {
        if let Some(ref id) = self.last_model {
            if model_catalog::find(id).is_none() {
                self.last_model = None;
            }
        }
        self
    }

    pub fn save(&self) {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                let _ = fs::create_dir_all(parent);
            }
            if let Ok(json) = serde_json::to_string_pretty(self) {
                let _ = fs::write(path, json);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validated_keeps_known_model() {
        let settings = Settings {
            last_model: Some("base.en".to_string()),
            device: Device::Gpu,
        };
        let validated = settings.clone().validated();
        assert_eq!(validated, settings);
    }

    #[test]
    fn test_validated_discards_unknown_model() {
        let settings = Settings {
            last_model: Some("whisper-mega-v9".to_string()),
            device: Device::Gpu,
        };
        let validated = settings.validated();
        assert_eq!(validated.last_model, None);
        assert_eq!(validated.device, Device::Gpu);
    }

    #[test]
    fn test_serde_round_trip_preserves_pair() {
        let settings = Settings {
            last_model: Some("small".to_string()),
            device: Device::Gpu,
        };
        let json = serde_json::to_string(&settings).unwrap();
        let reloaded = serde_json::from_str::<Settings>(&json)
            .unwrap()
            .validated();
        assert_eq!(reloaded, settings);
    }
}
