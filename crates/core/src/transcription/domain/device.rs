use serde::{Deserialize, Serialize};

/// Compute backend for the inference pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    /// Portable CPU fallback; works everywhere.
    #[default]
    Cpu,
    /// GPU-accelerated backend (Metal/CUDA, depending on the build).
    Gpu,
}

impl Device {
    pub const ALL: &[Device] = &[Device::Cpu, Device::Gpu];
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Device::Cpu => write!(f, "CPU"),
            Device::Gpu => write!(f, "GPU"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_round_trip_is_lowercase() {
        assert_eq!(serde_json::to_string(&Device::Gpu).unwrap(), "\"gpu\"");
        assert_eq!(
            serde_json::from_str::<Device>("\"cpu\"").unwrap(),
            Device::Cpu
        );
    }

    #[test]
    fn test_default_is_cpu() {
        assert_eq!(Device::default(), Device::Cpu);
    }
}
