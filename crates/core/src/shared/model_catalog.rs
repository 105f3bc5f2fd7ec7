use std::fmt;

/// One supported Whisper model: a single ggml artifact published on
/// Hugging Face by the whisper.cpp project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelSpec {
    /// Short identifier used in settings, the CLI, and the history of
    /// last-used models.
    pub id: &'static str,
    /// Human-readable label shown in pick lists.
    pub label: &'static str,
    /// Artifact file name, also the key for download progress reporting.
    pub file_name: &'static str,
    pub url: &'static str,
    /// English-only models reject whisper's language auto-detection.
    pub english_only: bool,
}

impl fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

pub const MODELS: &[ModelSpec] = &[
    ModelSpec {
        id: "tiny",
        label: "tiny (75 MB)",
        file_name: "ggml-tiny.bin",
        url: "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-tiny.bin",
        english_only: false,
    },
    ModelSpec {
        id: "tiny.en",
        label: "tiny.en (75 MB)",
        file_name: "ggml-tiny.en.bin",
        url: "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-tiny.en.bin",
        english_only: true,
    },
    ModelSpec {
        id: "base",
        label: "base (142 MB)",
        file_name: "ggml-base.bin",
        url: "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-base.bin",
        english_only: false,
    },
    ModelSpec {
        id: "base.en",
        label: "base.en (142 MB)",
        file_name: "ggml-base.en.bin",
        url: "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-base.en.bin",
        english_only: true,
    },
    ModelSpec {
        id: "small",
        label: "small (466 MB)",
        file_name: "ggml-small.bin",
        url: "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-small.bin",
        english_only: false,
    },
    ModelSpec {
        id: "small.en",
        label: "small.en (466 MB)",
        file_name: "ggml-small.en.bin",
        url: "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-small.en.bin",
        english_only: true,
    },
];

/// Look a model up by id. Unknown ids (including ids persisted by older
/// versions) resolve to `None` and are treated as "no saved model".
pub fn find(id: &str) -> Option<&'static ModelSpec> {
    MODELS.iter().find(|m| m.id == id)
}

/// The model selected when nothing has been persisted yet.
pub fn default_model() -> &'static ModelSpec {
    &MODELS[2] // base
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_known_id() {
        let model = find("base.en").unwrap();
        assert_eq!(model.file_name, "ggml-base.en.bin");
        assert!(model.english_only);
    }

    #[test]
    fn test_find_unknown_id_returns_none() {
        assert!(find("huge").is_none());
        assert!(find("").is_none());
    }

    #[test]
    fn test_ids_are_unique() {
        for (i, a) in MODELS.iter().enumerate() {
            for b in &MODELS[i + 1..] {
                assert_ne!(a.id, b.id);
                assert_ne!(a.file_name, b.file_name);
            }
        }
    }

    #[test]
    fn test_default_model_is_in_catalog() {
        assert!(find(default_model().id).is_some());
    }

    #[test]
    fn test_english_only_matches_file_name() {
        for model in MODELS {
            assert_eq!(model.english_only, model.file_name.contains(".en."));
        }
    }
}
