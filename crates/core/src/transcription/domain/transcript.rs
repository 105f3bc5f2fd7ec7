use serde::{Deserialize, Serialize};

/// A timed text segment within a transcription.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TranscriptChunk {
    pub text: String,
    /// Start offset in seconds from the beginning of the audio.
    pub start: f64,
    /// End offset in seconds.
    pub end: f64,
}

impl TranscriptChunk {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// A completed transcription: the full text plus its timed chunks.
/// Immutable once produced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transcription {
    pub text: String,
    pub chunks: Vec<TranscriptChunk>,
}

impl Transcription {
    /// Assemble a transcription from chunks, concatenating their trimmed
    /// text with single spaces.
    pub fn from_chunks(chunks: Vec<TranscriptChunk>) -> Self {
        let text = chunks
            .iter()
            .map(|c| c.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        Self { text, chunks }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn chunk(text: &str, start: f64, end: f64) -> TranscriptChunk {
        TranscriptChunk {
            text: text.to_string(),
            start,
            end,
        }
    }

    #[test]
    fn test_chunk_duration() {
        assert_relative_eq!(chunk("hi", 2.0, 2.8).duration(), 0.8, epsilon = 1e-9);
    }

    #[test]
    fn test_from_chunks_joins_trimmed_text() {
        let t = Transcription::from_chunks(vec![
            chunk(" Hello there.", 0.0, 1.2),
            chunk(" General Kenobi. ", 1.2, 2.4),
        ]);
        assert_eq!(t.text, "Hello there. General Kenobi.");
        assert_eq!(t.chunks.len(), 2);
    }

    #[test]
    fn test_from_chunks_skips_empty_text() {
        let t = Transcription::from_chunks(vec![chunk("  ", 0.0, 0.5), chunk("word", 0.5, 1.0)]);
        assert_eq!(t.text, "word");
    }

    #[test]
    fn test_from_empty_chunks() {
        let t = Transcription::from_chunks(Vec::new());
        assert!(t.text.is_empty());
        assert!(t.chunks.is_empty());
    }
}
