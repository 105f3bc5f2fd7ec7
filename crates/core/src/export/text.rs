use crate::transcription::domain::transcript::Transcription;

/// Render a transcription as plain text.
pub fn plain_text(transcription: &Transcription) -> String {
    transcription.text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_trims_surrounding_whitespace() {
        let t = Transcription {
            text: "  hello world \n".to_string(),
            chunks: Vec::new(),
        };
        assert_eq!(plain_text(&t), "hello world");
    }
}
