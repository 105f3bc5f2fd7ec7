use crate::transcription::domain::transcript::Transcription;

/// Render a transcription in SubRip (SRT) format.
///
/// Cues are numbered from 1, timestamps use `HH:MM:SS,mmm`, and one blank
/// line separates entries. Output is deterministic for a given
/// transcription; an empty chunk list renders to an empty string.
pub fn srt(transcription: &Transcription) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(transcription.chunks.len() * 4);
    for (i, chunk) in transcription.chunks.iter().enumerate() {
        lines.push((i + 1).to_string());
        lines.push(format!(
            "{} --> {}",
            timestamp(chunk.start),
            timestamp(chunk.end)
        ));
        lines.push(chunk.text.trim().to_string());
        lines.push(String::new());
    }
    lines.join("\n")
}

fn timestamp(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let ms = total_ms % 1000;
    let s = (total_ms / 1000) % 60;
    let m = (total_ms / 60_000) % 60;
    let h = total_ms / 3_600_000;
    format!("{h:02}:{m:02}:{s:02},{ms:03}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcription::domain::transcript::TranscriptChunk;
    use rstest::rstest;

    fn chunk(text: &str, start: f64, end: f64) -> TranscriptChunk {
        TranscriptChunk {
            text: text.to_string(),
            start,
            end,
        }
    }

    #[rstest]
    #[case(0.0, "00:00:00,000")]
    #[case(61.5, "00:01:01,500")]
    #[case(63.25, "00:01:03,250")]
    #[case(3661.001, "01:01:01,001")]
    #[case(0.9996, "00:00:01,000")]
    #[case(-1.0, "00:00:00,000")]
    fn test_timestamp(#[case] seconds: f64, #[case] expected: &str) {
        assert_eq!(timestamp(seconds), expected);
    }

    #[test]
    fn test_empty_transcription_renders_empty() {
        let t = Transcription {
            text: String::new(),
            chunks: Vec::new(),
        };
        assert_eq!(srt(&t), "");
    }

    #[test]
    fn test_single_cue_layout() {
        let t = Transcription::from_chunks(vec![chunk(" Hello. ", 61.5, 63.25)]);
        assert_eq!(srt(&t), "1\n00:01:01,500 --> 00:01:03,250\nHello.\n");
    }

    #[test]
    fn test_cues_are_numbered_and_blank_line_separated() {
        let t = Transcription::from_chunks(vec![
            chunk("First.", 0.0, 1.0),
            chunk("Second.", 1.0, 2.5),
        ]);
        assert_eq!(
            srt(&t),
            "1\n00:00:00,000 --> 00:00:01,000\nFirst.\n\n\
             2\n00:00:01,000 --> 00:00:02,500\nSecond.\n"
        );
    }

    #[test]
    fn test_output_is_deterministic() {
        let t = Transcription::from_chunks(vec![chunk("again", 1.25, 2.0)]);
        assert_eq!(srt(&t), srt(&t));
    }
}
