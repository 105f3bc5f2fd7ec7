use crate::audio::domain::sample_buffer::SampleBuffer;

use super::transcript::{TranscriptChunk, Transcription};

/// Called with each decoded segment while inference is still running.
/// Segments arrive in order; the final [`Transcription`] supersedes
/// anything observed through the callback.
pub type SegmentFn = Box<dyn FnMut(TranscriptChunk) + Send>;

/// Domain interface for speech-to-text inference.
pub trait Transcriber: Send {
    fn transcribe(
        &self,
        audio: &SampleBuffer,
        on_segment: Option<SegmentFn>,
    ) -> Result<Transcription, Box<dyn std::error::Error>>;
}
