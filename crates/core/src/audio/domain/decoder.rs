use std::path::Path;

use super::sample_buffer::SampleBuffer;

/// Domain interface for decoding an audio file into mono PCM at a fixed
/// sample rate.
///
/// Implementations own container/codec handling; callers only ever see a
/// [`SampleBuffer`].
pub trait AudioDecoder {
    fn decode(
        &self,
        path: &Path,
        target_sample_rate: u32,
    ) -> Result<SampleBuffer, Box<dyn std::error::Error>>;
}
