use std::path::Path;

use whisper_rs::{
    FullParams, SamplingStrategy, SegmentCallbackData, WhisperContext, WhisperContextParameters,
};

use crate::audio::domain::sample_buffer::SampleBuffer;
use crate::shared::constants::WHISPER_SAMPLE_RATE;
use crate::transcription::domain::device::Device;
use crate::transcription::domain::transcriber::{SegmentFn, Transcriber};
use crate::transcription::domain::transcript::{TranscriptChunk, Transcription};

/// Speech-to-text via whisper.cpp.
///
/// The model is loaded once at construction; each transcription creates a
/// fresh inference state against the shared context, so one loaded model
/// serves any number of sequential transcriptions.
pub struct WhisperTranscriber {
    ctx: WhisperContext,
    language: String,
    threads: i32,
}

impl WhisperTranscriber {
    pub fn new(
        model_path: &Path,
        device: Device,
        english_only: bool,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        if !model_path.exists() {
            return Err(format!("model not found at {}", model_path.display()).into());
        }

        let mut ctx_params = WhisperContextParameters::default();
        ctx_params.use_gpu(matches!(device, Device::Gpu));

        let ctx = WhisperContext::new_with_params(
            model_path.to_str().ok_or("invalid model path")?,
            ctx_params,
        )
        .map_err(|e| format!("failed to load model: {e}"))?;

        // English-only models reject auto-detection
        let language = if english_only { "en" } else { "auto" }.to_string();

        Ok(Self {
            ctx,
            language,
            threads: num_threads(),
        })
    }
}

impl Transcriber for WhisperTranscriber {
    fn transcribe(
        &self,
        audio: &SampleBuffer,
        on_segment: Option<SegmentFn>,
    ) -> Result<Transcription, Box<dyn std::error::Error>> {
        if audio.sample_rate() != WHISPER_SAMPLE_RATE {
            return Err(format!(
                "expected {WHISPER_SAMPLE_RATE} Hz audio, got {} Hz",
                audio.sample_rate()
            )
            .into());
        }
        if audio.is_empty() {
            return Err("no audio samples to transcribe".into());
        }

        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| format!("failed to create inference state: {e}"))?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_language(Some(&self.language));
        params.set_translate(false);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_n_threads(self.threads);

        if let Some(mut callback) = on_segment {
            params.set_segment_callback_safe(move |segment: SegmentCallbackData| {
                callback(TranscriptChunk {
                    text: segment.text,
                    // Segment timestamps are in centiseconds (10 ms units)
                    start: segment.start_timestamp as f64 / 100.0,
                    end: segment.end_timestamp as f64 / 100.0,
                });
            });
        }

        state
            .full(params, audio.samples())
            .map_err(|e| format!("inference failed: {e}"))?;

        let mut chunks = Vec::new();
        let num_segments = state.full_n_segments();

        for seg_idx in 0..num_segments {
            let segment = match state.get_segment(seg_idx) {
                Some(s) => s,
                None => continue,
            };

            let text = match segment.to_str() {
                Ok(t) => t.trim().to_string(),
                Err(_) => continue,
            };
            if text.is_empty() {
                continue;
            }

            let start = segment.start_timestamp() as f64 / 100.0;
            let end = segment.end_timestamp() as f64 / 100.0;

            chunks.push(TranscriptChunk { text, start, end });
        }

        Ok(Transcription::from_chunks(chunks))
    }
}

fn num_threads() -> i32 {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(8) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_nonexistent_path_returns_error() {
        let result = WhisperTranscriber::new(
            std::path::Path::new("/nonexistent/model.bin"),
            Device::Cpu,
            true,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_num_threads_is_positive_and_bounded() {
        let n = num_threads();
        assert!(n >= 1);
        assert!(n <= 8);
    }
}
