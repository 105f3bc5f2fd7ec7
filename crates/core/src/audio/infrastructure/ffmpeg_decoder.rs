use std::path::Path;

use crate::audio::domain::decoder::AudioDecoder;
use crate::audio::domain::sample_buffer::SampleBuffer;

/// Decodes audio files using ffmpeg-next.
///
/// Any container/codec ffmpeg understands is accepted; output is always
/// mono f32 at the requested rate, resampled by ffmpeg's software
/// resampler during decode.
pub struct FfmpegDecoder;

impl AudioDecoder for FfmpegDecoder {
    fn decode(
        &self,
        path: &Path,
        target_sample_rate: u32,
    ) -> Result<SampleBuffer, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let mut ictx = ffmpeg_next::format::input(path)?;

        let audio_stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Audio)
            .ok_or_else(|| format!("no audio stream in {}", path.display()))?;

        let audio_stream_index = audio_stream.index();
        let codec_params = audio_stream.parameters();

        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(codec_params)?;
        let mut decoder = codec_ctx.decoder().audio()?;

        let mut resampler = ffmpeg_next::software::resampling::Context::get(
            decoder.format(),
            decoder.channel_layout(),
            decoder.rate(),
            ffmpeg_next::format::Sample::F32(ffmpeg_next::format::sample::Type::Planar),
            ffmpeg_next::ChannelLayout::MONO,
            target_sample_rate,
        )?;

        let mut all_samples: Vec<f32> = Vec::new();
        let mut decoded_frame = ffmpeg_next::util::frame::audio::Audio::empty();
        let mut resampled_frame = ffmpeg_next::util::frame::audio::Audio::empty();

        for (stream, packet) in ictx.packets() {
            if stream.index() != audio_stream_index {
                continue;
            }

            decoder.send_packet(&packet)?;

            while decoder.receive_frame(&mut decoded_frame).is_ok() {
                resampler.run(&decoded_frame, &mut resampled_frame)?;
                extract_f32_samples(&resampled_frame, &mut all_samples);
            }
        }

        // Flush the decoder
        decoder.send_eof()?;
        while decoder.receive_frame(&mut decoded_frame).is_ok() {
            resampler.run(&decoded_frame, &mut resampled_frame)?;
            extract_f32_samples(&resampled_frame, &mut all_samples);
        }

        // Flush the resampler (may have buffered samples)
        if let Ok(Some(delay)) = resampler.flush(&mut resampled_frame) {
            if delay.output > 0 {
                extract_f32_samples(&resampled_frame, &mut all_samples);
            }
        }

        if all_samples.is_empty() {
            return Err(format!("audio stream in {} decoded to nothing", path.display()).into());
        }

        Ok(SampleBuffer::new(all_samples, target_sample_rate))
    }
}

/// Extract f32 samples from a planar mono resampled frame.
fn extract_f32_samples(frame: &ffmpeg_next::util::frame::audio::Audio, out: &mut Vec<f32>) {
    let num_samples = frame.samples();
    if num_samples == 0 {
        return;
    }
    let data = frame.data(0);
    let floats = unsafe { std::slice::from_raw_parts(data.as_ptr() as *const f32, num_samples) };
    out.extend_from_slice(floats);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_nonexistent_file_returns_error() {
        let decoder = FfmpegDecoder;
        let path = if cfg!(windows) {
            Path::new("Z:\\nonexistent\\recording.wav")
        } else {
            Path::new("/nonexistent/recording.wav")
        };
        assert!(decoder.decode(path, 16000).is_err());
    }

    #[test]
    fn test_decode_non_media_file_returns_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("notes.txt");
        std::fs::write(&path, b"this is not audio").unwrap();

        let decoder = FfmpegDecoder;
        assert!(decoder.decode(&path, 16000).is_err());
    }
}
