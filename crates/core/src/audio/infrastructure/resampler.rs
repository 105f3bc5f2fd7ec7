use audioadapter_buffers::direct::InterleavedSlice;
use rubato::{Fft, FixedSync, Resampler};

/// Chunk size for FFT-based resampling.
const CHUNK_SIZE: usize = 1024;

/// Number of sub-chunks for FFT processing.
const SUB_CHUNKS: usize = 2;

/// Resample mono samples from `from_rate` to `to_rate` in one batch.
///
/// Used for recorded microphone audio, which is captured at the device
/// rate and converted to 16 kHz once recording stops. Matching rates are
/// passed through untouched.
pub fn resample(
    samples: &[f32],
    from_rate: u32,
    to_rate: u32,
) -> Result<Vec<f32>, Box<dyn std::error::Error>> {
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let mut resampler = Fft::<f32>::new(
        from_rate as usize,
        to_rate as usize,
        CHUNK_SIZE,
        SUB_CHUNKS,
        1, // mono
        FixedSync::Input,
    )?;

    let output_frames_max = resampler.output_frames_max();
    let mut output_buffer = vec![0.0f32; output_frames_max];

    let expected_len = (samples.len() as f64 * to_rate as f64 / from_rate as f64) as usize;
    let mut output = Vec::with_capacity(expected_len + CHUNK_SIZE);

    let mut pos = 0;
    while pos < samples.len() {
        let end = (pos + CHUNK_SIZE).min(samples.len());
        let chunk = &samples[pos..end];

        // Pad the last chunk to a full resampler frame
        let padded;
        let input_chunk: &[f32] = if chunk.len() < CHUNK_SIZE {
            padded = {
                let mut p = chunk.to_vec();
                p.resize(CHUNK_SIZE, 0.0);
                p
            };
            &padded
        } else {
            chunk
        };

        let input_adapter = InterleavedSlice::new(input_chunk, 1, CHUNK_SIZE)?;
        let mut output_adapter =
            InterleavedSlice::new_mut(&mut output_buffer, 1, output_frames_max)?;

        let (_, frames_written) =
            resampler.process_into_buffer(&input_adapter, &mut output_adapter, None)?;
        output.extend_from_slice(&output_buffer[..frames_written]);

        pos += CHUNK_SIZE;
    }

    // Trim the tail added by padding the final chunk
    output.truncate(expected_len);

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_same_rate_is_identity() {
        let samples = vec![0.25f32; 1000];
        let result = resample(&samples, 16000, 16000).unwrap();
        assert_eq!(result, samples);
    }

    #[test]
    fn test_empty_input_stays_empty() {
        let result = resample(&[], 48000, 16000).unwrap();
        assert!(result.is_empty());
    }

    #[rstest]
    #[case(48000)]
    #[case(44100)]
    #[case(22050)]
    fn test_one_second_downsamples_to_about_16k(#[case] from_rate: u32) {
        let samples = vec![0.0f32; from_rate as usize];
        let result = resample(&samples, from_rate, 16000).unwrap();
        // The FFT resampler withholds a small priming delay; the batch is
        // truncated to the exact expected length at most.
        assert!(result.len() <= 16000, "got {} samples", result.len());
        assert!(result.len() > 14000, "got {} samples", result.len());
    }

    #[test]
    fn test_upsampling_lengthens_buffer() {
        let samples = vec![0.0f32; 16000];
        let result = resample(&samples, 16000, 48000).unwrap();
        assert!(result.len() > 40000);
        assert!(result.len() <= 48000);
    }
}
