/// A buffer of mono PCM samples normalized to [-1.0, 1.0].
///
/// Every capture path (microphone, file decode) converges on this type at
/// 16 kHz before audio is handed to the transcriber.
#[derive(Clone, Debug, PartialEq)]
pub struct SampleBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl SampleBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Consume the buffer, yielding the raw samples.
    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Largest absolute amplitude in the buffer.
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_creates_buffer_with_correct_fields() {
        let samples = vec![0.0f32; 16000];
        let buf = SampleBuffer::new(samples.clone(), 16000);
        assert_eq!(buf.samples(), &samples[..]);
        assert_eq!(buf.sample_rate(), 16000);
        assert_eq!(buf.len(), 16000);
        assert!(!buf.is_empty());
    }

    #[test]
    fn test_duration() {
        let buf = SampleBuffer::new(vec![0.0; 48000], 16000);
        assert_relative_eq!(buf.duration_secs(), 3.0);
    }

    #[test]
    fn test_peak_uses_absolute_amplitude() {
        let buf = SampleBuffer::new(vec![0.1, -0.8, 0.4], 16000);
        assert_relative_eq!(buf.peak(), 0.8);
    }

    #[test]
    fn test_peak_of_empty_buffer_is_zero() {
        let buf = SampleBuffer::new(Vec::new(), 16000);
        assert_eq!(buf.peak(), 0.0);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_into_samples_returns_storage() {
        let buf = SampleBuffer::new(vec![0.5; 10], 16000);
        assert_eq!(buf.into_samples(), vec![0.5; 10]);
    }
}
