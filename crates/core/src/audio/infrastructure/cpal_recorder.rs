use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{bounded, Sender};
use thiserror::Error;

use crate::audio::domain::sample_buffer::SampleBuffer;
use crate::audio::infrastructure::resampler;
use crate::shared::constants::WHISPER_SAMPLE_RATE;

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("no audio input device available")]
    NoDevice,
    #[error("failed to query input device configuration: {0}")]
    DeviceConfig(String),
    #[error("failed to build input stream: {0}")]
    StreamBuild(String),
    #[error("failed to start input stream: {0}")]
    StreamStart(String),
    #[error("capture thread terminated unexpectedly")]
    ThreadDied,
    #[error("failed to resample recording: {0}")]
    Resample(String),
}

struct Shared {
    samples: Mutex<Vec<f32>>,
}

/// An in-progress microphone recording.
///
/// cpal streams are not `Send`, so the stream lives on a dedicated capture
/// thread; the stream callback downmixes interleaved frames to mono and
/// appends to a shared buffer at the device rate. [`CpalRecorder::finish`]
/// stops the stream and resamples the whole take to 16 kHz.
pub struct CpalRecorder {
    stop_tx: Sender<()>,
    join: Option<JoinHandle<()>>,
    shared: Arc<Shared>,
    device_rate: u32,
    started: Instant,
}

impl CpalRecorder {
    /// Open the default input device and start capturing.
    pub fn start() -> Result<Self, RecordError> {
        let shared = Arc::new(Shared {
            samples: Mutex::new(Vec::new()),
        });
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let (ready_tx, ready_rx) = bounded::<Result<u32, RecordError>>(1);

        let thread_shared = shared.clone();
        let join = thread::spawn(move || {
            let (stream, device_rate) = match build_stream(&thread_shared) {
                Ok(pair) => pair,
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };
            if let Err(e) = stream.play() {
                let _ = ready_tx.send(Err(RecordError::StreamStart(e.to_string())));
                return;
            }
            let _ = ready_tx.send(Ok(device_rate));

            // Keep the stream alive until stop is requested or the
            // recorder is dropped.
            let _ = stop_rx.recv();
            drop(stream);
        });

        match ready_rx.recv() {
            Ok(Ok(device_rate)) => Ok(Self {
                stop_tx,
                join: Some(join),
                shared,
                device_rate,
                started: Instant::now(),
            }),
            Ok(Err(e)) => {
                let _ = join.join();
                Err(e)
            }
            Err(_) => Err(RecordError::ThreadDied),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// The most recent `count` captured samples, for the live waveform.
    pub fn waveform_tail(&self, count: usize) -> Vec<f32> {
        let samples = match self.shared.samples.lock() {
            Ok(guard) => guard,
            Err(_) => return Vec::new(),
        };
        let start = samples.len().saturating_sub(count);
        samples[start..].to_vec()
    }

    /// Stop capturing and return the whole take as mono 16 kHz PCM.
    pub fn finish(mut self) -> Result<SampleBuffer, RecordError> {
        self.stop();
        let raw = match self.shared.samples.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(_) => return Err(RecordError::ThreadDied),
        };
        let resampled = resampler::resample(&raw, self.device_rate, WHISPER_SAMPLE_RATE)
            .map_err(|e| RecordError::Resample(e.to_string()))?;
        Ok(SampleBuffer::new(resampled, WHISPER_SAMPLE_RATE))
    }

    fn stop(&mut self) {
        let _ = self.stop_tx.send(());
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

impl Drop for CpalRecorder {
    fn drop(&mut self) {
        self.stop();
    }
}

fn build_stream(shared: &Arc<Shared>) -> Result<(cpal::Stream, u32), RecordError> {
    let host = cpal::default_host();
    let device = host.default_input_device().ok_or(RecordError::NoDevice)?;
    let supported = device
        .default_input_config()
        .map_err(|e| RecordError::DeviceConfig(e.to_string()))?;

    let device_rate = supported.sample_rate().0;
    let channels = supported.channels() as usize;
    let config: cpal::StreamConfig = supported.config();

    let err_fn = |err| log::error!("audio capture stream error: {err}");

    let stream = match supported.sample_format() {
        cpal::SampleFormat::F32 => {
            let shared = shared.clone();
            device.build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    push_mono(&shared, data, channels);
                },
                err_fn,
                None,
            )
        }
        cpal::SampleFormat::I16 => {
            let shared = shared.clone();
            device.build_input_stream(
                &config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    let floats: Vec<f32> = data.iter().map(|&s| s as f32 / 32768.0).collect();
                    push_mono(&shared, &floats, channels);
                },
                err_fn,
                None,
            )
        }
        cpal::SampleFormat::U16 => {
            let shared = shared.clone();
            device.build_input_stream(
                &config,
                move |data: &[u16], _: &cpal::InputCallbackInfo| {
                    let floats: Vec<f32> = data
                        .iter()
                        .map(|&s| (s as f32 - 32768.0) / 32768.0)
                        .collect();
                    push_mono(&shared, &floats, channels);
                },
                err_fn,
                None,
            )
        }
        other => {
            return Err(RecordError::DeviceConfig(format!(
                "unsupported sample format {other:?}"
            )))
        }
    }
    .map_err(|e| RecordError::StreamBuild(e.to_string()))?;

    Ok((stream, device_rate))
}

/// Downmix interleaved frames to mono and append to the shared buffer.
fn push_mono(shared: &Arc<Shared>, data: &[f32], channels: usize) {
    let mut samples = match shared.samples.lock() {
        Ok(guard) => guard,
        Err(_) => return,
    };
    if channels <= 1 {
        samples.extend_from_slice(data);
    } else {
        samples.extend(
            data.chunks_exact(channels)
                .map(|frame| frame.iter().sum::<f32>() / channels as f32),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn shared() -> Arc<Shared> {
        Arc::new(Shared {
            samples: Mutex::new(Vec::new()),
        })
    }

    #[test]
    fn test_push_mono_passes_mono_through() {
        let shared = shared();
        push_mono(&shared, &[0.1, 0.2, 0.3], 1);
        assert_eq!(&*shared.samples.lock().unwrap(), &[0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_push_mono_downmixes_stereo() {
        let shared = shared();
        push_mono(&shared, &[0.2, 0.4, 0.6, 0.8], 2);
        let samples = shared.samples.lock().unwrap();
        assert_eq!(samples.len(), 2);
        assert_relative_eq!(samples[0], 0.3);
        assert_relative_eq!(samples[1], 0.7);
    }

    #[test]
    fn test_push_mono_appends_across_calls() {
        let shared = shared();
        push_mono(&shared, &[0.1], 1);
        push_mono(&shared, &[0.2], 1);
        assert_eq!(shared.samples.lock().unwrap().len(), 2);
    }
}
