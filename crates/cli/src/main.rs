use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};

use clap::Parser;

use murmur_core::audio::domain::decoder::AudioDecoder;
use murmur_core::audio::infrastructure::ffmpeg_decoder::FfmpegDecoder;
use murmur_core::export;
use murmur_core::shared::constants::WHISPER_SAMPLE_RATE;
use murmur_core::shared::model_catalog;
use murmur_core::shared::model_resolver::{self, ProgressFn};
use murmur_core::transcription::domain::device::Device;
use murmur_core::transcription::domain::transcriber::Transcriber;
use murmur_core::transcription::infrastructure::whisper_transcriber::WhisperTranscriber;

/// Local speech-to-text transcription for audio files.
#[derive(Parser)]
#[command(name = "murmur")]
struct Cli {
    /// Input audio or video file.
    input: PathBuf,

    /// Model to use (tiny, tiny.en, base, base.en, small, small.en).
    #[arg(long, default_value = "base")]
    model: String,

    /// Compute backend: cpu or gpu.
    #[arg(long, default_value = "cpu")]
    device: String,

    /// Write the plain-text transcript to this path.
    #[arg(long)]
    txt: Option<PathBuf>,

    /// Write an SRT subtitle file to this path.
    #[arg(long)]
    srt: Option<PathBuf>,

    /// Print per-chunk timestamps instead of the joined text.
    #[arg(long)]
    timestamps: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let model = model_catalog::find(&cli.model).ok_or_else(|| {
        format!(
            "unknown model '{}'; expected one of: {}",
            cli.model,
            model_catalog::MODELS
                .iter()
                .map(|m| m.id)
                .collect::<Vec<_>>()
                .join(", ")
        )
    })?;
    let device = parse_device(&cli.device)?;

    log::info!("resolving model {}", model.id);
    let model_path = model_resolver::resolve(model, Some(progress_reporter()))?;

    log::info!("decoding {}", cli.input.display());
    let audio = FfmpegDecoder.decode(&cli.input, WHISPER_SAMPLE_RATE)?;
    log::info!("decoded {:.1}s of audio", audio.duration_secs());

    let transcriber = WhisperTranscriber::new(&model_path, device, model.english_only)?;
    let result = transcriber.transcribe(&audio, None)?;

    if let Some(path) = &cli.txt {
        std::fs::write(path, export::plain_text(&result))?;
        log::info!("wrote {}", path.display());
    }
    if let Some(path) = &cli.srt {
        std::fs::write(path, export::srt(&result))?;
        log::info!("wrote {}", path.display());
    }

    if cli.timestamps {
        for chunk in &result.chunks {
            println!("[{:7.2} - {:7.2}] {}", chunk.start, chunk.end, chunk.text);
        }
    } else {
        println!("{}", export::plain_text(&result));
    }

    Ok(())
}

fn parse_device(value: &str) -> Result<Device, String> {
    match value {
        "cpu" => Ok(Device::Cpu),
        "gpu" => Ok(Device::Gpu),
        other => Err(format!("unknown device '{other}'; expected cpu or gpu")),
    }
}

/// Log download progress in 10% steps.
fn progress_reporter() -> ProgressFn {
    let last_decile = AtomicU64::new(u64::MAX);
    Box::new(move |downloaded, total| {
        if total == 0 {
            return;
        }
        let decile = downloaded * 10 / total;
        if last_decile.swap(decile, Ordering::Relaxed) != decile {
            log::info!("downloading model: {}%", decile * 10);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_device() {
        assert_eq!(parse_device("cpu").unwrap(), Device::Cpu);
        assert_eq!(parse_device("gpu").unwrap(), Device::Gpu);
        assert!(parse_device("tpu").is_err());
    }
}
