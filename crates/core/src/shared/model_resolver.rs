use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::model_catalog::ModelSpec;

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("failed to create cache directory: {0}")]
    CacheDir(#[source] std::io::Error),
    #[error("download failed for {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("transfer interrupted for {url}: {source}")]
    Transfer {
        url: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write model to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not determine cache directory")]
    NoCacheDir,
}

/// Progress callback: `(bytes_downloaded, total_bytes)`.
/// `total_bytes` is 0 if the server didn't provide Content-Length.
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send>;

/// Report progress at most once per this many bytes, so a 500 MB model
/// doesn't flood the callback.
const REPORT_STEP: u64 = 1024 * 1024;

/// Resolve a model artifact by catalog entry, downloading into the user
/// cache on a miss.
pub fn resolve(model: &ModelSpec, progress: Option<ProgressFn>) -> Result<PathBuf, ModelResolveError> {
    let cache_dir = model_cache_dir()?;
    let cached_path = cache_dir.join(model.file_name);
    if cached_path.exists() {
        return Ok(cached_path);
    }

    fs::create_dir_all(&cache_dir).map_err(ModelResolveError::CacheDir)?;
    download(model.url, &cached_path, progress)?;
    Ok(cached_path)
}

/// Platform-specific model cache directory.
///
/// - macOS: `~/Library/Application Support/Murmur/models/`
/// - Linux: `$XDG_CACHE_HOME/Murmur/models/` or `~/.cache/Murmur/models/`
/// - Windows: `%LOCALAPPDATA%/Murmur/models/`
pub fn model_cache_dir() -> Result<PathBuf, ModelResolveError> {
    #[cfg(target_os = "macos")]
    {
        dirs::data_dir()
            .map(|d| d.join("Murmur").join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
    #[cfg(not(target_os = "macos"))]
    {
        dirs::cache_dir()
            .map(|d| d.join("Murmur").join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
}

fn download(url: &str, dest: &Path, progress: Option<ProgressFn>) -> Result<(), ModelResolveError> {
    let response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(|e| ModelResolveError::Download {
            url: url.to_string(),
            source: e,
        })?;

    let total = response.content_length().unwrap_or(0);

    // Write to a temp file first, then rename for atomicity
    let temp_path = dest.with_extension("part");
    let mut file = fs::File::create(&temp_path).map_err(|e| ModelResolveError::Write {
        path: temp_path.clone(),
        source: e,
    })?;

    let mut reader = response;
    let mut buf = [0u8; 64 * 1024];
    let mut downloaded: u64 = 0;
    let mut last_reported: u64 = 0;

    loop {
        let n = reader.read(&mut buf).map_err(|e| ModelResolveError::Transfer {
            url: url.to_string(),
            source: e,
        })?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n]).map_err(|e| ModelResolveError::Write {
            path: temp_path.clone(),
            source: e,
        })?;
        downloaded += n as u64;
        if let Some(ref cb) = progress {
            if downloaded - last_reported >= REPORT_STEP {
                cb(downloaded, total);
                last_reported = downloaded;
            }
        }
    }

    // Final report so callers always observe completion, even for files
    // smaller than the report step.
    if let Some(ref cb) = progress {
        cb(downloaded, total);
    }

    file.flush().map_err(|e| ModelResolveError::Write {
        path: temp_path.clone(),
        source: e,
    })?;
    drop(file);

    fs::rename(&temp_path, dest).map_err(|e| ModelResolveError::Write {
        path: dest.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_cache_dir_returns_path() {
        let dir = model_cache_dir();
        assert!(dir.is_ok());
        let path = dir.unwrap();
        assert!(path.to_string_lossy().contains("Murmur"));
        assert!(path.to_string_lossy().contains("models"));
    }

    #[test]
    fn test_download_to_file() {
        // Skip in CI — requires network access
        if std::env::var("CI").is_ok() {
            return;
        }
        let tmp = tempfile::TempDir::new().unwrap();
        let dest = tmp.path().join("robots.txt");

        let progress_called = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
        let flag = progress_called.clone();

        let result = download(
            "https://www.google.com/robots.txt",
            &dest,
            Some(Box::new(move |_downloaded, _total| {
                flag.store(true, std::sync::atomic::Ordering::Relaxed);
            })),
        );
        assert!(result.is_ok(), "download failed: {:?}", result.err());
        assert!(dest.exists());
        assert!(!fs::read(&dest).unwrap().is_empty());
        assert!(progress_called.load(std::sync::atomic::Ordering::Relaxed));
    }

    #[test]
    fn test_download_invalid_url_returns_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dest = tmp.path().join("model.bin");
        let result = download("http://invalid.nonexistent.example.com/model", &dest, None);
        assert!(result.is_err());
    }

    #[test]
    fn test_download_atomic_no_partial_on_failure() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dest = tmp.path().join("model.bin");
        let _ = download("http://invalid.nonexistent.example.com/model", &dest, None);
        // Neither the dest nor the .part file should exist after failure
        assert!(!dest.exists());
        assert!(!dest.with_extension("part").exists());
    }
}
