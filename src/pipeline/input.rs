//! Input resolution: turn a user-supplied path or URL into a [`DocumentInput`].
//!
//! The provider upload takes bytes, so both local files and URLs are read
//! straight into memory; nothing is staged on disk.

use crate::document::DocumentInput;
use crate::error::OcrError;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File name used when neither the path nor the URL yields one.
pub const DEFAULT_FILE_NAME: &str = "document.pdf";

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string to an in-memory document.
///
/// URLs are downloaded with a `timeout_secs` limit; anything else is read as
/// a local file.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<DocumentInput, OcrError> {
    if input.trim().is_empty() {
        return Err(OcrError::InvalidInput {
            input: input.to_string(),
        });
    }
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        read_local(Path::new(input)).await
    }
}

async fn read_local(path: &Path) -> Result<DocumentInput, OcrError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => OcrError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => OcrError::FileNotFound {
            path: path.to_path_buf(),
        },
    })?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string());

    debug!("Read local document {} ({} bytes)", path.display(), bytes.len());
    Ok(DocumentInput::new(file_name, bytes))
}

async fn download_url(url: &str, timeout_secs: u64) -> Result<DocumentInput, OcrError> {
    info!("Downloading document from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| OcrError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            OcrError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            OcrError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(OcrError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| OcrError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    info!("Downloaded {} bytes", bytes.len());
    Ok(DocumentInput::new(file_name_from_url(url), bytes))
}

/// Last path segment of `url` when it looks like a file name.
pub fn file_name_from_url(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() && last.contains('.') {
                    return last.to_string();
                }
            }
        }
    }

    DEFAULT_FILE_NAME.to_string()
}

/// Resolve the file a result should be written next to.
pub fn sibling_path(input: &str, file_name: &str) -> PathBuf {
    if is_url(input) {
        return PathBuf::from(file_name);
    }
    Path::new(input)
        .parent()
        .map(|dir| dir.join(file_name))
        .unwrap_or_else(|| PathBuf::from(file_name))
}
