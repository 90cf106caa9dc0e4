//! Error types for the pdf-ocr-parser library.
//!
//! There is a single fatal error type, [`OcrError`]. The parse pipeline has
//! exactly two ways to fail:
//!
//! * **Missing input**: no document (or an empty one) was supplied. Reported
//!   before any network call is made.
//!
//! * **Upstream failure**: the OCR provider could not produce pages, for any
//!   reason (network, authentication, unsupported document). These collapse
//!   into [`OcrError::Upstream`] with a diagnostic string; the stage is kept
//!   for logs but callers are not expected to branch on it.
//!
//! Normalisation of a provider response never fails. The remaining variants
//! cover the library's own surfaces: resolving a path or URL, configuration,
//! and writing output files.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf-ocr-parser library.
#[derive(Debug, Error)]
pub enum OcrError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// No document bytes were supplied.
    #[error("No PDF file provided")]
    MissingInput,

    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a usable file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Provider errors ───────────────────────────────────────────────────
    /// No OCR provider could be built (usually a missing API key).
    #[error("OCR provider is not configured.\n{hint}")]
    ProviderNotConfigured { hint: String },

    /// The OCR provider failed. Sub-causes are not distinguished.
    #[error("OCR request failed during {stage}: {detail}")]
    Upstream { stage: SubmitStage, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl OcrError {
    /// Shorthand for an [`OcrError::Upstream`] at `stage`.
    pub fn upstream(stage: SubmitStage, detail: impl Into<String>) -> Self {
        OcrError::Upstream {
            stage,
            detail: detail.into(),
        }
    }

    /// `true` when the caller supplied no document at all.
    pub fn is_missing_input(&self) -> bool {
        matches!(self, OcrError::MissingInput)
    }

    /// `true` for failures reported by the OCR provider.
    pub fn is_upstream(&self) -> bool {
        matches!(self, OcrError::Upstream { .. })
    }
}

/// The provider call that was in flight when an upstream failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitStage {
    /// Building the HTTP client.
    Connect,
    /// Uploading the document bytes.
    Upload,
    /// Requesting a signed URL for the uploaded file.
    SignedUrl,
    /// Running OCR over the signed URL.
    Ocr,
}

impl fmt::Display for SubmitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SubmitStage::Connect => "connect",
            SubmitStage::Upload => "upload",
            SubmitStage::SignedUrl => "signed-url",
            SubmitStage::Ocr => "ocr",
        };
        f.write_str(s)
    }
}
