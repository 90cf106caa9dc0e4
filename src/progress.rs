//! Progress-callback trait for parse stage events.
//!
//! Inject an [`Arc<dyn ParseProgressCallback>`] via
//! [`crate::config::OcrConfigBuilder::progress_callback`] to receive events
//! as a document moves through upload, signed-URL, OCR and normalisation.
//! The CLI forwards them to a spinner; the HTTP service does not install one.
//!
//! # Example
//!
//! ```rust
//! use pdf_ocr_parser::{OcrConfig, ParseProgressCallback, ParseStage};
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl ParseProgressCallback for Printer {
//!     fn on_stage_start(&self, stage: ParseStage) {
//!         eprintln!("{}…", stage.label());
//!     }
//! }
//!
//! let config = OcrConfig::builder()
//!     .progress_callback(Arc::new(Printer))
//!     .build()
//!     .unwrap();
//! ```

use std::fmt;
use std::sync::Arc;

/// A step of one parse request, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseStage {
    Upload,
    SignedUrl,
    Ocr,
    Normalize,
}

impl ParseStage {
    /// Short human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            ParseStage::Upload => "Uploading",
            ParseStage::SignedUrl => "Preparing",
            ParseStage::Ocr => "Processing",
            ParseStage::Normalize => "Extracting",
        }
    }
}

impl fmt::Display for ParseStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Called by the parse pipeline as it moves through its stages.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Implementations must be `Send + Sync`: the HTTP
/// service may share one config across concurrent requests.
pub trait ParseProgressCallback: Send + Sync {
    /// Called once before anything is sent to the provider.
    fn on_parse_start(&self, file_name: &str, size_bytes: usize) {
        let _ = (file_name, size_bytes);
    }

    /// Called when a stage begins.
    fn on_stage_start(&self, stage: ParseStage) {
        let _ = stage;
    }

    /// Called when a stage finishes successfully.
    fn on_stage_complete(&self, stage: ParseStage) {
        let _ = stage;
    }

    /// Called once after normalisation.
    fn on_parse_complete(&self, pages: usize, images: usize) {
        let _ = (pages, images);
    }

    /// Called once when the request fails.
    fn on_parse_error(&self, error: &str) {
        let _ = error;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ParseProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::OcrConfig`].
pub type ProgressCallback = Arc<dyn ParseProgressCallback>;
