//! Document submission: the OCR provider seam.
//!
//! [`DocumentSubmitter`] is the only interface the parse pipeline needs from
//! a provider: bytes and a file name in, raw pages out. It is object safe so
//! the HTTP service and [`crate::config::OcrConfig`] can hold an
//! `Arc<dyn DocumentSubmitter>`; tests substitute a double.

pub mod mistral;

pub use mistral::MistralClient;

use crate::document::{DocumentInput, OcrDocument};
use crate::error::OcrError;
use crate::progress::ParseProgressCallback;
use async_trait::async_trait;

/// Submits a document to an OCR provider.
///
/// Implementations perform whatever sequential calls the provider needs and
/// report any failure as [`OcrError::Upstream`]. They must not retry.
#[async_trait]
pub trait DocumentSubmitter: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &str;

    /// Run OCR over `document`, reporting stage transitions to `progress`.
    async fn submit(
        &self,
        document: &DocumentInput,
        progress: &dyn ParseProgressCallback,
    ) -> Result<OcrDocument, OcrError>;
}
