//! Upstream types: the document handed to the OCR provider and the raw
//! per-page response it returns.
//!
//! Field names follow the Mistral OCR JSON contract (snake_case). Every
//! value the provider may omit is optional or defaulted here, so a sparse
//! response deserialises cleanly and the normaliser applies its own
//! defaulting rules instead of rejecting the page.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A document ready for submission: the original file name and its bytes.
///
/// Bytes are read into memory once and dropped after the request. The buffer
/// is reference-counted, so handing it to the upload body does not copy it.
#[derive(Clone, PartialEq, Eq)]
pub struct DocumentInput {
    pub file_name: String,
    pub bytes: Bytes,
}

impl DocumentInput {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for DocumentInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentInput")
            .field("file_name", &self.file_name)
            .field("bytes", &format_args!("<{} bytes>", self.bytes.len()))
            .finish()
    }
}

/// Full provider response for one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrDocument {
    #[serde(default)]
    pub pages: Vec<OcrPage>,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub usage_info: Option<UsageInfo>,
}

/// One physical page as returned by the provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrPage {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub markdown: String,
    #[serde(default)]
    pub images: Vec<PageImage>,
    #[serde(default)]
    pub dimensions: Option<PageDimensions>,
}

/// An image embedded in a page.
///
/// Corners are page-pixel coordinates. `id` doubles as the placeholder token
/// in the page markdown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageImage {
    pub id: String,
    #[serde(default)]
    pub top_left_x: Option<f64>,
    #[serde(default)]
    pub top_left_y: Option<f64>,
    #[serde(default)]
    pub bottom_right_x: Option<f64>,
    #[serde(default)]
    pub bottom_right_y: Option<f64>,
    /// Inline image data: either a full `data:` URL or bare base64.
    #[serde(default)]
    pub image_base64: Option<String>,
}

/// Pixel size of a page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PageDimensions {
    #[serde(default)]
    pub dpi: u32,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

/// Provider usage metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageInfo {
    #[serde(default)]
    pub pages_processed: u32,
    #[serde(default)]
    pub doc_size_bytes: Option<u64>,
}
