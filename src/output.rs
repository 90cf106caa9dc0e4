//! Normalised output types.
//!
//! These are what the library hands to its callers and what the HTTP service
//! serialises. JSON keys are camelCase (`rawText`, `originalCoordinates`),
//! except the corner names inside [`OriginalBox`] which keep the provider's
//! snake_case so they can be compared with the raw response directly.

use crate::document::{PageDimensions, UsageInfo};
use serde::{Deserialize, Serialize};

/// The consumption-ready result of parsing one document.
///
/// `Default` is the empty result: no pages, empty strings, no images.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    /// Every page's processed markdown joined with a blank line.
    pub text: String,
    /// Every page's raw markdown joined with a blank line.
    pub raw_text: String,
    /// Pages in ascending index order.
    pub pages: Vec<NormalizedPage>,
    /// All images, in page order then in-page order.
    pub images: Vec<NormalizedImage>,
    pub usage: Option<UsageInfo>,
    pub model: String,
}

impl ParseResult {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }
}

/// A page after placeholder substitution and box normalisation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedPage {
    pub index: u32,
    /// Markdown with image placeholders pointing at resolvable URLs.
    pub markdown: String,
    /// The provider's markdown, untouched.
    pub raw_markdown: String,
    pub images: Vec<NormalizedImage>,
    pub dimensions: Option<PageDimensions>,
}

/// An image with its resolvable URL and page-relative box.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedImage {
    pub id: String,
    /// A directly renderable reference (a `data:` URL). Empty when the
    /// provider returned no inline data.
    pub url: String,
    pub coordinates: RelativeBox,
    pub original_coordinates: OriginalBox,
}

/// A bounding box as fractions of the page width and height.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RelativeBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl RelativeBox {
    /// Scale back to pixels for a page rendered at `page_width` × `page_height`.
    pub fn to_pixels(&self, page_width: f64, page_height: f64) -> (f64, f64, f64, f64) {
        (
            self.x * page_width,
            self.y * page_height,
            self.width * page_width,
            self.height * page_height,
        )
    }
}

/// The provider's corners, passed through unchanged. Absent stays `null`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OriginalBox {
    pub top_left_x: Option<f64>,
    pub top_left_y: Option<f64>,
    pub bottom_right_x: Option<f64>,
    pub bottom_right_y: Option<f64>,
}
