//! # pdf-ocr-parser
//!
//! Parse PDF documents into Markdown and positioned images with the Mistral
//! OCR API.
//!
//! The provider does the OCR and layout analysis. This crate submits the
//! document, then normalises the response into something a renderer can use
//! directly: image placeholders in the markdown point at `data:` URLs, and
//! every image box is expressed as fractions of its page so it can be overlaid
//! at any zoom level.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input      read a local file or download a URL into memory
//!  ├─ 2. Upload     POST /v1/files (purpose=ocr)
//!  ├─ 3. Sign       GET  /v1/files/{id}/url
//!  ├─ 4. OCR        POST /v1/ocr with the signed URL
//!  └─ 5. Normalise  relative boxes + placeholder rewrite + page assembly
//! ```
//!
//! Steps 2–4 are sequential and sit behind the [`DocumentSubmitter`] trait;
//! step 5 is pure and never fails.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf_ocr_parser::{parse, OcrConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // API key read from MISTRAL_API_KEY
//!     let config = OcrConfig::default();
//!     let result = parse("document.pdf", &config).await?;
//!     println!("{}", result.text);
//!     for image in &result.images {
//!         eprintln!("{} at x={:.2} y={:.2}", image.id, image.coordinates.x, image.coordinates.y);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `cli`    | on      | Enables the `pdfocr` binary (clap + anyhow + tracing-subscriber + indicatif) |
//! | `server` | on      | Enables [`server`], the `/api/parse-pdf` axum service |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod output;
pub mod parse;
pub mod pipeline;
pub mod progress;
pub mod provider;
#[cfg(feature = "server")]
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{OcrConfig, OcrConfigBuilder};
pub use document::{DocumentInput, OcrDocument, OcrPage, PageDimensions, PageImage, UsageInfo};
pub use error::{OcrError, SubmitStage};
pub use export::{export_images, format_bytes, results_file_name};
pub use output::{NormalizedImage, NormalizedPage, OriginalBox, ParseResult, RelativeBox};
pub use parse::{parse, parse_bytes, parse_document, parse_sync, parse_to_file};
pub use pipeline::normalize::normalize_document;
pub use progress::{NoopProgressCallback, ParseProgressCallback, ParseStage, ProgressCallback};
pub use provider::{DocumentSubmitter, MistralClient};
