//! Pipeline stages for PDF-to-OCR-result parsing.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ provider ──▶ normalize ──▶ ParseResult
//! (path/URL)  (OCR API)   (boxes + reconcile)
//! ```
//!
//! 1. [`input`]: read the local file or download the URL into memory
//! 2. [`crate::provider`]: submission, the only stage with network I/O
//! 3. [`normalize`]: relative boxes, per-page id→URL map, page assembly
//! 4. [`reconcile`]: rewrite image placeholders in page markdown
//! 5. [`encode`]: inline image data ⇄ `data:` URLs

pub mod encode;
pub mod input;
pub mod normalize;
pub mod reconcile;
