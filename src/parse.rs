//! Parse entry points: document in, [`ParseResult`] out.
//!
//! Every entry point funnels into [`parse_document`], which takes the
//! submitter explicitly. The convenience functions only differ in where the
//! bytes and the submitter come from.

use crate::config::OcrConfig;
use crate::document::DocumentInput;
use crate::error::OcrError;
use crate::output::ParseResult;
use crate::pipeline::{input, normalize};
use crate::progress::{NoopProgressCallback, ParseProgressCallback, ParseStage};
use crate::provider::{DocumentSubmitter, MistralClient};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Parse a PDF file or URL.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `input_str`: local file path or HTTP/HTTPS URL to a PDF
/// * `config`: parse configuration
///
/// # Errors
/// - input could not be read or downloaded
/// - no provider could be configured (missing API key)
/// - [`OcrError::MissingInput`] when the document is empty
/// - [`OcrError::Upstream`] for any provider failure
///
/// # Example
/// ```rust,no_run
/// use pdf_ocr_parser::{parse, OcrConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     // API key read from MISTRAL_API_KEY
///     let result = parse("invoice.pdf", &OcrConfig::default()).await?;
///     println!("{}", result.text);
///     Ok(())
/// }
/// ```
pub async fn parse(
    input_str: impl AsRef<str>,
    config: &OcrConfig,
) -> Result<ParseResult, OcrError> {
    let input_str = input_str.as_ref();
    info!("Starting parse: {}", input_str);

    let document = input::resolve_input(input_str, config.download_timeout_secs).await?;
    if document.is_empty() {
        return Err(OcrError::MissingInput);
    }
    let submitter = resolve_submitter(config)?;
    parse_document(submitter.as_ref(), document, config).await
}

/// Parse PDF bytes already in memory.
///
/// This is the recommended API when the document comes from a request body,
/// a database or any other buffer.
pub async fn parse_bytes(
    file_name: impl Into<String>,
    bytes: impl Into<bytes::Bytes>,
    config: &OcrConfig,
) -> Result<ParseResult, OcrError> {
    let document = DocumentInput::new(file_name, bytes);
    if document.is_empty() {
        return Err(OcrError::MissingInput);
    }
    let submitter = resolve_submitter(config)?;
    parse_document(submitter.as_ref(), document, config).await
}

/// Submit `document` through `submitter` and normalise the response.
///
/// An empty document fails with [`OcrError::MissingInput`] before the
/// submitter is called. A response with zero pages is not an error: it
/// yields an empty [`ParseResult`].
pub async fn parse_document(
    submitter: &dyn DocumentSubmitter,
    document: DocumentInput,
    config: &OcrConfig,
) -> Result<ParseResult, OcrError> {
    if document.is_empty() {
        return Err(OcrError::MissingInput);
    }

    let noop = NoopProgressCallback;
    let progress: &dyn ParseProgressCallback = match config.progress_callback {
        Some(ref cb) => cb.as_ref(),
        None => &noop,
    };

    let start = Instant::now();
    progress.on_parse_start(&document.file_name, document.len());
    debug!(
        "Submitting '{}' ({} bytes) to {}",
        document.file_name,
        document.len(),
        submitter.name()
    );

    let ocr = match submitter.submit(&document, progress).await {
        Ok(ocr) => ocr,
        Err(e) => {
            warn!("Parse of '{}' failed: {}", document.file_name, e);
            progress.on_parse_error(&e.to_string());
            return Err(e);
        }
    };
    // Document bytes are no longer needed once the provider has them.
    drop(document);

    progress.on_stage_start(ParseStage::Normalize);
    let result = normalize::normalize_document(ocr);
    progress.on_stage_complete(ParseStage::Normalize);

    info!(
        "Parse complete: {} pages, {} images, {}ms",
        result.page_count(),
        result.image_count(),
        start.elapsed().as_millis()
    );
    progress.on_parse_complete(result.page_count(), result.image_count());

    Ok(result)
}

/// Parse a PDF and write the processed markdown to `output_path`.
///
/// Uses an atomic write (temp file in the same directory + rename) so a
/// failed run never leaves a partial file behind.
pub async fn parse_to_file(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &OcrConfig,
) -> Result<ParseResult, OcrError> {
    let result = parse(input_str, config).await?;
    write_atomic(output_path.as_ref(), result.text.as_bytes()).await?;
    Ok(result)
}

/// Synchronous wrapper around [`parse`].
///
/// Creates a temporary tokio runtime internally.
pub fn parse_sync(
    input_str: impl AsRef<str>,
    config: &OcrConfig,
) -> Result<ParseResult, OcrError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| OcrError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(parse(input_str, config))
}

/// Write `contents` to `path` atomically.
pub async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), OcrError> {
    let path = path.to_path_buf();
    let contents = contents.to_vec();

    tokio::task::spawn_blocking(move || -> Result<(), OcrError> {
        let write_err = |source| OcrError::OutputWriteFailed {
            path: path.clone(),
            source,
        };

        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => std::path::PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent).map_err(write_err)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&parent).map_err(write_err)?;
        std::io::Write::write_all(&mut tmp, &contents).map_err(write_err)?;
        tmp.persist(&path).map_err(|e| write_err(e.error))?;
        Ok(())
    })
    .await
    .map_err(|e| OcrError::Internal(format!("write task failed: {e}")))?
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Resolve the submitter, from most-specific to least-specific:
///
/// 1. **Injected provider** (`config.provider`), used as-is.
/// 2. **Mistral client** built from `config.api_key` or `MISTRAL_API_KEY`.
fn resolve_submitter(config: &OcrConfig) -> Result<Arc<dyn DocumentSubmitter>, OcrError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }
    Ok(Arc::new(MistralClient::from_config(config)?))
}
