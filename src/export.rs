//! Export helpers: results file naming, human-readable sizes, and writing
//! extracted images to disk.

use crate::error::OcrError;
use crate::output::ParseResult;
use crate::pipeline::encode::decode_data_url;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name for a downloaded JSON result: `report.pdf` → `report_results.json`.
pub fn results_file_name(original: &str) -> String {
    let stem = original.strip_suffix(".pdf").unwrap_or(original);
    if stem.is_empty() {
        "parsed_results.json".to_string()
    } else {
        format!("{stem}_results.json")
    }
}

/// Format a byte count with 1024-based units, e.g. `1.5 KB`.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    // Two decimals, trailing zeros dropped: 1.50 → 1.5, 2.00 → 2.
    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}

/// Decode every image's data URL and write it into `dir`.
///
/// Files are named after the image id; an extension is added from the MIME
/// type when the id has none. Images without decodable data are skipped with
/// a warning. Returns the written paths in result order.
pub async fn export_images(result: &ParseResult, dir: &Path) -> Result<Vec<PathBuf>, OcrError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| OcrError::OutputWriteFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;

    let mut written = Vec::with_capacity(result.images.len());
    for image in &result.images {
        let Some(decoded) = decode_data_url(&image.url) else {
            warn!("Image '{}' has no decodable data, skipping", image.id);
            continue;
        };

        let mut name = sanitize_file_name(&image.id);
        if Path::new(&name).extension().is_none() {
            if let Some(ext) = decoded.extension() {
                name = format!("{name}.{ext}");
            }
        }

        let path = dir.join(name);
        tokio::fs::write(&path, &decoded.bytes)
            .await
            .map_err(|e| OcrError::OutputWriteFailed {
                path: path.clone(),
                source: e,
            })?;
        debug!("Wrote {} ({} bytes)", path.display(), decoded.bytes.len());
        written.push(path);
    }

    Ok(written)
}

/// Keep ids from escaping the target directory.
fn sanitize_file_name(id: &str) -> String {
    let cleaned: String = id
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::NormalizedImage;
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    #[test]
    fn results_file_name_strips_pdf_suffix() {
        assert_eq!(results_file_name("report.pdf"), "report_results.json");
        assert_eq!(results_file_name("scan"), "scan_results.json");
        assert_eq!(results_file_name(""), "parsed_results.json");
    }

    #[test]
    fn format_bytes_units() {
        assert_eq!(format_bytes(0), "0 Bytes");
        assert_eq!(format_bytes(512), "512 Bytes");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1024 * 1024), "1 MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3 GB");
    }

    #[test]
    fn sanitize_blocks_traversal() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "_.._etc_passwd");
        assert_eq!(sanitize_file_name("img-0.jpeg"), "img-0.jpeg");
        assert_eq!(sanitize_file_name(".."), "image");
    }

    #[tokio::test]
    async fn export_writes_decodable_images() {
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        let result = ParseResult {
            images: vec![
                NormalizedImage {
                    id: "img-0".into(),
                    url: format!("data:image/png;base64,{}", STANDARD.encode(png)),
                    ..Default::default()
                },
                NormalizedImage {
                    id: "img-1.jpeg".into(),
                    url: format!("data:image/jpeg;base64,{}", STANDARD.encode([1, 2, 3])),
                    ..Default::default()
                },
                NormalizedImage {
                    id: "no-data".into(),
                    url: String::new(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        let dir = tempfile::tempdir().unwrap();
        let written = export_images(&result, dir.path()).await.unwrap();

        assert_eq!(
            written,
            vec![dir.path().join("img-0.png"), dir.path().join("img-1.jpeg")]
        );
        assert_eq!(std::fs::read(&written[0]).unwrap(), png);
        assert_eq!(std::fs::read(&written[1]).unwrap(), [1, 2, 3]);
    }
}
