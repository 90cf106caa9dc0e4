//! Inline image data → resolvable `data:` URL, and back.
//!
//! Mistral returns `image_base64` already wrapped as
//! `data:image/jpeg;base64,…` when asked for inline images, but bare base64
//! also appears (older models, other providers). Bare payloads are decoded
//! just far enough to sniff the format so the URL carries a real MIME type;
//! a browser refuses to render `data:;base64,` for most formats.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;

const FALLBACK_MIME: &str = "application/octet-stream";

/// Turn provider inline data into a URL a renderer can use directly.
pub fn to_data_url(inline: &str) -> String {
    let inline = inline.trim();
    if inline.starts_with("data:") {
        return inline.to_string();
    }

    let mime = sniff_mime(inline).unwrap_or(FALLBACK_MIME);
    debug!("Wrapping {} bytes of base64 as {}", inline.len(), mime);
    format!("data:{mime};base64,{inline}")
}

/// A decoded `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl DecodedImage {
    /// File extension for the MIME type, if it is one we recognise.
    pub fn extension(&self) -> Option<&'static str> {
        image::ImageFormat::from_mime_type(&self.mime_type)
            .and_then(|f| f.extensions_str().first().copied())
    }
}

/// Decode a base64 `data:` URL. Returns `None` for anything else.
pub fn decode_data_url(url: &str) -> Option<DecodedImage> {
    let rest = url.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mime_type = header.strip_suffix(";base64")?;
    let bytes = STANDARD.decode(payload.trim()).ok()?;

    let mime_type = if mime_type.is_empty() {
        FALLBACK_MIME.to_string()
    } else {
        mime_type.to_string()
    };
    Some(DecodedImage { mime_type, bytes })
}

fn sniff_mime(b64: &str) -> Option<&'static str> {
    // 64 base64 chars decode to 48 bytes: enough for every magic number
    // `image::guess_format` knows about.
    let head_len = b64.len().min(64) / 4 * 4;
    let head = STANDARD.decode(b64.get(..head_len)?).ok()?;
    let format = image::guess_format(&head).ok()?;
    Some(format.to_mime_type())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 12] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];

    #[test]
    fn data_url_passes_through() {
        let url = "data:image/jpeg;base64,/9j/4AAQ";
        assert_eq!(to_data_url(url), url);
    }

    #[test]
    fn bare_png_gets_mime_type() {
        let b64 = STANDARD.encode(PNG_MAGIC);
        let url = to_data_url(&b64);
        assert_eq!(url, format!("data:image/png;base64,{b64}"));
    }

    #[test]
    fn unknown_payload_falls_back_to_octet_stream() {
        let b64 = STANDARD.encode(b"not an image at all");
        assert!(to_data_url(&b64).starts_with("data:application/octet-stream;base64,"));
    }

    #[test]
    fn decode_round_trips_png() {
        let url = to_data_url(&STANDARD.encode(PNG_MAGIC));
        let decoded = decode_data_url(&url).expect("valid data url");
        assert_eq!(decoded.mime_type, "image/png");
        assert_eq!(decoded.bytes, PNG_MAGIC);
        assert_eq!(decoded.extension(), Some("png"));
    }

    #[test]
    fn decode_rejects_non_data_urls() {
        assert!(decode_data_url("https://example.com/a.png").is_none());
        assert!(decode_data_url("data:image/png,rawtext").is_none());
        assert!(decode_data_url("data:image/png;base64,***").is_none());
    }
}
