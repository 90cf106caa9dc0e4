//! Configuration types for OCR parsing.
//!
//! All parsing behaviour is controlled through [`OcrConfig`], built via its
//! [`OcrConfigBuilder`]. The provider client is never a process-wide global:
//! either inject one with [`OcrConfigBuilder::provider`] or let
//! [`crate::parse::parse`] build a [`crate::provider::MistralClient`] from
//! `api_key` (falling back to `MISTRAL_API_KEY`).

use crate::error::OcrError;
use crate::progress::ProgressCallback;
use crate::provider::DocumentSubmitter;
use std::fmt;
use std::sync::Arc;

/// Default Mistral API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.mistral.ai";

/// Default OCR model.
pub const DEFAULT_MODEL: &str = "mistral-ocr-latest";

/// Environment variable holding the Mistral API key.
pub const API_KEY_ENV: &str = "MISTRAL_API_KEY";

/// Configuration for a parse request.
///
/// # Example
/// ```rust
/// use pdf_ocr_parser::OcrConfig;
///
/// let config = OcrConfig::builder()
///     .model("mistral-ocr-latest")
///     .image_limit(20)
///     .build()
///     .unwrap();
/// assert_eq!(config.image_limit, Some(20));
/// ```
#[derive(Clone)]
pub struct OcrConfig {
    /// Mistral API key. If None, `MISTRAL_API_KEY` is read at parse time.
    pub api_key: Option<String>,

    /// API base URL, without a trailing slash. Default: [`DEFAULT_BASE_URL`].
    pub base_url: String,

    /// OCR model identifier. Default: [`DEFAULT_MODEL`].
    pub model: String,

    /// Ask the provider to return inline base64 image data. Default: true.
    ///
    /// Without it there is nothing to point placeholders at; they are left
    /// untouched and every image `url` is empty.
    pub include_image_base64: bool,

    /// Maximum number of images the provider extracts. Default: 50.
    pub image_limit: Option<u32>,

    /// Minimum image side, in pixels, for extraction. Default: 100.
    pub image_min_size: Option<u32>,

    /// Lifetime of the signed document URL, in hours. Default: 24.
    pub signed_url_expiry_hours: u32,

    /// Timeout for each provider HTTP call, in seconds. Default: 120.
    pub request_timeout_secs: u64,

    /// Download timeout for URL inputs, in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Delete the uploaded file from the provider after OCR. Default: false.
    ///
    /// Best effort: a failed delete is logged and does not fail the request.
    pub delete_uploaded_file: bool,

    /// Pre-constructed submitter. Takes precedence over `api_key`.
    pub provider: Option<Arc<dyn DocumentSubmitter>>,

    /// Optional progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            include_image_base64: true,
            image_limit: Some(50),
            image_min_size: Some(100),
            signed_url_expiry_hours: 24,
            request_timeout_secs: 120,
            download_timeout_secs: 120,
            delete_uploaded_file: false,
            provider: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for OcrConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OcrConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("include_image_base64", &self.include_image_base64)
            .field("image_limit", &self.image_limit)
            .field("image_min_size", &self.image_min_size)
            .field("signed_url_expiry_hours", &self.signed_url_expiry_hours)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("delete_uploaded_file", &self.delete_uploaded_file)
            .field(
                "provider",
                &self.provider.as_ref().map(|p| p.name().to_string()),
            )
            .finish()
    }
}

impl OcrConfig {
    /// Create a new builder for `OcrConfig`.
    pub fn builder() -> OcrConfigBuilder {
        OcrConfigBuilder {
            config: Self::default(),
        }
    }

    /// The API key from the config, else from `MISTRAL_API_KEY`.
    pub fn resolve_api_key(&self) -> Option<String> {
        let non_blank = |k: &String| !k.trim().is_empty();
        self.api_key
            .clone()
            .filter(non_blank)
            .or_else(|| std::env::var(API_KEY_ENV).ok().filter(non_blank))
    }
}

/// Builder for [`OcrConfig`].
pub struct OcrConfigBuilder {
    config: OcrConfig,
}

impl OcrConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn include_image_base64(mut self, v: bool) -> Self {
        self.config.include_image_base64 = v;
        self
    }

    pub fn image_limit(mut self, n: u32) -> Self {
        self.config.image_limit = Some(n);
        self
    }

    pub fn no_image_limit(mut self) -> Self {
        self.config.image_limit = None;
        self
    }

    pub fn image_min_size(mut self, px: u32) -> Self {
        self.config.image_min_size = Some(px);
        self
    }

    pub fn signed_url_expiry_hours(mut self, hours: u32) -> Self {
        self.config.signed_url_expiry_hours = hours;
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn delete_uploaded_file(mut self, v: bool) -> Self {
        self.config.delete_uploaded_file = v;
        self
    }

    pub fn provider(mut self, provider: Arc<dyn DocumentSubmitter>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<OcrConfig, OcrError> {
        let c = &self.config;
        if !(c.base_url.starts_with("http://") || c.base_url.starts_with("https://")) {
            return Err(OcrError::InvalidConfig(format!(
                "base URL must be http(s), got '{}'",
                c.base_url
            )));
        }
        if c.model.trim().is_empty() {
            return Err(OcrError::InvalidConfig("model must not be empty".into()));
        }
        if c.request_timeout_secs == 0 || c.download_timeout_secs == 0 {
            return Err(OcrError::InvalidConfig(
                "timeouts must be at least 1 second".into(),
            ));
        }
        if c.signed_url_expiry_hours == 0 {
            return Err(OcrError::InvalidConfig(
                "signed URL expiry must be at least 1 hour".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_provider_recommendations() {
        let c = OcrConfig::default();
        assert_eq!(c.model, "mistral-ocr-latest");
        assert_eq!(c.base_url, "https://api.mistral.ai");
        assert!(c.include_image_base64);
        assert_eq!(c.image_limit, Some(50));
        assert_eq!(c.image_min_size, Some(100));
        assert!(!c.delete_uploaded_file);
    }

    #[test]
    fn builder_trims_trailing_slash() {
        let c = OcrConfig::builder()
            .base_url("http://localhost:9000/")
            .build()
            .unwrap();
        assert_eq!(c.base_url, "http://localhost:9000");
    }

    #[test]
    fn builder_rejects_bad_base_url() {
        let err = OcrConfig::builder().base_url("ftp://x").build().unwrap_err();
        assert!(matches!(err, OcrError::InvalidConfig(_)));
    }

    #[test]
    fn builder_rejects_zero_timeout() {
        assert!(OcrConfig::builder().request_timeout_secs(0).build().is_err());
        assert!(OcrConfig::builder().model("  ").build().is_err());
    }

    #[test]
    fn debug_redacts_api_key() {
        let c = OcrConfig::builder().api_key("sk-secret").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("sk-secret"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn explicit_api_key_wins() {
        let c = OcrConfig::builder().api_key("from-config").build().unwrap();
        assert_eq!(c.resolve_api_key().as_deref(), Some("from-config"));
    }
}
