//! Mistral OCR client.
//!
//! One document takes three sequential calls, each needing the previous
//! call's output:
//!
//! ```text
//! POST /v1/files (multipart, purpose=ocr) ──▶ file id
//! GET  /v1/files/{id}/url?expiry=H        ──▶ signed URL
//! POST /v1/ocr   {document_url, …}        ──▶ pages
//! ```
//!
//! Optionally a fourth, `DELETE /v1/files/{id}`, removes the upload
//! afterwards. Every non-2xx status or transport error becomes
//! [`OcrError::Upstream`] tagged with its stage; nothing is retried.

use crate::config::OcrConfig;
use crate::document::{DocumentInput, OcrDocument};
use crate::error::{OcrError, SubmitStage};
use crate::progress::{ParseProgressCallback, ParseStage};
use crate::provider::DocumentSubmitter;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Error bodies are cut to this many characters in diagnostics.
const MAX_ERROR_BODY: usize = 500;

/// HTTP client for the Mistral files + OCR endpoints.
pub struct MistralClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    include_image_base64: bool,
    image_limit: Option<u32>,
    image_min_size: Option<u32>,
    signed_url_expiry_hours: u32,
    delete_uploaded_file: bool,
}

impl std::fmt::Debug for MistralClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MistralClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct UploadedFile {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SignedUrl {
    url: String,
}

#[derive(Debug, Serialize)]
struct OcrRequest<'a> {
    model: &'a str,
    document: DocumentUrlChunk<'a>,
    include_image_base64: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_min_size: Option<u32>,
}

#[derive(Debug, Serialize)]
struct DocumentUrlChunk<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    document_url: &'a str,
    document_name: &'a str,
}

impl MistralClient {
    /// Build a client with an explicit API key and the request settings
    /// from `config`.
    pub fn new(api_key: impl Into<String>, config: &OcrConfig) -> Result<Self, OcrError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("pdf-ocr-parser/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| OcrError::upstream(SubmitStage::Connect, e.to_string()))?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            include_image_base64: config.include_image_base64,
            image_limit: config.image_limit,
            image_min_size: config.image_min_size,
            signed_url_expiry_hours: config.signed_url_expiry_hours,
            delete_uploaded_file: config.delete_uploaded_file,
        })
    }

    /// Build a client from `config.api_key`, else `MISTRAL_API_KEY`.
    pub fn from_config(config: &OcrConfig) -> Result<Self, OcrError> {
        let api_key = config
            .resolve_api_key()
            .ok_or_else(|| OcrError::ProviderNotConfigured {
                hint: format!(
                    "Set {} or pass --api-key.",
                    crate::config::API_KEY_ENV
                ),
            })?;
        Self::new(api_key, config)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Upload the document; returns the provider's file id.
    pub async fn upload(&self, document: &DocumentInput) -> Result<String, OcrError> {
        let stage = SubmitStage::Upload;
        // `Bytes::clone` bumps a refcount; the document is not copied.
        let part = Part::stream_with_length(document.bytes.clone(), document.len() as u64)
            .file_name(document.file_name.clone())
            .mime_str("application/pdf")
            .map_err(|e| OcrError::upstream(stage, e.to_string()))?;
        let form = Form::new().text("purpose", "ocr").part("file", part);

        let response = self
            .http
            .post(format!("{}/v1/files", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| OcrError::upstream(stage, e.to_string()))?;

        let uploaded: UploadedFile = read_json(response, stage).await?;
        debug!("Uploaded '{}' as file {}", document.file_name, uploaded.id);
        Ok(uploaded.id)
    }

    /// Request a signed URL for an uploaded file.
    pub async fn signed_url(&self, file_id: &str) -> Result<String, OcrError> {
        let stage = SubmitStage::SignedUrl;
        let response = self
            .http
            .get(format!("{}/v1/files/{}/url", self.base_url, file_id))
            .query(&[("expiry", self.signed_url_expiry_hours)])
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| OcrError::upstream(stage, e.to_string()))?;

        let signed: SignedUrl = read_json(response, stage).await?;
        Ok(signed.url)
    }

    /// Run OCR over a document URL.
    pub async fn process(
        &self,
        document_url: &str,
        document_name: &str,
    ) -> Result<OcrDocument, OcrError> {
        let stage = SubmitStage::Ocr;
        let body = OcrRequest {
            model: &self.model,
            document: DocumentUrlChunk {
                kind: "document_url",
                document_url,
                document_name,
            },
            include_image_base64: self.include_image_base64,
            image_limit: self.image_limit,
            image_min_size: self.image_min_size,
        };

        let response = self
            .http
            .post(format!("{}/v1/ocr", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| OcrError::upstream(stage, e.to_string()))?;

        read_json(response, stage).await
    }

    /// Delete an uploaded file. Failures are logged, never returned.
    pub async fn delete_file(&self, file_id: &str) {
        let result = self
            .http
            .delete(format!("{}/v1/files/{}", self.base_url, file_id))
            .bearer_auth(&self.api_key)
            .send()
            .await;

        match result {
            Ok(r) if r.status().is_success() => debug!("Deleted uploaded file {}", file_id),
            Ok(r) => warn!("Could not delete uploaded file {}: HTTP {}", file_id, r.status()),
            Err(e) => warn!("Could not delete uploaded file {}: {}", file_id, e),
        }
    }
}

#[async_trait]
impl DocumentSubmitter for MistralClient {
    fn name(&self) -> &str {
        "mistral"
    }

    async fn submit(
        &self,
        document: &DocumentInput,
        progress: &dyn ParseProgressCallback,
    ) -> Result<OcrDocument, OcrError> {
        let start = Instant::now();

        progress.on_stage_start(ParseStage::Upload);
        let file_id = self.upload(document).await?;
        progress.on_stage_complete(ParseStage::Upload);

        let result = async {
            progress.on_stage_start(ParseStage::SignedUrl);
            let url = self.signed_url(&file_id).await?;
            progress.on_stage_complete(ParseStage::SignedUrl);

            progress.on_stage_start(ParseStage::Ocr);
            let ocr = self.process(&url, &document.file_name).await?;
            progress.on_stage_complete(ParseStage::Ocr);
            Ok::<_, OcrError>(ocr)
        }
        .await;

        if self.delete_uploaded_file {
            self.delete_file(&file_id).await;
        }

        if let Ok(ref ocr) = result {
            info!(
                "OCR of '{}' returned {} pages in {}ms",
                document.file_name,
                ocr.pages.len(),
                start.elapsed().as_millis()
            );
        }
        result
    }
}

/// Fail on a non-2xx status, otherwise deserialise the body.
async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    stage: SubmitStage,
) -> Result<T, OcrError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(OcrError::upstream(
            stage,
            format!("HTTP {}: {}", status, truncate(body.trim(), MAX_ERROR_BODY)),
        ));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| OcrError::upstream(stage, format!("invalid response body: {e}")))
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}\u{2026}", &s[..cut]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ocr_request_serialises_document_url_chunk() {
        let body = OcrRequest {
            model: "mistral-ocr-latest",
            document: DocumentUrlChunk {
                kind: "document_url",
                document_url: "https://signed",
                document_name: "a.pdf",
            },
            include_image_base64: true,
            image_limit: Some(50),
            image_min_size: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["document"]["type"], "document_url");
        assert_eq!(json["document"]["document_url"], "https://signed");
        assert_eq!(json["image_limit"], 50);
        assert!(json.get("image_min_size").is_none());
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("ééééé", 2), "éé\u{2026}");
    }

    #[test]
    fn from_config_without_key_is_not_configured() {
        let config = OcrConfig {
            api_key: Some("   ".into()),
            ..OcrConfig::default()
        };
        // A blank explicit key falls through to the environment; only assert
        // the error shape when the environment has no key either.
        if std::env::var(crate::config::API_KEY_ENV).is_err() {
            let err = MistralClient::from_config(&config).unwrap_err();
            assert!(matches!(err, OcrError::ProviderNotConfigured { .. }));
        }
    }

    #[test]
    fn new_trims_base_url() {
        let config = OcrConfig {
            base_url: "http://127.0.0.1:1/".into(),
            ..OcrConfig::default()
        };
        let client = MistralClient::new("k", &config).unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:1");
        assert_eq!(client.model(), "mistral-ocr-latest");
    }
}
