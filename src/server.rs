//! HTTP service: `POST /api/parse-pdf` and `GET /health`.
//!
//! The submitter is constructed once by the caller and shared through
//! [`AppState`]; handlers never reach for process-wide state. Each request
//! reads the uploaded file into memory, runs [`parse_document`] and returns
//! either the [`ParseResult`] or an [`ErrorResponse`].
//!
//! | Outcome | Status | Body |
//! |---------|--------|------|
//! | parsed | 200 | `ParseResult` |
//! | no `pdf` field, or an empty one | 400 | `{"error": "No PDF file provided"}` |
//! | not multipart, or an unreadable body | 400 | `{"error": "Failed to read upload", "details": …}` |
//! | provider failure | 500 | `{"error": "Failed to process PDF", "details": …}` |

use crate::config::OcrConfig;
use crate::document::DocumentInput;
use crate::error::OcrError;
use crate::output::ParseResult;
use crate::parse::parse_document;
use crate::pipeline::input::DEFAULT_FILE_NAME;
use crate::provider::DocumentSubmitter;
use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Multipart field names accepted for the document.
const FILE_FIELDS: [&str; 2] = ["pdf", "file"];

/// Default request body cap: 50 MB, the provider's upload limit.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Shared, immutable state for all requests.
#[derive(Clone)]
pub struct AppState {
    submitter: Arc<dyn DocumentSubmitter>,
    config: Arc<OcrConfig>,
}

impl AppState {
    pub fn new(submitter: Arc<dyn DocumentSubmitter>, config: OcrConfig) -> Self {
        Self {
            submitter,
            config: Arc::new(config),
        }
    }
}

/// Error body returned on every failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

/// Map a parse failure to its status and body.
fn error_response(e: &OcrError) -> (StatusCode, ErrorResponse) {
    if e.is_missing_input() {
        (StatusCode::BAD_REQUEST, ErrorResponse::new(e.to_string()))
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorResponse::with_details("Failed to process PDF", e.to_string()),
        )
    }
}

/// Build the application router.
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/parse-pdf",
            post(parse_pdf).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: SocketAddr, state: AppState, max_upload_bytes: usize) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state, max_upload_bytes)).await
}

async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

async fn parse_pdf(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let multipart = match multipart {
        Ok(m) => m,
        Err(rejection) => {
            tracing::error!("Rejected upload: {}", rejection.body_text());
            let body = ErrorResponse::with_details("Failed to read upload", rejection.body_text());
            return (rejection.status(), Json(body)).into_response();
        }
    };

    let document = match read_document(multipart).await {
        Ok(Some(doc)) => doc,
        Ok(None) => {
            let (status, body) = error_response(&OcrError::MissingInput);
            return (status, Json(body)).into_response();
        }
        Err(body) => return (StatusCode::BAD_REQUEST, Json(body)).into_response(),
    };

    tracing::info!(
        "Parsing upload '{}' ({} bytes)",
        document.file_name,
        document.len()
    );

    match parse_document(state.submitter.as_ref(), document, &state.config).await {
        Ok(result) => (StatusCode::OK, Json::<ParseResult>(result)).into_response(),
        Err(e) => {
            tracing::error!("Error processing PDF: {}", e);
            let (status, body) = error_response(&e);
            (status, Json(body)).into_response()
        }
    }
}

/// Pull the first non-empty document field out of the multipart body.
async fn read_document(mut multipart: Multipart) -> Result<Option<DocumentInput>, ErrorResponse> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Failed to read multipart field: {}", e);
        ErrorResponse::with_details("Failed to read upload", e.to_string())
    })? {
        let name = field.name().unwrap_or("").to_string();
        if !FILE_FIELDS.contains(&name.as_str()) {
            tracing::debug!("Ignoring multipart field '{}'", name);
            continue;
        }

        let file_name = field
            .file_name()
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_FILE_NAME)
            .to_string();
        let data = field.bytes().await.map_err(|e| {
            tracing::error!("Failed to read file data: {}", e);
            ErrorResponse::with_details("Failed to read upload", e.to_string())
        })?;

        if data.is_empty() {
            continue;
        }
        return Ok(Some(DocumentInput::new(file_name, data)));
    }

    Ok(None)
}
