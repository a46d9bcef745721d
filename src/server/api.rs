//! HTTP API server implementation

use axum::{
    extract::{Multipart, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

use crate::core::config::AppConfig;
use crate::core::errors::TranslatorError;
use crate::core::models::{StorageEvent, Submission};
use crate::core::registry;
use crate::orchestrator::Orchestrator;

/// Application state
#[derive(Clone)]
pub struct AppState {
    /// Shared job orchestrator
    orchestrator: Arc<Orchestrator>,
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    /// Fixed "ok" marker
    status: String,
    /// Service name
    service: String,
    /// Crate version
    version: String,
}

/// Supported languages response
#[derive(Serialize)]
struct LanguagesResponse {
    /// Display name / code pairs
    languages: Vec<LanguageInfo>,
}

/// One supported language
#[derive(Serialize)]
struct LanguageInfo {
    /// Human-readable name shown in pickers
    name: String,
    /// Translation code
    code: String,
}

/// Batch flow response
#[derive(Serialize)]
struct BatchResponse {
    /// Pages translated across all targets
    total_pages: u64,
    /// Where the translated documents were written
    output_prefix: String,
}

/// Error response
#[derive(Serialize)]
pub struct ErrorResponse {
    /// Error payload
    pub error: ErrorDetail,
}

/// Error payload body
#[derive(Serialize)]
pub struct ErrorDetail {
    /// Human-readable message
    pub message: String,
    /// Machine-readable error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Error category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
}

/// HTTP status for a translator error
fn status_for(err: &TranslatorError) -> StatusCode {
    if err.is_validation() {
        return StatusCode::BAD_REQUEST;
    }
    match err {
        TranslatorError::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
        TranslatorError::RoutingConflict { .. } => StatusCode::CONFLICT,
        TranslatorError::ProviderUnavailable { .. } => StatusCode::BAD_GATEWAY,
        TranslatorError::InvalidLanguagePair { .. }
        | TranslatorError::UnsupportedDocumentFormat { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Machine-readable code for a translator error
fn code_for(err: &TranslatorError) -> &'static str {
    if err.is_validation() {
        return "validation_error";
    }
    match err {
        TranslatorError::Storage { .. } => "storage_error",
        TranslatorError::RoutingConflict { .. } => "routing_conflict",
        TranslatorError::Unauthenticated { .. } => "unauthenticated",
        _ => "translation_error",
    }
}

/// Map a translator error to the JSON error response
fn error_response(err: TranslatorError) -> (StatusCode, Json<ErrorResponse>) {
    warn!("Request failed: {}", err);
    (
        status_for(&err),
        Json(ErrorResponse {
            error: ErrorDetail {
                message: err.to_string(),
                code: Some(code_for(&err).to_string()),
                r#type: Some("api_error".to_string()),
            },
        }),
    )
}

/// Bad-request response for malformed multipart bodies
fn bad_request(message: String) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: ErrorDetail {
                message,
                code: Some("invalid_request".to_string()),
                r#type: Some("invalid_request_error".to_string()),
            },
        }),
    )
}

/// Health check handler
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "docs-translator".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Supported languages handler
async fn get_languages() -> Json<LanguagesResponse> {
    let languages = registry::supported_languages()
        .iter()
        .map(|(name, code)| LanguageInfo {
            name: (*name).to_string(),
            code: (*code).to_string(),
        })
        .collect();

    Json(LanguagesResponse { languages })
}

/// Interactive translation handler
///
/// Accepts a multipart form with `file`, `source_lang` and `target_lang`
/// fields and answers with the translated document as an attachment.
async fn translate(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let mut file_name = None;
    let mut bytes = None;
    let mut source_lang = None;
    let mut dest_lang = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("malformed multipart body: {}", e)))?
    {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("file") => {
                file_name = field.file_name().map(str::to_string);
                bytes = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| bad_request(format!("failed to read file field: {}", e)))?
                        .to_vec(),
                );
            }
            Some("source_lang") => {
                source_lang = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| bad_request(format!("failed to read source_lang: {}", e)))?,
                );
            }
            Some("target_lang") => {
                dest_lang = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| bad_request(format!("failed to read target_lang: {}", e)))?,
                );
            }
            _ => {}
        }
    }

    let submission = Submission {
        file_name: file_name.ok_or_else(|| bad_request("file field is required".to_string()))?,
        bytes: bytes.unwrap_or_default(),
        source_lang: source_lang
            .ok_or_else(|| bad_request("source_lang field is required".to_string()))?,
        dest_lang: dest_lang
            .ok_or_else(|| bad_request("target_lang field is required".to_string()))?,
    };

    let outcome = state
        .orchestrator
        .translate_submission(submission)
        .await
        .map_err(error_response)?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        outcome.result.file_name.replace('"', "")
    );
    let mut response = (
        [
            (header::CONTENT_TYPE, outcome.result.mime_type.clone()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        outcome.result.bytes,
    )
        .into_response();

    if let Some(warning) = outcome.cleanup_warning {
        if let Ok(value) = HeaderValue::from_str(&warning) {
            response.headers_mut().insert("x-cleanup-warning", value);
        }
    }

    Ok(response)
}

/// Storage event handler
///
/// Accepts an object-created notification and runs the batch flow; the
/// response reports the terminal state of the job.
async fn handle_event(
    State(state): State<Arc<AppState>>,
    Json(event): Json<StorageEvent>,
) -> Result<Json<BatchResponse>, (StatusCode, Json<ErrorResponse>)> {
    let outcome = state
        .orchestrator
        .handle_object_created(&event)
        .await
        .map_err(error_response)?;

    Ok(Json(BatchResponse {
        total_pages: outcome.total_pages,
        output_prefix: outcome.output_prefix,
    }))
}

/// Build the API router for an orchestrator
pub fn router(orchestrator: Arc<Orchestrator>) -> Router {
    let state = Arc::new(AppState { orchestrator });

    Router::new()
        .route("/", get(health_check))
        .route("/languages", get(get_languages))
        .route("/translate", post(translate))
        .route("/events", post(handle_event))
        .with_state(state)
}

/// Run the HTTP server
pub async fn run_server(host: String, port: u16) -> anyhow::Result<()> {
    // Create orchestrator
    let config = AppConfig::load()?;
    let orchestrator = Arc::new(Orchestrator::from_config(config)?);

    let app = router(orchestrator);

    // Bind address
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Starting server on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
