//! HTTP surface for plagscan.
//!
//! This module exposes a compact Axum router:
//!
//! - `POST /check_plagiarism/` – Multipart upload of a single `.pdf` or `.docx` file. Returns
//!   `{ plagiarism_percent, plagiarism_matches: [{ source, similarity, snippet }], summary }`.
//!   Documents without readable text yield `400 {"error": "File has no readable text"}`; every
//!   other failure yields `500 {"error": <message>}`. Malformed uploads keep axum's status
//!   (`400`, or `413` past the body limit).
//! - `GET /metrics` – Counters for completed checks, searched chunks, and matches.
//! - `GET /commands` – Machine-readable command catalog for quick discovery by tools.

use crate::extraction::Document;
use crate::metrics::MetricsSnapshot;
use crate::processing::{CheckError, PlagiarismApi, PlagiarismReport};
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartError},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

/// Multipart field conventionally carrying the uploaded document.
pub const FILE_FIELD: &str = "file";

/// Build the HTTP router exposing the plagiarism API surface.
pub fn create_router<S>(service: Arc<S>, max_upload_bytes: usize) -> Router
where
    S: PlagiarismApi + 'static,
{
    Router::new()
        .route("/check_plagiarism/", post(check_plagiarism::<S>))
        .route("/check_plagiarism", post(check_plagiarism::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .route("/commands", get(get_commands))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(service)
}

/// Check an uploaded document for plagiarism.
///
/// The first multipart field named `file`, or failing that the first field carrying a filename,
/// is treated as the document. Remaining fields are ignored.
async fn check_plagiarism<S>(
    State(service): State<Arc<S>>,
    multipart: Multipart,
) -> Result<Json<PlagiarismReport>, AppError>
where
    S: PlagiarismApi,
{
    let document = read_document(multipart).await?;
    let span = tracing::info_span!(
        "check",
        request_id = %Uuid::new_v4(),
        filename = %document.filename,
        bytes = document.bytes.len(),
    );

    async move {
        tracing::info!("Plagiarism check requested");
        match service.check_document(document).await {
            Ok(report) => Ok(Json(report)),
            Err(error) => {
                tracing::warn!(error = %error, "Plagiarism check failed");
                Err(AppError::Check(error))
            }
        }
    }
    .instrument(span)
    .await
}

async fn read_document(mut multipart: Multipart) -> Result<Document, AppError> {
    while let Some(field) = multipart.next_field().await? {
        let is_file_field = field.name() == Some(FILE_FIELD);
        if !is_file_field && field.file_name().is_none() {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        return Ok(Document::new(filename, bytes.to_vec()));
    }
    Err(AppError::BadRequest(format!(
        "Missing multipart field '{FILE_FIELD}'"
    )))
}

/// Return a snapshot of check counters.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<MetricsSnapshot>
where
    S: PlagiarismApi,
{
    Json(service.metrics_snapshot())
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_type: Option<&'static str>,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

/// Enumerate supported HTTP commands for discovery by hosts and tools.
async fn get_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor {
                name: "check_plagiarism",
                method: "POST",
                path: "/check_plagiarism/",
                description: "Upload a PDF or DOCX as the 'file' field. Response returns { \"plagiarism_percent\": number, \"plagiarism_matches\": [{ \"source\", \"similarity\", \"snippet\" }], \"summary\": string }.",
                content_type: Some("multipart/form-data"),
            },
            CommandDescriptor {
                name: "metrics",
                method: "GET",
                path: "/metrics",
                description: "Return counters for completed checks, searched chunks, and matches.",
                content_type: None,
            },
        ],
    })
}

enum AppError {
    Check(CheckError),
    BadRequest(String),
    Upload(MultipartError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Check(error) if error.is_client_error() => {
                (StatusCode::BAD_REQUEST, error.to_string())
            }
            Self::Check(error) => (StatusCode::INTERNAL_SERVER_ERROR, error.to_string()),
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            // Oversized bodies report 413; malformed multipart reports 400.
            Self::Upload(error) => (error.status(), error.body_text()),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<MultipartError> for AppError {
    fn from(error: MultipartError) -> Self {
        Self::Upload(error)
    }
}
