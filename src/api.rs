//! HTTP surface for Rusty Students.
//!
//! This module exposes a compact Axum router over the student store:
//!
//! - `POST /students` – Create a student from `{ name, age, email }`; any `id` is ignored.
//!   Returns `201` with the stored record or `400` with a list of field errors.
//! - `GET /students` – List every stored student.
//! - `GET /students/{id}` – Fetch one student (`404` when absent).
//! - `PUT /students/{id}` – Replace every field of a student; the path id always wins.
//! - `DELETE /students/{id}` – Remove a student (`204` on success).
//! - `GET /students/{id}/summary` – Ask the text-generation service for a short profile.
//!
//! Bodies are decoded from raw bytes, so clients need not send a `Content-Type` header. Anything
//! that fails to decode is rejected with `400 Invalid request body` before the store is touched.

use crate::store::{StoreError, StudentStore};
use crate::student::{Student, StudentInput, ValidationError};
use crate::summary::{self, StudentSummary, SummaryClient, SummaryError};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use std::sync::Arc;

/// Shared handles injected into every handler.
#[derive(Clone)]
pub struct AppState {
    /// Record store shared by all requests.
    pub store: Arc<StudentStore>,
    /// Backend used by the summary endpoint.
    pub summarizer: Arc<dyn SummaryClient>,
}

impl AppState {
    /// Bundle a store and a summary backend.
    pub fn new(store: Arc<StudentStore>, summarizer: Arc<dyn SummaryClient>) -> Self {
        Self { store, summarizer }
    }
}

/// Build the HTTP router exposing the student API surface.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/students", get(list_students).post(create_student))
        .route(
            "/students/:id",
            get(get_student).put(update_student).delete(delete_student),
        )
        .route("/students/:id/summary", get(get_summary))
        .with_state(state)
}

/// Create a student and assign it the next identifier.
async fn create_student(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Student>), ApiError> {
    let candidate = decode_body(&body)?;
    let student = state.store.create(candidate).await?;
    tracing::info!(id = student.id, "Created student");
    Ok((StatusCode::CREATED, Json(student)))
}

/// Return a snapshot of every stored student.
async fn list_students(State(state): State<AppState>) -> Json<Vec<Student>> {
    let students = state.store.list().await;
    tracing::debug!(count = students.len(), "Listed students");
    Json(students)
}

async fn get_student(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Student>, ApiError> {
    let id = parse_id(&raw_id)?;
    Ok(Json(state.store.get(id).await?))
}

/// Replace a student's fields, keeping the identifier from the path.
///
/// The body is validated before the id is looked up, so an invalid body for a missing student
/// reports validation errors rather than `404`.
async fn update_student(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> Result<Json<Student>, ApiError> {
    let candidate = decode_body(&body)?;
    let id = raw_id.parse().unwrap_or(UNISSUED_ID);
    let student = state.store.update(id, candidate).await?;
    tracing::info!(id, "Updated student");
    Ok(Json(student))
}

async fn delete_student(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&raw_id)?;
    state.store.delete(id).await?;
    tracing::info!(id, "Deleted student");
    Ok(StatusCode::NO_CONTENT)
}

/// Generate a natural-language summary for an existing student.
///
/// The store lookup completes (and its read lock is released) before the outbound call, so a
/// slow provider only stalls this request.
async fn get_summary(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<StudentSummary>, ApiError> {
    let id = parse_id(&raw_id)?;
    let student = state.store.get(id).await?;
    let summary = summary::summarize(state.summarizer.as_ref(), &student)
        .await
        .inspect_err(|error| tracing::warn!(id, %error, "Summary generation failed"))?;
    tracing::info!(id, "Generated student summary");
    Ok(Json(summary))
}

fn decode_body(body: &[u8]) -> Result<StudentInput, ApiError> {
    serde_json::from_slice(body).map_err(|error| {
        tracing::debug!(%error, "Rejected malformed request body");
        ApiError::MalformedBody
    })
}

/// Stand-in for path ids that do not parse; the store starts numbering at 1.
const UNISSUED_ID: u64 = 0;

/// Ids that are not positive integers can never have been issued.
fn parse_id(raw: &str) -> Result<u64, ApiError> {
    raw.parse().map_err(|_| ApiError::NotFound)
}

/// Errors translated into HTTP responses at the handler boundary.
#[derive(Debug)]
enum ApiError {
    MalformedBody,
    Validation(Vec<ValidationError>),
    NotFound,
    Summary(SummaryError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::MalformedBody => {
                (StatusCode::BAD_REQUEST, "Invalid request body").into_response()
            }
            Self::Validation(errors) => (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
            Self::NotFound => (StatusCode::NOT_FOUND, "Student not found").into_response(),
            Self::Summary(error) => {
                let (status, message) = match error {
                    SummaryError::Unavailable(_) => (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "Failed to connect to Ollama API",
                    ),
                    SummaryError::TimedOut(_) => {
                        (StatusCode::GATEWAY_TIMEOUT, "Ollama API timed out")
                    }
                    SummaryError::Upstream { .. } => {
                        (StatusCode::BAD_GATEWAY, "Ollama API returned an error")
                    }
                    SummaryError::InvalidResponse(_) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Failed to parse Ollama response",
                    ),
                };
                (status, message).into_response()
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(inner: StoreError) -> Self {
        match inner {
            StoreError::Validation(errors) => Self::Validation(errors),
            StoreError::NotFound(_) => Self::NotFound,
        }
    }
}

impl From<SummaryError> for ApiError {
    fn from(inner: SummaryError) -> Self {
        Self::Summary(inner)
    }
}
