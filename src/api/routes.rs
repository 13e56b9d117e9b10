use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::health::HealthState;
use crate::api::latency::{LatencySnapshot, UploadLatency};
use crate::api::templates;
use crate::config::{EXPORT_FILE_NAME, SESSION_COOKIE};
use crate::error::{AppError, Result};
use crate::model::Classifier;
use crate::pipeline::{process_upload, Report};
use crate::state::SessionStore;

#[derive(Clone)]
pub struct ApiState {
    pub model: Arc<dyn Classifier>,
    pub sessions: Arc<SessionStore>,
    pub health: Arc<HealthState>,
    pub latency: Arc<UploadLatency>,
    pub inference_timeout: Duration,
    pub max_upload_bytes: usize,
}

pub fn router(state: ApiState) -> Router {
    let body_limit = state.max_upload_bytes;
    Router::new()
        .route("/", get(index))
        .route("/upload", post(upload))
        .route("/download", get(download))
        .route("/health", get(get_health))
        .route("/stats/latency", get(get_stats_latency))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model: String,
    pub model_version: String,
    pub uploads_processed: u64,
    pub uploads_rejected: u64,
    pub rows_scored: u64,
    pub last_upload_at_ns: u64,
    pub active_sessions: usize,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn index() -> Html<String> {
    Html(templates::awaiting_page())
}

/// Runs the whole pipeline for one uploaded file and renders the outcome.
/// Errors become an error banner on the page; the process keeps serving.
async fn upload(State(state): State<ApiState>, headers: HeaderMap, multipart: Multipart) -> Response {
    let (session_id, new_session) = match session_from_headers(&headers) {
        Some(id) => (id, false),
        None => (Uuid::new_v4().to_string(), true),
    };

    let mut response = match handle_upload(&state, &session_id, multipart).await {
        Ok(report) => Html(templates::results_page(&report)).into_response(),
        Err(e) => (e.status(), Html(templates::error_page(&e))).into_response(),
    };

    if new_session {
        let cookie = format!("{SESSION_COOKIE}={session_id}; Path=/; HttpOnly; SameSite=Lax");
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
    }
    response
}

async fn handle_upload(
    state: &ApiState,
    session_id: &str,
    mut multipart: Multipart,
) -> Result<Arc<Report>> {
    let ticket = state.sessions.begin(session_id);
    let outcome = match read_file_field(&mut multipart).await {
        Ok(bytes) => score_upload(state, bytes).await,
        Err(e) => Err(e),
    }
    .and_then(|report| {
        let report = Arc::new(report);
        if state.sessions.replace(session_id, ticket, Arc::clone(&report)) {
            Ok(report)
        } else {
            Err(AppError::Superseded)
        }
    });

    match outcome {
        Ok(report) => {
            state.health.record_processed(report.table.len());
            Ok(report)
        }
        Err(e) => {
            state.sessions.clear(session_id, ticket);
            state.health.record_rejected();
            warn!(session = %session_id, ticket, error = %e, "Upload rejected");
            Err(e)
        }
    }
}

/// Pipeline on the blocking pool, bounded by the configured timeout.
async fn score_upload(state: &ApiState, bytes: Bytes) -> Result<Report> {
    let started = Instant::now();
    let model = Arc::clone(&state.model);
    let task = tokio::task::spawn_blocking(move || process_upload(&bytes, model.as_ref()));

    let result = match tokio::time::timeout(state.inference_timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(AppError::Inference(format!("scoring task failed: {join_err}"))),
        Err(_) => Err(AppError::InferenceTimeout(state.inference_timeout)),
    };

    let elapsed = started.elapsed();
    if let Ok(report) = &result {
        state.latency.record(elapsed, report.table.len());
        info!(elapsed_ms = elapsed.as_millis() as u64, "Upload processed");
    }
    result
}

async fn read_file_field(multipart: &mut Multipart) -> Result<Bytes> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Upload(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload.csv").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Upload(e.to_string()))?;
        info!(file = %file_name, bytes = data.len(), "Received upload");
        return Ok(data);
    }
    Err(AppError::Upload("the form has no file field".to_string()))
}

async fn download(State(state): State<ApiState>, headers: HeaderMap) -> Result<Response> {
    let session_id = session_from_headers(&headers).ok_or(AppError::SessionNotFound)?;
    let report = state
        .sessions
        .get(&session_id)
        .ok_or(AppError::SessionNotFound)?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
            ),
        ],
        report.export.clone(),
    )
        .into_response())
}

async fn get_health(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        model: state.model.name().to_string(),
        model_version: state.model.version().to_string(),
        uploads_processed: state.health.uploads_processed(),
        uploads_rejected: state.health.uploads_rejected(),
        rows_scored: state.health.rows_scored(),
        last_upload_at_ns: state.health.last_upload_at_ns(),
        active_sessions: state.sessions.len(),
    })
}

async fn get_stats_latency(State(state): State<ApiState>) -> Json<LatencySnapshot> {
    Json(state.latency.snapshot())
}

/// Session id from the `Cookie` header, if it is a well-formed UUID.
fn session_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value).ok())
        .map(|id| id.to_string())
}
