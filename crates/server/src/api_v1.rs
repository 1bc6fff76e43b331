//! HTTP API v1 — session endpoints.
//!
//! Endpoints:
//!
//! - `POST   /v1/sessions`                — Create a session
//! - `GET    /v1/sessions`                — List sessions
//! - `GET    /v1/sessions/{id}`           — Session transcript and document
//! - `DELETE /v1/sessions/{id}`           — End a session
//! - `POST   /v1/sessions/{id}/messages`  — Send a message, get the transcript
//! - `PUT    /v1/sessions/{id}/document`  — Upload the reference document
//! - `DELETE /v1/sessions/{id}/document`  — Forget the reference document
//! - `GET    /v1/sessions/{id}/context`   — The request the next turn would send
//! - `GET    /v1/status`                  — Runtime status
//!
//! Message and upload responses always carry the session snapshot. When
//! the action fails the snapshot includes an `error` notice and the status
//! code reflects the failure.

use axum::{
    Router,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use docchat_core::document::SourceKind;
use docchat_core::error::SessionError;
use docchat_core::gateway::ChatMessage;
use docchat_core::message::SessionId;
use docchat_session::{NoticeKind, SessionSnapshot, SessionSummary};

use crate::SharedState;

/// Optional header naming the uploaded file.
pub const FILENAME_HEADER: &str = "x-filename";

// ── Router ────────────────────────────────────────────────────────────────

/// Build the v1 API router. Nest this under "/v1" in the main router.
pub fn v1_router(state: SharedState) -> Router {
    Router::new()
        .route(
            "/sessions",
            post(create_session_handler).get(list_sessions_handler),
        )
        .route(
            "/sessions/{id}",
            get(get_session_handler).delete(delete_session_handler),
        )
        .route("/sessions/{id}/messages", post(send_message_handler))
        .route(
            "/sessions/{id}/document",
            put(upload_document_handler).delete(clear_document_handler),
        )
        .route("/sessions/{id}/context", get(context_handler))
        .route("/status", get(status_handler))
        .with_state(state)
}

// ── Request / Response types ──────────────────────────────────────────────

#[derive(Deserialize)]
struct MessageRequest {
    message: String,
}

#[derive(Serialize, Deserialize)]
struct CreateSessionResponse {
    id: SessionId,
    created_at: String,
}

#[derive(Serialize, Deserialize)]
struct SessionListResponse {
    sessions: Vec<SessionSummary>,
    count: usize,
}

#[derive(Serialize, Deserialize)]
struct ContextResponse {
    session_id: SessionId,
    messages: Vec<ChatMessage>,
    message_count: usize,
    total_chars: usize,
}

#[derive(Serialize, Deserialize)]
struct StatusResponse {
    version: String,
    provider: String,
    model: String,
    uptime_secs: i64,
    sessions: usize,
    max_sessions: usize,
    max_document_length: usize,
}

#[derive(Serialize, Deserialize)]
struct ErrorResponse {
    error: String,
    kind: NoticeKind,
}

// ── Error mapping ─────────────────────────────────────────────────────────

fn status_for(kind: NoticeKind) -> StatusCode {
    match kind {
        NoticeKind::EmptyInput | NoticeKind::InvalidTurn => StatusCode::BAD_REQUEST,
        NoticeKind::UnsupportedSourceKind => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        NoticeKind::ExtractionFailed => StatusCode::UNPROCESSABLE_ENTITY,
        NoticeKind::CompletionFailed => StatusCode::BAD_GATEWAY,
        NoticeKind::SessionNotFound => StatusCode::NOT_FOUND,
    }
}

/// A session error that aborted the request before any snapshot existed.
struct ApiError(SessionError);

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = NoticeKind::from(&self.0);
        (
            status_for(kind),
            Json(ErrorResponse {
                error: self.0.to_string(),
                kind,
            }),
        )
            .into_response()
    }
}

/// Render a snapshot, using the status code of its error notice if any.
fn snapshot_response(snapshot: SessionSnapshot) -> Response {
    let status = snapshot
        .error_kind()
        .map(status_for)
        .unwrap_or(StatusCode::OK);
    (status, Json(snapshot)).into_response()
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn create_session_handler(
    State(state): State<SharedState>,
) -> (StatusCode, Json<CreateSessionResponse>) {
    let (id, handle) = state.registry.create().await;
    let created_at = handle.lock().await.created_at().to_rfc3339();

    info!(session = %id, "Session created");

    (
        StatusCode::CREATED,
        Json(CreateSessionResponse { id, created_at }),
    )
}

async fn list_sessions_handler(State(state): State<SharedState>) -> Json<SessionListResponse> {
    let sessions = state.registry.list().await;
    let count = sessions.len();
    Json(SessionListResponse { sessions, count })
}

async fn get_session_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let handle = state.registry.get(&SessionId::from(id.as_str())).await?;
    let session = handle.lock().await;
    Ok(Json(session.snapshot()))
}

async fn delete_session_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = SessionId::from(id.as_str());
    state.registry.remove(&id).await?;
    info!(session = %id, "Session ended");
    Ok(StatusCode::NO_CONTENT)
}

async fn send_message_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<MessageRequest>,
) -> Result<Response, ApiError> {
    let handle = state.registry.get(&SessionId::from(id.as_str())).await?;
    // Held across the completion call: one turn at a time per session.
    let mut session = handle.lock().await;

    info!(session = %id, chars = payload.message.chars().count(), "v1 message");
    let snapshot = state.controller.on_submit(&mut session, &payload.message).await;

    if let Some(notice) = &snapshot.error {
        warn!(session = %id, kind = ?notice.kind, error = %notice.message, "Turn failed");
    }
    Ok(snapshot_response(snapshot))
}

async fn upload_document_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let handle = state.registry.get(&SessionId::from(id.as_str())).await?;

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let kind = SourceKind::from_mime(content_type)?;
    let filename = headers
        .get(FILENAME_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|name| !name.is_empty());

    let mut session = handle.lock().await;

    info!(session = %id, kind = %kind, bytes = body.len(), "v1 document upload");
    let snapshot = state
        .controller
        .on_upload(&mut session, &body, kind, filename)
        .await;

    if let Some(notice) = &snapshot.error {
        warn!(session = %id, error = %notice.message, "Upload rejected");
    }
    Ok(snapshot_response(snapshot))
}

async fn clear_document_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let handle = state.registry.get(&SessionId::from(id.as_str())).await?;
    let mut session = handle.lock().await;
    state.controller.clear_document(&mut session);
    Ok(Json(session.snapshot()))
}

async fn context_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ContextResponse>, ApiError> {
    let handle = state.registry.get(&SessionId::from(id.as_str())).await?;
    let session = handle.lock().await;
    let request = state.controller.preview(&session);

    Ok(Json(ContextResponse {
        session_id: session.id().clone(),
        message_count: request.len(),
        total_chars: request.total_chars(),
        messages: request.messages,
    }))
}

async fn status_handler(State(state): State<SharedState>) -> Json<StatusResponse> {
    let uptime = chrono::Utc::now() - state.start_time;
    Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION").into(),
        provider: state.controller.gateway().name().to_string(),
        model: state.config.default_model.clone(),
        uptime_secs: uptime.num_seconds(),
        sessions: state.registry.len().await,
        max_sessions: state.registry.max_sessions(),
        max_document_length: state.config.session.max_document_length,
    })
}
