use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use ytcreator_chain::{HistoryStore, PipelineResult};
use crate::{error::{ApiError, ApiResult}, state::AppState};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GenerateRequest {
    pub topic: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GenerationResponse {
    pub title: String,
    pub script: String,
    pub research: String,
}

impl From<PipelineResult> for GenerationResponse {
    fn from(result: PipelineResult) -> Self {
        Self {
            title: result.title,
            script: result.script,
            research: result.research,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GenerateResponse {
    /// `null` when the topic was blank and nothing ran
    pub result: Option<GenerationResponse>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HistoryEntryResponse {
    pub input: String,
    pub output: String,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HistoryResponse {
    pub input_key: String,
    pub buffer: String,
    pub entries: Vec<HistoryEntryResponse>,
}

impl From<&HistoryStore> for HistoryResponse {
    fn from(store: &HistoryStore) -> Self {
        Self {
            input_key: store.input_key().to_string(),
            buffer: store.buffer(),
            entries: store
                .entries()
                .iter()
                .map(|entry| HistoryEntryResponse {
                    input: entry.input.clone(),
                    output: entry.output.clone(),
                    recorded_at: entry.recorded_at,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionHistoryResponse {
    pub session_id: Uuid,
    /// Stage reached by the latest submission
    pub stage: String,
    pub title_history: HistoryResponse,
    pub script_history: HistoryResponse,
}

/// Create a new session
#[utoipa::path(
    post,
    path = "/api/sessions",
    responses(
        (status = 201, description = "Session created", body = SessionResponse)
    ),
    tag = "sessions"
)]
pub async fn create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionResponse>) {
    let shared = state.sessions.insert(state.pipeline.new_session()).await;
    let session = shared.lock().await;

    tracing::info!(session_id = %session.id(), "Session created");

    (
        StatusCode::CREATED,
        Json(SessionResponse {
            session_id: session.id(),
            created_at: session.created_at(),
        }),
    )
}

/// Generate a title and script for a topic
#[utoipa::path(
    post,
    path = "/api/sessions/{session_id}/generate",
    params(
        ("session_id" = Uuid, Path, description = "Session ID")
    ),
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Generation finished", body = GenerateResponse),
        (status = 400, description = "Invalid session ID", body = crate::error::ErrorBody),
        (status = 404, description = "Session not found", body = crate::error::ErrorBody),
        (status = 502, description = "Model or research lookup failed", body = crate::error::ErrorBody)
    ),
    tag = "sessions"
)]
pub async fn generate(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<GenerateRequest>,
) -> ApiResult<Json<GenerateResponse>> {
    let id = parse_session_id(&session_id)?;
    let shared = state
        .sessions
        .get(&id)
        .await
        .ok_or_else(|| ApiError::SessionNotFound(session_id))?;
    let mut session = shared.lock().await;

    let result = state.pipeline.submit(&mut session, &req.topic).await?;

    Ok(Json(GenerateResponse {
        result: result.map(GenerationResponse::from),
    }))
}

/// Both history buffers of a session
#[utoipa::path(
    get,
    path = "/api/sessions/{session_id}/history",
    params(
        ("session_id" = Uuid, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Session history", body = SessionHistoryResponse),
        (status = 404, description = "Session not found", body = crate::error::ErrorBody)
    ),
    tag = "sessions"
)]
pub async fn get_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<SessionHistoryResponse>> {
    let id = parse_session_id(&session_id)?;
    let shared = state
        .sessions
        .get(&id)
        .await
        .ok_or_else(|| ApiError::SessionNotFound(session_id))?;
    let session = shared.lock().await;

    Ok(Json(SessionHistoryResponse {
        session_id: session.id(),
        stage: session.stage().to_string(),
        title_history: HistoryResponse::from(session.title_history()),
        script_history: HistoryResponse::from(session.script_history()),
    }))
}

/// Delete a session
#[utoipa::path(
    delete,
    path = "/api/sessions/{session_id}",
    params(
        ("session_id" = Uuid, Path, description = "Session ID")
    ),
    responses(
        (status = 204, description = "Session deleted"),
        (status = 404, description = "Session not found", body = crate::error::ErrorBody)
    ),
    tag = "sessions"
)]
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_session_id(&session_id)?;

    if !state.sessions.remove(&id).await {
        return Err(ApiError::SessionNotFound(session_id));
    }

    Ok(StatusCode::NO_CONTENT)
}

fn parse_session_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("invalid session id: {raw}")))
}
