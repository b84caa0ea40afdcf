//! Curation session handlers

use super::required;
use crate::api::state::AppState;
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use eden_curation::NewSession;
use eden_types::{
    AgentId, Classification, CurationSession, CuratorId, SessionId, SessionQueues, WorkId,
};
use serde::{Deserialize, Serialize};

/// Start session request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub curator_id: Option<String>,
    #[serde(default)]
    pub agent_id: Option<AgentId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub work_ids: Option<Vec<WorkId>>,
}

/// Session list query
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionListQuery {
    pub curator_id: Option<CuratorId>,
}

/// Classification request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyRequest {
    #[serde(default)]
    pub work_id: Option<String>,
    #[serde(default, alias = "classification")]
    pub decision: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

/// A session together with its bucketed queues
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    #[serde(flatten)]
    pub session: CurationSession,
    pub queues: SessionQueues,
}

impl From<CurationSession> for SessionResponse {
    fn from(session: CurationSession) -> Self {
        Self {
            queues: session.queues(),
            session,
        }
    }
}

/// Start a curation session
pub async fn create_session(
    State(state): State<AppState>,
    request: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SessionResponse>)> {
    let Json(request) = request?;
    let new_session = NewSession {
        curator_id: required(request.curator_id, "curatorId")?,
        agent_id: request.agent_id,
        name: request.name,
        work_ids: request.work_ids,
    };

    let session = state
        .with_registry(move |registry| Ok(registry.sessions.create(new_session)?))
        .await?;
    Ok((StatusCode::CREATED, Json(session.into())))
}

/// List sessions, newest first
pub async fn list_sessions(
    State(state): State<AppState>,
    query: Result<Query<SessionListQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<SessionResponse>>> {
    let Query(query) = query?;
    let sessions = state
        .with_registry(move |registry| Ok(registry.sessions.list(query.curator_id.as_ref())?))
        .await?;
    Ok(Json(sessions.into_iter().map(SessionResponse::from).collect()))
}

/// Get a session
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> ApiResult<Json<SessionResponse>> {
    let session = state
        .with_registry(move |registry| Ok(registry.sessions.get(&id)?))
        .await?;
    Ok(Json(session.into()))
}

/// Classify a work within a session
pub async fn classify_work(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    request: Result<Json<ClassifyRequest>, JsonRejection>,
) -> ApiResult<Json<SessionResponse>> {
    let Json(request) = request?;
    let classification: Classification = request
        .decision
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("decision is required".to_string()))?
        .parse()?;
    let work_id: WorkId = required(request.work_id, "workId")?;

    let note = request.note;
    let session = state
        .with_registry(move |registry| {
            Ok(registry.sessions.classify(&id, work_id, classification, note)?)
        })
        .await?;
    Ok(Json(session.into()))
}

/// Complete a session
pub async fn complete_session(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> ApiResult<Json<SessionResponse>> {
    let session = state
        .with_registry(move |registry| Ok(registry.sessions.complete(&id)?))
        .await?;
    Ok(Json(session.into()))
}
