//! Agent work handlers

use crate::api::state::AppState;
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use eden_types::{AgentId, Work, WorkAnalysis, WorkId};
use serde::Deserialize;

/// Register work request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkRequest {
    #[serde(default)]
    pub id: Option<WorkId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub medium: String,
    #[serde(default)]
    pub themes: Vec<String>,
    #[serde(default)]
    pub analysis: Option<WorkAnalysis>,
}

/// List an agent's works
pub async fn list_works(
    State(state): State<AppState>,
    Path(agent_id): Path<AgentId>,
) -> ApiResult<Json<Vec<Work>>> {
    let works = state
        .with_registry(move |registry| Ok(registry.works.load(&agent_id)?))
        .await?;
    Ok(Json(works))
}

/// Get one of an agent's works
pub async fn get_work(
    State(state): State<AppState>,
    Path((agent_id, work_id)): Path<(AgentId, WorkId)>,
) -> ApiResult<Json<Work>> {
    let work = state
        .with_registry(move |registry| {
            registry.works.get(&agent_id, &work_id)?.ok_or_else(|| {
                ApiError::NotFound(format!("Work {} not found for agent {}", work_id, agent_id))
            })
        })
        .await?;
    Ok(Json(work))
}

/// Register a work in an agent's store
pub async fn create_work(
    State(state): State<AppState>,
    Path(agent_id): Path<AgentId>,
    request: Result<Json<CreateWorkRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Work>)> {
    let Json(request) = request?;
    if request.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title is required".to_string()));
    }

    let mut work = Work::new(agent_id.clone(), request.title)
        .with_medium(request.medium)
        .with_themes(request.themes);
    if let Some(id) = request.id {
        work = work.with_id(id);
    }
    work.analysis = request.analysis;

    // Votes and collections resolve works by id alone, so ids are unique across agents
    let stored = work.clone();
    state
        .with_registry(move |registry| {
            if let Some(existing) = registry.works.locate(&stored.id)? {
                return Err(ApiError::Conflict(format!(
                    "Work {} already exists for agent {}",
                    existing.id, existing.agent_id
                )));
            }
            Ok(registry.works.upsert(stored)?)
        })
        .await?;

    tracing::info!(agent_id = %agent_id, work_id = %work.id, "Registered work");

    Ok((StatusCode::CREATED, Json(work)))
}
