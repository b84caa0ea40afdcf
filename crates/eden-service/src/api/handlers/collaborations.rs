//! Collaboration and voting handlers

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
use eden_curation::{DecisionOutcome, DecisionStatus, DecisionsOverview, VoteSubmission};
use eden_types::{
    AgentId, Collaboration, CollaborationId, CuratorId, Participant, Vote, VoteChoice,
    VotingRules, WorkId,
};
use serde::{Deserialize, Serialize};

/// Create collaboration request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCollaborationRequest {
    #[serde(default)]
    pub id: Option<CollaborationId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub agent_id: Option<AgentId>,
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub voting_rules: VotingRules,
}

/// Participant activation request
#[derive(Debug, Deserialize)]
pub struct SetParticipantRequest {
    pub active: bool,
}

/// Vote request. Fields are checked by hand so each gets a precise 400.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    #[serde(default)]
    pub work_id: Option<String>,
    #[serde(default)]
    pub curator_id: Option<String>,
    #[serde(default)]
    pub vote: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Vote response
#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub success: bool,
    pub vote: Vote,
    pub decision: DecisionOutcome,
}

/// Vote status query
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteStatusQuery {
    pub work_id: Option<String>,
}

impl VoteStatusQuery {
    /// The named work; a blank `workId` counts as absent
    fn work_id(&self) -> Option<WorkId> {
        self.work_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(WorkId::new)
    }
}

/// One work's decision, or every decision of the collaboration
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum VoteStatusResponse {
    Work {
        #[serde(rename = "collaborationId")]
        collaboration_id: CollaborationId,
        #[serde(flatten)]
        status: DecisionStatus,
    },
    All(DecisionsOverview),
}

/// Create a collaboration
pub async fn create_collaboration(
    State(state): State<AppState>,
    request: Result<Json<CreateCollaborationRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Collaboration>)> {
    let Json(request) = request?;

    let mut collaboration = Collaboration::new(request.title, request.voting_rules);
    if let Some(id) = request.id {
        collaboration.id = id;
    }
    collaboration.agent_id = request.agent_id;
    collaboration.participants = request.participants;

    let collaboration = state
        .with_registry(move |registry| Ok(registry.collaborations.create(collaboration)?))
        .await?;
    Ok((StatusCode::CREATED, Json(collaboration)))
}

/// List collaborations
pub async fn list_collaborations(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Collaboration>>> {
    let collaborations = state
        .with_registry(|registry| Ok(registry.collaborations.list()?))
        .await?;
    Ok(Json(collaborations))
}

/// Get a collaboration
pub async fn get_collaboration(
    State(state): State<AppState>,
    Path(id): Path<CollaborationId>,
) -> ApiResult<Json<Collaboration>> {
    let collaboration = state
        .with_registry(move |registry| Ok(registry.collaborations.get(&id)?))
        .await?;
    Ok(Json(collaboration))
}

/// Activate or deactivate a participant
pub async fn set_participant(
    State(state): State<AppState>,
    Path((id, curator_id)): Path<(CollaborationId, CuratorId)>,
    request: Result<Json<SetParticipantRequest>, JsonRejection>,
) -> ApiResult<Json<Collaboration>> {
    let Json(request) = request?;
    let collaboration = state
        .with_registry(move |registry| {
            Ok(registry
                .collaborations
                .set_participant_active(&id, &curator_id, request.active)?)
        })
        .await?;
    Ok(Json(collaboration))
}

/// Submit a vote on a work
pub async fn submit_vote(
    State(state): State<AppState>,
    Path(id): Path<CollaborationId>,
    request: Result<Json<VoteRequest>, JsonRejection>,
) -> ApiResult<Json<VoteResponse>> {
    let Json(request) = request?;

    let vote: VoteChoice = request
        .vote
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("vote is required".to_string()))?
        .parse()?;
    let submission = VoteSubmission {
        work_id: required(request.work_id, "workId")?,
        curator_id: required(request.curator_id, "curatorId")?,
        vote,
        reason: request.reason,
    };

    let receipt = {
        let id = id.clone();
        state
            .with_registry(move |registry| {
                Ok(registry.collaborations.submit_vote(&id, submission)?)
            })
            .await?
    };

    tracing::info!(
        collaboration_id = %id,
        curator_id = %receipt.vote.curator_id,
        outcome = %receipt.decision.outcome,
        applied = receipt.applied,
        "Vote submitted"
    );

    Ok(Json(VoteResponse {
        success: true,
        vote: receipt.vote,
        decision: receipt.decision,
    }))
}

/// Decision status for one work, or every decision when no work is named
pub async fn vote_status(
    State(state): State<AppState>,
    Path(id): Path<CollaborationId>,
    query: Result<Query<VoteStatusQuery>, QueryRejection>,
) -> ApiResult<Json<VoteStatusResponse>> {
    let Query(query) = query?;
    let work_id = query.work_id();

    let response = state
        .with_registry(move |registry| {
            Ok(match work_id {
                Some(work_id) => VoteStatusResponse::Work {
                    status: registry.collaborations.work_status(&id, &work_id)?,
                    collaboration_id: id,
                },
                None => VoteStatusResponse::All(registry.collaborations.all_decisions(&id)?),
            })
        })
        .await?;
    Ok(Json(response))
}
