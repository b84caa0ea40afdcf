//! Collection handlers

use super::required;
use crate::api::state::AppState;
use crate::error::ApiResult;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use eden_curation::{AddWork, ListFormat, WorkListing};
use eden_types::{
    Collaborator, Collection, CollectionCriteria, CollectionId, CuratorId, WorkId,
};
use serde::{Deserialize, Serialize};

/// Create collection request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCollectionRequest {
    #[serde(default)]
    pub id: Option<CollectionId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub collaborators: Vec<Collaborator>,
    #[serde(default)]
    pub criteria: CollectionCriteria,
}

/// Add work request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddWorkRequest {
    #[serde(default)]
    pub work_id: Option<String>,
    #[serde(default)]
    pub curator_id: Option<CuratorId>,
    #[serde(default)]
    pub position: Option<usize>,
    #[serde(default)]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Remove work query
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveWorkQuery {
    pub work_id: Option<String>,
    pub curator_id: Option<CuratorId>,
}

/// List works query
#[derive(Debug, Deserialize)]
pub struct ListWorksQuery {
    pub format: Option<String>,
}

/// Membership listing response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionWorksResponse {
    pub collection_id: CollectionId,
    pub total: usize,
    pub works: WorkListing,
}

/// Create a collection
pub async fn create_collection(
    State(state): State<AppState>,
    request: Result<Json<CreateCollectionRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Collection>)> {
    let Json(request) = request?;
    let owner: CuratorId = required(request.owner_id, "ownerId")?;

    let mut collection = Collection::new(request.title, owner).with_criteria(request.criteria);
    if let Some(id) = request.id {
        collection.id = id;
    }
    collection.description = request.description;
    collection.collaborators = request.collaborators;

    let collection = state
        .with_registry(move |registry| Ok(registry.collections.create(collection)?))
        .await?;
    Ok((StatusCode::CREATED, Json(collection)))
}

/// List collections
pub async fn list_collections(State(state): State<AppState>) -> ApiResult<Json<Vec<Collection>>> {
    let collections = state
        .with_registry(|registry| Ok(registry.collections.list()?))
        .await?;
    Ok(Json(collections))
}

/// Get a collection
pub async fn get_collection(
    State(state): State<AppState>,
    Path(id): Path<CollectionId>,
) -> ApiResult<Json<Collection>> {
    let collection = state
        .with_registry(move |registry| Ok(registry.collections.get(&id)?))
        .await?;
    Ok(Json(collection))
}

/// Add a work to a collection
pub async fn add_collection_work(
    State(state): State<AppState>,
    Path(id): Path<CollectionId>,
    request: Result<Json<AddWorkRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Collection>)> {
    let Json(request) = request?;
    let add = AddWork {
        work_id: required(request.work_id, "workId")?,
        curator_id: request.curator_id,
        position: request.position,
        metadata: request.metadata.unwrap_or_default(),
    };

    let collection = state
        .with_registry(move |registry| Ok(registry.collections.add_work(&id, add)?))
        .await?;
    Ok((StatusCode::CREATED, Json(collection)))
}

/// Remove a work from a collection
pub async fn remove_collection_work(
    State(state): State<AppState>,
    Path(id): Path<CollectionId>,
    query: Result<Query<RemoveWorkQuery>, QueryRejection>,
) -> ApiResult<Json<Collection>> {
    let Query(query) = query?;
    let work_id: WorkId = required(query.work_id, "workId")?;

    let collection = state
        .with_registry(move |registry| {
            Ok(registry
                .collections
                .remove_work(&id, &work_id, query.curator_id.as_ref())?)
        })
        .await?;
    Ok(Json(collection))
}

/// List a collection's works, minimal by default
pub async fn list_collection_works(
    State(state): State<AppState>,
    Path(id): Path<CollectionId>,
    query: Result<Query<ListWorksQuery>, QueryRejection>,
) -> ApiResult<Json<CollectionWorksResponse>> {
    let Query(query) = query?;
    let format = match query.format.as_deref() {
        Some(format) => format.parse::<ListFormat>()?,
        None => ListFormat::default(),
    };

    let works = {
        let id = id.clone();
        state
            .with_registry(move |registry| Ok(registry.collections.list_works(&id, format)?))
            .await?
    };
    Ok(Json(CollectionWorksResponse {
        collection_id: id,
        total: works.len(),
        works,
    }))
}
