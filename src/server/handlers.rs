use super::error::ApiResult;
use super::AppState;
use crate::heat::build_heatmap;
use crate::model::{
    DefaultOutcome, DeleteOutcome, DiscoverOutput, HeatmapOutput, MetadataUpdate, NewRepo,
    RepoListing, RepositoryEntry,
};
use crate::registry::Registry;
use crate::translate::Language;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct HeatmapQuery {
    pub since: Option<String>,
    pub lang: Option<String>,
}

/// Run a registry call off the async workers; it touches the filesystem and
/// may wait on the translation backend.
async fn blocking<T, F>(registry: &Arc<Registry>, call: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&Registry) -> crate::error::Result<T> + Send + 'static,
{
    let registry = Arc::clone(registry);
    Ok(tokio::task::spawn_blocking(move || call(&registry)).await??)
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

pub async fn list_repos(State(state): State<AppState>) -> ApiResult<Json<RepoListing>> {
    Ok(Json(blocking(&state.registry, |r| r.list()).await?))
}

pub async fn discover_repos(State(state): State<AppState>) -> ApiResult<Json<DiscoverOutput>> {
    Ok(Json(blocking(&state.registry, |r| r.discover()).await?))
}

/// A missing or unreadable body counts as an empty one and fails on the
/// required path.
pub async fn add_repo(
    State(state): State<AppState>,
    body: Option<Json<NewRepo>>,
) -> ApiResult<(StatusCode, Json<RepositoryEntry>)> {
    let NewRepo { path, name } = body.map(|Json(b)| b).unwrap_or_default();
    let entry = blocking(&state.registry, move |r| r.add(&path, name.as_deref())).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn delete_repo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteOutcome>> {
    Ok(Json(blocking(&state.registry, move |r| r.delete(&id)).await?))
}

pub async fn set_default_repo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DefaultOutcome>> {
    Ok(Json(blocking(&state.registry, move |r| r.set_default(&id)).await?))
}

pub async fn update_repo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<MetadataUpdate>>,
) -> ApiResult<Json<RepositoryEntry>> {
    let update = body.map(|Json(b)| b).unwrap_or_default();
    Ok(Json(
        blocking(&state.registry, move |r| r.update_metadata(&id, update)).await?,
    ))
}

pub async fn heatmap(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<HeatmapQuery>,
) -> ApiResult<Json<HeatmapOutput>> {
    let repo = blocking(&state.registry, move |r| r.resolve(&id)).await?;
    let lang = Language::parse_or_default(query.lang.as_deref());
    let output = build_heatmap(
        &repo,
        &state.git,
        query.since.as_deref(),
        lang,
        Local::now().date_naive(),
    )
    .await?;
    Ok(Json(output))
}
