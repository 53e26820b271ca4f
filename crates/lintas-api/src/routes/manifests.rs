//! `/loadings`: truck manifests.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use lintas_core::domain::{
    DocumentRef, Manifest, ManifestAdvance, ManifestAmendment, ManifestQuery, NewManifest,
};
use lintas_core::ManifestApi;
use shared_types::ManifestId;

use crate::error::ApiResult;
use crate::extract::{ActingUser, ApiJson, ApiQuery};
use crate::service::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/loadings", get(list).post(create))
        .route("/loadings/:id", get(fetch).put(amend).delete(remove))
        .route("/loadings/:id/status", post(advance))
        .route("/loadings/:id/print", post(print))
}

async fn list(
    State(state): State<AppState>,
    _actor: ActingUser,
    ApiQuery(query): ApiQuery<ManifestQuery>,
) -> Json<Vec<Manifest>> {
    Json(state.api.list_manifests(&query))
}

async fn create(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    ApiJson(request): ApiJson<NewManifest>,
) -> ApiResult<(StatusCode, Json<Manifest>)> {
    let manifest = state.api.create_manifest(&actor, request)?;
    Ok((StatusCode::CREATED, Json(manifest)))
}

async fn fetch(
    State(state): State<AppState>,
    _actor: ActingUser,
    Path(id): Path<ManifestId>,
) -> ApiResult<Json<Manifest>> {
    Ok(Json(state.api.manifest(&id)?))
}

async fn amend(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(id): Path<ManifestId>,
    ApiJson(amendment): ApiJson<ManifestAmendment>,
) -> ApiResult<Json<Manifest>> {
    Ok(Json(state.api.amend_manifest(&actor, &id, amendment)?))
}

async fn advance(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(id): Path<ManifestId>,
    ApiJson(request): ApiJson<ManifestAdvance>,
) -> ApiResult<Json<Manifest>> {
    Ok(Json(state.api.advance_manifest(&actor, &id, request)?))
}

async fn remove(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(id): Path<ManifestId>,
) -> ApiResult<StatusCode> {
    state.api.delete_manifest(&actor, &id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn print(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(id): Path<ManifestId>,
) -> ApiResult<Json<DocumentRef>> {
    Ok(Json(state.api.print_manifest(&actor, &id)?))
}
