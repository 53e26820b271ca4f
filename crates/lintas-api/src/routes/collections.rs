//! `/collections`: billing and installments.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use lintas_core::domain::{CollectionQuery, CollectionView, DocumentRef, NewCollection, NewPayment, Payment};
use lintas_core::CollectionApi;
use serde::Deserialize;
use shared_types::{CollectionId, CollectionStatus};

use crate::error::ApiResult;
use crate::extract::{ActingUser, ApiJson, ApiQuery};
use crate::service::AppState;

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: CollectionStatus,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/collections", get(list).post(create))
        .route("/collections/:id", get(fetch).delete(remove))
        .route("/collections/:id/payments", post(add_payment))
        .route("/collections/:id/status", post(set_status))
        .route("/collections/:id/invoice", post(invoice))
}

async fn list(
    State(state): State<AppState>,
    _actor: ActingUser,
    ApiQuery(query): ApiQuery<CollectionQuery>,
) -> Json<Vec<CollectionView>> {
    Json(state.api.list_collections(&query))
}

async fn create(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    ApiJson(request): ApiJson<NewCollection>,
) -> ApiResult<(StatusCode, Json<CollectionView>)> {
    let view = state.api.create_collection(&actor, request)?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn fetch(
    State(state): State<AppState>,
    _actor: ActingUser,
    Path(id): Path<CollectionId>,
) -> ApiResult<Json<CollectionView>> {
    Ok(Json(state.api.collection(&id)?))
}

async fn remove(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(id): Path<CollectionId>,
) -> ApiResult<StatusCode> {
    state.api.delete_collection(&actor, &id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_payment(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(id): Path<CollectionId>,
    ApiJson(payment): ApiJson<NewPayment>,
) -> ApiResult<(StatusCode, Json<Payment>)> {
    let payment = state.api.add_payment(&actor, &id, payment)?;
    Ok((StatusCode::CREATED, Json(payment)))
}

async fn set_status(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(id): Path<CollectionId>,
    ApiJson(request): ApiJson<StatusRequest>,
) -> ApiResult<Json<CollectionView>> {
    Ok(Json(state.api.set_collection_status(&actor, &id, request.status)?))
}

async fn invoice(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(id): Path<CollectionId>,
) -> ApiResult<Json<DocumentRef>> {
    Ok(Json(state.api.generate_invoice(&actor, &id)?))
}
