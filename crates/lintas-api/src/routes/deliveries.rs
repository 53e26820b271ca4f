//! `/deliveries`: last-mile dispatch.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use lintas_core::domain::{Delivery, DeliveryQuery, DeliveryUpdate, NewDelivery};
use lintas_core::DeliveryApi;
use shared_types::DeliveryId;

use crate::error::ApiResult;
use crate::extract::{ActingUser, ApiJson, ApiQuery};
use crate::service::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/deliveries", get(list).post(create))
        .route("/deliveries/:id", get(fetch))
        .route("/deliveries/:id/status", post(update_status))
}

async fn list(
    State(state): State<AppState>,
    _actor: ActingUser,
    ApiQuery(query): ApiQuery<DeliveryQuery>,
) -> Json<Vec<Delivery>> {
    Json(state.api.list_deliveries(&query))
}

async fn create(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    ApiJson(request): ApiJson<NewDelivery>,
) -> ApiResult<(StatusCode, Json<Delivery>)> {
    let delivery = state.api.create_delivery(&actor, request)?;
    Ok((StatusCode::CREATED, Json(delivery)))
}

async fn fetch(
    State(state): State<AppState>,
    _actor: ActingUser,
    Path(id): Path<DeliveryId>,
) -> ApiResult<Json<Delivery>> {
    Ok(Json(state.api.delivery(&id)?))
}

async fn update_status(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(id): Path<DeliveryId>,
    ApiJson(update): ApiJson<DeliveryUpdate>,
) -> ApiResult<Json<Delivery>> {
    Ok(Json(state.api.update_delivery_status(&actor, &id, update)?))
}
