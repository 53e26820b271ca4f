//! `/stt`: shipment intake, status moves, history and receipts.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use lintas_core::domain::{DocumentRef, Shipment, ShipmentIntake, ShipmentPatch, ShipmentQuery, StatusRecord};
use lintas_core::{IdentityApi, ShipmentApi};
use serde::Deserialize;
use shared_types::{ShipmentId, ShipmentStatus};

use crate::error::ApiResult;
use crate::extract::{ActingUser, ApiJson, ApiQuery};
use crate::service::AppState;

#[derive(Debug, Deserialize)]
pub struct AdvanceRequest {
    pub status: ShipmentStatus,
    #[serde(default)]
    pub note: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stt", get(list).post(create))
        .route("/stt/tracking/:number", get(by_tracking_number))
        .route("/stt/:id", get(fetch).put(update))
        .route("/stt/:id/status", post(advance))
        .route("/stt/:id/history", get(history))
        .route("/stt/:id/transitions", get(transitions))
        .route("/stt/:id/print", post(print))
}

async fn list(
    State(state): State<AppState>,
    _actor: ActingUser,
    ApiQuery(query): ApiQuery<ShipmentQuery>,
) -> Json<Vec<Shipment>> {
    Json(state.api.list_shipments(&query))
}

async fn create(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    ApiJson(intake): ApiJson<ShipmentIntake>,
) -> ApiResult<(StatusCode, Json<Shipment>)> {
    let shipment = state.api.create_shipment(&actor, intake)?;
    Ok((StatusCode::CREATED, Json(shipment)))
}

async fn fetch(
    State(state): State<AppState>,
    _actor: ActingUser,
    Path(id): Path<ShipmentId>,
) -> ApiResult<Json<Shipment>> {
    Ok(Json(state.api.shipment(&id)?))
}

async fn by_tracking_number(
    State(state): State<AppState>,
    _actor: ActingUser,
    Path(number): Path<String>,
) -> ApiResult<Json<Shipment>> {
    Ok(Json(state.api.shipment_by_tracking_number(&number)?))
}

async fn update(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(id): Path<ShipmentId>,
    ApiJson(patch): ApiJson<ShipmentPatch>,
) -> ApiResult<Json<Shipment>> {
    Ok(Json(state.api.update_shipment(&actor, &id, patch)?))
}

async fn advance(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(id): Path<ShipmentId>,
    ApiJson(request): ApiJson<AdvanceRequest>,
) -> ApiResult<Json<Shipment>> {
    let shipment = state
        .api
        .advance_shipment(&actor, &id, request.status, request.note)?;
    Ok(Json(shipment))
}

async fn history(
    State(state): State<AppState>,
    _actor: ActingUser,
    Path(id): Path<ShipmentId>,
) -> ApiResult<Json<Vec<StatusRecord>>> {
    Ok(Json(state.api.shipment_history(&id)?))
}

async fn transitions(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(id): Path<ShipmentId>,
) -> ApiResult<Json<Vec<ShipmentStatus>>> {
    Ok(Json(state.api.allowed_transitions(&actor, &id)?))
}

async fn print(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(id): Path<ShipmentId>,
) -> ApiResult<Json<DocumentRef>> {
    Ok(Json(state.api.print_shipment(&actor, &id)?))
}
