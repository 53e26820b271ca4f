//! `/vehicles`, `/vehicle-queues` and `/truck-queues`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use lintas_core::domain::{
    EnqueueRequest, NewVehicle, QueueQuery, TruckQueueEntry, Vehicle, VehiclePatch,
    VehicleQueueEntry,
};
use lintas_core::FleetApi;
use serde::Deserialize;
use shared_types::{BranchId, QueueEntryId, TruckQueueStatus, VehicleId, VehicleQueueStatus};

use crate::error::ApiResult;
use crate::extract::{ActingUser, ApiJson, ApiQuery};
use crate::service::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct BranchFilter {
    #[serde(default)]
    pub branch: Option<BranchId>,
}

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub branch: BranchId,
}

#[derive(Debug, Deserialize)]
pub struct ReleaseRequest<S> {
    pub status: S,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/vehicles", get(list_vehicles).post(register_vehicle))
        .route("/vehicles/:id", get(get_vehicle).put(update_vehicle))
        .route("/vehicle-queues", get(list_vehicle_queue).post(enqueue_vehicle))
        .route("/vehicle-queues/next", get(next_vehicle))
        .route(
            "/vehicle-queues/:id",
            get(get_vehicle_entry).delete(delete_vehicle_entry),
        )
        .route("/vehicle-queues/:id/release", post(release_vehicle))
        .route("/truck-queues", get(list_truck_queue).post(enqueue_truck))
        .route("/truck-queues/next", get(next_truck))
        .route("/truck-queues/:id", get(get_truck_entry).delete(delete_truck_entry))
        .route("/truck-queues/:id/release", post(release_truck))
}

// =============================================================================
// VEHICLES
// =============================================================================

async fn list_vehicles(
    State(state): State<AppState>,
    _actor: ActingUser,
    ApiQuery(filter): ApiQuery<BranchFilter>,
) -> Json<Vec<Vehicle>> {
    Json(state.api.list_vehicles(filter.branch.as_ref()))
}

async fn register_vehicle(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    ApiJson(vehicle): ApiJson<NewVehicle>,
) -> ApiResult<(StatusCode, Json<Vehicle>)> {
    let vehicle = state.api.register_vehicle(&actor, vehicle)?;
    Ok((StatusCode::CREATED, Json(vehicle)))
}

async fn get_vehicle(
    State(state): State<AppState>,
    _actor: ActingUser,
    Path(id): Path<VehicleId>,
) -> ApiResult<Json<Vehicle>> {
    Ok(Json(state.api.vehicle(&id)?))
}

async fn update_vehicle(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(id): Path<VehicleId>,
    ApiJson(patch): ApiJson<VehiclePatch>,
) -> ApiResult<Json<Vehicle>> {
    Ok(Json(state.api.update_vehicle(&actor, &id, patch)?))
}

// =============================================================================
// VEHICLE QUEUE
// =============================================================================

async fn list_vehicle_queue(
    State(state): State<AppState>,
    _actor: ActingUser,
    ApiQuery(query): ApiQuery<QueueQuery<VehicleQueueStatus>>,
) -> Json<Vec<VehicleQueueEntry>> {
    Json(state.api.list_vehicle_entries(&query))
}

async fn enqueue_vehicle(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    ApiJson(request): ApiJson<EnqueueRequest>,
) -> ApiResult<(StatusCode, Json<VehicleQueueEntry>)> {
    let entry = state.api.enqueue_vehicle(&actor, request)?;
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn next_vehicle(
    State(state): State<AppState>,
    _actor: ActingUser,
    ApiQuery(query): ApiQuery<NextQuery>,
) -> ApiResult<Json<VehicleQueueEntry>> {
    Ok(Json(state.api.next_vehicle(&query.branch)?))
}

async fn get_vehicle_entry(
    State(state): State<AppState>,
    _actor: ActingUser,
    Path(id): Path<QueueEntryId>,
) -> ApiResult<Json<VehicleQueueEntry>> {
    Ok(Json(state.api.vehicle_entry(&id)?))
}

async fn delete_vehicle_entry(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(id): Path<QueueEntryId>,
) -> ApiResult<StatusCode> {
    state.api.delete_vehicle_entry(&actor, &id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn release_vehicle(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(id): Path<QueueEntryId>,
    ApiJson(request): ApiJson<ReleaseRequest<VehicleQueueStatus>>,
) -> ApiResult<Json<VehicleQueueEntry>> {
    Ok(Json(state.api.release_vehicle(&actor, &id, request.status)?))
}

// =============================================================================
// TRUCK QUEUE
// =============================================================================

async fn list_truck_queue(
    State(state): State<AppState>,
    _actor: ActingUser,
    ApiQuery(query): ApiQuery<QueueQuery<TruckQueueStatus>>,
) -> Json<Vec<TruckQueueEntry>> {
    Json(state.api.list_truck_entries(&query))
}

async fn enqueue_truck(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    ApiJson(request): ApiJson<EnqueueRequest>,
) -> ApiResult<(StatusCode, Json<TruckQueueEntry>)> {
    let entry = state.api.enqueue_truck(&actor, request)?;
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn next_truck(
    State(state): State<AppState>,
    _actor: ActingUser,
    ApiQuery(query): ApiQuery<NextQuery>,
) -> ApiResult<Json<TruckQueueEntry>> {
    Ok(Json(state.api.next_truck(&query.branch)?))
}

async fn get_truck_entry(
    State(state): State<AppState>,
    _actor: ActingUser,
    Path(id): Path<QueueEntryId>,
) -> ApiResult<Json<TruckQueueEntry>> {
    Ok(Json(state.api.truck_entry(&id)?))
}

async fn delete_truck_entry(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(id): Path<QueueEntryId>,
) -> ApiResult<StatusCode> {
    state.api.delete_truck_entry(&actor, &id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn release_truck(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(id): Path<QueueEntryId>,
    ApiJson(request): ApiJson<ReleaseRequest<TruckQueueStatus>>,
) -> ApiResult<Json<TruckQueueEntry>> {
    Ok(Json(state.api.release_truck(&actor, &id, request.status)?))
}
