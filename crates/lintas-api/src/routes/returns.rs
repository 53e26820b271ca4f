//! `/returns`: return batches.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use lintas_core::domain::{CloseReturn, NewReturn, ReturnQuery, ReturnRecord};
use lintas_core::ReturnApi;
use shared_types::ReturnId;

use crate::error::ApiResult;
use crate::extract::{ActingUser, ApiJson, ApiQuery};
use crate::service::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/returns", get(list).post(open))
        .route("/returns/:id", get(fetch))
        .route("/returns/:id/close", post(close))
}

async fn list(
    State(state): State<AppState>,
    _actor: ActingUser,
    ApiQuery(query): ApiQuery<ReturnQuery>,
) -> Json<Vec<ReturnRecord>> {
    Json(state.api.list_returns(&query))
}

async fn open(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    ApiJson(request): ApiJson<NewReturn>,
) -> ApiResult<(StatusCode, Json<ReturnRecord>)> {
    let record = state.api.open_return(&actor, request)?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn fetch(
    State(state): State<AppState>,
    _actor: ActingUser,
    Path(id): Path<ReturnId>,
) -> ApiResult<Json<ReturnRecord>> {
    Ok(Json(state.api.return_record(&id)?))
}

async fn close(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(id): Path<ReturnId>,
    ApiJson(request): ApiJson<CloseReturn>,
) -> ApiResult<Json<ReturnRecord>> {
    Ok(Json(state.api.close_return(&actor, &id, request)?))
}
