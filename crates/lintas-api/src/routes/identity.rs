//! `/me`: who the caller is and which STT edges they may take.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use lintas_core::domain::Edge;
use lintas_core::IdentityApi;
use serde::Serialize;
use shared_types::Actor;

use crate::extract::ActingUser;
use crate::service::AppState;

#[derive(Debug, Serialize)]
pub struct WhoAmI {
    pub actor: Actor,
    pub edges: Vec<Edge>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/me", get(who_am_i))
}

async fn who_am_i(State(state): State<AppState>, ActingUser(actor): ActingUser) -> Json<WhoAmI> {
    let edges = state.api.permitted_edges(&actor.role);
    Json(WhoAmI { actor, edges })
}
