//! Request extractors.

use axum::async_trait;
use axum::extract::{FromRequest, FromRequestParts, Query};
use axum::http::request::Parts;
use lintas_core::IdentityApi;
use shared_types::{Actor, UserId};
use tracing::debug;

use crate::error::ApiError;
use crate::service::AppState;

/// Header naming the acting staff member.
pub const ACTOR_HEADER: &str = "x-actor-id";

/// The resolved acting user. Missing header is 401, unknown user 403.
#[derive(Debug, Clone)]
pub struct ActingUser(pub Actor);

#[async_trait]
impl FromRequestParts<AppState> for ActingUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = parts
            .headers
            .get(ACTOR_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or(ApiError::Unauthenticated)?;
        let actor = state.api.resolve_actor(&UserId::new(user))?;
        debug!(actor = %actor.id, role = %actor.role, "Actor resolved");
        Ok(Self(actor))
    }
}

/// JSON body whose rejections use the gateway error shape.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query string whose rejections use the gateway error shape.
#[derive(Debug, FromRequestParts)]
#[from_request(via(Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);
