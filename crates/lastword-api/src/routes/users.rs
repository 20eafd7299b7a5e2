//! Routes for user-level queries.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::get};
use uuid::Uuid;

use lastword_core::model::UserStats;
use lastword_room::application::query_handlers;

use crate::auth::AuthIdentity;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /{id}/stats
async fn get_user_stats(
    State(state): State<AppState>,
    _identity: AuthIdentity,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserStats>, ApiError> {
    let stats = query_handlers::get_user_stats(user_id, state.store.as_ref()).await?;
    Ok(Json(stats))
}

/// Returns the router for user queries.
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/stats", get(get_user_stats))
}
