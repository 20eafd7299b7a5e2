//! Routes for the room lifecycle.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Json, Router, routing::get, routing::post};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use lastword_assignment::application::command_handlers as assignment_handlers;
use lastword_core::model::{Player, Room};
use lastword_room::application::{command_handlers, query_handlers};
use lastword_room::domain::commands;

use crate::auth::AuthIdentity;
use crate::error::ApiError;
use crate::state::AppState;

/// Response body for POST /{id}/reassign.
#[derive(Debug, Serialize)]
pub struct ReassignResponse {
    /// Whether a new ring was committed.
    pub reassigned: bool,
}

/// POST /
#[instrument(skip(state, identity, request), fields(user_id = %identity.0.user_id))]
async fn create_room(
    State(state): State<AppState>,
    identity: AuthIdentity,
    Json(request): Json<commands::CreateRoom>,
) -> Result<Json<Room>, ApiError> {
    info!(capacity = request.capacity, "handling create_room command");

    let room = command_handlers::handle_create_room(
        identity.0,
        &request,
        state.clock.as_ref(),
        &state.rng,
        state.store.as_ref(),
        state.notifier.as_ref(),
    )
    .await?;

    Ok(Json(room))
}

/// GET /{id}
async fn get_room(
    State(state): State<AppState>,
    _identity: AuthIdentity,
    Path(room_id): Path<Uuid>,
) -> Result<Json<query_handlers::RoomView>, ApiError> {
    let view = query_handlers::get_room_state(room_id, state.store.as_ref()).await?;
    Ok(Json(view))
}

/// GET /code/{code}
async fn get_room_by_code(
    State(state): State<AppState>,
    _identity: AuthIdentity,
    Path(code): Path<String>,
) -> Result<Json<query_handlers::RoomView>, ApiError> {
    let view = query_handlers::get_room_by_code(&code, state.store.as_ref()).await?;
    Ok(Json(view))
}

/// GET /expired
async fn list_expired(
    State(state): State<AppState>,
    identity: AuthIdentity,
) -> Result<Json<Vec<Room>>, ApiError> {
    let rooms = query_handlers::list_expired(identity.0, state.store.as_ref()).await?;
    Ok(Json(rooms))
}

/// GET /{id}/logs
async fn get_room_logs(
    State(state): State<AppState>,
    _identity: AuthIdentity,
    Path(room_id): Path<Uuid>,
) -> Result<Json<Vec<lastword_core::log::GameLog>>, ApiError> {
    let logs = query_handlers::get_room_logs(room_id, state.store.as_ref()).await?;
    Ok(Json(logs))
}

/// GET /{id}/me
async fn get_player_state(
    State(state): State<AppState>,
    identity: AuthIdentity,
    Path(room_id): Path<Uuid>,
) -> Result<Json<query_handlers::PlayerStateView>, ApiError> {
    let view =
        query_handlers::get_player_state(identity.0, room_id, state.store.as_ref()).await?;
    Ok(Json(view))
}

/// POST /{id}/join
#[instrument(skip(state, identity), fields(user_id = %identity.0.user_id, room_id = %room_id))]
async fn join_room(
    State(state): State<AppState>,
    identity: AuthIdentity,
    Path(room_id): Path<Uuid>,
) -> Result<Json<Player>, ApiError> {
    info!("handling join_room command");

    let player = command_handlers::handle_join_room(
        identity.0,
        &commands::JoinRoom { room_id },
        state.clock.as_ref(),
        state.store.as_ref(),
        state.notifier.as_ref(),
    )
    .await?;

    Ok(Json(player))
}

/// POST /{id}/leave
#[instrument(skip(state, identity), fields(user_id = %identity.0.user_id, room_id = %room_id))]
async fn leave_room(
    State(state): State<AppState>,
    identity: AuthIdentity,
    Path(room_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    info!("handling leave_room command");

    command_handlers::handle_leave_room(
        identity.0,
        &commands::LeaveRoom { room_id },
        state.clock.as_ref(),
        state.store.as_ref(),
        state.notifier.as_ref(),
    )
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /{id}/start
#[instrument(skip(state, identity), fields(user_id = %identity.0.user_id, room_id = %room_id))]
async fn start_game(
    State(state): State<AppState>,
    identity: AuthIdentity,
    Path(room_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    info!("handling start_game command");

    command_handlers::handle_start_game(
        identity.0,
        &commands::StartGame { room_id },
        state.clock.as_ref(),
        &state.rng,
        state.store.as_ref(),
        state.notifier.as_ref(),
    )
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /{id}/reassign
#[instrument(skip(state, identity), fields(user_id = %identity.0.user_id, room_id = %room_id))]
async fn reassign_targets(
    State(state): State<AppState>,
    identity: AuthIdentity,
    Path(room_id): Path<Uuid>,
) -> Result<Json<ReassignResponse>, ApiError> {
    info!("handling reassign_targets command");

    let outcome = assignment_handlers::handle_reassign_targets(
        identity.0,
        room_id,
        state.clock.as_ref(),
        &state.rng,
        state.store.as_ref(),
        state.notifier.as_ref(),
    )
    .await?;

    Ok(Json(ReassignResponse {
        reassigned: outcome.reassigned,
    }))
}

/// Returns the router for the room lifecycle.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_room))
        .route("/expired", get(list_expired))
        .route("/code/{code}", get(get_room_by_code))
        .route("/{id}", get(get_room))
        .route("/{id}/logs", get(get_room_logs))
        .route("/{id}/me", get(get_player_state))
        .route("/{id}/join", post(join_room))
        .route("/{id}/leave", post(leave_room))
        .route("/{id}/start", post(start_game))
        .route("/{id}/reassign", post(reassign_targets))
}
