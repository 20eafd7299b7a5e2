//! Routes for the elimination protocol.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::post};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use lastword_core::model::{EliminationClaim, KillConfirmation};
use lastword_elimination::application::command_handlers::{self, RespondOutcome};
use lastword_elimination::domain::commands;

use crate::auth::AuthIdentity;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /eliminations/{id}/respond.
#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    /// `true` confirms the elimination, `false` disputes it.
    pub accepted: bool,
}

/// Response body for POST /eliminations/{id}/respond.
#[derive(Debug, Serialize)]
pub struct RespondResponse {
    /// Whether the elimination was confirmed.
    pub accepted: bool,
    /// Whether this response ended the game.
    pub game_finished: bool,
}

/// POST /rooms/{id}/eliminations
#[instrument(skip(state, identity, claim), fields(user_id = %identity.0.user_id, room_id = %room_id))]
async fn request_elimination(
    State(state): State<AppState>,
    identity: AuthIdentity,
    Path(room_id): Path<Uuid>,
    Json(claim): Json<EliminationClaim>,
) -> Result<Json<KillConfirmation>, ApiError> {
    info!("handling request_elimination command");

    let confirmation = command_handlers::handle_request_elimination(
        identity.0,
        &commands::RequestElimination { room_id, claim },
        state.clock.as_ref(),
        state.store.as_ref(),
        state.notifier.as_ref(),
    )
    .await?;

    Ok(Json(confirmation))
}

/// POST /eliminations/{id}/respond
#[instrument(skip(state, identity, request), fields(user_id = %identity.0.user_id, confirmation_id = %confirmation_id))]
async fn respond(
    State(state): State<AppState>,
    identity: AuthIdentity,
    Path(confirmation_id): Path<Uuid>,
    Json(request): Json<RespondRequest>,
) -> Result<Json<RespondResponse>, ApiError> {
    info!(accepted = request.accepted, "handling respond command");

    let outcome = command_handlers::handle_respond(
        identity.0,
        &commands::RespondToConfirmation {
            confirmation_id,
            accepted: request.accepted,
        },
        state.clock.as_ref(),
        state.store.as_ref(),
        state.notifier.as_ref(),
    )
    .await?;

    let response = match outcome {
        RespondOutcome::Rejected => RespondResponse {
            accepted: false,
            game_finished: false,
        },
        RespondOutcome::Accepted { game_finished } => RespondResponse {
            accepted: true,
            game_finished,
        },
    };
    Ok(Json(response))
}

/// Returns the router for the elimination protocol, mounted at the API root
/// so the claim route can live under `/rooms`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/rooms/{id}/eliminations", post(request_elimination))
        .route("/eliminations/{id}/respond", post(respond))
}
