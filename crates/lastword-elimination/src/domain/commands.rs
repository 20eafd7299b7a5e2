//! Commands for the elimination protocol.

use lastword_core::model::EliminationClaim;
use serde::Deserialize;
use uuid::Uuid;

/// Command by which a killer claims their current target.
#[derive(Debug, Clone)]
pub struct RequestElimination {
    /// Room the claim is made in.
    pub room_id: Uuid,
    /// How the killer says the elimination happened.
    pub claim: EliminationClaim,
}

/// Command by which a target answers a pending confirmation.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RespondToConfirmation {
    /// The confirmation being answered.
    #[serde(skip)]
    pub confirmation_id: Uuid,
    /// `true` confirms the elimination, `false` disputes it.
    pub accepted: bool,
}
