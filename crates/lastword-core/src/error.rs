//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level domain error type.
///
/// `StateConflict` marks a compare-and-set precondition that no longer held
/// at commit time; callers should re-fetch state before retrying rather than
/// replaying the identical call.
#[derive(Debug, Error)]
pub enum GameError {
    /// A room, player, or confirmation was not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// The record kind that was looked up.
        kind: &'static str,
        /// The identifier that missed.
        id: Uuid,
    },

    /// Bad input, rejected before any mutation.
    #[error("validation error: {0}")]
    Validation(String),

    /// The acting identity may not perform this operation.
    #[error("authorization error: {0}")]
    Authorization(String),

    /// A precondition no longer holds (stale room/confirmation/player state).
    #[error("state conflict: {0}")]
    StateConflict(String),

    /// Too few joined players to start the game.
    #[error("insufficient players: {joined} joined, {required} required")]
    InsufficientPlayers {
        /// Players currently joined.
        joined: usize,
        /// Minimum required to start.
        required: usize,
    },

    /// The active word pool cannot cover the requested capacity.
    #[error("insufficient word pool: {available} active words, {required} required")]
    InsufficientWordPool {
        /// Active words available.
        available: usize,
        /// Words the room needs.
        required: usize,
    },

    /// A freshly generated room code already exists; the caller retries.
    #[error("room code collision")]
    CodeCollision,

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl GameError {
    /// Shorthand for a `NotFound` error.
    #[must_use]
    pub fn not_found(kind: &'static str, id: Uuid) -> Self {
        Self::NotFound { kind, id }
    }
}
