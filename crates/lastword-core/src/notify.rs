//! Outbound notification vocabulary.
//!
//! The core emits typed payloads; realtime channels, push, and email are the
//! transport collaborator's concern. Dispatch is fire-and-forget: a failed
//! notification is logged and swallowed, never rolled back into the state
//! mutation that triggered it.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::model::{EliminationClaim, WordTriple};

/// A typed outbound event. Room-scoped variants fan out to the room channel;
/// user-scoped variants address a single user's devices.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// Room channel: a player joined the roster.
    PlayerJoined {
        /// The room.
        room_id: Uuid,
        /// The joining player.
        player_id: Uuid,
    },
    /// Room channel: a player left the roster.
    PlayerLeft {
        /// The room.
        room_id: Uuid,
        /// The leaving player.
        player_id: Uuid,
    },
    /// Room channel: the game started.
    GameStarted {
        /// The room.
        room_id: Uuid,
    },
    /// Room channel: an elimination became authoritative.
    Elimination {
        /// The room.
        room_id: Uuid,
        /// The killer.
        killer_id: Uuid,
        /// The eliminated player.
        target_id: Uuid,
    },
    /// Room channel: the game ended.
    GameEnded {
        /// The room.
        room_id: Uuid,
        /// The winning user, if any. A user id rather than a player id, like
        /// every other user-addressed field in this vocabulary.
        winner: Option<Uuid>,
    },
    /// Room channel: targets were reassigned mid-game.
    TargetsReassigned {
        /// The room.
        room_id: Uuid,
    },
    /// User push: invitation to a room.
    Invitation {
        /// The invited user.
        user_id: Uuid,
        /// The room.
        room_id: Uuid,
        /// Join code to surface in the invite.
        code: String,
        /// Room display name.
        room_name: String,
    },
    /// User push: someone filed an elimination claim against you.
    EliminationRequest {
        /// The targeted user.
        user_id: Uuid,
        /// The pending confirmation to respond to.
        confirmation_id: Uuid,
        /// The room.
        room_id: Uuid,
        /// The killer's claim.
        claim: EliminationClaim,
    },
    /// User push: your elimination claim was rejected.
    ClaimRejected {
        /// The claiming user.
        user_id: Uuid,
        /// The rejected confirmation.
        confirmation_id: Uuid,
        /// The room.
        room_id: Uuid,
    },
    /// User push: you have a new target and word triple.
    NewTarget {
        /// The user.
        user_id: Uuid,
        /// The room.
        room_id: Uuid,
        /// The new target player.
        target_id: Uuid,
        /// The words to use against them.
        words: WordTriple,
    },
}

/// Error from a notification transport.
#[derive(Debug, Error)]
#[error("notification dispatch failed: {0}")]
pub struct DispatchError(pub String);

/// Transport seam for outbound notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers one notification.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError` if the transport fails; callers treat this as
    /// best-effort and never fail the primary transaction over it.
    async fn dispatch(&self, notification: Notification) -> Result<(), DispatchError>;
}

/// Dispatches a notification, logging and swallowing any transport failure.
pub async fn dispatch_best_effort(notifier: &dyn Notifier, notification: Notification) {
    if let Err(err) = notifier.dispatch(notification).await {
        tracing::warn!(error = %err, "notification dropped");
    }
}

/// A notifier that drops everything. Used when no transport is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn dispatch(&self, _notification: Notification) -> Result<(), DispatchError> {
        Ok(())
    }
}
