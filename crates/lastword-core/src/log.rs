//! Append-only game log.
//!
//! Every state transition writes one entry atomically with its transaction,
//! so the log is a faithful audit trail of the room's history. Entries are
//! immutable once written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Typed tag identifying what a log entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    /// Room created with its initial roster.
    RoomCreated,
    /// A player joined the roster.
    PlayerJoined,
    /// A player left the roster.
    PlayerLeft,
    /// The game started and targets were assigned.
    GameStarted,
    /// A killer filed an elimination claim.
    EliminationRequested,
    /// The target accepted; the elimination is authoritative.
    EliminationAccepted,
    /// The target rejected the claim.
    EliminationRejected,
    /// The creator triggered a mid-game target reassignment.
    TargetsReassigned,
    /// The game ended with a winner (or none left).
    GameFinished,
    /// The expiration sweep force-closed the room.
    RoomExpired,
}

impl LogKind {
    /// Stable string form used in persistence.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RoomCreated => "room_created",
            Self::PlayerJoined => "player_joined",
            Self::PlayerLeft => "player_left",
            Self::GameStarted => "game_started",
            Self::EliminationRequested => "elimination_requested",
            Self::EliminationAccepted => "elimination_accepted",
            Self::EliminationRejected => "elimination_rejected",
            Self::TargetsReassigned => "targets_reassigned",
            Self::GameFinished => "game_finished",
            Self::RoomExpired => "room_expired",
        }
    }
}

impl std::str::FromStr for LogKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "room_created" => Ok(Self::RoomCreated),
            "player_joined" => Ok(Self::PlayerJoined),
            "player_left" => Ok(Self::PlayerLeft),
            "game_started" => Ok(Self::GameStarted),
            "elimination_requested" => Ok(Self::EliminationRequested),
            "elimination_accepted" => Ok(Self::EliminationAccepted),
            "elimination_rejected" => Ok(Self::EliminationRejected),
            "targets_reassigned" => Ok(Self::TargetsReassigned),
            "game_finished" => Ok(Self::GameFinished),
            "room_expired" => Ok(Self::RoomExpired),
            other => Err(format!("unknown log kind: {other}")),
        }
    }
}

/// One immutable game-log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameLog {
    /// Entry identifier.
    pub id: Uuid,
    /// The room the entry belongs to.
    pub room_id: Uuid,
    /// What happened.
    pub kind: LogKind,
    /// Human-readable description.
    pub message: String,
    /// Optional structured payload.
    pub payload: Option<serde_json::Value>,
    /// Acting player, if any.
    pub player: Option<Uuid>,
    /// Affected target player, if any.
    pub target: Option<Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl GameLog {
    /// Creates a log entry with no player/target refs or payload.
    #[must_use]
    pub fn new(
        room_id: Uuid,
        kind: LogKind,
        message: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            room_id,
            kind,
            message: message.into(),
            payload: None,
            player: None,
            target: None,
            created_at,
        }
    }

    /// Attaches the acting player.
    #[must_use]
    pub fn with_player(mut self, player: Uuid) -> Self {
        self.player = Some(player);
        self
    }

    /// Attaches the affected target.
    #[must_use]
    pub fn with_target(mut self, target: Uuid) -> Self {
        self.target = Some(target);
        self
    }

    /// Attaches a structured payload.
    #[must_use]
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }
}
