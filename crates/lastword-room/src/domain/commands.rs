//! Commands for the room lifecycle.

use serde::Deserialize;
use uuid::Uuid;

/// Command to create a room.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRoom {
    /// Display name for the room.
    pub name: String,
    /// Roster ceiling, 2–8.
    pub capacity: u32,
    /// Per-turn time limit in seconds, 30–300.
    pub time_limit_secs: u32,
    /// Users to invite; each gets a seat with `Invited` join status.
    #[serde(default)]
    pub invitees: Vec<Uuid>,
}

/// Command to start a waiting room's game.
#[derive(Debug, Clone, Copy)]
pub struct StartGame {
    /// The room to start.
    pub room_id: Uuid,
}

/// Command to join a room's roster (or accept an invitation).
#[derive(Debug, Clone, Copy)]
pub struct JoinRoom {
    /// The room to join.
    pub room_id: Uuid,
}

/// Command to leave a room's roster.
#[derive(Debug, Clone, Copy)]
pub struct LeaveRoom {
    /// The room to leave.
    pub room_id: Uuid,
}
