//! Persisted data model for rooms, players, confirmations, and stats.
//!
//! Nothing here is ever physically deleted; terminal states exist so every
//! row survives for audit and history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Smallest allowed room capacity.
pub const MIN_CAPACITY: u32 = 2;
/// Largest allowed room capacity.
pub const MAX_CAPACITY: u32 = 8;
/// Smallest allowed per-turn time limit, in seconds.
pub const MIN_TIME_LIMIT_SECS: u32 = 30;
/// Largest allowed per-turn time limit, in seconds.
pub const MAX_TIME_LIMIT_SECS: u32 = 300;
/// Words in one assigned triple.
pub const WORDS_PER_PLAYER: usize = 3;

/// Room lifecycle status. Transitions are monotonic:
/// `Waiting → Starting → InProgress → Finished | Expired`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    /// Roster is open, game not started.
    Waiting,
    /// Start claimed; targets being assigned.
    Starting,
    /// Game running.
    InProgress,
    /// Game ended with a winner (or none left).
    Finished,
    /// Force-closed by the expiration sweep.
    Expired,
}

impl RoomStatus {
    /// Stable string form used in persistence.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Starting => "starting",
            Self::InProgress => "in_progress",
            Self::Finished => "finished",
            Self::Expired => "expired",
        }
    }
}

impl std::str::FromStr for RoomStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "waiting" => Ok(Self::Waiting),
            "starting" => Ok(Self::Starting),
            "in_progress" => Ok(Self::InProgress),
            "finished" => Ok(Self::Finished),
            "expired" => Ok(Self::Expired),
            other => Err(format!("unknown room status: {other}")),
        }
    }
}

/// A play session with a fixed roster ceiling and shared word pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    /// Room identifier.
    pub id: Uuid,
    /// Short unique join code. Immutable once created.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Roster ceiling, 2–8.
    pub capacity: u32,
    /// Lifecycle status.
    pub status: RoomStatus,
    /// Round counter; 1 after start, bumped on each reassignment.
    pub round: u32,
    /// Per-turn time limit in seconds, 30–300.
    pub time_limit_secs: u32,
    /// User who created the room.
    pub creator: Uuid,
    /// Word ids drawn for this room at creation.
    pub word_pool: Vec<Uuid>,
    /// Winning player, set by the finalizer.
    pub winner: Option<Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Stamped on the Waiting → InProgress transition.
    pub started_at: Option<DateTime<Utc>>,
    /// Stamped on Finished or Expired.
    pub finished_at: Option<DateTime<Utc>>,
}

/// Player elimination status. Orthogonal to [`JoinStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerStatus {
    /// Still in the game.
    Alive,
    /// Confirmed eliminated.
    Eliminated,
    /// Last player standing.
    Winner,
}

impl PlayerStatus {
    /// Stable string form used in persistence.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Alive => "alive",
            Self::Eliminated => "eliminated",
            Self::Winner => "winner",
        }
    }
}

impl std::str::FromStr for PlayerStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "alive" => Ok(Self::Alive),
            "eliminated" => Ok(Self::Eliminated),
            "winner" => Ok(Self::Winner),
            other => Err(format!("unknown player status: {other}")),
        }
    }
}

/// Roster membership status. Orthogonal to [`PlayerStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinStatus {
    /// Invited but not yet joined.
    Invited,
    /// Joined the roster.
    Joined,
    /// Left the roster.
    Left,
}

impl JoinStatus {
    /// Stable string form used in persistence.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Invited => "invited",
            Self::Joined => "joined",
            Self::Left => "left",
        }
    }
}

impl std::str::FromStr for JoinStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "invited" => Ok(Self::Invited),
            "joined" => Ok(Self::Joined),
            "left" => Ok(Self::Left),
            other => Err(format!("unknown join status: {other}")),
        }
    }
}

/// The three words a player must get their target to say.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordTriple(pub [String; 3]);

impl WordTriple {
    /// Creates a triple from three words.
    #[must_use]
    pub fn new(a: impl Into<String>, b: impl Into<String>, c: impl Into<String>) -> Self {
        Self([a.into(), b.into(), c.into()])
    }
}

/// A user's per-room membership record, distinct from their global profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Player identifier.
    pub id: Uuid,
    /// The owning user.
    pub user_id: Uuid,
    /// The room this membership belongs to.
    pub room_id: Uuid,
    /// Seat position, unique per room, 1-based.
    pub position: u32,
    /// Elimination status.
    pub status: PlayerStatus,
    /// Roster membership status.
    pub join_status: JoinStatus,
    /// Confirmed eliminations by this player.
    pub kills: u32,
    /// Current target in the ring; another player in the same room.
    pub target: Option<Uuid>,
    /// Assigned word triple.
    pub words: Option<WordTriple>,
    /// Stamped when the player is eliminated.
    pub eliminated_at: Option<DateTime<Utc>>,
}

impl Player {
    /// The single-sourced "counts toward the ring" predicate: alive and
    /// joined. Start, elimination, reassignment, and the finalizer must all
    /// agree on this filter.
    #[must_use]
    pub fn is_alive_joined(&self) -> bool {
        self.status == PlayerStatus::Alive && self.join_status == JoinStatus::Joined
    }
}

/// Filters a roster down to the players that count toward the ring.
#[must_use]
pub fn alive_joined(players: &[Player]) -> Vec<&Player> {
    players.iter().filter(|p| p.is_alive_joined()).collect()
}

/// Elimination confirmation handshake status. `Pending` is the only
/// non-terminal state; `Accepted` and `Rejected` admit no further
/// transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationStatus {
    /// Awaiting the target's response.
    Pending,
    /// Target confirmed; the elimination is authoritative.
    Accepted,
    /// Target denied the claim.
    Rejected,
}

impl ConfirmationStatus {
    /// Stable string form used in persistence.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

impl std::str::FromStr for ConfirmationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown confirmation status: {other}")),
        }
    }
}

/// What the killer claims happened. All variants resolve through the same
/// accept/reject handshake; only the payload differs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum EliminationClaim {
    /// Plain kill request with no supporting detail.
    Direct,
    /// Free-text account of how the target was caught.
    WordClaim {
        /// The killer's account.
        message: String,
    },
    /// A specific word the target allegedly said.
    WordGuess {
        /// The claimed word.
        word: String,
    },
}

/// A two-phase elimination claim awaiting the target's acknowledgment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KillConfirmation {
    /// Confirmation identifier.
    pub id: Uuid,
    /// The room the claim belongs to.
    pub room_id: Uuid,
    /// The claiming player.
    pub killer: Uuid,
    /// The claimed target; equals the killer's assigned target at creation.
    pub target: Uuid,
    /// Handshake status.
    pub status: ConfirmationStatus,
    /// The claim payload.
    pub claim: EliminationClaim,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Stamped when accepted or rejected.
    pub responded_at: Option<DateTime<Utc>>,
}

/// One entry of the shared word pool the admin collaborator maintains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Word {
    /// Word identifier.
    pub id: Uuid,
    /// The word itself.
    pub text: String,
    /// Only active words are drawn into new rooms.
    pub active: bool,
}

/// Aggregate per-user statistics updated by the win finalizer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    /// Games this user finished (as a joined player).
    pub games_played: u32,
    /// Games this user won.
    pub games_won: u32,
    /// Confirmed eliminations across all games.
    pub total_kills: u32,
}
