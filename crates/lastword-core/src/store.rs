//! Persistence abstraction.
//!
//! Many request handlers run concurrently against one shared store and no
//! in-process lock spans instances, so every cross-request hazard is pushed
//! into the store as a compare-and-set commit: each `commit_*` / `mark_*`
//! method re-checks its preconditions at commit time and fails
//! [`GameError::StateConflict`] without partial application. Log entries
//! passed into a commit are written atomically with it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::GameError;
use crate::log::GameLog;
use crate::model::{
    JoinStatus, KillConfirmation, Player, Room, UserStats, Word, WordTriple,
};

/// One player's ring assignment: outgoing target edge plus word triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetAssignment {
    /// The player being assigned.
    pub player_id: Uuid,
    /// Their new target.
    pub target_id: Uuid,
    /// Their new word triple.
    pub words: WordTriple,
}

/// The full accepted-elimination transaction, applied atomically.
///
/// Preconditions re-checked at commit: the confirmation is still `Pending`,
/// the target is still `Alive`, the room is still `InProgress`, and the
/// target is still the killer's current target. The killer's inherited edge
/// and words are derived from the target's row inside the transaction, so an
/// overlapping elimination or reassignment can never splice a stale ring.
#[derive(Debug, Clone)]
pub struct EliminationCommit {
    /// The confirmation being accepted.
    pub confirmation_id: Uuid,
    /// The room.
    pub room_id: Uuid,
    /// The killer; gains a kill and inherits the target's assignment.
    pub killer_id: Uuid,
    /// The player being eliminated.
    pub target_id: Uuid,
    /// Response timestamp, also used as the target's `eliminated_at`.
    pub responded_at: DateTime<Utc>,
    /// Elimination log entry, written in the same transaction.
    pub log: GameLog,
}

/// Stat adjustments for one user when a game finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatDelta {
    /// The user whose aggregate stats change.
    pub user_id: Uuid,
    /// Whether this user won the game.
    pub won: bool,
    /// Kills the user made in this game.
    pub kills: u32,
}

/// Repository trait for the shared game state.
#[async_trait]
pub trait GameStore: Send + Sync {
    /// Adds a word to the pool.
    async fn insert_word(&self, word: Word) -> Result<(), GameError>;

    /// Returns every active word.
    async fn active_words(&self) -> Result<Vec<Word>, GameError>;

    /// Returns the words with the given ids (missing ids are skipped).
    async fn words(&self, ids: &[Uuid]) -> Result<Vec<Word>, GameError>;

    /// Inserts a room with its initial roster and creation log entry.
    ///
    /// Fails `CodeCollision` if the room code is already taken; the caller
    /// draws a fresh code and retries.
    async fn insert_room(
        &self,
        room: Room,
        players: Vec<Player>,
        log: GameLog,
    ) -> Result<(), GameError>;

    /// Loads a room by id.
    async fn room(&self, room_id: Uuid) -> Result<Room, GameError>;

    /// Loads a room by its join code.
    async fn room_by_code(&self, code: &str) -> Result<Room, GameError>;

    /// Loads a room's full roster, ordered by position.
    async fn players(&self, room_id: Uuid) -> Result<Vec<Player>, GameError>;

    /// Loads one player by id.
    async fn player(&self, player_id: Uuid) -> Result<Player, GameError>;

    /// Loads the player record a user holds in a room.
    async fn player_for_user(&self, room_id: Uuid, user_id: Uuid) -> Result<Player, GameError>;

    /// Adds a player to a Waiting room's roster.
    ///
    /// Re-checks at commit that the room is still `Waiting`, that the
    /// position is free, and that the user holds no record in the room yet.
    async fn insert_player(&self, player: Player, log: GameLog) -> Result<(), GameError>;

    /// Compare-and-sets a player's join status.
    async fn set_join_status(
        &self,
        player_id: Uuid,
        expected: JoinStatus,
        next: JoinStatus,
        log: GameLog,
    ) -> Result<(), GameError>;

    /// Claims the start transition: `Waiting → Starting`. Exactly one of two
    /// racing starters wins this CAS.
    async fn mark_starting(&self, room_id: Uuid) -> Result<(), GameError>;

    /// Releases a claimed start: `Starting → Waiting`. Backs out when
    /// building the initial assignments fails after `mark_starting`, so the
    /// room never strands in a state no other operation accepts.
    async fn reset_starting(&self, room_id: Uuid) -> Result<(), GameError>;

    /// Completes the start: `Starting → InProgress`, stamps `started_at`,
    /// sets round 1, and applies the initial ring assignments.
    async fn commit_start(
        &self,
        room_id: Uuid,
        assignments: Vec<TargetAssignment>,
        started_at: DateTime<Utc>,
        log: GameLog,
    ) -> Result<(), GameError>;

    /// Applies a mid-game reassignment over the alive roster and bumps the
    /// round counter. Requires the room to still be `InProgress`.
    async fn commit_reassignment(
        &self,
        room_id: Uuid,
        assignments: Vec<TargetAssignment>,
        log: GameLog,
    ) -> Result<(), GameError>;

    /// Inserts a pending confirmation.
    ///
    /// Re-checks at commit: the room is `InProgress`, the killer is alive
    /// and joined with the confirmation's target as their current target,
    /// and the killer has no other pending confirmation.
    async fn insert_confirmation(
        &self,
        confirmation: KillConfirmation,
        log: GameLog,
    ) -> Result<(), GameError>;

    /// Loads one confirmation by id.
    async fn confirmation(&self, confirmation_id: Uuid) -> Result<KillConfirmation, GameError>;

    /// Compare-and-sets a confirmation `Pending → Rejected`. No player state
    /// changes.
    async fn reject_confirmation(
        &self,
        confirmation_id: Uuid,
        responded_at: DateTime<Utc>,
        log: GameLog,
    ) -> Result<(), GameError>;

    /// Applies an accepted elimination as one atomic transaction; see
    /// [`EliminationCommit`]. Returns the killer's new assignment, or `None`
    /// when the inherited edge would self-loop (the last two standing).
    async fn commit_elimination(
        &self,
        commit: EliminationCommit,
    ) -> Result<Option<TargetAssignment>, GameError>;

    /// Finishes a game: `InProgress → Finished`, crowns the winner, applies
    /// stat deltas exactly once. The status CAS makes double invocation
    /// fail cleanly.
    async fn commit_finish(
        &self,
        room_id: Uuid,
        winner: Option<Uuid>,
        finished_at: DateTime<Utc>,
        stats: Vec<StatDelta>,
        log: GameLog,
    ) -> Result<(), GameError>;

    /// Force-closes a stale room: `InProgress → Expired`, every player
    /// eliminated, no winner.
    async fn expire_room(
        &self,
        room_id: Uuid,
        finished_at: DateTime<Utc>,
        log: GameLog,
    ) -> Result<(), GameError>;

    /// Returns `InProgress` rooms whose `started_at` is before `cutoff`.
    async fn stale_rooms(&self, cutoff: DateTime<Utc>) -> Result<Vec<Room>, GameError>;

    /// Returns every `Expired` room.
    async fn expired_rooms(&self) -> Result<Vec<Room>, GameError>;

    /// Appends a standalone log entry.
    async fn append_log(&self, log: GameLog) -> Result<(), GameError>;

    /// Returns a room's log, oldest first.
    async fn logs(&self, room_id: Uuid) -> Result<Vec<GameLog>, GameError>;

    /// Returns a user's aggregate stats (zeroed if never finished a game).
    async fn user_stats(&self, user_id: Uuid) -> Result<UserStats, GameError>;
}
