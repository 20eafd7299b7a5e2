//! In-memory `GameStore`.
//!
//! One mutex guards all tables, so every commit is trivially atomic; the
//! compare-and-set checks still run so concurrent callers observe the same
//! `StateConflict` behavior as against the SQL store. No await happens while
//! the lock is held.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lastword_core::error::GameError;
use lastword_core::log::GameLog;
use lastword_core::model::{
    ConfirmationStatus, JoinStatus, KillConfirmation, Player, PlayerStatus, Room, RoomStatus,
    UserStats, Word,
};
use lastword_core::store::{EliminationCommit, GameStore, StatDelta, TargetAssignment};
use uuid::Uuid;

#[derive(Debug, Default)]
struct Tables {
    rooms: HashMap<Uuid, Room>,
    players: HashMap<Uuid, Player>,
    confirmations: HashMap<Uuid, KillConfirmation>,
    logs: Vec<GameLog>,
    words: HashMap<Uuid, Word>,
    stats: HashMap<Uuid, UserStats>,
}

/// Mutex-guarded in-memory game store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, GameError> {
        self.tables
            .lock()
            .map_err(|_| GameError::Infrastructure("store mutex poisoned".to_owned()))
    }
}

fn conflict(msg: impl Into<String>) -> GameError {
    GameError::StateConflict(msg.into())
}

impl Tables {
    fn room_mut(&mut self, room_id: Uuid) -> Result<&mut Room, GameError> {
        self.rooms
            .get_mut(&room_id)
            .ok_or_else(|| GameError::not_found("room", room_id))
    }

    fn player_mut(&mut self, player_id: Uuid) -> Result<&mut Player, GameError> {
        self.players
            .get_mut(&player_id)
            .ok_or_else(|| GameError::not_found("player", player_id))
    }

    fn require_room_status(&self, room_id: Uuid, expected: RoomStatus) -> Result<(), GameError> {
        let room = self
            .rooms
            .get(&room_id)
            .ok_or_else(|| GameError::not_found("room", room_id))?;
        if room.status == expected {
            Ok(())
        } else {
            Err(conflict(format!(
                "room is {}, expected {}",
                room.status.as_str(),
                expected.as_str()
            )))
        }
    }

    fn apply_assignments(&mut self, assignments: Vec<TargetAssignment>) -> Result<(), GameError> {
        for assignment in assignments {
            let player = self.player_mut(assignment.player_id)?;
            player.target = Some(assignment.target_id);
            player.words = Some(assignment.words);
        }
        Ok(())
    }
}

#[async_trait]
impl GameStore for MemoryStore {
    async fn insert_word(&self, word: Word) -> Result<(), GameError> {
        let mut tables = self.lock()?;
        tables.words.insert(word.id, word);
        Ok(())
    }

    async fn active_words(&self) -> Result<Vec<Word>, GameError> {
        let tables = self.lock()?;
        let mut words: Vec<Word> = tables.words.values().filter(|w| w.active).cloned().collect();
        // Stable base order so scripted RNGs see deterministic draws.
        words.sort_by(|a, b| a.text.cmp(&b.text));
        Ok(words)
    }

    async fn words(&self, ids: &[Uuid]) -> Result<Vec<Word>, GameError> {
        let tables = self.lock()?;
        Ok(ids
            .iter()
            .filter_map(|id| tables.words.get(id).cloned())
            .collect())
    }

    async fn insert_room(
        &self,
        room: Room,
        players: Vec<Player>,
        log: GameLog,
    ) -> Result<(), GameError> {
        let mut tables = self.lock()?;
        if tables.rooms.values().any(|r| r.code == room.code) {
            return Err(GameError::CodeCollision);
        }
        for player in players {
            tables.players.insert(player.id, player);
        }
        tables.rooms.insert(room.id, room);
        tables.logs.push(log);
        Ok(())
    }

    async fn room(&self, room_id: Uuid) -> Result<Room, GameError> {
        let tables = self.lock()?;
        tables
            .rooms
            .get(&room_id)
            .cloned()
            .ok_or_else(|| GameError::not_found("room", room_id))
    }

    async fn room_by_code(&self, code: &str) -> Result<Room, GameError> {
        let tables = self.lock()?;
        tables
            .rooms
            .values()
            .find(|r| r.code == code)
            .cloned()
            .ok_or_else(|| GameError::not_found("room", Uuid::nil()))
    }

    async fn players(&self, room_id: Uuid) -> Result<Vec<Player>, GameError> {
        let tables = self.lock()?;
        let mut players: Vec<Player> = tables
            .players
            .values()
            .filter(|p| p.room_id == room_id)
            .cloned()
            .collect();
        players.sort_by_key(|p| p.position);
        Ok(players)
    }

    async fn player(&self, player_id: Uuid) -> Result<Player, GameError> {
        let tables = self.lock()?;
        tables
            .players
            .get(&player_id)
            .cloned()
            .ok_or_else(|| GameError::not_found("player", player_id))
    }

    async fn player_for_user(&self, room_id: Uuid, user_id: Uuid) -> Result<Player, GameError> {
        let tables = self.lock()?;
        tables
            .players
            .values()
            .find(|p| p.room_id == room_id && p.user_id == user_id)
            .cloned()
            .ok_or_else(|| GameError::not_found("player", user_id))
    }

    async fn insert_player(&self, player: Player, log: GameLog) -> Result<(), GameError> {
        let mut tables = self.lock()?;
        tables.require_room_status(player.room_id, RoomStatus::Waiting)?;
        let taken = tables.players.values().any(|p| {
            p.room_id == player.room_id
                && (p.position == player.position || p.user_id == player.user_id)
        });
        if taken {
            return Err(conflict("position or user already present in room"));
        }
        tables.players.insert(player.id, player);
        tables.logs.push(log);
        Ok(())
    }

    async fn set_join_status(
        &self,
        player_id: Uuid,
        expected: JoinStatus,
        next: JoinStatus,
        log: GameLog,
    ) -> Result<(), GameError> {
        let mut tables = self.lock()?;
        let player = tables.player_mut(player_id)?;
        if player.join_status != expected {
            return Err(conflict(format!(
                "player is {}, expected {}",
                player.join_status.as_str(),
                expected.as_str()
            )));
        }
        player.join_status = next;
        tables.logs.push(log);
        Ok(())
    }

    async fn mark_starting(&self, room_id: Uuid) -> Result<(), GameError> {
        let mut tables = self.lock()?;
        tables.require_room_status(room_id, RoomStatus::Waiting)?;
        tables.room_mut(room_id)?.status = RoomStatus::Starting;
        Ok(())
    }

    async fn reset_starting(&self, room_id: Uuid) -> Result<(), GameError> {
        let mut tables = self.lock()?;
        tables.require_room_status(room_id, RoomStatus::Starting)?;
        tables.room_mut(room_id)?.status = RoomStatus::Waiting;
        Ok(())
    }

    async fn commit_start(
        &self,
        room_id: Uuid,
        assignments: Vec<TargetAssignment>,
        started_at: DateTime<Utc>,
        log: GameLog,
    ) -> Result<(), GameError> {
        let mut tables = self.lock()?;
        tables.require_room_status(room_id, RoomStatus::Starting)?;
        tables.apply_assignments(assignments)?;
        let room = tables.room_mut(room_id)?;
        room.status = RoomStatus::InProgress;
        room.round = 1;
        room.started_at = Some(started_at);
        tables.logs.push(log);
        Ok(())
    }

    async fn commit_reassignment(
        &self,
        room_id: Uuid,
        assignments: Vec<TargetAssignment>,
        log: GameLog,
    ) -> Result<(), GameError> {
        let mut tables = self.lock()?;
        tables.require_room_status(room_id, RoomStatus::InProgress)?;
        tables.apply_assignments(assignments)?;
        tables.room_mut(room_id)?.round += 1;
        tables.logs.push(log);
        Ok(())
    }

    async fn insert_confirmation(
        &self,
        confirmation: KillConfirmation,
        log: GameLog,
    ) -> Result<(), GameError> {
        let mut tables = self.lock()?;
        tables.require_room_status(confirmation.room_id, RoomStatus::InProgress)?;

        let killer = tables
            .players
            .get(&confirmation.killer)
            .ok_or_else(|| GameError::not_found("player", confirmation.killer))?;
        if !killer.is_alive_joined() {
            return Err(conflict("killer is no longer alive in this room"));
        }
        if killer.target != Some(confirmation.target) {
            return Err(conflict("claimed target is not the killer's current target"));
        }
        let already_pending = tables.confirmations.values().any(|c| {
            c.killer == confirmation.killer && c.status == ConfirmationStatus::Pending
        });
        if already_pending {
            return Err(conflict("killer already has a pending confirmation"));
        }

        tables.confirmations.insert(confirmation.id, confirmation);
        tables.logs.push(log);
        Ok(())
    }

    async fn confirmation(&self, confirmation_id: Uuid) -> Result<KillConfirmation, GameError> {
        let tables = self.lock()?;
        tables
            .confirmations
            .get(&confirmation_id)
            .cloned()
            .ok_or_else(|| GameError::not_found("confirmation", confirmation_id))
    }

    async fn reject_confirmation(
        &self,
        confirmation_id: Uuid,
        responded_at: DateTime<Utc>,
        log: GameLog,
    ) -> Result<(), GameError> {
        let mut tables = self.lock()?;
        let confirmation = tables
            .confirmations
            .get_mut(&confirmation_id)
            .ok_or_else(|| GameError::not_found("confirmation", confirmation_id))?;
        if confirmation.status != ConfirmationStatus::Pending {
            return Err(conflict("confirmation is already resolved"));
        }
        confirmation.status = ConfirmationStatus::Rejected;
        confirmation.responded_at = Some(responded_at);
        tables.logs.push(log);
        Ok(())
    }

    async fn commit_elimination(
        &self,
        commit: EliminationCommit,
    ) -> Result<Option<TargetAssignment>, GameError> {
        let mut tables = self.lock()?;

        // Re-check every precondition before touching anything so a failed
        // commit leaves no partial application behind.
        tables.require_room_status(commit.room_id, RoomStatus::InProgress)?;
        let confirmation = tables
            .confirmations
            .get(&commit.confirmation_id)
            .ok_or_else(|| GameError::not_found("confirmation", commit.confirmation_id))?;
        if confirmation.status != ConfirmationStatus::Pending {
            return Err(conflict("confirmation is already resolved"));
        }
        let target = tables
            .players
            .get(&commit.target_id)
            .ok_or_else(|| GameError::not_found("player", commit.target_id))?;
        if target.status != PlayerStatus::Alive {
            return Err(conflict("target is no longer alive"));
        }
        let killer = tables
            .players
            .get(&commit.killer_id)
            .ok_or_else(|| GameError::not_found("player", commit.killer_id))?;
        if killer.target != Some(commit.target_id) {
            return Err(conflict("killer's target changed since the claim"));
        }

        // The inherited edge comes from the target's row as it stands now,
        // never from what the caller observed earlier.
        let splice = target
            .target
            .filter(|next| *next != commit.killer_id)
            .and_then(|next| {
                target.words.clone().map(|words| TargetAssignment {
                    player_id: commit.killer_id,
                    target_id: next,
                    words,
                })
            });

        let confirmation = tables
            .confirmations
            .get_mut(&commit.confirmation_id)
            .ok_or_else(|| GameError::not_found("confirmation", commit.confirmation_id))?;
        confirmation.status = ConfirmationStatus::Accepted;
        confirmation.responded_at = Some(commit.responded_at);

        let target = tables.player_mut(commit.target_id)?;
        target.status = PlayerStatus::Eliminated;
        target.eliminated_at = Some(commit.responded_at);

        let killer = tables.player_mut(commit.killer_id)?;
        killer.kills += 1;
        killer.target = splice.as_ref().map(|s| s.target_id);
        killer.words = splice.as_ref().map(|s| s.words.clone());

        tables.logs.push(commit.log);
        Ok(splice)
    }

    async fn commit_finish(
        &self,
        room_id: Uuid,
        winner: Option<Uuid>,
        finished_at: DateTime<Utc>,
        stats: Vec<StatDelta>,
        log: GameLog,
    ) -> Result<(), GameError> {
        let mut tables = self.lock()?;
        tables.require_room_status(room_id, RoomStatus::InProgress)?;

        if let Some(winner_id) = winner {
            tables.player_mut(winner_id)?.status = PlayerStatus::Winner;
        }
        let room = tables.room_mut(room_id)?;
        room.status = RoomStatus::Finished;
        room.finished_at = Some(finished_at);
        room.winner = winner;

        for delta in stats {
            let entry = tables.stats.entry(delta.user_id).or_default();
            entry.games_played += 1;
            entry.total_kills += delta.kills;
            if delta.won {
                entry.games_won += 1;
            }
        }
        tables.logs.push(log);
        Ok(())
    }

    async fn expire_room(
        &self,
        room_id: Uuid,
        finished_at: DateTime<Utc>,
        log: GameLog,
    ) -> Result<(), GameError> {
        let mut tables = self.lock()?;
        tables.require_room_status(room_id, RoomStatus::InProgress)?;

        let room = tables.room_mut(room_id)?;
        room.status = RoomStatus::Expired;
        room.finished_at = Some(finished_at);

        for player in tables.players.values_mut().filter(|p| p.room_id == room_id) {
            if player.status == PlayerStatus::Alive {
                player.status = PlayerStatus::Eliminated;
                player.eliminated_at = Some(finished_at);
            }
        }
        tables.logs.push(log);
        Ok(())
    }

    async fn stale_rooms(&self, cutoff: DateTime<Utc>) -> Result<Vec<Room>, GameError> {
        let tables = self.lock()?;
        Ok(tables
            .rooms
            .values()
            .filter(|r| {
                r.status == RoomStatus::InProgress
                    && r.started_at.is_some_and(|started| started < cutoff)
            })
            .cloned()
            .collect())
    }

    async fn expired_rooms(&self) -> Result<Vec<Room>, GameError> {
        let tables = self.lock()?;
        Ok(tables
            .rooms
            .values()
            .filter(|r| r.status == RoomStatus::Expired)
            .cloned()
            .collect())
    }

    async fn append_log(&self, log: GameLog) -> Result<(), GameError> {
        let mut tables = self.lock()?;
        tables.logs.push(log);
        Ok(())
    }

    async fn logs(&self, room_id: Uuid) -> Result<Vec<GameLog>, GameError> {
        let tables = self.lock()?;
        Ok(tables
            .logs
            .iter()
            .filter(|l| l.room_id == room_id)
            .cloned()
            .collect())
    }

    async fn user_stats(&self, user_id: Uuid) -> Result<UserStats, GameError> {
        let tables = self.lock()?;
        Ok(tables.stats.get(&user_id).cloned().unwrap_or_default())
    }
}
