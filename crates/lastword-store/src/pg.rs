//! PostgreSQL implementation of the `GameStore` trait.
//!
//! Every compare-and-set commit runs inside a transaction built from guarded
//! `UPDATE ... WHERE status = <expected>` statements; a zero row count means
//! the precondition no longer held and the transaction rolls back untouched.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use lastword_core::error::GameError;
use lastword_core::log::GameLog;
use lastword_core::model::{
    JoinStatus, KillConfirmation, Player, Room, UserStats, Word, WordTriple,
};
use lastword_core::store::{EliminationCommit, GameStore, StatDelta, TargetAssignment};

/// PostgreSQL-backed game store.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Creates a new `PgStore`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the game tables if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Infrastructure` on any database error.
    pub async fn apply_schema(&self) -> Result<(), GameError> {
        sqlx::raw_sql(crate::schema::CREATE_TABLES)
            .execute(&self.pool)
            .await
            .map_err(infra)?;
        Ok(())
    }
}

fn infra(err: sqlx::Error) -> GameError {
    GameError::Infrastructure(err.to_string())
}

fn conflict(msg: &str) -> GameError {
    GameError::StateConflict(msg.to_owned())
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

// Domain counters (capacity, round, kills, position) are small and bounded,
// stored as INT.
fn read_u32(row: &PgRow, column: &str) -> Result<u32, GameError> {
    let value: i32 = row.try_get(column).map_err(infra)?;
    u32::try_from(value)
        .map_err(|_| GameError::Infrastructure(format!("negative counter in column {column}")))
}

#[allow(clippy::cast_possible_wrap)]
fn db_int(value: u32) -> i32 {
    value as i32
}

fn parse<T: std::str::FromStr<Err = String>>(raw: &str) -> Result<T, GameError> {
    raw.parse().map_err(GameError::Infrastructure)
}

fn room_from_row(row: &PgRow) -> Result<Room, GameError> {
    let status: String = row.try_get("status").map_err(infra)?;
    Ok(Room {
        id: row.try_get("id").map_err(infra)?,
        code: row.try_get("code").map_err(infra)?,
        name: row.try_get("name").map_err(infra)?,
        capacity: read_u32(row, "capacity")?,
        status: parse(&status)?,
        round: read_u32(row, "round")?,
        time_limit_secs: read_u32(row, "time_limit_secs")?,
        creator: row.try_get("creator").map_err(infra)?,
        word_pool: row.try_get("word_pool").map_err(infra)?,
        winner: row.try_get("winner").map_err(infra)?,
        created_at: row.try_get("created_at").map_err(infra)?,
        started_at: row.try_get("started_at").map_err(infra)?,
        finished_at: row.try_get("finished_at").map_err(infra)?,
    })
}

fn player_from_row(row: &PgRow) -> Result<Player, GameError> {
    let status: String = row.try_get("status").map_err(infra)?;
    let join_status: String = row.try_get("join_status").map_err(infra)?;
    let words: Option<serde_json::Value> = row.try_get("words").map_err(infra)?;
    let words: Option<WordTriple> = match words {
        Some(value) => Some(
            serde_json::from_value(value)
                .map_err(|e| GameError::Infrastructure(format!("bad word triple: {e}")))?,
        ),
        None => None,
    };
    Ok(Player {
        id: row.try_get("id").map_err(infra)?,
        user_id: row.try_get("user_id").map_err(infra)?,
        room_id: row.try_get("room_id").map_err(infra)?,
        position: read_u32(row, "position")?,
        status: parse(&status)?,
        join_status: parse(&join_status)?,
        kills: read_u32(row, "kills")?,
        target: row.try_get("target").map_err(infra)?,
        words,
        eliminated_at: row.try_get("eliminated_at").map_err(infra)?,
    })
}

fn confirmation_from_row(row: &PgRow) -> Result<KillConfirmation, GameError> {
    let status: String = row.try_get("status").map_err(infra)?;
    let claim: serde_json::Value = row.try_get("claim").map_err(infra)?;
    Ok(KillConfirmation {
        id: row.try_get("id").map_err(infra)?,
        room_id: row.try_get("room_id").map_err(infra)?,
        killer: row.try_get("killer").map_err(infra)?,
        target: row.try_get("target").map_err(infra)?,
        status: parse(&status)?,
        claim: serde_json::from_value(claim)
            .map_err(|e| GameError::Infrastructure(format!("bad claim payload: {e}")))?,
        created_at: row.try_get("created_at").map_err(infra)?,
        responded_at: row.try_get("responded_at").map_err(infra)?,
    })
}

fn log_from_row(row: &PgRow) -> Result<GameLog, GameError> {
    let kind: String = row.try_get("kind").map_err(infra)?;
    Ok(GameLog {
        id: row.try_get("id").map_err(infra)?,
        room_id: row.try_get("room_id").map_err(infra)?,
        kind: parse(&kind)?,
        message: row.try_get("message").map_err(infra)?,
        payload: row.try_get("payload").map_err(infra)?,
        player: row.try_get("player").map_err(infra)?,
        target: row.try_get("target").map_err(infra)?,
        created_at: row.try_get("created_at").map_err(infra)?,
    })
}

fn words_json(words: Option<&WordTriple>) -> Result<Option<serde_json::Value>, GameError> {
    words
        .map(|w| {
            serde_json::to_value(w)
                .map_err(|e| GameError::Infrastructure(format!("word triple serialization: {e}")))
        })
        .transpose()
}

async fn insert_log_tx(
    tx: &mut Transaction<'_, Postgres>,
    log: &GameLog,
) -> Result<(), GameError> {
    sqlx::query(
        "INSERT INTO game_logs (id, room_id, kind, message, payload, player, target, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(log.id)
    .bind(log.room_id)
    .bind(log.kind.as_str())
    .bind(&log.message)
    .bind(&log.payload)
    .bind(log.player)
    .bind(log.target)
    .bind(log.created_at)
    .execute(&mut **tx)
    .await
    .map_err(infra)?;
    Ok(())
}

/// Locks a room row and checks its status inside a transaction.
async fn require_room_status_tx(
    tx: &mut Transaction<'_, Postgres>,
    room_id: Uuid,
    expected: &str,
) -> Result<(), GameError> {
    let row = sqlx::query("SELECT status FROM rooms WHERE id = $1 FOR UPDATE")
        .bind(room_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(infra)?
        .ok_or_else(|| GameError::not_found("room", room_id))?;
    let status: String = row.try_get("status").map_err(infra)?;
    if status == expected {
        Ok(())
    } else {
        Err(GameError::StateConflict(format!(
            "room is {status}, expected {expected}"
        )))
    }
}

async fn apply_assignments_tx(
    tx: &mut Transaction<'_, Postgres>,
    assignments: &[TargetAssignment],
) -> Result<(), GameError> {
    for assignment in assignments {
        let updated = sqlx::query("UPDATE players SET target = $2, words = $3 WHERE id = $1")
            .bind(assignment.player_id)
            .bind(assignment.target_id)
            .bind(words_json(Some(&assignment.words))?)
            .execute(&mut **tx)
            .await
            .map_err(infra)?;
        if updated.rows_affected() != 1 {
            return Err(GameError::not_found("player", assignment.player_id));
        }
    }
    Ok(())
}

#[async_trait]
impl GameStore for PgStore {
    async fn insert_word(&self, word: Word) -> Result<(), GameError> {
        sqlx::query("INSERT INTO words (id, text, active) VALUES ($1, $2, $3)")
            .bind(word.id)
            .bind(&word.text)
            .bind(word.active)
            .execute(&self.pool)
            .await
            .map_err(infra)?;
        Ok(())
    }

    async fn active_words(&self) -> Result<Vec<Word>, GameError> {
        let rows = sqlx::query("SELECT id, text, active FROM words WHERE active ORDER BY text")
            .fetch_all(&self.pool)
            .await
            .map_err(infra)?;
        rows.iter()
            .map(|row| {
                Ok(Word {
                    id: row.try_get("id").map_err(infra)?,
                    text: row.try_get("text").map_err(infra)?,
                    active: row.try_get("active").map_err(infra)?,
                })
            })
            .collect()
    }

    async fn words(&self, ids: &[Uuid]) -> Result<Vec<Word>, GameError> {
        let rows = sqlx::query("SELECT id, text, active FROM words WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(infra)?;
        rows.iter()
            .map(|row| {
                Ok(Word {
                    id: row.try_get("id").map_err(infra)?,
                    text: row.try_get("text").map_err(infra)?,
                    active: row.try_get("active").map_err(infra)?,
                })
            })
            .collect()
    }

    async fn insert_room(
        &self,
        room: Room,
        players: Vec<Player>,
        log: GameLog,
    ) -> Result<(), GameError> {
        let mut tx = self.pool.begin().await.map_err(infra)?;

        let inserted = sqlx::query(
            "INSERT INTO rooms (id, code, name, capacity, status, round, time_limit_secs,
                                creator, word_pool, winner, created_at, started_at, finished_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(room.id)
        .bind(&room.code)
        .bind(&room.name)
        .bind(db_int(room.capacity))
        .bind(room.status.as_str())
        .bind(db_int(room.round))
        .bind(db_int(room.time_limit_secs))
        .bind(room.creator)
        .bind(&room.word_pool)
        .bind(room.winner)
        .bind(room.created_at)
        .bind(room.started_at)
        .bind(room.finished_at)
        .execute(&mut *tx)
        .await;
        if let Err(err) = inserted {
            if is_unique_violation(&err) {
                return Err(GameError::CodeCollision);
            }
            return Err(infra(err));
        }

        for player in &players {
            sqlx::query(
                "INSERT INTO players (id, user_id, room_id, position, status, join_status,
                                      kills, target, words, eliminated_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
            )
            .bind(player.id)
            .bind(player.user_id)
            .bind(player.room_id)
            .bind(db_int(player.position))
            .bind(player.status.as_str())
            .bind(player.join_status.as_str())
            .bind(db_int(player.kills))
            .bind(player.target)
            .bind(words_json(player.words.as_ref())?)
            .bind(player.eliminated_at)
            .execute(&mut *tx)
            .await
            .map_err(infra)?;
        }

        insert_log_tx(&mut tx, &log).await?;
        tx.commit().await.map_err(infra)
    }

    async fn room(&self, room_id: Uuid) -> Result<Room, GameError> {
        let row = sqlx::query("SELECT * FROM rooms WHERE id = $1")
            .bind(room_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(infra)?
            .ok_or_else(|| GameError::not_found("room", room_id))?;
        room_from_row(&row)
    }

    async fn room_by_code(&self, code: &str) -> Result<Room, GameError> {
        let row = sqlx::query("SELECT * FROM rooms WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(infra)?
            .ok_or_else(|| GameError::not_found("room", Uuid::nil()))?;
        room_from_row(&row)
    }

    async fn players(&self, room_id: Uuid) -> Result<Vec<Player>, GameError> {
        let rows = sqlx::query("SELECT * FROM players WHERE room_id = $1 ORDER BY position")
            .bind(room_id)
            .fetch_all(&self.pool)
            .await
            .map_err(infra)?;
        rows.iter().map(player_from_row).collect()
    }

    async fn player(&self, player_id: Uuid) -> Result<Player, GameError> {
        let row = sqlx::query("SELECT * FROM players WHERE id = $1")
            .bind(player_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(infra)?
            .ok_or_else(|| GameError::not_found("player", player_id))?;
        player_from_row(&row)
    }

    async fn player_for_user(&self, room_id: Uuid, user_id: Uuid) -> Result<Player, GameError> {
        let row = sqlx::query("SELECT * FROM players WHERE room_id = $1 AND user_id = $2")
            .bind(room_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(infra)?
            .ok_or_else(|| GameError::not_found("player", user_id))?;
        player_from_row(&row)
    }

    async fn insert_player(&self, player: Player, log: GameLog) -> Result<(), GameError> {
        let mut tx = self.pool.begin().await.map_err(infra)?;
        require_room_status_tx(&mut tx, player.room_id, "waiting").await?;

        let inserted = sqlx::query(
            "INSERT INTO players (id, user_id, room_id, position, status, join_status,
                                  kills, target, words, eliminated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(player.id)
        .bind(player.user_id)
        .bind(player.room_id)
        .bind(db_int(player.position))
        .bind(player.status.as_str())
        .bind(player.join_status.as_str())
        .bind(db_int(player.kills))
        .bind(player.target)
        .bind(words_json(player.words.as_ref())?)
        .bind(player.eliminated_at)
        .execute(&mut *tx)
        .await;
        if let Err(err) = inserted {
            if is_unique_violation(&err) {
                return Err(conflict("position or user already present in room"));
            }
            return Err(infra(err));
        }

        insert_log_tx(&mut tx, &log).await?;
        tx.commit().await.map_err(infra)
    }

    async fn set_join_status(
        &self,
        player_id: Uuid,
        expected: JoinStatus,
        next: JoinStatus,
        log: GameLog,
    ) -> Result<(), GameError> {
        let mut tx = self.pool.begin().await.map_err(infra)?;
        let updated =
            sqlx::query("UPDATE players SET join_status = $3 WHERE id = $1 AND join_status = $2")
                .bind(player_id)
                .bind(expected.as_str())
                .bind(next.as_str())
                .execute(&mut *tx)
                .await
                .map_err(infra)?;
        if updated.rows_affected() != 1 {
            return Err(conflict("player join status changed concurrently"));
        }
        insert_log_tx(&mut tx, &log).await?;
        tx.commit().await.map_err(infra)
    }

    async fn mark_starting(&self, room_id: Uuid) -> Result<(), GameError> {
        let updated =
            sqlx::query("UPDATE rooms SET status = 'starting' WHERE id = $1 AND status = 'waiting'")
                .bind(room_id)
                .execute(&self.pool)
                .await
                .map_err(infra)?;
        if updated.rows_affected() == 1 {
            Ok(())
        } else {
            // Distinguish a missing room from a lost start race.
            let _ = self.room(room_id).await?;
            Err(conflict("room is no longer waiting"))
        }
    }

    async fn reset_starting(&self, room_id: Uuid) -> Result<(), GameError> {
        let updated = sqlx::query(
            "UPDATE rooms SET status = 'waiting' WHERE id = $1 AND status = 'starting'",
        )
        .bind(room_id)
        .execute(&self.pool)
        .await
        .map_err(infra)?;
        if updated.rows_affected() == 1 {
            Ok(())
        } else {
            let _ = self.room(room_id).await?;
            Err(conflict("room is not in the starting state"))
        }
    }

    async fn commit_start(
        &self,
        room_id: Uuid,
        assignments: Vec<TargetAssignment>,
        started_at: DateTime<Utc>,
        log: GameLog,
    ) -> Result<(), GameError> {
        let mut tx = self.pool.begin().await.map_err(infra)?;
        let updated = sqlx::query(
            "UPDATE rooms SET status = 'in_progress', round = 1, started_at = $2
             WHERE id = $1 AND status = 'starting'",
        )
        .bind(room_id)
        .bind(started_at)
        .execute(&mut *tx)
        .await
        .map_err(infra)?;
        if updated.rows_affected() != 1 {
            return Err(conflict("room is not in the starting state"));
        }
        apply_assignments_tx(&mut tx, &assignments).await?;
        insert_log_tx(&mut tx, &log).await?;
        tx.commit().await.map_err(infra)
    }

    async fn commit_reassignment(
        &self,
        room_id: Uuid,
        assignments: Vec<TargetAssignment>,
        log: GameLog,
    ) -> Result<(), GameError> {
        let mut tx = self.pool.begin().await.map_err(infra)?;
        let updated = sqlx::query(
            "UPDATE rooms SET round = round + 1 WHERE id = $1 AND status = 'in_progress'",
        )
        .bind(room_id)
        .execute(&mut *tx)
        .await
        .map_err(infra)?;
        if updated.rows_affected() != 1 {
            return Err(conflict("room is no longer in progress"));
        }
        apply_assignments_tx(&mut tx, &assignments).await?;
        insert_log_tx(&mut tx, &log).await?;
        tx.commit().await.map_err(infra)
    }

    async fn insert_confirmation(
        &self,
        confirmation: KillConfirmation,
        log: GameLog,
    ) -> Result<(), GameError> {
        let mut tx = self.pool.begin().await.map_err(infra)?;
        require_room_status_tx(&mut tx, confirmation.room_id, "in_progress").await?;

        let killer = sqlx::query(
            "SELECT status, join_status, target FROM players WHERE id = $1 FOR UPDATE",
        )
        .bind(confirmation.killer)
        .fetch_optional(&mut *tx)
        .await
        .map_err(infra)?
        .ok_or_else(|| GameError::not_found("player", confirmation.killer))?;
        let status: String = killer.try_get("status").map_err(infra)?;
        let join_status: String = killer.try_get("join_status").map_err(infra)?;
        let target: Option<Uuid> = killer.try_get("target").map_err(infra)?;
        if status != "alive" || join_status != "joined" {
            return Err(conflict("killer is no longer alive in this room"));
        }
        if target != Some(confirmation.target) {
            return Err(conflict("claimed target is not the killer's current target"));
        }

        let claim = serde_json::to_value(&confirmation.claim)
            .map_err(|e| GameError::Infrastructure(format!("claim serialization: {e}")))?;
        let inserted = sqlx::query(
            "INSERT INTO kill_confirmations (id, room_id, killer, target, status, claim,
                                             created_at, responded_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(confirmation.id)
        .bind(confirmation.room_id)
        .bind(confirmation.killer)
        .bind(confirmation.target)
        .bind(confirmation.status.as_str())
        .bind(claim)
        .bind(confirmation.created_at)
        .bind(confirmation.responded_at)
        .execute(&mut *tx)
        .await;
        if let Err(err) = inserted {
            // The partial unique index on pending killers turns a double
            // request into a clean conflict.
            if is_unique_violation(&err) {
                return Err(conflict("killer already has a pending confirmation"));
            }
            return Err(infra(err));
        }

        insert_log_tx(&mut tx, &log).await?;
        tx.commit().await.map_err(infra)
    }

    async fn confirmation(&self, confirmation_id: Uuid) -> Result<KillConfirmation, GameError> {
        let row = sqlx::query("SELECT * FROM kill_confirmations WHERE id = $1")
            .bind(confirmation_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(infra)?
            .ok_or_else(|| GameError::not_found("confirmation", confirmation_id))?;
        confirmation_from_row(&row)
    }

    async fn reject_confirmation(
        &self,
        confirmation_id: Uuid,
        responded_at: DateTime<Utc>,
        log: GameLog,
    ) -> Result<(), GameError> {
        let mut tx = self.pool.begin().await.map_err(infra)?;
        let updated = sqlx::query(
            "UPDATE kill_confirmations SET status = 'rejected', responded_at = $2
             WHERE id = $1 AND status = 'pending'",
        )
        .bind(confirmation_id)
        .bind(responded_at)
        .execute(&mut *tx)
        .await
        .map_err(infra)?;
        if updated.rows_affected() != 1 {
            return Err(conflict("confirmation is already resolved"));
        }
        insert_log_tx(&mut tx, &log).await?;
        tx.commit().await.map_err(infra)
    }

    async fn commit_elimination(
        &self,
        commit: EliminationCommit,
    ) -> Result<Option<TargetAssignment>, GameError> {
        let mut tx = self.pool.begin().await.map_err(infra)?;
        require_room_status_tx(&mut tx, commit.room_id, "in_progress").await?;

        // Lock both player rows and derive the splice from the target's edge
        // as it stands inside this transaction, so an overlapping elimination
        // or reassignment can never splice a stale ring.
        let killer = sqlx::query("SELECT target FROM players WHERE id = $1 FOR UPDATE")
            .bind(commit.killer_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(infra)?
            .ok_or_else(|| GameError::not_found("player", commit.killer_id))?;
        let killer_target: Option<Uuid> = killer.try_get("target").map_err(infra)?;
        if killer_target != Some(commit.target_id) {
            return Err(conflict("killer's target changed since the claim"));
        }

        let target_row = sqlx::query("SELECT * FROM players WHERE id = $1 FOR UPDATE")
            .bind(commit.target_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(infra)?
            .ok_or_else(|| GameError::not_found("player", commit.target_id))?;
        let target = player_from_row(&target_row)?;

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

        let accepted = sqlx::query(
            "UPDATE kill_confirmations SET status = 'accepted', responded_at = $2
             WHERE id = $1 AND status = 'pending'",
        )
        .bind(commit.confirmation_id)
        .bind(commit.responded_at)
        .execute(&mut *tx)
        .await
        .map_err(infra)?;
        if accepted.rows_affected() != 1 {
            return Err(conflict("confirmation is already resolved"));
        }

        let eliminated = sqlx::query(
            "UPDATE players SET status = 'eliminated', eliminated_at = $2
             WHERE id = $1 AND status = 'alive'",
        )
        .bind(commit.target_id)
        .bind(commit.responded_at)
        .execute(&mut *tx)
        .await
        .map_err(infra)?;
        if eliminated.rows_affected() != 1 {
            return Err(conflict("target is no longer alive"));
        }

        sqlx::query("UPDATE players SET kills = kills + 1, target = $2, words = $3 WHERE id = $1")
            .bind(commit.killer_id)
            .bind(splice.as_ref().map(|s| s.target_id))
            .bind(words_json(splice.as_ref().map(|s| &s.words))?)
            .execute(&mut *tx)
            .await
            .map_err(infra)?;

        insert_log_tx(&mut tx, &commit.log).await?;
        tx.commit().await.map_err(infra)?;
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
        let mut tx = self.pool.begin().await.map_err(infra)?;
        let updated = sqlx::query(
            "UPDATE rooms SET status = 'finished', finished_at = $2, winner = $3
             WHERE id = $1 AND status = 'in_progress'",
        )
        .bind(room_id)
        .bind(finished_at)
        .bind(winner)
        .execute(&mut *tx)
        .await
        .map_err(infra)?;
        if updated.rows_affected() != 1 {
            return Err(conflict("room is no longer in progress"));
        }

        if let Some(winner_id) = winner {
            sqlx::query("UPDATE players SET status = 'winner' WHERE id = $1")
                .bind(winner_id)
                .execute(&mut *tx)
                .await
                .map_err(infra)?;
        }

        for delta in stats {
            sqlx::query(
                "INSERT INTO user_stats (user_id, games_played, games_won, total_kills)
                 VALUES ($1, 1, $2, $3)
                 ON CONFLICT (user_id) DO UPDATE SET
                     games_played = user_stats.games_played + 1,
                     games_won = user_stats.games_won + EXCLUDED.games_won,
                     total_kills = user_stats.total_kills + EXCLUDED.total_kills",
            )
            .bind(delta.user_id)
            .bind(i32::from(delta.won))
            .bind(db_int(delta.kills))
            .execute(&mut *tx)
            .await
            .map_err(infra)?;
        }

        insert_log_tx(&mut tx, &log).await?;
        tx.commit().await.map_err(infra)
    }

    async fn expire_room(
        &self,
        room_id: Uuid,
        finished_at: DateTime<Utc>,
        log: GameLog,
    ) -> Result<(), GameError> {
        let mut tx = self.pool.begin().await.map_err(infra)?;
        let updated = sqlx::query(
            "UPDATE rooms SET status = 'expired', finished_at = $2
             WHERE id = $1 AND status = 'in_progress'",
        )
        .bind(room_id)
        .bind(finished_at)
        .execute(&mut *tx)
        .await
        .map_err(infra)?;
        if updated.rows_affected() != 1 {
            return Err(conflict("room is no longer in progress"));
        }

        sqlx::query(
            "UPDATE players SET status = 'eliminated', eliminated_at = $2
             WHERE room_id = $1 AND status = 'alive'",
        )
        .bind(room_id)
        .bind(finished_at)
        .execute(&mut *tx)
        .await
        .map_err(infra)?;

        insert_log_tx(&mut tx, &log).await?;
        tx.commit().await.map_err(infra)
    }

    async fn stale_rooms(&self, cutoff: DateTime<Utc>) -> Result<Vec<Room>, GameError> {
        let rows = sqlx::query(
            "SELECT * FROM rooms WHERE status = 'in_progress' AND started_at < $1",
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(infra)?;
        rows.iter().map(room_from_row).collect()
    }

    async fn expired_rooms(&self) -> Result<Vec<Room>, GameError> {
        let rows = sqlx::query("SELECT * FROM rooms WHERE status = 'expired'")
            .fetch_all(&self.pool)
            .await
            .map_err(infra)?;
        rows.iter().map(room_from_row).collect()
    }

    async fn append_log(&self, log: GameLog) -> Result<(), GameError> {
        sqlx::query(
            "INSERT INTO game_logs (id, room_id, kind, message, payload, player, target, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(log.id)
        .bind(log.room_id)
        .bind(log.kind.as_str())
        .bind(&log.message)
        .bind(&log.payload)
        .bind(log.player)
        .bind(log.target)
        .bind(log.created_at)
        .execute(&self.pool)
        .await
        .map_err(infra)?;
        Ok(())
    }

    async fn logs(&self, room_id: Uuid) -> Result<Vec<GameLog>, GameError> {
        let rows = sqlx::query(
            "SELECT * FROM game_logs WHERE room_id = $1 ORDER BY created_at, id",
        )
        .bind(room_id)
        .fetch_all(&self.pool)
        .await
        .map_err(infra)?;
        rows.iter().map(log_from_row).collect()
    }

    async fn user_stats(&self, user_id: Uuid) -> Result<UserStats, GameError> {
        let row = sqlx::query(
            "SELECT games_played, games_won, total_kills FROM user_stats WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(infra)?;
        match row {
            Some(row) => Ok(UserStats {
                games_played: read_u32(&row, "games_played")?,
                games_won: read_u32(&row, "games_won")?,
                total_kills: read_u32(&row, "total_kills")?,
            }),
            None => Ok(UserStats::default()),
        }
    }
}
