//! Command handlers for target assignment.
//!
//! The reassignment path recomputes the ring mid-game over the players that
//! still count, re-shuffles the room's word pool, and commits both in one
//! store transaction.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use lastword_core::clock::Clock;
use lastword_core::error::GameError;
use lastword_core::identity::Identity;
use lastword_core::log::{GameLog, LogKind};
use lastword_core::model::{Player, RoomStatus, Word, alive_joined};
use lastword_core::notify::{Notification, Notifier, dispatch_best_effort};
use lastword_core::rng::DeterministicRng;
use lastword_core::store::{GameStore, TargetAssignment};
use uuid::Uuid;

use crate::domain::ring;
use crate::domain::words::build_triples;

/// Result of a reassignment command.
#[derive(Debug)]
pub struct ReassignOutcome {
    /// Whether a new ring was committed. `false` when one or zero players
    /// remain and the game should already have ended.
    pub reassigned: bool,
    /// The committed assignments (empty when skipped).
    pub assignments: Vec<TargetAssignment>,
}

/// Builds assignments for a roster from a word pool. Shared by the start and
/// reassignment paths so the two never diverge on filtering or shuffling.
///
/// # Errors
///
/// Returns `GameError::Validation` if the roster or triple deck is too small.
pub fn assignments_for(
    ring_players: &[&Player],
    pool_words: Vec<Word>,
    rng: &Mutex<dyn DeterministicRng + Send>,
) -> Result<Vec<TargetAssignment>, GameError> {
    let player_ids: Vec<Uuid> = ring_players.iter().map(|p| p.id).collect();
    // Lock RNG only for the synchronous shuffles — never across an await.
    let mut rng = rng
        .lock()
        .map_err(|_| GameError::Infrastructure("rng mutex poisoned".to_owned()))?;
    let triples = build_triples(pool_words, &mut *rng);
    ring::assign(&player_ids, &triples, &mut *rng)
}

/// Handles the `reassign targets` command: creator-triggered, mid-game.
///
/// # Errors
///
/// Returns `GameError::Authorization` if the requester is not the creator,
/// `GameError::StateConflict` if the room is not in progress, and store
/// errors as-is.
pub async fn handle_reassign_targets(
    identity: Identity,
    room_id: Uuid,
    clock: &dyn Clock,
    rng: &Mutex<dyn DeterministicRng + Send>,
    store: &dyn GameStore,
    notifier: &dyn Notifier,
) -> Result<ReassignOutcome, GameError> {
    let room = store.room(room_id).await?;
    if room.creator != identity.user_id {
        return Err(GameError::Authorization(
            "only the room creator may reassign targets".to_owned(),
        ));
    }
    if room.status != RoomStatus::InProgress {
        return Err(GameError::StateConflict(format!(
            "room is {}, not in progress",
            room.status.as_str()
        )));
    }

    let players = store.players(room_id).await?;
    let ring_players = alive_joined(&players);
    if ring_players.len() <= 1 {
        tracing::debug!(%room_id, "skipping reassignment with {} alive player(s)", ring_players.len());
        return Ok(ReassignOutcome {
            reassigned: false,
            assignments: Vec::new(),
        });
    }

    let pool_words = store.words(&room.word_pool).await?;
    let assignments = assignments_for(&ring_players, pool_words, rng)?;

    let log = reassignment_log(room_id, identity.user_id, ring_players.len(), clock.now());
    store
        .commit_reassignment(room_id, assignments.clone(), log)
        .await?;

    tracing::info!(%room_id, players = ring_players.len(), "targets reassigned");

    dispatch_best_effort(notifier, Notification::TargetsReassigned { room_id }).await;
    for assignment in &assignments {
        if let Some(player) = players.iter().find(|p| p.id == assignment.player_id) {
            dispatch_best_effort(
                notifier,
                Notification::NewTarget {
                    user_id: player.user_id,
                    room_id,
                    target_id: assignment.target_id,
                    words: assignment.words.clone(),
                },
            )
            .await;
        }
    }

    Ok(ReassignOutcome {
        reassigned: true,
        assignments,
    })
}

fn reassignment_log(
    room_id: Uuid,
    requester: Uuid,
    ring_size: usize,
    now: DateTime<Utc>,
) -> GameLog {
    GameLog::new(
        room_id,
        LogKind::TargetsReassigned,
        format!("targets reassigned over {ring_size} players"),
        now,
    )
    .with_payload(serde_json::json!({ "ring_size": ring_size, "requested_by": requester }))
}
