//! Win and stat finalization.
//!
//! Called when a game's ring collapses to at most one player, or directly by
//! the accept path. Crowning the winner, stamping the room, and settling
//! lifetime stats happen in one store transaction so stats are applied
//! exactly once even when two paths race to finish the same room.

use lastword_core::clock::Clock;
use lastword_core::error::GameError;
use lastword_core::log::{GameLog, LogKind};
use lastword_core::model::{JoinStatus, alive_joined};
use lastword_core::notify::{Notification, Notifier, dispatch_best_effort};
use lastword_core::store::{GameStore, StatDelta};
use uuid::Uuid;

/// Finishes an in-progress game: the surviving player (if exactly one)
/// becomes the winner, the room moves to `Finished`, and every player who
/// actually joined gets their lifetime stats settled.
///
/// Returns the winning player's id, if any.
///
/// # Errors
///
/// Returns `GameError::StateConflict` when the room is no longer in
/// progress — the loser of a finish race treats this as already-done.
pub async fn finish_game(
    room_id: Uuid,
    clock: &dyn Clock,
    store: &dyn GameStore,
    notifier: &dyn Notifier,
) -> Result<Option<Uuid>, GameError> {
    let players = store.players(room_id).await?;
    let survivors = alive_joined(&players);
    let winner = if survivors.len() == 1 {
        Some(survivors[0].id)
    } else {
        None
    };
    let winner_user = winner.and_then(|id| {
        players
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.user_id)
    });

    // Invited players who never joined carry no stats for this game.
    let stats: Vec<StatDelta> = players
        .iter()
        .filter(|p| p.join_status == JoinStatus::Joined)
        .map(|p| StatDelta {
            user_id: p.user_id,
            won: Some(p.id) == winner,
            kills: p.kills,
        })
        .collect();

    let now = clock.now();
    let log = GameLog::new(
        room_id,
        LogKind::GameFinished,
        match winner {
            Some(_) => "game finished with a winner".to_owned(),
            None => "game finished with no survivor".to_owned(),
        },
        now,
    )
    .with_payload(serde_json::json!({ "winner": winner }));
    store.commit_finish(room_id, winner, now, stats, log).await?;

    tracing::info!(%room_id, winner = ?winner, "game finished");

    dispatch_best_effort(
        notifier,
        Notification::GameEnded {
            room_id,
            winner: winner_user,
        },
    )
    .await;

    Ok(winner)
}
