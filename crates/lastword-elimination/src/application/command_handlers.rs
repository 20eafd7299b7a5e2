//! Command handlers for the elimination protocol.
//!
//! Request and response share one resolver regardless of how the claim was
//! made (in person, word claim, or word guess) — the claim kind only changes
//! the payload carried on the confirmation, never the state machine.

use lastword_core::clock::Clock;
use lastword_core::error::GameError;
use lastword_core::identity::Identity;
use lastword_core::log::{GameLog, LogKind};
use lastword_core::model::{ConfirmationStatus, KillConfirmation, RoomStatus, alive_joined};
use lastword_core::notify::{Notification, Notifier, dispatch_best_effort};
use lastword_core::store::{EliminationCommit, GameStore};
use uuid::Uuid;

use crate::application::finalizer::finish_game;
use crate::domain::commands::{RequestElimination, RespondToConfirmation};

/// How a response resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RespondOutcome {
    /// The target disputed the claim; the killer keeps their target.
    Rejected,
    /// The target confirmed; `game_finished` is set when this was the last
    /// elimination and the finalizer ran.
    Accepted { game_finished: bool },
}

/// Handles the `RequestElimination` command.
///
/// Creates a `Pending` confirmation against the killer's *current* target
/// and notifies that target. The store enforces at most one pending
/// confirmation per killer.
///
/// # Errors
///
/// Returns `GameError::StateConflict` when the room is not in progress, the
/// requester is not an alive joined player with a target, or a pending
/// confirmation already exists.
pub async fn handle_request_elimination(
    identity: Identity,
    command: &RequestElimination,
    clock: &dyn Clock,
    store: &dyn GameStore,
    notifier: &dyn Notifier,
) -> Result<KillConfirmation, GameError> {
    let room = store.room(command.room_id).await?;
    if room.status != RoomStatus::InProgress {
        return Err(GameError::StateConflict(format!(
            "room is {}, not in progress",
            room.status.as_str()
        )));
    }

    let killer = store.player_for_user(command.room_id, identity.user_id).await?;
    if !killer.is_alive_joined() {
        return Err(GameError::StateConflict(
            "only alive joined players may claim eliminations".to_owned(),
        ));
    }
    let target_id = killer.target.ok_or_else(|| {
        GameError::StateConflict("player has no target assigned".to_owned())
    })?;

    let now = clock.now();
    let confirmation = KillConfirmation {
        id: Uuid::new_v4(),
        room_id: command.room_id,
        killer: killer.id,
        target: target_id,
        status: ConfirmationStatus::Pending,
        claim: command.claim.clone(),
        created_at: now,
        responded_at: None,
    };
    let log = GameLog::new(
        command.room_id,
        LogKind::EliminationRequested,
        "elimination claimed, awaiting confirmation",
        now,
    )
    .with_player(killer.id)
    .with_target(target_id)
    .with_payload(serde_json::to_value(&command.claim).map_err(|e| {
        GameError::Infrastructure(format!("claim serialization failed: {e}"))
    })?);
    store.insert_confirmation(confirmation.clone(), log).await?;

    tracing::info!(
        room_id = %command.room_id,
        confirmation_id = %confirmation.id,
        "elimination requested"
    );

    let target = store.player(target_id).await?;
    dispatch_best_effort(
        notifier,
        Notification::EliminationRequest {
            user_id: target.user_id,
            confirmation_id: confirmation.id,
            room_id: command.room_id,
            claim: command.claim.clone(),
        },
    )
    .await;

    Ok(confirmation)
}

/// Handles the `RespondToConfirmation` command.
///
/// Only the targeted player's user may respond. A rejection flips the
/// confirmation `Pending → Rejected` and tells the killer. An acceptance
/// commits the whole elimination atomically: the target falls, the killer
/// scores and inherits the target's former target and word triple, and the
/// ring splices shut. When at most one player remains afterwards the
/// finalizer runs.
///
/// # Errors
///
/// Returns `GameError::Authorization` for a responder other than the target,
/// `GameError::StateConflict` when the confirmation is already resolved (the
/// store re-checks this at commit, so concurrent responses resolve to one
/// winner and one conflict, with no partial mutation).
pub async fn handle_respond(
    identity: Identity,
    command: &RespondToConfirmation,
    clock: &dyn Clock,
    store: &dyn GameStore,
    notifier: &dyn Notifier,
) -> Result<RespondOutcome, GameError> {
    let confirmation = store.confirmation(command.confirmation_id).await?;
    let target = store.player(confirmation.target).await?;
    if target.user_id != identity.user_id {
        return Err(GameError::Authorization(
            "only the targeted player may respond".to_owned(),
        ));
    }
    if confirmation.status != ConfirmationStatus::Pending {
        return Err(GameError::StateConflict(
            "confirmation is already resolved".to_owned(),
        ));
    }

    let killer = store.player(confirmation.killer).await?;
    let now = clock.now();

    if !command.accepted {
        let log = GameLog::new(
            confirmation.room_id,
            LogKind::EliminationRejected,
            "elimination disputed by the target",
            now,
        )
        .with_player(confirmation.killer)
        .with_target(confirmation.target);
        store.reject_confirmation(confirmation.id, now, log).await?;

        dispatch_best_effort(
            notifier,
            Notification::ClaimRejected {
                user_id: killer.user_id,
                confirmation_id: confirmation.id,
                room_id: confirmation.room_id,
            },
        )
        .await;
        return Ok(RespondOutcome::Rejected);
    }

    let log = GameLog::new(
        confirmation.room_id,
        LogKind::EliminationAccepted,
        "elimination confirmed",
        now,
    )
    .with_player(confirmation.killer)
    .with_target(confirmation.target);
    // The store derives the killer's inherited edge and words from the
    // target's row inside the commit, so overlapping accepts cannot splice
    // a stale ring.
    let splice = store
        .commit_elimination(EliminationCommit {
            confirmation_id: confirmation.id,
            room_id: confirmation.room_id,
            killer_id: confirmation.killer,
            target_id: confirmation.target,
            responded_at: now,
            log,
        })
        .await?;

    tracing::info!(
        room_id = %confirmation.room_id,
        killer = %confirmation.killer,
        target = %confirmation.target,
        "elimination committed"
    );

    let players = store.players(confirmation.room_id).await?;
    let remaining = alive_joined(&players).len();
    if remaining <= 1 {
        finish_game(confirmation.room_id, clock, store, notifier).await?;
        return Ok(RespondOutcome::Accepted { game_finished: true });
    }

    dispatch_best_effort(
        notifier,
        Notification::Elimination {
            room_id: confirmation.room_id,
            killer_id: confirmation.killer,
            target_id: confirmation.target,
        },
    )
    .await;
    if let Some(assignment) = splice {
        dispatch_best_effort(
            notifier,
            Notification::NewTarget {
                user_id: killer.user_id,
                room_id: confirmation.room_id,
                target_id: assignment.target_id,
                words: assignment.words,
            },
        )
        .await;
    }

    Ok(RespondOutcome::Accepted { game_finished: false })
}

#[cfg(test)]
mod tests {
    use lastword_core::model::{EliminationClaim, PlayerStatus, RoomStatus};
    use lastword_test_support::fixtures::{fixed_now, in_progress_room};
    use lastword_test_support::{FixedClock, MemoryStore, RecordingNotifier};

    use super::*;

    fn direct_claim(room_id: Uuid) -> RequestElimination {
        RequestElimination {
            room_id,
            claim: EliminationClaim::Direct,
        }
    }

    fn accept(confirmation_id: Uuid) -> RespondToConfirmation {
        RespondToConfirmation {
            confirmation_id,
            accepted: true,
        }
    }

    #[tokio::test]
    async fn test_accepted_elimination_splices_the_ring() {
        let store = MemoryStore::new();
        let (room, players) = in_progress_room(&store, 3).await;
        let clock = FixedClock(fixed_now());
        let notifier = RecordingNotifier::new();

        let confirmation = handle_request_elimination(
            Identity::player(players[0].user_id),
            &direct_claim(room.id),
            &clock,
            &store,
            &notifier,
        )
        .await
        .unwrap();
        assert_eq!(confirmation.target, players[1].id);

        let outcome = handle_respond(
            Identity::player(players[1].user_id),
            &accept(confirmation.id),
            &clock,
            &store,
            &notifier,
        )
        .await
        .unwrap();
        assert_eq!(outcome, RespondOutcome::Accepted { game_finished: false });

        let fallen = store.player(players[1].id).await.unwrap();
        assert_eq!(fallen.status, PlayerStatus::Eliminated);
        assert!(fallen.eliminated_at.is_some());

        let killer = store.player(players[0].id).await.unwrap();
        assert_eq!(killer.kills, 1);
        assert_eq!(killer.target, Some(players[2].id));
        assert_eq!(killer.words, players[1].words);

        let sent = notifier.dispatched();
        assert!(sent.iter().any(|n| matches!(n, Notification::Elimination { .. })));
        assert!(sent.iter().any(|n| matches!(
            n,
            Notification::NewTarget { target_id, .. } if *target_id == players[2].id
        )));
    }

    #[tokio::test]
    async fn test_overlapping_eliminations_splice_fresh_edges() {
        let store = MemoryStore::new();
        let (room, players) = in_progress_room(&store, 4).await;
        let clock = FixedClock(fixed_now());
        let notifier = RecordingNotifier::new();

        // Two claims in flight at once: p0 on p1, and p1 on p2.
        let first = handle_request_elimination(
            Identity::player(players[0].user_id),
            &direct_claim(room.id),
            &clock,
            &store,
            &notifier,
        )
        .await
        .unwrap();
        let second = handle_request_elimination(
            Identity::player(players[1].user_id),
            &direct_claim(room.id),
            &clock,
            &store,
            &notifier,
        )
        .await
        .unwrap();

        // p1's claim resolves before their own fate does: p2 falls and p1
        // now hunts p3.
        handle_respond(
            Identity::player(players[2].user_id),
            &accept(second.id),
            &clock,
            &store,
            &notifier,
        )
        .await
        .unwrap();
        handle_respond(
            Identity::player(players[1].user_id),
            &accept(first.id),
            &clock,
            &store,
            &notifier,
        )
        .await
        .unwrap();

        // p0 inherits p1's edge as it stood at commit time, so the ring
        // closes over the two survivors without pointing at the fallen.
        let hunter = store.player(players[0].id).await.unwrap();
        assert_eq!(hunter.target, Some(players[3].id));
        assert_eq!(hunter.words, players[2].words);
        let survivor = store.player(players[3].id).await.unwrap();
        assert_eq!(survivor.status, PlayerStatus::Alive);
        assert_eq!(survivor.target, Some(players[0].id));
        assert!(notifier.dispatched().iter().any(|n| matches!(
            n,
            Notification::NewTarget { user_id, target_id, .. }
                if *user_id == players[0].user_id && *target_id == players[3].id
        )));
    }

    #[tokio::test]
    async fn test_final_elimination_finishes_the_game() {
        let store = MemoryStore::new();
        let (room, players) = in_progress_room(&store, 2).await;
        let clock = FixedClock(fixed_now());
        let notifier = RecordingNotifier::new();

        let confirmation = handle_request_elimination(
            Identity::player(players[0].user_id),
            &direct_claim(room.id),
            &clock,
            &store,
            &notifier,
        )
        .await
        .unwrap();
        let outcome = handle_respond(
            Identity::player(players[1].user_id),
            &accept(confirmation.id),
            &clock,
            &store,
            &notifier,
        )
        .await
        .unwrap();
        assert_eq!(outcome, RespondOutcome::Accepted { game_finished: true });

        let finished = store.room(room.id).await.unwrap();
        assert_eq!(finished.status, RoomStatus::Finished);
        assert_eq!(finished.winner, Some(players[0].id));

        let winner = store.player(players[0].id).await.unwrap();
        assert_eq!(winner.status, PlayerStatus::Winner);
        // Two players left means the inherited edge would self-loop.
        assert_eq!(winner.target, None);

        let stats = store.user_stats(players[0].user_id).await.unwrap();
        assert_eq!(stats.games_won, 1);
        assert_eq!(stats.total_kills, 1);
        assert_eq!(
            store.user_stats(players[1].user_id).await.unwrap().games_won,
            0
        );
        // GameEnded addresses users, so the winner field carries the user id.
        assert!(notifier.dispatched().iter().any(|n| matches!(
            n,
            Notification::GameEnded { winner, .. } if *winner == Some(players[0].user_id)
        )));
    }

    #[tokio::test]
    async fn test_rejection_keeps_the_target_alive() {
        let store = MemoryStore::new();
        let (room, players) = in_progress_room(&store, 3).await;
        let clock = FixedClock(fixed_now());
        let notifier = RecordingNotifier::new();

        let confirmation = handle_request_elimination(
            Identity::player(players[0].user_id),
            &RequestElimination {
                room_id: room.id,
                claim: EliminationClaim::WordGuess {
                    word: "w0a".to_owned(),
                },
            },
            &clock,
            &store,
            &notifier,
        )
        .await
        .unwrap();

        let outcome = handle_respond(
            Identity::player(players[1].user_id),
            &RespondToConfirmation {
                confirmation_id: confirmation.id,
                accepted: false,
            },
            &clock,
            &store,
            &notifier,
        )
        .await
        .unwrap();
        assert_eq!(outcome, RespondOutcome::Rejected);

        let target = store.player(players[1].id).await.unwrap();
        assert_eq!(target.status, PlayerStatus::Alive);
        let killer = store.player(players[0].id).await.unwrap();
        assert_eq!(killer.kills, 0);
        assert_eq!(killer.target, Some(players[1].id));
        assert!(notifier
            .dispatched()
            .iter()
            .any(|n| matches!(n, Notification::ClaimRejected { .. })));

        // The slot is free again: the killer may claim anew.
        let retry = handle_request_elimination(
            Identity::player(players[0].user_id),
            &direct_claim(room.id),
            &clock,
            &store,
            &notifier,
        )
        .await;
        assert!(retry.is_ok());
    }

    #[tokio::test]
    async fn test_second_pending_claim_is_rejected() {
        let store = MemoryStore::new();
        let (room, players) = in_progress_room(&store, 3).await;
        let clock = FixedClock(fixed_now());
        let notifier = RecordingNotifier::new();

        handle_request_elimination(
            Identity::player(players[0].user_id),
            &direct_claim(room.id),
            &clock,
            &store,
            &notifier,
        )
        .await
        .unwrap();
        let err = handle_request_elimination(
            Identity::player(players[0].user_id),
            &direct_claim(room.id),
            &clock,
            &store,
            &notifier,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, GameError::StateConflict(_)));
    }

    #[tokio::test]
    async fn test_only_the_target_may_respond() {
        let store = MemoryStore::new();
        let (room, players) = in_progress_room(&store, 3).await;
        let clock = FixedClock(fixed_now());
        let notifier = RecordingNotifier::new();

        let confirmation = handle_request_elimination(
            Identity::player(players[0].user_id),
            &direct_claim(room.id),
            &clock,
            &store,
            &notifier,
        )
        .await
        .unwrap();

        let err = handle_respond(
            Identity::player(players[2].user_id),
            &accept(confirmation.id),
            &clock,
            &store,
            &notifier,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, GameError::Authorization(_)));
    }

    #[tokio::test]
    async fn test_responding_to_a_resolved_confirmation_conflicts() {
        let store = MemoryStore::new();
        let (room, players) = in_progress_room(&store, 3).await;
        let clock = FixedClock(fixed_now());
        let notifier = RecordingNotifier::new();

        let confirmation = handle_request_elimination(
            Identity::player(players[0].user_id),
            &direct_claim(room.id),
            &clock,
            &store,
            &notifier,
        )
        .await
        .unwrap();
        handle_respond(
            Identity::player(players[1].user_id),
            &accept(confirmation.id),
            &clock,
            &store,
            &notifier,
        )
        .await
        .unwrap();

        let err = handle_respond(
            Identity::player(players[1].user_id),
            &accept(confirmation.id),
            &clock,
            &store,
            &notifier,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, GameError::StateConflict(_)));

        // The double response must not double-count the kill.
        let killer = store.player(players[0].id).await.unwrap();
        assert_eq!(killer.kills, 1);
    }

    #[tokio::test]
    async fn test_concurrent_accepts_resolve_to_one_winner() {
        let store = MemoryStore::new();
        let (room, players) = in_progress_room(&store, 3).await;
        let clock = FixedClock(fixed_now());
        let notifier = RecordingNotifier::new();

        let confirmation = handle_request_elimination(
            Identity::player(players[0].user_id),
            &direct_claim(room.id),
            &clock,
            &store,
            &notifier,
        )
        .await
        .unwrap();

        let target = Identity::player(players[1].user_id);
        let command = accept(confirmation.id);
        let (a, b) = tokio::join!(
            handle_respond(target, &command, &clock, &store, &notifier),
            handle_respond(target, &command, &clock, &store, &notifier),
        );
        assert_eq!(u32::from(a.is_ok()) + u32::from(b.is_ok()), 1);

        let killer = store.player(players[0].id).await.unwrap();
        assert_eq!(killer.kills, 1);
    }

    #[tokio::test]
    async fn test_eliminated_player_cannot_claim() {
        let store = MemoryStore::new();
        let (room, players) = in_progress_room(&store, 3).await;
        let clock = FixedClock(fixed_now());
        let notifier = RecordingNotifier::new();

        let confirmation = handle_request_elimination(
            Identity::player(players[0].user_id),
            &direct_claim(room.id),
            &clock,
            &store,
            &notifier,
        )
        .await
        .unwrap();
        handle_respond(
            Identity::player(players[1].user_id),
            &accept(confirmation.id),
            &clock,
            &store,
            &notifier,
        )
        .await
        .unwrap();

        let err = handle_request_elimination(
            Identity::player(players[1].user_id),
            &direct_claim(room.id),
            &clock,
            &store,
            &notifier,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, GameError::StateConflict(_)));
    }

    #[tokio::test]
    async fn test_notifier_outage_does_not_fail_the_commit() {
        let store = MemoryStore::new();
        let (room, players) = in_progress_room(&store, 3).await;
        let clock = FixedClock(fixed_now());
        let notifier = RecordingNotifier::failing();

        let confirmation = handle_request_elimination(
            Identity::player(players[0].user_id),
            &direct_claim(room.id),
            &clock,
            &store,
            &notifier,
        )
        .await
        .unwrap();
        let outcome = handle_respond(
            Identity::player(players[1].user_id),
            &accept(confirmation.id),
            &clock,
            &store,
            &notifier,
        )
        .await
        .unwrap();
        assert_eq!(outcome, RespondOutcome::Accepted { game_finished: false });
    }
}
