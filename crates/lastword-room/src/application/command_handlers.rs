//! Command handlers for the room lifecycle.
//!
//! Handlers orchestrate domain logic: validate, build the mutation, push the
//! compare-and-set into the store, then dispatch best-effort notifications.

use std::sync::Mutex;

use lastword_core::clock::Clock;
use lastword_core::error::GameError;
use lastword_core::identity::Identity;
use lastword_core::log::{GameLog, LogKind};
use lastword_core::model::{
    JoinStatus, MAX_CAPACITY, MAX_TIME_LIMIT_SECS, MIN_CAPACITY, MIN_TIME_LIMIT_SECS, Player,
    PlayerStatus, Room, RoomStatus, WORDS_PER_PLAYER, alive_joined,
};
use lastword_core::notify::{Notification, Notifier, dispatch_best_effort};
use lastword_core::rng::DeterministicRng;
use lastword_core::store::{GameStore, TargetAssignment};
use lastword_assignment::application::command_handlers::assignments_for;
use lastword_assignment::domain::ring::shuffle;
use uuid::Uuid;

use crate::domain::code::generate_code;
use crate::domain::commands::{CreateRoom, JoinRoom, LeaveRoom, StartGame};

/// Attempts before giving up on drawing a unique room code.
const MAX_CODE_ATTEMPTS: usize = 8;

/// Minimum joined players to start a game.
pub const MIN_PLAYERS_TO_START: usize = 2;

/// Handles the `CreateRoom` command.
///
/// Draws `capacity` word triples from the active pool, generates a
/// collision-checked join code, seats the creator at position 1 and each
/// invitee at ascending positions, and dispatches invitations.
///
/// # Errors
///
/// Returns `GameError::Validation` on out-of-range inputs,
/// `GameError::InsufficientWordPool` when the active pool cannot cover the
/// capacity, and `GameError::CodeCollision` if a unique code could not be
/// drawn after several attempts.
pub async fn handle_create_room(
    identity: Identity,
    command: &CreateRoom,
    clock: &dyn Clock,
    rng: &Mutex<dyn DeterministicRng + Send>,
    store: &dyn GameStore,
    notifier: &dyn Notifier,
) -> Result<Room, GameError> {
    if command.name.trim().is_empty() {
        return Err(GameError::Validation("room name must not be empty".to_owned()));
    }
    if !(MIN_CAPACITY..=MAX_CAPACITY).contains(&command.capacity) {
        return Err(GameError::Validation(format!(
            "capacity must be between {MIN_CAPACITY} and {MAX_CAPACITY}"
        )));
    }
    if !(MIN_TIME_LIMIT_SECS..=MAX_TIME_LIMIT_SECS).contains(&command.time_limit_secs) {
        return Err(GameError::Validation(format!(
            "time limit must be between {MIN_TIME_LIMIT_SECS} and {MAX_TIME_LIMIT_SECS} seconds"
        )));
    }
    let mut seen = std::collections::HashSet::new();
    let invitees: Vec<Uuid> = command
        .invitees
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect();
    if invitees.contains(&identity.user_id) {
        return Err(GameError::Validation("creator cannot invite themselves".to_owned()));
    }
    if 1 + invitees.len() > command.capacity as usize {
        return Err(GameError::Validation(format!(
            "{} invitees do not fit a capacity-{} room",
            invitees.len(),
            command.capacity
        )));
    }

    let required = command.capacity as usize * WORDS_PER_PLAYER;
    let mut active = store.active_words().await?;
    if active.len() < required {
        return Err(GameError::InsufficientWordPool {
            available: active.len(),
            required,
        });
    }
    let word_pool: Vec<Uuid> = {
        // Lock RNG only for the synchronous draw — never across an await.
        let mut rng_guard = rng
            .lock()
            .map_err(|_| GameError::Infrastructure("rng mutex poisoned".to_owned()))?;
        shuffle(&mut active, &mut *rng_guard);
        active.iter().take(required).map(|w| w.id).collect()
    };

    let now = clock.now();
    let room_id = Uuid::new_v4();
    let mut players = Vec::with_capacity(1 + invitees.len());
    players.push(Player {
        id: Uuid::new_v4(),
        user_id: identity.user_id,
        room_id,
        position: 1,
        status: PlayerStatus::Alive,
        join_status: JoinStatus::Joined,
        kills: 0,
        target: None,
        words: None,
        eliminated_at: None,
    });
    for (i, invitee) in invitees.iter().enumerate() {
        players.push(Player {
            id: Uuid::new_v4(),
            user_id: *invitee,
            room_id,
            position: u32::try_from(i).unwrap_or(u32::MAX).saturating_add(2),
            status: PlayerStatus::Alive,
            join_status: JoinStatus::Invited,
            kills: 0,
            target: None,
            words: None,
            eliminated_at: None,
        });
    }

    // The store rejects taken codes; draw again on collision.
    let mut room = None;
    for _ in 0..MAX_CODE_ATTEMPTS {
        let code = {
            let mut rng_guard = rng
                .lock()
                .map_err(|_| GameError::Infrastructure("rng mutex poisoned".to_owned()))?;
            generate_code(&mut *rng_guard)
        };
        let candidate = Room {
            id: room_id,
            code,
            name: command.name.trim().to_owned(),
            capacity: command.capacity,
            status: RoomStatus::Waiting,
            round: 0,
            time_limit_secs: command.time_limit_secs,
            creator: identity.user_id,
            word_pool: word_pool.clone(),
            winner: None,
            created_at: now,
            started_at: None,
            finished_at: None,
        };
        let log = GameLog::new(
            room_id,
            LogKind::RoomCreated,
            format!("room {} created with capacity {}", candidate.code, candidate.capacity),
            now,
        )
        .with_player(players[0].id);

        match store.insert_room(candidate.clone(), players.clone(), log).await {
            Ok(()) => {
                room = Some(candidate);
                break;
            }
            Err(GameError::CodeCollision) => continue,
            Err(err) => return Err(err),
        }
    }
    let room = room.ok_or(GameError::CodeCollision)?;

    tracing::info!(room_id = %room.id, code = %room.code, "room created");

    for invitee in &invitees {
        dispatch_best_effort(
            notifier,
            Notification::Invitation {
                user_id: *invitee,
                room_id: room.id,
                code: room.code.clone(),
                room_name: room.name.clone(),
            },
        )
        .await;
    }

    Ok(room)
}

/// Handles the `StartGame` command.
///
/// Claims the start with a `Waiting → Starting` compare-and-set, builds the
/// initial target ring over joined alive players, and commits
/// `Starting → InProgress` with the assignments.
///
/// # Errors
///
/// Returns `GameError::Authorization` if the requester is not the creator,
/// `GameError::StateConflict` if the room is not waiting,
/// `GameError::InsufficientPlayers` with fewer than two joined players.
pub async fn handle_start_game(
    identity: Identity,
    command: &StartGame,
    clock: &dyn Clock,
    rng: &Mutex<dyn DeterministicRng + Send>,
    store: &dyn GameStore,
    notifier: &dyn Notifier,
) -> Result<(), GameError> {
    let room = store.room(command.room_id).await?;
    if room.creator != identity.user_id {
        return Err(GameError::Authorization(
            "only the room creator may start the game".to_owned(),
        ));
    }
    if room.status != RoomStatus::Waiting {
        return Err(GameError::StateConflict(format!(
            "room is {}, not waiting",
            room.status.as_str()
        )));
    }

    let players = store.players(command.room_id).await?;
    let ring_players = alive_joined(&players);
    if ring_players.len() < MIN_PLAYERS_TO_START {
        return Err(GameError::InsufficientPlayers {
            joined: ring_players.len(),
            required: MIN_PLAYERS_TO_START,
        });
    }

    store.mark_starting(command.room_id).await?;

    let committed = async {
        let pool_words = store.words(&room.word_pool).await?;
        let assignments = assignments_for(&ring_players, pool_words, rng)?;

        let now = clock.now();
        let log = GameLog::new(
            command.room_id,
            LogKind::GameStarted,
            format!("game started with {} players", ring_players.len()),
            now,
        )
        .with_payload(serde_json::json!({ "players": ring_players.len() }));
        store
            .commit_start(command.room_id, assignments.clone(), now, log)
            .await?;
        Ok::<Vec<TargetAssignment>, GameError>(assignments)
    }
    .await;
    let assignments = match committed {
        Ok(assignments) => assignments,
        Err(err) => {
            // Release the claim so the room never strands in Starting, a
            // state no other operation accepts.
            match store.reset_starting(command.room_id).await {
                Ok(()) | Err(GameError::StateConflict(_)) => {}
                Err(reset_err) => {
                    tracing::warn!(
                        room_id = %command.room_id,
                        error = %reset_err,
                        "failed to release the start claim"
                    );
                }
            }
            return Err(err);
        }
    };

    tracing::info!(room_id = %command.room_id, players = ring_players.len(), "game started");

    dispatch_best_effort(
        notifier,
        Notification::GameStarted {
            room_id: command.room_id,
        },
    )
    .await;
    for assignment in &assignments {
        if let Some(player) = players.iter().find(|p| p.id == assignment.player_id) {
            dispatch_best_effort(
                notifier,
                Notification::NewTarget {
                    user_id: player.user_id,
                    room_id: command.room_id,
                    target_id: assignment.target_id,
                    words: assignment.words.clone(),
                },
            )
            .await;
        }
    }

    Ok(())
}

/// Handles the `JoinRoom` command: accepts an invitation, re-joins after
/// leaving a waiting room, or takes a free seat.
///
/// # Errors
///
/// Returns `GameError::StateConflict` when the user already joined, when a
/// departed player tries to re-join a started game, or when the roster is
/// full.
pub async fn handle_join_room(
    identity: Identity,
    command: &JoinRoom,
    clock: &dyn Clock,
    store: &dyn GameStore,
    notifier: &dyn Notifier,
) -> Result<Player, GameError> {
    let room = store.room(command.room_id).await?;
    let players = store.players(command.room_id).await?;
    let now = clock.now();

    let joined = if let Some(existing) = players.iter().find(|p| p.user_id == identity.user_id) {
        match existing.join_status {
            JoinStatus::Joined => {
                return Err(GameError::StateConflict("already joined this room".to_owned()));
            }
            JoinStatus::Left if room.status != RoomStatus::Waiting => {
                return Err(GameError::StateConflict(
                    "cannot re-join a game that already started".to_owned(),
                ));
            }
            expected @ (JoinStatus::Invited | JoinStatus::Left) => {
                let log = GameLog::new(
                    command.room_id,
                    LogKind::PlayerJoined,
                    "player joined",
                    now,
                )
                .with_player(existing.id);
                store
                    .set_join_status(existing.id, expected, JoinStatus::Joined, log)
                    .await?;
                let mut joined = existing.clone();
                joined.join_status = JoinStatus::Joined;
                joined
            }
        }
    } else {
        if room.status != RoomStatus::Waiting {
            return Err(GameError::StateConflict(
                "room is no longer accepting players".to_owned(),
            ));
        }
        if players.len() >= room.capacity as usize {
            return Err(GameError::StateConflict("room is full".to_owned()));
        }
        let position = players.iter().map(|p| p.position).max().unwrap_or(0) + 1;
        let player = Player {
            id: Uuid::new_v4(),
            user_id: identity.user_id,
            room_id: command.room_id,
            position,
            status: PlayerStatus::Alive,
            join_status: JoinStatus::Joined,
            kills: 0,
            target: None,
            words: None,
            eliminated_at: None,
        };
        let log = GameLog::new(command.room_id, LogKind::PlayerJoined, "player joined", now)
            .with_player(player.id);
        store.insert_player(player.clone(), log).await?;
        player
    };

    dispatch_best_effort(
        notifier,
        Notification::PlayerJoined {
            room_id: command.room_id,
            player_id: joined.id,
        },
    )
    .await;

    Ok(joined)
}

/// Handles the `LeaveRoom` command.
///
/// Leaving an in-progress game only marks the player `Left`; their ring
/// bookkeeping stays until the creator reassigns targets.
///
/// # Errors
///
/// Returns `GameError::StateConflict` if the user is not currently joined.
pub async fn handle_leave_room(
    identity: Identity,
    command: &LeaveRoom,
    clock: &dyn Clock,
    store: &dyn GameStore,
    notifier: &dyn Notifier,
) -> Result<(), GameError> {
    let player = store.player_for_user(command.room_id, identity.user_id).await?;
    if player.join_status != JoinStatus::Joined {
        return Err(GameError::StateConflict("player is not joined".to_owned()));
    }

    let log = GameLog::new(command.room_id, LogKind::PlayerLeft, "player left", clock.now())
        .with_player(player.id);
    store
        .set_join_status(player.id, JoinStatus::Joined, JoinStatus::Left, log)
        .await?;

    dispatch_best_effort(
        notifier,
        Notification::PlayerLeft {
            room_id: command.room_id,
            player_id: player.id,
        },
    )
    .await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use lastword_assignment::domain::ring::ring_is_valid;
    use lastword_test_support::fixtures::{fixed_now, seed_words};
    use lastword_test_support::{FixedClock, MemoryStore, RecordingNotifier, SequenceRng};

    use super::*;

    fn test_rng() -> Mutex<SequenceRng> {
        Mutex::new(SequenceRng::cycling(vec![3, 1, 4, 1, 5, 9, 2, 6]))
    }

    fn create_command(capacity: u32, invitees: Vec<Uuid>) -> CreateRoom {
        CreateRoom {
            name: "friday night".to_owned(),
            capacity,
            time_limit_secs: 60,
            invitees,
        }
    }

    #[tokio::test]
    async fn test_create_room_seats_creator_and_invitees() {
        let store = MemoryStore::new();
        seed_words(&store, 12).await;
        let clock = FixedClock(fixed_now());
        let rng = test_rng();
        let notifier = RecordingNotifier::new();
        let creator = Uuid::new_v4();
        let invitees = vec![Uuid::new_v4(), Uuid::new_v4()];

        let room = handle_create_room(
            Identity::player(creator),
            &create_command(4, invitees.clone()),
            &clock,
            &rng,
            &store,
            &notifier,
        )
        .await
        .unwrap();

        assert_eq!(room.status, RoomStatus::Waiting);
        assert_eq!(room.word_pool.len(), 4 * WORDS_PER_PLAYER);
        assert_eq!(room.creator, creator);

        let players = store.players(room.id).await.unwrap();
        assert_eq!(players.len(), 3);
        let owner = players.iter().find(|p| p.user_id == creator).unwrap();
        assert_eq!(owner.position, 1);
        assert_eq!(owner.join_status, JoinStatus::Joined);
        for invitee in &invitees {
            let seat = players.iter().find(|p| p.user_id == *invitee).unwrap();
            assert_eq!(seat.join_status, JoinStatus::Invited);
        }

        let invitations = notifier
            .dispatched()
            .into_iter()
            .filter(|n| matches!(n, Notification::Invitation { .. }))
            .count();
        assert_eq!(invitations, 2);
    }

    #[tokio::test]
    async fn test_create_room_rejects_capacity_out_of_range() {
        let store = MemoryStore::new();
        seed_words(&store, 30).await;
        let clock = FixedClock(fixed_now());
        let rng = test_rng();
        let notifier = RecordingNotifier::new();

        let err = handle_create_room(
            Identity::player(Uuid::new_v4()),
            &create_command(9, Vec::new()),
            &clock,
            &rng,
            &store,
            &notifier,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, GameError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_room_needs_three_words_per_seat() {
        let store = MemoryStore::new();
        seed_words(&store, 11).await;
        let clock = FixedClock(fixed_now());
        let rng = test_rng();
        let notifier = RecordingNotifier::new();

        let err = handle_create_room(
            Identity::player(Uuid::new_v4()),
            &create_command(4, Vec::new()),
            &clock,
            &rng,
            &store,
            &notifier,
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            GameError::InsufficientWordPool {
                available: 11,
                required: 12,
            }
        ));
    }

    #[tokio::test]
    async fn test_create_room_survives_notifier_outage() {
        let store = MemoryStore::new();
        seed_words(&store, 6).await;
        let clock = FixedClock(fixed_now());
        let rng = test_rng();
        let notifier = RecordingNotifier::failing();

        let result = handle_create_room(
            Identity::player(Uuid::new_v4()),
            &create_command(2, vec![Uuid::new_v4()]),
            &clock,
            &rng,
            &store,
            &notifier,
        )
        .await;
        assert!(result.is_ok());
    }

    /// Drives create → invitee joins → start, the minimal full lifecycle.
    async fn started_room(
        store: &MemoryStore,
        rng: &Mutex<SequenceRng>,
        notifier: &RecordingNotifier,
    ) -> (Room, Uuid, Uuid) {
        seed_words(store, 12).await;
        let clock = FixedClock(fixed_now());
        let creator = Uuid::new_v4();
        let invitee = Uuid::new_v4();

        let room = handle_create_room(
            Identity::player(creator),
            &create_command(4, vec![invitee]),
            &clock,
            rng,
            store,
            notifier,
        )
        .await
        .unwrap();
        handle_join_room(
            Identity::player(invitee),
            &JoinRoom { room_id: room.id },
            &clock,
            store,
            notifier,
        )
        .await
        .unwrap();
        handle_start_game(
            Identity::player(creator),
            &StartGame { room_id: room.id },
            &clock,
            rng,
            store,
            notifier,
        )
        .await
        .unwrap();
        (room, creator, invitee)
    }

    #[tokio::test]
    async fn test_start_game_builds_a_valid_ring() {
        let store = MemoryStore::new();
        let rng = test_rng();
        let notifier = RecordingNotifier::new();

        let (room, _, _) = started_room(&store, &rng, &notifier).await;

        let started = store.room(room.id).await.unwrap();
        assert_eq!(started.status, RoomStatus::InProgress);
        assert_eq!(started.round, 1);
        assert!(started.started_at.is_some());

        let players = store.players(room.id).await.unwrap();
        assert!(ring_is_valid(&players));
        for player in alive_joined(&players) {
            assert!(player.words.is_some());
        }

        let sent = notifier.dispatched();
        assert!(sent.iter().any(|n| matches!(n, Notification::GameStarted { .. })));
        let targets = sent
            .iter()
            .filter(|n| matches!(n, Notification::NewTarget { .. }))
            .count();
        assert_eq!(targets, 2);
    }

    #[tokio::test]
    async fn test_start_game_requires_the_creator() {
        let store = MemoryStore::new();
        seed_words(&store, 6).await;
        let clock = FixedClock(fixed_now());
        let rng = test_rng();
        let notifier = RecordingNotifier::new();

        let room = handle_create_room(
            Identity::player(Uuid::new_v4()),
            &create_command(2, Vec::new()),
            &clock,
            &rng,
            &store,
            &notifier,
        )
        .await
        .unwrap();

        let err = handle_start_game(
            Identity::player(Uuid::new_v4()),
            &StartGame { room_id: room.id },
            &clock,
            &rng,
            &store,
            &notifier,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, GameError::Authorization(_)));
    }

    #[tokio::test]
    async fn test_start_game_needs_two_joined_players() {
        let store = MemoryStore::new();
        seed_words(&store, 12).await;
        let clock = FixedClock(fixed_now());
        let rng = test_rng();
        let notifier = RecordingNotifier::new();
        let creator = Uuid::new_v4();

        // Invitee never accepts, so only the creator is joined.
        let room = handle_create_room(
            Identity::player(creator),
            &create_command(4, vec![Uuid::new_v4()]),
            &clock,
            &rng,
            &store,
            &notifier,
        )
        .await
        .unwrap();

        let err = handle_start_game(
            Identity::player(creator),
            &StartGame { room_id: room.id },
            &clock,
            &rng,
            &store,
            &notifier,
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            GameError::InsufficientPlayers {
                joined: 1,
                required: 2,
            }
        ));
    }

    #[tokio::test]
    async fn test_start_game_rejects_a_second_start() {
        let store = MemoryStore::new();
        let rng = test_rng();
        let notifier = RecordingNotifier::new();
        let clock = FixedClock(fixed_now());

        let (room, creator, _) = started_room(&store, &rng, &notifier).await;

        let err = handle_start_game(
            Identity::player(creator),
            &StartGame { room_id: room.id },
            &clock,
            &rng,
            &store,
            &notifier,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, GameError::StateConflict(_)));
    }

    #[tokio::test]
    async fn test_failed_start_releases_the_room() {
        use lastword_test_support::fixtures::waiting_room;

        let store = MemoryStore::new();
        let clock = FixedClock(fixed_now());
        let rng = test_rng();
        let notifier = RecordingNotifier::new();
        let creator = Uuid::new_v4();

        // A waiting roster whose word pool references no stored words, so
        // building the assignments fails after the start claim is taken.
        let room = waiting_room(creator, 4);
        let seats: Vec<Player> = (1..=2u32)
            .map(|position| Player {
                id: Uuid::new_v4(),
                user_id: if position == 1 { creator } else { Uuid::new_v4() },
                room_id: room.id,
                position,
                status: PlayerStatus::Alive,
                join_status: JoinStatus::Joined,
                kills: 0,
                target: None,
                words: None,
                eliminated_at: None,
            })
            .collect();
        store
            .insert_room(
                room.clone(),
                seats,
                GameLog::new(room.id, LogKind::RoomCreated, "fixture", fixed_now()),
            )
            .await
            .unwrap();

        let err = handle_start_game(
            Identity::player(creator),
            &StartGame { room_id: room.id },
            &clock,
            &rng,
            &store,
            &notifier,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, GameError::Validation(_)));

        // The claim was backed out rather than stranding the room.
        assert_eq!(store.room(room.id).await.unwrap().status, RoomStatus::Waiting);
    }

    #[tokio::test]
    async fn test_join_room_rejects_when_full() {
        let store = MemoryStore::new();
        seed_words(&store, 6).await;
        let clock = FixedClock(fixed_now());
        let rng = test_rng();
        let notifier = RecordingNotifier::new();

        let room = handle_create_room(
            Identity::player(Uuid::new_v4()),
            &create_command(2, vec![Uuid::new_v4()]),
            &clock,
            &rng,
            &store,
            &notifier,
        )
        .await
        .unwrap();

        let err = handle_join_room(
            Identity::player(Uuid::new_v4()),
            &JoinRoom { room_id: room.id },
            &clock,
            &store,
            &notifier,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, GameError::StateConflict(_)));
    }

    #[tokio::test]
    async fn test_leave_and_rejoin_while_waiting() {
        let store = MemoryStore::new();
        seed_words(&store, 12).await;
        let clock = FixedClock(fixed_now());
        let rng = test_rng();
        let notifier = RecordingNotifier::new();
        let creator = Uuid::new_v4();
        let guest = Uuid::new_v4();

        let room = handle_create_room(
            Identity::player(creator),
            &create_command(4, Vec::new()),
            &clock,
            &rng,
            &store,
            &notifier,
        )
        .await
        .unwrap();
        handle_join_room(
            Identity::player(guest),
            &JoinRoom { room_id: room.id },
            &clock,
            &store,
            &notifier,
        )
        .await
        .unwrap();
        handle_leave_room(
            Identity::player(guest),
            &LeaveRoom { room_id: room.id },
            &clock,
            &store,
            &notifier,
        )
        .await
        .unwrap();

        let seat = store.player_for_user(room.id, guest).await.unwrap();
        assert_eq!(seat.join_status, JoinStatus::Left);

        let rejoined = handle_join_room(
            Identity::player(guest),
            &JoinRoom { room_id: room.id },
            &clock,
            &store,
            &notifier,
        )
        .await
        .unwrap();
        assert_eq!(rejoined.join_status, JoinStatus::Joined);
        // Re-joining reuses the seat rather than adding a roster row.
        assert_eq!(store.players(room.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_departed_player_cannot_rejoin_started_game() {
        let store = MemoryStore::new();
        let rng = test_rng();
        let notifier = RecordingNotifier::new();
        let clock = FixedClock(fixed_now());

        let (room, _, invitee) = started_room(&store, &rng, &notifier).await;
        handle_leave_room(
            Identity::player(invitee),
            &LeaveRoom { room_id: room.id },
            &clock,
            &store,
            &notifier,
        )
        .await
        .unwrap();

        let err = handle_join_room(
            Identity::player(invitee),
            &JoinRoom { room_id: room.id },
            &clock,
            &store,
            &notifier,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, GameError::StateConflict(_)));
    }
}
