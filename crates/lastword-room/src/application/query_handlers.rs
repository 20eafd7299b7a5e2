//! Query handlers for room state.
//!
//! Queries never mutate; they project store rows into serializable views.
//! Roster views hide each player's target and words — those are only
//! revealed to the player themselves through [`get_player_state`].

use lastword_core::error::GameError;
use lastword_core::identity::{Identity, Role};
use lastword_core::log::GameLog;
use lastword_core::model::{JoinStatus, Player, PlayerStatus, Room, UserStats, WordTriple};
use lastword_core::store::GameStore;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Public projection of a roster entry. Target and words are omitted.
#[derive(Debug, Clone, Serialize)]
pub struct RosterEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub position: u32,
    pub status: PlayerStatus,
    pub join_status: JoinStatus,
    pub kills: u32,
    pub eliminated_at: Option<DateTime<Utc>>,
}

impl From<&Player> for RosterEntry {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id,
            user_id: player.user_id,
            position: player.position,
            status: player.status,
            join_status: player.join_status,
            kills: player.kills,
            eliminated_at: player.eliminated_at,
        }
    }
}

/// Entries of the room log included in a room view.
const RECENT_LOG_LIMIT: usize = 20;

/// Full room view: the room row, its roster, and the tail of its log.
#[derive(Debug, Clone, Serialize)]
pub struct RoomView {
    #[serde(flatten)]
    pub room: Room,
    pub players: Vec<RosterEntry>,
    pub recent_logs: Vec<GameLog>,
}

/// A player's private view of their own assignment.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerStateView {
    pub player: RosterEntry,
    pub target: Option<Uuid>,
    pub words: Option<WordTriple>,
}

/// Fetches a room and its roster by id.
///
/// # Errors
///
/// Returns `GameError::NotFound` when no such room exists.
pub async fn get_room_state(room_id: Uuid, store: &dyn GameStore) -> Result<RoomView, GameError> {
    let room = store.room(room_id).await?;
    room_view(room, store).await
}

async fn room_view(room: Room, store: &dyn GameStore) -> Result<RoomView, GameError> {
    let players = store.players(room.id).await?;
    let logs = store.logs(room.id).await?;
    let skip = logs.len().saturating_sub(RECENT_LOG_LIMIT);
    Ok(RoomView {
        room,
        players: players.iter().map(RosterEntry::from).collect(),
        recent_logs: logs.into_iter().skip(skip).collect(),
    })
}

/// Fetches a room and its roster by join code.
///
/// # Errors
///
/// Returns `GameError::NotFound` when no room carries the code.
pub async fn get_room_by_code(code: &str, store: &dyn GameStore) -> Result<RoomView, GameError> {
    let room = store.room_by_code(code).await?;
    room_view(room, store).await
}

/// Fetches the requesting player's own record, target, and word triple.
///
/// # Errors
///
/// Returns `GameError::NotFound` when the user has no seat in the room.
pub async fn get_player_state(
    identity: Identity,
    room_id: Uuid,
    store: &dyn GameStore,
) -> Result<PlayerStateView, GameError> {
    let player = store.player_for_user(room_id, identity.user_id).await?;
    Ok(PlayerStateView {
        target: player.target,
        words: player.words.clone(),
        player: RosterEntry::from(&player),
    })
}

/// Fetches a room's event log in insertion order.
///
/// # Errors
///
/// Returns `GameError::NotFound` when no such room exists.
pub async fn get_room_logs(room_id: Uuid, store: &dyn GameStore) -> Result<Vec<GameLog>, GameError> {
    // Resolve the room first so an unknown id reads as 404, not an empty log.
    store.room(room_id).await?;
    store.logs(room_id).await
}

/// Lists rooms the sweeper has expired. Housekeeping data, admin only.
///
/// # Errors
///
/// Returns `GameError::Authorization` for non-admin callers.
pub async fn list_expired(
    identity: Identity,
    store: &dyn GameStore,
) -> Result<Vec<Room>, GameError> {
    if identity.role != Role::Admin {
        return Err(GameError::Authorization(
            "expired-room listing is admin only".to_owned(),
        ));
    }
    store.expired_rooms().await
}

/// Fetches lifetime stats for a user. Users with no finished games get zeros.
///
/// # Errors
///
/// Returns `GameError::Infrastructure` on store failure.
pub async fn get_user_stats(user_id: Uuid, store: &dyn GameStore) -> Result<UserStats, GameError> {
    store.user_stats(user_id).await
}

#[cfg(test)]
mod tests {
    use lastword_core::model::RoomStatus;
    use lastword_test_support::fixtures::in_progress_room;
    use lastword_test_support::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn test_room_view_hides_targets_and_words() {
        let store = MemoryStore::new();
        let (room, _) = in_progress_room(&store, 3).await;

        let view = get_room_state(room.id, &store).await.unwrap();
        assert_eq!(view.room.status, RoomStatus::InProgress);
        assert_eq!(view.players.len(), 3);
        let json = serde_json::to_value(&view).unwrap();
        let roster = json["players"].as_array().unwrap();
        assert!(roster.iter().all(|p| p.get("target").is_none()));
        assert!(roster.iter().all(|p| p.get("words").is_none()));
    }

    #[tokio::test]
    async fn test_player_state_reveals_own_assignment() {
        let store = MemoryStore::new();
        let (room, players) = in_progress_room(&store, 3).await;

        let view = get_player_state(Identity::player(players[0].user_id), room.id, &store)
            .await
            .unwrap();
        assert_eq!(view.target, Some(players[1].id));
        assert!(view.words.is_some());
    }

    #[tokio::test]
    async fn test_room_by_code_resolves() {
        let store = MemoryStore::new();
        let (room, _) = in_progress_room(&store, 2).await;

        let view = get_room_by_code(&room.code, &store).await.unwrap();
        assert_eq!(view.room.id, room.id);
    }

    #[tokio::test]
    async fn test_expired_listing_is_admin_only() {
        let store = MemoryStore::new();
        let caller = Uuid::new_v4();

        let err = list_expired(Identity::player(caller), &store)
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::Authorization(_)));

        let rooms = list_expired(Identity::admin(caller), &store).await.unwrap();
        assert!(rooms.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_room_logs_read_as_not_found() {
        let store = MemoryStore::new();
        let err = get_room_logs(Uuid::new_v4(), &store).await.unwrap_err();
        assert!(matches!(err, GameError::NotFound { .. }));
    }
}
