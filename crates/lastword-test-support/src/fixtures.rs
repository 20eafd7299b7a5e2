//! Store fixtures shared across crate tests.

use chrono::{DateTime, TimeZone, Utc};
use lastword_core::log::{GameLog, LogKind};
use lastword_core::model::{
    JoinStatus, Player, PlayerStatus, Room, RoomStatus, Word, WordTriple,
};
use lastword_core::store::GameStore;
use lastword_store::MemoryStore;
use uuid::Uuid;

/// Fixed timestamp used across tests.
///
/// # Panics
///
/// Never; the date literal is valid.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

/// Builds an active word.
#[must_use]
pub fn word(text: &str) -> Word {
    Word {
        id: Uuid::new_v4(),
        text: text.to_owned(),
        active: true,
    }
}

/// Seeds `count` active words (`word00`, `word01`, ...) into the store.
///
/// # Panics
///
/// Panics if an insert fails; fixtures assume a healthy store.
pub async fn seed_words(store: &MemoryStore, count: usize) {
    for i in 0..count {
        store.insert_word(word(&format!("word{i:02}"))).await.unwrap();
    }
}

/// Builds an un-persisted Waiting room owned by `creator`.
#[must_use]
pub fn waiting_room(creator: Uuid, capacity: u32) -> Room {
    Room {
        id: Uuid::new_v4(),
        code: format!("T{}", &Uuid::new_v4().simple().to_string()[..5]).to_uppercase(),
        name: "fixture room".to_owned(),
        capacity,
        status: RoomStatus::Waiting,
        round: 0,
        time_limit_secs: 60,
        creator,
        word_pool: Vec::new(),
        winner: None,
        created_at: fixed_now(),
        started_at: None,
        finished_at: None,
    }
}

/// Seeds an `InProgress` room with `count` joined alive players ringed in
/// position order (1 → 2 → ... → count → 1), each holding a word triple.
///
/// # Panics
///
/// Panics if the store rejects the seed data.
pub async fn in_progress_room(store: &MemoryStore, count: usize) -> (Room, Vec<Player>) {
    assert!(count >= 2, "a ring needs at least two players");

    let creator = Uuid::new_v4();
    let mut room = waiting_room(creator, 8);
    room.status = RoomStatus::InProgress;
    room.round = 1;
    room.started_at = Some(fixed_now());

    let mut players: Vec<Player> = (0..count)
        .map(|i| Player {
            id: Uuid::new_v4(),
            user_id: if i == 0 { creator } else { Uuid::new_v4() },
            room_id: room.id,
            position: u32::try_from(i).unwrap() + 1,
            status: PlayerStatus::Alive,
            join_status: JoinStatus::Joined,
            kills: 0,
            target: None,
            words: None,
            eliminated_at: None,
        })
        .collect();
    for i in 0..count {
        players[i].target = Some(players[(i + 1) % count].id);
        players[i].words = Some(WordTriple::new(
            format!("w{i}a"),
            format!("w{i}b"),
            format!("w{i}c"),
        ));
    }

    // Give the room a pool large enough for reassignment paths.
    let mut pool = Vec::new();
    for i in 0..count * 3 {
        let w = word(&format!("pool{i:02}"));
        pool.push(w.id);
        store.insert_word(w).await.unwrap();
    }
    room.word_pool = pool;

    store
        .insert_room(
            room.clone(),
            players.clone(),
            GameLog::new(room.id, LogKind::RoomCreated, "fixture", fixed_now()),
        )
        .await
        .unwrap();
    (room, players)
}
