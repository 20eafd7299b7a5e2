//! Background expiration sweeper.
//!
//! Rooms that never finish are expired in bulk by a periodic task rather
//! than lazily on read, so stale rooms disappear even when nobody looks at
//! them. The API binary spawns [`sweep`] on an interval.

use chrono::Duration;
use lastword_core::clock::Clock;
use lastword_core::error::GameError;
use lastword_core::log::{GameLog, LogKind};
use lastword_core::notify::{Notification, Notifier, dispatch_best_effort};
use lastword_core::store::GameStore;

/// In-progress rooms started longer ago than this are considered abandoned.
pub const STALE_AFTER_HOURS: i64 = 24;

/// Expires every in-progress room started more than [`STALE_AFTER_HOURS`]
/// ago. Returns how many rooms were expired.
///
/// A room that finishes between the staleness query and the expiry
/// compare-and-set loses the race cleanly: the conflict is logged and the
/// sweep moves on.
///
/// # Errors
///
/// Returns `GameError::Infrastructure` when the staleness query itself
/// fails; per-room conflicts are swallowed.
pub async fn sweep(
    clock: &dyn Clock,
    store: &dyn GameStore,
    notifier: &dyn Notifier,
) -> Result<usize, GameError> {
    let now = clock.now();
    let cutoff = now - Duration::hours(STALE_AFTER_HOURS);
    let stale = store.stale_rooms(cutoff).await?;

    let mut expired = 0;
    for room in stale {
        let log = GameLog::new(
            room.id,
            LogKind::RoomExpired,
            format!("room {} expired after {STALE_AFTER_HOURS}h", room.code),
            now,
        );
        match store.expire_room(room.id, now, log).await {
            Ok(()) => {
                expired += 1;
                tracing::info!(room_id = %room.id, code = %room.code, "room expired");
                dispatch_best_effort(
                    notifier,
                    Notification::GameEnded {
                        room_id: room.id,
                        winner: None,
                    },
                )
                .await;
            }
            Err(GameError::StateConflict(reason)) => {
                tracing::debug!(room_id = %room.id, %reason, "room finished before expiry");
            }
            Err(err) => return Err(err),
        }
    }

    Ok(expired)
}
