//! Shared test mocks and fixtures for the Lastword game server.

mod clock;
pub mod fixtures;
mod notify;
mod rng;

pub use clock::FixedClock;
pub use fixtures::{fixed_now, in_progress_room, seed_words, waiting_room, word};
pub use lastword_store::MemoryStore;
pub use notify::RecordingNotifier;
pub use rng::SequenceRng;
