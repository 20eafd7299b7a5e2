//! Shared application state.

use std::sync::{Arc, Mutex};

use lastword_core::clock::Clock;
use lastword_core::notify::Notifier;
use lastword_core::rng::DeterministicRng;
use lastword_core::store::GameStore;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Game state store.
    pub store: Arc<dyn GameStore>,
    /// Clock abstraction, swapped for a fixed clock in tests.
    pub clock: Arc<dyn Clock + Send + Sync>,
    /// RNG abstraction, swapped for a scripted sequence in tests.
    pub rng: Arc<Mutex<dyn DeterministicRng + Send>>,
    /// Notification sink.
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        store: Arc<dyn GameStore>,
        clock: Arc<dyn Clock + Send + Sync>,
        rng: Arc<Mutex<dyn DeterministicRng + Send>>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            clock,
            rng,
            notifier,
        }
    }
}
