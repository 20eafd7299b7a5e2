//! Test notifier — records dispatched notifications for assertions.

use std::sync::Mutex;

use async_trait::async_trait;
use lastword_core::notify::{DispatchError, Notification, Notifier};

/// A notifier that records every dispatched notification. Optionally fails
/// every dispatch, for tests proving that notification failures never fail
/// the primary transaction.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    dispatched: Mutex<Vec<Notification>>,
    fail: bool,
}

impl RecordingNotifier {
    /// Creates a notifier that accepts everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a notifier whose every dispatch fails.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            dispatched: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Returns a snapshot of everything dispatched so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn dispatched(&self) -> Vec<Notification> {
        self.dispatched.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn dispatch(&self, notification: Notification) -> Result<(), DispatchError> {
        self.dispatched.lock().unwrap().push(notification);
        if self.fail {
            Err(DispatchError("transport unavailable".to_owned()))
        } else {
            Ok(())
        }
    }
}
