//! Notification sink for the API binary.
//!
//! Delivery transport (push, email, websockets) lives upstream; the server
//! only emits structured payloads. This sink writes them to the log stream
//! where the delivery collaborator tails them.

use async_trait::async_trait;
use lastword_core::notify::{DispatchError, Notification, Notifier};

/// Emits every notification as a structured tracing event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn dispatch(&self, notification: Notification) -> Result<(), DispatchError> {
        let payload = serde_json::to_value(&notification)
            .map_err(|e| DispatchError(format!("notification serialization failed: {e}")))?;
        tracing::info!(notification = %payload, "notification dispatched");
        Ok(())
    }
}
