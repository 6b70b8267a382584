//! Event Bus
//!
//! Outbound side of the engine pub/sub bus. The transport itself belongs to
//! the host; [`ChannelEventBus`] is an in-process implementation that fans
//! events out over tokio broadcast channels.

use tokio::sync::broadcast;
use tracing::debug;

use crate::network::protocol::{LocalEvent, ServerEvent};

/// Fire-and-forget event emission.
pub trait EventBus: Send + Sync {
    /// Emit an event to the server.
    fn emit_server(&self, event: ServerEvent);

    /// Emit an event on the local client.
    fn emit_local(&self, event: LocalEvent);
}

/// In-process bus backed by broadcast channels.
pub struct ChannelEventBus {
    server_tx: broadcast::Sender<ServerEvent>,
    local_tx: broadcast::Sender<LocalEvent>,
}

impl ChannelEventBus {
    /// Create a bus whose channels retain up to `capacity` undelivered events.
    pub fn new(capacity: usize) -> Self {
        let (server_tx, _) = broadcast::channel(capacity);
        let (local_tx, _) = broadcast::channel(capacity);

        Self { server_tx, local_tx }
    }

    /// Subscribe to server-bound events.
    pub fn subscribe_server(&self) -> broadcast::Receiver<ServerEvent> {
        self.server_tx.subscribe()
    }

    /// Subscribe to local events.
    pub fn subscribe_local(&self) -> broadcast::Receiver<LocalEvent> {
        self.local_tx.subscribe()
    }
}

impl Default for ChannelEventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl EventBus for ChannelEventBus {
    fn emit_server(&self, event: ServerEvent) {
        debug!(event = event.name(), "emit server event");
        // No subscriber is not an error: nobody is listening yet.
        let _ = self.server_tx.send(event);
    }

    fn emit_local(&self, event: LocalEvent) {
        debug!(event = event.name(), "emit local event");
        let _ = self.local_tx.send(event);
    }
}
