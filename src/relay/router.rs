use std::sync::Arc;

use tracing::debug;

use super::{message::Message, registry::ConnectionRegistry, transport::Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    Delivered,
    /// Recipient had no live connection. Nothing is queued or retried.
    Dropped,
}

#[derive(Clone)]
pub struct MessageRouter {
    registry: Arc<ConnectionRegistry>,
    transport: Arc<dyn Transport>,
}

impl MessageRouter {
    pub fn new(registry: Arc<ConnectionRegistry>, transport: Arc<dyn Transport>) -> Self {
        Self { registry, transport }
    }

    pub fn route(&self, message: &Message) -> RouteOutcome {
        let recipient = &message.recipient;
        let Some(connection) = self.registry.lookup(recipient.role, &recipient.identity) else {
            debug!(%recipient, kind = message.kind.tag(), "recipient offline, dropping");
            return RouteOutcome::Dropped;
        };

        self.transport.deliver(connection, message.kind.event_name(), message.to_payload());
        debug!(%recipient, %connection, kind = message.kind.tag(), "delivered");
        RouteOutcome::Delivered
    }
}
