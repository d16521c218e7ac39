//! Real-time relay between seekers and providers.
//!
//! `ws` accepts sockets and feeds three kinds of signals in here:
//! established/closed go to [`LifecycleManager`], login goes to
//! [`SessionBinder`], and chat/profile frames go to [`MessageRouter`]. All
//! three share one [`ConnectionRegistry`].

mod event;
mod lifecycle;
mod message;
mod registry;
mod router;
mod session;
mod transport;
mod ws;

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::AppState;

pub use event::InboundEvent;
pub use lifecycle::LifecycleManager;
pub use message::{Binding, ConnectionId, IdentityId, Message, MessageKind, Role};
pub use registry::{ConnectionRegistry, RelayStats};
pub use router::{MessageRouter, RouteOutcome};
pub use session::SessionBinder;
pub use transport::{FrameReceiver, Transport, WsGateway};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::relay_ws))
}

#[derive(Clone)]
pub struct Relay {
    registry: Arc<ConnectionRegistry>,
    binder: SessionBinder,
    router: MessageRouter,
    lifecycle: LifecycleManager,
}

impl Relay {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        Self {
            binder: SessionBinder::new(registry.clone()),
            router: MessageRouter::new(registry.clone(), transport),
            lifecycle: LifecycleManager::new(registry.clone()),
            registry,
        }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn on_established(&self, connection: ConnectionId) {
        self.lifecycle.on_connection_established(connection);
    }

    pub fn on_closed(&self, connection: ConnectionId) -> Option<Binding> {
        self.lifecycle.on_connection_closed(connection)
    }

    /// Login yields no route outcome.
    pub fn dispatch(&self, connection: ConnectionId, event: InboundEvent) -> Option<RouteOutcome> {
        match event {
            InboundEvent::Login { role, identity } => {
                self.binder.on_login(connection, role, identity);
                None
            }
            InboundEvent::Chat(message) | InboundEvent::ProfileDisclosure(message) => {
                Some(self.router.route(&message))
            }
        }
    }

    pub fn stats(&self) -> RelayStats {
        self.lifecycle.stats()
    }
}
