use std::sync::Arc;

use tracing::info;

use super::{
    message::{ConnectionId, IdentityId, Role},
    registry::ConnectionRegistry,
};

/// Turns login signals into registry bindings.
///
/// The identity is taken as asserted: the HTTP login flow has already
/// authenticated it before the client opens its socket.
#[derive(Clone)]
pub struct SessionBinder {
    registry: Arc<ConnectionRegistry>,
}

impl SessionBinder {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Returns the connection that previously held this identity, if any.
    pub fn on_login(&self, connection: ConnectionId, role: Role, identity: impl Into<IdentityId>) -> Option<ConnectionId> {
        let identity = identity.into();
        info!(%connection, %role, %identity, "login");
        self.registry.bind(connection, role, identity)
    }
}
