use std::sync::Arc;

use tracing::{debug, info};

use super::{
    message::{Binding, ConnectionId},
    registry::{ConnectionRegistry, RelayStats},
};

#[derive(Clone)]
pub struct LifecycleManager {
    registry: Arc<ConnectionRegistry>,
}

impl LifecycleManager {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// New connections stay unbound until they log in.
    pub fn on_connection_established(&self, connection: ConnectionId) {
        info!(%connection, "connection established");
    }

    pub fn on_connection_closed(&self, connection: ConnectionId) -> Option<Binding> {
        let released = self.registry.unbind(connection);
        match &released {
            Some(binding) => info!(%connection, identity = %binding, "connection closed"),
            None => debug!(%connection, "unbound connection closed"),
        }
        released
    }

    pub fn stats(&self) -> RelayStats {
        self.registry.stats()
    }
}
