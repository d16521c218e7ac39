//! Bidirectional index between live connections and the identities they
//! currently represent.

use std::collections::HashMap;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, warn};

use super::message::{Binding, ConnectionId, IdentityId, Role};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayStats {
    pub seeker_count: usize,
    pub provider_count: usize,
}

#[derive(Default)]
struct Indices {
    by_identity: HashMap<Role, HashMap<IdentityId, ConnectionId>>,
    by_connection: HashMap<ConnectionId, Binding>,
}

impl Indices {
    fn owner(&self, role: Role, identity: &str) -> Option<ConnectionId> {
        self.by_identity.get(&role)?.get(identity).copied()
    }

    fn count(&self, role: Role) -> usize {
        self.by_identity.get(&role).map_or(0, HashMap::len)
    }

    /// Drops the identity entry only while it still points at `connection`.
    fn release_identity(&mut self, binding: &Binding, connection: ConnectionId) -> bool {
        let Some(identities) = self.by_identity.get_mut(&binding.role) else {
            return false;
        };
        if identities.get(&binding.identity) != Some(&connection) {
            return false;
        }
        identities.remove(&binding.identity);
        true
    }
}

/// Both indices sit behind one lock so every operation is linearizable.
#[derive(Default)]
pub struct ConnectionRegistry {
    inner: Mutex<Indices>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `connection` to `(role, identity)`.
    ///
    /// A connection that was bound to something else first lets go of its
    /// old identity. If another connection held this identity, it loses its
    /// binding and is returned.
    pub fn bind(&self, connection: ConnectionId, role: Role, identity: impl Into<IdentityId>) -> Option<ConnectionId> {
        let binding = Binding::new(role, identity);
        let mut inner = self.inner.lock();

        if inner.by_connection.get(&connection) == Some(&binding) {
            return None;
        }

        if let Some(previous) = inner.by_connection.remove(&connection) {
            inner.release_identity(&previous, connection);
            debug!(%connection, from = %previous, to = %binding, "rebinding connection");
        }

        let superseded = inner
            .by_identity
            .entry(role)
            .or_default()
            .insert(binding.identity.clone(), connection);
        if let Some(old) = superseded {
            inner.by_connection.remove(&old);
            warn!(%connection, superseded = %old, identity = %binding, "identity logged in again, older connection orphaned");
        }
        inner.by_connection.insert(connection, binding);

        superseded
    }

    pub fn lookup(&self, role: Role, identity: &str) -> Option<ConnectionId> {
        self.inner.lock().owner(role, identity)
    }

    /// Identity currently bound to `connection`, if any.
    pub fn binding_of(&self, connection: ConnectionId) -> Option<Binding> {
        self.inner.lock().by_connection.get(&connection).cloned()
    }

    /// Removes the binding owned by `connection`.
    ///
    /// Unknown connections are a no-op. The identity entry is only removed
    /// while it still points at this connection, so a stale close can never
    /// evict a newer login.
    pub fn unbind(&self, connection: ConnectionId) -> Option<Binding> {
        let mut inner = self.inner.lock();
        let binding = inner.by_connection.remove(&connection)?;
        if !inner.release_identity(&binding, connection) {
            debug!(%connection, identity = %binding, "stale unbind left newer binding in place");
        }
        Some(binding)
    }

    pub fn stats(&self) -> RelayStats {
        let inner = self.inner.lock();
        RelayStats {
            seeker_count: inner.count(Role::Seeker),
            provider_count: inner.count(Role::Provider),
        }
    }

    /// Snapshot of every live binding.
    pub fn bindings(&self) -> Vec<(ConnectionId, Binding)> {
        self.inner
            .lock()
            .by_connection
            .iter()
            .map(|(connection, binding)| (*connection, binding.clone()))
            .collect()
    }
}
