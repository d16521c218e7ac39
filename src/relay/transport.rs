use std::collections::HashMap;

use parking_lot::RwLock;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing::debug;

use super::message::ConnectionId;

/// Outbound half of the real-time connection layer.
///
/// Delivery is fire-and-forget: implementations must not block and report
/// nothing back to the caller.
pub trait Transport: Send + Sync {
    fn deliver(&self, connection: ConnectionId, event: &str, payload: Value);
}

pub type FrameSender = mpsc::UnboundedSender<String>;
pub type FrameReceiver = mpsc::UnboundedReceiver<String>;

/// WebSocket-backed transport: one outbound frame queue per open socket.
#[derive(Default)]
pub struct WsGateway {
    outboxes: RwLock<HashMap<ConnectionId, FrameSender>>,
}

impl WsGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a connection id and the queue its writer task drains.
    pub fn open(&self) -> (ConnectionId, FrameReceiver) {
        let connection = ConnectionId::new();
        let (tx, rx) = mpsc::unbounded_channel();
        self.outboxes.write().insert(connection, tx);
        (connection, rx)
    }

    pub fn close(&self, connection: ConnectionId) {
        self.outboxes.write().remove(&connection);
    }

    pub fn connection_count(&self) -> usize {
        self.outboxes.read().len()
    }
}

fn frame(event: &str, data: Value) -> String {
    json!({ "event": event, "data": data }).to_string()
}

impl Transport for WsGateway {
    fn deliver(&self, connection: ConnectionId, event: &str, payload: Value) {
        let outboxes = self.outboxes.read();
        let Some(tx) = outboxes.get(&connection) else {
            debug!(%connection, event, "delivery to closed connection");
            return;
        };
        if tx.send(frame(event, payload)).is_err() {
            debug!(%connection, event, "writer already gone");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deliver_enqueues_framed_event() {
        let gateway = WsGateway::new();
        let (connection, mut rx) = gateway.open();
        gateway.deliver(connection, "message-received", json!({"text": "hi"}));

        let sent: Value = serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
        assert_eq!(sent, json!({"event": "message-received", "data": {"text": "hi"}}));
    }

    #[test]
    fn deliver_after_close_is_noop() {
        let gateway = WsGateway::new();
        let (connection, mut rx) = gateway.open();
        assert_eq!(gateway.connection_count(), 1);
        gateway.close(connection);
        gateway.deliver(connection, "message-received", json!({}));
        assert_eq!(gateway.connection_count(), 0);
        assert!(rx.try_recv().is_err());
    }
}
