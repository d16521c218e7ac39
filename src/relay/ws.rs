use std::sync::Arc;

use axum::{
    debug_handler,
    extract::{ws::{Message, WebSocket}, State, WebSocketUpgrade},
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use tracing::{debug, warn};

use super::{ConnectionId, InboundEvent, Relay, WsGateway};

#[debug_handler(state = crate::AppState)]
pub async fn relay_ws(
    State(relay): State<Relay>,
    State(gateway): State<Arc<WsGateway>>,

    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(async move |stream| serve_connection(stream, relay, gateway).await)
}

async fn serve_connection(stream: WebSocket, relay: Relay, gateway: Arc<WsGateway>) {
    let (connection, mut outbox) = gateway.open();
    relay.on_established(connection);

    let (mut sender, mut receiver) = stream.split();

    let mut write_task = tokio::spawn(async move {
        while let Some(frame) = outbox.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    loop {
        tokio::select! {
            msg = receiver.next() => {
                let Some(Ok(msg)) = msg else { break };
                match msg {
                    Message::Text(text) => handle_frame(&relay, connection, text.as_str().as_bytes()),
                    Message::Binary(bytes) => handle_frame(&relay, connection, &bytes),
                    Message::Close(_) => break,
                    Message::Ping(_) | Message::Pong(_) => {}
                }
            }
            _ = &mut write_task => break,
        }
    }

    relay.on_closed(connection);
    gateway.close(connection);
    write_task.abort();
}

fn handle_frame(relay: &Relay, connection: ConnectionId, bytes: &[u8]) {
    match InboundEvent::from_slice(bytes) {
        Ok(event) => {
            if let Some(outcome) = relay.dispatch(connection, event) {
                debug!(%connection, ?outcome, "routed");
            }
        }
        Err(err) => warn!(%connection, error = %err.0, "discarding malformed event"),
    }
}
