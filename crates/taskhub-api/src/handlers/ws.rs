//! WebSocket upgrade handler and socket pump.
//!
//! The connection is registered unauthenticated; the client must send an
//! `authenticate` event before anything else has an effect. When the
//! engine forcibly terminates a connection (failed authentication), the
//! pump flushes whatever is already queued — the `auth_error` event in
//! particular — and closes the socket.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tracing::{info, warn};

use crate::state::AppState;

/// GET /ws — WebSocket upgrade
pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

/// Pumps an established WebSocket connection.
async fn handle_socket(state: AppState, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let (handle, mut outbound_rx) = state.engine.connections.connect();
    let conn_id = handle.id;
    let shutdown = handle.shutdown_token();

    info!(conn_id = %conn_id, "WebSocket connection established");

    // Outbound pump: engine → socket.
    let outbound_shutdown = shutdown.clone();
    let outbound_task = tokio::spawn(async move {
        loop {
            tokio::select! {
                maybe = outbound_rx.recv() => {
                    match maybe {
                        Some(msg) => {
                            if ws_tx.send(Message::Text(msg.into())).await.is_err() {
                                break;
                            }
                        }
                        None => break,
                    }
                }
                _ = outbound_shutdown.cancelled() => {
                    // Flush queued messages, then close the socket.
                    while let Ok(msg) = outbound_rx.try_recv() {
                        if ws_tx.send(Message::Text(msg.into())).await.is_err() {
                            break;
                        }
                    }
                    let _ = ws_tx.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    });

    // Inbound pump: socket → engine, in arrival order.
    loop {
        tokio::select! {
            maybe = ws_rx.next() => {
                match maybe {
                    Some(Ok(Message::Text(text))) => {
                        state
                            .engine
                            .connections
                            .handle_inbound(&conn_id, text.as_str())
                            .await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                        break;
                    }
                }
            }
            _ = shutdown.cancelled() => break,
        }
    }

    // Unconditional teardown; safe to repeat.
    state.engine.connections.disconnect(&conn_id);
    let _ = outbound_task.await;

    info!(conn_id = %conn_id, "WebSocket connection closed");
}
