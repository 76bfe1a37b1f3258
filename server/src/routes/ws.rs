//! WebSocket handler — the session relay channel.
//!
//! DESIGN
//! ======
//! On upgrade each connection gets a client id and a bounded channel for
//! events forwarded from session peers, then enters a `select!` loop:
//! - Inbound client messages → decode + dispatch (join or draw)
//! - Events from peers → serialize + send to the client
//!
//! The relay never interprets draw events beyond their session id: it
//! forwards them to the sender's peers in arrival order, preserving
//! per-sender order. There is no acknowledgement and no ordering across
//! concurrent senders; that limitation is part of the protocol contract.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → wait for the join message scoping the connection
//! 2. Draw events → broadcast to the session, excluding the sender
//! 3. Close → leave the session; the last member's exit evicts the room

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;
use wire::{ClientMessage, DrawEvent};

use crate::services;
use crate::state::AppState;

pub async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state))
}

async fn run_ws(mut socket: WebSocket, state: AppState) {
    let client_id = Uuid::new_v4();

    // Per-connection channel for events forwarded from session peers.
    let (client_tx, mut client_rx) = mpsc::channel::<DrawEvent>(256);

    // The session this connection has joined, if any.
    let mut current_session: Option<String> = None;

    info!(%client_id, "ws: client connected");

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(Ok(msg)) = msg else { break };
                match msg {
                    Message::Text(text) => {
                        process_inbound_text(&state, &mut current_session, client_id, &client_tx, &text).await;
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            Some(event) = client_rx.recv() => {
                let json = wire::encode(&event);
                if socket.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
        }
    }

    if let Some(session_id) = current_session {
        services::room::part_session(&state, &session_id, client_id).await;
    }
    info!(%client_id, "ws: client disconnected");
}

/// Decode and apply one inbound text message.
///
/// Separated from the socket loop so dispatch behavior is testable without
/// a live websocket. Undecodable messages, draw events sent before joining,
/// and draw events addressed to a different session are all dropped with a
/// warning; the protocol treats them as no-ops.
async fn process_inbound_text(
    state: &AppState,
    current_session: &mut Option<String>,
    client_id: Uuid,
    client_tx: &mpsc::Sender<DrawEvent>,
    text: &str,
) {
    match wire::decode(text) {
        Ok(ClientMessage::Join(join)) => {
            if let Some(previous) = current_session.take() {
                services::room::part_session(state, &previous, client_id).await;
            }
            services::room::join_session(state, &join.session_id, client_id, client_tx.clone()).await;
            *current_session = Some(join.session_id);
        }
        Ok(ClientMessage::Draw(event)) => {
            let Some(session_id) = current_session.as_deref() else {
                warn!(%client_id, "ws: draw event before join");
                return;
            };
            if event.session_id != session_id {
                warn!(%client_id, event_session = %event.session_id, "ws: draw event for another session");
                return;
            }
            services::room::broadcast(state, session_id, &event, Some(client_id)).await;
        }
        Err(error) => {
            warn!(%client_id, %error, "ws: undecodable message ignored");
        }
    }
}
