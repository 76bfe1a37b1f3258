//! Room service — session membership and event fan-out.
//!
//! DESIGN
//! ======
//! A room is keyed by the opaque session id minted by `/new-session`; the
//! relay never validates ids, so a room simply materializes when the first
//! client joins it. Broadcast forwards one sender's events to every other
//! member in arrival order. Sends are best-effort: a client whose channel
//! is full loses the event (the protocol offers no delivery guarantee), but
//! a slow client can never stall or reorder the others.

#[cfg(test)]
#[path = "room_test.rs"]
mod tests;

use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;
use wire::DrawEvent;

use crate::state::AppState;

/// Add a client to a session room, creating the room if needed.
pub async fn join_session(
    state: &AppState,
    session_id: &str,
    client_id: Uuid,
    tx: mpsc::Sender<DrawEvent>,
) {
    let mut sessions = state.sessions.write().await;
    let room = sessions.entry(session_id.to_owned()).or_default();
    room.clients.insert(client_id, tx);
    info!(%session_id, %client_id, members = room.clients.len(), "client joined session");
}

/// Remove a client from a session room. The room is evicted when its last
/// member leaves; leaving an unknown room is a no-op.
pub async fn part_session(state: &AppState, session_id: &str, client_id: Uuid) {
    let mut sessions = state.sessions.write().await;
    let Some(room) = sessions.get_mut(session_id) else {
        return;
    };
    room.clients.remove(&client_id);
    info!(%session_id, %client_id, remaining = room.clients.len(), "client left session");

    if room.clients.is_empty() {
        sessions.remove(session_id);
        info!(%session_id, "evicted empty session");
    }
}

/// Forward an event to all clients in a session, optionally excluding one
/// (the sender, which already applied the command locally).
pub async fn broadcast(state: &AppState, session_id: &str, event: &DrawEvent, exclude: Option<Uuid>) {
    let sessions = state.sessions.read().await;
    let Some(room) = sessions.get(session_id) else {
        return;
    };

    for (client_id, tx) in &room.clients {
        if exclude == Some(*client_id) {
            continue;
        }
        if tx.try_send(event.clone()).is_err() {
            warn!(%session_id, %client_id, "dropping event for slow client");
        }
    }
}
