//! Session minting.
//!
//! The endpoint is stateless: it hands out a fresh opaque id and the room
//! itself materializes in the relay when the first client joins. A creation
//! failure is therefore impossible on the server side; clients report their
//! own request failures once and do not retry.

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

use axum::Json;
use tracing::info;
use uuid::Uuid;
use wire::SessionCreated;

/// Mint a new session id for a drawing room.
pub async fn new_session() -> Json<SessionCreated> {
    let session_id = Uuid::new_v4().to_string();
    info!(%session_id, "session minted");
    Json(SessionCreated { session_id })
}
