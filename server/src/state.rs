//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the live session rooms: each room is the set of connected clients
//! with their outbound event channels. Rooms materialize when the first
//! client joins and are evicted when the last one leaves; the relay keeps
//! no state for idle sessions and nothing survives a restart.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;
use wire::DrawEvent;

// =============================================================================
// SESSION ROOM
// =============================================================================

/// Per-session live state: connected clients keyed by connection id, each
/// with a sender for events to be forwarded to it.
#[derive(Default)]
pub struct SessionRoom {
    pub clients: HashMap<Uuid, mpsc::Sender<DrawEvent>>,
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state. Clone is required by Axum; the room map is
/// Arc-wrapped.
#[derive(Clone, Default)]
pub struct AppState {
    pub sessions: Arc<RwLock<HashMap<String, SessionRoom>>>,
}

impl AppState {
    #[must_use]
    pub fn new() -> Self {
        Self { sessions: Arc::new(RwLock::new(HashMap::new())) }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
