//! Session-scoped replication of drawing commands.
//!
//! A [`SessionClient`] pairs one [`Engine`] with a session id and the
//! outbound half of the session channel. Local mutating commands go through
//! it: the engine is mutated first, then the equivalent [`DrawEvent`] is
//! emitted for the relay to mirror. Inbound events are applied through the
//! same engine entry points, making every replica a state machine over the
//! broadcast command stream.
//!
//! Only the drafting protocol, erase, and fill replicate. Selection, move,
//! resize, delete, and image placement are local-only commands.
//!
//! There is no operation log and no ordering across concurrent senders;
//! convergence relies on the transport preserving per-sender order. An
//! event that cannot be decoded degrades to no visible change.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use wire::{ClientMessage, DrawAction, DrawEvent, Join, ShapeKind, Tool};

use crate::color::Color;
use crate::engine::Engine;
use crate::scene::{DecodeError, ObjectId, Point, Scene};

/// Outbound half of a session channel.
///
/// Implemented for any `FnMut(DrawEvent)`, so a transport can wrap its send
/// call in a closure and tests can collect events into a buffer.
pub trait EventSink {
    fn send(&mut self, event: DrawEvent);
}

impl<F> EventSink for F
where
    F: FnMut(DrawEvent),
{
    fn send(&mut self, event: DrawEvent) {
        self(event);
    }
}

/// One replica's connection to a drawing session.
pub struct SessionClient<S: EventSink> {
    session_id: String,
    engine: Engine,
    sink: S,
}

impl<S: EventSink> SessionClient<S> {
    pub fn new(session_id: impl Into<String>, engine: Engine, sink: S) -> Self {
        Self { session_id: session_id.into(), engine, sink }
    }

    /// The join message a transport sends once on channel open.
    #[must_use]
    pub fn join_message(&self) -> Join {
        Join { session_id: self.session_id.clone() }
    }

    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    #[must_use]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    #[must_use]
    pub fn scene(&self) -> &Scene {
        self.engine.scene()
    }

    // --- Replicated commands: mutate locally, then emit ---

    pub fn start(
        &mut self,
        tool: Tool,
        x: f64,
        y: f64,
        color: Color,
        line_width: f64,
        shape: Option<ShapeKind>,
    ) {
        self.engine.start(tool, Point::new(x, y), color, line_width, shape);
        self.sink.send(DrawEvent::start(self.session_id.as_str(), x, y, tool, color.to_hex(), line_width, shape));
    }

    pub fn continue_draft(&mut self, x: f64, y: f64) {
        self.engine.continue_draft(Point::new(x, y));
        self.sink.send(DrawEvent::continue_at(self.session_id.as_str(), x, y));
    }

    pub fn finish(&mut self) {
        self.engine.finish();
        self.sink.send(DrawEvent::finish(self.session_id.as_str()));
    }

    pub fn erase(&mut self, x: f64, y: f64) {
        self.engine.erase(Point::new(x, y));
        self.sink.send(DrawEvent::erase(self.session_id.as_str(), x, y));
    }

    pub fn fill(&mut self, x: f64, y: f64, color: Color) {
        self.engine.fill(Point::new(x, y), color);
        self.sink.send(DrawEvent::fill(self.session_id.as_str(), x, y, color.to_hex()));
    }

    // --- Local-only commands ---

    pub fn select_at(&mut self, x: f64, y: f64) -> Option<ObjectId> {
        self.engine.select_at(Point::new(x, y))
    }

    pub fn move_selected(&mut self, dx: f64, dy: f64) {
        self.engine.move_selected(dx, dy);
    }

    pub fn resize_selected(&mut self, width: f64, height: f64) {
        self.engine.resize_selected(width, height);
    }

    pub fn delete_selected(&mut self) {
        self.engine.delete_selected();
    }

    /// Decode and place an image. Local-only; never relayed.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when the bytes cannot be decoded.
    pub fn add_image(&mut self, bytes: &[u8]) -> Result<ObjectId, DecodeError> {
        self.engine.add_image(bytes)
    }

    // --- Inbound events ---

    /// Apply one remote event through the engine entry points. Events with
    /// required fields missing are dropped.
    pub fn apply_remote(&mut self, event: &DrawEvent) {
        match event.action {
            DrawAction::Start => {
                let (Some(x), Some(y), Some(tool)) = (event.x, event.y, event.tool) else {
                    return;
                };
                let color = event.color.as_deref().map_or(Color::BLACK, Color::from_hex_or_black);
                let line_width = event.line_width.unwrap_or(1.0);
                self.engine.start(tool, Point::new(x, y), color, line_width, event.shape);
            }
            DrawAction::Continue => {
                let (Some(x), Some(y)) = (event.x, event.y) else {
                    return;
                };
                self.engine.continue_draft(Point::new(x, y));
            }
            DrawAction::Finish => self.engine.finish(),
            DrawAction::Erase => {
                let (Some(x), Some(y)) = (event.x, event.y) else {
                    return;
                };
                self.engine.erase(Point::new(x, y));
            }
            DrawAction::Fill => {
                let (Some(x), Some(y)) = (event.x, event.y) else {
                    return;
                };
                let color = event.color.as_deref().map_or(Color::BLACK, Color::from_hex_or_black);
                self.engine.fill(Point::new(x, y), color);
            }
        }
    }

    /// Apply one raw inbound channel message. Anything that does not decode
    /// to a draw event is ignored.
    pub fn apply_remote_text(&mut self, text: &str) {
        if let Ok(ClientMessage::Draw(event)) = wire::decode(text) {
            self.apply_remote(&event);
        }
    }
}
