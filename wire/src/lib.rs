//! Shared message model and JSON codec for the session channel.
//!
//! This crate owns the wire representation used by both `server` and the
//! `canvas` session layer. Every message on a session channel is a flat JSON
//! object: the one message without an `action` field is the join that scopes
//! the connection to a session; everything after it is a [`DrawEvent`], one
//! per discrete pointer sample or command.
//!
//! The codec is deliberately strict: an event whose `action`, `tool`, or
//! `shape` value is not part of the protocol fails to decode, and receivers
//! treat a decode failure as a no-op. The protocol carries no object ids and
//! no sequence numbers; convergence relies on the transport preserving
//! per-sender order.

use serde::{Deserialize, Serialize};

/// Error returned by [`decode`].
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The text could not be parsed as a protocol message.
    #[error("failed to decode message: {0}")]
    Json(#[from] serde_json::Error),
}

/// Which tool produced a draw event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Thin freehand stroke.
    Pencil,
    /// Freehand stroke; identical geometry to pencil on the wire.
    Brush,
    /// Parametric shape drag (see [`ShapeKind`]).
    Shape,
    /// Point erase.
    Eraser,
    /// Vector or raster fill.
    Fill,
}

/// Parametric shape vocabulary for the shape tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Triangle,
    Star,
}

/// Lifecycle position of a draw event within a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawAction {
    /// Begin a draft (stroke or shape).
    Start,
    /// Extend the current draft.
    Continue,
    /// Close the current draft.
    Finish,
    /// Remove every object overlapping a point.
    Erase,
    /// Vector- or raster-fill at a point.
    Fill,
}

/// One replicated drawing command. Optional fields are omitted on the wire
/// when absent; which fields are present depends on the action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawEvent {
    /// The session this event belongs to.
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<Tool>,
    /// Hex color, canonical form `#rrggbb`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<ShapeKind>,
    pub action: DrawAction,
}

impl DrawEvent {
    /// Begin a draft at a point with the full tool context.
    #[must_use]
    pub fn start(
        session_id: impl Into<String>,
        x: f64,
        y: f64,
        tool: Tool,
        color: impl Into<String>,
        line_width: f64,
        shape: Option<ShapeKind>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            x: Some(x),
            y: Some(y),
            tool: Some(tool),
            color: Some(color.into()),
            line_width: Some(line_width),
            shape,
            action: DrawAction::Start,
        }
    }

    /// Extend the current draft to a point.
    #[must_use]
    pub fn continue_at(session_id: impl Into<String>, x: f64, y: f64) -> Self {
        Self::point(session_id, x, y, DrawAction::Continue)
    }

    /// Close the current draft. Carries no coordinates.
    #[must_use]
    pub fn finish(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            x: None,
            y: None,
            tool: None,
            color: None,
            line_width: None,
            shape: None,
            action: DrawAction::Finish,
        }
    }

    /// Erase at a point.
    #[must_use]
    pub fn erase(session_id: impl Into<String>, x: f64, y: f64) -> Self {
        Self::point(session_id, x, y, DrawAction::Erase)
    }

    /// Fill at a point with a color.
    #[must_use]
    pub fn fill(session_id: impl Into<String>, x: f64, y: f64, color: impl Into<String>) -> Self {
        Self {
            color: Some(color.into()),
            ..Self::point(session_id, x, y, DrawAction::Fill)
        }
    }

    fn point(session_id: impl Into<String>, x: f64, y: f64, action: DrawAction) -> Self {
        Self {
            session_id: session_id.into(),
            x: Some(x),
            y: Some(y),
            tool: None,
            color: None,
            line_width: None,
            shape: None,
            action,
        }
    }
}

/// Join message, sent once on channel open to scope traffic to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Join {
    pub session_id: String,
}

/// Response body of the session-minting endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCreated {
    pub session_id: String,
}

/// Any message a client sends over the session channel.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    /// First message on a connection: scope to a session.
    Join(Join),
    /// A replicated drawing command.
    Draw(DrawEvent),
}

/// Encode a protocol message as a JSON string.
#[must_use]
pub fn encode<T: Serialize>(message: &T) -> String {
    // Serializing these plain data types cannot fail.
    serde_json::to_string(message).unwrap_or_default()
}

/// Decode one inbound channel message.
///
/// Routing is by the presence of the `action` field: with it the message is
/// a [`DrawEvent`], without it a [`Join`].
///
/// # Errors
///
/// Returns [`CodecError::Json`] for malformed JSON or for values outside the
/// protocol vocabulary (unknown action, tool, or shape).
pub fn decode(text: &str) -> Result<ClientMessage, CodecError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    if value.get("action").is_some() {
        Ok(ClientMessage::Draw(serde_json::from_value(value)?))
    } else {
        Ok(ClientMessage::Join(serde_json::from_value(value)?))
    }
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
