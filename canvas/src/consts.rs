//! Shared numeric constants for the canvas crate.

// ── Canvas ──────────────────────────────────────────────────────

/// Default drawing surface width in pixels.
pub const CANVAS_WIDTH: u32 = 1210;

/// Default drawing surface height in pixels.
pub const CANVAS_HEIGHT: u32 = 690;

// ── Math ────────────────────────────────────────────────────────

/// π / 5 (36°) — angular step between consecutive star vertices.
pub const FRAC_PI_5: f64 = std::f64::consts::PI / 5.0;

/// Number of spikes on a star shape.
pub const STAR_SPIKES: usize = 5;

/// Inner-to-outer radius ratio for the 5-point star.
pub const STAR_INNER_RATIO: f64 = 0.5;

// ── Hit-testing ─────────────────────────────────────────────────

/// Chebyshev hit slop in pixels around each stroke point.
pub const STROKE_HIT_SLOP: f64 = 10.0;

// ── Selection chrome ────────────────────────────────────────────

/// Outward inset of the dashed selection outline, per side.
pub const SELECTION_INSET: f64 = 5.0;

/// Dash segment length of the selection outline.
pub const SELECTION_DASH: f64 = 5.0;

/// Stroke width of the selection outline and handle borders.
pub const SELECTION_STROKE_WIDTH: f64 = 2.0;

/// Side length of the square corner handles.
pub const HANDLE_SIZE: f64 = 8.0;

// ── Images ──────────────────────────────────────────────────────

/// Largest fraction of the canvas an added image may cover per axis.
pub const IMAGE_MAX_FRACTION: f64 = 0.8;
