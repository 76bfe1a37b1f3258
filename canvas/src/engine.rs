//! Drawing command interpreter.
//!
//! `Engine` is the replicated state machine at the heart of a replica: local
//! pointer input and inbound session events both drive the same entry
//! points, so a scene is fully determined by the ordered command stream it
//! has applied. Drafting (`start`/`continue_draft`/`finish`) is the only
//! sequential protocol; every other command is a point query that neither
//! reads nor disturbs the drafting state.
//!
//! The engine holds the draft as an explicit id (plus the drag anchor for
//! shapes) rather than "last object in the scene", so remote commands that
//! append or remove objects can never corrupt an unrelated local draft.
//!
//! Each mutating command re-renders the owned surface before returning;
//! raster fills are the one exception, writing into the surface directly.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use tiny_skia::Pixmap;
use wire::{ShapeKind, Tool};

use crate::color::Color;
use crate::consts::IMAGE_MAX_FRACTION;
use crate::fill::{self, FillOutcome};
use crate::hit;
use crate::render;
use crate::scene::{
    DecodeError, DrawableObject, Image, ObjectId, PixelSource, Point, Scene, Shape, Stroke,
};

/// Error constructing an [`Engine`].
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Both canvas dimensions must be non-zero.
    #[error("invalid canvas size {width}x{height}")]
    InvalidCanvasSize { width: u32, height: u32 },
}

/// Drafting state. At most one object is drafted at a time; the shape
/// variant keeps the world-space anchor where the drag began so the bbox
/// can be renormalized on every sample without losing the gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Draft {
    Idle,
    Stroke { id: ObjectId },
    Shape { id: ObjectId, anchor: Point },
}

/// One replica's interpreter: scene, selection, draft, and live surface.
pub struct Engine {
    scene: Scene,
    draft: Draft,
    selected: Option<ObjectId>,
    surface: Pixmap,
    width: u32,
    height: u32,
}

impl Engine {
    /// Create an engine with a blank surface of the given pixel size.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidCanvasSize`] when either dimension is
    /// zero.
    pub fn new(width: u32, height: u32) -> Result<Self, EngineError> {
        let surface =
            Pixmap::new(width, height).ok_or(EngineError::InvalidCanvasSize { width, height })?;
        Ok(Self { scene: Scene::new(), draft: Draft::Idle, selected: None, surface, width, height })
    }

    // --- Drafting protocol ---

    /// Begin a draft. Valid only while idle; pencil and brush start a
    /// stroke, the shape tool starts a shape. Anything else is a no-op:
    /// a second `start` mid-draft, a shape start without a shape kind, or
    /// a non-drawing tool.
    pub fn start(
        &mut self,
        tool: Tool,
        pos: Point,
        color: Color,
        stroke_width: f64,
        shape: Option<ShapeKind>,
    ) {
        if self.draft != Draft::Idle {
            return;
        }
        match tool {
            Tool::Pencil | Tool::Brush => {
                let stroke = Stroke::new(color, stroke_width, pos);
                self.draft = Draft::Stroke { id: stroke.id };
                self.scene.append(DrawableObject::Stroke(stroke));
            }
            Tool::Shape => {
                let Some(kind) = shape else {
                    return;
                };
                let shape = Shape::new(kind, color, stroke_width, pos);
                self.draft = Draft::Shape { id: shape.id, anchor: pos };
                self.scene.append(DrawableObject::Shape(shape));
            }
            Tool::Eraser | Tool::Fill => return,
        }
        self.redraw();
    }

    /// Extend the draft to a point. Strokes grow by one sample; shapes
    /// renormalize their bbox against the drag anchor, which keeps width
    /// and height non-negative on every sample. No-op while idle.
    pub fn continue_draft(&mut self, pos: Point) {
        match self.draft {
            Draft::Idle => return,
            Draft::Stroke { id } => {
                self.scene.mutate_by_id(id, |object| {
                    if let DrawableObject::Stroke(stroke) = object {
                        stroke.points.push(pos);
                    }
                });
            }
            Draft::Shape { id, anchor } => {
                self.scene.mutate_by_id(id, |object| {
                    if let DrawableObject::Shape(shape) = object {
                        shape.width = (pos.x - anchor.x).abs();
                        shape.height = (pos.y - anchor.y).abs();
                        shape.x = pos.x.min(anchor.x);
                        shape.y = pos.y.min(anchor.y);
                    }
                });
            }
        }
        self.redraw();
    }

    /// Close the draft. The object's geometry is immutable afterwards; only
    /// whole-object move and delete apply. No-op while idle.
    pub fn finish(&mut self) {
        self.draft = Draft::Idle;
    }

    // --- Point commands ---

    /// Remove every object overlapping the point. Clears the draft or the
    /// selection if the erased objects include them.
    pub fn erase(&mut self, pos: Point) {
        let removed = hit::all_hits(&self.scene, pos);
        if removed.is_empty() {
            return;
        }
        for id in &removed {
            self.scene.remove_by_id(*id);
        }
        if let Draft::Stroke { id } | Draft::Shape { id, .. } = self.draft {
            if removed.contains(&id) {
                self.draft = Draft::Idle;
            }
        }
        if self.selected.is_some_and(|id| removed.contains(&id)) {
            self.selected = None;
        }
        self.redraw();
    }

    /// Fill at a point: recolor the shape under it, or flood the surface.
    /// A raster fill is not followed by a redraw, since re-rendering the
    /// scene would overwrite the flooded pixels.
    pub fn fill(&mut self, pos: Point, color: Color) {
        match fill::apply(&mut self.scene, &mut self.surface, pos, color) {
            FillOutcome::Vector(_) => self.redraw(),
            FillOutcome::Raster => {}
        }
    }

    // --- Selection commands ---

    /// Select the first object (insertion order) under the point, or clear
    /// the selection when nothing is hit.
    pub fn select_at(&mut self, pos: Point) -> Option<ObjectId> {
        self.selected = hit::first_hit(&self.scene, pos);
        self.redraw();
        self.selected
    }

    /// Move the selected object by a delta.
    pub fn move_selected(&mut self, dx: f64, dy: f64) {
        let Some(id) = self.selected else {
            return;
        };
        self.scene.mutate_by_id(id, |object| object.translate(dx, dy));
        self.redraw();
    }

    /// Resize the selected shape or image to a target size. Negative values
    /// flip the origin on that axis so the stored bbox stays canonical.
    /// Strokes do not resize.
    pub fn resize_selected(&mut self, width: f64, height: f64) {
        let Some(id) = self.selected else {
            return;
        };
        self.scene.mutate_by_id(id, |object| match object {
            DrawableObject::Shape(shape) => {
                shape.width = normalize_axis(&mut shape.x, width);
                shape.height = normalize_axis(&mut shape.y, height);
            }
            DrawableObject::Image(image) => {
                image.width = normalize_axis(&mut image.x, width);
                image.height = normalize_axis(&mut image.y, height);
            }
            DrawableObject::Stroke(_) => {}
        });
        self.redraw();
    }

    /// Delete the selected object and clear the selection.
    pub fn delete_selected(&mut self) {
        let Some(id) = self.selected.take() else {
            return;
        };
        self.scene.remove_by_id(id);
        if let Draft::Stroke { id: draft_id } | Draft::Shape { id: draft_id, .. } = self.draft {
            if draft_id == id {
                self.draft = Draft::Idle;
            }
        }
        self.redraw();
    }

    // --- Images ---

    /// Decode an encoded image and place it on the canvas.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when the bytes cannot be decoded; the scene
    /// is unchanged in that case.
    pub fn add_image(&mut self, bytes: &[u8]) -> Result<ObjectId, DecodeError> {
        let source = PixelSource::decode(bytes)?;
        Ok(self.place_image(source))
    }

    /// Place decoded pixels on the canvas, scaled to fit within 80% of the
    /// surface per axis (aspect preserved) and centered.
    pub fn place_image(&mut self, source: PixelSource) -> ObjectId {
        let source_w = f64::from(source.width());
        let source_h = f64::from(source.height());
        let aspect = if source_h > 0.0 { source_w / source_h } else { 1.0 };
        let max_w = f64::from(self.width) * IMAGE_MAX_FRACTION;
        let max_h = f64::from(self.height) * IMAGE_MAX_FRACTION;

        let mut width = source_w;
        let mut height = source_h;
        if width > max_w {
            width = max_w;
            height = width / aspect;
        }
        if height > max_h {
            height = max_h;
            width = height * aspect;
        }

        let x = (f64::from(self.width) - width) / 2.0;
        let y = (f64::from(self.height) - height) / 2.0;
        let image = Image::new(source, x, y, width, height);
        let id = image.id;
        self.scene.append(DrawableObject::Image(image));
        self.redraw();
        id
    }

    // --- Queries ---

    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[must_use]
    pub fn selection(&self) -> Option<ObjectId> {
        self.selected
    }

    /// Whether a draft is currently open.
    #[must_use]
    pub fn is_drafting(&self) -> bool {
        self.draft != Draft::Idle
    }

    /// The live surface: the last render plus any raster fills since.
    #[must_use]
    pub fn surface(&self) -> &Pixmap {
        &self.surface
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    fn redraw(&mut self) {
        // Dimensions are validated at construction, so draw cannot fail.
        if let Some(pixmap) = render::draw(&self.scene, self.selected, self.width, self.height) {
            self.surface = pixmap;
        }
    }
}

/// Shift the origin when the target size is negative and return the
/// canonical (absolute) size.
fn normalize_axis(origin: &mut f64, value: f64) -> f64 {
    if value < 0.0 {
        *origin += value;
    }
    value.abs()
}
