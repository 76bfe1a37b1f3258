//! Scene model: drawable objects and the in-memory store.
//!
//! This module defines the core data types that describe what is on the
//! canvas (`DrawableObject` and its Stroke/Shape/Image variants) and the
//! insertion-ordered store that owns all live objects (`Scene`). Insertion
//! order is the z-order (later objects draw on top) and the traversal order
//! for hit-testing.
//!
//! Data flows into this layer from the session channel (remote commands) and
//! from the engine (local commands). The renderer reads the scene in
//! insertion order.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use std::sync::Arc;

use tiny_skia::{IntSize, Pixmap};
use uuid::Uuid;
use wire::ShapeKind;

use crate::color::Color;

/// Unique identifier for a scene object.
///
/// Ids are generated per replica and never cross the wire; replicated
/// commands address objects by geometry (point queries), not by id.
pub type ObjectId = Uuid;

/// A point on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounding box with canonical non-negative size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BBox {
    /// Whether a point lies inside the box, edges inclusive.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

/// A freehand polyline.
///
/// The point sequence is append-only while the stroke is being drafted;
/// after that only whole-object move and delete apply.
#[derive(Debug, Clone)]
pub struct Stroke {
    pub id: ObjectId,
    pub color: Color,
    pub stroke_width: f64,
    /// At least one point, in draw order.
    pub points: Vec<Point>,
}

impl Stroke {
    #[must_use]
    pub fn new(color: Color, stroke_width: f64, start: Point) -> Self {
        Self { id: Uuid::new_v4(), color, stroke_width, points: vec![start] }
    }
}

/// A parametric shape dragged out from an anchor corner.
#[derive(Debug, Clone)]
pub struct Shape {
    pub id: ObjectId,
    pub color: Color,
    pub stroke_width: f64,
    pub kind: ShapeKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub filled: bool,
}

impl Shape {
    /// New zero-size shape anchored at a point.
    #[must_use]
    pub fn new(kind: ShapeKind, color: Color, stroke_width: f64, anchor: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            color,
            stroke_width,
            kind,
            x: anchor.x,
            y: anchor.y,
            width: 0.0,
            height: 0.0,
            filled: false,
        }
    }
}

/// A placed raster image, blitted scaled to its bbox.
#[derive(Debug, Clone)]
pub struct Image {
    pub id: ObjectId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub source: PixelSource,
}

impl Image {
    #[must_use]
    pub fn new(source: PixelSource, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { id: Uuid::new_v4(), x, y, width, height, source }
    }
}

/// Error returned by [`PixelSource::decode`].
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The bytes are not a decodable PNG or JPEG image.
    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),
    /// The image decoded to zero pixels.
    #[error("image has no pixels")]
    Empty,
}

/// Decoded image pixels, owned by the renderer side of the model.
///
/// The handle is opaque to scene logic: commands only ever move or resize
/// the bbox it is blitted into. Cloning shares the decoded pixels.
#[derive(Clone)]
pub struct PixelSource {
    pixels: Arc<Pixmap>,
}

impl PixelSource {
    /// Decode PNG or JPEG bytes into render-ready (premultiplied) pixels.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when the bytes cannot be decoded or decode to
    /// an empty image.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let rgba = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = rgba.dimensions();
        let mut data = rgba.into_raw();
        premultiply_rgba(&mut data);
        let size = IntSize::from_wh(width, height).ok_or(DecodeError::Empty)?;
        let pixmap = Pixmap::from_vec(data, size).ok_or(DecodeError::Empty)?;
        Ok(Self { pixels: Arc::new(pixmap) })
    }

    /// Wrap an already-premultiplied pixmap. Test-friendly constructor.
    #[must_use]
    pub fn from_pixmap(pixmap: Pixmap) -> Self {
        Self { pixels: Arc::new(pixmap) }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub(crate) fn pixmap(&self) -> &Pixmap {
        &self.pixels
    }
}

impl std::fmt::Debug for PixelSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelSource")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

fn premultiply_rgba(data: &mut [u8]) {
    for px in data.chunks_exact_mut(4) {
        let alpha = u16::from(px[3]);
        if alpha == 255 {
            continue;
        }
        px[0] = ((u16::from(px[0]) * alpha) / 255) as u8;
        px[1] = ((u16::from(px[1]) * alpha) / 255) as u8;
        px[2] = ((u16::from(px[2]) * alpha) / 255) as u8;
    }
}

/// The unit of drawing, selection, and replication.
#[derive(Debug, Clone)]
pub enum DrawableObject {
    Stroke(Stroke),
    Shape(Shape),
    Image(Image),
}

impl DrawableObject {
    #[must_use]
    pub fn id(&self) -> ObjectId {
        match self {
            Self::Stroke(stroke) => stroke.id,
            Self::Shape(shape) => shape.id,
            Self::Image(image) => image.id,
        }
    }

    /// Canonical bounding box. A stroke's bbox collapses to its first point;
    /// strokes are addressed through their point sequence, not their bbox.
    #[must_use]
    pub fn bbox(&self) -> BBox {
        match self {
            Self::Stroke(stroke) => {
                let origin = stroke.points.first().copied().unwrap_or(Point::new(0.0, 0.0));
                BBox { x: origin.x, y: origin.y, width: 0.0, height: 0.0 }
            }
            Self::Shape(shape) => {
                BBox { x: shape.x, y: shape.y, width: shape.width, height: shape.height }
            }
            Self::Image(image) => {
                BBox { x: image.x, y: image.y, width: image.width, height: image.height }
            }
        }
    }

    /// Move the whole object by a delta.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        match self {
            Self::Stroke(stroke) => {
                for point in &mut stroke.points {
                    point.x += dx;
                    point.y += dy;
                }
            }
            Self::Shape(shape) => {
                shape.x += dx;
                shape.y += dy;
            }
            Self::Image(image) => {
                image.x += dx;
                image.y += dy;
            }
        }
    }
}

/// Insertion-ordered store of the live objects in one drawing.
///
/// No operation changes an object's id, and ids are unique for the scene's
/// lifetime (random v4). There is no bulk clear.
#[derive(Debug, Default)]
pub struct Scene {
    objects: Vec<DrawableObject>,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self { objects: Vec::new() }
    }

    /// Append an object on top of the z-order.
    pub fn append(&mut self, object: DrawableObject) {
        self.objects.push(object);
    }

    /// Apply a mutation to the object with the given id. Returns false if
    /// the id is not present.
    pub fn mutate_by_id<F>(&mut self, id: ObjectId, mutate: F) -> bool
    where
        F: FnOnce(&mut DrawableObject),
    {
        let Some(object) = self.objects.iter_mut().find(|object| object.id() == id) else {
            return false;
        };
        mutate(object);
        true
    }

    /// Remove an object by id, returning it. Unknown ids are a no-op.
    pub fn remove_by_id(&mut self, id: ObjectId) -> Option<DrawableObject> {
        let index = self.objects.iter().position(|object| object.id() == id)?;
        Some(self.objects.remove(index))
    }

    /// First object in insertion order matching the predicate.
    #[must_use]
    pub fn find<P>(&self, predicate: P) -> Option<&DrawableObject>
    where
        P: FnMut(&&DrawableObject) -> bool,
    {
        self.objects.iter().find(predicate)
    }

    #[must_use]
    pub fn get(&self, id: ObjectId) -> Option<&DrawableObject> {
        self.objects.iter().find(|object| object.id() == id)
    }

    /// Objects in insertion (z) order.
    pub fn iter(&self) -> impl Iterator<Item = &DrawableObject> {
        self.objects.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
