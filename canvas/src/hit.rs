//! Hit-testing against scene objects.
//!
//! Erase, select, and vector fill all share these predicates. Queries walk
//! the scene in insertion order and return the first (lowest z-order) match;
//! that first-match policy is part of the observable behavior and must not
//! be changed to topmost.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::consts::STROKE_HIT_SLOP;
use crate::scene::{DrawableObject, ObjectId, Point, Scene};

/// Whether a point hits an object.
///
/// Strokes hit when any of their points is within the Chebyshev slop on both
/// axes (strictly less than [`STROKE_HIT_SLOP`]); shapes and images hit
/// anywhere inside their bbox, edges inclusive.
#[must_use]
pub fn hits(object: &DrawableObject, point: Point) -> bool {
    match object {
        DrawableObject::Stroke(stroke) => stroke.points.iter().any(|p| {
            (p.x - point.x).abs() < STROKE_HIT_SLOP && (p.y - point.y).abs() < STROKE_HIT_SLOP
        }),
        DrawableObject::Shape(_) | DrawableObject::Image(_) => object.bbox().contains(point),
    }
}

/// First object in insertion order hit by the point.
#[must_use]
pub fn first_hit(scene: &Scene, point: Point) -> Option<ObjectId> {
    scene.find(|object| hits(object, point)).map(DrawableObject::id)
}

/// Every object hit by the point, in insertion order.
#[must_use]
pub fn all_hits(scene: &Scene, point: Point) -> Vec<ObjectId> {
    scene
        .iter()
        .filter(|object| hits(object, point))
        .map(DrawableObject::id)
        .collect()
}

/// First shape (shapes only, never strokes or images) whose bbox contains
/// the point. This is the vector-fill target query.
#[must_use]
pub fn shape_at(scene: &Scene, point: Point) -> Option<ObjectId> {
    scene
        .find(|object| matches!(object, DrawableObject::Shape(_)) && object.bbox().contains(point))
        .map(DrawableObject::id)
}
