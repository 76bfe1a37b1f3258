//! Flood fill: vector recoloring and raster region fill.
//!
//! The two modes are disjoint and chosen by geometry: a fill landing inside
//! an existing shape's bbox recolors that shape in place (no raster access);
//! anywhere else floods the rendered pixel buffer. The raster fill is
//! iterative (an explicit stack of flat pixel indices plus a visited mask)
//! because a fill region may cover the whole canvas and recursion depth
//! would scale with its area.

#[cfg(test)]
#[path = "fill_test.rs"]
mod fill_test;

use tiny_skia::Pixmap;

use crate::color::Color;
use crate::hit;
use crate::scene::{DrawableObject, ObjectId, Point, Scene};

/// Which mode a fill command resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillOutcome {
    /// A shape was recolored in place; the scene changed, the buffer did not.
    Vector(ObjectId),
    /// The raster buffer was flooded; the scene is unchanged.
    Raster,
}

/// Apply a fill command at a point.
///
/// Picks the first shape (insertion order) whose bbox contains the point;
/// with no shape under the point, floods the surface instead.
pub fn apply(scene: &mut Scene, surface: &mut Pixmap, point: Point, color: Color) -> FillOutcome {
    if let Some(id) = hit::shape_at(scene, point) {
        scene.mutate_by_id(id, |object| {
            if let DrawableObject::Shape(shape) = object {
                shape.color = color;
                shape.filled = true;
            }
        });
        return FillOutcome::Vector(id);
    }

    raster_fill(surface, point, color);
    FillOutcome::Raster
}

/// Flood the buffer with `color` from `point`, 4-directional adjacency.
///
/// The target color is the pixel under the point in a snapshot taken before
/// any write; every connected pixel matching it exactly (all 4 channels) is
/// replaced by the fill color at full opacity. Matches are evaluated against
/// the immutable snapshot only, so pixels rewritten during the pass never
/// influence the region boundary. Points outside the buffer are a no-op.
pub fn raster_fill(surface: &mut Pixmap, point: Point, color: Color) {
    let width = surface.width() as usize;
    let height = surface.height() as usize;
    if point.x < 0.0 || point.y < 0.0 {
        return;
    }
    let seed_x = point.x as usize;
    let seed_y = point.y as usize;
    if seed_x >= width || seed_y >= height {
        return;
    }

    let snapshot = surface.data().to_vec();
    let seed = seed_y * width + seed_x;
    let target = pixel(&snapshot, seed);
    // Premultiplied opaque equals straight RGBA, so the fill bytes can be
    // written directly.
    let fill: [u8; 4] = [color.r, color.g, color.b, 255];

    let mut visited = vec![false; width * height];
    let mut stack = Vec::with_capacity(1024);
    visited[seed] = true;
    stack.push(seed);

    let data = surface.data_mut();
    while let Some(index) = stack.pop() {
        let offset = index * 4;
        data[offset..offset + 4].copy_from_slice(&fill);

        let x = index % width;
        let y = index / width;
        if x > 0 {
            push_if_match(&snapshot, &mut visited, &mut stack, index - 1, target);
        }
        if x + 1 < width {
            push_if_match(&snapshot, &mut visited, &mut stack, index + 1, target);
        }
        if y > 0 {
            push_if_match(&snapshot, &mut visited, &mut stack, index - width, target);
        }
        if y + 1 < height {
            push_if_match(&snapshot, &mut visited, &mut stack, index + width, target);
        }
    }
}

fn push_if_match(
    snapshot: &[u8],
    visited: &mut [bool],
    stack: &mut Vec<usize>,
    index: usize,
    target: [u8; 4],
) {
    if !visited[index] && pixel(snapshot, index) == target {
        visited[index] = true;
        stack.push(index);
    }
}

fn pixel(data: &[u8], index: usize) -> [u8; 4] {
    let offset = index * 4;
    [data[offset], data[offset + 1], data[offset + 2], data[offset + 3]]
}
