//! Rendering: rasterizes the scene into an RGBA pixel buffer.
//!
//! This module is the only place that touches the 2-D rasterizer. [`draw`]
//! is a pure function of (scene, selection, canvas size): it never mutates
//! application state and repeated calls with unchanged inputs produce
//! byte-identical buffers. The engine owns the live surface and calls
//! [`draw`] after each mutating command; raster flood fill then writes into
//! that surface directly.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use tiny_skia::{
    FillRule, FilterQuality, Paint, PathBuilder, Pixmap, PixmapPaint, Rect, StrokeDash, Transform,
};
use wire::ShapeKind;

use crate::color::Color;
use crate::consts::{
    FRAC_PI_5, HANDLE_SIZE, SELECTION_DASH, SELECTION_INSET, SELECTION_STROKE_WIDTH,
    STAR_INNER_RATIO, STAR_SPIKES,
};
use crate::scene::{DrawableObject, Image, ObjectId, Point, Scene, Shape, Stroke};

/// Color of the selection outline and handle borders.
const SELECTION_COLOR: Color = Color { r: 0, g: 0, b: 255 };

/// Draw the full scene: objects in insertion (z) order, then selection UI.
///
/// The buffer starts fully transparent. Returns `None` when either canvas
/// dimension is zero.
#[must_use]
pub fn draw(scene: &Scene, selection: Option<ObjectId>, width: u32, height: u32) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(width, height)?;

    for object in scene.iter() {
        draw_object(&mut pixmap, object);
    }

    if let Some(selected) = selection.and_then(|id| scene.get(id)) {
        draw_selection(&mut pixmap, selected);
    }

    Some(pixmap)
}

fn draw_object(pixmap: &mut Pixmap, object: &DrawableObject) {
    match object {
        DrawableObject::Stroke(stroke) => draw_stroke(pixmap, stroke),
        DrawableObject::Shape(shape) => draw_shape(pixmap, shape),
        DrawableObject::Image(image) => draw_image(pixmap, image),
    }
}

// =============================================================
// Strokes
// =============================================================

fn draw_stroke(pixmap: &mut Pixmap, stroke: &Stroke) {
    // A single sample has no extent yet; it becomes visible on the first
    // continue.
    if stroke.points.len() < 2 {
        return;
    }

    let mut pb = PathBuilder::new();
    let first = stroke.points[0];
    pb.move_to(first.x as f32, first.y as f32);
    for point in &stroke.points[1..] {
        pb.line_to(point.x as f32, point.y as f32);
    }
    let Some(path) = pb.finish() else {
        return;
    };

    let paint = solid_paint(stroke.color);
    let style = tiny_skia::Stroke {
        width: stroke.stroke_width as f32,
        line_cap: tiny_skia::LineCap::Round,
        line_join: tiny_skia::LineJoin::Round,
        ..tiny_skia::Stroke::default()
    };
    pixmap.stroke_path(&path, &paint, &style, Transform::identity(), None);
}

// =============================================================
// Shapes
// =============================================================

fn draw_shape(pixmap: &mut Pixmap, shape: &Shape) {
    let Some(path) = shape_path(shape) else {
        return;
    };

    let paint = solid_paint(shape.color);
    if shape.filled {
        pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }

    let style = tiny_skia::Stroke { width: shape.stroke_width as f32, ..tiny_skia::Stroke::default() };
    pixmap.stroke_path(&path, &paint, &style, Transform::identity(), None);
}

fn shape_path(shape: &Shape) -> Option<tiny_skia::Path> {
    match shape.kind {
        ShapeKind::Rectangle => {
            let rect =
                Rect::from_xywh(shape.x as f32, shape.y as f32, shape.width as f32, shape.height as f32)?;
            Some(PathBuilder::from_rect(rect))
        }
        ShapeKind::Circle => {
            let radius = shape.width / 2.0;
            if radius <= 0.0 {
                return None;
            }
            let cx = shape.x + shape.width / 2.0;
            let cy = shape.y + shape.height / 2.0;
            let mut pb = PathBuilder::new();
            pb.push_circle(cx as f32, cy as f32, radius as f32);
            pb.finish()
        }
        ShapeKind::Triangle => {
            let mut pb = PathBuilder::new();
            pb.move_to(shape.x as f32, (shape.y + shape.height) as f32);
            pb.line_to((shape.x + shape.width / 2.0) as f32, shape.y as f32);
            pb.line_to((shape.x + shape.width) as f32, (shape.y + shape.height) as f32);
            pb.close();
            pb.finish()
        }
        ShapeKind::Star => {
            let outer = shape.width / 2.0;
            if outer <= 0.0 {
                return None;
            }
            let cx = shape.x + shape.width / 2.0;
            let cy = shape.y + shape.height / 2.0;
            let vertices = star_vertices(cx, cy, outer);
            let mut pb = PathBuilder::new();
            pb.move_to(vertices[0].x as f32, vertices[0].y as f32);
            for vertex in &vertices[1..] {
                pb.line_to(vertex.x as f32, vertex.y as f32);
            }
            pb.close();
            pb.finish()
        }
    }
}

/// The 11 path vertices of a 5-point star outline, before closing: the
/// top-center start point, then outer and inner vertices alternating at
/// angular steps of π/5 from angle 3π/2.
#[must_use]
pub fn star_vertices(cx: f64, cy: f64, outer_radius: f64) -> Vec<Point> {
    let inner_radius = outer_radius * STAR_INNER_RATIO;
    let mut vertices = Vec::with_capacity(1 + STAR_SPIKES * 2);
    vertices.push(Point::new(cx, cy - outer_radius));

    let mut angle = std::f64::consts::FRAC_PI_2 * 3.0;
    for _ in 0..STAR_SPIKES {
        vertices.push(Point::new(cx + angle.cos() * outer_radius, cy + angle.sin() * outer_radius));
        angle += FRAC_PI_5;
        vertices.push(Point::new(cx + angle.cos() * inner_radius, cy + angle.sin() * inner_radius));
        angle += FRAC_PI_5;
    }
    vertices
}

// =============================================================
// Images
// =============================================================

fn draw_image(pixmap: &mut Pixmap, image: &Image) {
    if image.width <= 0.0 || image.height <= 0.0 {
        return;
    }
    let source = image.source.pixmap();
    if source.width() == 0 || source.height() == 0 {
        return;
    }

    let sx = image.width / f64::from(source.width());
    let sy = image.height / f64::from(source.height());
    let transform = Transform::from_row(sx as f32, 0.0, 0.0, sy as f32, image.x as f32, image.y as f32);
    let paint = PixmapPaint { quality: FilterQuality::Bilinear, ..PixmapPaint::default() };
    pixmap.draw_pixmap(0, 0, source.as_ref(), &paint, transform, None);
}

// =============================================================
// Selection UI
// =============================================================

fn draw_selection(pixmap: &mut Pixmap, object: &DrawableObject) {
    let bbox = object.bbox();

    // Dashed outline inset outward from the bbox on all sides.
    let Some(outline) = Rect::from_xywh(
        (bbox.x - SELECTION_INSET) as f32,
        (bbox.y - SELECTION_INSET) as f32,
        (bbox.width + SELECTION_INSET * 2.0) as f32,
        (bbox.height + SELECTION_INSET * 2.0) as f32,
    ) else {
        return;
    };

    let paint = solid_paint(SELECTION_COLOR);
    let dashed = tiny_skia::Stroke {
        width: SELECTION_STROKE_WIDTH as f32,
        dash: StrokeDash::new(vec![SELECTION_DASH as f32, SELECTION_DASH as f32], 0.0),
        ..tiny_skia::Stroke::default()
    };
    let path = PathBuilder::from_rect(outline);
    pixmap.stroke_path(&path, &paint, &dashed, Transform::identity(), None);

    // Square handles centered on each bbox corner.
    let white = solid_paint(Color::WHITE);
    let border = tiny_skia::Stroke {
        width: SELECTION_STROKE_WIDTH as f32,
        ..tiny_skia::Stroke::default()
    };
    let corners = [
        (bbox.x, bbox.y),
        (bbox.x + bbox.width, bbox.y),
        (bbox.x, bbox.y + bbox.height),
        (bbox.x + bbox.width, bbox.y + bbox.height),
    ];
    for (cx, cy) in corners {
        let Some(handle) = Rect::from_xywh(
            (cx - HANDLE_SIZE / 2.0) as f32,
            (cy - HANDLE_SIZE / 2.0) as f32,
            HANDLE_SIZE as f32,
            HANDLE_SIZE as f32,
        ) else {
            continue;
        };
        let handle_path = PathBuilder::from_rect(handle);
        pixmap.fill_path(&handle_path, &white, FillRule::Winding, Transform::identity(), None);
        pixmap.stroke_path(&handle_path, &paint, &border, Transform::identity(), None);
    }
}

// =============================================================
// Helpers
// =============================================================

fn solid_paint<'a>(color: Color) -> Paint<'a> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, 255);
    paint.anti_alias = true;
    paint
}
