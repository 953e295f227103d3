use eframe::egui::ecolor::Hsva;
use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

use crate::events::NodeKind;
use crate::util::stable_pair;

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;
    let mix = |a: u8, b: u8| ((a as f32 * inverse) + (b as f32 * amount)) as u8;

    Color32::from_rgba_unmultiplied(
        mix(base.r(), overlay.r()),
        mix(base.g(), overlay.g()),
        mix(base.b(), overlay.b()),
        mix(base.a(), overlay.a()),
    )
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + (factor * 0.55))) as u8,
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    // Faint spokes every 30 degrees from the layout origin.
    let origin = rect.center() + pan;
    let reach = rect.width().hypot(rect.height()) + pan.length();
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 50));
    for step in 0..12 {
        let angle = step as f32 * std::f32::consts::TAU / 12.0;
        let direction = Vec2::angled(angle);
        painter.line_segment([origin, origin + direction * reach], stroke);
    }

    let marker = (4.0 * zoom.sqrt()).clamp(2.0, 8.0);
    painter.circle_filled(origin, marker, Color32::from_rgba_unmultiplied(90, 100, 112, 140));
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

/// Conservative test: the segment's padded bounding box overlaps the canvas.
pub(super) fn edge_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    Rect::from_two_pos(start, end)
        .expand(padding)
        .intersects(rect)
}

pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.center() + pan + world * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / zoom
}

/// Deterministic hue per category so colours survive reloads.
pub(super) fn category_color(category: &str) -> Color32 {
    let (hue, shade) = stable_pair(category);
    let hue = (hue + 1.0) * 0.5;
    let value = 0.78 + shade * 0.12;
    Hsva::new(hue, 0.55, value, 1.0).into()
}

pub(super) fn ring_fill(category: &str) -> Color32 {
    let base = category_color(category);
    Color32::from_rgba_unmultiplied(base.r(), base.g(), base.b(), 18)
}

/// World-space radius of a node's disc.
pub(super) fn node_radius(kind: NodeKind) -> f32 {
    match kind {
        NodeKind::Circle => 8.0,
        NodeKind::Major => 16.0,
        NodeKind::TimelineTrigger => 11.0,
        NodeKind::CategorySummary => 13.0,
    }
}
