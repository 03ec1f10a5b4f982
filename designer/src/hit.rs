#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::{Point, Rect};
use crate::doc::{Layout, Row, RowId, SeatId, Section, SectionId, Shape};

/// A seat under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatHit {
    pub section_id: SectionId,
    pub row_id: RowId,
    pub seat_id: SeatId,
}

/// Nearest seat whose disc (plus `slop`, in layout units) contains `world_pt`.
///
/// Sections later in draw order win over earlier ones.
#[must_use]
pub fn hit_seat(layout: &Layout, world_pt: Point, slop: f64) -> Option<SeatHit> {
    for section in layout.sections.iter().rev() {
        let reach = section.world_seat_size() / 2.0 + slop;
        let mut best: Option<(f64, SeatHit)> = None;
        for row in &section.rows {
            for (seat, at) in row.seat_points() {
                let d = section.to_world(at).distance(world_pt);
                if d <= reach && best.is_none_or(|(b, _)| d < b) {
                    best = Some((d, SeatHit { section_id: section.id, row_id: row.id, seat_id: seat.id }));
                }
            }
        }
        if let Some((_, hit)) = best {
            return Some(hit);
        }
    }
    None
}

/// Top-most section whose outline contains `world_pt`.
#[must_use]
pub fn hit_section(layout: &Layout, world_pt: Point, slop: f64) -> Option<SectionId> {
    layout.sections.iter().rev().find(|s| section_contains(s, world_pt, slop)).map(|s| s.id)
}

/// Top-most section that accepts seats and contains `world_pt`.
#[must_use]
pub fn seat_section_at(layout: &Layout, world_pt: Point) -> Option<SectionId> {
    layout
        .sections
        .iter()
        .rev()
        .find(|s| s.kind.accepts_seats() && section_contains(s, world_pt, 0.0))
        .map(|s| s.id)
}

/// Whether `world_pt` falls inside the section's outline.
///
/// Lines are hit within `slop` of any segment; every other shape is tested
/// in the section's local frame.
#[must_use]
pub fn section_contains(section: &Section, world_pt: Point, slop: f64) -> bool {
    let local = section.to_local(world_pt);
    let scale = if section.pose.scale > 0.0 { section.pose.scale } else { 1.0 };
    let local_slop = slop / scale;
    match &section.shape {
        Shape::Rectangle | Shape::Text { .. } => {
            Rect::new(0.0, 0.0, section.pose.width, section.pose.height).contains(local)
        }
        Shape::Circle { radius } => local.distance(section.local_center()) <= *radius,
        Shape::Polygon { points } => point_in_polygon(local, points),
        Shape::Line { points } => {
            points.windows(2).any(|w| distance_to_segment(local, w[0], w[1]) <= local_slop.max(f64::EPSILON))
        }
    }
}

/// Even-odd rule point-in-polygon test.
#[must_use]
pub fn point_in_polygon(p: Point, vertices: &[Point]) -> bool {
    if vertices.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = vertices.len() - 1;
    for (i, vi) in vertices.iter().enumerate() {
        let vj = vertices[j];
        if (vi.y > p.y) != (vj.y > p.y) && p.x < (vj.x - vi.x) * (p.y - vi.y) / (vj.y - vi.y) + vi.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Shortest distance from `p` to the segment `a`–`b`.
#[must_use]
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + t * dx, a.y + t * dy))
}

/// Layout-space bounding box of a seat.
#[must_use]
pub fn seat_bounds(section: &Section, local: Point) -> Rect {
    Rect::around(section.to_world(local), section.world_seat_size())
}

/// Every seat whose bounding box intersects `rect`.
#[must_use]
pub fn seats_in_rect(layout: &Layout, rect: &Rect) -> Vec<SeatId> {
    let mut out = Vec::new();
    for section in &layout.sections {
        for (seat, at) in section.rows.iter().flat_map(Row::seat_points) {
            if seat_bounds(section, at).intersects(rect) {
                out.push(seat.id);
            }
        }
    }
    out
}

/// Every row with at least one seat whose bounding box intersects `rect`.
#[must_use]
pub fn rows_in_rect(layout: &Layout, rect: &Rect) -> Vec<(SectionId, RowId)> {
    let mut out = Vec::new();
    for section in &layout.sections {
        for row in &section.rows {
            if row.seat_points().any(|(_, at)| seat_bounds(section, at).intersects(rect)) {
                out.push((section.id, row.id));
            }
        }
    }
    out
}
