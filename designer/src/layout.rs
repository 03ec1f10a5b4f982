//! Layout generation: seat placement along lines, grids and tables, row
//! curvature, and row recomputation from seat positions.
//!
//! Every function here is pure with respect to its inputs and works in
//! section-local coordinates. Degenerate inputs (zero-length lines, boxes
//! smaller than one seat pitch, non-positive tolerances) never error: counts
//! clamp to their minimum or the result is empty.

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;

use std::collections::{BTreeMap, HashMap, HashSet};

use uuid::Uuid;

use crate::camera::{Point, Rect};
use crate::consts::{
    DEFAULT_ROW_TOLERANCE, DEFAULT_SEAT_SPACING, GEOMETRY_EPSILON, MAX_ROW_SEATS, MIN_ROUND_TABLE_RADIUS,
    MIN_TABLE_SEATS, RECT_TABLE_HEIGHT, RECT_TABLE_SEAT_PADDING, ROUND_TABLE_RADIUS_PER_SEAT, ROW_ALIGN_PADDING,
    TABLE_SEAT_MARGIN,
};
use crate::doc::{
    normalize_rotation, Layout, Row, RowId, Seat, SeatId, Section, SectionId, Table, seat_display_name, seat_uid,
};
use crate::error::DesignerError;
use crate::labels::{next_free_row_label, Numbering};

/// Horizontal placement used by [`align_rows`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    Left,
    Center,
    Right,
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn floor_count(x: f64) -> usize {
    if x.is_finite() && x > 0.0 { (x + GEOMETRY_EPSILON).floor() as usize } else { 0 }
}

#[allow(clippy::cast_precision_loss)]
fn as_f64(n: usize) -> f64 {
    n as f64
}

// =============================================================
// Generators
// =============================================================

/// Seats evenly placed along the segment `start`→`end`.
///
/// Each seat occupies a cell of `seat_size + seat_spacing`; seats sit at cell
/// centers, so every seat lies within the segment. Returns no seats when the
/// segment is shorter than one cell.
#[must_use]
pub fn generate_linear_row(start: Point, end: Point, seat_size: f64, seat_spacing: f64) -> Vec<Seat> {
    let length = start.distance(end);
    let pitch = seat_size + seat_spacing;
    if pitch <= 0.0 || length + GEOMETRY_EPSILON < pitch {
        return Vec::new();
    }
    let count = floor_count(length / pitch);
    let angle = normalize_rotation((end.y - start.y).atan2(end.x - start.x).to_degrees());
    (0..count)
        .map(|i| {
            let t = (as_f64(i) * pitch + pitch / 2.0) / length;
            let p = start.lerp(end, t);
            let mut seat = Seat::at(p.x, p.y);
            seat.angle = angle;
            seat
        })
        .collect()
}

/// End point of the run `start`→`end`, pulled back so the run spans at most
/// `max_seats` cells of `pitch`.
#[must_use]
pub fn clamp_run(start: Point, end: Point, pitch: f64, max_seats: usize) -> Point {
    let length = start.distance(end);
    let limit = as_f64(max_seats) * pitch;
    if pitch <= 0.0 || length <= limit {
        return end;
    }
    start.lerp(end, limit / length)
}

/// `rect` trimmed from its top-left corner to at most the given number of
/// `(pitch, count)` cells across and down.
#[must_use]
pub fn clamp_block(rect: Rect, columns: (f64, usize), rows: (f64, usize)) -> Rect {
    let cap = |extent: f64, (pitch, count): (f64, usize)| {
        if pitch > 0.0 { extent.min(as_f64(count) * pitch) } else { extent }
    };
    Rect::new(rect.x, rect.y, cap(rect.width, columns), cap(rect.height, rows))
}

/// A block of seats filling `rect`, one inner `Vec` per grid row, top to bottom.
#[must_use]
pub fn generate_grid(rect: Rect, seat_size: f64, seat_spacing: f64, row_spacing: f64) -> Vec<Vec<Seat>> {
    let col_pitch = seat_size + seat_spacing;
    let row_pitch = seat_size + row_spacing;
    if col_pitch <= 0.0 || row_pitch <= 0.0 {
        return Vec::new();
    }
    let columns = floor_count(rect.width / col_pitch);
    let rows = floor_count(rect.height / row_pitch);
    if columns == 0 {
        return Vec::new();
    }
    (0..rows)
        .map(|r| {
            let y = rect.y + as_f64(r) * row_pitch + row_pitch / 2.0;
            (0..columns)
                .map(|c| Seat::at(rect.x + as_f64(c) * col_pitch + col_pitch / 2.0, y))
                .collect()
        })
        .collect()
}

/// Radius of the ring of seats around a round table carrying `seat_count` seats.
#[must_use]
pub fn round_table_ring_radius(seat_count: usize, seat_size: f64) -> f64 {
    let n = seat_count.max(MIN_TABLE_SEATS);
    table_radius(n) + seat_size / 2.0 + TABLE_SEAT_MARGIN
}

fn table_radius(n: usize) -> f64 {
    MIN_ROUND_TABLE_RADIUS.max(ROUND_TABLE_RADIUS_PER_SEAT * as_f64(n))
}

fn rect_table_width(n: usize, seat_size: f64) -> f64 {
    as_f64(n.div_ceil(2)) * (seat_size + RECT_TABLE_SEAT_PADDING)
}

/// A round table with seats on a ring, first seat at the top, clockwise.
#[must_use]
pub fn generate_round_table(center: Point, seat_count: usize, seat_size: f64) -> (Table, Vec<Seat>) {
    let n = seat_count.max(MIN_TABLE_SEATS);
    let table = Table::Round { center, radius: table_radius(n) };
    (table, seats_at(table_seat_points(&table, n, seat_size, None)))
}

/// A rectangular table with seats along its two long sides, top side first.
#[must_use]
pub fn generate_rect_table(center: Point, seat_count: usize, seat_size: f64) -> (Table, Vec<Seat>) {
    let n = seat_count.max(MIN_TABLE_SEATS);
    let table = Table::Rect { center, width: rect_table_width(n, seat_size), height: RECT_TABLE_HEIGHT };
    (table, seats_at(table_seat_points(&table, n, seat_size, None)))
}

fn seats_at(points: Vec<(Point, f64)>) -> Vec<Seat> {
    points
        .into_iter()
        .map(|(p, angle)| {
            let mut seat = Seat::at(p.x, p.y);
            seat.angle = angle;
            seat
        })
        .collect()
}

/// Centers and facing angles of `count` seats around `table`.
///
/// Round tables put the first seat at the top and go clockwise; rect tables
/// fill the top side first. A `spacing` fixes the distance between
/// neighbouring seats, pushing a round ring outwards when needed.
fn table_seat_points(table: &Table, count: usize, seat_size: f64, spacing: Option<f64>) -> Vec<(Point, f64)> {
    if count == 0 {
        return Vec::new();
    }
    match *table {
        Table::Round { center, radius } => {
            let n = as_f64(count);
            let mut ring = radius + seat_size / 2.0 + TABLE_SEAT_MARGIN;
            if let Some(spacing) = spacing {
                ring = ring.max(spacing / (2.0 * (std::f64::consts::PI / n).sin()));
            }
            let step = 360.0 / n;
            (0..count)
                .map(|i| {
                    let degrees = -90.0 + as_f64(i) * step;
                    let (sin, cos) = degrees.to_radians().sin_cos();
                    (Point::new(center.x + ring * cos, center.y + ring * sin), normalize_rotation(degrees + 90.0))
                })
                .collect()
        }
        Table::Rect { center, width, height } => {
            let per_side = count.div_ceil(2);
            let offset = height / 2.0 + seat_size / 2.0 + TABLE_SEAT_MARGIN;
            let xs: Vec<f64> = match spacing {
                Some(pitch) => {
                    let first = center.x - as_f64(per_side - 1) * pitch / 2.0;
                    (0..per_side).map(|i| first + as_f64(i) * pitch).collect()
                }
                None => {
                    let cell = width / as_f64(per_side);
                    let left = center.x - width / 2.0;
                    (0..per_side).map(|i| left + (as_f64(i) + 0.5) * cell).collect()
                }
            };
            [(center.y - offset, 180.0), (center.y + offset, 0.0)]
                .into_iter()
                .flat_map(|(y, angle)| xs.iter().map(move |&x| (Point::new(x, y), angle)))
                .take(count)
                .collect()
        }
    }
}

/// Re-place a table row's seats around its table, keeping ids and order.
pub fn arrange_table(row: &mut Row, seat_size: f64) {
    let Some(table) = row.table else {
        return;
    };
    let points = table_seat_points(&table, row.seats.len(), seat_size, row.table_style.seat_spacing);
    for (seat, (p, angle)) in row.seats.iter_mut().zip(points) {
        seat.x = p.x;
        seat.y = p.y;
        seat.base_y = p.y;
        seat.angle = angle;
    }
}

/// Give a table row `count` seats, clamped to `MIN_TABLE_SEATS..=MAX_ROW_SEATS`.
///
/// Surplus seats are dropped from the end and new ones appended. The table
/// grows to the size a freshly generated table of that count would have,
/// never shrinks, and the seats are re-placed around it.
pub fn resize_table(row: &mut Row, count: usize, seat_size: f64) {
    let n = count.clamp(MIN_TABLE_SEATS, MAX_ROW_SEATS);
    match &mut row.table {
        Some(Table::Round { radius, .. }) => *radius = radius.max(table_radius(n)),
        Some(Table::Rect { width, .. }) => *width = width.max(rect_table_width(n, seat_size)),
        None => return,
    }
    row.seats.truncate(n);
    while row.seats.len() < n {
        row.seats.push(Seat::at(0.0, 0.0));
    }
    arrange_table(row, seat_size);
}

/// Give a straight row `count` seats, clamped to `1..=MAX_ROW_SEATS`.
///
/// The leftmost seats are kept. New seats continue to the right on the last
/// seat's baseline, at the pitch of the last two seats, or at
/// `seat_size + DEFAULT_SEAT_SPACING` when there is no such pitch.
pub fn resize_row(row: &mut Row, count: usize, seat_size: f64) {
    if row.is_table() {
        return;
    }
    let n = count.clamp(1, MAX_ROW_SEATS);
    row.seats.sort_by(|a, b| a.x.total_cmp(&b.x));
    row.seats.truncate(n);
    let pitch = match row.seats.as_slice() {
        [.., a, b] if b.x - a.x > GEOMETRY_EPSILON => b.x - a.x,
        _ => seat_size + DEFAULT_SEAT_SPACING,
    };
    while row.seats.len() < n {
        let seat = match row.seats.last() {
            Some(last) => {
                let mut seat = Seat::at(last.x + pitch, last.base_y);
                seat.shape = last.shape;
                seat.angle = last.angle;
                seat
            }
            None => Seat::at(seat_size / 2.0, row.y),
        };
        row.seats.push(seat);
    }
}

// =============================================================
// Curvature
// =============================================================

/// Vertical displacement at local `x` for a section of `width` curved by `amount`.
///
/// Parabolic: `amount` at the horizontal center, zero at both edges.
#[must_use]
pub fn curve_offset(x: f64, width: f64, amount: f64) -> f64 {
    if width <= 0.0 || amount == 0.0 {
        return 0.0;
    }
    let u = x / width - 0.5;
    amount * (1.0 - 4.0 * u * u)
}

/// Set every seat's y to its baseline plus the section curve at its x and
/// the row's own curve across its seat span.
///
/// Idempotent; with both amounts zero every baseline is restored exactly.
pub fn apply_curve(row: &mut Row, width: f64, amount: f64) {
    let (lo, hi) = row.x_extent().unwrap_or((0.0, 0.0));
    let own = row.curve;
    for seat in &mut row.seats {
        seat.y = seat.base_y + curve_offset(seat.x, width, amount) + curve_offset(seat.x - lo, hi - lo, own);
    }
}

// =============================================================
// Labeling
// =============================================================

/// Number a row's seats per the row's own numbering, else `numbering`.
///
/// Straight rows are numbered by x (right to left when reversed); table rows
/// keep their placement order.
pub fn label_seats(row: &mut Row, numbering: &Numbering) {
    let numbering = &row.numbering.unwrap_or(*numbering);
    if row.table.is_none() {
        row.seats.sort_by(|a, b| a.x.total_cmp(&b.x));
        if numbering.is_reversed() {
            row.seats.reverse();
        }
    }
    for (i, seat) in row.seats.iter_mut().enumerate() {
        seat.label = numbering.label(i);
    }
    if row.table.is_none() && numbering.is_reversed() {
        row.seats.reverse();
    }
}

/// Build a labeled row from freshly generated seats.
///
/// The row takes the first free label in the section's row numbering (tables
/// take the first free `T<n>`). Seat y values are re-derived from the
/// section curve.
#[must_use]
pub fn build_row(section: &Section, seats: Vec<Seat>, table: Option<Table>, taken: &[String]) -> Row {
    let existing = section.rows.iter().map(|r| r.label.as_str()).chain(taken.iter().map(String::as_str));
    let label = if table.is_some() {
        let existing: HashSet<&str> = existing.collect();
        (1..).map(|n| format!("T{n}")).find(|l| !existing.contains(l.as_str())).unwrap_or_default()
    } else {
        next_free_row_label(&section.row_numbering, existing)
    };
    let y = match table {
        Some(t) => t.center().y,
        None => seats.iter().map(|s| s.base_y).fold(f64::INFINITY, f64::min),
    };
    let mut row = Row::new(label, if y.is_finite() { y } else { 0.0 });
    row.table = table;
    row.seats = seats;
    label_seats(&mut row, &section.seat_numbering);
    if row.table.is_none() {
        apply_curve(&mut row, section.pose.width, section.curve_amount);
    }
    name_row(section, &mut row);
    row
}

/// Relabel every row and seat of a section from its numbering schemes.
///
/// Straight rows are numbered top to bottom by baseline; table rows keep
/// their labels.
pub fn relabel_section(section: &mut Section) {
    let mut order: Vec<(usize, f64)> =
        section.rows.iter().enumerate().filter(|(_, r)| !r.is_table()).map(|(i, r)| (i, r.y)).collect();
    order.sort_by(|a, b| a.1.total_cmp(&b.1));
    let count = order.len();
    let rows = section.row_numbering;
    let seats = section.seat_numbering;
    for (rank, (index, _)) in order.into_iter().enumerate() {
        let label_index = if rows.is_reversed() { count - 1 - rank } else { rank };
        if let Some(row) = section.rows.get_mut(index) {
            row.label = rows.label(label_index);
        }
    }
    for row in &mut section.rows {
        label_seats(row, &seats);
    }
    section.refresh_seat_names();
}

fn name_row(section: &Section, row: &mut Row) {
    for seat in &mut row.seats {
        seat.display_name = seat_display_name(&section.name, &row.label, &seat.label);
        seat.uid = seat_uid(&section.code, &row.label, &seat.label);
    }
}

// =============================================================
// Row recomputation
// =============================================================

/// Re-cluster a section's straight-row seats into rows by baseline.
///
/// Seats whose baselines round to the same multiple of `tolerance` share a
/// row. Rows are ordered top to bottom and relabeled per the section's row
/// numbering; seats are relabeled per its seat numbering. A row keeps its
/// rotation, curve and numbering override when its id survives. A bucket reuses
/// the id of the row most of its seats came from, so applying this twice
/// yields identical rows. Table rows are left untouched.
#[allow(clippy::cast_possible_truncation)]
pub fn recalculate_rows(section: &mut Section, tolerance: f64) {
    let tolerance = if tolerance > 0.0 { tolerance } else { DEFAULT_ROW_TOLERANCE };

    let mut tables = Vec::new();
    let mut previous: HashMap<RowId, Row> = HashMap::new();
    let mut buckets: BTreeMap<i64, Vec<(RowId, Seat)>> = BTreeMap::new();
    for mut row in std::mem::take(&mut section.rows) {
        if row.is_table() {
            tables.push(row);
            continue;
        }
        for seat in std::mem::take(&mut row.seats) {
            let key = (seat.base_y / tolerance).round() as i64;
            buckets.entry(key).or_default().push((row.id, seat));
        }
        previous.insert(row.id, row);
    }

    let count = buckets.len();
    let mut used = HashSet::new();
    let mut rows = Vec::with_capacity(count);
    for (index, members) in buckets.into_values().enumerate() {
        let id = pick_row_id(&members, &used);
        used.insert(id);
        let label_index = if section.row_numbering.is_reversed() { count - 1 - index } else { index };
        let y = members.iter().map(|(_, s)| s.base_y).fold(f64::INFINITY, f64::min);
        let mut row = Row::new(section.row_numbering.label(label_index), y);
        row.id = id;
        if let Some(prev) = previous.get(&id) {
            row.rotation = prev.rotation;
            row.curve = prev.curve;
            row.numbering = prev.numbering;
        }
        row.seats = members.into_iter().map(|(_, s)| s).collect();
        row.seats.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.id.cmp(&b.id)));
        label_seats(&mut row, &section.seat_numbering);
        rows.push(row);
    }

    rows.extend(tables);
    section.rows = rows;
    section.reflow_curve();
    section.refresh_seat_names();
}

fn pick_row_id(members: &[(RowId, Seat)], used: &HashSet<RowId>) -> RowId {
    let mut tally: Vec<(RowId, usize)> = Vec::new();
    for (id, _) in members {
        match tally.iter_mut().find(|(t, _)| t == id) {
            Some((_, n)) => *n += 1,
            None => tally.push((*id, 1)),
        }
    }
    let mut best: Option<(RowId, usize)> = None;
    for (id, n) in tally {
        if used.contains(&id) {
            continue;
        }
        if best.is_none_or(|(_, b)| n > b) {
            best = Some((id, n));
        }
    }
    best.map_or_else(Uuid::new_v4, |(id, _)| id)
}

// =============================================================
// Multi-row tools
// =============================================================

/// Shift each listed row horizontally to the section's left edge, center or
/// right edge, keeping a small padding.
pub fn align_rows(section: &mut Section, row_ids: &[RowId], alignment: Alignment) {
    let width = section.pose.width;
    for row in section.rows.iter_mut().filter(|r| row_ids.contains(&r.id)) {
        let Some((min_x, max_x)) = row.x_extent() else {
            continue;
        };
        let dx = match alignment {
            Alignment::Left => ROW_ALIGN_PADDING - min_x,
            Alignment::Center => width / 2.0 - (min_x + max_x) / 2.0,
            Alignment::Right => width - ROW_ALIGN_PADDING - max_x,
        };
        row.translate(dx, 0.0);
    }
    section.reflow_curve();
}

/// Space the listed rows so consecutive baselines are `seat_size + spacing`
/// apart. The topmost listed row stays where it is.
pub fn space_rows(section: &mut Section, row_ids: &[RowId], spacing: f64) {
    let pitch = section.style.seat_size + spacing;
    let mut order: Vec<(RowId, f64)> =
        section.rows.iter().filter(|r| row_ids.contains(&r.id)).map(|r| (r.id, r.y)).collect();
    order.sort_by(|a, b| a.1.total_cmp(&b.1));
    let Some(&(_, top)) = order.first() else {
        return;
    };
    for (i, (id, y)) in order.into_iter().enumerate() {
        let target = top + as_f64(i) * pitch;
        if let Some(row) = section.row_mut(&id) {
            row.translate(0.0, target - y);
        }
    }
    section.reflow_curve();
}

/// Space a straight row's seats `seat_size + spacing` apart, left to right.
/// The leftmost seat stays where it is. Table rows are left untouched.
pub fn respace_seats(row: &mut Row, seat_size: f64, spacing: f64) {
    if row.is_table() {
        return;
    }
    let pitch = seat_size + spacing;
    row.seats.sort_by(|a, b| a.x.total_cmp(&b.x));
    let Some(first) = row.seats.first().map(|s| s.x) else {
        return;
    };
    for (i, seat) in row.seats.iter_mut().enumerate() {
        seat.x = first + as_f64(i) * pitch;
    }
}

// =============================================================
// Seat moves across rows
// =============================================================

/// Remove seats by id and renumber every row that lost one.
///
/// Returns the number of seats removed.
pub fn delete_seats(layout: &mut Layout, seat_ids: &[SeatId]) -> usize {
    let mut removed = 0;
    for section in &mut layout.sections {
        let numbering = section.seat_numbering;
        let mut touched = false;
        for row in &mut section.rows {
            let before = row.seats.len();
            row.seats.retain(|s| !seat_ids.contains(&s.id));
            if row.seats.len() != before {
                removed += before - row.seats.len();
                label_seats(row, &numbering);
                touched = true;
            }
        }
        if touched {
            section.refresh_seat_names();
        }
    }
    removed
}

/// Move seats into the row labeled `row_label` of `target`, creating the row
/// if needed.
///
/// Positions are carried across sections through layout space, so each seat
/// stays where it was drawn. Source rows and the target row are renumbered.
///
/// # Errors
///
/// [`DesignerError::UnknownEntity`] when `target` does not exist,
/// [`DesignerError::StructuralConflict`] when it does not accept seats, and
/// [`DesignerError::MissingSelection`] when `seat_ids` is empty.
pub fn assign_seats(
    layout: &mut Layout,
    seat_ids: &[SeatId],
    target: SectionId,
    row_label: &str,
) -> Result<usize, DesignerError> {
    if seat_ids.is_empty() {
        return Err(DesignerError::MissingSelection("no seats to assign"));
    }
    let kind = layout
        .section(&target)
        .map(|s| s.kind)
        .ok_or(DesignerError::UnknownEntity { kind: "section", id: target })?;
    if !kind.accepts_seats() {
        return Err(DesignerError::StructuralConflict(kind));
    }

    let mut moving = Vec::new();
    for section in &mut layout.sections {
        let numbering = section.seat_numbering;
        let pose = section.pose;
        let mut touched = false;
        for row in &mut section.rows {
            let (take, keep): (Vec<Seat>, Vec<Seat>) =
                std::mem::take(&mut row.seats).into_iter().partition(|s| seat_ids.contains(&s.id));
            row.seats = keep;
            if !take.is_empty() {
                touched = true;
                label_seats(row, &numbering);
                for seat in take {
                    let world = pose.to_world(Point::new(seat.x, seat.base_y));
                    moving.push((seat, world));
                }
            }
        }
        if touched {
            section.refresh_seat_names();
        }
    }

    let count = moving.len();
    let Some(section) = layout.section_mut(&target) else {
        return Err(DesignerError::UnknownEntity { kind: "section", id: target });
    };
    let mut arrived: Vec<Seat> = moving
        .into_iter()
        .map(|(mut seat, world)| {
            let local = section.to_local(world);
            seat.x = local.x;
            seat.base_y = local.y;
            seat.y = local.y;
            seat
        })
        .collect();

    let row_index = if let Some(i) = section.rows.iter().position(|r| r.label == row_label) {
        i
    } else {
        let y = arrived.iter().map(|s| s.base_y).fold(f64::INFINITY, f64::min);
        section.rows.push(Row::new(row_label, if y.is_finite() { y } else { 0.0 }));
        section.rows.len() - 1
    };
    let numbering = section.seat_numbering;
    if let Some(row) = section.rows.get_mut(row_index) {
        row.seats.append(&mut arrived);
        label_seats(row, &numbering);
    }
    section.reflow_curve();
    section.refresh_seat_names();
    Ok(count)
}
