#![allow(clippy::float_cmp)]

use super::*;
use crate::doc::{Pose, SectionKind, Shape};
use crate::labels::{Direction, LabelMode};

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn section(width: f64, height: f64) -> Section {
    Section::new(
        "Orchestra",
        SectionKind::Standard,
        Pose::from_rect(Rect::new(0.0, 0.0, width, height)),
        Shape::Rectangle,
    )
}

fn row_at(section: &Section, y: f64, xs: &[f64]) -> Row {
    let seats = xs.iter().map(|&x| Seat::at(x, y)).collect();
    build_row(section, seats, None, &[])
}

// =============================================================
// generate_linear_row
// =============================================================

#[test]
fn linear_row_scenario_ten_seats() {
    let seats = generate_linear_row(Point::new(0.0, 0.0), Point::new(350.0, 0.0), 15.0, 20.0);
    assert_eq!(seats.len(), 10);
    for (i, seat) in seats.iter().enumerate() {
        let expected = 17.5 + 35.0 * i as f64;
        assert!(approx_eq(seat.x, expected), "seat {i}: {} != {expected}", seat.x);
        assert!(approx_eq(seat.y, 0.0));
        assert!(approx_eq(seat.base_y, 0.0));
    }
}

#[test]
fn linear_row_count_and_bounds_for_many_lengths() {
    for length in [35.0, 36.0, 69.9, 70.0, 100.0, 349.0, 1000.0] {
        let seats = generate_linear_row(Point::new(0.0, 0.0), Point::new(length, 0.0), 15.0, 20.0);
        let expected = (length / 35.0_f64).floor() as usize;
        assert_eq!(seats.len(), expected, "length {length}");
        assert!(seats.iter().all(|s| s.x >= 0.0 && s.x <= length));
    }
}

#[test]
fn linear_row_shorter_than_pitch_is_empty() {
    assert!(generate_linear_row(Point::new(0.0, 0.0), Point::new(34.0, 0.0), 15.0, 20.0).is_empty());
    assert!(generate_linear_row(Point::new(5.0, 5.0), Point::new(5.0, 5.0), 15.0, 20.0).is_empty());
}

#[test]
fn linear_row_follows_diagonal() {
    let seats = generate_linear_row(Point::new(0.0, 0.0), Point::new(0.0, 70.0), 15.0, 20.0);
    assert_eq!(seats.len(), 2);
    assert!(approx_eq(seats[0].x, 0.0));
    assert!(approx_eq(seats[0].y, 17.5));
    assert!(approx_eq(seats[0].angle, 90.0));
}

// =============================================================
// generate_grid
// =============================================================

#[test]
fn grid_dimensions() {
    let rows = generate_grid(Rect::new(10.0, 20.0, 100.0, 80.0), 15.0, 20.0, 20.0);
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.len() == 2));
    assert!(approx_eq(rows[0][0].x, 27.5));
    assert!(approx_eq(rows[0][0].y, 37.5));
    assert!(approx_eq(rows[1][1].x, 62.5));
    assert!(approx_eq(rows[1][1].y, 72.5));
}

#[test]
fn grid_too_small_is_empty() {
    assert!(generate_grid(Rect::new(0.0, 0.0, 30.0, 300.0), 15.0, 20.0, 20.0).is_empty());
    assert!(generate_grid(Rect::new(0.0, 0.0, 300.0, 30.0), 15.0, 20.0, 20.0).is_empty());
}

#[test]
fn clamp_run_limits_long_drags() {
    let start = Point::new(0.0, 0.0);
    let end = clamp_run(start, Point::new(3000.0, 4000.0), 35.0, 100);
    assert!(approx_eq(start.distance(end), 3500.0));
    assert!(approx_eq(end.x / end.y, 0.75));
    assert_eq!(generate_linear_row(start, end, 15.0, 20.0).len(), 100);

    let short = Point::new(100.0, 0.0);
    assert_eq!(clamp_run(start, short, 35.0, 100), short);
}

#[test]
fn clamp_block_keeps_top_left_corner() {
    let rect = clamp_block(Rect::new(5.0, 6.0, 1000.0, 1000.0), (10.0, 20), (25.0, 3));
    assert_eq!(rect, Rect::new(5.0, 6.0, 200.0, 75.0));
    let rows = generate_grid(rect, 5.0, 5.0, 20.0);
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.len() == 20));

    let small = Rect::new(0.0, 0.0, 30.0, 30.0);
    assert_eq!(clamp_block(small, (10.0, 20), (25.0, 3)), small);
}

// =============================================================
// Tables
// =============================================================

#[test]
fn round_table_scenario_six_seats() {
    let center = Point::new(100.0, 100.0);
    let (table, seats) = generate_round_table(center, 6, 15.0);
    assert_eq!(seats.len(), 6);
    assert!(matches!(table, Table::Round { radius, .. } if approx_eq(radius, 24.0)));
    let ring = 24.0 + 7.5 + 5.0;
    let expected = [-90.0_f64, -30.0, 30.0, 90.0, 150.0, 210.0];
    for (seat, deg) in seats.iter().zip(expected) {
        let (sin, cos) = deg.to_radians().sin_cos();
        assert!(approx_eq(seat.x, 100.0 + ring * cos));
        assert!(approx_eq(seat.y, 100.0 + ring * sin));
    }
}

#[test]
fn round_table_constant_radius_and_even_spacing() {
    let center = Point::new(50.0, -20.0);
    for n in 3..=12 {
        let (_, seats) = generate_round_table(center, n, 15.0);
        assert_eq!(seats.len(), n);
        let ring = round_table_ring_radius(n, 15.0);
        let step = 360.0 / n as f64;
        for (i, seat) in seats.iter().enumerate() {
            assert!(approx_eq(center.distance(seat.position()), ring), "n={n} seat {i}");
            let angle = (seat.y - center.y).atan2(seat.x - center.x).to_degrees();
            let expected = -90.0 + step * i as f64;
            let diff = (angle - expected).rem_euclid(360.0);
            assert!(diff < 1e-6 || (360.0 - diff) < 1e-6, "n={n} seat {i}: {angle} vs {expected}");
        }
    }
}

#[test]
fn round_table_clamps_to_three_seats() {
    let (_, seats) = generate_round_table(Point::new(0.0, 0.0), 1, 15.0);
    assert_eq!(seats.len(), 3);
}

#[test]
fn rect_table_fills_top_side_first() {
    let center = Point::new(0.0, 0.0);
    let (table, seats) = generate_rect_table(center, 5, 15.0);
    assert_eq!(seats.len(), 5);
    let Table::Rect { width, height, .. } = table else {
        panic!("expected rect table");
    };
    assert!(approx_eq(width, 3.0 * 25.0));
    assert!(approx_eq(height, 30.0));
    let offset = 15.0 + 7.5 + 5.0;
    assert_eq!(seats.iter().filter(|s| approx_eq(s.y, -offset)).count(), 3);
    assert_eq!(seats.iter().filter(|s| approx_eq(s.y, offset)).count(), 2);
    assert!(approx_eq(seats[0].x, -37.5 + 12.5));
}

fn table_row(s: &Section, table: Table, seats: Vec<Seat>) -> Row {
    build_row(s, seats, Some(table), &[])
}

#[test]
fn round_table_seat_spacing_widens_the_ring() {
    let s = section(400.0, 200.0);
    let center = Point::new(100.0, 100.0);
    let (table, seats) = generate_round_table(center, 4, 15.0);
    let mut row = table_row(&s, table, seats);
    row.table_style.seat_spacing = Some(60.0);
    arrange_table(&mut row, 15.0);

    let ring = 60.0 / (2.0 * (std::f64::consts::PI / 4.0).sin());
    for seat in &row.seats {
        assert!(approx_eq(center.distance(seat.position()), ring));
        assert!(approx_eq(seat.y, seat.base_y));
    }
    assert!(approx_eq(row.seats[0].position().distance(row.seats[1].position()), 60.0));

    // A spacing tighter than the default ring leaves the ring alone.
    row.table_style.seat_spacing = Some(1.0);
    arrange_table(&mut row, 15.0);
    assert!(approx_eq(center.distance(row.seats[0].position()), round_table_ring_radius(4, 15.0)));
}

#[test]
fn rect_table_seat_spacing_centers_each_side() {
    let s = section(400.0, 200.0);
    let (table, seats) = generate_rect_table(Point::new(0.0, 0.0), 4, 15.0);
    let mut row = table_row(&s, table, seats);
    let ids: Vec<SeatId> = row.seats.iter().map(|s| s.id).collect();
    row.table_style.seat_spacing = Some(30.0);
    arrange_table(&mut row, 15.0);
    let xs: Vec<f64> = row.seats.iter().map(|s| s.x).collect();
    assert_eq!(xs, [-15.0, 15.0, -15.0, 15.0]);
    assert_eq!(row.seats.iter().map(|s| s.id).collect::<Vec<_>>(), ids);
}

#[test]
fn resize_table_grows_the_table_but_never_shrinks_it() {
    let s = section(400.0, 200.0);
    let center = Point::new(100.0, 100.0);
    let (table, seats) = generate_round_table(center, 4, 15.0);
    let mut row = table_row(&s, table, seats);
    let first = row.seats[0].id;

    resize_table(&mut row, 10, 15.0);
    assert_eq!(row.seats.len(), 10);
    assert_eq!(row.seats[0].id, first);
    assert!(matches!(row.table, Some(Table::Round { radius, .. }) if approx_eq(radius, 40.0)));
    for seat in &row.seats {
        assert!(approx_eq(center.distance(seat.position()), 40.0 + 7.5 + 5.0));
    }

    resize_table(&mut row, 1, 15.0);
    assert_eq!(row.seats.len(), MIN_TABLE_SEATS);
    assert!(matches!(row.table, Some(Table::Round { radius, .. }) if approx_eq(radius, 40.0)));

    resize_table(&mut row, 10_000, 15.0);
    assert_eq!(row.seats.len(), MAX_ROW_SEATS);
}

#[test]
fn resize_rect_table_widens_to_fit() {
    let s = section(400.0, 200.0);
    let (table, seats) = generate_rect_table(Point::new(0.0, 0.0), 4, 15.0);
    let mut row = table_row(&s, table, seats);
    resize_table(&mut row, 8, 15.0);
    assert_eq!(row.seats.len(), 8);
    assert!(matches!(row.table, Some(Table::Rect { width, .. }) if approx_eq(width, 4.0 * 25.0)));
    assert!(approx_eq(row.seats[0].x, -50.0 + 12.5));
}

// =============================================================
// resize_row
// =============================================================

#[test]
fn resize_row_keeps_left_seats_and_extends_at_last_pitch() {
    let s = section(400.0, 200.0);
    let mut row = row_at(&s, 40.0, &[20.0, 45.0, 70.0]);
    let kept: Vec<SeatId> = row.seats.iter().map(|s| s.id).collect();

    resize_row(&mut row, 5, 15.0);
    let xs: Vec<f64> = row.seats.iter().map(|s| s.x).collect();
    assert_eq!(xs, [20.0, 45.0, 70.0, 95.0, 120.0]);
    assert!(row.seats.iter().all(|s| s.base_y == 40.0));

    resize_row(&mut row, 2, 15.0);
    assert_eq!(row.seats.iter().map(|s| s.id).collect::<Vec<_>>(), kept[..2]);

    resize_row(&mut row, 0, 15.0);
    assert_eq!(row.seats.len(), 1);
    resize_row(&mut row, 2, 15.0);
    assert!(approx_eq(row.seats[1].x, 20.0 + 15.0 + DEFAULT_SEAT_SPACING));
}

#[test]
fn resize_row_leaves_tables_alone() {
    let s = section(400.0, 200.0);
    let (table, seats) = generate_round_table(Point::new(100.0, 100.0), 4, 15.0);
    let mut row = table_row(&s, table, seats);
    resize_row(&mut row, 9, 15.0);
    assert_eq!(row.seats.len(), 4);
}

// =============================================================
// Curvature
// =============================================================

#[test]
fn curve_offset_peaks_at_center_and_vanishes_at_edges() {
    assert!(approx_eq(curve_offset(50.0, 100.0, 20.0), 20.0));
    assert!(approx_eq(curve_offset(0.0, 100.0, 20.0), 0.0));
    assert!(approx_eq(curve_offset(100.0, 100.0, 20.0), 0.0));
    assert!(approx_eq(curve_offset(25.0, 100.0, 20.0), 15.0));
}

#[test]
fn curve_then_flat_restores_baseline() {
    let s = section(400.0, 200.0);
    let mut row = row_at(&s, 40.0, &[10.0, 90.0, 200.0, 310.0]);
    apply_curve(&mut row, 400.0, 30.0);
    assert!(row.seats.iter().any(|seat| seat.y != 40.0));
    apply_curve(&mut row, 400.0, 0.0);
    assert!(row.seats.iter().all(|seat| seat.y == seat.base_y && seat.y == 40.0));
}

#[test]
fn row_curve_bends_its_own_seat_span() {
    let s = section(400.0, 200.0);
    let mut row = row_at(&s, 40.0, &[100.0, 150.0, 200.0]);
    row.curve = 10.0;
    apply_curve(&mut row, 400.0, 0.0);
    let ys: Vec<f64> = row.seats.iter().map(|s| s.y).collect();
    assert_eq!(ys, [40.0, 50.0, 40.0]);

    apply_curve(&mut row, 400.0, 20.0);
    assert!(approx_eq(row.seats[1].y, 40.0 + 10.0 + curve_offset(150.0, 400.0, 20.0)));
}

#[test]
fn curve_is_idempotent() {
    let s = section(400.0, 200.0);
    let mut row = row_at(&s, 40.0, &[10.0, 90.0, 200.0]);
    apply_curve(&mut row, 400.0, 12.0);
    let once: Vec<f64> = row.seats.iter().map(|s| s.y).collect();
    apply_curve(&mut row, 400.0, 12.0);
    let twice: Vec<f64> = row.seats.iter().map(|s| s.y).collect();
    assert_eq!(once, twice);
}

// =============================================================
// build_row / label_seats
// =============================================================

#[test]
fn build_row_labels_and_names() {
    let mut s = section(400.0, 200.0);
    s.name = "Balcony".into();
    let row = row_at(&s, 10.0, &[60.0, 20.0, 40.0]);
    assert_eq!(row.label, "A");
    let labels: Vec<&str> = row.seats.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, ["1", "2", "3"]);
    assert!(row.seats[0].x < row.seats[1].x);
    assert_eq!(row.seats[0].display_name, "Balcony · Row A · Seat 1");
    assert_eq!(row.seats[2].uid, format!("{}-A-3", s.code));
}

#[test]
fn build_row_skips_labels_in_use() {
    let mut s = section(400.0, 200.0);
    let first = row_at(&s, 10.0, &[20.0]);
    s.rows.push(first);
    let second = row_at(&s, 50.0, &[20.0]);
    assert_eq!(second.label, "B");
    let third = build_row(&s, vec![Seat::at(0.0, 90.0)], None, &["B".to_string()]);
    assert_eq!(third.label, "C");
}

#[test]
fn reversed_seat_numbering_counts_from_the_right() {
    let mut s = section(400.0, 200.0);
    s.seat_numbering = Numbering { mode: LabelMode::Numeric, start: 1, direction: Direction::Reverse };
    let row = row_at(&s, 10.0, &[20.0, 40.0, 60.0]);
    assert!(row.seats[0].x < row.seats[2].x);
    assert_eq!(row.seats[0].label, "3");
    assert_eq!(row.seats[2].label, "1");
}

#[test]
fn row_numbering_overrides_the_section() {
    let s = section(400.0, 200.0);
    let mut row = row_at(&s, 10.0, &[20.0, 40.0, 60.0]);
    row.numbering = Some(Numbering { mode: LabelMode::Alpha, start: 1, direction: Direction::Reverse });
    label_seats(&mut row, &s.seat_numbering);
    let labels: Vec<&str> = row.seats.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, ["C", "B", "A"]);
}

#[test]
fn table_rows_take_t_labels() {
    let s = section(400.0, 200.0);
    let (table, seats) = generate_round_table(Point::new(100.0, 100.0), 4, 15.0);
    let row = build_row(&s, seats, Some(table), &[]);
    assert_eq!(row.label, "T1");
    assert_eq!(row.seats[0].label, "1");
    assert!(approx_eq(row.y, 100.0));
}

// =============================================================
// recalculate_rows
// =============================================================

fn scrambled_section() -> Section {
    let mut s = section(400.0, 300.0);
    // One stored row holding seats from two visual rows, and a second row out of order.
    let mut mixed = Row::new("Z", 100.0);
    mixed.seats = vec![Seat::at(50.0, 100.0), Seat::at(10.0, 103.0), Seat::at(30.0, 20.0)];
    let mut other = Row::new("Y", 20.0);
    other.seats = vec![Seat::at(10.0, 18.0), Seat::at(45.0, 19.0), Seat::at(80.0, 101.0)];
    s.rows = vec![mixed, other];
    s
}

#[test]
fn recalculate_groups_by_baseline_top_to_bottom() {
    let mut s = scrambled_section();
    recalculate_rows(&mut s, 15.0);
    assert_eq!(s.rows.len(), 2);
    assert_eq!(s.rows[0].label, "A");
    assert_eq!(s.rows[1].label, "B");
    let top: Vec<f64> = s.rows[0].seats.iter().map(|s| s.x).collect();
    let bottom: Vec<f64> = s.rows[1].seats.iter().map(|s| s.x).collect();
    assert_eq!(top, [10.0, 30.0, 45.0]);
    assert_eq!(bottom, [10.0, 50.0, 80.0]);
    assert_eq!(s.rows[1].seats[2].label, "3");
    assert!(s.rows[1].seats[2].display_name.ends_with("Row B · Seat 3"));
}

#[test]
fn recalculate_is_idempotent() {
    let mut s = scrambled_section();
    recalculate_rows(&mut s, 15.0);
    let first = s.clone();
    recalculate_rows(&mut s, 15.0);
    assert_eq!(first, s);
}

#[test]
fn recalculate_reuses_majority_row_ids() {
    let mut s = scrambled_section();
    let mixed_id = s.rows[0].id;
    let other_id = s.rows[1].id;
    recalculate_rows(&mut s, 15.0);
    assert_eq!(s.rows[0].id, other_id);
    assert_eq!(s.rows[1].id, mixed_id);
}

#[test]
fn recalculate_keeps_tables_and_nonpositive_tolerance_falls_back() {
    let mut s = scrambled_section();
    let (table, seats) = generate_round_table(Point::new(300.0, 200.0), 4, 15.0);
    let table_row = build_row(&s, seats, Some(table), &[]);
    let table_id = table_row.id;
    s.rows.push(table_row);
    recalculate_rows(&mut s, 0.0);
    assert_eq!(s.rows.len(), 3);
    let kept = s.row(&table_id).unwrap();
    assert!(kept.is_table());
    assert_eq!(kept.seats.len(), 4);
}

#[test]
fn recalculate_keeps_row_settings() {
    let mut s = section(400.0, 300.0);
    let mut row = row_at(&s, 40.0, &[20.0, 60.0, 100.0]);
    row.curve = 6.0;
    row.rotation = 15.0;
    row.numbering = Some(Numbering { mode: LabelMode::Roman, start: 1, direction: Direction::Forward });
    let id = row.id;
    s.rows.push(row);
    recalculate_rows(&mut s, 15.0);

    let row = s.row(&id).unwrap();
    assert_eq!(row.curve, 6.0);
    assert_eq!(row.rotation, 15.0);
    assert_eq!(row.seats[2].label, "III");
    assert!(approx_eq(row.seats[1].y, 46.0));
}

#[test]
fn recalculate_preserves_curve() {
    let mut s = scrambled_section();
    s.curve_amount = 10.0;
    s.reflow_curve();
    recalculate_rows(&mut s, 15.0);
    for seat in s.rows.iter().flat_map(|r| r.seats.iter()) {
        assert!(approx_eq(seat.y, seat.base_y + curve_offset(seat.x, 400.0, 10.0)));
    }
}

// =============================================================
// Multi-row tools
// =============================================================

#[test]
fn align_rows_left_center_right() {
    let mut s = section(200.0, 100.0);
    let row = row_at(&s, 20.0, &[50.0, 70.0]);
    let id = row.id;
    s.rows.push(row);

    align_rows(&mut s, &[id], Alignment::Left);
    assert!(approx_eq(s.rows[0].seats[0].x, 10.0));

    align_rows(&mut s, &[id], Alignment::Right);
    assert!(approx_eq(s.rows[0].seats[1].x, 190.0));

    align_rows(&mut s, &[id], Alignment::Center);
    assert!(approx_eq(s.rows[0].seats[0].x + s.rows[0].seats[1].x, 200.0));
}

#[test]
fn space_rows_keeps_top_row_fixed() {
    let mut s = section(200.0, 300.0);
    let a = row_at(&s, 10.0, &[20.0]);
    s.rows.push(a);
    let b = row_at(&s, 100.0, &[20.0]);
    s.rows.push(b);
    let c = row_at(&s, 40.0, &[20.0]);
    s.rows.push(c);
    let ids: Vec<RowId> = s.rows.iter().map(|r| r.id).collect();

    space_rows(&mut s, &ids, 20.0);
    let mut ys: Vec<f64> = s.rows.iter().map(|r| r.seats[0].base_y).collect();
    ys.sort_by(f64::total_cmp);
    assert_eq!(ys, [10.0, 45.0, 80.0]);
    assert!(s.rows.iter().all(|r| r.seats[0].y == r.seats[0].base_y));
}

#[test]
fn respace_seats_keeps_first_seat() {
    let s = section(400.0, 100.0);
    let mut row = row_at(&s, 10.0, &[30.0, 31.0, 200.0]);
    respace_seats(&mut row, 15.0, 5.0);
    let xs: Vec<f64> = row.seats.iter().map(|s| s.x).collect();
    assert_eq!(xs, [30.0, 50.0, 70.0]);
}

// =============================================================
// delete_seats / assign_seats
// =============================================================

fn layout_with_two_sections() -> (Layout, SectionId, SectionId) {
    let mut layout = Layout::new(1000.0, 1000.0);
    let mut left = section(200.0, 200.0);
    let row = row_at(&left, 50.0, &[20.0, 40.0, 60.0]);
    left.rows.push(row);
    let mut right = Section::new(
        "Right",
        SectionKind::Standard,
        Pose::from_rect(Rect::new(300.0, 0.0, 200.0, 200.0)),
        Shape::Rectangle,
    );
    let (l, r) = (left.id, right.id);
    layout.sections = vec![left, right];
    (layout, l, r)
}

#[test]
fn delete_seats_renumbers_remaining() {
    let (mut layout, left, _) = layout_with_two_sections();
    let middle = layout.section(&left).unwrap().rows[0].seats[1].id;
    assert_eq!(delete_seats(&mut layout, &[middle]), 1);
    let row = &layout.section(&left).unwrap().rows[0];
    let labels: Vec<&str> = row.seats.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, ["1", "2"]);
    assert!(layout.seat(&middle).is_none());
}

#[test]
fn assign_seats_moves_into_new_row_keeping_world_position() {
    let (mut layout, left, right) = layout_with_two_sections();
    let seat = layout.section(&left).unwrap().rows[0].seats[0].clone();
    let world = layout.section(&left).unwrap().to_world(seat.position());

    let moved = assign_seats(&mut layout, &[seat.id], right, "K").unwrap();
    assert_eq!(moved, 1);

    let target = layout.section(&right).unwrap();
    let row = target.row_by_label("K").unwrap();
    assert_eq!(row.seats.len(), 1);
    let after = target.to_world(row.seats[0].position());
    assert!(approx_eq(after.x, world.x));
    assert!(approx_eq(after.y, world.y));
    assert_eq!(row.seats[0].uid, format!("{}-K-1", target.code));
    assert_eq!(layout.locate_seat(&seat.id).unwrap().section_id, right);
}

#[test]
fn assign_seats_into_non_standard_section_is_rejected_untouched() {
    let (mut layout, left, right) = layout_with_two_sections();
    layout.section_mut(&right).unwrap().kind = SectionKind::Stage;
    let before = layout.clone();
    let seat = layout.section(&left).unwrap().rows[0].seats[0].id;
    let err = assign_seats(&mut layout, &[seat], right, "A").unwrap_err();
    assert_eq!(err, DesignerError::StructuralConflict(SectionKind::Stage));
    assert_eq!(layout, before);
}

#[test]
fn assign_seats_requires_selection() {
    let (mut layout, _, right) = layout_with_two_sections();
    assert!(matches!(
        assign_seats(&mut layout, &[], right, "A"),
        Err(DesignerError::MissingSelection(_))
    ));
}

// =============================================================
// relabel_section
// =============================================================

#[test]
fn relabel_section_follows_numbering_change() {
    let mut s = section(400.0, 300.0);
    let a = row_at(&s, 100.0, &[20.0, 40.0]);
    s.rows.push(a);
    let b = row_at(&s, 10.0, &[20.0]);
    s.rows.push(b);
    s.row_numbering = Numbering { mode: LabelMode::Roman, start: 1, direction: Direction::Reverse };
    relabel_section(&mut s);
    // Reversed: the bottom row takes the first label.
    assert_eq!(s.rows[0].label, "I");
    assert_eq!(s.rows[1].label, "II");
    assert!(s.rows[0].seats[1].display_name.ends_with("Row I · Seat 2"));
}
