//! Document model: the seating layout, its sections, rows and seats.
//!
//! This module defines the data types that describe a venue map (`Layout`,
//! `Section`, `Row`, `Seat`), the closed enums that replace string tags
//! (`SectionKind`, `Shape`, `Table`, `SeatShape`), and the lookup and cascade
//! helpers the engine uses to mutate the tree.
//!
//! Seat and row coordinates are section-local: the origin is the section's
//! unrotated top-left corner, before scale. `Section::to_world` and
//! `Section::to_local` convert between that frame and layout coordinates.
//!
//! Data flows into this layer from the store (JSON snapshot) and from the
//! engine (through [`crate::mutation::apply`]). The renderer reads it to build
//! the scene graph.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::camera::{Point, Rect};
use crate::consts::DEFAULT_SEAT_SIZE;
use crate::error::DesignerError;
use crate::labels::Numbering;
use crate::layout;

/// Unique identifier for a section.
pub type SectionId = Uuid;
/// Unique identifier for a row (tables are rows too).
pub type RowId = Uuid;
/// Unique identifier for a seat.
pub type SeatId = Uuid;

// =============================================================
// Layout
// =============================================================

/// A complete venue map as stored in the store and on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// Canvas width in layout units.
    pub canvas_width: f64,
    /// Canvas height in layout units.
    pub canvas_height: f64,
    /// Canvas fill and optional reference image.
    #[serde(default)]
    pub background: Background,
    /// Sections in draw order (first is drawn bottom-most).
    #[serde(default)]
    pub sections: Vec<Section>,
}

/// Canvas background: a fill color and an optional traced image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Background {
    /// Fill color as a CSS color string.
    pub fill: String,
    /// Reference image drawn over the fill, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<BackgroundImage>,
}

impl Default for Background {
    fn default() -> Self {
        Self { fill: "#F3F4F6".into(), image: None }
    }
}

/// Reference image placed behind the sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundImage {
    pub url: String,
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub opacity: f64,
}

/// Where a seat lives inside the layout tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatLocation {
    pub section_id: SectionId,
    pub row_id: RowId,
}

impl Layout {
    /// An empty canvas of the given size.
    #[must_use]
    pub fn new(canvas_width: f64, canvas_height: f64) -> Self {
        Self { canvas_width, canvas_height, background: Background::default(), sections: Vec::new() }
    }

    #[must_use]
    pub fn section(&self, id: &SectionId) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == *id)
    }

    pub fn section_mut(&mut self, id: &SectionId) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.id == *id)
    }

    /// The section that owns `row_id`, if any.
    #[must_use]
    pub fn section_of_row(&self, row_id: &RowId) -> Option<&Section> {
        self.sections.iter().find(|s| s.row(row_id).is_some())
    }

    /// Find which section and row hold `seat_id`.
    #[must_use]
    pub fn locate_seat(&self, seat_id: &SeatId) -> Option<SeatLocation> {
        self.sections.iter().find_map(|section| {
            section.rows.iter().find_map(|row| {
                row.seats
                    .iter()
                    .any(|seat| seat.id == *seat_id)
                    .then_some(SeatLocation { section_id: section.id, row_id: row.id })
            })
        })
    }

    #[must_use]
    pub fn seat(&self, seat_id: &SeatId) -> Option<&Seat> {
        self.sections
            .iter()
            .flat_map(|s| s.rows.iter())
            .flat_map(|r| r.seats.iter())
            .find(|seat| seat.id == *seat_id)
    }

    /// Remove a section and, by ownership, all of its rows and seats.
    pub fn remove_section(&mut self, id: &SectionId) -> Option<Section> {
        let index = self.sections.iter().position(|s| s.id == *id)?;
        Some(self.sections.remove(index))
    }

    /// Total number of rows across all sections.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.sections.iter().map(|s| s.rows.len()).sum()
    }

    /// Total number of seats across all sections.
    #[must_use]
    pub fn seat_count(&self) -> usize {
        self.sections.iter().map(Section::seat_count).sum()
    }

    /// Check the structural invariants of a layout received from outside.
    ///
    /// # Errors
    ///
    /// Returns [`DesignerError::Import`] naming the first violated invariant:
    /// non-positive or non-finite canvas or section size, a section rotation
    /// outside `[0, 360)`, a non-finite position, row rotation or curve, a
    /// non-positive table seat spacing, duplicate ids, or duplicate row
    /// labels within a section.
    pub fn validate(&self) -> Result<(), DesignerError> {
        if !positive(self.canvas_width) || !positive(self.canvas_height) {
            return Err(DesignerError::Import("canvas size must be positive".into()));
        }
        let mut ids = HashSet::new();
        for section in &self.sections {
            let pose = &section.pose;
            if !positive(pose.width) || !positive(pose.height) {
                return Err(DesignerError::Import(format!("section {} has a non-positive size", section.id)));
            }
            if !(0.0..360.0).contains(&pose.rotation) {
                return Err(DesignerError::Import(format!(
                    "section {} rotation {} is outside [0, 360)",
                    section.id, pose.rotation
                )));
            }
            if ![pose.x, pose.y, pose.scale, pose.corner_radius, section.curve_amount].iter().all(|v| v.is_finite()) {
                return Err(DesignerError::Import(format!("section {} has a non-finite pose", section.id)));
            }
            if !ids.insert(section.id) {
                return Err(DesignerError::Import(format!("duplicate id {}", section.id)));
            }
            let mut labels = HashSet::new();
            for row in &section.rows {
                if !ids.insert(row.id) {
                    return Err(DesignerError::Import(format!("duplicate id {}", row.id)));
                }
                if !row.rotation.is_finite() || !row.curve.is_finite() {
                    return Err(DesignerError::Import(format!("row {} has a non-finite rotation or curve", row.id)));
                }
                if row.table_style.seat_spacing.is_some_and(|v| !positive(v)) {
                    return Err(DesignerError::Import(format!("row {} has a non-positive seat spacing", row.id)));
                }
                if !labels.insert(row.label.as_str()) {
                    return Err(DesignerError::Import(format!(
                        "duplicate row label {:?} in section {}",
                        row.label, section.id
                    )));
                }
                for seat in &row.seats {
                    if !ids.insert(seat.id) {
                        return Err(DesignerError::Import(format!("duplicate id {}", seat.id)));
                    }
                    if ![seat.x, seat.y, seat.base_y].iter().all(|v| v.is_finite()) {
                        return Err(DesignerError::Import(format!("seat {} has a non-finite position", seat.id)));
                    }
                }
            }
        }
        Ok(())
    }
}

// =============================================================
// Section
// =============================================================

/// What a section represents on the venue map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// A seating block holding rows and seats.
    Standard,
    /// A drawn shape, line or text label with no seats.
    Decorative,
    /// A point-of-interest marker (bar, exit, toilets).
    Icon,
    /// The stage.
    Stage,
    /// Standing area without numbered seats.
    DanceFloor,
}

impl SectionKind {
    /// Whether rows and seats may be placed in a section of this kind.
    #[must_use]
    pub fn accepts_seats(self) -> bool {
        matches!(self, Self::Standard)
    }
}

/// Position, size and orientation of a section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Left edge of the unrotated box in layout coordinates.
    pub x: f64,
    /// Top edge of the unrotated box in layout coordinates.
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Clockwise rotation in degrees around the box center, in `[0, 360)`.
    pub rotation: f64,
    #[serde(default)]
    pub corner_radius: f64,
    /// Uniform scale applied around the box center.
    #[serde(default = "one")]
    pub scale: f64,
}

fn one() -> f64 {
    1.0
}

impl Pose {
    #[must_use]
    pub fn from_rect(rect: Rect) -> Self {
        Self {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            rotation: 0.0,
            corner_radius: 0.0,
            scale: 1.0,
        }
    }

    #[must_use]
    pub fn local_center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    #[must_use]
    pub fn world_center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Local → layout: scale around the box center, rotate, then translate.
    #[must_use]
    pub fn to_world(&self, local: Point) -> Point {
        let c = self.local_center();
        let scaled = Point::new((local.x - c.x) * self.scale, (local.y - c.y) * self.scale);
        let rotated = scaled.rotated(self.rotation);
        let wc = self.world_center();
        Point::new(wc.x + rotated.x, wc.y + rotated.y)
    }

    /// Inverse of [`Pose::to_world`].
    #[must_use]
    pub fn to_local(&self, world: Point) -> Point {
        let wc = self.world_center();
        let unrotated = Point::new(world.x - wc.x, world.y - wc.y).rotated(-self.rotation);
        let c = self.local_center();
        let scale = nonzero_scale(self.scale);
        Point::new(c.x + unrotated.x / scale, c.y + unrotated.y / scale)
    }

    #[must_use]
    pub fn delta_to_local(&self, dx: f64, dy: f64) -> (f64, f64) {
        let scale = nonzero_scale(self.scale);
        let d = Point::new(dx, dy).rotated(-self.rotation);
        (d.x / scale, d.y / scale)
    }
}

/// Colors and seat sizing for a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionStyle {
    pub fill: String,
    pub seat_color: String,
    pub opacity: f64,
    /// Seat diameter used for drawing, hit-testing and box selection.
    #[serde(default = "default_seat_size")]
    pub seat_size: f64,
}

fn default_seat_size() -> f64 {
    DEFAULT_SEAT_SIZE
}

impl Default for SectionStyle {
    fn default() -> Self {
        Self { fill: "#3B82F6".into(), seat_color: "#22C55E".into(), opacity: 1.0, seat_size: DEFAULT_SEAT_SIZE }
    }
}

/// Font used by text sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub family: String,
    pub size: f64,
    #[serde(default)]
    pub bold: bool,
}

impl Default for Font {
    fn default() -> Self {
        Self { family: "Arial".into(), size: 16.0, bold: false }
    }
}

/// Outline of a section. Point lists are section-local.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    Rectangle,
    Polygon { points: Vec<Point> },
    Circle { radius: f64 },
    Line { points: Vec<Point> },
    Text { content: String, font: Font },
}

/// A named region of the venue map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: SectionId,
    pub name: String,
    /// Short code used to build external seat identifiers.
    pub code: String,
    pub kind: SectionKind,
    pub pose: Pose,
    #[serde(default)]
    pub style: SectionStyle,
    pub shape: Shape,
    /// Peak vertical displacement of seats at the section's horizontal center.
    #[serde(default)]
    pub curve_amount: f64,
    #[serde(default = "Numbering::rows")]
    pub row_numbering: Numbering,
    #[serde(default)]
    pub seat_numbering: Numbering,
    #[serde(default)]
    pub rows: Vec<Row>,
}

impl Section {
    /// A new standard section with a fresh id.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: SectionKind, pose: Pose, shape: Shape) -> Self {
        let id = Uuid::new_v4();
        let name = name.into();
        let code = section_code(&name, id);
        Self {
            id,
            name,
            code,
            kind,
            pose,
            style: SectionStyle::default(),
            shape,
            curve_amount: 0.0,
            row_numbering: Numbering::rows(),
            seat_numbering: Numbering::default(),
            rows: Vec::new(),
        }
    }

    /// Section-local box center.
    #[must_use]
    pub fn local_center(&self) -> Point {
        self.pose.local_center()
    }

    /// Layout-space center of the section.
    #[must_use]
    pub fn world_center(&self) -> Point {
        self.pose.world_center()
    }

    /// Convert a section-local point to layout coordinates.
    #[must_use]
    pub fn to_world(&self, local: Point) -> Point {
        self.pose.to_world(local)
    }

    /// Convert a layout point into this section's local frame.
    #[must_use]
    pub fn to_local(&self, world: Point) -> Point {
        self.pose.to_local(world)
    }

    /// Convert a layout-space displacement into a local displacement.
    #[must_use]
    pub fn delta_to_local(&self, dx: f64, dy: f64) -> (f64, f64) {
        self.pose.delta_to_local(dx, dy)
    }

    /// Layout-space axis-aligned bounds of the (possibly rotated) section box.
    #[must_use]
    pub fn world_bounds(&self) -> Rect {
        let corners = [
            Point::new(0.0, 0.0),
            Point::new(self.pose.width, 0.0),
            Point::new(self.pose.width, self.pose.height),
            Point::new(0.0, self.pose.height),
        ];
        Rect::bounding(corners.map(|p| self.to_world(p))).unwrap_or_default()
    }

    /// Layout-space seat diameter after section scale.
    #[must_use]
    pub fn world_seat_size(&self) -> f64 {
        self.style.seat_size * self.pose.scale
    }

    #[must_use]
    pub fn row(&self, id: &RowId) -> Option<&Row> {
        self.rows.iter().find(|r| r.id == *id)
    }

    pub fn row_mut(&mut self, id: &RowId) -> Option<&mut Row> {
        self.rows.iter_mut().find(|r| r.id == *id)
    }

    #[must_use]
    pub fn row_by_label(&self, label: &str) -> Option<&Row> {
        self.rows.iter().find(|r| r.label == label)
    }

    #[must_use]
    pub fn seat_count(&self) -> usize {
        self.rows.iter().map(|r| r.seats.len()).sum()
    }

    /// Re-derive every seat's y from its baseline and the section curve.
    ///
    /// Table rows keep their arrangement and are skipped.
    pub fn reflow_curve(&mut self) {
        let width = self.pose.width;
        let amount = self.curve_amount;
        for row in self.rows.iter_mut().filter(|r| r.table.is_none()) {
            layout::apply_curve(row, width, amount);
        }
    }

    /// Recompute display names and external identifiers of every seat.
    pub fn refresh_seat_names(&mut self) {
        let name = self.name.clone();
        let code = self.code.clone();
        for row in &mut self.rows {
            for seat in &mut row.seats {
                seat.display_name = seat_display_name(&name, &row.label, &seat.label);
                seat.uid = seat_uid(&code, &row.label, &seat.label);
            }
        }
    }
}

fn positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

fn nonzero_scale(scale: f64) -> f64 {
    if scale.abs() < f64::EPSILON { 1.0 } else { scale }
}

/// Wrap any angle into `[0, 360)`.
#[must_use]
pub fn normalize_rotation(degrees: f64) -> f64 {
    let r = degrees.rem_euclid(360.0);
    if r >= 360.0 { 0.0 } else { r }
}

fn section_code(name: &str, id: Uuid) -> String {
    let prefix: String = name
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(3)
        .collect::<String>()
        .to_ascii_uppercase();
    let suffix = id.simple().to_string();
    format!("{}_{}", if prefix.is_empty() { "SEC" } else { &prefix }, &suffix[..6])
}

/// Human-readable seat name shown to ticket buyers.
#[must_use]
pub fn seat_display_name(section_name: &str, row_label: &str, seat_label: &str) -> String {
    format!("{section_name} · Row {row_label} · Seat {seat_label}")
}

/// Stable identifier used by ticket inventory.
#[must_use]
pub fn seat_uid(section_code: &str, row_label: &str, seat_label: &str) -> String {
    format!("{section_code}-{row_label}-{seat_label}")
}

// =============================================================
// Row / Table / Seat
// =============================================================

/// Table geometry attached to a row; the row's seats surround it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Table {
    Round { center: Point, radius: f64 },
    Rect { center: Point, width: f64, height: f64 },
}

impl Table {
    #[must_use]
    pub fn center(&self) -> Point {
        match *self {
            Self::Round { center, .. } | Self::Rect { center, .. } => center,
        }
    }

    pub(crate) fn translate(&mut self, dx: f64, dy: f64) {
        match self {
            Self::Round { center, .. } | Self::Rect { center, .. } => *center = center.offset(dx, dy),
        }
    }
}

/// Colors and seat spacing of a table row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableStyle {
    /// Table top fill; the section fill when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Color of the table label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    /// Center-to-center distance between neighbouring seats.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seat_spacing: Option<f64>,
}

impl TableStyle {
    #[must_use]
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// An ordered group of seats sharing a baseline, or arranged around a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub id: RowId,
    pub label: String,
    /// Local y of the uncurved baseline.
    pub y: f64,
    /// Clockwise rotation in degrees about [`Row::pivot`].
    #[serde(default)]
    pub rotation: f64,
    /// Peak displacement at the middle of the row, on top of the section curve.
    #[serde(default)]
    pub curve: f64,
    /// Seat numbering used instead of the section's.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numbering: Option<Numbering>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<Table>,
    #[serde(default, skip_serializing_if = "TableStyle::is_default")]
    pub table_style: TableStyle,
    #[serde(default)]
    pub seats: Vec<Seat>,
}

impl Row {
    #[must_use]
    pub fn new(label: impl Into<String>, y: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: label.into(),
            y,
            rotation: 0.0,
            curve: 0.0,
            numbering: None,
            table: None,
            table_style: TableStyle::default(),
            seats: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_table(&self) -> bool {
        self.table.is_some()
    }

    /// Smallest and largest seat x, or `None` for an empty row.
    #[must_use]
    pub fn x_extent(&self) -> Option<(f64, f64)> {
        let mut xs = self.seats.iter().map(|s| s.x);
        let first = xs.next()?;
        Some(xs.fold((first, first), |(lo, hi), x| (lo.min(x), hi.max(x))))
    }

    /// Point the row rotates about: the table center, else the middle of the
    /// seat span on the baseline.
    #[must_use]
    pub fn pivot(&self) -> Point {
        if let Some(table) = &self.table {
            return table.center();
        }
        let (lo, hi) = self.x_extent().unwrap_or((0.0, 0.0));
        Point::new((lo + hi) / 2.0, self.y)
    }

    /// Section-local position of `seat` after the row rotation.
    #[must_use]
    pub fn seat_point(&self, seat: &Seat) -> Point {
        if self.rotation == 0.0 {
            return seat.position();
        }
        let pivot = self.pivot();
        let r = Point::new(seat.x - pivot.x, seat.y - pivot.y).rotated(self.rotation);
        Point::new(pivot.x + r.x, pivot.y + r.y)
    }

    /// Every seat with its rotated section-local position.
    pub fn seat_points(&self) -> impl Iterator<Item = (&Seat, Point)> {
        self.seats.iter().map(|seat| (seat, self.seat_point(seat)))
    }

    /// Shift the row, its table and every seat by a local displacement.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.y += dy;
        if let Some(table) = &mut self.table {
            table.translate(dx, dy);
        }
        for seat in &mut self.seats {
            seat.translate(dx, dy);
        }
    }
}

/// Seat outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatShape {
    #[default]
    Circle,
    Rect,
    Stadium,
}

/// An individually addressable seat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seat {
    pub id: SeatId,
    pub label: String,
    /// Composed "section · row · seat" name.
    pub display_name: String,
    /// Local x.
    pub x: f64,
    /// Local y as drawn, including any curve offset.
    pub y: f64,
    /// Local y of the seat without curvature.
    pub base_y: f64,
    #[serde(default)]
    pub shape: SeatShape,
    /// Facing angle in degrees.
    #[serde(default)]
    pub angle: f64,
    /// External identifier used by ticket inventory.
    pub uid: String,
    /// Held back from sale.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub blocked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<String>,
}

impl Seat {
    /// A seat at a local position, with empty names until it joins a row.
    #[must_use]
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: String::new(),
            display_name: String::new(),
            x,
            y,
            base_y: y,
            shape: SeatShape::Circle,
            angle: 0.0,
            uid: String::new(),
            blocked: false,
            block_reason: None,
        }
    }

    #[must_use]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
        self.base_y += dy;
    }

    /// Hold the seat back from sale. A blank reason is dropped.
    pub fn block(&mut self, reason: Option<&str>) {
        self.blocked = true;
        self.block_reason = reason.map(str::trim).filter(|r| !r.is_empty()).map(str::to_string);
    }

    pub fn unblock(&mut self) {
        self.blocked = false;
        self.block_reason = None;
    }
}
