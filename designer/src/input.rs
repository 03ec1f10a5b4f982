//! Input model: edit modes, modifier keys, mouse buttons, and the gesture state machine.
//!
//! This module defines the types consumed by the engine. `EditMode` and
//! `Modifiers` capture the operator's intent at the time of a pointer event.
//! `Gesture` is the active interaction being tracked between pointer-down and
//! pointer-up, carrying the context needed to compute incremental deltas and
//! emit one final mutation on release. `GeometryCache` holds the temporary
//! shapes previewed while drawing.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::camera::{Point, Rect};
use crate::consts::{
    DEFAULT_ROW_SPACING, DEFAULT_ROW_TOLERANCE, DEFAULT_SEAT_SIZE, DEFAULT_SEAT_SPACING, LINE_SNAP_DEGREES,
};
use crate::doc::{RowId, SeatId, SectionId, SectionKind};

/// Which editing mode is active. Exactly one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditMode {
    /// Select and move sections; pan on empty canvas.
    #[default]
    Select,
    /// Select and move individual seats.
    SelectSeats,
    /// Select whole rows for bulk alignment and spacing.
    MultiSelect,
    /// Click vertices of a polygon section.
    DrawPolygon,
    /// Drag a decorative line.
    DrawLine,
    /// Drag a decorative circle.
    DrawCircle,
    /// Click to place a text label.
    DrawText,
    /// Drag a rectangular section.
    DrawRectSection,
    /// Drag a line of seats inside a section.
    DrawSingleRow,
    /// Drag a block of rows inside a section.
    DrawMultiRow,
    /// Click to place a round table with seats.
    DrawRoundTable,
    /// Click to place a rectangular table with seats.
    DrawRectTable,
}

impl EditMode {
    /// Whether this mode creates geometry rather than selecting it.
    #[must_use]
    pub fn is_drawing(self) -> bool {
        !matches!(self, Self::Select | Self::SelectSeats | Self::MultiSelect)
    }

    /// Whether this mode places seats inside an existing section.
    #[must_use]
    pub fn places_seats(self) -> bool {
        matches!(self, Self::DrawSingleRow | Self::DrawMultiRow | Self::DrawRoundTable | Self::DrawRectTable)
    }
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub meta: bool,
}

impl Modifiers {
    #[must_use]
    pub fn shift() -> Self {
        Self { shift: true, ..Self::default() }
    }

    /// Ctrl on Linux/Windows, Command on macOS.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Button {
    #[default]
    Primary,
    Middle,
    Secondary,
}

/// Keys the designer reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Escape,
    Delete,
    Backspace,
    Enter,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Other(String),
}

impl Key {
    /// Map a browser-style key name (`"Escape"`, `"ArrowLeft"`) to a key.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "Escape" | "Esc" => Self::Escape,
            "Delete" | "Del" => Self::Delete,
            "Backspace" => Self::Backspace,
            "Enter" | "Return" => Self::Enter,
            "ArrowUp" | "Up" => Self::ArrowUp,
            "ArrowDown" | "Down" => Self::ArrowDown,
            "ArrowLeft" | "Left" => Self::ArrowLeft,
            "ArrowRight" | "Right" => Self::ArrowRight,
            other => Self::Other(other.to_string()),
        }
    }

    /// Unit direction for arrow keys.
    #[must_use]
    pub fn arrow_direction(&self) -> Option<(f64, f64)> {
        match self {
            Self::ArrowUp => Some((0.0, -1.0)),
            Self::ArrowDown => Some((0.0, 1.0)),
            Self::ArrowLeft => Some((-1.0, 0.0)),
            Self::ArrowRight => Some((1.0, 0.0)),
            _ => None,
        }
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// Generation parameters used by the drawing modes.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawSettings {
    pub seat_size: f64,
    pub seat_spacing: f64,
    pub row_spacing: f64,
    /// Seat count for the next placed table.
    pub table_seats: usize,
    /// Baseline tolerance for row recomputation.
    pub row_tolerance: f64,
    /// Kind assigned to newly drawn rectangle and polygon sections.
    pub section_kind: SectionKind,
    /// Content of the next placed text label.
    pub text: String,
}

impl Default for DrawSettings {
    fn default() -> Self {
        Self {
            seat_size: DEFAULT_SEAT_SIZE,
            seat_spacing: DEFAULT_SEAT_SPACING,
            row_spacing: DEFAULT_ROW_SPACING,
            table_seats: 8,
            row_tolerance: DEFAULT_ROW_TOLERANCE,
            section_kind: SectionKind::Standard,
            text: "Label".into(),
        }
    }
}

/// The gesture tracked between pointer-down and pointer-up.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Gesture {
    /// No gesture in progress.
    #[default]
    Idle,
    /// Panning the canvas.
    Panning {
        /// Screen position at the previous event.
        last_screen: Point,
    },
    /// Moving a section.
    DraggingSection {
        id: SectionId,
        /// World position at pointer-down.
        start_world: Point,
        /// Section origin at pointer-down.
        orig_x: f64,
        orig_y: f64,
    },
    /// Moving the selected seats of one section.
    DraggingSeats {
        section_id: SectionId,
        seat_ids: Vec<SeatId>,
        last_world: Point,
        /// Cumulative local displacement applied so far.
        moved: (f64, f64),
        /// Seat pressed inside a larger selection; releasing without moving
        /// selects it alone.
        collapse_to: Option<SeatId>,
    },
    /// Moving every seat of one row.
    DraggingRow {
        section_id: SectionId,
        row_id: RowId,
        last_world: Point,
        moved: (f64, f64),
    },
    /// Rubber-band selection.
    Marquee { anchor_world: Point },
    /// Sizing a rectangular section.
    DrawingRect { anchor_world: Point },
    /// Dragging a decorative line.
    DrawingLine { anchor_world: Point },
    /// Dragging a decorative circle.
    DrawingCircle { center_world: Point },
    /// Dragging a row of seats inside a section.
    DrawingRow { section_id: SectionId, anchor_world: Point },
    /// Dragging a block of rows inside a section.
    DrawingGrid { section_id: SectionId, anchor_world: Point },
}

/// Active mode, active gesture and generation settings.
#[derive(Debug, Clone, Default)]
pub struct ToolState {
    pub mode: EditMode,
    pub gesture: Gesture,
    pub settings: DrawSettings,
}

/// Preview geometry shown on the draw layer, in layout coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum TempShape {
    Rect(Rect),
    Line { from: Point, to: Point },
    Circle { center: Point, radius: f64 },
    /// Open polygon with a rubber-band edge to the cursor.
    Polyline(Vec<Point>),
    /// Seat centers that would be generated, with their diameter.
    Seats { centers: Vec<Point>, size: f64 },
    Marquee(Rect),
}

/// In-progress drawing state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryCache {
    /// The shape previewed on the draw layer.
    pub temp: Option<TempShape>,
    /// Committed polygon vertices, in layout coordinates.
    pub polygon: Vec<Point>,
}

impl GeometryCache {
    pub fn clear(&mut self) {
        self.temp = None;
        self.polygon.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.temp.is_none() && self.polygon.is_empty()
    }
}

/// Snap `to` so the segment from `from` lies on a multiple of the line snap angle.
#[must_use]
pub fn snap_line(from: Point, to: Point) -> Point {
    let length = from.distance(to);
    if length == 0.0 {
        return to;
    }
    let angle = (to.y - from.y).atan2(to.x - from.x).to_degrees();
    let snapped = (angle / LINE_SNAP_DEGREES).round() * LINE_SNAP_DEGREES;
    let (sin, cos) = snapped.to_radians().sin_cos();
    Point::new(from.x + length * cos, from.y + length * sin)
}
