//! Scripted editor input.
//!
//! A script is JSON lines, one [`ScriptEvent`] per line, tagged by `event`.
//! Blank lines and lines starting with `#` are skipped. Pointer coordinates
//! are in screen space, exactly as a host window would deliver them.
//!
//! ```text
//! {"event":"mode","mode":"draw_rect_section"}
//! {"event":"drag","path":[{"x":100,"y":100},{"x":400,"y":300}]}
//! {"event":"key","key":"Escape"}
//! ```

#[cfg(test)]
#[path = "script_test.rs"]
mod tests;

use designer::camera::Point;
use designer::doc::{Background, SectionKind};
use designer::input::{Button, EditMode, Modifiers};
use designer::layout::Alignment;
use designer::mutation::{RowPatch, SectionPatch, TablePatch};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("script line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("no section named {0:?}")]
    UnknownSection(String),
    #[error("no row {row:?} in section {section:?}")]
    UnknownRow { section: String, row: String },
    #[error("{0} needs at least two points")]
    ShortPath(&'static str),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScriptEvent {
    PointerDown {
        x: f64,
        y: f64,
        #[serde(default)]
        button: Button,
        #[serde(default)]
        modifiers: Modifiers,
    },
    PointerMove {
        x: f64,
        y: f64,
        #[serde(default)]
        modifiers: Modifiers,
    },
    PointerUp {
        x: f64,
        y: f64,
        #[serde(default)]
        button: Button,
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// Press and release at one point.
    Click {
        x: f64,
        y: f64,
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// Press at the first point, move through the rest, release at the last.
    Drag {
        path: Vec<Point>,
        #[serde(default)]
        button: Button,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Wheel {
        x: f64,
        y: f64,
        #[serde(default)]
        dx: f64,
        dy: f64,
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// Browser-style key name such as `"Escape"` or `"ArrowLeft"`.
    Key {
        key: String,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Mode { mode: EditMode },
    /// Make the named section active.
    SelectSection { section: String },
    DeleteSeats,
    AssignSeats { section: String, row: String },
    RecalculateRows {
        #[serde(default)]
        section: Option<String>,
    },
    Curve { section: String, amount: f64 },
    UpdateSection { section: String, fields: SectionPatch },
    AlignRows { alignment: Alignment },
    SpaceRows { spacing: f64 },
    RespaceRows { spacing: f64 },
    DeleteRows,
    /// Edit the row labeled `row` in `section`.
    UpdateRow { section: String, row: String, fields: RowPatch },
    /// Edit the table labeled `row` in `section`.
    UpdateTable { section: String, row: String, fields: TablePatch },
    BlockSeats {
        #[serde(default)]
        reason: Option<String>,
    },
    UnblockSeats,
    /// Content for the next text label.
    Text { content: String },
    /// Seat count for the next placed table.
    TableSeats { count: usize },
    /// Kind for the next drawn rectangle or polygon.
    Kind { kind: SectionKind },
    Background { background: Background },
}

/// Parse a JSON-lines script.
///
/// # Errors
///
/// [`ScriptError::Parse`] naming the first line (1-based) that is not a
/// valid event.
pub fn parse_script(text: &str) -> Result<Vec<ScriptEvent>, ScriptError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|e| ScriptError::Parse { line: i + 1, message: e.to_string() })
        })
        .collect()
}
