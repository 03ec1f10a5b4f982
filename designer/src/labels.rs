//! Row and seat numbering.
//!
//! Labels are derived from a 1-based ordinal and a [`LabelMode`]. A
//! [`Numbering`] adds the starting ordinal and the direction in which the
//! ordinals run across rows (top to bottom) or seats (left to right).

#[cfg(test)]
#[path = "labels_test.rs"]
mod labels_test;

use serde::{Deserialize, Serialize};

/// How an ordinal is rendered as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelMode {
    /// 1, 2, 3, ...
    #[default]
    Numeric,
    /// A ... Z, AA, AB, ...
    Alpha,
    /// I, II, III, IV, ...
    Roman,
}

/// Which end of a row (or which row of a section) receives the first label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Top to bottom for rows, left to right for seats.
    #[default]
    Forward,
    /// Bottom to top for rows, right to left for seats.
    Reverse,
}

/// Numbering scheme for rows or seats within a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Numbering {
    pub mode: LabelMode,
    pub start: u32,
    #[serde(default)]
    pub direction: Direction,
}

impl Default for Numbering {
    fn default() -> Self {
        Self { mode: LabelMode::Numeric, start: 1, direction: Direction::Forward }
    }
}

impl Numbering {
    /// Default row numbering: alphabetic from `A`.
    #[must_use]
    pub fn rows() -> Self {
        Self { mode: LabelMode::Alpha, ..Self::default() }
    }

    /// Label of the element at zero-based `index` in numbering order.
    #[must_use]
    pub fn label(&self, index: usize) -> String {
        let ordinal = u32::try_from(index).map_or(u32::MAX, |i| self.start.saturating_add(i));
        format_label(ordinal, self.mode)
    }

    #[must_use]
    pub fn is_reversed(&self) -> bool {
        self.direction == Direction::Reverse
    }
}

/// Render a 1-based ordinal. Zero renders as `"0"` in every mode.
#[must_use]
pub fn format_label(n: u32, mode: LabelMode) -> String {
    if n == 0 {
        return "0".into();
    }
    match mode {
        LabelMode::Numeric => n.to_string(),
        LabelMode::Alpha => alpha(n),
        LabelMode::Roman => roman(n),
    }
}

/// Bijective base-26: 1 → A, 26 → Z, 27 → AA.
fn alpha(mut n: u32) -> String {
    let mut out = Vec::new();
    while n > 0 {
        n -= 1;
        out.push(b'A' + u8::try_from(n % 26).unwrap_or(0));
        n /= 26;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

fn roman(mut n: u32) -> String {
    const TABLE: [(u32, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    let mut out = String::new();
    for (value, glyph) in TABLE {
        while n >= value {
            out.push_str(glyph);
            n -= value;
        }
    }
    out
}

/// Label for the row at `index` in top-to-bottom order.
#[must_use]
pub fn row_label(numbering: &Numbering, index: usize) -> String {
    numbering.label(index)
}

/// Label for the seat at `index` in left-to-right order.
#[must_use]
pub fn seat_label(numbering: &Numbering, index: usize) -> String {
    numbering.label(index)
}

/// First label in numbering order not already taken by `existing`.
#[must_use]
pub fn next_free_row_label<'a, I>(numbering: &Numbering, existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let taken: std::collections::HashSet<&str> = existing.into_iter().collect();
    (0..)
        .map(|i| numbering.label(i))
        .find(|label| !taken.contains(label.as_str()))
        .unwrap_or_default()
}
