//! Transient selection: seats, (section, row) pairs, and the active section.
//!
//! Selection is keyed by id only so it survives a full model reload;
//! [`SelectionState::retain_existing`] drops entries whose target is gone.

#[cfg(test)]
#[path = "selection_test.rs"]
mod selection_test;

use std::collections::BTreeSet;

use crate::doc::{Layout, RowId, SeatId, SectionId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub seats: BTreeSet<SeatId>,
    pub rows: BTreeSet<(SectionId, RowId)>,
    pub active_section: Option<SectionId>,
}

impl SelectionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seats.is_empty() && self.rows.is_empty() && self.active_section.is_none()
    }

    pub fn clear(&mut self) {
        self.seats.clear();
        self.rows.clear();
        self.active_section = None;
    }

    /// Plain click selects exclusively; with `toggle` membership flips.
    pub fn click_seat(&mut self, id: SeatId, toggle: bool) {
        if toggle {
            if !self.seats.remove(&id) {
                self.seats.insert(id);
            }
        } else {
            self.seats.clear();
            self.seats.insert(id);
        }
    }

    /// Box selection: add to the current set with `additive`, otherwise replace it.
    pub fn select_seats<I>(&mut self, ids: I, additive: bool)
    where
        I: IntoIterator<Item = SeatId>,
    {
        if !additive {
            self.seats.clear();
        }
        self.seats.extend(ids);
    }

    /// Plain click selects one row exclusively; with `toggle` membership flips.
    pub fn click_row(&mut self, section_id: SectionId, row_id: RowId, toggle: bool) {
        let key = (section_id, row_id);
        if toggle {
            if !self.rows.remove(&key) {
                self.rows.insert(key);
            }
        } else {
            self.rows.clear();
            self.rows.insert(key);
        }
    }

    pub fn select_rows<I>(&mut self, rows: I, additive: bool)
    where
        I: IntoIterator<Item = (SectionId, RowId)>,
    {
        if !additive {
            self.rows.clear();
        }
        self.rows.extend(rows);
    }

    #[must_use]
    pub fn seat_ids(&self) -> Vec<SeatId> {
        self.seats.iter().copied().collect()
    }

    /// Selected rows grouped by section, in id order.
    #[must_use]
    pub fn rows_by_section(&self) -> Vec<(SectionId, Vec<RowId>)> {
        let mut out: Vec<(SectionId, Vec<RowId>)> = Vec::new();
        for &(section_id, row_id) in &self.rows {
            match out.last_mut() {
                Some((s, ids)) if *s == section_id => ids.push(row_id),
                _ => out.push((section_id, vec![row_id])),
            }
        }
        out
    }

    /// Drop every id that no longer resolves in `layout`.
    pub fn retain_existing(&mut self, layout: &Layout) {
        self.seats.retain(|id| layout.seat(id).is_some());
        self.rows.retain(|(s, r)| layout.section(s).is_some_and(|section| section.row(r).is_some()));
        if self.active_section.is_some_and(|id| layout.section(&id).is_none()) {
            self.active_section = None;
        }
    }
}
