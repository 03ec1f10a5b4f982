//! Partial-update requests and the logic that applies them to a layout.
//!
//! A [`Mutation`] is the unit of persistence: every committed edit produces
//! exactly one, carrying only the fields that changed. The engine applies it
//! to its local model before emitting it (optimistic update), and any store
//! that keeps a layout in memory applies it with the same [`apply`] function,
//! so both sides converge on the same document.
//!
//! Structural mutations ([`Mutation::is_structural`]) reshape rows wholesale;
//! the caller is expected to replace its model with the store's authoritative
//! copy once the request completes.

#[cfg(test)]
#[path = "mutation_test.rs"]
mod mutation_test;

use serde::{Deserialize, Serialize};

use crate::doc::{
    normalize_rotation, Background, Layout, Row, RowId, Seat, SeatId, Section, SectionId, SectionKind, Shape,
    Table,
};
use crate::error::DesignerError;
use crate::labels::Numbering;
use crate::layout;

/// Changed fields of a section. `None` means "leave as is".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SectionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<SectionKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seat_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seat_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<Shape>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curve_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_numbering: Option<Numbering>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seat_numbering: Option<Numbering>,
}

impl SectionPatch {
    /// Whether the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Patch that moves a section's box to `(x, y)`.
    #[must_use]
    pub fn position(x: f64, y: f64) -> Self {
        Self { x: Some(x), y: Some(y), ..Self::default() }
    }

    /// Merge `self` into `section`, then re-derive curvature and names as needed.
    ///
    /// # Errors
    ///
    /// [`DesignerError::InvalidGeometry`] if the patch would leave a
    /// non-positive width or height; the section is left unchanged.
    pub fn apply_to(&self, section: &mut Section) -> Result<(), DesignerError> {
        if self.width.is_some_and(|w| w <= 0.0) || self.height.is_some_and(|h| h <= 0.0) {
            return Err(DesignerError::InvalidGeometry("section size must be positive".into()));
        }
        if let Some(v) = &self.name {
            section.name.clone_from(v);
        }
        if let Some(v) = &self.code {
            section.code.clone_from(v);
        }
        if let Some(v) = self.kind {
            section.kind = v;
        }
        let pose = &mut section.pose;
        if let Some(v) = self.x {
            pose.x = v;
        }
        if let Some(v) = self.y {
            pose.y = v;
        }
        if let Some(v) = self.width {
            pose.width = v;
        }
        if let Some(v) = self.height {
            pose.height = v;
        }
        if let Some(v) = self.rotation {
            pose.rotation = normalize_rotation(v);
        }
        if let Some(v) = self.corner_radius {
            pose.corner_radius = v;
        }
        if let Some(v) = self.scale {
            pose.scale = v;
        }
        if let Some(v) = &self.fill {
            section.style.fill.clone_from(v);
        }
        if let Some(v) = &self.seat_color {
            section.style.seat_color.clone_from(v);
        }
        if let Some(v) = self.opacity {
            section.style.opacity = v;
        }
        if let Some(v) = self.seat_size {
            section.style.seat_size = v;
        }
        if let Some(v) = &self.shape {
            section.shape = v.clone();
        }
        if let Some(v) = self.curve_amount {
            section.curve_amount = v;
        }
        let renumber = self.row_numbering.is_some() || self.seat_numbering.is_some();
        if let Some(v) = self.row_numbering {
            section.row_numbering = v;
        }
        if let Some(v) = self.seat_numbering {
            section.seat_numbering = v;
        }

        if renumber {
            layout::relabel_section(section);
        } else if self.name.is_some() || self.code.is_some() {
            section.refresh_seat_names();
        }
        if self.curve_amount.is_some() || self.width.is_some() {
            section.reflow_curve();
        }
        Ok(())
    }
}

/// Changed fields of one row. `None` means "leave as is".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RowPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seat_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curve: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numbering: Option<Numbering>,
    /// Gap between neighbouring seats, applied left to right.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seat_spacing: Option<f64>,
}

impl RowPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge `self` into row `row_id` of `section`, then renumber the row and
    /// re-derive its curvature and seat names.
    ///
    /// # Errors
    ///
    /// [`DesignerError::UnknownEntity`] when the row is not in `section`, and
    /// [`DesignerError::InvalidField`] for a blank or taken label, a
    /// non-finite curve or rotation, a negative spacing, or a seat count,
    /// curve or spacing on a table row. The section is unchanged on error.
    pub fn apply_to(&self, section: &mut Section, row_id: RowId) -> Result<(), DesignerError> {
        let row = section.row(&row_id).ok_or_else(|| unknown_row(row_id))?;
        if row.is_table() && (self.seat_count.is_some() || self.curve.is_some() || self.seat_spacing.is_some()) {
            return Err(invalid(format!("row {} is a table; edit its seats as a table", row.label)));
        }
        let label = self.label.as_deref().map(str::trim);
        if let Some(label) = label {
            if label.is_empty() {
                return Err(invalid("row label is blank".into()));
            }
            if section.rows.iter().any(|r| r.id != row_id && r.label == label) {
                return Err(invalid(format!("row label {label:?} is already taken")));
            }
        }
        if self.curve.is_some_and(|v| !v.is_finite()) || self.rotation.is_some_and(|v| !v.is_finite()) {
            return Err(invalid("row curve and rotation must be finite".into()));
        }
        if self.seat_spacing.is_some_and(|v| !v.is_finite() || v < 0.0) {
            return Err(invalid("row seat spacing must be zero or more".into()));
        }

        let seat_size = section.style.seat_size;
        let numbering = section.seat_numbering;
        let row = section.row_mut(&row_id).ok_or_else(|| unknown_row(row_id))?;
        if let Some(v) = label {
            row.label = v.to_string();
        }
        if let Some(v) = self.numbering {
            row.numbering = Some(v);
        }
        if let Some(v) = self.rotation {
            row.rotation = normalize_rotation(v);
        }
        if let Some(v) = self.curve {
            row.curve = v;
        }
        if let Some(n) = self.seat_count {
            layout::resize_row(row, n, seat_size);
        }
        if let Some(v) = self.seat_spacing {
            layout::respace_seats(row, seat_size, v);
        }
        layout::label_seats(row, &numbering);
        section.reflow_curve();
        section.refresh_seat_names();
        Ok(())
    }
}

/// Changed fields of a table row. `None` means "leave as is".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TablePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seat_count: Option<usize>,
    /// Round tables only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    /// Rect tables only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Rect tables only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Center-to-center distance between neighbouring seats.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seat_spacing: Option<f64>,
    /// Table fill; blank restores the section fill.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
}

impl TablePatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge `self` into table row `row_id` of `section` and re-place its seats.
    ///
    /// A new seat count grows the table to fit first; explicit dimensions
    /// in the same patch win over that growth.
    ///
    /// # Errors
    ///
    /// [`DesignerError::UnknownEntity`] when the row is not in `section`, and
    /// [`DesignerError::InvalidField`] when the row is not a table, a size or
    /// spacing is not positive, or a dimension does not fit the table's
    /// shape. The section is unchanged on error.
    pub fn apply_to(&self, section: &mut Section, row_id: RowId) -> Result<(), DesignerError> {
        let row = section.row(&row_id).ok_or_else(|| unknown_row(row_id))?;
        let Some(table) = row.table else {
            return Err(invalid(format!("row {} is not a table", row.label)));
        };
        let sizes =
            [("radius", self.radius), ("width", self.width), ("height", self.height), ("seat spacing", self.seat_spacing)];
        if let Some((name, _)) = sizes.iter().find(|(_, v)| v.is_some_and(|v| !(v.is_finite() && v > 0.0))) {
            return Err(invalid(format!("table {name} must be positive")));
        }
        match table {
            Table::Round { .. } if self.width.is_some() || self.height.is_some() => {
                return Err(invalid("a round table has a radius, not a width or height".into()));
            }
            Table::Rect { .. } if self.radius.is_some() => {
                return Err(invalid("a rect table has a width and height, not a radius".into()));
            }
            _ => {}
        }

        let seat_size = section.style.seat_size;
        let numbering = section.seat_numbering;
        let row = section.row_mut(&row_id).ok_or_else(|| unknown_row(row_id))?;
        if let Some(n) = self.seat_count {
            layout::resize_table(row, n, seat_size);
        }
        match &mut row.table {
            Some(Table::Round { radius, .. }) => {
                if let Some(v) = self.radius {
                    *radius = v;
                }
            }
            Some(Table::Rect { width, height, .. }) => {
                if let Some(v) = self.width {
                    *width = v;
                }
                if let Some(v) = self.height {
                    *height = v;
                }
            }
            None => {}
        }
        let style = &mut row.table_style;
        if let Some(v) = self.seat_spacing {
            style.seat_spacing = Some(v);
        }
        if let Some(v) = &self.color {
            style.color = non_blank(v);
        }
        if let Some(v) = &self.text_color {
            style.text_color = non_blank(v);
        }
        layout::arrange_table(row, seat_size);
        layout::label_seats(row, &numbering);
        section.refresh_seat_names();
        Ok(())
    }
}

fn non_blank(v: &str) -> Option<String> {
    let v = v.trim();
    (!v.is_empty()).then(|| v.to_string())
}

/// New local position of one seat, as produced by seat respacing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeatPlacement {
    pub id: SeatId,
    pub x: f64,
    pub base_y: f64,
}

/// A partial-update request keyed by entity id.
///
/// Row and seat deltas are section-local; section deltas are in layout units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    CreateSection { section: Section },
    UpdateSection { id: SectionId, fields: SectionPatch },
    MoveSection { id: SectionId, dx: f64, dy: f64 },
    DeleteSection { id: SectionId },
    CreateRow { section_id: SectionId, row: Row },
    MoveRow { section_id: SectionId, row_id: RowId, dx: f64, dy: f64 },
    DeleteRow { section_id: SectionId, row_id: RowId },
    MoveSeats { section_id: SectionId, seat_ids: Vec<SeatId>, dx: f64, dy: f64 },
    PlaceSeats { section_id: SectionId, placements: Vec<SeatPlacement> },
    DeleteSeats { seat_ids: Vec<SeatId> },
    GenerateRows { section_id: SectionId, rows: Vec<Row> },
    RecalculateRows { section_id: SectionId, tolerance: f64 },
    AssignSeats { seat_ids: Vec<SeatId>, target_section_id: SectionId, row_label: String },
    UpdateRow { section_id: SectionId, row_id: RowId, fields: RowPatch },
    UpdateTable { section_id: SectionId, row_id: RowId, fields: TablePatch },
    BlockSeats {
        seat_ids: Vec<SeatId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    UnblockSeats { seat_ids: Vec<SeatId> },
    UpdateBackground { background: Background },
    ImportLayout { layout: Layout },
}

impl Mutation {
    /// Whether the store's response replaces the local model.
    ///
    /// Row and table edits that change the seat count are structural: the
    /// seats they add get fresh ids on every replica.
    #[must_use]
    pub fn is_structural(&self) -> bool {
        match self {
            Self::GenerateRows { .. } | Self::RecalculateRows { .. } | Self::AssignSeats { .. } | Self::ImportLayout { .. } => {
                true
            }
            Self::UpdateRow { fields, .. } => fields.seat_count.is_some(),
            Self::UpdateTable { fields, .. } => fields.seat_count.is_some(),
            _ => false,
        }
    }

    /// Short operation name for logs and notices.
    #[must_use]
    pub fn op(&self) -> &'static str {
        match self {
            Self::CreateSection { .. } => "create_section",
            Self::UpdateSection { .. } => "update_section",
            Self::MoveSection { .. } => "move_section",
            Self::DeleteSection { .. } => "delete_section",
            Self::CreateRow { .. } => "create_row",
            Self::MoveRow { .. } => "move_row",
            Self::DeleteRow { .. } => "delete_row",
            Self::MoveSeats { .. } => "move_seats",
            Self::PlaceSeats { .. } => "place_seats",
            Self::DeleteSeats { .. } => "delete_seats",
            Self::GenerateRows { .. } => "generate_rows",
            Self::RecalculateRows { .. } => "recalculate_rows",
            Self::AssignSeats { .. } => "assign_seats",
            Self::UpdateRow { .. } => "update_row",
            Self::UpdateTable { .. } => "update_table",
            Self::BlockSeats { .. } => "block_seats",
            Self::UnblockSeats { .. } => "unblock_seats",
            Self::UpdateBackground { .. } => "update_background",
            Self::ImportLayout { .. } => "import_layout",
        }
    }

    /// The section this request touches, when it names exactly one.
    #[must_use]
    pub fn section_id(&self) -> Option<SectionId> {
        match self {
            Self::CreateSection { section } => Some(section.id),
            Self::UpdateSection { id, .. } | Self::MoveSection { id, .. } | Self::DeleteSection { id } => Some(*id),
            Self::CreateRow { section_id, .. }
            | Self::MoveRow { section_id, .. }
            | Self::DeleteRow { section_id, .. }
            | Self::MoveSeats { section_id, .. }
            | Self::PlaceSeats { section_id, .. }
            | Self::GenerateRows { section_id, .. }
            | Self::RecalculateRows { section_id, .. }
            | Self::UpdateRow { section_id, .. }
            | Self::UpdateTable { section_id, .. } => Some(*section_id),
            Self::AssignSeats { target_section_id, .. } => Some(*target_section_id),
            Self::DeleteSeats { .. }
            | Self::BlockSeats { .. }
            | Self::UnblockSeats { .. }
            | Self::UpdateBackground { .. }
            | Self::ImportLayout { .. } => None,
        }
    }
}

fn unknown_section(id: SectionId) -> DesignerError {
    DesignerError::UnknownEntity { kind: "section", id }
}

fn unknown_row(id: RowId) -> DesignerError {
    DesignerError::UnknownEntity { kind: "row", id }
}

fn invalid(message: String) -> DesignerError {
    DesignerError::InvalidField(message)
}

/// Run `f` on every listed seat, after checking that all of them exist.
fn each_seat<F>(layout: &mut Layout, seat_ids: &[SeatId], f: F) -> Result<(), DesignerError>
where
    F: FnMut(&mut Seat),
{
    if let Some(&id) = seat_ids.iter().find(|id| layout.seat(id).is_none()) {
        return Err(DesignerError::UnknownEntity { kind: "seat", id });
    }
    layout
        .sections
        .iter_mut()
        .flat_map(|s| s.rows.iter_mut())
        .flat_map(|r| r.seats.iter_mut())
        .filter(|seat| seat_ids.contains(&seat.id))
        .for_each(f);
    Ok(())
}

fn seat_section(layout: &mut Layout, id: SectionId) -> Result<&mut Section, DesignerError> {
    let section = layout.section_mut(&id).ok_or_else(|| unknown_section(id))?;
    if !section.kind.accepts_seats() {
        return Err(DesignerError::StructuralConflict(section.kind));
    }
    Ok(section)
}

/// Apply a mutation to `layout`.
///
/// # Errors
///
/// [`DesignerError::UnknownEntity`] when the request names a section or row
/// that does not exist, [`DesignerError::StructuralConflict`] when rows are
/// added to a section that cannot hold seats, and whatever
/// [`SectionPatch::apply_to`], [`RowPatch::apply_to`],
/// [`TablePatch::apply_to`], [`layout::assign_seats`] or
/// [`Layout::validate`] report. The layout is unchanged on error.
pub fn apply(layout: &mut Layout, mutation: &Mutation) -> Result<(), DesignerError> {
    match mutation {
        Mutation::CreateSection { section } => {
            let mut section = section.clone();
            section.pose.rotation = normalize_rotation(section.pose.rotation);
            match layout.section_mut(&section.id) {
                Some(existing) => *existing = section,
                None => layout.sections.push(section),
            }
        }
        Mutation::UpdateSection { id, fields } => {
            let section = layout.section_mut(id).ok_or_else(|| unknown_section(*id))?;
            fields.apply_to(section)?;
        }
        Mutation::MoveSection { id, dx, dy } => {
            let section = layout.section_mut(id).ok_or_else(|| unknown_section(*id))?;
            section.pose.x += dx;
            section.pose.y += dy;
        }
        Mutation::DeleteSection { id } => {
            layout.remove_section(id).ok_or_else(|| unknown_section(*id))?;
        }
        Mutation::CreateRow { section_id, row } => {
            let section = seat_section(layout, *section_id)?;
            section.rows.push(row.clone());
            section.reflow_curve();
        }
        Mutation::MoveRow { section_id, row_id, dx, dy } => {
            let section = layout.section_mut(section_id).ok_or_else(|| unknown_section(*section_id))?;
            section.row_mut(row_id).ok_or_else(|| unknown_row(*row_id))?.translate(*dx, *dy);
            section.reflow_curve();
        }
        Mutation::DeleteRow { section_id, row_id } => {
            let section = layout.section_mut(section_id).ok_or_else(|| unknown_section(*section_id))?;
            let before = section.rows.len();
            section.rows.retain(|r| r.id != *row_id);
            if section.rows.len() == before {
                return Err(unknown_row(*row_id));
            }
        }
        Mutation::MoveSeats { section_id, seat_ids, dx, dy } => {
            let section = layout.section_mut(section_id).ok_or_else(|| unknown_section(*section_id))?;
            for seat in section.rows.iter_mut().flat_map(|r| r.seats.iter_mut()) {
                if seat_ids.contains(&seat.id) {
                    seat.translate(*dx, *dy);
                }
            }
            section.reflow_curve();
        }
        Mutation::PlaceSeats { section_id, placements } => {
            let section = layout.section_mut(section_id).ok_or_else(|| unknown_section(*section_id))?;
            for seat in section.rows.iter_mut().flat_map(|r| r.seats.iter_mut()) {
                if let Some(p) = placements.iter().find(|p| p.id == seat.id) {
                    seat.x = p.x;
                    seat.base_y = p.base_y;
                }
            }
            section.reflow_curve();
        }
        Mutation::DeleteSeats { seat_ids } => {
            layout::delete_seats(layout, seat_ids);
        }
        Mutation::GenerateRows { section_id, rows } => {
            let section = seat_section(layout, *section_id)?;
            section.rows.extend(rows.iter().cloned());
            section.reflow_curve();
        }
        Mutation::RecalculateRows { section_id, tolerance } => {
            let section = layout.section_mut(section_id).ok_or_else(|| unknown_section(*section_id))?;
            layout::recalculate_rows(section, *tolerance);
        }
        Mutation::AssignSeats { seat_ids, target_section_id, row_label } => {
            layout::assign_seats(layout, seat_ids, *target_section_id, row_label)?;
        }
        Mutation::UpdateRow { section_id, row_id, fields } => {
            let section = layout.section_mut(section_id).ok_or_else(|| unknown_section(*section_id))?;
            fields.apply_to(section, *row_id)?;
        }
        Mutation::UpdateTable { section_id, row_id, fields } => {
            let section = layout.section_mut(section_id).ok_or_else(|| unknown_section(*section_id))?;
            fields.apply_to(section, *row_id)?;
        }
        Mutation::BlockSeats { seat_ids, reason } => {
            each_seat(layout, seat_ids, |seat| seat.block(reason.as_deref()))?;
        }
        Mutation::UnblockSeats { seat_ids } => {
            each_seat(layout, seat_ids, Seat::unblock)?;
        }
        Mutation::UpdateBackground { background } => {
            layout.background = background.clone();
        }
        Mutation::ImportLayout { layout: incoming } => {
            incoming.validate()?;
            *layout = incoming.clone();
        }
    }
    Ok(())
}
