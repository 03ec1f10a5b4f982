//! Editor engine: dispatches pointer and keyboard input to the active edit
//! mode and turns committed edits into [`Action`]s for the host.
//!
//! DESIGN
//! ======
//! `EngineCore` owns the layout, camera, tool state, selection and geometry
//! cache and has no render target, so every interaction can be tested by
//! feeding it events. `Engine` wraps a core together with the [`Scene`] and
//! keeps the scene in step with the core's dirty set after every call.
//!
//! Each committed edit is one [`Mutation`], applied to the local layout
//! before it is returned as [`Action::Persist`]. Drags move the model live
//! and persist the cumulative delta once on release.
//!
//! ERROR HANDLING
//! ==============
//! Input handlers never fail. Degenerate geometry is discarded with a debug
//! log; missing selections and structural conflicts come back as
//! [`Action::Notify`] and no request is issued.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::camera::{Camera, Point, Rect};
use crate::consts::{
    HIT_SLOP_PX, LINE_BOX_PADDING, MAX_GRID_ROWS, MAX_ROW_SEATS, MIN_CIRCLE_RADIUS, MIN_LINE_LENGTH,
    MIN_RECT_SECTION_SIDE, NUDGE_STEP, NUDGE_STEP_LARGE, POLYGON_CLOSE_RADIUS_PX, TEXT_HEIGHT_FACTOR,
    TEXT_WIDTH_FACTOR, ZOOM_STEP,
};
use crate::doc::{Background, Font, Layout, Pose, RowId, SeatId, Section, SectionId, SectionKind, Shape};
use crate::error::DesignerError;
use crate::hit;
use crate::input::{
    snap_line, Button, DrawSettings, EditMode, GeometryCache, Gesture, Key, Modifiers, TempShape, ToolState,
    WheelDelta,
};
use crate::layout::{self, Alignment};
use crate::mutation::{self, Mutation, RowPatch, SeatPlacement, SectionPatch, TablePatch};
use crate::render::Scene;
use crate::selection::SelectionState;

// =============================================================
// Actions and notices
// =============================================================

/// Category of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    MissingSelection,
    StructuralConflict,
    Rejected,
    PersistenceFailure,
    /// A gesture was cancelled because the layout was reloaded under it.
    Interrupted,
}

/// A message for the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    /// Notice for a rejected edit; `None` for errors that are discarded silently.
    #[must_use]
    pub fn from_error(err: &DesignerError) -> Option<Self> {
        let kind = match err {
            DesignerError::InvalidGeometry(_) => return None,
            DesignerError::MissingSelection(_) => NoticeKind::MissingSelection,
            DesignerError::StructuralConflict(_) => NoticeKind::StructuralConflict,
            DesignerError::InvalidField(_)
            | DesignerError::UnknownEntity { .. }
            | DesignerError::Import(_)
            | DesignerError::Export(_) => NoticeKind::Rejected,
        };
        Some(Self { kind, message: err.to_string() })
    }

    #[must_use]
    pub fn persistence_failure(op: &str, message: impl std::fmt::Display) -> Self {
        Self { kind: NoticeKind::PersistenceFailure, message: format!("{op} was not saved: {message}") }
    }

    #[must_use]
    pub fn interrupted() -> Self {
        Self {
            kind: NoticeKind::Interrupted,
            message: "layout reloaded from the store; the edit in progress was cancelled".into(),
        }
    }
}

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Send this request to the store. Already applied locally.
    Persist(Mutation),
    /// Show a message to the operator.
    Notify(Notice),
    /// Open the property editor for a freshly drawn section.
    ConfigureSection { id: SectionId },
    RenderNeeded,
}

/// What changed since the scene was last synced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dirty {
    pub full: bool,
    pub sections: BTreeSet<SectionId>,
    pub selection: bool,
    pub draw: bool,
}

impl Dirty {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

// =============================================================
// EngineCore
// =============================================================

/// Core engine state: all logic that doesn't depend on a render target.
pub struct EngineCore {
    pub layout: Layout,
    pub camera: Camera,
    pub tool: ToolState,
    pub selection: SelectionState,
    pub cache: GeometryCache,
    dirty: Dirty,
}

impl EngineCore {
    #[must_use]
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            camera: Camera::default(),
            tool: ToolState::default(),
            selection: SelectionState::new(),
            cache: GeometryCache::default(),
            dirty: Dirty { full: true, ..Dirty::default() },
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: DrawSettings) -> Self {
        self.tool.settings = settings;
        self
    }

    /// Hand the accumulated dirty set to the renderer.
    pub fn take_dirty(&mut self) -> Dirty {
        std::mem::take(&mut self.dirty)
    }

    #[must_use]
    pub fn mode(&self) -> EditMode {
        self.tool.mode
    }

    /// Replace the model with an authoritative copy and re-apply the selection by id.
    ///
    /// A drag or drawing gesture in progress is cancelled and reported with
    /// an [`NoticeKind::Interrupted`] notice.
    pub fn replace_layout(&mut self, layout: Layout) -> Vec<Action> {
        let interrupted = !matches!(self.tool.gesture, Gesture::Idle | Gesture::Panning { .. });
        self.abort_gesture();
        self.layout = layout;
        self.selection.retain_existing(&self.layout);
        self.dirty.full = true;
        debug!(sections = self.layout.sections.len(), seats = self.layout.seat_count(), interrupted, "layout replaced");
        if !interrupted {
            return vec![Action::RenderNeeded];
        }
        self.clear_temp();
        vec![Action::Notify(Notice::interrupted()), Action::RenderNeeded]
    }

    fn slop(&self) -> f64 {
        self.camera.screen_dist_to_world(HIT_SLOP_PX)
    }

    fn mark_section(&mut self, id: SectionId) {
        self.dirty.sections.insert(id);
    }

    // --- Mode ---

    /// Switch edit mode, cancelling any in-progress gesture and shape.
    pub fn set_mode(&mut self, mode: EditMode) -> Vec<Action> {
        self.abort_gesture();
        self.cache.clear();
        self.dirty.draw = true;
        if self.tool.mode != mode {
            debug!(from = ?self.tool.mode, to = ?mode, "edit mode changed");
        }
        self.tool.mode = mode;
        vec![Action::RenderNeeded]
    }

    /// Undo live drag effects that were never persisted.
    fn abort_gesture(&mut self) {
        match std::mem::take(&mut self.tool.gesture) {
            Gesture::DraggingSection { id, orig_x, orig_y, .. } => {
                if let Some(section) = self.layout.section_mut(&id) {
                    section.pose.x = orig_x;
                    section.pose.y = orig_y;
                }
                self.mark_section(id);
            }
            Gesture::DraggingSeats { section_id, seat_ids, moved, .. } => {
                self.translate_seats(section_id, &seat_ids, -moved.0, -moved.1);
            }
            Gesture::DraggingRow { section_id, row_id, moved, .. } => {
                self.translate_row(section_id, row_id, -moved.0, -moved.1);
            }
            _ => {}
        }
    }

    // --- Commit ---

    fn commit(&mut self, mutation: Mutation) -> Vec<Action> {
        match mutation::apply(&mut self.layout, &mutation) {
            Ok(()) => self.committed(mutation),
            Err(err) => self.reject(&err),
        }
    }

    /// Emit a mutation whose effect is already in the local model.
    fn committed(&mut self, mutation: Mutation) -> Vec<Action> {
        match (&mutation, mutation.section_id()) {
            (Mutation::AssignSeats { .. }, _) | (_, None) => self.dirty.full = true,
            (_, Some(id)) => self.mark_section(id),
        }
        self.selection.retain_existing(&self.layout);
        self.dirty.selection = true;
        info!(op = mutation.op(), section_id = ?mutation.section_id(), structural = mutation.is_structural(), "edit committed");
        vec![Action::Persist(mutation), Action::RenderNeeded]
    }

    #[allow(clippy::unused_self)]
    fn reject(&self, err: &DesignerError) -> Vec<Action> {
        if let Some(notice) = Notice::from_error(err) {
            warn!(error = %err, "edit rejected");
            vec![Action::Notify(notice)]
        } else {
            debug!(error = %err, "edit discarded");
            Vec::new()
        }
    }

    // --- Live drag helpers ---

    fn translate_seats(&mut self, section_id: SectionId, seat_ids: &[SeatId], dx: f64, dy: f64) {
        if let Some(section) = self.layout.section_mut(&section_id) {
            for seat in section.rows.iter_mut().flat_map(|r| r.seats.iter_mut()) {
                if seat_ids.contains(&seat.id) {
                    seat.translate(dx, dy);
                }
            }
            section.reflow_curve();
        }
        self.mark_section(section_id);
    }

    fn translate_row(&mut self, section_id: SectionId, row_id: RowId, dx: f64, dy: f64) {
        if let Some(section) = self.layout.section_mut(&section_id) {
            if let Some(row) = section.row_mut(&row_id) {
                row.translate(dx, dy);
            }
            section.reflow_curve();
        }
        self.mark_section(section_id);
    }

    fn local_delta(&self, section_id: SectionId, from: Point, to: Point) -> (f64, f64) {
        self.layout
            .section(&section_id)
            .map_or((0.0, 0.0), |s| s.delta_to_local(to.x - from.x, to.y - from.y))
    }

    // =========================================================
    // Pointer input
    // =========================================================

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        let world = self.camera.screen_to_world(screen_pt);
        match button {
            Button::Middle => {
                self.tool.gesture = Gesture::Panning { last_screen: screen_pt };
                return Vec::new();
            }
            Button::Secondary => return Vec::new(),
            Button::Primary => {}
        }

        match self.tool.mode {
            EditMode::Select => self.select_down(screen_pt, world),
            EditMode::SelectSeats => self.select_seats_down(world, modifiers),
            EditMode::MultiSelect => self.multi_select_down(world, modifiers),
            EditMode::DrawPolygon => self.polygon_click(screen_pt, world),
            EditMode::DrawLine => {
                self.tool.gesture = Gesture::DrawingLine { anchor_world: world };
                self.preview(TempShape::Line { from: world, to: world })
            }
            EditMode::DrawCircle => {
                self.tool.gesture = Gesture::DrawingCircle { center_world: world };
                self.preview(TempShape::Circle { center: world, radius: 0.0 })
            }
            EditMode::DrawRectSection => {
                self.tool.gesture = Gesture::DrawingRect { anchor_world: world };
                self.preview(TempShape::Rect(Rect::from_corners(world, world)))
            }
            EditMode::DrawText => self.place_text(world),
            EditMode::DrawSingleRow | EditMode::DrawMultiRow => match self.seat_section(world) {
                Ok(section_id) => {
                    self.tool.gesture = if self.tool.mode == EditMode::DrawSingleRow {
                        Gesture::DrawingRow { section_id, anchor_world: world }
                    } else {
                        Gesture::DrawingGrid { section_id, anchor_world: world }
                    };
                    Vec::new()
                }
                Err(err) => self.reject(&err),
            },
            EditMode::DrawRoundTable | EditMode::DrawRectTable => self.place_table(world),
        }
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, modifiers: Modifiers) -> Vec<Action> {
        let world = self.camera.screen_to_world(screen_pt);
        let gesture = std::mem::take(&mut self.tool.gesture);
        let (next, actions) = match gesture {
            Gesture::Idle => {
                let actions = self.hover(world);
                (Gesture::Idle, actions)
            }
            Gesture::Panning { last_screen } => {
                self.camera.pan_by(screen_pt.x - last_screen.x, screen_pt.y - last_screen.y);
                (Gesture::Panning { last_screen: screen_pt }, vec![Action::RenderNeeded])
            }
            Gesture::DraggingSection { id, start_world, orig_x, orig_y } => {
                if let Some(section) = self.layout.section_mut(&id) {
                    section.pose.x = orig_x + (world.x - start_world.x);
                    section.pose.y = orig_y + (world.y - start_world.y);
                }
                self.mark_section(id);
                (Gesture::DraggingSection { id, start_world, orig_x, orig_y }, vec![Action::RenderNeeded])
            }
            Gesture::DraggingSeats { section_id, seat_ids, last_world, moved, collapse_to } => {
                let (dx, dy) = self.local_delta(section_id, last_world, world);
                self.translate_seats(section_id, &seat_ids, dx, dy);
                let moved = (moved.0 + dx, moved.1 + dy);
                let next = Gesture::DraggingSeats { section_id, seat_ids, last_world: world, moved, collapse_to };
                (next, vec![Action::RenderNeeded])
            }
            Gesture::DraggingRow { section_id, row_id, last_world, moved } => {
                let (dx, dy) = self.local_delta(section_id, last_world, world);
                self.translate_row(section_id, row_id, dx, dy);
                let moved = (moved.0 + dx, moved.1 + dy);
                (Gesture::DraggingRow { section_id, row_id, last_world: world, moved }, vec![Action::RenderNeeded])
            }
            Gesture::Marquee { anchor_world } => {
                let actions = self.preview(TempShape::Marquee(Rect::from_corners(anchor_world, world)));
                (Gesture::Marquee { anchor_world }, actions)
            }
            Gesture::DrawingRect { anchor_world } => {
                let actions = self.preview(TempShape::Rect(Rect::from_corners(anchor_world, world)));
                (Gesture::DrawingRect { anchor_world }, actions)
            }
            Gesture::DrawingLine { anchor_world } => {
                let to = if modifiers.shift { snap_line(anchor_world, world) } else { world };
                let actions = self.preview(TempShape::Line { from: anchor_world, to });
                (Gesture::DrawingLine { anchor_world }, actions)
            }
            Gesture::DrawingCircle { center_world } => {
                let radius = center_world.distance(world);
                let actions = self.preview(TempShape::Circle { center: center_world, radius });
                (Gesture::DrawingCircle { center_world }, actions)
            }
            Gesture::DrawingRow { section_id, anchor_world } => {
                let centers = self
                    .row_seats(section_id, anchor_world, world)
                    .map(|(section, seats)| seats.iter().map(|s| section.to_world(s.position())).collect())
                    .unwrap_or_default();
                let actions = self.preview(TempShape::Seats { centers, size: self.preview_seat_size(section_id) });
                (Gesture::DrawingRow { section_id, anchor_world }, actions)
            }
            Gesture::DrawingGrid { section_id, anchor_world } => {
                let centers = self
                    .grid_seats(section_id, anchor_world, world)
                    .map(|(section, rows)| {
                        rows.iter().flatten().map(|s| section.to_world(s.position())).collect()
                    })
                    .unwrap_or_default();
                let actions = self.preview(TempShape::Seats { centers, size: self.preview_seat_size(section_id) });
                (Gesture::DrawingGrid { section_id, anchor_world }, actions)
            }
        };
        self.tool.gesture = next;
        actions
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point, _button: Button, modifiers: Modifiers) -> Vec<Action> {
        let world = self.camera.screen_to_world(screen_pt);
        match std::mem::take(&mut self.tool.gesture) {
            Gesture::Idle | Gesture::Panning { .. } => Vec::new(),
            Gesture::DraggingSection { id, orig_x, orig_y, .. } => {
                let Some(section) = self.layout.section(&id) else {
                    return Vec::new();
                };
                let (x, y) = (section.pose.x, section.pose.y);
                if x == orig_x && y == orig_y {
                    return Vec::new();
                }
                self.committed(Mutation::UpdateSection { id, fields: SectionPatch::position(x, y) })
            }
            Gesture::DraggingSeats { section_id, seat_ids, moved, collapse_to, .. } => {
                if moved == (0.0, 0.0) {
                    let Some(seat_id) = collapse_to else {
                        return Vec::new();
                    };
                    self.selection.click_seat(seat_id, false);
                    self.dirty.selection = true;
                    return vec![Action::RenderNeeded];
                }
                self.committed(Mutation::MoveSeats { section_id, seat_ids, dx: moved.0, dy: moved.1 })
            }
            Gesture::DraggingRow { section_id, row_id, moved, .. } => {
                if moved == (0.0, 0.0) {
                    return Vec::new();
                }
                self.committed(Mutation::MoveRow { section_id, row_id, dx: moved.0, dy: moved.1 })
            }
            Gesture::Marquee { anchor_world } => {
                self.clear_temp();
                let rect = Rect::from_corners(anchor_world, world);
                if self.tool.mode == EditMode::MultiSelect {
                    let rows = hit::rows_in_rect(&self.layout, &rect);
                    self.selection.select_rows(rows, modifiers.shift);
                } else {
                    let seats = hit::seats_in_rect(&self.layout, &rect);
                    self.selection.select_seats(seats, modifiers.shift);
                }
                self.dirty.selection = true;
                debug!(seats = self.selection.seats.len(), rows = self.selection.rows.len(), "box selection");
                vec![Action::RenderNeeded]
            }
            Gesture::DrawingRect { anchor_world } => {
                self.clear_temp();
                let rect = Rect::from_corners(anchor_world, world);
                let result = rect_section(rect, self.new_section_name(), self.tool.settings.section_kind);
                self.commit_section(result, false)
            }
            Gesture::DrawingLine { anchor_world } => {
                self.clear_temp();
                let to = if modifiers.shift { snap_line(anchor_world, world) } else { world };
                self.commit_section(line_section(anchor_world, to), false)
            }
            Gesture::DrawingCircle { center_world } => {
                self.clear_temp();
                self.commit_section(circle_section(center_world, center_world.distance(world)), false)
            }
            Gesture::DrawingRow { section_id, anchor_world } => {
                self.clear_temp();
                let Some((section, seats)) = self.row_seats(section_id, anchor_world, world) else {
                    return Vec::new();
                };
                if seats.is_empty() {
                    return self.reject(&DesignerError::InvalidGeometry("row shorter than one seat".into()));
                }
                let row = layout::build_row(section, seats, None, &[]);
                self.commit(Mutation::CreateRow { section_id, row })
            }
            Gesture::DrawingGrid { section_id, anchor_world } => {
                self.clear_temp();
                let Some((section, grid)) = self.grid_seats(section_id, anchor_world, world) else {
                    return Vec::new();
                };
                let mut taken = Vec::new();
                let mut rows = Vec::new();
                for seats in grid.into_iter().filter(|r| !r.is_empty()) {
                    let row = layout::build_row(section, seats, None, &taken);
                    taken.push(row.label.clone());
                    rows.push(row);
                }
                if rows.is_empty() {
                    return self.reject(&DesignerError::InvalidGeometry("block smaller than one seat".into()));
                }
                self.commit(Mutation::GenerateRows { section_id, rows })
            }
        }
    }

    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, _modifiers: Modifiers) -> Vec<Action> {
        if delta.dy == 0.0 {
            return Vec::new();
        }
        let factor = if delta.dy < 0.0 { ZOOM_STEP } else { 1.0 / ZOOM_STEP };
        self.camera.zoom_at(screen_pt, factor);
        vec![Action::RenderNeeded]
    }

    // --- Pointer helpers ---

    fn preview(&mut self, shape: TempShape) -> Vec<Action> {
        self.cache.temp = Some(shape);
        self.dirty.draw = true;
        vec![Action::RenderNeeded]
    }

    fn clear_temp(&mut self) {
        self.cache.temp = None;
        self.dirty.draw = true;
    }

    fn hover(&mut self, world: Point) -> Vec<Action> {
        if self.tool.mode != EditMode::DrawPolygon || self.cache.polygon.is_empty() {
            return Vec::new();
        }
        let mut points = self.cache.polygon.clone();
        points.push(world);
        self.preview(TempShape::Polyline(points))
    }

    fn select_down(&mut self, screen_pt: Point, world: Point) -> Vec<Action> {
        let previous = self.selection.active_section;
        let hit = hit::hit_section(&self.layout, world, self.slop());
        self.selection.active_section = hit;
        if previous != hit {
            self.dirty.selection = true;
        }
        match hit.and_then(|id| self.layout.section(&id)) {
            Some(section) => {
                self.tool.gesture = Gesture::DraggingSection {
                    id: section.id,
                    start_world: world,
                    orig_x: section.pose.x,
                    orig_y: section.pose.y,
                };
            }
            None => self.tool.gesture = Gesture::Panning { last_screen: screen_pt },
        }
        vec![Action::RenderNeeded]
    }

    fn select_seats_down(&mut self, world: Point, modifiers: Modifiers) -> Vec<Action> {
        let Some(hit) = hit::hit_seat(&self.layout, world, self.slop()) else {
            self.tool.gesture = Gesture::Marquee { anchor_world: world };
            return Vec::new();
        };
        self.selection.active_section = Some(hit.section_id);
        self.dirty.selection = true;

        if modifiers.command() {
            let row_seats: Vec<SeatId> = self
                .layout
                .section(&hit.section_id)
                .and_then(|s| s.row(&hit.row_id))
                .map(|r| r.seats.iter().map(|s| s.id).collect())
                .unwrap_or_default();
            self.selection.select_seats(row_seats, modifiers.shift);
            self.tool.gesture =
                Gesture::DraggingRow { section_id: hit.section_id, row_id: hit.row_id, last_world: world, moved: (0.0, 0.0) };
            return vec![Action::RenderNeeded];
        }

        let already = self.selection.seats.contains(&hit.seat_id);
        if !already || modifiers.shift {
            self.selection.click_seat(hit.seat_id, modifiers.shift);
        }
        let collapse_to = (already && !modifiers.shift && self.selection.seats.len() > 1).then_some(hit.seat_id);
        if self.selection.seats.contains(&hit.seat_id) {
            let seat_ids: Vec<SeatId> = self
                .selection
                .seats
                .iter()
                .filter(|id| self.layout.locate_seat(id).is_some_and(|l| l.section_id == hit.section_id))
                .copied()
                .collect();
            self.tool.gesture = Gesture::DraggingSeats {
                section_id: hit.section_id,
                seat_ids,
                last_world: world,
                moved: (0.0, 0.0),
                collapse_to,
            };
        }
        vec![Action::RenderNeeded]
    }

    fn multi_select_down(&mut self, world: Point, modifiers: Modifiers) -> Vec<Action> {
        match hit::hit_seat(&self.layout, world, self.slop()) {
            Some(hit) => {
                self.selection.click_row(hit.section_id, hit.row_id, modifiers.shift);
                self.selection.active_section = Some(hit.section_id);
                self.dirty.selection = true;
                vec![Action::RenderNeeded]
            }
            None => {
                self.tool.gesture = Gesture::Marquee { anchor_world: world };
                Vec::new()
            }
        }
    }

    fn polygon_click(&mut self, screen_pt: Point, world: Point) -> Vec<Action> {
        let closes = self.cache.polygon.len() >= 3
            && self
                .cache
                .polygon
                .first()
                .is_some_and(|first| self.camera.world_to_screen(*first).distance(screen_pt) <= POLYGON_CLOSE_RADIUS_PX);
        if closes {
            return self.close_polygon();
        }
        self.cache.polygon.push(world);
        let points = self.cache.polygon.clone();
        self.preview(TempShape::Polyline(points))
    }

    fn close_polygon(&mut self) -> Vec<Action> {
        let vertices = std::mem::take(&mut self.cache.polygon);
        self.clear_temp();
        let result = polygon_section(&vertices, self.new_section_name(), self.tool.settings.section_kind);
        self.commit_section(result, true)
    }

    fn place_text(&mut self, world: Point) -> Vec<Action> {
        let font = Font::default();
        let content = self.tool.settings.text.clone();
        let chars = content.chars().count().max(1);
        #[allow(clippy::cast_precision_loss)]
        let width = chars as f64 * font.size * TEXT_WIDTH_FACTOR;
        let height = font.size * TEXT_HEIGHT_FACTOR;
        let rect = Rect::new(world.x - width / 2.0, world.y - height / 2.0, width, height);
        let section = Section::new(content.clone(), SectionKind::Decorative, Pose::from_rect(rect), Shape::Text { content, font });
        self.commit_section(Ok(section), true)
    }

    fn place_table(&mut self, world: Point) -> Vec<Action> {
        let section_id = match self.seat_section(world) {
            Ok(id) => id,
            Err(err) => return self.reject(&err),
        };
        let Some(section) = self.layout.section(&section_id) else {
            return Vec::new();
        };
        let settings = &self.tool.settings;
        let center = section.to_local(world);
        let (table, seats) = if self.tool.mode == EditMode::DrawRoundTable {
            layout::generate_round_table(center, settings.table_seats, settings.seat_size)
        } else {
            layout::generate_rect_table(center, settings.table_seats, settings.seat_size)
        };
        let row = layout::build_row(section, seats, Some(table), &[]);
        self.commit(Mutation::CreateRow { section_id, row })
    }

    fn commit_section(&mut self, result: Result<Section, DesignerError>, configure: bool) -> Vec<Action> {
        let mut section = match result {
            Ok(section) => section,
            Err(err) => return self.reject(&err),
        };
        section.style.seat_size = self.tool.settings.seat_size;
        let id = section.id;
        let mut actions = self.commit(Mutation::CreateSection { section });
        self.selection.active_section = Some(id);
        if configure {
            actions.push(Action::ConfigureSection { id });
        }
        actions
    }

    fn new_section_name(&self) -> String {
        format!("Section {}", self.layout.sections.len() + 1)
    }

    /// Standard section under `world`, or the reason seats cannot go there.
    fn seat_section(&self, world: Point) -> Result<SectionId, DesignerError> {
        if let Some(id) = hit::seat_section_at(&self.layout, world) {
            return Ok(id);
        }
        match hit::hit_section(&self.layout, world, 0.0).and_then(|id| self.layout.section(&id)) {
            Some(section) => Err(DesignerError::StructuralConflict(section.kind)),
            None => Err(DesignerError::MissingSelection("press inside a seating section")),
        }
    }

    fn preview_seat_size(&self, section_id: SectionId) -> f64 {
        let scale = self.layout.section(&section_id).map_or(1.0, |s| s.pose.scale);
        self.tool.settings.seat_size * scale
    }

    /// Seats for a row dragged from `from` to `to`, at most [`MAX_ROW_SEATS`].
    fn row_seats(&self, section_id: SectionId, from: Point, to: Point) -> Option<(&Section, Vec<crate::doc::Seat>)> {
        let section = self.layout.section(&section_id)?;
        let s = &self.tool.settings;
        let start = section.to_local(from);
        let end = layout::clamp_run(start, section.to_local(to), s.seat_size + s.seat_spacing, MAX_ROW_SEATS);
        Some((section, layout::generate_linear_row(start, end, s.seat_size, s.seat_spacing)))
    }

    /// Seats for a block spanning `from`..`to`, at most [`MAX_GRID_ROWS`] rows
    /// of [`MAX_ROW_SEATS`].
    fn grid_seats(&self, section_id: SectionId, from: Point, to: Point) -> Option<(&Section, Vec<Vec<crate::doc::Seat>>)> {
        let section = self.layout.section(&section_id)?;
        let s = &self.tool.settings;
        let rect = layout::clamp_block(
            Rect::from_corners(section.to_local(from), section.to_local(to)),
            (s.seat_size + s.seat_spacing, MAX_ROW_SEATS),
            (s.seat_size + s.row_spacing, MAX_GRID_ROWS),
        );
        Some((section, layout::generate_grid(rect, s.seat_size, s.seat_spacing, s.row_spacing)))
    }

    // =========================================================
    // Keyboard input
    // =========================================================

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        match key {
            Key::Escape => self.set_mode(EditMode::Select),
            Key::Delete | Key::Backspace => self.delete_selection(),
            Key::Enter => {
                if self.tool.mode == EditMode::DrawPolygon && self.cache.polygon.len() >= 3 {
                    self.close_polygon()
                } else {
                    Vec::new()
                }
            }
            Key::ArrowUp | Key::ArrowDown | Key::ArrowLeft | Key::ArrowRight => {
                let (Some((ux, uy)), Some(id)) = (key.arrow_direction(), self.selection.active_section) else {
                    return Vec::new();
                };
                let step = if modifiers.shift { NUDGE_STEP_LARGE } else { NUDGE_STEP };
                self.commit(Mutation::MoveSection { id, dx: ux * step, dy: uy * step })
            }
            Key::Other(_) => Vec::new(),
        }
    }

    /// Delete selected seats if any, else selected rows, else the active section.
    pub fn delete_selection(&mut self) -> Vec<Action> {
        if !self.selection.seats.is_empty() {
            return self.delete_selected_seats();
        }
        if !self.selection.rows.is_empty() {
            return self.delete_selected_rows();
        }
        match self.selection.active_section {
            Some(id) => {
                self.selection.active_section = None;
                self.commit(Mutation::DeleteSection { id })
            }
            None => self.reject(&DesignerError::MissingSelection("nothing to delete")),
        }
    }

    /// Make `id` the active section, as a click on it would.
    pub fn select_section(&mut self, id: SectionId) -> Vec<Action> {
        if self.layout.section(&id).is_none() {
            return self.reject(&DesignerError::UnknownEntity { kind: "section", id });
        }
        self.selection.active_section = Some(id);
        self.dirty.selection = true;
        vec![Action::RenderNeeded]
    }

    // =========================================================
    // Bulk operations
    // =========================================================

    pub fn delete_selected_seats(&mut self) -> Vec<Action> {
        if self.selection.seats.is_empty() {
            return self.reject(&DesignerError::MissingSelection("no seats selected"));
        }
        let seat_ids = self.selection.seat_ids();
        self.selection.seats.clear();
        self.commit(Mutation::DeleteSeats { seat_ids })
    }

    /// Move the selected seats into `row_label` of `target`.
    pub fn assign_selected_seats(&mut self, target: SectionId, row_label: &str) -> Vec<Action> {
        if self.selection.seats.is_empty() {
            return self.reject(&DesignerError::MissingSelection("no seats selected"));
        }
        let seat_ids = self.selection.seat_ids();
        self.commit(Mutation::AssignSeats { seat_ids, target_section_id: target, row_label: row_label.to_string() })
    }

    /// Re-cluster the rows of `section_id`, or of the active section.
    pub fn recalculate_rows(&mut self, section_id: Option<SectionId>) -> Vec<Action> {
        let Some(section_id) = section_id.or(self.selection.active_section) else {
            return self.reject(&DesignerError::MissingSelection("no section selected"));
        };
        let tolerance = self.tool.settings.row_tolerance;
        self.commit(Mutation::RecalculateRows { section_id, tolerance })
    }

    pub fn set_curve(&mut self, section_id: SectionId, amount: f64) -> Vec<Action> {
        self.update_section(section_id, SectionPatch { curve_amount: Some(amount), ..SectionPatch::default() })
    }

    pub fn update_section(&mut self, id: SectionId, fields: SectionPatch) -> Vec<Action> {
        if fields.is_empty() {
            return Vec::new();
        }
        self.commit(Mutation::UpdateSection { id, fields })
    }

    pub fn update_row(&mut self, section_id: SectionId, row_id: RowId, fields: RowPatch) -> Vec<Action> {
        if fields.is_empty() {
            return Vec::new();
        }
        self.commit(Mutation::UpdateRow { section_id, row_id, fields })
    }

    pub fn update_table(&mut self, section_id: SectionId, row_id: RowId, fields: TablePatch) -> Vec<Action> {
        if fields.is_empty() {
            return Vec::new();
        }
        self.commit(Mutation::UpdateTable { section_id, row_id, fields })
    }

    /// Hold the selected seats back from sale and clear the seat selection.
    pub fn block_selected_seats(&mut self, reason: Option<&str>) -> Vec<Action> {
        if self.selection.seats.is_empty() {
            return self.reject(&DesignerError::MissingSelection("no seats selected"));
        }
        let seat_ids = self.selection.seat_ids();
        self.selection.seats.clear();
        self.commit(Mutation::BlockSeats { seat_ids, reason: reason.map(str::to_string) })
    }

    /// Release the selected seats and clear the seat selection.
    pub fn unblock_selected_seats(&mut self) -> Vec<Action> {
        if self.selection.seats.is_empty() {
            return self.reject(&DesignerError::MissingSelection("no seats selected"));
        }
        let seat_ids = self.selection.seat_ids();
        self.selection.seats.clear();
        self.commit(Mutation::UnblockSeats { seat_ids })
    }

    pub fn set_background(&mut self, background: Background) -> Vec<Action> {
        self.commit(Mutation::UpdateBackground { background })
    }

    pub fn import_layout(&mut self, layout: Layout) -> Vec<Action> {
        self.commit(Mutation::ImportLayout { layout })
    }

    pub fn delete_selected_rows(&mut self) -> Vec<Action> {
        let groups = self.selection.rows_by_section();
        if groups.is_empty() {
            return self.reject(&DesignerError::MissingSelection("no rows selected"));
        }
        self.selection.rows.clear();
        let mut actions = Vec::new();
        for (section_id, row_ids) in groups {
            for row_id in row_ids {
                actions.extend(self.commit(Mutation::DeleteRow { section_id, row_id }));
            }
        }
        actions
    }

    pub fn align_selected_rows(&mut self, alignment: Alignment) -> Vec<Action> {
        self.move_selected_rows(|section, ids| layout::align_rows(section, ids, alignment))
    }

    pub fn space_selected_rows(&mut self, spacing: f64) -> Vec<Action> {
        self.move_selected_rows(|section, ids| layout::space_rows(section, ids, spacing))
    }

    /// Run a row tool on a scratch copy of each section and persist the
    /// resulting per-row displacement as one `MoveRow` per row.
    fn move_selected_rows<F>(&mut self, tool: F) -> Vec<Action>
    where
        F: Fn(&mut Section, &[RowId]),
    {
        let groups = self.selection.rows_by_section();
        if groups.is_empty() {
            return self.reject(&DesignerError::MissingSelection("no rows selected"));
        }
        let mut actions = Vec::new();
        for (section_id, row_ids) in groups {
            let Some(before) = self.layout.section(&section_id) else {
                continue;
            };
            let mut after = before.clone();
            tool(&mut after, &row_ids);
            let moves: Vec<(RowId, f64, f64)> = row_ids
                .iter()
                .filter_map(|id| {
                    let (old, new) = (before.row(id)?, after.row(id)?);
                    let dx = match (old.seats.first(), new.seats.first()) {
                        (Some(a), Some(b)) => b.x - a.x,
                        _ => 0.0,
                    };
                    Some((*id, dx, new.y - old.y))
                })
                .filter(|&(_, dx, dy)| dx != 0.0 || dy != 0.0)
                .collect();
            for (row_id, dx, dy) in moves {
                actions.extend(self.commit(Mutation::MoveRow { section_id, row_id, dx, dy }));
            }
        }
        actions
    }

    /// Respace the seats of every selected row; one `PlaceSeats` per section.
    pub fn respace_selected_rows(&mut self, spacing: f64) -> Vec<Action> {
        let groups = self.selection.rows_by_section();
        if groups.is_empty() {
            return self.reject(&DesignerError::MissingSelection("no rows selected"));
        }
        let mut actions = Vec::new();
        for (section_id, row_ids) in groups {
            let Some(section) = self.layout.section(&section_id) else {
                continue;
            };
            let mut placements = Vec::new();
            for row in section.rows.iter().filter(|r| row_ids.contains(&r.id)) {
                let mut row = row.clone();
                layout::respace_seats(&mut row, section.style.seat_size, spacing);
                placements.extend(row.seats.iter().map(|s| SeatPlacement { id: s.id, x: s.x, base_y: s.base_y }));
            }
            if !placements.is_empty() {
                actions.extend(self.commit(Mutation::PlaceSeats { section_id, placements }));
            }
        }
        actions
    }
}

// =============================================================
// Drawn section builders
// =============================================================

fn rect_section(rect: Rect, name: String, kind: SectionKind) -> Result<Section, DesignerError> {
    if rect.width <= MIN_RECT_SECTION_SIDE || rect.height <= MIN_RECT_SECTION_SIDE {
        return Err(DesignerError::InvalidGeometry(format!("rectangle {}x{} too small", rect.width, rect.height)));
    }
    Ok(Section::new(name, kind, Pose::from_rect(rect), Shape::Rectangle))
}

fn polygon_section(vertices: &[Point], name: String, kind: SectionKind) -> Result<Section, DesignerError> {
    if vertices.len() < 3 {
        return Err(DesignerError::InvalidGeometry("polygon needs at least three vertices".into()));
    }
    let bounds = Rect::bounding(vertices.iter().copied())
        .filter(|b| !b.is_empty())
        .ok_or_else(|| DesignerError::InvalidGeometry("polygon has no area".into()))?;
    let points = vertices.iter().map(|p| Point::new(p.x - bounds.x, p.y - bounds.y)).collect();
    Ok(Section::new(name, kind, Pose::from_rect(bounds), Shape::Polygon { points }))
}

fn line_section(from: Point, to: Point) -> Result<Section, DesignerError> {
    if from.distance(to) < MIN_LINE_LENGTH {
        return Err(DesignerError::InvalidGeometry("line too short".into()));
    }
    let b = Rect::from_corners(from, to);
    let pad = LINE_BOX_PADDING;
    let bounds = Rect::new(b.x - pad, b.y - pad, b.width + 2.0 * pad, b.height + 2.0 * pad);
    let points = [from, to].iter().map(|p| Point::new(p.x - bounds.x, p.y - bounds.y)).collect();
    Ok(Section::new("Line", SectionKind::Decorative, Pose::from_rect(bounds), Shape::Line { points }))
}

fn circle_section(center: Point, radius: f64) -> Result<Section, DesignerError> {
    if radius < MIN_CIRCLE_RADIUS {
        return Err(DesignerError::InvalidGeometry("circle too small".into()));
    }
    let bounds = Rect::around(center, radius * 2.0);
    Ok(Section::new("Circle", SectionKind::Decorative, Pose::from_rect(bounds), Shape::Circle { radius }))
}

// =============================================================
// Engine
// =============================================================

/// The full engine: an [`EngineCore`] plus the scene it renders into.
///
/// Built in two phases: the core first (pure), then the engine once a render
/// target exists. Every delegated call re-syncs the scene.
pub struct Engine {
    pub core: EngineCore,
    scene: Scene,
}

impl Engine {
    #[must_use]
    pub fn new(core: EngineCore) -> Self {
        let mut engine = Self { core, scene: Scene::new() };
        engine.sync();
        engine
    }

    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Bring the scene up to date with the core's dirty set.
    pub fn sync(&mut self) {
        let dirty = self.core.take_dirty();
        if dirty.is_clean() {
            return;
        }
        let core = &self.core;
        if dirty.full {
            self.scene.rebuild(&core.layout, &core.selection);
            self.scene.set_draw_layer(&core.cache);
            return;
        }
        for id in &dirty.sections {
            self.scene.sync_section(&core.layout, *id, &core.selection);
        }
        if dirty.selection {
            self.scene.update_selection(&core.layout, &core.selection);
        }
        if dirty.draw {
            self.scene.set_draw_layer(&core.cache);
        }
    }

    fn synced(&mut self, actions: Vec<Action>) -> Vec<Action> {
        self.sync();
        actions
    }

    pub fn replace_layout(&mut self, layout: Layout) -> Vec<Action> {
        let actions = self.core.replace_layout(layout);
        self.synced(actions)
    }

    pub fn set_mode(&mut self, mode: EditMode) -> Vec<Action> {
        let actions = self.core.set_mode(mode);
        self.synced(actions)
    }

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        let actions = self.core.on_pointer_down(screen_pt, button, modifiers);
        self.synced(actions)
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, modifiers: Modifiers) -> Vec<Action> {
        let actions = self.core.on_pointer_move(screen_pt, modifiers);
        self.synced(actions)
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        let actions = self.core.on_pointer_up(screen_pt, button, modifiers);
        self.synced(actions)
    }

    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        let actions = self.core.on_wheel(screen_pt, delta, modifiers);
        self.synced(actions)
    }

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        let actions = self.core.on_key_down(key, modifiers);
        self.synced(actions)
    }

    /// Run a bulk operation on the core and re-sync the scene.
    pub fn apply<F>(&mut self, op: F) -> Vec<Action>
    where
        F: FnOnce(&mut EngineCore) -> Vec<Action>,
    {
        let actions = op(&mut self.core);
        self.synced(actions)
    }
}
