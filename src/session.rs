//! Editor session: one engine, one synchronizer, one operator.
//!
//! DESIGN
//! ======
//! The session feeds input events to the [`Engine`] and routes the actions it
//! returns. `Persist` goes to the [`Synchronizer`]; notices and property
//! editor requests are logged and kept for the host to show. Completions are
//! drained between events with [`Session::pump`], never awaited inline.
//!
//! A structural completion carries the authoritative layout, which replaces
//! the local copy. The engine re-applies the previous selection by id and
//! cancels any drag in progress, which surfaces as a notice.
//!
//! ERROR HANDLING
//! ==============
//! A failed request becomes a persistence-failure notice. Local state is not
//! rolled back and the request is not retried.

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

use designer::camera::Point;
use designer::doc::{Layout, RowId, SectionId};
use designer::engine::{Action, Engine, EngineCore, Notice};
use designer::input::{Button, DrawSettings, Key, WheelDelta};
use tracing::{error, info, warn};

use crate::script::{ScriptError, ScriptEvent};
use crate::services::persistence::{Completion, Synchronizer};

pub struct Session {
    engine: Engine,
    sync: Synchronizer,
    notices: Vec<Notice>,
    configure_requests: Vec<SectionId>,
}

impl Session {
    #[must_use]
    pub fn new(layout: Layout, settings: DrawSettings, sync: Synchronizer) -> Self {
        let engine = Engine::new(EngineCore::new(layout).with_settings(settings));
        Self { engine, sync, notices: Vec::new(), configure_requests: Vec::new() }
    }

    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.engine.core.layout
    }

    /// Every notice raised so far, oldest first.
    #[must_use]
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Sections the engine asked the host to open a property editor for.
    #[must_use]
    pub fn configure_requests(&self) -> &[SectionId] {
        &self.configure_requests
    }

    /// Route engine actions to their consumers.
    pub fn dispatch(&mut self, actions: Vec<Action>) {
        for action in actions {
            match action {
                Action::Persist(mutation) => {
                    self.sync.submit(mutation);
                }
                Action::Notify(notice) => {
                    warn!(kind = ?notice.kind, message = %notice.message, "operator notice");
                    self.notices.push(notice);
                }
                Action::ConfigureSection { id } => {
                    info!(section_id = %id, "section ready for configuration");
                    self.configure_requests.push(id);
                }
                Action::RenderNeeded => {}
            }
        }
    }

    /// Run one scripted event through the engine.
    ///
    /// # Errors
    ///
    /// [`ScriptError::UnknownSection`] or [`ScriptError::UnknownRow`] when
    /// the event names a section or row that does not exist; [`ScriptError::ShortPath`] for a drag with fewer than
    /// two points.
    pub fn handle(&mut self, event: &ScriptEvent) -> Result<(), ScriptError> {
        let engine = &mut self.engine;
        let actions = match event {
            ScriptEvent::PointerDown { x, y, button, modifiers } => {
                engine.on_pointer_down(Point::new(*x, *y), *button, *modifiers)
            }
            ScriptEvent::PointerMove { x, y, modifiers } => engine.on_pointer_move(Point::new(*x, *y), *modifiers),
            ScriptEvent::PointerUp { x, y, button, modifiers } => {
                engine.on_pointer_up(Point::new(*x, *y), *button, *modifiers)
            }
            ScriptEvent::Click { x, y, modifiers } => {
                let at = Point::new(*x, *y);
                let mut actions = engine.on_pointer_down(at, Button::Primary, *modifiers);
                actions.extend(engine.on_pointer_up(at, Button::Primary, *modifiers));
                actions
            }
            ScriptEvent::Drag { path, button, modifiers } => {
                let [first, rest @ ..] = path.as_slice() else {
                    return Err(ScriptError::ShortPath("drag"));
                };
                let Some(last) = rest.last() else {
                    return Err(ScriptError::ShortPath("drag"));
                };
                let mut actions = engine.on_pointer_down(*first, *button, *modifiers);
                for p in rest {
                    actions.extend(engine.on_pointer_move(*p, *modifiers));
                }
                actions.extend(engine.on_pointer_up(*last, *button, *modifiers));
                actions
            }
            ScriptEvent::Wheel { x, y, dx, dy, modifiers } => {
                engine.on_wheel(Point::new(*x, *y), WheelDelta { dx: *dx, dy: *dy }, *modifiers)
            }
            ScriptEvent::Key { key, modifiers } => engine.on_key_down(&Key::from_name(key), *modifiers),
            ScriptEvent::Mode { mode } => engine.set_mode(*mode),
            ScriptEvent::SelectSection { section } => {
                let id = section_named(engine, section)?;
                engine.apply(|core| core.select_section(id))
            }
            ScriptEvent::DeleteSeats => engine.apply(EngineCore::delete_selected_seats),
            ScriptEvent::AssignSeats { section, row } => {
                let target = section_named(engine, section)?;
                engine.apply(|core| core.assign_selected_seats(target, row))
            }
            ScriptEvent::RecalculateRows { section } => {
                let id = section.as_deref().map(|name| section_named(engine, name)).transpose()?;
                engine.apply(|core| core.recalculate_rows(id))
            }
            ScriptEvent::Curve { section, amount } => {
                let id = section_named(engine, section)?;
                engine.apply(|core| core.set_curve(id, *amount))
            }
            ScriptEvent::UpdateSection { section, fields } => {
                let id = section_named(engine, section)?;
                engine.apply(|core| core.update_section(id, fields.clone()))
            }
            ScriptEvent::AlignRows { alignment } => engine.apply(|core| core.align_selected_rows(*alignment)),
            ScriptEvent::SpaceRows { spacing } => engine.apply(|core| core.space_selected_rows(*spacing)),
            ScriptEvent::RespaceRows { spacing } => engine.apply(|core| core.respace_selected_rows(*spacing)),
            ScriptEvent::DeleteRows => engine.apply(EngineCore::delete_selected_rows),
            ScriptEvent::UpdateRow { section, row, fields } => {
                let (section_id, row_id) = row_labeled(engine, section, row)?;
                engine.apply(|core| core.update_row(section_id, row_id, fields.clone()))
            }
            ScriptEvent::UpdateTable { section, row, fields } => {
                let (section_id, row_id) = row_labeled(engine, section, row)?;
                engine.apply(|core| core.update_table(section_id, row_id, fields.clone()))
            }
            ScriptEvent::BlockSeats { reason } => engine.apply(|core| core.block_selected_seats(reason.as_deref())),
            ScriptEvent::UnblockSeats => engine.apply(EngineCore::unblock_selected_seats),
            ScriptEvent::Text { content } => {
                engine.core.tool.settings.text.clone_from(content);
                Vec::new()
            }
            ScriptEvent::TableSeats { count } => {
                engine.core.tool.settings.table_seats = *count;
                Vec::new()
            }
            ScriptEvent::Kind { kind } => {
                engine.core.tool.settings.section_kind = *kind;
                Vec::new()
            }
            ScriptEvent::Background { background } => engine.apply(|core| core.set_background(background.clone())),
        };
        self.dispatch(actions);
        Ok(())
    }

    /// Reconcile every completion that has already arrived. Returns how many.
    pub fn pump(&mut self) -> usize {
        let mut count = 0;
        while let Some(completion) = self.sync.try_completion() {
            self.reconcile(completion);
            count += 1;
        }
        count
    }

    /// Wait for every outstanding request and reconcile it.
    pub async fn settle(&mut self) {
        while let Some(completion) = self.sync.next_completion().await {
            self.reconcile(completion);
        }
    }

    fn reconcile(&mut self, completion: Completion) {
        match completion.result {
            Ok(Some(layout)) if completion.structural => {
                info!(seq = completion.seq, op = completion.op, "adopting authoritative layout");
                let actions = self.engine.replace_layout(layout);
                self.dispatch(actions);
            }
            Ok(_) => {}
            Err(e) => {
                error!(seq = completion.seq, op = completion.op, error = %e, "edit not persisted");
                self.notices.push(Notice::persistence_failure(completion.op, e));
            }
        }
    }
}

fn section_named(engine: &Engine, name: &str) -> Result<SectionId, ScriptError> {
    engine
        .core
        .layout
        .sections
        .iter()
        .find(|s| s.name == name)
        .map(|s| s.id)
        .ok_or_else(|| ScriptError::UnknownSection(name.to_string()))
}

fn row_labeled(engine: &Engine, section: &str, row: &str) -> Result<(SectionId, RowId), ScriptError> {
    let section_id = section_named(engine, section)?;
    engine
        .core
        .layout
        .section(&section_id)
        .and_then(|s| s.row_by_label(row))
        .map(|r| (section_id, r.id))
        .ok_or_else(|| ScriptError::UnknownRow { section: section.to_string(), row: row.to_string() })
}
