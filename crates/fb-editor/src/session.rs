//! Editor session: the form schema container and its lifecycle.
//!
//! Owns the sync engine, the canvas engine and the undo history, and talks
//! to the [`FormStore`]. Store failures never escape as errors; they become a
//! dismissible [`Notice`] and the in-session edits stay intact.

use crate::canvas::CanvasEngine;
use crate::commands::CommandStack;
use crate::input::{CanvasEvent, DragItem, Point};
use crate::palette;
use crate::persistence::{FormStore, SaveMode, StoreError};
use crate::properties::PropertiesPanel;
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::sync::{FieldMutation, SyncEngine};
use fb_core::id::{FieldId, FormId};
use fb_core::layout::{CanvasLayout, CanvasMetrics, ViewMode};
use fb_core::lint::{LintDiagnostic, lint_schema};
use fb_core::model::{DEFAULT_TITLE, FieldInstance, FieldPatch, FormSchema};
use fb_core::registry::UnknownFieldType;
use fb_render::runtime::FillSession;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

// ─── Configuration ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    pub view_mode: ViewMode,
    /// Maximum undo depth.
    pub undo_depth: usize,
    /// Title of a fresh, never-saved form.
    pub default_title: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            view_mode: ViewMode::Desktop,
            undo_depth: 100,
            default_title: DEFAULT_TITLE.to_string(),
        }
    }
}

// ─── Notices ─────────────────────────────────────────────────────────────

/// A user-visible failure report. Stays until dismissed or replaced.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    FormNotFound(FormId),
    LoadFailed(String),
    SaveFailed(String),
    DeleteFailed(String),
    /// Preview needs a stored form to point at.
    PreviewNeedsSave,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FormNotFound(id) => write!(f, "Form {id} was not found"),
            Self::LoadFailed(msg) => write!(f, "Could not load the form: {msg}"),
            Self::SaveFailed(msg) => write!(f, "Could not save the form: {msg}"),
            Self::DeleteFailed(msg) => write!(f, "Could not delete the form: {msg}"),
            Self::PreviewNeedsSave => f.write_str("Please save the form first"),
        }
    }
}

/// An outstanding save: what was sent, at which revision, and for which
/// form the session held at the time.
#[derive(Debug, Clone)]
pub struct SaveTicket {
    schema: FormSchema,
    revision: u64,
    generation: u64,
}

impl SaveTicket {
    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn mode(&self) -> SaveMode {
        SaveMode::of(&self.schema)
    }
}

// ─── Session ─────────────────────────────────────────────────────────────

pub struct EditorSession {
    store: Arc<dyn FormStore>,
    config: EditorConfig,
    engine: SyncEngine,
    canvas: CanvasEngine,
    history: CommandStack,
    saving: bool,
    /// Bumped whenever a different form replaces the current one.
    generation: u64,
    notice: Option<Notice>,
}

impl EditorSession {
    /// A session on a fresh, never-saved form.
    pub fn new(store: Arc<dyn FormStore>, config: EditorConfig) -> Self {
        let engine = SyncEngine::new(FormSchema::new(config.default_title.clone()));
        let mut canvas = CanvasEngine::new(config.view_mode, CanvasMetrics::default());
        canvas.relayout(engine.schema());
        Self {
            store,
            history: CommandStack::new(config.undo_depth),
            config,
            engine,
            canvas,
            saving: false,
            generation: 0,
            notice: None,
        }
    }

    /// A session on the stored form `id`. If it cannot be loaded the session
    /// keeps a fresh form and carries a notice.
    pub async fn open(store: Arc<dyn FormStore>, config: EditorConfig, id: &FormId) -> Self {
        let mut session = Self::new(store, config);
        session.load(id).await;
        session
    }

    /// Replace the current form with the stored form `id`.
    pub async fn load(&mut self, id: &FormId) -> bool {
        match self.store.load(id).await {
            Ok(schema) => {
                log::debug!("session: loaded form {id} ({} fields)", schema.len());
                self.engine.load(schema);
                self.generation += 1;
                self.history.clear();
                self.canvas.relayout(self.engine.schema());
                true
            }
            Err(StoreError::NotFound(id)) => {
                log::warn!("session: form {id} not found");
                self.notice = Some(Notice::FormNotFound(id));
                false
            }
            Err(e) => {
                log::warn!("session: load failed: {e}");
                self.notice = Some(Notice::LoadFailed(e.to_string()));
                false
            }
        }
    }

    // ─── Read access ─────────────────────────────────────────────────────

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn schema(&self) -> &FormSchema {
        self.engine.schema()
    }

    pub fn selection(&self) -> Option<FieldId> {
        self.engine.selection()
    }

    pub fn selected_field(&self) -> Option<&FieldInstance> {
        self.engine.selected_field()
    }

    pub fn properties(&self) -> Option<PropertiesPanel<'_>> {
        PropertiesPanel::for_selection(&self.engine)
    }

    pub fn layout(&self) -> &CanvasLayout {
        self.canvas.layout()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn is_dirty(&self) -> bool {
        self.engine.is_dirty()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn lint(&self) -> Vec<LintDiagnostic> {
        lint_schema(self.engine.schema())
    }

    /// The design-time canvas markup.
    pub fn render_canvas(&self) -> String {
        fb_render::render_canvas(self.engine.schema(), self.engine.selection())
    }

    // ─── Editing ─────────────────────────────────────────────────────────

    /// Apply a mutation through the undo history.
    pub fn apply(&mut self, mutation: FieldMutation) -> bool {
        let description = describe(&mutation);
        let changed = self.history.execute(&mut self.engine, mutation, description);
        if changed {
            self.canvas.relayout(self.engine.schema());
        }
        changed
    }

    /// Add a field of type `tag` below the existing ones and select it.
    pub fn activate_palette(&mut self, tag: &str) -> Result<Option<FieldId>, UnknownFieldType> {
        let event = palette::activate(tag)?;
        self.handle_canvas(&event);
        Ok(self.engine.selection())
    }

    pub fn update_field(&mut self, id: FieldId, patch: FieldPatch) -> bool {
        self.apply(FieldMutation::UpdateField { id, patch })
    }

    pub fn delete_field(&mut self, id: FieldId) -> bool {
        self.apply(FieldMutation::DeleteField { id })
    }

    pub fn delete_selected(&mut self) -> bool {
        match self.engine.selection() {
            Some(id) => self.delete_field(id),
            None => false,
        }
    }

    pub fn move_field(&mut self, id: FieldId, to: usize) -> bool {
        self.apply(FieldMutation::MoveField { id, to })
    }

    /// Move the selected field `delta` slots (negative = up).
    pub fn nudge_selected(&mut self, delta: isize) -> bool {
        let Some(id) = self.engine.selection() else {
            return false;
        };
        let Some(from) = self.engine.schema().index_of(id) else {
            return false;
        };
        let Some(to) = from.checked_add_signed(delta) else {
            return false;
        };
        if to >= self.engine.schema().len() {
            return false;
        }
        self.move_field(id, to)
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> bool {
        self.apply(FieldMutation::SetTitle(title.into()))
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> bool {
        self.apply(FieldMutation::SetDescription(description.into()))
    }

    pub fn select(&mut self, id: Option<FieldId>) -> bool {
        self.engine.select(id)
    }

    /// Run a properties-panel edit against the selected field.
    pub fn edit_selected(
        &mut self,
        edit: impl FnOnce(&PropertiesPanel<'_>) -> Option<FieldMutation>,
    ) -> bool {
        let mutation = match PropertiesPanel::for_selection(&self.engine) {
            Some(panel) => edit(&panel),
            None => return false,
        };
        mutation.is_some_and(|m| self.apply(m))
    }

    pub fn set_view_mode(&mut self, view: ViewMode) {
        self.config.view_mode = view;
        self.canvas.set_view_mode(view, self.engine.schema());
    }

    pub fn set_canvas_origin(&mut self, origin: Point) {
        self.canvas.set_origin(origin);
    }

    // ─── Canvas input ────────────────────────────────────────────────────

    /// Feed one canvas event through the canvas engine. A reorder drag is
    /// recorded as a single undo step.
    pub fn handle_canvas(&mut self, event: &CanvasEvent) -> bool {
        if let CanvasEvent::DragStart {
            item: DragItem::ExistingField { .. },
        } = event
            && !self.history.is_batching()
        {
            self.history.begin_batch(&self.engine);
        }

        let changed = match self.canvas.handle(event, self.engine.schema()) {
            Ok(mutations) => {
                let mut changed = false;
                for m in mutations {
                    changed |= self.apply(m);
                }
                changed
            }
            Err(e) => {
                log::warn!("canvas: {e}");
                false
            }
        };

        if matches!(event, CanvasEvent::Drop { .. } | CanvasEvent::DragCancel)
            && self.history.is_batching()
        {
            self.history.end_batch(&self.engine, "reorder field");
        }
        changed
    }

    /// Resolve and run a keyboard shortcut. `Save` is returned for the
    /// caller to run [`EditorSession::save`]; every other action is
    /// executed here.
    pub fn handle_key(
        &mut self,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    ) -> Option<ShortcutAction> {
        let action = ShortcutMap::resolve(key, ctrl, shift, alt, meta)?;
        match action {
            ShortcutAction::Undo => {
                self.undo();
            }
            ShortcutAction::Redo => {
                self.redo();
            }
            ShortcutAction::Delete => {
                self.delete_selected();
            }
            ShortcutAction::MoveUp => {
                self.nudge_selected(-1);
            }
            ShortcutAction::MoveDown => {
                self.nudge_selected(1);
            }
            ShortcutAction::Deselect => {
                self.select(None);
            }
            ShortcutAction::Save => {}
        }
        Some(action)
    }

    pub fn undo(&mut self) -> Option<String> {
        let desc = self.history.undo(&mut self.engine)?;
        self.canvas.relayout(self.engine.schema());
        Some(desc)
    }

    pub fn redo(&mut self) -> Option<String> {
        let desc = self.history.redo(&mut self.engine)?;
        self.canvas.relayout(self.engine.schema());
        Some(desc)
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    /// Mark a save as in flight and capture what to send. `None` while
    /// another save is outstanding.
    pub fn begin_save(&mut self) -> Option<SaveTicket> {
        if self.saving {
            log::debug!("session: save refused, one is already in flight");
            return None;
        }
        self.saving = true;
        Some(SaveTicket {
            schema: self.engine.schema().clone(),
            revision: self.engine.revision(),
            generation: self.generation,
        })
    }

    /// Settle an outstanding save with the store's answer.
    ///
    /// If nothing changed since the ticket was taken the stored copy is
    /// adopted wholesale. Otherwise only its id and status are taken over
    /// and the newer edits stay dirty. A ticket taken before another form
    /// was loaded (or the form deleted) settles nothing.
    pub fn finish_save(&mut self, ticket: SaveTicket, result: Result<FormSchema, StoreError>) -> bool {
        self.saving = false;
        if ticket.generation != self.generation {
            log::warn!(
                "session: dropping result of a save taken for a form no longer open ({:?})",
                result.as_ref().map(|saved| saved.id.clone())
            );
            return false;
        }
        match result {
            Ok(saved) => {
                log::debug!(
                    "session: {:?} saved as {}",
                    ticket.mode(),
                    saved.id.as_ref().map(FormId::as_str).unwrap_or("?")
                );
                if self.engine.revision() == ticket.revision {
                    self.engine.adopt_saved(saved, ticket.revision);
                    self.canvas.relayout(self.engine.schema());
                } else {
                    self.engine.adopt_identity(&saved);
                    self.engine.mark_saved(ticket.revision);
                }
                if matches!(self.notice, Some(Notice::SaveFailed(_))) {
                    self.notice = None;
                }
                true
            }
            Err(e) => {
                log::warn!("session: save failed: {e}");
                self.notice = Some(match e {
                    StoreError::NotFound(id) => Notice::FormNotFound(id),
                    other => Notice::SaveFailed(other.to_string()),
                });
                false
            }
        }
    }

    /// Create or update the form in the store.
    pub async fn save(&mut self) -> bool {
        let Some(ticket) = self.begin_save() else {
            return false;
        };
        let result = self.store.save(ticket.schema()).await;
        self.finish_save(ticket, result)
    }

    /// Delete the stored form and start over on a fresh one. A never-saved
    /// form is simply reset.
    pub async fn delete_form(&mut self) -> bool {
        if let Some(id) = self.engine.schema().id.clone()
            && let Err(e) = self.store.delete(&id).await
        {
            log::warn!("session: delete failed: {e}");
            self.notice = Some(Notice::DeleteFailed(e.to_string()));
            return false;
        }
        self.engine = SyncEngine::new(FormSchema::new(self.config.default_title.clone()));
        self.generation += 1;
        self.history.clear();
        self.canvas.relayout(self.engine.schema());
        true
    }

    /// A fill-in session over the schema as currently edited, unsaved
    /// changes included. Needs the form to have been saved at least once.
    pub fn preview(&mut self) -> Option<FillSession> {
        if self.engine.schema().id.is_none() {
            self.notice = Some(Notice::PreviewNeedsSave);
            return None;
        }
        Some(FillSession::new(self.engine.schema().clone()))
    }
}

fn describe(mutation: &FieldMutation) -> &'static str {
    match mutation {
        FieldMutation::AddField { .. } | FieldMutation::InsertField { .. } => "add field",
        FieldMutation::UpdateField { .. } => "edit field",
        FieldMutation::DeleteField { .. } => "delete field",
        FieldMutation::MoveField { .. } => "move field",
        FieldMutation::SetTitle(_) => "edit title",
        FieldMutation::SetDescription(_) => "edit description",
        FieldMutation::Select(_) => "select",
    }
}
