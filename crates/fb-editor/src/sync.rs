//! Form sync engine: the single owner of the schema being edited.
//!
//! Every change made by the canvas, the palette, the properties panel or
//! undo/redo flows through [`SyncEngine::apply_mutation`]. Selection is held
//! as an id and resolved against the field list on every read, so the
//! properties panel can never show a stale copy of a field.

use fb_core::id::FieldId;
use fb_core::model::{FieldInstance, FieldPatch, FormSchema, FormStatus};

/// A change to the form being edited.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldMutation {
    /// Append a new field; `select` makes it the current selection.
    AddField {
        field: Box<FieldInstance>,
        select: bool,
    },
    /// Put a field back at `index` (undo of a delete).
    InsertField {
        index: usize,
        field: Box<FieldInstance>,
    },
    UpdateField {
        id: FieldId,
        patch: FieldPatch,
    },
    DeleteField {
        id: FieldId,
    },
    /// Move a field to list index `to` and renumber.
    MoveField {
        id: FieldId,
        to: usize,
    },
    SetTitle(String),
    SetDescription(String),
    Select(Option<FieldId>),
}

impl FieldMutation {
    /// Selection changes are not content edits: they neither dirty the form
    /// nor enter the undo history.
    pub fn is_selection(&self) -> bool {
        matches!(self, Self::Select(_))
    }
}

/// Holds the authoritative schema and the current selection.
pub struct SyncEngine {
    schema: FormSchema,
    selection: Option<FieldId>,

    /// Bumped on every content change.
    revision: u64,

    /// Revision last acknowledged by the store.
    saved_revision: u64,
}

impl Default for SyncEngine {
    fn default() -> Self {
        Self::new(FormSchema::default())
    }
}

impl SyncEngine {
    pub fn new(schema: FormSchema) -> Self {
        Self {
            schema,
            selection: None,
            revision: 0,
            saved_revision: 0,
        }
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn selection(&self) -> Option<FieldId> {
        self.selection
    }

    /// The selected field as it currently sits in the schema.
    pub fn selected_field(&self) -> Option<&FieldInstance> {
        self.selection.and_then(|id| self.schema.get(id))
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// True when there are edits the store has not acknowledged.
    pub fn is_dirty(&self) -> bool {
        self.revision != self.saved_revision
    }

    pub fn mark_saved(&mut self, revision: u64) {
        self.saved_revision = revision;
    }

    // ─── Mutations ───────────────────────────────────────────────────────

    /// Apply one mutation. Returns true if the schema or selection changed.
    pub fn apply_mutation(&mut self, mutation: FieldMutation) -> bool {
        let changed = match mutation {
            FieldMutation::AddField { field, select } => {
                let id = field.id;
                let added = self.schema.add_field(*field);
                if added && select {
                    self.selection = Some(id);
                }
                added
            }
            FieldMutation::InsertField { index, field } => self.schema.insert_field(index, *field),
            FieldMutation::UpdateField { id, patch } => self.schema.update_field(id, &patch),
            FieldMutation::DeleteField { id } => {
                let removed = self.schema.delete_field(id).is_some();
                if removed && self.selection == Some(id) {
                    self.selection = None;
                }
                removed
            }
            FieldMutation::MoveField { id, to } => self.schema.move_field(id, to),
            FieldMutation::SetTitle(title) => replace(&mut self.schema.title, title),
            FieldMutation::SetDescription(description) => {
                replace(&mut self.schema.description, description)
            }
            FieldMutation::Select(id) => {
                return self.select(id);
            }
        };
        if changed {
            self.revision += 1;
            log::trace!("sync: revision {}", self.revision);
        }
        changed
    }

    /// Apply a batch of mutations. Returns true if any of them changed state.
    pub fn apply_mutations(&mut self, mutations: Vec<FieldMutation>) -> bool {
        let mut changed = false;
        for m in mutations {
            changed |= self.apply_mutation(m);
        }
        changed
    }

    /// Select a field by id, or clear the selection. Ids that are not in the
    /// schema clear it.
    pub fn select(&mut self, id: Option<FieldId>) -> bool {
        let id = id.filter(|id| self.schema.contains(*id));
        let changed = self.selection != id;
        self.selection = id;
        changed
    }

    // ─── Whole-schema replacement ────────────────────────────────────────

    /// Swap in a schema from the store. The result counts as saved.
    pub fn load(&mut self, schema: FormSchema) {
        self.schema = schema;
        self.selection = None;
        self.revision += 1;
        self.saved_revision = self.revision;
    }

    /// Restore a content snapshot (undo/redo of a batch). Identity and
    /// status are untouched; a selection that no longer resolves is dropped.
    pub fn restore(&mut self, snapshot: &ContentSnapshot) {
        self.schema.title.clone_from(&snapshot.title);
        self.schema.description.clone_from(&snapshot.description);
        self.schema.fields.clone_from(&snapshot.fields);
        if let Some(id) = self.selection
            && !self.schema.contains(id)
        {
            self.selection = None;
        }
        self.revision += 1;
    }

    /// Capture everything an edit can change.
    pub fn snapshot(&self) -> ContentSnapshot {
        ContentSnapshot {
            title: self.schema.title.clone(),
            description: self.schema.description.clone(),
            fields: self.schema.fields.clone(),
        }
    }

    /// Take over the identity the store assigned, leaving content alone.
    pub fn adopt_identity(&mut self, saved: &FormSchema) {
        self.schema.id.clone_from(&saved.id);
        self.schema.status = saved.status;
    }

    /// Take over the store's copy wholesale. The selection survives when
    /// its field still exists.
    pub fn adopt_saved(&mut self, saved: FormSchema, revision: u64) {
        self.schema = saved;
        if let Some(id) = self.selection
            && !self.schema.contains(id)
        {
            self.selection = None;
        }
        self.saved_revision = revision;
    }

    pub fn status(&self) -> FormStatus {
        self.schema.status
    }
}

/// The editable content of a schema, used for batched undo.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentSnapshot {
    pub title: String,
    pub description: String,
    pub fields: Vec<FieldInstance>,
}

fn replace(slot: &mut String, value: String) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use fb_core::model::FieldPosition;
    use fb_core::registry::FieldType;
    use pretty_assertions::assert_eq;

    fn engine_with(types: &[FieldType]) -> SyncEngine {
        let mut engine = SyncEngine::default();
        for t in types {
            let field = engine
                .schema()
                .create_field(t.clone(), FieldPosition::stacked(engine.schema().len()));
            engine.apply_mutation(FieldMutation::AddField {
                field: Box::new(field),
                select: false,
            });
        }
        engine
    }

    #[test]
    fn add_with_select_selects() {
        let mut engine = SyncEngine::default();
        let field = engine
            .schema()
            .create_field(FieldType::Email, FieldPosition::at(10.0, 20.0));
        let id = field.id;
        assert!(engine.apply_mutation(FieldMutation::AddField {
            field: Box::new(field),
            select: true,
        }));
        assert_eq!(engine.selection(), Some(id));
        assert_eq!(engine.selected_field().map(|f| f.label.as_str()), Some("Email Field"));
        assert!(engine.is_dirty());
    }

    #[test]
    fn selection_reads_live_field() {
        let mut engine = engine_with(&[FieldType::Text]);
        let id = engine.schema().fields[0].id;
        engine.select(Some(id));
        engine.apply_mutation(FieldMutation::UpdateField {
            id,
            patch: FieldPatch::label("Full name"),
        });
        assert_eq!(engine.selected_field().unwrap().label, "Full name");
    }

    #[test]
    fn deleting_selected_clears_selection() {
        let mut engine = engine_with(&[FieldType::Text, FieldType::Number]);
        let (a, b) = (engine.schema().fields[0].id, engine.schema().fields[1].id);
        engine.select(Some(a));

        engine.apply_mutation(FieldMutation::DeleteField { id: b });
        assert_eq!(engine.selection(), Some(a));

        engine.apply_mutation(FieldMutation::DeleteField { id: a });
        assert_eq!(engine.selection(), None);
        assert!(engine.schema().is_empty());
    }

    #[test]
    fn selecting_unknown_id_clears() {
        let mut engine = engine_with(&[FieldType::Text]);
        let id = engine.schema().fields[0].id;
        engine.select(Some(id));
        engine.select(Some(FieldId::intern("missing")));
        assert_eq!(engine.selection(), None);
    }

    #[test]
    fn selection_is_not_an_edit() {
        let mut engine = engine_with(&[FieldType::Text]);
        engine.mark_saved(engine.revision());
        let id = engine.schema().fields[0].id;
        assert!(engine.apply_mutation(FieldMutation::Select(Some(id))));
        assert!(!engine.is_dirty());
    }

    #[test]
    fn noop_mutations_do_not_bump_revision() {
        let mut engine = engine_with(&[FieldType::Text, FieldType::Number]);
        let rev = engine.revision();
        let id = engine.schema().fields[1].id;
        assert!(!engine.apply_mutation(FieldMutation::MoveField { id, to: 1 }));
        assert!(!engine.apply_mutation(FieldMutation::SetTitle("Untitled Form".into())));
        assert!(!engine.apply_mutation(FieldMutation::DeleteField {
            id: FieldId::intern("missing"),
        }));
        assert_eq!(engine.revision(), rev);
    }

    #[test]
    fn insert_restores_position() {
        let mut engine = engine_with(&[FieldType::Text, FieldType::Number, FieldType::Date]);
        let field = engine.schema().fields[1].clone();
        engine.apply_mutation(FieldMutation::DeleteField { id: field.id });
        engine.apply_mutation(FieldMutation::InsertField {
            index: 1,
            field: Box::new(field.clone()),
        });
        assert_eq!(engine.schema().fields[1], field);
    }

    #[test]
    fn delete_then_reinsert_renumbers_order() {
        let mut engine = engine_with(&[FieldType::Text, FieldType::Number, FieldType::Date]);
        let ids: Vec<_> = engine.schema().ids().collect();
        engine.apply_mutation(FieldMutation::MoveField { id: ids[0], to: 2 });
        let field = engine.schema().fields[0].clone();

        engine.apply_mutation(FieldMutation::DeleteField { id: field.id });
        engine.apply_mutation(FieldMutation::InsertField {
            index: 0,
            field: Box::new(field),
        });
        let orders: Vec<_> = engine.schema().fields.iter().map(|f| f.position.order).collect();
        assert_eq!(orders, vec![Some(0), Some(1), Some(2)]);
    }

    #[test]
    fn restore_drops_stale_selection() {
        let mut engine = engine_with(&[FieldType::Text]);
        let before = engine.snapshot();
        let field = engine
            .schema()
            .create_field(FieldType::Number, FieldPosition::default());
        engine.apply_mutation(FieldMutation::AddField {
            field: Box::new(field),
            select: true,
        });
        assert!(engine.selection().is_some());
        engine.restore(&before);
        assert_eq!(engine.selection(), None);
        assert_eq!(engine.schema().len(), 1);
    }
}
