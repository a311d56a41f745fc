//! Undo/Redo command stack.
//!
//! Every content mutation is wrapped in a reversible `Command`. Selection
//! changes are applied directly and never recorded.
//!
//! Drag gestures use **snapshot batching**: the form content is captured at
//! the start and end of the gesture, so one undo reverts every reorder the
//! drag triggered.

use crate::sync::{ContentSnapshot, FieldMutation, SyncEngine};
use fb_core::model::FieldPatch;

/// A command that captures both a forward mutation and its inverse.
#[derive(Debug, Clone)]
pub enum Command {
    Single {
        forward: Box<FieldMutation>,
        inverse: Box<FieldMutation>,
        description: String,
    },
    Snapshot {
        before: Box<ContentSnapshot>,
        after: Box<ContentSnapshot>,
        description: String,
    },
}

/// Manages undo/redo stacks with batch grouping for drag gestures.
pub struct CommandStack {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
    max_depth: usize,
    /// Batch nesting depth (0 = not batching).
    batch_depth: usize,
    batch_snapshot: Option<ContentSnapshot>,
    batch_dirty: bool,
}

impl CommandStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::with_capacity(max_depth.min(128)),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
            batch_depth: 0,
            batch_snapshot: None,
            batch_dirty: false,
        }
    }

    pub fn is_batching(&self) -> bool {
        self.batch_depth > 0
    }

    /// Start a batch group. Mutations until the matching `end_batch()` are
    /// applied live but undone as one step.
    pub fn begin_batch(&mut self, engine: &SyncEngine) {
        if self.batch_depth == 0 {
            self.batch_snapshot = Some(engine.snapshot());
            self.batch_dirty = false;
        }
        self.batch_depth += 1;
    }

    /// End a batch group. When the outermost batch closes and the content
    /// actually changed, push one snapshot command.
    pub fn end_batch(&mut self, engine: &SyncEngine, description: &str) {
        if self.batch_depth == 0 {
            return;
        }
        self.batch_depth -= 1;
        if self.batch_depth > 0 {
            return;
        }
        if self.batch_dirty
            && let Some(before) = self.batch_snapshot.take()
        {
            let after = engine.snapshot();
            if before != after {
                self.push(Command::Snapshot {
                    before: Box::new(before),
                    after: Box::new(after),
                    description: description.to_string(),
                });
            }
        }
        self.batch_snapshot = None;
        self.batch_dirty = false;
    }

    /// Apply a mutation through the engine and record it. Returns whether
    /// the engine changed; no-op mutations leave the history untouched.
    pub fn execute(&mut self, engine: &mut SyncEngine, mutation: FieldMutation, description: &str) -> bool {
        if mutation.is_selection() {
            return engine.apply_mutation(mutation);
        }

        if self.batch_depth > 0 {
            let changed = engine.apply_mutation(mutation);
            self.batch_dirty |= changed;
            return changed;
        }

        let inverse = compute_inverse(engine, &mutation);
        if !engine.apply_mutation(mutation.clone()) {
            return false;
        }
        let Some(inverse) = inverse else {
            return true;
        };
        self.push(Command::Single {
            forward: Box::new(mutation),
            inverse: Box::new(inverse),
            description: description.to_string(),
        });
        true
    }

    fn push(&mut self, cmd: Command) {
        log::trace!("history: push {:?}", description_of(&cmd));
        self.undo_stack.push(cmd);
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
    }

    /// Undo the last command. Returns its description.
    pub fn undo(&mut self, engine: &mut SyncEngine) -> Option<String> {
        let cmd = self.undo_stack.pop()?;
        match &cmd {
            Command::Single { inverse, .. } => {
                engine.apply_mutation(*inverse.clone());
            }
            Command::Snapshot { before, .. } => engine.restore(before),
        }
        let desc = description_of(&cmd).to_string();
        self.redo_stack.push(cmd);
        Some(desc)
    }

    /// Redo the last undone command. Returns its description.
    pub fn redo(&mut self, engine: &mut SyncEngine) -> Option<String> {
        let cmd = self.redo_stack.pop()?;
        match &cmd {
            Command::Single { forward, .. } => {
                engine.apply_mutation(*forward.clone());
            }
            Command::Snapshot { after, .. } => engine.restore(after),
        }
        let desc = description_of(&cmd).to_string();
        self.undo_stack.push(cmd);
        Some(desc)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Forget all history (after loading a different form).
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.batch_depth = 0;
        self.batch_snapshot = None;
        self.batch_dirty = false;
    }
}

fn description_of(cmd: &Command) -> &str {
    match cmd {
        Command::Single { description, .. } | Command::Snapshot { description, .. } => description,
    }
}

/// Compute the inverse of `mutation` against the engine's current state.
/// `None` when there is nothing to invert (unknown id).
fn compute_inverse(engine: &SyncEngine, mutation: &FieldMutation) -> Option<FieldMutation> {
    let schema = engine.schema();
    match mutation {
        FieldMutation::AddField { field, .. } => Some(FieldMutation::DeleteField { id: field.id }),
        FieldMutation::InsertField { field, .. } => Some(FieldMutation::DeleteField { id: field.id }),
        FieldMutation::UpdateField { id, .. } => {
            let old = schema.get(*id)?;
            Some(FieldMutation::UpdateField {
                id: *id,
                patch: FieldPatch {
                    label: Some(old.label.clone()),
                    placeholder: Some(old.placeholder.clone()),
                    help_text: Some(old.help_text.clone()),
                    required: Some(old.required),
                    options: Some(old.options.clone()),
                    validation: Some(old.validation.clone()),
                    position: Some(old.position),
                },
            })
        }
        FieldMutation::DeleteField { id } => {
            let index = schema.index_of(*id)?;
            Some(FieldMutation::InsertField {
                index,
                field: Box::new(schema.fields[index].clone()),
            })
        }
        FieldMutation::MoveField { id, .. } => Some(FieldMutation::MoveField {
            id: *id,
            to: schema.index_of(*id)?,
        }),
        FieldMutation::SetTitle(_) => Some(FieldMutation::SetTitle(schema.title.clone())),
        FieldMutation::SetDescription(_) => {
            Some(FieldMutation::SetDescription(schema.description.clone()))
        }
        FieldMutation::Select(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fb_core::model::FieldPosition;
    use fb_core::registry::FieldType;
    use pretty_assertions::assert_eq;

    fn add(stack: &mut CommandStack, engine: &mut SyncEngine, t: FieldType) -> fb_core::FieldId {
        let field = engine
            .schema()
            .create_field(t, FieldPosition::stacked(engine.schema().len()));
        let id = field.id;
        stack.execute(
            engine,
            FieldMutation::AddField {
                field: Box::new(field),
                select: true,
            },
            "add field",
        );
        id
    }

    #[test]
    fn add_undo_redo() {
        let mut engine = SyncEngine::default();
        let mut stack = CommandStack::new(100);
        let id = add(&mut stack, &mut engine, FieldType::Text);

        assert_eq!(stack.undo(&mut engine).as_deref(), Some("add field"));
        assert!(engine.schema().is_empty());
        assert_eq!(engine.selection(), None);

        stack.redo(&mut engine);
        assert!(engine.schema().contains(id));
    }

    #[test]
    fn delete_undo_restores_index() {
        let mut engine = SyncEngine::default();
        let mut stack = CommandStack::new(100);
        let a = add(&mut stack, &mut engine, FieldType::Text);
        let b = add(&mut stack, &mut engine, FieldType::Number);
        let c = add(&mut stack, &mut engine, FieldType::Date);

        stack.execute(&mut engine, FieldMutation::DeleteField { id: b }, "delete");
        stack.undo(&mut engine);
        let ids: Vec<_> = engine.schema().ids().collect();
        assert_eq!(ids, vec![a, b, c]);
    }

    #[test]
    fn update_undo_restores_old_values() {
        let mut engine = SyncEngine::default();
        let mut stack = CommandStack::new(100);
        let id = add(&mut stack, &mut engine, FieldType::Text);
        let before = engine.schema().get(id).cloned();

        stack.execute(
            &mut engine,
            FieldMutation::UpdateField {
                id,
                patch: FieldPatch::label("Name"),
            },
            "label",
        );
        stack.undo(&mut engine);
        assert_eq!(engine.schema().get(id).cloned(), before);
    }

    #[test]
    fn noop_and_selection_are_not_recorded() {
        let mut engine = SyncEngine::default();
        let mut stack = CommandStack::new(100);
        let id = add(&mut stack, &mut engine, FieldType::Text);

        assert!(stack.execute(&mut engine, FieldMutation::Select(None), "select"));
        assert!(!stack.execute(&mut engine, FieldMutation::MoveField { id, to: 0 }, "move"));
        assert_eq!(stack.undo(&mut engine).as_deref(), Some("add field"));
        assert!(!stack.can_undo());
    }

    #[test]
    fn max_depth_trims_oldest() {
        let mut engine = SyncEngine::default();
        let mut stack = CommandStack::new(3);
        for i in 0..5 {
            stack.execute(&mut engine, FieldMutation::SetTitle(format!("T{i}")), "title");
        }
        let mut undo_count = 0;
        while stack.undo(&mut engine).is_some() {
            undo_count += 1;
        }
        assert_eq!(undo_count, 3);
        assert_eq!(engine.schema().title, "T1");
    }

    #[test]
    fn redo_clears_on_new_action() {
        let mut engine = SyncEngine::default();
        let mut stack = CommandStack::new(100);
        stack.execute(&mut engine, FieldMutation::SetTitle("A".into()), "title");
        stack.undo(&mut engine);
        assert!(stack.can_redo());
        stack.execute(&mut engine, FieldMutation::SetTitle("B".into()), "title");
        assert!(!stack.can_redo());
    }

    #[test]
    fn batch_undo_is_single_step() {
        let mut engine = SyncEngine::default();
        let mut stack = CommandStack::new(100);
        let a = add(&mut stack, &mut engine, FieldType::Text);
        let b = add(&mut stack, &mut engine, FieldType::Number);
        let c = add(&mut stack, &mut engine, FieldType::Date);
        let order = |e: &SyncEngine| e.schema().ids().collect::<Vec<_>>();

        stack.begin_batch(&engine);
        stack.execute(&mut engine, FieldMutation::MoveField { id: a, to: 1 }, "drag");
        stack.execute(&mut engine, FieldMutation::MoveField { id: a, to: 2 }, "drag");
        stack.end_batch(&engine, "reorder");
        assert_eq!(order(&engine), vec![b, c, a]);

        assert_eq!(stack.undo(&mut engine).as_deref(), Some("reorder"));
        assert_eq!(order(&engine), vec![a, b, c]);
        stack.redo(&mut engine);
        assert_eq!(order(&engine), vec![b, c, a]);
    }

    #[test]
    fn empty_batch_no_undo_entry() {
        let mut engine = SyncEngine::default();
        let mut stack = CommandStack::new(100);
        stack.begin_batch(&engine);
        stack.end_batch(&engine, "reorder");
        assert!(!stack.can_undo());
    }
}
