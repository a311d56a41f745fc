//! Core form-schema data model.
//!
//! A form is an ordered list of [`FieldInstance`] values. List order is the
//! render order; the `order` slot inside [`FieldPosition`] is derived from it
//! by the reorder engine and never trusted over it. `x`/`y` record where a
//! field was dropped and have no layout effect.

use crate::id::{FieldId, FormId};
use crate::registry::{self, FieldType};
use crate::validation::ValidationRules;
use serde::{Deserialize, Serialize};

// ─── Position ────────────────────────────────────────────────────────────

/// Drop-origin hint plus derived list order.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldPosition {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<usize>,
}

impl FieldPosition {
    pub const fn at(x: f32, y: f32) -> Self {
        Self { x, y, order: None }
    }

    /// Position hint for a field created without a drop point, stacked below
    /// `count` existing fields.
    pub fn stacked(count: usize) -> Self {
        Self::at(50.0, count as f32 * 80.0 + 50.0)
    }
}

// ─── Field instance ──────────────────────────────────────────────────────

/// One configured input or layout unit within a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldInstance {
    pub id: FieldId,

    /// Immutable after creation; `FieldPatch` has no slot for it.
    #[serde(rename = "type")]
    pub field_type: FieldType,

    #[serde(default)]
    pub label: String,

    #[serde(default)]
    pub placeholder: String,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub help_text: String,

    /// Only consulted for option types; stored as-is for the rest.
    #[serde(default)]
    pub options: Vec<String>,

    #[serde(default)]
    pub validation: ValidationRules,

    #[serde(default)]
    pub position: FieldPosition,
}

impl FieldInstance {
    /// Build a field with the registry defaults for `field_type`.
    pub fn new(id: FieldId, field_type: FieldType, position: FieldPosition) -> Self {
        Self {
            id,
            label: field_type.default_label(),
            placeholder: registry::default_placeholder(field_type.tag()).to_string(),
            required: false,
            help_text: String::new(),
            options: registry::default_options(&field_type),
            validation: ValidationRules::default(),
            position,
            field_type,
        }
    }

    /// Apply every present member of `patch`. Returns true if anything changed.
    pub fn apply(&mut self, patch: &FieldPatch) -> bool {
        let before = self.clone();
        if let Some(label) = &patch.label {
            self.label.clone_from(label);
        }
        if let Some(placeholder) = &patch.placeholder {
            self.placeholder.clone_from(placeholder);
        }
        if let Some(help_text) = &patch.help_text {
            self.help_text.clone_from(help_text);
        }
        if let Some(required) = patch.required {
            self.required = required;
        }
        if let Some(options) = &patch.options {
            self.options.clone_from(options);
        }
        if let Some(validation) = &patch.validation {
            self.validation = validation.clone();
        }
        if let Some(position) = patch.position {
            self.position = position;
        }
        *self != before
    }
}

/// A partial update to a field. `None` members are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldPatch {
    pub label: Option<String>,
    pub placeholder: Option<String>,
    pub help_text: Option<String>,
    pub required: Option<bool>,
    pub options: Option<Vec<String>>,
    pub validation: Option<ValidationRules>,
    pub position: Option<FieldPosition>,
}

impl FieldPatch {
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    pub fn placeholder(placeholder: impl Into<String>) -> Self {
        Self {
            placeholder: Some(placeholder.into()),
            ..Self::default()
        }
    }

    pub fn help_text(help_text: impl Into<String>) -> Self {
        Self {
            help_text: Some(help_text.into()),
            ..Self::default()
        }
    }

    pub fn required(required: bool) -> Self {
        Self {
            required: Some(required),
            ..Self::default()
        }
    }

    pub fn options(options: Vec<String>) -> Self {
        Self {
            options: Some(options),
            ..Self::default()
        }
    }

    pub fn validation(validation: ValidationRules) -> Self {
        Self {
            validation: Some(validation),
            ..Self::default()
        }
    }

    pub fn position(position: FieldPosition) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ─── Form schema ─────────────────────────────────────────────────────────

/// Publication state carried through saves untouched by the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FormStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

pub const DEFAULT_TITLE: &str = "Untitled Form";

/// The unit persisted to and loaded from storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSchema {
    /// `None` until the first save.
    #[serde(default)]
    pub id: Option<FormId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: FormStatus,
    #[serde(default)]
    pub fields: Vec<FieldInstance>,
}

impl Default for FormSchema {
    fn default() -> Self {
        Self::new(DEFAULT_TITLE)
    }
}

impl FormSchema {
    /// A fresh, never-saved schema with no fields.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: String::new(),
            status: FormStatus::Draft,
            fields: Vec::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, id: FieldId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn index_of(&self, id: FieldId) -> Option<usize> {
        self.fields.iter().position(|f| f.id == id)
    }

    pub fn get(&self, id: FieldId) -> Option<&FieldInstance> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn get_mut(&mut self, id: FieldId) -> Option<&mut FieldInstance> {
        self.fields.iter_mut().find(|f| f.id == id)
    }

    /// A fresh id that no field of this schema uses.
    pub fn next_field_id(&self) -> FieldId {
        FieldId::generate(|id| self.contains(id))
    }

    /// Build a new field of `field_type` with registry defaults and a fresh
    /// id. Does not insert it.
    pub fn create_field(&self, field_type: FieldType, position: FieldPosition) -> FieldInstance {
        FieldInstance::new(self.next_field_id(), field_type, position)
    }

    /// Append a field. Refused (returns false) if its id is already present.
    pub fn add_field(&mut self, field: FieldInstance) -> bool {
        if self.contains(field.id) {
            log::warn!("add_field: duplicate id {}", field.id);
            return false;
        }
        self.fields.push(field);
        true
    }

    /// Apply a patch to the field with `id`. Returns true if it changed.
    pub fn update_field(&mut self, id: FieldId, patch: &FieldPatch) -> bool {
        self.get_mut(id).is_some_and(|f| f.apply(patch))
    }

    /// Remove the field with `id`, returning it with its former index.
    pub fn delete_field(&mut self, id: FieldId) -> Option<(usize, FieldInstance)> {
        let idx = self.index_of(id)?;
        let removed = self.fields.remove(idx);
        self.renumber_if_ordered();
        Some((idx, removed))
    }

    /// Insert a field at `index` (clamped). Refused if its id is present.
    pub fn insert_field(&mut self, index: usize, field: FieldInstance) -> bool {
        if self.contains(field.id) {
            log::warn!("insert_field: duplicate id {}", field.id);
            return false;
        }
        let index = index.min(self.fields.len());
        self.fields.insert(index, field);
        self.renumber_if_ordered();
        true
    }

    /// Move the field with `id` to index `to` (clamped), then rewrite every
    /// field's `order` from its list position. Returns false when nothing
    /// moved; the list is not touched in that case.
    pub fn move_field(&mut self, id: FieldId, to: usize) -> bool {
        let Some(from) = self.index_of(id) else {
            return false;
        };
        let to = to.min(self.fields.len().saturating_sub(1));
        if from == to {
            return false;
        }
        let field = self.fields.remove(from);
        self.fields.insert(to, field);
        self.renumber();
        true
    }

    /// Write each field's list index into `position.order`.
    pub fn renumber(&mut self) {
        for (i, field) in self.fields.iter_mut().enumerate() {
            field.position.order = Some(i);
        }
    }

    /// Renumber only once some field carries an `order`; schemas that never
    /// saw a reorder keep the slot unset.
    fn renumber_if_ordered(&mut self) {
        if self.fields.iter().any(|f| f.position.order.is_some()) {
            self.renumber();
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = FieldId> + '_ {
        self.fields.iter().map(|f| f.id)
    }
}
