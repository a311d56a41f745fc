//! Properties panel: a read model of the selected field plus the edits it
//! can issue.
//!
//! The panel never holds a copy of the field. [`PropertiesPanel`] borrows
//! the live field out of the sync engine, and every edit is computed from
//! that authoritative state and returned as a [`FieldMutation`].

use crate::sync::{FieldMutation, SyncEngine};
use fb_core::id::FieldId;
use fb_core::model::{FieldInstance, FieldPatch};
use fb_core::registry;
use fb_core::validation::{ValidationEdit, ValidationKey};

/// One row of the validation section.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationRow {
    pub key: ValidationKey,
    pub title: &'static str,
    pub value: String,
}

/// Everything the panel shows for one field.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySheet {
    pub field_id: FieldId,
    /// Registry display label, or the raw tag for unknown types.
    pub type_label: String,
    pub label: String,
    /// Placeholder, help text and required are hidden for layout breaks.
    pub show_input_settings: bool,
    pub placeholder: String,
    pub help_text: String,
    pub required: bool,
    /// `Some` only for option-bearing types.
    pub options: Option<Vec<String>>,
    pub validation: Vec<ValidationRow>,
}

/// Borrowed view over the selected field.
pub struct PropertiesPanel<'a> {
    field: &'a FieldInstance,
}

impl<'a> PropertiesPanel<'a> {
    /// The panel for the current selection, or `None` for the empty state.
    pub fn for_selection(engine: &'a SyncEngine) -> Option<Self> {
        engine.selected_field().map(|field| Self { field })
    }

    pub fn field(&self) -> &'a FieldInstance {
        self.field
    }

    pub fn sheet(&self) -> PropertySheet {
        let f = self.field;
        let type_label = registry::definition(&f.field_type)
            .map(|d| d.display_label.to_string())
            .unwrap_or_else(|| f.field_type.tag().to_string());
        PropertySheet {
            field_id: f.id,
            type_label,
            label: f.label.clone(),
            show_input_settings: !f.field_type.is_layout(),
            placeholder: f.placeholder.clone(),
            help_text: f.help_text.clone(),
            required: f.required,
            options: f.field_type.has_options().then(|| f.options.clone()),
            validation: ValidationKey::for_type(&f.field_type)
                .iter()
                .map(|&key| ValidationRow {
                    key,
                    title: key.title(),
                    value: f.validation.display(key),
                })
                .collect(),
        }
    }

    fn update(&self, patch: FieldPatch) -> FieldMutation {
        FieldMutation::UpdateField {
            id: self.field.id,
            patch,
        }
    }

    pub fn set_label(&self, label: impl Into<String>) -> FieldMutation {
        self.update(FieldPatch::label(label))
    }

    pub fn set_placeholder(&self, placeholder: impl Into<String>) -> FieldMutation {
        self.update(FieldPatch::placeholder(placeholder))
    }

    pub fn set_help_text(&self, help_text: impl Into<String>) -> FieldMutation {
        self.update(FieldPatch::help_text(help_text))
    }

    pub fn set_required(&self, required: bool) -> FieldMutation {
        self.update(FieldPatch::required(required))
    }

    /// Append `"Option N"`, N being the new list length.
    pub fn add_option(&self) -> FieldMutation {
        self.update(FieldPatch::options(with_added_option(&self.field.options)))
    }

    /// Remove the option at `index`. `None` when out of range.
    pub fn remove_option(&self, index: usize) -> Option<FieldMutation> {
        with_removed_option(&self.field.options, index).map(|o| self.update(FieldPatch::options(o)))
    }

    /// Rewrite the option at `index`. `None` when out of range.
    pub fn update_option(&self, index: usize, value: impl Into<String>) -> Option<FieldMutation> {
        with_updated_option(&self.field.options, index, value.into())
            .map(|o| self.update(FieldPatch::options(o)))
    }

    /// Parse `input` for `key` and merge it into the field's rules. Keys not
    /// recognized for the field's type are refused.
    pub fn edit_validation(&self, key: ValidationKey, input: &str) -> Option<FieldMutation> {
        if !ValidationKey::for_type(&self.field.field_type).contains(&key) {
            log::debug!("properties: {} ignores {}", self.field.field_type, key.name());
            return None;
        }
        let rules = self.field.validation.with(ValidationEdit::parse(key, input));
        Some(self.update(FieldPatch::validation(rules)))
    }
}

// ─── Option list edits ───────────────────────────────────────────────────

pub fn with_added_option(options: &[String]) -> Vec<String> {
    let mut next = options.to_vec();
    next.push(format!("Option {}", options.len() + 1));
    next
}

pub fn with_removed_option(options: &[String], index: usize) -> Option<Vec<String>> {
    if index >= options.len() {
        return None;
    }
    let mut next = options.to_vec();
    next.remove(index);
    Some(next)
}

pub fn with_updated_option(options: &[String], index: usize, value: String) -> Option<Vec<String>> {
    if index >= options.len() {
        return None;
    }
    let mut next = options.to_vec();
    next[index] = value;
    Some(next)
}
