//! Lint diagnostics for form schemas.
//!
//! Reports structural issues without modifying the schema. The editor shows
//! them next to the save button; `fb lint` prints them.

use crate::id::FieldId;
use crate::model::{FieldInstance, FormSchema};
use crate::validation::ValidationKey;
use std::collections::HashSet;

// ─── Diagnostic types ────────────────────────────────────────────────────

/// Severity of a lint finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintSeverity {
    /// Likely a mistake.
    Warning,
    /// Informational.
    Info,
}

/// A single lint diagnostic for a field.
#[derive(Debug, Clone)]
pub struct LintDiagnostic {
    pub field_id: FieldId,
    pub message: String,
    pub severity: LintSeverity,
    /// Short rule identifier (e.g. "empty-options", "duplicate-id").
    pub rule: &'static str,
}

// ─── Public API ───────────────────────────────────────────────────────────

/// Run all lint rules over the schema and return diagnostics in field order.
#[must_use]
pub fn lint_schema(schema: &FormSchema) -> Vec<LintDiagnostic> {
    let mut diags = Vec::new();
    lint_duplicate_ids(schema, &mut diags);
    for field in &schema.fields {
        lint_field(field, &mut diags);
    }
    diags
}

// ─── Rules ────────────────────────────────────────────────────────────────

fn lint_duplicate_ids(schema: &FormSchema, diags: &mut Vec<LintDiagnostic>) {
    let mut seen = HashSet::new();
    for field in &schema.fields {
        if !seen.insert(field.id) {
            diags.push(LintDiagnostic {
                field_id: field.id,
                message: format!("Field id `{}` is used more than once.", field.id),
                severity: LintSeverity::Warning,
                rule: "duplicate-id",
            });
        }
    }
}

fn lint_field(field: &FieldInstance, diags: &mut Vec<LintDiagnostic>) {
    let mut push = |rule, severity, message| {
        diags.push(LintDiagnostic {
            field_id: field.id,
            message,
            severity,
            rule,
        })
    };

    if !field.field_type.is_known() {
        push(
            "unknown-type",
            LintSeverity::Warning,
            format!(
                "Field `{}` has unknown type `{}` and renders as a placeholder.",
                field.id, field.field_type
            ),
        );
        return;
    }

    if field.field_type.is_layout() {
        return;
    }

    if field.label.trim().is_empty() {
        push(
            "empty-label",
            LintSeverity::Warning,
            format!("Field `{}` has no label.", field.id),
        );
    }

    if field.field_type.has_options() {
        if field.options.is_empty() {
            push(
                "empty-options",
                LintSeverity::Warning,
                format!("`{}` offers no options to choose from.", field.label),
            );
        }
        let mut seen = HashSet::new();
        for option in &field.options {
            if !seen.insert(option.as_str()) {
                push(
                    "duplicate-option",
                    LintSeverity::Info,
                    format!("`{}` lists option `{option}` more than once.", field.label),
                );
            }
        }
    }

    let v = &field.validation;
    let inverted = match (v.min_length, v.max_length) {
        (Some(lo), Some(hi)) => lo > hi,
        _ => false,
    } || match (v.min, v.max) {
        (Some(lo), Some(hi)) => lo > hi,
        _ => false,
    };
    if inverted {
        push(
            "inverted-range",
            LintSeverity::Warning,
            format!("`{}` has a minimum above its maximum; no value can pass.", field.label),
        );
    }

    let recognized = ValidationKey::for_type(&field.field_type);
    let stray: Vec<&str> = [
        ValidationKey::MinLength,
        ValidationKey::MaxLength,
        ValidationKey::Min,
        ValidationKey::Max,
        ValidationKey::Accept,
        ValidationKey::MaxSize,
    ]
    .into_iter()
    .filter(|k| v.has(*k) && !recognized.contains(k))
    .map(ValidationKey::name)
    .collect();
    if !stray.is_empty() {
        push(
            "stray-validation",
            LintSeverity::Info,
            format!(
                "`{}` sets {} which a {} field ignores.",
                field.label,
                stray.join(", "),
                field.field_type
            ),
        );
    }
}
