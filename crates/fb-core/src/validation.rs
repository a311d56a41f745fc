//! Validation rule model and run-time evaluator.
//!
//! Rules are authored once in the properties surface and stored on each
//! field. Only the fill-in renderer evaluates them; the design canvas never
//! does. Each type recognizes its own keys:
//!
//! | Type   | Keys                   |
//! |--------|------------------------|
//! | text   | `minLength`, `maxLength` |
//! | number | `min`, `max`           |
//! | file   | `accept`, `maxSize` (MB) |
//!
//! `required` lives on the field itself and applies to every input type.
//! Keys a type does not recognize are kept in storage and ignored here.

use crate::id::FieldId;
use crate::model::{FieldInstance, FormSchema};
use crate::registry::FieldType;
use serde::{Deserialize, Deserializer, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;

// ─── Rule model ──────────────────────────────────────────────────────────

/// Per-field constraint map. Absent keys mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRules {
    #[serde(default, deserialize_with = "lenient_u32", skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept: Option<String>,
    /// Megabytes.
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub max_size: Option<f64>,
    /// Keys this build does not know, preserved across load/save.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Stored numbers sometimes arrive as strings; anything unparsable is
/// treated as "no constraint" rather than failing the whole schema.
fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(d)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_u32<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
    Ok(lenient_f64(d)?.filter(|n| *n >= 0.0).map(|n| n as u32))
}

/// A single recognized constraint key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationKey {
    MinLength,
    MaxLength,
    Min,
    Max,
    Accept,
    MaxSize,
}

impl ValidationKey {
    pub fn name(self) -> &'static str {
        match self {
            Self::MinLength => "minLength",
            Self::MaxLength => "maxLength",
            Self::Min => "min",
            Self::Max => "max",
            Self::Accept => "accept",
            Self::MaxSize => "maxSize",
        }
    }

    /// Label shown next to the input in the properties surface.
    pub fn title(self) -> &'static str {
        match self {
            Self::MinLength => "Minimum Length",
            Self::MaxLength => "Maximum Length",
            Self::Min => "Minimum Value",
            Self::Max => "Maximum Value",
            Self::Accept => "Accepted File Types",
            Self::MaxSize => "Max File Size (MB)",
        }
    }

    /// Keys recognized for a field type.
    pub fn for_type(field_type: &FieldType) -> &'static [ValidationKey] {
        match field_type {
            FieldType::Text => &[Self::MinLength, Self::MaxLength],
            FieldType::Number => &[Self::Min, Self::Max],
            FieldType::File => &[Self::Accept, Self::MaxSize],
            _ => &[],
        }
    }
}

/// One edit to a rule map, as produced by a properties input.
/// `None` clears the key.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationEdit {
    MinLength(Option<u32>),
    MaxLength(Option<u32>),
    Min(Option<f64>),
    Max(Option<f64>),
    Accept(Option<String>),
    MaxSize(Option<f64>),
}

impl ValidationEdit {
    /// Interpret raw input text for `key`. Blank or non-numeric text clears
    /// the constraint; integer keys take the leading integer (`"12px"` → 12).
    pub fn parse(key: ValidationKey, input: &str) -> Self {
        let input = input.trim();
        match key {
            ValidationKey::MinLength => Self::MinLength(leading_uint(input)),
            ValidationKey::MaxLength => Self::MaxLength(leading_uint(input)),
            ValidationKey::Min => Self::Min(parse_number(input)),
            ValidationKey::Max => Self::Max(parse_number(input)),
            ValidationKey::Accept => {
                Self::Accept((!input.is_empty()).then(|| input.to_string()))
            }
            ValidationKey::MaxSize => Self::MaxSize(parse_number(input).filter(|n| *n > 0.0)),
        }
    }

    pub fn key(&self) -> ValidationKey {
        match self {
            Self::MinLength(_) => ValidationKey::MinLength,
            Self::MaxLength(_) => ValidationKey::MaxLength,
            Self::Min(_) => ValidationKey::Min,
            Self::Max(_) => ValidationKey::Max,
            Self::Accept(_) => ValidationKey::Accept,
            Self::MaxSize(_) => ValidationKey::MaxSize,
        }
    }
}

fn leading_uint(s: &str) -> Option<u32> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s[..end].parse().ok()
}

fn parse_number(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

impl ValidationRules {
    /// Return a copy with `edit` applied.
    #[must_use]
    pub fn with(&self, edit: ValidationEdit) -> Self {
        let mut next = self.clone();
        match edit {
            ValidationEdit::MinLength(v) => next.min_length = v,
            ValidationEdit::MaxLength(v) => next.max_length = v,
            ValidationEdit::Min(v) => next.min = v,
            ValidationEdit::Max(v) => next.max = v,
            ValidationEdit::Accept(v) => next.accept = v,
            ValidationEdit::MaxSize(v) => next.max_size = v,
        }
        next
    }

    pub fn has(&self, key: ValidationKey) -> bool {
        match key {
            ValidationKey::MinLength => self.min_length.is_some(),
            ValidationKey::MaxLength => self.max_length.is_some(),
            ValidationKey::Min => self.min.is_some(),
            ValidationKey::Max => self.max.is_some(),
            ValidationKey::Accept => self.accept.is_some(),
            ValidationKey::MaxSize => self.max_size.is_some(),
        }
    }

    /// Current value of `key` as display text (`""` when unset).
    pub fn display(&self, key: ValidationKey) -> String {
        match key {
            ValidationKey::MinLength => self.min_length.map(|n| n.to_string()),
            ValidationKey::MaxLength => self.max_length.map(|n| n.to_string()),
            ValidationKey::Min => self.min.map(|n| n.to_string()),
            ValidationKey::Max => self.max.map(|n| n.to_string()),
            ValidationKey::Accept => self.accept.clone(),
            ValidationKey::MaxSize => self.max_size.map(|n| n.to_string()),
        }
        .unwrap_or_default()
    }
}

// ─── Submitted values ────────────────────────────────────────────────────

/// An uploaded file as reported by the fill-in renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileUpload {
    pub name: String,
    /// Bytes.
    pub size: u64,
    /// MIME type, when the client knows it.
    #[serde(default, rename = "type")]
    pub mime: String,
}

/// A value entered for one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Empty,
    Text(String),
    Number(f64),
    Multiple(Vec<String>),
    File(FileUpload),
}

impl FieldValue {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(n) => n.is_nan(),
            Self::Multiple(items) => items.is_empty(),
            Self::File(f) => f.name.is_empty(),
        }
    }

    fn as_text(&self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s.clone()),
            Self::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Finite numbers only; `NaN` and infinities would slip past every bound.
    fn as_number(&self) -> Option<f64> {
        let n = match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
            _ => None,
        };
        n.filter(|n: &f64| n.is_finite())
    }
}

/// Values keyed by field id, as submitted by the fill-in renderer.
pub type SubmissionValues = HashMap<FieldId, FieldValue>;

// ─── Evaluation ──────────────────────────────────────────────────────────

/// One violated rule on one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field_id: FieldId,
    /// Rule identifier, e.g. "required", "minLength", "email".
    pub rule: &'static str,
    pub message: String,
}

pub type FieldErrors = SmallVec<[FieldError; 2]>;

/// Evaluate every rule of `field` against `value` (`None` = not submitted).
#[must_use]
pub fn validate_field(field: &FieldInstance, value: Option<&FieldValue>) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if field.field_type.is_layout() || !field.field_type.is_known() {
        return errors;
    }

    let label = field.label.as_str();
    let mut fail = |rule: &'static str, message: String| {
        errors.push(FieldError {
            field_id: field.id,
            rule,
            message,
        });
    };

    let value = match value {
        Some(v) if !v.is_empty() => v,
        _ => {
            if field.required {
                fail("required", format!("{label} is required"));
            }
            return errors;
        }
    };

    let rules = &field.validation;
    match &field.field_type {
        FieldType::Text => {
            let Some(text) = value.as_text() else {
                fail("type", format!("{label} has an invalid value"));
                return errors;
            };
            let len = text.chars().count();
            if let Some(min) = rules.min_length
                && len < min as usize
            {
                fail("minLength", format!("{label} must be at least {min} characters"));
            }
            if let Some(max) = rules.max_length
                && len > max as usize
            {
                fail("maxLength", format!("{label} must be at most {max} characters"));
            }
        }
        FieldType::Email => {
            if !value.as_text().is_some_and(|s| looks_like_email(s.trim())) {
                fail("email", format!("{label} must be a valid email address"));
            }
        }
        FieldType::Number => {
            let Some(n) = value.as_number() else {
                fail("number", format!("{label} must be a number"));
                return errors;
            };
            if let Some(min) = rules.min
                && n < min
            {
                fail("min", format!("{label} must be at least {min}"));
            }
            if let Some(max) = rules.max
                && n > max
            {
                fail("max", format!("{label} must be at most {max}"));
            }
        }
        FieldType::Dropdown | FieldType::Radio => {
            if !value.as_text().is_some_and(|s| field.options.contains(&s)) {
                fail("option", format!("{label} must be one of the listed options"));
            }
        }
        FieldType::Checkbox => {
            let chosen: Vec<String> = match value {
                FieldValue::Multiple(items) => items.clone(),
                other => other.as_text().into_iter().collect(),
            };
            if chosen.iter().any(|c| !field.options.contains(c)) {
                fail("option", format!("{label} must be one of the listed options"));
            }
        }
        FieldType::File => {
            let FieldValue::File(upload) = value else {
                fail("type", format!("{label} has an invalid value"));
                return errors;
            };
            if let Some(accept) = rules.accept.as_deref()
                && !accept_matches(accept, upload)
            {
                fail("accept", format!("{label} must be a file of type {accept}"));
            }
            if let Some(max_mb) = rules.max_size
                && upload.size as f64 > max_mb * 1024.0 * 1024.0
            {
                fail("maxSize", format!("{label} must be at most {max_mb} MB"));
            }
        }
        FieldType::Phone | FieldType::Date | FieldType::Textarea => {}
        FieldType::Section | FieldType::Page | FieldType::Unknown(_) => {}
    }
    errors
}

/// Evaluate a whole submission in field order.
#[must_use]
pub fn validate_submission(schema: &FormSchema, values: &SubmissionValues) -> Vec<FieldError> {
    let errors: Vec<FieldError> = schema
        .fields
        .iter()
        .flat_map(|f| validate_field(f, values.get(&f.id)))
        .collect();
    if !errors.is_empty() {
        log::debug!("submission rejected with {} error(s)", errors.len());
    }
    errors
}

fn looks_like_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !s.contains(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        && !domain.ends_with('.')
}

/// Match an upload against a comma-separated allow-list of extensions
/// (`.pdf`), exact MIME types (`application/pdf`) and MIME wildcards
/// (`image/*`).
fn accept_matches(accept: &str, upload: &FileUpload) -> bool {
    let name = upload.name.to_ascii_lowercase();
    let mime = upload.mime.to_ascii_lowercase();
    let mut any = false;
    for pattern in accept.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        any = true;
        let pattern = pattern.to_ascii_lowercase();
        let ok = if pattern.starts_with('.') {
            name.ends_with(&pattern)
        } else if let Some(prefix) = pattern.strip_suffix("/*") {
            mime.split_once('/').is_some_and(|(major, _)| major == prefix)
        } else {
            mime == pattern
        };
        if ok {
            return true;
        }
    }
    // An allow-list of only separators constrains nothing.
    !any
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldPosition;
    use pretty_assertions::assert_eq;

    fn field(t: FieldType) -> FieldInstance {
        FieldInstance::new(FieldId::generate(|_| false), t, FieldPosition::default())
    }

    fn rules(f: impl FnOnce(&mut ValidationRules)) -> ValidationRules {
        let mut r = ValidationRules::default();
        f(&mut r);
        r
    }

    #[test]
    fn required_empty_mentions_label() {
        let mut f = field(FieldType::Text);
        f.label = "Full name".into();
        f.required = true;
        for value in [None, Some(FieldValue::Empty), Some(FieldValue::text("   "))] {
            let errors = validate_field(&f, value.as_ref());
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].rule, "required");
            assert_eq!(errors[0].message, "Full name is required");
        }
    }

    #[test]
    fn optional_empty_passes_all_rules() {
        let mut f = field(FieldType::Number);
        f.validation = rules(|r| r.min = Some(5.0));
        assert!(validate_field(&f, None).is_empty());
    }

    #[test]
    fn number_min_is_inclusive() {
        let mut f = field(FieldType::Number);
        f.label = "Age".into();
        f.validation = rules(|r| r.min = Some(5.0));
        let low = validate_field(&f, Some(&FieldValue::Number(3.0)));
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].message, "Age must be at least 5");
        assert!(validate_field(&f, Some(&FieldValue::Number(5.0))).is_empty());
        assert!(validate_field(&f, Some(&FieldValue::text("5"))).is_empty());
    }

    #[test]
    fn number_rejects_non_numeric_text() {
        let f = field(FieldType::Number);
        let errors = validate_field(&f, Some(&FieldValue::text("five")));
        assert_eq!(errors[0].rule, "number");
    }

    #[test]
    fn non_finite_numbers_fail_the_number_rule() {
        let mut f = field(FieldType::Number);
        f.validation = rules(|r| {
            r.min = Some(5.0);
            r.max = Some(10.0);
        });
        for text in ["NaN", "inf", "-inf", "infinity"] {
            let errors = validate_field(&f, Some(&FieldValue::text(text)));
            assert_eq!(errors.len(), 1, "{text}");
            assert_eq!(errors[0].rule, "number", "{text}");
        }
        let errors = validate_field(&f, Some(&FieldValue::Number(f64::INFINITY)));
        assert_eq!(errors[0].rule, "number");
        assert!(validate_field(&f, Some(&FieldValue::text("7"))).is_empty());
    }

    #[test]
    fn text_length_bounds() {
        let mut f = field(FieldType::Text);
        f.validation = rules(|r| {
            r.min_length = Some(2);
            r.max_length = Some(4);
        });
        assert_eq!(validate_field(&f, Some(&FieldValue::text("a")))[0].rule, "minLength");
        assert_eq!(validate_field(&f, Some(&FieldValue::text("abcde")))[0].rule, "maxLength");
        assert!(validate_field(&f, Some(&FieldValue::text("äöü"))).is_empty());
    }

    #[test]
    fn length_rules_ignored_on_other_types() {
        let mut f = field(FieldType::Textarea);
        f.validation = rules(|r| r.max_length = Some(1));
        assert!(validate_field(&f, Some(&FieldValue::text("long text"))).is_empty());
    }

    #[test]
    fn email_format() {
        let f = field(FieldType::Email);
        assert!(validate_field(&f, Some(&FieldValue::text("a@b.io"))).is_empty());
        for bad in ["ab.io", "a@b", "@b.io", "a b@c.io", "a@b."] {
            assert_eq!(
                validate_field(&f, Some(&FieldValue::text(bad)))[0].rule,
                "email",
                "{bad}"
            );
        }
    }

    #[test]
    fn choices_must_come_from_options() {
        let radio = field(FieldType::Radio);
        assert!(validate_field(&radio, Some(&FieldValue::text("Option 2"))).is_empty());
        assert_eq!(
            validate_field(&radio, Some(&FieldValue::text("Other")))[0].rule,
            "option"
        );

        let mut boxes = field(FieldType::Checkbox);
        boxes.required = true;
        let picked = FieldValue::Multiple(vec!["Option 1".into()]);
        assert!(validate_field(&boxes, Some(&picked)).is_empty());
        let none = FieldValue::Multiple(vec![]);
        assert_eq!(validate_field(&boxes, Some(&none))[0].rule, "required");
    }

    #[test]
    fn file_accept_and_size() {
        let mut f = field(FieldType::File);
        f.label = "Resume".into();
        f.validation = rules(|r| {
            r.accept = Some(".pdf, image/*".into());
            r.max_size = Some(1.0);
        });
        let pdf = FileUpload {
            name: "CV.PDF".into(),
            size: 1024,
            mime: String::new(),
        };
        assert!(validate_field(&f, Some(&FieldValue::File(pdf))).is_empty());

        let png = FileUpload {
            name: "photo".into(),
            size: 2 * 1024 * 1024,
            mime: "image/png".into(),
        };
        let errors = validate_field(&f, Some(&FieldValue::File(png)));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Resume must be at most 1 MB");

        let doc = FileUpload {
            name: "notes.docx".into(),
            size: 10,
            mime: "application/msword".into(),
        };
        assert_eq!(validate_field(&f, Some(&FieldValue::File(doc)))[0].rule, "accept");
    }

    #[test]
    fn layout_fields_never_fail() {
        let mut f = field(FieldType::Section);
        f.required = true;
        assert!(validate_field(&f, None).is_empty());
    }

    #[test]
    fn edits_parse_like_form_inputs() {
        assert_eq!(
            ValidationEdit::parse(ValidationKey::MinLength, "12px"),
            ValidationEdit::MinLength(Some(12))
        );
        assert_eq!(
            ValidationEdit::parse(ValidationKey::Max, ""),
            ValidationEdit::Max(None)
        );
        assert_eq!(
            ValidationEdit::parse(ValidationKey::Min, "abc"),
            ValidationEdit::Min(None)
        );
        assert_eq!(
            ValidationEdit::parse(ValidationKey::Min, "0"),
            ValidationEdit::Min(Some(0.0))
        );
        let r = ValidationRules::default().with(ValidationEdit::parse(ValidationKey::Accept, " .pdf "));
        assert_eq!(r.accept.as_deref(), Some(".pdf"));
    }

    #[test]
    fn rules_preserve_unknown_keys_and_lenient_numbers() {
        let r: ValidationRules =
            serde_json::from_str(r#"{"minLength":"3","pattern":"^a","max":null}"#).unwrap();
        assert_eq!(r.min_length, Some(3));
        assert_eq!(r.max, None);
        assert_eq!(r.extra.get("pattern"), Some(&serde_json::json!("^a")));
        let back = serde_json::to_value(&r).unwrap();
        assert_eq!(back, serde_json::json!({"minLength": 3, "pattern": "^a"}));
    }

    #[test]
    fn submission_reports_in_field_order() {
        let mut schema = FormSchema::default();
        for t in [FieldType::Text, FieldType::Email] {
            let mut f = schema.create_field(t, FieldPosition::default());
            f.required = true;
            schema.add_field(f);
        }
        let errors = validate_submission(&schema, &SubmissionValues::new());
        let ids: Vec<_> = errors.iter().map(|e| e.field_id).collect();
        assert_eq!(ids, schema.ids().collect::<Vec<_>>());
    }
}
