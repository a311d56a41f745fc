//! HTML emission for a single control in either mode.

use crate::control::{Control, RenderMode, escape};
use fb_core::model::FieldInstance;
use fb_core::validation::FieldValue;

pub(crate) fn render_label(out: &mut String, field: &FieldInstance, mode: RenderMode) {
    let target = match mode {
        RenderMode::Design => String::new(),
        RenderMode::Fill => format!(" for=\"{}\"", escape(field.id.as_str())),
    };
    out.push_str(&format!("    <label{target}>{}", escape(&field.label)));
    if field.required {
        out.push_str("<span class=\"required\">*</span>");
    }
    out.push_str("</label>\n");
    if !field.help_text.is_empty() {
        out.push_str(&format!(
            "    <div class=\"help-text\">{}</div>\n",
            escape(&field.help_text)
        ));
    }
}

/// Leading attributes shared by every input element: `disabled` in design
/// mode, name/id plus constraints in fill mode.
fn base_attrs(field: &FieldInstance, mode: RenderMode, with_id: bool) -> String {
    match mode {
        RenderMode::Design => " disabled".to_string(),
        RenderMode::Fill => {
            let id = escape(field.id.as_str());
            let mut attrs = format!(" name=\"{id}\"");
            if with_id {
                attrs.push_str(&format!(" id=\"{id}\""));
            }
            attrs
        }
    }
}

fn constraint_attrs(field: &FieldInstance, mode: RenderMode) -> String {
    if mode == RenderMode::Design {
        return String::new();
    }
    let v = &field.validation;
    let mut attrs = String::new();
    if field.required {
        attrs.push_str(" required");
    }
    match field.field_type {
        fb_core::FieldType::Text => {
            if let Some(n) = v.min_length {
                attrs.push_str(&format!(" minlength=\"{n}\""));
            }
            if let Some(n) = v.max_length {
                attrs.push_str(&format!(" maxlength=\"{n}\""));
            }
        }
        fb_core::FieldType::Number => {
            if let Some(n) = v.min {
                attrs.push_str(&format!(" min=\"{n}\""));
            }
            if let Some(n) = v.max {
                attrs.push_str(&format!(" max=\"{n}\""));
            }
        }
        _ => {}
    }
    attrs
}

fn text_value(value: Option<&FieldValue>) -> Option<String> {
    match value? {
        FieldValue::Text(s) => Some(s.clone()),
        FieldValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn is_chosen(value: Option<&FieldValue>, option: &str) -> bool {
    match value {
        Some(FieldValue::Text(s)) => s == option,
        Some(FieldValue::Multiple(items)) => items.iter().any(|i| i == option),
        _ => false,
    }
}

pub(crate) fn render_control(
    out: &mut String,
    field: &FieldInstance,
    control: &Control<'_>,
    mode: RenderMode,
    value: Option<&FieldValue>,
) {
    let fill = mode == RenderMode::Fill;
    match control {
        Control::Input { kind, placeholder } => {
            let mut tail = String::new();
            if !placeholder.is_empty() {
                tail.push_str(&format!(" placeholder=\"{}\"", escape(placeholder)));
            }
            if fill && let Some(v) = text_value(value) {
                tail.push_str(&format!(" value=\"{}\"", escape(&v)));
            }
            out.push_str(&format!(
                "    <input{} type=\"{}\"{tail}{}>\n",
                base_attrs(field, mode, true),
                kind.html_type(),
                constraint_attrs(field, mode),
            ));
        }
        Control::TextArea { placeholder } => {
            let body = if fill {
                text_value(value).unwrap_or_default()
            } else {
                String::new()
            };
            out.push_str(&format!(
                "    <textarea{} rows=\"4\" placeholder=\"{}\"{}>{}</textarea>\n",
                base_attrs(field, mode, true),
                escape(placeholder),
                constraint_attrs(field, mode),
                escape(&body),
            ));
        }
        Control::File { accept } => match mode {
            RenderMode::Design => out.push_str(
                "    <div class=\"file-drop\">Click to upload or drag and drop</div>\n",
            ),
            RenderMode::Fill => {
                let accept = accept
                    .map(|a| format!(" accept=\"{}\"", escape(a)))
                    .unwrap_or_default();
                out.push_str(&format!(
                    "    <input{} type=\"file\"{accept}{}>\n",
                    base_attrs(field, mode, true),
                    constraint_attrs(field, mode),
                ));
            }
        },
        Control::Select { options } => {
            out.push_str(&format!(
                "    <select{}{}>\n      <option value=\"\">Select an option</option>\n",
                base_attrs(field, mode, true),
                constraint_attrs(field, mode),
            ));
            for option in options.iter() {
                let selected = if fill && is_chosen(value, option) {
                    " selected"
                } else {
                    ""
                };
                out.push_str(&format!(
                    "      <option value=\"{0}\"{selected}>{0}</option>\n",
                    escape(option)
                ));
            }
            out.push_str("    </select>\n");
        }
        Control::Radio { options } | Control::Checkboxes { options } => {
            let input_type = if matches!(control, Control::Radio { .. }) {
                "radio"
            } else {
                "checkbox"
            };
            // A required checkbox group means "at least one", which the
            // browser attribute cannot express; the evaluator enforces it.
            let constraints = if input_type == "radio" {
                constraint_attrs(field, mode)
            } else {
                String::new()
            };
            out.push_str(&format!("    <div class=\"{input_type}-group\">\n"));
            for option in options.iter() {
                let checked = if fill && is_chosen(value, option) {
                    " checked"
                } else {
                    ""
                };
                out.push_str(&format!(
                    "      <label><input{} type=\"{input_type}\" value=\"{1}\"{checked}{constraints}><span>{1}</span></label>\n",
                    base_attrs(field, mode, false),
                    escape(option),
                ));
            }
            out.push_str("    </div>\n");
        }
        Control::SectionBreak => out.push_str("    <hr class=\"section-break\">\n"),
        Control::PageBreak => {
            out.push_str("    <div class=\"page-break\"><div>Page Break</div></div>\n")
        }
        Control::Unknown { tag } => {
            log::debug!("rendering placeholder for unknown field type `{tag}`");
            out.push_str(&format!(
                "    <div class=\"unknown-field\" data-type=\"{}\">Unknown field type</div>\n",
                escape(tag)
            ));
        }
    }
}
