//! Design-time rendering: the canvas view of a schema.
//!
//! Every control is disabled and no rule is evaluated. The selected field
//! gets a `selected` class and its delete/drag handles.

use crate::control::{Control, RenderMode, escape};
use crate::html::{render_control, render_label};
use fb_core::id::FieldId;
use fb_core::model::{FieldInstance, FormSchema};

/// Render the whole canvas.
pub fn render_canvas(schema: &FormSchema, selected: Option<FieldId>) -> String {
    let mut out = String::new();
    out.push_str("<div class=\"canvas\">\n");
    if schema.fields.is_empty() {
        out.push_str(
            "  <div class=\"canvas-empty\">\n    <div>Start building your form</div>\n    \
             <div>Drag form elements from the sidebar to begin</div>\n  </div>\n",
        );
    }
    for (index, field) in schema.fields.iter().enumerate() {
        render_field(&mut out, field, index, selected == Some(field.id));
    }
    out.push_str("</div>\n");
    log::trace!("DESIGN {} field(s)", schema.fields.len());
    out
}

/// Render one field card.
pub fn render_field(out: &mut String, field: &FieldInstance, index: usize, selected: bool) {
    let control = Control::of(field);
    out.push_str(&format!(
        "  <div class=\"form-field{}\" data-field-id=\"{}\" data-index=\"{index}\">\n",
        if selected { " selected" } else { "" },
        escape(field.id.as_str()),
    ));
    if selected {
        out.push_str(
            "    <div class=\"field-actions\"><button class=\"delete\">Delete</button>\
             <span class=\"drag-handle\"></span></div>\n",
        );
    }
    if control.has_label() {
        render_label(out, field, RenderMode::Design);
    }
    render_control(out, field, &control, RenderMode::Design, None);
    out.push_str("  </div>\n");
}
