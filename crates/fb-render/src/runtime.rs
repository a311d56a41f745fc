//! Run-time (fill-in) rendering.
//!
//! Renders a finalized schema as a live form and evaluates the validation
//! rules when the user attempts to submit. Values are keyed by field id;
//! building and storing the submission record is left to the caller.

use crate::control::{Control, RenderMode, escape};
use crate::html::{render_control, render_label};
use fb_core::id::FieldId;
use fb_core::model::FormSchema;
use fb_core::validation::{FieldError, FieldValue, SubmissionValues, validate_submission};

/// Render the form with the current values and any errors from the last
/// submit attempt.
pub fn render_form(schema: &FormSchema, values: &SubmissionValues, errors: &[FieldError]) -> String {
    let mut out = String::new();
    let form_id = schema
        .id
        .as_ref()
        .map(|id| format!(" data-form-id=\"{}\"", escape(id.as_str())))
        .unwrap_or_default();
    out.push_str(&format!("<form class=\"form-fill\"{form_id}>\n"));
    out.push_str(&format!("  <h1>{}</h1>\n", escape(&schema.title)));
    if !schema.description.is_empty() {
        out.push_str(&format!(
            "  <p class=\"description\">{}</p>\n",
            escape(&schema.description)
        ));
    }

    for field in &schema.fields {
        let control = Control::of(field);
        out.push_str(&format!(
            "  <div class=\"form-field\" data-field-id=\"{}\">\n",
            escape(field.id.as_str())
        ));
        if control.has_label() {
            render_label(&mut out, field, RenderMode::Fill);
        }
        render_control(
            &mut out,
            field,
            &control,
            RenderMode::Fill,
            values.get(&field.id),
        );
        for error in errors.iter().filter(|e| e.field_id == field.id) {
            out.push_str(&format!(
                "    <p class=\"error\" data-rule=\"{}\">{}</p>\n",
                error.rule,
                escape(&error.message)
            ));
        }
        out.push_str("  </div>\n");
    }

    out.push_str("  <button type=\"submit\">Submit Form</button>\n</form>\n");
    out
}

/// State of one fill-in attempt.
#[derive(Debug, Clone)]
pub struct FillSession {
    schema: FormSchema,
    values: SubmissionValues,
    errors: Vec<FieldError>,
}

impl FillSession {
    pub fn new(schema: FormSchema) -> Self {
        Self {
            schema,
            values: SubmissionValues::new(),
            errors: Vec::new(),
        }
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn values(&self) -> &SubmissionValues {
        &self.values
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Errors reported for one field by the last submit attempt.
    pub fn errors_for(&self, id: FieldId) -> impl Iterator<Item = &FieldError> {
        self.errors.iter().filter(move |e| e.field_id == id)
    }

    /// Record a value. Ids outside the schema are ignored. Errors from a
    /// previous attempt on this field are cleared once the value changes.
    pub fn set_value(&mut self, id: FieldId, value: FieldValue) {
        if !self.schema.contains(id) {
            log::warn!("fill: value for unknown field {id} ignored");
            return;
        }
        self.errors.retain(|e| e.field_id != id);
        self.values.insert(id, value);
    }

    /// Evaluate every rule. On success returns the values to hand to the
    /// submission service; on failure keeps the errors for rendering.
    pub fn submit(&mut self) -> Result<SubmissionValues, Vec<FieldError>> {
        self.errors = validate_submission(&self.schema, &self.values);
        if self.errors.is_empty() {
            Ok(self.values.clone())
        } else {
            Err(self.errors.clone())
        }
    }

    pub fn render(&self) -> String {
        render_form(&self.schema, &self.values, &self.errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fb_core::model::{FieldPatch, FieldPosition};
    use fb_core::registry::FieldType;
    use fb_core::validation::ValidationRules;
    use pretty_assertions::assert_eq;

    fn survey() -> FormSchema {
        let mut s = FormSchema::new("Survey");
        s.description = "Tell us <everything>".into();
        for t in [FieldType::Text, FieldType::Number, FieldType::Radio, FieldType::Section] {
            let f = s.create_field(t, FieldPosition::default());
            s.add_field(f);
        }
        let (name, age) = (s.fields[0].id, s.fields[1].id);
        s.update_field(name, &FieldPatch::required(true));
        s.update_field(
            age,
            &FieldPatch::validation(ValidationRules {
                min: Some(18.0),
                ..ValidationRules::default()
            }),
        );
        s
    }

    #[test]
    fn form_carries_constraints_and_escapes_text() {
        let html = render_form(&survey(), &SubmissionValues::new(), &[]);
        assert!(html.contains("<h1>Survey</h1>"));
        assert!(html.contains("Tell us &lt;everything&gt;"));
        assert!(html.contains(" required"));
        assert!(html.contains(" min=\"18\""));
        assert!(!html.contains("disabled"));
        assert!(html.contains("<hr class=\"section-break\">"));
    }

    #[test]
    fn submit_reports_then_clears_errors() {
        let mut fill = FillSession::new(survey());
        let (name, age) = (fill.schema().fields[0].id, fill.schema().fields[1].id);
        fill.set_value(age, FieldValue::Number(12.0));

        let errors = fill.submit().unwrap_err();
        let rules: Vec<_> = errors.iter().map(|e| e.rule).collect();
        assert_eq!(rules, vec!["required", "min"]);
        assert!(fill.render().contains("Text Field is required"));

        fill.set_value(name, FieldValue::text("Ada"));
        assert_eq!(fill.errors_for(name).count(), 0);
        fill.set_value(age, FieldValue::Number(18.0));
        let values = fill.submit().unwrap();
        assert_eq!(values.len(), 2);
        assert!(fill.errors().is_empty());
    }

    #[test]
    fn values_are_rendered_back() {
        let mut fill = FillSession::new(survey());
        let radio = fill.schema().fields[2].id;
        fill.set_value(radio, FieldValue::text("Option 2"));
        let html = fill.render();
        assert!(html.contains("value=\"Option 2\" checked"));
        assert!(!html.contains("value=\"Option 1\" checked"));
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut fill = FillSession::new(survey());
        fill.set_value(FieldId::intern("nope"), FieldValue::text("x"));
        assert!(fill.values().is_empty());
    }
}
