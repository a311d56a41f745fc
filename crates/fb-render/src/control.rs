//! Field → control dispatch shared by both render modes.
//!
//! [`Control::of`] is the single place that maps a field type to what gets
//! drawn. Design mode and fill mode both go through it and differ only in
//! whether the control is inert or live, so the two renderings can never
//! disagree about field semantics.

use fb_core::model::FieldInstance;
use fb_core::registry::FieldType;
use std::borrow::Cow;

/// Whether the control is drawn for building or for filling in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Disabled, never validated.
    Design,
    /// Live, carries constraint attributes and submitted values.
    Fill,
}

/// HTML `type` of a single-line input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Email,
    Tel,
    Number,
    Date,
}

impl InputKind {
    pub fn html_type(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Tel => "tel",
            Self::Number => "number",
            Self::Date => "date",
        }
    }
}

/// What a field renders as.
#[derive(Debug, Clone, PartialEq)]
pub enum Control<'a> {
    Input {
        kind: InputKind,
        placeholder: Cow<'a, str>,
    },
    TextArea {
        placeholder: Cow<'a, str>,
    },
    File {
        accept: Option<&'a str>,
    },
    Select {
        options: &'a [String],
    },
    Radio {
        options: &'a [String],
    },
    Checkboxes {
        options: &'a [String],
    },
    SectionBreak,
    PageBreak,
    /// Tag outside the registry. Always renders a visible placeholder.
    Unknown {
        tag: &'a str,
    },
}

impl<'a> Control<'a> {
    pub fn of(field: &'a FieldInstance) -> Self {
        let explicit = field.placeholder.as_str();
        let or = |fallback: Cow<'a, str>| -> Cow<'a, str> {
            if explicit.is_empty() {
                fallback
            } else {
                Cow::Borrowed(explicit)
            }
        };
        match &field.field_type {
            FieldType::Text | FieldType::Email | FieldType::Phone => {
                let kind = match field.field_type {
                    FieldType::Email => InputKind::Email,
                    FieldType::Phone => InputKind::Tel,
                    _ => InputKind::Text,
                };
                Control::Input {
                    kind,
                    placeholder: or(Cow::Owned(format!(
                        "Enter {}",
                        field.label.to_lowercase()
                    ))),
                }
            }
            FieldType::Number => Control::Input {
                kind: InputKind::Number,
                placeholder: or(Cow::Borrowed("Enter number")),
            },
            FieldType::Date => Control::Input {
                kind: InputKind::Date,
                placeholder: Cow::Borrowed(""),
            },
            FieldType::Textarea => Control::TextArea {
                placeholder: or(Cow::Borrowed("Enter text")),
            },
            FieldType::File => Control::File {
                accept: field.validation.accept.as_deref(),
            },
            FieldType::Dropdown => Control::Select {
                options: &field.options,
            },
            FieldType::Radio => Control::Radio {
                options: &field.options,
            },
            FieldType::Checkbox => Control::Checkboxes {
                options: &field.options,
            },
            FieldType::Section => Control::SectionBreak,
            FieldType::Page => Control::PageBreak,
            FieldType::Unknown(tag) => Control::Unknown { tag },
        }
    }

    /// Layout breaks and unknown controls have no label row.
    pub fn has_label(&self) -> bool {
        !matches!(
            self,
            Control::SectionBreak | Control::PageBreak | Control::Unknown { .. }
        )
    }
}

/// Escape text for HTML content and attribute values.
pub fn escape(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fb_core::id::FieldId;
    use fb_core::model::FieldPosition;

    fn field(t: FieldType) -> FieldInstance {
        FieldInstance::new(FieldId::intern("f"), t, FieldPosition::default())
    }

    #[test]
    fn placeholder_falls_back_to_label() {
        let mut f = field(FieldType::Email);
        f.placeholder.clear();
        f.label = "Work Email".into();
        assert_eq!(
            Control::of(&f),
            Control::Input {
                kind: InputKind::Email,
                placeholder: Cow::Borrowed("Enter work email"),
            }
        );
    }

    #[test]
    fn explicit_placeholder_wins() {
        let f = field(FieldType::Text);
        match Control::of(&f) {
            Control::Input { placeholder, .. } => assert_eq!(placeholder, "Enter text here..."),
            other => panic!("expected input, got {other:?}"),
        }
    }

    #[test]
    fn unknown_tag_keeps_its_name() {
        let f = field(FieldType::Unknown("rating".into()));
        assert_eq!(Control::of(&f), Control::Unknown { tag: "rating" });
        assert!(!Control::of(&f).has_label());
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape("<b>\"x\" & 'y'</b>"), "&lt;b&gt;&quot;x&quot; &amp; &#39;y&#39;&lt;/b&gt;");
    }
}
