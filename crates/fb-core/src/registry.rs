//! Field type registry.
//!
//! A static catalog of the field primitives a form can be built from. The
//! palette enumerates it, the canvas pulls defaults from it, and both
//! renderers dispatch on the closed [`FieldType`] set it defines.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// The closed set of field type tags, plus a carrier for tags this build does
/// not recognize (read back from storage written by a newer client).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    Text,
    Email,
    Number,
    Phone,
    Date,
    Textarea,
    File,
    Dropdown,
    Radio,
    Checkbox,
    Section,
    Page,
    Unknown(String),
}

impl FieldType {
    /// All known types in palette order.
    pub const KNOWN: [FieldType; 12] = [
        FieldType::Text,
        FieldType::Textarea,
        FieldType::Email,
        FieldType::Number,
        FieldType::Date,
        FieldType::Phone,
        FieldType::File,
        FieldType::Dropdown,
        FieldType::Radio,
        FieldType::Checkbox,
        FieldType::Section,
        FieldType::Page,
    ];

    /// Parse a tag. Never fails: unrecognized tags become `Unknown`.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "text" => Self::Text,
            "email" => Self::Email,
            "number" => Self::Number,
            "phone" => Self::Phone,
            "date" => Self::Date,
            "textarea" => Self::Textarea,
            "file" => Self::File,
            "dropdown" => Self::Dropdown,
            "radio" => Self::Radio,
            "checkbox" => Self::Checkbox,
            "section" => Self::Section,
            "page" => Self::Page,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Number => "number",
            Self::Phone => "phone",
            Self::Date => "date",
            Self::Textarea => "textarea",
            Self::File => "file",
            Self::Dropdown => "dropdown",
            Self::Radio => "radio",
            Self::Checkbox => "checkbox",
            Self::Section => "section",
            Self::Page => "page",
            Self::Unknown(tag) => tag,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }

    /// Dropdown, radio and checkbox carry an options list.
    pub fn has_options(&self) -> bool {
        matches!(self, Self::Dropdown | Self::Radio | Self::Checkbox)
    }

    /// Section and page breaks are layout-only: no label row, no input, no
    /// validation.
    pub fn is_layout(&self) -> bool {
        matches!(self, Self::Section | Self::Page)
    }

    /// Default label for a freshly created field: `"Text Field"`, ...
    pub fn default_label(&self) -> String {
        let tag = self.tag();
        let mut chars = tag.chars();
        match chars.next() {
            Some(first) => format!("{}{} Field", first.to_uppercase(), chars.as_str()),
            None => "Field".to_string(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl Serialize for FieldType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(FieldType::from_tag(&tag))
    }
}

/// Immutable catalog entry for one field type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTypeDefinition {
    pub field_type: FieldType,
    /// Palette label, e.g. "Radio Buttons".
    pub display_label: &'static str,
    /// Palette subtitle, e.g. "Single choice options".
    pub description: &'static str,
    pub default_placeholder: &'static str,
    pub has_options: bool,
}

/// Lookup failure for a tag outside the registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown field type `{tag}`")]
pub struct UnknownFieldType {
    pub tag: String,
}

const fn def(
    field_type: FieldType,
    display_label: &'static str,
    description: &'static str,
    default_placeholder: &'static str,
    has_options: bool,
) -> FieldTypeDefinition {
    FieldTypeDefinition {
        field_type,
        display_label,
        description,
        default_placeholder,
        has_options,
    }
}

static DEFINITIONS: [FieldTypeDefinition; 12] = [
    def(FieldType::Text, "Text Input", "Single line text input", "Enter text here...", false),
    def(FieldType::Textarea, "Textarea", "Multi-line text input", "Enter your message...", false),
    def(FieldType::Email, "Email", "Email address input", "Enter your email address...", false),
    def(FieldType::Number, "Number", "Numeric input", "Enter a number...", false),
    def(FieldType::Date, "Date", "Date picker", "", false),
    def(FieldType::Phone, "Phone", "Phone number input", "Enter your phone number...", false),
    def(FieldType::File, "File Upload", "File upload field", "", false),
    def(FieldType::Dropdown, "Dropdown", "Select dropdown", "", true),
    def(FieldType::Radio, "Radio Buttons", "Single choice options", "", true),
    def(FieldType::Checkbox, "Checkboxes", "Multiple choice options", "", true),
    def(FieldType::Section, "Section Break", "Visual section separator", "", false),
    def(FieldType::Page, "Page Break", "Page break for multi-page forms", "", false),
];

/// All definitions in palette order.
pub fn all() -> &'static [FieldTypeDefinition] {
    &DEFINITIONS
}

/// Look up a definition by tag.
pub fn lookup(tag: &str) -> Result<&'static FieldTypeDefinition, UnknownFieldType> {
    DEFINITIONS
        .iter()
        .find(|d| d.field_type.tag() == tag)
        .ok_or_else(|| UnknownFieldType {
            tag: tag.to_string(),
        })
}

/// Look up the definition of a parsed type. `None` for `Unknown`.
pub fn definition(field_type: &FieldType) -> Option<&'static FieldTypeDefinition> {
    DEFINITIONS.iter().find(|d| &d.field_type == field_type)
}

/// Default placeholder for a tag; `""` for types without a natural one and
/// for unknown tags.
pub fn default_placeholder(tag: &str) -> &'static str {
    lookup(tag).map(|d| d.default_placeholder).unwrap_or("")
}

/// Default options for a new field of this type.
pub fn default_options(field_type: &FieldType) -> Vec<String> {
    if field_type.has_options() {
        vec!["Option 1".to_string(), "Option 2".to_string()]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_covers_every_known_type_once() {
        assert_eq!(all().len(), FieldType::KNOWN.len());
        for (def, known) in all().iter().zip(FieldType::KNOWN.iter()) {
            assert_eq!(&def.field_type, known);
            assert_eq!(def.has_options, known.has_options());
        }
    }

    #[test]
    fn tags_roundtrip() {
        for t in FieldType::KNOWN.iter() {
            assert_eq!(&FieldType::from_tag(t.tag()), t);
        }
        assert_eq!(
            FieldType::from_tag("signature"),
            FieldType::Unknown("signature".into())
        );
    }

    #[test]
    fn lookup_unknown_fails() {
        let err = lookup("signature").unwrap_err();
        assert_eq!(err.tag, "signature");
        assert_eq!(err.to_string(), "unknown field type `signature`");
    }

    #[test]
    fn placeholders() {
        assert_eq!(default_placeholder("text"), "Enter text here...");
        assert_eq!(default_placeholder("email"), "Enter your email address...");
        assert_eq!(default_placeholder("date"), "");
        assert_eq!(default_placeholder("radio"), "");
        assert_eq!(default_placeholder("page"), "");
        assert_eq!(default_placeholder("nope"), "");
    }

    #[test]
    fn default_labels() {
        assert_eq!(FieldType::Text.default_label(), "Text Field");
        assert_eq!(FieldType::Textarea.default_label(), "Textarea Field");
        assert_eq!(FieldType::Unknown("x".into()).default_label(), "X Field");
    }

    #[test]
    fn serde_uses_plain_tags() {
        let json = serde_json::to_string(&FieldType::Dropdown).unwrap();
        assert_eq!(json, "\"dropdown\"");
        let t: FieldType = serde_json::from_str("\"rating\"").unwrap();
        assert_eq!(t, FieldType::Unknown("rating".into()));
    }
}
