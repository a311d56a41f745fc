//! Stacked canvas layout.
//!
//! The canvas shows fields as a vertical stack in list order. This solver
//! turns the field list into absolute row bounds so drag hover and hit
//! testing can work without a DOM. Row heights are estimates per field type,
//! close to what the web canvas draws.

use crate::id::FieldId;
use crate::model::{FieldInstance, FormSchema};
use crate::registry::FieldType;
use serde::{Deserialize, Serialize};

/// Canvas width preset (desktop / tablet / mobile preview).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Desktop,
    Tablet,
    Mobile,
}

impl ViewMode {
    pub fn canvas_width(self) -> f32 {
        match self {
            Self::Desktop => 896.0,
            Self::Tablet => 672.0,
            Self::Mobile => 384.0,
        }
    }
}

/// Spacing constants of the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasMetrics {
    pub padding: f32,
    pub gap: f32,
    pub min_height: f32,
    /// Inner padding of one field card.
    pub row_padding: f32,
    pub label_height: f32,
    pub help_height: f32,
    pub input_height: f32,
    pub textarea_height: f32,
    pub file_height: f32,
    pub option_height: f32,
}

impl Default for CanvasMetrics {
    fn default() -> Self {
        Self {
            padding: 32.0,
            gap: 24.0,
            min_height: 600.0,
            row_padding: 16.0,
            label_height: 28.0,
            help_height: 20.0,
            input_height: 42.0,
            textarea_height: 106.0,
            file_height: 64.0,
            option_height: 32.0,
        }
    }
}

/// Axis-aligned rectangle in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ResolvedBounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ResolvedBounds {
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Vertical midpoint, the reorder swap threshold.
    pub fn mid_y(&self) -> f32 {
        self.y + self.height / 2.0
    }
}

/// Resolved canvas: its own box plus one row per field in list order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CanvasLayout {
    pub canvas: ResolvedBounds,
    pub rows: Vec<(FieldId, ResolvedBounds)>,
}

impl CanvasLayout {
    pub fn bounds_of(&self, id: FieldId) -> Option<ResolvedBounds> {
        self.rows.iter().find(|(rid, _)| *rid == id).map(|(_, b)| *b)
    }

    pub fn row(&self, index: usize) -> Option<(FieldId, ResolvedBounds)> {
        self.rows.get(index).copied()
    }
}

/// Estimated height of one field card.
pub fn row_height(field: &FieldInstance, m: &CanvasMetrics) -> f32 {
    let header = if field.field_type.is_layout() {
        0.0
    } else {
        m.label_height
            + if field.help_text.is_empty() {
                0.0
            } else {
                m.help_height
            }
    };
    let control = match &field.field_type {
        FieldType::Text
        | FieldType::Email
        | FieldType::Phone
        | FieldType::Number
        | FieldType::Date
        | FieldType::Dropdown => m.input_height,
        FieldType::Textarea => m.textarea_height,
        FieldType::File => m.file_height,
        FieldType::Radio | FieldType::Checkbox => m.option_height * field.options.len() as f32,
        FieldType::Section => 18.0,
        FieldType::Page => 50.0,
        FieldType::Unknown(_) => 24.0,
    };
    header + control + m.row_padding * 2.0
}

/// Lay the schema's fields out top to bottom inside a canvas whose origin is
/// `(0, 0)`.
#[must_use]
pub fn resolve_layout(schema: &FormSchema, view: ViewMode, m: &CanvasMetrics) -> CanvasLayout {
    let width = view.canvas_width();
    let inner_width = (width - m.padding * 2.0).max(0.0);
    let mut y = m.padding;
    let mut rows = Vec::with_capacity(schema.fields.len());

    for (i, field) in schema.fields.iter().enumerate() {
        if i > 0 {
            y += m.gap;
        }
        let height = row_height(field, m);
        rows.push((
            field.id,
            ResolvedBounds {
                x: m.padding,
                y,
                width: inner_width,
                height,
            },
        ));
        y += height;
    }

    let content_height = y + m.padding;
    CanvasLayout {
        canvas: ResolvedBounds {
            x: 0.0,
            y: 0.0,
            width,
            height: content_height.max(m.min_height),
        },
        rows,
    }
}
