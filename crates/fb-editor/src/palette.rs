//! The field palette: registry entries a user can drag onto the canvas or
//! activate directly.

use crate::input::{CanvasEvent, DragItem};
use fb_core::registry::{self, FieldType, FieldTypeDefinition, UnknownFieldType};

/// One palette entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteItem {
    pub field_type: FieldType,
    pub label: &'static str,
    pub description: &'static str,
}

impl PaletteItem {
    pub fn tag(&self) -> &str {
        self.field_type.tag()
    }
}

impl From<&'static FieldTypeDefinition> for PaletteItem {
    fn from(def: &'static FieldTypeDefinition) -> Self {
        Self {
            field_type: def.field_type.clone(),
            label: def.display_label,
            description: def.description,
        }
    }
}

/// Every registered type, in registry order.
pub fn items() -> Vec<PaletteItem> {
    registry::all().iter().map(PaletteItem::from).collect()
}

/// Start dragging the palette entry for `tag`.
pub fn drag_item(tag: &str) -> Result<DragItem, UnknownFieldType> {
    let def = registry::lookup(tag)?;
    Ok(DragItem::NewField {
        field_type: def.field_type.clone(),
    })
}

/// Activate the entry for `tag` without a drag. Produces the same creation
/// as a drop, minus a pointer position.
pub fn activate(tag: &str) -> Result<CanvasEvent, UnknownFieldType> {
    let def = registry::lookup(tag)?;
    Ok(CanvasEvent::PaletteActivate {
        field_type: def.field_type.clone(),
    })
}
