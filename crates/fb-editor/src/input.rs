//! Input abstraction layer.
//!
//! Normalizes the pointer-drag protocol of the web canvas (drag sources,
//! drop targets, clicks) into `CanvasEvent`s consumed by the canvas engine.
//! Pointer coordinates are client coordinates; the canvas engine subtracts
//! its own origin.

use fb_core::id::FieldId;
use fb_core::layout::ResolvedBounds;
use fb_core::registry::FieldType;

/// A pointer position in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// What is being dragged.
#[derive(Debug, Clone, PartialEq)]
pub enum DragItem {
    /// A palette entry; dropping it creates a field.
    NewField { field_type: FieldType },
    /// A field already on the canvas, with its current list index.
    ExistingField { id: FieldId, index: usize },
}

/// The field a drag is hovering over, as measured by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoverTarget {
    pub index: usize,
    /// Client-space bounds of the hovered field card.
    pub bounds: ResolvedBounds,
}

/// A normalized canvas interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    /// A drag began on a palette item or a field card.
    DragStart { item: DragItem },

    /// The active drag moved. `target` is `None` when the host only knows the
    /// pointer; the engine then resolves the target from its own layout.
    Hover {
        pointer: Option<Point>,
        target: Option<HoverTarget>,
    },

    /// The active drag was released over the canvas.
    Drop { pointer: Option<Point> },

    /// The active drag was released outside any drop target.
    DragCancel,

    /// A click that the host already resolved to a field.
    ClickField { id: FieldId },

    /// A click on the empty canvas background.
    ClickBackground,

    /// A raw click; the engine hit-tests it.
    Click { pointer: Point },

    /// A palette item was activated without dragging.
    PaletteActivate { field_type: FieldType },
}

impl CanvasEvent {
    /// Extract the pointer position if this event carries one.
    pub fn pointer(&self) -> Option<Point> {
        match self {
            Self::Hover { pointer, .. } | Self::Drop { pointer } => *pointer,
            Self::Click { pointer } => Some(*pointer),
            _ => None,
        }
    }
}
