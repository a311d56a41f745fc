//! Canvas engine: drag/drop creation, live reordering and click selection.
//!
//! Translates [`CanvasEvent`]s into [`FieldMutation`]s for the session to
//! apply, the same way the drawing tools of a design canvas turn pointer
//! input into graph edits.
//!
//! ## Reorder hysteresis
//!
//! While an existing field is dragged over another, a swap happens only
//! once the pointer crosses the hovered field's vertical midpoint in the
//! direction of travel:
//!
//! | Drag index vs hover index | Swap when pointer is |
//! |---------------------------|----------------------|
//! | drag < hover (moving down) | at or below the midpoint |
//! | drag > hover (moving up)   | at or above the midpoint |
//!
//! After each swap the drag item's index is updated to the hovered index,
//! so a pointer hovering at the boundary does not flip the pair back.

use crate::input::{CanvasEvent, DragItem, HoverTarget, Point};
use crate::sync::FieldMutation;
use fb_core::layout::{CanvasLayout, CanvasMetrics, ResolvedBounds, ViewMode, resolve_layout};
use fb_core::model::{FieldPosition, FormSchema};
use fb_render::hit::{hit_test, hover_index};

/// Canvas interaction failures. None of these touch the schema.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CanvasError {
    #[error("drop without a pointer position")]
    InvalidDrop,
}

/// Whether hovering `pointer_y` over the field at `hover_index` should move
/// the dragged field there.
pub fn reorder_triggered(
    drag_index: usize,
    hover_index: usize,
    pointer_y: f32,
    target: &ResolvedBounds,
) -> bool {
    if drag_index == hover_index {
        return false;
    }
    let middle = target.height / 2.0;
    let offset = pointer_y - target.y;
    if drag_index < hover_index && offset < middle {
        return false;
    }
    if drag_index > hover_index && offset > middle {
        return false;
    }
    true
}

pub struct CanvasEngine {
    /// Client-space position of the canvas's top-left corner.
    origin: Point,
    view: ViewMode,
    metrics: CanvasMetrics,
    layout: CanvasLayout,
    drag: Option<DragItem>,
}

impl CanvasEngine {
    pub fn new(view: ViewMode, metrics: CanvasMetrics) -> Self {
        Self {
            origin: Point::default(),
            view,
            metrics,
            layout: CanvasLayout::default(),
            drag: None,
        }
    }

    pub fn set_origin(&mut self, origin: Point) {
        self.origin = origin;
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view
    }

    pub fn set_view_mode(&mut self, view: ViewMode, schema: &FormSchema) {
        self.view = view;
        self.relayout(schema);
    }

    pub fn layout(&self) -> &CanvasLayout {
        &self.layout
    }

    /// Recompute row bounds after the field list changed.
    pub fn relayout(&mut self, schema: &FormSchema) {
        self.layout = resolve_layout(schema, self.view, &self.metrics);
    }

    pub fn dragging(&self) -> Option<&DragItem> {
        self.drag.as_ref()
    }

    fn to_canvas(&self, p: Point) -> Point {
        Point::new(p.x - self.origin.x, p.y - self.origin.y)
    }

    /// Handle one event against the current schema.
    pub fn handle(
        &mut self,
        event: &CanvasEvent,
        schema: &FormSchema,
    ) -> Result<Vec<FieldMutation>, CanvasError> {
        match event {
            CanvasEvent::DragStart { item } => {
                let item = match *item {
                    // The schema, not the host, knows where the field sits.
                    DragItem::ExistingField { id, index } => DragItem::ExistingField {
                        id,
                        index: schema.index_of(id).unwrap_or(index),
                    },
                    ref other => other.clone(),
                };
                log::trace!("canvas: drag start {item:?}");
                self.drag = Some(item);
                Ok(Vec::new())
            }
            CanvasEvent::Hover { pointer, target } => Ok(self.hover(*pointer, *target, schema)),
            CanvasEvent::Drop { pointer } => self.drop_at(*pointer, schema),
            CanvasEvent::DragCancel => {
                self.drag = None;
                Ok(Vec::new())
            }
            CanvasEvent::ClickField { id } => Ok(vec![FieldMutation::Select(Some(*id))]),
            CanvasEvent::ClickBackground => Ok(vec![FieldMutation::Select(None)]),
            CanvasEvent::Click { pointer } => {
                let p = self.to_canvas(*pointer);
                Ok(vec![FieldMutation::Select(hit_test(&self.layout, p.x, p.y))])
            }
            CanvasEvent::PaletteActivate { field_type } => {
                let field = schema.create_field(field_type.clone(), FieldPosition::stacked(schema.len()));
                log::debug!("canvas: palette added {} `{}`", field.field_type, field.id);
                Ok(vec![FieldMutation::AddField {
                    field: Box::new(field),
                    select: true,
                }])
            }
        }
    }

    fn drop_at(
        &mut self,
        pointer: Option<Point>,
        schema: &FormSchema,
    ) -> Result<Vec<FieldMutation>, CanvasError> {
        let Some(item) = self.drag.take() else {
            return Ok(Vec::new());
        };
        match item {
            DragItem::NewField { field_type } => {
                let p = self.to_canvas(pointer.ok_or(CanvasError::InvalidDrop)?);
                let field = schema.create_field(field_type, FieldPosition::at(p.x, p.y));
                log::debug!("canvas: dropped {} `{}` at ({}, {})", field.field_type, field.id, p.x, p.y);
                Ok(vec![FieldMutation::AddField {
                    field: Box::new(field),
                    select: true,
                }])
            }
            // Reorders already happened while hovering.
            DragItem::ExistingField { .. } => Ok(Vec::new()),
        }
    }

    fn hover(
        &mut self,
        pointer: Option<Point>,
        target: Option<HoverTarget>,
        schema: &FormSchema,
    ) -> Vec<FieldMutation> {
        let Some(DragItem::ExistingField { id, index }) = self.drag.as_mut() else {
            return Vec::new();
        };
        let Some(pointer) = pointer else {
            return Vec::new();
        };

        let (hover_idx, bounds, pointer_y) = match target {
            Some(t) => (t.index, t.bounds, pointer.y),
            None => {
                let y = pointer.y - self.origin.y;
                let Some(i) = hover_index(&self.layout, y) else {
                    return Vec::new();
                };
                let Some((_, b)) = self.layout.row(i) else {
                    return Vec::new();
                };
                (i, b, y)
            }
        };

        if hover_idx >= schema.len() || !schema.contains(*id) {
            return Vec::new();
        }
        if !reorder_triggered(*index, hover_idx, pointer_y, &bounds) {
            return Vec::new();
        }

        log::trace!("canvas: reorder {id} {index} -> {hover_idx}");
        *index = hover_idx;
        vec![FieldMutation::MoveField {
            id: *id,
            to: hover_idx,
        }]
    }
}
