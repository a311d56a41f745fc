//! Hit testing: point → field lookup on the stacked canvas.

use fb_core::id::FieldId;
use fb_core::layout::CanvasLayout;

/// Find the field row at canvas position (px, py).
/// Returns `None` for the background (padding, gaps, empty space).
pub fn hit_test(layout: &CanvasLayout, px: f32, py: f32) -> Option<FieldId> {
    hit_index(layout, px, py).map(|i| layout.rows[i].0)
}

/// Like [`hit_test`] but returns the row index.
pub fn hit_index(layout: &CanvasLayout, px: f32, py: f32) -> Option<usize> {
    layout.rows.iter().position(|(_, b)| b.contains(px, py))
}

/// The row a vertical drag position falls into for reordering purposes.
///
/// Unlike [`hit_index`], gaps snap to the row below and positions past the
/// ends clamp to the first/last row, so a drag never loses its target while
/// crossing the space between cards.
pub fn hover_index(layout: &CanvasLayout, py: f32) -> Option<usize> {
    if layout.rows.is_empty() {
        return None;
    }
    let idx = layout
        .rows
        .iter()
        .position(|(_, b)| py <= b.bottom())
        .unwrap_or(layout.rows.len() - 1);
    Some(idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fb_core::layout::{CanvasMetrics, ViewMode, resolve_layout};
    use fb_core::model::{FieldPosition, FormSchema};
    use fb_core::registry::FieldType;

    fn layout() -> (FormSchema, CanvasLayout) {
        let mut s = FormSchema::default();
        for t in [FieldType::Text, FieldType::Text, FieldType::Text] {
            let f = s.create_field(t, FieldPosition::default());
            s.add_field(f);
        }
        let l = resolve_layout(&s, ViewMode::Desktop, &CanvasMetrics::default());
        (s, l)
    }

    #[test]
    fn hit_inside_row() {
        let (s, l) = layout();
        let (_, b) = l.rows[1];
        let (cx, cy) = b.center();
        assert_eq!(hit_test(&l, cx, cy), Some(s.fields[1].id));
    }

    #[test]
    fn miss_on_padding_and_gap() {
        let (_, l) = layout();
        assert_eq!(hit_test(&l, 5.0, 5.0), None);
        let gap_y = l.rows[0].1.bottom() + 1.0;
        assert_eq!(hit_test(&l, 100.0, gap_y), None);
    }

    #[test]
    fn hover_snaps_and_clamps() {
        let (_, l) = layout();
        assert_eq!(hover_index(&l, -50.0), Some(0));
        assert_eq!(hover_index(&l, l.rows[0].1.bottom() + 1.0), Some(1));
        assert_eq!(hover_index(&l, 10_000.0), Some(2));
        assert_eq!(hover_index(&CanvasLayout::default(), 0.0), None);
    }
}
