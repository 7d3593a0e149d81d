//! Hit testing: screen point → field lookup.
//!
//! Reverse-walks a page's views (last rendered = topmost) to find which
//! interactive field is under a pointer position. Id-less fields are
//! render-only and can never capture input, so they are skipped.

use crate::view::FieldView;
use ovf_core::FieldId;
use ovf_core::scale::PageMetrics;

/// Find the topmost field with an id at screen position (px, py).
/// Returns `None` on background or over render-only fields.
pub fn hit_test(
    views: &[FieldView],
    metrics: &PageMetrics,
    px: f64,
    py: f64,
) -> Option<FieldId> {
    let scale = metrics.scale();
    if scale <= 0.0 {
        return None;
    }
    // Undo the page affine once; frames live in stage coordinates.
    let sx = px / scale;
    let sy = py / scale;

    views
        .iter()
        .rev()
        .find(|v| v.id.is_some() && v.frame.contains(sx, sy))
        .and_then(|v| v.id)
}
