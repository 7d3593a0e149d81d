//! Page views → backend-neutral drawing commands.
//!
//! Walks a page's resolved field views and emits paint operations with
//! the page scale applied as a top-left-origin affine: the background
//! image, field labels, static value echoes, and placement rects for
//! interactive controls the host materializes itself.

use crate::view::{Control, FieldView, label_origin};
use kurbo::{Affine, Point, Rect};
use ovf_core::FieldId;
use ovf_core::model::Page;
use ovf_core::scale::{PageMetrics, StageRect};

const LABEL_SIZE: f64 = 12.0;
const DEFAULT_TEXT_SIZE: f64 = 14.0;

/// One drawing command, in screen coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum PaintOp {
    /// Draw an image resource (background or a signature echo).
    Image { src: String, rect: Rect },
    /// Draw a run of text.
    Text {
        text: String,
        origin: Point,
        size: f64,
        color: Option<String>,
    },
    /// Reserve a rect for a host-materialized interactive control.
    Control { id: Option<FieldId>, rect: Rect },
}

/// Paint one page. Ops are emitted back-to-front in document order; the
/// background always comes first.
pub fn paint_page(page: &Page, views: &[FieldView], metrics: &PageMetrics) -> Vec<PaintOp> {
    let scale = metrics.scale();
    let affine = Affine::scale(scale);
    let mut ops = Vec::with_capacity(1 + views.len() * 2);

    let intrinsic = metrics.intrinsic();
    if !page.bg.is_empty() {
        ops.push(PaintOp::Image {
            src: page.bg.clone(),
            rect: affine
                .transform_rect_bbox(Rect::new(0.0, 0.0, intrinsic.width, intrinsic.height)),
        });
    }

    for view in views {
        if let Some(label) = &view.label {
            ops.push(PaintOp::Text {
                text: label.clone(),
                origin: affine * label_origin(&view.frame),
                size: LABEL_SIZE * scale,
                color: None,
            });
        }

        let frame = to_screen(&view.frame, affine);
        match &view.control {
            Control::StaticText { text } => {
                if !text.is_empty() {
                    ops.push(PaintOp::Text {
                        text: text.clone(),
                        origin: frame.origin(),
                        size: view.font_size.unwrap_or(DEFAULT_TEXT_SIZE) * scale,
                        color: view.color.clone(),
                    });
                }
            }
            Control::StaticImage { src } => {
                if let Some(src) = src {
                    ops.push(PaintOp::Image {
                        src: src.clone(),
                        rect: frame,
                    });
                }
            }
            // Interactive controls are widgets, not strokes: the host
            // places them into the reserved rect.
            Control::TextInput { .. }
            | Control::Select { .. }
            | Control::Checkbox { .. }
            | Control::RadioGroup { .. }
            | Control::SignaturePad { .. } => {
                ops.push(PaintOp::Control {
                    id: view.id,
                    rect: frame,
                });
            }
        }
    }

    log::trace!(
        "painted page with {} views into {} ops at scale {scale:.3}",
        views.len(),
        ops.len()
    );
    ops
}

fn to_screen(frame: &StageRect, affine: Affine) -> Rect {
    affine.transform_rect_bbox(Rect::new(
        frame.x,
        frame.y,
        frame.x + frame.width,
        frame.y + frame.height,
    ))
}
