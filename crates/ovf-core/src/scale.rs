//! Page-local coordinate and scale computation.
//!
//! Each page renders on a fixed-size stage matching its background image's
//! intrinsic pixel size; the whole stage is scaled uniformly to the
//! available on-screen width with a top-left transform origin, so
//! percentage-anchored fields stay aligned without per-field math.
//! Until the host reports the real image size, an A4-like fallback keeps
//! layout unblocked.

use crate::model::{Field, FieldKind};

/// Assumed intrinsic page size until the background image loads.
pub const FALLBACK_PAGE: PageSize = PageSize {
    width: 595.0,
    height: 842.0,
};

/// Default control height in stage units when no `inputHeight` hint is set.
const DEFAULT_CONTROL_HEIGHT: f64 = 28.0;
/// Signature pads get a taller default drawing strip.
const SIGNATURE_HEIGHT: f64 = 80.0;

/// Intrinsic pixel dimensions of a page's background image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

/// Per-page scale state. Pages scale independently: two pages with
/// different background sizes each keep their own metrics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageMetrics {
    intrinsic: PageSize,
    avail_width: f64,
    scale: f64,
}

impl PageMetrics {
    /// Metrics for a page whose background has not loaded yet.
    pub fn new(avail_width: f64) -> Self {
        let mut m = Self {
            intrinsic: FALLBACK_PAGE,
            avail_width,
            scale: 1.0,
        };
        m.recompute();
        m
    }

    /// Trigger (a): intrinsic size discovered on image-load completion.
    pub fn set_intrinsic(&mut self, size: PageSize) {
        self.intrinsic = size;
        self.recompute();
    }

    /// Trigger (b): viewport resize.
    pub fn set_avail_width(&mut self, avail_width: f64) {
        self.avail_width = avail_width;
        self.recompute();
    }

    // Idempotent: same inputs always yield the same scale.
    fn recompute(&mut self) {
        self.scale = self.avail_width / self.intrinsic.width;
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn intrinsic(&self) -> PageSize {
        self.intrinsic
    }

    pub fn avail_width(&self) -> f64 {
        self.avail_width
    }
}

/// An axis-aligned rectangle in unscaled stage coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StageRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl StageRect {
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }
}

/// Resolve a field's percentage anchors against a page's intrinsic size.
pub fn stage_rect(field: &Field, page: PageSize) -> StageRect {
    let height = field
        .input_height
        .as_ref()
        .and_then(|d| d.as_px())
        .unwrap_or(match field.kind {
            FieldKind::Signature => SIGNATURE_HEIGHT,
            _ => DEFAULT_CONTROL_HEIGHT,
        });
    StageRect {
        x: field.x / 100.0 * page.width,
        y: field.y / 100.0 * page.height,
        width: field.w / 100.0 * page.width,
        height,
    }
}
