//! Input abstraction layer.
//!
//! Normalizes mouse, touch, and stylus events into a unified `InputEvent`
//! enum consumed by the fill session. Pointer coordinates are in screen
//! (scaled) space, local to one page's surface.

/// A normalized input event from any pointing device, plus the viewport
/// resize trigger.
#[derive(Debug, Clone)]
pub enum InputEvent {
    /// Pointer pressed (mouse down, touch start, pen contact).
    PointerDown {
        page: usize,
        x: f64,
        y: f64,
        /// Pressure from 0.0 (none) to 1.0 (max). Mouse is always 1.0.
        pressure: f32,
    },

    /// Pointer moved.
    PointerMove {
        page: usize,
        x: f64,
        y: f64,
        pressure: f32,
    },

    /// Pointer released (or left the surface — strokes end either way).
    PointerUp { page: usize, x: f64, y: f64 },

    /// The viewport width changed; every page rescales.
    Resize { avail_width: f64 },
}

impl InputEvent {
    pub fn from_pointer_down(page: usize, x: f64, y: f64, pressure: f32) -> Self {
        Self::PointerDown {
            page,
            x,
            y,
            pressure,
        }
    }

    pub fn from_pointer_move(page: usize, x: f64, y: f64, pressure: f32) -> Self {
        Self::PointerMove {
            page,
            x,
            y,
            pressure,
        }
    }

    pub fn from_pointer_up(page: usize, x: f64, y: f64) -> Self {
        Self::PointerUp { page, x, y }
    }

    /// Extract position if this is a pointer event.
    pub fn position(&self) -> Option<(f64, f64)> {
        match self {
            Self::PointerDown { x, y, .. }
            | Self::PointerMove { x, y, .. }
            | Self::PointerUp { x, y, .. } => Some((*x, *y)),
            Self::Resize { .. } => None,
        }
    }
}
