//! Freehand signature capture.
//!
//! A stroke-accumulation state machine (`Idle` ↔ `Stroking`) over an RGBA
//! raster. Pointer-down starts a stroke, each pointer-move while stroking
//! draws one connected line segment and yields the serialized PNG
//! data-URI — one emission per segment, not per pixel, so autosave stays
//! continuous during drawing without flooding the write path.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

/// Raster dimensions of a signature strip, matching the surface the
/// original designs were drawn against.
pub const PAD_WIDTH: u32 = 600;
pub const PAD_HEIGHT: u32 = 160;

/// Ink color (near-black), RGBA.
const INK: [u8; 4] = [17, 24, 39, 255];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeState {
    Idle,
    Stroking,
}

/// One field's drawing surface. The raster starts transparent; any prior
/// persisted data-URI is decoded and blitted before interaction begins.
pub struct SignaturePad {
    width: u32,
    height: u32,
    /// RGBA, row-major.
    pixels: Vec<u8>,
    state: StrokeState,
    last: (f64, f64),
    inked: bool,
}

impl Default for SignaturePad {
    fn default() -> Self {
        Self::new()
    }
}

impl SignaturePad {
    pub fn new() -> Self {
        Self::with_size(PAD_WIDTH, PAD_HEIGHT)
    }

    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width * height * 4) as usize],
            state: StrokeState::Idle,
            last: (0.0, 0.0),
            inked: false,
        }
    }

    pub fn state(&self) -> StrokeState {
        self.state
    }

    pub fn is_blank(&self) -> bool {
        !self.inked
    }

    /// Seed the raster from a previously persisted `data:image/…` URI.
    /// Anything undecodable is ignored with a warning — a broken saved
    /// signature must never block re-signing.
    pub fn load_data_uri(&mut self, uri: &str) {
        if !uri.starts_with("data:image/") {
            log::warn!("signature value is not a data URI, ignoring");
            return;
        }
        let Some(comma) = uri.find(',') else {
            log::warn!("signature data URI has no payload, ignoring");
            return;
        };
        let bytes = match STANDARD.decode(&uri[comma + 1..]) {
            Ok(b) => b,
            Err(e) => {
                log::warn!("signature base64 decode failed, ignoring: {e}");
                return;
            }
        };
        let img = match image::load_from_memory(&bytes) {
            Ok(img) => img,
            Err(e) => {
                log::warn!("signature image decode failed, ignoring: {e}");
                return;
            }
        };
        let rgba = image::imageops::resize(
            &img.to_rgba8(),
            self.width,
            self.height,
            image::imageops::FilterType::Triangle,
        );
        self.pixels = rgba.into_raw();
        self.inked = true;
    }

    /// Transition `Idle → Stroking`. Coordinates are pad-local pixels.
    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.state = StrokeState::Stroking;
        self.last = (x, y);
    }

    /// Draw the next connected segment while stroking and serialize the
    /// current raster. Returns `None` when idle or if encoding fails.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> Option<String> {
        if self.state != StrokeState::Stroking {
            return None;
        }
        let (x0, y0) = self.last;
        self.draw_segment(x0, y0, x, y);
        self.last = (x, y);
        self.inked = true;
        self.to_data_uri()
    }

    /// Transition back to `Idle`. Pointer-leave ends a stroke the same way.
    pub fn pointer_up(&mut self) {
        self.state = StrokeState::Idle;
    }

    /// Serialize the raster as a `data:image/png;base64,…` URI.
    /// Encoding failure is swallowed (logged) — the stroke stays visible
    /// on the pad even if this snapshot is lost.
    pub fn to_data_uri(&self) -> Option<String> {
        let mut png = Vec::new();
        let encoder = PngEncoder::new(&mut png);
        if let Err(e) =
            encoder.write_image(&self.pixels, self.width, self.height, ExtendedColorType::Rgba8)
        {
            log::warn!("signature png encode failed: {e}");
            return None;
        }
        Some(format!("data:image/png;base64,{}", STANDARD.encode(&png)))
    }

    /// Stamp a 2px-wide line from (x0, y0) to (x1, y1).
    fn draw_segment(&mut self, x0: f64, y0: f64, x1: f64, y1: f64) {
        let steps = (x1 - x0).abs().max((y1 - y0).abs()).ceil().max(1.0) as u32;
        for i in 0..=steps {
            let t = f64::from(i) / f64::from(steps);
            let x = x0 + (x1 - x0) * t;
            let y = y0 + (y1 - y0) * t;
            self.stamp(x.round() as i64, y.round() as i64);
        }
    }

    fn stamp(&mut self, cx: i64, cy: i64) {
        for dy in -1..=1i64 {
            for dx in -1..=1i64 {
                let (x, y) = (cx + dx, cy + dy);
                if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
                    continue;
                }
                let at = ((y as u32 * self.width + x as u32) * 4) as usize;
                self.pixels[at..at + 4].copy_from_slice(&INK);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gesture_emits_data_uri_per_segment() {
        let mut pad = SignaturePad::new();
        pad.pointer_down(10.0, 10.0);

        // Every move while stroking emits — continuous autosave, not
        // only on release.
        let first = pad.pointer_move(20.0, 15.0).expect("segment emits");
        let second = pad.pointer_move(30.0, 20.0).expect("segment emits");
        assert!(first.starts_with("data:image/png;base64,"));
        assert!(second.starts_with("data:image/png;base64,"));

        pad.pointer_up();
        assert_eq!(pad.state(), StrokeState::Idle);
    }

    #[test]
    fn moves_while_idle_draw_nothing() {
        let mut pad = SignaturePad::new();
        assert_eq!(pad.pointer_move(50.0, 50.0), None);
        assert!(pad.is_blank());
    }

    #[test]
    fn strokes_survive_a_serialize_reload_cycle() {
        let mut pad = SignaturePad::new();
        pad.pointer_down(100.0, 80.0);
        let uri = pad.pointer_move(200.0, 80.0).unwrap();
        pad.pointer_up();

        let mut restored = SignaturePad::new();
        restored.load_data_uri(&uri);
        assert!(!restored.is_blank());
    }

    #[test]
    fn broken_prior_values_are_ignored() {
        let mut pad = SignaturePad::new();
        pad.load_data_uri("hello");
        pad.load_data_uri("data:image/png;base64");
        pad.load_data_uri("data:image/png;base64,!!!notbase64!!!");
        assert!(pad.is_blank());
    }

    #[test]
    fn out_of_bounds_strokes_clip() {
        let mut pad = SignaturePad::with_size(50, 50);
        pad.pointer_down(-20.0, 25.0);
        assert!(pad.pointer_move(80.0, 25.0).is_some());
    }
}
