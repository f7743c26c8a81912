//! Browser platform layer
//!
//! - `surface`: DOM visual surface, one element tree per widget
//! - `input`: pointer-event translation into board coordinates
//!
//! Plus the viewport query the boot code uses to fit the board.

pub mod input;
pub mod surface;

pub use input::PointerSample;
pub use surface::Surface;

use glam::Vec2;

/// Viewport size in CSS pixels
pub fn viewport_size() -> Vec2 {
    let Some(window) = web_sys::window() else {
        return Vec2::ZERO;
    };
    let w = window
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    let h = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    Vec2::new(w as f32, h as f32)
}
