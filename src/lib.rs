//! Tap Toys - a grid of fidget widgets to complete
//!
//! Core modules:
//! - `board`: Occupancy grid and procedural board packing
//! - `widget`: Interactive widget variants and their completion rules
//! - `level`: Level coordinator (completion aggregation, transitions)
//! - `feedback`: Semantic feedback cues and the shared game context
//! - `settings`: Process-wide toggles (zen mode, volume)
//! - `audio` / `platform`: Browser-only Web Audio and DOM glue

pub mod board;
pub mod feedback;
pub mod level;
pub mod settings;
pub mod widget;

#[cfg(target_arch = "wasm32")]
pub mod audio;
#[cfg(target_arch = "wasm32")]
pub mod platform;

pub use board::{BoardConfig, Footprint, OccupancyGrid, PackedBoard, Variant, pack};
pub use feedback::{Context, Cue, Feedback, NullFeedback};
pub use level::{LevelCoordinator, Phase};
pub use settings::{Settings, VolumeLevel};

/// Game configuration constants
pub mod consts {
    /// Board dimensions in cells
    pub const GRID_COLS: u32 = 3;
    pub const GRID_ROWS: u32 = 6;

    /// Cell size cap and viewport margin (pixels)
    pub const MAX_CELL_SIZE: f32 = 150.0;
    pub const VIEWPORT_MARGIN: f32 = 20.0;
    /// Gap between neighbouring widgets (split evenly around each footprint)
    pub const WIDGET_MARGIN: f32 = 16.0;

    /// Drag/hold progress at or above this counts as done
    pub const COMPLETE_THRESHOLD: f32 = 0.99;
    /// Zen-mode pulse length before a hold/tap widget resets (ms)
    pub const ZEN_RESET_DELAY_MS: f64 = 300.0;

    /// Pause between the last completion and the board slide (ms)
    pub const TRANSITION_DELAY_MS: f64 = 1000.0;
    /// Slide duration (ms)
    pub const TRANSITION_DURATION_MS: f64 = 600.0;
    /// Incoming board starts this far above its slot (percent of board height)
    pub const TRANSITION_START_OFFSET: f32 = 150.0;
    /// Outgoing board travels one board height plus this much (percent)
    pub const TRANSITION_EXTRA_DISTANCE: f32 = 50.0;

    /// Viewport resize debounce (ms)
    pub const RESIZE_DEBOUNCE_MS: i32 = 200;
}

/// Wrap an angular delta to (-π, π]
///
/// Consecutive `atan2` samples jump by ~2π when the pointer crosses the
/// negative x axis; unwrapping keeps the accumulated angle continuous.
#[inline]
pub fn unwrap_delta(mut delta: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    while delta > PI {
        delta -= TAU;
    }
    while delta <= -PI {
        delta += TAU;
    }
    delta
}

/// Angle of `point` around `center` (radians, screen coordinates)
#[inline]
pub fn angle_around(center: glam::Vec2, point: glam::Vec2) -> f32 {
    let d = point - center;
    d.y.atan2(d.x)
}

/// Ease-out cubic: fast start, gentle landing
#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}
