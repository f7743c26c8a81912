//! Pointer-event translation
//!
//! Browser pointer events arrive in viewport coordinates; the coordinator
//! wants positions relative to the board's top-left corner.

use glam::Vec2;
use web_sys::PointerEvent;

use crate::board::BoardConfig;

/// Pointer phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

impl PointerPhase {
    /// DOM event type for this phase
    pub fn event_name(&self) -> &'static str {
        match self {
            PointerPhase::Down => "pointerdown",
            PointerPhase::Move => "pointermove",
            PointerPhase::Up => "pointerup",
            PointerPhase::Cancel => "pointercancel",
        }
    }

    pub const ALL: [PointerPhase; 4] = [
        PointerPhase::Down,
        PointerPhase::Move,
        PointerPhase::Up,
        PointerPhase::Cancel,
    ];
}

/// One pointer event, in board space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub id: i32,
    pub board_pos: Vec2,
    pub time_ms: f64,
}

impl PointerSample {
    pub fn from_event(event: &PointerEvent, config: &BoardConfig) -> Self {
        let client = Vec2::new(event.client_x() as f32, event.client_y() as f32);
        Self {
            id: event.pointer_id(),
            board_pos: client - config.origin,
            time_ms: event.time_stamp(),
        }
    }
}
