//! Board slide between levels
//!
//! After a pause the finished board slides down and out while the next one
//! drops in from above. Offsets are vertical, in pixels, relative to the
//! board's resting position.

use crate::consts::*;
use crate::ease_out_cubic;

/// Board offsets for one frame of the slide
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionFrame {
    pub outgoing_offset: f32,
    pub incoming_offset: f32,
    pub finished: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct Transition {
    board_height: f32,
    /// First frame time; the clock starts on the first sample
    started_ms: Option<f64>,
}

impl Transition {
    pub fn new(board_height: f32) -> Self {
        Self {
            board_height,
            started_ms: None,
        }
    }

    /// Where the incoming board waits before it moves
    pub fn incoming_start(&self) -> f32 {
        -self.board_height * TRANSITION_START_OFFSET / 100.0
    }

    pub fn sample(&mut self, now_ms: f64) -> TransitionFrame {
        let started = *self.started_ms.get_or_insert(now_ms);
        let moving_for = now_ms - started - TRANSITION_DELAY_MS;
        let progress = (moving_for / TRANSITION_DURATION_MS).clamp(0.0, 1.0) as f32;
        let ease = ease_out_cubic(progress);

        let start = TRANSITION_START_OFFSET / 100.0;
        let travel = (100.0 + TRANSITION_EXTRA_DISTANCE) / 100.0;
        TransitionFrame {
            outgoing_offset: ease * travel * self.board_height,
            incoming_offset: (-start + ease * start) * self.board_height,
            finished: progress >= 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_holds_during_delay() {
        let mut transition = Transition::new(600.0);
        let frame = transition.sample(5000.0);
        assert_eq!(frame.outgoing_offset, 0.0);
        assert_eq!(frame.incoming_offset, -900.0);
        assert!(!frame.finished);

        let frame = transition.sample(5000.0 + TRANSITION_DELAY_MS - 1.0);
        assert_eq!(frame.outgoing_offset, 0.0);
        assert!(!frame.finished);
    }

    #[test]
    fn test_transition_lands_after_duration() {
        let mut transition = Transition::new(600.0);
        transition.sample(0.0);

        let mid = transition.sample(TRANSITION_DELAY_MS + TRANSITION_DURATION_MS / 2.0);
        assert!(mid.outgoing_offset > 0.0 && mid.outgoing_offset < 900.0);
        assert!(mid.incoming_offset > -900.0 && mid.incoming_offset < 0.0);
        assert!(!mid.finished);

        let end = transition.sample(TRANSITION_DELAY_MS + TRANSITION_DURATION_MS);
        assert!(end.finished);
        assert_eq!(end.incoming_offset, 0.0);
        assert_eq!(end.outgoing_offset, 900.0);
    }
}
