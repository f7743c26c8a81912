//! Rotary knob
//!
//! The value accumulates the signed angle the pointer sweeps around the knob
//! centre. A full 270° sweep covers the whole range.

use std::f32::consts::PI;
use std::rc::Rc;

use glam::Vec2;

use super::{
    Outcome, PointerId, PointerInput, ThresholdLatch, ViewState, Widget, WidgetCore, WidgetView,
};
use crate::board::Variant;
use crate::consts::COMPLETE_THRESHOLD;
use crate::feedback::{Context, Cue};
use crate::{angle_around, unwrap_delta};

/// Angular sweep for the full value range (radians)
pub const SWEEP: f32 = PI * 1.5;
/// Pointer angle at value 0 (radians)
pub const START_ANGLE: f32 = -PI * 0.75;
/// Value step between tick clicks
pub const TICK_STEP: f32 = 0.05;
/// Knob body radius as a fraction of the smaller side
pub const BODY_RADIUS: f32 = 0.325;

pub struct Knob {
    core: WidgetCore,
    value: f32,
    dragging: Option<PointerId>,
    last_angle: f32,
    last_tick: u32,
    latch: ThresholdLatch,
}

impl Knob {
    pub fn new(size: Vec2, color: &'static str, ctx: &Rc<Context>) -> Self {
        Self {
            core: WidgetCore::new(size, color, ctx),
            value: 0.0,
            dragging: None,
            last_angle: 0.0,
            last_tick: 0,
            latch: ThresholdLatch::default(),
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    fn body_radius(&self) -> f32 {
        self.core.size.min_element() * BODY_RADIUS
    }

    fn tick_index(value: f32) -> u32 {
        (value / TICK_STEP).floor() as u32
    }
}

impl Widget for Knob {
    fn variant(&self) -> Variant {
        Variant::Knob
    }

    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }

    fn pointer_down(&mut self, input: &PointerInput) -> Outcome {
        if !self.core.accepts_input() || self.dragging.is_some() {
            return Outcome::Ignored;
        }
        let center = self.core.center();
        if input.pos.distance(center) > self.body_radius() {
            return Outcome::Ignored;
        }
        self.dragging = Some(input.id);
        self.last_angle = angle_around(center, input.pos);
        Outcome::Handled
    }

    fn pointer_move(&mut self, input: &PointerInput) -> Outcome {
        if self.dragging != Some(input.id) || !self.core.accepts_input() {
            return Outcome::Ignored;
        }

        let angle = angle_around(self.core.center(), input.pos);
        let delta = unwrap_delta(angle - self.last_angle);
        self.last_angle = angle;
        self.value = (self.value + delta / SWEEP).clamp(0.0, 1.0);

        let tick = Self::tick_index(self.value);
        if tick != self.last_tick {
            self.last_tick = tick;
            self.core.cue(Cue::StepChange {
                index: tick,
                total: (1.0 / TICK_STEP).round() as u32,
            });
        }

        if !self.latch.update(self.value >= COMPLETE_THRESHOLD) {
            return Outcome::Handled;
        }
        let outcome = self.core.complete();
        if !self.core.zen() {
            self.dragging = None;
        }
        outcome
    }

    fn pointer_up(&mut self, input: &PointerInput) -> Outcome {
        if self.dragging != Some(input.id) {
            return Outcome::Ignored;
        }
        self.dragging = None;
        Outcome::Handled
    }

    fn view(&self) -> WidgetView {
        WidgetView {
            variant: Variant::Knob,
            position: self.core.position,
            size: self.core.size,
            color: self.core.color,
            completed: self.core.is_completed(),
            pressed: self.dragging.is_some(),
            pulses: self.core.pulses(),
            state: ViewState::Knob {
                value: self.value,
                pointer_angle: START_ANGLE + SWEEP * self.value,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::testing::recording_context;

    const SIZE: f32 = 200.0;

    /// Sample on a circle of radius 40 around the knob centre
    fn polar(angle: f32) -> PointerInput {
        let pos = Vec2::splat(SIZE / 2.0) + Vec2::from_angle(angle) * 40.0;
        PointerInput::new(7, pos.x, pos.y, 0.0)
    }

    #[test]
    fn test_knob_unwraps_across_pi() {
        let ctx = Context::headless();
        let mut knob = Knob::new(Vec2::splat(SIZE), "#8B5CF6", &ctx);
        assert_eq!(knob.pointer_down(&polar(PI - 0.05)), Outcome::Handled);
        knob.pointer_move(&polar(-PI + 0.05));
        // A 0.1 rad step, not a ~2π jump
        let expected = 0.1 / SWEEP;
        assert!((knob.value() - expected).abs() < 1e-3);
    }

    #[test]
    fn test_knob_counter_rotation_clamps_at_zero() {
        let ctx = Context::headless();
        let mut knob = Knob::new(Vec2::splat(SIZE), "#8B5CF6", &ctx);
        knob.pointer_down(&polar(0.0));
        knob.pointer_move(&polar(-0.5));
        assert_eq!(knob.value(), 0.0);
    }

    #[test]
    fn test_knob_full_sweep_completes_once() {
        let (ctx, recorder) = recording_context(false);
        let mut knob = Knob::new(Vec2::splat(SIZE), "#8B5CF6", &ctx);
        knob.pointer_down(&polar(0.0));

        let mut completions = 0;
        for step in 1..=100 {
            // 100 steps of 0.05 rad: 5 rad > 1.5π
            if knob.pointer_move(&polar(step as f32 * 0.05)).is_completed() {
                completions += 1;
            }
        }
        assert_eq!(completions, 1);
        assert!(knob.is_completed());
        assert!(knob.value() >= COMPLETE_THRESHOLD);
        assert_eq!(recorder.count(Cue::Complete), 1);
        assert!(recorder.count_matching(|c| matches!(c, Cue::StepChange { .. })) >= 19);
    }

    #[test]
    fn test_knob_press_outside_body_ignored() {
        let ctx = Context::headless();
        let mut knob = Knob::new(Vec2::splat(SIZE), "#8B5CF6", &ctx);
        // Body radius 65: a corner press misses
        assert_eq!(
            knob.pointer_down(&PointerInput::new(1, 5.0, 5.0, 0.0)),
            Outcome::Ignored
        );
    }

    #[test]
    fn test_knob_pointer_angle_spans_sweep() {
        let ctx = Context::headless();
        let knob = Knob::new(Vec2::splat(SIZE), "#8B5CF6", &ctx);
        match knob.view().state {
            ViewState::Knob { pointer_angle, .. } => {
                assert!((pointer_angle - START_ANGLE).abs() < 1e-6)
            }
            other => panic!("unexpected view state {:?}", other),
        }
    }
}
