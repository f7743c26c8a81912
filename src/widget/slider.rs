//! Continuous-drag slider
//!
//! The handle is dragged along a horizontal or vertical track; the pointer
//! position projected onto the track axis sets the value. Vertical sliders
//! fill bottom-up.

use std::rc::Rc;

use glam::Vec2;

use super::{
    Outcome, PointerId, PointerInput, ThresholdLatch, ViewState, Widget, WidgetCore, WidgetView,
};
use crate::board::{Orientation, Variant};
use crate::consts::COMPLETE_THRESHOLD;
use crate::feedback::{Context, Cue};

/// Inset between widget edge and track (pixels)
pub const TRACK_PADDING: f32 = 24.0;
/// Square handle edge (pixels)
pub const HANDLE_SIZE: f32 = 44.0;
/// Detent steps along the track
pub const DETENTS: u32 = 10;

pub struct Slider {
    core: WidgetCore,
    orientation: Orientation,
    value: f32,
    dragging: Option<PointerId>,
    detent: u32,
    latch: ThresholdLatch,
}

impl Slider {
    pub fn new(size: Vec2, color: &'static str, ctx: &Rc<Context>, orientation: Orientation) -> Self {
        Self {
            core: WidgetCore::new(size, color, ctx),
            orientation,
            value: 0.0,
            dragging: None,
            detent: 0,
            latch: ThresholdLatch::default(),
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging.is_some()
    }

    /// Distance the handle can travel (pixels)
    fn travel(&self) -> f32 {
        let along = match self.orientation {
            Orientation::Horizontal => self.core.size.x,
            Orientation::Vertical => self.core.size.y,
        };
        (along - TRACK_PADDING * 2.0 - HANDLE_SIZE).max(1.0)
    }

    /// Handle offset from the track start (left or top)
    fn handle_offset(&self) -> f32 {
        match self.orientation {
            Orientation::Horizontal => self.value * self.travel(),
            Orientation::Vertical => (1.0 - self.value) * self.travel(),
        }
    }

    /// Handle rect in local coordinates (min corner, max corner)
    fn handle_rect(&self) -> (Vec2, Vec2) {
        let offset = TRACK_PADDING + self.handle_offset();
        let min = match self.orientation {
            Orientation::Horizontal => {
                Vec2::new(offset, self.core.size.y / 2.0 - HANDLE_SIZE / 2.0)
            }
            Orientation::Vertical => {
                Vec2::new(self.core.size.x / 2.0 - HANDLE_SIZE / 2.0, offset)
            }
        };
        (min, min + Vec2::splat(HANDLE_SIZE))
    }

    fn hits_handle(&self, pos: Vec2) -> bool {
        let (min, max) = self.handle_rect();
        pos.cmpge(min).all() && pos.cmple(max).all()
    }

    /// Project a local pointer position onto the track, clamped to [0, 1]
    fn project(&self, pos: Vec2) -> f32 {
        let value = match self.orientation {
            Orientation::Horizontal => {
                (pos.x - TRACK_PADDING - HANDLE_SIZE / 2.0) / self.travel()
            }
            Orientation::Vertical => {
                1.0 - (pos.y - TRACK_PADDING - HANDLE_SIZE / 2.0) / self.travel()
            }
        };
        value.clamp(0.0, 1.0)
    }

    fn end_drag(&mut self) {
        if self.dragging.take().is_some() {
            self.core.cue(Cue::SlideStop);
        }
    }
}

impl Widget for Slider {
    fn variant(&self) -> Variant {
        Variant::Slider
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
        if !self.hits_handle(input.pos) {
            return Outcome::Ignored;
        }
        self.dragging = Some(input.id);
        self.core.cue(Cue::SlideStart);
        Outcome::Handled
    }

    fn pointer_move(&mut self, input: &PointerInput) -> Outcome {
        if self.dragging != Some(input.id) || !self.core.accepts_input() {
            return Outcome::Ignored;
        }

        self.value = self.project(input.pos);
        self.core.cue(Cue::SlideMove(self.value));

        let detent = ((self.value * DETENTS as f32).floor() as u32).min(DETENTS);
        if detent != self.detent {
            self.detent = detent;
            self.core.cue(Cue::StepChange {
                index: detent,
                total: DETENTS,
            });
        }

        if !self.latch.update(self.value >= COMPLETE_THRESHOLD) {
            return Outcome::Handled;
        }
        let outcome = self.core.complete();
        if !self.core.zen() {
            self.end_drag();
        }
        outcome
    }

    fn pointer_up(&mut self, input: &PointerInput) -> Outcome {
        if self.dragging != Some(input.id) {
            return Outcome::Ignored;
        }
        self.end_drag();
        Outcome::Handled
    }

    fn disable(&mut self) {
        self.end_drag();
        self.core.disable();
    }

    fn view(&self) -> WidgetView {
        let travel = self.travel();
        let handle_offset = self.handle_offset();
        let fill_length = match self.orientation {
            Orientation::Horizontal => handle_offset + HANDLE_SIZE / 2.0,
            Orientation::Vertical => travel + HANDLE_SIZE - (handle_offset + HANDLE_SIZE / 2.0),
        };
        WidgetView {
            variant: Variant::Slider,
            position: self.core.position,
            size: self.core.size,
            color: self.core.color,
            completed: self.core.is_completed(),
            pressed: self.dragging.is_some(),
            pulses: self.core.pulses(),
            state: ViewState::Slider {
                value: self.value,
                orientation: self.orientation,
                handle_offset,
                fill_length,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::testing::recording_context;

    // 300 wide: travel = 300 - 48 - 44 = 208
    fn horizontal(ctx: &Rc<Context>) -> Slider {
        Slider::new(Vec2::new(300.0, 84.0), "#10B981", ctx, Orientation::Horizontal)
    }

    fn at(x: f32, y: f32) -> PointerInput {
        PointerInput::new(1, x, y, 0.0)
    }

    #[test]
    fn test_slider_monotonic_drag_completes_once() {
        let (ctx, recorder) = recording_context(false);
        let mut slider = horizontal(&ctx);

        // Handle starts at the left end
        assert_eq!(slider.pointer_down(&at(40.0, 42.0)), Outcome::Handled);

        let mut last = 0.0;
        let mut completions = 0;
        for step in 0..=60 {
            let x = 46.0 + step as f32 * 4.0;
            let outcome = slider.pointer_move(&at(x, 42.0));
            let value = slider.value();
            assert!((0.0..=1.0).contains(&value));
            assert!(value >= last);
            last = value;
            if outcome.is_completed() {
                completions += 1;
                assert!(value >= COMPLETE_THRESHOLD);
            }
        }

        assert_eq!(completions, 1);
        assert!(slider.is_completed());
        assert!(!slider.is_dragging());
        assert_eq!(recorder.count(Cue::Complete), 1);
        assert_eq!(recorder.count(Cue::SlideStop), 1);
    }

    #[test]
    fn test_slider_detent_cues() {
        let (ctx, recorder) = recording_context(false);
        let mut slider = horizontal(&ctx);
        slider.pointer_down(&at(40.0, 42.0));
        // Halfway: detents 1..=5 crossed in one jump → one cue
        slider.pointer_move(&at(46.0 + 104.0, 42.0));
        assert_eq!(
            recorder.count(Cue::StepChange { index: 5, total: DETENTS }),
            1
        );
        slider.pointer_move(&at(46.0 + 105.0, 42.0));
        assert_eq!(
            recorder.count_matching(|c| matches!(c, Cue::StepChange { .. })),
            1
        );
    }

    #[test]
    fn test_slider_press_off_handle_ignored() {
        let ctx = Context::headless();
        let mut slider = horizontal(&ctx);
        assert_eq!(slider.pointer_down(&at(250.0, 42.0)), Outcome::Ignored);
        assert_eq!(slider.pointer_down(&at(40.0, 2.0)), Outcome::Ignored);
    }

    #[test]
    fn test_slider_ignores_other_pointer() {
        let ctx = Context::headless();
        let mut slider = horizontal(&ctx);
        slider.pointer_down(&at(40.0, 42.0));
        let other = PointerInput::new(2, 280.0, 42.0, 0.0);
        assert_eq!(slider.pointer_move(&other), Outcome::Ignored);
        assert_eq!(slider.value(), 0.0);
        assert_eq!(slider.pointer_up(&other), Outcome::Ignored);
        assert!(slider.is_dragging());
    }

    #[test]
    fn test_slider_clamps_overshoot() {
        let ctx = Context::headless();
        let mut slider = horizontal(&ctx);
        slider.pointer_down(&at(40.0, 42.0));
        slider.pointer_move(&at(-500.0, 42.0));
        assert_eq!(slider.value(), 0.0);
        assert!(slider.pointer_move(&at(5000.0, 42.0)).is_completed());
        assert_eq!(slider.value(), 1.0);
    }

    #[test]
    fn test_vertical_slider_fills_upward() {
        let ctx = Context::headless();
        let mut slider = Slider::new(Vec2::new(84.0, 300.0), "#10B981", &ctx, Orientation::Vertical);
        // Handle starts at the bottom: top edge at 24 + 208
        assert_eq!(slider.pointer_down(&at(42.0, 240.0)), Outcome::Handled);
        slider.pointer_move(&at(42.0, 46.0 + 104.0));
        assert!((slider.value() - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_slider_zen_pulses_on_each_crossing() {
        let (ctx, recorder) = recording_context(true);
        let mut slider = horizontal(&ctx);
        slider.pointer_down(&at(40.0, 42.0));
        assert!(slider.pointer_move(&at(300.0, 42.0)).is_completed());
        // Still at the top: no new pulse
        assert_eq!(slider.pointer_move(&at(310.0, 42.0)), Outcome::Handled);
        // Back down and up again
        slider.pointer_move(&at(60.0, 42.0));
        assert!(slider.pointer_move(&at(300.0, 42.0)).is_completed());
        assert!(slider.is_dragging());
        assert!(!slider.is_completed());
        assert_eq!(recorder.count(Cue::Complete), 2);
    }
}
