//! Speaker-grille slider: a row of bars that light up as it is dragged,
//! each newly reached bar playing a detent note.

use std::rc::Rc;

use glam::Vec2;

use super::{
    Outcome, PointerId, PointerInput, ThresholdLatch, ViewState, Widget, WidgetCore, WidgetView,
};
use crate::board::{Orientation, Variant};
use crate::consts::COMPLETE_THRESHOLD;
use crate::feedback::{Context, Cue};

/// Inset between widget edge and grille (pixels)
pub const GRILLE_PADDING: f32 = 16.0;
/// Bar thickness plus the gap after it (pixels)
pub const BAR_PITCH: f32 = 10.0 + 6.0;
/// Fewest bars a grille shows
pub const MIN_BARS: u32 = 5;

pub struct AudioSlider {
    core: WidgetCore,
    orientation: Orientation,
    bars: u32,
    value: f32,
    dragging: Option<PointerId>,
    last_bar: Option<u32>,
    latch: ThresholdLatch,
}

impl AudioSlider {
    pub fn new(size: Vec2, color: &'static str, ctx: &Rc<Context>, orientation: Orientation) -> Self {
        let mut slider = Self {
            core: WidgetCore::new(size, color, ctx),
            orientation,
            bars: MIN_BARS,
            value: 0.0,
            dragging: None,
            last_bar: None,
            latch: ThresholdLatch::default(),
        };
        slider.bars = ((slider.length() / BAR_PITCH).floor() as u32).max(MIN_BARS);
        slider
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn bars(&self) -> u32 {
        self.bars
    }

    /// Grille length along the drag axis (pixels)
    fn length(&self) -> f32 {
        let along = match self.orientation {
            Orientation::Horizontal => self.core.size.x,
            Orientation::Vertical => self.core.size.y,
        };
        (along - GRILLE_PADDING * 2.0).max(1.0)
    }

    fn in_grille(&self, pos: Vec2) -> bool {
        let min = Vec2::splat(GRILLE_PADDING);
        let max = self.core.size - Vec2::splat(GRILLE_PADDING);
        pos.cmpge(min).all() && pos.cmple(max).all()
    }

    /// Bar under the current value
    fn bar_index(&self) -> u32 {
        ((self.value * (self.bars as f32 - 0.01)).floor() as u32).min(self.bars - 1)
    }

    fn update_from(&mut self, pos: Vec2) -> Outcome {
        let value = match self.orientation {
            Orientation::Horizontal => (pos.x - GRILLE_PADDING) / self.length(),
            Orientation::Vertical => 1.0 - (pos.y - GRILLE_PADDING) / self.length(),
        };
        self.value = value.clamp(0.0, 1.0);

        let bar = self.bar_index();
        if self.last_bar != Some(bar) {
            self.last_bar = Some(bar);
            self.core.cue(Cue::StepChange {
                index: bar,
                total: self.bars - 1,
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
}

impl Widget for AudioSlider {
    fn variant(&self) -> Variant {
        Variant::AudioSlider
    }

    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }

    fn pointer_down(&mut self, input: &PointerInput) -> Outcome {
        if !self.core.accepts_input() || self.dragging.is_some() || !self.in_grille(input.pos) {
            return Outcome::Ignored;
        }
        self.dragging = Some(input.id);
        self.update_from(input.pos)
    }

    fn pointer_move(&mut self, input: &PointerInput) -> Outcome {
        if self.dragging != Some(input.id) || !self.core.accepts_input() {
            return Outcome::Ignored;
        }
        self.update_from(input.pos)
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
            variant: Variant::AudioSlider,
            position: self.core.position,
            size: self.core.size,
            color: self.core.color,
            completed: self.core.is_completed(),
            pressed: self.dragging.is_some(),
            pulses: self.core.pulses(),
            state: ViewState::AudioSlider {
                value: self.value,
                orientation: self.orientation,
                bars: self.bars,
                lit: self.bar_index() + 1,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::testing::recording_context;

    fn at(x: f32, y: f32) -> PointerInput {
        PointerInput::new(3, x, y, 0.0)
    }

    #[test]
    fn test_bar_count_from_length() {
        let ctx = Context::headless();
        // 284 tall: (284 - 32) / 16 = 15.75 → 15 bars
        let slider = AudioSlider::new(Vec2::new(84.0, 284.0), "#F97316", &ctx, Orientation::Vertical);
        assert_eq!(slider.bars(), 15);
        // Too short: minimum applies
        let slider = AudioSlider::new(Vec2::new(60.0, 60.0), "#F97316", &ctx, Orientation::Horizontal);
        assert_eq!(slider.bars(), MIN_BARS);
    }

    #[test]
    fn test_press_sets_value_and_cues_bar() {
        let (ctx, recorder) = recording_context(false);
        let mut slider =
            AudioSlider::new(Vec2::new(284.0, 84.0), "#F97316", &ctx, Orientation::Horizontal);
        assert_eq!(slider.pointer_down(&at(16.0, 42.0)), Outcome::Handled);
        assert_eq!(slider.value(), 0.0);
        assert_eq!(recorder.count(Cue::StepChange { index: 0, total: 14 }), 1);

        // Same bar again: no repeat
        slider.pointer_move(&at(17.0, 42.0));
        assert_eq!(
            recorder.count_matching(|c| matches!(c, Cue::StepChange { .. })),
            1
        );
    }

    #[test]
    fn test_drag_to_end_completes_once() {
        let (ctx, recorder) = recording_context(false);
        let mut slider =
            AudioSlider::new(Vec2::new(284.0, 84.0), "#F97316", &ctx, Orientation::Horizontal);
        slider.pointer_down(&at(20.0, 42.0));
        let mut completions = 0;
        for x in (20..=290).step_by(5) {
            if slider.pointer_move(&at(x as f32, 42.0)).is_completed() {
                completions += 1;
            }
        }
        assert_eq!(completions, 1);
        assert!(slider.is_completed());
        assert_eq!(recorder.count(Cue::Complete), 1);
        assert_eq!(
            recorder.count(Cue::StepChange { index: 14, total: 14 }),
            1
        );
    }

    #[test]
    fn test_press_outside_grille_ignored() {
        let ctx = Context::headless();
        let mut slider =
            AudioSlider::new(Vec2::new(84.0, 284.0), "#F97316", &ctx, Orientation::Vertical);
        assert_eq!(slider.pointer_down(&at(4.0, 100.0)), Outcome::Ignored);
        assert_eq!(slider.pointer_down(&at(42.0, 280.0)), Outcome::Ignored);
    }
}
