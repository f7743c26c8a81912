//! Multi-tap button: a ring of dots, one lit per tap

use std::rc::Rc;

use glam::Vec2;

use super::{Outcome, PointerId, PointerInput, ViewState, Widget, WidgetCore, WidgetView};
use crate::board::Variant;
use crate::consts::ZEN_RESET_DELAY_MS;
use crate::feedback::{Context, Cue};

/// Taps needed to complete
pub const TAPS_REQUIRED: u32 = 8;
/// Centre button radius as a fraction of the smaller side
pub const BUTTON_RADIUS: f32 = 0.225;

pub struct TapButton {
    core: WidgetCore,
    count: u32,
    pressed: Option<PointerId>,
    reset_at: Option<f64>,
}

impl TapButton {
    pub fn new(size: Vec2, color: &'static str, ctx: &Rc<Context>) -> Self {
        Self {
            core: WidgetCore::new(size, color, ctx),
            count: 0,
            pressed: None,
            reset_at: None,
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    fn hits_button(&self, pos: Vec2) -> bool {
        pos.distance(self.core.center()) <= self.core.size.min_element() * BUTTON_RADIUS
    }
}

impl Widget for TapButton {
    fn variant(&self) -> Variant {
        Variant::TapButton
    }

    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }

    fn pointer_down(&mut self, input: &PointerInput) -> Outcome {
        if !self.core.accepts_input() || self.reset_at.is_some() || !self.hits_button(input.pos) {
            return Outcome::Ignored;
        }
        self.pressed = Some(input.id);
        self.core.cue(Cue::Click);

        self.count = (self.count + 1).min(TAPS_REQUIRED);
        self.core.cue(Cue::Dot {
            index: self.count - 1,
            total: TAPS_REQUIRED,
        });
        if self.count < TAPS_REQUIRED {
            return Outcome::Handled;
        }

        let outcome = self.core.complete();
        if self.core.zen() {
            self.reset_at = Some(input.time_ms + ZEN_RESET_DELAY_MS);
            self.core.start_simulation();
        }
        outcome
    }

    fn pointer_up(&mut self, input: &PointerInput) -> Outcome {
        if self.pressed != Some(input.id) {
            return Outcome::Ignored;
        }
        self.pressed = None;
        Outcome::Handled
    }

    fn tick(&mut self, now_ms: f64) -> Outcome {
        match self.reset_at {
            Some(at) if now_ms >= at => {
                self.reset_at = None;
                self.count = 0;
                self.core.stop_simulation();
                Outcome::Handled
            }
            Some(_) => Outcome::Handled,
            None => {
                self.core.stop_simulation();
                Outcome::Ignored
            }
        }
    }

    fn view(&self) -> WidgetView {
        WidgetView {
            variant: Variant::TapButton,
            position: self.core.position,
            size: self.core.size,
            color: self.core.color,
            completed: self.core.is_completed(),
            pressed: self.pressed.is_some(),
            pulses: self.core.pulses(),
            state: ViewState::Tap {
                lit: self.count,
                total: TAPS_REQUIRED,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::testing::recording_context;

    fn tap(button: &mut TapButton, time_ms: f64) -> Outcome {
        let down = button.pointer_down(&PointerInput::new(1, 100.0, 100.0, time_ms));
        button.pointer_up(&PointerInput::new(1, 100.0, 100.0, time_ms + 30.0));
        down
    }

    #[test]
    fn test_tap_completes_on_eighth() {
        let (ctx, recorder) = recording_context(false);
        let mut button = TapButton::new(Vec2::splat(200.0), "#14B8A6", &ctx);

        for i in 0..7 {
            assert_eq!(tap(&mut button, i as f64 * 100.0), Outcome::Handled);
            assert!(!button.is_completed());
        }
        assert_eq!(button.count(), 7);

        assert_eq!(tap(&mut button, 700.0), Outcome::Completed);
        assert!(button.is_completed());

        // Ninth tap: ignored, no second completion
        assert_eq!(tap(&mut button, 800.0), Outcome::Ignored);
        assert_eq!(recorder.count(Cue::Complete), 1);
        assert_eq!(recorder.count(Cue::Click), 8);
        for index in 0..TAPS_REQUIRED {
            assert_eq!(
                recorder.count(Cue::Dot {
                    index,
                    total: TAPS_REQUIRED
                }),
                1
            );
        }
    }

    #[test]
    fn test_tap_outside_button_ignored() {
        let ctx = Context::headless();
        let mut button = TapButton::new(Vec2::splat(200.0), "#14B8A6", &ctx);
        // Button radius 45: the dot ring is not a target
        let miss = PointerInput::new(1, 100.0, 20.0, 0.0);
        assert_eq!(button.pointer_down(&miss), Outcome::Ignored);
        assert_eq!(button.count(), 0);
    }

    #[test]
    fn test_tap_zen_resets_after_delay() {
        let (ctx, recorder) = recording_context(true);
        let mut button = TapButton::new(Vec2::splat(200.0), "#14B8A6", &ctx);

        for i in 0..8 {
            tap(&mut button, i as f64 * 100.0);
        }
        assert_eq!(button.count(), TAPS_REQUIRED);
        assert!(button.is_simulating());
        assert!(!button.is_completed());

        // Taps during the pulse are dropped
        assert_eq!(tap(&mut button, 750.0), Outcome::Ignored);
        button.tick(800.0);
        assert_eq!(button.count(), TAPS_REQUIRED);

        button.tick(700.0 + ZEN_RESET_DELAY_MS);
        assert_eq!(button.count(), 0);
        assert!(!button.is_simulating());

        // A full second round pulses again
        for i in 0..8 {
            tap(&mut button, 2000.0 + i as f64 * 100.0);
        }
        assert_eq!(recorder.count(Cue::Complete), 2);
        assert_eq!(button.view().pulses, 2);
    }
}
