//! Timed-hold button: a progress ring fills while the button is held

use std::rc::Rc;

use glam::Vec2;

use super::{Outcome, PointerId, PointerInput, ViewState, Widget, WidgetCore, WidgetView};
use crate::board::Variant;
use crate::consts::{COMPLETE_THRESHOLD, ZEN_RESET_DELAY_MS};
use crate::feedback::{Context, Cue};

/// Progress gained per second of holding
pub const FILL_RATE: f32 = 0.8;
/// Progress lost per second after release (normal mode)
pub const DRAIN_RATE: f32 = 1.2;

pub struct RapidFireButton {
    core: WidgetCore,
    progress: f32,
    held: Option<PointerId>,
    last_frame_ms: Option<f64>,
    /// Pending zen reset time (ms)
    reset_at: Option<f64>,
}

impl RapidFireButton {
    pub fn new(size: Vec2, color: &'static str, ctx: &Rc<Context>) -> Self {
        Self {
            core: WidgetCore::new(size, color, ctx),
            progress: 0.0,
            held: None,
            last_frame_ms: None,
            reset_at: None,
        }
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn is_held(&self) -> bool {
        self.held.is_some()
    }

    fn release(&mut self) {
        if self.held.take().is_some() {
            self.core.cue(Cue::HoldStop);
        }
        self.last_frame_ms = None;
    }
}

impl Widget for RapidFireButton {
    fn variant(&self) -> Variant {
        Variant::RapidFireButton
    }

    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }

    fn pointer_down(&mut self, input: &PointerInput) -> Outcome {
        if !self.core.accepts_input() || self.held.is_some() || self.reset_at.is_some() {
            return Outcome::Ignored;
        }
        self.held = Some(input.id);
        self.last_frame_ms = None;
        self.core.cue(Cue::Click);
        self.core.cue(Cue::HoldStart);
        self.core.start_simulation();
        Outcome::Handled
    }

    fn pointer_up(&mut self, input: &PointerInput) -> Outcome {
        if self.held != Some(input.id) {
            return Outcome::Ignored;
        }
        self.release();
        // Zen mode pauses the ring where it is
        if self.core.zen() {
            self.core.stop_simulation();
        }
        Outcome::Handled
    }

    fn tick(&mut self, now_ms: f64) -> Outcome {
        if let Some(at) = self.reset_at {
            if now_ms >= at {
                self.reset_at = None;
                self.progress = 0.0;
                self.core.stop_simulation();
            }
            return Outcome::Handled;
        }

        let dt = self
            .last_frame_ms
            .map_or(0.0, |last| ((now_ms - last) / 1000.0) as f32);
        self.last_frame_ms = Some(now_ms);

        if self.held.is_none() {
            self.progress = (self.progress - DRAIN_RATE * dt).max(0.0);
            if self.progress == 0.0 {
                self.core.stop_simulation();
            }
            return Outcome::Handled;
        }

        self.progress = (self.progress + FILL_RATE * dt).min(1.0);
        self.core.cue(Cue::Progress(self.progress));
        if self.progress < COMPLETE_THRESHOLD {
            return Outcome::Handled;
        }

        self.progress = 1.0;
        let outcome = self.core.complete();
        self.release();
        if self.core.zen() {
            self.reset_at = Some(now_ms + ZEN_RESET_DELAY_MS);
        } else {
            self.core.stop_simulation();
        }
        outcome
    }

    fn disable(&mut self) {
        self.release();
        self.core.disable();
    }

    fn view(&self) -> WidgetView {
        WidgetView {
            variant: Variant::RapidFireButton,
            position: self.core.position,
            size: self.core.size,
            color: self.core.color,
            completed: self.core.is_completed(),
            pressed: self.held.is_some(),
            pulses: self.core.pulses(),
            state: ViewState::RapidFire {
                progress: self.progress,
            },
        }
    }
}
