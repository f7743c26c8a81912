//! Fidget spinner
//!
//! Dragging turns the blades directly and builds up a smoothed angular
//! velocity. On release the spinner coasts under friction, driven by the
//! coordinator's frame tick; enough free rotation completes it, after which
//! it keeps turning at its completion speed.

use std::f32::consts::{PI, TAU};
use std::rc::Rc;

use glam::Vec2;

use super::{Outcome, PointerId, PointerInput, ViewState, Widget, WidgetCore, WidgetView};
use crate::board::Variant;
use crate::feedback::{Context, Cue};
use crate::{angle_around, unwrap_delta};

/// Velocity multiplier per 16 ms frame while coasting
pub const FRICTION: f32 = 0.985;
/// Weight of the previous velocity when blending in a new sample
pub const SMOOTHING: f32 = 0.7;
/// Free rotation needed to complete (radians)
pub const COMPLETE_ROTATION: f32 = PI * 6.0;
/// Below this (rad/ms) the spinner counts as stopped
pub const STOP_VELOCITY: f32 = 0.0001;
/// Keep coasting this long after the last drag sample (ms)
pub const MOVE_GRACE_MS: f64 = 100.0;
/// RPM readout refresh interval (ms)
pub const RPM_INTERVAL_MS: f64 = 100.0;
/// Maps rad/ms to the 0..1 spin cue intensity
const SPIN_CUE_SCALE: f32 = 16.0;

pub struct Spinner {
    core: WidgetCore,
    /// Blade angle (radians)
    angle: f32,
    /// Angular velocity (rad/ms)
    velocity: f32,
    dragging: Option<PointerId>,
    last_angle: f32,
    last_sample_ms: f64,
    last_move_ms: f64,
    last_frame_ms: Option<f64>,
    /// Free rotation tally (radians); per flick in zen mode
    total_rotation: f32,
    /// Velocity held once completed (rad/ms)
    cruise_velocity: f32,
    rpm: u32,
    last_rpm_ms: Option<f64>,
    /// Spin sound running (SpinStart sent, SpinStop pending)
    voiced: bool,
}

impl Spinner {
    pub fn new(size: Vec2, color: &'static str, ctx: &Rc<Context>) -> Self {
        let mut core = WidgetCore::new(size, color, ctx);
        // The spin sound already carries the moment
        core.set_silent_complete(true);
        Self {
            core,
            angle: 0.0,
            velocity: 0.0,
            dragging: None,
            last_angle: 0.0,
            last_sample_ms: 0.0,
            last_move_ms: f64::NEG_INFINITY,
            last_frame_ms: None,
            total_rotation: 0.0,
            cruise_velocity: 0.0,
            rpm: 0,
            last_rpm_ms: None,
            voiced: false,
        }
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn rpm(&self) -> u32 {
        self.rpm
    }

    fn update_rpm(&mut self, radians_per_sec: f32, now_ms: f64) {
        if let Some(last) = self.last_rpm_ms {
            if now_ms - last < RPM_INTERVAL_MS {
                return;
            }
        }
        self.rpm = (radians_per_sec.abs() * 60.0 / TAU).round() as u32;
        self.last_rpm_ms = Some(now_ms);
    }

    fn spin_cue(&self, velocity: f32) -> Cue {
        Cue::Spin((velocity.abs() * SPIN_CUE_SCALE).min(1.0))
    }

    fn silence(&mut self) {
        if std::mem::take(&mut self.voiced) {
            self.core.cue(Cue::SpinStop);
        }
    }

    fn come_to_rest(&mut self) {
        self.velocity = 0.0;
        self.rpm = 0;
        self.last_frame_ms = None;
        self.core.stop_simulation();
        self.silence();
    }
}

impl Widget for Spinner {
    fn variant(&self) -> Variant {
        Variant::Spinner
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
        self.dragging = Some(input.id);
        self.velocity = 0.0;
        self.last_angle = angle_around(self.core.center(), input.pos);
        self.last_sample_ms = input.time_ms;
        if self.core.zen() {
            self.total_rotation = 0.0;
        }
        self.core.stop_simulation();
        // A grab mid-coast keeps the running spin sound
        if !self.voiced {
            self.voiced = true;
            self.core.cue(Cue::SpinStart);
        }
        Outcome::Handled
    }

    fn pointer_move(&mut self, input: &PointerInput) -> Outcome {
        if self.dragging != Some(input.id) || !self.core.accepts_input() {
            return Outcome::Ignored;
        }

        let current = angle_around(self.core.center(), input.pos);
        let delta = unwrap_delta(current - self.last_angle);
        self.angle += delta;

        let dt = (input.time_ms - self.last_sample_ms) as f32;
        if dt > 0.0 {
            let sample = delta / dt;
            self.velocity = self.velocity * SMOOTHING + sample * (1.0 - SMOOTHING);
            self.core.cue(self.spin_cue(self.velocity));
        }

        self.last_move_ms = input.time_ms;
        self.last_angle = current;
        self.last_sample_ms = input.time_ms;
        Outcome::Handled
    }

    fn pointer_up(&mut self, input: &PointerInput) -> Outcome {
        if self.dragging != Some(input.id) {
            return Outcome::Ignored;
        }
        self.dragging = None;
        self.last_frame_ms = None;
        self.core.start_simulation();
        Outcome::Handled
    }

    fn tick(&mut self, now_ms: f64) -> Outcome {
        if self.dragging.is_some() {
            return Outcome::Ignored;
        }
        let dt = self.last_frame_ms.map_or(0.0, |last| (now_ms - last) as f32);
        self.last_frame_ms = Some(now_ms);

        if self.core.is_completed() {
            self.angle += self.cruise_velocity * dt;
            self.update_rpm(self.cruise_velocity * 1000.0, now_ms);
            return Outcome::Handled;
        }

        let coasting =
            self.velocity.abs() > STOP_VELOCITY || now_ms - self.last_move_ms < MOVE_GRACE_MS;
        if !coasting {
            self.come_to_rest();
            return Outcome::Handled;
        }

        self.angle += self.velocity * dt;
        self.velocity *= FRICTION.powf(dt / 16.0);
        self.core.cue(self.spin_cue(self.velocity));
        self.update_rpm(self.velocity * 1000.0, now_ms);
        self.total_rotation += (self.velocity * dt).abs();

        if self.total_rotation <= COMPLETE_ROTATION {
            return Outcome::Handled;
        }
        let outcome = self.core.complete();
        if self.core.zen() {
            self.total_rotation = 0.0;
        } else {
            self.cruise_velocity = self.velocity;
            log::debug!("Spinner completed at {:.4} rad/ms", self.velocity);
        }
        outcome
    }

    fn disable(&mut self) {
        self.core.disable();
        self.silence();
    }

    fn destroy(&mut self) {
        self.core.destroy();
        self.silence();
    }

    fn view(&self) -> WidgetView {
        WidgetView {
            variant: Variant::Spinner,
            position: self.core.position,
            size: self.core.size,
            color: self.core.color,
            completed: self.core.is_completed(),
            pressed: self.dragging.is_some(),
            pulses: self.core.pulses(),
            state: ViewState::Spinner {
                angle: self.angle,
                rpm: self.rpm,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::testing::recording_context;

    const SIZE: f32 = 200.0;

    fn polar(angle: f32, time_ms: f64) -> PointerInput {
        let pos = Vec2::splat(SIZE / 2.0) + Vec2::from_angle(angle) * 60.0;
        PointerInput::new(4, pos.x, pos.y, time_ms)
    }

    /// Drag `steps` samples of `step` radians every 10 ms, then release.
    /// Returns the release time.
    fn flick(spinner: &mut Spinner, start_ms: f64, step: f32, steps: u32) -> f64 {
        spinner.pointer_down(&polar(0.0, start_ms));
        let mut t = start_ms;
        for i in 1..=steps {
            t += 10.0;
            spinner.pointer_move(&polar(i as f32 * step, t));
        }
        spinner.pointer_up(&polar(0.0, t));
        t
    }

    /// Run frames at 16 ms while simulating; returns completions and end time
    fn coast(spinner: &mut Spinner, start_ms: f64, frames: u32) -> (u32, f64) {
        let mut completions = 0;
        let mut t = start_ms;
        for _ in 0..frames {
            t += 16.0;
            if !spinner.is_simulating() {
                break;
            }
            if spinner.tick(t).is_completed() {
                completions += 1;
            }
        }
        (completions, t)
    }

    #[test]
    fn test_spinner_fast_flick_completes_silently() {
        let (ctx, recorder) = recording_context(false);
        let mut spinner = Spinner::new(Vec2::splat(SIZE), "#EC4899", &ctx);

        let released = flick(&mut spinner, 0.0, 0.3, 20);
        assert!(spinner.velocity() > 0.02);
        assert!(spinner.is_simulating());
        assert_eq!(recorder.count(Cue::SpinStart), 1);
        assert_eq!(recorder.count(Cue::SpinStop), 0);
        let dragged = recorder.count_matching(|c| matches!(c, Cue::Spin(_)));
        assert!(dragged >= 20);

        let (completions, _) = coast(&mut spinner, released, 400);
        assert_eq!(completions, 1);
        assert!(spinner.is_completed());
        assert_eq!(recorder.count(Cue::Complete), 0);

        // The spin sound carries the coast and the completion
        assert!(recorder.count_matching(|c| matches!(c, Cue::Spin(_))) > dragged);
        assert_eq!(recorder.count(Cue::SpinStop), 0);

        // Still cruising; released only when the board takes it away
        spinner.disable();
        assert_eq!(recorder.count(Cue::SpinStop), 1);
        spinner.destroy();
        assert_eq!(recorder.count(Cue::SpinStop), 1);
    }

    #[test]
    fn test_spin_cue_follows_coast_until_rest() {
        let (ctx, recorder) = recording_context(false);
        let mut spinner = Spinner::new(Vec2::splat(SIZE), "#EC4899", &ctx);

        let released = flick(&mut spinner, 0.0, 0.05, 10);
        let dragged = recorder.count_matching(|c| matches!(c, Cue::Spin(_)));
        assert_eq!(recorder.count(Cue::SpinStop), 0);

        let (completions, _) = coast(&mut spinner, released, 2000);
        assert_eq!(completions, 0);
        assert!(!spinner.is_simulating());
        assert!(recorder.count_matching(|c| matches!(c, Cue::Spin(_))) > dragged);
        assert_eq!(recorder.count(Cue::SpinStop), 1);

        // Spin cues fade with the velocity; the last coasting one is quiet
        let last_spin = recorder
            .cues
            .borrow()
            .iter()
            .rev()
            .find_map(|c| match c {
                Cue::Spin(speed) => Some(*speed),
                _ => None,
            });
        assert!(last_spin.is_some_and(|speed| speed < 0.01));
        assert_eq!(recorder.cues.borrow().last(), Some(&Cue::SpinStop));
    }

    #[test]
    fn test_completed_spinner_keeps_turning() {
        let ctx = Context::headless();
        let mut spinner = Spinner::new(Vec2::splat(SIZE), "#EC4899", &ctx);
        let released = flick(&mut spinner, 0.0, 0.3, 20);
        let (_, t) = coast(&mut spinner, released, 400);
        assert!(spinner.is_completed());
        assert!(spinner.is_simulating());

        let before = spinner.angle();
        spinner.tick(t + 500.0);
        assert!(spinner.angle() > before);
        assert!(spinner.rpm() > 0);

        // Presses are ignored once done
        assert_eq!(spinner.pointer_down(&polar(0.0, t + 600.0)), Outcome::Ignored);

        spinner.disable();
        assert!(!spinner.is_simulating());
    }

    #[test]
    fn test_gentle_spin_stops_without_completing() {
        let ctx = Context::headless();
        let mut spinner = Spinner::new(Vec2::splat(SIZE), "#EC4899", &ctx);
        let released = flick(&mut spinner, 0.0, 0.01, 10);
        let (completions, _) = coast(&mut spinner, released, 1000);
        assert_eq!(completions, 0);
        assert!(!spinner.is_simulating());
        assert!(!spinner.is_completed());
        assert_eq!(spinner.velocity(), 0.0);
        assert_eq!(spinner.rpm(), 0);
    }

    #[test]
    fn test_spinner_zen_pulses_per_flick() {
        let (ctx, recorder) = recording_context(true);
        let mut spinner = Spinner::new(Vec2::splat(SIZE), "#EC4899", &ctx);

        let released = flick(&mut spinner, 0.0, 0.3, 20);
        let (first, t) = coast(&mut spinner, released, 1000);
        assert_eq!(first, 1);
        assert!(!spinner.is_simulating());

        let released = flick(&mut spinner, t + 100.0, 0.3, 20);
        let (second, _) = coast(&mut spinner, released, 1000);
        assert_eq!(second, 1);
        assert!(!spinner.is_completed());
        assert_eq!(spinner.view().pulses, 2);
        assert_eq!(recorder.count(Cue::Complete), 0);
        assert_eq!(recorder.count(Cue::SpinStart), 2);
        assert_eq!(recorder.count(Cue::SpinStop), 2);
    }
}
