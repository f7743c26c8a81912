//! Interactive widgets
//!
//! One `Widget` trait, seven variant structs. Every widget owns a
//! `WidgetCore` (geometry, completion flag, simulation flag) and reports
//! completion through the `Outcome` returned from each input or frame call;
//! the level coordinator is the only listener.
//!
//! Pointer positions handed to a widget are local to its top-left corner.
//! Frame-driven widgets (hold, spin, zen resets) raise their simulation flag
//! and are advanced by the coordinator's single frame driver; `disable` and
//! `destroy` lower it, so no frame work outlives the widget.

pub mod audio_slider;
pub mod button;
pub mod knob;
pub mod rapid_fire;
pub mod slider;
pub mod spinner;
pub mod tap_button;

pub use audio_slider::AudioSlider;
pub use button::Button;
pub use knob::Knob;
pub use rapid_fire::RapidFireButton;
pub use slider::Slider;
pub use spinner::Spinner;
pub use tap_button::TapButton;

use std::rc::Rc;

use glam::Vec2;

use crate::board::{Orientation, Variant};
use crate::feedback::{Context, Cue};

/// Browser pointer id (mouse, pen, each touch)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PointerId(pub i32);

/// One pointer sample routed to a widget
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    pub id: PointerId,
    /// Position relative to the widget's top-left corner (pixels)
    pub pos: Vec2,
    /// Monotonic timestamp (ms)
    pub time_ms: f64,
}

impl PointerInput {
    pub fn new(id: i32, x: f32, y: f32, time_ms: f64) -> Self {
        Self {
            id: PointerId(id),
            pos: Vec2::new(x, y),
            time_ms,
        }
    }
}

/// What a widget did with an input or frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Not for this widget (outside its hit region, wrong pointer, locked)
    Ignored,
    /// Consumed, no completion
    Handled,
    /// Consumed and the widget just completed (or pulsed, in zen mode)
    Completed,
}

impl Outcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed)
    }

    pub fn is_accepted(&self) -> bool {
        !matches!(self, Outcome::Ignored)
    }

    /// Keep the stronger of two outcomes
    pub fn merge(self, other: Outcome) -> Outcome {
        match (self, other) {
            (Outcome::Completed, _) | (_, Outcome::Completed) => Outcome::Completed,
            (Outcome::Handled, _) | (_, Outcome::Handled) => Outcome::Handled,
            _ => Outcome::Ignored,
        }
    }
}

/// State shared by every widget variant
pub struct WidgetCore {
    ctx: Rc<Context>,
    pub color: &'static str,
    pub position: Vec2,
    pub size: Vec2,
    completed: bool,
    disabled: bool,
    destroyed: bool,
    simulating: bool,
    /// Completion pulses fired so far (1 at most outside zen mode)
    pulses: u32,
    /// Suppress the generic completion cue (widget has its own sound)
    silent_complete: bool,
}

impl WidgetCore {
    pub fn new(size: Vec2, color: &'static str, ctx: &Rc<Context>) -> Self {
        Self {
            ctx: Rc::clone(ctx),
            color,
            position: Vec2::ZERO,
            size,
            completed: false,
            disabled: false,
            destroyed: false,
            simulating: false,
            pulses: 0,
            silent_complete: false,
        }
    }

    pub fn ctx(&self) -> &Context {
        &self.ctx
    }

    #[inline]
    pub fn cue(&self, cue: Cue) {
        self.ctx.cue(cue);
    }

    pub fn zen(&self) -> bool {
        self.ctx.zen_mode()
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled || self.destroyed
    }

    pub fn pulses(&self) -> u32 {
        self.pulses
    }

    pub fn center(&self) -> Vec2 {
        self.size / 2.0
    }

    /// Input is dropped once disabled, or once completed outside zen mode
    pub fn accepts_input(&self) -> bool {
        !self.is_disabled() && !(self.completed && !self.zen())
    }

    pub fn set_silent_complete(&mut self, silent: bool) {
        self.silent_complete = silent;
    }

    /// Mark completion (or fire a zen pulse)
    ///
    /// Returns `Ignored` if the widget already completed outside zen mode.
    pub fn complete(&mut self) -> Outcome {
        let zen = self.zen();
        if self.completed && !zen {
            return Outcome::Ignored;
        }
        if !zen {
            self.completed = true;
        }
        if !self.silent_complete {
            self.cue(Cue::Complete);
        }
        self.pulses += 1;
        Outcome::Completed
    }

    pub fn is_simulating(&self) -> bool {
        self.simulating && !self.is_disabled()
    }

    pub fn start_simulation(&mut self) {
        if !self.is_disabled() {
            self.simulating = true;
        }
    }

    pub fn stop_simulation(&mut self) {
        self.simulating = false;
    }

    pub fn disable(&mut self) {
        self.disabled = true;
        self.simulating = false;
    }

    pub fn destroy(&mut self) {
        self.destroyed = true;
        self.simulating = false;
    }
}

/// Rising-edge detector for threshold completions
///
/// Fires once when the value first reaches the threshold and re-arms only
/// after it falls back below. Outside zen mode the widget locks on the first
/// firing, so this only matters for zen pulses.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThresholdLatch {
    latched: bool,
}

impl ThresholdLatch {
    pub fn update(&mut self, reached: bool) -> bool {
        if reached {
            let fire = !self.latched;
            self.latched = true;
            fire
        } else {
            self.latched = false;
            false
        }
    }
}

/// Variant-specific visual state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewState {
    Button,
    Slider {
        value: f32,
        orientation: Orientation,
        /// Handle offset along the track (pixels from the track start)
        handle_offset: f32,
        /// Filled track length (pixels)
        fill_length: f32,
    },
    AudioSlider {
        value: f32,
        orientation: Orientation,
        bars: u32,
        /// Bars lit from the start of the grille
        lit: u32,
    },
    Knob {
        value: f32,
        /// Pointer dot angle (radians, screen coordinates)
        pointer_angle: f32,
    },
    Spinner {
        angle: f32,
        rpm: u32,
    },
    RapidFire {
        progress: f32,
    },
    Tap {
        lit: u32,
        total: u32,
    },
}

/// Snapshot of a widget for the visual surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WidgetView {
    pub variant: Variant,
    pub position: Vec2,
    pub size: Vec2,
    pub color: &'static str,
    pub completed: bool,
    pub pressed: bool,
    pub pulses: u32,
    pub state: ViewState,
}

/// Interactive widget
pub trait Widget {
    fn variant(&self) -> Variant;

    fn core(&self) -> &WidgetCore;

    fn core_mut(&mut self) -> &mut WidgetCore;

    /// Pointer pressed inside the widget's rect
    fn pointer_down(&mut self, input: &PointerInput) -> Outcome;

    /// Pointer moved while captured by this widget
    fn pointer_move(&mut self, _input: &PointerInput) -> Outcome {
        Outcome::Ignored
    }

    /// Pointer released while captured by this widget
    fn pointer_up(&mut self, _input: &PointerInput) -> Outcome {
        Outcome::Ignored
    }

    /// Pointer cancelled by the platform; treated as a release
    fn pointer_cancel(&mut self, input: &PointerInput) -> Outcome {
        self.pointer_up(input)
    }

    /// Advance frame-driven behaviour; only called while simulating
    fn tick(&mut self, _now_ms: f64) -> Outcome {
        Outcome::Ignored
    }

    fn view(&self) -> WidgetView;

    fn set_position(&mut self, x: f32, y: f32) {
        self.core_mut().position = Vec2::new(x, y);
    }

    fn position(&self) -> Vec2 {
        self.core().position
    }

    fn size(&self) -> Vec2 {
        self.core().size
    }

    /// Whether a board-space point falls inside the widget's rect
    fn contains(&self, board_pos: Vec2) -> bool {
        let local = board_pos - self.core().position;
        local.cmpge(Vec2::ZERO).all() && local.cmplt(self.core().size).all()
    }

    fn is_completed(&self) -> bool {
        self.core().is_completed()
    }

    fn is_simulating(&self) -> bool {
        self.core().is_simulating()
    }

    /// Stop accepting input and stop any frame work
    fn disable(&mut self) {
        self.core_mut().disable();
    }

    /// Release the widget for good
    fn destroy(&mut self) {
        self.core_mut().destroy();
    }
}

/// Build the widget for a variant
pub fn create(
    variant: Variant,
    size: Vec2,
    color: &'static str,
    ctx: &Rc<Context>,
    orientation: Orientation,
) -> Box<dyn Widget> {
    match variant {
        Variant::Button => Box::new(Button::new(size, color, ctx)),
        Variant::Slider => Box::new(Slider::new(size, color, ctx, orientation)),
        Variant::AudioSlider => Box::new(AudioSlider::new(size, color, ctx, orientation)),
        Variant::Knob => Box::new(Knob::new(size, color, ctx)),
        Variant::Spinner => Box::new(Spinner::new(size, color, ctx)),
        Variant::RapidFireButton => Box::new(RapidFireButton::new(size, color, ctx)),
        Variant::TapButton => Box::new(TapButton::new(size, color, ctx)),
    }
}
