//! Semantic feedback cues and the shared game context
//!
//! Widgets never touch audio directly: they fire named cues with numeric
//! parameters and let the `Feedback` implementation decide what they sound
//! like. The browser build plays them through Web Audio (`crate::audio`);
//! headless builds and tests use `NullFeedback` or a recorder.

use std::cell::Cell;
use std::rc::Rc;

use crate::settings::{Settings, VolumeLevel};

/// Feedback cue types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cue {
    /// Button press / tap
    Click,
    /// Crossed a detent: step `index` of `total`
    StepChange { index: u32, total: u32 },
    /// Hold progress ramp (0.0 - 1.0)
    Progress(f32),
    /// Spin speed (0.0 - 1.0) while dragging or coasting
    Spin(f32),
    /// Spinner grabbed
    SpinStart,
    /// Spinner came to rest (or was taken off the board)
    SpinStop,
    /// Hold started
    HoldStart,
    /// Hold released
    HoldStop,
    /// Slider handle grabbed
    SlideStart,
    /// Slider handle moved to value (0.0 - 1.0)
    SlideMove(f32),
    /// Slider handle released
    SlideStop,
    /// Tap counter dot `index` of `total` lit
    Dot { index: u32, total: u32 },
    /// A single widget completed
    Complete,
    /// Whole board completed
    LevelComplete,
}

/// Feedback service consumed by the core
///
/// Implementations are free to use interior mutability: the game is
/// single-threaded and every widget shares one handle.
pub trait Feedback {
    /// Fire a cue
    fn play(&self, cue: Cue);

    /// Apply a master volume step
    fn set_volume(&self, level: VolumeLevel);
}

/// Feedback sink that ignores every cue
#[derive(Debug, Default, Clone, Copy)]
pub struct NullFeedback;

impl Feedback for NullFeedback {
    fn play(&self, _cue: Cue) {}

    fn set_volume(&self, _level: VolumeLevel) {}
}

/// Process-wide game context
///
/// Created once at startup and shared (`Rc`) by the coordinator and every
/// widget for the lifetime of the process. Holds the feedback handle and the
/// toggles the surrounding UI flips.
pub struct Context {
    feedback: Rc<dyn Feedback>,
    settings: Cell<Settings>,
}

impl Context {
    pub fn new(feedback: Rc<dyn Feedback>, settings: Settings) -> Rc<Self> {
        feedback.set_volume(settings.volume);
        Rc::new(Self {
            feedback,
            settings: Cell::new(settings),
        })
    }

    /// Context with silent feedback and default settings
    pub fn headless() -> Rc<Self> {
        Self::new(Rc::new(NullFeedback), Settings::default())
    }

    /// Fire a feedback cue
    #[inline]
    pub fn cue(&self, cue: Cue) {
        self.feedback.play(cue);
    }

    pub fn settings(&self) -> Settings {
        self.settings.get()
    }

    pub fn zen_mode(&self) -> bool {
        self.settings.get().zen_mode
    }

    pub fn set_zen_mode(&self, enabled: bool) {
        let mut settings = self.settings.get();
        settings.zen_mode = enabled;
        self.settings.set(settings);
        log::info!("Zen mode: {}", enabled);
    }

    pub fn volume(&self) -> VolumeLevel {
        self.settings.get().volume
    }

    pub fn set_volume(&self, level: VolumeLevel) {
        let mut settings = self.settings.get();
        settings.volume = level;
        self.settings.set(settings);
        self.feedback.set_volume(level);
        log::info!("Volume: {}", level.as_str());
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("settings", &self.settings.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    /// Records every cue for assertions
    #[derive(Debug, Default)]
    pub(crate) struct Recorder {
        pub cues: RefCell<Vec<Cue>>,
        pub volume: Cell<Option<VolumeLevel>>,
    }

    impl Recorder {
        pub(crate) fn count(&self, wanted: Cue) -> usize {
            self.cues.borrow().iter().filter(|c| **c == wanted).count()
        }

        pub(crate) fn count_matching(&self, pred: impl Fn(&Cue) -> bool) -> usize {
            self.cues.borrow().iter().filter(|c| pred(c)).count()
        }
    }

    impl Feedback for Recorder {
        fn play(&self, cue: Cue) {
            self.cues.borrow_mut().push(cue);
        }

        fn set_volume(&self, level: VolumeLevel) {
            self.volume.set(Some(level));
        }
    }

    /// Context wired to a fresh recorder
    pub(crate) fn recording_context(zen: bool) -> (Rc<Context>, Rc<Recorder>) {
        let recorder = Rc::new(Recorder::default());
        let ctx = Context::new(
            recorder.clone(),
            Settings {
                zen_mode: zen,
                ..Settings::default()
            },
        );
        (ctx, recorder)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::recording_context;
    use super::*;

    #[test]
    fn test_context_forwards_volume() {
        let (ctx, recorder) = recording_context(false);
        assert_eq!(recorder.volume.get(), Some(VolumeLevel::High));

        ctx.set_volume(VolumeLevel::Muted);
        assert_eq!(ctx.volume(), VolumeLevel::Muted);
        assert_eq!(recorder.volume.get(), Some(VolumeLevel::Muted));
    }

    #[test]
    fn test_context_zen_toggle() {
        let (ctx, recorder) = recording_context(false);
        assert!(!ctx.zen_mode());
        ctx.set_zen_mode(true);
        assert!(ctx.zen_mode());

        ctx.cue(Cue::Click);
        assert_eq!(recorder.count(Cue::Click), 1);
    }
}
