//! Web Audio feedback
//!
//! Every cue is synthesised from oscillators; there are no sample files.
//! The `AudioContext` is created on the first cue, which always follows a
//! user gesture, so browsers let it start. Any Web Audio failure disables
//! sound for the session and is logged once; the game keeps running.

use std::cell::{Cell, RefCell};

use web_sys::{AudioContext, AudioContextState, GainNode, OscillatorNode, OscillatorType};

use crate::feedback::{Cue, Feedback};
use crate::settings::VolumeLevel;

/// Minimum spacing between hold-progress ticks (seconds)
const PROGRESS_INTERVAL: f64 = 0.05;

/// A sustained oscillator (slide hum, spin whirr) shaped while it plays
struct Voice {
    osc: OscillatorNode,
    gain: GainNode,
}

/// Web Audio graph: one context, one master gain, the sustained voices
struct Graph {
    ctx: AudioContext,
    master: GainNode,
}

pub struct AudioFeedback {
    graph: RefCell<Option<Graph>>,
    /// Audio unavailable; stop trying
    failed: Cell<bool>,
    master_gain: Cell<f32>,
    slide: RefCell<Option<Voice>>,
    spin: RefCell<Option<Voice>>,
    last_progress: Cell<f64>,
}

impl Default for AudioFeedback {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioFeedback {
    pub fn new() -> Self {
        Self {
            graph: RefCell::new(None),
            failed: Cell::new(false),
            master_gain: Cell::new(VolumeLevel::default().gain()),
            slide: RefCell::new(None),
            spin: RefCell::new(None),
            last_progress: Cell::new(0.0),
        }
    }

    fn build_graph(&self) -> Option<Graph> {
        let ctx = AudioContext::new().ok()?;
        let master = ctx.create_gain().ok()?;
        master.gain().set_value(self.master_gain.get());
        master.connect_with_audio_node(&ctx.destination()).ok()?;
        Some(Graph { ctx, master })
    }

    /// Context and master bus, created on first use
    fn graph(&self) -> Option<(AudioContext, GainNode)> {
        if self.failed.get() {
            return None;
        }
        let mut graph = self.graph.borrow_mut();
        if graph.is_none() {
            match self.build_graph() {
                Some(built) => {
                    log::info!("Audio context created");
                    *graph = Some(built);
                }
                None => {
                    log::warn!("Failed to create AudioContext - audio disabled");
                    self.failed.set(true);
                    return None;
                }
            }
        }
        let graph = graph.as_ref()?;

        // Resume context if suspended (browsers require user gesture)
        if graph.ctx.state() == AudioContextState::Suspended {
            let _ = graph.ctx.resume();
        }
        Some((graph.ctx.clone(), graph.master.clone()))
    }

    /// Create an oscillator with its own gain stage on the master bus
    fn create_osc(
        &self,
        ctx: &AudioContext,
        master: &GainNode,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(master).ok()?;

        Some((osc, gain))
    }

    /// Short enveloped tone: `from` Hz sweeping to `to` Hz over `length` s
    #[allow(clippy::too_many_arguments)]
    fn blip(
        &self,
        ctx: &AudioContext,
        master: &GainNode,
        from: f32,
        to: f32,
        peak: f32,
        length: f64,
        osc_type: OscillatorType,
        delay: f64,
    ) {
        let Some((osc, gain)) = self.create_osc(ctx, master, from, osc_type) else {
            return;
        };
        let t = ctx.current_time() + delay;

        gain.gain().set_value_at_time(0.0, t).ok();
        gain.gain().linear_ramp_to_value_at_time(peak, t + 0.003).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.001, t + length)
            .ok();
        osc.frequency().set_value_at_time(from, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(to.max(1.0), t + length)
            .ok();

        osc.start_with_when(t).ok();
        osc.stop_with_when(t + length + 0.02).ok();
    }

    /// Click - low thump plus an octave overtone
    fn play_click(&self, ctx: &AudioContext, master: &GainNode) {
        self.blip(ctx, master, 180.0, 80.0, 0.55, 0.08, OscillatorType::Sine, 0.0);
        self.blip(ctx, master, 360.0, 160.0, 0.2, 0.05, OscillatorType::Sine, 0.0);
    }

    /// Detent - pitch rises with position along the range
    fn play_detent(&self, ctx: &AudioContext, master: &GainNode, index: u32, total: u32) {
        let progress = ((index + 1) as f32 / total.max(1) as f32).min(1.0);
        let base = 200.0 + progress * 150.0;
        self.blip(ctx, master, base + 100.0, base - 50.0, 0.35, 0.04, OscillatorType::Sine, 0.0);
        self.blip(
            ctx,
            master,
            800.0 + progress * 200.0,
            800.0 + progress * 200.0,
            0.08,
            0.008,
            OscillatorType::Square,
            0.0,
        );
    }

    /// Hold tick - throttled, rising with progress
    fn play_progress(&self, ctx: &AudioContext, master: &GainNode, progress: f32) {
        let now = ctx.current_time();
        if now - self.last_progress.get() < PROGRESS_INTERVAL {
            return;
        }
        self.last_progress.set(now);

        let base = 150.0 + progress * 300.0;
        let volume = 0.2 + progress * 0.25;
        self.blip(ctx, master, base, base + 30.0, volume, 0.06, OscillatorType::Sine, 0.0);
    }

    /// Tap dot - brighter as the ring fills
    fn play_dot(&self, ctx: &AudioContext, master: &GainNode, index: u32, total: u32) {
        let progress = (index + 1) as f32 / total.max(1) as f32;
        let base = 300.0 + progress * 400.0;
        let volume = 0.12 + progress * 0.12;
        self.blip(ctx, master, base, base * 0.8, volume, 0.1, OscillatorType::Sine, 0.0);
    }

    /// Widget complete - snappy latch
    fn play_complete(&self, ctx: &AudioContext, master: &GainNode) {
        self.blip(ctx, master, 300.0, 120.0, 0.4, 0.05, OscillatorType::Sine, 0.0);
        self.blip(ctx, master, 600.0, 240.0, 0.18, 0.035, OscillatorType::Sine, 0.0);
        self.blip(ctx, master, 1200.0, 400.0, 0.12, 0.025, OscillatorType::Sine, 0.0);
    }

    /// Board complete - rising arpeggio of bell tones
    fn play_level_complete(&self, ctx: &AudioContext, master: &GainNode) {
        for (i, freq) in [523.25_f32, 659.25, 783.99, 1046.5].iter().enumerate() {
            let delay = i as f64 * 0.09;
            self.blip(ctx, master, *freq, *freq, 0.25, 0.4, OscillatorType::Sine, delay);
            self.blip(ctx, master, freq * 2.0, freq * 2.0, 0.08, 0.25, OscillatorType::Sine, delay);
        }
    }

    /// Hold start - soft switch
    fn play_hold_start(&self, ctx: &AudioContext, master: &GainNode) {
        self.blip(ctx, master, 150.0, 400.0, 0.3, 0.06, OscillatorType::Sine, 0.0);
    }

    /// Start a sustained voice fading in to `level`
    fn start_voice(
        &self,
        ctx: &AudioContext,
        master: &GainNode,
        freq: f32,
        level: f32,
        osc_type: OscillatorType,
    ) -> Option<Voice> {
        let (osc, gain) = self.create_osc(ctx, master, freq, osc_type)?;
        let t = ctx.current_time();
        gain.gain().set_value_at_time(0.0, t).ok();
        gain.gain().linear_ramp_to_value_at_time(level, t + 0.08).ok();
        osc.start().ok()?;
        Some(Voice { osc, gain })
    }

    /// Glide a sustained voice to a new pitch and level
    fn shape_voice(ctx: &AudioContext, voice: &Voice, freq: f32, level: f32) {
        let t = ctx.current_time();
        voice.osc.frequency().linear_ramp_to_value_at_time(freq, t + 0.03).ok();
        voice.gain.gain().linear_ramp_to_value_at_time(level, t + 0.03).ok();
    }

    /// Fade a sustained voice out and stop it
    fn release_voice(ctx: &AudioContext, voice: Voice) {
        let t = ctx.current_time();
        voice.gain.gain().cancel_scheduled_values(t).ok();
        voice.gain.gain().linear_ramp_to_value_at_time(0.0, t + 0.12).ok();
        voice.osc.stop_with_when(t + 0.15).ok();
    }

    fn slide_start(&self, ctx: &AudioContext, master: &GainNode) {
        let mut slide = self.slide.borrow_mut();
        if slide.is_none() {
            *slide = self.start_voice(ctx, master, 200.0, 0.1, OscillatorType::Sine);
        }
    }

    fn slide_move(&self, ctx: &AudioContext, value: f32) {
        if let Some(voice) = self.slide.borrow().as_ref() {
            Self::shape_voice(ctx, voice, 180.0 + value * 80.0, 0.08 + value * 0.06);
        }
    }

    fn spin(&self, ctx: &AudioContext, master: &GainNode, speed: f32) {
        let mut spin = self.spin.borrow_mut();
        if spin.is_none() {
            *spin = self.start_voice(ctx, master, 60.0, 0.0, OscillatorType::Triangle);
        }
        if let Some(voice) = spin.as_ref() {
            Self::shape_voice(ctx, voice, 60.0 + speed * 140.0, 0.04 + speed * 0.16);
        }
    }
}

impl Feedback for AudioFeedback {
    fn play(&self, cue: Cue) {
        if self.master_gain.get() <= 0.0 {
            // Still release sustained voices so nothing hangs when unmuted
            if !matches!(cue, Cue::SlideStop | Cue::SpinStop) {
                return;
            }
        }
        let Some((ctx, master)) = self.graph() else {
            return;
        };

        match cue {
            Cue::Click => self.play_click(&ctx, &master),
            Cue::StepChange { index, total } => self.play_detent(&ctx, &master, index, total),
            Cue::Progress(p) => self.play_progress(&ctx, &master, p),
            Cue::Spin(speed) => self.spin(&ctx, &master, speed.clamp(0.0, 1.0)),
            Cue::SpinStart => {}
            Cue::SpinStop => {
                if let Some(voice) = self.spin.borrow_mut().take() {
                    Self::release_voice(&ctx, voice);
                }
            }
            Cue::HoldStart => self.play_hold_start(&ctx, &master),
            Cue::HoldStop => {}
            Cue::SlideStart => self.slide_start(&ctx, &master),
            Cue::SlideMove(value) => self.slide_move(&ctx, value),
            Cue::SlideStop => {
                if let Some(voice) = self.slide.borrow_mut().take() {
                    Self::release_voice(&ctx, voice);
                }
            }
            Cue::Dot { index, total } => self.play_dot(&ctx, &master, index, total),
            Cue::Complete => self.play_complete(&ctx, &master),
            Cue::LevelComplete => self.play_level_complete(&ctx, &master),
        }
    }

    fn set_volume(&self, level: VolumeLevel) {
        self.master_gain.set(level.gain());
        if let Some(graph) = self.graph.borrow().as_ref() {
            let t = graph.ctx.current_time();
            graph.master.gain().set_value_at_time(level.gain(), t).ok();
        }
    }
}
