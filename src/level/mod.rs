//! Level coordinator
//!
//! Owns the active widget set, routes pointer input to it, listens for
//! completions and runs the slide to the next board once every widget is
//! done. Also the single frame driver: `tick` advances every widget whose
//! simulation flag is raised, then the slide.

pub mod transition;

pub use transition::{Transition, TransitionFrame};

use std::collections::HashMap;
use std::rc::Rc;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::board::{self, BoardConfig, pack};
use crate::feedback::{Context, Cue};
use crate::widget::{self, Outcome, PointerId, PointerInput, Widget, WidgetView};

/// Coordinator lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing on the board yet
    Idle,
    /// A board is live and accepting input
    Populated,
    /// Board finished; sliding to the next one
    Transitioning,
}

/// One board's worth of widgets
pub struct Level {
    /// 1-based level counter
    pub number: u32,
    pub widgets: Vec<Box<dyn Widget>>,
    /// Vertical slide offset (pixels)
    pub offset_y: f32,
}

impl Level {
    pub fn all_completed(&self) -> bool {
        !self.widgets.is_empty() && self.widgets.iter().all(|w| w.is_completed())
    }

    pub fn completed_count(&self) -> usize {
        self.widgets.iter().filter(|w| w.is_completed()).count()
    }

    fn destroy(&mut self) {
        for widget in &mut self.widgets {
            widget.destroy();
        }
    }
}

pub struct LevelCoordinator {
    ctx: Rc<Context>,
    config: BoardConfig,
    rng: Pcg32,
    phase: Phase,
    current: Option<Level>,
    outgoing: Option<Level>,
    transition: Option<Transition>,
    /// Pointer id → index of the current-level widget that owns it
    captures: HashMap<PointerId, usize>,
    levels_started: u32,
    /// Resize arrived mid-slide; re-pack once it lands
    repack_pending: bool,
}

impl LevelCoordinator {
    pub fn new(ctx: Rc<Context>, config: BoardConfig, seed: u64) -> Self {
        Self {
            ctx,
            config,
            rng: Pcg32::seed_from_u64(seed),
            phase: Phase::Idle,
            current: None,
            outgoing: None,
            transition: None,
            captures: HashMap::new(),
            levels_started: 0,
            repack_pending: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_transitioning(&self) -> bool {
        self.phase == Phase::Transitioning
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn context(&self) -> &Rc<Context> {
        &self.ctx
    }

    pub fn current(&self) -> Option<&Level> {
        self.current.as_ref()
    }

    /// Level number on screen (0 before the first populate)
    pub fn level_number(&self) -> u32 {
        self.current.as_ref().map_or(0, |level| level.number)
    }

    fn next_level_number(&mut self) -> u32 {
        self.levels_started += 1;
        self.levels_started
    }

    fn build_level(&mut self, number: u32) -> Level {
        let packed = pack(self.config.cols, self.config.rows, &mut self.rng);
        let descriptors = board::describe(&packed, &mut self.rng);

        let widgets = descriptors
            .iter()
            .map(|d| {
                let (pos, size) = self.config.widget_rect(&d.footprint);
                let mut w = widget::create(d.variant, size, d.color, &self.ctx, d.orientation);
                w.set_position(pos.x, pos.y);
                w
            })
            .collect::<Vec<_>>();

        log::info!(
            "Level {}: {} widgets on a {}x{} board",
            number,
            widgets.len(),
            self.config.cols,
            self.config.rows
        );
        Level {
            number,
            widgets,
            offset_y: 0.0,
        }
    }

    /// Replace the active board with a freshly packed one
    ///
    /// No-op while a transition runs.
    pub fn populate(&mut self) {
        if self.is_transitioning() {
            log::debug!("populate ignored: transition in progress");
            return;
        }
        let number = self.next_level_number();
        self.replace_current(number);
    }

    /// Pack a fresh layout for the level on screen, keeping its number
    fn repack(&mut self) {
        if self.is_transitioning() {
            return;
        }
        let number = self.level_number().max(1);
        self.replace_current(number);
    }

    fn replace_current(&mut self, number: u32) {
        if let Some(mut old) = self.current.take() {
            old.destroy();
        }
        self.captures.clear();
        let level = self.build_level(number);
        self.current = Some(level);
        self.phase = Phase::Populated;
    }

    /// Advance to the next board without finishing this one
    ///
    /// Returns false if a transition is already running.
    pub fn skip_level(&mut self) -> bool {
        match self.phase {
            Phase::Transitioning => false,
            Phase::Idle => {
                self.populate();
                true
            }
            Phase::Populated => {
                self.begin_transition();
                true
            }
        }
    }

    /// Store a new board geometry and re-pack the current level for it
    pub fn resize(&mut self, config: BoardConfig) {
        self.config = config;
        match self.phase {
            Phase::Idle => {}
            Phase::Populated => self.repack(),
            Phase::Transitioning => self.repack_pending = true,
        }
    }

    fn begin_transition(&mut self) {
        if self.is_transitioning() {
            return;
        }
        let Some(mut finished) = self.current.take() else {
            return;
        };
        for widget in &mut finished.widgets {
            widget.disable();
        }
        self.captures.clear();
        self.ctx.cue(Cue::LevelComplete);
        log::info!("Level {} complete", finished.number);

        let transition = Transition::new(self.config.pixel_size().y);
        let number = self.next_level_number();
        let mut next = self.build_level(number);
        next.offset_y = transition.incoming_start();

        self.outgoing = Some(finished);
        self.current = Some(next);
        self.transition = Some(transition);
        self.phase = Phase::Transitioning;
    }

    fn finish_transition(&mut self) {
        if let Some(mut old) = self.outgoing.take() {
            old.destroy();
        }
        if let Some(level) = self.current.as_mut() {
            level.offset_y = 0.0;
        }
        self.transition = None;
        self.phase = Phase::Populated;
        log::debug!("Transition finished");

        if std::mem::take(&mut self.repack_pending) {
            self.repack();
        }
    }

    /// Completion listener: advance once every widget is done
    fn on_completion(&mut self) {
        if self.ctx.zen_mode() || self.phase != Phase::Populated {
            return;
        }
        let Some(level) = self.current.as_ref() else {
            return;
        };
        log::debug!(
            "Level {}: {}/{} complete",
            level.number,
            level.completed_count(),
            level.widgets.len()
        );
        if level.all_completed() {
            self.begin_transition();
        }
    }

    fn handle(&mut self, outcome: Outcome) -> Outcome {
        if outcome.is_completed() {
            self.on_completion();
        }
        outcome
    }

    /// Pointer pressed at a board-relative position
    pub fn pointer_down(&mut self, id: i32, board_pos: Vec2, time_ms: f64) -> Outcome {
        if self.phase != Phase::Populated {
            return Outcome::Ignored;
        }
        let id = PointerId(id);
        if self.captures.contains_key(&id) {
            return Outcome::Ignored;
        }
        let Some(level) = self.current.as_mut() else {
            return Outcome::Ignored;
        };
        let Some(index) = level.widgets.iter().position(|w| w.contains(board_pos)) else {
            return Outcome::Ignored;
        };

        let widget = &mut level.widgets[index];
        let input = PointerInput {
            id,
            pos: board_pos - widget.position(),
            time_ms,
        };
        let outcome = widget.pointer_down(&input);
        if outcome.is_accepted() {
            self.captures.insert(id, index);
        }
        self.handle(outcome)
    }

    /// Route a captured pointer sample; `release` drops the capture
    fn route(
        &mut self,
        id: i32,
        board_pos: Vec2,
        time_ms: f64,
        release: bool,
        send: impl FnOnce(&mut Box<dyn Widget>, &PointerInput) -> Outcome,
    ) -> Outcome {
        let id = PointerId(id);
        let index = if release {
            self.captures.remove(&id)
        } else {
            self.captures.get(&id).copied()
        };
        let Some(index) = index else {
            return Outcome::Ignored;
        };
        let Some(widget) = self
            .current
            .as_mut()
            .and_then(|level| level.widgets.get_mut(index))
        else {
            return Outcome::Ignored;
        };

        let input = PointerInput {
            id,
            pos: board_pos - widget.position(),
            time_ms,
        };
        let outcome = send(widget, &input);
        self.handle(outcome)
    }

    pub fn pointer_move(&mut self, id: i32, board_pos: Vec2, time_ms: f64) -> Outcome {
        self.route(id, board_pos, time_ms, false, |w, input| w.pointer_move(input))
    }

    pub fn pointer_up(&mut self, id: i32, board_pos: Vec2, time_ms: f64) -> Outcome {
        self.route(id, board_pos, time_ms, true, |w, input| w.pointer_up(input))
    }

    pub fn pointer_cancel(&mut self, id: i32, board_pos: Vec2, time_ms: f64) -> Outcome {
        self.route(id, board_pos, time_ms, true, |w, input| w.pointer_cancel(input))
    }

    /// Frame driver
    pub fn tick(&mut self, now_ms: f64) {
        let mut completed = false;
        for level in [self.current.as_mut(), self.outgoing.as_mut()]
            .into_iter()
            .flatten()
        {
            for widget in level.widgets.iter_mut().filter(|w| w.is_simulating()) {
                completed |= widget.tick(now_ms).is_completed();
            }
        }
        if completed {
            self.on_completion();
        }

        let Some(transition) = self.transition.as_mut() else {
            return;
        };
        let frame = transition.sample(now_ms);
        if let Some(level) = self.outgoing.as_mut() {
            level.offset_y = frame.outgoing_offset;
        }
        if let Some(level) = self.current.as_mut() {
            level.offset_y = frame.incoming_offset;
        }
        if frame.finished {
            self.finish_transition();
        }
    }

    /// Snapshots of every widget on screen, paired with its board's slide
    /// offset. Outgoing board first.
    pub fn views(&self) -> Vec<(f32, WidgetView)> {
        [self.outgoing.as_ref(), self.current.as_ref()]
            .into_iter()
            .flatten()
            .flat_map(|level| {
                level
                    .widgets
                    .iter()
                    .map(move |w| (level.offset_y, w.view()))
            })
            .collect()
    }

    /// Slide offsets of the outgoing and current boards
    pub fn board_offsets(&self) -> (Option<f32>, Option<f32>) {
        (
            self.outgoing.as_ref().map(|level| level.offset_y),
            self.current.as_ref().map(|level| level.offset_y),
        )
    }
}
