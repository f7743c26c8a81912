//! Instant-trigger button: completes on the first press

use std::rc::Rc;

use glam::Vec2;

use super::{Outcome, PointerId, PointerInput, ViewState, Widget, WidgetCore, WidgetView};
use crate::board::Variant;
use crate::feedback::{Context, Cue};

pub struct Button {
    core: WidgetCore,
    pointer: Option<PointerId>,
}

impl Button {
    pub fn new(size: Vec2, color: &'static str, ctx: &Rc<Context>) -> Self {
        Self {
            core: WidgetCore::new(size, color, ctx),
            pointer: None,
        }
    }
}

impl Widget for Button {
    fn variant(&self) -> Variant {
        Variant::Button
    }

    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }

    fn pointer_down(&mut self, input: &PointerInput) -> Outcome {
        if !self.core.accepts_input() {
            return Outcome::Ignored;
        }
        self.pointer = Some(input.id);
        self.core.cue(Cue::Click);
        self.core.complete().merge(Outcome::Handled)
    }

    fn pointer_up(&mut self, input: &PointerInput) -> Outcome {
        if self.pointer != Some(input.id) {
            return Outcome::Ignored;
        }
        self.pointer = None;
        Outcome::Handled
    }

    fn view(&self) -> WidgetView {
        WidgetView {
            variant: Variant::Button,
            position: self.core.position,
            size: self.core.size,
            color: self.core.color,
            completed: self.core.is_completed(),
            // Stays pushed in once completed
            pressed: self.pointer.is_some() || self.core.is_completed(),
            pulses: self.core.pulses(),
            state: ViewState::Button,
        }
    }
}
