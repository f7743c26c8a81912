//! DOM visual surface
//!
//! One absolutely positioned element tree per widget inside a board element.
//! Trees are rebuilt when the set of widgets changes (new level, resize);
//! every frame only the dynamic bits (classes, transforms, fills) are
//! written from the widgets' `WidgetView` snapshots.

use std::f32::consts::TAU;

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement};

use crate::board::{BoardConfig, Orientation, Variant};
use crate::widget::audio_slider::GRILLE_PADDING;
use crate::widget::slider::{HANDLE_SIZE, TRACK_PADDING};
use crate::widget::{ViewState, WidgetView};

/// Base stylesheet (soft "neumorphic" look)
const STYLES: &str = r#"
:root { --bg-color: #e0e5ec; --shadow-dark: #a3b1c6; --shadow-light: #ffffff; --border-width: 2px; }
body { margin: 0; overflow: hidden; background: var(--bg-color); touch-action: none; user-select: none; }
.tt-board { position: absolute; }
.tt-widget { position: absolute; box-sizing: border-box; border-radius: 16px; background: var(--bg-color);
  box-shadow: 6px 6px 12px var(--shadow-dark), -6px -6px 12px var(--shadow-light); overflow: hidden; }
.tt-widget.completed { box-shadow: inset 4px 4px 8px var(--shadow-dark), inset -4px -4px 8px var(--shadow-light); }
.tt-button { border: var(--border-width) solid var(--component-color); }
.tt-button.pressed { box-shadow: inset 4px 4px 8px var(--shadow-dark), inset -4px -4px 8px var(--shadow-light); }
.tt-button.completed { background: var(--component-color); }
.tt-track { position: absolute; border-radius: 12px; box-shadow: inset 3px 3px 6px var(--shadow-dark), inset -3px -3px 6px var(--shadow-light); }
.tt-fill { position: absolute; border-radius: 12px; background: var(--component-color); opacity: 0.6; }
.tt-handle { position: absolute; border-radius: 12px; background: var(--bg-color);
  border: var(--border-width) solid var(--component-color); box-sizing: border-box;
  box-shadow: 3px 3px 6px var(--shadow-dark), -3px -3px 6px var(--shadow-light); }
.tt-grille { position: absolute; display: flex; justify-content: space-between; align-items: stretch; }
.tt-bar { flex: 0 0 10px; border-radius: 5px; background: var(--shadow-dark); opacity: 0.35; }
.tt-bar.lit { background: var(--component-color); opacity: 1; }
.tt-knob-body, .tt-round { position: absolute; left: 50%; top: 50%; border-radius: 50%; transform: translate(-50%, -50%);
  background: var(--bg-color); box-shadow: 6px 6px 12px var(--shadow-dark), -6px -6px 12px var(--shadow-light);
  border: var(--border-width) solid var(--component-color); box-sizing: border-box; }
.tt-knob-pointer { position: absolute; width: 12px; height: 12px; border-radius: 50%; background: var(--component-color); transform: translate(-50%, -50%); }
.tt-blades { position: absolute; inset: 0; }
.tt-blade { position: absolute; width: 22%; height: 22%; border-radius: 50%; transform: translate(-50%, -50%);
  border: var(--border-width) solid var(--component-color); box-sizing: border-box; background: var(--bg-color); }
.tt-rpm { position: absolute; left: 8px; bottom: 6px; font: 10px sans-serif; color: #888; pointer-events: none; }
.tt-ring { position: absolute; left: 7.5%; top: 7.5%; width: 85%; height: 85%; border-radius: 50%; }
.tt-round.pressed { box-shadow: inset 3px 3px 6px var(--shadow-dark), inset -3px -3px 6px var(--shadow-light); }
.tt-dot { position: absolute; width: 8%; height: 8%; border-radius: 50%; transform: translate(-50%, -50%);
  box-shadow: inset 2px 2px 4px var(--shadow-dark), inset -2px -2px 4px var(--shadow-light); }
.tt-dot.lit { background: var(--component-color); }
.tt-widget.pulse { animation: tt-pulse 0.3s ease-out; }
@keyframes tt-pulse { 50% { transform: scale(1.04); } }
#tt-status { position: fixed; right: 12px; bottom: 8px; font: 12px sans-serif; color: #888; }
"#;

/// Dot ring radius for the tap button (percent of the widget)
const TAP_DOT_RADIUS: f32 = 42.0;
/// Knob pointer distance from the body centre (percent of the body)
const KNOB_POINTER_RADIUS: f32 = 30.0;

/// Variant-specific elements updated every frame
enum Parts {
    Button,
    Slider {
        fill: HtmlElement,
        handle: HtmlElement,
    },
    AudioSlider {
        bars: Vec<HtmlElement>,
    },
    Knob {
        pointer: HtmlElement,
    },
    Spinner {
        blades: HtmlElement,
        rpm: HtmlElement,
    },
    RapidFire {
        ring: HtmlElement,
        button: HtmlElement,
    },
    Tap {
        dots: Vec<HtmlElement>,
        button: HtmlElement,
    },
}

struct WidgetNode {
    variant: Variant,
    position: Vec2,
    size: Vec2,
    root: HtmlElement,
    parts: Parts,
    pulses: u32,
}

impl WidgetNode {
    fn matches(&self, view: &WidgetView) -> bool {
        self.variant == view.variant && self.position == view.position && self.size == view.size
    }
}

pub struct Surface {
    document: Document,
    board: HtmlElement,
    status: HtmlElement,
    nodes: Vec<WidgetNode>,
    cell_size: f32,
}

fn div(document: &Document, class: &str, parent: &HtmlElement) -> Result<HtmlElement, JsValue> {
    let el: HtmlElement = document.create_element("div")?.dyn_into()?;
    el.set_class_name(class);
    parent.append_child(&el)?;
    Ok(el)
}

fn set_px(el: &HtmlElement, property: &str, value: f32) {
    let _ = el.style().set_property(property, &format!("{value:.1}px"));
}

fn set_pct(el: &HtmlElement, property: &str, value: f32) {
    let _ = el.style().set_property(property, &format!("{value:.2}%"));
}

fn set_class(el: &HtmlElement, class: &str, on: bool) {
    let _ = el.class_list().toggle_with_force(class, on);
}

impl Surface {
    /// Install the stylesheet and the board container
    pub fn new() -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let body = document.body().ok_or("no body")?;

        let style = document.create_element("style")?;
        style.set_text_content(Some(STYLES));
        body.append_child(&style)?;

        let parent: HtmlElement = match document.get_element_by_id("game-container") {
            Some(el) => el.dyn_into()?,
            None => body,
        };
        let board = div(&document, "tt-board", &parent)?;
        let status = div(&document, "", &parent)?;
        status.set_id("tt-status");

        Ok(Self {
            document,
            board,
            status,
            nodes: Vec::new(),
            cell_size: 0.0,
        })
    }

    /// Place the board and scale borders to the cell size
    fn layout(&mut self, config: &BoardConfig) {
        set_px(&self.board, "left", config.origin.x);
        set_px(&self.board, "top", config.origin.y);
        let size = config.pixel_size();
        set_px(&self.board, "width", size.x);
        set_px(&self.board, "height", size.y);

        if self.cell_size != config.cell_size {
            self.cell_size = config.cell_size;
            if let Some(root) = self
                .document
                .document_element()
                .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            {
                set_px(&root, "--border-width", config.border_width());
            }
        }
    }

    fn build_node(&self, view: &WidgetView) -> Result<WidgetNode, JsValue> {
        let doc = &self.document;
        let root = div(doc, &format!("tt-widget tt-{}", view.variant.as_str()), &self.board)?;
        root.style().set_property("--component-color", view.color)?;
        set_px(&root, "left", view.position.x);
        set_px(&root, "top", view.position.y);
        set_px(&root, "width", view.size.x);
        set_px(&root, "height", view.size.y);

        let parts = match view.state {
            ViewState::Button => {
                root.class_list().add_1("tt-button")?;
                Parts::Button
            }
            ViewState::Slider { orientation, .. } => {
                let track = div(doc, "tt-track", &root)?;
                set_px(&track, "left", TRACK_PADDING);
                set_px(&track, "top", TRACK_PADDING);
                set_px(&track, "right", TRACK_PADDING);
                set_px(&track, "bottom", TRACK_PADDING);
                let fill = div(doc, "tt-fill", &track)?;
                match orientation {
                    Orientation::Horizontal => {
                        set_px(&fill, "left", 0.0);
                        set_pct(&fill, "height", 100.0);
                    }
                    Orientation::Vertical => {
                        set_px(&fill, "bottom", 0.0);
                        set_pct(&fill, "width", 100.0);
                    }
                }
                let handle = div(doc, "tt-handle", &root)?;
                set_px(&handle, "width", HANDLE_SIZE);
                set_px(&handle, "height", HANDLE_SIZE);
                Parts::Slider { fill, handle }
            }
            ViewState::AudioSlider {
                orientation, bars, ..
            } => {
                let grille = div(doc, "tt-grille", &root)?;
                for side in ["left", "top", "right", "bottom"] {
                    set_px(&grille, side, GRILLE_PADDING);
                }
                // Vertical grilles light from the bottom up
                let direction = match orientation {
                    Orientation::Horizontal => "row",
                    Orientation::Vertical => "column-reverse",
                };
                grille.style().set_property("flex-direction", direction)?;
                let bars = (0..bars)
                    .map(|_| div(doc, "tt-bar", &grille))
                    .collect::<Result<Vec<_>, _>>()?;
                Parts::AudioSlider { bars }
            }
            ViewState::Knob { .. } => {
                let body = div(doc, "tt-knob-body", &root)?;
                set_pct(&body, "width", 65.0);
                set_pct(&body, "height", 65.0);
                let pointer = div(doc, "tt-knob-pointer", &body)?;
                Parts::Knob { pointer }
            }
            ViewState::Spinner { .. } => {
                let blades = div(doc, "tt-blades", &root)?;
                for i in 0..3 {
                    let angle = i as f32 * TAU / 3.0;
                    let blade = div(doc, "tt-blade", &blades)?;
                    set_pct(&blade, "left", 50.0 + angle.cos() * 36.0);
                    set_pct(&blade, "top", 50.0 + angle.sin() * 36.0);
                }
                let hub = div(doc, "tt-round", &root)?;
                set_pct(&hub, "width", 16.0);
                set_pct(&hub, "height", 16.0);
                let rpm = div(doc, "tt-rpm", &root)?;
                Parts::Spinner { blades, rpm }
            }
            ViewState::RapidFire { .. } => {
                let ring = div(doc, "tt-ring", &root)?;
                let button = div(doc, "tt-round", &root)?;
                set_pct(&button, "width", 55.0);
                set_pct(&button, "height", 55.0);
                Parts::RapidFire { ring, button }
            }
            ViewState::Tap { total, .. } => {
                let dots = (0..total)
                    .map(|i| -> Result<HtmlElement, JsValue> {
                        let angle = i as f32 / total as f32 * TAU - TAU / 4.0;
                        let dot = div(doc, "tt-dot", &root)?;
                        set_pct(&dot, "left", 50.0 + angle.cos() * TAP_DOT_RADIUS);
                        set_pct(&dot, "top", 50.0 + angle.sin() * TAP_DOT_RADIUS);
                        Ok(dot)
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                let button = div(doc, "tt-round", &root)?;
                set_pct(&button, "width", 45.0);
                set_pct(&button, "height", 45.0);
                Parts::Tap { dots, button }
            }
        };

        Ok(WidgetNode {
            variant: view.variant,
            position: view.position,
            size: view.size,
            root,
            parts,
            pulses: view.pulses,
        })
    }

    fn rebuild(&mut self, views: &[(f32, WidgetView)]) -> Result<(), JsValue> {
        self.board.set_inner_html("");
        self.nodes = views
            .iter()
            .map(|(_, view)| self.build_node(view))
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!("Surface rebuilt with {} widgets", self.nodes.len());
        Ok(())
    }

    /// Draw one frame
    pub fn render(&mut self, config: &BoardConfig, views: &[(f32, WidgetView)]) {
        self.layout(config);

        let stale = self.nodes.len() != views.len()
            || self.nodes.iter().zip(views).any(|(node, (_, view))| !node.matches(view));
        if stale {
            if let Err(e) = self.rebuild(views) {
                log::warn!("Failed to build widget elements: {:?}", e);
                return;
            }
        }

        for (node, (offset, view)) in self.nodes.iter_mut().zip(views) {
            update_node(node, *offset, view);
        }
    }

    pub fn set_status(&self, text: &str) {
        if self.status.text_content().as_deref() != Some(text) {
            self.status.set_text_content(Some(text));
        }
    }
}

fn update_node(node: &mut WidgetNode, offset: f32, view: &WidgetView) {
    let root = &node.root;
    let _ = root
        .style()
        .set_property("transform", &format!("translateY({offset:.1}px)"));
    set_class(root, "completed", view.completed);
    set_class(root, "pressed", view.pressed);

    // Restart the pulse animation on each new completion pulse
    if view.pulses != node.pulses {
        node.pulses = view.pulses;
        set_class(root, "pulse", false);
        let _ = root.offset_width();
        set_class(root, "pulse", true);
    }

    match (&node.parts, view.state) {
        (Parts::Button, _) => {}
        (
            Parts::Slider { fill, handle },
            ViewState::Slider {
                orientation,
                handle_offset,
                fill_length,
                ..
            },
        ) => match orientation {
            Orientation::Horizontal => {
                set_px(handle, "left", TRACK_PADDING + handle_offset);
                set_px(handle, "top", view.size.y / 2.0 - HANDLE_SIZE / 2.0);
                set_px(fill, "width", fill_length);
            }
            Orientation::Vertical => {
                set_px(handle, "top", TRACK_PADDING + handle_offset);
                set_px(handle, "left", view.size.x / 2.0 - HANDLE_SIZE / 2.0);
                set_px(fill, "height", fill_length);
            }
        },
        (Parts::AudioSlider { bars }, ViewState::AudioSlider { lit, .. }) => {
            for (i, bar) in bars.iter().enumerate() {
                set_class(bar, "lit", (i as u32) < lit);
            }
        }
        (Parts::Knob { pointer }, ViewState::Knob { pointer_angle, .. }) => {
            set_pct(pointer, "left", 50.0 + pointer_angle.cos() * KNOB_POINTER_RADIUS);
            set_pct(pointer, "top", 50.0 + pointer_angle.sin() * KNOB_POINTER_RADIUS);
        }
        (Parts::Spinner { blades, rpm }, ViewState::Spinner { angle, rpm: value }) => {
            let _ = blades
                .style()
                .set_property("transform", &format!("rotate({angle:.4}rad)"));
            let text = format!("{value} RPM");
            if rpm.text_content().as_deref() != Some(text.as_str()) {
                rpm.set_text_content(Some(&text));
            }
        }
        (Parts::RapidFire { ring, button }, ViewState::RapidFire { progress }) => {
            let degrees = progress.clamp(0.0, 1.0) * 360.0;
            let _ = ring.style().set_property(
                "background",
                &format!(
                    "conic-gradient(var(--component-color) {degrees:.1}deg, rgba(163,177,198,0.3) 0)"
                ),
            );
            set_class(button, "pressed", view.pressed);
        }
        (Parts::Tap { dots, button }, ViewState::Tap { lit, .. }) => {
            for (i, dot) in dots.iter().enumerate() {
                set_class(dot, "lit", (i as u32) < lit);
            }
            set_class(button, "pressed", view.pressed);
        }
        _ => log::warn!("View state does not match element for {:?}", node.variant),
    }
}
