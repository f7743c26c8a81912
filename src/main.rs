//! Tap Toys entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{KeyboardEvent, PointerEvent};

    use tap_toys::audio::AudioFeedback;
    use tap_toys::consts::RESIZE_DEBOUNCE_MS;
    use tap_toys::feedback::Context;
    use tap_toys::platform::input::PointerPhase;
    use tap_toys::platform::{PointerSample, Surface, viewport_size};
    use tap_toys::widget::Outcome;
    use tap_toys::{BoardConfig, LevelCoordinator, Settings};

    /// Game instance holding all state
    struct Game {
        coordinator: LevelCoordinator,
        surface: Surface,
        ctx: Rc<Context>,
        /// Pending debounced resize
        resize_timer: Option<i32>,
        /// Last status line written, to skip redundant DOM writes
        status: String,
    }

    impl Game {
        fn current_config() -> BoardConfig {
            let viewport = viewport_size();
            BoardConfig::fit(viewport.x, viewport.y)
        }

        fn handle_pointer(&mut self, phase: PointerPhase, event: &PointerEvent) -> Outcome {
            let sample = PointerSample::from_event(event, self.coordinator.config());
            let (id, pos, time) = (sample.id, sample.board_pos, sample.time_ms);
            match phase {
                PointerPhase::Down => self.coordinator.pointer_down(id, pos, time),
                PointerPhase::Move => self.coordinator.pointer_move(id, pos, time),
                PointerPhase::Up => self.coordinator.pointer_up(id, pos, time),
                PointerPhase::Cancel => self.coordinator.pointer_cancel(id, pos, time),
            }
        }

        fn toggle_zen(&mut self) {
            self.ctx.set_zen_mode(!self.ctx.zen_mode());
            self.ctx.settings().save();
        }

        fn cycle_volume(&mut self) {
            self.ctx.set_volume(self.ctx.volume().cycle());
            self.ctx.settings().save();
        }

        fn update_status(&mut self) {
            let settings = self.ctx.settings();
            let mut text = format!("Level {}", self.coordinator.level_number());
            if settings.zen_mode {
                text.push_str(" · Zen");
            }
            text.push_str(" · Volume ");
            text.push_str(settings.volume.as_str());

            if text != self.status {
                self.surface.set_status(&text);
                self.status = text;
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialised".into());
        }

        log::info!("Tap Toys starting...");

        let surface = match Surface::new() {
            Ok(surface) => surface,
            Err(err) => {
                log::error!("Failed to build the game surface: {:?}", err);
                return;
            }
        };

        let settings = Settings::load();
        let ctx = Context::new(Rc::new(AudioFeedback::new()), settings);

        let seed = js_sys::Date::now() as u64;
        let mut coordinator = LevelCoordinator::new(ctx.clone(), Game::current_config(), seed);
        coordinator.populate();
        log::info!("Game initialized with seed: {}", seed);

        let game = Rc::new(RefCell::new(Game {
            coordinator,
            surface,
            ctx,
            resize_timer: None,
            status: String::new(),
        }));

        setup_pointer_handlers(game.clone());
        setup_keyboard(game.clone());
        setup_resize(game.clone());

        request_animation_frame(game);

        log::info!("Tap Toys running!");
    }

    fn setup_pointer_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        for phase in PointerPhase::ALL {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let outcome = game.borrow_mut().handle_pointer(phase, &event);
                // Keep the browser from turning a widget drag into a scroll or text selection
                if phase == PointerPhase::Down && outcome != Outcome::Ignored {
                    event.prevent_default();
                }
            });
            let _ = window
                .add_event_listener_with_callback(phase.event_name(), closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            if event.repeat() {
                return;
            }
            let mut g = game.borrow_mut();
            match event.key().as_str() {
                "z" | "Z" => g.toggle_zen(),
                "m" | "M" => g.cycle_volume(),
                // Debug: skip to the next board
                "n" | "N" | "+" | "=" => {
                    g.coordinator.skip_level();
                }
                _ => {}
            }
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_resize(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(window) = web_sys::window() else {
                return;
            };
            if let Some(pending) = game.borrow_mut().resize_timer.take() {
                window.clear_timeout_with_handle(pending);
            }

            let target = game.clone();
            let settle = Closure::once(move || {
                let mut g = target.borrow_mut();
                g.resize_timer = None;
                g.coordinator.resize(Game::current_config());
            });
            let handle = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                settle.as_ref().unchecked_ref(),
                RESIZE_DEBOUNCE_MS,
            );
            settle.forget();

            match handle {
                Ok(handle) => game.borrow_mut().resize_timer = Some(handle),
                Err(err) => log::warn!("Failed to schedule resize: {:?}", err),
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut guard = game.borrow_mut();
            let g = &mut *guard;

            g.coordinator.tick(time);
            let views = g.coordinator.views();
            let config = *g.coordinator.config();
            g.surface.render(&config, &views);
            g.update_status();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Tap Toys (native) starting...");
    log::info!("The playable game is the web build - run with `trunk serve`");

    // Optional seed argument makes the demo reproducible
    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse::<u64>().ok())
        .unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0)
        });

    println!("\nPacking three boards from seed {seed}...");
    packing_demo(seed, 3);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Print successive packed boards and the widget mix on each
#[cfg(not(target_arch = "wasm32"))]
fn packing_demo(seed: u64, boards: u32) {
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use tap_toys::board::{describe, pack, render_ascii};
    use tap_toys::consts::{GRID_COLS, GRID_ROWS};

    let mut rng = Pcg32::seed_from_u64(seed);
    for level in 1..=boards {
        let board = pack(GRID_COLS, GRID_ROWS, &mut rng);
        let descriptors = describe(&board, &mut rng);

        println!("\nLevel {level}: {} widgets", descriptors.len());
        println!("{}", render_ascii(GRID_COLS, GRID_ROWS, &descriptors));
        for d in &descriptors {
            println!(
                "  {} {:<18} at ({}, {}) {}x{}",
                d.variant.glyph(),
                d.variant.as_str(),
                d.footprint.x,
                d.footprint.y,
                d.footprint.width,
                d.footprint.height
            );
        }
    }
}
