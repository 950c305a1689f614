//! Note Slicer entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        AddEventListenerOptions, Document, HtmlCanvasElement, HtmlElement, KeyboardEvent,
        MouseEvent, TouchEvent,
    };

    use note_slicer::audio::{AudioManager, SoundEffect};
    use note_slicer::hud::Hud;
    use note_slicer::renderer::{RenderState, scene};
    use note_slicer::sim::{GameEvent, GameState, tick};
    use note_slicer::settings::VOLUME_STEP;
    use note_slicer::{Settings, Tuning};

    const CANVAS_ID: &str = "gameCanvas";

    /// Game instance holding all state
    struct Game {
        state: GameState,
        settings: Settings,
        audio: AudioManager,
        render_state: Option<RenderState>,
        last_time: f64,
        /// Last HUD pushed to the DOM, to skip redundant writes
        last_hud: Option<Hud>,
    }

    impl Game {
        fn new(seed: u64, surface: Vec2) -> Self {
            let settings = Settings::default();
            let mut tuning = Tuning::default();
            tuning.max_particles = settings.max_particles();

            let mut audio = AudioManager::new();
            audio.set_master_volume(settings.master_volume);

            Self {
                state: GameState::with_tuning(seed, surface, tuning),
                settings,
                audio,
                render_state: None,
                last_time: 0.0,
                last_hud: None,
            }
        }

        /// Advance the simulation and voice whatever it reported
        fn update(&mut self, elapsed_ms: f64) {
            tick(&mut self.state, elapsed_ms);

            for event in self.state.drain_events() {
                if let GameEvent::GameOver { score, best_combo } = event {
                    log::info!("Game over: {} points, best combo {}", score, best_combo);
                }
                if let Some(effect) = SoundEffect::for_event(&event) {
                    self.audio.play(effect);
                }
            }
            self.sync_audio();
        }

        /// Render the current frame
        fn render(&mut self) {
            let Some(render_state) = self.render_state.as_mut() else {
                return;
            };
            let vertices = scene::build(&self.state, &self.settings);
            match render_state.render(&vertices) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost) => {
                    let (w, h) = render_state.size;
                    let logical = render_state.logical_size;
                    render_state.resize(w, h, logical);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }

        /// Copy HUD text and overlay visibility into the DOM
        fn update_hud(&mut self) {
            let hud = Hud::from_state(&self.state);
            if self.last_hud.as_ref() == Some(&hud) {
                return;
            }
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            set_text(&document, "score", &hud.score);
            set_text(&document, "combo", &hud.combo);
            set_text(&document, "lives", &hud.lives);
            if let Some(final_score) = &hud.final_score {
                set_text(&document, "finalScore", final_score);
            }
            if let Some(best_combo) = &hud.best_combo {
                set_text(&document, "bestCombo", best_combo);
            }

            let overlay = hud.overlay;
            set_display(&document, "overlay", overlay.backdrop.then_some("flex"));
            set_display(&document, "menu", overlay.menu.then_some("block"));
            set_display(&document, "how", overlay.how_to_play.then_some("block"));
            set_display(&document, "gameOver", overlay.game_over.then_some("block"));

            self.last_hud = Some(hud);
        }

        /// Start or restart a run from a button press
        fn start(&mut self) {
            self.audio.resume();
            self.sync_audio();
            self.state.tuning.max_particles = self.settings.max_particles();
            self.state.start();
        }

        /// Mirror a failed audio context into the settings and mute button
        fn sync_audio(&mut self) {
            if !self.audio.is_available() && self.settings.audio_available {
                self.settings.mark_audio_unavailable();
                self.audio.set_muted(true);
                self.refresh_mute_label();
            }
        }

        fn refresh_mute_label(&self) {
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                set_text(&document, "muteBtn", self.settings.mute_label());
            }
        }

        fn toggle_mute(&mut self) {
            let muted = self.settings.toggle_mute();
            self.audio.set_muted(muted);
            self.refresh_mute_label();
        }

        fn adjust_volume(&mut self, delta: f32) {
            let volume = self.settings.adjust_volume(delta);
            self.audio.set_master_volume(volume);
        }

        fn toggle_trails(&mut self) {
            let on = self.settings.toggle_trails();
            log::info!("Swipe trail {}", if on { "on" } else { "off" });
        }

        /// Sparks off also empties the particle budget for new bursts
        fn toggle_particles(&mut self) {
            let on = self.settings.toggle_particles();
            self.state.tuning.max_particles = self.settings.max_particles();
            if !on {
                self.state.particles.clear();
            }
            log::info!("Particles {}", if on { "on" } else { "off" });
        }

        /// Lower or raise detail; the new particle cap applies immediately
        fn cycle_quality(&mut self) {
            self.settings.cycle_quality();
            self.state.tuning.max_particles = self.settings.max_particles();
        }

        /// Match the backbuffer to the canvas' CSS size
        fn resize(&mut self, canvas: &HtmlCanvasElement, dpr: f64) {
            let (client_w, client_h) = (canvas.client_width(), canvas.client_height());
            let width = ((client_w as f64 * dpr) as u32).max(1);
            let height = ((client_h as f64 * dpr) as u32).max(1);
            canvas.set_width(width);
            canvas.set_height(height);

            self.state.resize(client_w as f32, client_h as f32);
            let logical = (self.state.surface.x, self.state.surface.y);
            if let Some(render_state) = self.render_state.as_mut() {
                render_state.resize(width, height, logical);
            }
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    /// Show an element with the given CSS display value, or hide it
    fn set_display(document: &Document, id: &str, display: Option<&str>) {
        let Some(el) = document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        else {
            return;
        };
        let _ = el
            .style()
            .set_property("display", display.unwrap_or("none"));
    }

    /// Pointer position relative to the canvas' top-left corner
    fn canvas_point(canvas: &HtmlCanvasElement, client_x: i32, client_y: i32) -> Vec2 {
        let rect = canvas.get_bounding_client_rect();
        Vec2::new(
            client_x as f32 - rect.left() as f32,
            client_y as f32 - rect.top() as f32,
        )
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Note Slicer starting...");

        let Some(window) = web_sys::window() else {
            log::error!("No window");
            return;
        };
        let Some(document) = window.document() else {
            log::error!("No document");
            return;
        };
        let Some(canvas) = document
            .get_element_by_id(CANVAS_ID)
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No #{} canvas found", CANVAS_ID);
            return;
        };

        // Initialize game
        let seed = js_sys::Date::now() as u64;
        let surface = Vec2::new(canvas.client_width() as f32, canvas.client_height() as f32);
        let game = Rc::new(RefCell::new(Game::new(seed, surface)));
        let dpr = window.device_pixel_ratio();
        game.borrow_mut().resize(&canvas, dpr);
        log::info!("Game initialized with seed: {}", seed);

        // Input and HUD work without a GPU, so wire them up first
        setup_input_handlers(&canvas, game.clone());
        setup_buttons(&document, game.clone());
        setup_keyboard(&window, game.clone());
        setup_resize(&window, &canvas, game.clone());
        setup_audio_unlock(&document, game.clone());
        game.borrow_mut().update_hud();

        // Initialize WebGPU, falling back to WebGL2
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        match init_renderer(&instance, &canvas, &game).await {
            Ok(render_state) => game.borrow_mut().render_state = Some(render_state),
            Err(e) => log::error!("Renderer unavailable, running without graphics: {}", e),
        }

        // Start game loop
        request_animation_frame(game);

        log::info!("Note Slicer running!");
    }

    async fn init_renderer(
        instance: &wgpu::Instance,
        canvas: &HtmlCanvasElement,
        game: &Rc<RefCell<Game>>,
    ) -> Result<RenderState, String> {
        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| format!("surface: {e}"))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| format!("adapter: {e}"))?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let (width, height) = (canvas.width(), canvas.height());
        let logical = {
            let g = game.borrow();
            (g.state.surface.x, g.state.surface.y)
        };
        RenderState::new(surface, &adapter, width, height, logical)
            .await
            .map_err(|e| e.to_string())
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Mouse down on the canvas starts a swipe
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let pos = canvas_point(&canvas_clone, event.client_x(), event.client_y());
                game.borrow_mut().state.pointer_down(pos);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Move and release are tracked on the window so swipes may leave the canvas
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                if g.state.trail.is_empty() {
                    return;
                }
                let pos = canvas_point(&canvas_clone, event.client_x(), event.client_y());
                g.state.pointer_move(pos);
            });
            let _ = window
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().state.pointer_up();
            });
            let _ = window
                .add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch handlers must be non-passive to suppress scrolling
        let options = AddEventListenerOptions::new();
        options.set_passive(false);

        // Touch start
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let pos = canvas_point(&canvas_clone, touch.client_x(), touch.client_y());
                    game.borrow_mut().state.pointer_down(pos);
                }
            });
            let _ = canvas.add_event_listener_with_callback_and_add_event_listener_options(
                "touchstart",
                closure.as_ref().unchecked_ref(),
                &options,
            );
            closure.forget();
        }

        // Touch move
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let pos = canvas_point(&canvas_clone, touch.client_x(), touch.client_y());
                    game.borrow_mut().state.pointer_move(pos);
                }
            });
            let _ = canvas.add_event_listener_with_callback_and_add_event_listener_options(
                "touchmove",
                closure.as_ref().unchecked_ref(),
                &options,
            );
            closure.forget();
        }

        // Touch end
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                game.borrow_mut().state.pointer_up();
            });
            let _ = canvas.add_event_listener_with_callback_and_add_event_listener_options(
                "touchend",
                closure.as_ref().unchecked_ref(),
                &options,
            );
            closure.forget();
        }
    }

    /// Attach a click handler to a button by id, if the page has it
    fn on_click(document: &Document, id: &str, mut handler: impl FnMut() + 'static) {
        let Some(btn) = document.get_element_by_id(id) else {
            log::warn!("Button #{} not found", id);
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| handler());
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        {
            let game = game.clone();
            on_click(document, "startBtn", move || game.borrow_mut().start());
        }
        {
            let game = game.clone();
            on_click(document, "restartBtn", move || game.borrow_mut().start());
        }
        {
            let game = game.clone();
            on_click(document, "howBtn", move || game.borrow_mut().state.show_how_to_play());
        }
        {
            let game = game.clone();
            on_click(document, "backBtn", move || game.borrow_mut().state.back_to_menu());
        }
        {
            let game = game.clone();
            on_click(document, "muteBtn", move || game.borrow_mut().toggle_mute());
        }
        on_click(document, "fullscreenBtn", toggle_fullscreen);
    }

    fn setup_keyboard(window: &web_sys::Window, game: Rc<RefCell<Game>>) {
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            match event.key().as_str() {
                "m" | "M" => game.borrow_mut().toggle_mute(),
                "f" | "F" => toggle_fullscreen(),
                "q" | "Q" => game.borrow_mut().cycle_quality(),
                "t" | "T" => game.borrow_mut().toggle_trails(),
                "p" | "P" => game.borrow_mut().toggle_particles(),
                "+" | "=" => game.borrow_mut().adjust_volume(VOLUME_STEP),
                "-" | "_" => game.borrow_mut().adjust_volume(-VOLUME_STEP),
                _ => {}
            }
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_resize(window: &web_sys::Window, canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let canvas = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let dpr = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio());
            game.borrow_mut().resize(&canvas, dpr);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Mobile browsers only allow audio after a gesture
    fn setup_audio_unlock(document: &Document, game: Rc<RefCell<Game>>) {
        let options = AddEventListenerOptions::new();
        options.set_once(true);
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let mut g = game.borrow_mut();
            g.audio.resume();
            g.sync_audio();
        });
        let _ = document.add_event_listener_with_callback_and_add_event_listener_options(
            "touchstart",
            closure.as_ref().unchecked_ref(),
            &options,
        );
        closure.forget();
    }

    fn toggle_fullscreen() {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        if document.fullscreen_element().is_some() {
            document.exit_fullscreen();
        } else if let Some(root) = document.document_element() {
            if let Err(e) = root.request_fullscreen() {
                log::warn!("Fullscreen request failed: {:?}", e);
            }
        }
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
            let mut g = game.borrow_mut();

            let elapsed_ms = if g.last_time > 0.0 {
                time - g.last_time
            } else {
                f64::from(g.state.tuning.frame_ms)
            };
            g.last_time = time;

            g.update(elapsed_ms);
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Note Slicer (native) starting...");
    log::info!("Native mode is headless - serve the wasm build for the playable version");

    let tuning = match std::env::var("NOTE_SLICER_TUNING") {
        Ok(json) => note_slicer::Tuning::from_json_or_default(&json),
        Err(_) => note_slicer::Tuning::default(),
    };
    demo_session(tuning);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Play one scripted run: every few frames, swipe across the lowest live note
#[cfg(not(target_arch = "wasm32"))]
fn demo_session(tuning: note_slicer::Tuning) {
    use glam::Vec2;
    use note_slicer::sim::{GameEvent, GamePhase, GameState, tick};

    const SEED: u64 = 2024;
    const MAX_FRAMES: u32 = 60 * 120;
    const SWIPE_EVERY: u32 = 9;

    let frame_ms = f64::from(tuning.frame_ms);
    let mut state = GameState::with_tuning(SEED, Vec2::new(480.0, 800.0), tuning);
    state.start();

    let mut slices = 0u32;
    let mut misses = 0u32;
    let mut frame = 0;
    while frame < MAX_FRAMES && state.phase == GamePhase::Playing {
        tick(&mut state, frame_ms);

        if frame % SWIPE_EVERY == 0 {
            let target = state
                .notes
                .iter()
                .filter(|n| !n.is_sliced())
                .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
                .map(|n| (n.pos, n.size));
            if let Some((pos, size)) = target {
                let reach = Vec2::new(size * 2.0, size * 0.5);
                state.pointer_down(pos - reach);
                state.pointer_move(pos);
                state.pointer_move(pos + reach);
                state.pointer_up();
            }
        }

        for event in state.drain_events() {
            match event {
                GameEvent::Sliced { .. } => slices += 1,
                GameEvent::Missed { lives, .. } => {
                    misses += 1;
                    log::debug!("Missed a note, {} lives left", lives);
                }
                GameEvent::GameOver { .. } => {}
            }
        }
        frame += 1;
    }

    println!(
        "Seed {}: {} frames, score {}, best combo {}, {} slices, {} misses, lives {} ({:?})",
        SEED, frame, state.score, state.best_combo, slices, misses, state.lives, state.phase
    );
}
