//! Flappy Web entry point
//!
//! On the web: binds a session to requestAnimationFrame, keyboard, pointer
//! and visibility events, and mirrors its snapshot into the page.
//! Natively: plays one headless attempt with a simple autopilot.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::fmt::Write as _;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlElement, KeyboardEvent, PointerEvent};

    use flappy_web::audio::AudioManager;
    use flappy_web::session::Snapshot;
    use flappy_web::sim::{FrameHandle, FrameScheduler};
    use flappy_web::{
        InputEvent, LocalScoreStore, PlayerId, Session, SessionConfig, Settings, UiPhase,
    };

    /// Frames from requestAnimationFrame; cancelled with cancelAnimationFrame
    struct RafScheduler {
        callback: Option<js_sys::Function>,
    }

    impl FrameScheduler for RafScheduler {
        fn request_frame(&mut self) -> FrameHandle {
            let id = match (web_sys::window(), &self.callback) {
                (Some(window), Some(callback)) => {
                    window.request_animation_frame(callback).unwrap_or(0)
                }
                _ => 0,
            };
            FrameHandle(id)
        }

        fn cancel_frame(&mut self, handle: FrameHandle) {
            if let Some(window) = web_sys::window() {
                let _ = window.cancel_animation_frame(handle.0);
            }
        }
    }

    type Game = Session<RafScheduler, LocalScoreStore, AudioManager>;

    /// Same clock as the animation-frame timestamps
    fn now() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or(0.0)
    }

    fn viewport() -> (f32, f32) {
        let window = web_sys::window().unwrap();
        let w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(400.0);
        let h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(600.0);
        (w as f32, h as f32)
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Flappy Web starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let settings = Settings::load();
        let player = document
            .body()
            .and_then(|b| b.get_attribute("data-player-id"))
            .unwrap_or_else(|| "local".to_string());
        let (width, height) = viewport();
        let seed = js_sys::Date::now() as u64;

        let session = match Session::new(
            RafScheduler { callback: None },
            LocalScoreStore::load(),
            AudioManager::new(&settings),
            &settings,
            SessionConfig {
                player: Some(PlayerId(player)),
                width,
                height,
                seed,
            },
        ) {
            Ok(session) => session,
            Err(e) => {
                log::error!("Cannot start: {e}");
                return;
            }
        };
        let game = Rc::new(RefCell::new(session));

        // Frame callback, shared by every requestAnimationFrame call
        {
            let game_cb = game.clone();
            let closure = Closure::<dyn FnMut(f64)>::new(move |time: f64| {
                let mut g = game_cb.borrow_mut();
                g.on_frame(time);
                render(&g.snapshot());
            });
            let function: &js_sys::Function = closure.as_ref().unchecked_ref();
            game.borrow_mut().frames_mut().callback = Some(function.clone());
            closure.forget();
        }

        setup_input_handlers(game.clone());
        setup_lifecycle_handlers(game.clone());

        render(&game.borrow().snapshot());
        log::info!("Flappy Web running with seed {seed}");
    }

    fn handle(game: &Rc<RefCell<Game>>, event: InputEvent) -> bool {
        let mut g = game.borrow_mut();
        let handled = g.handle_input(&event, now());
        if handled {
            render(&g.snapshot());
        }
        handled
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();

        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if handle(&game, InputEvent::Key(event.key())) {
                    event.prevent_default();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer/touch on the playfield
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                // First gesture unlocks audio
                game.borrow().bridge().sound().resume();
                if handle(&game, InputEvent::PointerDown) {
                    event.prevent_default();
                }
            });
            let target = window
                .document()
                .and_then(|d| d.get_element_by_id("game"))
                .map(|el| el.unchecked_into::<web_sys::EventTarget>())
                .unwrap_or_else(|| window.clone().unchecked_into());
            let _ = target
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_lifecycle_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden
                    && handle(&game, InputEvent::FocusLost)
                {
                    log::info!("Auto-paused (tab hidden)");
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                if handle(&game, InputEvent::FocusLost) {
                    log::info!("Auto-paused (window blur)");
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Resize
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let (w, h) = viewport();
                let mut g = game.borrow_mut();
                match g.resize(w, h) {
                    Ok(()) => render(&g.snapshot()),
                    Err(e) => log::warn!("Ignoring resize: {e}"),
                }
            });
            let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Page going away (or into the back-forward cache): leave it paused
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                g.shutdown(now());
                render(&g.snapshot());
                // Next visit starts on the last chosen tier
                let mut settings = Settings::load();
                settings.default_tier = g.tier();
                settings.save();
            });
            let _ = window
                .add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn phase_name(phase: UiPhase) -> &'static str {
        match phase {
            UiPhase::DifficultySelect => "difficulty",
            UiPhase::Ready => "ready",
            UiPhase::Playing => "playing",
            UiPhase::Paused => "paused",
            UiPhase::Countdown => "countdown",
            UiPhase::GameOver => "game-over",
        }
    }

    /// Mirror the snapshot into the page; styling lives in the page's CSS
    fn render(snap: &Snapshot) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        if let Some(body) = document.body() {
            let _ = body.set_attribute("data-phase", phase_name(snap.phase));
            let _ = body.set_attribute("data-tier", snap.tier.as_str());
        }

        for (id, text) in [
            ("score", snap.score.to_string()),
            ("best", snap.best.to_string()),
            ("tier", snap.tier.to_string()),
            ("countdown", snap.countdown.to_string()),
        ] {
            if let Some(el) = document.get_element_by_id(id) {
                el.set_text_content(Some(&text));
            }
        }

        if let Some(bird) = document
            .get_element_by_id("bird")
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        {
            let _ = bird.style().set_property(
                "transform",
                &format!(
                    "translate({}px, {}px) rotate({}deg)",
                    snap.bird_left, snap.bird.y, snap.tilt
                ),
            );
        }

        if let Some(pipes) = document.get_element_by_id("pipes") {
            let mut html = String::new();
            for pipe in &snap.obstacles {
                let _ = write!(
                    html,
                    r#"<div class="pipe top" style="left:{x}px;top:0;width:{w}px;height:{top}px"></div><div class="pipe bottom" style="left:{x}px;top:{bt}px;width:{w}px;height:{bh}px"></div>"#,
                    x = pipe.x,
                    w = snap.pipe_width,
                    top = pipe.top_height,
                    bt = pipe.bottom_top,
                    bh = pipe.bottom_height,
                );
            }
            pipes.set_inner_html(&html);
        }
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
    log::info!("Flappy Web (native) starting...");
    log::info!("Native mode is headless - serve the wasm build for the playable game");

    match autopilot::run(42) {
        Ok(score) => println!("Autopilot finished with score {score}"),
        Err(e) => {
            eprintln!("Autopilot could not start: {e}");
            std::process::exit(1);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless attempt driven by a naive pilot, used to smoke-test the loop
#[cfg(not(target_arch = "wasm32"))]
mod autopilot {
    use flappy_web::bridge::Silent;
    use flappy_web::consts::{BIRD_HEIGHT, FRAME_MS};
    use flappy_web::sim::ManualFrames;
    use flappy_web::{
        Command, ConfigError, LocalScoreStore, PlayerId, Session, SessionConfig, Settings,
        UiPhase,
    };

    /// Simulated play time limit
    const MAX_MS: f64 = 120_000.0;

    pub fn run(seed: u64) -> Result<u32, ConfigError> {
        let settings = Settings::default();
        let mut session = Session::new(
            ManualFrames::new(),
            LocalScoreStore::load(),
            Silent,
            &settings,
            SessionConfig {
                player: Some(PlayerId("autopilot".into())),
                width: 1024.0,
                height: 600.0,
                seed,
            },
        )?;

        let mut now = 0.0;
        session.apply(Command::ConfirmStart, now);
        session.apply(Command::Jump, now);

        let mut paused_once = false;
        while now < MAX_MS {
            now += FRAME_MS;

            // Exercise pause/resume once mid-run
            if !paused_once && now >= 10_000.0 && session.ui_phase() == UiPhase::Playing {
                session.apply(Command::Pause, now);
                now += 2_000.0;
                session.apply(Command::Resume, now);
                paused_once = true;
            }

            if session.ui_phase() == UiPhase::Playing {
                let snap = session.snapshot();
                let ahead = snap
                    .obstacles
                    .iter()
                    .find(|o| o.x + snap.pipe_width >= snap.bird_left);
                let floor = ahead.map(|o| o.bottom_top - 12.0).unwrap_or(360.0);
                if snap.bird.y + BIRD_HEIGHT > floor && snap.bird.velocity >= 0.0 {
                    session.apply(Command::Jump, now);
                }
            }

            if session.frames_mut().take_due().is_none() {
                break;
            }
            session.on_frame(now);
            for event in session.take_events() {
                log::debug!("{:.0} ms: {event:?}", now);
            }
        }

        let score = session.score();
        log::info!(
            "Autopilot stopped in {:?} after {:.1} s, score {score}, best {}",
            session.ui_phase(),
            now / 1000.0,
            session.displayed_best()
        );
        session.shutdown(now);
        Ok(score)
    }
}
