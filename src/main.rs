//! Cyber Strike entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::KeyboardEvent;

    use cyber_strike::Tuning;
    use cyber_strike::consts::SIM_DT;
    use cyber_strike::sim::{
        FrameControl, FrameScheduler, MatchEvent, MatchSession, Subscription, TickInput,
    };

    // Presentation hooks; the page installs `window.cyberStrike`
    #[wasm_bindgen(inline_js = "
        export function present_frame(json) {
            const hooks = window.cyberStrike;
            if (hooks && hooks.present) {
                hooks.present(JSON.parse(json));
            }
        }

        export function lifecycle_event(name, payload) {
            const hooks = window.cyberStrike;
            if (hooks && hooks.onEvent) {
                hooks.onEvent(name, payload ? JSON.parse(payload) : null);
            }
        }
    ")]
    extern "C" {
        fn present_frame(json: &str);
        fn lifecycle_event(name: &str, payload: &str);
    }

    thread_local! {
        static ARENA: RefCell<Option<Subscription>> = const { RefCell::new(None) };
    }

    /// Host-side loop state
    struct Game {
        scheduler: FrameScheduler,
        session: Rc<RefCell<MatchSession>>,
        last_time: f64,
    }

    impl Game {
        fn update(&mut self, time: f64) -> FrameControl {
            let dt = if self.last_time > 0.0 {
                ((time - self.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            self.last_time = time;

            let control = self.scheduler.frame(dt);
            if control == FrameControl::Continue {
                self.present();
            }
            control
        }

        fn present(&self) {
            let (snapshot, events) = {
                let mut session = self.session.borrow_mut();
                (session.snapshot(), session.drain_events())
            };

            match serde_json::to_string(&snapshot) {
                Ok(json) => present_frame(&json),
                Err(e) => log::error!("Failed to serialize snapshot: {}", e),
            }

            for event in events {
                let (name, payload) = match &event {
                    MatchEvent::Ready => ("ready", String::new()),
                    MatchEvent::PauseChanged { paused } => ("pause", paused.to_string()),
                    MatchEvent::Hit(impact) => ("hit", to_json(impact)),
                    MatchEvent::Knockout { .. } => ("knockout", to_json(&event)),
                    MatchEvent::Resolved(outcome) => ("game_over", to_json(outcome)),
                    MatchEvent::Reset => ("reset", String::new()),
                };
                lifecycle_event(name, &payload);
            }
        }
    }

    fn to_json<T: serde::Serialize>(value: &T) -> String {
        serde_json::to_string(value).unwrap_or_else(|e| {
            log::error!("Failed to serialize event: {}", e);
            String::new()
        })
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Logger init failed: {}", e).into());
        }

        log::info!("Cyber Strike starting...");

        let seed = (js_sys::Math::random() * u32::MAX as f64) as u64 ^ js_sys::Date::now() as u64;
        let session = Rc::new(RefCell::new(MatchSession::new(seed, Tuning::default())));
        let input = Rc::new(RefCell::new(TickInput::default()));
        let (scheduler, subscription) = FrameScheduler::subscribe(session.clone(), input.clone());

        setup_input_handlers(session.clone(), input);
        ARENA.with(|slot| *slot.borrow_mut() = Some(subscription));

        let game = Rc::new(RefCell::new(Game {
            scheduler,
            session,
            last_time: 0.0,
        }));
        request_animation_frame(game);
    }

    /// Cancel the frame loop when the host navigates away
    #[wasm_bindgen]
    pub fn leave_arena() {
        ARENA.with(|slot| {
            if let Some(subscription) = slot.borrow_mut().take() {
                subscription.cancel();
            }
        });
    }

    fn setup_input_handlers(session: Rc<RefCell<MatchSession>>, input: Rc<RefCell<TickInput>>) {
        let Some(window) = web_sys::window() else {
            log::error!("No window, keyboard input disabled");
            return;
        };

        // Key down
        {
            let input = input.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut i = input.borrow_mut();
                match event.key().as_str() {
                    "a" | "A" | "ArrowLeft" => i.move_left = true,
                    "d" | "D" | "ArrowRight" => i.move_right = true,
                    "w" | "W" | "ArrowUp" => i.jump = true,
                    " " => {
                        event.prevent_default();
                        i.attack = true;
                    }
                    "Escape" if !event.repeat() => i.pause = true,
                    "r" | "R" if !event.repeat() => session.borrow_mut().reset(),
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key up
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut i = input.borrow_mut();
                match event.key().as_str() {
                    "a" | "A" | "ArrowLeft" => i.move_left = false,
                    "d" | "D" | "ArrowRight" => i.move_right = false,
                    "w" | "W" | "ArrowUp" => i.jump = false,
                    " " => i.attack = false,
                    _ => {}
                }
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
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
        let control = game.borrow_mut().update(time);
        match control {
            FrameControl::Continue => request_animation_frame(game),
            FrameControl::Stop => log::info!("Left the arena, frame loop stopped"),
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

/// Headless exhibition match: a scripted human against the CPU
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::cell::RefCell;
    use std::rc::Rc;

    use cyber_strike::Tuning;
    use cyber_strike::consts::{SIM_DT, TICKS_PER_SECOND};
    use cyber_strike::sim::{ActorId, FrameControl, FrameScheduler, MatchEvent, MatchSession, TickInput};

    /// Path to an optional JSON tuning file
    const TUNING_ENV: &str = "CYBER_STRIKE_TUNING";
    const DEFAULT_SEED: u64 = 42;
    /// Give up after three simulated minutes
    const FRAME_LIMIT: u64 = TICKS_PER_SECOND as u64 * 180;
    /// Scripted human swings once the gap is this small
    const SWING_GAP: f32 = 80.0;

    env_logger::init();
    log::info!("Cyber Strike (native) starting...");

    let seed = match std::env::args().nth(1) {
        Some(arg) => arg.parse().unwrap_or_else(|_| {
            log::warn!("Invalid seed {:?}, using {}", arg, DEFAULT_SEED);
            DEFAULT_SEED
        }),
        None => DEFAULT_SEED,
    };
    let tuning = std::env::var_os(TUNING_ENV)
        .map(Tuning::load)
        .unwrap_or_default();

    let session = Rc::new(RefCell::new(MatchSession::new(seed, tuning)));
    let input = Rc::new(RefCell::new(TickInput::default()));
    let (mut scheduler, subscription) = FrameScheduler::subscribe(session.clone(), input.clone());

    let mut frames = 0u64;
    loop {
        {
            let s = session.borrow();
            let gap = s.fighter(ActorId::Cpu).pos.x - s.fighter(ActorId::Human).pos.x;
            let mut i = input.borrow_mut();
            i.move_right = gap > SWING_GAP;
            i.move_left = gap < -SWING_GAP;
            i.attack = gap.abs() <= SWING_GAP;
            i.jump = frames % 150 == 75;
        }

        if scheduler.frame(SIM_DT) == FrameControl::Stop {
            break;
        }
        frames += 1;

        for event in session.borrow_mut().drain_events() {
            match event {
                MatchEvent::Hit(impact) => log::info!(
                    "{} -> {}: {} hp left",
                    impact.attacker.callsign(),
                    impact.defender.callsign(),
                    impact.health_left
                ),
                MatchEvent::Resolved(_) => subscription.cancel(),
                other => log::debug!("{:?}", other),
            }
        }

        if frames >= FRAME_LIMIT {
            log::warn!("No knockout after {} frames, stopping", frames);
            subscription.cancel();
        }
    }

    match session.borrow().outcome() {
        Some(outcome) => match serde_json::to_string_pretty(&outcome) {
            Ok(json) => println!("{}\n{}", outcome.headline(), json),
            Err(e) => log::error!("Failed to serialize outcome: {}", e),
        },
        None => println!("NO CONTEST"),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
