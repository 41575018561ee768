//! Lizard's Journey entry point
//!
//! Native: a headless runner that lets the autopilot play every unlocked
//! island in turn and prints how each round went.
//! Web: a start hook plus a small driver the page calls once per frame.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use glam::Vec2;
    use serde::Serialize;
    use wasm_bindgen::prelude::*;

    use lizard_journey::platform::{JoystickInput, KeyState, LocalStorage};
    use lizard_journey::sim::{Dialog, FrameClock, Level, LevelEvent, Navigation, TickInput, WorldMap};
    use lizard_journey::{SaveStore, Tuning};

    enum Scene {
        Map(WorldMap),
        Playing(Box<Level>),
    }

    /// What the page needs to draw one frame
    #[derive(Serialize)]
    struct Snapshot {
        scene: &'static str,
        player: Vec2,
        insects: Vec<Vec2>,
        shadow: Option<(Vec2, f32)>,
        caught: u32,
        score: u32,
        time_remaining: Option<u32>,
        dialog: Option<DialogView>,
        /// Feedback since the previous snapshot ("+N" popups, bird strikes)
        events: Vec<LevelEvent>,
    }

    #[derive(Serialize)]
    struct DialogView {
        title: String,
        lines: Vec<String>,
        buttons: Vec<String>,
    }

    impl<A> From<&Dialog<A>> for DialogView {
        fn from(dialog: &Dialog<A>) -> Self {
            Self {
                title: dialog.title.clone(),
                lines: dialog.lines.clone(),
                buttons: dialog.buttons.iter().map(|b| b.label.clone()).collect(),
            }
        }
    }

    #[wasm_bindgen]
    pub struct WebGame {
        store: SaveStore<LocalStorage>,
        tuning: Tuning,
        scene: Scene,
        clock: FrameClock,
        keys: KeyState,
        joystick: JoystickInput,
        pause_requested: bool,
        pending_events: Vec<LevelEvent>,
    }

    #[wasm_bindgen]
    impl WebGame {
        #[wasm_bindgen(constructor)]
        pub fn new(tuning_json: Option<String>) -> WebGame {
            let tuning = Tuning::from_json_or_default(tuning_json.as_deref());
            let store = SaveStore::new(LocalStorage);
            let map = WorldMap::new(None, &tuning, &store);
            log::info!("World map ready, {} islands", map.islands.len());
            WebGame {
                store,
                tuning,
                scene: Scene::Map(map),
                clock: FrameClock::new(),
                keys: KeyState::default(),
                joystick: JoystickInput::idle(),
                pause_requested: false,
                pending_events: Vec::new(),
            }
        }

        /// Keyboard event; returns true when the key was one the game uses
        pub fn key(&mut self, key: &str, down: bool) -> bool {
            if key == "Escape" {
                if down {
                    self.pause_requested = true;
                }
                return true;
            }
            self.keys.set_key(key, down)
        }

        /// Touch joystick drag, in game coordinates
        pub fn joystick(&mut self, base_x: f32, base_y: f32, x: f32, y: f32) {
            self.joystick =
                JoystickInput::from_default_drag(Vec2::new(base_x, base_y), Vec2::new(x, y));
        }

        pub fn joystick_release(&mut self) {
            self.joystick = JoystickInput::idle();
        }

        /// Advance by one display frame
        pub fn frame(&mut self, frame_ms: f32) {
            let steps = self.clock.advance(frame_ms);
            for step in 0..steps {
                let input = TickInput {
                    keys: self.keys,
                    joystick: self.joystick,
                    pause: step == 0 && std::mem::take(&mut self.pause_requested),
                    idle_mode: false,
                };
                match &mut self.scene {
                    Scene::Map(map) => map.tick(&input, lizard_journey::consts::SIM_DT_MS),
                    Scene::Playing(level) => {
                        level.tick(&input, lizard_journey::consts::SIM_DT_MS, &mut self.store);
                        self.pending_events.extend(level.drain_events());
                    }
                }
            }
        }

        /// Press a button of the visible dialog
        pub fn choose(&mut self, index: usize) {
            let nav = match &mut self.scene {
                Scene::Map(map) => map.choose(index),
                Scene::Playing(level) => {
                    let nav = level.choose(index, &mut self.store);
                    self.pending_events.extend(level.drain_events());
                    nav
                }
            };
            if let Some(nav) = nav {
                self.navigate(nav);
            }
        }

        /// Current frame state as JSON; hands over the events gathered since
        /// the last call
        pub fn snapshot(&mut self) -> String {
            let events = std::mem::take(&mut self.pending_events);
            let snapshot = match &self.scene {
                Scene::Map(map) => Snapshot {
                    scene: "map",
                    player: map.player.pos,
                    insects: Vec::new(),
                    shadow: None,
                    caught: 0,
                    score: 0,
                    time_remaining: None,
                    dialog: map.dialog.current().map(DialogView::from),
                    events,
                },
                Scene::Playing(level) => Snapshot {
                    scene: "level",
                    player: level.player.pos,
                    insects: level.insects.iter().map(|i| i.pos).collect(),
                    shadow: level
                        .hazard
                        .as_ref()
                        .filter(|h| h.visible)
                        .map(|h| (h.telegraph, h.shadow_size)),
                    caught: level.round.caught,
                    score: level.round.score,
                    time_remaining: level.round.time_remaining,
                    dialog: level.dialog.current().map(DialogView::from),
                    events,
                },
            };
            serde_json::to_string(&snapshot).unwrap_or_default()
        }
    }

    impl WebGame {
        fn navigate(&mut self, nav: Navigation) {
            self.clock.reset();
            self.pending_events.clear();
            self.scene = match nav {
                Navigation::WorldMap { from_level } => {
                    Scene::Map(WorldMap::new(from_level, &self.tuning, &self.store))
                }
                Navigation::EnterLevel(id) | Navigation::RestartLevel(id) => {
                    match Level::from_id(id, self.tuning.clone(), rand::random(), &self.store) {
                        Some(level) => Scene::Playing(Box::new(level)),
                        None => {
                            log::warn!("Unknown level {}", id);
                            Scene::Map(WorldMap::new(None, &self.tuning, &self.store))
                        }
                    }
                }
            };
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    log::info!("Lizard's Journey starting");
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    native::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry is wasm_main
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use lizard_journey::consts::SIM_DT_MS;
    use lizard_journey::platform::FileStore;
    use lizard_journey::sim::state::format_clock;
    use lizard_journey::sim::{FrameClock, Level, LevelEvent, RoundOutcome, TickInput, catalog};
    use lizard_journey::{ProgressStore, SaveStore, Tuning};

    /// Simulated display rate for the demo
    const FRAME_MS: f32 = 1000.0 / 60.0;
    /// Give up on a round after this much simulated time
    const ROUND_LIMIT_MS: f32 = 15.0 * 60.0 * 1000.0;
    const DEFAULT_SEED: u64 = 42;

    pub fn run() {
        let tuning = load_tuning();
        let seed = std::env::var("LIZARD_SEED")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_SEED);
        let save_dir = std::env::var_os("LIZARD_SAVE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join("lizard-journey"));
        let mut store = SaveStore::new(FileStore::new(&save_dir));
        log::info!("Save directory: {}", save_dir.display());

        println!("Lizard's Journey autopilot (seed {seed})");
        for config in catalog() {
            if !store.is_unlocked(config.id) {
                println!("{:>2}. {:<14} locked", config.id, config.name);
                continue;
            }
            let name = config.name.clone();
            let id = config.id;
            let mut level = Level::new(config, tuning.clone(), seed.wrapping_add(u64::from(id)), &store);
            match play(&mut level, &mut store) {
                Some(outcome) => print_outcome(id, &name, &outcome),
                None => println!("{id:>2}. {name:<14} unfinished after the time limit"),
            }
        }
        if store.is_degraded() {
            println!("Progress could not be saved; this session used memory only");
        }
    }

    fn load_tuning() -> Tuning {
        let Some(path) = std::env::var_os("LIZARD_TUNING") else {
            return Tuning::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(json) => Tuning::from_json_or_default(Some(&json)),
            Err(e) => {
                log::warn!("Could not read tuning file {:?}: {}", path, e);
                Tuning::default()
            }
        }
    }

    /// Run one round on autopilot until it ends
    fn play(level: &mut Level, store: &mut dyn ProgressStore) -> Option<RoundOutcome> {
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        let mut clock = FrameClock::new();
        let mut elapsed_ms = 0.0;
        while elapsed_ms < ROUND_LIMIT_MS {
            for _ in 0..clock.advance(FRAME_MS) {
                level.tick(&input, SIM_DT_MS, store);
                elapsed_ms += SIM_DT_MS;
            }
            for event in level.drain_events() {
                match event {
                    LevelEvent::TreeCleared { tree, remaining } => {
                        log::info!("Tree {} cleared, {} to go", tree + 1, remaining);
                    }
                    LevelEvent::RoundOver(outcome) => return Some(outcome),
                    _ => {}
                }
            }
        }
        None
    }

    fn print_outcome(id: u32, name: &str, outcome: &RoundOutcome) {
        let verdict = if outcome.won { "won" } else { "lost" };
        let best = if outcome.new_best { " (new best)" } else { "" };
        println!(
            "{id:>2}. {name:<14} {verdict:<4} caught {:>2}  left {}  score {} + {} = {}{best}",
            outcome.caught,
            format_clock(outcome.time_remaining),
            outcome.score,
            outcome.time_bonus,
            outcome.total_score,
        );
    }
}
