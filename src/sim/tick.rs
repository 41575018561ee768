//! Level controller: one round on one island, advanced in fixed timesteps
//!
//! Per tick (skipped while paused, while a dialog is up, or once the round
//! is over):
//! 1. Resolve the direction input (joystick overrides keys)
//! 2. Move the lizard, confine it to the shore and push it out of rocks
//! 3. Move every insect
//! 4. Catch overlapping insects and credit the round
//! 5. Top the population back up (one insect per tick)
//! 6. Advance the bird; a landed strike ends the round
//! 7. Win check, then the one-second round clock
//!
//! The jungle level replaces the timed round with its tree sequence.

use std::cmp::Ordering;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::climb::{ClimbDirection, ClimbPhase, ClimbState};
use super::collision::{circles_overlap, clamp_to_rect};
use super::dialog::{Dialog, DialogSlot};
use super::geometry::{Ellipse, PlayArea};
use super::hazard::{HazardSignal, PredatorHazard};
use super::insect::{Insect, InsectKind, pick_kind, spawn_position};
use super::level::{LevelConfig, LevelMode};
use super::player::{MoveMode, Player};
use super::state::{EndCause, LevelEvent, Navigation, RoundOutcome, RoundState, format_clock};
use crate::consts::{MAX_SUBSTEPS, SIM_DT_MS};
use crate::persistence::{BestScore, LevelId, ProgressStore};
use crate::platform::input::{JoystickInput, KeyState, resolve_direction};
use crate::tuning::Tuning;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub keys: KeyState,
    pub joystick: JoystickInput,
    /// Pause toggle (Escape)
    pub pause: bool,
    /// Idle/demo mode - the lizard plays itself
    pub idle_mode: bool,
}

/// What a level dialog button does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelAction {
    Resume,
    Quit,
    Continue,
    Retry,
    Exit,
    Start,
    ClimbUp,
    NotYet,
    ClimbDown,
    Victory,
}

/// Autopilot keeps this much clearance from an attacking bird's shadow
const AUTOPILOT_DANGER_MARGIN: f32 = 40.0;

#[derive(Debug, Clone)]
pub struct Level {
    config: LevelConfig,
    tuning: Tuning,
    pub player: Player,
    /// Live insects, in spawn order
    pub insects: Vec<Insect>,
    pub hazard: Option<PredatorHazard>,
    pub round: RoundState,
    /// Tree progress (jungle only)
    pub climb: Option<ClimbState>,
    pub dialog: DialogSlot<LevelAction>,
    best_at_start: Option<BestScore>,
    events: Vec<LevelEvent>,
    rng: Pcg32,
    next_id: u32,
}

impl Level {
    /// Start a round. The stored best is snapshotted for the HUD.
    pub fn new(config: LevelConfig, tuning: Tuning, seed: u64, store: &dyn ProgressStore) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let round = RoundState::new(config.win_target(), config.time_limit_s());

        let (player, hazard, climb) = match &config.mode {
            LevelMode::Timed(island) => {
                let player = Player::new(island.player_start, MoveMode::Walking, &tuning.player);
                let hazard = island
                    .hazard
                    .then(|| PredatorHazard::new(&island.area, tuning.hazard.clone(), &mut rng));
                (player, hazard, None)
            }
            LevelMode::Climbing(layout) => {
                let player = Player::new(layout.ground_start, MoveMode::Walking, &tuning.player);
                (player, None, Some(ClimbState::new()))
            }
        };

        let mut level = Self {
            best_at_start: store.best(config.id),
            config,
            tuning,
            player,
            insects: Vec::new(),
            hazard,
            round,
            climb,
            dialog: DialogSlot::default(),
            events: Vec::new(),
            rng,
            next_id: 1,
        };

        match &level.config.mode {
            LevelMode::Timed(island) => {
                let kinds = island.initial_kinds.clone();
                for kind in kinds {
                    level.spawn_insect(kind, 1.0);
                }
            }
            LevelMode::Climbing(layout) => {
                let intro = Dialog::new(level.config.name.clone())
                    .lines([
                        format!("Climb {} trees and catch bugs in each canopy!", layout.trees.len()),
                        String::new(),
                        "Each tree gets harder.".to_string(),
                        "Walk to tree 1 to begin.".to_string(),
                    ])
                    .primary("Start", LevelAction::Start);
                level.dialog.show(intro);
            }
        }

        log::info!("Entering {} (level {})", level.config.name, level.config.id);
        level
    }

    /// Start a catalog level by id
    pub fn from_id(id: LevelId, tuning: Tuning, seed: u64, store: &dyn ProgressStore) -> Option<Self> {
        LevelConfig::by_id(id).map(|config| Self::new(config, tuning, seed, store))
    }

    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    /// Best result stored when the round began
    pub fn best_at_start(&self) -> Option<BestScore> {
        self.best_at_start
    }

    /// Playfield the lizard is confined to right now (none on the jungle floor)
    pub fn active_area(&self) -> Option<PlayArea> {
        match (&self.config.mode, &self.climb) {
            (LevelMode::Timed(island), _) => Some(island.area),
            (LevelMode::Climbing(layout), Some(climb)) if climb.in_canopy() => Some(layout.canopy),
            _ => None,
        }
    }

    pub fn obstacles(&self) -> &[Ellipse] {
        match &self.config.mode {
            LevelMode::Timed(island) => &island.obstacles,
            LevelMode::Climbing(_) => &[],
        }
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<LevelEvent> {
        std::mem::take(&mut self.events)
    }

    /// Advance the level by one fixed step
    pub fn tick(&mut self, input: &TickInput, dt_ms: f32, store: &mut dyn ProgressStore) {
        if input.pause {
            self.toggle_pause();
        }

        if self.round.is_over() || self.round.paused {
            self.player.stop();
            return;
        }
        if self.dialog.is_visible() {
            self.player.stop();
            // Demo mode answers prompts with the default button
            if input.idle_mode {
                self.choose_primary(store);
            }
            return;
        }

        let direction = if input.idle_mode {
            self.autopilot()
        } else {
            resolve_direction(&input.keys, &input.joystick)
        };

        if self.climb.is_some() {
            self.tick_climbing(direction, dt_ms, store);
        } else {
            self.tick_island(direction, dt_ms, store);
        }
    }

    fn tick_island(&mut self, direction: Vec2, dt_ms: f32, store: &mut dyn ProgressStore) {
        let LevelMode::Timed(island) = &self.config.mode else {
            return;
        };
        let area = island.area;
        let min_population = island.min_population;

        self.player.advance(direction, dt_ms, &area, &island.obstacles);

        for insect in &mut self.insects {
            insect.advance(dt_ms, &self.tuning.insects, &mut self.rng);
            insect.avoid_obstacles(&island.obstacles);
        }

        self.catch_insects();

        if self.insects.len() < min_population {
            self.spawn_replacement();
        }

        let signal = match self.hazard.as_mut() {
            Some(hazard) => hazard.advance(
                dt_ms,
                self.player.pos,
                self.player.radius,
                &area,
                &mut self.rng,
            ),
            None => None,
        };
        match signal {
            Some(HazardSignal::AttackStarted { at }) => {
                self.events.push(LevelEvent::AttackStarted { at });
            }
            Some(HazardSignal::Struck { at, radius, hit }) => {
                self.events.push(LevelEvent::AttackLanded { at, radius, hit });
                if hit {
                    self.finish(EndCause::Caught, store);
                }
            }
            None => {}
        }

        if self.round.target_reached() {
            self.finish(EndCause::TargetReached, store);
        }

        for remaining in self.round.advance_clock(dt_ms) {
            self.events.push(LevelEvent::TimerTick { remaining });
        }
        if self.round.time_up() {
            self.finish(EndCause::TimeUp, store);
        }
    }

    fn tick_climbing(&mut self, direction: Vec2, dt_ms: f32, store: &mut dyn ProgressStore) {
        let LevelMode::Climbing(layout) = &self.config.mode else {
            return;
        };
        let Some(climb) = self.climb.as_mut() else {
            return;
        };

        let phase = climb.phase;
        match phase {
            ClimbPhase::Climbing { .. } => {
                self.player.stop();
                match climb.advance_climb(dt_ms, layout.climb_duration_ms) {
                    Some(ClimbDirection::Up) => self.enter_canopy(),
                    Some(ClimbDirection::Down) => self.return_to_ground(store),
                    None => {}
                }
            }
            ClimbPhase::Ground => {
                self.player.steer(direction, dt_ms);
                self.player.pos = clamp_to_rect(self.player.pos, layout.ground_min, layout.ground_max);

                if let Some(tree) = layout.trees.get(climb.tree) {
                    let distance = self.player.pos.distance(tree.marker);
                    if climb.should_prompt(distance, layout.tree_reach) {
                        let prompt = Dialog::new(format!("Tree {}", climb.tree + 1))
                            .line(format!("Ready to climb and catch {} bugs?", tree.quota))
                            .primary("Climb Up", LevelAction::ClimbUp)
                            .button("Not Yet", LevelAction::NotYet);
                        self.dialog.show(prompt);
                    }
                }
            }
            ClimbPhase::Canopy => {
                let canopy = layout.canopy;
                let tree = climb.tree;
                self.tick_canopy(direction, dt_ms, canopy, tree);
            }
        }
    }

    /// Catching sub-round in one tree: steps 2-5 of the island tick
    fn tick_canopy(&mut self, direction: Vec2, dt_ms: f32, canopy: PlayArea, tree: usize) {
        self.player.advance(direction, dt_ms, &canopy, &[]);

        for insect in &mut self.insects {
            insect.advance(dt_ms, &self.tuning.insects, &mut self.rng);
        }

        let caught = self.catch_insects();
        let Some(climb) = self.climb.as_mut() else {
            return;
        };
        climb.tree_caught += caught;
        let tree_caught = climb.tree_caught;

        let LevelMode::Climbing(layout) = &self.config.mode else {
            return;
        };
        let Some(stage) = layout.trees.get(tree) else {
            return;
        };
        if tree_caught >= stage.quota {
            self.tree_cleared(tree);
        } else if self.insects.len() < stage.quota as usize + layout.canopy_extra {
            self.spawn_replacement();
        }
    }

    fn enter_canopy(&mut self) {
        let LevelMode::Climbing(layout) = &self.config.mode else {
            return;
        };
        let Some(climb) = self.climb.as_mut() else {
            return;
        };
        let Some(tree) = layout.trees.get(climb.tree) else {
            return;
        };
        climb.enter_canopy();

        self.player.pos = layout.canopy.center + layout.canopy_start_offset;
        self.player.stop();
        self.insects.clear();

        let count = tree.quota as usize + layout.canopy_extra;
        let kinds: Vec<InsectKind> = (0..count)
            .filter_map(|_| pick_kind(&tree.kinds, &mut self.rng))
            .collect();
        let multiplier = tree.speed_multiplier;
        log::debug!("Climbed tree {} ({} insects, speed x{})", climb.tree + 1, kinds.len(), multiplier);

        for kind in kinds {
            self.spawn_insect(kind, multiplier);
        }
    }

    fn tree_cleared(&mut self, tree: usize) {
        let LevelMode::Climbing(layout) = &self.config.mode else {
            return;
        };
        let total = layout.trees.len();
        let remaining = total.saturating_sub(tree + 1);
        let tree_caught = self.climb.as_ref().map_or(0, |c| c.tree_caught);

        self.insects.clear();
        self.player.stop();
        self.events.push(LevelEvent::TreeCleared { tree, remaining });
        log::debug!("Tree {} cleared, {} to go", tree + 1, remaining);

        let dialog = Dialog::new("Tree Cleared!").lines([
            format!("Tree {} complete!", tree + 1),
            format!("Bugs caught: {}", tree_caught),
            String::new(),
            if remaining == 0 {
                "All trees cleared!".to_string()
            } else {
                format!("{} trees remaining...", remaining)
            },
        ]);
        let dialog = if remaining == 0 {
            dialog.primary("Victory!", LevelAction::Victory)
        } else {
            dialog.primary("Climb Down", LevelAction::ClimbDown)
        };
        self.dialog.show(dialog);
    }

    fn return_to_ground(&mut self, store: &mut dyn ProgressStore) {
        let LevelMode::Climbing(layout) = &self.config.mode else {
            return;
        };
        let Some(climb) = self.climb.as_mut() else {
            return;
        };
        if climb.finish_tree(layout.trees.len()) {
            self.finish(EndCause::AllTreesCleared, store);
            return;
        }
        self.player.pos = layout.ground_start;
        self.player.stop();
    }

    /// Remove every insect touching the lizard; returns how many
    fn catch_insects(&mut self) -> u32 {
        let (pos, radius) = (self.player.pos, self.player.radius);
        let mut caught = Vec::new();
        self.insects.retain(|insect| {
            if circles_overlap(pos, radius, insect.pos, insect.radius()) {
                caught.push((insect.kind, insect.pos));
                false
            } else {
                true
            }
        });

        for &(kind, at) in &caught {
            let points = kind.points();
            log::trace!("Caught a {} (+{})", kind.as_str(), points);
            self.round.credit(points);
            self.events.push(LevelEvent::InsectCaught {
                kind,
                points,
                pos: at,
            });
        }
        caught.len() as u32
    }

    fn spawn_insect(&mut self, kind: InsectKind, speed_multiplier: f32) {
        let (area, rules, obstacles) = match &self.config.mode {
            LevelMode::Timed(island) => (&island.area, &island.spawn, island.obstacles.as_slice()),
            LevelMode::Climbing(layout) => (&layout.canopy, &layout.canopy_spawn, &[][..]),
        };
        let pos = spawn_position(area, rules, obstacles, &mut self.rng);
        let id = self.next_id;
        self.next_id += 1;

        let insect = Insect::new(id, kind, pos, *area, &mut self.rng).with_speed_multiplier(speed_multiplier);
        self.insects.push(insect);
    }

    /// One insect from the level's (or current tree's) pool
    fn spawn_replacement(&mut self) {
        let (pool, multiplier) = match &self.config.mode {
            LevelMode::Timed(island) => (island.respawn_pool.as_slice(), 1.0),
            LevelMode::Climbing(layout) => {
                let Some(tree) = self.climb.as_ref().and_then(|c| layout.trees.get(c.tree)) else {
                    return;
                };
                (tree.kinds.as_slice(), tree.speed_multiplier)
            }
        };
        if let Some(kind) = pick_kind(pool, &mut self.rng) {
            self.spawn_insect(kind, multiplier);
        }
    }

    /// Demo steering: dodge an attacking bird, otherwise chase the nearest
    /// insect (or walk to the next trunk on the jungle floor)
    fn autopilot(&self) -> Vec2 {
        let pos = self.player.pos;

        if let Some(hazard) = self.hazard.as_ref().filter(|h| h.is_attacking()) {
            let away = pos - hazard.telegraph;
            let danger = hazard.telegraph_radius() + self.player.radius + AUTOPILOT_DANGER_MARGIN;
            if away.length() < danger {
                let flee = away.normalize_or_zero();
                // Slide sideways so the shore can't pin us
                return if flee == Vec2::ZERO { Vec2::X } else { flee + flee.perp() * 0.5 };
            }
        }

        if let (LevelMode::Climbing(layout), Some(climb)) = (&self.config.mode, &self.climb) {
            if climb.phase == ClimbPhase::Ground {
                return layout
                    .trees
                    .get(climb.tree)
                    .map_or(Vec2::ZERO, |tree| (tree.marker - pos).normalize_or_zero());
            }
        }

        self.insects
            .iter()
            .min_by(|a, b| {
                a.pos
                    .distance_squared(pos)
                    .partial_cmp(&b.pos.distance_squared(pos))
                    .unwrap_or(Ordering::Equal)
            })
            .map_or(Vec2::ZERO, |insect| (insect.pos - pos).normalize_or_zero())
    }

    /// Pause or resume. Ignored once the round is over or while another
    /// dialog is up.
    pub fn toggle_pause(&mut self) {
        if self.round.is_over() {
            return;
        }
        if self.round.paused {
            self.round.paused = false;
            self.dialog.hide();
            return;
        }
        if self.dialog.is_visible() {
            return;
        }

        self.round.paused = true;
        self.player.stop();
        let lines = match (&self.config.mode, &self.climb) {
            (LevelMode::Climbing(layout), Some(climb)) => vec![
                format!("Trees cleared: {}/{}", climb.tree, layout.trees.len()),
                format!("Total bugs: {}", self.round.caught),
            ],
            _ => vec!["Game paused".to_string()],
        };
        self.dialog.show(
            Dialog::new("Paused")
                .lines(lines)
                .primary("Resume", LevelAction::Resume)
                .button("Quit", LevelAction::Quit),
        );
    }

    /// Press a dialog button; returns where to go next, if anywhere
    pub fn choose(&mut self, index: usize, store: &mut dyn ProgressStore) -> Option<Navigation> {
        let action = self.dialog.choose(index)?;
        self.apply(action, store)
    }

    pub fn choose_primary(&mut self, store: &mut dyn ProgressStore) -> Option<Navigation> {
        let action = self.dialog.choose_primary()?;
        self.apply(action, store)
    }

    fn apply(&mut self, action: LevelAction, store: &mut dyn ProgressStore) -> Option<Navigation> {
        let back_to_map = Navigation::WorldMap {
            from_level: Some(self.config.id),
        };
        match action {
            LevelAction::Resume => {
                self.round.paused = false;
                None
            }
            LevelAction::Quit | LevelAction::Continue | LevelAction::Exit => Some(back_to_map),
            LevelAction::Retry => Some(Navigation::RestartLevel(self.config.id)),
            LevelAction::Start | LevelAction::NotYet => None,
            LevelAction::ClimbUp | LevelAction::ClimbDown => {
                let direction = if action == LevelAction::ClimbUp {
                    ClimbDirection::Up
                } else {
                    ClimbDirection::Down
                };
                if let Some(climb) = self.climb.as_mut() {
                    climb.start_climb(direction);
                }
                None
            }
            LevelAction::Victory => {
                self.finish(EndCause::AllTreesCleared, store);
                None
            }
        }
    }

    /// End the round as a win or loss. No-op once the round is over.
    pub fn conclude_round(&mut self, won: bool, store: &mut dyn ProgressStore) -> bool {
        let cause = match (won, &self.config.mode) {
            (true, LevelMode::Timed(_)) => EndCause::TargetReached,
            (true, LevelMode::Climbing(_)) => EndCause::AllTreesCleared,
            (false, _) if self.round.time_up() => EndCause::TimeUp,
            (false, _) => EndCause::Caught,
        };
        self.finish(cause, store)
    }

    fn finish(&mut self, cause: EndCause, store: &mut dyn ProgressStore) -> bool {
        if self.round.is_over() {
            return false;
        }
        let won = cause.is_win();
        let (_, total) = self.round.totals(won);
        let time_remaining = self.round.time_remaining.unwrap_or(0);

        let new_best = store.record_score_if_better(self.config.id, self.round.caught, time_remaining, total);
        let unlocked = if won { self.config.unlocks } else { None };
        if let Some(next) = unlocked {
            store.unlock_level(next);
        }

        self.round.conclude(cause, new_best);
        self.player.stop();
        let Some(outcome) = self.round.outcome().copied() else {
            return false;
        };
        log::info!(
            "{} over: {:?}, caught {}, total {}{}",
            self.config.name,
            cause,
            outcome.caught,
            outcome.total_score,
            if new_best { " (new best)" } else { "" }
        );

        let best = store.best(self.config.id);
        let unlocked_name = unlocked.and_then(LevelConfig::by_id).map(|level| level.name);
        let dialog = self.outcome_dialog(&outcome, best, unlocked_name);
        self.dialog.show(dialog);
        self.events.push(LevelEvent::RoundOver(outcome));
        true
    }

    fn outcome_dialog(
        &self,
        outcome: &RoundOutcome,
        best: Option<BestScore>,
        unlocked: Option<String>,
    ) -> Dialog<LevelAction> {
        let new_best = if outcome.new_best { " NEW BEST!" } else { "" };
        let trees = match (&self.config.mode, &self.climb) {
            (LevelMode::Climbing(layout), Some(climb)) => Some((climb.tree.min(layout.trees.len()), layout.trees.len())),
            _ => None,
        };

        if !outcome.won {
            let mut lines = vec![match outcome.cause {
                EndCause::TimeUp => "Time's up!".to_string(),
                _ => "The bird got you!".to_string(),
            }];
            if let Some((cleared, total)) = trees {
                lines.push(format!("Trees cleared: {}/{}", cleared, total));
            }
            lines.push(format!("Bugs collected: {}", outcome.caught));
            if let Some(best) = best {
                lines.push(format!("Your best: {} caught", best.caught));
            }
            return Dialog::new("Game Over")
                .lines(lines)
                .primary("Retry", LevelAction::Retry)
                .button("Exit", LevelAction::Exit);
        }

        let (title, mut lines) = match trees {
            Some((_, total)) => (
                "Jungle Conquered!",
                vec![
                    format!("All {} trees cleared!", total),
                    String::new(),
                    format!("Total bugs caught: {}", outcome.caught),
                    format!("Total Score: {}{}", outcome.total_score, new_best),
                ],
            ),
            None => (
                "Level Complete!",
                vec![
                    format!("Time remaining: {}", format_clock(outcome.time_remaining)),
                    format!("Bugs collected: {}", outcome.caught),
                    format!("Time bonus: +{}", outcome.time_bonus),
                    String::new(),
                    format!("Total Score: {}{}", outcome.total_score, new_best),
                ],
            ),
        };
        if let Some(best) = best.filter(|_| !outcome.new_best) {
            lines.push(format!("Your best: {}", best.score));
        }
        if let Some(name) = unlocked {
            lines.push(String::new());
            lines.push(format!("{} unlocked!", name));
        }
        Dialog::new(title)
            .lines(lines)
            .primary("Continue", LevelAction::Continue)
    }
}

/// Fixed-timestep accumulator: turns variable frame times into whole
/// `SIM_DT_MS` steps
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    accumulator_ms: f32,
}

impl FrameClock {
    /// Longer frames (tab switches, debugger stops) are clamped to this
    pub const MAX_FRAME_MS: f32 = 100.0;

    pub fn new() -> Self {
        Self::default()
    }

    /// Add one frame's wall time; returns how many steps to simulate
    pub fn advance(&mut self, frame_ms: f32) -> u32 {
        self.accumulator_ms += frame_ms.clamp(0.0, Self::MAX_FRAME_MS);

        let mut steps = 0;
        while self.accumulator_ms >= SIM_DT_MS && steps < MAX_SUBSTEPS {
            self.accumulator_ms -= SIM_DT_MS;
            steps += 1;
        }
        // Spiral of death guard: drop whatever the cap left behind
        if steps == MAX_SUBSTEPS {
            self.accumulator_ms = self.accumulator_ms.min(SIM_DT_MS);
        }
        steps
    }

    pub fn reset(&mut self) {
        self.accumulator_ms = 0.0;
    }
}
