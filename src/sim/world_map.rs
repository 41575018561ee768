//! World map: the lizard swims between islands
//!
//! No insects and no bird. Swimming near an island opens its dialog; a short
//! cooldown after dismissing a dialog (or arriving back from a level) keeps
//! the same dialog from popping straight back up.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::clamp_to_rect;
use super::dialog::{Dialog, DialogSlot};
use super::level::{LevelConfig, catalog};
use super::player::{MoveMode, Player};
use super::state::Navigation;
use super::tick::TickInput;
use crate::consts::{GAME_HEIGHT, GAME_WIDTH};
use crate::persistence::{LevelId, ProgressStore};
use crate::platform::input::resolve_direction;
use crate::tuning::{Tuning, WorldMapTuning};

/// Fresh-session spawn point, at the left edge of the sea
const MAP_SPAWN: Vec2 = Vec2::new(60.0, GAME_HEIGHT / 2.0);
/// Returning players appear this far right of the island they left
const RETURN_OFFSET_X: f32 = 100.0;
const RETURN_MAX_X: f32 = GAME_WIDTH - 50.0;

/// An island as seen from the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IslandMarker {
    pub id: LevelId,
    pub name: String,
    pub description: String,
    pub pos: Vec2,
    pub unlocked: bool,
}

impl IslandMarker {
    fn from_level(level: &LevelConfig, store: &dyn ProgressStore) -> Self {
        Self {
            id: level.id,
            name: level.name.clone(),
            description: level.description.clone(),
            pos: level.map_pos,
            unlocked: store.is_unlocked(level.id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapAction {
    Enter(LevelId),
    Back,
    Ok,
}

#[derive(Debug, Clone)]
pub struct WorldMap {
    pub player: Player,
    pub islands: Vec<IslandMarker>,
    pub dialog: DialogSlot<MapAction>,
    /// Island dialogs are suppressed while this is positive
    pub cooldown_ms: f32,
    tuning: WorldMapTuning,
}

impl WorldMap {
    /// Open the map, placed beside `from_level` when returning from one
    pub fn new(from_level: Option<LevelId>, tuning: &Tuning, store: &dyn ProgressStore) -> Self {
        let islands: Vec<IslandMarker> = catalog()
            .iter()
            .map(|level| IslandMarker::from_level(level, store))
            .collect();

        let left = from_level.and_then(|id| islands.iter().find(|island| island.id == id));
        let (spawn, cooldown_ms) = match left {
            Some(island) => (
                Vec2::new((island.pos.x + RETURN_OFFSET_X).min(RETURN_MAX_X), island.pos.y),
                tuning.world_map.return_cooldown_ms,
            ),
            None => (MAP_SPAWN, 0.0),
        };

        Self {
            player: Player::new(spawn, MoveMode::Swimming, &tuning.player),
            islands,
            dialog: DialogSlot::default(),
            cooldown_ms,
            tuning: tuning.world_map.clone(),
        }
    }

    /// Re-read unlock state (after a level was won)
    pub fn refresh(&mut self, store: &dyn ProgressStore) {
        for island in &mut self.islands {
            island.unlocked = store.is_unlocked(island.id);
        }
    }

    pub fn tick(&mut self, input: &TickInput, dt_ms: f32) {
        if self.dialog.is_visible() {
            self.player.stop();
            return;
        }
        self.cooldown_ms = (self.cooldown_ms - dt_ms).max(0.0);

        let direction = resolve_direction(&input.keys, &input.joystick);
        self.player.steer(direction, dt_ms);
        let r = self.player.radius;
        self.player.pos = clamp_to_rect(
            self.player.pos,
            Vec2::splat(r),
            Vec2::new(GAME_WIDTH - r, GAME_HEIGHT - r),
        );

        if self.cooldown_ms > 0.0 {
            return;
        }
        let reach = self.tuning.interaction_radius;
        let pos = self.player.pos;
        if let Some(island) = self.islands.iter().find(|island| island.pos.distance(pos) < reach) {
            log::debug!("Reached {}", island.name);
            let dialog = island_dialog(island);
            self.dialog.show(dialog);
        }
    }

    /// Press a dialog button; entering an island returns the navigation
    pub fn choose(&mut self, index: usize) -> Option<Navigation> {
        let action = self.dialog.choose(index)?;
        self.apply(action)
    }

    pub fn choose_primary(&mut self) -> Option<Navigation> {
        let action = self.dialog.choose_primary()?;
        self.apply(action)
    }

    fn apply(&mut self, action: MapAction) -> Option<Navigation> {
        match action {
            MapAction::Enter(id) => {
                log::info!("Entering island {}", id);
                Some(Navigation::EnterLevel(id))
            }
            MapAction::Back | MapAction::Ok => {
                self.cooldown_ms = self.tuning.dismiss_cooldown_ms;
                None
            }
        }
    }
}

fn island_dialog(island: &IslandMarker) -> Dialog<MapAction> {
    if island.unlocked {
        Dialog::new(island.name.clone())
            .line(island.description.clone())
            .primary("Enter", MapAction::Enter(island.id))
            .button("Back", MapAction::Back)
    } else {
        Dialog::new(island.name.clone())
            .line("Complete the previous island to unlock!")
            .primary("OK", MapAction::Ok)
    }
}
