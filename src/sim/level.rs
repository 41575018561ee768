//! Per-level configuration and the island catalog
//!
//! Levels differ only in data: island shape, rocks, which insects live there,
//! targets and timers. The jungle level swaps the timed round for a sequence
//! of trees to climb.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{Ellipse, PlayArea};
use super::insect::{InsectKind, NoSpawnZone, SpawnRules};
use crate::consts::*;
use crate::persistence::LevelId;

use InsectKind::{Beetle, Cricket, Dragonfly, Fly};

/// One island level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub id: LevelId,
    pub name: String,
    /// Shown in the world map dialog
    pub description: String,
    /// Island marker on the world map
    pub map_pos: Vec2,
    /// Level unlocked by winning this one
    pub unlocks: Option<LevelId>,
    pub mode: LevelMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LevelMode {
    /// Catch a target number of insects before the clock runs out
    Timed(IslandLayout),
    /// Clear a sequence of tree canopies, no clock
    Climbing(ClimbLayout),
}

/// A timed catching round on one island
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IslandLayout {
    pub area: PlayArea,
    /// Rocks (hard walls)
    pub obstacles: Vec<Ellipse>,
    pub spawn: SpawnRules,
    /// Insects placed at round start
    pub initial_kinds: Vec<InsectKind>,
    /// Replacement insects are drawn uniformly from here (repeats weight the draw)
    pub respawn_pool: Vec<InsectKind>,
    pub min_population: usize,
    pub win_target: u32,
    pub time_limit_s: u32,
    /// Bird attacks enabled
    pub hazard: bool,
    pub player_start: Vec2,
}

/// One tree of the climbing level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeStage {
    /// Trunk position on the jungle floor
    pub marker: Vec2,
    /// Insects to catch in this canopy
    pub quota: u32,
    pub kinds: Vec<InsectKind>,
    /// Applied to every insect spawned in this canopy
    pub speed_multiplier: f32,
}

/// The climbing level: a walkable floor and a canopy per tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimbLayout {
    pub trees: Vec<TreeStage>,
    /// Walkable floor rectangle
    pub ground_min: Vec2,
    pub ground_max: Vec2,
    pub ground_start: Vec2,
    /// How close the lizard must get to the next trunk
    pub tree_reach: f32,
    /// Frozen transition between floor and canopy
    pub climb_duration_ms: f32,
    pub canopy: PlayArea,
    pub canopy_spawn: SpawnRules,
    /// Lizard start relative to the canopy center
    pub canopy_start_offset: Vec2,
    /// Extra insects above the tree's quota
    pub canopy_extra: usize,
}

impl ClimbLayout {
    /// Insects needed to clear every tree
    pub fn total_quota(&self) -> u32 {
        self.trees.iter().map(|t| t.quota).sum()
    }
}

impl LevelConfig {
    /// Insects needed to win (sum of tree quotas when climbing)
    pub fn win_target(&self) -> u32 {
        match &self.mode {
            LevelMode::Timed(island) => island.win_target,
            LevelMode::Climbing(climb) => climb.total_quota(),
        }
    }

    /// Round length, if the level has a clock
    pub fn time_limit_s(&self) -> Option<u32> {
        match &self.mode {
            LevelMode::Timed(island) => Some(island.time_limit_s),
            LevelMode::Climbing(_) => None,
        }
    }

    pub fn by_id(id: LevelId) -> Option<LevelConfig> {
        catalog().into_iter().find(|level| level.id == id)
    }
}

fn island_center() -> Vec2 {
    Vec2::new(ISLAND_CENTER_X, ISLAND_CENTER_Y)
}

fn starter_grove() -> LevelConfig {
    let area = PlayArea::new(island_center(), 250.0, 0.8);
    LevelConfig {
        id: 1,
        name: "Starter Grove".into(),
        description: "A small island with one tree. Catch 10 bugs to advance!".into(),
        map_pos: Vec2::new(150.0, 300.0),
        unlocks: Some(2),
        mode: LevelMode::Timed(IslandLayout {
            area,
            obstacles: Vec::new(),
            spawn: SpawnRules {
                min_distance: 60.0,
                edge_margin: 20.0,
                max_attempts: 20,
                // Palm tree trunk
                no_spawn: vec![NoSpawnZone::Disc {
                    offset: Vec2::new(0.0, -30.0),
                    radius: 60.0,
                }],
                ..Default::default()
            },
            initial_kinds: vec![Fly, Fly, Fly, Beetle, Beetle, Cricket, Cricket, Dragonfly],
            respawn_pool: vec![Fly, Fly, Beetle, Cricket, Dragonfly],
            min_population: 8,
            win_target: 10,
            time_limit_s: 60,
            hazard: true,
            player_start: area.center,
        }),
    }
}

fn rocky_shore() -> LevelConfig {
    let area = PlayArea::new(island_center(), 230.0, 0.8);
    let c = area.center;
    let rock = |x: f32, y: f32, rx: f32, ry: f32| Ellipse::new(c + Vec2::new(x, y), rx, ry);
    LevelConfig {
        id: 2,
        name: "Rocky Shore".into(),
        description: "Navigate around rocks to catch 15 bugs. Watch out for the bird!".into(),
        map_pos: Vec2::new(400.0, 200.0),
        unlocks: Some(3),
        mode: LevelMode::Timed(IslandLayout {
            area,
            obstacles: vec![
                rock(-80.0, -40.0, 45.0, 30.0),
                rock(70.0, -60.0, 35.0, 25.0),
                rock(-50.0, 50.0, 30.0, 22.0),
                rock(90.0, 30.0, 40.0, 28.0),
                rock(0.0, -80.0, 50.0, 35.0),
            ],
            spawn: SpawnRules {
                min_distance: 50.0,
                edge_margin: 20.0,
                max_attempts: 30,
                fallback_offset: Vec2::new(0.0, 60.0),
                obstacle_clearance: 1.3,
                no_spawn: Vec::new(),
            },
            initial_kinds: vec![
                Beetle, Beetle, Beetle, Beetle, Cricket, Cricket, Cricket, Fly, Fly, Dragonfly,
            ],
            respawn_pool: vec![Beetle, Beetle, Cricket, Cricket, Fly, Dragonfly],
            min_population: 10,
            win_target: 15,
            time_limit_s: 75,
            hazard: true,
            player_start: c + Vec2::new(0.0, 50.0),
        }),
    }
}

fn dense_jungle() -> LevelConfig {
    // (quota, kinds, speed multiplier), nearest tree first
    let table: [(u32, &[InsectKind], f32); 8] = [
        (3, &[Fly, Beetle], 0.8),
        (3, &[Fly, Beetle, Cricket], 0.9),
        (4, &[Fly, Beetle, Cricket], 1.0),
        (4, &[Beetle, Cricket, Dragonfly], 1.0),
        (5, &[Cricket, Dragonfly], 1.1),
        (5, &[Fly, Cricket, Dragonfly], 1.2),
        (6, &[Cricket, Dragonfly], 1.3),
        (6, &[Dragonfly, Dragonfly, Cricket], 1.4),
    ];
    const MARKER_X: [f32; 8] = [150.0, 220.0, 300.0, 380.0, 460.0, 540.0, 620.0, 700.0];

    let trees = table
        .iter()
        .zip(MARKER_X)
        .enumerate()
        .map(|(i, (&(quota, kinds, speed_multiplier), x))| TreeStage {
            marker: Vec2::new(x, GAME_HEIGHT - 140.0 - 10.0 * i as f32),
            quota,
            kinds: kinds.to_vec(),
            speed_multiplier,
        })
        .collect();

    LevelConfig {
        id: 3,
        name: "Dense Jungle".into(),
        description: "Climb 8 trees and catch bugs in each canopy!".into(),
        map_pos: Vec2::new(650.0, 350.0),
        unlocks: None,
        mode: LevelMode::Climbing(ClimbLayout {
            trees,
            ground_min: Vec2::new(50.0, GAME_HEIGHT - 250.0),
            ground_max: Vec2::new(GAME_WIDTH - 50.0, GAME_HEIGHT - 100.0),
            ground_start: Vec2::new(80.0, GAME_HEIGHT - 120.0),
            tree_reach: 60.0,
            climb_duration_ms: 1000.0,
            canopy: PlayArea::new(Vec2::new(GAME_WIDTH / 2.0, GAME_HEIGHT / 2.0 + 30.0), 180.0, 0.9),
            canopy_spawn: SpawnRules {
                min_distance: 30.0,
                edge_margin: 20.0,
                ..Default::default()
            },
            canopy_start_offset: Vec2::new(0.0, 50.0),
            canopy_extra: 2,
        }),
    }
}

/// All islands, in unlock order
pub fn catalog() -> Vec<LevelConfig> {
    vec![starter_grove(), rocky_shore(), dense_jungle()]
}
