//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod climb;
pub mod collision;
pub mod dialog;
pub mod geometry;
pub mod hazard;
pub mod insect;
pub mod level;
pub mod player;
pub mod state;
pub mod tick;
pub mod world_map;

pub use climb::{ClimbDirection, ClimbPhase, ClimbState};
pub use collision::{Confinement, circles_overlap, clamp_to_rect, confine_to_ellipse, push_out_of_obstacle};
pub use dialog::{Dialog, DialogButton, DialogSlot};
pub use geometry::{
    Ellipse, PlayArea, ellipse_contains, project_to_ellipse_edge, remove_outward_velocity_component,
};
pub use hazard::{HazardPhase, HazardSignal, PredatorHazard};
pub use insect::{Insect, InsectKind, NoSpawnZone, SpawnRules, spawn_position};
pub use level::{ClimbLayout, IslandLayout, LevelConfig, LevelMode, TreeStage, catalog};
pub use player::{MoveMode, Player};
pub use state::{EndCause, LevelEvent, Navigation, RoundOutcome, RoundState};
pub use tick::{FrameClock, Level, LevelAction, TickInput};
pub use world_map::{IslandMarker, MapAction, WorldMap};
