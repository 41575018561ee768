//! Lizard's Journey - island hopping bug catcher
//!
//! Core modules:
//! - `sim`: Deterministic simulation (movement, confinement, insects, bird hazard, rounds)
//! - `persistence`: Save record and progress store with graceful fallback
//! - `platform`: Input arbitration and blob storage backends (LocalStorage on web)
//! - `tuning`: Data-driven game balance

pub mod persistence;
pub mod platform;
pub mod sim;
pub mod tuning;

pub use persistence::{BestScore, ProgressStore, SaveRecord, SaveStore};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep in milliseconds (120 Hz)
    pub const SIM_DT_MS: f32 = 1000.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Screen/world dimensions
    pub const GAME_WIDTH: f32 = 800.0;
    pub const GAME_HEIGHT: f32 = 600.0;

    /// Island play areas sit slightly below screen center (HUD bar on top)
    pub const ISLAND_CENTER_X: f32 = GAME_WIDTH / 2.0;
    pub const ISLAND_CENTER_Y: f32 = GAME_HEIGHT / 2.0 + 20.0;

    /// Lizard defaults
    pub const LIZARD_SIZE: f32 = 32.0;
    pub const LIZARD_RADIUS: f32 = LIZARD_SIZE / 2.0;
    /// Walking speed on land (pixels/s)
    pub const LIZARD_WALK_SPEED: f32 = 180.0;
    /// Swimming speed (pixels/s)
    pub const LIZARD_SWIM_SPEED: f32 = 120.0;

    /// Insect steering: jitter retiming base interval (ms), divided by jitter magnitude
    pub const BASE_JITTER_INTERVAL_MS: f32 = 500.0;
    /// Insects outside this fraction of the boundary radius head straight home
    pub const INSECT_RECALL_FRACTION: f32 = 0.8;

    /// Bird hazard
    pub const MIN_SHADOW_SIZE: f32 = 20.0;
    pub const MAX_SHADOW_SIZE: f32 = 70.0;
    pub const ATTACK_DURATION_MS: f32 = 4500.0;
    pub const COOLDOWN_MIN_MS: u32 = 6000;
    pub const COOLDOWN_MAX_MS: u32 = 14000;
    /// First attack comes sooner than later ones
    pub const FIRST_COOLDOWN_MIN_MS: u32 = 3000;
    pub const FIRST_COOLDOWN_MAX_MS: u32 = 5000;
    /// Telegraph appears this far from the player when an attack starts
    pub const STRIKE_OFFSET_MIN: f32 = 50.0;
    pub const STRIKE_OFFSET_MAX: f32 = 100.0;

    /// Round clock period (ms) and win bonus per remaining second
    pub const CLOCK_PERIOD_MS: f32 = 1000.0;
    pub const TIME_BONUS_PER_SECOND: u32 = 10;

    /// World map
    pub const INTERACTION_RADIUS: f32 = 60.0;
    pub const DISMISS_COOLDOWN_MS: f32 = 1000.0;
    pub const RETURN_COOLDOWN_MS: f32 = 1500.0;

    /// On-screen joystick thumb travel (pixels)
    pub const JOYSTICK_MAX_DISTANCE: f32 = 40.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Frame-rate independent lerp factor.
///
/// `per_frame` is a blend amount tuned for one 60 Hz frame; this rescales
/// it for an arbitrary `dt_ms`.
#[inline]
pub fn frame_lerp_factor(per_frame: f32, dt_ms: f32) -> f32 {
    let frames = dt_ms / (1000.0 / 60.0);
    (1.0 - (1.0 - per_frame).powf(frames)).clamp(0.0, 1.0)
}
