//! Data-driven game balance
//!
//! Every field defaults to the constants in [`crate::consts`]; a JSON
//! document only needs to name the values it overrides.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Lizard movement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Land speed (pixels/s)
    pub walk_speed: f32,
    /// Water speed (pixels/s)
    pub swim_speed: f32,
    /// Collision radius
    pub radius: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            walk_speed: LIZARD_WALK_SPEED,
            swim_speed: LIZARD_SWIM_SPEED,
            radius: LIZARD_RADIUS,
        }
    }
}

/// Bird attack timing and telegraph behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HazardTuning {
    pub min_shadow_size: f32,
    pub max_shadow_size: f32,
    pub attack_duration_ms: f32,
    pub cooldown_min_ms: u32,
    pub cooldown_max_ms: u32,
    pub first_cooldown_min_ms: u32,
    pub first_cooldown_max_ms: u32,
    pub strike_offset_min: f32,
    pub strike_offset_max: f32,
    /// Per-frame (60 Hz) blend toward the growing size target while attacking
    pub attack_size_smoothing: f32,
    /// Per-frame blend back toward minimum size while circling
    pub dormant_size_smoothing: f32,
    /// Tracking speed is `track_speed_base + progress × track_speed_ramp` (1/s)
    pub track_speed_base: f32,
    pub track_speed_ramp: f32,
    /// Jump applied after a strike, scaled by a random unit direction
    pub escape_offset: Vec2,
    pub orbit_radius: f32,
    /// Vertical squash of the circling orbit
    pub orbit_squash: f32,
    /// Orbit angular speed (rad/s)
    pub orbit_speed: f32,
    /// Per-frame blend of the orbit center toward the player
    pub orbit_follow: f32,
    /// Orbit is kept within this fraction of the island radius
    pub orbit_limit: f32,
}

impl Default for HazardTuning {
    fn default() -> Self {
        Self {
            min_shadow_size: MIN_SHADOW_SIZE,
            max_shadow_size: MAX_SHADOW_SIZE,
            attack_duration_ms: ATTACK_DURATION_MS,
            cooldown_min_ms: COOLDOWN_MIN_MS,
            cooldown_max_ms: COOLDOWN_MAX_MS,
            first_cooldown_min_ms: FIRST_COOLDOWN_MIN_MS,
            first_cooldown_max_ms: FIRST_COOLDOWN_MAX_MS,
            strike_offset_min: STRIKE_OFFSET_MIN,
            strike_offset_max: STRIKE_OFFSET_MAX,
            attack_size_smoothing: 0.15,
            dormant_size_smoothing: 0.1,
            track_speed_base: 1.5,
            track_speed_ramp: 2.0,
            escape_offset: Vec2::new(80.0, 40.0),
            orbit_radius: 100.0,
            orbit_squash: 0.5,
            orbit_speed: 1.0,
            orbit_follow: 0.02,
            orbit_limit: 0.85,
        }
    }
}

/// Insect steering
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InsectTuning {
    pub base_jitter_interval_ms: f32,
    pub recall_fraction: f32,
}

impl Default for InsectTuning {
    fn default() -> Self {
        Self {
            base_jitter_interval_ms: BASE_JITTER_INTERVAL_MS,
            recall_fraction: INSECT_RECALL_FRACTION,
        }
    }
}

/// Island-hopping map
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldMapTuning {
    pub interaction_radius: f32,
    pub dismiss_cooldown_ms: f32,
    pub return_cooldown_ms: f32,
}

impl Default for WorldMapTuning {
    fn default() -> Self {
        Self {
            interaction_radius: INTERACTION_RADIUS,
            dismiss_cooldown_ms: DISMISS_COOLDOWN_MS,
            return_cooldown_ms: RETURN_COOLDOWN_MS,
        }
    }
}

/// All balance knobs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub player: PlayerTuning,
    pub hazard: HazardTuning,
    pub insects: InsectTuning,
    pub world_map: WorldMapTuning,
}

impl Tuning {
    /// Parse a (possibly partial) tuning document
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut tuning: Tuning = serde_json::from_str(json)?;
        tuning.sanitize();
        Ok(tuning)
    }

    /// Parse if given, otherwise defaults. Bad documents are logged and ignored.
    pub fn from_json_or_default(json: Option<&str>) -> Self {
        match json.map(Self::from_json) {
            Some(Ok(tuning)) => {
                log::info!("Loaded tuning overrides");
                tuning
            }
            Some(Err(e)) => {
                log::warn!("Ignoring malformed tuning: {}", e);
                Self::default()
            }
            None => Self::default(),
        }
    }

    /// Repair ranges a hand-edited document could invert
    fn sanitize(&mut self) {
        let h = &mut self.hazard;
        if h.cooldown_min_ms > h.cooldown_max_ms {
            std::mem::swap(&mut h.cooldown_min_ms, &mut h.cooldown_max_ms);
        }
        if h.first_cooldown_min_ms > h.first_cooldown_max_ms {
            std::mem::swap(&mut h.first_cooldown_min_ms, &mut h.first_cooldown_max_ms);
        }
        if h.strike_offset_min > h.strike_offset_max {
            std::mem::swap(&mut h.strike_offset_min, &mut h.strike_offset_max);
        }
        if h.min_shadow_size > h.max_shadow_size {
            std::mem::swap(&mut h.min_shadow_size, &mut h.max_shadow_size);
        }
        h.attack_duration_ms = h.attack_duration_ms.max(1.0);
        self.insects.base_jitter_interval_ms = self.insects.base_jitter_interval_ms.max(1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_document_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "player": { "walk_speed": 200.0 } }"#).unwrap();
        assert_eq!(tuning.player.walk_speed, 200.0);
        assert_eq!(tuning.player.swim_speed, LIZARD_SWIM_SPEED);
        assert_eq!(tuning.hazard.cooldown_max_ms, COOLDOWN_MAX_MS);
    }

    #[test]
    fn test_inverted_ranges_are_repaired() {
        let tuning =
            Tuning::from_json(r#"{ "hazard": { "cooldown_min_ms": 9000, "cooldown_max_ms": 100 } }"#)
                .unwrap();
        assert_eq!(tuning.hazard.cooldown_min_ms, 100);
        assert_eq!(tuning.hazard.cooldown_max_ms, 9000);
    }

    #[test]
    fn test_malformed_falls_back() {
        let tuning = Tuning::from_json_or_default(Some("{ not json"));
        assert_eq!(tuning.player.walk_speed, LIZARD_WALK_SPEED);
    }
}
