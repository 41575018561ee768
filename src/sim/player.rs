//! The player's lizard

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{confine_to_ellipse, push_out_of_obstacle};
use super::geometry::{Ellipse, PlayArea};
use crate::tuning::PlayerTuning;

/// Movement mode; swimming is slower than walking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveMode {
    Walking,
    Swimming,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Facing angle (radians), unchanged while idle
    pub facing: f32,
    pub mode: MoveMode,
    pub radius: f32,
    walk_speed: f32,
    swim_speed: f32,
}

impl Player {
    pub fn new(pos: Vec2, mode: MoveMode, tuning: &PlayerTuning) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            facing: 0.0,
            mode,
            radius: tuning.radius,
            walk_speed: tuning.walk_speed,
            swim_speed: tuning.swim_speed,
        }
    }

    pub fn set_mode(&mut self, mode: MoveMode) {
        self.mode = mode;
    }

    #[inline]
    pub fn current_speed(&self) -> f32 {
        match self.mode {
            MoveMode::Walking => self.walk_speed,
            MoveMode::Swimming => self.swim_speed,
        }
    }

    pub fn stop(&mut self) {
        self.vel = Vec2::ZERO;
    }

    /// Steer from a direction input and integrate position.
    ///
    /// Zero input stops the lizard without turning it.
    pub fn steer(&mut self, input: Vec2, dt_ms: f32) {
        let dir = input.normalize_or_zero();
        if dir == Vec2::ZERO {
            self.vel = Vec2::ZERO;
            return;
        }
        self.vel = dir * self.current_speed();
        self.facing = input.y.atan2(input.x);
        self.pos += self.vel * (dt_ms / 1000.0);
    }

    /// Shoreline confinement: snap back inside and keep sliding
    pub fn confine(&mut self, area: &PlayArea) -> bool {
        let result = confine_to_ellipse(self.pos, self.vel, &area.inset(self.radius));
        self.pos = result.position;
        self.vel = result.velocity;
        result.hit
    }

    /// Rocks are hard stops: push to the rim and zero velocity
    pub fn resolve_obstacles(&mut self, obstacles: &[Ellipse]) -> bool {
        let mut hit = false;
        for rock in obstacles {
            if let Some(pushed) = push_out_of_obstacle(self.pos, self.radius, rock) {
                self.pos = pushed;
                self.vel = Vec2::ZERO;
                hit = true;
            }
        }
        hit
    }

    /// Full island step: steer, confine to the shore, then clear rocks
    pub fn advance(&mut self, input: Vec2, dt_ms: f32, area: &PlayArea, obstacles: &[Ellipse]) {
        self.steer(input, dt_ms);
        self.confine(area);
        self.resolve_obstacles(obstacles);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lizard(pos: Vec2) -> Player {
        Player::new(pos, MoveMode::Walking, &PlayerTuning::default())
    }

    #[test]
    fn test_diagonal_input_is_normalized() {
        let mut p = lizard(Vec2::ZERO);
        p.steer(Vec2::new(1.0, 1.0), 1000.0);
        assert!((p.vel.length() - 180.0).abs() < 1e-3);
        assert!((p.facing - std::f32::consts::FRAC_PI_4).abs() < 1e-6);
    }

    #[test]
    fn test_zero_input_stops_without_turning() {
        let mut p = lizard(Vec2::ZERO);
        p.steer(Vec2::new(0.0, -1.0), 100.0);
        let facing = p.facing;
        let pos = p.pos;
        p.steer(Vec2::ZERO, 100.0);
        assert_eq!(p.vel, Vec2::ZERO);
        assert_eq!(p.facing, facing);
        assert_eq!(p.pos, pos);
    }

    #[test]
    fn test_swimming_is_slower() {
        let mut p = lizard(Vec2::ZERO);
        p.set_mode(MoveMode::Swimming);
        p.steer(Vec2::X, 1000.0);
        assert!((p.pos.x - 120.0).abs() < 1e-3);
    }

    #[test]
    fn test_shore_keeps_tangential_motion() {
        let area = PlayArea::new(Vec2::ZERO, 250.0, 0.8);
        // Right-most inset point, pushing right and down
        let mut p = lizard(Vec2::new(234.0, 0.0));
        p.advance(Vec2::new(1.0, 1.0), 16.0, &area, &[]);
        assert!(area.inset(p.radius).metric(p.pos) <= 1.0 + 1e-4);
        assert!(p.vel.y > 0.0);
        let n = area.inset(p.radius).outward_normal_at(p.pos);
        assert!(p.vel.dot(n) <= 1e-3);
    }

    #[test]
    fn test_rock_is_hard_stop() {
        let area = PlayArea::new(Vec2::ZERO, 250.0, 0.8);
        let rock = Ellipse::new(Vec2::new(60.0, 0.0), 30.0, 20.0);
        let mut p = lizard(Vec2::new(10.0, 0.0));
        p.advance(Vec2::X, 50.0, &area, &[rock]);
        assert_eq!(p.vel, Vec2::ZERO);
        assert!((rock.inflate(p.radius).metric(p.pos) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_standing_on_rock_rim_stops() {
        let rock = Ellipse::new(Vec2::new(60.0, 0.0), 30.0, 20.0);
        let mut p = lizard(Vec2::new(14.0, 0.0));
        p.vel = Vec2::new(100.0, 0.0);
        assert!(p.resolve_obstacles(&[rock]));
        assert_eq!(p.vel, Vec2::ZERO);
    }
}
