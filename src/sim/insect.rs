//! Insects: autonomous wandering bugs the lizard hunts
//!
//! Each insect keeps a unit heading that is nudged at random on a timer
//! ("jitter"), snaps back toward the island center when it strays too far,
//! and moves at a speed fixed by its kind.

use std::f32::consts::{PI, TAU};

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::{confine_to_ellipse, push_out_of_obstacle};
use super::geometry::{Ellipse, PlayArea};
use crate::normalize_angle;
use crate::tuning::InsectTuning;

/// Insect species
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InsectKind {
    /// Fast, erratic, cheap
    Fly,
    /// Slow and steady
    Beetle,
    /// Quick hopper
    Cricket,
    /// Fastest and most valuable
    Dragonfly,
}

/// Attributes derived from an insect's kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KindStats {
    /// Pixels per second
    pub speed: f32,
    pub points: u32,
    /// Body diameter
    pub size: f32,
    /// Steering jitter magnitude (0..1); higher turns more often and harder
    pub jitter: f32,
}

impl InsectKind {
    pub const ALL: [InsectKind; 4] = [
        InsectKind::Fly,
        InsectKind::Beetle,
        InsectKind::Cricket,
        InsectKind::Dragonfly,
    ];

    pub const fn stats(self) -> KindStats {
        match self {
            InsectKind::Fly => KindStats {
                speed: 60.0,
                points: 1,
                size: 8.0,
                jitter: 0.8,
            },
            InsectKind::Beetle => KindStats {
                speed: 30.0,
                points: 2,
                size: 12.0,
                jitter: 0.3,
            },
            InsectKind::Cricket => KindStats {
                speed: 80.0,
                points: 2,
                size: 10.0,
                jitter: 0.5,
            },
            InsectKind::Dragonfly => KindStats {
                speed: 100.0,
                points: 3,
                size: 14.0,
                jitter: 0.9,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InsectKind::Fly => "fly",
            InsectKind::Beetle => "beetle",
            InsectKind::Cricket => "cricket",
            InsectKind::Dragonfly => "dragonfly",
        }
    }

    #[inline]
    pub fn points(self) -> u32 {
        self.stats().points
    }

    #[inline]
    pub fn radius(self) -> f32 {
        self.stats().size / 2.0
    }

    /// Time between heading resamples
    #[inline]
    pub fn jitter_interval_ms(self, base_interval_ms: f32) -> f32 {
        base_interval_ms / self.stats().jitter
    }
}

/// Random heading change for one resample, in `[-0.5, 0.5]·π·jitter`
pub fn jitter_offset<R: Rng + ?Sized>(kind: InsectKind, rng: &mut R) -> f32 {
    (rng.random::<f32>() - 0.5) * PI * kind.stats().jitter
}

/// Uniform pick from a kind pool; repeated entries weight the draw
pub fn pick_kind<R: Rng + ?Sized>(pool: &[InsectKind], rng: &mut R) -> Option<InsectKind> {
    if pool.is_empty() {
        return None;
    }
    Some(pool[rng.random_range(0..pool.len())])
}

/// A live insect
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insect {
    pub id: u32,
    pub kind: InsectKind,
    pub pos: Vec2,
    /// Unit heading
    pub heading: Vec2,
    pub vel: Vec2,
    /// Facing angle (radians) for rendering
    pub facing: f32,
    /// Time since the last heading resample
    pub jitter_clock_ms: f32,
    /// Difficulty multiplier fixed at spawn (tree canopies only)
    pub speed_multiplier: f32,
    /// Island the insect lives on
    pub area: PlayArea,
}

impl Insect {
    /// Spawn facing a random direction
    pub fn new<R: Rng + ?Sized>(
        id: u32,
        kind: InsectKind,
        pos: Vec2,
        area: PlayArea,
        rng: &mut R,
    ) -> Self {
        let angle = rng.random_range(0.0..TAU);
        let heading = Vec2::from_angle(angle);
        Self {
            id,
            kind,
            pos,
            heading,
            vel: Vec2::ZERO,
            facing: angle,
            jitter_clock_ms: 0.0,
            speed_multiplier: 1.0,
            area,
        }
    }

    pub fn with_speed_multiplier(mut self, multiplier: f32) -> Self {
        self.speed_multiplier = multiplier;
        self
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.kind.stats().speed * self.speed_multiplier
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.kind.radius()
    }

    #[inline]
    pub fn points(&self) -> u32 {
        self.kind.points()
    }

    /// Advance steering and position by `dt_ms`
    pub fn advance<R: Rng + ?Sized>(&mut self, dt_ms: f32, tuning: &InsectTuning, rng: &mut R) {
        // Jitter: resample heading on a kind-dependent timer
        self.jitter_clock_ms += dt_ms;
        if self.jitter_clock_ms >= self.kind.jitter_interval_ms(tuning.base_jitter_interval_ms) {
            self.jitter_clock_ms = 0.0;
            let angle = normalize_angle(self.heading.y.atan2(self.heading.x) + jitter_offset(self.kind, rng));
            self.heading = Vec2::from_angle(angle);
        }

        // Hard recall toward the island center
        let to_center = self.area.center - self.pos;
        if to_center.length() > self.area.radius * tuning.recall_fraction {
            let home = to_center.normalize_or_zero();
            if home != Vec2::ZERO {
                self.heading = home;
            }
        }

        self.vel = self.heading * self.speed();
        self.pos += self.vel * (dt_ms / 1000.0);
        self.facing = self.heading.y.atan2(self.heading.x);

        let confined = confine_to_ellipse(self.pos, self.vel, &self.area.inset(self.radius()));
        self.pos = confined.position;
        self.vel = confined.velocity;
    }

    /// Push out of rocks and turn away from them. Returns true on contact.
    pub fn avoid_obstacles(&mut self, obstacles: &[Ellipse]) -> bool {
        let mut touched = false;
        for rock in obstacles {
            if let Some(pushed) = push_out_of_obstacle(self.pos, self.radius(), rock) {
                self.pos = pushed;
                let away = (pushed - rock.center).normalize_or_zero();
                if away != Vec2::ZERO {
                    self.heading = away;
                    self.facing = away.y.atan2(away.x);
                }
                touched = true;
            }
        }
        touched
    }
}

/// A region insects must not spawn in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NoSpawnZone {
    /// Disc relative to the island center (e.g. a tree trunk)
    Disc { offset: Vec2, radius: f32 },
}

impl NoSpawnZone {
    fn blocks(&self, area: &PlayArea, point: Vec2) -> bool {
        match *self {
            NoSpawnZone::Disc { offset, radius } => point.distance(area.center + offset) < radius,
        }
    }
}

/// Where new insects may appear
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnRules {
    /// Minimum radial distance from the island center
    pub min_distance: f32,
    /// Gap kept between the spawn band and the island radius
    pub edge_margin: f32,
    pub max_attempts: u32,
    /// Safe point (relative to the center) used when every attempt is rejected
    pub fallback_offset: Vec2,
    /// Rocks reject points whose ellipse metric is below this
    pub obstacle_clearance: f32,
    pub no_spawn: Vec<NoSpawnZone>,
}

impl Default for SpawnRules {
    fn default() -> Self {
        Self {
            min_distance: 60.0,
            edge_margin: 20.0,
            max_attempts: 20,
            fallback_offset: Vec2::new(0.0, 60.0),
            obstacle_clearance: 1.3,
            no_spawn: Vec::new(),
        }
    }
}

impl SpawnRules {
    fn rejects(&self, area: &PlayArea, obstacles: &[Ellipse], point: Vec2) -> bool {
        self.no_spawn.iter().any(|zone| zone.blocks(area, point))
            || obstacles
                .iter()
                .any(|rock| rock.metric(point) < self.obstacle_clearance)
    }
}

/// Pick a spawn point: uniform angle, uniform radial distance in
/// `[min_distance, radius − edge_margin]`, squashed to the island's aspect.
pub fn spawn_position<R: Rng + ?Sized>(
    area: &PlayArea,
    rules: &SpawnRules,
    obstacles: &[Ellipse],
    rng: &mut R,
) -> Vec2 {
    let max_distance = (area.radius - rules.edge_margin).max(rules.min_distance);
    for _ in 0..rules.max_attempts {
        let angle = rng.random_range(0.0..TAU);
        let distance = rules.min_distance + rng.random::<f32>() * (max_distance - rules.min_distance);
        let point = area.polar_point(angle, distance);
        if !rules.rejects(area, obstacles, point) {
            return point;
        }
    }
    area.center + rules.fallback_offset
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn origin_area() -> PlayArea {
        PlayArea::new(Vec2::ZERO, 250.0, 0.8)
    }

    #[test]
    fn test_fly_moves_in_straight_line_between_resamples() {
        let mut rng = Pcg32::seed_from_u64(7);
        let tuning = InsectTuning::default();
        let mut fly = Insect::new(1, InsectKind::Fly, Vec2::ZERO, origin_area(), &mut rng);
        let heading = fly.heading;

        // Fly resamples every 625 ms; 100 ms is well short of that
        fly.advance(100.0, &tuning, &mut rng);

        let expected = heading * 60.0 * 0.1;
        assert!((fly.pos - expected).length() < 1e-4);
        assert!(origin_area().outline().contains(fly.pos));
        assert_eq!(fly.points(), 1);
    }

    #[test]
    fn test_stray_insect_is_recalled() {
        let mut rng = Pcg32::seed_from_u64(3);
        let tuning = InsectTuning::default();
        let mut beetle = Insect::new(1, InsectKind::Beetle, Vec2::new(210.0, 0.0), origin_area(), &mut rng);
        beetle.heading = Vec2::X;

        beetle.advance(16.0, &tuning, &mut rng);
        assert!((beetle.heading - Vec2::NEG_X).length() < 1e-6);
        assert!(beetle.pos.x < 210.0);
    }

    #[test]
    fn test_insect_stays_on_island() {
        let mut rng = Pcg32::seed_from_u64(11);
        let tuning = InsectTuning::default();
        let area = origin_area();
        let mut dragonfly = Insect::new(1, InsectKind::Dragonfly, Vec2::new(0.0, 150.0), area, &mut rng);
        for _ in 0..2000 {
            dragonfly.advance(16.0, &tuning, &mut rng);
            assert!(area.inset(dragonfly.radius()).metric(dragonfly.pos) <= 1.0 + 1e-3);
        }
    }

    #[test]
    fn test_speed_multiplier() {
        let mut rng = Pcg32::seed_from_u64(1);
        let cricket = Insect::new(1, InsectKind::Cricket, Vec2::ZERO, origin_area(), &mut rng)
            .with_speed_multiplier(1.4);
        assert!((cricket.speed() - 112.0).abs() < 1e-4);
        // Kind stats never change
        assert_eq!(InsectKind::Cricket.stats().speed, 80.0);
    }

    #[test]
    fn test_avoid_obstacles_turns_away() {
        let mut rng = Pcg32::seed_from_u64(5);
        let rock = Ellipse::new(Vec2::new(50.0, 0.0), 30.0, 20.0);
        let mut beetle = Insect::new(1, InsectKind::Beetle, Vec2::new(35.0, 0.0), origin_area(), &mut rng);
        assert!(beetle.avoid_obstacles(&[rock]));
        assert!(rock.inflate(beetle.radius()).metric(beetle.pos) >= 1.0 - 1e-4);
        assert!(beetle.heading.x < 0.0);
    }

    #[test]
    fn test_spawn_respects_rocks_and_band() {
        let mut rng = Pcg32::seed_from_u64(42);
        let area = PlayArea::new(Vec2::new(400.0, 320.0), 230.0, 0.8);
        let rocks = [Ellipse::new(Vec2::new(320.0, 280.0), 45.0, 30.0)];
        let rules = SpawnRules {
            min_distance: 50.0,
            max_attempts: 30,
            ..Default::default()
        };
        for _ in 0..200 {
            let p = spawn_position(&area, &rules, &rocks, &mut rng);
            let fallback = area.center + rules.fallback_offset;
            assert!(p == fallback || rocks[0].metric(p) >= 1.3);
            assert!(area.outline().contains(p));
        }
    }

    #[test]
    fn test_spawn_falls_back_when_everything_blocked() {
        let mut rng = Pcg32::seed_from_u64(9);
        let area = origin_area();
        let rules = SpawnRules {
            no_spawn: vec![NoSpawnZone::Disc {
                offset: Vec2::ZERO,
                radius: 1000.0,
            }],
            ..Default::default()
        };
        assert_eq!(spawn_position(&area, &rules, &[], &mut rng), Vec2::new(0.0, 60.0));
    }

    #[test]
    fn test_all_kinds_listed_once() {
        let points: u32 = InsectKind::ALL.iter().map(|k| k.points()).sum();
        assert_eq!(points, 1 + 2 + 2 + 3);
        for (i, a) in InsectKind::ALL.iter().enumerate() {
            assert!(InsectKind::ALL[i + 1..].iter().all(|b| b != a));
        }
    }

    #[test]
    fn test_pick_kind_uses_pool() {
        let mut rng = Pcg32::seed_from_u64(2);
        assert_eq!(pick_kind(&[], &mut rng), None);
        for _ in 0..50 {
            let kind = pick_kind(&[InsectKind::Beetle, InsectKind::Fly], &mut rng).unwrap();
            assert!(matches!(kind, InsectKind::Beetle | InsectKind::Fly));
        }
    }

    proptest! {
        #[test]
        fn prop_jitter_bounded_by_magnitude(seed in any::<u64>(), kind_idx in 0usize..4) {
            let kind = InsectKind::ALL[kind_idx];
            let mut rng = Pcg32::seed_from_u64(seed);
            for _ in 0..32 {
                let offset = jitter_offset(kind, &mut rng);
                prop_assert!(offset.abs() <= PI * kind.stats().jitter);
            }
        }

        #[test]
        fn prop_resample_turn_is_bounded(seed in any::<u64>(), kind_idx in 0usize..4) {
            let kind = InsectKind::ALL[kind_idx];
            let tuning = InsectTuning::default();
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut insect = Insect::new(1, kind, Vec2::ZERO, origin_area(), &mut rng);
            let before = insect.heading;
            // Exactly one resample, no recall (insect starts at the center)
            insect.advance(kind.jitter_interval_ms(tuning.base_jitter_interval_ms), &tuning, &mut rng);
            let turn = before.angle_to(insect.heading).abs();
            prop_assert!(turn <= PI * kind.stats().jitter + 1e-4);
        }
    }
}
