//! The bird: a periodic aerial attack with a telegraphed landing zone
//!
//! Two phases:
//! - `Dormant`: the bird circles lazily; its shadow orbits near the player
//!   and stays small. A sampled cooldown counts down to the next attack.
//! - `Attacking`: the shadow (the telegraph) appears near the player, grows
//!   toward its maximum size and homes in on the player, tracking harder as
//!   the attack window runs out. When the window closes the bird strikes
//!   whatever is under the shadow.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::PlayArea;
use crate::frame_lerp_factor;
use crate::tuning::HazardTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HazardPhase {
    /// Circling overhead, cooling down
    Dormant,
    /// Diving; the telegraph is visible
    Attacking,
}

/// Something the level controller must react to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HazardSignal {
    /// A dive began; the telegraph appeared at `at`
    AttackStarted { at: Vec2 },
    /// The dive landed
    Struck { at: Vec2, radius: f32, hit: bool },
}

/// Hit test for a landing bird
#[inline]
pub fn strike_hits(telegraph: Vec2, telegraph_radius: f32, player: Vec2, player_radius: f32) -> bool {
    telegraph.distance(player) < telegraph_radius + player_radius
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredatorHazard {
    pub phase: HazardPhase,
    /// Shadow center
    pub telegraph: Vec2,
    /// Shadow diameter
    pub shadow_size: f32,
    /// Danger marker shown (attacking only)
    pub visible: bool,
    /// Time spent in the current phase
    pub timer_ms: f32,
    /// Length of the current dormant period
    pub dormant_duration_ms: f32,
    orbit_angle: f32,
    orbit_center: Vec2,
    tuning: HazardTuning,
}

impl PredatorHazard {
    /// New bird over `area`; the first dive comes sooner than later ones
    pub fn new<R: Rng + ?Sized>(area: &PlayArea, tuning: HazardTuning, rng: &mut R) -> Self {
        let first = rng.random_range(tuning.first_cooldown_min_ms..=tuning.first_cooldown_max_ms);
        Self {
            phase: HazardPhase::Dormant,
            telegraph: area.center,
            shadow_size: tuning.min_shadow_size,
            visible: false,
            timer_ms: 0.0,
            dormant_duration_ms: first as f32,
            orbit_angle: rng.random_range(0.0..TAU),
            orbit_center: area.center,
            tuning,
        }
    }

    #[inline]
    pub fn is_attacking(&self) -> bool {
        self.phase == HazardPhase::Attacking
    }

    /// Attack progress in [0, 1]; 0 while dormant
    pub fn progress(&self) -> f32 {
        match self.phase {
            HazardPhase::Attacking => (self.timer_ms / self.tuning.attack_duration_ms).min(1.0),
            HazardPhase::Dormant => 0.0,
        }
    }

    #[inline]
    pub fn telegraph_radius(&self) -> f32 {
        self.shadow_size / 2.0
    }

    /// Time left before the next dive (dormant only)
    pub fn time_until_attack_ms(&self) -> Option<f32> {
        match self.phase {
            HazardPhase::Dormant => Some((self.dormant_duration_ms - self.timer_ms).max(0.0)),
            HazardPhase::Attacking => None,
        }
    }

    /// Advance the bird by `dt_ms`
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        dt_ms: f32,
        player_pos: Vec2,
        player_radius: f32,
        area: &PlayArea,
        rng: &mut R,
    ) -> Option<HazardSignal> {
        // The orbit center drifts after the player in both phases
        let follow = frame_lerp_factor(self.tuning.orbit_follow, dt_ms);
        self.orbit_center = self.orbit_center.lerp(player_pos, follow);

        match self.phase {
            HazardPhase::Dormant => self.advance_dormant(dt_ms, player_pos, area, rng),
            HazardPhase::Attacking => self.advance_attacking(dt_ms, player_pos, player_radius, rng),
        }
    }

    fn advance_dormant<R: Rng + ?Sized>(
        &mut self,
        dt_ms: f32,
        player_pos: Vec2,
        area: &PlayArea,
        rng: &mut R,
    ) -> Option<HazardSignal> {
        let t = &self.tuning;
        self.orbit_angle = (self.orbit_angle + t.orbit_speed * dt_ms / 1000.0) % TAU;

        let orbit = Vec2::new(
            self.orbit_angle.cos() * t.orbit_radius,
            self.orbit_angle.sin() * t.orbit_radius * t.orbit_squash,
        );
        let mut shadow = self.orbit_center + orbit;
        let limit = area.radius * t.orbit_limit;
        let from_center = shadow - area.center;
        if from_center.length() > limit {
            shadow = area.center + from_center.normalize_or_zero() * limit;
        }
        self.telegraph = shadow;

        let k = frame_lerp_factor(t.dormant_size_smoothing, dt_ms);
        self.shadow_size += (t.min_shadow_size - self.shadow_size) * k;

        self.timer_ms += dt_ms;
        if self.timer_ms >= self.dormant_duration_ms {
            return Some(self.start_attack(player_pos, area, rng));
        }
        None
    }

    fn start_attack<R: Rng + ?Sized>(&mut self, player_pos: Vec2, area: &PlayArea, rng: &mut R) -> HazardSignal {
        let t = &self.tuning;
        let angle = rng.random_range(0.0..TAU);
        let distance = rng.random_range(t.strike_offset_min..=t.strike_offset_max);
        let mut at = player_pos + Vec2::from_angle(angle) * distance;
        let outline = area.outline();
        if !outline.contains(at) {
            at = outline.project_to_edge(at);
        }

        self.phase = HazardPhase::Attacking;
        self.timer_ms = 0.0;
        self.telegraph = at;
        self.visible = true;
        self.shadow_size = t.min_shadow_size;

        log::debug!("Bird diving toward ({:.0}, {:.0})", at.x, at.y);
        HazardSignal::AttackStarted { at }
    }

    fn advance_attacking<R: Rng + ?Sized>(
        &mut self,
        dt_ms: f32,
        player_pos: Vec2,
        player_radius: f32,
        rng: &mut R,
    ) -> Option<HazardSignal> {
        self.timer_ms += dt_ms;
        let progress = self.progress();
        if progress >= 1.0 {
            return Some(self.strike(player_pos, player_radius, rng));
        }

        let t = &self.tuning;
        // Grow toward a target that itself grows linearly with progress
        let target = t.min_shadow_size + (t.max_shadow_size - t.min_shadow_size) * progress;
        let k = frame_lerp_factor(t.attack_size_smoothing, dt_ms);
        self.shadow_size += (target - self.shadow_size).max(0.0) * k;

        // Home in, harder as the window closes
        let track_speed = t.track_speed_base + progress * t.track_speed_ramp;
        let f = (track_speed * dt_ms / 1000.0).clamp(0.0, 1.0);
        self.telegraph = self.telegraph.lerp(player_pos, f);

        None
    }

    fn strike<R: Rng + ?Sized>(&mut self, player_pos: Vec2, player_radius: f32, rng: &mut R) -> HazardSignal {
        let at = self.telegraph;
        let radius = self.telegraph_radius();
        let hit = strike_hits(at, radius, player_pos, player_radius);
        log::debug!("Bird struck at ({:.0}, {:.0}) r={:.1}: hit={}", at.x, at.y, radius, hit);

        let t = &self.tuning;
        self.phase = HazardPhase::Dormant;
        self.visible = false;
        self.timer_ms = 0.0;
        self.dormant_duration_ms = rng.random_range(t.cooldown_min_ms..=t.cooldown_max_ms) as f32;
        self.shadow_size = t.min_shadow_size;

        let escape = rng.random_range(0.0..TAU);
        self.telegraph += Vec2::new(
            escape.cos() * t.escape_offset.x,
            escape.sin() * t.escape_offset.y,
        );

        HazardSignal::Struck { at, radius, hit }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn area() -> PlayArea {
        PlayArea::new(Vec2::new(400.0, 320.0), 250.0, 0.8)
    }

    fn bird(seed: u64) -> (PredatorHazard, Pcg32) {
        let mut rng = Pcg32::seed_from_u64(seed);
        let hazard = PredatorHazard::new(&area(), HazardTuning::default(), &mut rng);
        (hazard, rng)
    }

    #[test]
    fn test_first_cooldown_is_short() {
        for seed in 0..50 {
            let (hazard, _) = bird(seed);
            assert_eq!(hazard.phase, HazardPhase::Dormant);
            assert!((3000.0..=5000.0).contains(&hazard.dormant_duration_ms));
            assert_eq!(hazard.time_until_attack_ms(), Some(hazard.dormant_duration_ms));
        }
    }

    #[test]
    fn test_attack_starts_near_player() {
        let (mut hazard, mut rng) = bird(1);
        let player = Vec2::new(400.0, 320.0);
        let c = hazard.dormant_duration_ms;
        let signal = hazard.advance(c, player, 16.0, &area(), &mut rng);

        let Some(HazardSignal::AttackStarted { at }) = signal else {
            panic!("expected attack start, got {:?}", signal);
        };
        let d = at.distance(player);
        assert!((50.0 - 1e-3..=100.0 + 1e-3).contains(&d));
        assert!(hazard.visible);
        assert_eq!(hazard.shadow_size, MIN);
        assert_eq!(hazard.timer_ms, 0.0);
        assert_eq!(hazard.time_until_attack_ms(), None);
    }

    const MIN: f32 = crate::consts::MIN_SHADOW_SIZE;

    #[test]
    fn test_shadow_grows_monotonically_and_tracks() {
        let (mut hazard, mut rng) = bird(2);
        let player = Vec2::new(300.0, 300.0);
        let c = hazard.dormant_duration_ms;
        hazard.advance(c, player, 16.0, &area(), &mut rng);

        let start_gap = hazard.telegraph.distance(player);
        let mut last = hazard.shadow_size;
        for _ in 0..200 {
            assert!(hazard.advance(16.0, player, 16.0, &area(), &mut rng).is_none());
            assert!(hazard.shadow_size >= last);
            last = hazard.shadow_size;
        }
        assert!(last > MIN);
        assert!(last <= crate::consts::MAX_SHADOW_SIZE);
        assert!(hazard.telegraph.distance(player) < start_gap);
    }

    #[test]
    fn test_tracking_accelerates() {
        let (mut hazard, _) = bird(3);
        hazard.phase = HazardPhase::Attacking;
        let mut rng = Pcg32::seed_from_u64(0);
        let player = Vec2::new(500.0, 320.0);

        hazard.telegraph = Vec2::new(400.0, 320.0);
        hazard.timer_ms = 0.0;
        hazard.advance(16.0, player, 16.0, &area(), &mut rng);
        let early = hazard.telegraph.x - 400.0;

        hazard.telegraph = Vec2::new(400.0, 320.0);
        hazard.timer_ms = 4000.0;
        hazard.advance(16.0, player, 16.0, &area(), &mut rng);
        let late = hazard.telegraph.x - 400.0;

        assert!(late > early * 1.5);
    }

    #[test]
    fn test_strike_hits_player_under_shadow() {
        let (mut hazard, mut rng) = bird(4);
        hazard.phase = HazardPhase::Attacking;
        hazard.visible = true;
        hazard.telegraph = Vec2::new(100.0, 100.0);
        hazard.shadow_size = 40.0;
        hazard.timer_ms = 4400.0;

        // Progress lands on exactly 1.0
        let signal = hazard.advance(100.0, Vec2::new(105.0, 105.0), 16.0, &area(), &mut rng);
        assert_eq!(
            signal,
            Some(HazardSignal::Struck {
                at: Vec2::new(100.0, 100.0),
                radius: 20.0,
                hit: true
            })
        );
        assert_eq!(hazard.phase, HazardPhase::Dormant);
        assert!(!hazard.visible);
        assert_eq!(hazard.timer_ms, 0.0);
        assert_eq!(hazard.shadow_size, MIN);
        assert!((6000.0..=14000.0).contains(&hazard.dormant_duration_ms));
        // Escape jump moved the shadow away
        assert_ne!(hazard.telegraph, Vec2::new(100.0, 100.0));
    }

    #[test]
    fn test_strike_misses_distant_player() {
        assert!(strike_hits(Vec2::new(100.0, 100.0), 20.0, Vec2::new(105.0, 105.0), 16.0));
        assert!(!strike_hits(Vec2::new(100.0, 100.0), 20.0, Vec2::new(140.0, 100.0), 16.0));
    }

    #[test]
    fn test_dormant_shadow_stays_over_island() {
        let (mut hazard, mut rng) = bird(5);
        hazard.dormant_duration_ms = f32::MAX;
        // Player hugging the far shore
        let player = Vec2::new(640.0, 320.0);
        for _ in 0..600 {
            hazard.advance(16.0, player, 16.0, &area(), &mut rng);
            assert!(hazard.telegraph.distance(area().center) <= 250.0 * 0.85 + 1e-3);
        }
    }

    proptest! {
        #[test]
        fn prop_attack_starts_exactly_at_cooldown(
            seed in any::<u64>(),
            cuts in proptest::collection::vec(0.0f32..1.0, 0..12),
        ) {
            let (mut hazard, mut rng) = bird(seed);
            let c = hazard.dormant_duration_ms as u32;

            let mut points: Vec<u32> = cuts.iter().map(|f| (f * c as f32) as u32).collect();
            points.push(0);
            points.push(c);
            points.sort_unstable();

            let steps: Vec<f32> = points.windows(2).map(|w| (w[1] - w[0]) as f32).collect();
            let mut starts = 0;
            for (i, dt) in steps.iter().enumerate() {
                let signal = hazard.advance(*dt, Vec2::new(400.0, 320.0), 16.0, &area(), &mut rng);
                if matches!(signal, Some(HazardSignal::AttackStarted { .. })) {
                    starts += 1;
                }
                if i + 1 < steps.len() && hazard.timer_ms < c as f32 {
                    prop_assert_eq!(hazard.phase, HazardPhase::Dormant);
                }
            }
            prop_assert_eq!(starts, 1);
            prop_assert_eq!(hazard.phase, HazardPhase::Attacking);
        }
    }
}
