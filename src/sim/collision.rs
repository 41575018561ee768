//! Collision detection and response against elliptical boundaries
//!
//! Two kinds of walls exist on an island:
//! - the shoreline, a soft wall: entities are snapped back onto it and only
//!   the outward part of their velocity is removed, so they can slide along it
//! - rocks, hard walls: entities are pushed out to the rock's rim and stop

use glam::Vec2;

use super::geometry::{Ellipse, remove_outward_velocity_component};

/// Result of a boundary confinement pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Confinement {
    /// Whether the entity was on or beyond the boundary
    pub hit: bool,
    /// Corrected position
    pub position: Vec2,
    /// Corrected velocity (outward component removed on hit)
    pub velocity: Vec2,
}

impl Confinement {
    pub fn untouched(position: Vec2, velocity: Vec2) -> Self {
        Self {
            hit: false,
            position,
            velocity,
        }
    }
}

/// Keep an entity inside `bounds` (already inset by the entity's radius).
///
/// Points on or outside the boundary are projected onto it and lose the
/// outward component of their velocity; tangential motion survives.
pub fn confine_to_ellipse(position: Vec2, velocity: Vec2, bounds: &Ellipse) -> Confinement {
    if bounds.metric(position) < 1.0 {
        return Confinement::untouched(position, velocity);
    }

    let edge = bounds.project_to_edge(position);
    let velocity = remove_outward_velocity_component(
        velocity,
        edge,
        bounds.center,
        bounds.radius_x,
        bounds.radius_y,
    );

    Confinement {
        hit: true,
        position: edge,
        velocity,
    }
}

/// Push a circle of `entity_radius` out of a rock.
///
/// Returns the corrected position if the circle overlapped or touched the
/// rock. The rock is inflated by the entity radius and the projection uses
/// the same angular parametrization as the shoreline.
pub fn push_out_of_obstacle(position: Vec2, entity_radius: f32, obstacle: &Ellipse) -> Option<Vec2> {
    let grown = obstacle.inflate(entity_radius);
    if !grown.contains(position) {
        return None;
    }
    Some(grown.project_to_edge(position))
}

/// Circle-circle overlap (touching counts)
#[inline]
pub fn circles_overlap(a: Vec2, a_radius: f32, b: Vec2, b_radius: f32) -> bool {
    a.distance_squared(b) <= (a_radius + b_radius) * (a_radius + b_radius)
}

/// Axis clamp used on the world map and the jungle floor
#[inline]
pub fn clamp_to_rect(position: Vec2, min: Vec2, max: Vec2) -> Vec2 {
    position.clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn island() -> Ellipse {
        Ellipse::new(Vec2::new(400.0, 320.0), 234.0, 187.2)
    }

    #[test]
    fn test_inside_is_untouched() {
        let v = Vec2::new(100.0, -40.0);
        let result = confine_to_ellipse(Vec2::new(420.0, 300.0), v, &island());
        assert!(!result.hit);
        assert_eq!(result.velocity, v);
    }

    #[test]
    fn test_edge_moving_outward_slides() {
        let bounds = island();
        // Top-most point of the ellipse, moving up and to the right
        let edge = Vec2::new(400.0, 320.0 - 187.2);
        let v = Vec2::new(60.0, -120.0);

        let result = confine_to_ellipse(edge + Vec2::new(0.0, -2.0), v, &bounds);
        assert!(result.hit);
        assert!(bounds.metric(result.position) <= 1.0 + 1e-4);
        // Outward (up) motion removed, sideways motion kept and not reversed
        assert!(result.velocity.y.abs() < 1e-3);
        assert!((result.velocity.x - 60.0).abs() < 1e-3);
    }

    #[test]
    fn test_push_out_of_rock() {
        let rock = Ellipse::new(Vec2::new(320.0, 280.0), 45.0, 30.0);
        let pushed = push_out_of_obstacle(Vec2::new(330.0, 285.0), 16.0, &rock)
            .expect("overlapping rock");
        assert!((rock.inflate(16.0).metric(pushed) - 1.0).abs() < 1e-4);

        assert!(push_out_of_obstacle(Vec2::new(500.0, 500.0), 16.0, &rock).is_none());
    }

    #[test]
    fn test_touching_rock_rim_counts_as_contact() {
        let rock = Ellipse::new(Vec2::new(60.0, 0.0), 30.0, 20.0);
        // Exactly on the rim once inflated by 16: metric is 1
        let rim = Vec2::new(14.0, 0.0);
        assert_eq!(rock.inflate(16.0).metric(rim), 1.0);
        let pushed = push_out_of_obstacle(rim, 16.0, &rock).expect("touching rock");
        assert!((pushed - rim).length() < 1e-3);
    }

    #[test]
    fn test_circles_overlap() {
        assert!(circles_overlap(Vec2::ZERO, 16.0, Vec2::new(20.0, 0.0), 4.0));
        assert!(!circles_overlap(Vec2::ZERO, 16.0, Vec2::new(20.1, 0.0), 4.0));
    }

    #[test]
    fn test_clamp_to_rect() {
        let p = clamp_to_rect(Vec2::new(-5.0, 900.0), Vec2::splat(16.0), Vec2::new(784.0, 584.0));
        assert_eq!(p, Vec2::new(16.0, 584.0));
    }

    proptest! {
        #[test]
        fn prop_confinement_invariant(
            x in -1500.0f32..1500.0,
            y in -1500.0f32..1500.0,
            vx in -300.0f32..300.0,
            vy in -300.0f32..300.0,
            a in 50.0f32..300.0,
            ratio in 0.5f32..1.0,
        ) {
            let bounds = Ellipse::new(Vec2::ZERO, a, a * ratio);
            let result = confine_to_ellipse(Vec2::new(x, y), Vec2::new(vx, vy), &bounds);

            prop_assert!(bounds.metric(result.position) <= 1.0 + 1e-3);
            if result.hit {
                let n = bounds.outward_normal_at(result.position);
                prop_assert!(result.velocity.dot(n) <= 1e-3);
            }
        }
    }
}
