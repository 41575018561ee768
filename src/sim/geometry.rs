//! Ellipse geometry for island play areas and rock obstacles
//!
//! Every boundary in the game is an axis-aligned ellipse:
//! - center: ellipse center in world space
//! - radius_x, radius_y: horizontal and vertical semi-axes
//!
//! Points outside are projected back along the ellipse's own angular
//! parametrization `atan2(dy·a, dx·b)`, which lands on the boundary along the
//! ray from the center and stays stable on squashed shapes.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::polar_to_cartesian;

/// An axis-aligned ellipse
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ellipse {
    pub center: Vec2,
    /// Horizontal semi-axis (`a`)
    pub radius_x: f32,
    /// Vertical semi-axis (`b`)
    pub radius_y: f32,
}

impl Ellipse {
    pub fn new(center: Vec2, radius_x: f32, radius_y: f32) -> Self {
        Self {
            center,
            radius_x,
            radius_y,
        }
    }

    /// `(dx/a)² + (dy/b)²`; ≤ 1 inside, > 1 outside
    #[inline]
    pub fn metric(&self, point: Vec2) -> f32 {
        ellipse_metric(point, self.center, self.radius_x, self.radius_y)
    }

    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        ellipse_contains(point, self.center, self.radius_x, self.radius_y)
    }

    /// Same ellipse grown by `amount` on both axes
    pub fn inflate(&self, amount: f32) -> Self {
        Self::new(self.center, self.radius_x + amount, self.radius_y + amount)
    }

    pub fn project_to_edge(&self, point: Vec2) -> Vec2 {
        project_to_ellipse_edge(point, self.center, self.radius_x, self.radius_y)
    }

    pub fn outward_normal_at(&self, point: Vec2) -> Vec2 {
        ellipse_outward_normal(point, self.center, self.radius_x, self.radius_y)
    }
}

/// Elliptical island play area.
///
/// The vertical radius is always `aspect × horizontal`, and insetting for an
/// entity's collision radius keeps that ratio (the inset ellipse is *not* a
/// uniform offset of the outer one).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayArea {
    pub center: Vec2,
    /// Horizontal boundary radius
    pub radius: f32,
    /// `b / a` (0.8 for beaches, 0.9 for tree canopies)
    pub aspect: f32,
}

impl PlayArea {
    pub fn new(center: Vec2, radius: f32, aspect: f32) -> Self {
        Self {
            center,
            radius,
            aspect,
        }
    }

    /// Full island outline
    pub fn outline(&self) -> Ellipse {
        Ellipse::new(self.center, self.radius, self.radius * self.aspect)
    }

    /// Region an entity of `entity_radius` may occupy
    pub fn inset(&self, entity_radius: f32) -> Ellipse {
        let a = (self.radius - entity_radius).max(0.0);
        Ellipse::new(self.center, a, a * self.aspect)
    }

    /// Map polar (angle, distance) onto the island's squashed shape
    pub fn polar_point(&self, angle: f32, distance: f32) -> Vec2 {
        let p = polar_to_cartesian(distance, angle);
        self.center + Vec2::new(p.x, p.y * self.aspect)
    }
}

#[inline]
pub fn ellipse_metric(point: Vec2, center: Vec2, a: f32, b: f32) -> f32 {
    let d = point - center;
    (d.x * d.x) / (a * a) + (d.y * d.y) / (b * b)
}

/// True iff `(dx/a)² + (dy/b)² ≤ 1`
#[inline]
pub fn ellipse_contains(point: Vec2, center: Vec2, a: f32, b: f32) -> bool {
    ellipse_metric(point, center, a, b) <= 1.0
}

/// Project a point onto the ellipse boundary along its angular parameter.
///
/// Degenerate ellipses (either semi-axis ≤ 0) collapse to the center.
pub fn project_to_ellipse_edge(point: Vec2, center: Vec2, a: f32, b: f32) -> Vec2 {
    if a <= 0.0 || b <= 0.0 {
        return center;
    }
    let d = point - center;
    let param = (d.y * a).atan2(d.x * b);
    center + Vec2::new(a * param.cos(), b * param.sin())
}

/// Unit outward normal `(dx/a², dy/b²)`; zero at the center or on degenerate ellipses
pub fn ellipse_outward_normal(point: Vec2, center: Vec2, a: f32, b: f32) -> Vec2 {
    if a <= 0.0 || b <= 0.0 {
        return Vec2::ZERO;
    }
    let d = point - center;
    Vec2::new(d.x / (a * a), d.y / (b * b)).normalize_or_zero()
}

/// Strip the part of `velocity` that points out of the ellipse at `point`.
///
/// Tangential motion is preserved so entities can slide along the shore.
pub fn remove_outward_velocity_component(
    velocity: Vec2,
    point: Vec2,
    center: Vec2,
    a: f32,
    b: f32,
) -> Vec2 {
    let normal = ellipse_outward_normal(point, center, a, b);
    let outward_speed = velocity.dot(normal);
    if outward_speed > 0.0 {
        velocity - normal * outward_speed
    } else {
        velocity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_ellipse_contains() {
        let c = Vec2::ZERO;
        assert!(ellipse_contains(Vec2::new(250.0, 0.0), c, 250.0, 200.0));
        assert!(ellipse_contains(Vec2::new(0.0, 199.0), c, 250.0, 200.0));
        assert!(!ellipse_contains(Vec2::new(0.0, 201.0), c, 250.0, 200.0));
        assert!(!ellipse_contains(Vec2::new(200.0, 150.0), c, 250.0, 200.0));
    }

    #[test]
    fn test_project_lands_on_ray_from_center() {
        let e = Ellipse::new(Vec2::new(400.0, 320.0), 234.0, 187.2);
        let outside = Vec2::new(900.0, 700.0);
        let p = e.project_to_edge(outside);
        assert!((e.metric(p) - 1.0).abs() < 1e-4);

        let dir_in = (outside - e.center).normalize();
        let dir_out = (p - e.center).normalize();
        assert!(dir_in.dot(dir_out) > 0.9999);
    }

    #[test]
    fn test_outward_normal_axes() {
        let e = Ellipse::new(Vec2::ZERO, 100.0, 50.0);
        let n = e.outward_normal_at(Vec2::new(100.0, 0.0));
        assert!((n - Vec2::X).length() < 1e-6);
        let n = e.outward_normal_at(Vec2::new(0.0, -50.0));
        assert!((n + Vec2::Y).length() < 1e-6);
        assert_eq!(e.outward_normal_at(Vec2::ZERO), Vec2::ZERO);
    }

    #[test]
    fn test_remove_outward_keeps_tangent() {
        let c = Vec2::ZERO;
        // At the right-most point the normal is +x
        let v = remove_outward_velocity_component(
            Vec2::new(50.0, 30.0),
            Vec2::new(100.0, 0.0),
            c,
            100.0,
            80.0,
        );
        assert!(v.x.abs() < 1e-4);
        assert!((v.y - 30.0).abs() < 1e-4);

        // Inward motion is untouched
        let v = remove_outward_velocity_component(
            Vec2::new(-50.0, 30.0),
            Vec2::new(100.0, 0.0),
            c,
            100.0,
            80.0,
        );
        assert_eq!(v, Vec2::new(-50.0, 30.0));
    }

    #[test]
    fn test_play_area_inset_keeps_aspect() {
        let area = PlayArea::new(Vec2::new(400.0, 320.0), 250.0, 0.8);
        let inner = area.inset(16.0);
        assert_eq!(inner.radius_x, 234.0);
        assert!((inner.radius_y - 187.2).abs() < 1e-4);
        assert_eq!(area.inset(400.0).radius_x, 0.0);
    }

    proptest! {
        #[test]
        fn prop_projection_is_on_boundary(
            x in -2000.0f32..2000.0,
            y in -2000.0f32..2000.0,
            a in 20.0f32..400.0,
            ratio in 0.3f32..1.0,
        ) {
            let b = a * ratio;
            prop_assume!(x.abs() > 1.0 || y.abs() > 1.0);
            let p = project_to_ellipse_edge(Vec2::new(x, y), Vec2::ZERO, a, b);
            prop_assert!((ellipse_metric(p, Vec2::ZERO, a, b) - 1.0).abs() < 1e-3);
        }
    }
}
