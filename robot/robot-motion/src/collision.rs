//! Push-out collision resolution against circular proxies and the arena.
//!
//! # Algorithm
//!
//! 1. For each circular obstacle, in registration order, push the proposed
//!    point straight out along the centre-to-point normal by the exact
//!    penetration depth. Displacements are applied sequentially, so later
//!    obstacles see the point already moved by earlier ones.
//! 2. Clamp the result into the arena, inset by the robot's effective radius.
//!
//! Sequential resolution is an approximation. Deeply overlapping obstacle
//! clusters may not converge in one pass; the warehouse layout keeps props
//! apart so this does not arise.

use nalgebra::Point2;

use crate::obstacle::ObstacleRegistry;
use crate::params::CollisionParams;

/// Outcome of resolving a proposed position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    /// Corrected position.
    pub position: Point2<f64>,
    /// True if the obstacle pass or the arena clamp moved the point.
    pub collided: bool,
}

/// Resolves proposed robot positions against a fixed obstacle set.
///
/// # Example
///
/// ```
/// use robot_motion::{CollisionParams, CollisionResolver, ObstacleRegistry};
/// use nalgebra::Point2;
/// use robot_types::Rgb;
///
/// let mut obstacles = ObstacleRegistry::new();
/// obstacles.add_prop(Point2::origin(), 0.5, 1.0, Rgb::WHITE);
///
/// let resolver = CollisionResolver::new(CollisionParams::default(), obstacles);
/// let r = resolver.resolve(Point2::new(0.3, 0.0));
///
/// assert!(r.collided);
/// assert!((r.position.x - 1.1).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct CollisionResolver {
    params: CollisionParams,
    obstacles: ObstacleRegistry,
}

impl CollisionResolver {
    /// Create a resolver over `obstacles`.
    #[must_use]
    pub fn new(params: CollisionParams, obstacles: ObstacleRegistry) -> Self {
        Self { params, obstacles }
    }

    /// Collision parameters.
    #[must_use]
    pub fn params(&self) -> &CollisionParams {
        &self.params
    }

    /// Registered obstacles.
    #[must_use]
    pub fn obstacles(&self) -> &ObstacleRegistry {
        &self.obstacles
    }

    /// Resolve a proposed position.
    #[must_use]
    pub fn resolve(&self, proposed: Point2<f64>) -> Resolution {
        let pushed = self.push_out_of_obstacles(proposed);
        let clamped = self.clamp_to_arena(pushed);
        Resolution {
            position: clamped,
            collided: clamped != proposed,
        }
    }

    /// Obstacle pass only.
    #[must_use]
    pub fn push_out_of_obstacles(&self, proposed: Point2<f64>) -> Point2<f64> {
        let reach = self.params.effective_radius();
        let mut p = proposed;
        for (center, radius) in self.obstacles.circles() {
            let offset = p - center;
            let distance = offset.norm();
            let min_distance = reach + radius;
            // Exact overlap has no usable normal; next frame's position will.
            if distance < min_distance && distance > self.params.contact_epsilon {
                p += offset * ((min_distance - distance) / distance);
            }
        }
        p
    }

    /// Arena clamp only.
    #[must_use]
    pub fn clamp_to_arena(&self, p: Point2<f64>) -> Point2<f64> {
        let inset = self.params.effective_radius();
        let a = &self.params.arena;
        Point2::new(
            p.x.clamp(a.min_x + inset, a.max_x - inset),
            p.y.clamp(a.min_z + inset, a.max_z - inset),
        )
    }
}
