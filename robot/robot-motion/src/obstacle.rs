//! Static collision proxies.
//!
//! Props are stood in for by circles on the ground plane; walls by
//! axis-aligned rectangles. Only circles take part in the resolver's push-out
//! pass; walls are kept here so renderers can draw them, while the arena
//! clamp in [`CollisionParams`](crate::CollisionParams) keeps the robot inside.
//!
//! The registry is built once at scene construction. Obstacles are identified
//! by [`ObstacleId`], never by value: two identical barrels are two obstacles.

use nalgebra::Point2;
use robot_types::Rgb;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identity of an obstacle within its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObstacleId(pub u32);

impl std::fmt::Display for ObstacleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Obstacle({})", self.0)
    }
}

/// What an obstacle is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ObstacleKind {
    /// Arena wall.
    Wall,
    /// Free-standing prop (shelf, barrel, pallet...).
    Prop,
}

/// Axis-aligned rectangle on the ground plane, in `(x, z)`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Aabb2 {
    /// Minimum corner.
    pub min: Point2<f64>,
    /// Maximum corner.
    pub max: Point2<f64>,
}

impl Aabb2 {
    /// Build from two corners in any order.
    #[must_use]
    pub fn from_corners(a: Point2<f64>, b: Point2<f64>) -> Self {
        Self {
            min: Point2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// True if `p` lies inside or on the boundary.
    #[must_use]
    pub fn contains(&self, p: Point2<f64>) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// Collision shape of an obstacle.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ObstacleShape {
    /// Rectangular footprint (walls).
    Rect(Aabb2),
    /// Circular proxy (props).
    Circle {
        /// Centre `(x, z)`.
        center: Point2<f64>,
        /// Radius.
        radius: f64,
    },
}

/// One registered obstacle.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Obstacle {
    /// Identity.
    pub id: ObstacleId,
    /// Wall or prop.
    pub kind: ObstacleKind,
    /// Footprint.
    pub shape: ObstacleShape,
    /// Visual height, used only for rendering.
    pub height: f64,
    /// Visual colour, used only for rendering.
    pub color: Rgb,
}

/// Registration-ordered list of obstacles.
///
/// # Example
///
/// ```
/// use robot_motion::{ObstacleRegistry, ObstacleKind};
/// use nalgebra::Point2;
/// use robot_types::Rgb;
///
/// let mut registry = ObstacleRegistry::new();
/// let a = registry.add_prop(Point2::new(1.0, 1.0), 0.5, 1.0, Rgb::WHITE);
/// let b = registry.add_prop(Point2::new(1.0, 1.0), 0.5, 1.0, Rgb::WHITE);
///
/// // Same values, distinct identities
/// assert_ne!(a, b);
/// assert_eq!(registry.circles().count(), 2);
/// ```
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObstacleRegistry {
    obstacles: Vec<Obstacle>,
    next_id: u32,
}

impl ObstacleRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(
        &mut self,
        kind: ObstacleKind,
        shape: ObstacleShape,
        height: f64,
        color: Rgb,
    ) -> ObstacleId {
        let id = ObstacleId(self.next_id);
        self.next_id += 1;
        self.obstacles.push(Obstacle {
            id,
            kind,
            shape,
            height,
            color,
        });
        id
    }

    /// Register a wall.
    pub fn add_wall(&mut self, bounds: Aabb2, height: f64, color: Rgb) -> ObstacleId {
        self.push(ObstacleKind::Wall, ObstacleShape::Rect(bounds), height, color)
    }

    /// Register a circular prop.
    pub fn add_prop(
        &mut self,
        center: Point2<f64>,
        radius: f64,
        height: f64,
        color: Rgb,
    ) -> ObstacleId {
        self.push(
            ObstacleKind::Prop,
            ObstacleShape::Circle {
                center,
                radius: radius.max(0.0),
            },
            height,
            color,
        )
    }

    /// All obstacles in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.iter()
    }

    /// Circular proxies `(center, radius)` in registration order.
    pub fn circles(&self) -> impl Iterator<Item = (Point2<f64>, f64)> + '_ {
        self.obstacles.iter().filter_map(|o| match o.shape {
            ObstacleShape::Circle { center, radius } => Some((center, radius)),
            ObstacleShape::Rect(_) => None,
        })
    }

    /// Wall obstacles.
    pub fn walls(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.iter().filter(|o| o.kind == ObstacleKind::Wall)
    }

    /// Look up an obstacle by id.
    #[must_use]
    pub fn get(&self, id: ObstacleId) -> Option<&Obstacle> {
        self.obstacles.iter().find(|o| o.id == id)
    }

    /// Number of obstacles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    /// True if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    /// The warehouse scene: three walls (the +Z side is the open loading bay)
    /// and a dozen props.
    #[must_use]
    pub fn warehouse() -> Self {
        let wall = Rgb::new(0x5a, 0x60, 0x6b);
        let shelf = Rgb::new(0x2f, 0x5d, 0xa8);
        let wood = Rgb::new(0xa0, 0x72, 0x3c);
        let barrel = Rgb::new(0xc0, 0x39, 0x2b);
        let cone = Rgb::new(0xf3, 0x9c, 0x12);
        let forklift = Rgb::new(0xf1, 0xc4, 0x0f);

        let mut r = Self::new();
        for (min, max) in [
            ((-10.0, -10.0), (10.0, -9.5)),
            ((-10.0, -10.0), (-9.5, 12.5)),
            ((9.5, -10.0), (10.0, 12.5)),
        ] {
            let bounds = Aabb2::from_corners(Point2::new(min.0, min.1), Point2::new(max.0, max.1));
            r.add_wall(bounds, 4.0, wall);
        }

        for (x, z) in [(-6.5, -6.0), (-6.5, -2.0), (6.5, -6.0), (6.5, -2.0)] {
            r.add_prop(Point2::new(x, z), 1.1, 2.6, shelf);
        }
        r.add_prop(Point2::new(-4.0, 5.0), 0.9, 1.0, wood);
        r.add_prop(Point2::new(0.0, -5.5), 0.7, 0.8, wood);
        r.add_prop(Point2::new(3.0, 3.5), 0.4, 0.9, barrel);
        r.add_prop(Point2::new(3.0, 5.6), 0.4, 0.9, barrel);
        r.add_prop(Point2::new(5.5, 8.5), 1.2, 2.0, forklift);
        r.add_prop(Point2::new(-1.5, 8.0), 0.25, 0.5, cone);
        r.add_prop(Point2::new(1.5, 8.0), 0.25, 0.5, cone);
        r.add_prop(Point2::new(-3.0, -3.0), 0.3, 3.5, wall);
        r
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_sequential_and_unique() {
        let mut r = ObstacleRegistry::new();
        let a = r.add_prop(Point2::origin(), 1.0, 1.0, Rgb::BLACK);
        let b = r.add_wall(
            Aabb2::from_corners(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)),
            1.0,
            Rgb::BLACK,
        );
        assert_eq!(a, ObstacleId(0));
        assert_eq!(b, ObstacleId(1));
        assert_eq!(r.get(b).map(|o| o.kind), Some(ObstacleKind::Wall));
        assert!(r.get(ObstacleId(7)).is_none());
    }

    #[test]
    fn circles_skip_walls_and_keep_order() {
        let mut r = ObstacleRegistry::new();
        r.add_prop(Point2::new(1.0, 0.0), 0.1, 1.0, Rgb::BLACK);
        r.add_wall(
            Aabb2::from_corners(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)),
            1.0,
            Rgb::BLACK,
        );
        r.add_prop(Point2::new(2.0, 0.0), 0.2, 1.0, Rgb::BLACK);

        let circles: Vec<_> = r.circles().collect();
        assert_eq!(circles.len(), 2);
        assert_eq!(circles[0].0.x, 1.0);
        assert_eq!(circles[1].1, 0.2);
        assert_eq!(r.walls().count(), 1);
    }

    #[test]
    fn negative_radius_is_clamped() {
        let mut r = ObstacleRegistry::new();
        r.add_prop(Point2::origin(), -1.0, 1.0, Rgb::BLACK);
        assert_eq!(r.circles().next().map(|c| c.1), Some(0.0));
    }

    #[test]
    fn aabb_from_any_corners() {
        let b = Aabb2::from_corners(Point2::new(2.0, -1.0), Point2::new(-2.0, 1.0));
        assert_eq!(b.min, Point2::new(-2.0, -1.0));
        assert!(b.contains(Point2::new(0.0, 0.0)));
        assert!(!b.contains(Point2::new(3.0, 0.0)));
    }

    #[test]
    fn warehouse_leaves_the_spawn_area_clear() {
        let r = ObstacleRegistry::warehouse();
        assert_eq!(r.walls().count(), 3);
        // Default spawn (0, 2) must not start inside a prop.
        let spawn = Point2::new(0.0, 2.0);
        for (center, radius) in r.circles() {
            assert!(nalgebra::distance(&spawn, &center) > radius + 0.6);
        }
    }

    #[test]
    fn warehouse_props_leave_room_to_pass_between() {
        // Inflated footprints must not overlap, or push-out could bounce
        // between neighbours.
        let r = ObstacleRegistry::warehouse();
        let circles: Vec<_> = r.circles().collect();
        for (i, (ca, ra)) in circles.iter().enumerate() {
            for (cb, rb) in &circles[i + 1..] {
                assert!(nalgebra::distance(ca, cb) > ra + rb + 1.2);
            }
        }
    }
}
