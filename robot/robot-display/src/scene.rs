//! Read-only view of the world handed to scene renderers.
//!
//! A [`Scene`] borrows the static obstacles and carries a snapshot of the
//! robot for this tick. The robot can be hidden for a single render pass with
//! [`Scene::hide_robot`], which returns a guard that restores visibility when
//! dropped.

use std::ops::Deref;

use nalgebra::{Point3, Vector2};
use robot_motion::{IdleOutput, ObstacleRegistry};
use robot_types::{Appearance, RobotPose, forward_axis};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Robot body proportions used for rendering and camera placement.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RobotDimensions {
    /// Body cylinder radius.
    pub body_radius: f64,
    /// Body cylinder bottom above the base.
    pub body_bottom: f64,
    /// Body cylinder top above the base.
    pub body_top: f64,
    /// Head sphere centre above the base.
    pub head_height: f64,
    /// Head sphere radius.
    pub head_radius: f64,
    /// Cosine of the half-angle of the face panel around the head's forward axis.
    pub face_cos: f64,
}

impl Default for RobotDimensions {
    fn default() -> Self {
        Self {
            body_radius: 0.5,
            body_bottom: 0.12,
            body_top: 0.95,
            head_height: 1.28,
            head_radius: 0.34,
            face_cos: 0.55,
        }
    }
}

/// Snapshot of the robot for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RobotModel {
    /// Integrated pose.
    pub pose: RobotPose,
    /// Idle offsets layered on top of the pose.
    pub idle: IdleOutput,
    /// Colours.
    pub appearance: Appearance,
    /// Proportions.
    pub dimensions: RobotDimensions,
}

impl RobotModel {
    /// World position of the head centre, including suspension and idle bob.
    #[must_use]
    pub fn head_center(&self) -> Point3<f64> {
        let base = self.pose.world_base();
        base + nalgebra::Vector3::y() * (self.dimensions.head_height + self.idle.bob)
    }

    /// World yaw the head faces.
    #[must_use]
    pub fn head_heading(&self) -> f64 {
        self.pose.heading + self.pose.head_yaw + self.idle.head_yaw_offset
    }

    /// Planar direction the face looks.
    #[must_use]
    pub fn head_forward(&self) -> Vector2<f64> {
        forward_axis(self.head_heading())
    }
}

/// Everything a renderer may draw this pass.
#[derive(Debug, Clone)]
pub struct Scene<'a> {
    /// Static obstacles.
    pub obstacles: &'a ObstacleRegistry,
    /// The robot.
    pub robot: RobotModel,
    robot_visible: bool,
}

impl<'a> Scene<'a> {
    /// A scene with the robot visible.
    #[must_use]
    pub fn new(obstacles: &'a ObstacleRegistry, robot: RobotModel) -> Self {
        Self {
            obstacles,
            robot,
            robot_visible: true,
        }
    }

    /// True if renderers should draw the robot.
    #[must_use]
    pub fn robot_visible(&self) -> bool {
        self.robot_visible
    }

    /// Hide the robot until the returned guard is dropped.
    ///
    /// ```
    /// use robot_display::{RobotModel, Scene};
    /// use robot_motion::ObstacleRegistry;
    ///
    /// let obstacles = ObstacleRegistry::new();
    /// let mut scene = Scene::new(&obstacles, RobotModel::default());
    /// {
    ///     let hidden = scene.hide_robot();
    ///     assert!(!hidden.robot_visible());
    /// }
    /// assert!(scene.robot_visible());
    /// ```
    pub fn hide_robot(&mut self) -> RobotHidden<'_, 'a> {
        let was_visible = std::mem::replace(&mut self.robot_visible, false);
        RobotHidden {
            scene: self,
            was_visible,
        }
    }
}

/// Guard returned by [`Scene::hide_robot`].
#[derive(Debug)]
pub struct RobotHidden<'s, 'a> {
    scene: &'s mut Scene<'a>,
    was_visible: bool,
}

impl<'a> Deref for RobotHidden<'_, 'a> {
    type Target = Scene<'a>;

    fn deref(&self) -> &Self::Target {
        &*self.scene
    }
}

impl Drop for RobotHidden<'_, '_> {
    fn drop(&mut self) {
        self.scene.robot_visible = self.was_visible;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point2;

    #[test]
    fn dropping_the_guard_restores_visibility() {
        let obstacles = ObstacleRegistry::new();
        let mut scene = Scene::new(&obstacles, RobotModel::default());
        {
            let _outer = scene.hide_robot();
        }
        assert!(scene.robot_visible());
    }

    #[test]
    fn guard_restores_on_early_exit() {
        fn render_and_bail(scene: &mut Scene<'_>) -> Option<()> {
            let hidden = scene.hide_robot();
            assert!(!hidden.robot_visible());
            None::<()>?;
            Some(())
        }
        let obstacles = ObstacleRegistry::new();
        let mut scene = Scene::new(&obstacles, RobotModel::default());
        assert!(render_and_bail(&mut scene).is_none());
        assert!(scene.robot_visible());
    }

    #[test]
    fn head_center_includes_suspension_and_bob() {
        let mut robot = RobotModel::default();
        robot.pose = RobotPose::at(Point2::new(1.0, 2.0), 0.0);
        robot.pose.suspension_offset = -0.02;
        robot.idle.bob = 0.01;
        let head = robot.head_center();
        assert_relative_eq!(head.y, 1.28 - 0.02 + 0.01);
        assert_eq!(head.x, 1.0);
        assert_eq!(head.z, 2.0);
    }

    #[test]
    fn head_heading_adds_yaw_and_glance() {
        let mut robot = RobotModel::default();
        robot.pose.heading = 0.5;
        robot.pose.head_yaw = 0.25;
        robot.idle.head_yaw_offset = 0.125;
        assert_eq!(robot.head_heading(), 0.875);
    }
}
