//! Main view state and the per-frame draw hook.

use nalgebra::{Point3, Vector3};
use robot_display::{Raster, RobotModel, Scene};
use robot_motion::DustParticle;

/// Size of the main on-screen view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MainView {
    width: u32,
    height: u32,
}

impl Default for MainView {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

impl MainView {
    /// A view of the given size. Zero dimensions are raised to one pixel.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Width over height.
    #[must_use]
    pub fn aspect(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

/// World transforms of the robot's parts for this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RobotTransforms {
    /// Base position including suspension.
    pub base: Point3<f64>,
    /// Body yaw.
    pub heading: f64,
    /// Sideways roll: cornering tilt plus idle sway.
    pub roll: f64,
    /// Fore-aft pitch from acceleration.
    pub pitch: f64,
    /// Head centre.
    pub head: Point3<f64>,
    /// Head world yaw.
    pub head_yaw: f64,
    /// Head pitch.
    pub head_pitch: f64,
    /// Wheel rotation angle.
    pub wheel_spin: f64,
}

impl RobotTransforms {
    /// Derive part transforms from a robot snapshot.
    #[must_use]
    pub fn from_model(robot: &RobotModel) -> Self {
        let pose = &robot.pose;
        Self {
            base: pose.world_base() + Vector3::y() * robot.idle.bob,
            heading: pose.heading,
            roll: pose.body_tilt + robot.idle.tilt,
            pitch: pose.body_lean,
            head: robot.head_center(),
            head_yaw: robot.head_heading(),
            head_pitch: robot.idle.head_pitch_offset,
            wheel_spin: pose.wheel_spin,
        }
    }
}

impl Default for RobotTransforms {
    fn default() -> Self {
        Self::from_model(&RobotModel::default())
    }
}

/// Everything a main-view draw may read.
#[derive(Debug, Clone, Copy)]
pub struct MainFrame<'a> {
    /// Simulation time.
    pub time: f64,
    /// Frame number.
    pub frame: u64,
    /// View size.
    pub view: MainView,
    /// Robot part transforms.
    pub transforms: RobotTransforms,
    /// Live dust particles.
    pub dust: &'a [DustParticle],
    /// Current LCD image.
    pub lcd: &'a Raster,
    /// True if the LCD changed this frame.
    pub lcd_changed: bool,
}

/// Draws the main view after all simulation stages of a tick have run.
///
/// This is where an engine integration renders the frame. The hook is
/// optional; headless runs leave it unset.
pub trait MainPass {
    /// Draw one frame.
    fn draw(&mut self, scene: &Scene<'_>, frame: &MainFrame<'_>);
}
