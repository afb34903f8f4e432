//! Dual off-screen camera capture.
//!
//! Two rigs (robot POV and a fixed security camera) render the scene into
//! their own [`RenderTarget`], read it back, and copy it with rows reversed
//! into a 2D [`DisplaySurface`](crate::DisplaySurface) before applying their
//! [`PostProcess`]. The frame loop calls [`CapturePipeline::capture`] at a
//! reduced rate; nothing here blocks on the UI.
//!
//! A rig whose surface is not mounted yet is skipped without error and simply
//! tried again on the next capture.

use std::f64::consts::PI;
use std::fmt;

use nalgebra::{Point3, Vector3};
use robot_types::{RobotError, ensure_positive};
use smallvec::SmallVec;
use tracing::{debug, trace};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::postprocess::PostProcess;
use crate::raster::{BYTES_PER_PIXEL, Raster};
use crate::raycast::{CameraView, SceneRenderer};
use crate::scene::{RobotModel, Scene};
use crate::surface::{DisplaySurfaces, SurfaceHandle};

/// Which rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CameraKind {
    /// Mounted on the robot head, looking where the head looks.
    Pov,
    /// Fixed mount that yaws to follow the robot.
    Security,
}

impl CameraKind {
    /// Both rigs, in capture order.
    pub const ALL: [Self; 2] = [Self::Pov, Self::Security];

    /// Lower-case name used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pov => "pov",
            Self::Security => "security",
        }
    }
}

impl fmt::Display for CameraKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Off-screen RGBA8 colour target with rows stored bottom-up, the layout a
/// GPU readback produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderTarget {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RenderTarget {
    /// A cleared target.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * BYTES_PER_PIXEL],
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

    /// Raw bytes, bottom row first.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL)
    }

    /// Pixel at `(x, y)` where `y = 0` is the bottom row.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let i = self.offset(x, y)?;
        let mut px = [0; 4];
        px.copy_from_slice(&self.pixels[i..i + BYTES_PER_PIXEL]);
        Some(px)
    }

    /// Write the pixel at `(x, y)` where `y = 0` is the bottom row.
    /// Out-of-range writes are ignored.
    pub fn put(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if let Some(i) = self.offset(x, y) {
            self.pixels[i..i + BYTES_PER_PIXEL].copy_from_slice(&rgba);
        }
    }

    /// Fill every pixel.
    pub fn clear(&mut self, rgba: [u8; 4]) {
        for px in self.pixels.chunks_exact_mut(BYTES_PER_PIXEL) {
            px.copy_from_slice(&rgba);
        }
    }

    /// Copy the contents into `out`, reusing its allocation.
    pub fn read_pixels(&self, out: &mut Vec<u8>) {
        out.clear();
        out.extend_from_slice(&self.pixels);
    }
}

/// Copy bottom-up `src` pixels into the top-down `dst`, flipping rows and
/// scaling nearest-neighbour to the destination size.
///
/// Every destination pixel is written, so nothing from a previous frame
/// survives. A `src` that is too short for its stated size leaves `dst`
/// untouched.
///
/// ```
/// use robot_display::{Raster, copy_flipped};
///
/// // 1x2 source: bottom row red, top row blue.
/// let src = [255, 0, 0, 255, 0, 0, 255, 255];
/// let mut dst = Raster::new(1, 2);
/// copy_flipped(&src, 1, 2, &mut dst);
/// assert_eq!(dst.get(0, 0), Some([0, 0, 255, 255]));
/// assert_eq!(dst.get(0, 1), Some([255, 0, 0, 255]));
/// ```
#[allow(clippy::cast_possible_truncation)]
pub fn copy_flipped(src: &[u8], src_width: u32, src_height: u32, dst: &mut Raster) {
    let needed = src_width as usize * src_height as usize * BYTES_PER_PIXEL;
    if src_width == 0 || src_height == 0 || src.len() < needed {
        return;
    }
    let (dw, dh) = (u64::from(dst.width()), u64::from(dst.height()));
    let (sw, sh) = (u64::from(src_width), u64::from(src_height));

    dst.for_each_pixel_mut(|x, y, px| {
        let sx = u64::from(x) * sw / dw;
        let sy = u64::from(y) * sh / dh;
        let src_row = sh - 1 - sy;
        let i = ((src_row * sw + sx) as usize) * BYTES_PER_PIXEL;
        px.copy_from_slice(&src[i..i + BYTES_PER_PIXEL]);
    });
}

/// Capture resolution and camera placement.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CaptureParams {
    /// Render target width.
    pub width: u32,
    /// Render target height.
    pub height: u32,
    /// POV vertical field of view (radians).
    pub pov_fov_y: f64,
    /// Security vertical field of view (radians).
    pub security_fov_y: f64,
    /// POV eye height above the head centre.
    pub pov_vertical_offset: f64,
    /// Fixed POV pitch (radians, negative looks down).
    pub pov_pitch: f64,
    /// Security camera mount position.
    pub security_mount: Point3<f64>,
    /// Height above the robot base the security camera aims at.
    pub security_frame_height: f64,
}

impl Default for CaptureParams {
    fn default() -> Self {
        Self {
            width: 640,
            height: 360,
            pov_fov_y: 70f64.to_radians(),
            security_fov_y: 50f64.to_radians(),
            pov_vertical_offset: 0.05,
            pov_pitch: -0.12,
            security_mount: Point3::new(-8.0, 5.5, 11.0),
            security_frame_height: 0.6,
        }
    }
}

impl CaptureParams {
    /// Quarter-resolution targets for previews and tests.
    #[must_use]
    pub fn preview() -> Self {
        Self::default().with_size(160, 90)
    }

    /// Set the render target size.
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the security camera mount.
    #[must_use]
    pub fn with_security_mount(mut self, mount: Point3<f64>) -> Self {
        self.security_mount = mount;
        self
    }

    /// Check sizes and angles.
    ///
    /// # Errors
    ///
    /// Returns [`RobotError::InvalidConfig`] for an empty target, a field of
    /// view outside `(0, π)`, or non-finite placement.
    pub fn validate(&self) -> robot_types::Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RobotError::invalid_config(format!(
                "capture size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        for (name, fov) in [
            ("pov_fov_y", self.pov_fov_y),
            ("security_fov_y", self.security_fov_y),
        ] {
            ensure_positive(name, fov)?;
            if fov >= PI {
                return Err(RobotError::invalid_config(format!(
                    "{name} must be below pi, got {fov}"
                )));
            }
        }
        let finite = self.pov_vertical_offset.is_finite()
            && self.pov_pitch.is_finite()
            && self.security_frame_height.is_finite()
            && self.security_mount.coords.iter().all(|c| c.is_finite());
        if !finite {
            return Err(RobotError::invalid_config("camera placement must be finite"));
        }
        Ok(())
    }
}

/// Why a rig did not capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The destination surface is not mounted.
    SurfaceMissing,
}

/// Result of one rig in one capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// Pixels were copied and post-processed.
    Captured {
        /// Rig.
        kind: CameraKind,
        /// Surface written.
        surface: SurfaceHandle,
    },
    /// Nothing was written; the rig retries next capture.
    Skipped {
        /// Rig.
        kind: CameraKind,
        /// Why.
        reason: SkipReason,
    },
}

impl CaptureOutcome {
    /// Rig this outcome belongs to.
    #[must_use]
    pub fn kind(&self) -> CameraKind {
        match self {
            Self::Captured { kind, .. } | Self::Skipped { kind, .. } => *kind,
        }
    }

    /// True if a surface was written.
    #[must_use]
    pub fn is_captured(&self) -> bool {
        matches!(self, Self::Captured { .. })
    }
}

/// One virtual camera with its off-screen target and destination.
#[derive(Debug, Clone)]
pub struct CameraRig {
    kind: CameraKind,
    view: CameraView,
    look_target: Point3<f64>,
    mount_yaw: f64,
    render_target: RenderTarget,
    readback: Vec<u8>,
    surface: SurfaceHandle,
    post: PostProcess,
}

impl CameraRig {
    fn new(kind: CameraKind, params: &CaptureParams) -> Self {
        let (surface, post, fov, eye) = match kind {
            CameraKind::Pov => (
                SurfaceHandle::POV,
                PostProcess::pov(),
                params.pov_fov_y,
                Point3::origin(),
            ),
            CameraKind::Security => (
                SurfaceHandle::SECURITY,
                PostProcess::security(),
                params.security_fov_y,
                params.security_mount,
            ),
        };
        let look_target = eye + Vector3::z();
        Self {
            kind,
            view: CameraView::look_at(eye, look_target, fov),
            look_target,
            mount_yaw: 0.0,
            render_target: RenderTarget::new(params.width, params.height),
            readback: Vec::new(),
            surface,
            post,
        }
    }

    /// Which rig.
    #[must_use]
    pub fn kind(&self) -> CameraKind {
        self.kind
    }

    /// View used by the most recent aim.
    #[must_use]
    pub fn view(&self) -> &CameraView {
        &self.view
    }

    /// Eye position.
    #[must_use]
    pub fn eye(&self) -> Point3<f64> {
        self.view.eye()
    }

    /// Point the camera was aimed at.
    #[must_use]
    pub fn look_target(&self) -> Point3<f64> {
        self.look_target
    }

    /// Yaw of the mount. Only the security rig turns its mount.
    #[must_use]
    pub fn mount_yaw(&self) -> f64 {
        self.mount_yaw
    }

    /// Off-screen target.
    #[must_use]
    pub fn render_target(&self) -> &RenderTarget {
        &self.render_target
    }

    /// Bytes of the last readback (bottom-up rows).
    #[must_use]
    pub fn readback(&self) -> &[u8] {
        &self.readback
    }

    /// Destination surface.
    #[must_use]
    pub fn surface(&self) -> &SurfaceHandle {
        &self.surface
    }

    /// Post-process settings.
    #[must_use]
    pub fn post_process(&self) -> &PostProcess {
        &self.post
    }

    /// Re-aim at the robot.
    pub fn aim(&mut self, robot: &RobotModel, params: &CaptureParams) -> CameraView {
        match self.kind {
            CameraKind::Pov => {
                let eye = robot.head_center() + Vector3::y() * params.pov_vertical_offset;
                let pitch = params.pov_pitch + robot.idle.head_pitch_offset;
                self.view =
                    CameraView::from_yaw_pitch(eye, robot.head_heading(), pitch, params.pov_fov_y);
                self.look_target = eye + self.view.forward();
            }
            CameraKind::Security => {
                let mount = params.security_mount;
                let base = robot.pose.world_base();
                let target = base + Vector3::y() * params.security_frame_height;
                let (dx, dz) = (target.x - mount.x, target.z - mount.z);
                if dx.abs() > f64::EPSILON || dz.abs() > f64::EPSILON {
                    self.mount_yaw = dx.atan2(dz);
                }
                self.view = CameraView::look_at(mount, target, params.security_fov_y);
                self.look_target = target;
            }
        }
        self.view
    }

    fn capture<R: SceneRenderer + ?Sized>(
        &mut self,
        params: &CaptureParams,
        scene: &mut Scene<'_>,
        renderer: &mut R,
        surfaces: &mut DisplaySurfaces,
    ) -> CaptureOutcome {
        let Some(surface) = surfaces.get_mut(&self.surface) else {
            debug!(
                camera = %self.kind,
                surface = %self.surface,
                "capture skipped, surface not mounted"
            );
            return CaptureOutcome::Skipped {
                kind: self.kind,
                reason: SkipReason::SurfaceMissing,
            };
        };

        let view = self.aim(&scene.robot, params);
        match self.kind {
            CameraKind::Pov => {
                let hidden = scene.hide_robot();
                renderer.render(&hidden, &view, &mut self.render_target);
            }
            CameraKind::Security => renderer.render(scene, &view, &mut self.render_target),
        }

        self.render_target.read_pixels(&mut self.readback);
        let raster = surface.raster_mut();
        copy_flipped(
            &self.readback,
            self.render_target.width(),
            self.render_target.height(),
            raster,
        );
        self.post.apply(raster);
        surface.touch();

        trace!(
            camera = %self.kind,
            surface = %self.surface,
            revision = surface.revision(),
            "capture written"
        );
        CaptureOutcome::Captured {
            kind: self.kind,
            surface: self.surface.clone(),
        }
    }
}

/// Both camera rigs and their shared settings.
///
/// # Example
///
/// ```
/// use robot_display::{
///     CaptureParams, CapturePipeline, DisplaySurfaces, RaycastRenderer, RobotModel, Scene,
///     SurfaceHandle,
/// };
/// use robot_motion::ObstacleRegistry;
///
/// let mut pipeline = CapturePipeline::new(CaptureParams::default().with_size(32, 18)).unwrap();
/// let obstacles = ObstacleRegistry::warehouse();
/// let mut scene = Scene::new(&obstacles, RobotModel::default());
/// let mut surfaces = DisplaySurfaces::new();
/// surfaces.mount(SurfaceHandle::POV, 32, 18).unwrap();
///
/// let outcomes = pipeline.capture(&mut scene, &mut RaycastRenderer::default(), &mut surfaces);
/// assert!(outcomes[0].is_captured());
/// assert!(!outcomes[1].is_captured()); // security surface not mounted yet
/// ```
#[derive(Debug, Clone)]
pub struct CapturePipeline {
    params: CaptureParams,
    rigs: [CameraRig; 2],
}

impl CapturePipeline {
    /// Build both rigs.
    ///
    /// # Errors
    ///
    /// Returns [`RobotError::InvalidConfig`] if `params` fail validation.
    pub fn new(params: CaptureParams) -> robot_types::Result<Self> {
        params.validate()?;
        debug!(width = params.width, height = params.height, "capture pipeline created");
        Ok(Self {
            rigs: CameraKind::ALL.map(|kind| CameraRig::new(kind, &params)),
            params,
        })
    }

    /// Settings.
    #[must_use]
    pub fn params(&self) -> &CaptureParams {
        &self.params
    }

    /// Both rigs in capture order.
    #[must_use]
    pub fn rigs(&self) -> &[CameraRig] {
        &self.rigs
    }

    /// One rig.
    #[must_use]
    pub fn rig(&self, kind: CameraKind) -> &CameraRig {
        &self.rigs[Self::index(kind)]
    }

    /// Replace a rig's post-process settings.
    pub fn set_post_process(&mut self, kind: CameraKind, post: PostProcess) {
        self.rigs[Self::index(kind)].post = post;
    }

    /// Point a rig at a different surface.
    pub fn set_surface(&mut self, kind: CameraKind, surface: SurfaceHandle) {
        self.rigs[Self::index(kind)].surface = surface;
    }

    const fn index(kind: CameraKind) -> usize {
        match kind {
            CameraKind::Pov => 0,
            CameraKind::Security => 1,
        }
    }

    /// Render, read back, flip-copy and post-process both rigs.
    ///
    /// The robot is hidden only while the POV rig renders and is visible
    /// again when this returns.
    pub fn capture<R: SceneRenderer + ?Sized>(
        &mut self,
        scene: &mut Scene<'_>,
        renderer: &mut R,
        surfaces: &mut DisplaySurfaces,
    ) -> SmallVec<[CaptureOutcome; 2]> {
        let params = &self.params;
        self.rigs
            .iter_mut()
            .map(|rig| rig.capture(params, scene, renderer, surfaces))
            .collect()
    }
}
