//! Software scene rendering by per-pixel ray casting.
//!
//! [`SceneRenderer`] is the backend seam of the capture pipeline. The
//! [`RaycastRenderer`] implementation needs no GPU: it intersects one ray per
//! pixel with a checkered floor, wall boxes, prop cylinders and the robot, then
//! shades with a single directional light and distance fog.
//!
//! # Camera conventions
//!
//! Y is up. A yaw of zero looks along +Z and positive yaw turns toward +X, the
//! same convention as the robot heading. Pixel coordinates passed to
//! [`CameraView::ray_for_pixel`] and returned by [`CameraView::project`] are
//! image coordinates with `y` growing downward.

use nalgebra::{Point2, Point3, Vector3};
use robot_motion::ObstacleShape;
use robot_types::Rgb;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::capture::RenderTarget;
use crate::scene::Scene;

/// Hits closer than this are treated as self-intersections.
const HIT_EPSILON: f64 = 1e-6;

/// A ray defined by an origin point and a direction vector.
///
/// ```
/// use robot_display::Ray;
/// use nalgebra::{Point3, Vector3};
///
/// let ray = Ray::new(Point3::origin(), Vector3::new(2.0, 0.0, 0.0));
/// let p = ray.point_at(3.0);
/// assert!((p.x - 6.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Start of the ray.
    pub origin: Point3<f64>,
    /// Direction (not necessarily normalized).
    pub direction: Vector3<f64>,
}

impl Ray {
    /// Creates a ray.
    #[must_use]
    pub const fn new(origin: Point3<f64>, direction: Vector3<f64>) -> Self {
        Self { origin, direction }
    }

    /// `origin + t * direction`.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point3<f64> {
        self.origin + self.direction * t
    }

    /// The same ray with a unit direction. Zero directions are left unchanged.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let norm = self.direction.norm();
        if norm < f64::EPSILON {
            return *self;
        }
        Self {
            origin: self.origin,
            direction: self.direction / norm,
        }
    }
}

/// A pinhole camera: position, orthonormal basis and vertical field of view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    eye: Point3<f64>,
    forward: Vector3<f64>,
    right: Vector3<f64>,
    up: Vector3<f64>,
    fov_y: f64,
}

impl CameraView {
    /// Camera at `eye` looking at `target`.
    ///
    /// A degenerate direction (target on the eye) looks along +Z. Looking
    /// straight up or down keeps +X as the right axis.
    #[must_use]
    pub fn look_at(eye: Point3<f64>, target: Point3<f64>, fov_y: f64) -> Self {
        let forward = (target - eye)
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(Vector3::z);
        Self::from_forward(eye, forward, fov_y)
    }

    /// Camera at `eye` with the given yaw and pitch (positive pitch looks up).
    ///
    /// ```
    /// use robot_display::CameraView;
    /// use nalgebra::Point3;
    ///
    /// let view = CameraView::from_yaw_pitch(Point3::origin(), 0.0, 0.0, 1.0);
    /// assert!((view.forward().z - 1.0).abs() < 1e-12);
    /// assert!((view.right().x + 1.0).abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn from_yaw_pitch(eye: Point3<f64>, yaw: f64, pitch: f64, fov_y: f64) -> Self {
        let (sy, cy) = yaw.sin_cos();
        let (sp, cp) = pitch.sin_cos();
        Self::from_forward(eye, Vector3::new(sy * cp, sp, cy * cp), fov_y)
    }

    fn from_forward(eye: Point3<f64>, forward: Vector3<f64>, fov_y: f64) -> Self {
        let right = forward
            .cross(&Vector3::y())
            .try_normalize(1e-9)
            .unwrap_or_else(Vector3::x);
        let up = right.cross(&forward);
        Self {
            eye,
            forward,
            right,
            up,
            fov_y,
        }
    }

    /// Camera position.
    #[must_use]
    pub fn eye(&self) -> Point3<f64> {
        self.eye
    }

    /// Unit view direction.
    #[must_use]
    pub fn forward(&self) -> Vector3<f64> {
        self.forward
    }

    /// Unit right axis.
    #[must_use]
    pub fn right(&self) -> Vector3<f64> {
        self.right
    }

    /// Unit up axis.
    #[must_use]
    pub fn up(&self) -> Vector3<f64> {
        self.up
    }

    /// Vertical field of view (radians).
    #[must_use]
    pub fn fov_y(&self) -> f64 {
        self.fov_y
    }

    /// Horizontal field of view for an image aspect ratio (width / height).
    #[must_use]
    pub fn fov_x(&self, aspect: f64) -> f64 {
        2.0 * ((self.fov_y * 0.5).tan() * aspect).atan()
    }

    /// Unit ray through the centre of pixel `(x, y)` of a `width`×`height` image.
    #[must_use]
    pub fn ray_for_pixel(&self, x: u32, y: u32, width: u32, height: u32) -> Ray {
        let w = f64::from(width.max(1));
        let h = f64::from(height.max(1));
        let u = (f64::from(x) + 0.5) / w * 2.0 - 1.0;
        let v = 1.0 - (f64::from(y) + 0.5) / h * 2.0;
        let tan_y = (self.fov_y * 0.5).tan();
        let tan_x = tan_y * w / h;
        let direction = self.forward + self.right * (u * tan_x) + self.up * (v * tan_y);
        Ray::new(self.eye, direction).normalized()
    }

    /// Image coordinates of a world point, or `None` if it is behind the camera.
    #[must_use]
    pub fn project(&self, point: Point3<f64>, width: u32, height: u32) -> Option<[f64; 2]> {
        let d = point - self.eye;
        let depth = d.dot(&self.forward);
        if depth <= HIT_EPSILON {
            return None;
        }
        let w = f64::from(width.max(1));
        let h = f64::from(height.max(1));
        let tan_y = (self.fov_y * 0.5).tan();
        let tan_x = tan_y * w / h;
        let u = d.dot(&self.right) / (depth * tan_x);
        let v = d.dot(&self.up) / (depth * tan_y);
        Some([(u + 1.0) * 0.5 * w, (1.0 - v) * 0.5 * h])
    }
}

/// A backend that draws a [`Scene`] into an off-screen target.
pub trait SceneRenderer {
    /// Render `scene` as seen from `view`, overwriting every pixel of `target`.
    fn render(&mut self, scene: &Scene<'_>, view: &CameraView, target: &mut RenderTarget);
}

/// Lighting and palette of the software renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RaycastSettings {
    /// Edge length of a floor checker tile.
    pub checker_size: f64,
    /// First floor colour.
    pub floor_a: Rgb,
    /// Second floor colour.
    pub floor_b: Rgb,
    /// Sky colour straight up.
    pub sky_zenith: Rgb,
    /// Sky colour at the horizon.
    pub sky_horizon: Rgb,
    /// Direction toward the light (need not be unit length).
    pub light_direction: Vector3<f64>,
    /// Light that reaches surfaces facing away from the light, in `[0, 1]`.
    pub ambient: f64,
    /// Distance at which fog starts.
    pub fog_start: f64,
    /// Distance at which fog is opaque.
    pub fog_end: f64,
    /// Fog colour.
    pub fog_color: Rgb,
}

impl Default for RaycastSettings {
    fn default() -> Self {
        Self {
            checker_size: 1.0,
            floor_a: Rgb::new(0x6e, 0x6e, 0x72),
            floor_b: Rgb::new(0x58, 0x58, 0x5c),
            sky_zenith: Rgb::new(0x2a, 0x3a, 0x55),
            sky_horizon: Rgb::new(0x9a, 0xa8, 0xb8),
            light_direction: Vector3::new(0.4, 1.0, 0.3),
            ambient: 0.35,
            fog_start: 12.0,
            fog_end: 40.0,
            fog_color: Rgb::new(0x8a, 0x90, 0x98),
        }
    }
}

/// Surface hit by a ray.
#[derive(Debug, Clone, Copy)]
struct Hit {
    t: f64,
    normal: Vector3<f64>,
    albedo: Rgb,
}

impl Hit {
    fn closer(self, other: Option<Self>) -> Self {
        match other {
            Some(o) if o.t < self.t => o,
            _ => self,
        }
    }
}

fn nearest(current: Option<Hit>, candidate: Option<Hit>) -> Option<Hit> {
    match (current, candidate) {
        (Some(a), b) => Some(a.closer(b)),
        (None, b) => b,
    }
}

/// Deterministic CPU ray caster.
///
/// # Example
///
/// ```
/// use robot_display::{
///     CameraView, RaycastRenderer, RenderTarget, RobotModel, Scene, SceneRenderer,
/// };
/// use robot_motion::ObstacleRegistry;
/// use nalgebra::Point3;
///
/// let obstacles = ObstacleRegistry::warehouse();
/// let scene = Scene::new(&obstacles, RobotModel::default());
/// let view = CameraView::look_at(Point3::new(0.0, 3.0, 6.0), Point3::new(0.0, 1.0, 0.0), 1.0);
///
/// let mut target = RenderTarget::new(32, 18);
/// RaycastRenderer::default().render(&scene, &view, &mut target);
/// assert_eq!(target.pixels().len(), 32 * 18 * 4);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RaycastRenderer {
    settings: RaycastSettings,
}

impl RaycastRenderer {
    /// Renderer with explicit settings.
    #[must_use]
    pub fn new(settings: RaycastSettings) -> Self {
        Self { settings }
    }

    /// Current settings.
    #[must_use]
    pub fn settings(&self) -> &RaycastSettings {
        &self.settings
    }

    /// Colour seen along one unit ray.
    #[must_use]
    pub fn trace(&self, scene: &Scene<'_>, ray: &Ray) -> Rgb {
        match self.closest_hit(scene, ray) {
            Some(hit) => self.shade(&hit),
            None => self.sky(ray.direction.y),
        }
    }

    fn closest_hit(&self, scene: &Scene<'_>, ray: &Ray) -> Option<Hit> {
        let mut best = self.floor_hit(ray);

        for obstacle in scene.obstacles.iter() {
            let candidate = match obstacle.shape {
                ObstacleShape::Rect(bounds) => intersect_box(
                    ray,
                    Point3::new(bounds.min.x, 0.0, bounds.min.y),
                    Point3::new(bounds.max.x, obstacle.height, bounds.max.y),
                ),
                ObstacleShape::Circle { center, radius } => {
                    intersect_cylinder(ray, center, radius, 0.0, obstacle.height)
                }
            };
            best = nearest(
                best,
                candidate.map(|(t, normal)| Hit {
                    t,
                    normal,
                    albedo: obstacle.color,
                }),
            );
        }

        if scene.robot_visible() {
            best = nearest(best, robot_hit(scene, ray));
        }
        best
    }

    #[allow(clippy::cast_possible_truncation)]
    fn floor_hit(&self, ray: &Ray) -> Option<Hit> {
        if ray.direction.y >= -HIT_EPSILON {
            return None;
        }
        let t = -ray.origin.y / ray.direction.y;
        if t <= HIT_EPSILON {
            return None;
        }
        let p = ray.point_at(t);
        let size = self.settings.checker_size.max(f64::EPSILON);
        let cell = (p.x / size).floor() as i64 + (p.z / size).floor() as i64;
        let albedo = if cell.rem_euclid(2) == 0 {
            self.settings.floor_a
        } else {
            self.settings.floor_b
        };
        Some(Hit {
            t,
            normal: Vector3::y(),
            albedo,
        })
    }

    fn shade(&self, hit: &Hit) -> Rgb {
        let s = &self.settings;
        let light = s.light_direction.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::y);
        let lambert = hit.normal.dot(&light).max(0.0);
        let ambient = s.ambient.clamp(0.0, 1.0);
        let lit = hit.albedo.scaled(ambient + (1.0 - ambient) * lambert);

        let span = (s.fog_end - s.fog_start).max(f64::EPSILON);
        let fog = ((hit.t - s.fog_start) / span).clamp(0.0, 1.0);
        lit.lerp(s.fog_color, fog)
    }

    fn sky(&self, direction_y: f64) -> Rgb {
        self.settings
            .sky_horizon
            .lerp(self.settings.sky_zenith, direction_y.clamp(0.0, 1.0))
    }
}

impl SceneRenderer for RaycastRenderer {
    fn render(&mut self, scene: &Scene<'_>, view: &CameraView, target: &mut RenderTarget) {
        let (width, height) = (target.width(), target.height());
        for y in 0..height {
            // Targets store rows bottom-up.
            let row = height - 1 - y;
            for x in 0..width {
                let ray = view.ray_for_pixel(x, y, width, height);
                let c = self.trace(scene, &ray);
                target.put(x, row, [c.r, c.g, c.b, 255]);
            }
        }
    }
}

fn robot_hit(scene: &Scene<'_>, ray: &Ray) -> Option<Hit> {
    let robot = &scene.robot;
    let dims = &robot.dimensions;
    let base = robot.pose.world_base();

    let body = intersect_cylinder(
        ray,
        robot.pose.position,
        dims.body_radius,
        base.y + dims.body_bottom,
        base.y + dims.body_top,
    )
    .map(|(t, normal)| Hit {
        t,
        normal,
        albedo: robot.appearance.body,
    });

    let facing = robot.head_forward();
    let facing = Vector3::new(facing.x, 0.0, facing.y);
    let head = intersect_sphere(ray, robot.head_center(), dims.head_radius).map(|(t, normal)| Hit {
        t,
        normal,
        albedo: if normal.dot(&facing) > dims.face_cos {
            robot.appearance.accent
        } else {
            robot.appearance.body
        },
    });

    nearest(body, head)
}

/// Slab test against an axis-aligned box. Returns `(t, outward normal)`.
fn intersect_box(ray: &Ray, min: Point3<f64>, max: Point3<f64>) -> Option<(f64, Vector3<f64>)> {
    let mut t_near = f64::NEG_INFINITY;
    let mut t_far = f64::INFINITY;
    let mut normal = Vector3::zeros();

    for axis in 0..3 {
        let o = ray.origin[axis];
        let d = ray.direction[axis];
        if d.abs() < f64::EPSILON {
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }
        let mut t0 = (min[axis] - o) / d;
        let mut t1 = (max[axis] - o) / d;
        let mut sign = -1.0;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
            sign = 1.0;
        }
        if t0 > t_near {
            t_near = t0;
            normal = Vector3::zeros();
            normal[axis] = sign;
        }
        t_far = t_far.min(t1);
        if t_near > t_far {
            return None;
        }
    }

    (t_near > HIT_EPSILON).then_some((t_near, normal))
}

/// Vertical capped cylinder over `center` spanning `y0..y1`.
fn intersect_cylinder(
    ray: &Ray,
    center: Point2<f64>,
    radius: f64,
    y0: f64,
    y1: f64,
) -> Option<(f64, Vector3<f64>)> {
    if radius <= 0.0 || y1 <= y0 {
        return None;
    }
    let ox = ray.origin.x - center.x;
    let oz = ray.origin.z - center.y;
    let (dx, dz) = (ray.direction.x, ray.direction.z);

    let mut best: Option<(f64, Vector3<f64>)> = None;

    let a = dx * dx + dz * dz;
    if a > f64::EPSILON {
        let b = 2.0 * (ox * dx + oz * dz);
        let c = ox * ox + oz * oz - radius * radius;
        let disc = b * b - 4.0 * a * c;
        if disc >= 0.0 {
            let t = (-b - disc.sqrt()) / (2.0 * a);
            if t > HIT_EPSILON {
                let y = ray.origin.y + ray.direction.y * t;
                if (y0..=y1).contains(&y) {
                    let normal = Vector3::new(ox + dx * t, 0.0, oz + dz * t) / radius;
                    best = Some((t, normal));
                }
            }
        }
    }

    // Top cap, seen from above.
    if ray.direction.y < -f64::EPSILON && ray.origin.y > y1 {
        let t = (y1 - ray.origin.y) / ray.direction.y;
        let px = ox + dx * t;
        let pz = oz + dz * t;
        if t > HIT_EPSILON
            && px * px + pz * pz <= radius * radius
            && best.is_none_or(|(bt, _)| t < bt)
        {
            best = Some((t, Vector3::y()));
        }
    }
    best
}

fn intersect_sphere(ray: &Ray, center: Point3<f64>, radius: f64) -> Option<(f64, Vector3<f64>)> {
    let oc = ray.origin - center;
    let a = ray.direction.norm_squared();
    if a < f64::EPSILON || radius <= 0.0 {
        return None;
    }
    let half_b = oc.dot(&ray.direction);
    let c = oc.norm_squared() - radius * radius;
    let disc = half_b * half_b - a * c;
    if disc < 0.0 {
        return None;
    }
    let t = (-half_b - disc.sqrt()) / a;
    if t <= HIT_EPSILON {
        return None;
    }
    let normal = (ray.point_at(t) - center) / radius;
    Some((t, normal))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::scene::RobotModel;
    use approx::assert_relative_eq;
    use robot_motion::ObstacleRegistry;
    use robot_types::{Appearance, RobotPose};

    fn pixel(target: &RenderTarget, x: u32, y_from_top: u32) -> [u8; 4] {
        target.get(x, target.height() - 1 - y_from_top).unwrap()
    }

    #[test]
    fn basis_is_orthonormal() {
        let view = CameraView::look_at(
            Point3::new(-8.0, 5.5, 11.0),
            Point3::new(1.0, 0.6, -2.0),
            0.9,
        );
        assert_relative_eq!(view.forward().norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(view.right().norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(view.up().norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(view.forward().dot(&view.right()), 0.0, epsilon = 1e-12);
        assert_relative_eq!(view.forward().dot(&view.up()), 0.0, epsilon = 1e-12);
        assert!(view.up().y > 0.0);
    }

    #[test]
    fn right_axis_matches_robot_right() {
        let view = CameraView::from_yaw_pitch(Point3::origin(), 0.7, 0.0, 1.0);
        let r = robot_types::right_axis(0.7);
        assert_relative_eq!(view.right().x, r.x, epsilon = 1e-12);
        assert_relative_eq!(view.right().z, r.y, epsilon = 1e-12);
    }

    #[test]
    fn centre_pixel_looks_at_target() {
        let target = Point3::new(2.0, 1.0, 5.0);
        let view = CameraView::look_at(Point3::new(0.0, 2.0, 0.0), target, 1.2);
        let ray = view.ray_for_pixel(1, 1, 3, 3);
        let expected = (target - view.eye()).normalize();
        assert_relative_eq!(ray.direction, expected, epsilon = 1e-12);
    }

    #[test]
    fn project_inverts_ray_for_pixel() {
        let view = CameraView::from_yaw_pitch(Point3::new(1.0, 1.5, -2.0), 0.3, -0.2, 1.1);
        let ray = view.ray_for_pixel(17, 5, 64, 36);
        let [px, py] = view.project(ray.point_at(7.0), 64, 36).unwrap();
        assert_relative_eq!(px, 17.5, epsilon = 1e-9);
        assert_relative_eq!(py, 5.5, epsilon = 1e-9);
    }

    #[test]
    fn points_behind_do_not_project() {
        let view = CameraView::from_yaw_pitch(Point3::origin(), 0.0, 0.0, 1.0);
        assert!(view.project(Point3::new(0.0, 0.0, -1.0), 10, 10).is_none());
    }

    #[test]
    fn fov_x_follows_aspect() {
        let view = CameraView::from_yaw_pitch(Point3::origin(), 0.0, 0.0, 1.0);
        assert_relative_eq!(view.fov_x(1.0), 1.0, epsilon = 1e-12);
        assert!(view.fov_x(16.0 / 9.0) > 1.0);
    }

    #[test]
    fn degenerate_look_at_stays_finite() {
        let eye = Point3::new(1.0, 1.0, 1.0);
        let same = CameraView::look_at(eye, eye, 1.0);
        assert_eq!(same.forward(), Vector3::z());
        let down = CameraView::look_at(eye, Point3::new(1.0, -5.0, 1.0), 1.0);
        assert_eq!(down.right(), Vector3::x());
        assert!(down.up().iter().all(|c| c.is_finite()));
    }

    #[test]
    fn sky_above_floor_below() {
        let obstacles = ObstacleRegistry::new();
        let scene = Scene::new(&obstacles, RobotModel::default());
        let view = CameraView::from_yaw_pitch(Point3::new(0.0, 1.0, -30.0), 0.0, 0.0, 1.0);
        let mut target = RenderTarget::new(16, 16);
        RaycastRenderer::default().render(&scene, &view, &mut target);

        let settings = RaycastSettings::default();
        let top = pixel(&target, 8, 0);
        assert!(top[2] > top[0]);
        let bottom = pixel(&target, 8, 15);
        let floor = [settings.floor_a, settings.floor_b];
        assert!(floor.iter().any(|c| bottom[0] <= c.r));
    }

    #[test]
    fn box_hit_reports_entry_face() {
        let ray = Ray::new(Point3::new(-5.0, 0.5, 0.5), Vector3::x());
        let (t, n) =
            intersect_box(&ray, Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0)).unwrap();
        assert_relative_eq!(t, 5.0);
        assert_eq!(n, Vector3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn box_is_missed_from_inside_and_beside() {
        let inside = Ray::new(Point3::new(0.5, 0.5, 0.5), Vector3::x());
        assert!(intersect_box(&inside, Point3::origin(), Point3::new(1.0, 1.0, 1.0)).is_none());
        let beside = Ray::new(Point3::new(-5.0, 2.0, 0.5), Vector3::x());
        assert!(intersect_box(&beside, Point3::origin(), Point3::new(1.0, 1.0, 1.0)).is_none());
    }

    #[test]
    fn cylinder_side_and_cap() {
        let side = Ray::new(Point3::new(0.0, 0.5, -5.0), Vector3::z());
        let (t, n) = intersect_cylinder(&side, Point2::origin(), 1.0, 0.0, 1.0).unwrap();
        assert_relative_eq!(t, 4.0);
        assert_relative_eq!(n, Vector3::new(0.0, 0.0, -1.0));

        let top = Ray::new(Point3::new(0.2, 5.0, 0.0), -Vector3::y());
        let (t, n) = intersect_cylinder(&top, Point2::origin(), 1.0, 0.0, 1.0).unwrap();
        assert_relative_eq!(t, 4.0);
        assert_eq!(n, Vector3::y());

        let over = Ray::new(Point3::new(0.0, 2.0, -5.0), Vector3::z());
        assert!(intersect_cylinder(&over, Point2::origin(), 1.0, 0.0, 1.0).is_none());
    }

    #[test]
    fn sphere_front_hit() {
        let ray = Ray::new(Point3::new(0.0, 0.0, -3.0), Vector3::z());
        let (t, n) = intersect_sphere(&ray, Point3::origin(), 1.0).unwrap();
        assert_relative_eq!(t, 2.0);
        assert_relative_eq!(n, Vector3::new(0.0, 0.0, -1.0));
    }

    fn head_on_view(robot: &RobotModel, from_z: f64) -> CameraView {
        let head = robot.head_center();
        CameraView::look_at(Point3::new(head.x, head.y, from_z), head, 0.5)
    }

    #[test]
    fn face_panel_uses_accent_colour() {
        let obstacles = ObstacleRegistry::new();
        let robot = RobotModel {
            pose: RobotPose::default(),
            appearance: Appearance::default(),
            ..RobotModel::default()
        };
        let scene = Scene::new(&obstacles, robot);
        let mut renderer = RaycastRenderer::default();

        let mut front = RenderTarget::new(5, 5);
        renderer.render(&scene, &head_on_view(&robot, 4.0), &mut front);
        let mut back = RenderTarget::new(5, 5);
        renderer.render(&scene, &head_on_view(&robot, -4.0), &mut back);

        let f = pixel(&front, 2, 2);
        let b = pixel(&back, 2, 2);
        // Accent is cyan, body is near-white.
        assert!(f[0] < b[0]);
        assert!(f[2] > f[0]);
    }

    #[test]
    fn hidden_robot_is_not_drawn() {
        let obstacles = ObstacleRegistry::new();
        let robot = RobotModel::default();
        let mut scene = Scene::new(&obstacles, robot);
        let view = head_on_view(&robot, 4.0);
        let mut renderer = RaycastRenderer::default();

        let mut visible = RenderTarget::new(5, 5);
        renderer.render(&scene, &view, &mut visible);
        let mut hidden_target = RenderTarget::new(5, 5);
        {
            let hidden = scene.hide_robot();
            renderer.render(&hidden, &view, &mut hidden_target);
        }
        assert_ne!(pixel(&visible, 2, 2), pixel(&hidden_target, 2, 2));
    }

    #[test]
    fn rendering_is_deterministic() {
        let obstacles = ObstacleRegistry::warehouse();
        let scene = Scene::new(&obstacles, RobotModel::default());
        let view = CameraView::look_at(
            Point3::new(-8.0, 5.5, 11.0),
            Point3::new(0.0, 0.6, 0.0),
            0.87,
        );
        let mut a = RenderTarget::new(24, 14);
        let mut b = RenderTarget::new(24, 14);
        RaycastRenderer::default().render(&scene, &view, &mut a);
        RaycastRenderer::default().render(&scene, &view, &mut b);
        assert_eq!(a, b);
    }
}
