//! End-to-end capture of the warehouse scene with the software renderer.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use nalgebra::Point2;
use robot_display::{
    CameraKind, CaptureParams, CapturePipeline, DisplaySurfaces, ExpressionDisplay, PostProcess,
    RaycastRenderer, RobotModel, Scene, SurfaceHandle,
};
use robot_motion::ObstacleRegistry;
use robot_types::{ExpressionId, Rgb, RobotPose};

const W: u32 = 48;
const H: u32 = 27;

fn setup() -> (CapturePipeline, DisplaySurfaces, ObstacleRegistry) {
    let pipeline = CapturePipeline::new(CaptureParams::default().with_size(W, H)).unwrap();
    let mut surfaces = DisplaySurfaces::new();
    surfaces.mount(SurfaceHandle::POV, W, H).unwrap();
    surfaces.mount(SurfaceHandle::SECURITY, W, H).unwrap();
    (pipeline, surfaces, ObstacleRegistry::warehouse())
}

fn distinct_colours(surfaces: &DisplaySurfaces, handle: &SurfaceHandle) -> usize {
    let mut seen: Vec<&[u8]> = surfaces
        .get(handle)
        .unwrap()
        .raster()
        .pixels()
        .chunks_exact(4)
        .collect();
    seen.sort_unstable();
    seen.dedup();
    seen.len()
}

// =============================================================================
// Camera feeds
// =============================================================================

#[test]
fn both_feeds_show_a_scene() {
    let (mut pipeline, mut surfaces, obstacles) = setup();
    let mut scene = Scene::new(&obstacles, RobotModel::default());
    let outcomes = pipeline.capture(&mut scene, &mut RaycastRenderer::default(), &mut surfaces);

    assert!(outcomes.iter().all(robot_display::CaptureOutcome::is_captured));
    for handle in [SurfaceHandle::POV, SurfaceHandle::SECURITY] {
        assert_eq!(surfaces.get(&handle).unwrap().revision(), 1);
        assert!(distinct_colours(&surfaces, &handle) > 8, "{handle} looks flat");
    }
}

#[test]
fn security_feed_sees_the_robot_move() {
    let (mut pipeline, mut surfaces, obstacles) = setup();
    let mut renderer = RaycastRenderer::default();

    let mut scene = Scene::new(&obstacles, RobotModel::default());
    pipeline.capture(&mut scene, &mut renderer, &mut surfaces);
    let before = surfaces.get(&SurfaceHandle::SECURITY).unwrap().raster().clone();
    let yaw_before = pipeline.rig(CameraKind::Security).mount_yaw();

    scene.robot.pose = RobotPose::at(Point2::new(4.0, 2.0), 1.0);
    pipeline.capture(&mut scene, &mut renderer, &mut surfaces);
    let after = surfaces.get(&SurfaceHandle::SECURITY).unwrap().raster();

    assert_ne!(&before, after);
    let yaw_after = pipeline.rig(CameraKind::Security).mount_yaw();
    assert!((yaw_after - yaw_before).abs() > 0.1);
}

#[test]
fn pov_feed_never_sees_its_own_body() {
    let (mut pipeline, mut surfaces, obstacles) = setup();
    for kind in CameraKind::ALL {
        pipeline.set_post_process(kind, PostProcess::none());
    }
    let mut renderer = RaycastRenderer::default();

    // A body colour that appears nowhere else in the scene.
    let mut robot = RobotModel::default();
    robot.appearance.body = Rgb::new(255, 0, 255);
    robot.appearance.accent = Rgb::new(255, 0, 255);
    robot.dimensions.body_radius = 3.0;
    let mut scene = Scene::new(&obstacles, robot);
    pipeline.capture(&mut scene, &mut renderer, &mut surfaces);

    let pov = surfaces.get(&SurfaceHandle::POV).unwrap().raster();
    let magenta = pov
        .pixels()
        .chunks_exact(4)
        .filter(|p| p[0] > 200 && p[1] < 40 && p[2] > 200)
        .count();
    assert_eq!(magenta, 0);
    assert!(scene.robot_visible());
}

#[test]
fn unmounting_mid_run_skips_only_that_feed() {
    let (mut pipeline, mut surfaces, obstacles) = setup();
    let mut scene = Scene::new(&obstacles, RobotModel::default());
    let mut renderer = RaycastRenderer::default();

    pipeline.capture(&mut scene, &mut renderer, &mut surfaces);
    surfaces.unmount(&SurfaceHandle::POV);
    let outcomes = pipeline.capture(&mut scene, &mut renderer, &mut surfaces);

    assert!(!outcomes[0].is_captured());
    assert!(outcomes[1].is_captured());
    assert_eq!(surfaces.get(&SurfaceHandle::SECURITY).unwrap().revision(), 2);
}

#[test]
fn surfaces_of_other_sizes_are_filled() {
    let (mut pipeline, _, obstacles) = setup();
    let mut surfaces = DisplaySurfaces::new();
    surfaces.mount(SurfaceHandle::POV, W * 2 + 1, H / 2).unwrap();
    surfaces.mount(SurfaceHandle::SECURITY, 5, 3).unwrap();
    let mut scene = Scene::new(&obstacles, RobotModel::default());
    pipeline.capture(&mut scene, &mut RaycastRenderer::default(), &mut surfaces);

    for (_, surface) in surfaces.iter() {
        // Surfaces mount black; nothing in the lit scene renders pure black.
        assert_eq!(surface.revision(), 1);
        assert!(surface.raster().pixels().chunks_exact(4).all(|p| p[..3] != [0, 0, 0]));
    }
}

// =============================================================================
// LCD
// =============================================================================

#[test]
fn lcd_redraw_tracks_revisions() {
    let mut lcd = ExpressionDisplay::default();
    assert!(!lcd.is_dirty());
    lcd.draw(ExpressionId::Loading, Rgb::new(0, 229, 255), 0.25, None);
    lcd.draw(ExpressionId::Loading, Rgb::new(0, 229, 255), 0.5, Some("booting"));
    assert_eq!(lcd.revision(), 2);
    assert!(lcd.take_dirty());
    assert!(!lcd.take_dirty());
}
