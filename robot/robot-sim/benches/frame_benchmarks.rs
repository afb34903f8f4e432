//! Benchmarks for the per-frame stages.
//!
//! Run with: cargo bench -p robot-sim

#![allow(missing_docs, clippy::unwrap_used, clippy::cast_precision_loss)]

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use robot_display::{
    CameraView, CaptureParams, ExpressionDisplay, RaycastRenderer, RenderTarget, RobotModel, Scene,
    SceneRenderer, SurfaceHandle,
};
use robot_motion::ObstacleRegistry;
use robot_sim::{SimConfig, Simulation};
use robot_types::{ExpressionId, InputFlag, Rgb};

fn driving_sim(width: u32, height: u32) -> Simulation {
    let config = SimConfig::default()
        .with_seed(3)
        .with_capture(CaptureParams::default().with_size(width, height));
    let mut sim = Simulation::new(config).unwrap();
    sim.mount_surface(SurfaceHandle::POV, width, height).unwrap();
    sim.mount_surface(SurfaceHandle::SECURITY, width, height).unwrap();
    let input = sim.input_handle();
    input.set(InputFlag::Forward, true);
    input.set(InputFlag::TurnLeft, true);
    sim
}

/// Full ticks at 60 Hz, so a third of them capture.
fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");

    for (width, height) in [(160, 90), (320, 180)] {
        let mut sim = driving_sim(width, height);
        let mut frame = 0_u64;
        group.bench_with_input(
            BenchmarkId::new("driving", format!("{width}x{height}")),
            &(),
            |b, ()| {
                b.iter(|| {
                    frame += 1;
                    black_box(sim.tick(frame as f64 / 60.0))
                });
            },
        );
    }

    group.finish();
}

fn bench_raycast(c: &mut Criterion) {
    let mut group = c.benchmark_group("raycast");
    let obstacles = ObstacleRegistry::warehouse();
    let scene = Scene::new(&obstacles, RobotModel::default());
    let view = CameraView::look_at(
        nalgebra::Point3::new(-8.0, 5.5, 11.0),
        nalgebra::Point3::new(0.0, 0.6, 0.0),
        50_f64.to_radians(),
    );
    let mut renderer = RaycastRenderer::default();

    for (width, height) in [(160_u32, 90_u32), (640, 360)] {
        let mut target = RenderTarget::new(width, height);
        group.throughput(Throughput::Elements(u64::from(width * height)));
        group.bench_with_input(
            BenchmarkId::new("security_view", format!("{width}x{height}")),
            &(),
            |b, ()| {
                b.iter(|| renderer.render(black_box(&scene), &view, &mut target));
            },
        );
    }

    group.finish();
}

fn bench_expression(c: &mut Criterion) {
    let mut group = c.benchmark_group("expression");
    let mut lcd = ExpressionDisplay::default();
    let accent = Rgb::new(0, 229, 255);

    group.bench_function("happy", |b| {
        b.iter(|| lcd.draw(black_box(ExpressionId::Happy), accent, 0.5, None));
    });
    group.bench_function("loading", |b| {
        b.iter(|| lcd.draw(black_box(ExpressionId::Loading), accent, 0.5, None));
    });
    group.bench_function("text", |b| {
        b.iter(|| lcd.draw(ExpressionId::Neutral, accent, 0.5, black_box(Some("HELLO WORLD"))));
    });

    group.finish();
}

criterion_group!(benches, bench_tick, bench_raycast, bench_expression);
criterion_main!(benches);
