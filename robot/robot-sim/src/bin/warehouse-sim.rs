//! Headless driver for the warehouse robot simulation.
//!
//! # Commands
//!
//! - `warehouse-sim run` - Drive the robot for a number of frames and write
//!   the camera feeds and LCD as PNGs
//! - `warehouse-sim config` - Print the default configuration as JSON
//!
//! Logging goes through `RUST_LOG` (default `warehouse_sim=info,robot_sim=info`).
//! Needs the `cli` feature: `cargo run -p robot-sim --features cli -- run`.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use robot_display::{Raster, SurfaceHandle};
use robot_sim::{ScriptedSequence, SimConfig, Simulation, TelemetryLatch, TelemetryObserver};
use robot_types::{ExpressionId, InputFlag, KinematicState, RobotPose, TelemetrySample};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Warehouse robot simulation
#[derive(Parser)]
#[command(name = "warehouse-sim")]
#[command(about = "Headless warehouse robot simulation", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the simulation and dump the final frames
    Run(RunArgs),

    /// Print a configuration as JSON
    Config {
        /// Use the small preview capture size
        #[arg(long)]
        preview: bool,
    },
}

#[derive(clap::Args)]
struct RunArgs {
    /// JSON configuration file; missing fields take their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of frames to simulate
    #[arg(long, default_value_t = 300)]
    frames: u32,

    /// Simulated frames per second
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Input flags held for the whole run (e.g. `forward`, `turnLeft`)
    #[arg(long = "hold", value_name = "FLAG")]
    hold: Vec<InputFlag>,

    /// Expression to show
    #[arg(long)]
    expression: Option<ExpressionId>,

    /// Text to show on the LCD for the whole run
    #[arg(long)]
    text: Option<String>,

    /// JSON scripted sequence to play from the first frame
    #[arg(long)]
    script: Option<PathBuf>,

    /// Seed for idle and dust randomness
    #[arg(long)]
    seed: Option<u64>,

    /// Directory for pov.png, security.png, lcd.png and summary.json
    #[arg(long)]
    out: Option<PathBuf>,
}

/// Final state written to `summary.json`.
#[derive(Serialize)]
struct Summary {
    frames: u64,
    time: f64,
    pose: RobotPose,
    kinematics: KinematicState,
    telemetry: Option<TelemetrySample>,
    dust: usize,
    lcd_revision: u64,
    surface_revisions: Vec<(String, u64)>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warehouse_sim=info,robot_sim=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run(&args),
        Commands::Config { preview } => {
            let config = if preview {
                SimConfig::preview()
            } else {
                SimConfig::default()
            };
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn run(args: &RunArgs) -> Result<()> {
    if !(args.fps.is_finite() && args.fps > 0.0) {
        bail!("--fps must be positive, got {}", args.fps);
    }

    let mut config: SimConfig = match &args.config {
        Some(path) => load_json(path)?,
        None => SimConfig::default(),
    };
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    let (width, height) = (config.capture.width, config.capture.height);

    let mut sim = Simulation::new(config).context("invalid configuration")?;
    sim.mount_surface(SurfaceHandle::POV, width, height)?;
    sim.mount_surface(SurfaceHandle::SECURITY, width, height)?;

    let latch = Rc::new(RefCell::new(TelemetryLatch::new()));
    let sink = Rc::clone(&latch);
    sim.add_observer(move |s: TelemetrySample| sink.borrow_mut().observe(s));

    let input = sim.input_handle();
    for flag in &args.hold {
        input.set(*flag, true);
    }
    if let Some(expression) = args.expression {
        sim.set_expression(expression);
    }
    if let Some(text) = &args.text {
        sim.show_text_at(text.clone(), 0.0, f64::INFINITY);
    }

    // The first tick sets the clock; scripts are timed from it.
    sim.tick(0.0);
    if let Some(path) = &args.script {
        let sequence: ScriptedSequence = load_json(path)?;
        sim.begin_script(sequence)?;
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let report_every = (args.fps.round() as u64).max(1);
    for frame in 1..args.frames {
        let report = sim.tick(f64::from(frame) / args.fps);
        if report.collided {
            warn!(frame = report.frame, "collision");
        }
        if report.frame % report_every == 0 {
            let pose = sim.pose();
            info!(
                t = report.time,
                x = pose.position.x,
                z = pose.position.y,
                heading = pose.heading,
                speed = report.telemetry.speed_percent,
                state = %report.telemetry.label,
                dust = sim.dust().len(),
                "status"
            );
        }
    }

    info!(frames = sim.frame_count(), time = sim.time(), "run complete");

    if let Some(dir) = &args.out {
        write_outputs(&sim, dir, latch.borrow().latest())?;
    }
    Ok(())
}

fn write_outputs(sim: &Simulation, dir: &Path, telemetry: Option<TelemetrySample>) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    for (handle, name) in [
        (SurfaceHandle::POV, "pov.png"),
        (SurfaceHandle::SECURITY, "security.png"),
    ] {
        if let Some(surface) = sim.surfaces().get(&handle) {
            save_png(surface.raster(), &dir.join(name))?;
        }
    }
    save_png(sim.lcd().raster(), &dir.join("lcd.png"))?;

    let summary = Summary {
        frames: sim.frame_count(),
        time: sim.time(),
        pose: *sim.pose(),
        kinematics: *sim.kinematics(),
        telemetry,
        dust: sim.dust().len(),
        lcd_revision: sim.lcd().revision(),
        surface_revisions: sim
            .surfaces()
            .iter()
            .map(|(h, s)| (h.to_string(), s.revision()))
            .collect(),
    };
    let path = dir.join("summary.json");
    fs::write(&path, serde_json::to_string_pretty(&summary)?)
        .with_context(|| format!("writing {}", path.display()))?;

    info!(dir = %dir.display(), "outputs written");
    Ok(())
}

fn save_png(raster: &Raster, path: &Path) -> Result<()> {
    let pixels = raster.pixels().to_vec();
    let image = image::RgbaImage::from_raw(raster.width(), raster.height(), pixels)
        .context("raster size does not match its pixel buffer")?;
    image
        .save(path)
        .with_context(|| format!("writing {}", path.display()))
}
