//! The warehouse robot frame loop.
//!
//! [`Simulation`] owns the robot, the static scene, the LCD and the camera
//! rigs, and advances them together one [`tick`](Simulation::tick) at a time.
//! Collaborators talk to it through:
//!
//! - [`InputHandle`] / [`KeyBindings`] - Drive and head flags
//! - [`AppearanceHandle`] - Accent and body colours
//! - [`TelemetryObserver`] - One speed/state sample per tick
//! - [`ScriptedSequence`] - Keyframed overrides of head, face and text
//! - [`MainPass`] - Optional hook that draws the main view
//!
//! # Timing
//!
//! The caller supplies the clock. Motion, idle and dust run every tick;
//! the LCD and cameras are rate-limited by [`IntervalGate`]s (30 Hz and 20 Hz
//! by default).
//!
//! # Example
//!
//! ```
//! use robot_sim::{SimConfig, Simulation, TelemetryLatch};
//! use robot_types::{InputFlag, StateLabel};
//!
//! let mut sim = Simulation::new(SimConfig::preview().with_seed(1)).unwrap();
//! sim.input_handle().set(InputFlag::TurnLeft, true);
//!
//! let mut last = None;
//! for frame in 0..20 {
//!     last = Some(sim.tick(f64::from(frame) / 60.0));
//! }
//! assert_eq!(last.unwrap().telemetry.label, StateLabel::Turning);
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,     // Many methods can't be const due to nalgebra
    clippy::missing_errors_doc,        // Error docs added where non-obvious
    clippy::module_name_repetitions,   // SimConfig, SimulationReport read fine
)]

mod config;
mod handles;
mod schedule;
mod script;
mod simulation;
mod telemetry;
mod view;

pub use config::SimConfig;
pub use handles::{AppearanceHandle, InputHandle, KeyBindings};
pub use schedule::IntervalGate;
pub use script::{ActiveScript, ControlAuthority, Keyframe, ScriptFrame, ScriptedSequence};
pub use simulation::{FrameReport, Simulation};
pub use telemetry::{TelemetryLatch, TelemetryObserver};
pub use view::{MainFrame, MainPass, MainView, RobotTransforms};
