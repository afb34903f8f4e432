//! The frame loop.
//!
//! [`Simulation::tick`] runs every stage of one frame in a fixed order:
//!
//! 1. Motion integration with collision, then telemetry observers
//! 2. Idle animation
//! 3. Dust
//! 4. LCD redraw (rate-limited)
//! 5. Camera capture (rate-limited)
//! 6. Part transforms and the optional [`MainPass`]
//!
//! Later stages see the pose produced by this tick's integration.

use robot_display::{
    CaptureOutcome, CapturePipeline, DisplaySurfaces, ExpressionDisplay, RaycastRenderer,
    RobotModel, Scene, SceneRenderer, SurfaceHandle,
};
use robot_motion::{
    CollisionResolver, DustSystem, HeadControl, IdleActivity, IdleAnimator, IdleOutput,
    MotionIntegrator, ObstacleRegistry,
};
use robot_types::{
    ExpressionId, ExpressionState, KinematicState, RobotError, RobotPose, TelemetrySample,
};
use smallvec::SmallVec;
use tracing::{debug, info, trace};

use crate::config::SimConfig;
use crate::handles::{AppearanceHandle, InputHandle};
use crate::schedule::IntervalGate;
use crate::script::{ActiveScript, ControlAuthority, ScriptedSequence};
use crate::telemetry::TelemetryObserver;
use crate::view::{MainFrame, MainPass, MainView, RobotTransforms};

/// What one tick did.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    /// Frame number, starting at 0.
    pub frame: u64,
    /// Simulation time passed to `tick`.
    pub time: f64,
    /// Frame time applied after clamping.
    pub dt: f64,
    /// Telemetry for this frame.
    pub telemetry: TelemetrySample,
    /// True if the resolver corrected the position.
    pub collided: bool,
    /// True if the idle animator is driving the body.
    pub idle_active: bool,
    /// Dust particles spawned.
    pub dust_spawned: usize,
    /// True if the LCD was redrawn.
    pub expression_drawn: bool,
    /// Capture results, empty when the capture gate stayed closed.
    pub captures: SmallVec<[CaptureOutcome; 2]>,
    /// True if a script finished (and state was restored) this tick.
    pub script_finished: bool,
}

/// The warehouse robot simulation.
///
/// # Example
///
/// ```
/// use robot_sim::{SimConfig, Simulation};
/// use robot_display::SurfaceHandle;
/// use robot_types::InputFlag;
///
/// let mut sim = Simulation::new(SimConfig::preview()).unwrap();
/// sim.mount_surface(SurfaceHandle::POV, 160, 90).unwrap();
///
/// let input = sim.input_handle();
/// input.set(InputFlag::Forward, true);
///
/// for i in 0..30 {
///     sim.tick(f64::from(i) / 60.0);
/// }
/// assert!(sim.kinematics().velocity > 0.0);
/// assert!(sim.surfaces().get(&SurfaceHandle::POV).unwrap().revision() > 0);
/// ```
pub struct Simulation {
    config: SimConfig,
    integrator: MotionIntegrator,
    resolver: CollisionResolver,
    idle: IdleAnimator,
    dust: DustSystem,
    capture: CapturePipeline,
    renderer: Box<dyn SceneRenderer>,
    surfaces: DisplaySurfaces,
    lcd: ExpressionDisplay,

    pose: RobotPose,
    kinematics: KinematicState,
    idle_output: IdleOutput,
    expression: ExpressionState,
    authority: ControlAuthority,
    transforms: RobotTransforms,
    last_telemetry: TelemetrySample,

    input: InputHandle,
    appearance: AppearanceHandle,
    observers: Vec<Box<dyn TelemetryObserver>>,
    main_pass: Option<Box<dyn MainPass>>,

    expression_gate: IntervalGate,
    capture_gate: IntervalGate,
    view: MainView,
    time: Option<f64>,
    frame: u64,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("frame", &self.frame)
            .field("time", &self.time)
            .field("pose", &self.pose)
            .field("kinematics", &self.kinematics)
            .field("expression", &self.expression)
            .field("scripted", &self.authority.is_scripted())
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl Simulation {
    /// Build a simulation in the warehouse scene with the software renderer.
    ///
    /// # Errors
    ///
    /// Returns [`RobotError::InvalidConfig`] if `config` fails validation.
    pub fn new(config: SimConfig) -> robot_types::Result<Self> {
        Self::with_scene(config, ObstacleRegistry::warehouse())
    }

    /// Build a simulation with a custom obstacle layout.
    ///
    /// # Errors
    ///
    /// Returns [`RobotError::InvalidConfig`] if `config` fails validation.
    pub fn with_scene(config: SimConfig, obstacles: ObstacleRegistry) -> robot_types::Result<Self> {
        config.validate()?;

        let capture = CapturePipeline::new(config.capture)?;
        let expression_gate = IntervalGate::from_rate(config.expression_rate_hz)?;
        let capture_gate = IntervalGate::from_rate(config.capture_rate_hz)?;
        let pose = RobotPose::at(config.spawn_position, config.spawn_heading);

        info!(
            obstacles = obstacles.len(),
            capture_width = config.capture.width,
            capture_height = config.capture.height,
            capture_hz = config.capture_rate_hz,
            expression_hz = config.expression_rate_hz,
            "simulation created"
        );

        let mut sim = Self {
            integrator: MotionIntegrator::new(config.motion.clone()),
            resolver: CollisionResolver::new(config.collision.clone(), obstacles),
            idle: IdleAnimator::new(config.idle.clone()),
            dust: DustSystem::new(config.dust.clone()),
            capture,
            renderer: Box::new(RaycastRenderer::default()),
            surfaces: DisplaySurfaces::new(),
            lcd: ExpressionDisplay::default(),

            pose,
            kinematics: KinematicState::default(),
            idle_output: IdleOutput::default(),
            expression: ExpressionState::new(config.initial_expression),
            authority: ControlAuthority::UserInput,
            transforms: RobotTransforms::default(),
            last_telemetry: TelemetrySample::default(),

            input: InputHandle::new(),
            appearance: AppearanceHandle::new(config.appearance),
            observers: Vec::new(),
            main_pass: None,

            expression_gate,
            capture_gate,
            view: MainView::default(),
            time: None,
            frame: 0,
            config,
        };
        sim.transforms = RobotTransforms::from_model(&sim.robot_model());
        Ok(sim)
    }

    /// Replace the camera backend.
    #[must_use]
    pub fn with_renderer(mut self, renderer: Box<dyn SceneRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    // =========================================================================
    // Collaborator wiring
    // =========================================================================

    /// Handle for input sources. Clones share state with the simulation.
    #[must_use]
    pub fn input_handle(&self) -> InputHandle {
        self.input.clone()
    }

    /// Handle for colour pickers. Clones share state with the simulation.
    #[must_use]
    pub fn appearance_handle(&self) -> AppearanceHandle {
        self.appearance.clone()
    }

    /// Register a telemetry observer. Observers run in registration order.
    pub fn add_observer(&mut self, observer: impl TelemetryObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Install the main-view draw hook, returning the previous one.
    pub fn set_main_pass(&mut self, pass: Box<dyn MainPass>) -> Option<Box<dyn MainPass>> {
        self.main_pass.replace(pass)
    }

    /// Mount a display surface for camera output.
    ///
    /// # Errors
    ///
    /// Returns [`RobotError::InvalidConfig`] for a zero-sized surface.
    pub fn mount_surface(
        &mut self,
        handle: SurfaceHandle,
        width: u32,
        height: u32,
    ) -> robot_types::Result<()> {
        self.surfaces.mount(handle, width, height)
    }

    /// Unmount a display surface. Captures to it are skipped until remounted.
    pub fn unmount_surface(&mut self, handle: &SurfaceHandle) -> bool {
        self.surfaces.unmount(handle).is_some()
    }

    /// Resize the main view. Capture targets keep their size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.view = MainView::new(width, height);
        debug!(width = self.view.width(), height = self.view.height(), "main view resized");
    }

    // =========================================================================
    // Expression control
    // =========================================================================

    /// Change the face. Ignored while a script runs; returns whether it applied.
    pub fn set_expression(&mut self, expression: ExpressionId) -> bool {
        if self.authority.is_scripted() {
            debug!(expression = expression.name(), "expression change ignored during script");
            return false;
        }
        self.expression.set_expression(expression);
        true
    }

    /// Show text on the LCD for `duration` seconds. Ignored while a script
    /// runs; returns whether it applied.
    ///
    /// The expiry is measured from the last tick's time (0 before the first
    /// tick), so text requested long after that tick may expire early. Use
    /// [`show_text_at`](Self::show_text_at) to stamp it from your own clock.
    pub fn show_text(&mut self, text: impl Into<String>, duration: f64) -> bool {
        self.show_text_at(text, self.now(), duration)
    }

    /// Show text on the LCD from `now` until `now + duration`, with `now` on
    /// the same clock as [`tick`](Self::tick). Ignored while a script runs.
    pub fn show_text_at(&mut self, text: impl Into<String>, now: f64, duration: f64) -> bool {
        if self.authority.is_scripted() {
            debug!("text request ignored during script");
            return false;
        }
        self.expression.show_text(text, now, duration);
        true
    }

    // =========================================================================
    // Scripted overrides
    // =========================================================================

    /// Start a scripted override at the current simulation time.
    ///
    /// # Errors
    ///
    /// Returns [`RobotError::OverrideActive`] if a script is already running.
    pub fn begin_script(&mut self, sequence: ScriptedSequence) -> robot_types::Result<()> {
        if self.authority.is_scripted() {
            return Err(RobotError::OverrideActive);
        }
        debug!(
            keyframes = sequence.keyframes().len(),
            duration = sequence.duration(),
            "script started"
        );
        self.authority = ControlAuthority::Scripted(ActiveScript::begin(
            sequence,
            self.now(),
            self.pose.head_yaw,
            self.expression.expression(),
        ));
        Ok(())
    }

    /// Stop the running script and restore what it displaced. Returns false if
    /// no script was running.
    pub fn cancel_script(&mut self) -> bool {
        match std::mem::take(&mut self.authority) {
            ControlAuthority::Scripted(script) => {
                debug!("script cancelled");
                self.restore_after(&script);
                true
            }
            ControlAuthority::UserInput => false,
        }
    }

    /// True while a script runs.
    #[must_use]
    pub fn is_scripted(&self) -> bool {
        self.authority.is_scripted()
    }

    fn restore_after(&mut self, script: &ActiveScript) {
        self.pose.head_yaw = script.saved_head_yaw();
        self.kinematics.head_angular_velocity = 0.0;
        self.expression.set_expression(script.saved_expression());
    }

    /// End the script if it has run its course.
    fn finish_script_if_done(&mut self, now: f64) -> bool {
        let done = self.authority.active().is_some_and(|s| s.is_finished(now));
        if done {
            if let ControlAuthority::Scripted(script) = std::mem::take(&mut self.authority) {
                debug!("script finished");
                self.restore_after(&script);
            }
        }
        done
    }

    // =========================================================================
    // Frame loop
    // =========================================================================

    /// Advance to simulation time `now` (seconds).
    ///
    /// The first tick has zero frame time. Later ticks use the difference from
    /// the previous `now`, clamped by the integrator.
    pub fn tick(&mut self, now: f64) -> FrameReport {
        let raw_dt = self.time.map_or(0.0, |t| now - t);
        self.time = Some(now);
        let input = self.input.snapshot();
        let appearance = self.appearance.snapshot();

        let script_finished = self.finish_script_if_done(now);
        let script_frame = self.authority.active().map(|s| s.sample(now));
        let head = script_frame.map_or(HeadControl::User, |f| HeadControl::Scripted(f.head_yaw));

        // 1. Motion
        let outcome = self.integrator.step(
            input,
            head,
            raw_dt,
            &mut self.pose,
            &mut self.kinematics,
            &self.resolver,
        );
        self.last_telemetry = outcome.telemetry;
        for observer in &mut self.observers {
            observer.observe(outcome.telemetry);
        }

        // 2. Idle
        let activity = IdleActivity::from_motion(&self.kinematics, input, script_frame.is_some());
        self.idle_output = self.idle.update(outcome.dt, now, activity);

        // 3. Dust
        let dust_spawned = self.dust.update(
            outcome.dt,
            &self.pose,
            self.kinematics.velocity,
            self.config.motion.max_speed,
        );

        // 4. LCD
        self.expression.expire(now);
        let expression_drawn = self.expression_gate.ready(now);
        if expression_drawn {
            let (face, text) = match &script_frame {
                Some(f) => (f.expression, f.text),
                None => (self.expression.expression(), self.expression.active_text(now)),
            };
            self.lcd.draw(face, appearance.accent, now, text);
        }

        // 5. Cameras
        let robot = RobotModel {
            pose: self.pose,
            idle: self.idle_output,
            appearance,
            dimensions: self.config.dimensions,
        };
        let captures = if self.capture_gate.ready(now) {
            let mut scene = Scene::new(self.resolver.obstacles(), robot);
            self.capture
                .capture(&mut scene, self.renderer.as_mut(), &mut self.surfaces)
        } else {
            SmallVec::new()
        };

        // 6. Transforms and main pass
        self.transforms = RobotTransforms::from_model(&robot);
        if let Some(pass) = self.main_pass.as_mut() {
            let scene = Scene::new(self.resolver.obstacles(), robot);
            let frame = MainFrame {
                time: now,
                frame: self.frame,
                view: self.view,
                transforms: self.transforms,
                dust: self.dust.particles(),
                lcd: self.lcd.raster(),
                lcd_changed: expression_drawn,
            };
            pass.draw(&scene, &frame);
        }

        let report = FrameReport {
            frame: self.frame,
            time: now,
            dt: outcome.dt,
            telemetry: outcome.telemetry,
            collided: outcome.collided,
            idle_active: self.idle.is_active(),
            dust_spawned,
            expression_drawn,
            captures,
            script_finished,
        };
        trace!(
            frame = self.frame,
            dt = outcome.dt,
            speed = outcome.telemetry.speed_percent,
            state = %outcome.telemetry.label,
            collided = outcome.collided,
            "tick"
        );
        self.frame += 1;
        report
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    fn now(&self) -> f64 {
        self.time.unwrap_or(0.0)
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Time of the last tick, or 0 before the first.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.now()
    }

    /// Ticks run so far.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Current pose.
    #[must_use]
    pub fn pose(&self) -> &RobotPose {
        &self.pose
    }

    /// Current velocities.
    #[must_use]
    pub fn kinematics(&self) -> &KinematicState {
        &self.kinematics
    }

    /// Idle offsets from the last tick.
    #[must_use]
    pub fn idle_output(&self) -> &IdleOutput {
        &self.idle_output
    }

    /// Latest telemetry.
    #[must_use]
    pub fn telemetry(&self) -> TelemetrySample {
        self.last_telemetry
    }

    /// Expression state (collaborator-owned face and text).
    #[must_use]
    pub fn expression(&self) -> &ExpressionState {
        &self.expression
    }

    /// Who owns head, face and text.
    #[must_use]
    pub fn authority(&self) -> &ControlAuthority {
        &self.authority
    }

    /// LCD texture.
    #[must_use]
    pub fn lcd(&self) -> &ExpressionDisplay {
        &self.lcd
    }

    /// LCD texture, for uploaders that consume the dirty flag.
    pub fn lcd_mut(&mut self) -> &mut ExpressionDisplay {
        &mut self.lcd
    }

    /// Wheel dust.
    #[must_use]
    pub fn dust(&self) -> &DustSystem {
        &self.dust
    }

    /// Camera rigs.
    #[must_use]
    pub fn capture_pipeline(&self) -> &CapturePipeline {
        &self.capture
    }

    /// Camera rigs, for changing post-processing or destinations.
    pub fn capture_pipeline_mut(&mut self) -> &mut CapturePipeline {
        &mut self.capture
    }

    /// Display surfaces.
    #[must_use]
    pub fn surfaces(&self) -> &DisplaySurfaces {
        &self.surfaces
    }

    /// Static obstacles.
    #[must_use]
    pub fn obstacles(&self) -> &ObstacleRegistry {
        self.resolver.obstacles()
    }

    /// Robot part transforms from the last tick.
    #[must_use]
    pub fn transforms(&self) -> &RobotTransforms {
        &self.transforms
    }

    /// Main view size.
    #[must_use]
    pub fn view(&self) -> MainView {
        self.view
    }

    /// Snapshot of the robot as the renderers see it.
    #[must_use]
    pub fn robot_model(&self) -> RobotModel {
        RobotModel {
            pose: self.pose,
            idle: self.idle_output,
            appearance: self.appearance.snapshot(),
            dimensions: self.config.dimensions,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::script::Keyframe;
    use robot_types::InputFlag;

    fn sim() -> Simulation {
        let capture = robot_display::CaptureParams::default().with_size(16, 9);
        Simulation::new(SimConfig::preview().with_capture(capture)).unwrap()
    }

    fn run(sim: &mut Simulation, from: u32, to: u32) -> Vec<FrameReport> {
        (from..to).map(|i| sim.tick(f64::from(i) / 60.0)).collect()
    }

    #[test]
    fn invalid_config_fails_fast() {
        let err = Simulation::new(SimConfig::default().with_capture_rate(-1.0)).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn first_tick_has_zero_dt() {
        let mut s = sim();
        let r = s.tick(5.0);
        assert_eq!(r.dt, 0.0);
        assert_eq!(r.frame, 0);
        assert!(r.expression_drawn);
        assert_eq!(r.captures.len(), 2);
    }

    #[test]
    fn gates_run_at_their_rates() {
        let mut s = sim();
        let reports = run(&mut s, 0, 60);
        assert_eq!(reports.iter().filter(|r| r.expression_drawn).count(), 30);
        assert_eq!(reports.iter().filter(|r| !r.captures.is_empty()).count(), 20);
        assert_eq!(s.lcd().revision(), 30);
    }

    #[test]
    fn scripts_are_exclusive() {
        let mut s = sim();
        s.tick(0.0);
        let seq = ScriptedSequence::new(vec![Keyframe::at(1.0).head_yaw(0.5)]).unwrap();
        s.begin_script(seq.clone()).unwrap();
        assert_eq!(s.begin_script(seq).unwrap_err(), RobotError::OverrideActive);
        assert!(s.cancel_script());
        assert!(!s.cancel_script());
    }

    #[test]
    fn collaborator_requests_are_ignored_while_scripted() {
        let mut s = sim();
        s.tick(0.0);
        s.begin_script(ScriptedSequence::new(vec![Keyframe::at(2.0)]).unwrap()).unwrap();
        assert!(!s.set_expression(ExpressionId::Angry));
        assert!(!s.show_text("hello", 1.0));
        assert_eq!(s.expression().expression(), ExpressionId::Neutral);
        assert_eq!(s.expression().active_text(0.0), None);
    }

    #[test]
    fn text_expiry_follows_the_caller_clock() {
        let mut s = sim();
        s.tick(0.0);
        s.tick(10.0);

        // Requested at 10.4 on the caller's clock, after the tick at 10.0
        assert!(s.show_text_at("HI", 10.4, 1.0));
        s.tick(11.2);
        assert_eq!(s.expression().active_text(11.2), Some("HI"));
        s.tick(11.5);
        assert_eq!(s.expression().active_text(11.5), None);

        // The clockless form stamps from the last tick
        assert!(s.show_text("LO", 1.0));
        assert_eq!(s.expression().active_text(12.4), Some("LO"));
        assert_eq!(s.expression().active_text(12.6), None);
    }

    #[test]
    fn observers_see_every_tick() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let mut s = sim();
        let labels = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&labels);
        s.add_observer(move |t: TelemetrySample| sink.borrow_mut().push(t.label));
        s.input_handle().set(InputFlag::Forward, true);
        run(&mut s, 0, 30);

        let labels = labels.borrow();
        assert_eq!(labels.len(), 30);
        assert_eq!(labels.last().unwrap().as_str(), "Moving");
    }

    #[test]
    fn resize_leaves_capture_size() {
        let mut s = sim();
        s.resize(800, 600);
        assert_eq!(s.view().width(), 800);
        assert_eq!(s.capture_pipeline().params().width, 16);
    }
}
