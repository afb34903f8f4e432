//! Shared handles through which collaborators feed the simulation.
//!
//! Handles are cheap clones around one shared cell. The frame loop reads each
//! handle once at the start of a tick, so a write made mid-tick takes effect on
//! the next one. Everything is single-threaded; handles are neither `Send` nor
//! `Sync`.

use std::cell::Cell;
use std::rc::Rc;

use hashbrown::HashMap;
use robot_types::{Appearance, InputFlag, InputState, Rgb};

/// Writable view of the control flags.
///
/// # Example
///
/// ```
/// use robot_sim::InputHandle;
/// use robot_types::InputFlag;
///
/// let handle = InputHandle::new();
/// let ui = handle.clone();
/// ui.set(InputFlag::Forward, true);
/// ui.set_named("turnLeft", true).unwrap();
///
/// let input = handle.snapshot();
/// assert!(input.forward() && input.turn_left());
/// assert!(ui.set_named("jump", true).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct InputHandle {
    state: Rc<Cell<InputState>>,
}

impl InputHandle {
    /// All flags released.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Press or release one flag.
    pub fn set(&self, flag: InputFlag, on: bool) {
        let mut state = self.state.get();
        state.set(flag, on);
        self.state.set(state);
    }

    /// Press or release a flag by wire name (`forward`, `turnLeft`, ...).
    ///
    /// # Errors
    ///
    /// Returns [`RobotError::UnknownInputFlag`](robot_types::RobotError) for
    /// an unrecognised name; no flag changes.
    pub fn set_named(&self, name: &str, on: bool) -> robot_types::Result<()> {
        let flag = name.parse::<InputFlag>()?;
        self.set(flag, on);
        Ok(())
    }

    /// Release every flag.
    pub fn release_all(&self) {
        self.state.set(InputState::none());
    }

    /// Current flags.
    #[must_use]
    pub fn snapshot(&self) -> InputState {
        self.state.get()
    }
}

/// Writable view of the robot colours.
#[derive(Debug, Clone, Default)]
pub struct AppearanceHandle {
    state: Rc<Cell<Appearance>>,
}

impl AppearanceHandle {
    /// Handle starting at `appearance`.
    #[must_use]
    pub fn new(appearance: Appearance) -> Self {
        Self {
            state: Rc::new(Cell::new(appearance)),
        }
    }

    /// Change the face / accent colour.
    pub fn set_accent(&self, accent: Rgb) {
        let mut a = self.state.get();
        a.accent = accent;
        self.state.set(a);
    }

    /// Change the body colour.
    pub fn set_body(&self, body: Rgb) {
        let mut a = self.state.get();
        a.body = body;
        self.state.set(a);
    }

    /// Change the accent from a `#rrggbb` string.
    ///
    /// # Errors
    ///
    /// Returns [`RobotError::InvalidColor`](robot_types::RobotError) if the
    /// string does not parse; the colour is unchanged.
    pub fn set_accent_hex(&self, hex: &str) -> robot_types::Result<()> {
        self.set_accent(Rgb::from_hex(hex)?);
        Ok(())
    }

    /// Change the body from a `#rrggbb` string.
    ///
    /// # Errors
    ///
    /// Returns [`RobotError::InvalidColor`](robot_types::RobotError) if the
    /// string does not parse; the colour is unchanged.
    pub fn set_body_hex(&self, hex: &str) -> robot_types::Result<()> {
        self.set_body(Rgb::from_hex(hex)?);
        Ok(())
    }

    /// Current colours.
    #[must_use]
    pub fn snapshot(&self) -> Appearance {
        self.state.get()
    }
}

/// Keyboard key names (DOM `KeyboardEvent.code` style) mapped to flags.
///
/// The default table binds the arrow keys and WASD for driving and `Q`/`E`
/// for the head.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    keys: HashMap<String, InputFlag>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut bindings = Self::empty();
        for (key, flag) in [
            ("ArrowUp", InputFlag::Forward),
            ("KeyW", InputFlag::Forward),
            ("ArrowDown", InputFlag::Backward),
            ("KeyS", InputFlag::Backward),
            ("ArrowLeft", InputFlag::TurnLeft),
            ("KeyA", InputFlag::TurnLeft),
            ("ArrowRight", InputFlag::TurnRight),
            ("KeyD", InputFlag::TurnRight),
            ("KeyQ", InputFlag::HeadLeft),
            ("KeyE", InputFlag::HeadRight),
        ] {
            bindings.bind(key, flag);
        }
        bindings
    }
}

impl KeyBindings {
    /// No keys bound.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            keys: HashMap::new(),
        }
    }

    /// Bind `key` to `flag`, replacing any previous binding of that key.
    pub fn bind(&mut self, key: impl Into<String>, flag: InputFlag) {
        self.keys.insert(key.into(), flag);
    }

    /// Remove a binding, returning the flag it pointed at.
    pub fn unbind(&mut self, key: &str) -> Option<InputFlag> {
        self.keys.remove(key)
    }

    /// Flag bound to `key`.
    #[must_use]
    pub fn flag_for(&self, key: &str) -> Option<InputFlag> {
        self.keys.get(key).copied()
    }

    /// Keys bound to `flag`, in no particular order.
    pub fn keys_for(&self, flag: InputFlag) -> impl Iterator<Item = &str> {
        self.keys
            .iter()
            .filter(move |(_, f)| **f == flag)
            .map(|(k, _)| k.as_str())
    }

    /// Forward a key event to `input`. Returns false for unbound keys.
    pub fn handle_key(&self, input: &InputHandle, key: &str, pressed: bool) -> bool {
        match self.flag_for(key) {
            Some(flag) => {
                input.set(flag, pressed);
                true
            }
            None => false,
        }
    }

    /// Number of bound keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use robot_types::RobotError;

    #[test]
    fn clones_share_state() {
        let a = InputHandle::new();
        let b = a.clone();
        b.set(InputFlag::HeadRight, true);
        assert!(a.snapshot().head_right());
        a.release_all();
        assert!(b.snapshot().is_idle());
    }

    #[test]
    fn unknown_name_changes_nothing() {
        let h = InputHandle::new();
        let err = h.set_named("Forward", true).unwrap_err();
        assert_eq!(err, RobotError::UnknownInputFlag("Forward".into()));
        assert!(h.snapshot().is_idle());
    }

    #[test]
    fn all_wire_names_round_trip() {
        let h = InputHandle::new();
        for flag in InputFlag::ALL {
            h.set_named(flag.name(), true).unwrap();
        }
        assert_eq!(h.snapshot().active().count(), 6);
    }

    #[test]
    fn appearance_updates_one_channel_at_a_time() {
        let h = AppearanceHandle::new(Appearance::default());
        h.set_accent_hex("#ff0000").unwrap();
        assert_eq!(h.snapshot().accent, Rgb::new(255, 0, 0));
        assert_eq!(h.snapshot().body, Appearance::default().body);

        assert!(h.set_body_hex("nope").is_err());
        assert_eq!(h.snapshot().body, Appearance::default().body);
    }

    #[test]
    fn default_bindings() {
        let keys = KeyBindings::default();
        assert_eq!(keys.flag_for("ArrowUp"), Some(InputFlag::Forward));
        assert_eq!(keys.flag_for("KeyA"), Some(InputFlag::TurnLeft));
        assert_eq!(keys.flag_for("KeyE"), Some(InputFlag::HeadRight));
        assert_eq!(keys.flag_for("Space"), None);
        assert_eq!(keys.keys_for(InputFlag::Backward).count(), 2);
        assert_eq!(keys.len(), 10);
    }

    #[test]
    fn key_events_drive_the_handle() {
        let keys = KeyBindings::default();
        let input = InputHandle::new();
        assert!(keys.handle_key(&input, "KeyW", true));
        assert!(input.snapshot().forward());
        assert!(keys.handle_key(&input, "ArrowUp", false));
        assert!(!input.snapshot().forward());
        assert!(!keys.handle_key(&input, "Escape", true));
    }

    #[test]
    fn rebinding_replaces() {
        let mut keys = KeyBindings::empty();
        keys.bind("KeyZ", InputFlag::HeadLeft);
        keys.bind("KeyZ", InputFlag::HeadRight);
        assert_eq!(keys.flag_for("KeyZ"), Some(InputFlag::HeadRight));
        assert_eq!(keys.unbind("KeyZ"), Some(InputFlag::HeadRight));
        assert!(keys.is_empty());
    }
}
