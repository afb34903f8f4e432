//! 2D display surfaces that camera captures are copied into.
//!
//! Surfaces are owned by the UI side and come and go with it. They are
//! addressed by a stable [`SurfaceHandle`] name, so a capture can target a
//! surface that is not mounted yet; that capture is skipped and retried.

use std::borrow::Cow;
use std::fmt;

use hashbrown::HashMap;
use robot_types::{RobotError, Rgb};
use tracing::debug;

use crate::raster::Raster;

/// Stable name of a display surface.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceHandle(Cow<'static, str>);

impl SurfaceHandle {
    /// Surface fed by the robot POV camera.
    pub const POV: Self = Self(Cow::Borrowed("pov-camera"));
    /// Surface fed by the security camera.
    pub const SECURITY: Self = Self(Cow::Borrowed("security-camera"));

    /// A handle with an arbitrary name.
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// The name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SurfaceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One mounted surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplaySurface {
    raster: Raster,
    revision: u64,
}

impl DisplaySurface {
    fn new(width: u32, height: u32) -> Self {
        Self {
            raster: Raster::filled(width, height, Rgb::BLACK),
            revision: 0,
        }
    }

    /// Current pixels.
    #[must_use]
    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    /// Mutable pixels. Writers should call [`touch`](Self::touch) afterwards.
    pub fn raster_mut(&mut self) -> &mut Raster {
        &mut self.raster
    }

    /// Number of completed writes.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Record a completed write.
    pub fn touch(&mut self) {
        self.revision += 1;
    }
}

/// Registry of mounted surfaces.
///
/// # Example
///
/// ```
/// use robot_display::{DisplaySurfaces, SurfaceHandle};
///
/// let mut surfaces = DisplaySurfaces::new();
/// surfaces.mount(SurfaceHandle::POV, 320, 180).unwrap();
/// assert!(surfaces.is_mounted(&SurfaceHandle::POV));
/// assert!(!surfaces.is_mounted(&SurfaceHandle::SECURITY));
///
/// surfaces.unmount(&SurfaceHandle::POV);
/// assert!(surfaces.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct DisplaySurfaces {
    surfaces: HashMap<SurfaceHandle, DisplaySurface>,
}

impl DisplaySurfaces {
    /// No surfaces mounted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount (or remount at a new size) a surface.
    ///
    /// # Errors
    ///
    /// Returns [`RobotError::InvalidConfig`] for a zero-sized surface.
    pub fn mount(
        &mut self,
        handle: SurfaceHandle,
        width: u32,
        height: u32,
    ) -> robot_types::Result<()> {
        if width == 0 || height == 0 {
            return Err(RobotError::invalid_config(format!(
                "surface {handle} must be non-empty, got {width}x{height}"
            )));
        }
        debug!(surface = %handle, width, height, "surface mounted");
        self.surfaces.insert(handle, DisplaySurface::new(width, height));
        Ok(())
    }

    /// Unmount a surface, returning it if it was mounted.
    pub fn unmount(&mut self, handle: &SurfaceHandle) -> Option<DisplaySurface> {
        let removed = self.surfaces.remove(handle);
        if removed.is_some() {
            debug!(surface = %handle, "surface unmounted");
        }
        removed
    }

    /// True if `handle` is mounted.
    #[must_use]
    pub fn is_mounted(&self, handle: &SurfaceHandle) -> bool {
        self.surfaces.contains_key(handle)
    }

    /// Look up a surface.
    #[must_use]
    pub fn get(&self, handle: &SurfaceHandle) -> Option<&DisplaySurface> {
        self.surfaces.get(handle)
    }

    /// Look up a surface mutably.
    pub fn get_mut(&mut self, handle: &SurfaceHandle) -> Option<&mut DisplaySurface> {
        self.surfaces.get_mut(handle)
    }

    /// Number of mounted surfaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    /// True if nothing is mounted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// Iterate over mounted surfaces in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&SurfaceHandle, &DisplaySurface)> {
        self.surfaces.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn handles_compare_by_name() {
        assert_eq!(SurfaceHandle::new("pov-camera"), SurfaceHandle::POV);
        assert_eq!(SurfaceHandle::new(String::from("x")).as_str(), "x");
        assert_eq!(SurfaceHandle::SECURITY.to_string(), "security-camera");
    }

    #[test]
    fn mount_starts_black_and_unrevised() {
        let mut s = DisplaySurfaces::new();
        s.mount(SurfaceHandle::POV, 4, 3).unwrap();
        let surface = s.get(&SurfaceHandle::POV).unwrap();
        assert_eq!(surface.revision(), 0);
        assert_eq!(surface.raster().get(3, 2), Some([0, 0, 0, 255]));
    }

    #[test]
    fn remount_replaces() {
        let mut s = DisplaySurfaces::new();
        s.mount(SurfaceHandle::POV, 4, 3).unwrap();
        s.get_mut(&SurfaceHandle::POV).unwrap().touch();
        s.mount(SurfaceHandle::POV, 8, 6).unwrap();
        let surface = s.get(&SurfaceHandle::POV).unwrap();
        assert_eq!(surface.raster().width(), 8);
        assert_eq!(surface.revision(), 0);
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn zero_size_is_rejected() {
        let mut s = DisplaySurfaces::new();
        let err = s.mount(SurfaceHandle::POV, 0, 10).unwrap_err();
        assert!(err.is_config_error());
        assert!(!s.is_mounted(&SurfaceHandle::POV));
    }

    #[test]
    fn unmount_missing_is_none() {
        let mut s = DisplaySurfaces::new();
        assert!(s.unmount(&SurfaceHandle::SECURITY).is_none());
    }
}
