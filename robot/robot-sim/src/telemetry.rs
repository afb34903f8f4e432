//! Per-frame telemetry delivery.

use robot_types::TelemetrySample;

/// Receives one [`TelemetrySample`] per tick, right after motion integration.
///
/// Closures taking a sample implement this trait:
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use robot_sim::TelemetryObserver;
/// use robot_types::{StateLabel, TelemetrySample};
///
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let sink = Rc::clone(&seen);
/// let mut observer = move |s: TelemetrySample| sink.borrow_mut().push(s.label);
///
/// observer.observe(TelemetrySample::default());
/// assert_eq!(*seen.borrow(), vec![StateLabel::Idle]);
/// ```
pub trait TelemetryObserver {
    /// Handle one sample.
    fn observe(&mut self, sample: TelemetrySample);
}

impl<F> TelemetryObserver for F
where
    F: FnMut(TelemetrySample),
{
    fn observe(&mut self, sample: TelemetrySample) {
        self(sample);
    }
}

/// Keeps the most recent sample and a running count.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TelemetryLatch {
    latest: Option<TelemetrySample>,
    count: u64,
}

impl TelemetryLatch {
    /// Nothing observed yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last sample observed.
    #[must_use]
    pub fn latest(&self) -> Option<TelemetrySample> {
        self.latest
    }

    /// Samples observed so far.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }
}

impl TelemetryObserver for TelemetryLatch {
    fn observe(&mut self, sample: TelemetrySample) {
        self.latest = Some(sample);
        self.count += 1;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use robot_types::StateLabel;

    #[test]
    fn latch_keeps_last() {
        let mut latch = TelemetryLatch::new();
        latch.observe(TelemetrySample::from_motion(1.5, 0.0, 3.0, 0.05));
        latch.observe(TelemetrySample::from_motion(-3.0, 1.0, 3.0, 0.05));
        let last = latch.latest().unwrap();
        assert_eq!(last.label, StateLabel::ReversingTurning);
        assert_eq!(last.speed_percent, 100.0);
        assert_eq!(latch.count(), 2);
    }

    #[test]
    fn boxed_closures_observe() {
        let mut total = 0.0;
        {
            let mut observer: Box<dyn TelemetryObserver + '_> =
                Box::new(|s: TelemetrySample| total += s.speed_percent);
            observer.observe(TelemetrySample::from_motion(1.5, 0.0, 3.0, 0.05));
            observer.observe(TelemetrySample::from_motion(1.5, 0.0, 3.0, 0.05));
        }
        assert_eq!(total, 100.0);
    }
}
