//! Rate limiting for work that runs slower than the frame loop.

use robot_types::ensure_positive;

/// Fraction of an interval by which a frame may arrive early and still open
/// the gate, absorbing floating-point drift in accumulated frame times.
const EARLY_SLACK: f64 = 1e-6;

/// Opens at most once per interval of simulation time.
///
/// The first call to [`ready`](Self::ready) always opens. After that the gate
/// opens on the first call at or after each deadline. Deadlines advance in
/// whole intervals so the long-run rate matches the configured rate, but a
/// stall longer than one interval does not cause a burst of catch-up opens.
///
/// # Example
///
/// ```
/// use robot_sim::IntervalGate;
///
/// let mut gate = IntervalGate::from_rate(10.0).unwrap();
/// assert!(gate.ready(0.0));
/// assert!(!gate.ready(0.05));
/// assert!(gate.ready(0.1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalGate {
    interval: f64,
    next_at: Option<f64>,
}

impl IntervalGate {
    /// A gate opening `hz` times per second.
    ///
    /// # Errors
    ///
    /// Returns [`RobotError::InvalidConfig`](robot_types::RobotError) unless
    /// `hz` is positive and finite.
    pub fn from_rate(hz: f64) -> robot_types::Result<Self> {
        ensure_positive("rate", hz)?;
        Ok(Self::from_interval_unchecked(1.0 / hz))
    }

    /// A gate opening every `interval` seconds.
    ///
    /// # Errors
    ///
    /// Returns [`RobotError::InvalidConfig`](robot_types::RobotError) unless
    /// `interval` is positive and finite.
    pub fn from_interval(interval: f64) -> robot_types::Result<Self> {
        ensure_positive("interval", interval)?;
        Ok(Self::from_interval_unchecked(interval))
    }

    const fn from_interval_unchecked(interval: f64) -> Self {
        Self {
            interval,
            next_at: None,
        }
    }

    /// Seconds between openings.
    #[must_use]
    pub fn interval(&self) -> f64 {
        self.interval
    }

    /// Next deadline, or `None` before the first opening.
    #[must_use]
    pub fn next_at(&self) -> Option<f64> {
        self.next_at
    }

    /// True if the gate opens at `now`. Consumes the opening.
    pub fn ready(&mut self, now: f64) -> bool {
        match self.next_at {
            Some(deadline) if now + self.interval * EARLY_SLACK < deadline => false,
            Some(deadline) => {
                let next = deadline + self.interval;
                self.next_at = Some(if next <= now { now + self.interval } else { next });
                true
            }
            None => {
                self.next_at = Some(now + self.interval);
                true
            }
        }
    }

    /// Forget the schedule; the next call opens.
    pub fn reset(&mut self) {
        self.next_at = None;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn twenty_hz_over_a_second_of_sixty_hz_frames() {
        let mut gate = IntervalGate::from_rate(20.0).unwrap();
        let opens = (0..60).filter(|&i| gate.ready(f64::from(i) / 60.0)).count();
        assert_eq!(opens, 20);
    }

    #[test]
    fn thirty_hz_over_two_seconds_of_frames() {
        let mut gate = IntervalGate::from_rate(30.0).unwrap();
        let opens = (0..240).filter(|&i| gate.ready(f64::from(i) / 120.0)).count();
        assert_eq!(opens, 60);
    }

    #[test]
    fn stall_does_not_burst() {
        let mut gate = IntervalGate::from_interval(0.1).unwrap();
        assert!(gate.ready(0.0));
        assert!(gate.ready(5.0));
        assert!(!gate.ready(5.01));
        assert!((gate.next_at().unwrap() - 5.1).abs() < 1e-12);
    }

    #[test]
    fn reset_reopens() {
        let mut gate = IntervalGate::from_interval(1.0).unwrap();
        assert!(gate.ready(0.0));
        assert!(!gate.ready(0.5));
        gate.reset();
        assert!(gate.ready(0.5));
    }

    #[test]
    fn invalid_rates() {
        assert!(IntervalGate::from_rate(0.0).is_err());
        assert!(IntervalGate::from_rate(-3.0).is_err());
        assert!(IntervalGate::from_interval(f64::INFINITY).is_err());
    }
}
