//! Counters and timings for one integration pass.

/// Metrics collected while integrating a point set from time 0 to 1.
///
/// Durations are in microseconds. The integrator fills these in as it runs
/// and returns the final values; the last progress event carries a copy.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IntegrationMetrics {
    /// Number of points advanced.
    pub points: usize,
    /// Steps whose error estimate met the tolerance.
    pub accepted_steps: u64,
    /// Steps that were retried with a smaller size.
    pub rejected_steps: u64,
    /// Whole-grid solver evaluations (one per attempted step).
    pub field_evaluations: u64,
    /// Intermediate snapshots handed to the sink.
    pub snapshots_written: u64,
    /// Fictitious time reached.
    pub final_time: f64,
    /// Smallest accepted step.
    pub smallest_step: f64,
    /// Largest accepted step.
    pub largest_step: f64,
    /// Largest distance any point moved between time 0 and the final time.
    pub max_displacement: f64,
    /// Wall-clock time for the whole pass, in microseconds.
    pub total_us: u64,
    /// Wall-clock time spent in solver evaluations, in microseconds.
    pub field_us: u64,
}

impl IntegrationMetrics {
    /// Fold one accepted step size into the min/max trackers.
    pub fn record_step(&mut self, h: f64) {
        if self.accepted_steps == 0 {
            self.smallest_step = h;
            self.largest_step = h;
        } else {
            self.smallest_step = self.smallest_step.min(h);
            self.largest_step = self.largest_step.max(h);
        }
        self.accepted_steps += 1;
    }
}
