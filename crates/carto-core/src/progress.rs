//! Progress events and the sinks that consume integrator side effects.
//!
//! The integrator never prints. It emits [`ProgressEvent`]s to a
//! [`ProgressSink`] and hands intermediate density snapshots to a
//! [`SnapshotSink`]. Rendering and persistence belong to the caller.

use crate::metrics::IntegrationMetrics;
use crate::snapshot::FieldSnapshot;

/// Per-step detail reported in [`ProgressMode::Detailed`](crate::ProgressMode::Detailed).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepDetail {
    /// Size of the step just accepted.
    pub step: f64,
    /// Worst per-point error estimate of that step.
    pub error: f64,
    /// Steps accepted so far.
    pub accepted: u64,
    /// Steps rejected so far.
    pub rejected: u64,
}

/// A progress notification from the integrator.
#[derive(Clone, Debug, PartialEq)]
pub enum ProgressEvent {
    /// A step was accepted.
    Step {
        /// Fraction of fictitious time completed, `t / 1`.
        fraction: f64,
        /// Present only in detailed mode.
        detail: Option<StepDetail>,
    },
    /// The integration reached time 1.
    Finished {
        /// Final metrics of the pass.
        metrics: IntegrationMetrics,
    },
}

/// Receives progress events.
///
/// Implemented for any `FnMut(&ProgressEvent)`, so a closure can be passed
/// directly.
pub trait ProgressSink {
    /// Handle one event.
    fn report(&mut self, event: &ProgressEvent);
}

impl<F: FnMut(&ProgressEvent)> ProgressSink for F {
    fn report(&mut self, event: &ProgressEvent) {
        self(event)
    }
}

/// A sink that discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn report(&mut self, _event: &ProgressEvent) {}
}

/// Destination for intermediate density snapshots.
pub trait SnapshotSink {
    /// Persist the density of `snapshot`, taken after accepted step `step`.
    ///
    /// An `Err` aborts the integration.
    fn persist(&mut self, step: u64, snapshot: &FieldSnapshot) -> Result<(), String>;
}
