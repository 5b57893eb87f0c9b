//! Test utilities for carto development.
//!
//! Provides deterministic density fixtures, point-set builders, and
//! recording implementations of [`ProgressSink`] and [`SnapshotSink`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{
    cosine_mode_density, lattice_points, random_density, two_by_two_density, uniform_density,
};

use carto_core::{FieldSnapshot, ProgressEvent, ProgressSink, SnapshotSink};

/// Records every progress event for later assertions.
#[derive(Default)]
pub struct RecordingProgress {
    pub events: Vec<ProgressEvent>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of per-step events received.
    pub fn step_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Step { .. }))
            .count()
    }

    /// Fractions reported by per-step events, in order.
    pub fn fractions(&self) -> Vec<f64> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::Step { fraction, .. } => Some(*fraction),
                _ => None,
            })
            .collect()
    }

    /// Whether a `Finished` event was received.
    pub fn finished(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, ProgressEvent::Finished { .. }))
    }
}

impl ProgressSink for RecordingProgress {
    fn report(&mut self, event: &ProgressEvent) {
        self.events.push(event.clone());
    }
}

/// Keeps `(step, time, density)` of every persisted snapshot.
#[derive(Default)]
pub struct RecordingSnapshots {
    pub written: Vec<(u64, f64, Vec<f64>)>,
}

impl RecordingSnapshots {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotSink for RecordingSnapshots {
    fn persist(&mut self, step: u64, snapshot: &FieldSnapshot) -> Result<(), String> {
        self.written
            .push((step, snapshot.time(), snapshot.density().to_vec()));
        Ok(())
    }
}

/// Fails on the `fail_at`-th call (1-based).
pub struct FailingSnapshots {
    calls: u64,
    fail_at: u64,
}

impl FailingSnapshots {
    pub fn new(fail_at: u64) -> Self {
        Self { calls: 0, fail_at }
    }
}

impl SnapshotSink for FailingSnapshots {
    fn persist(&mut self, step: u64, _snapshot: &FieldSnapshot) -> Result<(), String> {
        self.calls += 1;
        if self.calls >= self.fail_at {
            Err(format!("disk full at step {step}"))
        } else {
            Ok(())
        }
    }
}
