//! Adaptive Cash–Karp integration of a point set through a velocity field.
//!
//! All points advance in lockstep from fictitious time 0 to 1. Each step
//! attempt widens the source's cached window to `t + h`, runs the embedded
//! 4th/5th order pair on every point, and accepts the step when the worst
//! per-point error estimate is within `target_error`. The next step size
//! follows the usual `safety * (tol / err)^(1/5)` controller, bounded by
//! `min_shrink`, `max_growth` and `max_step`. The final step is shortened
//! to land exactly on `t = 1`.
//!
//! Within one attempt the field is interpolated linearly in time, which
//! both embedded orders integrate exactly. A step is therefore also
//! rejected when the source reports a field change above
//! `max_field_change`, and the next step shrinks in proportion.

use std::time::Instant;

use carto_core::{
    ConfigError, IntegrationError, IntegrationMetrics, IntegratorConfig, Point, ProgressEvent,
    ProgressMode, ProgressSink, SnapshotSink, StepDetail, Velocity,
};

use crate::cancel::CancelFlag;
use crate::velocity::VelocitySource;

// ── Cash–Karp tableau ───────────────────────────────────────────

const C: [f64; 6] = [0.0, 1.0 / 5.0, 3.0 / 10.0, 3.0 / 5.0, 1.0, 7.0 / 8.0];

const A: [[f64; 5]; 6] = [
    [0.0, 0.0, 0.0, 0.0, 0.0],
    [1.0 / 5.0, 0.0, 0.0, 0.0, 0.0],
    [3.0 / 40.0, 9.0 / 40.0, 0.0, 0.0, 0.0],
    [3.0 / 10.0, -9.0 / 10.0, 6.0 / 5.0, 0.0, 0.0],
    [-11.0 / 54.0, 5.0 / 2.0, -70.0 / 27.0, 35.0 / 27.0, 0.0],
    [
        1631.0 / 55296.0,
        175.0 / 512.0,
        575.0 / 13824.0,
        44275.0 / 110592.0,
        253.0 / 4096.0,
    ],
];

/// Fifth-order weights.
const B5: [f64; 6] = [
    37.0 / 378.0,
    0.0,
    250.0 / 621.0,
    125.0 / 594.0,
    0.0,
    512.0 / 1771.0,
];

/// Embedded fourth-order weights.
const B4: [f64; 6] = [
    2825.0 / 27648.0,
    0.0,
    18575.0 / 48384.0,
    13525.0 / 55296.0,
    277.0 / 14336.0,
    1.0 / 4.0,
];

/// One Cash–Karp step for a single point. Returns the fifth-order position
/// and the distance between the fifth- and fourth-order estimates.
fn cash_karp<S: VelocitySource + ?Sized>(source: &S, t: f64, h: f64, p: Point) -> (Point, f64) {
    let mut k = [Velocity::ZERO; 6];
    for stage in 0..6 {
        let (mut x, mut y) = (p.x, p.y);
        for (j, a) in A[stage][..stage].iter().enumerate() {
            x += h * a * k[j].vx;
            y += h * a * k[j].vy;
        }
        k[stage] = source.velocity(t + C[stage] * h, Point::new(x, y));
    }

    let (mut x, mut y) = (p.x, p.y);
    let (mut ex, mut ey) = (0.0, 0.0);
    for (stage, v) in k.iter().enumerate() {
        x += h * B5[stage] * v.vx;
        y += h * B5[stage] * v.vy;
        ex += h * (B5[stage] - B4[stage]) * v.vx;
        ey += h * (B5[stage] - B4[stage]) * v.vy;
    }
    let next = Point::new(x, y);
    let error = if next.is_finite() {
        ex.hypot(ey)
    } else {
        f64::INFINITY
    };
    (next, error)
}

/// Where an integration pass reports to.
pub struct Observers<'a> {
    /// Receives progress events according to the integrator's mode.
    pub progress: &'a mut dyn ProgressSink,
    /// When present, receives the field after every accepted step.
    pub snapshots: Option<&'a mut dyn SnapshotSink>,
    /// Polled before every step attempt.
    pub cancel: Option<&'a CancelFlag>,
}

impl<'a> Observers<'a> {
    /// Report progress only.
    pub fn new(progress: &'a mut dyn ProgressSink) -> Self {
        Self {
            progress,
            snapshots: None,
            cancel: None,
        }
    }

    /// Also persist a snapshot after every accepted step.
    pub fn with_snapshots(mut self, sink: &'a mut dyn SnapshotSink) -> Self {
        self.snapshots = Some(sink);
        self
    }

    /// Stop early when `flag` is raised.
    pub fn with_cancel(mut self, flag: &'a CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn cancelled(&self) -> bool {
        self.cancel.is_some_and(CancelFlag::is_cancelled)
    }
}

/// The adaptive point integrator.
#[derive(Clone, Debug)]
pub struct Integrator {
    config: IntegratorConfig,
    mode: ProgressMode,
}

impl Integrator {
    /// Validate `config` and build an integrator that reports in
    /// [`ProgressMode::Normal`].
    pub fn new(config: IntegratorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            mode: ProgressMode::default(),
        })
    }

    /// Set the progress reporting mode.
    pub fn with_progress_mode(mut self, mode: ProgressMode) -> Self {
        self.mode = mode;
        self
    }

    /// The step-control parameters.
    pub fn config(&self) -> &IntegratorConfig {
        &self.config
    }

    /// Advance `points` in place from the source's start time to 1.
    ///
    /// On error the points hold the positions of the last accepted step.
    /// Accepted positions are clamped into the closed domain.
    pub fn run<S: VelocitySource + ?Sized>(
        &self,
        source: &mut S,
        points: &mut [Point],
        observers: &mut Observers<'_>,
    ) -> Result<IntegrationMetrics, IntegrationError> {
        let started = Instant::now();
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(IntegrationError::InvalidPoint { index });
        }

        let cfg = &self.config;
        let dims = source.dims();
        let (width, height) = (dims.xsize() as f64, dims.ysize() as f64);
        let origin = points.to_vec();
        let mut trial = origin.clone();
        let mut metrics = IntegrationMetrics {
            points: points.len(),
            ..IntegrationMetrics::default()
        };

        let mut t = source.start_time();
        let mut h = cfg.initial_step.min(cfg.max_step);

        while t < 1.0 {
            if observers.cancelled() {
                return Err(IntegrationError::Cancelled { time: t });
            }
            if h < cfg.min_step {
                return Err(IntegrationError::StepSizeCollapsed {
                    time: t,
                    step: h,
                    min_step: cfg.min_step,
                });
            }

            let landing = h >= 1.0 - t;
            let (step, target) = if landing { (1.0 - t, 1.0) } else { (h, t + h) };

            let field_started = Instant::now();
            source.extend_to(target)?;
            metrics.field_evaluations += 1;
            metrics.field_us += field_started.elapsed().as_micros() as u64;

            let mut error: f64 = 0.0;
            for (p, out) in points.iter().zip(trial.iter_mut()) {
                let (next, e) = cash_karp(&*source, t, step, *p);
                *out = next;
                error = error.max(e);
            }

            let change = source.field_change();
            let mut factor = if error > 0.0 {
                cfg.safety * (cfg.target_error / error).powf(0.2)
            } else {
                cfg.max_growth
            };
            if change > 0.0 {
                factor = factor.min(cfg.safety * cfg.max_field_change / change);
            }

            if error > cfg.target_error || change > cfg.max_field_change {
                metrics.rejected_steps += 1;
                h = step * factor.clamp(cfg.min_shrink, 1.0);
                continue;
            }

            for (p, next) in points.iter_mut().zip(&trial) {
                *p = Point::new(next.x.clamp(0.0, width), next.y.clamp(0.0, height));
            }
            source.commit();
            t = if landing { 1.0 } else { target.min(1.0) };
            metrics.record_step(step);

            if let Some(sink) = observers.snapshots.as_deref_mut() {
                let n = metrics.accepted_steps;
                sink.persist(n, source.latest())
                    .map_err(|reason| IntegrationError::SnapshotWrite { step: n, reason })?;
                metrics.snapshots_written += 1;
            }

            if self.mode.per_step() {
                let detail = matches!(self.mode, ProgressMode::Detailed).then(|| StepDetail {
                    step,
                    error,
                    accepted: metrics.accepted_steps,
                    rejected: metrics.rejected_steps,
                });
                observers.progress.report(&ProgressEvent::Step {
                    fraction: t,
                    detail,
                });
            }

            h = (step * factor.clamp(cfg.min_shrink, cfg.max_growth)).min(cfg.max_step);
        }

        metrics.final_time = t;
        metrics.max_displacement = origin
            .iter()
            .zip(points.iter())
            .map(|(a, b)| a.distance(*b))
            .fold(0.0, f64::max);
        metrics.total_us = started.elapsed().as_micros() as u64;

        if !matches!(self.mode, ProgressMode::None) {
            observers.progress.report(&ProgressEvent::Finished {
                metrics: metrics.clone(),
            });
        }
        Ok(metrics)
    }
}
