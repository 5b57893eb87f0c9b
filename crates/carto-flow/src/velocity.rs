//! Continuous velocity field `v = -grad(rho) / rho` over grid space.
//!
//! The solver only yields samples at cell centers and at requested times.
//! [`SpectralVelocity`] keeps the two most recent snapshots and serves any
//! `(t, x, y)` between them by linear interpolation in time and bilinear
//! interpolation in space.
//!
//! # Time scale
//!
//! Fictitious time `t` in `[0, 1]` maps onto diffusion time `t * horizon`.
//! Points therefore move with `horizon * v`, so that by `t = 1` they have
//! followed the whole diffusion up to the horizon.
//!
//! # Boundary policy
//!
//! Sampling positions are clamped into `[0, W] x [0, H]`. Between the
//! domain edge and the outermost cell centers the stencil reads mirrored
//! ghost cells: density is even across the edge, the normal gradient
//! component odd. The interpolated normal velocity is therefore exactly
//! zero on the edge and domain corners are fixed points of the flow.

use carto_core::{FieldSnapshot, GridDims, GridError, Point, Velocity};
use carto_spectral::DiffusionSolver;

/// A time-dependent velocity field the integrator can step through.
///
/// Implementations cache a window `[start_time, end_time]`; the integrator
/// widens it with [`extend_to`](Self::extend_to) before each step attempt
/// and slides it with [`commit`](Self::commit) once the step is accepted.
pub trait VelocitySource {
    /// Grid dimensions of the domain.
    fn dims(&self) -> GridDims;

    /// Start of the cached time window.
    fn start_time(&self) -> f64;

    /// Make `velocity` valid for every time in `[start_time, t]`.
    fn extend_to(&mut self, t: f64) -> Result<(), GridError>;

    /// Accept the window end as the new start.
    fn commit(&mut self);

    /// Velocity at time `t` and position `p`.
    fn velocity(&self, t: f64, p: Point) -> Velocity;

    /// The snapshot at the end of the window; after [`commit`](Self::commit),
    /// the newly accepted time.
    fn latest(&self) -> &FieldSnapshot;

    /// Largest change of the velocity field across the cached window,
    /// relative to the largest speed at its start.
    ///
    /// Sources that are exact at every time return 0.
    fn field_change(&self) -> f64 {
        0.0
    }
}

/// Interpolated samples at one position: density and both gradient parts.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Sample {
    rho: f64,
    gx: f64,
    gy: f64,
}

impl Sample {
    fn lerp(self, other: Sample, w: f64) -> Sample {
        Sample {
            rho: self.rho + w * (other.rho - self.rho),
            gx: self.gx + w * (other.gx - self.gx),
            gy: self.gy + w * (other.gy - self.gy),
        }
    }
}

/// Two neighbouring sample indices along one axis, with weights and the
/// sign applied to the gradient component normal to that axis' edges.
#[derive(Clone, Copy, Debug)]
struct AxisStencil {
    lo: usize,
    hi: usize,
    w_hi: f64,
    sign_lo: f64,
    sign_hi: f64,
}

impl AxisStencil {
    fn new(u: f64, n: u32) -> Self {
        let u = u.clamp(0.0, n as f64) - 0.5;
        let base = u.floor();
        let (lo, sign_lo) = reflect(base as i64, n);
        let (hi, sign_hi) = reflect(base as i64 + 1, n);
        Self {
            lo,
            hi,
            w_hi: u - base,
            sign_lo,
            sign_hi,
        }
    }
}

/// Map a possibly out-of-range cell index to its mirror image.
fn reflect(i: i64, n: u32) -> (usize, f64) {
    let n = n as i64;
    if i < 0 {
        ((-1 - i) as usize, -1.0)
    } else if i >= n {
        ((2 * n - 1 - i) as usize, -1.0)
    } else {
        (i as usize, 1.0)
    }
}

fn sample(snap: &FieldSnapshot, p: Point) -> Sample {
    let dims = snap.dims();
    let w = dims.xsize() as usize;
    let sx = AxisStencil::new(p.x, dims.xsize());
    let sy = AxisStencil::new(p.y, dims.ysize());
    let (rho, gx, gy) = (snap.density(), snap.grad_x(), snap.grad_y());

    // Interpolate along x within each of the two rows, then along y.
    let row = |iy: usize, y_sign: f64| -> Sample {
        let a = iy * w + sx.lo;
        let b = iy * w + sx.hi;
        let lo = Sample {
            rho: rho[a],
            gx: sx.sign_lo * gx[a],
            gy: y_sign * gy[a],
        };
        let hi = Sample {
            rho: rho[b],
            gx: sx.sign_hi * gx[b],
            gy: y_sign * gy[b],
        };
        lo.lerp(hi, sx.w_hi)
    };
    row(sy.lo, sy.sign_lo).lerp(row(sy.hi, sy.sign_hi), sy.w_hi)
}

/// Largest velocity change between two snapshots over all cell centers,
/// relative to the largest speed in `from`.
fn relative_change(from: &FieldSnapshot, to: &FieldSnapshot, floor: f64) -> f64 {
    let cell_velocity = |snap: &FieldSnapshot, i: usize| {
        let rho = snap.density()[i].max(floor);
        (snap.grad_x()[i] / rho, snap.grad_y()[i] / rho)
    };
    let mut speed: f64 = 0.0;
    let mut change: f64 = 0.0;
    for i in 0..from.density().len() {
        let (ax, ay) = cell_velocity(from, i);
        let (bx, by) = cell_velocity(to, i);
        speed = speed.max(ax.hypot(ay));
        change = change.max((bx - ax).hypot(by - ay));
    }
    if speed > 0.0 {
        change / speed
    } else if change > 0.0 {
        f64::INFINITY
    } else {
        0.0
    }
}

/// The velocity field of a [`DiffusionSolver`], cached at two times.
#[derive(Debug)]
pub struct SpectralVelocity<'w> {
    solver: DiffusionSolver<'w>,
    earlier: FieldSnapshot,
    later: FieldSnapshot,
    floor: f64,
    horizon: f64,
    change: f64,
}

impl<'w> SpectralVelocity<'w> {
    /// Evaluate `solver` at time 0 and cache it.
    ///
    /// `density_floor` is a fraction of the mean density; interpolated
    /// densities below it are raised to it before dividing. `horizon` is
    /// the diffusion time reached at fictitious time 1; returns
    /// `Err(GridError::InvalidHorizon)` unless it is positive and finite.
    pub fn new(
        mut solver: DiffusionSolver<'w>,
        density_floor: f64,
        horizon: f64,
    ) -> Result<Self, GridError> {
        if !(horizon > 0.0 && horizon.is_finite()) {
            return Err(GridError::InvalidHorizon { horizon });
        }
        let mut earlier = FieldSnapshot::new(solver.dims())?;
        solver.evaluate(0.0, &mut earlier)?;
        let later = earlier.clone();
        let floor = (density_floor * solver.mean()).max(f64::MIN_POSITIVE);
        Ok(Self {
            solver,
            earlier,
            later,
            floor,
            horizon,
            change: 0.0,
        })
    }

    /// The absolute density floor.
    pub fn floor(&self) -> f64 {
        self.floor
    }

    /// Diffusion time reached at fictitious time 1.
    pub fn horizon(&self) -> f64 {
        self.horizon
    }

    /// The underlying solver.
    pub fn solver(&self) -> &DiffusionSolver<'w> {
        &self.solver
    }

    /// Release the solver.
    pub fn into_solver(self) -> DiffusionSolver<'w> {
        self.solver
    }

    fn interpolated(&self, t: f64, p: Point) -> Sample {
        let (t0, t1) = (self.earlier.time(), self.later.time());
        let a = sample(&self.earlier, p);
        if t1 <= t0 {
            return a;
        }
        let w = ((t - t0) / (t1 - t0)).clamp(0.0, 1.0);
        a.lerp(sample(&self.later, p), w)
    }

    /// Interpolated density at time `t` and position `p`, before flooring.
    pub fn density(&self, t: f64, p: Point) -> f64 {
        self.interpolated(t, p).rho
    }
}

impl VelocitySource for SpectralVelocity<'_> {
    fn dims(&self) -> GridDims {
        self.solver.dims()
    }

    fn start_time(&self) -> f64 {
        self.earlier.time()
    }

    fn extend_to(&mut self, t: f64) -> Result<(), GridError> {
        if !(t >= 0.0 && t.is_finite()) {
            return Err(GridError::InvalidTime { time: t });
        }
        self.solver.evaluate(t * self.horizon, &mut self.later)?;
        self.later.set_time(t);
        self.change = relative_change(&self.earlier, &self.later, self.floor);
        Ok(())
    }

    fn commit(&mut self) {
        std::mem::swap(&mut self.earlier, &mut self.later);
    }

    fn velocity(&self, t: f64, p: Point) -> Velocity {
        let s = self.interpolated(t, p);
        let scale = self.horizon / s.rho.max(self.floor);
        Velocity::new(-s.gx * scale, -s.gy * scale)
    }

    fn latest(&self) -> &FieldSnapshot {
        // After a commit the accepted snapshot sits in `earlier`.
        if self.later.time() >= self.earlier.time() {
            &self.later
        } else {
            &self.earlier
        }
    }

    fn field_change(&self) -> f64 {
        self.change
    }
}
