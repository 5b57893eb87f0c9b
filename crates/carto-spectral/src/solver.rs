//! Spectral solution of the diffusion equation with zero-flux boundaries.
//!
//! The cosine basis `cos(pi kx x / W) cos(pi ky y / H)` diagonalizes the
//! Laplacian under reflective boundary conditions, so every coefficient
//! decays independently:
//!
//! ```text
//! a(kx, ky, t) = a(kx, ky, 0) * exp(-pi^2 (kx^2 / W^2 + ky^2 / H^2) t)
//! ```
//!
//! Evaluating the field at time `t` is one coefficient scaling followed by
//! an inverse transform. Gradients come from the same coefficients: the
//! `x` derivative of a cosine mode is `-(pi kx / W)` times the matching sine
//! mode, synthesized with a DST-III along `x`.

use carto_core::grid::try_zeroed;
use carto_core::{DensityGrid, FieldSnapshot, GridDims, GridError};

use crate::workspace::{AxisBasis, Workspace};

/// Blurred cells below `-NEGATIVE_TOLERANCE * max|rho|` are rejected.
const NEGATIVE_TOLERANCE: f64 = 1e-9;

/// Density and gradient at any fictitious time, from one forward transform.
///
/// Borrows a [`Workspace`] exclusively for its lifetime and owns the
/// density buffer it was built from, which is overwritten with its cosine
/// spectrum.
#[derive(Debug)]
pub struct DiffusionSolver<'w> {
    workspace: &'w mut Workspace,
    spectrum: DensityGrid,
    /// `pi k / xsize` for `k in 0..xsize`.
    kx: Vec<f64>,
    /// `pi k / ysize` for `k in 0..ysize`.
    ky: Vec<f64>,
    decay_x: Vec<f64>,
    decay_y: Vec<f64>,
    mean: f64,
    blur_time: f64,
    evaluations: u64,
}

impl<'w> DiffusionSolver<'w> {
    /// Transform `density` in place and prepare to evaluate it at any time.
    ///
    /// Returns `Err` if the workspace was created for different dimensions
    /// or if any cell is negative or not finite.
    pub fn new(workspace: &'w mut Workspace, mut density: DensityGrid) -> Result<Self, GridError> {
        let dims = density.dims();
        workspace.ensure_dims(dims)?;
        density.validate_non_negative()?;

        let mean = density.mean();
        workspace.analyze(density.as_mut_slice());

        Ok(Self {
            workspace,
            spectrum: density,
            kx: wavenumbers(dims.xsize()),
            ky: wavenumbers(dims.ysize()),
            decay_x: try_zeroed(dims.xsize() as usize)?,
            decay_y: try_zeroed(dims.ysize() as usize)?,
            mean,
            blur_time: 0.0,
            evaluations: 0,
        })
    }

    /// The grid dimensions.
    pub fn dims(&self) -> GridDims {
        self.spectrum.dims()
    }

    /// Mean density, which diffusion conserves.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Total diffusion time folded into the spectrum by blurring.
    pub fn blur_time(&self) -> f64 {
        self.blur_time
    }

    /// Diffusion time over which the slowest non-constant mode decays by a
    /// factor of `e`: `L^2 / pi^2` with `L` the longer grid side.
    ///
    /// Every other mode decays at least as fast, so after `n` relaxation
    /// times the field deviates from its mean by at most `e^-n` of its
    /// initial deviation.
    pub fn relaxation_time(&self) -> f64 {
        let dims = self.dims();
        let longest = dims.xsize().max(dims.ysize()) as f64;
        longest * longest / (std::f64::consts::PI * std::f64::consts::PI)
    }

    /// Number of whole-field evaluations performed so far.
    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    /// Pre-smooth the initial field with a Gaussian of width `blur` (grid
    /// units), applied as a diffusion of duration `blur^2 / 2`.
    ///
    /// After this call, time 0 refers to the blurred field. A zero blur is
    /// a no-op. Returns `Err(GridError::InvalidBlur)` for a negative or
    /// non-finite width and `Err(GridError::InvalidDensity)` if the blurred
    /// field has a significantly negative cell; the spectrum is left
    /// unchanged on error.
    pub fn apply_blur(&mut self, blur: f64) -> Result<(), GridError> {
        if !(blur >= 0.0) || !blur.is_finite() {
            return Err(GridError::InvalidBlur { blur });
        }
        if blur == 0.0 {
            return Ok(());
        }
        let t = 0.5 * blur * blur;

        self.fill_decay(t);
        let mut candidate = DensityGrid::zeroed(self.dims())?;
        scale_spectrum(
            self.spectrum.as_slice(),
            candidate.as_mut_slice(),
            &self.decay_x,
            &self.decay_y,
        );
        let coefficients = candidate.as_slice().to_vec();

        self.workspace
            .synthesize(candidate.as_mut_slice(), AxisBasis::Cosine, AxisBasis::Cosine);
        let max_abs = candidate
            .as_slice()
            .iter()
            .fold(0.0f64, |m, v| m.max(v.abs()));
        if let Some(i) = candidate
            .as_slice()
            .iter()
            .position(|&v| v < -NEGATIVE_TOLERANCE * max_abs)
        {
            let w = self.dims().xsize() as usize;
            return Err(GridError::InvalidDensity {
                ix: (i % w) as u32,
                iy: (i / w) as u32,
                value: candidate.as_slice()[i],
            });
        }

        self.spectrum.as_mut_slice().copy_from_slice(&coefficients);
        self.blur_time += t;
        Ok(())
    }

    /// Fill `out` with density and gradient at fictitious time `t`.
    ///
    /// Returns `Err(GridError::InvalidTime)` for negative or non-finite `t`
    /// and `Err(GridError::DimensionMismatch)` if `out` has a different size.
    pub fn evaluate(&mut self, t: f64, out: &mut FieldSnapshot) -> Result<(), GridError> {
        check_time(t)?;
        out.ensure_dims(self.dims())?;
        self.fill_decay(t);

        let w = self.dims().xsize() as usize;
        let (density, grad_x, grad_y) = out.buffers_mut();
        for (i, &c) in self.spectrum.as_slice().iter().enumerate() {
            let (k, l) = (i % w, i / w);
            let a = c * self.decay_x[k] * self.decay_y[l];
            density[i] = a;
            grad_x[i] = -self.kx[k] * a;
            grad_y[i] = -self.ky[l] * a;
        }

        self.workspace
            .synthesize(density, AxisBasis::Cosine, AxisBasis::Cosine);
        self.workspace
            .synthesize(grad_x, AxisBasis::Sine, AxisBasis::Cosine);
        self.workspace
            .synthesize(grad_y, AxisBasis::Cosine, AxisBasis::Sine);

        out.set_time(t);
        self.evaluations += 1;
        Ok(())
    }

    /// Density alone at fictitious time `t`, as a new grid.
    pub fn density_at(&mut self, t: f64) -> Result<DensityGrid, GridError> {
        check_time(t)?;
        self.fill_decay(t);
        let mut grid = DensityGrid::zeroed(self.dims())?;
        scale_spectrum(
            self.spectrum.as_slice(),
            grid.as_mut_slice(),
            &self.decay_x,
            &self.decay_y,
        );
        self.workspace
            .synthesize(grid.as_mut_slice(), AxisBasis::Cosine, AxisBasis::Cosine);
        self.evaluations += 1;
        Ok(grid)
    }

    fn fill_decay(&mut self, t: f64) {
        for (d, k) in self.decay_x.iter_mut().zip(&self.kx) {
            *d = (-k * k * t).exp();
        }
        for (d, k) in self.decay_y.iter_mut().zip(&self.ky) {
            *d = (-k * k * t).exp();
        }
    }
}

fn check_time(t: f64) -> Result<(), GridError> {
    if t >= 0.0 && t.is_finite() {
        Ok(())
    } else {
        Err(GridError::InvalidTime { time: t })
    }
}

fn wavenumbers(n: u32) -> Vec<f64> {
    (0..n)
        .map(|k| std::f64::consts::PI * k as f64 / n as f64)
        .collect()
}

fn scale_spectrum(src: &[f64], dst: &mut [f64], decay_x: &[f64], decay_y: &[f64]) {
    let w = decay_x.len();
    for (i, (d, &c)) in dst.iter_mut().zip(src).enumerate() {
        *d = c * decay_x[i % w] * decay_y[i / w];
    }
}
