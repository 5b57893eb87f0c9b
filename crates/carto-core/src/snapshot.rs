//! Whole-grid density and gradient samples at one fictitious time.

use crate::error::GridError;
use crate::grid::{try_zeroed, DensityGrid, GridDims};

/// Density and its spatial gradient at every cell center, at one time.
///
/// Produced by the diffusion solver and consumed by the velocity evaluator.
/// Buffers share the row-major layout of [`DensityGrid`].
#[derive(Clone, Debug, PartialEq)]
pub struct FieldSnapshot {
    dims: GridDims,
    time: f64,
    density: Vec<f64>,
    grad_x: Vec<f64>,
    grad_y: Vec<f64>,
}

impl FieldSnapshot {
    /// Allocate a zeroed snapshot at time 0.
    pub fn new(dims: GridDims) -> Result<Self, GridError> {
        let n = dims.cell_count();
        Ok(Self {
            dims,
            time: 0.0,
            density: try_zeroed(n)?,
            grad_x: try_zeroed(n)?,
            grad_y: try_zeroed(n)?,
        })
    }

    /// The grid dimensions.
    pub fn dims(&self) -> GridDims {
        self.dims
    }

    /// The fictitious time these samples belong to.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Set the fictitious time. Called by the solver after filling buffers.
    pub fn set_time(&mut self, time: f64) {
        self.time = time;
    }

    /// Density samples.
    pub fn density(&self) -> &[f64] {
        &self.density
    }

    /// `d(rho)/dx` samples.
    pub fn grad_x(&self) -> &[f64] {
        &self.grad_x
    }

    /// `d(rho)/dy` samples.
    pub fn grad_y(&self) -> &[f64] {
        &self.grad_y
    }

    /// Mutable access to the density, x-gradient and y-gradient buffers.
    pub fn buffers_mut(&mut self) -> (&mut [f64], &mut [f64], &mut [f64]) {
        (&mut self.density, &mut self.grad_x, &mut self.grad_y)
    }

    /// Copy the density samples into a standalone grid.
    pub fn to_density_grid(&self) -> Result<DensityGrid, GridError> {
        DensityGrid::from_vec(self.dims, self.density.clone())
    }

    /// Fail with `DimensionMismatch` unless sized for `dims`.
    pub fn ensure_dims(&self, dims: GridDims) -> Result<(), GridError> {
        if self.dims != dims {
            return Err(GridError::DimensionMismatch {
                expected: self.dims,
                actual: dims,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_snapshot_is_zero_at_time_zero() {
        let snap = FieldSnapshot::new(GridDims::new(3, 3).unwrap()).unwrap();
        assert_eq!(snap.time(), 0.0);
        assert_eq!(snap.density().len(), 9);
        assert!(snap.grad_x().iter().chain(snap.grad_y()).all(|&v| v == 0.0));
    }

    #[test]
    fn mismatched_dims_rejected() {
        let snap = FieldSnapshot::new(GridDims::new(3, 3).unwrap()).unwrap();
        assert!(snap.ensure_dims(GridDims::new(3, 4).unwrap()).is_err());
        assert!(snap.ensure_dims(GridDims::new(3, 3).unwrap()).is_ok());
    }

    #[test]
    fn density_grid_copy_matches() {
        let dims = GridDims::new(2, 1).unwrap();
        let mut snap = FieldSnapshot::new(dims).unwrap();
        snap.buffers_mut().0.copy_from_slice(&[1.5, 2.5]);
        assert_eq!(snap.to_density_grid().unwrap().as_slice(), &[1.5, 2.5]);
    }
}
