//! Transform plans and scratch space sized to one grid.
//!
//! A [`Workspace`] is created once per `(xsize, ysize)` and reused by any
//! number of solvers at that size. It owns one rustdct plan per axis length
//! (shared when the grid is square), a column gather buffer, and the
//! transform scratch buffer, so repeated evaluations never reallocate.
//! Axes of length 1 carry no plan: their cosine transform is the identity
//! and they have no sine modes.

use std::fmt;
use std::sync::Arc;

use carto_core::grid::try_zeroed;
use carto_core::{GridDims, GridError};
use rustdct::{DctPlanner, TransformType2And3};

type Plan = Arc<dyn TransformType2And3<f64>>;

/// Basis used when synthesizing values along one axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AxisBasis {
    /// `cos(pi k x / N)`, frequencies `0..N`.
    Cosine,
    /// `sin(pi k x / N)`, frequencies `1..N`; coefficient `k` is read from
    /// index `k` of the input, index 0 is ignored.
    Sine,
}

/// Reusable transform state for one grid size.
pub struct Workspace {
    dims: GridDims,
    plan_x: Option<Plan>,
    plan_y: Option<Plan>,
    column: Vec<f64>,
    scratch: Vec<f64>,
}

impl Workspace {
    /// Plan transforms and allocate scratch for `dims`.
    ///
    /// Returns `Err(GridError::AllocationFailed)` if scratch space cannot be
    /// allocated.
    pub fn new(dims: GridDims) -> Result<Self, GridError> {
        let mut planner = DctPlanner::new();
        let mut plan = |len: u32| -> Option<Plan> {
            (len > 1).then(|| planner.plan_dct2(len as usize))
        };
        let plan_x = plan(dims.xsize());
        let plan_y = plan(dims.ysize());

        let scratch_len = plan_x
            .iter()
            .chain(plan_y.iter())
            .map(|p| p.get_scratch_len())
            .max()
            .unwrap_or(0);

        Ok(Self {
            dims,
            plan_x,
            plan_y,
            column: try_zeroed(dims.ysize() as usize)?,
            scratch: try_zeroed(scratch_len)?,
        })
    }

    /// The dimensions this workspace was created for.
    pub fn dims(&self) -> GridDims {
        self.dims
    }

    /// Fail with `DimensionMismatch` unless created for `dims`.
    pub fn ensure_dims(&self, dims: GridDims) -> Result<(), GridError> {
        if self.dims != dims {
            return Err(GridError::DimensionMismatch {
                expected: self.dims,
                actual: dims,
            });
        }
        Ok(())
    }

    /// Memory held by scratch buffers, in bytes. Plans are not counted.
    pub fn memory_bytes(&self) -> usize {
        (self.column.len() + self.scratch.len()) * std::mem::size_of::<f64>()
    }

    /// Replace `data` by its cosine coefficients.
    ///
    /// Along each axis of length `N > 1` the result is `(2 / N) * DCT-II`,
    /// so that [`synthesize`](Self::synthesize) with
    /// [`AxisBasis::Cosine`] on both axes reproduces the input.
    pub fn analyze(&mut self, data: &mut [f64]) {
        debug_assert_eq!(data.len(), self.dims.cell_count());
        let w = self.dims.xsize() as usize;
        let h = self.dims.ysize() as usize;
        let Self {
            plan_x,
            plan_y,
            column,
            scratch,
            ..
        } = self;

        if let Some(plan) = plan_x {
            let s = &mut scratch[..plan.get_scratch_len()];
            let norm = 2.0 / w as f64;
            for row in data.chunks_exact_mut(w) {
                plan.process_dct2_with_scratch(row, s);
                row.iter_mut().for_each(|v| *v *= norm);
            }
        }

        if let Some(plan) = plan_y {
            let s = &mut scratch[..plan.get_scratch_len()];
            let norm = 2.0 / h as f64;
            for ix in 0..w {
                gather(data, column, ix, w);
                plan.process_dct2_with_scratch(column, s);
                column.iter_mut().for_each(|v| *v *= norm);
                scatter(data, column, ix, w);
            }
        }
    }

    /// Replace coefficients in `data` by grid values at cell centers,
    /// synthesizing `x` in basis `bx` and `y` in basis `by`.
    pub fn synthesize(&mut self, data: &mut [f64], bx: AxisBasis, by: AxisBasis) {
        debug_assert_eq!(data.len(), self.dims.cell_count());
        let w = self.dims.xsize() as usize;
        let Self {
            plan_x,
            plan_y,
            column,
            scratch,
            ..
        } = self;

        match plan_x {
            Some(plan) => {
                let s = &mut scratch[..plan.get_scratch_len()];
                for row in data.chunks_exact_mut(w) {
                    synthesize_line(&**plan, row, s, bx);
                }
            }
            None if bx == AxisBasis::Sine => data.fill(0.0),
            None => {}
        }

        match plan_y {
            Some(plan) => {
                let s = &mut scratch[..plan.get_scratch_len()];
                for ix in 0..w {
                    gather(data, column, ix, w);
                    synthesize_line(&**plan, column, s, by);
                    scatter(data, column, ix, w);
                }
            }
            None if by == AxisBasis::Sine => data.fill(0.0),
            None => {}
        }
    }
}

impl fmt::Debug for Workspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workspace")
            .field("dims", &self.dims)
            .field("scratch_len", &self.scratch.len())
            .finish_non_exhaustive()
    }
}

fn synthesize_line(
    plan: &dyn TransformType2And3<f64>,
    line: &mut [f64],
    scratch: &mut [f64],
    basis: AxisBasis,
) {
    match basis {
        AxisBasis::Cosine => plan.process_dct3_with_scratch(line, scratch),
        AxisBasis::Sine => {
            // DST-III reads frequency m + 1 from index m; the top slot is
            // the Nyquist sine term, which a cosine series never produces.
            line.rotate_left(1);
            if let Some(last) = line.last_mut() {
                *last = 0.0;
            }
            plan.process_dst3_with_scratch(line, scratch);
        }
    }
}

fn gather(data: &[f64], column: &mut [f64], ix: usize, w: usize) {
    for (iy, c) in column.iter_mut().enumerate() {
        *c = data[iy * w + ix];
    }
}

fn scatter(data: &mut [f64], column: &[f64], ix: usize, w: usize) {
    for (iy, c) in column.iter().enumerate() {
        data[iy * w + ix] = *c;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn dims(x: u32, y: u32) -> GridDims {
        GridDims::new(x, y).unwrap()
    }

    #[test]
    fn analyze_then_synthesize_is_identity() {
        let d = dims(5, 4);
        let mut ws = Workspace::new(d).unwrap();
        let original: Vec<f64> = (0..d.cell_count()).map(|i| (i * 7 % 11) as f64).collect();
        let mut data = original.clone();
        ws.analyze(&mut data);
        ws.synthesize(&mut data, AxisBasis::Cosine, AxisBasis::Cosine);
        for (a, b) in original.iter().zip(&data) {
            assert!((a - b).abs() < 1e-10, "{a} vs {b}");
        }
    }

    #[test]
    fn constant_field_has_only_dc() {
        let d = dims(6, 3);
        let mut ws = Workspace::new(d).unwrap();
        let mut data = vec![2.0; d.cell_count()];
        ws.analyze(&mut data);
        // (2/N)·DCT-II of a constant c is 2c at k = 0, per axis.
        assert!((data[0] - 8.0).abs() < 1e-12);
        assert!(data[1..].iter().all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn sine_synthesis_matches_closed_form() {
        let d = dims(8, 1);
        let mut ws = Workspace::new(d).unwrap();
        let mut data = vec![0.0; 8];
        data[3] = 1.0;
        ws.synthesize(&mut data, AxisBasis::Sine, AxisBasis::Cosine);
        for (i, v) in data.iter().enumerate() {
            let x = i as f64 + 0.5;
            let expected = (PI * 3.0 * x / 8.0).sin();
            assert!((v - expected).abs() < 1e-12, "cell {i}: {v} vs {expected}");
        }
    }

    #[test]
    fn unit_axis_sine_is_zero() {
        let d = dims(4, 1);
        let mut ws = Workspace::new(d).unwrap();
        let mut data = vec![1.0; 4];
        ws.synthesize(&mut data, AxisBasis::Cosine, AxisBasis::Sine);
        assert!(data.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn single_cell_round_trip() {
        let d = dims(1, 1);
        let mut ws = Workspace::new(d).unwrap();
        let mut data = vec![3.5];
        ws.analyze(&mut data);
        ws.synthesize(&mut data, AxisBasis::Cosine, AxisBasis::Cosine);
        assert_eq!(data, vec![3.5]);
    }

    #[test]
    fn mismatch_detected() {
        let ws = Workspace::new(dims(4, 4)).unwrap();
        assert_eq!(
            ws.ensure_dims(dims(4, 5)),
            Err(GridError::DimensionMismatch {
                expected: dims(4, 4),
                actual: dims(4, 5),
            })
        );
    }
}
