//! Deterministic density and point fixtures.
//!
//! - [`uniform_density`]: every cell equal.
//! - [`random_density`]: seeded ChaCha values in `[lo, hi)`.
//! - [`cosine_mode_density`]: `1 + amp cos(pi x / W)`, exactly one mode.
//! - [`two_by_two_density`]: the `[[1, 1], [1, 3]]` scenario grid.
//! - [`lattice_points`]: every integer corner of a grid.

use std::f64::consts::PI;

use carto_core::{DensityGrid, GridDims, Point};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub fn dims(xsize: u32, ysize: u32) -> GridDims {
    GridDims::new(xsize, ysize).expect("fixture dimensions are non-zero")
}

pub fn uniform_density(xsize: u32, ysize: u32, value: f64) -> DensityGrid {
    DensityGrid::from_vec(dims(xsize, ysize), vec![value; (xsize * ysize) as usize])
        .expect("length matches")
}

/// Cell values drawn uniformly from `[lo, hi)` with a fixed seed.
pub fn random_density(xsize: u32, ysize: u32, lo: f64, hi: f64, seed: u64) -> DensityGrid {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    DensityGrid::from_fn(dims(xsize, ysize), |_, _| rng.random_range(lo..hi))
        .expect("fixture allocation")
}

/// A single cosine mode along `x`, sampled at cell centers.
pub fn cosine_mode_density(xsize: u32, ysize: u32, amp: f64) -> DensityGrid {
    DensityGrid::from_fn(dims(xsize, ysize), |ix, _| {
        1.0 + amp * (PI * (ix as f64 + 0.5) / xsize as f64).cos()
    })
    .expect("fixture allocation")
}

/// Cell `(1, 1)` holds 3, the others 1.
pub fn two_by_two_density() -> DensityGrid {
    DensityGrid::from_vec(dims(2, 2), vec![1.0, 1.0, 1.0, 3.0]).expect("length matches")
}

/// All `(xsize + 1) * (ysize + 1)` integer corners, `y` outer, `x` inner.
pub fn lattice_points(xsize: u32, ysize: u32) -> Vec<Point> {
    (0..=ysize)
        .flat_map(|iy| (0..=xsize).map(move |ix| Point::new(ix as f64, iy as f64)))
        .collect()
}
