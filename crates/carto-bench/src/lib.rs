//! Benchmark profiles for the carto engine.
//!
//! - [`reference_density`]: an `n x n` grid with a few dense "cities" on a
//!   uniform background, the usual shape of population data
//! - [`stress_density`]: the same pattern at 512x512

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use carto_core::{DensityGrid, GridDims, Point};

/// Side length of the reference profile.
pub const REFERENCE_SIZE: u32 = 128;

/// Side length of the stress profile.
pub const STRESS_SIZE: u32 = 512;

/// Gaussian bumps as `(x, y, width, peak)` in fractions of the grid side.
const CITIES: [(f64, f64, f64, f64); 5] = [
    (0.25, 0.30, 0.04, 40.0),
    (0.70, 0.65, 0.06, 25.0),
    (0.55, 0.20, 0.02, 80.0),
    (0.15, 0.80, 0.05, 15.0),
    (0.85, 0.15, 0.03, 30.0),
];

/// Build an `n x n` density: background 1 plus [`CITIES`].
pub fn reference_density(n: u32) -> DensityGrid {
    let dims = GridDims::new(n, n).expect("benchmark size is non-zero");
    let side = n as f64;
    DensityGrid::from_fn(dims, |ix, iy| {
        let (x, y) = ((ix as f64 + 0.5) / side, (iy as f64 + 0.5) / side);
        1.0 + CITIES
            .iter()
            .map(|&(cx, cy, w, peak)| {
                let r2 = (x - cx).powi(2) + (y - cy).powi(2);
                peak * (-r2 / (2.0 * w * w)).exp()
            })
            .sum::<f64>()
    })
    .expect("benchmark grid fits in memory")
}

/// [`reference_density`] at [`STRESS_SIZE`].
pub fn stress_density() -> DensityGrid {
    reference_density(STRESS_SIZE)
}

/// The `(n + 1)^2` corners of an `n x n` grid.
pub fn corner_points(n: u32) -> Vec<Point> {
    (0..=n)
        .flat_map(|iy| (0..=n).map(move |ix| Point::new(ix as f64, iy as f64)))
        .collect()
}
