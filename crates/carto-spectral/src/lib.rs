//! Spectral diffusion solver for the carto cartogram engine.
//!
//! [`Workspace`] holds transform plans and scratch for one grid size;
//! [`DiffusionSolver`] borrows it, takes ownership of a density grid,
//! transforms it once, and then yields density and gradient snapshots at
//! any fictitious time.
//!
//! ```
//! use carto_core::{DensityGrid, FieldSnapshot, GridDims};
//! use carto_spectral::{DiffusionSolver, Workspace};
//!
//! let dims = GridDims::new(4, 4).unwrap();
//! let mut ws = Workspace::new(dims).unwrap();
//! let density = DensityGrid::from_fn(dims, |ix, iy| 1.0 + (ix * iy) as f64).unwrap();
//! let mut solver = DiffusionSolver::new(&mut ws, density).unwrap();
//!
//! let mut snap = FieldSnapshot::new(dims).unwrap();
//! solver.evaluate(0.5, &mut snap).unwrap();
//! assert_eq!(snap.time(), 0.5);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod solver;
pub mod workspace;

pub use solver::DiffusionSolver;
pub use workspace::{AxisBasis, Workspace};
