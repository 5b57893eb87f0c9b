//! Velocity fields and adaptive point integration for the carto engine.
//!
//! [`SpectralVelocity`] turns a [`DiffusionSolver`](carto_spectral::DiffusionSolver)
//! into a continuous field `v = -grad(rho) / rho`, run until a chosen
//! diffusion horizon by fictitious time 1; [`Integrator`] moves a
//! point set through any [`VelocitySource`] from time 0 to 1.
//!
//! ```
//! use carto_core::{IntegratorConfig, NullProgress, Point};
//! use carto_flow::{Integrator, Observers, SpectralVelocity};
//! use carto_spectral::{DiffusionSolver, Workspace};
//!
//! let dims = carto_core::GridDims::new(2, 1).unwrap();
//! let density = carto_core::DensityGrid::from_vec(dims, vec![2.0, 1.0]).unwrap();
//! let mut ws = Workspace::new(dims).unwrap();
//! let solver = DiffusionSolver::new(&mut ws, density).unwrap();
//! let horizon = 12.0 * solver.relaxation_time();
//! let mut field = SpectralVelocity::new(solver, 1e-6, horizon).unwrap();
//!
//! let mut points = vec![Point::new(1.0, 0.5)];
//! let mut progress = NullProgress;
//! Integrator::new(IntegratorConfig::default())
//!     .unwrap()
//!     .run(&mut field, &mut points, &mut Observers::new(&mut progress))
//!     .unwrap();
//! // Two thirds of the mass lies left of x = 1, so the line moves toward
//! // x = 4/3; two cells resolve the field only coarsely.
//! assert!(points[0].x > 1.15 && points[0].x < 4.0 / 3.0);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cancel;
pub mod channel;
pub mod integrator;
pub mod velocity;

pub use cancel::CancelFlag;
pub use channel::ChannelProgress;
pub use integrator::{Integrator, Observers};
pub use velocity::{SpectralVelocity, VelocitySource};
