//! Carto: density-equalizing cartograms by the diffusion method.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the carto sub-crates and provides [`Cartogram`], which runs a complete
//! transform: spectral diffusion of a density grid, then adaptive
//! integration of a point set through the resulting velocity field.
//!
//! # Quick start
//!
//! ```rust
//! use carto::prelude::*;
//!
//! let dims = GridDims::new(2, 2).unwrap();
//! let density = DensityGrid::from_vec(dims, vec![1.0, 1.0, 1.0, 3.0]).unwrap();
//! let mut points = vec![Point::new(1.0, 1.0)];
//!
//! let mut cartogram = Cartogram::new(dims).unwrap();
//! let mut progress = NullProgress;
//! let metrics = cartogram
//!     .transform(
//!         density,
//!         &mut points,
//!         &CartogramConfig::default(),
//!         &mut Observers::new(&mut progress),
//!     )
//!     .unwrap();
//!
//! assert_eq!(metrics.final_time, 1.0);
//! assert!(points[0].x < 1.0 && points[0].y < 1.0);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `carto-core` | Grids, points, configuration, errors, progress traits |
//! | [`spectral`] | `carto-spectral` | Transform workspace and diffusion solver |
//! | [`flow`] | `carto-flow` | Velocity field, adaptive integrator, cancellation |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cartogram;

pub use cartogram::{Cartogram, CartogramError};

/// Core types, configuration, and errors (`carto-core`).
pub use carto_core as types;

/// Transform workspace and spectral diffusion solver (`carto-spectral`).
///
/// Use [`spectral::DiffusionSolver`] directly to inspect the density at
/// arbitrary fictitious times.
pub use carto_spectral as spectral;

/// Velocity fields and the adaptive integrator (`carto-flow`).
///
/// Implement [`flow::VelocitySource`] to integrate points through a field
/// other than the diffusion one.
pub use carto_flow as flow;

/// Common imports for typical carto usage.
///
/// ```rust
/// use carto::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{Cartogram, CartogramError};

    // Grid and points
    pub use carto_core::{DensityGrid, GridDims, Point, Velocity};

    // Configuration
    pub use carto_core::{CartogramConfig, IntegratorConfig, ProgressMode};

    // Errors
    pub use carto_core::{ConfigError, GridError, IntegrationError};

    // Observation
    pub use carto_core::{
        IntegrationMetrics, NullProgress, ProgressEvent, ProgressSink, SnapshotSink, StepDetail,
    };

    // Flow
    pub use carto_flow::{CancelFlag, ChannelProgress, Observers};
}
