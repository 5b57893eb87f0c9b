//! One-call cartogram transform over a reusable workspace.

use std::error::Error;
use std::fmt;

use carto_core::{
    CartogramConfig, ConfigError, DensityGrid, GridDims, GridError, IntegrationError,
    IntegrationMetrics, Point, SnapshotSink,
};
use carto_flow::{Integrator, Observers, SpectralVelocity};
use carto_spectral::{DiffusionSolver, Workspace};

// ── CartogramError ─────────────────────────────────────────────────

/// Errors from [`Cartogram::transform`].
#[derive(Clone, Debug, PartialEq)]
pub enum CartogramError {
    /// The configuration is out of range.
    Config(ConfigError),
    /// The density grid was rejected or could not be transformed.
    Grid(GridError),
    /// The point integration failed.
    Integration(IntegrationError),
}

impl fmt::Display for CartogramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Grid(e) => write!(f, "density: {e}"),
            Self::Integration(e) => write!(f, "integration: {e}"),
        }
    }
}

impl Error for CartogramError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Grid(e) => Some(e),
            Self::Integration(e) => Some(e),
        }
    }
}

impl From<ConfigError> for CartogramError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<GridError> for CartogramError {
    fn from(e: GridError) -> Self {
        Self::Grid(e)
    }
}

impl From<IntegrationError> for CartogramError {
    fn from(e: IntegrationError) -> Self {
        Self::Integration(e)
    }
}

// ── Cartogram ──────────────────────────────────────────────────────

/// Owns the transform workspace for one grid size and runs transforms on it.
///
/// Create one per distinct `(xsize, ysize)` and call
/// [`transform`](Self::transform) as often as needed; the workspace is
/// released when the `Cartogram` is dropped.
#[derive(Debug)]
pub struct Cartogram {
    workspace: Workspace,
}

impl Cartogram {
    /// Allocate the workspace for `dims`.
    pub fn new(dims: GridDims) -> Result<Self, GridError> {
        Ok(Self {
            workspace: Workspace::new(dims)?,
        })
    }

    /// Grid size this cartogram was built for.
    pub fn dims(&self) -> GridDims {
        self.workspace.dims()
    }

    /// Heap bytes held by the workspace.
    pub fn memory_bytes(&self) -> usize {
        self.workspace.memory_bytes()
    }

    /// Move `points` to their positions under the density-equalizing map of
    /// `density`.
    ///
    /// The density is consumed: the solver overwrites it with its spectrum.
    /// Snapshots go to `observers.snapshots` only when
    /// `config.intermediate` is set, and setting it without a sink is a
    /// configuration error. On failure the points hold the positions of the
    /// last accepted integration step.
    pub fn transform(
        &mut self,
        density: DensityGrid,
        points: &mut [Point],
        config: &CartogramConfig,
        observers: &mut Observers<'_>,
    ) -> Result<IntegrationMetrics, CartogramError> {
        config.validate()?;
        if config.intermediate && observers.snapshots.is_none() {
            return Err(ConfigError::InvalidValue {
                name: "intermediate",
                reason: "no snapshot sink was supplied".to_string(),
            }
            .into());
        }
        let integrator =
            Integrator::new(config.integrator.clone())?.with_progress_mode(config.progress);

        let mut solver = DiffusionSolver::new(&mut self.workspace, density)?;
        solver.apply_blur(config.blur)?;
        let horizon = config.horizon * solver.relaxation_time();
        let mut field = SpectralVelocity::new(solver, config.density_floor, horizon)?;

        let snapshots = match observers.snapshots.as_deref_mut() {
            Some(sink) if config.intermediate => Some(sink as &mut dyn SnapshotSink),
            _ => None,
        };
        let mut scoped = Observers {
            progress: &mut *observers.progress,
            snapshots,
            cancel: observers.cancel,
        };
        Ok(integrator.run(&mut field, points, &mut scoped)?)
    }
}
