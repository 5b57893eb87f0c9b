//! Error types for the carto cartogram engine.
//!
//! Organized by subsystem: grid and spectral storage ([`GridError`]),
//! configuration validation ([`ConfigError`]), and the point integrator
//! ([`IntegrationError`]). The facade crate wraps all three.

use std::error::Error;
use std::fmt;

use crate::grid::GridDims;

/// Errors from grid allocation, workspace sizing, and the diffusion solver.
#[derive(Clone, Debug, PartialEq)]
pub enum GridError {
    /// A grid dimension is zero.
    EmptyGrid,
    /// `xsize * ysize` does not fit in the address space.
    DimensionTooLarge {
        /// The requested horizontal size.
        xsize: u32,
        /// The requested vertical size.
        ysize: u32,
    },
    /// The allocator could not provide a buffer of the requested size.
    AllocationFailed {
        /// Number of `f64` cells requested.
        cells: usize,
    },
    /// A value buffer does not match the cell count of its dimensions.
    LengthMismatch {
        /// Expected number of cells.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
    },
    /// A workspace or snapshot was used with a grid of different size.
    DimensionMismatch {
        /// The dimensions the resource was created for.
        expected: GridDims,
        /// The dimensions it was used with.
        actual: GridDims,
    },
    /// A density cell is negative, NaN, or infinite.
    InvalidDensity {
        /// Horizontal cell index.
        ix: u32,
        /// Vertical cell index.
        iy: u32,
        /// The offending value.
        value: f64,
    },
    /// The blur amount is negative or not finite.
    InvalidBlur {
        /// The rejected blur amount.
        blur: f64,
    },
    /// The diffusion time reached at fictitious time 1 is not positive
    /// and finite.
    InvalidHorizon {
        /// The rejected horizon.
        horizon: f64,
    },
    /// A fictitious time is negative or not finite.
    InvalidTime {
        /// The rejected time.
        time: f64,
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid => write!(f, "grid must have at least one cell"),
            Self::DimensionTooLarge { xsize, ysize } => {
                write!(f, "grid {xsize}x{ysize} is too large to address")
            }
            Self::AllocationFailed { cells } => {
                write!(f, "failed to allocate {cells} cells")
            }
            Self::LengthMismatch { expected, actual } => {
                write!(f, "expected {expected} values, got {actual}")
            }
            Self::DimensionMismatch { expected, actual } => {
                write!(f, "resource sized for {expected} used with {actual}")
            }
            Self::InvalidDensity { ix, iy, value } => {
                write!(f, "invalid density {value} at cell ({ix}, {iy})")
            }
            Self::InvalidBlur { blur } => {
                write!(f, "blur must be finite and >= 0, got {blur}")
            }
            Self::InvalidHorizon { horizon } => {
                write!(f, "horizon must be finite and > 0, got {horizon}")
            }
            Self::InvalidTime { time } => {
                write!(f, "time must be finite and >= 0, got {time}")
            }
        }
    }
}

impl Error for GridError {}

/// Errors detected while validating a configuration.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// A parameter is outside its permitted range.
    InvalidValue {
        /// Name of the parameter.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue { name, reason } => write!(f, "invalid {name}: {reason}"),
        }
    }
}

impl Error for ConfigError {}

/// Errors from the adaptive point integrator.
#[derive(Clone, Debug, PartialEq)]
pub enum IntegrationError {
    /// The velocity source failed to evaluate the field.
    Field(GridError),
    /// The step-size controller fell below the configured minimum before
    /// reaching time 1.
    StepSizeCollapsed {
        /// Fictitious time reached when the controller gave up.
        time: f64,
        /// The step size that was proposed.
        step: f64,
        /// The configured minimum step.
        min_step: f64,
    },
    /// A point coordinate is NaN or infinite.
    InvalidPoint {
        /// Index of the point in the input slice.
        index: usize,
    },
    /// The intermediate snapshot sink failed.
    SnapshotWrite {
        /// Accepted-step number of the snapshot.
        step: u64,
        /// Description of the failure.
        reason: String,
    },
    /// The caller raised the cancellation flag.
    Cancelled {
        /// Fictitious time of the last completed step.
        time: f64,
    },
}

impl fmt::Display for IntegrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(e) => write!(f, "field evaluation: {e}"),
            Self::StepSizeCollapsed {
                time,
                step,
                min_step,
            } => write!(
                f,
                "step size {step:e} fell below minimum {min_step:e} at t = {time}"
            ),
            Self::InvalidPoint { index } => {
                write!(f, "point {index} has a non-finite coordinate")
            }
            Self::SnapshotWrite { step, reason } => {
                write!(f, "failed to persist snapshot for step {step}: {reason}")
            }
            Self::Cancelled { time } => write!(f, "integration cancelled at t = {time}"),
        }
    }
}

impl Error for IntegrationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Field(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GridError> for IntegrationError {
    fn from(e: GridError) -> Self {
        Self::Field(e)
    }
}
