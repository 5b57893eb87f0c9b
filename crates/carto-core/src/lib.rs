//! Core types for the carto diffusion-cartogram engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! data model shared by the solver and integrator crates: grid dimensions
//! and density buffers, points, field snapshots, configuration, progress
//! events, metrics, and error types.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod grid;
pub mod metrics;
pub mod point;
pub mod progress;
pub mod snapshot;

pub use config::{CartogramConfig, IntegratorConfig, ProgressMode};
pub use error::{ConfigError, GridError, IntegrationError};
pub use grid::{DensityGrid, GridDims};
pub use metrics::IntegrationMetrics;
pub use point::{Point, Velocity};
pub use progress::{NullProgress, ProgressEvent, ProgressSink, SnapshotSink, StepDetail};
pub use snapshot::FieldSnapshot;
