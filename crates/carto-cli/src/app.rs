//! The driver pipeline: open files, read, transform, write.

use std::error::Error;
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::PathBuf;

use carto::flow::Observers;
use carto::types::{GridDims, IntegrationMetrics, ProgressSink};
use carto::{Cartogram, CartogramError};

use crate::args::{Args, ArgsError};
use crate::io::{create_grid_points, read_density, write_points, FileSnapshots, ReadError};

/// A driver failure, each kind mapped to its own exit status.
#[derive(Debug)]
pub enum CliError {
    /// The command line was rejected.
    Usage(ArgsError),
    /// The density file could not be opened.
    OpenInput {
        /// The path given.
        path: PathBuf,
        /// The underlying failure.
        source: io::Error,
    },
    /// The output file could not be created.
    OpenOutput {
        /// The path given.
        path: PathBuf,
        /// The underlying failure.
        source: io::Error,
    },
    /// The density file has too few or invalid values.
    BadData(ReadError),
    /// The transform failed.
    Cartogram(CartogramError),
    /// Writing the transformed points failed.
    WriteOutput(io::Error),
}

impl CliError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Usage(_) => 1,
            Self::OpenInput { .. } => 4,
            Self::OpenOutput { .. } | Self::WriteOutput(_) => 5,
            Self::BadData(_) => 6,
            Self::Cartogram(_) => 7,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Usage(e) => write!(f, "{e}"),
            Self::OpenInput { path, source } => {
                write!(f, "unable to open file '{}': {source}", path.display())
            }
            Self::OpenOutput { path, source } => {
                write!(f, "unable to open file '{}': {source}", path.display())
            }
            Self::BadData(e) => {
                write!(f, "density file contains too few or incorrect data: {e}")
            }
            Self::Cartogram(e) => write!(f, "cartogram failed: {e}"),
            Self::WriteOutput(e) => write!(f, "failed to write points: {e}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Usage(e) => Some(e),
            Self::OpenInput { source, .. } | Self::OpenOutput { source, .. } => Some(source),
            Self::BadData(e) => Some(e),
            Self::Cartogram(e) => Some(e),
            Self::WriteOutput(e) => Some(e),
        }
    }
}

impl From<CartogramError> for CliError {
    fn from(e: CartogramError) -> Self {
        Self::Cartogram(e)
    }
}

/// Run one transform as described by `args`, reporting to `progress`.
///
/// The grid points of every cell corner are transformed and written to
/// `args.output`. With `args.intermediate`, the density after every
/// accepted step goes to `<output>.stepNNNN`.
pub fn execute(
    args: &Args,
    progress: &mut dyn ProgressSink,
) -> Result<IntegrationMetrics, CliError> {
    let input = File::open(&args.input).map_err(|source| CliError::OpenInput {
        path: args.input.clone(),
        source,
    })?;
    let output = File::create(&args.output).map_err(|source| CliError::OpenOutput {
        path: args.output.clone(),
        source,
    })?;

    let dims = GridDims::new(args.xsize, args.ysize).map_err(CartogramError::from)?;
    let mut cartogram = Cartogram::new(dims).map_err(CartogramError::from)?;
    let density = read_density(BufReader::new(input), dims).map_err(CliError::BadData)?;

    let mut points = create_grid_points(dims);
    let mut snapshots = FileSnapshots::new(&args.output);
    let mut observers = Observers::new(progress);
    if args.intermediate {
        observers = observers.with_snapshots(&mut snapshots);
    }
    let metrics = cartogram.transform(density, &mut points, &args.config(), &mut observers)?;

    write_points(BufWriter::new(output), &points).map_err(CliError::WriteOutput)?;
    Ok(metrics)
}
