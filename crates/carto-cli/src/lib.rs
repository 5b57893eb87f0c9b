//! Command-line driver for the carto engine.
//!
//! Reads a density grid from a text file, transforms the lattice of cell
//! corners, and writes the displaced points. The binary is a thin wrapper
//! over [`execute`]; the pieces are public for reuse and testing.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod app;
pub mod args;
pub mod io;
pub mod progress;

pub use app::{execute, CliError};
pub use args::{parse, Args, ArgsError, USAGE};
pub use io::{FileSnapshots, ReadError};
pub use progress::TerminalProgress;
