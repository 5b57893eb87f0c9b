//! Density input, grid-point output, and intermediate snapshot files.
//!
//! Density files hold whitespace-separated numbers: `ysize` rows of `xsize`
//! values, `y` outer and `x` inner. Point files hold one `x y` pair per
//! line. All readers and writers are generic over `Read`/`Write` so tests
//! can use in-memory buffers.

use std::error::Error;
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use carto::types::{DensityGrid, FieldSnapshot, GridDims, GridError, Point, SnapshotSink};

/// Fraction of the mean density added to every cell after reading.
///
/// Keeps the density strictly positive so the velocity stays finite in
/// empty regions.
pub const OFFSET: f64 = 0.005;

/// Errors reading a density file.
#[derive(Debug)]
pub enum ReadError {
    /// The stream could not be read.
    Io(io::Error),
    /// The file ended before every cell had a value.
    TooFewValues {
        /// Cells in the grid.
        expected: usize,
        /// Values found.
        found: usize,
    },
    /// A token is not a number.
    Malformed {
        /// Zero-based position of the token among all values.
        index: usize,
        /// The token text.
        token: String,
    },
    /// The values do not form a valid density grid.
    Grid(GridError),
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::TooFewValues { expected, found } => {
                write!(f, "expected {expected} density values, found {found}")
            }
            Self::Malformed { index, token } => {
                write!(f, "value {index} is not a number: '{token}'")
            }
            Self::Grid(e) => write!(f, "{e}"),
        }
    }
}

impl Error for ReadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Grid(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ReadError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<GridError> for ReadError {
    fn from(e: GridError) -> Self {
        Self::Grid(e)
    }
}

/// Read `dims.cell_count()` values and bias them by [`OFFSET`] times the
/// mean. Values after the last cell are ignored.
pub fn read_density<R: Read>(mut reader: R, dims: GridDims) -> Result<DensityGrid, ReadError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;

    let expected = dims.cell_count();
    let mut values = Vec::with_capacity(expected);
    for (index, token) in text.split_whitespace().take(expected).enumerate() {
        let value = token.parse::<f64>().map_err(|_| ReadError::Malformed {
            index,
            token: token.to_string(),
        })?;
        values.push(value);
    }
    if values.len() < expected {
        return Err(ReadError::TooFewValues {
            expected,
            found: values.len(),
        });
    }

    let mut density = DensityGrid::from_vec(dims, values)?;
    density.bias_by_mean(OFFSET);
    density.validate_non_negative()?;
    Ok(density)
}

/// Every integer lattice corner of the grid, `y` outer and `x` inner.
pub fn create_grid_points(dims: GridDims) -> Vec<Point> {
    (0..=dims.ysize())
        .flat_map(|iy| (0..=dims.xsize()).map(move |ix| Point::new(ix as f64, iy as f64)))
        .collect()
}

/// Write one `x y` line per point.
pub fn write_points<W: Write>(mut writer: W, points: &[Point]) -> io::Result<()> {
    for p in points {
        writeln!(writer, "{} {}", p.x, p.y)?;
    }
    writer.flush()
}

/// Write `values` as `ysize` rows of `xsize` numbers.
pub fn write_density<W: Write>(mut writer: W, dims: GridDims, values: &[f64]) -> io::Result<()> {
    for row in values.chunks(dims.xsize() as usize) {
        let mut first = true;
        for v in row {
            if !first {
                writer.write_all(b" ")?;
            }
            write!(writer, "{v}")?;
            first = false;
        }
        writer.write_all(b"\n")?;
    }
    writer.flush()
}

/// Writes each snapshot's density to `<base>.step<NNNN>`.
#[derive(Clone, Debug)]
pub struct FileSnapshots {
    base: PathBuf,
}

impl FileSnapshots {
    /// Name snapshot files after `base`, usually the output file.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Path of the snapshot taken after accepted step `step`.
    pub fn path_for(&self, step: u64) -> PathBuf {
        let mut name = self.base.clone().into_os_string();
        name.push(format!(".step{step:04}"));
        PathBuf::from(name)
    }

    fn write(&self, path: &Path, snapshot: &FieldSnapshot) -> io::Result<()> {
        let file = BufWriter::new(File::create(path)?);
        write_density(file, snapshot.dims(), snapshot.density())
    }
}

impl SnapshotSink for FileSnapshots {
    fn persist(&mut self, step: u64, snapshot: &FieldSnapshot) -> Result<(), String> {
        let path = self.path_for(step);
        self.write(&path, snapshot)
            .map_err(|e| format!("{}: {e}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(x: u32, y: u32) -> GridDims {
        GridDims::new(x, y).unwrap()
    }

    // ── read_density ────────────────────────────────────────────

    #[test]
    fn reads_rows_y_outer_and_biases_by_mean() {
        let text = "1 2 3\n4 5 6\n";
        let grid = read_density(text.as_bytes(), dims(3, 2)).unwrap();
        let bias = OFFSET * 3.5;
        assert_eq!(grid.get(0, 0), 1.0 + bias);
        assert_eq!(grid.get(2, 0), 3.0 + bias);
        assert_eq!(grid.get(0, 1), 4.0 + bias);
        assert_eq!(grid.get(2, 1), 6.0 + bias);
    }

    #[test]
    fn layout_of_whitespace_is_irrelevant() {
        let a = read_density("1 2\n3 4".as_bytes(), dims(2, 2)).unwrap();
        let b = read_density("  1\t2 3\n\n 4 \n".as_bytes(), dims(2, 2)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn extra_values_are_ignored() {
        let grid = read_density("1 1 1 1 junk".as_bytes(), dims(2, 2)).unwrap();
        assert_eq!(grid.dims(), dims(2, 2));
    }

    #[test]
    fn too_few_values() {
        let err = read_density("1 2 3".as_bytes(), dims(2, 2)).unwrap_err();
        assert!(matches!(
            err,
            ReadError::TooFewValues {
                expected: 4,
                found: 3
            }
        ));
    }

    #[test]
    fn malformed_value() {
        let err = read_density("1 two 3 4".as_bytes(), dims(2, 2)).unwrap_err();
        match err {
            ReadError::Malformed { index, token } => {
                assert_eq!(index, 1);
                assert_eq!(token, "two");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn negative_value_is_bad_data() {
        let err = read_density("1 -5 1 1".as_bytes(), dims(2, 2)).unwrap_err();
        assert!(matches!(
            err,
            ReadError::Grid(GridError::InvalidDensity { ix: 1, iy: 0, .. })
        ));
    }

    // ── points ──────────────────────────────────────────────────

    #[test]
    fn grid_points_cover_every_corner() {
        let points = create_grid_points(dims(2, 1));
        assert_eq!(
            points,
            vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(2.0, 0.0),
                Point::new(0.0, 1.0),
                Point::new(1.0, 1.0),
                Point::new(2.0, 1.0),
            ]
        );
    }

    #[test]
    fn points_are_written_one_per_line() {
        let mut out = Vec::new();
        write_points(&mut out, &[Point::new(0.0, 1.5), Point::new(2.25, 3.0)]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "0 1.5\n2.25 3\n");
    }

    // ── snapshots ───────────────────────────────────────────────

    #[test]
    fn density_is_written_row_by_row() {
        let d = dims(3, 2);
        let values = [0.5, 1.0, 1.5, 2.0, 2.5, 3.0];
        let mut out = Vec::new();
        write_density(&mut out, d, &values).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "0.5 1 1.5\n2 2.5 3\n");
    }

    #[test]
    fn snapshot_paths_are_numbered() {
        let sink = FileSnapshots::new("/tmp/out.dat");
        assert_eq!(sink.path_for(7), PathBuf::from("/tmp/out.dat.step0007"));
        assert_eq!(sink.path_for(12345), PathBuf::from("/tmp/out.dat.step12345"));
    }

    #[test]
    fn unwritable_snapshot_reports_path() {
        let mut sink = FileSnapshots::new("/nonexistent-carto-dir/out.dat");
        let snapshot = FieldSnapshot::new(dims(1, 1)).unwrap();
        let err = sink.persist(1, &snapshot).unwrap_err();
        assert!(err.contains("out.dat.step0001"));
    }
}
