//! Grid dimensions and the density buffer.
//!
//! [`DensityGrid`] stores `xsize * ysize` values row-major with `x` varying
//! fastest, so each row is a contiguous slice the spectral solver can
//! transform in place. Column transforms gather through workspace scratch.

use std::fmt;

use crate::error::GridError;

/// Dimensions of a rectangular cell grid.
///
/// Cell `(ix, iy)` covers `[ix, ix + 1) x [iy, iy + 1)` in grid space; its
/// center is at `(ix + 0.5, iy + 0.5)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridDims {
    xsize: u32,
    ysize: u32,
}

impl GridDims {
    /// Create dimensions for an `xsize * ysize` grid.
    ///
    /// Returns `Err(GridError::EmptyGrid)` if either size is zero and
    /// `Err(GridError::DimensionTooLarge)` if the cell count overflows.
    ///
    /// # Examples
    ///
    /// ```
    /// use carto_core::GridDims;
    ///
    /// let dims = GridDims::new(4, 3).unwrap();
    /// assert_eq!(dims.cell_count(), 12);
    /// assert_eq!(dims.index(1, 2), 9);
    /// assert!(GridDims::new(0, 3).is_err());
    /// ```
    pub fn new(xsize: u32, ysize: u32) -> Result<Self, GridError> {
        if xsize == 0 || ysize == 0 {
            return Err(GridError::EmptyGrid);
        }
        if (xsize as usize).checked_mul(ysize as usize).is_none() {
            return Err(GridError::DimensionTooLarge { xsize, ysize });
        }
        Ok(Self { xsize, ysize })
    }

    /// Number of cells along `x`.
    pub fn xsize(&self) -> u32 {
        self.xsize
    }

    /// Number of cells along `y`.
    pub fn ysize(&self) -> u32 {
        self.ysize
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.xsize as usize * self.ysize as usize
    }

    /// Flat index of cell `(ix, iy)`.
    pub fn index(&self, ix: u32, iy: u32) -> usize {
        iy as usize * self.xsize as usize + ix as usize
    }

    /// Whether `(x, y)` lies in the closed domain `[0, xsize] x [0, ysize]`.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        (0.0..=self.xsize as f64).contains(&x) && (0.0..=self.ysize as f64).contains(&y)
    }
}

impl fmt::Display for GridDims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.xsize, self.ysize)
    }
}

/// Allocate a zeroed `f64` buffer, reporting allocator failure instead of
/// aborting.
pub fn try_zeroed(cells: usize) -> Result<Vec<f64>, GridError> {
    let mut data = Vec::new();
    data.try_reserve_exact(cells)
        .map_err(|_| GridError::AllocationFailed { cells })?;
    data.resize(cells, 0.0);
    Ok(data)
}

/// A 2D array of density values over a [`GridDims`] grid.
#[derive(Clone, Debug, PartialEq)]
pub struct DensityGrid {
    dims: GridDims,
    data: Vec<f64>,
}

impl DensityGrid {
    /// Allocate a zero-filled grid.
    pub fn zeroed(dims: GridDims) -> Result<Self, GridError> {
        Ok(Self {
            dims,
            data: try_zeroed(dims.cell_count())?,
        })
    }

    /// Wrap an existing row-major buffer (`x` fastest).
    pub fn from_vec(dims: GridDims, data: Vec<f64>) -> Result<Self, GridError> {
        if data.len() != dims.cell_count() {
            return Err(GridError::LengthMismatch {
                expected: dims.cell_count(),
                actual: data.len(),
            });
        }
        Ok(Self { dims, data })
    }

    /// Build a grid by evaluating `f(ix, iy)` for every cell.
    pub fn from_fn(dims: GridDims, mut f: impl FnMut(u32, u32) -> f64) -> Result<Self, GridError> {
        let mut grid = Self::zeroed(dims)?;
        for iy in 0..dims.ysize() {
            for ix in 0..dims.xsize() {
                grid.data[dims.index(ix, iy)] = f(ix, iy);
            }
        }
        Ok(grid)
    }

    /// The grid dimensions.
    pub fn dims(&self) -> GridDims {
        self.dims
    }

    /// Value of cell `(ix, iy)`.
    ///
    /// # Panics
    ///
    /// Panics if the cell is out of range.
    pub fn get(&self, ix: u32, iy: u32) -> f64 {
        self.data[self.dims.index(ix, iy)]
    }

    /// Set the value of cell `(ix, iy)`.
    ///
    /// # Panics
    ///
    /// Panics if the cell is out of range.
    pub fn set(&mut self, ix: u32, iy: u32, value: f64) {
        let i = self.dims.index(ix, iy);
        self.data[i] = value;
    }

    /// Row `iy` as a contiguous slice of `xsize` values.
    pub fn row(&self, iy: u32) -> &[f64] {
        let w = self.dims.xsize() as usize;
        let start = iy as usize * w;
        &self.data[start..start + w]
    }

    /// All values, row-major.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// All values, row-major, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Consume the grid and return its buffer.
    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    /// Arithmetic mean over all cells.
    pub fn mean(&self) -> f64 {
        self.data.iter().sum::<f64>() / self.data.len() as f64
    }

    /// Population variance over all cells.
    pub fn variance(&self) -> f64 {
        let mean = self.mean();
        self.data.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / self.data.len() as f64
    }

    /// Add `fraction * mean` to every cell.
    ///
    /// Keeps densities strictly positive so that transform round-off cannot
    /// drive a cell negative.
    pub fn bias_by_mean(&mut self, fraction: f64) {
        let offset = fraction * self.mean();
        for v in &mut self.data {
            *v += offset;
        }
    }

    /// Check that every cell is finite and non-negative.
    pub fn validate_non_negative(&self) -> Result<(), GridError> {
        let w = self.dims.xsize() as usize;
        match self
            .data
            .iter()
            .position(|v| !v.is_finite() || *v < 0.0)
        {
            Some(i) => Err(GridError::InvalidDensity {
                ix: (i % w) as u32,
                iy: (i / w) as u32,
                value: self.data[i],
            }),
            None => Ok(()),
        }
    }

    /// Memory usage of the value buffer in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.data.len() * std::mem::size_of::<f64>()
    }
}
