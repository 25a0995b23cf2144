//! Storage for dynamic programming grids over two sequences.
//!
//! Every storage implements [`AlignmentMatrix`], a row/column grid where only the
//! cells inside a [`Band`] exist. Reading a cell outside the band returns the
//! fill value of the matrix (the "missing" sentinel) and writing one is a no-op.

mod band;
mod banded;
mod dense;
mod sparse;

pub use band::{
    Band,
    Bounds,
    ConstraintRegion,
};
pub use banded::BandedMatrix;
pub use dense::DenseMatrix;
pub use sparse::SparseMatrix;

use serde::{
    Deserialize,
    Serialize,
};
use std::sync::Arc;

pub trait AlignmentMatrix<T: Copy> {
    fn rows(&self) -> usize;
    fn columns(&self) -> usize;

    /// Value at `(row, col)`, the fill value when the cell is outside the band.
    fn get(&self, row: usize, col: usize) -> T;

    /// Stores a value, returns false (and stores nothing) when the cell is
    /// outside the band.
    fn set(&mut self, row: usize, col: usize, value: T) -> bool;

    /// Valid `[start, start + len)` columns of a row. Rows past the end are empty.
    fn row_bounds(&self, row: usize) -> Bounds;

    /// Valid `[start, start + len)` rows of a column.
    fn column_bounds(&self, col: usize) -> Bounds;

    fn fill_value(&self) -> T;

    fn in_band(&self, row: usize, col: usize) -> bool {
        self.row_bounds(row).contains(col)
    }
}

/// Which backing storage to use for a matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    /// Dense when the band covers at least half the matrix, banded otherwise.
    #[default]
    Auto,
    Dense,
    Banded,
    Sparse,
}

impl StorageKind {
    /// Resolves [`StorageKind::Auto`] for a concrete band.
    pub fn resolve(self, band: &Band) -> StorageKind {
        match self {
            StorageKind::Auto => {
                let total = band.rows() * band.cols();
                if band.cell_count() * 2 >= total {
                    StorageKind::Dense
                } else {
                    StorageKind::Banded
                }
            }
            x => x,
        }
    }
}

/// A matrix whose storage is picked at runtime.
#[derive(Debug, Clone)]
pub enum AnyMatrix<T: Copy> {
    Dense(DenseMatrix<T>),
    Banded(BandedMatrix<T>),
    Sparse(SparseMatrix<T>),
}

impl<T: Copy> AnyMatrix<T> {
    pub fn new(kind: StorageKind, band: Arc<Band>, fill: T) -> Self {
        match kind.resolve(&band) {
            StorageKind::Dense | StorageKind::Auto => AnyMatrix::Dense(DenseMatrix::new(band, fill)),
            StorageKind::Banded => AnyMatrix::Banded(BandedMatrix::new(band, fill)),
            StorageKind::Sparse => AnyMatrix::Sparse(SparseMatrix::new(band, fill)),
        }
    }

    pub fn kind(&self) -> StorageKind {
        match self {
            AnyMatrix::Dense(_) => StorageKind::Dense,
            AnyMatrix::Banded(_) => StorageKind::Banded,
            AnyMatrix::Sparse(_) => StorageKind::Sparse,
        }
    }
}

macro_rules! dispatch {
    ($self:ident, $m:ident => $e:expr) => {
        match $self {
            AnyMatrix::Dense($m) => $e,
            AnyMatrix::Banded($m) => $e,
            AnyMatrix::Sparse($m) => $e,
        }
    };
}

impl<T: Copy> AlignmentMatrix<T> for AnyMatrix<T> {
    fn rows(&self) -> usize {
        dispatch!(self, m => m.rows())
    }

    fn columns(&self) -> usize {
        dispatch!(self, m => m.columns())
    }

    fn get(&self, row: usize, col: usize) -> T {
        dispatch!(self, m => m.get(row, col))
    }

    fn set(&mut self, row: usize, col: usize, value: T) -> bool {
        dispatch!(self, m => m.set(row, col, value))
    }

    fn row_bounds(&self, row: usize) -> Bounds {
        dispatch!(self, m => m.row_bounds(row))
    }

    fn column_bounds(&self, col: usize) -> Bounds {
        dispatch!(self, m => m.column_bounds(col))
    }

    fn fill_value(&self) -> T {
        dispatch!(self, m => m.fill_value())
    }
}
