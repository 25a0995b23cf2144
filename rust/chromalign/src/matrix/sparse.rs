use super::{
    AlignmentMatrix,
    Band,
    Bounds,
};
use nohash_hasher::BuildNoHashHasher;
use std::collections::HashMap;
use std::hash::BuildHasherDefault;
use std::sync::Arc;

/// Hash backed storage, memory is only used for cells that were written.
#[derive(Debug, Clone)]
pub struct SparseMatrix<T: Copy> {
    values: HashMap<u64, T, BuildNoHashHasher<u64>>,
    band: Arc<Band>,
    fill: T,
}

impl<T: Copy> SparseMatrix<T> {
    pub fn new(band: Arc<Band>, fill: T) -> Self {
        Self {
            values: HashMap::with_hasher(BuildHasherDefault::default()),
            band,
            fill,
        }
    }

    fn key(&self, row: usize, col: usize) -> u64 {
        (row as u64) * (self.band.cols() as u64) + col as u64
    }

    /// Number of cells holding a value.
    pub fn stored(&self) -> usize {
        self.values.len()
    }
}

impl<T: Copy> AlignmentMatrix<T> for SparseMatrix<T> {
    fn rows(&self) -> usize {
        self.band.rows()
    }

    fn columns(&self) -> usize {
        self.band.cols()
    }

    fn get(&self, row: usize, col: usize) -> T {
        if !self.band.contains(row, col) {
            return self.fill;
        }
        self.values
            .get(&self.key(row, col))
            .copied()
            .unwrap_or(self.fill)
    }

    fn set(&mut self, row: usize, col: usize, value: T) -> bool {
        if !self.band.contains(row, col) {
            return false;
        }
        let key = self.key(row, col);
        self.values.insert(key, value);
        true
    }

    fn row_bounds(&self, row: usize) -> Bounds {
        self.band.row_bounds(row)
    }

    fn column_bounds(&self, col: usize) -> Bounds {
        self.band.column_bounds(col)
    }

    fn fill_value(&self) -> T {
        self.fill
    }
}
