use super::{
    AlignmentMatrix,
    Band,
    Bounds,
};
use std::sync::Arc;

/// Row compressed storage, only the cells inside the band are allocated.
///
/// `offsets[r]` is the position in `values` of the first valid cell of row `r`.
#[derive(Debug, Clone)]
pub struct BandedMatrix<T: Copy> {
    values: Vec<T>,
    offsets: Vec<usize>,
    band: Arc<Band>,
    fill: T,
}

impl<T: Copy> BandedMatrix<T> {
    pub fn new(band: Arc<Band>, fill: T) -> Self {
        let mut offsets = Vec::with_capacity(band.rows());
        let mut total = 0;
        for r in 0..band.rows() {
            offsets.push(total);
            total += band.row_bounds(r).len;
        }
        Self {
            values: vec![fill; total],
            offsets,
            band,
            fill,
        }
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        let bounds = self.band.row_bounds(row);
        if !bounds.contains(col) {
            return None;
        }
        Some(self.offsets[row] + (col - bounds.start))
    }

    /// Number of allocated cells.
    pub fn allocated(&self) -> usize {
        self.values.len()
    }
}

impl<T: Copy> AlignmentMatrix<T> for BandedMatrix<T> {
    fn rows(&self) -> usize {
        self.band.rows()
    }

    fn columns(&self) -> usize {
        self.band.cols()
    }

    fn get(&self, row: usize, col: usize) -> T {
        match self.index(row, col) {
            Some(idx) => self.values[idx],
            None => self.fill,
        }
    }

    fn set(&mut self, row: usize, col: usize, value: T) -> bool {
        match self.index(row, col) {
            Some(idx) => {
                self.values[idx] = value;
                true
            }
            None => false,
        }
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
