use super::{
    AlignmentMatrix,
    Band,
    Bounds,
};
use std::sync::Arc;

/// Row major `rows x cols` storage.
///
/// Memory is allocated for every cell but the band is still honored,
/// cells outside of it read as the fill value and cannot be written.
#[derive(Debug, Clone)]
pub struct DenseMatrix<T: Copy> {
    values: Vec<T>,
    band: Arc<Band>,
    fill: T,
}

impl<T: Copy> DenseMatrix<T> {
    pub fn new(band: Arc<Band>, fill: T) -> Self {
        let values = vec![fill; band.rows() * band.cols()];
        Self { values, band, fill }
    }

    /// Full band matrix from nested rows, all rows must have the same length.
    pub fn from_rows<S: AsRef<[T]>>(rows: &[S], fill: T) -> Option<Self> {
        let nrows = rows.len();
        let ncols = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        if rows.iter().any(|r| r.as_ref().len() != ncols) {
            return None;
        }
        let values = rows
            .iter()
            .flat_map(|r| r.as_ref().iter().copied())
            .collect();
        Some(Self {
            values,
            band: Arc::new(Band::full(nrows, ncols)),
            fill,
        })
    }

    pub fn get_row(&self, row: usize) -> Option<&[T]> {
        let cols = self.band.cols();
        let start = row * cols;
        self.values.get(start..start + cols)
    }
}

impl<T: Copy> AlignmentMatrix<T> for DenseMatrix<T> {
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
        self.values[row * self.band.cols() + col]
    }

    fn set(&mut self, row: usize, col: usize, value: T) -> bool {
        if !self.band.contains(row, col) {
            return false;
        }
        let idx = row * self.band.cols() + col;
        self.values[idx] = value;
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows() {
        let m = DenseMatrix::from_rows(&[vec![1, 2, 3], vec![4, 5, 6]], 0).unwrap();
        assert_eq!(m.rows(), 2);
        assert_eq!(m.columns(), 3);
        assert_eq!(m.get(1, 2), 6);
        assert_eq!(m.get_row(0), Some(&[1, 2, 3][..]));
        assert_eq!(m.get_row(2), None);
        assert!(DenseMatrix::from_rows(&[vec![1, 2], vec![3]], 0).is_none());
    }
}
