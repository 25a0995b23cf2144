use crate::errors::{
    AlignmentError,
    Result,
};
use serde::{
    Deserialize,
    Serialize,
};

/// A half open `[start, start + len)` range of valid indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub start: usize,
    pub len: usize,
}

impl Bounds {
    pub fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    pub fn empty() -> Self {
        Self { start: 0, len: 0 }
    }

    /// One past the last index, saturating at `usize::MAX`.
    pub fn end(&self) -> usize {
        self.start.saturating_add(self.len)
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, idx: usize) -> bool {
        idx >= self.start && idx < self.end()
    }
}

/// The cells of a `rows x cols` grid that take part in the alignment.
///
/// Each row has one contiguous column range, possibly empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    cols: usize,
    row_bounds: Vec<Bounds>,
}

impl Band {
    /// Every cell is valid.
    pub fn full(rows: usize, cols: usize) -> Self {
        Self {
            cols,
            row_bounds: vec![Bounds::new(0, cols); rows],
        }
    }

    /// A corridor of `width` extra cells on each side of the (stretched) diagonal.
    ///
    /// For non square grids row `r` covers the columns the diagonal crosses
    /// while passing through that row, so consecutive rows always overlap or
    /// touch and a monotone path from `(0, 0)` to `(rows - 1, cols - 1)` exists
    /// even with `width == 0`.
    pub fn sakoe_chiba(rows: usize, cols: usize, width: usize) -> Self {
        if rows == 0 || cols == 0 {
            return Self {
                cols,
                row_bounds: vec![Bounds::empty(); rows],
            };
        }
        let row_bounds = (0..rows)
            .map(|r| {
                let lo = (r * cols) / rows;
                let hi = ((r + 1) * cols).div_ceil(rows) - 1;
                let lo = lo.saturating_sub(width);
                let hi = hi.saturating_add(width).min(cols - 1);
                Bounds::new(lo, hi - lo + 1)
            })
            .collect();
        Self { cols, row_bounds }
    }

    /// A band from explicit per row ranges. Rows may be empty.
    pub fn from_row_bounds(cols: usize, row_bounds: Vec<Bounds>) -> Result<Self> {
        for (row, b) in row_bounds.iter().enumerate() {
            let fits = b.start.checked_add(b.len).is_some_and(|end| end <= cols);
            if !b.is_empty() && !fits {
                return Err(AlignmentError::InvalidBand {
                    row,
                    start: b.start,
                    len: b.len,
                    cols,
                }
                .into());
            }
        }
        Ok(Self { cols, row_bounds })
    }

    pub fn rows(&self) -> usize {
        self.row_bounds.len()
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn row_bounds(&self, row: usize) -> Bounds {
        self.row_bounds.get(row).copied().unwrap_or_else(Bounds::empty)
    }

    /// Rows of a column, from the first to the last row containing it.
    ///
    /// For bands whose row ranges are not monotone the result may include
    /// rows that do not contain the column.
    pub fn column_bounds(&self, col: usize) -> Bounds {
        let mut first = None;
        let mut last = 0;
        for (r, b) in self.row_bounds.iter().enumerate() {
            if b.contains(col) {
                if first.is_none() {
                    first = Some(r);
                }
                last = r;
            }
        }
        match first {
            Some(first) => Bounds::new(first, last - first + 1),
            None => Bounds::empty(),
        }
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.row_bounds(row).contains(col)
    }

    /// Number of valid cells.
    pub fn cell_count(&self) -> usize {
        self.row_bounds.iter().map(|b| b.len).sum()
    }
}

/// Serializable description of the band to use for an alignment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConstraintRegion {
    #[default]
    Full,
    SakoeChiba {
        width: usize,
    },
    /// One `(start, len)` per row.
    Explicit {
        rows: Vec<(usize, usize)>,
    },
}

impl ConstraintRegion {
    pub fn to_band(&self, rows: usize, cols: usize) -> Result<Band> {
        match self {
            ConstraintRegion::Full => Ok(Band::full(rows, cols)),
            ConstraintRegion::SakoeChiba { width } => Ok(Band::sakoe_chiba(rows, cols, *width)),
            ConstraintRegion::Explicit { rows: bounds } => {
                if bounds.len() != rows {
                    return Err(AlignmentError::DimensionMismatch {
                        context: "explicit band rows",
                        expected: rows,
                        other: bounds.len(),
                    }
                    .into());
                }
                Band::from_row_bounds(
                    cols,
                    bounds.iter().map(|(s, l)| Bounds::new(*s, *l)).collect(),
                )
            }
        }
    }
}
