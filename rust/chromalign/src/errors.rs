use std::fmt::Display;

/// Failures of the pairwise (DTW) alignment.
#[derive(Debug, Clone, PartialEq)]
pub enum AlignmentError {
    /// One of the two sequences has no elements.
    EmptySequence { rows: usize, cols: usize },
    /// Traceback found a predecessor code that is not diagonal, vertical or horizontal.
    /// This means the matrix fill is broken.
    UnrecognizedPredecessor { row: usize, col: usize, code: u8 },
    /// The terminal cell (or a cell in the traceback) is outside the band or was never reached.
    NoPathWithinBand { row: usize, col: usize },
    /// A user supplied band row does not fit the matrix.
    InvalidBand {
        row: usize,
        start: usize,
        len: usize,
        cols: usize,
    },
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        other: usize,
    },
    /// The host asked to stop the fill at a row boundary.
    Aborted { row: usize },
}

impl Display for AlignmentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptySequence { rows, cols } => write!(
                f,
                "Cannot align degenerate sequences ({} x {}), both need at least one element",
                rows, cols
            ),
            Self::UnrecognizedPredecessor { row, col, code } => write!(
                f,
                "Unrecognized predecessor code {} at ({}, {}) during traceback",
                code, row, col
            ),
            Self::NoPathWithinBand { row, col } => {
                write!(f, "No alignment path reaches ({}, {}) within the band", row, col)
            }
            Self::InvalidBand {
                row,
                start,
                len,
                cols,
            } => write!(
                f,
                "Band row {} [{}, {}) exceeds the {} available columns",
                row,
                start,
                start + len,
                cols
            ),
            Self::DimensionMismatch {
                context,
                expected,
                other,
            } => write!(
                f,
                "Expected length {} but got {} ({})",
                expected, other, context
            ),
            Self::Aborted { row } => write!(f, "Alignment aborted at row {}", row),
        }
    }
}

/// Failures of the multi-chromatogram matcher.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchingError {
    TooFewChromatograms { found: usize },
    EmptyPeakList { chromatogram: usize },
}

impl Display for MatchingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooFewChromatograms { found } => write!(
                f,
                "Matching needs at least two chromatograms, got {}",
                found
            ),
            Self::EmptyPeakList { chromatogram } => {
                write!(f, "Peak list of chromatogram {} is empty", chromatogram)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChromAlignError {
    Alignment(AlignmentError),
    Matching(MatchingError),
}

impl Display for ChromAlignError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Alignment(e) => write!(f, "Alignment error: {}", e),
            Self::Matching(e) => write!(f, "Matching error: {}", e),
        }
    }
}

impl std::error::Error for ChromAlignError {}

impl From<AlignmentError> for ChromAlignError {
    fn from(x: AlignmentError) -> Self {
        Self::Alignment(x)
    }
}

impl From<MatchingError> for ChromAlignError {
    fn from(x: MatchingError) -> Self {
        Self::Matching(x)
    }
}

pub type Result<T> = std::result::Result<T, ChromAlignError>;
