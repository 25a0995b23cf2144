//! Pairwise retention time alignment by dynamic time warping.
//!
//! The grid has one row per element of sequence A and one column per element
//! of sequence B. Each cell accumulates the local score of the pair plus the
//! best of three predecessors:
//!
//! * diagonal `(i - 1, j - 1)`: a match
//! * vertical `(i - 1, j)`: an expansion
//! * horizontal `(i, j - 1)`: a compression
//!
//! Ties are broken by rank (diagonal, vertical, horizontal), see [`TieStatistics`]
//! for the ambiguous cells that get counted along the way.

mod batch;
mod table;
mod tiebreak;

pub use batch::{
    PairAlignment,
    align_pairs,
    align_pairs_with,
};
pub use table::DpTable;
pub use tiebreak::{
    Objective,
    TieStatistics,
};

use crate::config::AlignmentConfig;
use crate::errors::{
    AlignmentError,
    Result,
};
use serde::{
    Deserialize,
    Serialize,
};
use tracing::debug;

/// One step of a warp path, ie. how a pair was reached from the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Both indices advance (and the first pair of every path).
    Match,
    /// Only the index in sequence A advances.
    Expansion,
    /// Only the index in sequence B advances.
    Compression,
}

impl Step {
    pub fn as_char(&self) -> char {
        match self {
            Step::Match => 'M',
            Step::Expansion => 'E',
            Step::Compression => 'C',
        }
    }

    pub fn from_char(c: char) -> Option<Step> {
        match c {
            'M' => Some(Step::Match),
            'E' => Some(Step::Expansion),
            'C' => Some(Step::Compression),
            _ => None,
        }
    }

    /// The step leading from `prev` to `next`, `None` if they are not neighbors.
    pub fn between(prev: (usize, usize), next: (usize, usize)) -> Option<Step> {
        let di = next.0.checked_sub(prev.0)?;
        let dj = next.1.checked_sub(prev.1)?;
        match (di, dj) {
            (1, 1) => Some(Step::Match),
            (1, 0) => Some(Step::Expansion),
            (0, 1) => Some(Step::Compression),
            _ => None,
        }
    }

    pub(crate) fn offset(&self) -> (usize, usize) {
        match self {
            Step::Match => (1, 1),
            Step::Expansion => (1, 0),
            Step::Compression => (0, 1),
        }
    }
}

/// Renders steps as a string of `M`, `E` and `C`.
pub fn symbolic(steps: &[Step]) -> String {
    steps.iter().map(Step::as_char).collect()
}

/// Ordered `(index in A, index in B)` pairs of an alignment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WarpPath(Vec<(usize, usize)>);

impl WarpPath {
    pub fn new(pairs: Vec<(usize, usize)>) -> Self {
        Self(pairs)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[(usize, usize)] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (usize, usize)> {
        self.0.iter()
    }

    pub fn first(&self) -> Option<(usize, usize)> {
        self.0.first().copied()
    }

    pub fn last(&self) -> Option<(usize, usize)> {
        self.0.last().copied()
    }

    /// Every consecutive pair differs by (1, 1), (1, 0) or (0, 1).
    pub fn is_monotone(&self) -> bool {
        self.0
            .windows(2)
            .all(|w| Step::between(w[0], w[1]).is_some())
    }

    pub fn into_inner(self) -> Vec<(usize, usize)> {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StepCounts {
    pub matches: usize,
    pub expansions: usize,
    pub compressions: usize,
}

impl StepCounts {
    pub fn from_steps(steps: &[Step]) -> Self {
        let mut out = Self::default();
        for s in steps {
            match s {
                Step::Match => out.matches += 1,
                Step::Expansion => out.expansions += 1,
                Step::Compression => out.compressions += 1,
            }
        }
        out
    }

    pub fn total(&self) -> usize {
        self.matches + self.expansions + self.compressions
    }
}

/// Multipliers of the local score per predecessor direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepWeights {
    pub diagonal: f64,
    pub vertical: f64,
    pub horizontal: f64,
}

impl Default for StepWeights {
    fn default() -> Self {
        Self {
            diagonal: 1.0,
            vertical: 1.0,
            horizontal: 1.0,
        }
    }
}

/// Result of a pairwise alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    pub path: WarpPath,
    /// One step per path element.
    pub steps: Vec<Step>,
    pub counts: StepCounts,
    /// Cumulative score at the terminal cell.
    pub score: f64,
    pub ties: TieStatistics,
    pub objective: Objective,
}

impl Alignment {
    pub fn symbolic(&self) -> String {
        symbolic(&self.steps)
    }

    /// Evaluates `f` at every pair of the path, typically the local
    /// similarity or distance, as input for [`crate::path`].
    pub fn path_values<F: FnMut(usize, usize) -> f64>(&self, mut f: F) -> Vec<f64> {
        self.path.iter().map(|&(i, j)| f(i, j)).collect()
    }
}

/// Dynamic programming aligner over two ordered sequences.
///
/// # Example
/// ```
/// use chromalign::dtw::{Objective, PairwiseAligner};
/// use chromalign::config::AlignmentConfig;
///
/// let a = [1.0_f64, 2.0, 3.0];
/// let b = [1.0_f64, 3.0];
/// let aligner = PairwiseAligner::new(AlignmentConfig {
///     objective: Objective::MinimizeDistance,
///     ..Default::default()
/// });
/// let aln = aligner.align(&a, &b, |x, y| (x - y).abs()).unwrap();
/// assert_eq!(aln.path.first(), Some((0, 0)));
/// assert_eq!(aln.path.last(), Some((2, 1)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PairwiseAligner {
    pub config: AlignmentConfig,
}

impl PairwiseAligner {
    pub fn new(config: AlignmentConfig) -> Self {
        Self { config }
    }

    /// Aligns two sequences with `local(a_i, b_j)` as the pairwise score.
    pub fn align<A, B, F>(&self, a: &[A], b: &[B], mut local: F) -> Result<Alignment>
    where
        F: FnMut(&A, &B) -> f64,
    {
        self.align_with(a.len(), b.len(), |i, j| local(&a[i], &b[j]))
    }

    /// Aligns a `rows x cols` grid with `local(i, j)` as the pairwise score.
    #[cfg_attr(
        feature = "instrumentation",
        tracing::instrument(skip_all, level = "trace")
    )]
    pub fn align_with<F>(&self, rows: usize, cols: usize, local: F) -> Result<Alignment>
    where
        F: FnMut(usize, usize) -> f64,
    {
        self.align_with_checkpoint(rows, cols, local, |_| true)
    }

    /// Same as [`PairwiseAligner::align_with`], `keep_going(row)` is called before
    /// each row is filled and the fill stops with [`AlignmentError::Aborted`]
    /// as soon as it returns false.
    pub fn align_with_checkpoint<F, C>(
        &self,
        rows: usize,
        cols: usize,
        local: F,
        keep_going: C,
    ) -> Result<Alignment>
    where
        F: FnMut(usize, usize) -> f64,
        C: FnMut(usize) -> bool,
    {
        if rows == 0 || cols == 0 {
            return Err(AlignmentError::EmptySequence { rows, cols }.into());
        }
        let band = self.config.constraint.to_band(rows, cols)?;
        let table = DpTable::fill(
            band,
            self.config.storage,
            self.config.objective,
            self.config.weights,
            local,
            keep_going,
        )?;
        let out = table.traceback_from(rows - 1, cols - 1)?;
        debug!(
            "Aligned {}x{} ({:?} storage): {} steps, {:?}, score {}",
            rows,
            cols,
            table.storage_kind(),
            out.path.len(),
            out.counts,
            out.score
        );
        Ok(out)
    }
}
