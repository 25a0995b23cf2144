use super::tiebreak::{
    Direction,
    NO_PREDECESSOR,
    Objective,
    TieStatistics,
    choose,
};
use super::{
    Alignment,
    Step,
    StepCounts,
    StepWeights,
    WarpPath,
};
use crate::errors::{
    AlignmentError,
    Result,
};
use crate::matrix::{
    AlignmentMatrix,
    AnyMatrix,
    Band,
    StorageKind,
};
use std::sync::Arc;
use tracing::{
    debug,
    trace,
};

/// A filled dynamic programming grid: cumulative scores plus the predecessor
/// each cell was reached from.
#[derive(Debug, Clone)]
pub struct DpTable {
    scores: AnyMatrix<f64>,
    predecessors: AnyMatrix<u8>,
    objective: Objective,
    ties: TieStatistics,
}

impl DpTable {
    /// Fills the grid row by row. Only cells inside the band are evaluated.
    pub fn fill<F, C>(
        band: Band,
        storage: StorageKind,
        objective: Objective,
        weights: StepWeights,
        mut local: F,
        mut keep_going: C,
    ) -> Result<Self>
    where
        F: FnMut(usize, usize) -> f64,
        C: FnMut(usize) -> bool,
    {
        let band = Arc::new(band);
        let sentinel = objective.sentinel();
        let mut scores = AnyMatrix::new(storage, band.clone(), sentinel);
        let mut predecessors = AnyMatrix::new(storage, band.clone(), NO_PREDECESSOR);
        let mut ties = TieStatistics::default();

        for i in 0..band.rows() {
            if !keep_going(i) {
                return Err(AlignmentError::Aborted { row: i }.into());
            }
            let bounds = band.row_bounds(i);
            for j in bounds.start..bounds.end() {
                let cost = local(i, j);
                if i == 0 && j == 0 {
                    scores.set(0, 0, cost);
                    continue;
                }
                let prev = |r: Option<usize>, c: Option<usize>| match (r, c) {
                    (Some(r), Some(c)) => scores.get(r, c),
                    _ => sentinel,
                };
                let candidates = [
                    prev(i.checked_sub(1), j.checked_sub(1)) + weights.diagonal * cost,
                    prev(i.checked_sub(1), Some(j)) + weights.vertical * cost,
                    prev(Some(i), j.checked_sub(1)) + weights.horizontal * cost,
                ];
                if let Some((dir, value)) = choose(objective, candidates, &mut ties) {
                    scores.set(i, j, value);
                    predecessors.set(i, j, dir.code());
                }
            }
        }

        if ties.total() > 0 {
            debug!(
                "Alignment fill met {} three way ties and {} vertical/horizontal ties",
                ties.three_way, ties.vertical_horizontal
            );
        }

        Ok(Self {
            scores,
            predecessors,
            objective,
            ties,
        })
    }

    pub fn rows(&self) -> usize {
        self.scores.rows()
    }

    pub fn columns(&self) -> usize {
        self.scores.columns()
    }

    /// Cumulative score of a cell, the objective's sentinel if unreachable.
    pub fn score(&self, row: usize, col: usize) -> f64 {
        self.scores.get(row, col)
    }

    pub fn ties(&self) -> TieStatistics {
        self.ties
    }

    pub fn storage_kind(&self) -> StorageKind {
        self.scores.kind()
    }

    /// Walks back from `(row, col)` to `(0, 0)`.
    ///
    /// Once either index hits zero the walk continues straight along that
    /// border. Every other cell must hold a valid predecessor code.
    pub fn traceback_from(&self, row: usize, col: usize) -> Result<Alignment> {
        if !self.scores.in_band(row, col) || !self.scores.get(row, col).is_finite() {
            return Err(AlignmentError::NoPathWithinBand { row, col }.into());
        }

        let mut path = Vec::with_capacity(row + col + 1);
        let mut steps = Vec::with_capacity(row + col + 1);
        let (mut i, mut j) = (row, col);
        loop {
            if i == 0 && j == 0 {
                path.push((0, 0));
                steps.push(Step::Match);
                break;
            }
            let step = if i == 0 {
                Step::Compression
            } else if j == 0 {
                Step::Expansion
            } else {
                let code = self.predecessors.get(i, j);
                match Direction::from_code(code) {
                    Some(Direction::Diagonal) => Step::Match,
                    Some(Direction::Vertical) => Step::Expansion,
                    Some(Direction::Horizontal) => Step::Compression,
                    None => {
                        return Err(AlignmentError::UnrecognizedPredecessor {
                            row: i,
                            col: j,
                            code,
                        }
                        .into());
                    }
                }
            };
            path.push((i, j));
            steps.push(step);
            let (di, dj) = step.offset();
            i -= di;
            j -= dj;
            if !self.scores.in_band(i, j) {
                return Err(AlignmentError::NoPathWithinBand { row: i, col: j }.into());
            }
        }

        path.reverse();
        steps.reverse();
        trace!("Traceback from ({}, {}) took {} steps", row, col, path.len());

        let counts = StepCounts::from_steps(&steps);
        Ok(Alignment {
            path: WarpPath::new(path),
            steps,
            counts,
            score: self.scores.get(row, col),
            ties: self.ties,
            objective: self.objective,
        })
    }

    #[cfg(test)]
    pub(crate) fn corrupt(&mut self, row: usize, col: usize, code: u8) {
        self.predecessors.set(row, col, code);
    }
}
