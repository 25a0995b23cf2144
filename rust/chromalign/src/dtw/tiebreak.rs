use serde::{
    Deserialize,
    Serialize,
};

/// Whether the grid holds similarities (maximized) or distances (minimized).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    #[default]
    MaximizeSimilarity,
    MinimizeDistance,
}

impl Objective {
    /// Value of cells that do not exist or were never reached.
    pub fn sentinel(&self) -> f64 {
        match self {
            Objective::MaximizeSimilarity => f64::NEG_INFINITY,
            Objective::MinimizeDistance => f64::INFINITY,
        }
    }

    /// True when `a` is strictly better than `b`.
    pub fn is_better(&self, a: f64, b: f64) -> bool {
        match self {
            Objective::MaximizeSimilarity => a > b,
            Objective::MinimizeDistance => a < b,
        }
    }

    /// True when `value` passes `threshold` in the direction of the objective.
    pub fn passes(&self, value: f64, threshold: f64) -> bool {
        match self {
            Objective::MaximizeSimilarity => value > threshold,
            Objective::MinimizeDistance => value < threshold,
        }
    }
}

/// The predecessor a cell was reached from.
///
/// The declaration order is the tie-break rank: diagonal, then vertical, then horizontal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum Direction {
    Diagonal = 1,
    Vertical = 2,
    Horizontal = 3,
}

pub(crate) const NO_PREDECESSOR: u8 = 0;

impl Direction {
    pub(crate) const RANKED: [Direction; 3] =
        [Direction::Diagonal, Direction::Vertical, Direction::Horizontal];

    pub(crate) fn code(self) -> u8 {
        self as u8
    }

    pub(crate) fn from_code(code: u8) -> Option<Direction> {
        match code {
            1 => Some(Direction::Diagonal),
            2 => Some(Direction::Vertical),
            3 => Some(Direction::Horizontal),
            _ => None,
        }
    }
}

/// Counts of the tie situations met while filling the grid.
///
/// Both are branching points where a different but equally good path exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TieStatistics {
    /// All three predecessors tied, diagonal was taken.
    pub three_way: usize,
    /// Vertical and horizontal tied for the best value without the diagonal,
    /// vertical was taken.
    pub vertical_horizontal: usize,
}

impl TieStatistics {
    pub fn total(&self) -> usize {
        self.three_way + self.vertical_horizontal
    }
}

/// Picks the best of the three candidate values, indexed as [`Direction::RANKED`].
///
/// Non finite values are missing. Among equal values the higher ranked
/// direction wins. Returns `None` when every candidate is missing.
pub(crate) fn choose(
    objective: Objective,
    candidates: [f64; 3],
    ties: &mut TieStatistics,
) -> Option<(Direction, f64)> {
    let mut best: Option<(Direction, f64)> = None;
    for (dir, value) in Direction::RANKED.into_iter().zip(candidates) {
        if !value.is_finite() {
            continue;
        }
        match best {
            Some((_, b)) if !objective.is_better(value, b) => {}
            _ => best = Some((dir, value)),
        }
    }

    let (dir, value) = best?;
    let tied: [bool; 3] = candidates.map(|c| c.is_finite() && c == value);
    match tied {
        [true, true, true] => ties.three_way += 1,
        [false, true, true] => ties.vertical_horizontal += 1,
        _ => {}
    }
    Some((dir, value))
}
