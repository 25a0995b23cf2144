//! Post processing of warp paths.
//!
//! Turns a raw alignment into anchor candidates: the best scoring pair of
//! every run of consecutive matches.

use crate::dtw::{
    Objective,
    Step,
    WarpPath,
};
use crate::errors::{
    AlignmentError,
    Result,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::ops::Range;

/// A path position that is a local optimum within its run of matches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    /// Position in the path.
    pub path_index: usize,
    pub row: usize,
    pub col: usize,
    pub value: f64,
}

/// Maximal runs of consecutive [`Step::Match`] positions, as ranges of path indices.
pub fn match_runs(steps: &[Step]) -> Vec<Range<usize>> {
    let mut out = Vec::new();
    let mut start = None;
    for (k, step) in steps.iter().enumerate() {
        match (step, start) {
            (Step::Match, None) => start = Some(k),
            (Step::Match, Some(_)) => {}
            (_, Some(s)) => {
                out.push(s..k);
                start = None;
            }
            (_, None) => {}
        }
    }
    if let Some(s) = start {
        out.push(s..steps.len());
    }
    out
}

/// Finds the anchors of a path.
///
/// `values` has one entry per path position (usually the local score
/// re-evaluated at that pair). Within each run of matches the optimal value
/// is located (minimum for distances, maximum for similarities); it is kept
/// only if it is strictly better than `threshold`. Every position attaining
/// the optimum is reported. Runs of a single match qualify too.
pub fn find_anchors(
    path: &WarpPath,
    steps: &[Step],
    values: &[f64],
    objective: Objective,
    threshold: f64,
) -> Result<Vec<Anchor>> {
    if steps.len() != path.len() {
        return Err(AlignmentError::DimensionMismatch {
            context: "steps vs path",
            expected: path.len(),
            other: steps.len(),
        }
        .into());
    }
    if values.len() != path.len() {
        return Err(AlignmentError::DimensionMismatch {
            context: "values vs path",
            expected: path.len(),
            other: values.len(),
        }
        .into());
    }

    let pairs = path.as_slice();
    let mut out = Vec::new();
    for run in match_runs(steps) {
        let mut best: Option<f64> = None;
        for &v in &values[run.clone()] {
            if v.is_nan() {
                continue;
            }
            match best {
                Some(b) if !objective.is_better(v, b) => {}
                _ => best = Some(v),
            }
        }
        let Some(best) = best else {
            continue;
        };
        if !objective.passes(best, threshold) {
            continue;
        }
        for k in run {
            if values[k] == best {
                out.push(Anchor {
                    path_index: k,
                    row: pairs[k].0,
                    col: pairs[k].1,
                    value: best,
                });
            }
        }
    }
    Ok(out)
}

/// Replaces isolated kinks by a diagonal step.
///
/// A kink is a compression directly followed by an expansion, or the other
/// way around; both reach the same pair as one match would. A kink is only
/// removed if at least one step separates it from the previously removed
/// one. The first and last pairs never change.
pub fn smooth(path: &WarpPath, steps: &[Step]) -> Result<(WarpPath, Vec<Step>)> {
    if steps.len() != path.len() {
        return Err(AlignmentError::DimensionMismatch {
            context: "steps vs path",
            expected: path.len(),
            other: steps.len(),
        }
        .into());
    }
    let pairs = path.as_slice();
    let n = pairs.len();
    let mut out_pairs = Vec::with_capacity(n);
    let mut out_steps = Vec::with_capacity(n);

    // Index of the second step of the last removed kink
    let mut last_removed: Option<usize> = None;
    let mut k = 0;
    while k < n {
        let is_kink = k >= 1
            && k + 1 < n
            && matches!(
                (steps[k], steps[k + 1]),
                (Step::Compression, Step::Expansion) | (Step::Expansion, Step::Compression)
            );
        let isolated = match last_removed {
            Some(last) => k > last + 1,
            None => true,
        };
        if is_kink && isolated {
            out_pairs.push(pairs[k + 1]);
            out_steps.push(Step::Match);
            last_removed = Some(k + 1);
            k += 2;
            continue;
        }
        out_pairs.push(pairs[k]);
        out_steps.push(steps[k]);
        k += 1;
    }
    Ok((WarpPath::new(out_pairs), out_steps))
}
