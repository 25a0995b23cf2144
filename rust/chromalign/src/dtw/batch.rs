use super::{
    Alignment,
    PairwiseAligner,
};
use crate::errors::Result;
use rayon::prelude::*;
use tracing::{
    info,
    warn,
};

/// Outcome of aligning sequence `first` against sequence `second`.
#[derive(Debug)]
pub struct PairAlignment {
    pub first: usize,
    pub second: usize,
    pub result: Result<Alignment>,
}

/// Aligns every unordered pair `(i, j)`, `i < j`, of `sequences` in parallel.
///
/// Each pair owns its own grid. A failing pair is reported in its
/// [`PairAlignment::result`] and does not stop the others.
/// Results are ordered by `(first, second)`.
pub fn align_pairs<T, S, F>(
    aligner: &PairwiseAligner,
    sequences: &[S],
    local: F,
) -> Vec<PairAlignment>
where
    T: Sync,
    S: AsRef<[T]> + Sync,
    F: Fn(&T, &T) -> f64 + Sync,
{
    align_pairs_with(aligner, sequences, local, |_| {})
}

/// Same as [`align_pairs`], `on_pair` sees every pair as soon as it is done
/// (in completion order, from the worker threads).
pub fn align_pairs_with<T, S, F, P>(
    aligner: &PairwiseAligner,
    sequences: &[S],
    local: F,
    on_pair: P,
) -> Vec<PairAlignment>
where
    T: Sync,
    S: AsRef<[T]> + Sync,
    F: Fn(&T, &T) -> f64 + Sync,
    P: Fn(&PairAlignment) + Sync,
{
    let pairs: Vec<(usize, usize)> = (0..sequences.len())
        .flat_map(|i| ((i + 1)..sequences.len()).map(move |j| (i, j)))
        .collect();

    let out: Vec<PairAlignment> = pairs
        .into_par_iter()
        .map(|(first, second)| {
            let result = aligner.align(
                sequences[first].as_ref(),
                sequences[second].as_ref(),
                &local,
            );
            if let Err(e) = &result {
                warn!("Alignment of {} vs {} failed: {}", first, second, e);
            }
            let pair = PairAlignment {
                first,
                second,
                result,
            };
            on_pair(&pair);
            pair
        })
        .collect();

    let failed = out.iter().filter(|x| x.result.is_err()).count();
    info!(
        "Aligned {} sequence pairs ({} failed)",
        out.len() - failed,
        failed
    );
    out
}
