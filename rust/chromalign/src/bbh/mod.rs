//! Cross chromatogram peak grouping by bidirectional best hits.
//!
//! Chains are grown greedily from every unused peak of chromatogram `h`
//! towards chromatograms `h + 1 .. N`. A candidate joins the chain when it and
//! the chain's current tail are each other's best hit, and when its best hit
//! in every other chromatogram already in the chain is the member there.
//! The result depends on the order of the chromatograms and of the peaks.

mod best_hit;
mod consumed;

pub use best_hit::{
    Hit,
    find_best_hit,
};
pub use consumed::ConsumedSets;

use crate::config::MatchingConfig;
use crate::errors::{
    MatchingError,
    Result,
};
use crate::models::{
    Clique,
    PeakList,
};
use crate::similarity::SimilarityFunction;
use tracing::{
    debug,
    info,
    trace,
};

pub struct BbhMatcher<'a, S: SimilarityFunction + ?Sized> {
    lists: &'a [PeakList],
    similarity: &'a S,
    config: MatchingConfig,
}

impl<'a, S: SimilarityFunction + ?Sized> BbhMatcher<'a, S> {
    /// Fails when there are fewer than two peak lists or any of them is empty.
    pub fn new(lists: &'a [PeakList], similarity: &'a S, config: MatchingConfig) -> Result<Self> {
        if lists.len() < 2 {
            return Err(MatchingError::TooFewChromatograms { found: lists.len() }.into());
        }
        if let Some(chromatogram) = lists.iter().position(|l| l.is_empty()) {
            return Err(MatchingError::EmptyPeakList { chromatogram }.into());
        }
        Ok(Self {
            lists,
            similarity,
            config,
        })
    }

    pub fn num_chromatograms(&self) -> usize {
        self.lists.len()
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Best hit of peak `index` of chromatogram `from` among the peaks of chromatogram `to`.
    ///
    /// Out of range chromatograms or peaks give [`Hit::NoHit`].
    pub fn best_hit(&self, from: usize, index: usize, to: usize) -> Hit {
        let (Some(peak), Some(candidates)) = (
            self.lists.get(from).and_then(|l| l.peaks.get(index)),
            self.lists.get(to),
        ) else {
            return Hit::NoHit;
        };
        find_best_hit(peak, candidates.as_slice(), self.similarity, &self.config)
    }

    /// Groups all peaks, starting from an empty consumed set.
    pub fn run(&self) -> Vec<Clique> {
        let mut consumed = ConsumedSets::new(self.num_chromatograms());
        self.run_with(&mut consumed)
    }

    /// Groups all peaks not yet in `consumed`, marking them as they get used.
    #[cfg_attr(
        feature = "instrumentation",
        tracing::instrument(skip_all, level = "trace")
    )]
    pub fn run_with(&self, consumed: &mut ConsumedSets) -> Vec<Clique> {
        let n = self.num_chromatograms();
        let mut out = Vec::new();

        for h in 0..(n - 1) {
            for i in 0..self.lists[h].len() {
                if consumed.contains(h, i) {
                    continue;
                }
                out.push(self.grow_chain(h, i, consumed));
            }
            debug!(
                "Chromatogram {} done, {} cliques so far",
                self.lists[h].name,
                out.len()
            );
        }

        let last = n - 1;
        for i in 0..self.lists[last].len() {
            if consumed.insert(last, i) {
                out.push(Clique::singleton(n, last, i));
            }
        }

        let singletons = out.iter().filter(|c| c.is_singleton()).count();
        info!(
            "Grouped peaks of {} chromatograms into {} cliques ({} singletons)",
            n,
            out.len(),
            singletons
        );
        out
    }

    /// Grows the chain seeded at peak `index` of chromatogram `seed`.
    ///
    /// Chromatograms before `seed` are left absent. For every later
    /// chromatogram the chain either gains a member or records a gap; a gap
    /// does not move the chain's tail. `seed` and `index` must be in range.
    pub(crate) fn grow_chain(&self, seed: usize, index: usize, consumed: &mut ConsumedSets) -> Clique {
        let n = self.num_chromatograms();
        let mut clique = Clique::singleton(n, seed, index);
        consumed.insert(seed, index);

        // (chromatogram, index) of every member, the last one is the tail
        let mut members: Vec<(usize, usize)> = vec![(seed, index)];

        for r in (seed + 1)..n {
            let (tail_chrom, tail_idx) = members[members.len() - 1];
            let Hit::Found {
                index: candidate,
                similarity,
            } = self.best_hit(tail_chrom, tail_idx, r)
            else {
                continue;
            };
            if consumed.contains(r, candidate) {
                continue;
            }
            if self.best_hit(r, candidate, tail_chrom).index() != Some(tail_idx) {
                trace!(
                    "Not a mutual hit: {}[{}] -> {}[{}]",
                    tail_chrom, tail_idx, r, candidate
                );
                continue;
            }
            if !self.is_consistent(r, candidate, &members[..members.len() - 1]) {
                trace!(
                    "Rejected {}[{}], inconsistent with the chain",
                    r, candidate
                );
                continue;
            }

            consumed.insert(tail_chrom, tail_idx);
            consumed.insert(r, candidate);
            clique.set(r, candidate);
            clique.reliability.update(similarity);
            members.push((r, candidate));
        }
        clique
    }

    /// Whether the best hit of the candidate in every listed chromatogram is
    /// exactly the member already there.
    fn is_consistent(&self, chromatogram: usize, index: usize, members: &[(usize, usize)]) -> bool {
        members
            .iter()
            .all(|&(ff, member)| self.best_hit(chromatogram, index, ff).index() == Some(member))
    }
}
