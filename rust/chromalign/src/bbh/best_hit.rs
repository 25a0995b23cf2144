use crate::config::MatchingConfig;
use crate::models::{
    Peak,
    SpectrumSelector,
};
use crate::similarity::SimilarityFunction;

/// Result of looking for the most similar peak in another chromatogram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Hit {
    Found { index: usize, similarity: f64 },
    NoHit,
}

impl Hit {
    pub fn index(&self) -> Option<usize> {
        match self {
            Hit::Found { index, .. } => Some(*index),
            Hit::NoHit => None,
        }
    }

    pub fn similarity(&self) -> Option<f64> {
        match self {
            Hit::Found { similarity, .. } => Some(*similarity),
            Hit::NoHit => None,
        }
    }
}

/// Most similar peak of `candidates` within the retention time window.
///
/// `candidates` must be sorted by first retention time. This is NOT checked:
/// the scan skips candidates before the window and stops at the first one
/// past it, so an unsorted list silently gives wrong answers.
///
/// Only candidates with a finite `|Δrt| < max_rt_difference` are scored. The first
/// candidate reaching the maximum wins. Returns [`Hit::NoHit`] when nothing
/// is in the window, or when thresholding is enabled (`threshold > 0`) and
/// the best similarity is below it.
pub fn find_best_hit<S: SimilarityFunction + ?Sized>(
    peak: &Peak,
    candidates: &[Peak],
    similarity: &S,
    config: &MatchingConfig,
) -> Hit {
    let selector = SpectrumSelector::from_use_mean(config.use_mean_spectrum);
    let window = config.max_rt_difference;
    let coords = peak.coords();
    let features = peak.spectrum(selector);

    let mut best: Option<(usize, f64)> = None;
    for (index, candidate) in candidates.iter().enumerate() {
        let delta = candidate.rt - peak.rt;
        if !delta.is_finite() {
            continue;
        }
        if delta >= window {
            // Sorted by rt, everything after this is further away
            break;
        }
        if delta <= -window {
            continue;
        }
        let sim = similarity.similarity(
            coords,
            candidate.coords(),
            features,
            candidate.spectrum(selector),
        );
        if sim.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if sim <= b => {}
            _ => best = Some((index, sim)),
        }
    }

    match best {
        Some((_, sim)) if config.threshold > 0.0 && sim < config.threshold => Hit::NoHit,
        Some((index, similarity)) => Hit::Found { index, similarity },
        None => Hit::NoHit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RetentionCoords;
    use crate::similarity::CosineSimilarity;

    fn config(window: f64, threshold: f64) -> MatchingConfig {
        MatchingConfig {
            use_mean_spectrum: true,
            threshold,
            max_rt_difference: window,
        }
    }

    #[test]
    fn test_best_in_window() {
        let peak = Peak::new(100.0, vec![1.0, 0.0]);
        let candidates = vec![
            Peak::new(10.0, vec![1.0, 0.0]),
            Peak::new(98.0, vec![1.0, 1.0]),
            Peak::new(101.0, vec![1.0, 0.1]),
            Peak::new(300.0, vec![1.0, 0.0]),
        ];
        let hit = find_best_hit(&peak, &candidates, &CosineSimilarity, &config(5.0, 0.0));
        assert_eq!(hit.index(), Some(2));
    }

    #[test]
    fn test_window_excludes_identical_spectra() {
        let peak = Peak::new(10.0, vec![1.0]);
        let candidates = vec![Peak::new(20.0, vec![1.0])];
        let hit = find_best_hit(&peak, &candidates, &CosineSimilarity, &config(5.0, 0.0));
        assert_eq!(hit, Hit::NoHit);
        // Exactly at the window edge is out too
        let hit = find_best_hit(&peak, &candidates, &CosineSimilarity, &config(10.0, 0.0));
        assert_eq!(hit, Hit::NoHit);
    }

    #[test]
    fn test_threshold() {
        let peak = Peak::new(10.0, vec![1.0, 0.0]);
        let candidates = vec![Peak::new(10.0, vec![1.0, 1.0])];
        let strict = find_best_hit(&peak, &candidates, &CosineSimilarity, &config(5.0, 0.9));
        assert_eq!(strict, Hit::NoHit);
        let disabled = find_best_hit(&peak, &candidates, &CosineSimilarity, &config(5.0, 0.0));
        assert_eq!(disabled.index(), Some(0));
    }

    #[test]
    fn test_first_maximum_wins_and_scan_stops() {
        let calls = std::sync::atomic::AtomicUsize::new(0);
        let sim = |_: RetentionCoords, _: RetentionCoords, _: &[f64], _: &[f64]| {
            calls.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            1.0
        };
        let peak = Peak::new(10.0, vec![]);
        let candidates = vec![
            Peak::new(1.0, vec![]),
            Peak::new(9.0, vec![]),
            Peak::new(11.0, vec![]),
            Peak::new(50.0, vec![]),
            Peak::new(60.0, vec![]),
        ];
        let hit = find_best_hit(&peak, &candidates, &sim, &config(5.0, 0.5));
        assert_eq!(hit, Hit::Found { index: 1, similarity: 1.0 });
        assert_eq!(calls.load(std::sync::atomic::Ordering::Relaxed), 2);
    }

    #[test]
    fn test_seed_spectrum_selection() {
        let mut peak = Peak::new(10.0, vec![1.0, 0.0]);
        peak.seed_spectrum = vec![0.0, 1.0];
        let mut cand = Peak::new(10.0, vec![1.0, 0.0]);
        cand.seed_spectrum = vec![0.0, 1.0];
        let other = Peak::new(10.0, vec![1.0, 0.0]);
        let candidates = vec![other, cand];
        let mut conf = config(5.0, 0.5);
        // Mean spectra: both candidates score 1.0, the first wins
        assert_eq!(find_best_hit(&peak, &candidates, &CosineSimilarity, &conf).index(), Some(0));
        conf.use_mean_spectrum = false;
        assert_eq!(find_best_hit(&peak, &candidates, &CosineSimilarity, &conf).index(), Some(1));
    }

    #[test]
    fn test_missing_retention_time_never_matches() {
        let peak = Peak::new(10.0, vec![1.0, 0.0]);
        let candidates = vec![Peak::new(f64::NAN, vec![1.0, 0.0])];
        let hit = find_best_hit(&peak, &candidates, &CosineSimilarity, &config(1.0, 0.0));
        assert_eq!(hit, Hit::NoHit);

        // Still found when it sits next to a usable candidate
        let candidates = vec![
            Peak::new(f64::NAN, vec![1.0, 0.0]),
            Peak::new(10.5, vec![1.0, 0.1]),
        ];
        let hit = find_best_hit(&peak, &candidates, &CosineSimilarity, &config(1.0, 0.0));
        assert_eq!(hit.index(), Some(1));

        let lost = Peak::new(f64::NAN, vec![1.0, 0.0]);
        let hit = find_best_hit(&lost, &candidates[1..], &CosineSimilarity, &config(1.0, 0.0));
        assert_eq!(hit, Hit::NoHit);
    }
}
