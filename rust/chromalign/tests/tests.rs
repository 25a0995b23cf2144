use chromalign::bbh::BbhMatcher;
use chromalign::config::{
    AlignmentConfig,
    MatchingConfig,
};
use chromalign::dtw::{
    Objective,
    PairwiseAligner,
    Step,
};
use chromalign::matrix::{
    Band,
    ConstraintRegion,
    StorageKind,
};
use chromalign::models::{
    Peak,
    PeakList,
    Slot,
};
use chromalign::path::{
    find_anchors,
    smooth,
};
use chromalign::similarity::{
    CosineSimilarity,
    SimilarityConfig,
};

/// Small deterministic generator so the grids are reproducible.
struct Lcg(u64);

impl Lcg {
    fn next_f64(&mut self) -> f64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }

    fn grid(&mut self, rows: usize, cols: usize) -> Vec<Vec<f64>> {
        (0..rows)
            .map(|_| (0..cols).map(|_| self.next_f64()).collect())
            .collect()
    }
}

fn gaussian_trace(len: usize, center: f64, width: f64) -> Vec<f64> {
    (0..len)
        .map(|i| (-((i as f64 - center) / width).powi(2)).exp())
        .collect()
}

#[test]
fn test_paths_are_monotone_and_match_their_symbols() {
    let mut rng = Lcg(42);
    for (rows, cols) in [(1, 1), (1, 7), (6, 1), (9, 13), (17, 5), (20, 20)] {
        let grid = rng.grid(rows, cols);
        for objective in [Objective::MinimizeDistance, Objective::MaximizeSimilarity] {
            let aligner = PairwiseAligner::new(AlignmentConfig {
                objective,
                ..Default::default()
            });
            let aln = aligner.align_with(rows, cols, |i, j| grid[i][j]).unwrap();
            let pairs = aln.path.as_slice();

            assert_eq!(aln.path.first(), Some((0, 0)));
            assert_eq!(aln.path.last(), Some((rows - 1, cols - 1)));
            assert!(aln.path.is_monotone());
            assert_eq!(aln.steps.len(), pairs.len());
            assert_eq!(aln.steps[0], Step::Match);
            for (k, w) in pairs.windows(2).enumerate() {
                assert_eq!(Step::between(w[0], w[1]), Some(aln.steps[k + 1]));
            }
            assert_eq!(aln.counts.total(), pairs.len());
            assert_eq!(aln.symbolic().len(), pairs.len());
        }
    }
}

#[test]
fn test_alignment_is_deterministic() {
    let grid = Lcg(7).grid(15, 11);
    let aligner = PairwiseAligner::new(AlignmentConfig {
        objective: Objective::MinimizeDistance,
        ..Default::default()
    });
    let first = aligner.align_with(15, 11, |i, j| grid[i][j]).unwrap();
    let second = aligner.align_with(15, 11, |i, j| grid[i][j]).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_banded_path_stays_in_band() {
    let (rows, cols) = (30, 18);
    let grid = Lcg(3).grid(rows, cols);
    for width in [0, 1, 3] {
        let band = Band::sakoe_chiba(rows, cols, width);
        for storage in [StorageKind::Dense, StorageKind::Banded, StorageKind::Sparse] {
            let aligner = PairwiseAligner::new(AlignmentConfig {
                objective: Objective::MinimizeDistance,
                constraint: ConstraintRegion::SakoeChiba { width },
                storage,
                ..Default::default()
            });
            let aln = aligner.align_with(rows, cols, |i, j| grid[i][j]).unwrap();
            for &(i, j) in aln.path.iter() {
                assert!(band.contains(i, j), "({i}, {j}) outside band {width}");
            }
            assert_eq!(aln.path.last(), Some((rows - 1, cols - 1)));
        }
    }
}

#[test]
fn test_shifted_traces_align_on_apex() {
    // Same peak, 4 scans later in the second trace
    let a = gaussian_trace(40, 15.0, 3.0);
    let b = gaussian_trace(40, 19.0, 3.0);
    let aligner = PairwiseAligner::new(AlignmentConfig {
        objective: Objective::MinimizeDistance,
        ..Default::default()
    });
    let local = |x: &f64, y: &f64| (x - y).abs();
    let aln = aligner.align(&a, &b, local).unwrap();
    assert!(aln.path.iter().any(|&p| p == (15, 19)));

    let values = aln.path_values(|i, j| (a[i] - b[j]).abs());
    let anchors = find_anchors(
        &aln.path,
        &aln.steps,
        &values,
        Objective::MinimizeDistance,
        1e-9,
    )
    .unwrap();
    assert!(!anchors.is_empty());
    for anchor in &anchors {
        assert_eq!(aln.steps[anchor.path_index], Step::Match);
        assert_eq!(aln.path.as_slice()[anchor.path_index], (anchor.row, anchor.col));
        assert!(anchor.value < 1e-9);
    }
}

#[test]
fn test_smoothing_keeps_path_valid() {
    let mut rng = Lcg(11);
    let grid = rng.grid(25, 19);
    let aligner = PairwiseAligner::new(AlignmentConfig {
        objective: Objective::MinimizeDistance,
        ..Default::default()
    });
    let aln = aligner.align_with(25, 19, |i, j| grid[i][j]).unwrap();
    let (path, steps) = smooth(&aln.path, &aln.steps).unwrap();
    assert!(path.len() <= aln.path.len());
    assert_eq!(path.first(), aln.path.first());
    assert_eq!(path.last(), aln.path.last());
    assert!(path.is_monotone());
    for (k, w) in path.as_slice().windows(2).enumerate() {
        assert_eq!(Step::between(w[0], w[1]), Some(steps[k + 1]));
    }
}

fn synthetic_runs(num_runs: usize, num_peaks: usize) -> Vec<PeakList> {
    (0..num_runs)
        .map(|run| {
            let peaks = (0..num_peaks)
                .map(|k| {
                    // Drifting retention time, a compound specific spectrum
                    let rt = 30.0 * k as f64 + 0.3 * run as f64;
                    let mut spectrum = vec![0.05; num_peaks];
                    spectrum[k] = 1.0;
                    Peak::new(rt, spectrum).with_area(100.0 * (run + 1) as f64)
                })
                .collect();
            PeakList::new(format!("run_{run}"), peaks)
        })
        .collect()
}

#[test]
fn test_matching_recovers_compounds() {
    let lists = synthetic_runs(4, 8);
    let similarity = SimilarityConfig::default();
    let matcher = BbhMatcher::new(&lists, &similarity, MatchingConfig::default()).unwrap();
    let cliques = matcher.run();
    assert_eq!(cliques.len(), 8);
    for (k, clique) in cliques.iter().enumerate() {
        assert_eq!(clique.num_present(), 4);
        for c in 0..4 {
            assert_eq!(clique.slot(c), Slot::Present(k));
        }
        let (mean, var) = clique.rt_stats(&lists).unwrap();
        assert!((mean - (30.0 * k as f64 + 0.45)).abs() < 1e-9);
        assert!(var > 0.0);
    }
}

#[test]
fn test_no_peak_in_two_cliques() {
    let mut lists = synthetic_runs(3, 10);
    // Drop a compound from the middle run so gaps show up
    lists[1].peaks.remove(4);
    let total: usize = lists.iter().map(|l| l.len()).sum();

    let matcher = BbhMatcher::new(&lists, &CosineSimilarity, MatchingConfig::default()).unwrap();
    let cliques = matcher.run();
    let mut seen = std::collections::HashSet::new();
    for clique in &cliques {
        for member in clique.members() {
            assert!(seen.insert(member));
        }
    }
    assert_eq!(seen.len(), total);
    assert!(cliques
        .iter()
        .any(|c| c.slot(0).is_present() && c.slot(1) == Slot::Absent && c.slot(2).is_present()));
}

#[test]
fn test_window_never_matches_far_peaks() {
    let lists = vec![
        PeakList::new("a", vec![Peak::new(100.0, vec![1.0, 0.0])]),
        PeakList::new(
            "b",
            vec![Peak::new(50.0, vec![1.0, 0.0]), Peak::new(150.0, vec![1.0, 0.0])],
        ),
    ];
    let conf = MatchingConfig {
        max_rt_difference: 40.0,
        ..Default::default()
    };
    let matcher = BbhMatcher::new(&lists, &CosineSimilarity, conf).unwrap();
    let cliques = matcher.run();
    assert_eq!(cliques.len(), 3);
    assert!(cliques.iter().all(|c| c.is_singleton()));
}
