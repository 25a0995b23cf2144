use crate::config::{
    Config,
    OutputConfig,
};
use crate::errors::CliError;
use chromalign::bbh::BbhMatcher;
use chromalign::config::AlignmentConfig;
use chromalign::dtw::{
    Alignment,
    Objective,
    PairwiseAligner,
    align_pairs_with,
};
use chromalign::models::{
    Clique,
    Peak,
    PeakList,
    SpectrumSelector,
};
use chromalign::path::{
    Anchor,
    find_anchors,
    smooth,
};
use chromalign::similarity::SimilarityFunction;
use indicatif::{
    ProgressBar,
    ProgressStyle,
};
use rayon::prelude::*;
use serde::{
    Deserialize,
    Serialize,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{
    debug,
    info,
    warn,
};

/// One chromatogram of the input document.
#[derive(Debug, Clone, Deserialize)]
pub struct ChromatogramInput {
    pub name: String,
    /// Sample class, used for the abundance ratios of the cliques.
    #[serde(default)]
    pub class: Option<String>,
    pub peaks: Vec<Peak>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputDocument {
    pub chromatograms: Vec<ChromatogramInput>,
}

#[derive(Debug, Serialize)]
pub struct PairResult {
    pub first: String,
    pub second: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<(usize, usize)>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbolic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub anchors: Vec<Anchor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CliqueRecord {
    pub members: Vec<Option<usize>>,
    pub num_present: usize,
    pub rt_mean: Option<f64>,
    pub rt_variance: Option<f64>,
    #[serde(flatten)]
    pub clique: Clique,
}

pub fn load_peak_lists(path: &Path) -> Result<(Vec<PeakList>, Option<Vec<Arc<str>>>), CliError> {
    let file = std::fs::File::open(path).map_err(|e| CliError::io(e, path))?;
    let doc: InputDocument = serde_json::from_reader(std::io::BufReader::new(file))
        .map_err(|e| CliError::ParseError { msg: e.to_string() })?;

    let classes: Option<Vec<Arc<str>>> = doc
        .chromatograms
        .iter()
        .map(|c| c.class.as_deref().map(Arc::<str>::from))
        .collect();

    let lists: Vec<PeakList> = doc
        .chromatograms
        .into_iter()
        .map(|c| {
            let peaks = c.peaks.into_iter().map(fill_missing_spectrum).collect();
            PeakList::new(c.name, peaks)
        })
        .collect();

    for list in lists.iter().filter(|l| !l.is_rt_sorted()) {
        warn!(
            "Peaks of {} are not sorted by retention time, matching results will be wrong",
            list.name
        );
    }
    Ok((lists, classes))
}

/// Documents often carry only one of the two spectra.
fn fill_missing_spectrum(mut peak: Peak) -> Peak {
    if peak.seed_spectrum.is_empty() {
        peak.seed_spectrum = peak.mean_spectrum.clone();
    } else if peak.mean_spectrum.is_empty() {
        peak.mean_spectrum = peak.seed_spectrum.clone();
    }
    peak
}

fn pair_result<S: SimilarityFunction + ?Sized>(
    aligner: &PairwiseAligner,
    lists: &[PeakList],
    similarity: &S,
    selector: SpectrumSelector,
    first: usize,
    second: usize,
    result: chromalign::Result<Alignment>,
) -> PairResult {
    let mut out = PairResult {
        first: lists[first].name.to_string(),
        second: lists[second].name.to_string(),
        path: None,
        symbolic: None,
        score: None,
        anchors: Vec::new(),
        error: None,
    };
    let aln = match result {
        Ok(x) => x,
        Err(e) => {
            out.error = Some(e.to_string());
            return out;
        }
    };

    let config = &aligner.config;
    let local = |i: usize, j: usize| {
        local_score(
            config.objective,
            similarity,
            selector,
            &lists[first].peaks[i],
            &lists[second].peaks[j],
        )
    };
    let (path, steps) = if config.smooth_path {
        match smooth(&aln.path, &aln.steps) {
            Ok(x) => x,
            Err(e) => {
                out.error = Some(e.to_string());
                return out;
            }
        }
    } else {
        (aln.path.clone(), aln.steps.clone())
    };
    let values: Vec<f64> = path.iter().map(|&(i, j)| local(i, j)).collect();
    match find_anchors(&path, &steps, &values, config.objective, config.anchor_threshold) {
        Ok(anchors) => out.anchors = anchors,
        Err(e) => out.error = Some(e.to_string()),
    }
    out.symbolic = Some(chromalign::dtw::symbolic(&steps));
    out.score = Some(aln.score);
    out.path = Some(path.into_inner());
    out
}

/// Similarity of two peaks, or one minus it when the grid holds distances.
fn local_score<S: SimilarityFunction + ?Sized>(
    objective: Objective,
    similarity: &S,
    selector: SpectrumSelector,
    a: &Peak,
    b: &Peak,
) -> f64 {
    let sim = similarity.similarity(
        a.coords(),
        b.coords(),
        a.spectrum(selector),
        b.spectrum(selector),
    );
    match objective {
        Objective::MaximizeSimilarity => sim,
        Objective::MinimizeDistance => 1.0 - sim,
    }
}

/// Local distances are `1 - similarity >= 0` for similarities up to one, so
/// `anchor_threshold <= 0` never lets one through.
fn anchors_reachable(config: &AlignmentConfig) -> bool {
    !(config.objective == Objective::MinimizeDistance && config.anchor_threshold <= 0.0)
}

pub fn align_all<S: SimilarityFunction + ?Sized>(
    lists: &[PeakList],
    similarity: &S,
    config: &Config,
) -> Vec<PairResult> {
    let aligner = PairwiseAligner::new(config.alignment.clone());
    let selector = SpectrumSelector::from_use_mean(config.matching.use_mean_spectrum);
    let objective = aligner.config.objective;
    let sequences: Vec<&[Peak]> = lists.iter().map(|l| l.as_slice()).collect();

    if !anchors_reachable(&config.alignment) {
        warn!(
            "anchor_threshold {} cannot be passed by any distance, no anchors will be reported",
            config.alignment.anchor_threshold
        );
    }

    let num_pairs = lists.len() * lists.len().saturating_sub(1) / 2;
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar());
    let progress = ProgressBar::new(num_pairs as u64).with_style(style);

    let st = Instant::now();
    let results = align_pairs_with(
        &aligner,
        &sequences,
        |a: &Peak, b: &Peak| local_score(objective, similarity, selector, a, b),
        |_| progress.inc(1),
    );
    progress.finish();
    info!(
        "Aligned {} chromatogram pairs in {:?}",
        results.len(),
        st.elapsed()
    );

    results
        .into_par_iter()
        .map(|pair| {
            pair_result(
                &aligner,
                lists,
                similarity,
                selector,
                pair.first,
                pair.second,
                pair.result,
            )
        })
        .collect()
}

pub fn match_all<S: SimilarityFunction + ?Sized>(
    lists: &[PeakList],
    classes: Option<&[Arc<str>]>,
    similarity: &S,
    config: &Config,
) -> Result<Vec<CliqueRecord>, CliError> {
    let st = Instant::now();
    let matcher = BbhMatcher::new(lists, similarity, config.matching)?;
    let cliques = matcher.run();
    info!("Matched {} cliques in {:?}", cliques.len(), st.elapsed());

    let records = cliques
        .into_iter()
        .map(|mut clique| {
            if let Some(classes) = classes {
                clique.compute_ratios(lists, classes);
            }
            let stats = clique.rt_stats(lists);
            CliqueRecord {
                members: clique.slots().iter().map(|s| s.index()).collect(),
                num_present: clique.num_present(),
                rt_mean: stats.map(|x| x.0),
                rt_variance: stats.map(|x| x.1),
                clique,
            }
        })
        .collect();
    Ok(records)
}

fn write_json<T: Serialize + ?Sized>(data: &T, path: &Path) -> Result<(), CliError> {
    let file = std::fs::File::create(path).map_err(|e| CliError::io(e, path))?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), data).map_err(|e| {
        CliError::Io {
            source: e.to_string(),
            path: Some(path.to_string_lossy().to_string()),
        }
    })?;
    debug!("Wrote {}", path.display());
    Ok(())
}

pub fn process_input<S: SimilarityFunction + ?Sized>(
    path: &Path,
    similarity: &S,
    config: &Config,
    output: &OutputConfig,
) -> Result<(), CliError> {
    info!("Loading peak lists from {:?}", path);
    let (lists, classes) = load_peak_lists(path)?;
    let npeaks: usize = lists.iter().map(|l| l.len()).sum();
    info!("Loaded {} chromatograms with {} peaks", lists.len(), npeaks);

    let pairs = align_all(&lists, similarity, config);
    let failed = pairs.iter().filter(|p| p.error.is_some()).count();
    if failed > 0 {
        warn!("{} of {} pairwise alignments failed", failed, pairs.len());
    }
    write_json(&pairs, &output.directory.join("alignments.json"))?;

    let cliques = match_all(&lists, classes.as_deref(), similarity, config)?;
    write_json(&cliques, &output.directory.join("cliques.json"))?;

    println!(
        "Processed {} chromatograms: {} alignments, {} cliques",
        lists.len(),
        pairs.len(),
        cliques.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chromalign::similarity::CosineSimilarity;

    fn document() -> InputDocument {
        serde_json::from_str(
            r#"{
                "chromatograms": [
                    {"name": "a", "class": "ctrl", "peaks": [
                        {"rt": 10.0, "mean_spectrum": [1.0, 0.0], "area": 10.0},
                        {"rt": 40.0, "mean_spectrum": [0.0, 1.0], "area": 5.0}
                    ]},
                    {"name": "b", "class": "treated", "peaks": [
                        {"rt": 11.0, "mean_spectrum": [1.0, 0.0], "area": 20.0},
                        {"rt": 41.0, "mean_spectrum": [0.0, 1.0], "area": 5.0}
                    ]}
                ]
            }"#,
        )
        .unwrap()
    }

    fn lists() -> Vec<PeakList> {
        document()
            .chromatograms
            .into_iter()
            .map(|c| {
                PeakList::new(
                    c.name,
                    c.peaks.into_iter().map(fill_missing_spectrum).collect(),
                )
            })
            .collect()
    }

    fn config() -> Config {
        serde_json::from_str(r#"{"input": null, "output": null}"#).unwrap()
    }

    #[test]
    fn test_seed_spectrum_filled_from_mean() {
        let lists = lists();
        assert_eq!(lists[0].peaks[0].seed_spectrum, vec![1.0, 0.0]);
        assert_eq!(&*lists[1].peaks[0].chromatogram, "b");
    }

    #[test]
    fn test_align_all_finds_anchors() {
        let lists = lists();
        let pairs = align_all(&lists, &CosineSimilarity, &config());
        assert_eq!(pairs.len(), 1);
        let pair = &pairs[0];
        assert!(pair.error.is_none());
        assert_eq!(pair.path.as_deref(), Some(&[(0, 0), (1, 1)][..]));
        assert_eq!(pair.symbolic.as_deref(), Some("MM"));
        assert_eq!(pair.anchors.len(), 2);
    }

    #[test]
    fn test_distance_objective_needs_positive_anchor_threshold() {
        let mut conf = AlignmentConfig::default();
        assert!(anchors_reachable(&conf));
        conf.objective = Objective::MinimizeDistance;
        assert!(!anchors_reachable(&conf));
        conf.anchor_threshold = 0.1;
        assert!(anchors_reachable(&conf));
    }

    #[test]
    fn test_distance_alignment_reports_anchors() {
        let lists = lists();
        let mut conf = config();
        conf.alignment.objective = Objective::MinimizeDistance;
        conf.alignment.anchor_threshold = 0.05;
        let pairs = align_all(&lists, &CosineSimilarity, &conf);
        assert_eq!(pairs[0].symbolic.as_deref(), Some("MM"));
        assert_eq!(pairs[0].anchors.len(), 2);
        assert!(pairs[0].anchors.iter().all(|a| a.value.abs() < 1e-12));
    }

    #[test]
    fn test_match_all_with_ratios() {
        let lists = lists();
        let classes: Vec<Arc<str>> = vec![Arc::from("ctrl"), Arc::from("treated")];
        let records = match_all(&lists, Some(classes.as_slice()), &CosineSimilarity, &config()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].members, vec![Some(0), Some(0)]);
        assert_eq!(records[0].rt_mean, Some(10.5));
        let ratio = records[0].clique.ratios.values().next().copied();
        assert_eq!(ratio, Some(0.5));
    }
}
