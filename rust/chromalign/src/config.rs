//! Tunable parameters of the aligner and the matcher.
//!
//! Every field has a default, so a partial JSON document is a valid config.

use crate::dtw::{
    Objective,
    StepWeights,
};
use crate::matrix::{
    ConstraintRegion,
    StorageKind,
};
use serde::{
    Deserialize,
    Serialize,
};

/// Parameters of the bidirectional best hit matcher.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Compare mean spectra (true) or seed spectra (false).
    pub use_mean_spectrum: bool,
    /// Minimum similarity of a best hit. Values `<= 0` disable it.
    pub threshold: f64,
    /// Candidates must satisfy `|Δrt| < max_rt_difference`.
    pub max_rt_difference: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            use_mean_spectrum: true,
            threshold: 0.9,
            max_rt_difference: 500.0,
        }
    }
}

/// Parameters of the pairwise aligner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentConfig {
    pub objective: Objective,
    pub constraint: ConstraintRegion,
    pub storage: StorageKind,
    pub weights: StepWeights,
    /// Anchors must be strictly better than this: above it for similarities,
    /// below it for distances. The default of 0 suits similarities; with
    /// `minimize_distance` it must be raised or no anchor is ever found.
    pub anchor_threshold: f64,
    pub smooth_path: bool,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            objective: Objective::default(),
            constraint: ConstraintRegion::default(),
            storage: StorageKind::default(),
            weights: StepWeights::default(),
            anchor_threshold: 0.0,
            smooth_path: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_defaults() {
        let conf: MatchingConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(conf, MatchingConfig::default());
        assert!(conf.use_mean_spectrum);
        assert_eq!(conf.threshold, 0.9);
        assert_eq!(conf.max_rt_difference, 500.0);
    }

    #[test]
    fn test_partial_alignment_config() {
        let conf: AlignmentConfig = serde_json::from_str(
            r#"{
                "objective": "minimize_distance",
                "constraint": {"type": "sakoe_chiba", "width": 3},
                "storage": "banded",
                "weights": {"diagonal": 2.0, "vertical": 1.0, "horizontal": 1.0}
            }"#,
        )
        .unwrap();
        assert_eq!(conf.objective, Objective::MinimizeDistance);
        assert_eq!(conf.constraint, ConstraintRegion::SakoeChiba { width: 3 });
        assert_eq!(conf.storage, StorageKind::Banded);
        assert_eq!(conf.weights.diagonal, 2.0);
        assert_eq!(conf.anchor_threshold, 0.0);
        assert!(!conf.smooth_path);
    }
}
