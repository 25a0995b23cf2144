//! Peak similarity functions.
//!
//! The matcher only consumes the [`SimilarityFunction`] contract, hosts are free
//! to bring their own. The implementations here are the usual building blocks:
//! an array-shape similarity combined with a retention time penalty.

use crate::models::RetentionCoords;
use serde::{
    Deserialize,
    Serialize,
};

/// Scores how likely two peaks are the same compound. Larger is more similar.
pub trait SimilarityFunction: Sync {
    fn similarity(
        &self,
        coords_a: RetentionCoords,
        coords_b: RetentionCoords,
        features_a: &[f64],
        features_b: &[f64],
    ) -> f64;
}

impl<F> SimilarityFunction for F
where
    F: Fn(RetentionCoords, RetentionCoords, &[f64], &[f64]) -> f64 + Sync,
{
    fn similarity(
        &self,
        coords_a: RetentionCoords,
        coords_b: RetentionCoords,
        features_a: &[f64],
        features_b: &[f64],
    ) -> f64 {
        self(coords_a, coords_b, features_a, features_b)
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Cosine of the angle between the two feature vectors.
///
/// Vectors of different length are compared over the shared prefix.
/// A zero vector has similarity 0 to everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct CosineSimilarity;

impl CosineSimilarity {
    pub fn score(a: &[f64], b: &[f64]) -> f64 {
        let norm_a = dot(a, a).sqrt();
        let norm_b = dot(b, b).sqrt();
        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }
        dot(a, b) / (norm_a * norm_b)
    }
}

impl SimilarityFunction for CosineSimilarity {
    fn similarity(
        &self,
        _coords_a: RetentionCoords,
        _coords_b: RetentionCoords,
        features_a: &[f64],
        features_b: &[f64],
    ) -> f64 {
        Self::score(features_a, features_b)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DotProduct;

impl SimilarityFunction for DotProduct {
    fn similarity(
        &self,
        _coords_a: RetentionCoords,
        _coords_b: RetentionCoords,
        features_a: &[f64],
        features_b: &[f64],
    ) -> f64 {
        dot(features_a, features_b)
    }
}

/// Gaussian penalty on the retention time difference.
///
/// The tolerance is the difference (in seconds) at which the penalty reaches 0.5,
/// ie. the half width at half maximum. The second dimension is only used when
/// both peaks have one and `rt2_tolerance` is set. Results below `cutoff` are 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaussianRtSimilarity {
    pub rt_tolerance: f64,
    #[serde(default)]
    pub rt2_tolerance: Option<f64>,
    #[serde(default)]
    pub cutoff: f64,
}

impl GaussianRtSimilarity {
    pub fn new(rt_tolerance: f64) -> Self {
        Self {
            rt_tolerance,
            rt2_tolerance: None,
            cutoff: 0.0,
        }
    }

    fn penalty(delta: f64, tolerance: f64) -> f64 {
        // HWHM = sigma * sqrt(2 ln 2)
        let sigma = tolerance / (2.0 * std::f64::consts::LN_2).sqrt();
        (-(delta * delta) / (2.0 * sigma * sigma)).exp()
    }

    pub fn score(&self, a: RetentionCoords, b: RetentionCoords) -> f64 {
        let mut out = Self::penalty(a.first - b.first, self.rt_tolerance);
        if let (Some(tol), Some(sa), Some(sb)) = (self.rt2_tolerance, a.second, b.second) {
            out *= Self::penalty(sa - sb, tol);
        }
        if out < self.cutoff { 0.0 } else { out }
    }
}

impl SimilarityFunction for GaussianRtSimilarity {
    fn similarity(
        &self,
        coords_a: RetentionCoords,
        coords_b: RetentionCoords,
        _features_a: &[f64],
        _features_b: &[f64],
    ) -> f64 {
        self.score(coords_a, coords_b)
    }
}

/// Product of two similarities, typically spectrum shape times retention time penalty.
#[derive(Debug, Clone, Copy)]
pub struct ProductSimilarity<A, B> {
    pub first: A,
    pub second: B,
}

impl<A, B> ProductSimilarity<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A: SimilarityFunction, B: SimilarityFunction> SimilarityFunction for ProductSimilarity<A, B> {
    fn similarity(
        &self,
        coords_a: RetentionCoords,
        coords_b: RetentionCoords,
        features_a: &[f64],
        features_b: &[f64],
    ) -> f64 {
        let first = self
            .first
            .similarity(coords_a, coords_b, features_a, features_b);
        if first == 0.0 {
            return 0.0;
        }
        first
            * self
                .second
                .similarity(coords_a, coords_b, features_a, features_b)
    }
}

/// Serializable choice of the similarity a host uses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimilarityConfig {
    Cosine,
    Dot,
    CosineGaussian(GaussianRtSimilarity),
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        SimilarityConfig::CosineGaussian(GaussianRtSimilarity::new(5.0))
    }
}

impl SimilarityFunction for SimilarityConfig {
    fn similarity(
        &self,
        coords_a: RetentionCoords,
        coords_b: RetentionCoords,
        features_a: &[f64],
        features_b: &[f64],
    ) -> f64 {
        match self {
            SimilarityConfig::Cosine => CosineSimilarity::score(features_a, features_b),
            SimilarityConfig::Dot => dot(features_a, features_b),
            SimilarityConfig::CosineGaussian(g) => ProductSimilarity::new(CosineSimilarity, *g)
                .similarity(coords_a, coords_b, features_a, features_b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine() {
        assert!((CosineSimilarity::score(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-12);
        assert_eq!(CosineSimilarity::score(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(CosineSimilarity::score(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        let s = CosineSimilarity::score(&[1.0, 1.0], &[1.0, 0.0]);
        assert!((s - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);
    }

    #[test]
    fn test_gaussian_half_max_at_tolerance() {
        let g = GaussianRtSimilarity::new(4.0);
        let at_tol = g.score(RetentionCoords::new(10.0), RetentionCoords::new(14.0));
        assert!((at_tol - 0.5).abs() < 1e-12, "{at_tol}");
        let same = g.score(RetentionCoords::new(10.0), RetentionCoords::new(10.0));
        assert_eq!(same, 1.0);
    }

    #[test]
    fn test_gaussian_second_dimension_and_cutoff() {
        let g = GaussianRtSimilarity {
            rt_tolerance: 4.0,
            rt2_tolerance: Some(0.1),
            cutoff: 0.3,
        };
        let a = RetentionCoords::two_dimensional(10.0, 1.0);
        let b = RetentionCoords::two_dimensional(14.0, 1.1);
        // 0.5 * 0.5 falls below the cutoff
        assert_eq!(g.score(a, b), 0.0);
        // No second dimension on one side, only the first is used
        assert!((g.score(a, RetentionCoords::new(14.0)) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_closure_and_product() {
        let constant = |_: RetentionCoords, _: RetentionCoords, _: &[f64], _: &[f64]| 0.5;
        let prod = ProductSimilarity::new(CosineSimilarity, constant);
        let c = RetentionCoords::new(0.0);
        assert_eq!(prod.similarity(c, c, &[1.0], &[2.0]), 0.5);
        assert_eq!(prod.similarity(c, c, &[1.0, 0.0], &[0.0, 2.0]), 0.0);
    }

    #[test]
    fn test_config_deserializes() {
        let conf: SimilarityConfig = serde_json::from_str(
            r#"{"type": "cosine_gaussian", "rt_tolerance": 3.0, "rt2_tolerance": 0.2}"#,
        )
        .unwrap();
        assert_eq!(
            conf,
            SimilarityConfig::CosineGaussian(GaussianRtSimilarity {
                rt_tolerance: 3.0,
                rt2_tolerance: Some(0.2),
                cutoff: 0.0,
            })
        );
        let conf: SimilarityConfig = serde_json::from_str(r#"{"type": "cosine"}"#).unwrap();
        assert_eq!(conf, SimilarityConfig::Cosine);
    }
}
