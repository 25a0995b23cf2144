#![doc = include_str!("../README.md")]

pub mod bbh;
pub mod config;
pub mod dtw;
pub mod errors;
pub mod matrix;
pub mod models;
pub mod path;
pub mod similarity;

// Re-export main structures
pub use crate::bbh::{
    BbhMatcher,
    ConsumedSets,
    Hit,
};
pub use crate::config::{
    AlignmentConfig,
    MatchingConfig,
};
pub use crate::dtw::{
    Alignment,
    Objective,
    PairwiseAligner,
    Step,
    WarpPath,
    align_pairs,
};
pub use crate::errors::{
    AlignmentError,
    ChromAlignError,
    MatchingError,
    Result,
};
pub use crate::matrix::{
    AlignmentMatrix,
    StorageKind,
};
pub use crate::models::{
    Clique,
    Peak,
    PeakList,
    Slot,
};
pub use crate::path::Anchor;

// Re-export traits
pub use crate::similarity::SimilarityFunction;
