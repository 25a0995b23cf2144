pub mod clique;
pub mod peak;

pub use clique::{
    Clique,
    Reliability,
    Slot,
    UnorderedPair,
};
pub use peak::{
    Peak,
    PeakList,
    RetentionCoords,
    SpectrumSelector,
};
