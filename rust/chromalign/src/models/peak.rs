use serde::{
    Deserialize,
    Serialize,
};
use std::sync::Arc;

/// Retention time coordinates of a peak.
///
/// `second` is only set for two-dimensional chromatography.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RetentionCoords {
    pub first: f64,
    pub second: Option<f64>,
}

impl RetentionCoords {
    pub fn new(first: f64) -> Self {
        Self {
            first,
            second: None,
        }
    }

    pub fn two_dimensional(first: f64, second: f64) -> Self {
        Self {
            first,
            second: Some(second).filter(|x| !x.is_nan()),
        }
    }
}

/// Which spectrum of a peak the similarity function sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpectrumSelector {
    Seed,
    Mean,
}

impl SpectrumSelector {
    pub fn from_use_mean(use_mean_spectrum: bool) -> Self {
        if use_mean_spectrum {
            SpectrumSelector::Mean
        } else {
            SpectrumSelector::Seed
        }
    }
}

/// A detected peak in one chromatogram.
///
/// Peaks are handed over by an upstream peak picker and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    /// First dimension retention time, in seconds.
    pub rt: f64,
    /// Second dimension retention time, in seconds.
    #[serde(default)]
    pub rt2: Option<f64>,
    /// Spectrum at the apex scan.
    #[serde(default)]
    pub seed_spectrum: Vec<f64>,
    /// Spectrum averaged over the peak.
    #[serde(default)]
    pub mean_spectrum: Vec<f64>,
    #[serde(default)]
    pub area: Option<f64>,
    /// Name of the chromatogram this peak was detected in.
    #[serde(default = "empty_name")]
    pub chromatogram: Arc<str>,
}

fn empty_name() -> Arc<str> {
    Arc::from("")
}

impl Peak {
    pub fn new(rt: f64, spectrum: Vec<f64>) -> Self {
        Self {
            rt,
            rt2: None,
            seed_spectrum: spectrum.clone(),
            mean_spectrum: spectrum,
            area: None,
            chromatogram: empty_name(),
        }
    }

    pub fn with_rt2(mut self, rt2: f64) -> Self {
        self.rt2 = Some(rt2).filter(|x| !x.is_nan());
        self
    }

    pub fn with_area(mut self, area: f64) -> Self {
        self.area = Some(area);
        self
    }

    pub fn coords(&self) -> RetentionCoords {
        RetentionCoords {
            first: self.rt,
            second: self.rt2.filter(|x| !x.is_nan()),
        }
    }

    pub fn spectrum(&self, selector: SpectrumSelector) -> &[f64] {
        match selector {
            SpectrumSelector::Seed => &self.seed_spectrum,
            SpectrumSelector::Mean => &self.mean_spectrum,
        }
    }

    /// Peak area when known, total intensity of the mean spectrum otherwise.
    pub fn abundance(&self) -> f64 {
        match self.area {
            Some(x) => x,
            None => self.mean_spectrum.iter().sum(),
        }
    }
}

/// The peaks of one chromatogram in detection order.
///
/// The matcher expects the peaks to be sorted by first retention time
/// but never checks it, see [`crate::bbh::find_best_hit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakList {
    pub name: Arc<str>,
    pub peaks: Vec<Peak>,
}

impl PeakList {
    /// Builds a peak list and stamps the chromatogram name on every peak.
    pub fn new(name: impl Into<Arc<str>>, peaks: Vec<Peak>) -> Self {
        let mut out = Self {
            name: name.into(),
            peaks,
        };
        out.stamp_names();
        out
    }

    /// Re-applies the list name to the peaks, needed after deserialization
    /// since the peaks in a document usually omit it.
    pub fn stamp_names(&mut self) {
        for peak in self.peaks.iter_mut() {
            if peak.chromatogram.is_empty() {
                peak.chromatogram = self.name.clone();
            }
        }
    }

    pub fn len(&self) -> usize {
        self.peaks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Peak> {
        self.peaks.get(index)
    }

    pub fn as_slice(&self) -> &[Peak] {
        &self.peaks
    }

    pub fn is_rt_sorted(&self) -> bool {
        self.peaks.windows(2).all(|w| w[0].rt <= w[1].rt)
    }
}
