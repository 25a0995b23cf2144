use super::peak::{
    Peak,
    PeakList,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// The entry of a chromatogram inside a clique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    /// Index of the peak in that chromatogram's peak list.
    Present(usize),
    Absent,
}

impl Slot {
    pub fn index(&self) -> Option<usize> {
        match self {
            Slot::Present(x) => Some(*x),
            Slot::Absent => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Slot::Present(_))
    }
}

/// Running min/max/product over the similarities that built a clique.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reliability {
    pub min: f64,
    pub max: f64,
    pub product: f64,
    pub count: usize,
}

impl Default for Reliability {
    fn default() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            product: 1.0,
            count: 0,
        }
    }
}

impl Reliability {
    pub fn update(&mut self, similarity: f64) {
        self.min = self.min.min(similarity);
        self.max = self.max.max(similarity);
        self.product *= similarity;
        self.count += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Key for metadata between two labels where order does not matter.
///
/// The labels are stored sorted, so `("b", "a")` and `("a", "b")` are the same key.
/// Serializes as `"first|second"` so it can be used as a JSON map key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct UnorderedPair {
    first: Arc<str>,
    second: Arc<str>,
}

impl UnorderedPair {
    pub fn new(a: impl Into<Arc<str>>, b: impl Into<Arc<str>>) -> Self {
        let a = a.into();
        let b = b.into();
        if a <= b {
            Self {
                first: a,
                second: b,
            }
        } else {
            Self {
                first: b,
                second: a,
            }
        }
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn second(&self) -> &str {
        &self.second
    }
}

impl From<UnorderedPair> for String {
    fn from(x: UnorderedPair) -> Self {
        format!("{}|{}", x.first, x.second)
    }
}

impl TryFrom<String> for UnorderedPair {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.split_once('|') {
            Some((a, b)) => Ok(UnorderedPair::new(a, b)),
            None => Err(format!("Expected a 'label|label' pair, got '{}'", value)),
        }
    }
}

/// A group of peaks, at most one per chromatogram, believed to be the same compound.
///
/// There is always one slot per chromatogram; missing chromatograms are [`Slot::Absent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clique {
    slots: Vec<Slot>,
    pub reliability: Reliability,
    /// Abundance ratios between classes, stored as `first / second` of the key.
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub ratios: BTreeMap<UnorderedPair, f64>,
}

impl Clique {
    pub fn empty(num_chromatograms: usize) -> Self {
        Self {
            slots: vec![Slot::Absent; num_chromatograms],
            reliability: Reliability::default(),
            ratios: BTreeMap::new(),
        }
    }

    pub fn singleton(num_chromatograms: usize, chromatogram: usize, index: usize) -> Self {
        let mut out = Self::empty(num_chromatograms);
        out.slots[chromatogram] = Slot::Present(index);
        out
    }

    pub(crate) fn set(&mut self, chromatogram: usize, index: usize) {
        self.slots[chromatogram] = Slot::Present(index);
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot(&self, chromatogram: usize) -> Slot {
        self.slots.get(chromatogram).copied().unwrap_or(Slot::Absent)
    }

    pub fn num_chromatograms(&self) -> usize {
        self.slots.len()
    }

    /// Number of chromatograms that contribute a peak.
    pub fn num_present(&self) -> usize {
        self.slots.iter().filter(|x| x.is_present()).count()
    }

    pub fn is_singleton(&self) -> bool {
        self.num_present() == 1
    }

    /// `(chromatogram, peak index)` for every present member, in chromatogram order.
    pub fn members(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(c, s)| s.index().map(|i| (c, i)))
    }

    /// Resolves the members against the peak lists the clique was built from.
    pub fn peaks<'a>(&'a self, lists: &'a [PeakList]) -> impl Iterator<Item = (usize, &'a Peak)> + 'a {
        self.members()
            .filter_map(move |(c, i)| lists.get(c).and_then(|l| l.get(i)).map(|p| (c, p)))
    }

    /// Mean and (population) variance of the first retention time of the members.
    pub fn rt_stats(&self, lists: &[PeakList]) -> Option<(f64, f64)> {
        let rts: Vec<f64> = self.peaks(lists).map(|(_, p)| p.rt).collect();
        if rts.is_empty() {
            return None;
        }
        let n = rts.len() as f64;
        let mean = rts.iter().sum::<f64>() / n;
        let var = rts.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        Some((mean, var))
    }

    /// Fills [`Clique::ratios`] from a class label per chromatogram.
    ///
    /// For every pair of distinct labels with members on both sides the mean
    /// abundance of the first label is divided by the mean abundance of the second.
    /// Pairs with a zero denominator are skipped.
    pub fn compute_ratios(&mut self, lists: &[PeakList], labels: &[Arc<str>]) {
        let mut per_label: BTreeMap<Arc<str>, (f64, usize)> = BTreeMap::new();
        for (c, peak) in self.peaks(lists) {
            let Some(label) = labels.get(c) else {
                continue;
            };
            let entry = per_label.entry(label.clone()).or_insert((0.0, 0));
            entry.0 += peak.abundance();
            entry.1 += 1;
        }

        let means: Vec<(Arc<str>, f64)> = per_label
            .into_iter()
            .map(|(k, (sum, n))| (k, sum / n as f64))
            .collect();

        self.ratios.clear();
        for (i, (la, ma)) in means.iter().enumerate() {
            for (lb, mb) in means.iter().skip(i + 1) {
                // Labels come out of the BTreeMap sorted, so `la < lb` and
                // the key order matches the ratio order.
                if *mb == 0.0 {
                    continue;
                }
                self.ratios
                    .insert(UnorderedPair::new(la.clone(), lb.clone()), ma / mb);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unordered_pair_is_symmetric() {
        assert_eq!(UnorderedPair::new("b", "a"), UnorderedPair::new("a", "b"));
        let pair = UnorderedPair::new("ctrl", "case");
        assert_eq!(pair.first(), "case");
        assert_eq!(pair.second(), "ctrl");

        let as_str: String = pair.clone().into();
        assert_eq!(as_str, "case|ctrl");
        assert_eq!(UnorderedPair::try_from(as_str).unwrap(), pair);
        assert!(UnorderedPair::try_from("nope".to_string()).is_err());
    }

    #[test]
    fn test_reliability_widens() {
        let mut rel = Reliability::default();
        assert!(rel.is_empty());
        rel.update(0.9);
        rel.update(0.5);
        rel.update(0.8);
        assert_eq!(rel.min, 0.5);
        assert_eq!(rel.max, 0.9);
        assert!((rel.product - 0.36).abs() < 1e-12);
        assert_eq!(rel.count, 3);
    }

    #[test]
    fn test_members_and_stats() {
        let lists = vec![
            PeakList::new("a", vec![Peak::new(10.0, vec![1.0]).with_area(2.0)]),
            PeakList::new("b", vec![Peak::new(11.0, vec![1.0]).with_area(4.0)]),
            PeakList::new("c", vec![Peak::new(12.0, vec![1.0]).with_area(8.0)]),
        ];
        let mut clique = Clique::singleton(3, 0, 0);
        clique.set(2, 0);
        assert_eq!(clique.members().collect::<Vec<_>>(), vec![(0, 0), (2, 0)]);
        assert_eq!(clique.slot(1), Slot::Absent);
        assert_eq!(clique.num_present(), 2);

        let (mean, var) = clique.rt_stats(&lists).unwrap();
        assert_eq!(mean, 11.0);
        assert_eq!(var, 1.0);

        let labels: Vec<Arc<str>> = vec!["case".into(), "case".into(), "ctrl".into()];
        clique.compute_ratios(&lists, &labels);
        let ratio = clique.ratios[&UnorderedPair::new("ctrl", "case")];
        assert_eq!(ratio, 2.0 / 8.0);
    }
}
