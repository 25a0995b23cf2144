use nohash_hasher::IntSet;

/// Per chromatogram set of peak indices that already belong to a clique.
///
/// Owned by the caller of the matcher and threaded through every chain
/// growing step, so a peak can never land in two cliques.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsumedSets {
    sets: Vec<IntSet<usize>>,
}

impl ConsumedSets {
    pub fn new(num_chromatograms: usize) -> Self {
        Self {
            sets: vec![IntSet::default(); num_chromatograms],
        }
    }

    pub fn contains(&self, chromatogram: usize, index: usize) -> bool {
        self.sets
            .get(chromatogram)
            .is_some_and(|s| s.contains(&index))
    }

    /// Marks a peak as used, returns false if it already was.
    pub fn insert(&mut self, chromatogram: usize, index: usize) -> bool {
        match self.sets.get_mut(chromatogram) {
            Some(s) => s.insert(index),
            None => false,
        }
    }

    pub fn len(&self, chromatogram: usize) -> usize {
        self.sets.get(chromatogram).map(|s| s.len()).unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.sets.iter().map(|s| s.len()).sum()
    }

    pub fn num_chromatograms(&self) -> usize {
        self.sets.len()
    }

    pub fn clear(&mut self) {
        self.sets.iter_mut().for_each(|s| s.clear());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_clear() {
        let mut c = ConsumedSets::new(2);
        assert!(c.insert(0, 3));
        assert!(!c.insert(0, 3));
        assert!(c.contains(0, 3));
        assert!(!c.contains(1, 3));
        assert!(!c.insert(5, 0));
        assert!(!c.contains(5, 0));
        assert_eq!(c.total(), 1);
        c.clear();
        assert_eq!(c.total(), 0);
        assert_eq!(c.num_chromatograms(), 2);
    }
}
