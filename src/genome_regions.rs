use std::collections::HashMap;

use bio::data_structures::interval_tree::IntervalTree;

/// A set of regions on one chromosome which can be efficiently queried
///
#[derive(Clone)]
pub struct ChromRegions {
    regions: IntervalTree<i64, u8>,
}

impl Default for ChromRegions {
    fn default() -> Self {
        Self::new()
    }
}

impl ChromRegions {
    pub fn new() -> Self {
        Self {
            regions: IntervalTree::new(),
        }
    }

    /// Return true if the start-end range intersects any stored region
    ///
    pub fn intersect(&self, start: i64, end: i64) -> bool {
        self.regions.find(start..end).next().is_some()
    }

    /// Add a region; regions are not collapsed
    pub fn add_region(&mut self, start: i64, end: i64) {
        self.regions.insert(start..end, Default::default());
    }
}

/// Exclusion regions for the whole genome, keyed by chromosome label
///
#[derive(Clone, Default)]
pub struct GenomeRegions {
    pub chroms: HashMap<String, ChromRegions>,
}

impl GenomeRegions {
    pub fn new() -> Self {
        Self {
            chroms: HashMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.chroms.is_empty()
    }

    /// Add a region
    ///
    /// # Arguments
    /// * `start` - the start coordinate (included)
    /// * `end` - the end coordinate (excluded)
    ///
    pub fn add_region(&mut self, chrom: &str, start: i64, end: i64) {
        self.chroms
            .entry(chrom.to_string())
            .or_default()
            .add_region(start, end);
    }

    /// Return true if the start-end range on `chrom` intersects any stored region
    ///
    pub fn intersect(&self, chrom: &str, start: i64, end: i64) -> bool {
        match self.chroms.get(chrom) {
            Some(chrom_regions) => chrom_regions.intersect(start, end),
            None => false,
        }
    }
}
