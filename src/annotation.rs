use std::collections::HashMap;

use itertools::Itertools;

use crate::caller::{CnvRange, ResultData};
use crate::region::Region;

/// Flanking margin in bases applied to every gene lookup
pub const ANNOTATION_FLANK: i64 = 20;

/// External gene-name lookup
///
/// A pure keyed query with no effect on calling; implementations typically
/// wrap a gene database client.
///
pub trait GeneAnnotator {
    /// Names of genes overlapping the given interval, extended by `flank`
    /// bases on each side
    fn genes_overlapping(&self, chrom: &str, start: i64, end: i64, flank: i64) -> Vec<String>;
}

/// Caches annotator answers by region identity
///
/// Region identity never changes after load, so entries stay valid for the
/// whole run.
///
pub struct CachedGeneAnnotator<A> {
    inner: A,
    cache: HashMap<String, Vec<String>>,
}

impl<A: GeneAnnotator> CachedGeneAnnotator<A> {
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            cache: HashMap::new(),
        }
    }

    pub fn genes_for_region(&mut self, region: &Region) -> Vec<String> {
        let key = region.to_string();
        if let Some(genes) = self.cache.get(&key) {
            return genes.clone();
        }
        let genes =
            self.inner
                .genes_overlapping(&region.chrom, region.start, region.end, ANNOTATION_FLANK);
        self.cache.insert(key, genes.clone());
        genes
    }
}

/// Sorted, deduplicated gene names overlapping any region of a range
///
pub fn range_gene_names<A: GeneAnnotator>(
    annotator: &mut CachedGeneAnnotator<A>,
    results: &[ResultData],
    regions: &[Region],
    range: &CnvRange,
) -> Vec<String> {
    (range.start..=range.end)
        .flat_map(|i| annotator.genes_for_region(&regions[results[i].region]))
        .sorted()
        .dedup()
        .collect()
}
