use crate::region::Region;
use crate::sample::Sample;

/// Kept/removed partition of samples and regions by QC-flag state
///
/// Pure function of the frozen QC state; materialization happens separately
/// so each phase can be verified on its own.
///
#[derive(Clone, Debug)]
pub struct CompactionPlan {
    pub kept_samples: Vec<usize>,
    pub removed_samples: Vec<usize>,
    pub kept_regions: Vec<usize>,
    pub removed_regions: Vec<usize>,
}

pub fn plan_compaction(samples: &[Sample], regions: &[Region]) -> CompactionPlan {
    let (kept_samples, removed_samples) =
        (0..samples.len()).partition(|&s| samples[s].passes_qc());
    let (kept_regions, removed_regions) =
        (0..regions.len()).partition(|&e| regions[e].passes_qc());
    CompactionPlan {
        kept_samples,
        removed_samples,
        kept_regions,
        removed_regions,
    }
}

/// Cohort state after compaction
///
/// Removed entities remain reachable for reporting only; no statistical
/// stage reads them again.
///
pub struct CompactedCohort {
    pub samples: Vec<Sample>,
    pub removed_samples: Vec<Sample>,
    pub regions: Vec<Region>,
    pub removed_regions: Vec<Region>,
}

/// Materialize the kept/removed partition
///
/// Every surviving sample's coverage vectors are compacted in lock-step with
/// the region list, and each surviving region's `index` is reassigned to its
/// position in the surviving list. Downstream stages never observe a stale
/// index.
///
pub fn apply_compaction(
    plan: &CompactionPlan,
    samples: Vec<Sample>,
    regions: Vec<Region>,
) -> CompactedCohort {
    let mut kept_sample_flags = vec![false; samples.len()];
    for &s in plan.kept_samples.iter() {
        kept_sample_flags[s] = true;
    }

    let mut kept = Vec::with_capacity(plan.kept_samples.len());
    let mut removed = Vec::with_capacity(plan.removed_samples.len());
    for (s, mut sample) in samples.into_iter().enumerate() {
        if kept_sample_flags[s] {
            sample.doc = plan.kept_regions.iter().map(|&e| sample.doc[e]).collect();
            sample.ref_doc = plan
                .kept_regions
                .iter()
                .map(|&e| sample.ref_doc[e])
                .collect();
            sample.ref_stdev = plan
                .kept_regions
                .iter()
                .map(|&e| sample.ref_stdev[e])
                .collect();
            kept.push(sample);
        } else {
            removed.push(sample);
        }
    }

    let mut kept_region_flags = vec![false; regions.len()];
    for &e in plan.kept_regions.iter() {
        kept_region_flags[e] = true;
    }

    let mut kept_regions = Vec::with_capacity(plan.kept_regions.len());
    let mut removed_regions = Vec::with_capacity(plan.removed_regions.len());
    for (e, mut region) in regions.into_iter().enumerate() {
        if kept_region_flags[e] {
            region.index = kept_regions.len();
            kept_regions.push(region);
        } else {
            removed_regions.push(region);
        }
    }

    CompactedCohort {
        samples: kept,
        removed_samples: removed,
        regions: kept_regions,
        removed_regions,
    }
}
