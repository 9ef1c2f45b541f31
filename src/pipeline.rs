//! Staged orchestration of the CNV calling pipeline
//!

use std::collections::HashSet;

use itertools::Itertools;
use log::info;
use serde::{Deserialize, Serialize};
use simple_error::{SimpleResult, bail};

use crate::caller::{CnvRange, NEUTRAL_COPY_NUMBER, ResultData, detect_seeds};
use crate::compact::{apply_compaction, plan_compaction};
use crate::correlation::compute_sample_correlations;
use crate::extend::extend_ranges;
use crate::genome_regions::GenomeRegions;
use crate::merge::{bridge_range_gaps, merge_contiguous_ranges};
use crate::normalize::{count_chrom_classes, normalize_samples};
use crate::reference::build_reference_profiles;
use crate::region::Region;
use crate::region_qc::{apply_region_qc, cohort_average_depth};
use crate::run_stats::CnvRunStats;
use crate::sample::Sample;
use crate::settings::{CnvSettings, validate_settings};
use crate::stats;

/// One target region as delivered by the external loader
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RegionInput {
    pub chrom: String,
    pub start: i64,
    pub end: i64,
}

/// One sample's raw coverage as delivered by the external loader
///
/// `doc` must align 1:1 with the region list.
///
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SampleInput {
    pub name: String,
    pub reference_eligible: bool,
    pub doc: Vec<f64>,
}

/// Complete in-memory result model of one calling run
///
/// Removed samples and regions are carried for reporting only.
///
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CnvCallResults {
    pub samples: Vec<Sample>,
    pub removed_samples: Vec<Sample>,
    pub regions: Vec<Region>,
    pub removed_regions: Vec<Region>,

    /// One entry per surviving (sample, region) pair, ordered by sample,
    /// then region
    pub results: Vec<ResultData>,

    /// The reported CNV events
    pub ranges: Vec<CnvRange>,

    pub stats: CnvRunStats,
}

impl CnvCallResults {
    /// Number of CNV events per surviving sample
    pub fn cnv_counts_per_sample(&self) -> Vec<usize> {
        let mut counts = vec![0; self.samples.len()];
        for range in self.ranges.iter() {
            counts[range.sample] += 1;
        }
        counts
    }

    /// Number of CNV events touching each surviving region with a non-neutral
    /// copy estimate
    pub fn cnv_counts_per_region(&self) -> Vec<usize> {
        let mut counts = vec![0; self.regions.len()];
        for range in self.ranges.iter() {
            for result in &self.results[range.start..=range.end] {
                if result.copies != NEUTRAL_COPY_NUMBER {
                    counts[result.region] += 1;
                }
            }
        }
        counts
    }

    /// MAD of each surviving sample's z-scores about zero, a dispersion
    /// summary reporters attach to the sample table
    pub fn sample_z_mad(&self) -> Vec<f64> {
        let mut out = vec![f64::NAN; self.samples.len()];
        for (sample, chunk) in &self.results.iter().chunk_by(|r| r.sample) {
            let zs = chunk.map(|r| r.z).collect::<Vec<_>>();
            out[sample] = stats::mad(&zs, 0.0);
        }
        out
    }
}

/// Check region-list contract violations and build the region entities
///
/// The loader guarantees (chromosome, start, end) order; this re-checks the
/// guarantee instead of trusting it, since a violation would corrupt every
/// adjacency-based stage downstream.
///
fn build_region_list(inputs: &[RegionInput]) -> SimpleResult<Vec<Region>> {
    if inputs.is_empty() {
        bail!("Region list is empty");
    }

    let mut regions = Vec::with_capacity(inputs.len());
    let mut seen_chroms = HashSet::new();
    let mut chrom_index = 0;
    for (i, input) in inputs.iter().enumerate() {
        if input.start > input.end {
            bail!(
                "Region {}:{}-{} has negative length",
                input.chrom,
                input.start,
                input.end
            );
        }
        if i == 0 {
            seen_chroms.insert(input.chrom.clone());
        } else {
            let prev = &inputs[i - 1];
            if input.chrom == prev.chrom {
                if (input.start, input.end) < (prev.start, prev.end) {
                    bail!(
                        "Region list not sorted by position: {}:{}-{} after {}:{}-{}",
                        input.chrom,
                        input.start,
                        input.end,
                        prev.chrom,
                        prev.start,
                        prev.end
                    );
                }
            } else {
                chrom_index += 1;
                if !seen_chroms.insert(input.chrom.clone()) {
                    bail!(
                        "Region list not sorted: chromosome '{}' appears in more than one block",
                        input.chrom
                    );
                }
            }
        }
        regions.push(Region::new(
            input.chrom.clone(),
            chrom_index,
            input.start,
            input.end,
            i,
        ));
    }
    Ok(regions)
}

/// Check sample-list contract violations and build the sample entities
fn build_sample_list(
    inputs: Vec<SampleInput>,
    region_count: usize,
    settings: &CnvSettings,
) -> SimpleResult<Vec<Sample>> {
    let eligible = inputs.iter().filter(|s| s.reference_eligible).count();
    if eligible < settings.cohort_size + 1 {
        bail!(
            "At least {} reference-eligible samples are required for a reference cohort size of {}, got {}",
            settings.cohort_size + 1,
            settings.cohort_size,
            eligible
        );
    }

    for input in inputs.iter() {
        if input.doc.len() != region_count {
            bail!(
                "Sample '{}' carries {} coverage values, expected {}",
                input.name,
                input.doc.len(),
                region_count
            );
        }
        if let Some(pos) = input.doc.iter().position(|v| !v.is_finite()) {
            bail!(
                "Sample '{}' carries a non-finite coverage value at region index {}",
                input.name,
                pos
            );
        }
    }

    Ok(inputs
        .into_iter()
        .map(|input| Sample::new(input.name, input.reference_eligible, input.doc))
        .collect())
}

/// Run the full calling pipeline over one cohort
///
/// Input-contract violations are reported as errors before any entity is
/// mutated; internal-consistency failures inside the stages abort the run.
///
pub fn run_cnv_pipeline(
    settings: &CnvSettings,
    region_inputs: &[RegionInput],
    sample_inputs: Vec<SampleInput>,
    excluded: Option<&GenomeRegions>,
) -> SimpleResult<CnvCallResults> {
    validate_settings(settings)?;
    let mut regions = build_region_list(region_inputs)?;
    let mut samples = build_sample_list(sample_inputs, regions.len(), settings)?;

    let class_counts = count_chrom_classes(&regions);
    info!(
        "Normalizing coverage over {} autosomal regions, {} on chrX, {} on chrY (ignored), {} on other contigs (ignored)",
        class_counts.autosome, class_counts.chrx, class_counts.chry, class_counts.other
    );
    normalize_samples(&mut samples, &regions, settings);
    if samples.iter().all(|s| !s.passes_qc()) {
        bail!("Every sample failed the depth QC check");
    }

    let avg_abs_cov = cohort_average_depth(&samples);
    let flagged_regions = apply_region_qc(&samples, &mut regions, avg_abs_cov, excluded, settings);
    info!("Region QC flagged {flagged_regions} of {} regions", regions.len());

    compute_sample_correlations(&mut samples);
    let flagged_samples = build_reference_profiles(&mut samples, &regions, settings);
    info!("Sample QC flagged {flagged_samples} of {} samples", samples.len());

    let plan = plan_compaction(&samples, &regions);
    let cohort = apply_compaction(&plan, samples, regions);

    let mut detection = detect_seeds(&cohort.samples, &cohort.regions, avg_abs_cov, settings);
    let seed_count = detection.ranges.len();
    info!("Detected {seed_count} seed regions");

    let extended_region_count = extend_ranges(
        &mut detection.results,
        &mut detection.ranges,
        &cohort.samples,
        &cohort.regions,
        settings,
    );
    info!("Extended seeds to {extended_region_count} additional regions");

    let range_count_before_merge = detection.ranges.len();
    merge_contiguous_ranges(&mut detection.ranges, &detection.results, &cohort.regions);
    bridge_range_gaps(
        &mut detection.ranges,
        &mut detection.results,
        &cohort.samples,
        &cohort.regions,
        settings,
    );
    info!(
        "Merged {range_count_before_merge} ranges into {} CNV events",
        detection.ranges.len()
    );

    let ref_correls = cohort
        .samples
        .iter()
        .map(|s| s.ref_correl)
        .collect::<Vec<_>>();

    let stats = CnvRunStats {
        region_count: cohort.regions.len(),
        removed_region_count: cohort.removed_regions.len(),
        sample_count: cohort.samples.len(),
        removed_sample_count: cohort.removed_samples.len(),
        seed_count,
        copy_number_conflict_count: detection.copy_number_conflicts,
        extended_region_count,
        range_count_before_merge,
        range_count: detection.ranges.len(),
        mean_ref_correl: stats::mean(&ref_correls),
    };

    Ok(CnvCallResults {
        samples: cohort.samples,
        removed_samples: cohort.removed_samples,
        regions: cohort.regions,
        removed_regions: cohort.removed_regions,
        results: detection.results,
        ranges: detection.ranges,
        stats,
    })
}
