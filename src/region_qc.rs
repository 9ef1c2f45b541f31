use crate::genome_regions::GenomeRegions;
use crate::region::{ChromClass, Region};
use crate::sample::Sample;
use crate::settings::CnvSettings;
use crate::stats;

/// Mean absolute depth over QC-passing samples
///
/// Used to translate normalized region coverage back to an absolute scale.
///
pub fn cohort_average_depth(samples: &[Sample]) -> f64 {
    let depths = samples
        .iter()
        .filter(|s| s.passes_qc())
        .map(|s| s.doc_mean)
        .collect::<Vec<_>>();
    stats::mean(&depths)
}

/// Compute per-region coverage statistics and flag unreliable regions
///
/// Statistics only use QC-passing samples. Returns the number of flagged
/// regions.
///
/// Panics if a QC-passing sample carries a non-finite normalized value,
/// which indicates an upstream logic error.
///
pub fn apply_region_qc(
    samples: &[Sample],
    regions: &mut [Region],
    avg_abs_cov: f64,
    excluded: Option<&GenomeRegions>,
    settings: &CnvSettings,
) -> usize {
    let mut flagged = 0;
    let mut values = Vec::with_capacity(samples.len());
    for region in regions.iter_mut() {
        values.clear();
        for sample in samples.iter().filter(|s| s.passes_qc()) {
            let value = sample.doc[region.index];
            assert!(
                value.is_finite(),
                "Normalized coverage value is invalid for sample '{}' in region '{}': {}",
                sample.name,
                region,
                value
            );
            values.push(value);
        }
        values.sort_by(f64::total_cmp);
        let median = stats::median_sorted(&values);
        let mad = stats::MAD_SCALE * stats::mad(&values, median);

        if median < settings.min_normalized_cov {
            region
                .qc
                .push_str(&format!("ncov<{} ", settings.min_normalized_cov));
        }
        if median * avg_abs_cov < settings.min_absolute_cov {
            region
                .qc
                .push_str(&format!("cov<{} ", settings.min_absolute_cov));
        }
        if mad / median > settings.max_cv {
            region.qc.push_str(&format!("cv>{} ", settings.max_cv));
        }
        if let Some(excluded) = excluded {
            if excluded.intersect(&region.chrom, region.start, region.end + 1) {
                region.qc.push_str("excluded ");
            }
        }
        if region.chrom_class == ChromClass::ChrY {
            region.qc.push_str("chrY ");
        }

        region.median = median;
        region.mad = mad;
        if !region.passes_qc() {
            flagged += 1;
        }
    }
    flagged
}
