use crate::region::Region;
use crate::sample::Sample;
use crate::settings::CnvSettings;
use crate::stats;

/// Outlier band around the cohort region median; candidate values outside it
/// never enter a constructed reference
const OUTLIER_BAND_LOW: f64 = 0.25;
const OUTLIER_BAND_HIGH: f64 = 1.75;

/// Floor on the constructed reference spread, as a fraction of the
/// reference value; prevents near-zero spreads from producing unstable
/// z-scores
const MIN_SPREAD_FRACTION: f64 = 0.1;

/// Spread assigned to the cohort-median fallback reference
const FALLBACK_SPREAD_FRACTION: f64 = 0.3;

/// Reference value and spread for one (sample, region) pair
///
fn build_region_reference(
    sample: &Sample,
    samples: &[Sample],
    region: &Region,
    cohort_size: usize,
) -> (f64, f64) {
    let region_median = region.median;

    let mut values = Vec::with_capacity(cohort_size);
    for entry in sample.correl.iter() {
        if !entry.score.is_usable() {
            continue;
        }
        let candidate = &samples[entry.sample_index];
        if !candidate.passes_qc() {
            continue;
        }
        let value = candidate.doc[region.index];
        if value >= OUTLIER_BAND_LOW * region_median && value <= OUTLIER_BAND_HIGH * region_median {
            values.push(value);
        }
        if values.len() == cohort_size {
            break;
        }
    }

    if values.len() == cohort_size {
        values.sort_by(f64::total_cmp);
        let median = stats::median_sorted(&values);
        let spread = stats::MAD_SCALE * stats::mad(&values, median);
        (median, spread.max(MIN_SPREAD_FRACTION * median))
    } else {
        // cohort too small, too many flagged samples or too many outliers;
        // fall back to a conservative wide-spread reference
        (region_median, FALLBACK_SPREAD_FRACTION * region_median)
    }
}

/// Construct each sample's personalized reference from its most-correlated
/// eligible cohort members
///
/// Also computes `ref_correl`, the fit of the sample to its own constructed
/// reference, and flags samples below the fit threshold. Returns the total
/// number of QC-flagged samples afterwards.
///
pub fn build_reference_profiles(
    samples: &mut [Sample],
    regions: &[Region],
    settings: &CnvSettings,
) -> usize {
    let mut profiles = Vec::with_capacity(samples.len());
    for sample in samples.iter() {
        let mut ref_doc = Vec::with_capacity(regions.len());
        let mut ref_stdev = Vec::with_capacity(regions.len());
        for region in regions.iter() {
            let (value, spread) =
                build_region_reference(sample, samples, region, settings.cohort_size);
            ref_doc.push(value);
            ref_stdev.push(spread);
        }
        let ref_correl = stats::pearson_correlation(&sample.doc, &ref_doc);
        profiles.push((ref_doc, ref_stdev, ref_correl));
    }

    let mut flagged = 0;
    for (sample, (ref_doc, ref_stdev, ref_correl)) in samples.iter_mut().zip(profiles) {
        sample.ref_doc = ref_doc;
        sample.ref_stdev = ref_stdev;
        sample.ref_correl = ref_correl;

        if sample.ref_correl < settings.min_ref_correlation {
            sample
                .qc
                .push_str(&format!("corr={:.3} ", sample.ref_correl));
        }
        if !sample.passes_qc() {
            flagged += 1;
        }
    }
    flagged
}
