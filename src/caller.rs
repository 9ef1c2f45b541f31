use log::warn;
use serde::{Deserialize, Serialize};

use crate::region::Region;
use crate::sample::Sample;
use crate::settings::CnvSettings;

/// Copy number assigned to entries with no call
pub const NEUTRAL_COPY_NUMBER: i32 = 2;

/// z-scores are clamped to this magnitude
const MAX_Z: f64 = 10.0;

/// Observed coverage below this fraction of the reference triggers the
/// homozygous-deletion heuristic
const HOMDEL_FRACTION: f64 = 0.1;

/// Direction of a copy-number event
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize, strum::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum CnvType {
    Gain,
    Loss,
}

/// Per-(sample, region) call state
///
/// Entries are laid out in one flat sequence ordered by sample, then region;
/// the extension and merge stages depend on this index adjacency.
///
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ResultData {
    /// Handle into the surviving sample list
    pub sample: usize,

    /// Handle into the surviving region list
    pub region: usize,

    pub z: f64,

    /// Estimated copy number; stays neutral until a seed or extension
    /// assigns an estimate
    pub copies: i32,
}

/// A maximal run of same-trend result entries, the unit reported as one CNV
/// event (closed interval of flat result indices)
///
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CnvRange {
    pub sample: usize,
    pub start: usize,
    pub end: usize,
    pub kind: CnvType,
}

impl CnvRange {
    pub fn size(&self) -> usize {
        self.end - self.start + 1
    }
}

/// z-score of a sample's coverage against its constructed reference
///
/// NaN for a degenerate reference (zero value or zero spread); callers must
/// treat NaN as "no call".
///
pub fn calculate_z(sample: &Sample, region_index: usize) -> f64 {
    let reference = sample.ref_doc[region_index];
    let spread = sample.ref_stdev[region_index];
    if spread == 0.0 || reference == 0.0 {
        return f64::NAN;
    }
    ((sample.doc[region_index] - reference) / spread).clamp(-MAX_Z, MAX_Z)
}

/// Estimated integer copy number from the coverage ratio
///
/// Non-finite ratios (degenerate reference) yield the neutral copy number.
///
pub fn calculate_copies(sample: &Sample, region_index: usize) -> i32 {
    let ratio = 2.0 * sample.doc[region_index] / sample.ref_doc[region_index];
    if !ratio.is_finite() {
        NEUTRAL_COPY_NUMBER
    } else if ratio < 0.2 {
        0
    } else if ratio < 1.0 {
        1
    } else {
        ratio.round() as i32
    }
}

pub struct SeedDetection {
    pub results: Vec<ResultData>,
    pub ranges: Vec<CnvRange>,

    /// Statistical outliers whose rounded copy estimate was still 2;
    /// surfaced as warnings, never used to start a range
    pub copy_number_conflicts: usize,
}

/// Score every surviving (sample, region) pair and mark statistical seeds
///
/// A seed is raised for |z| at or above the threshold, or when the
/// homozygous-deletion heuristic fires: a region whose reference is solid on
/// both the normalized and absolute scale, yet whose observed coverage is
/// close to zero, deletes too hard for the z-score ratio to be reliable.
///
pub fn detect_seeds(
    samples: &[Sample],
    regions: &[Region],
    avg_abs_cov: f64,
    settings: &CnvSettings,
) -> SeedDetection {
    let mut results = Vec::with_capacity(samples.len() * regions.len());
    let mut ranges = Vec::new();
    let mut copy_number_conflicts = 0;

    for (s, sample) in samples.iter().enumerate() {
        for region in regions.iter() {
            let e = region.index;
            let z = calculate_z(sample, e);
            let mut result = ResultData {
                sample: s,
                region: e,
                z,
                copies: NEUTRAL_COPY_NUMBER,
            };

            let reference = sample.ref_doc[e];
            let homozygous_deletion = reference >= settings.min_normalized_cov
                && reference * avg_abs_cov >= settings.min_absolute_cov
                && sample.doc[e] < HOMDEL_FRACTION * reference;

            if z <= -settings.min_z || z >= settings.min_z || homozygous_deletion {
                result.copies = calculate_copies(sample, e);
                if result.copies == NEUTRAL_COPY_NUMBER {
                    warn!(
                        "z-score outlier ({z:.2}) for sample '{}' in region '{}' has neutral copy estimate",
                        sample.name, region
                    );
                    copy_number_conflicts += 1;
                } else {
                    let index = results.len();
                    let kind = if result.copies < NEUTRAL_COPY_NUMBER {
                        CnvType::Loss
                    } else {
                        CnvType::Gain
                    };
                    ranges.push(CnvRange {
                        sample: s,
                        start: index,
                        end: index,
                        kind,
                    });
                }
            }
            results.push(result);
        }
    }

    SeedDetection {
        results,
        ranges,
        copy_number_conflicts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_sample(doc: Vec<f64>, ref_doc: Vec<f64>, ref_stdev: Vec<f64>) -> Sample {
        let mut sample = Sample::new("s".to_string(), true, doc);
        sample.ref_doc = ref_doc;
        sample.ref_stdev = ref_stdev;
        sample
    }

    fn test_regions(count: usize) -> Vec<Region> {
        (0..count)
            .map(|e| {
                let start = 1 + 1000 * e as i64;
                Region::new("chr1".to_string(), 0, start, start + 99, e)
            })
            .collect()
    }

    #[test]
    fn test_z_is_clamped() {
        let sample = test_sample(vec![0.1, 5.0], vec![1.0, 1.0], vec![0.01, 0.01]);
        assert_eq!(calculate_z(&sample, 0), -10.0);
        assert_eq!(calculate_z(&sample, 1), 10.0);
    }

    #[test]
    fn test_degenerate_reference_yields_nan() {
        let sample = test_sample(vec![1.0, 1.0], vec![0.0, 1.0], vec![0.1, 0.0]);
        assert!(calculate_z(&sample, 0).is_nan());
        assert!(calculate_z(&sample, 1).is_nan());
        assert_eq!(calculate_copies(&sample, 0), NEUTRAL_COPY_NUMBER);
    }

    #[test]
    fn test_copy_number_step_function() {
        let doc = vec![0.05, 0.099, 0.1, 0.49, 0.5, 1.0, 1.24, 1.26, 2.0];
        let n = doc.len();
        let sample = test_sample(doc, vec![1.0; n], vec![0.1; n]);

        let copies: Vec<i32> = (0..n).map(|e| calculate_copies(&sample, e)).collect();
        assert_eq!(copies, vec![0, 0, 1, 1, 1, 2, 2, 3, 4]);

        // non-decreasing in the ratio
        for pair in copies.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
    }

    #[test]
    fn test_seed_detection_marks_loss() {
        let flat = test_sample(
            vec![1.0, 1.0, 1.0],
            vec![1.0, 1.0, 1.0],
            vec![0.1, 0.1, 0.1],
        );
        let mut deleted = test_sample(
            vec![1.0, 0.1, 1.0],
            vec![1.0, 1.0, 1.0],
            vec![0.1, 0.2, 0.1],
        );
        deleted.name = "del".to_string();

        let samples = vec![flat, deleted];
        let regions = test_regions(3);
        let detection = detect_seeds(&samples, &regions, 100.0, &Default::default());

        assert_eq!(detection.results.len(), 6);
        assert_eq!(detection.ranges.len(), 1);
        let range = &detection.ranges[0];
        assert_eq!(range.sample, 1);
        assert_eq!((range.start, range.end), (4, 4));
        assert_eq!(range.kind, CnvType::Loss);

        // z = clamp((0.1 - 1.0) / 0.2) = -4.5, copies = round-down ratio 0.2 -> 1
        approx::assert_ulps_eq!(detection.results[4].z, -4.5, max_ulps = 4);
        assert_eq!(detection.results[4].copies, 1);
        assert_eq!(detection.copy_number_conflicts, 0);
    }

    #[test]
    fn test_homozygous_deletion_heuristic() {
        // wide reference spread keeps |z| below the seed threshold
        let sample = test_sample(vec![0.05], vec![1.0], vec![0.3]);
        let regions = test_regions(1);
        let detection = detect_seeds(&[sample], &regions, 100.0, &Default::default());

        assert!(detection.results[0].z > -4.0);
        assert_eq!(detection.ranges.len(), 1);
        assert_eq!(detection.results[0].copies, 0);
    }

    #[test]
    fn test_neutral_copy_outlier_is_a_conflict_not_a_seed() {
        // z passes the threshold but the rounded ratio stays at 2
        let sample = test_sample(vec![1.05], vec![1.0], vec![0.01]);
        let regions = test_regions(1);
        let detection = detect_seeds(&[sample], &regions, 100.0, &Default::default());

        assert_eq!(detection.ranges.len(), 0);
        assert_eq!(detection.copy_number_conflicts, 1);
        assert_eq!(detection.results[0].copies, NEUTRAL_COPY_NUMBER);
    }
}
