use crate::region::{ChromClass, Region};
use crate::sample::Sample;
use crate::settings::CnvSettings;
use crate::stats;

/// Absolute minimum mean depth required for each normalization group
const MIN_GROUP_DEPTH: f64 = 5.0;

/// Region counts per chromosome class, reported at the start of a run
///
#[derive(Clone, Copy, Debug, Default)]
pub struct ChromClassCounts {
    pub autosome: usize,
    pub chrx: usize,
    pub chry: usize,
    pub other: usize,
}

pub fn count_chrom_classes(regions: &[Region]) -> ChromClassCounts {
    let mut counts = ChromClassCounts::default();
    for region in regions.iter() {
        match region.chrom_class {
            ChromClass::Autosome => counts.autosome += 1,
            ChromClass::ChrX => counts.chrx += 1,
            ChromClass::ChrY => counts.chry += 1,
            ChromClass::Other => counts.other += 1,
        }
    }
    counts
}

/// Scale every sample's raw coverage by its cohort-relative mean
///
/// Autosomes and chrX are normalized independently with the region length as
/// weight; chrY and non-standard contigs are zeroed so they never contribute
/// to scoring. Samples below the depth thresholds are QC-flagged.
///
/// Panics if a sample's mean or stdev comes out non-finite, which indicates
/// corrupt input rather than a recoverable condition.
///
pub fn normalize_samples(samples: &mut [Sample], regions: &[Region], settings: &CnvSettings) {
    let counts = count_chrom_classes(regions);

    for sample in samples.iter_mut() {
        let mut doc_auto = Vec::with_capacity(counts.autosome);
        let mut doc_chrx = Vec::with_capacity(counts.chrx);
        for region in regions.iter() {
            let pair = (sample.doc[region.index], region.len_bases() as f64);
            match region.chrom_class {
                ChromClass::Autosome => doc_auto.push(pair),
                ChromClass::ChrX => doc_chrx.push(pair),
                _ => {}
            }
        }
        let mean_auto = stats::weighted_mean(&doc_auto);
        let mean_chrx = stats::weighted_mean(&doc_chrx);

        for region in regions.iter() {
            let value = &mut sample.doc[region.index];
            match region.chrom_class {
                ChromClass::Autosome if mean_auto > 0.0 => *value /= mean_auto,
                ChromClass::ChrX if mean_chrx > 0.0 => *value /= mean_chrx,
                _ => *value = 0.0,
            }
        }

        // An X-only panel reports the chrX mean as the sample depth
        sample.doc_mean = if counts.chrx > counts.autosome {
            mean_chrx
        } else {
            mean_auto
        };
        assert!(
            sample.doc_mean.is_finite(),
            "Mean depth of coverage is invalid for sample '{}': {}",
            sample.name,
            sample.doc_mean
        );

        sample.doc_stdev = stats::stdev_around(&sample.doc, 1.0);
        assert!(
            sample.doc_stdev.is_finite(),
            "Depth of coverage stdev is invalid for sample '{}': {}",
            sample.name,
            sample.doc_stdev
        );

        if sample.doc_mean < settings.min_sample_depth {
            sample
                .qc
                .push_str(&format!("avg_depth={:.1} ", sample.doc_mean));
        }
        if counts.chrx > 0 && mean_chrx < MIN_GROUP_DEPTH {
            sample
                .qc
                .push_str(&format!("avg_depth_chrx={:.1} ", mean_chrx));
        }
        if counts.autosome > 0 && mean_auto < MIN_GROUP_DEPTH {
            sample
                .qc
                .push_str(&format!("avg_depth_autosomes={:.1} ", mean_auto));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_regions(chroms: &[&str]) -> Vec<Region> {
        let mut chrom_index = 0;
        let mut last: Option<String> = None;
        chroms
            .iter()
            .enumerate()
            .map(|(i, chrom)| {
                if let Some(last) = &last {
                    if last != chrom {
                        chrom_index += 1;
                    }
                }
                last = Some(chrom.to_string());
                let start = 1 + 1000 * i as i64;
                Region::new(chrom.to_string(), chrom_index, start, start + 99, i)
            })
            .collect()
    }

    fn default_test_settings() -> CnvSettings {
        CnvSettings {
            cohort_size: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_weighted_mean_normalization_invariant() {
        let regions = test_regions(&["chr1", "chr1", "chr2", "chrX", "chrX"]);
        let mut samples = vec![Sample::new(
            "s1".to_string(),
            true,
            vec![90.0, 110.0, 100.0, 50.0, 70.0],
        )];
        normalize_samples(&mut samples, &regions, &default_test_settings());

        // equal-length regions, so the weighted mean reduces to the mean
        let doc = &samples[0].doc;
        approx::assert_ulps_eq!((doc[0] + doc[1] + doc[2]) / 3.0, 1.0, max_ulps = 4);
        approx::assert_ulps_eq!((doc[3] + doc[4]) / 2.0, 1.0, max_ulps = 4);
        approx::assert_ulps_eq!(samples[0].doc_mean, 100.0, max_ulps = 4);
        assert!(samples[0].passes_qc());
    }

    #[test]
    fn test_chry_and_other_contigs_are_zeroed() {
        let regions = test_regions(&["chr1", "chr1", "chrY", "chrM"]);
        let mut samples = vec![Sample::new(
            "s1".to_string(),
            true,
            vec![100.0, 100.0, 80.0, 80.0],
        )];
        normalize_samples(&mut samples, &regions, &default_test_settings());

        assert_eq!(samples[0].doc[2], 0.0);
        assert_eq!(samples[0].doc[3], 0.0);
    }

    #[test]
    fn test_doc_mean_prefers_chrx_on_x_heavy_panels() {
        let regions = test_regions(&["chr1", "chrX", "chrX", "chrX"]);
        let mut samples = vec![Sample::new(
            "s1".to_string(),
            true,
            vec![100.0, 60.0, 60.0, 60.0],
        )];
        normalize_samples(&mut samples, &regions, &default_test_settings());

        approx::assert_ulps_eq!(samples[0].doc_mean, 60.0, max_ulps = 4);
    }

    #[test]
    fn test_low_depth_samples_are_flagged() {
        let regions = test_regions(&["chr1", "chr1"]);
        let mut samples = vec![
            Sample::new("low".to_string(), true, vec![10.0, 12.0]),
            Sample::new("ok".to_string(), true, vec![100.0, 110.0]),
        ];
        normalize_samples(&mut samples, &regions, &default_test_settings());

        assert!(samples[0].qc.starts_with("avg_depth="));
        assert!(samples[1].passes_qc());
    }

    #[test]
    fn test_very_low_group_depth_is_flagged_separately() {
        let regions = test_regions(&["chr1", "chrX"]);
        let mut samples = vec![Sample::new("s1".to_string(), true, vec![100.0, 3.0])];
        normalize_samples(&mut samples, &regions, &default_test_settings());

        assert!(samples[0].qc.contains("avg_depth_chrx="));
    }
}
