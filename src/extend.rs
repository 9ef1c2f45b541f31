use crate::caller::{CnvRange, CnvType, NEUTRAL_COPY_NUMBER, ResultData, calculate_copies};
use crate::region::Region;
use crate::sample::Sample;
use crate::settings::CnvSettings;

/// Decide whether the neutral entry at `result` may join `range`
///
/// Returns the recomputed copy number to assign on success. Extension stops
/// at sample and chromosome boundaries, at entries already carrying a call,
/// at entries failing the relaxed direction-specific z test (a non-finite z
/// always fails it), and at entries whose recomputed copy number contradicts
/// the trend.
///
fn extension_copies(
    result: &ResultData,
    range: &CnvRange,
    range_chrom: usize,
    samples: &[Sample],
    regions: &[Region],
    ext_min_z: f64,
) -> Option<i32> {
    if result.copies != NEUTRAL_COPY_NUMBER {
        return None;
    }
    if result.sample != range.sample {
        return None;
    }
    if regions[result.region].chrom_index != range_chrom {
        return None;
    }
    if !result.z.is_finite() {
        return None;
    }

    let copies = calculate_copies(&samples[result.sample], result.region);
    match range.kind {
        CnvType::Loss => {
            if result.z > -ext_min_z || copies >= NEUTRAL_COPY_NUMBER {
                return None;
            }
        }
        CnvType::Gain => {
            if result.z < ext_min_z || copies <= NEUTRAL_COPY_NUMBER {
                return None;
            }
        }
    }
    Some(copies)
}

/// Grow each seed range left, then right, across index-adjacent neutral
/// entries under the relaxed z threshold
///
/// Traversed entries get their copy number assigned in place. Returns the
/// number of regions added across all ranges.
///
pub fn extend_ranges(
    results: &mut [ResultData],
    ranges: &mut [CnvRange],
    samples: &[Sample],
    regions: &[Region],
    settings: &CnvSettings,
) -> usize {
    let mut extended = 0;
    for range in ranges.iter_mut() {
        let range_chrom = regions[results[range.start].region].chrom_index;

        while range.start > 0 {
            let i = range.start - 1;
            match extension_copies(
                &results[i],
                range,
                range_chrom,
                samples,
                regions,
                settings.ext_min_z,
            ) {
                Some(copies) => {
                    results[i].copies = copies;
                    range.start = i;
                    extended += 1;
                }
                None => break,
            }
        }

        while range.end + 1 < results.len() {
            let i = range.end + 1;
            match extension_copies(
                &results[i],
                range,
                range_chrom,
                samples,
                regions,
                settings.ext_min_z,
            ) {
                Some(copies) => {
                    results[i].copies = copies;
                    range.end = i;
                    extended += 1;
                }
                None => break,
            }
        }
    }
    extended
}
