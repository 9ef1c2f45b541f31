use crate::caller::{CnvRange, CnvType, ResultData, calculate_copies};
use crate::region::Region;
use crate::sample::Sample;
use crate::settings::CnvSettings;

fn same_event_identity(
    first: &CnvRange,
    second: &CnvRange,
    results: &[ResultData],
    regions: &[Region],
) -> bool {
    first.kind == second.kind
        && first.sample == second.sample
        && regions[results[first.start].region].chrom_index
            == regions[results[second.start].region].chrom_index
}

/// Join index-adjacent ranges of the same type, sample and chromosome
///
/// Scans in reverse index order so each removal leaves the unvisited prefix
/// untouched.
///
pub fn merge_contiguous_ranges(
    ranges: &mut Vec<CnvRange>,
    results: &[ResultData],
    regions: &[Region],
) {
    if ranges.len() < 2 {
        return;
    }
    let mut r = ranges.len() - 2;
    loop {
        if same_event_identity(&ranges[r], &ranges[r + 1], results, regions)
            && ranges[r].end + 1 == ranges[r + 1].start
        {
            ranges[r].end = ranges[r + 1].end;
            ranges.remove(r + 1);
        }
        if r == 0 {
            break;
        }
        r -= 1;
    }
}

/// True if any entry inside the open gap carries a z-score opposing the
/// shared trend
fn gap_opposes_trend(kind: CnvType, results: &[ResultData], gap_start: usize, gap_end: usize) -> bool {
    results[gap_start..gap_end].iter().any(|result| match kind {
        CnvType::Gain => result.z < 0.0,
        CnvType::Loss => result.z > 0.0,
    })
}

/// Bridge same-trend ranges separated by short neutral gaps
///
/// Iterates to a fixpoint because a successful bridge can create new
/// adjacency for further bridges; every pass repeats the same reverse
/// index-order scan so behavior stays reproducible. Entries inside a bridged
/// gap get their copy number recomputed from the coverage ratio.
///
pub fn bridge_range_gaps(
    ranges: &mut Vec<CnvRange>,
    results: &mut [ResultData],
    samples: &[Sample],
    regions: &[Region],
    settings: &CnvSettings,
) {
    if settings.ext_gap_span <= 0.0 {
        return;
    }

    loop {
        let ranges_before = ranges.len();
        if ranges.len() >= 2 {
            let mut r = ranges.len() - 2;
            loop {
                let bridged = try_bridge(ranges, r, results, samples, regions, settings);
                if bridged {
                    ranges[r].end = ranges[r + 1].end;
                    ranges.remove(r + 1);
                }
                if r == 0 {
                    break;
                }
                r -= 1;
            }
        }
        if ranges.len() == ranges_before {
            break;
        }
    }
}

/// Check the bridge conditions for ranges `r` and `r+1`; on success the gap
/// entries get their copies recomputed and true is returned
///
fn try_bridge(
    ranges: &[CnvRange],
    r: usize,
    results: &mut [ResultData],
    samples: &[Sample],
    regions: &[Region],
    settings: &CnvSettings,
) -> bool {
    let first = &ranges[r];
    let second = &ranges[r + 1];
    if !same_event_identity(first, second, results, regions) {
        return false;
    }

    let gap = second.start - first.end - 1;
    if gap as f64 > settings.ext_gap_span / 100.0 * (first.size() + second.size()) as f64 {
        return false;
    }
    if gap_opposes_trend(first.kind, results, first.end + 1, second.start) {
        return false;
    }

    for i in (first.end + 1)..second.start {
        results[i].copies = calculate_copies(&samples[results[i].sample], results[i].region);
    }
    true
}
