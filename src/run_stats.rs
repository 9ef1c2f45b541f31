//! Track stats for the whole calling run
//!

use std::fs::File;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};
use unwrap::unwrap;

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct CnvRunStats {
    pub region_count: usize,
    pub removed_region_count: usize,
    pub sample_count: usize,
    pub removed_sample_count: usize,

    pub seed_count: usize,

    /// Statistical outliers whose copy estimate rounded to the neutral value
    pub copy_number_conflict_count: usize,

    /// Regions added to seed ranges by extension
    pub extended_region_count: usize,

    pub range_count_before_merge: usize,
    pub range_count: usize,

    /// Mean correlation of QC-passing samples to their constructed reference
    pub mean_ref_correl: f64,
}

/// Write run stats out in json format
pub fn write_run_stats(filename: &Path, run_stats: &CnvRunStats) {
    info!("Writing run statistics to file: '{}'", filename.display());

    let f = unwrap!(
        File::create(filename),
        "Unable to create run statistics json file: '{}'",
        filename.display()
    );

    serde_json::to_writer_pretty(&f, &run_stats).unwrap();
}

pub fn read_run_stats(filename: &Path) -> CnvRunStats {
    use std::io::BufReader;

    let file = unwrap!(
        File::open(filename),
        "Unable to read run statistics json file: '{}'",
        filename.display()
    );
    let reader = BufReader::new(file);
    unwrap!(
        serde_json::from_reader(reader),
        "Unable to parse run statistics from json file: '{}'",
        filename.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_stats_json_round_trip() {
        let stats = CnvRunStats {
            region_count: 100,
            removed_region_count: 4,
            sample_count: 30,
            removed_sample_count: 2,
            seed_count: 12,
            copy_number_conflict_count: 1,
            extended_region_count: 5,
            range_count_before_merge: 12,
            range_count: 9,
            mean_ref_correl: 0.982,
        };

        let dir = std::env::temp_dir();
        let filename = dir.join("exocnv_run_stats_test.json");
        write_run_stats(&filename, &stats);
        let restored = read_run_stats(&filename);
        std::fs::remove_file(&filename).unwrap();

        assert_eq!(restored.region_count, 100);
        assert_eq!(restored.range_count, 9);
        approx::assert_ulps_eq!(restored.mean_ref_correl, 0.982, max_ulps = 4);
    }
}
