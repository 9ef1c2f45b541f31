//! CNV calling for targeted sequencing panels
//!
//! Calls copy-number variants from depth-of-coverage profiles by comparing
//! each sample against a reference constructed from the most similar samples
//! of an unmatched cohort. The pipeline normalizes coverage, flags unusable
//! regions and samples, detects z-score outlier seeds, extends them under a
//! relaxed threshold and merges the surviving ranges into reported events.
//!

pub mod annotation;
pub mod caller;
pub mod compact;
pub mod correlation;
pub mod extend;
pub mod genome_regions;
pub mod merge;
pub mod normalize;
pub mod pipeline;
pub mod reference;
pub mod region;
pub mod region_qc;
pub mod run_stats;
pub mod sample;
pub mod settings;
pub mod stats;

pub use caller::{CnvRange, CnvType, ResultData};
pub use pipeline::{CnvCallResults, RegionInput, SampleInput, run_cnv_pipeline};
pub use settings::CnvSettings;
