use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Outcome of comparing one sample against another for reference selection
///
/// Self-comparison and reference-ineligible partners carry explicit tags
/// instead of a sentinel value, so a genuinely low computed correlation can
/// never be confused with "not usable".
///
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub enum CorrelationScore {
    SelfSample,
    Ineligible,
    Usable(f64),
}

impl CorrelationScore {
    pub fn is_usable(&self) -> bool {
        matches!(self, CorrelationScore::Usable(_))
    }

    /// Descending-rank comparator: higher usable scores first, then all
    /// non-usable entries
    ///
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        use CorrelationScore::*;
        match (self, other) {
            (Usable(a), Usable(b)) => b.total_cmp(a),
            (Usable(_), _) => Ordering::Less,
            (_, Usable(_)) => Ordering::Greater,
            _ => Ordering::Equal,
        }
    }
}

/// One entry of a sample's ranked correlation list
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct SampleCorrelation {
    /// Handle of the compared sample in the pre-compaction sample list
    pub sample_index: usize,
    pub score: CorrelationScore,
}

/// One cohort sample
///
/// The coverage vectors stay aligned 1:1 with the surviving region list
/// through every pipeline stage.
///
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Sample {
    pub name: String,

    /// False for samples that may be analyzed but never serve as reference
    /// material for other samples (e.g. tumor samples)
    pub reference_eligible: bool,

    /// Normalized depth of coverage, one value per region
    pub doc: Vec<f64>,

    /// Pre-normalization mean depth of the group used for scaling
    pub doc_mean: f64,

    /// Standard deviation of normalized coverage about 1.0
    pub doc_stdev: f64,

    /// Correlation to every other sample, sorted descending by rank
    pub correl: Vec<SampleCorrelation>,

    /// Constructed per-region reference value
    pub ref_doc: Vec<f64>,

    /// Constructed per-region reference spread
    pub ref_stdev: Vec<f64>,

    /// Pearson correlation of `doc` against `ref_doc`; the primary
    /// whole-sample QC signal
    pub ref_correl: f64,

    /// QC flag tokens; empty means the sample passes
    pub qc: String,
}

impl Sample {
    pub fn new(name: String, reference_eligible: bool, doc: Vec<f64>) -> Self {
        Self {
            name,
            reference_eligible,
            doc,
            doc_mean: 0.0,
            doc_stdev: 0.0,
            correl: Vec::new(),
            ref_doc: Vec::new(),
            ref_stdev: Vec::new(),
            ref_correl: 0.0,
            qc: String::new(),
        }
    }

    pub fn passes_qc(&self) -> bool {
        self.qc.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correlation_rank_cmp() {
        use CorrelationScore::*;

        let mut scores = vec![Ineligible, Usable(0.7), SelfSample, Usable(0.9), Usable(-0.2)];
        scores.sort_by(|a, b| a.rank_cmp(b));

        assert_eq!(scores[0], Usable(0.9));
        assert_eq!(scores[1], Usable(0.7));
        assert_eq!(scores[2], Usable(-0.2));
        assert!(!scores[3].is_usable());
        assert!(!scores[4].is_usable());
    }

    #[test]
    fn test_rank_cmp_is_stable_for_non_usable() {
        use CorrelationScore::*;
        assert_eq!(SelfSample.rank_cmp(&Ineligible), Ordering::Equal);
    }
}
