use std::fmt;

use serde::{Deserialize, Serialize};

/// Chromosome groups relevant to coverage normalization
///
/// Autosomes and chrX are normalized independently; chrY and non-standard
/// contigs are excluded from scoring.
///
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub enum ChromClass {
    Autosome,
    ChrX,
    ChrY,
    Other,
}

/// Classify a chromosome label, accepting an optional "chr" prefix in any case
///
pub fn classify_chrom(label: &str) -> ChromClass {
    let name = label
        .strip_prefix("chr")
        .or_else(|| label.strip_prefix("CHR"))
        .or_else(|| label.strip_prefix("Chr"))
        .unwrap_or(label);

    if name.eq_ignore_ascii_case("X") {
        ChromClass::ChrX
    } else if name.eq_ignore_ascii_case("Y") {
        ChromClass::ChrY
    } else {
        match name.parse::<u32>() {
            Ok(num) if (1..=22).contains(&num) => ChromClass::Autosome,
            _ => ChromClass::Other,
        }
    }
}

/// One target region of the panel
///
/// Identity fields (`chrom`, `start`, `end`) are fixed at load time; the QC
/// fields are filled in by the region quality filter. Coordinates follow the
/// source convention: 1-indexed with an inclusive end.
///
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Region {
    pub chrom: String,

    /// Index of `chrom` in input order, shared by all regions of one
    /// chromosome block; used for same-chromosome adjacency checks
    pub chrom_index: usize,

    pub chrom_class: ChromClass,
    pub start: i64,
    pub end: i64,

    /// Position of this region in the surviving region list, used to address
    /// the per-sample coverage vectors; reassigned on compaction
    pub index: usize,

    /// Median normalized coverage across QC-passing samples
    pub median: f64,

    /// Scaled MAD of normalized coverage across QC-passing samples
    pub mad: f64,

    /// QC flag tokens; empty means the region passes
    pub qc: String,
}

impl Region {
    pub fn new(chrom: String, chrom_index: usize, start: i64, end: i64, index: usize) -> Self {
        let chrom_class = classify_chrom(&chrom);
        Self {
            chrom,
            chrom_index,
            chrom_class,
            start,
            end,
            index,
            median: 0.0,
            mad: 0.0,
            qc: String::new(),
        }
    }

    /// Region length used as the normalization weight
    pub fn len_bases(&self) -> i64 {
        self.end - self.start
    }

    pub fn passes_qc(&self) -> bool {
        self.qc.is_empty()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}-{}", self.chrom, self.start, self.end)
    }
}
