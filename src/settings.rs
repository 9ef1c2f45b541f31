use serde::{Deserialize, Serialize};
use simple_error::{SimpleResult, bail};

/// Runtime parameters for the calling pipeline
///
/// Defaults reproduce the established production values for targeted panels.
///
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CnvSettings {
    /// Number of most-correlated samples used to construct each sample's
    /// reference ('n')
    pub cohort_size: usize,

    /// Minimum absolute z-score for CNV seed detection
    pub min_z: f64,

    /// Relaxed minimum absolute z-score for extension around seeds
    pub ext_min_z: f64,

    /// Percentage of the combined range size that a neutral gap may span
    /// during range merging; 0 disables gap bridging
    pub ext_gap_span: f64,

    /// Region QC: minimum median normalized coverage
    pub min_normalized_cov: f64,

    /// Region QC: minimum average absolute coverage
    pub min_absolute_cov: f64,

    /// Region QC: maximum coefficient of variation (mad/median)
    pub max_cv: f64,

    /// Sample QC: minimum average depth
    pub min_sample_depth: f64,

    /// Sample QC: minimum correlation to the constructed reference
    pub min_ref_correlation: f64,
}

impl Default for CnvSettings {
    fn default() -> Self {
        Self {
            cohort_size: 20,
            min_z: 4.0,
            ext_min_z: 2.0,
            ext_gap_span: 20.0,
            min_normalized_cov: 0.01,
            min_absolute_cov: 20.0,
            max_cv: 0.3,
            min_sample_depth: 40.0,
            min_ref_correlation: 0.95,
        }
    }
}

/// Validate settings values that have no meaningful interpretation outside
/// their expected domain
///
pub fn validate_settings(settings: &CnvSettings) -> SimpleResult<()> {
    if settings.cohort_size == 0 {
        bail!("Reference cohort size must be at least 1");
    }
    if settings.min_z <= 0.0 {
        bail!("Seed z-score threshold must be positive: {}", settings.min_z);
    }
    if settings.ext_min_z <= 0.0 {
        bail!(
            "Extension z-score threshold must be positive: {}",
            settings.ext_min_z
        );
    }
    if settings.ext_gap_span < 0.0 {
        bail!(
            "Gap span percentage cannot be negative: {}",
            settings.ext_gap_span
        );
    }
    if settings.max_cv <= 0.0 {
        bail!(
            "Region coefficient-of-variation ceiling must be positive: {}",
            settings.max_cv
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = CnvSettings::default();
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let settings = CnvSettings {
            cohort_size: 0,
            ..Default::default()
        };
        assert!(validate_settings(&settings).is_err());

        let settings = CnvSettings {
            ext_gap_span: -5.0,
            ..Default::default()
        };
        assert!(validate_settings(&settings).is_err());
    }
}
