use crate::sample::{CorrelationScore, Sample, SampleCorrelation};

/// Similarity of sample `a` to sample `b` over normalized coverage
///
/// Covariance of coverage mean-centered at 1.0, normalized by each sample's
/// own stdev. Not strictly bounded to [-1, 1] but monotone with the true
/// correlation, which is all that reference ranking needs.
///
fn doc_similarity(a: &Sample, b: &Sample) -> f64 {
    let sum = a
        .doc
        .iter()
        .zip(b.doc.iter())
        .map(|(x, y)| (x - 1.0) * (y - 1.0))
        .sum::<f64>();
    sum / a.doc_stdev / b.doc_stdev / a.doc.len() as f64
}

/// Build every sample's ranked correlation list
///
/// Reference-ineligible partners and the self entry are kept with explicit
/// tags to preserve positional bookkeeping; they rank after every usable
/// entry. Ties keep input order.
///
pub fn compute_sample_correlations(samples: &mut [Sample]) {
    let mut all_correl = Vec::with_capacity(samples.len());
    for (i, sample) in samples.iter().enumerate() {
        let mut correl = Vec::with_capacity(samples.len());
        for (j, other) in samples.iter().enumerate() {
            let score = if i == j {
                CorrelationScore::SelfSample
            } else if !other.reference_eligible {
                CorrelationScore::Ineligible
            } else {
                CorrelationScore::Usable(doc_similarity(sample, other))
            };
            correl.push(SampleCorrelation {
                sample_index: j,
                score,
            });
        }
        correl.sort_by(|a, b| a.score.rank_cmp(&b.score));
        all_correl.push(correl);
    }

    for (sample, correl) in samples.iter_mut().zip(all_correl) {
        sample.correl = correl;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_sample(name: &str, reference_eligible: bool, doc: Vec<f64>) -> Sample {
        let mut sample = Sample::new(name.to_string(), reference_eligible, doc);
        sample.doc_stdev = crate::stats::stdev_around(&sample.doc, 1.0);
        sample
    }

    #[test]
    fn test_ranked_correlation_lists() {
        let mut samples = vec![
            test_sample("a", true, vec![1.2, 0.8, 1.1, 0.9]),
            test_sample("b", true, vec![1.19, 0.81, 1.09, 0.91]),
            test_sample("c", true, vec![0.8, 1.2, 0.9, 1.1]),
        ];
        compute_sample_correlations(&mut samples);

        // every list covers the whole cohort, most similar sample first
        for sample in samples.iter() {
            assert_eq!(sample.correl.len(), 3);
        }
        assert_eq!(samples[0].correl[0].sample_index, 1);
        assert!(samples[0].correl[0].score.is_usable());

        // anti-correlated sample ranks last among usable entries
        assert_eq!(samples[0].correl[1].sample_index, 2);
        if let CorrelationScore::Usable(score) = samples[0].correl[1].score {
            assert!(score < 0.0);
        } else {
            panic!("expected usable score");
        }

        // the self entry carries no score and sorts to the tail
        assert_eq!(samples[0].correl[2].sample_index, 0);
        assert_eq!(samples[0].correl[2].score, CorrelationScore::SelfSample);
    }

    #[test]
    fn test_ineligible_samples_are_tagged_not_scored() {
        let mut samples = vec![
            test_sample("a", true, vec![1.2, 0.8, 1.1, 0.9]),
            test_sample("tumor", false, vec![1.2, 0.8, 1.1, 0.9]),
            test_sample("c", true, vec![1.1, 0.9, 1.05, 0.95]),
        ];
        compute_sample_correlations(&mut samples);

        let tumor_entry = samples[0]
            .correl
            .iter()
            .find(|c| c.sample_index == 1)
            .unwrap();
        assert_eq!(tumor_entry.score, CorrelationScore::Ineligible);

        // the ineligible sample still ranks everyone else
        assert!(samples[1].correl[0].score.is_usable());
    }
}
