//! Likelihood of a batch under one hypothesis.
//!
//! Observations are modelled as independent draws from `N(mean, sd²)`, so the
//! batch likelihood is the product of per-observation densities. An empty batch
//! has likelihood 1 (log-likelihood 0).

use crate::domain::Hypothesis;
use crate::error::InferenceError;
use crate::math::{normal_ln_pdf, normal_pdf};

/// Product of normal densities over `batch`.
pub fn likelihood(h: Hypothesis, batch: &[f64]) -> f64 {
    batch.iter().map(|&x| normal_pdf(x, h.mean, h.sd)).product()
}

/// Sum of normal log-densities over `batch`.
pub fn log_likelihood(h: Hypothesis, batch: &[f64]) -> f64 {
    batch.iter().map(|&x| normal_ln_pdf(x, h.mean, h.sd)).sum()
}

/// Reject NaN or infinite observations.
pub fn validate_batch(batch: &[f64]) -> Result<(), InferenceError> {
    match batch.iter().position(|x| !x.is_finite()) {
        Some(index) => Err(InferenceError::InvalidObservation {
            index,
            value: batch[index],
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(mean: f64, sd: f64) -> Hypothesis {
        Hypothesis { mean, sd }
    }

    #[test]
    fn empty_batch_is_neutral() {
        assert_eq!(likelihood(h(3.0, 2.0), &[]), 1.0);
        assert_eq!(log_likelihood(h(3.0, 2.0), &[]), 0.0);
    }

    #[test]
    fn symmetric_tails_have_equal_likelihood() {
        let center = likelihood(h(100.0, 1.0), &[100.0]);
        let below = likelihood(h(99.0, 1.0), &[100.0]);
        let above = likelihood(h(101.0, 1.0), &[100.0]);
        assert!(center > below);
        assert_eq!(below, above);
    }

    #[test]
    fn log_and_product_agree() {
        let batch = [1.0, 2.5, -0.3, 4.0];
        let hyp = h(1.5, 1.7);
        assert!((log_likelihood(hyp, &batch) - likelihood(hyp, &batch).ln()).abs() < 1e-12);
    }

    #[test]
    fn product_underflows_where_log_does_not() {
        let hyp = h(0.0, 1.0);
        assert_eq!(likelihood(hyp, &[1e6]), 0.0);
        assert!(log_likelihood(hyp, &[1e6]).is_finite());
    }

    #[test]
    fn non_finite_observations_are_rejected() {
        let err = validate_batch(&[1.0, f64::NAN]).unwrap_err();
        assert!(matches!(err, InferenceError::InvalidObservation { index: 1, .. }));
        assert!(validate_batch(&[]).is_ok());
    }
}
