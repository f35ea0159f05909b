//! Gaussian naive Bayes evaluation
//!
//! Joint log-likelihood per class:
//!   log(prior) - 0.5 * Σ log(2π·var) - 0.5 * Σ (x - θ)² / var
//! normalized into probabilities with log-sum-exp.

use serde::Deserialize;

use super::{check_width, ModelError, ProbabilisticClassifier};

#[derive(Debug, Clone, Deserialize)]
pub struct GaussianNb {
    pub class_prior: Vec<f64>,
    /// Per-class feature means, `n_classes × n_features`
    pub theta: Vec<Vec<f64>>,
    /// Per-class feature variances, `n_classes × n_features`
    pub var: Vec<Vec<f64>>,
}

impl GaussianNb {
    pub fn validate(&self) -> Result<(), ModelError> {
        let n_classes = self.class_prior.len();
        if n_classes == 0 {
            return Err(ModelError::malformed("naive Bayes has no classes"));
        }
        if self.theta.len() != n_classes || self.var.len() != n_classes {
            return Err(ModelError::malformed(format!(
                "{} priors but {} mean rows and {} variance rows",
                n_classes,
                self.theta.len(),
                self.var.len()
            )));
        }

        let n_features = self.theta[0].len();
        for (class, (means, vars)) in self.theta.iter().zip(&self.var).enumerate() {
            if means.len() != n_features || vars.len() != n_features {
                return Err(ModelError::malformed(format!(
                    "class {} has ragged parameter rows",
                    class
                )));
            }
            if vars.iter().any(|v| v.is_nan() || *v <= 0.0) {
                return Err(ModelError::malformed(format!(
                    "class {} has a non-positive variance",
                    class
                )));
            }
        }
        if self.class_prior.iter().any(|p| p.is_nan() || *p <= 0.0) {
            return Err(ModelError::malformed("class priors must be positive"));
        }
        Ok(())
    }

    fn joint_log_likelihood(&self, features: &[f64]) -> Vec<f64> {
        self.class_prior
            .iter()
            .zip(self.theta.iter().zip(&self.var))
            .map(|(prior, (means, vars))| {
                let n_ij: f64 = vars
                    .iter()
                    .map(|v| (2.0 * std::f64::consts::PI * v).ln())
                    .sum::<f64>()
                    * -0.5;
                let dist: f64 = features
                    .iter()
                    .zip(means.iter().zip(vars))
                    .map(|(x, (m, v))| (x - m).powi(2) / v)
                    .sum::<f64>()
                    * 0.5;
                prior.ln() + n_ij - dist
            })
            .collect()
    }
}

impl ProbabilisticClassifier for GaussianNb {
    fn n_features(&self) -> usize {
        self.theta.first().map_or(0, Vec::len)
    }

    fn n_classes(&self) -> usize {
        self.class_prior.len()
    }

    /// Inputs far enough out that every class's log-likelihood is `-inf`
    /// (e.g. 1e200) yield all-NaN probabilities. They are passed through, not clamped.
    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, ModelError> {
        check_width(self.n_features(), features)?;

        let jll = self.joint_log_likelihood(features);
        let max = jll.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let log_norm = max + jll.iter().map(|l| (l - max).exp()).sum::<f64>().ln();

        Ok(jll.iter().map(|l| (l - log_norm).exp()).collect())
    }
}
