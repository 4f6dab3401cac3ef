//! Per-feature standardization (zero mean, unit variance)

use super::error::{PredictionError, Result};

/// Standardizes features by removing the mean and scaling to unit variance.
///
/// Variance is the population variance. Features with zero variance keep a
/// scale of 1.0, so fitting on a single sample maps that sample to zeros.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    /// Compute per-feature mean and scale from `samples`
    pub fn fit(samples: &[Vec<f64>]) -> Result<Self> {
        let first = samples.first().ok_or(PredictionError::EmptySamples)?;
        let n_features = first.len();

        if let Some(bad) = samples.iter().find(|s| s.len() != n_features) {
            return Err(PredictionError::FeatureMismatch {
                expected: n_features,
                actual: bad.len(),
            });
        }

        let count = samples.len() as f64;
        let mut mean = vec![0.0; n_features];
        for sample in samples {
            for (m, x) in mean.iter_mut().zip(sample) {
                *m += x;
            }
        }
        mean.iter_mut().for_each(|m| *m /= count);

        let mut variance = vec![0.0; n_features];
        for sample in samples {
            for ((v, x), m) in variance.iter_mut().zip(sample).zip(&mean) {
                *v += (x - m).powi(2);
            }
        }

        let scale = variance
            .into_iter()
            .map(|v| {
                let std = (v / count).sqrt();
                if std == 0.0 { 1.0 } else { std }
            })
            .collect();

        Ok(Self { mean, scale })
    }

    pub fn transform(&self, sample: &[f64]) -> Result<Vec<f64>> {
        if sample.len() != self.mean.len() {
            return Err(PredictionError::FeatureMismatch {
                expected: self.mean.len(),
                actual: sample.len(),
            });
        }

        Ok(sample
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| (x - m) / s)
            .collect())
    }
}
