//! Weather category prediction
//!
//! This module turns a [`WeatherReading`] into a human-readable category:
//! - Loads the random forest and label decoder artifacts from disk on every call
//! - Standardizes the reading with a scaler fitted on that same reading
//! - Runs the forest and decodes the winning class index

pub mod error;
pub mod forest;
pub mod label_encoder;
pub mod scaler;

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::config::ModelConfig;
use crate::models::{FEATURE_COUNT, WeatherReading};

pub use error::{PredictionError, Result};
pub use forest::{Classifier, DecisionTree, RandomForestClassifier, TreeNode};
pub use label_encoder::LabelEncoder;
pub use scaler::StandardScaler;

pub(crate) fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path).map_err(|source| PredictionError::ArtifactRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| PredictionError::ArtifactFormat {
        path: path.to_path_buf(),
        source,
    })
}

/// Predicts a weather category from the artifacts at fixed paths
#[derive(Debug, Clone)]
pub struct Predictor {
    classifier_path: PathBuf,
    label_encoder_path: PathBuf,
}

impl Predictor {
    pub fn new(config: &ModelConfig) -> Self {
        Self {
            classifier_path: config.classifier_path.clone(),
            label_encoder_path: config.label_encoder_path.clone(),
        }
    }

    /// Blocking: reads both artifacts from disk
    #[instrument(skip(self))]
    pub fn predict(&self, reading: &WeatherReading) -> Result<String> {
        let classifier = RandomForestClassifier::load(&self.classifier_path)?;
        debug!(
            trees = classifier.trees().len(),
            classes = classifier.n_classes(),
            "Model loaded successfully"
        );
        if classifier.n_features() != FEATURE_COUNT {
            return Err(PredictionError::FeatureMismatch {
                expected: classifier.n_features(),
                actual: FEATURE_COUNT,
            });
        }
        let label_encoder = LabelEncoder::load(&self.label_encoder_path)?;

        let sample = reading.features().to_vec();
        debug!("Classifier input: {:?}", sample);

        // Fitted on the incoming sample itself; every feature standardizes to 0.0
        let scaler = StandardScaler::fit(std::slice::from_ref(&sample))?;
        let scaled = scaler.transform(&sample)?;

        let class = classifier.predict(&scaled)?;
        let label = label_encoder.inverse_transform(class)?;
        debug!(class, label, "Predicted class");

        Ok(label.to_string())
    }

    /// Run [`Predictor::predict`] on the blocking thread pool
    pub async fn predict_async(&self, reading: WeatherReading) -> Result<String> {
        let predictor = self.clone();
        tokio::task::spawn_blocking(move || predictor.predict(&reading))
            .await
            .map_err(|e| PredictionError::Task(e.to_string()))?
    }
}
