use std::path::PathBuf;

use thiserror::Error;

/// Error type for model loading and inference
#[derive(Error, Debug)]
pub enum PredictionError {
    #[error("Failed to read model artifact {path}: {source}")]
    ArtifactRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse model artifact {path}: {source}")]
    ArtifactFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Model has no trees")]
    EmptyModel,

    #[error("Expected {expected} features, got {actual}")]
    FeatureMismatch { expected: usize, actual: usize },

    #[error("Cannot fit scaler on an empty sample set")]
    EmptySamples,

    #[error("Predicted class {0} has no label")]
    UnknownClass(usize),

    #[error("Inference task failed: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, PredictionError>;
