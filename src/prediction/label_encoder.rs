use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{PredictionError, Result};
use super::read_artifact;

/// Maps class indices back to the labels the model was trained on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelEncoder {
    pub classes: Vec<String>,
}

impl LabelEncoder {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let encoder: Self = read_artifact(path.as_ref())?;
        if encoder.classes.is_empty() {
            return Err(PredictionError::InvalidModel(
                "label encoder has no classes".into(),
            ));
        }
        Ok(encoder)
    }

    pub fn inverse_transform(&self, class: usize) -> Result<&str> {
        self.classes
            .get(class)
            .map(String::as_str)
            .ok_or(PredictionError::UnknownClass(class))
    }
}
