//! Random forest classifier loaded from a JSON artifact
//!
//! Artifact layout:
//!
//! ```json
//! {
//!   "n_features": 4,
//!   "n_classes": 3,
//!   "trees": [
//!     { "nodes": [
//!         { "feature": 0, "threshold": 0.5, "left": 1, "right": 2 },
//!         { "value": [12.0, 3.0, 0.0] },
//!         { "value": [0.0, 4.0, 9.0] }
//!     ] }
//!   ]
//! }
//! ```
//!
//! Node 0 is the root. A sample goes left when `x[feature] <= threshold`.
//! Leaf `value`s are per-class sample weights.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{PredictionError, Result};
use super::read_artifact;

pub trait Classifier {
    /// Number of features `predict` expects
    fn n_features(&self) -> usize;

    /// Class probabilities for one sample
    fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>>;

    /// Index of the most probable class; ties go to the lowest index
    fn predict(&self, x: &[f64]) -> Result<usize> {
        let proba = self.predict_proba(x)?;
        let mut best: Option<(usize, f64)> = None;
        for (idx, p) in proba.iter().enumerate() {
            if best.is_none_or(|(_, top)| *p > top) {
                best = Some((idx, *p));
            }
        }
        best.map(|(idx, _)| idx).ok_or(PredictionError::EmptyModel)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: Vec<f64>,
    },
}

/// A validated tree; only built through [`DecisionTree::new`]
#[derive(Debug, Clone, Serialize)]
pub struct DecisionTree {
    nodes: Vec<TreeNode>,
    #[serde(skip)]
    n_features: usize,
    #[serde(skip)]
    n_classes: usize,
}

impl DecisionTree {
    pub fn new(nodes: Vec<TreeNode>, n_features: usize, n_classes: usize) -> Result<Self> {
        if nodes.is_empty() {
            return Err(PredictionError::InvalidModel("tree has no nodes".into()));
        }

        for (idx, node) in nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    left,
                    right,
                    ..
                } => {
                    if *feature >= n_features {
                        return Err(PredictionError::InvalidModel(format!(
                            "node {idx} splits on feature {feature} of {n_features}"
                        )));
                    }
                    // Children must come after their parent, which also rules out cycles
                    let in_range = |child: usize| child > idx && child < nodes.len();
                    if !in_range(*left) || !in_range(*right) {
                        return Err(PredictionError::InvalidModel(format!(
                            "node {idx} has invalid children {left}/{right}"
                        )));
                    }
                }
                TreeNode::Leaf { value } => {
                    if value.len() != n_classes {
                        return Err(PredictionError::InvalidModel(format!(
                            "leaf {idx} has {} class weights, expected {n_classes}",
                            value.len()
                        )));
                    }
                }
            }
        }

        Ok(Self {
            nodes,
            n_features,
            n_classes,
        })
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    fn leaf(&self, x: &[f64]) -> &[f64] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if x[*feature] <= *threshold { *left } else { *right };
                }
                TreeNode::Leaf { value } => return value,
            }
        }
    }
}

impl Classifier for DecisionTree {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>> {
        if x.len() != self.n_features {
            return Err(PredictionError::FeatureMismatch {
                expected: self.n_features,
                actual: x.len(),
            });
        }

        let weights = self.leaf(x);
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Ok(vec![0.0; self.n_classes]);
        }
        Ok(weights.iter().map(|w| w / total).collect())
    }
}

/// On-disk layout, checked before it becomes a [`RandomForestClassifier`]
#[derive(Debug, Deserialize)]
struct ForestArtifact {
    n_features: usize,
    n_classes: usize,
    trees: Vec<TreeArtifact>,
}

#[derive(Debug, Deserialize)]
struct TreeArtifact {
    nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "ForestArtifact")]
pub struct RandomForestClassifier {
    n_features: usize,
    n_classes: usize,
    trees: Vec<DecisionTree>,
}

impl TryFrom<ForestArtifact> for RandomForestClassifier {
    type Error = PredictionError;

    fn try_from(artifact: ForestArtifact) -> Result<Self> {
        if artifact.trees.is_empty() {
            return Err(PredictionError::EmptyModel);
        }
        if artifact.n_features == 0 || artifact.n_classes == 0 {
            return Err(PredictionError::InvalidModel(
                "n_features and n_classes must be positive".into(),
            ));
        }
        let trees = artifact
            .trees
            .into_iter()
            .map(|tree| DecisionTree::new(tree.nodes, artifact.n_features, artifact.n_classes))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            n_features: artifact.n_features,
            n_classes: artifact.n_classes,
            trees,
        })
    }
}

impl RandomForestClassifier {
    /// Read and validate a forest artifact
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        read_artifact(path.as_ref())
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }
}

impl Classifier for RandomForestClassifier {
    fn n_features(&self) -> usize {
        self.n_features
    }

    /// Mean of the per-tree probabilities
    fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>> {
        let mut proba = vec![0.0; self.n_classes];
        for tree in &self.trees {
            for (acc, p) in proba.iter_mut().zip(tree.predict_proba(x)?) {
                *acc += p;
            }
        }
        let count = self.trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= count);
        Ok(proba)
    }
}
