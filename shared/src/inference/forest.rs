//! Random Forest classifier over flat feature vectors

use serde::{Deserialize, Serialize};

use super::InferenceError;

/// One node of an exported decision tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        /// Class weights at the leaf (counts or fractions)
        value: Vec<f64>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    /// Flattened nodes; the root is at index 0
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Class distribution at the leaf reached by `features`
    fn leaf_distribution(&self, features: &[f64]) -> Result<&[f64], InferenceError> {
        let mut index = 0;
        // a well-formed tree reaches a leaf in fewer hops than it has nodes
        for _ in 0..self.nodes.len() {
            match &self.nodes[index] {
                TreeNode::Leaf { value } => return Ok(value),
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if features[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
        Err(InferenceError::InvalidWeights(
            "decision tree contains a cycle".to_string(),
        ))
    }

    fn validate(&self, n_features: usize, tree: usize) -> Result<(), InferenceError> {
        let invalid = |msg: String| InferenceError::InvalidWeights(format!("trees[{}]: {}", tree, msg));

        if self.nodes.is_empty() {
            return Err(invalid("has no nodes".to_string()));
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(invalid(format!("node {} splits on unknown feature {}", i, feature)));
                    }
                    if !threshold.is_finite() {
                        return Err(invalid(format!("node {} has a non-finite threshold", i)));
                    }
                    if *left >= self.nodes.len() || *right >= self.nodes.len() {
                        return Err(invalid(format!("node {} points outside the tree", i)));
                    }
                }
                TreeNode::Leaf { value } => {
                    if value.len() < 2 {
                        return Err(invalid(format!("leaf {} must hold at least two classes", i)));
                    }
                    if value.iter().any(|w| !w.is_finite() || *w < 0.0) || value.iter().sum::<f64>() <= 0.0 {
                        return Err(invalid(format!("leaf {} has invalid class weights", i)));
                    }
                }
            }
        }
        Ok(())
    }
}

/// On-disk description of a Random Forest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestSpec {
    pub n_features: usize,
    pub trees: Vec<DecisionTree>,
}

/// Ensemble of decision trees; the positive-class probability is the mean of
/// the per-tree leaf class fractions
#[derive(Debug, Clone)]
pub struct RandomForest {
    n_features: usize,
    trees: Vec<DecisionTree>,
}

impl TryFrom<RandomForestSpec> for RandomForest {
    type Error = InferenceError;

    fn try_from(spec: RandomForestSpec) -> Result<Self, Self::Error> {
        if spec.trees.is_empty() {
            return Err(InferenceError::InvalidWeights(
                "forest has no trees".to_string(),
            ));
        }
        for (i, tree) in spec.trees.iter().enumerate() {
            tree.validate(spec.n_features, i)?;
        }
        Ok(Self {
            n_features: spec.n_features,
            trees: spec.trees,
        })
    }
}

impl RandomForest {
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Probability of class 1 for one feature vector
    pub fn predict_proba(&self, features: &[f64]) -> Result<f64, InferenceError> {
        if features.len() != self.n_features {
            return Err(InferenceError::ShapeMismatch {
                expected: vec![self.n_features],
                actual: vec![features.len()],
            });
        }
        if features.iter().any(|v| !v.is_finite()) {
            return Err(InferenceError::NonFinite);
        }

        let mut total = 0.0;
        for tree in &self.trees {
            let distribution = tree.leaf_distribution(features)?;
            let weight: f64 = distribution.iter().sum();
            total += distribution[1] / weight;
        }
        Ok(total / self.trees.len() as f64)
    }
}
