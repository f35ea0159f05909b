//! Random forest evaluation over exported decision trees
//!
//! Each tree uses the parallel-array node layout of a fitted CART tree:
//! node `i` splits on `feature[i]` at `threshold[i]`, sending rows with
//! `x[feature] <= threshold` to `children_left[i]` and the rest to
//! `children_right[i]`. Leaves carry `-1` children and a per-class weight
//! row in `value[i]`.

use serde::Deserialize;

use super::{check_width, ModelError, ProbabilisticClassifier};

const LEAF: i64 = -1;

/// One fitted tree in parallel-array form
#[derive(Debug, Clone, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node class weights (sample counts or fractions)
    pub value: Vec<Vec<f64>>,
}

impl DecisionTree {
    pub fn n_nodes(&self) -> usize {
        self.children_left.len()
    }

    pub fn n_leaves(&self) -> usize {
        self.children_left.iter().filter(|&&c| c == LEAF).count()
    }

    /// Check structural consistency against the forest's dimensions.
    ///
    /// Children must point strictly forward (pre-order layout), which also
    /// rules out cycles during traversal.
    pub fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), ModelError> {
        let n = self.n_nodes();
        if n == 0 {
            return Err(ModelError::malformed("tree has no nodes"));
        }
        if self.children_right.len() != n
            || self.feature.len() != n
            || self.threshold.len() != n
            || self.value.len() != n
        {
            return Err(ModelError::malformed(format!(
                "node arrays disagree in length (left={}, right={}, feature={}, threshold={}, value={})",
                n,
                self.children_right.len(),
                self.feature.len(),
                self.threshold.len(),
                self.value.len()
            )));
        }

        for node in 0..n {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            let row = &self.value[node];
            if row.len() != n_classes {
                return Err(ModelError::malformed(format!(
                    "node {} has {} class weights, expected {}",
                    node,
                    row.len(),
                    n_classes
                )));
            }

            if left == LEAF || right == LEAF {
                if left != right {
                    return Err(ModelError::malformed(format!(
                        "node {} has exactly one child",
                        node
                    )));
                }
                let total: f64 = row.iter().sum();
                if total.is_nan() || total <= 0.0 {
                    return Err(ModelError::malformed(format!(
                        "leaf {} has no class weight",
                        node
                    )));
                }
                continue;
            }

            for child in [left, right] {
                if child <= node as i64 || child >= n as i64 {
                    return Err(ModelError::malformed(format!(
                        "node {} points to invalid child {}",
                        node, child
                    )));
                }
            }
            let feature = self.feature[node];
            if feature < 0 || feature as usize >= n_features {
                return Err(ModelError::malformed(format!(
                    "node {} splits on feature {} (model has {})",
                    node, feature, n_features
                )));
            }
        }

        Ok(())
    }

    /// Index of the leaf reached by `features`.
    ///
    /// Assumes `validate` passed. NaN comparisons are false, so NaN goes right.
    pub fn apply(&self, features: &[f64]) -> usize {
        let mut node = 0usize;
        while self.children_left[node] != LEAF {
            let x = features[self.feature[node] as usize];
            node = if x <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        node
    }

    /// Class distribution of the reached leaf, normalized to sum 1
    pub fn predict_proba(&self, features: &[f64]) -> Vec<f64> {
        let row = &self.value[self.apply(features)];
        let total: f64 = row.iter().sum();
        row.iter().map(|w| w / total).collect()
    }
}

/// Ensemble of trees whose probabilities are averaged
#[derive(Debug, Clone, Deserialize)]
pub struct RandomForest {
    pub n_features: usize,
    pub n_classes: usize,
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::malformed("forest has no trees"));
        }
        if self.n_classes == 0 {
            return Err(ModelError::malformed("forest declares zero classes"));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features, self.n_classes)
                .map_err(|e| ModelError::malformed(format!("tree {}: {}", i, e)))?;
        }
        Ok(())
    }
}

impl ProbabilisticClassifier for RandomForest {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, ModelError> {
        check_width(self.n_features, features)?;

        let mut proba = vec![0.0; self.n_classes];
        for tree in &self.trees {
            for (acc, p) in proba.iter_mut().zip(tree.predict_proba(features)) {
                *acc += p;
            }
        }

        let n_trees = self.trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n_trees);
        Ok(proba)
    }
}
