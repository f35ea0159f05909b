//! Model Artifacts
//!
//! Narrow interop boundary around the trained crop classifier:
//! - `ProbabilisticClassifier`: features → one probability per class
//! - `LabelDecoder`: class index → crop label
//!
//! Concrete models are exported from training as tagged JSON artifacts
//! (see `artifact.rs`) and evaluated natively here.

pub mod artifact;
pub mod forest;
pub mod naive_bayes;

pub use artifact::{load_classifier, load_label_encoder, ClassifierArtifact, LabelEncoder};
pub use forest::{DecisionTree, RandomForest};
pub use naive_bayes::GaussianNb;

/// Errors raised while validating or evaluating a model artifact
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Malformed artifact: {reason}")]
    Malformed { reason: String },

    #[error("Expected {expected} features, got {actual}")]
    FeatureCount { expected: usize, actual: usize },

    #[error("Class index {index} out of range ({n_classes} labels)")]
    UnknownClass { index: usize, n_classes: usize },

    #[error("Classifier produced {produced} probabilities but decoder knows {labels} labels")]
    ShapeMismatch { produced: usize, labels: usize },
}

impl ModelError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        ModelError::Malformed { reason: reason.into() }
    }
}

/// A fitted multi-class classifier exposing class probabilities
pub trait ProbabilisticClassifier: Send + Sync {
    /// Number of input features (columns) the model was fitted on
    fn n_features(&self) -> usize;

    /// Number of classes in the output distribution
    fn n_classes(&self) -> usize;

    /// Probability per class for a single row, in the model's class order
    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, ModelError>;
}

/// Maps class indices back to human-readable labels
pub trait LabelDecoder: Send + Sync {
    fn n_labels(&self) -> usize;

    fn decode(&self, index: usize) -> Result<&str, ModelError>;
}

/// Reject a feature row whose width differs from what the model was fitted on
pub(crate) fn check_width(expected: usize, features: &[f64]) -> Result<(), ModelError> {
    if features.len() != expected {
        return Err(ModelError::FeatureCount {
            expected,
            actual: features.len(),
        });
    }
    Ok(())
}
