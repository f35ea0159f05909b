//! Artifact loading
//!
//! Classifier JSON is tagged by `kind`:
//! ```json
//! { "kind": "random_forest", "n_features": 3, "n_classes": 22, "trees": [ ... ] }
//! { "kind": "gaussian_nb", "class_prior": [...], "theta": [[...]], "var": [[...]] }
//! ```
//! Label encoder JSON: `{ "classes": ["apple", "banana", ...] }`

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use super::{GaussianNb, LabelDecoder, ModelError, ProbabilisticClassifier, RandomForest};

/// Serialized classifier, one variant per supported model family
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierArtifact {
    RandomForest(RandomForest),
    GaussianNb(GaussianNb),
}

impl ClassifierArtifact {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse classifier artifact JSON")
    }

    /// Validate and hand back the model behind the classifier interface
    pub fn into_classifier(self) -> Result<Box<dyn ProbabilisticClassifier>, ModelError> {
        match self {
            ClassifierArtifact::RandomForest(forest) => {
                forest.validate()?;
                Ok(Box::new(forest))
            }
            ClassifierArtifact::GaussianNb(nb) => {
                nb.validate()?;
                Ok(Box::new(nb))
            }
        }
    }
}

/// Load and validate a classifier artifact from disk
pub fn load_classifier(path: &Path) -> Result<Box<dyn ProbabilisticClassifier>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read classifier artifact: {:?}", path))?;

    let model = ClassifierArtifact::from_json(&contents)
        .with_context(|| format!("Invalid classifier artifact: {:?}", path))?
        .into_classifier()
        .with_context(|| format!("Classifier artifact failed validation: {:?}", path))?;

    tracing::info!(
        "Loaded classifier ({} features, {} classes) from {:?}",
        model.n_features(),
        model.n_classes(),
        path
    );
    Ok(model)
}

/// Index-aligned class labels from training
#[derive(Debug, Clone, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new(classes: Vec<String>) -> Self {
        Self { classes }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

impl LabelDecoder for LabelEncoder {
    fn n_labels(&self) -> usize {
        self.classes.len()
    }

    fn decode(&self, index: usize) -> Result<&str, ModelError> {
        self.classes
            .get(index)
            .map(String::as_str)
            .ok_or(ModelError::UnknownClass {
                index,
                n_classes: self.classes.len(),
            })
    }
}

/// Load the label encoder from disk
pub fn load_label_encoder(path: &Path) -> Result<LabelEncoder> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read label encoder: {:?}", path))?;

    let encoder: LabelEncoder = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse label encoder JSON: {:?}", path))?;

    if encoder.classes.is_empty() {
        anyhow::bail!("Label encoder {:?} has no classes", path);
    }

    tracing::info!("Loaded {} crop labels from {:?}", encoder.classes.len(), path);
    Ok(encoder)
}
