//! Crop Classifier Service
//!
//! Wraps the trained classifier and its label decoder. A request's
//! `(temperature, humidity, ph)` becomes a single feature row; every class
//! probability is decoded to its crop label, scaled to a percentage and
//! ranked. The top five are what callers see.

use std::cmp::Ordering;
use std::path::Path;

use anyhow::{Context, Result};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::model::{self, LabelDecoder, ModelError, ProbabilisticClassifier};

/// Feature order the classifier was fitted with
pub const FEATURE_COLUMNS: [&str; 3] = ["temperature", "humidity", "ph"];

/// Number of ranked crops returned to callers
pub const TOP_K: usize = 5;

/// A crop label with its confidence as a percentage (0-100)
#[derive(Debug, Clone, PartialEq)]
pub struct CropScore {
    pub name: String,
    pub confidence: f64,
}

impl CropScore {
    /// Two-decimal percentage string, e.g. "87.50%"
    pub fn formatted_confidence(&self) -> String {
        format!("{:.2}%", self.confidence)
    }

    pub fn is_rice(&self) -> bool {
        self.name.to_lowercase() == "rice"
    }
}

/// Wire form is a single-entry object: `{"rice": "87.50%"}`
impl Serialize for CropScore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.name, &self.formatted_confidence())?;
        map.end()
    }
}

pub struct CropClassifier {
    model: Box<dyn ProbabilisticClassifier>,
    labels: Box<dyn LabelDecoder>,
}

impl CropClassifier {
    /// Pair a model with its decoder, checking they agree on shape
    pub fn new(
        model: Box<dyn ProbabilisticClassifier>,
        labels: Box<dyn LabelDecoder>,
    ) -> Result<Self, ModelError> {
        if model.n_features() != FEATURE_COLUMNS.len() {
            return Err(ModelError::FeatureCount {
                expected: FEATURE_COLUMNS.len(),
                actual: model.n_features(),
            });
        }
        if model.n_classes() != labels.n_labels() {
            return Err(ModelError::ShapeMismatch {
                produced: model.n_classes(),
                labels: labels.n_labels(),
            });
        }
        Ok(Self { model, labels })
    }

    /// Load both artifacts from disk
    pub fn load(model_path: &Path, label_encoder_path: &Path) -> Result<Self> {
        let model = model::load_classifier(model_path)?;
        let labels = model::load_label_encoder(label_encoder_path)?;
        Self::new(model, Box::new(labels)).context("Classifier and label encoder disagree")
    }

    pub fn n_classes(&self) -> usize {
        self.labels.n_labels()
    }

    /// Every class, ranked by descending confidence.
    ///
    /// Ties keep the model's class order (stable sort).
    pub fn score_all(&self, temperature: f64, humidity: f64, ph: f64) -> Result<Vec<CropScore>, ModelError> {
        let proba = self.model.predict_proba(&[temperature, humidity, ph])?;
        if proba.len() != self.labels.n_labels() {
            return Err(ModelError::ShapeMismatch {
                produced: proba.len(),
                labels: self.labels.n_labels(),
            });
        }

        let mut scores = proba
            .iter()
            .enumerate()
            .map(|(idx, p)| -> Result<CropScore, ModelError> {
                Ok(CropScore {
                    name: self.labels.decode(idx)?.to_string(),
                    confidence: p * 100.0,
                })
            })
            .collect::<Result<Vec<_>, ModelError>>()?;

        scores.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(Ordering::Equal)
        });
        Ok(scores)
    }

    /// Top `min(5, n_classes)` crops
    pub fn classify(&self, temperature: f64, humidity: f64, ph: f64) -> Result<Vec<CropScore>, ModelError> {
        let mut scores = self.score_all(temperature, humidity, ph)?;
        scores.truncate(TOP_K);
        Ok(scores)
    }
}
