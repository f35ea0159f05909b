//! Crop Recommendation
//!
//! Composes the classifier and the rice variety filter for one request:
//! 1. Classify → `Top_5_Crops`
//! 2. If rice is among them → `Rice_Varieties`

use serde::{Deserialize, Serialize};

use crate::classifier::{CropClassifier, CropScore};
use crate::model::ModelError;
use crate::varieties::{RiceVarietyTable, VarietyMatch};

/// Request body for `POST /predict/`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PredictionRequest {
    pub temperature: f64,
    pub humidity: f64,
    pub ph: f64,
    pub district: String,
    pub month: String,
    pub soil_texture: String,
}

/// Response body; `Rice_Varieties` only appears when rice is in the top five
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    #[serde(rename = "Top_5_Crops")]
    pub top_crops: Vec<CropScore>,

    #[serde(rename = "Rice_Varieties", skip_serializing_if = "Option::is_none")]
    pub rice_varieties: Option<VarietyMatch>,
}

/// Shared, read-only recommendation engine
pub struct CropAdvisor {
    classifier: CropClassifier,
    varieties: RiceVarietyTable,
}

impl CropAdvisor {
    pub fn new(classifier: CropClassifier, varieties: RiceVarietyTable) -> Self {
        Self { classifier, varieties }
    }

    pub fn classifier(&self) -> &CropClassifier {
        &self.classifier
    }

    pub fn varieties(&self) -> &RiceVarietyTable {
        &self.varieties
    }

    pub fn recommend(&self, req: &PredictionRequest) -> Result<Recommendation, ModelError> {
        let top_crops = self.classifier.classify(req.temperature, req.humidity, req.ph)?;

        let rice_varieties = top_crops.iter().any(CropScore::is_rice).then(|| {
            self.varieties
                .find_varieties(&req.district, &req.month, &req.soil_texture)
        });

        Ok(Recommendation {
            top_crops,
            rice_varieties,
        })
    }
}
