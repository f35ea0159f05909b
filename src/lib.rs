//! Crop Advisor
//!
//! Crop recommendation from temperature, humidity and soil pH, with rice
//! variety suggestions by district, sowing month and soil texture.
//!
//! - `model/`: classifier artifacts (random forest, Gaussian naive Bayes) and label decoding
//! - `classifier`: ranked top-5 crop confidences
//! - `varieties`: rice variety reference table and filter
//! - `recommendation`: request/response composition
//! - `api_server`: Axum HTTP surface (feature `api`)

pub mod utils;
pub mod model;
pub mod classifier;
pub mod varieties;
pub mod recommendation;
pub mod config;

#[cfg(feature = "api")]
pub mod api_server;

// Re-export commonly used types
pub use classifier::{CropClassifier, CropScore, TOP_K};
pub use config::ServerConfig;
pub use model::{LabelDecoder, ModelError, ProbabilisticClassifier};
pub use recommendation::{CropAdvisor, PredictionRequest, Recommendation};
pub use varieties::{MonthOrdering, RiceVarietyRow, RiceVarietyTable, VarietyMatch};

#[cfg(feature = "api")]
pub use api_server::{create_router, AppState};
