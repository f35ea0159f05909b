// Axum API Server Module
//
// Purpose: REST API exposing crop recommendation (classifier + rice variety filter)

#[cfg(feature = "api")]
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};

#[cfg(feature = "api")]
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[cfg(feature = "api")]
use std::sync::Arc;

#[cfg(feature = "api")]
use crate::classifier::CropClassifier;

#[cfg(feature = "api")]
use crate::config::ServerConfig;

#[cfg(feature = "api")]
use crate::recommendation::{CropAdvisor, PredictionRequest, Recommendation};

#[cfg(feature = "api")]
use crate::varieties::RiceVarietyTable;

// ============================================================================
// Application State
// ============================================================================

#[cfg(feature = "api")]
#[derive(Clone)]
pub struct AppState {
    pub advisor: Arc<CropAdvisor>,
}

#[cfg(feature = "api")]
impl AppState {
    /// Load every startup artifact; any failure here is fatal
    pub fn new(config: &ServerConfig) -> anyhow::Result<Self> {
        tracing::info!("Loading crop classifier...");
        let classifier = CropClassifier::load(&config.model_path, &config.label_encoder_path)?;

        tracing::info!("Loading rice variety reference table...");
        let varieties = RiceVarietyTable::from_csv(&config.rice_data_path, config.month_ordering)?;

        Ok(Self::from_advisor(CropAdvisor::new(classifier, varieties)))
    }

    pub fn from_advisor(advisor: CropAdvisor) -> Self {
        Self {
            advisor: Arc::new(advisor),
        }
    }
}

// ============================================================================
// Router
// ============================================================================

#[cfg(feature = "api")]
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))

        // Prediction (with and without trailing slash)
        .route("/predict/", post(predict_crop))
        .route("/predict", post(predict_crop))

        // Middleware (applied in reverse order)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

#[cfg(feature = "api")]
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "classes": state.advisor.classifier().n_classes(),
        "rice_varieties": state.advisor.varieties().len(),
    }))
}

/// Top-5 crops, plus rice varieties when rice is among them
#[cfg(feature = "api")]
async fn predict_crop(
    State(state): State<AppState>,
    Json(payload): Json<PredictionRequest>,
) -> Result<Json<Recommendation>, AppError> {
    let recommendation = state
        .advisor
        .recommend(&payload)
        .map_err(|e| AppError::Internal(format!("Prediction failed: {}", e)))?;

    tracing::debug!(
        "Predicted {:?} for T={} H={} pH={} (rice varieties: {})",
        recommendation.top_crops.first().map(|c| c.name.as_str()),
        payload.temperature,
        payload.humidity,
        payload.ph,
        recommendation.rice_varieties.is_some()
    );

    Ok(Json(recommendation))
}

// ============================================================================
// Error Handling
// ============================================================================

#[cfg(feature = "api")]
#[derive(Debug)]
pub enum AppError {
    Internal(String),
}

#[cfg(feature = "api")]
impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::Internal(msg) => {
                tracing::error!("{}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
