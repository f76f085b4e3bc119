//! Prediction Routes

use axum::{extract::State, Json};
use feature_transformer::{FeatureVector, RawSpecification, ResolvedCategory, Transformation};
use serde::Serialize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::AppState;

/// Response for the predict endpoint
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub price: f64,
    pub formatted_price: String,
    pub model: String,
    pub latency_us: u64,
    /// Non-fatal notes such as unknown categories
    pub warnings: Vec<String>,
}

/// Response for the transform endpoint
#[derive(Debug, Serialize)]
pub struct TransformResponse {
    pub features: FeatureVector,
    pub categories: Vec<ResolvedCategory>,
    pub warnings: Vec<String>,
}

/// Validate and transform a specification
fn prepare(state: &AppState, spec: &RawSpecification) -> Result<Transformation, ApiError> {
    let result = state.validator.validate(spec);
    if !result.valid {
        return Err(ApiError::Validation(result.errors));
    }
    Ok(state.artifacts.transformer().transform_detailed(spec)?)
}

fn warnings(transformation: &Transformation) -> Vec<String> {
    transformation
        .unknown_categories()
        .iter()
        .map(|unknown| unknown.to_string())
        .collect()
}

fn record_failure(err: &ApiError) {
    metrics::counter!("car_price_prediction_failures_total", "reason" => err.kind()).increment(1);
}

/// Predict the price of a car
pub async fn predict(
    State(state): State<Arc<AppState>>,
    Json(spec): Json<RawSpecification>,
) -> Result<Json<PredictResponse>, ApiError> {
    let start = Instant::now();

    let transformation = prepare(&state, &spec).inspect_err(record_failure)?;
    let prediction = state
        .artifacts
        .engine()
        .predict(&transformation.vector)
        .map_err(ApiError::from)
        .inspect_err(record_failure)?;

    let warnings = warnings(&transformation);
    if !warnings.is_empty() {
        metrics::counter!("car_price_unknown_categories_total").increment(warnings.len() as u64);
    }

    state.prediction_count.fetch_add(1, Ordering::Relaxed);
    metrics::counter!("car_price_predictions_total").increment(1);
    metrics::histogram!("car_price_request_duration_seconds").record(start.elapsed().as_secs_f64());

    info!(
        "Predicted {} for {} {} ({} km, {} years)",
        prediction.formatted(),
        spec.brand,
        spec.model,
        spec.mileage_in_km,
        spec.vehicle_age
    );

    Ok(Json(PredictResponse {
        formatted_price: prediction.formatted(),
        price: prediction.price,
        model: prediction.model,
        latency_us: prediction.latency_us,
        warnings,
    }))
}

/// Show the processed feature vector without running the model
pub async fn transform(
    State(state): State<Arc<AppState>>,
    Json(spec): Json<RawSpecification>,
) -> Result<Json<TransformResponse>, ApiError> {
    let transformation = prepare(&state, &spec)?;
    let warnings = warnings(&transformation);
    if !warnings.is_empty() {
        warn!("Transform request with {} unknown categories", warnings.len());
    }

    Ok(Json(TransformResponse {
        features: transformation.vector,
        categories: transformation.categories,
        warnings,
    }))
}
