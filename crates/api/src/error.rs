//! API Error Responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use data_validator::ValidationError;
use feature_transformer::TransformError;
use inference_engine::InferenceError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Errors returned by request handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Specification failed validation ({} errors)", .0.len())]
    Validation(Vec<ValidationError>),
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

impl ApiError {
    /// Short label used in responses and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation",
            ApiError::Transform(TransformError::MissingField(_)) => "validation",
            ApiError::Transform(_) => "transform",
            ApiError::Inference(_) => "inference",
        }
    }

    fn status(&self) -> StatusCode {
        match self.kind() {
            "validation" => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    details: Vec<ValidationError>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let body = ErrorBody {
            error: self.kind(),
            message: self.to_string(),
            details: match self {
                ApiError::Validation(errors) => errors,
                _ => Vec::new(),
            },
        };

        (status, Json(body)).into_response()
    }
}
