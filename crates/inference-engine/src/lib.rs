//! Price Inference Engine
//!
//! Evaluates the trained price model on a transformed feature vector. Models
//! exported from CatBoost as JSON are evaluated natively; ONNX exports run
//! through tract-onnx.

mod engine;
mod ensemble;
mod model;
mod onnx;

pub use engine::{format_price, InferenceEngine, PricePrediction};
pub use ensemble::ObliviousEnsemble;
pub use model::PriceModel;
pub use onnx::OnnxModel;

use thiserror::Error;

/// Errors during inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: String, actual: String },
    #[error("Unsupported model format: {0}")]
    UnsupportedFormat(String),
}
