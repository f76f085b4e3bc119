//! ONNX Model Backend (tract)

use crate::model::PriceModel;
use crate::InferenceError;
use std::path::Path;
use tracing::info;
use tract_onnx::prelude::*;

type OnnxPlan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// ONNX regressor taking a `[1, width]` f32 input and returning one price
pub struct OnnxModel {
    plan: OnnxPlan,
    width: usize,
}

impl OnnxModel {
    /// Load and optimize an ONNX model for inputs of `width` features
    pub fn load(path: impl AsRef<Path>, width: usize) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| model.with_input_fact(0, f32::fact([1, width]).into()))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| InferenceError::ModelLoadError(format!("{}: {}", path.display(), e)))?;

        info!("Loaded ONNX model from {} ({} features)", path.display(), width);
        Ok(Self { plan, width })
    }
}

impl PriceModel for OnnxModel {
    fn name(&self) -> &str {
        "onnx"
    }

    fn input_width(&self) -> Option<usize> {
        Some(self.width)
    }

    fn predict(&self, features: &[f64]) -> Result<f64, InferenceError> {
        if features.len() != self.width {
            return Err(InferenceError::InvalidInputShape {
                expected: format!("[1, {}]", self.width),
                actual: format!("[1, {}]", features.len()),
            });
        }

        let row: Vec<f32> = features.iter().map(|&v| v as f32).collect();
        let input = Tensor::from_shape(&[1, self.width], &row)
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        let output = outputs
            .first()
            .ok_or_else(|| InferenceError::InferenceFailed("model produced no output".to_string()))?;
        let prices = output
            .cast_to::<f32>()
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;
        let price = prices
            .as_slice::<f32>()
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?
            .first()
            .copied()
            .ok_or_else(|| InferenceError::InferenceFailed("model output is empty".to_string()))?;

        Ok(f64::from(price))
    }
}
