//! Inference Engine Implementation

use crate::ensemble::ObliviousEnsemble;
use crate::model::PriceModel;
use crate::onnx::OnnxModel;
use crate::InferenceError;
use feature_transformer::FeatureVector;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Price predicted for one specification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePrediction {
    /// Predicted price
    pub price: f64,
    /// Inference latency in microseconds
    pub latency_us: u64,
    /// Backend that produced the price
    pub model: String,
}

impl PricePrediction {
    /// Price as shown to users, e.g. `$12,345.67`
    pub fn formatted(&self) -> String {
        format_price(self.price)
    }
}

/// Engine owning the loaded price model
pub struct InferenceEngine {
    model: Box<dyn PriceModel>,
    model_path: String,
}

impl InferenceEngine {
    /// Wrap an already constructed model
    pub fn new(model: Box<dyn PriceModel>, model_path: &str) -> Self {
        info!("Creating inference engine ({}) for {}", model.name(), model_path);
        Self {
            model,
            model_path: model_path.to_string(),
        }
    }

    /// Load a model file, choosing the backend by extension.
    ///
    /// `.json` files are CatBoost JSON exports; `.onnx` files run through
    /// tract with an input of `width` features. A model that declares its
    /// feature count must declare exactly `width`.
    pub fn load(path: impl AsRef<Path>, width: usize) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        let model: Box<dyn PriceModel> = match extension.as_deref() {
            Some("json") => Box::new(ObliviousEnsemble::load(path)?),
            Some("onnx") => Box::new(OnnxModel::load(path, width)?),
            _ => {
                return Err(InferenceError::UnsupportedFormat(format!(
                    "{} (expected .json or .onnx)",
                    path.display()
                )))
            }
        };

        let fits = match model.input_width() {
            Some(model_width) => model_width == width,
            None => model.min_input_width() <= width,
        };
        if !fits {
            return Err(InferenceError::InvalidInputShape {
                expected: format!(
                    "[1, {}]",
                    model.input_width().unwrap_or_else(|| model.min_input_width())
                ),
                actual: format!("[1, {}]", width),
            });
        }

        Ok(Self::new(model, &path.display().to_string()))
    }

    /// Run the model on a transformed feature vector
    pub fn predict(&self, features: &FeatureVector) -> Result<PricePrediction, InferenceError> {
        let start = Instant::now();

        let price = self.model.predict(features.values())?;
        if !price.is_finite() {
            return Err(InferenceError::InferenceFailed(format!(
                "model returned non-finite price {}",
                price
            )));
        }

        let latency_us = start.elapsed().as_micros() as u64;
        debug!("Inference completed in {}us: {:.2}", latency_us, price);

        Ok(PricePrediction {
            price,
            latency_us,
            model: self.model.name().to_string(),
        })
    }

    /// Backend name
    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Get model path
    pub fn model_path(&self) -> &str {
        &self.model_path
    }
}

/// Format a price with a dollar sign, thousands separators and two decimals
pub fn format_price(price: f64) -> String {
    let fixed = format!("{:.2}", price.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if price < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, cents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use feature_transformer::ExpectedColumnSchema;
    use std::sync::Arc;

    struct FixedModel(f64);

    impl PriceModel for FixedModel {
        fn name(&self) -> &str {
            "fixed"
        }

        fn input_width(&self) -> Option<usize> {
            Some(2)
        }

        fn predict(&self, features: &[f64]) -> Result<f64, InferenceError> {
            Ok(self.0 + features.iter().sum::<f64>())
        }
    }

    fn vector(values: Vec<f64>) -> FeatureVector {
        let schema = ExpectedColumnSchema::new(vec!["power_kw".into(), "brand_BMW".into()]).unwrap();
        FeatureVector::new(Arc::new(schema), values).unwrap()
    }

    #[test]
    fn test_predict_with_model() {
        let engine = InferenceEngine::new(Box::new(FixedModel(20_000.0)), "memory");
        let prediction = engine.predict(&vector(vec![0.5, 1.0])).unwrap();
        assert_eq!(prediction.price, 20_001.5);
        assert_eq!(prediction.model, "fixed");
        assert_eq!(prediction.formatted(), "$20,001.50");
    }

    #[test]
    fn test_non_finite_price_rejected() {
        let engine = InferenceEngine::new(Box::new(FixedModel(f64::NAN)), "memory");
        assert!(matches!(
            engine.predict(&vector(vec![0.0, 0.0])),
            Err(InferenceError::InferenceFailed(_))
        ));
    }

    #[test]
    fn test_unsupported_extension() {
        let result = InferenceEngine::load("catboost_model.cbm", 10);
        assert!(matches!(result, Err(InferenceError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_load_json_model() {
        let path = std::env::temp_dir().join(format!("price-model-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{"oblivious_trees": [{"leaf_values": [10000.0, 15000.0],
                "splits": [{"split_type": "FloatFeature", "float_feature_index": 1, "border": 0.5}]}]}"#,
        )
        .unwrap();

        let engine = InferenceEngine::load(&path, 2).unwrap();
        assert_eq!(engine.model_name(), "oblivious-ensemble");
        let prediction = engine.predict(&vector(vec![0.3, 1.0])).unwrap();
        assert_eq!(prediction.price, 15_000.0);

        let too_narrow = InferenceEngine::load(&path, 1);
        assert!(matches!(too_narrow, Err(InferenceError::InvalidInputShape { .. })));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_declared_width_must_match_schema() {
        let path = std::env::temp_dir().join(format!("narrow-model-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{"features_info": {"float_features": [
                    {"feature_index": 0, "flat_feature_index": 0},
                    {"feature_index": 1, "flat_feature_index": 1}]},
                "oblivious_trees": [{"leaf_values": [10000.0, 15000.0],
                "splits": [{"split_type": "FloatFeature", "float_feature_index": 1, "border": 0.5}]}]}"#,
        )
        .unwrap();

        assert!(InferenceEngine::load(&path, 2).is_ok());
        match InferenceEngine::load(&path, 7) {
            Err(InferenceError::InvalidInputShape { expected, actual }) => {
                assert_eq!(expected, "[1, 2]");
                assert_eq!(actual, "[1, 7]");
            }
            other => panic!("expected InvalidInputShape, got {:?}", other.err()),
        }

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(0.0), "$0.00");
        assert_eq!(format_price(999.999), "$1,000.00");
        assert_eq!(format_price(1234567.891), "$1,234,567.89");
        assert_eq!(format_price(12.3), "$12.30");
        assert_eq!(format_price(-1234.5), "-$1,234.50");
        assert_eq!(format_price(-0.001), "$0.00");
    }

    #[test]
    fn test_format_price_beyond_integer_cents() {
        // 1e20 cents does not fit in a u64
        assert_eq!(format_price(1.0e18), "$1,000,000,000,000,000,000.00");
    }
}
