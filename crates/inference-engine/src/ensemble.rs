//! Oblivious Tree Ensemble (CatBoost JSON export)

use crate::model::PriceModel;
use crate::InferenceError;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct ModelJson {
    #[serde(default)]
    features_info: FeaturesInfo,
    oblivious_trees: Vec<TreeJson>,
    #[serde(default = "identity_scale_and_bias")]
    scale_and_bias: (f64, Vec<f64>),
}

fn identity_scale_and_bias() -> (f64, Vec<f64>) {
    (1.0, vec![0.0])
}

#[derive(Debug, Default, Deserialize)]
struct FeaturesInfo {
    #[serde(default)]
    float_features: Vec<FloatFeatureJson>,
    #[serde(default)]
    categorical_features: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct FloatFeatureJson {
    feature_index: usize,
    flat_feature_index: usize,
}

#[derive(Debug, Deserialize)]
struct TreeJson {
    leaf_values: Vec<f64>,
    splits: Vec<SplitJson>,
}

#[derive(Debug, Deserialize)]
struct SplitJson {
    split_type: String,
    #[serde(default)]
    float_feature_index: Option<usize>,
    #[serde(default)]
    border: Option<f64>,
}

/// Binary split on one feature: true when `value > border`
#[derive(Debug, Clone, PartialEq)]
struct Split {
    feature: usize,
    border: f64,
}

/// Symmetric tree; split `i` decides bit `i` of the leaf index
#[derive(Debug, Clone, PartialEq)]
struct ObliviousTree {
    splits: Vec<Split>,
    leaf_values: Vec<f64>,
}

impl ObliviousTree {
    fn leaf_index(&self, features: &[f64]) -> usize {
        self.splits
            .iter()
            .enumerate()
            .fold(0, |idx, (depth, split)| {
                if features[split.feature] > split.border {
                    idx | (1 << depth)
                } else {
                    idx
                }
            })
    }
}

/// Gradient-boosted oblivious tree ensemble evaluated in process
#[derive(Debug, Clone, PartialEq)]
pub struct ObliviousEnsemble {
    trees: Vec<ObliviousTree>,
    scale: f64,
    bias: f64,
    /// Feature count from `features_info`, when the export lists it
    declared_width: Option<usize>,
    /// Highest feature index referenced by a split, plus one
    used_width: usize,
}

impl ObliviousEnsemble {
    /// Parse a CatBoost JSON model export.
    ///
    /// Only float-feature splits are supported: categorical inputs must be
    /// one-hot encoded before they reach the model.
    pub fn from_json(json: &str) -> Result<Self, InferenceError> {
        let model: ModelJson = serde_json::from_str(json)
            .map_err(|e| InferenceError::ModelLoadError(format!("invalid model JSON: {}", e)))?;

        if !model.features_info.categorical_features.is_empty() {
            return Err(InferenceError::UnsupportedFormat(
                "model declares native categorical features".to_string(),
            ));
        }

        let flat_index = |float_index: usize| {
            model
                .features_info
                .float_features
                .iter()
                .find(|f| f.feature_index == float_index)
                .map_or(float_index, |f| f.flat_feature_index)
        };

        let mut trees = Vec::with_capacity(model.oblivious_trees.len());
        for (tree_idx, tree) in model.oblivious_trees.iter().enumerate() {
            if tree.splits.len() >= usize::BITS as usize {
                return Err(InferenceError::ModelLoadError(format!(
                    "tree {} is too deep ({} splits)",
                    tree_idx,
                    tree.splits.len()
                )));
            }
            let expected_leaves = 1usize << tree.splits.len();
            if tree.leaf_values.len() != expected_leaves {
                return Err(InferenceError::ModelLoadError(format!(
                    "tree {} has {} leaves, expected {}",
                    tree_idx,
                    tree.leaf_values.len(),
                    expected_leaves
                )));
            }

            let mut splits = Vec::with_capacity(tree.splits.len());
            for split in &tree.splits {
                match (split.split_type.as_str(), split.float_feature_index, split.border) {
                    ("FloatFeature", Some(feature), Some(border)) => splits.push(Split {
                        feature: flat_index(feature),
                        border,
                    }),
                    (other, _, _) => {
                        return Err(InferenceError::UnsupportedFormat(format!(
                            "tree {} uses unsupported split type '{}'",
                            tree_idx, other
                        )))
                    }
                }
            }

            trees.push(ObliviousTree {
                splits,
                leaf_values: tree.leaf_values.clone(),
            });
        }

        let declared_width = model
            .features_info
            .float_features
            .iter()
            .map(|f| f.flat_feature_index + 1)
            .max();
        let used_width = trees
            .iter()
            .flat_map(|t| t.splits.iter().map(|s| s.feature + 1))
            .max()
            .unwrap_or(0);

        if let Some(declared) = declared_width {
            if used_width > declared {
                return Err(InferenceError::ModelLoadError(format!(
                    "splits use {} features but only {} are declared",
                    used_width, declared
                )));
            }
        }

        let (scale, biases) = model.scale_and_bias;
        let bias = biases.first().copied().unwrap_or(0.0);

        Ok(Self {
            trees,
            scale,
            bias,
            declared_width,
            used_width,
        })
    }

    /// Load a CatBoost JSON model export from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            InferenceError::ModelLoadError(format!("{}: {}", path.display(), e))
        })?;
        let model = Self::from_json(&json)?;
        info!(
            "Loaded oblivious ensemble from {}: {} trees, {} features",
            path.display(),
            model.trees.len(),
            model.min_input_width()
        );
        Ok(model)
    }

    /// Number of trees
    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

impl PriceModel for ObliviousEnsemble {
    fn name(&self) -> &str {
        "oblivious-ensemble"
    }

    fn input_width(&self) -> Option<usize> {
        self.declared_width
    }

    fn min_input_width(&self) -> usize {
        self.declared_width.unwrap_or(self.used_width)
    }

    fn predict(&self, features: &[f64]) -> Result<f64, InferenceError> {
        let fits = match self.declared_width {
            Some(width) => features.len() == width,
            None => features.len() >= self.used_width,
        };
        if !fits {
            return Err(InferenceError::InvalidInputShape {
                expected: format!("[1, {}]", self.min_input_width()),
                actual: format!("[1, {}]", features.len()),
            });
        }

        let raw: f64 = self
            .trees
            .iter()
            .map(|tree| tree.leaf_values[tree.leaf_index(features)])
            .sum();

        debug!("Ensemble raw sum {:.4} over {} trees", raw, self.trees.len());
        Ok(self.scale * raw + self.bias)
    }
}
