//! Load-once Artifact Bundle

use crate::ArtifactError;
use feature_transformer::{
    CategoryVocabulary, ColumnLayout, ExpectedColumnSchema, FeatureTransformer, StandardScaler,
};
use inference_engine::InferenceEngine;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Locations of the training artifacts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactPaths {
    /// Historical data table (CSV), source of the category vocabulary
    pub data: Option<PathBuf>,
    /// Expected column schema (JSON array)
    pub schema: PathBuf,
    /// Fitted scaler (JSON columns/mean/scale)
    pub scaler: PathBuf,
    /// Trained model (`.json` CatBoost export or `.onnx`)
    pub model: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            data: Some(PathBuf::from("artifacts/cars_data.csv")),
            schema: PathBuf::from("artifacts/expected_columns.json"),
            scaler: PathBuf::from("artifacts/scaler.json"),
            model: PathBuf::from("artifacts/price_model.json"),
        }
    }
}

impl ArtifactPaths {
    /// Resolve every relative path against `base`
    pub fn relative_to(&self, base: &Path) -> Self {
        Self {
            data: self.data.as_ref().map(|p| base.join(p)),
            schema: base.join(&self.schema),
            scaler: base.join(&self.scaler),
            model: base.join(&self.model),
        }
    }
}

/// Immutable training artifacts shared by every request
pub struct Artifacts {
    transformer: FeatureTransformer,
    engine: InferenceEngine,
    vocabulary: Arc<CategoryVocabulary>,
}

impl Artifacts {
    /// Load and cross-check all artifacts
    pub fn load(paths: &ArtifactPaths, layout: &ColumnLayout) -> Result<Self, ArtifactError> {
        let schema = ExpectedColumnSchema::from_json(&read(&paths.schema)?)?;
        info!("Loaded schema from {}: {} columns", paths.schema.display(), schema.len());

        let scaler = StandardScaler::from_json(&read(&paths.scaler)?)?;
        info!("Loaded scaler from {}: {:?}", paths.scaler.display(), scaler.columns());

        let vocabulary = match &paths.data {
            Some(path) => {
                let file = File::open(path).map_err(|source| ArtifactError::Io {
                    path: path.clone(),
                    source,
                })?;
                CategoryVocabulary::from_reader(file)?
            }
            None => {
                warn!("No historical data configured; unknown categories cannot be detected");
                CategoryVocabulary::default()
            }
        };

        let engine = InferenceEngine::load(&paths.model, schema.len())?;

        Self::from_parts(schema, scaler, vocabulary, engine, layout)
    }

    /// Assemble artifacts that are already in memory
    pub fn from_parts(
        schema: ExpectedColumnSchema,
        scaler: StandardScaler,
        vocabulary: CategoryVocabulary,
        engine: InferenceEngine,
        layout: &ColumnLayout,
    ) -> Result<Self, ArtifactError> {
        let vocabulary = Arc::new(vocabulary);
        let mut transformer = FeatureTransformer::new(Arc::new(schema), Arc::new(scaler), layout)?;
        if !vocabulary.is_empty() {
            transformer = transformer.with_vocabulary(Arc::clone(&vocabulary));
        }

        info!(
            "Artifacts ready: {} features, model {} ({})",
            transformer.schema().len(),
            engine.model_name(),
            engine.model_path()
        );

        Ok(Self {
            transformer,
            engine,
            vocabulary,
        })
    }

    pub fn transformer(&self) -> &FeatureTransformer {
        &self.transformer
    }

    pub fn engine(&self) -> &InferenceEngine {
        &self.engine
    }

    /// Category vocabulary (empty when no historical data was configured)
    pub fn vocabulary(&self) -> &CategoryVocabulary {
        &self.vocabulary
    }
}

fn read(path: &Path) -> Result<String, ArtifactError> {
    fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })
}
