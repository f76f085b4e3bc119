//! Artifact Store
//!
//! Loads the training artifacts once at startup and hands them out as
//! immutable, shared state.

mod store;

pub use store::{ArtifactPaths, Artifacts};

use feature_transformer::TransformError;
use inference_engine::InferenceError;
use std::path::PathBuf;
use thiserror::Error;

/// Artifact loading errors
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error(transparent)]
    Inference(#[from] InferenceError),
}
