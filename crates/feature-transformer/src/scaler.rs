//! Standard Scaling with Fitted Parameters

use crate::error::TransformError;
use serde::{Deserialize, Serialize};

/// Scaler artifact as written by the training toolchain
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScalerArtifact {
    columns: Vec<String>,
    mean: Vec<f64>,
    scale: Vec<f64>,
}

/// Z-score scaler with per-column mean and scale fitted at training time
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    columns: Vec<String>,
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    /// Create a scaler from `(column, mean, scale)` entries in fitted order
    pub fn new<I, S>(entries: I) -> Result<Self, TransformError>
    where
        I: IntoIterator<Item = (S, f64, f64)>,
        S: Into<String>,
    {
        let mut columns = Vec::new();
        let mut mean = Vec::new();
        let mut scale = Vec::new();
        for (column, m, s) in entries {
            columns.push(column.into());
            mean.push(m);
            scale.push(s);
        }
        Self::from_parts(columns, mean, scale)
    }

    /// Parse a scaler artifact (`{"columns": [..], "mean": [..], "scale": [..]}`)
    pub fn from_json(json: &str) -> Result<Self, TransformError> {
        let artifact: ScalerArtifact = serde_json::from_str(json).map_err(|e| {
            TransformError::SchemaMismatch(format!("unreadable scaler artifact: {}", e))
        })?;
        Self::from_parts(artifact.columns, artifact.mean, artifact.scale)
    }

    fn from_parts(
        columns: Vec<String>,
        mean: Vec<f64>,
        scale: Vec<f64>,
    ) -> Result<Self, TransformError> {
        if columns.len() != mean.len() || columns.len() != scale.len() {
            return Err(TransformError::SchemaMismatch(format!(
                "scaler has {} columns but {} means and {} scales",
                columns.len(),
                mean.len(),
                scale.len()
            )));
        }

        for ((column, &m), &s) in columns.iter().zip(&mean).zip(&scale) {
            if !m.is_finite() {
                return Err(TransformError::InvalidScaler {
                    column: column.clone(),
                    reason: format!("mean {} is not finite", m),
                });
            }
            if !s.is_finite() || s == 0.0 {
                return Err(TransformError::InvalidScaler {
                    column: column.clone(),
                    reason: format!("scale {} must be finite and non-zero", s),
                });
            }
        }

        Ok(Self {
            columns,
            mean,
            scale,
        })
    }

    /// Columns in the order the scaler was fitted on
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// `(mean, scale)` of the column at `idx` in fitted order
    pub fn params(&self, idx: usize) -> (f64, f64) {
        (self.mean[idx], self.scale[idx])
    }

    /// Scale a value of the column at `idx` in fitted order
    pub fn scale_value(&self, idx: usize, value: f64) -> f64 {
        (value - self.mean[idx]) / self.scale[idx]
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
