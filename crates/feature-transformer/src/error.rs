//! Transformation Error Types

use std::fmt;
use thiserror::Error;

use crate::record::CategoricalField;

/// Errors raised while building or running the feature transformer
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    /// Loaded artifacts disagree with each other or with the column layout
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Scaler artifact holds a parameter that cannot be applied
    #[error("Invalid scaler parameters for column {column}: {reason}")]
    InvalidScaler { column: String, reason: String },

    /// Column layout requires a field the specification does not carry
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Historical data table could not be read
    #[error("Vocabulary error: {0}")]
    Vocabulary(String),
}

/// A categorical value that was never observed in the historical data.
///
/// This is a warning, not an error: the value is encoded as the field's
/// baseline (all indicator columns 0).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory {
    pub field: CategoricalField,
    pub value: String,
}

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown {} '{}', encoded as baseline",
            self.field.as_str(),
            self.value
        )
    }
}
