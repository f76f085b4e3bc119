//! Validation Error Types

use serde::Serialize;
use thiserror::Error;

/// Errors during specification validation
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    /// Value out of allowed range
    #[error("{field} value {value} is out of range [{min}, {}]", fmt_bound(.max))]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: Option<f64>,
    },

    /// NaN or infinite numeric value
    #[error("{field} value is not a finite number")]
    NonFinite { field: &'static str },

    /// Missing or blank required field
    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },
}

fn fmt_bound(max: &Option<f64>) -> String {
    match max {
        Some(max) => max.to_string(),
        None => "inf".to_string(),
    }
}
