//! One-Hot Encoding of Categorical Fields
//!
//! Encoding happens in two explicit stages: every categorical value becomes
//! an indicator key `{field}_{value}`, and the keys are later projected onto
//! the expected schema. A value whose key is not a schema column (the
//! training baseline or a value never seen in training) contributes nothing,
//! which leaves all of that field's indicator columns at 0.

use crate::record::{CategoricalField, RawSpecification};
use crate::schema::ExpectedColumnSchema;
use crate::vocabulary::CategoryVocabulary;
use serde::Serialize;

/// Indicator keys set to 1 for one specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneHotEncoding {
    indicators: Vec<Indicator>,
}

/// A single `{field}_{value}` indicator key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indicator {
    pub field: CategoricalField,
    pub value: String,
    pub column: String,
}

impl OneHotEncoding {
    /// Encode every categorical field of `spec`
    pub fn encode(spec: &RawSpecification) -> Self {
        let indicators = spec
            .categorical_values()
            .map(|(field, value)| Indicator {
                field,
                value: value.to_string(),
                column: field.indicator_column(value),
            })
            .collect();
        Self { indicators }
    }

    pub fn indicators(&self) -> &[Indicator] {
        &self.indicators
    }
}

/// How a categorical value ended up in the feature vector
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CategoryResolution {
    /// The value has its own indicator column
    Indicator { column: String },
    /// The value is the field's dropped baseline category
    Baseline,
    /// The value was never seen in the historical data
    Unknown,
    /// No indicator column and no vocabulary to tell baseline from unseen
    Unmatched,
}

impl CategoryResolution {
    /// Classify an indicator against the schema and optional vocabulary
    pub fn resolve(
        indicator: &Indicator,
        schema: &ExpectedColumnSchema,
        vocabulary: Option<&CategoryVocabulary>,
    ) -> Self {
        if schema.contains(&indicator.column) {
            return CategoryResolution::Indicator {
                column: indicator.column.clone(),
            };
        }

        match vocabulary {
            Some(vocab) if !vocab.contains(indicator.field, &indicator.value) => {
                CategoryResolution::Unknown
            }
            Some(vocab) if vocab.baseline(indicator.field) == Some(indicator.value.as_str()) => {
                CategoryResolution::Baseline
            }
            _ => CategoryResolution::Unmatched,
        }
    }
}
