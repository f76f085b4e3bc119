//! Feature Vector Aligned to the Expected Schema

use crate::error::TransformError;
use crate::schema::ExpectedColumnSchema;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::sync::Arc;

/// Single-row model input, one value per schema column in schema order
#[derive(Debug, Clone)]
pub struct FeatureVector {
    schema: Arc<ExpectedColumnSchema>,
    values: Vec<f64>,
}

impl FeatureVector {
    /// Wrap values that are already aligned to `schema`
    pub fn new(schema: Arc<ExpectedColumnSchema>, values: Vec<f64>) -> Result<Self, TransformError> {
        if values.len() != schema.len() {
            return Err(TransformError::SchemaMismatch(format!(
                "vector has {} values but schema has {} columns",
                values.len(),
                schema.len()
            )));
        }
        Ok(Self { schema, values })
    }

    /// Raw values in schema order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Column names in schema order
    pub fn columns(&self) -> &[String] {
        self.schema.columns()
    }

    /// Value of a named column
    pub fn get(&self, column: &str) -> Option<f64> {
        self.schema.position(column).map(|idx| self.values[idx])
    }

    /// `(column, value)` pairs in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.schema
            .columns()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl PartialEq for FeatureVector {
    fn eq(&self, other: &Self) -> bool {
        (Arc::ptr_eq(&self.schema, &other.schema) || self.schema == other.schema)
            && self.values == other.values
    }
}

/// Serializes as a JSON object whose keys keep schema order
impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, &value)?;
        }
        map.end()
    }
}
