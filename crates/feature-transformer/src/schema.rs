//! Expected Column Schema

use crate::error::TransformError;
use std::collections::HashMap;

/// Ordered feature columns the model was trained on
#[derive(Debug, Clone, PartialEq)]
pub struct ExpectedColumnSchema {
    columns: Vec<String>,
    positions: HashMap<String, usize>,
}

impl ExpectedColumnSchema {
    /// Build a schema from column names in training order
    pub fn new(columns: Vec<String>) -> Result<Self, TransformError> {
        if columns.is_empty() {
            return Err(TransformError::SchemaMismatch(
                "column schema is empty".to_string(),
            ));
        }

        let mut positions = HashMap::with_capacity(columns.len());
        for (idx, column) in columns.iter().enumerate() {
            if positions.insert(column.clone(), idx).is_some() {
                return Err(TransformError::SchemaMismatch(format!(
                    "duplicate column '{}' in schema",
                    column
                )));
            }
        }

        Ok(Self { columns, positions })
    }

    /// Parse a schema artifact (JSON array of column names)
    pub fn from_json(json: &str) -> Result<Self, TransformError> {
        let columns: Vec<String> = serde_json::from_str(json)
            .map_err(|e| TransformError::SchemaMismatch(format!("unreadable schema: {}", e)))?;
        Self::new(columns)
    }

    /// Column names in order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Position of a column, if the schema has it
    pub fn position(&self, column: &str) -> Option<usize> {
        self.positions.get(column).copied()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.positions.contains_key(column)
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_follow_order() {
        let schema = ExpectedColumnSchema::from_json(r#"["power_kw", "brand_BMW", "vehicle_age"]"#)
            .unwrap();
        assert_eq!(schema.len(), 3);
        assert_eq!(schema.position("brand_BMW"), Some(1));
        assert_eq!(schema.position("brand_Audi"), None);
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let result = ExpectedColumnSchema::new(vec!["power_kw".into(), "power_kw".into()]);
        assert!(matches!(result, Err(TransformError::SchemaMismatch(_))));
    }

    #[test]
    fn test_empty_schema_rejected() {
        assert!(ExpectedColumnSchema::new(Vec::new()).is_err());
        assert!(ExpectedColumnSchema::from_json("{}").is_err());
    }
}
