//! Feature Transformer
//!
//! Turns one [`RawSpecification`] into the scaled, one-hot encoded
//! [`FeatureVector`] the price model was trained on:
//!
//! 1. assemble the numeric values under their schema column names
//! 2. encode every categorical value as a `{field}_{value}` indicator
//! 3. project onto the expected schema, filling absent columns with 0
//! 4. z-score the numeric columns with the fitted scaler

use crate::encoding::{CategoryResolution, OneHotEncoding};
use crate::error::{TransformError, UnknownCategory};
use crate::record::{CategoricalField, ColumnLayout, NumericField, RawSpecification};
use crate::scaler::StandardScaler;
use crate::schema::ExpectedColumnSchema;
use crate::vector::FeatureVector;
use crate::vocabulary::CategoryVocabulary;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A numeric input bound to its schema position (index == scaler index)
#[derive(Debug, Clone)]
struct NumericColumn {
    field: NumericField,
    column: String,
    position: usize,
}

/// Resolution of one categorical value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedCategory {
    pub field: CategoricalField,
    pub value: String,
    pub resolution: CategoryResolution,
}

/// Feature vector plus how each categorical value was encoded
#[derive(Debug, Clone)]
pub struct Transformation {
    pub vector: FeatureVector,
    pub categories: Vec<ResolvedCategory>,
}

impl Transformation {
    /// Categorical values absent from the vocabulary
    pub fn unknown_categories(&self) -> Vec<UnknownCategory> {
        self.categories
            .iter()
            .filter(|c| c.resolution == CategoryResolution::Unknown)
            .map(|c| UnknownCategory {
                field: c.field,
                value: c.value.clone(),
            })
            .collect()
    }
}

/// Stateless transformer over shared, read-only training artifacts
#[derive(Debug, Clone)]
pub struct FeatureTransformer {
    schema: Arc<ExpectedColumnSchema>,
    scaler: Arc<StandardScaler>,
    vocabulary: Option<Arc<CategoryVocabulary>>,
    numeric: Vec<NumericColumn>,
}

impl FeatureTransformer {
    /// Bind the artifacts together, checking that they agree.
    ///
    /// The layout's numeric column list must equal the scaler's fitted
    /// column list one-to-one, every numeric column must exist in the
    /// schema, and every schema column must be either a numeric column or
    /// an indicator owned by a categorical field. Any failure is a
    /// [`TransformError::SchemaMismatch`].
    pub fn new(
        schema: Arc<ExpectedColumnSchema>,
        scaler: Arc<StandardScaler>,
        layout: &ColumnLayout,
    ) -> Result<Self, TransformError> {
        let fields = layout.fields();

        if fields.len() != scaler.len() {
            return Err(TransformError::SchemaMismatch(format!(
                "numeric columns {:?} do not align with scaler columns {:?}",
                layout.numeric_columns(),
                scaler.columns()
            )));
        }

        let mut numeric = Vec::with_capacity(fields.len());
        for (idx, (field, column)) in fields.into_iter().enumerate() {
            let fitted = &scaler.columns()[idx];
            if fitted != column {
                return Err(TransformError::SchemaMismatch(format!(
                    "numeric column {} is '{}' but scaler was fitted on '{}'",
                    idx, column, fitted
                )));
            }
            let position = schema.position(column).ok_or_else(|| {
                TransformError::SchemaMismatch(format!(
                    "numeric column '{}' is not in the expected schema",
                    column
                ))
            })?;
            numeric.push(NumericColumn {
                field,
                column: column.to_string(),
                position,
            });
        }

        // Every schema column must be fed by a numeric input or an indicator
        if let Some(column) = schema.columns().iter().find(|column| {
            !numeric.iter().any(|n| &n.column == *column)
                && !CategoricalField::ALL.iter().any(|f| f.owns_column(column))
        }) {
            return Err(TransformError::SchemaMismatch(format!(
                "schema column '{}' is not produced by any input field",
                column
            )));
        }

        info!(
            "Feature transformer ready: {} columns, {} scaled",
            schema.len(),
            numeric.len()
        );

        Ok(Self {
            schema,
            scaler,
            vocabulary: None,
            numeric,
        })
    }

    /// Attach the historical vocabulary used to classify categories
    pub fn with_vocabulary(mut self, vocabulary: Arc<CategoryVocabulary>) -> Self {
        self.vocabulary = Some(vocabulary);
        self
    }

    /// Transform a specification into the model's feature vector
    pub fn transform(&self, spec: &RawSpecification) -> Result<FeatureVector, TransformError> {
        self.encode_and_project(spec).map(|(vector, _)| vector)
    }

    /// Transform and report how each categorical value was encoded
    pub fn transform_detailed(
        &self,
        spec: &RawSpecification,
    ) -> Result<Transformation, TransformError> {
        let (vector, encoding) = self.encode_and_project(spec)?;

        let categories: Vec<ResolvedCategory> = encoding
            .indicators()
            .iter()
            .map(|indicator| ResolvedCategory {
                field: indicator.field,
                value: indicator.value.clone(),
                resolution: CategoryResolution::resolve(
                    indicator,
                    &self.schema,
                    self.vocabulary.as_deref(),
                ),
            })
            .collect();

        for category in &categories {
            if category.resolution == CategoryResolution::Unknown {
                warn!(
                    "Unknown {} '{}', encoding as baseline",
                    category.field, category.value
                );
            }
        }

        Ok(Transformation { vector, categories })
    }

    fn encode_and_project(
        &self,
        spec: &RawSpecification,
    ) -> Result<(FeatureVector, OneHotEncoding), TransformError> {
        // Assemble
        let mut row: Vec<(&str, f64)> = Vec::with_capacity(self.numeric.len() + 5);
        for numeric in &self.numeric {
            let value = spec
                .numeric(numeric.field)
                .ok_or(TransformError::MissingField(numeric.field.as_str()))?;
            row.push((numeric.column.as_str(), value));
        }

        // Encode
        let encoding = OneHotEncoding::encode(spec);
        row.extend(encoding.indicators().iter().map(|i| (i.column.as_str(), 1.0)));

        // Project; keys outside the schema are dropped
        let mut values = vec![0.0; self.schema.len()];
        for (column, value) in row {
            if let Some(position) = self.schema.position(column) {
                values[position] = value;
            }
        }

        // Scale
        for (idx, numeric) in self.numeric.iter().enumerate() {
            values[numeric.position] = self.scaler.scale_value(idx, values[numeric.position]);
        }

        debug!(
            "Transformed {} {} into {} features",
            spec.brand,
            spec.model,
            values.len()
        );

        let vector = FeatureVector::new(Arc::clone(&self.schema), values)?;
        Ok((vector, encoding))
    }

    pub fn schema(&self) -> &Arc<ExpectedColumnSchema> {
        &self.schema
    }

    pub fn scaler(&self) -> &Arc<StandardScaler> {
        &self.scaler
    }

    pub fn vocabulary(&self) -> Option<&Arc<CategoryVocabulary>> {
        self.vocabulary.as_ref()
    }

    /// Numeric columns in scaler order
    pub fn numeric_columns(&self) -> impl Iterator<Item = &str> + '_ {
        self.numeric.iter().map(|n| n.column.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EXAMPLE_COLUMNS: [&str; 7] = [
        "power_kw",
        "power_ps",
        "mileage_in_km",
        "vehicle_age",
        "brand_BMW",
        "brand_Audi",
        "transmission_type_Manual",
    ];

    fn example_transformer() -> FeatureTransformer {
        let schema = ExpectedColumnSchema::new(
            EXAMPLE_COLUMNS.iter().map(|c| c.to_string()).collect(),
        )
        .unwrap();
        let scaler = StandardScaler::new([
            ("power_kw", 100.0, 50.0),
            ("power_ps", 140.0, 60.0),
            ("mileage_in_km", 60000.0, 30000.0),
            ("vehicle_age", 5.0, 3.0),
        ])
        .unwrap();
        FeatureTransformer::new(
            Arc::new(schema),
            Arc::new(scaler),
            &ColumnLayout::without_fuel_consumption(),
        )
        .unwrap()
    }

    fn example_spec() -> RawSpecification {
        RawSpecification {
            brand: "BMW".to_string(),
            model: "X5".to_string(),
            color: "black".to_string(),
            transmission_type: "Manual".to_string(),
            fuel_type: "Diesel".to_string(),
            power_kw: 150.0,
            power_ps: 200.0,
            fuel_consumption_l_100km: None,
            mileage_in_km: 90_000,
            vehicle_age: 8,
        }
    }

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9, "{:?} != {:?}", actual, expected);
        }
    }

    #[test]
    fn test_end_to_end_example() {
        let vector = example_transformer().transform(&example_spec()).unwrap();
        assert_close(vector.values(), &[1.0, 1.0, 1.0, 1.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_unrecognized_brand_is_all_zero() {
        let spec = RawSpecification {
            brand: "Toyota".to_string(),
            ..example_spec()
        };
        let vector = example_transformer().transform(&spec).unwrap();
        assert_eq!(vector.get("brand_BMW"), Some(0.0));
        assert_eq!(vector.get("brand_Audi"), Some(0.0));
        assert_eq!(vector.get("transmission_type_Manual"), Some(1.0));
    }

    #[test]
    fn test_baseline_transmission_is_all_zero() {
        let spec = RawSpecification {
            transmission_type: "Automatic".to_string(),
            ..example_spec()
        };
        let vector = example_transformer().transform(&spec).unwrap();
        assert_eq!(vector.get("transmission_type_Manual"), Some(0.0));
    }

    #[test]
    fn test_out_of_range_values_pass_through() {
        let spec = RawSpecification {
            power_kw: -10.0,
            power_ps: 1.0e9,
            ..example_spec()
        };
        let vector = example_transformer().transform(&spec).unwrap();
        assert!((vector.get("power_kw").unwrap() - (-110.0 / 50.0)).abs() < 1e-9);
    }

    #[test]
    fn test_scaler_order_mismatch() {
        let schema = Arc::new(
            ExpectedColumnSchema::new(EXAMPLE_COLUMNS.iter().map(|c| c.to_string()).collect())
                .unwrap(),
        );
        let scaler = Arc::new(
            StandardScaler::new([
                ("power_ps", 140.0, 60.0),
                ("power_kw", 100.0, 50.0),
                ("mileage_in_km", 60000.0, 30000.0),
                ("vehicle_age", 5.0, 3.0),
            ])
            .unwrap(),
        );
        let result =
            FeatureTransformer::new(schema, scaler, &ColumnLayout::without_fuel_consumption());
        assert!(matches!(result, Err(TransformError::SchemaMismatch(_))));
    }

    #[test]
    fn test_scaler_length_mismatch() {
        let schema = Arc::new(
            ExpectedColumnSchema::new(EXAMPLE_COLUMNS.iter().map(|c| c.to_string()).collect())
                .unwrap(),
        );
        let scaler = Arc::new(
            StandardScaler::new([
                ("power_kw", 100.0, 50.0),
                ("power_ps", 140.0, 60.0),
                ("mileage_in_km", 60000.0, 30000.0),
                ("vehicle_age", 5.0, 3.0),
            ])
            .unwrap(),
        );
        // Default layout expects a fuel consumption column the scaler lacks
        let result = FeatureTransformer::new(schema, scaler, &ColumnLayout::default());
        assert!(matches!(result, Err(TransformError::SchemaMismatch(_))));
    }

    #[test]
    fn test_numeric_column_missing_from_schema() {
        let schema = Arc::new(
            ExpectedColumnSchema::new(vec![
                "power_kw".into(),
                "power_ps".into(),
                "vehicle_age".into(),
            ])
            .unwrap(),
        );
        let scaler = Arc::new(
            StandardScaler::new([
                ("power_kw", 100.0, 50.0),
                ("power_ps", 140.0, 60.0),
                ("mileage_in_km", 60000.0, 30000.0),
                ("vehicle_age", 5.0, 3.0),
            ])
            .unwrap(),
        );
        let result =
            FeatureTransformer::new(schema, scaler, &ColumnLayout::without_fuel_consumption());
        assert!(matches!(result, Err(TransformError::SchemaMismatch(_))));
    }

    #[test]
    fn test_schema_column_without_input() {
        // Schema from a variant that was trained with fuel consumption
        let schema = Arc::new(
            ExpectedColumnSchema::new(vec![
                "power_kw".into(),
                "power_ps".into(),
                "fuel_consumption_l_100km.1".into(),
                "mileage_in_km".into(),
                "vehicle_age".into(),
                "brand_BMW".into(),
            ])
            .unwrap(),
        );
        let scaler = Arc::new(
            StandardScaler::new([
                ("power_kw", 100.0, 50.0),
                ("power_ps", 140.0, 60.0),
                ("mileage_in_km", 60000.0, 30000.0),
                ("vehicle_age", 5.0, 3.0),
            ])
            .unwrap(),
        );
        let result =
            FeatureTransformer::new(schema, scaler, &ColumnLayout::without_fuel_consumption());
        match result {
            Err(TransformError::SchemaMismatch(message)) => {
                assert!(message.contains("fuel_consumption_l_100km.1"), "{}", message)
            }
            other => panic!("expected SchemaMismatch, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_fuel_consumption_layout() {
        let schema = Arc::new(
            ExpectedColumnSchema::new(vec![
                "power_kw".into(),
                "power_ps".into(),
                "fuel_consumption_l_100km.1".into(),
                "mileage_in_km".into(),
                "vehicle_age".into(),
                "fuel_type_Petrol".into(),
            ])
            .unwrap(),
        );
        let scaler = Arc::new(
            StandardScaler::new([
                ("power_kw", 100.0, 50.0),
                ("power_ps", 140.0, 60.0),
                ("fuel_consumption_l_100km.1", 7.0, 2.0),
                ("mileage_in_km", 60000.0, 30000.0),
                ("vehicle_age", 5.0, 3.0),
            ])
            .unwrap(),
        );
        let transformer =
            FeatureTransformer::new(schema, scaler, &ColumnLayout::default()).unwrap();

        let missing = transformer.transform(&example_spec());
        assert_eq!(
            missing.unwrap_err(),
            TransformError::MissingField("fuel_consumption_l_100km")
        );

        let spec = RawSpecification {
            fuel_consumption_l_100km: Some(9.0),
            ..example_spec()
        };
        let vector = transformer.transform(&spec).unwrap();
        assert_eq!(vector.get("fuel_consumption_l_100km.1"), Some(1.0));
        assert_eq!(vector.get("fuel_type_Petrol"), Some(0.0));
    }

    #[test]
    fn test_extra_fuel_consumption_is_dropped() {
        let spec = RawSpecification {
            fuel_consumption_l_100km: Some(6.5),
            ..example_spec()
        };
        let vector = example_transformer().transform(&spec).unwrap();
        assert_eq!(vector.len(), EXAMPLE_COLUMNS.len());
        assert_close(vector.values(), &[1.0, 1.0, 1.0, 1.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_detailed_reports_unknown_categories() {
        let vocabulary = CategoryVocabulary::from_values([
            (CategoricalField::Brand, "Audi"),
            (CategoricalField::Brand, "BMW"),
            (CategoricalField::Model, "X5"),
            (CategoricalField::Color, "black"),
            (CategoricalField::TransmissionType, "Automatic"),
            (CategoricalField::TransmissionType, "Manual"),
            (CategoricalField::FuelType, "Diesel"),
        ]);
        let transformer = example_transformer().with_vocabulary(Arc::new(vocabulary));

        let spec = RawSpecification {
            brand: "Toyota".to_string(),
            ..example_spec()
        };
        let transformation = transformer.transform_detailed(&spec).unwrap();

        let unknown = transformation.unknown_categories();
        assert_eq!(unknown.len(), 1);
        assert_eq!(unknown[0].field, CategoricalField::Brand);
        assert_eq!(unknown[0].value, "Toyota");

        let transmission = &transformation.categories[3];
        assert_eq!(
            transmission.resolution,
            CategoryResolution::Indicator {
                column: "transmission_type_Manual".to_string()
            }
        );
        // model X5 is the only (so baseline) model in the vocabulary
        assert_eq!(transformation.categories[1].resolution, CategoryResolution::Baseline);
    }

    fn arb_spec() -> impl Strategy<Value = RawSpecification> {
        (
            prop::sample::select(vec!["BMW", "Audi", "Toyota", "Alfa Romeo"]),
            prop::sample::select(vec!["Manual", "Automatic", "Semi-automatic"]),
            -1.0e6f64..1.0e6,
            -1.0e6f64..1.0e6,
            0u64..2_000_000,
            0u32..80,
        )
            .prop_map(|(brand, transmission, kw, ps, mileage, age)| RawSpecification {
                brand: brand.to_string(),
                transmission_type: transmission.to_string(),
                power_kw: kw,
                power_ps: ps,
                mileage_in_km: mileage,
                vehicle_age: age,
                ..example_spec()
            })
    }

    proptest! {
        #[test]
        fn prop_transform_is_idempotent(spec in arb_spec()) {
            let transformer = example_transformer();
            let first = transformer.transform(&spec).unwrap();
            let second = transformer.transform(&spec).unwrap();
            let first_bits: Vec<u64> = first.values().iter().map(|v| v.to_bits()).collect();
            let second_bits: Vec<u64> = second.values().iter().map(|v| v.to_bits()).collect();
            prop_assert_eq!(first_bits, second_bits);
        }

        #[test]
        fn prop_output_matches_schema(spec in arb_spec()) {
            let vector = example_transformer().transform(&spec).unwrap();
            let columns: Vec<&str> = vector.columns().iter().map(String::as_str).collect();
            prop_assert_eq!(columns, EXAMPLE_COLUMNS.to_vec());
        }

        #[test]
        fn prop_numeric_columns_are_zscored(spec in arb_spec()) {
            let vector = example_transformer().transform(&spec).unwrap();
            let expected = [
                ("power_kw", (spec.power_kw - 100.0) / 50.0),
                ("power_ps", (spec.power_ps - 140.0) / 60.0),
                ("mileage_in_km", (spec.mileage_in_km as f64 - 60000.0) / 30000.0),
                ("vehicle_age", (f64::from(spec.vehicle_age) - 5.0) / 3.0),
            ];
            for (column, value) in expected {
                prop_assert!((vector.get(column).unwrap() - value).abs() < 1e-9);
            }
        }

        #[test]
        fn prop_indicators_stay_binary(spec in arb_spec()) {
            let vector = example_transformer().transform(&spec).unwrap();
            for column in ["brand_BMW", "brand_Audi", "transmission_type_Manual"] {
                let value = vector.get(column).unwrap();
                prop_assert!(value == 0.0 || value == 1.0);
            }
            let brand_hits = vector.get("brand_BMW").unwrap() + vector.get("brand_Audi").unwrap();
            let expected = if spec.brand == "BMW" || spec.brand == "Audi" { 1.0 } else { 0.0 };
            prop_assert_eq!(brand_hits, expected);
        }
    }
}
