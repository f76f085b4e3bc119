//! Specification Validator for Range Checking

use crate::error::ValidationError;
use feature_transformer::{CategoricalField, NumericField, RawSpecification, KW_PER_PS};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Inclusive lower bound with an optional upper bound
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    #[serde(default)]
    pub max: Option<f64>,
}

impl Bounds {
    /// Bounded below only
    pub const fn at_least(min: f64) -> Self {
        Self { min, max: None }
    }

    fn contains(&self, value: f64) -> bool {
        value >= self.min && self.max.map_or(true, |max| value <= max)
    }
}

/// Validation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Engine power (kW)
    pub power_kw: Bounds,
    /// Engine power (PS)
    pub power_ps: Bounds,
    /// Fuel consumption (L/100km), checked only when present
    pub fuel_consumption: Bounds,
    /// Mileage (km)
    pub mileage_in_km: Bounds,
    /// Vehicle age (years)
    pub vehicle_age: Bounds,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            power_kw: Bounds::at_least(50.0 * KW_PER_PS),
            power_ps: Bounds::at_least(50.0),
            fuel_consumption: Bounds::at_least(0.0),
            mileage_in_km: Bounds::at_least(0.0),
            vehicle_age: Bounds::at_least(0.0),
        }
    }
}

impl ValidationConfig {
    fn bounds(&self, field: NumericField) -> Bounds {
        match field {
            NumericField::PowerKw => self.power_kw,
            NumericField::PowerPs => self.power_ps,
            NumericField::FuelConsumption => self.fuel_consumption,
            NumericField::MileageInKm => self.mileage_in_km,
            NumericField::VehicleAge => self.vehicle_age,
        }
    }
}

/// Result of validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether all values are valid
    pub valid: bool,
    /// List of validation errors
    pub errors: Vec<ValidationError>,
    /// Number of fields validated
    pub fields_checked: usize,
}

impl ValidationResult {
    /// Build a result from collected errors
    fn from_errors(errors: Vec<ValidationError>, fields_checked: usize) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            fields_checked,
        }
    }
}

const NUMERIC_FIELDS: [NumericField; 5] = [
    NumericField::PowerKw,
    NumericField::PowerPs,
    NumericField::FuelConsumption,
    NumericField::MileageInKm,
    NumericField::VehicleAge,
];

/// Validator for car specifications submitted by callers
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate a single value against its bounds
    pub fn validate_range(
        &self,
        field: &'static str,
        value: f64,
        bounds: Bounds,
    ) -> Result<(), ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NonFinite { field });
        }
        if !bounds.contains(value) {
            return Err(ValidationError::OutOfRange {
                field,
                value,
                min: bounds.min,
                max: bounds.max,
            });
        }
        Ok(())
    }

    /// Validate a numeric field
    pub fn validate_numeric(&self, field: NumericField, value: f64) -> Result<(), ValidationError> {
        self.validate_range(field.as_str(), value, self.config.bounds(field))
    }

    /// Validate that a categorical value is not blank
    pub fn validate_category(
        &self,
        field: CategoricalField,
        value: &str,
    ) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            Err(ValidationError::MissingField {
                field: field.as_str(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate every field, collecting all violations
    pub fn validate(&self, spec: &RawSpecification) -> ValidationResult {
        let mut errors = Vec::new();
        let mut fields_checked = 0;

        for field in NUMERIC_FIELDS {
            // Optional fields are only checked when present
            if let Some(value) = spec.numeric(field) {
                fields_checked += 1;
                if let Err(e) = self.validate_numeric(field, value) {
                    errors.push(e);
                }
            }
        }

        for (field, value) in spec.categorical_values() {
            fields_checked += 1;
            if let Err(e) = self.validate_category(field, value) {
                errors.push(e);
            }
        }

        if !errors.is_empty() {
            debug!("Specification rejected with {} errors", errors.len());
        }

        ValidationResult::from_errors(errors, fields_checked)
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }
}
