//! Raw Car Specification and Column Layout

use serde::{Deserialize, Serialize};
use std::fmt;

/// Power conversion factor used by the input form (1 PS = 0.7355 kW)
pub const KW_PER_PS: f64 = 0.7355;

/// Categorical input fields, in the order they are encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalField {
    Brand,
    Model,
    Color,
    TransmissionType,
    FuelType,
}

impl CategoricalField {
    /// All categorical fields in encoding order
    pub const ALL: [CategoricalField; 5] = [
        CategoricalField::Brand,
        CategoricalField::Model,
        CategoricalField::Color,
        CategoricalField::TransmissionType,
        CategoricalField::FuelType,
    ];

    /// Column name in the historical data, also the indicator prefix
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoricalField::Brand => "brand",
            CategoricalField::Model => "model",
            CategoricalField::Color => "color",
            CategoricalField::TransmissionType => "transmission_type",
            CategoricalField::FuelType => "fuel_type",
        }
    }

    /// Name of the indicator column for `value` (`{field}_{value}`)
    pub fn indicator_column(&self, value: &str) -> String {
        format!("{}_{}", self.as_str(), value)
    }

    /// Whether a schema column looks like an indicator of this field
    pub fn owns_column(&self, column: &str) -> bool {
        column
            .strip_prefix(self.as_str())
            .is_some_and(|rest| rest.starts_with('_'))
    }
}

impl fmt::Display for CategoricalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numeric input fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericField {
    PowerKw,
    PowerPs,
    FuelConsumption,
    MileageInKm,
    VehicleAge,
}

impl NumericField {
    /// Field name on [`RawSpecification`]
    pub fn as_str(&self) -> &'static str {
        match self {
            NumericField::PowerKw => "power_kw",
            NumericField::PowerPs => "power_ps",
            NumericField::FuelConsumption => "fuel_consumption_l_100km",
            NumericField::MileageInKm => "mileage_in_km",
            NumericField::VehicleAge => "vehicle_age",
        }
    }
}

/// One car specification as submitted by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSpecification {
    pub brand: String,
    pub model: String,
    pub color: String,
    pub transmission_type: String,
    pub fuel_type: String,
    /// Engine power in kilowatts
    pub power_kw: f64,
    /// Engine power in metric horsepower
    pub power_ps: f64,
    /// Only present for model variants trained with fuel consumption
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuel_consumption_l_100km: Option<f64>,
    pub mileage_in_km: u64,
    /// Vehicle age in years
    pub vehicle_age: u32,
}

impl RawSpecification {
    /// Value of a categorical field
    pub fn categorical(&self, field: CategoricalField) -> &str {
        match field {
            CategoricalField::Brand => &self.brand,
            CategoricalField::Model => &self.model,
            CategoricalField::Color => &self.color,
            CategoricalField::TransmissionType => &self.transmission_type,
            CategoricalField::FuelType => &self.fuel_type,
        }
    }

    /// Value of a numeric field, `None` when the optional field is absent
    pub fn numeric(&self, field: NumericField) -> Option<f64> {
        match field {
            NumericField::PowerKw => Some(self.power_kw),
            NumericField::PowerPs => Some(self.power_ps),
            NumericField::FuelConsumption => self.fuel_consumption_l_100km,
            NumericField::MileageInKm => Some(self.mileage_in_km as f64),
            NumericField::VehicleAge => Some(f64::from(self.vehicle_age)),
        }
    }

    /// Categorical values in encoding order
    pub fn categorical_values(&self) -> impl Iterator<Item = (CategoricalField, &str)> + '_ {
        CategoricalField::ALL
            .into_iter()
            .map(move |field| (field, self.categorical(field)))
    }
}

/// Maps numeric input fields to the column names the training artifacts use.
///
/// The names are part of the contract with the schema and scaler artifacts
/// and must match them exactly, including disambiguation suffixes such as
/// `fuel_consumption_l_100km.1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnLayout {
    pub power_kw: String,
    pub power_ps: String,
    pub fuel_consumption: String,
    /// Variants trained without fuel consumption set this to false
    pub include_fuel_consumption: bool,
    pub mileage_in_km: String,
    pub vehicle_age: String,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            power_kw: "power_kw".to_string(),
            power_ps: "power_ps".to_string(),
            fuel_consumption: "fuel_consumption_l_100km.1".to_string(),
            include_fuel_consumption: true,
            mileage_in_km: "mileage_in_km".to_string(),
            vehicle_age: "vehicle_age".to_string(),
        }
    }
}

impl ColumnLayout {
    /// Layout for variants whose model has no fuel consumption input
    pub fn without_fuel_consumption() -> Self {
        Self {
            include_fuel_consumption: false,
            ..Default::default()
        }
    }

    /// Numeric fields and their column names, in scaler order
    pub fn fields(&self) -> Vec<(NumericField, &str)> {
        let mut fields = vec![
            (NumericField::PowerKw, self.power_kw.as_str()),
            (NumericField::PowerPs, self.power_ps.as_str()),
        ];
        if self.include_fuel_consumption {
            fields.push((NumericField::FuelConsumption, self.fuel_consumption.as_str()));
        }
        fields.push((NumericField::MileageInKm, self.mileage_in_km.as_str()));
        fields.push((NumericField::VehicleAge, self.vehicle_age.as_str()));
        fields
    }

    /// The numeric column list the scaler must have been fitted on
    pub fn numeric_columns(&self) -> Vec<String> {
        self.fields()
            .into_iter()
            .map(|(_, column)| column.to_string())
            .collect()
    }
}
