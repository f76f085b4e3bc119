//! Categorical Vocabulary from Historical Data

use crate::error::TransformError;
use crate::record::CategoricalField;
use csv::Reader;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use tracing::debug;

/// Distinct values of each categorical field seen in the historical data.
///
/// Values are kept sorted; the first value of a field is the category the
/// drop-first encoding used as baseline at training time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryVocabulary {
    categories: BTreeMap<CategoricalField, BTreeSet<String>>,
}

impl CategoryVocabulary {
    /// Build a vocabulary from `(field, value)` pairs
    pub fn from_values<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = (CategoricalField, &'a str)>,
    {
        let mut vocabulary = Self::default();
        for (field, value) in values {
            vocabulary.insert(field, value);
        }
        vocabulary
    }

    /// Read the historical data table (CSV with a header row)
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TransformError> {
        let mut rdr = Reader::from_reader(reader);
        let headers = rdr
            .headers()
            .map_err(|e| TransformError::Vocabulary(e.to_string()))?
            .clone();

        let mut indices = Vec::with_capacity(CategoricalField::ALL.len());
        for field in CategoricalField::ALL {
            let idx = headers
                .iter()
                .position(|h| h.trim() == field.as_str())
                .ok_or_else(|| {
                    TransformError::Vocabulary(format!(
                        "historical data has no '{}' column",
                        field.as_str()
                    ))
                })?;
            indices.push((field, idx));
        }

        let mut vocabulary = Self::default();
        let mut rows = 0usize;
        for result in rdr.records() {
            let record = result.map_err(|e| TransformError::Vocabulary(e.to_string()))?;
            for &(field, idx) in &indices {
                if let Some(value) = record.get(idx) {
                    vocabulary.insert(field, value);
                }
            }
            rows += 1;
        }

        debug!(
            "Vocabulary built from {} rows: {}",
            rows,
            CategoricalField::ALL
                .iter()
                .map(|f| format!("{}={}", f, vocabulary.categories(*f).count()))
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(vocabulary)
    }

    fn insert(&mut self, field: CategoricalField, value: &str) {
        if value.is_empty() {
            return;
        }
        self.categories
            .entry(field)
            .or_default()
            .insert(value.to_string());
    }

    /// Whether `value` was seen for `field`
    pub fn contains(&self, field: CategoricalField, value: &str) -> bool {
        self.categories
            .get(&field)
            .is_some_and(|values| values.contains(value))
    }

    /// The dropped baseline category of `field`
    pub fn baseline(&self, field: CategoricalField) -> Option<&str> {
        self.categories
            .get(&field)
            .and_then(|values| values.iter().next())
            .map(String::as_str)
    }

    /// Sorted categories of `field`
    pub fn categories(&self, field: CategoricalField) -> impl Iterator<Item = &str> + '_ {
        self.categories
            .get(&field)
            .into_iter()
            .flat_map(|values| values.iter().map(String::as_str))
    }

    pub fn is_empty(&self) -> bool {
        self.categories.values().all(BTreeSet::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CARS: &str = "\
brand,model,color,transmission_type,fuel_type,price_in_euro
BMW,X5,black,Automatic,Diesel,45000
Audi,A4,silver,Manual,Petrol,21000
BMW,320,white,Manual,Petrol,18000
Volkswagen,Golf,black,Manual,,9000
";

    #[test]
    fn test_reads_distinct_sorted_values() {
        let vocabulary = CategoryVocabulary::from_reader(CARS.as_bytes()).unwrap();
        let brands: Vec<_> = vocabulary.categories(CategoricalField::Brand).collect();
        assert_eq!(brands, vec!["Audi", "BMW", "Volkswagen"]);
        assert!(vocabulary.contains(CategoricalField::Model, "Golf"));
        assert!(!vocabulary.contains(CategoricalField::Model, "Corolla"));
    }

    #[test]
    fn test_baseline_is_first_sorted_value() {
        let vocabulary = CategoryVocabulary::from_reader(CARS.as_bytes()).unwrap();
        assert_eq!(vocabulary.baseline(CategoricalField::Brand), Some("Audi"));
        assert_eq!(
            vocabulary.baseline(CategoricalField::TransmissionType),
            Some("Automatic")
        );
    }

    #[test]
    fn test_empty_cells_skipped() {
        let vocabulary = CategoryVocabulary::from_reader(CARS.as_bytes()).unwrap();
        let fuels: Vec<_> = vocabulary.categories(CategoricalField::FuelType).collect();
        assert_eq!(fuels, vec!["Diesel", "Petrol"]);
    }

    #[test]
    fn test_missing_column_is_error() {
        let data = "brand,model,color,fuel_type\nBMW,X5,black,Diesel\n";
        assert!(matches!(
            CategoryVocabulary::from_reader(data.as_bytes()),
            Err(TransformError::Vocabulary(_))
        ));
    }
}
