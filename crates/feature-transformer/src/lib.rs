//! Feature Transformer
//!
//! Converts a raw car specification into the exact feature vector the trained
//! price model expects: one-hot encoded categoricals, projected onto the
//! training-time column schema, with numeric columns standard-scaled.

mod encoding;
mod error;
mod record;
mod scaler;
mod schema;
mod transformer;
mod vector;
mod vocabulary;

pub use encoding::{CategoryResolution, Indicator, OneHotEncoding};
pub use error::{TransformError, UnknownCategory};
pub use record::{CategoricalField, ColumnLayout, NumericField, RawSpecification, KW_PER_PS};
pub use scaler::StandardScaler;
pub use schema::ExpectedColumnSchema;
pub use transformer::{FeatureTransformer, ResolvedCategory, Transformation};
pub use vector::FeatureVector;
pub use vocabulary::CategoryVocabulary;
