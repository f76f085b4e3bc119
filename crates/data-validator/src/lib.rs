//! Specification Validation
//!
//! Range, finiteness and presence checks applied by callers before a car
//! specification reaches the feature transformer, which accepts any value.

mod error;
mod validator;

pub use error::ValidationError;
pub use validator::{Bounds, ValidationConfig, ValidationResult, Validator};
