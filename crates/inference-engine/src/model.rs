//! Price Model Interface

use crate::InferenceError;

/// A trained regression model that maps one feature row to a price
pub trait PriceModel: Send + Sync {
    /// Short backend name for logs and health output
    fn name(&self) -> &str;

    /// Exact number of input features, if the model declares it
    fn input_width(&self) -> Option<usize>;

    /// Smallest input the model can evaluate
    fn min_input_width(&self) -> usize {
        self.input_width().unwrap_or(0)
    }

    /// Predict a price from features in schema order
    fn predict(&self, features: &[f64]) -> Result<f64, InferenceError>;
}
