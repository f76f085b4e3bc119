//! Vocabulary Route

use axum::{extract::State, Json};
use feature_transformer::CategoricalField;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::AppState;

/// Categories per field as seen in the historical data
#[derive(Debug, Serialize)]
pub struct VocabularyResponse {
    pub categories: BTreeMap<&'static str, Vec<String>>,
}

/// List the known categories of every categorical field
pub async fn get_vocabulary(State(state): State<Arc<AppState>>) -> Json<VocabularyResponse> {
    let vocabulary = state.artifacts.vocabulary();
    let categories = CategoricalField::ALL
        .into_iter()
        .map(|field| {
            (
                field.as_str(),
                vocabulary.categories(field).map(str::to_string).collect(),
            )
        })
        .collect();

    Json(VocabularyResponse { categories })
}
