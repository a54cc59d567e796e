//! Error types for catalog validation and throughput calculation

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CalcError {
    /// The requested root item has no entry in the catalog
    #[error("item '{name}' not found in catalog")]
    ItemNotFound { name: String },

    #[error("invalid recipe data for '{item}': {reason}")]
    InvalidRecipeData { item: String, reason: String },

    /// Expansion reached an item already on the current path
    #[error("cyclic recipe graph: {}", path.join(" -> "))]
    CyclicRecipeGraph { path: Vec<String> },

    #[error("invalid item '{item}': {reason}")]
    InvalidItem { item: String, reason: String },

    #[error("duplicate item '{name}' in catalog")]
    DuplicateItem { name: String },

    /// The crafter count for a target does not fit in a `u64`
    #[error("target rate {rate}/min for '{item}' needs more crafters than can be counted")]
    CrafterCountOverflow { item: String, rate: f64 },

    #[error("target rate must be a finite number, got {rate}")]
    InvalidTargetRate { rate: f64 },
}

impl CalcError {
    pub(crate) fn invalid_recipe(item: &str, reason: impl Into<String>) -> Self {
        CalcError::InvalidRecipeData {
            item: item.to_string(),
            reason: reason.into(),
        }
    }
}
