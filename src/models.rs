//! Data models for craftable items and their recipes

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::CalcError;

/// One way of producing an item.
///
/// Quantities are per craft cycle; rates derived from them are per minute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// The item this recipe is "for"; must be a key of `output_items`
    pub name: String,
    #[serde(default)]
    pub input_items: IndexMap<String, f64>,
    pub output_items: IndexMap<String, f64>,
    pub craft_time_seconds: f64,
    #[serde(default)]
    pub power_required: Option<f64>, // None = manual / unpowered
}

impl Recipe {
    /// Craft cycles completed by one crafter per minute
    pub fn cycles_per_minute(&self) -> Result<f64, CalcError> {
        if !(self.craft_time_seconds.is_finite() && self.craft_time_seconds > 0.0) {
            return Err(CalcError::invalid_recipe(
                &self.name,
                format!("craft time must be positive, got {}", self.craft_time_seconds),
            ));
        }
        Ok(60.0 / self.craft_time_seconds)
    }

    /// Units of `name` produced by one crafter per minute
    pub fn products_per_minute(&self) -> Result<f64, CalcError> {
        let quantity = self.output_items.get(&self.name).copied().ok_or_else(|| {
            CalcError::invalid_recipe(&self.name, "recipe does not output its own item")
        })?;
        if !(quantity.is_finite() && quantity > 0.0) {
            return Err(CalcError::invalid_recipe(
                &self.name,
                format!("output quantity must be positive, got {}", quantity),
            ));
        }
        Ok(quantity * self.cycles_per_minute()?)
    }

    /// Power drawn by one crafter per minute, if the recipe needs power
    pub fn power_per_minute(&self) -> Option<f64> {
        let power = self.power_required?;
        self.cycles_per_minute().ok().map(|cycles| power * cycles)
    }

    /// Check the invariants `products_per_minute` depends on
    pub fn validate(&self) -> Result<(), CalcError> {
        self.products_per_minute().map(|_| ())
    }
}

/// A named resource with one or more ways of making it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub recipes: Vec<Recipe>,
    #[serde(default)]
    pub ideal_recipe_index: Option<usize>,
}

impl Item {
    pub fn ideal_index(&self) -> usize {
        self.ideal_recipe_index.unwrap_or(0)
    }

    /// The recipe used for all calculations on this item.
    ///
    /// Catalog construction guarantees the index is in range, so this
    /// only returns `None` for items built outside a catalog.
    pub fn ideal_recipe(&self) -> Option<&Recipe> {
        self.recipes.get(self.ideal_index())
    }
}
