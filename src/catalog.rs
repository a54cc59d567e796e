//! Read-only collection of items keyed by name

use indexmap::IndexMap;
use tracing::warn;

use crate::error::CalcError;
use crate::models::Item;

/// Validated set of items, immutable once built.
///
/// Lookups of names without an entry return `None`: those are raw
/// materials, the base case of chain expansion.
#[derive(Debug, Clone, Default)]
pub struct RecipeCatalog {
    items: IndexMap<String, Item>,
}

impl RecipeCatalog {
    /// Build a catalog, rejecting data the calculator cannot use
    pub fn new(items: impl IntoIterator<Item = Item>) -> Result<Self, CalcError> {
        let mut by_name = IndexMap::new();

        for item in items {
            if let Err(e) = validate_item(&item) {
                warn!(item = %item.name, error = %e, "rejecting catalog item");
                return Err(e);
            }
            if by_name.contains_key(&item.name) {
                return Err(CalcError::DuplicateItem { name: item.name });
            }
            by_name.insert(item.name.clone(), item);
        }

        Ok(Self { items: by_name })
    }

    pub fn find_item(&self, name: &str) -> Option<&Item> {
        self.items.get(name)
    }

    /// Items in the order they were loaded
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn validate_item(item: &Item) -> Result<(), CalcError> {
    if item.recipes.is_empty() {
        return Err(CalcError::InvalidItem {
            item: item.name.clone(),
            reason: "item has no recipes".to_string(),
        });
    }

    let index = item.ideal_index();
    if index >= item.recipes.len() {
        return Err(CalcError::InvalidItem {
            item: item.name.clone(),
            reason: format!(
                "ideal recipe index {} out of range for {} recipe(s)",
                index,
                item.recipes.len()
            ),
        });
    }

    for recipe in &item.recipes {
        recipe.validate()?;
    }
    Ok(())
}
