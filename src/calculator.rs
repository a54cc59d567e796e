//! Production chain throughput calculator
//!
//! Walks an item's ideal recipe down through its inputs, sizing crafters at
//! every node and accumulating the total throughput demanded of each item
//! across all branches that consume it.

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::{debug, instrument};

use crate::catalog::RecipeCatalog;
use crate::error::CalcError;
use crate::models::Recipe;
use crate::sizer::crafters_needed;

/// A single input requirement of a process node
#[derive(Debug, Clone, PartialEq)]
pub struct InputDemand {
    pub item: String,
    pub rate_per_minute: f64,
    /// True when the catalog has no recipe for the input
    pub raw: bool,
}

/// One visited node of the expansion tree
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessRecord {
    pub item: String,
    pub depth: usize,
    pub target_rate: f64,
    pub crafters: u64,
    pub recipe: Recipe,
    /// crafters * products_per_minute for this branch
    pub throughput: f64,
    pub inputs: Vec<InputDemand>,
}

impl ProcessRecord {
    pub fn power_per_minute(&self) -> Option<f64> {
        self.recipe
            .power_per_minute()
            .map(|power| power * self.crafters as f64)
    }
}

/// Result of expanding one item at one target rate
#[derive(Debug, Clone, PartialEq)]
pub struct ThroughputReport {
    pub root: String,
    pub target_rate: f64,
    /// Visited nodes in pre-order
    pub records: Vec<ProcessRecord>,
    /// Produced rate per crafted item, summed over every branch
    pub total_throughput: IndexMap<String, f64>,
    /// Demanded rate per raw material, summed over every branch
    pub raw_demand: IndexMap<String, f64>,
}

/// Crafters and power needed to cover an item's accumulated throughput
#[derive(Debug, Clone, PartialEq)]
pub struct TotalThroughput {
    pub item: String,
    pub rate_per_minute: f64,
    pub crafters: u64,
    pub power_per_minute: Option<f64>,
}

impl ThroughputReport {
    /// Size each item's accumulated throughput as if built in one place
    pub fn summarize_totals(
        &self,
        catalog: &RecipeCatalog,
    ) -> Result<Vec<TotalThroughput>, CalcError> {
        let mut totals = Vec::with_capacity(self.total_throughput.len());
        for (name, &rate) in &self.total_throughput {
            let recipe = ideal_recipe(catalog, name)?;
            let crafters = crafters_needed(recipe, rate)?;
            totals.push(TotalThroughput {
                item: name.clone(),
                rate_per_minute: rate,
                crafters,
                power_per_minute: recipe.power_per_minute().map(|p| p * crafters as f64),
            });
        }
        Ok(totals)
    }

    pub fn total_crafters(&self) -> u64 {
        self.records.iter().map(|r| r.crafters).sum()
    }

    pub fn total_power(&self) -> f64 {
        self.records
            .iter()
            .filter_map(ProcessRecord::power_per_minute)
            .sum()
    }
}

/// Expands production chains against a read-only catalog.
///
/// Holds no per-calculation state: every `expand` call starts from empty
/// accumulators, so repeated calls on one calculator are independent.
#[derive(Debug, Clone, Copy)]
pub struct ThroughputCalculator<'a> {
    catalog: &'a RecipeCatalog,
}

/// Accumulators owned by a single `expand` call
#[derive(Default)]
struct Expansion {
    records: Vec<ProcessRecord>,
    total_throughput: IndexMap<String, f64>,
    raw_demand: IndexMap<String, f64>,
    path: Vec<String>,
    on_path: HashSet<String>,
}

impl<'a> ThroughputCalculator<'a> {
    pub fn new(catalog: &'a RecipeCatalog) -> Self {
        Self { catalog }
    }

    /// Calculate the production chain for `root` at `target_rate` units/minute
    #[instrument(skip(self), level = "debug")]
    pub fn expand(&self, root: &str, target_rate: f64) -> Result<ThroughputReport, CalcError> {
        if !target_rate.is_finite() {
            return Err(CalcError::InvalidTargetRate { rate: target_rate });
        }
        if self.catalog.find_item(root).is_none() {
            return Err(CalcError::ItemNotFound {
                name: root.to_string(),
            });
        }

        let mut state = Expansion::default();
        self.expand_node(root, target_rate, 0, &mut state)?;

        debug!(
            nodes = state.records.len(),
            items = state.total_throughput.len(),
            raw = state.raw_demand.len(),
            "expansion complete"
        );

        Ok(ThroughputReport {
            root: root.to_string(),
            target_rate,
            records: state.records,
            total_throughput: state.total_throughput,
            raw_demand: state.raw_demand,
        })
    }

    fn expand_node(
        &self,
        name: &str,
        rate: f64,
        depth: usize,
        state: &mut Expansion,
    ) -> Result<(), CalcError> {
        // Raw material: the caller has already recorded the demand
        let Some(item) = self.catalog.find_item(name) else {
            return Ok(());
        };

        if state.on_path.contains(name) {
            let mut path = state.path.clone();
            path.push(name.to_string());
            return Err(CalcError::CyclicRecipeGraph { path });
        }

        let recipe = item.ideal_recipe().ok_or_else(|| CalcError::InvalidItem {
            item: name.to_string(),
            reason: "ideal recipe index out of range".to_string(),
        })?;
        let crafters = crafters_needed(recipe, rate)?;
        let throughput = crafters as f64 * recipe.products_per_minute()?;
        let cycles = crafters as f64 * recipe.cycles_per_minute()?;

        debug!(item = name, depth, rate, crafters, throughput, "expanding node");

        let inputs: Vec<InputDemand> = recipe
            .input_items
            .iter()
            .map(|(input, &quantity)| InputDemand {
                item: input.clone(),
                rate_per_minute: quantity * cycles,
                raw: self.catalog.find_item(input).is_none(),
            })
            .collect();

        *state.total_throughput.entry(name.to_string()).or_default() += throughput;
        for input in inputs.iter().filter(|i| i.raw) {
            *state.raw_demand.entry(input.item.clone()).or_default() += input.rate_per_minute;
        }

        state.records.push(ProcessRecord {
            item: name.to_string(),
            depth,
            target_rate: rate,
            crafters,
            recipe: recipe.clone(),
            throughput,
            inputs: inputs.clone(),
        });

        state.path.push(name.to_string());
        state.on_path.insert(name.to_string());

        for input in inputs.iter().filter(|i| !i.raw) {
            self.expand_node(&input.item, input.rate_per_minute, depth + 1, state)?;
        }

        state.path.pop();
        state.on_path.remove(name);
        Ok(())
    }
}

fn ideal_recipe<'c>(catalog: &'c RecipeCatalog, name: &str) -> Result<&'c Recipe, CalcError> {
    let item = catalog.find_item(name).ok_or_else(|| CalcError::ItemNotFound {
        name: name.to_string(),
    })?;
    item.ideal_recipe().ok_or_else(|| CalcError::InvalidItem {
        item: name.to_string(),
        reason: "ideal recipe index out of range".to_string(),
    })
}
