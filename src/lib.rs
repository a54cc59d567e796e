//! Production chain throughput calculator
//!
//! Given a target output rate for an item, works out how many crafters are
//! needed at every step of its input chain and the total demand placed on
//! items shared between branches.

pub mod calculator;
pub mod catalog;
pub mod catalog_file;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod report;
pub mod sample;
pub mod sizer;

pub use calculator::{
    InputDemand, ProcessRecord, ThroughputCalculator, ThroughputReport, TotalThroughput,
};
pub use catalog::RecipeCatalog;
pub use error::CalcError;
pub use models::{Item, Recipe};
pub use sizer::crafters_needed;
