//! Sample catalog for trying the calculator without an item database

use anyhow::Result;
use indexmap::IndexMap;
use rusqlite::Connection;

use crate::db;
use crate::models::{Item, Recipe};

fn recipe(name: &str, inputs: &[(&str, f64)], output: f64, seconds: f64, power: f64) -> Recipe {
    Recipe {
        name: name.to_string(),
        input_items: inputs.iter().map(|(n, q)| (n.to_string(), *q)).collect(),
        output_items: IndexMap::from([(name.to_string(), output)]),
        craft_time_seconds: seconds,
        power_required: Some(power),
    }
}

fn item(name: &str, recipes: Vec<Recipe>) -> Item {
    Item {
        name: name.to_string(),
        recipes,
        ideal_recipe_index: None,
    }
}

/// A basic iron production chain. Iron ore is raw; iron rods and
/// ingots are consumed by more than one parent recipe.
pub fn sample_items() -> Vec<Item> {
    vec![
        item(
            "iron_ingot",
            vec![recipe("iron_ingot", &[("iron_ore", 1.0)], 1.0, 2.0, 4.0)],
        ),
        item(
            "iron_plate",
            vec![recipe("iron_plate", &[("iron_ingot", 3.0)], 2.0, 6.0, 4.0)],
        ),
        item(
            "iron_rod",
            vec![recipe("iron_rod", &[("iron_ingot", 1.0)], 1.0, 4.0, 4.0)],
        ),
        item(
            "screw",
            vec![
                recipe("screw", &[("iron_rod", 1.0)], 4.0, 6.0, 4.0),
                // Cast screws skip the rod step
                recipe("screw", &[("iron_ingot", 5.0)], 20.0, 24.0, 4.0),
            ],
        ),
        item(
            "reinforced_iron_plate",
            vec![recipe(
                "reinforced_iron_plate",
                &[("iron_plate", 6.0), ("screw", 12.0)],
                1.0,
                12.0,
                15.0,
            )],
        ),
        item(
            "modular_frame",
            vec![recipe(
                "modular_frame",
                &[("reinforced_iron_plate", 3.0), ("iron_rod", 12.0)],
                2.0,
                60.0,
                15.0,
            )],
        ),
    ]
}

/// Replace the database contents with the sample catalog
pub fn load_sample_data(conn: &mut Connection) -> Result<usize> {
    let items = sample_items();
    db::import_items(conn, &items, true)?;
    Ok(items.len())
}
