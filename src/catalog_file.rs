//! JSON item database files
//!
//! The file is a JSON array of items, each carrying its recipes inline:
//!
//! ```json
//! [
//!     {
//!         "name": "iron_plate",
//!         "recipes": [
//!             {
//!                 "name": "iron_plate",
//!                 "input_items": { "iron_ore": 3 },
//!                 "output_items": { "iron_plate": 2 },
//!                 "craft_time_seconds": 6.0,
//!                 "power_required": 4.0
//!             }
//!         ],
//!         "ideal_recipe_index": null
//!     }
//! ]
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use tracing::info;

use crate::catalog::RecipeCatalog;
use crate::db;
use crate::models::Item;

/// Read every item from a JSON item database
pub fn read_items(path: &Path) -> Result<Vec<Item>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let items: Vec<Item> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    info!(path = %path.display(), items = items.len(), "read item database");
    Ok(items)
}

/// Import a JSON item database into the store.
///
/// The file is fully parsed before the store is touched, so an unreadable
/// file never clears existing items. Returns the number of items read and
/// the resulting catalog.
pub fn import_file(conn: &mut Connection, path: &Path, clear: bool) -> Result<(usize, RecipeCatalog)> {
    let items = read_items(path)?;
    let catalog = db::import_items(conn, &items, clear)?;
    Ok((items.len(), catalog))
}

/// Write items sorted by name, indented four spaces
pub fn write_items(path: &Path, items: &[Item]) -> Result<()> {
    let mut sorted: Vec<&Item> = items.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));

    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    sorted.serialize(&mut ser)?;

    fs::write(path, buf).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), items = sorted.len(), "wrote item database");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DATABASE: &str = r#"[
        {
            "name": "iron_rod",
            "recipes": [
                {
                    "name": "iron_rod",
                    "input_items": {"iron_ingot": 1},
                    "output_items": {"iron_rod": 1},
                    "craft_time_seconds": 4
                }
            ]
        },
        {
            "name": "iron_plate",
            "recipes": [
                {
                    "name": "iron_plate",
                    "input_items": {"iron_ingot": 3, "flux": 1},
                    "output_items": {"iron_plate": 2},
                    "craft_time_seconds": 6.0,
                    "power_required": 4.0
                }
            ],
            "ideal_recipe_index": 0
        }
    ]"#;

    #[test]
    fn reads_optional_fields_and_integer_quantities() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("items.json");
        fs::write(&path, DATABASE).unwrap();

        let items = read_items(&path).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].ideal_recipe_index, None);
        assert_eq!(items[0].recipes[0].power_required, None);
        assert_eq!(items[0].recipes[0].craft_time_seconds, 4.0);

        let inputs: Vec<_> = items[1].recipes[0].input_items.keys().cloned().collect();
        assert_eq!(inputs, ["iron_ingot", "flux"]);
    }

    #[test]
    fn writes_sorted_by_name() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("items.json");
        let target = dir.path().join("sorted.json");
        fs::write(&source, DATABASE).unwrap();

        let items = read_items(&source).unwrap();
        write_items(&target, &items).unwrap();

        let written = fs::read_to_string(&target).unwrap();
        assert!(written.contains("\n    {\n        \"name\": \"iron_plate\""));
        let names: Vec<_> = read_items(&target)
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, ["iron_plate", "iron_rod"]);
    }

    fn store_with_sample() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        db::init_schema(&conn).unwrap();
        crate::sample::load_sample_data(&mut conn).unwrap();
        conn
    }

    #[test]
    fn import_file_adds_to_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("items.json");
        fs::write(&path, DATABASE).unwrap();
        let mut conn = store_with_sample();

        let (read, catalog) = import_file(&mut conn, &path, false).unwrap();
        assert_eq!(read, 2);
        // iron_rod and iron_plate replace the sample's versions
        assert_eq!(catalog.len(), 6);
        let plate = catalog.find_item("iron_plate").unwrap();
        assert!(plate.recipes[0].input_items.contains_key("flux"));
    }

    #[test]
    fn missing_file_with_clear_keeps_store() {
        let dir = TempDir::new().unwrap();
        let mut conn = store_with_sample();

        assert!(import_file(&mut conn, &dir.path().join("missing.json"), true).is_err());
        assert_eq!(db::load_catalog(&conn).unwrap().len(), 6);
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let err = read_items(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("broken.json"));
    }
}
