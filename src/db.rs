//! Database schema and operations

use anyhow::{Context, Result, bail};
use indexmap::IndexMap;
use rusqlite::{Connection, OptionalExtension};
use tracing::info;

use crate::catalog::RecipeCatalog;
use crate::models::{Item, Recipe};

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Craftable items; anything without a row here is a raw material
        CREATE TABLE IF NOT EXISTS items (
            name TEXT PRIMARY KEY,
            ideal_recipe_index INTEGER
        );

        -- Alternative ways of making an item, ordered by position
        CREATE TABLE IF NOT EXISTS recipes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            item_name TEXT NOT NULL,
            position INTEGER NOT NULL,
            name TEXT NOT NULL,
            craft_time_seconds REAL NOT NULL,
            power_required REAL
        );

        -- Quantities consumed per craft cycle
        CREATE TABLE IF NOT EXISTS recipe_inputs (
            recipe_id INTEGER,
            position INTEGER NOT NULL,
            item_name TEXT NOT NULL,
            quantity REAL NOT NULL,
            PRIMARY KEY (recipe_id, item_name)
        );

        -- Quantities produced per craft cycle
        CREATE TABLE IF NOT EXISTS recipe_outputs (
            recipe_id INTEGER,
            position INTEGER NOT NULL,
            item_name TEXT NOT NULL,
            quantity REAL NOT NULL,
            PRIMARY KEY (recipe_id, item_name)
        );

        CREATE INDEX IF NOT EXISTS idx_recipes_item ON recipes(item_name);
        "#,
    )?;
    Ok(())
}

/// Clear the whole catalog
pub fn clear_catalog(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        DELETE FROM recipe_outputs;
        DELETE FROM recipe_inputs;
        DELETE FROM recipes;
        DELETE FROM items;
        "#,
    )?;
    Ok(())
}

/// Insert or replace an item together with all of its recipes
pub fn upsert_item(conn: &mut Connection, item: &Item) -> Result<()> {
    let tx = conn.transaction()?;
    write_item(&tx, item)?;
    tx.commit()?;
    Ok(())
}

/// Store a batch of items, optionally replacing the whole catalog.
///
/// Runs in one transaction that only commits if the resulting catalog
/// validates, so a rejected import leaves the previous data untouched.
pub fn import_items(conn: &mut Connection, items: &[Item], clear: bool) -> Result<RecipeCatalog> {
    let tx = conn.transaction()?;

    if clear {
        clear_catalog(&tx)?;
    }
    for item in items {
        write_item(&tx, item)?;
    }
    let catalog = load_catalog(&tx).context("import rejected, database left unchanged")?;

    tx.commit()?;
    info!(imported = items.len(), items = catalog.len(), clear, "imported items");
    Ok(catalog)
}

fn write_item(conn: &Connection, item: &Item) -> Result<()> {
    delete_recipes(conn, &item.name)?;
    conn.execute(
        "INSERT OR REPLACE INTO items (name, ideal_recipe_index) VALUES (?1, ?2)",
        (&item.name, item.ideal_recipe_index.map(|i| i as i64)),
    )?;

    for (position, recipe) in item.recipes.iter().enumerate() {
        conn.execute(
            "INSERT INTO recipes (item_name, position, name, craft_time_seconds, power_required)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            (
                &item.name,
                position as i64,
                &recipe.name,
                recipe.craft_time_seconds,
                recipe.power_required,
            ),
        )?;
        let recipe_id = conn.last_insert_rowid();

        for (position, (name, quantity)) in recipe.input_items.iter().enumerate() {
            conn.execute(
                "INSERT INTO recipe_inputs (recipe_id, position, item_name, quantity)
                 VALUES (?1, ?2, ?3, ?4)",
                (recipe_id, position as i64, name, quantity),
            )?;
        }
        for (position, (name, quantity)) in recipe.output_items.iter().enumerate() {
            conn.execute(
                "INSERT INTO recipe_outputs (recipe_id, position, item_name, quantity)
                 VALUES (?1, ?2, ?3, ?4)",
                (recipe_id, position as i64, name, quantity),
            )?;
        }
    }
    Ok(())
}

fn delete_recipes(conn: &Connection, item_name: &str) -> Result<()> {
    conn.execute(
        "DELETE FROM recipe_inputs WHERE recipe_id IN (SELECT id FROM recipes WHERE item_name = ?1)",
        [item_name],
    )?;
    conn.execute(
        "DELETE FROM recipe_outputs WHERE recipe_id IN (SELECT id FROM recipes WHERE item_name = ?1)",
        [item_name],
    )?;
    conn.execute("DELETE FROM recipes WHERE item_name = ?1", [item_name])?;
    Ok(())
}

/// Choose which recipe an item uses for calculations
pub fn set_ideal_recipe(conn: &Connection, item_name: &str, index: usize) -> Result<()> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM recipes WHERE item_name = ?1",
        [item_name],
        |row| row.get(0),
    )?;
    if count == 0 {
        bail!("item '{}' not found", item_name);
    }
    if index as i64 >= count {
        bail!(
            "recipe index {} out of range for '{}' ({} recipe(s))",
            index,
            item_name,
            count
        );
    }

    conn.execute(
        "UPDATE items SET ideal_recipe_index = ?1 WHERE name = ?2",
        (index as i64, item_name),
    )?;
    Ok(())
}

/// Get a single item with its recipes
pub fn get_item(conn: &Connection, name: &str) -> Result<Option<Item>> {
    let ideal: Option<Option<i64>> = conn
        .query_row(
            "SELECT ideal_recipe_index FROM items WHERE name = ?1",
            [name],
            |row| row.get(0),
        )
        .optional()?;

    let Some(ideal) = ideal else {
        return Ok(None);
    };

    let ideal_recipe_index = ideal
        .map(usize::try_from)
        .transpose()
        .with_context(|| format!("item '{}' has a negative ideal recipe index", name))?;

    Ok(Some(Item {
        name: name.to_string(),
        recipes: get_recipes(conn, name)?,
        ideal_recipe_index,
    }))
}

fn get_recipes(conn: &Connection, item_name: &str) -> Result<Vec<Recipe>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, craft_time_seconds, power_required
         FROM recipes
         WHERE item_name = ?1
         ORDER BY position",
    )?;

    let rows = stmt.query_map([item_name], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            Recipe {
                name: row.get(1)?,
                input_items: IndexMap::new(),
                output_items: IndexMap::new(),
                craft_time_seconds: row.get(2)?,
                power_required: row.get(3)?,
            },
        ))
    })?;

    let mut results = Vec::new();
    for row in rows {
        let (id, mut recipe) = row?;
        recipe.input_items = get_quantities(conn, "recipe_inputs", id)?;
        recipe.output_items = get_quantities(conn, "recipe_outputs", id)?;
        results.push(recipe);
    }
    Ok(results)
}

fn get_quantities(conn: &Connection, table: &str, recipe_id: i64) -> Result<IndexMap<String, f64>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT item_name, quantity FROM {} WHERE recipe_id = ?1 ORDER BY position",
        table
    ))?;

    let rows = stmt.query_map([recipe_id], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
    })?;

    let mut results = IndexMap::new();
    for row in rows {
        let (name, quantity) = row?;
        results.insert(name, quantity);
    }
    Ok(results)
}

/// List all item names in the database
pub fn list_items(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM items ORDER BY name")?;

    let rows = stmt.query_map([], |row| row.get(0))?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

/// Load every item into a validated catalog
pub fn load_catalog(conn: &Connection) -> Result<RecipeCatalog> {
    let mut items = Vec::new();
    for name in list_items(conn)? {
        if let Some(item) = get_item(conn, &name)? {
            items.push(item);
        }
    }

    let catalog = RecipeCatalog::new(items).context("catalog in database is invalid")?;
    info!(items = catalog.len(), "loaded catalog from database");
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn screw() -> Item {
        Item {
            name: "screw".to_string(),
            recipes: vec![
                Recipe {
                    name: "screw".to_string(),
                    input_items: IndexMap::from([("iron_rod".to_string(), 1.0)]),
                    output_items: IndexMap::from([("screw".to_string(), 4.0)]),
                    craft_time_seconds: 6.0,
                    power_required: Some(4.0),
                },
                Recipe {
                    name: "screw".to_string(),
                    input_items: IndexMap::from([
                        ("steel_beam".to_string(), 1.0),
                        ("iron_ingot".to_string(), 2.0),
                    ]),
                    output_items: IndexMap::from([
                        ("screw".to_string(), 52.0),
                        ("scrap".to_string(), 1.0),
                    ]),
                    craft_time_seconds: 24.0,
                    power_required: None,
                },
            ],
            ideal_recipe_index: None,
        }
    }

    #[test]
    fn stores_and_reloads_items_in_order() {
        let mut conn = open();
        upsert_item(&mut conn, &screw()).unwrap();

        assert_eq!(get_item(&conn, "screw").unwrap(), Some(screw()));
        assert_eq!(get_item(&conn, "iron_rod").unwrap(), None);
        assert_eq!(list_items(&conn).unwrap(), ["screw"]);
    }

    #[test]
    fn upsert_replaces_recipes() {
        let mut conn = open();
        upsert_item(&mut conn, &screw()).unwrap();

        let mut single = screw();
        single.recipes.truncate(1);
        upsert_item(&mut conn, &single).unwrap();

        assert_eq!(get_item(&conn, "screw").unwrap().unwrap().recipes.len(), 1);
        let inputs: i64 = conn
            .query_row("SELECT COUNT(*) FROM recipe_inputs", [], |row| row.get(0))
            .unwrap();
        assert_eq!(inputs, 1);
    }

    #[test]
    fn set_ideal_recipe_checks_range() {
        let mut conn = open();
        upsert_item(&mut conn, &screw()).unwrap();

        set_ideal_recipe(&conn, "screw", 1).unwrap();
        let catalog = load_catalog(&conn).unwrap();
        let ideal = catalog.find_item("screw").unwrap().ideal_recipe().unwrap();
        assert_eq!(ideal.craft_time_seconds, 24.0);

        assert!(set_ideal_recipe(&conn, "screw", 2).is_err());
        assert!(set_ideal_recipe(&conn, "bolt", 0).is_err());
    }

    fn broken(name: &str) -> Item {
        let mut item = screw();
        item.name = name.to_string();
        item.recipes.truncate(1);
        item.recipes[0].name = name.to_string();
        item
    }

    #[test]
    fn import_commits_valid_items() {
        let mut conn = open();
        let mut rod = broken("iron_rod");
        rod.recipes[0].input_items = IndexMap::from([("iron_ingot".to_string(), 1.0)]);
        rod.recipes[0].output_items = IndexMap::from([("iron_rod".to_string(), 1.0)]);

        let catalog = import_items(&mut conn, &[screw(), rod], false).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(list_items(&conn).unwrap(), ["iron_rod", "screw"]);
    }

    #[test]
    fn rejected_import_keeps_previous_catalog() {
        let mut conn = open();
        upsert_item(&mut conn, &screw()).unwrap();

        // Outputs screws, not itself
        let err = import_items(&mut conn, &[broken("bolt")], false).unwrap_err();
        assert!(format!("{:#}", err).contains("bolt"));

        assert_eq!(list_items(&conn).unwrap(), ["screw"]);
        assert_eq!(load_catalog(&conn).unwrap().len(), 1);
    }

    #[test]
    fn rejected_clearing_import_keeps_previous_catalog() {
        let mut conn = open();
        upsert_item(&mut conn, &screw()).unwrap();

        assert!(import_items(&mut conn, &[broken("bolt")], true).is_err());
        assert_eq!(get_item(&conn, "screw").unwrap(), Some(screw()));
        assert_eq!(load_catalog(&conn).unwrap().len(), 1);
    }

    #[test]
    fn negative_ideal_index_is_reported() {
        let mut conn = open();
        upsert_item(&mut conn, &screw()).unwrap();
        conn.execute("UPDATE items SET ideal_recipe_index = -1 WHERE name = 'screw'", [])
            .unwrap();

        let err = get_item(&conn, "screw").unwrap_err();
        assert!(err.to_string().contains("negative ideal recipe index"));
    }

    #[test]
    fn clear_empties_catalog() {
        let mut conn = open();
        upsert_item(&mut conn, &screw()).unwrap();
        clear_catalog(&conn).unwrap();
        assert!(load_catalog(&conn).unwrap().is_empty());
    }
}
