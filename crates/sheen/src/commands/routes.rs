//! Route table augmentation command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use sheen_static::routes::{load_table, save_table};
use sheen_static::{augment, RouteTable};

use crate::config::Config;

/// Run the routes command.
pub fn run(config: &Config, input: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let table = match input {
        Some(path) => load_table(&path)?,
        None => RouteTable::new(),
    };

    let extra = config.extra_routes();
    let table = augment(table, &extra);
    tracing::info!("Added {} extra routes ({} total)", extra.len(), table.len());

    match output {
        Some(path) => {
            save_table(&path, &table)?;
            tracing::info!("Output: {}", path.display());
        }
        None => {
            let json =
                serde_json::to_string_pretty(&table).context("Failed to serialize route table")?;
            println!("{json}");
        }
    }

    Ok(())
}
