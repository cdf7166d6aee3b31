//! Route table augmentation.
//!
//! The site renderer builds its route table from the docs directory. Pages
//! living elsewhere (a changelog at the repository root, for instance) are
//! registered here by hand.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// A route table, keyed by route path.
pub type RouteTable = BTreeMap<String, RouteEntry>;

/// A single route descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteEntry {
    pub id: String,
    pub path: String,
    pub abs_path: String,
    pub parent_id: String,
    /// Backing document; absolute once the entry is in a table
    pub file: String,
}

impl RouteEntry {
    /// Resolve a relative `file` against a base directory.
    pub fn with_base(mut self, base: &Path) -> Self {
        let file = Path::new(&self.file);
        if file.is_relative() {
            self.file = base.join(file).display().to_string();
        }
        self
    }
}

/// Errors that can occur when loading or saving route tables.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("Failed to read route table {path}: {message}")]
    Read { path: String, message: String },

    #[error("Invalid route table {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Failed to write route table {path}: {message}")]
    Write { path: String, message: String },
}

/// Insert extra routes into a table, keyed by their path.
///
/// An entry whose path is already in the table replaces it. Backing files are
/// not checked here; a missing one fails later when the page renders.
pub fn augment(mut table: RouteTable, extra: &[RouteEntry]) -> RouteTable {
    for entry in extra {
        if let Some(previous) = table.insert(entry.path.clone(), entry.clone()) {
            tracing::debug!(
                "Route '{}' replaces existing route '{}'",
                entry.id,
                previous.id
            );
        }
    }
    table
}

/// Load a route table from a JSON file.
pub fn load_table(path: &Path) -> Result<RouteTable, RouteError> {
    let content = fs::read_to_string(path).map_err(|e| RouteError::Read {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    serde_json::from_str(&content).map_err(|e| RouteError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Save a route table as pretty-printed JSON.
pub fn save_table(path: &Path, table: &RouteTable) -> Result<(), RouteError> {
    let write_err = |message: String| RouteError::Write {
        path: path.display().to_string(),
        message,
    };

    let json = serde_json::to_string_pretty(table).map_err(|e| write_err(e.to_string()))?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| write_err(e.to_string()))?;
    }
    fs::write(path, json).map_err(|e| write_err(e.to_string()))
}
