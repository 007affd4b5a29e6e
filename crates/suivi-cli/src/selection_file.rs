//! Working-selection persistence between CLI invocations
//!
//! The core keeps the bordereau selection in memory only; a CLI process
//! lives for one command, so the selection is carried across invocations
//! in a small JSON file next to the snapshots.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use suivi_core::{Config, Selection, Store};
use tracing::warn;

fn selection_path(config: &Config) -> PathBuf {
    config.data_dir.join("selection.json")
}

/// Load the saved selection into the store, dropping stale ids
pub fn restore(store: &mut Store) {
    let path = selection_path(store.config());
    let selection = match fs::read_to_string(&path) {
        Ok(raw) => match serde_json::from_str::<Selection>(&raw) {
            Ok(sel) => sel,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring malformed selection file");
                Selection::new()
            }
        },
        Err(_) => Selection::new(),
    };
    store.restore_selection(selection);
}

/// Write the store's current selection back to disk
pub fn save(store: &Store) -> Result<()> {
    let path = selection_path(store.config());
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let data = serde_json::to_string_pretty(store.selection())?;
    fs::write(&path, data)
        .with_context(|| format!("Failed to write selection to {}", path.display()))
}

/// Remove the selection file (after a successful finalize)
pub fn clear(store: &Store) -> Result<()> {
    let path = selection_path(store.config());
    if path.exists() {
        fs::remove_file(&path)
            .with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}
