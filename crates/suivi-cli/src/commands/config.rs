//! Configuration commands

use anyhow::{anyhow, Result};
use suivi_core::Config;

use crate::output::Output;
use crate::ConfigAction;

pub fn execute(action: ConfigAction, output: &Output) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = Config::load()?;
            if output.is_json() {
                println!(
                    "{}",
                    serde_json::json!({
                        "data_dir": config.data_dir,
                        "sync_url": config.sync_url,
                        "sync_enabled": config.sync_enabled,
                        "sync_debounce_ms": config.sync_debounce_ms,
                        "config_file": Config::config_file_path(),
                    })
                );
            } else {
                println!("Configuration ({})", Config::config_file_path().display());
                println!("  data_dir:         {}", config.data_dir.display());
                println!(
                    "  sync_url:         {}",
                    config.sync_url.as_deref().unwrap_or("(not set)")
                );
                println!("  sync_enabled:     {}", config.sync_enabled);
                println!("  sync_debounce_ms: {}", config.sync_debounce_ms);
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            match key.as_str() {
                "data_dir" => config.data_dir = value.clone().into(),
                "sync_url" => {
                    config.sync_url = if value.is_empty() { None } else { Some(value.clone()) }
                }
                "sync_enabled" => {
                    config.sync_enabled = matches!(value.as_str(), "true" | "1" | "yes")
                }
                "sync_debounce_ms" => {
                    config.sync_debounce_ms = value
                        .parse()
                        .map_err(|_| anyhow!("sync_debounce_ms must be a number"))?
                }
                _ => {
                    return Err(anyhow!(
                        "Unknown key '{}' (expected data_dir, sync_url, sync_enabled, or sync_debounce_ms)",
                        key
                    ))
                }
            }
            config.save()?;
            output.success(&format!("Set {} = {}", key, value));
        }
    }
    Ok(())
}
