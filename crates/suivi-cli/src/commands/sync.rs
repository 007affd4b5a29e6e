//! One-shot reconciliation with the remote mirror

use anyhow::{anyhow, Result};
use suivi_core::{MirrorClient, Store};

use crate::output::Output;

pub async fn execute(output: &Output) -> Result<()> {
    let mut store = Store::open()?;

    let config = store.config();
    if !config.sync_enabled {
        return Err(anyhow!(
            "Sync is disabled; enable it with `suivi config set sync_enabled true`"
        ));
    }
    let url = config
        .sync_url
        .clone()
        .ok_or_else(|| anyhow!("No sync URL configured; set one with `suivi config set sync_url <url>`"))?;

    let client = MirrorClient::new(&url);
    let changed = store.sync_once(&client).await?;

    if changed {
        output.success("Synchronized; local documents updated");
    } else {
        output.success("Synchronized; already up to date");
    }
    Ok(())
}
