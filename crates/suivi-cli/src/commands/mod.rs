pub mod config;
pub mod doc;
pub mod export;
pub mod settings;
pub mod slip;
pub mod stats;
pub mod sync;

use std::time::Duration;

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use suivi_core::sync::{debounce, spawn_mirror_pusher};
use suivi_core::{ApprovalStatus, MirrorClient, Store};
use tokio::task::JoinHandle;

/// Attach the debounced mirror pusher when sync is configured
///
/// Returns the pusher task so [`flush_mirror`] can await the final push.
pub fn attach_mirror_if_enabled(store: &mut Store) -> Option<JoinHandle<()>> {
    let config = store.config();
    if !config.sync_enabled {
        return None;
    }
    let url = config.sync_url.clone()?;
    let delay = Duration::from_millis(config.sync_debounce_ms);

    let (debouncer, rx) = debounce(delay);
    let handle = spawn_mirror_pusher(MirrorClient::new(&url), rx);
    store.attach_mirror(debouncer);
    Some(handle)
}

/// Flush the pending snapshot and wait for the pusher to finish
pub async fn flush_mirror(store: &mut Store, pusher: Option<JoinHandle<()>>) {
    store.shutdown_mirror().await;
    if let Some(handle) = pusher {
        let _ = handle.await;
    }
}

/// Parse a status argument, accepting both the serialized identifier
/// ("APPROVED_WITH_COMMENTS") and the kebab-case CLI spelling
/// ("approved-with-comments")
pub fn parse_status(s: &str) -> Result<ApprovalStatus> {
    ApprovalStatus::parse(&s.replace('-', "_")).ok_or_else(|| {
        anyhow!(
            "Unknown status '{}' (expected pending, approved, approved-with-comments, rejected, or no-response)",
            s
        )
    })
}

/// Parse a YYYY-MM-DD date argument
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| anyhow!("Invalid date '{}' (expected YYYY-MM-DD)", s))
}
