//! Status dashboard: per-status counts and documents awaiting action

use anyhow::Result;
use suivi_core::{status_counts, urgent_documents, Store};

use crate::output::Output;

const URGENT_LIMIT: usize = 10;

pub fn execute(output: &Output) -> Result<()> {
    let store = Store::open()?;
    let counts = status_counts(store.documents());
    let urgent = urgent_documents(store.documents(), URGENT_LIMIT);
    output.print_counts(&counts, &urgent);
    Ok(())
}
