//! Data export: the tracking table as CSV

use anyhow::{Context, Result};
use suivi_core::{current_view, sort_rows, tracking_rows, Store, TRACKING_HEADERS};

use crate::output::Output;
use crate::ExportAction;

pub fn execute(action: ExportAction, output: &Output) -> Result<()> {
    match action {
        ExportAction::Docs { out } => {
            let store = Store::open()?;
            let mut rows = current_view(store.documents());
            sort_rows(&mut rows, None);
            let shaped = tracking_rows(&rows);

            let mut writer = csv::Writer::from_path(&out)
                .with_context(|| format!("Failed to create {}", out.display()))?;
            writer.write_record(TRACKING_HEADERS)?;
            for row in &shaped {
                writer.write_record(&row.cells)?;
            }
            writer.flush()?;

            output.success(&format!(
                "Exported {} document(s) to {}",
                shaped.len(),
                out.display()
            ));
        }
    }
    Ok(())
}
