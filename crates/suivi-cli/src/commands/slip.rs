//! Bordereau commands: selection management, finalize, history

use anyhow::{anyhow, Result};
use suivi_core::{slip_layout, RowFilter, SlipError, SlipRenderer, StatusFilter, Store};

use crate::output::Output;
use crate::render::CsvSlipRenderer;
use crate::{commands, selection_file, SlipAction};

pub fn execute(action: SlipAction, output: &Output) -> Result<()> {
    let mut store = Store::open()?;
    selection_file::restore(&mut store);

    match action {
        SlipAction::Add { document } => {
            let id = store.resolve_document(&document)?;
            let selected = store.toggle_selection(id)?;
            if selected {
                selection_file::save(&store)?;
                output.success(&format!("Added to selection ({} document(s))", store.selection().len()));
            } else {
                // toggle removed it; put it back and report as already present
                store.toggle_selection(id)?;
                output.message("Already selected.");
            }
        }

        SlipAction::Remove { document } => {
            let id = store.resolve_document(&document)?;
            if store.selection().contains(id) {
                store.toggle_selection(id)?;
                selection_file::save(&store)?;
                output.success(&format!(
                    "Removed from selection ({} document(s) left)",
                    store.selection().len()
                ));
            } else {
                output.message("Not in selection.");
            }
        }

        SlipAction::Select { filter, status } => {
            match (filter, status) {
                (_, Some(s)) => {
                    let status = commands::parse_status(&s)?;
                    store.select_by_status(status);
                }
                (query, None) => {
                    let row_filter = RowFilter::new(StatusFilter::All, query.unwrap_or_default());
                    store.select_filtered(&row_filter);
                }
            }
            selection_file::save(&store)?;
            output.success(&format!("{} document(s) selected", store.selection().len()));
        }

        SlipAction::Clear => {
            store.deselect_all();
            selection_file::clear(&store)?;
            output.success("Selection cleared");
        }

        SlipAction::List => {
            let selection = store.selection();
            if selection.is_empty() {
                output.message("Selection is empty.");
                return Ok(());
            }
            if output.is_json() {
                println!("{}", serde_json::to_string_pretty(selection)?);
                return Ok(());
            }
            for id in selection.ids() {
                let Some(doc) = store.document(*id) else {
                    continue;
                };
                let index = doc
                    .current_revision()
                    .map(|r| r.index.clone())
                    .unwrap_or_else(|| "00".to_string());
                let copies = selection.copies_for(*id);
                let note = selection.observation_for(*id).unwrap_or_default();
                println!(
                    "{} | Ind. {:3} | {} ex. | {} {}",
                    doc.code,
                    index,
                    copies,
                    doc.name,
                    if note.is_empty() {
                        String::new()
                    } else {
                        format!("({})", note)
                    }
                );
            }
            println!("\nProchaine référence: {}", store.next_slip_reference());
        }

        SlipAction::Copies { document, count } => {
            let id = store.resolve_document(&document)?;
            if !store.set_copies(id, count) {
                return Err(anyhow!("Document is not in the selection"));
            }
            selection_file::save(&store)?;
            output.success(&format!("Copies set to {}", count));
        }

        SlipAction::Note { document, text } => {
            let id = store.resolve_document(&document)?;
            if !store.set_observation(id, &text) {
                return Err(anyhow!("Document is not in the selection"));
            }
            selection_file::save(&store)?;
            output.success("Note saved");
        }

        SlipAction::Finalize {
            to,
            attention,
            object,
            out,
        } => {
            let today = chrono::Local::now().date_naive();
            let mut form = store.default_slip_form(today);
            if let Some(to) = to {
                form.to = to;
            }
            if let Some(attention) = attention {
                form.attention = attention;
            }
            if let Some(object) = object {
                form.object = object;
            }

            let renderer = CsvSlipRenderer::new(out);
            match store.finalize_slip(&form, &renderer) {
                Ok(entry) => {
                    selection_file::clear(&store)?;
                    output.success(&format!(
                        "Bordereau {} archived ({} document(s), {} copies) -> {}",
                        entry.reference,
                        entry.document_count,
                        entry.total_copies(),
                        renderer.output_path(&entry).display()
                    ));
                }
                Err(SlipError::EmptySelection) => {
                    return Err(anyhow!("Selection is empty; nothing to finalize"));
                }
                Err(SlipError::ExportFailed { reference, source }) => {
                    // The slip is archived; the selection is kept so the
                    // render can be retried.
                    selection_file::save(&store)?;
                    return Err(anyhow!(
                        "Bordereau {} archived but rendering failed: {}",
                        reference,
                        source
                    ));
                }
                Err(e) => return Err(e.into()),
            }
        }

        SlipAction::History {
            search,
            delete,
            show,
            render,
            out,
        } => {
            if let Some(needle) = render {
                let id = store.resolve_slip(&needle)?;
                let entry = store
                    .history()
                    .iter()
                    .find(|e| e.id == id)
                    .ok_or_else(|| anyhow!("No archived slip with id {}", id))?;
                let renderer = CsvSlipRenderer::new(out);
                renderer.render(entry)?;
                output.success(&format!(
                    "Rendered {} -> {}",
                    entry.reference,
                    renderer.output_path(entry).display()
                ));
                return Ok(());
            }
            if let Some(needle) = delete {
                let id = store.resolve_slip(&needle)?;
                store.delete_slip(id)?;
                output.success("Bordereau deleted");
                return Ok(());
            }
            if let Some(needle) = show {
                let id = store.resolve_slip(&needle)?;
                let entry = store
                    .history()
                    .iter()
                    .find(|e| e.id == id)
                    .ok_or_else(|| anyhow!("No archived slip with id {}", id))?;
                if output.is_json() {
                    println!("{}", serde_json::to_string_pretty(entry)?);
                } else {
                    println!("{} | {} | {}", entry.reference, entry.date, entry.recipient);
                    println!("Objet: {}", entry.form.object);
                    let layout = slip_layout(entry);
                    for line in layout.lines.iter().filter(|l| !l.is_filler()) {
                        println!(
                            "  {}. {} ({} ex.) {}",
                            line.numero, line.designation, line.copies, line.observation
                        );
                    }
                    println!("  Total: {} exemplaire(s)", layout.total_copies);
                }
                return Ok(());
            }

            let entries: Vec<_> = match search {
                Some(q) => store
                    .history()
                    .iter()
                    .filter(|e| e.matches(&q))
                    .cloned()
                    .collect(),
                None => store.history().to_vec(),
            };
            output.print_history(&entries);
        }
    }

    Ok(())
}
