//! Document commands: add, list, show, review, edit, delete, search,
//! attach, remind

use std::io::{self, Write};

use anyhow::{anyhow, Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use suivi_core::{
    current_view, flatten, sort_rows, Attachment, AttachmentKind, Document, ReminderConfig,
    Revision, ReviewSubmission, RowFilter, SortConfig, SortDirection, SortKey, StatusFilter, Store,
};

use crate::output::Output;
use crate::{commands, selection_file, DocAction};

pub async fn execute(action: DocAction, output: &Output) -> Result<()> {
    let mut store = Store::open()?;
    let pusher = commands::attach_mirror_if_enabled(&mut store);
    let result = run(action, output, &mut store);
    commands::flush_mirror(&mut store, pusher).await;
    result
}

fn run(action: DocAction, output: &Output, store: &mut Store) -> Result<()> {
    match action {
        DocAction::Add {
            code,
            name,
            lot,
            classement,
            poste,
            index,
            transmittal_ref,
            sent,
        } => {
            let mut revision = Revision::new(index, suivi_core::ApprovalStatus::Pending);
            revision.transmittal_ref = transmittal_ref;
            revision.transmittal_date = sent.as_deref().map(commands::parse_date).transpose()?;

            let doc = Document::new(lot, classement, poste, code, name, revision);
            let id = doc.id;
            let code = doc.code.clone();
            store.add_document(doc)?;

            output.success(&format!("Added document {} ({})", code, id));
            if output.is_quiet() {
                println!("{}", id);
            }
        }

        DocAction::List {
            status,
            filter,
            sort,
            desc,
            all,
        } => {
            let status_filter = match status.as_deref() {
                Some(s) => StatusFilter::Only(commands::parse_status(s)?),
                None => StatusFilter::All,
            };
            let row_filter = RowFilter::new(status_filter, filter.unwrap_or_default());

            let documents = store.documents();
            let mut rows = if all {
                flatten(documents)
            } else {
                current_view(documents)
            };
            rows.retain(|row| row_filter.matches_row(row));

            let config = match sort.as_deref() {
                Some(key) => {
                    let key = SortKey::parse(key)
                        .ok_or_else(|| anyhow!("Unknown sort column '{}'", key))?;
                    Some(SortConfig {
                        key,
                        direction: if desc {
                            SortDirection::Desc
                        } else {
                            SortDirection::Asc
                        },
                    })
                }
                None => None,
            };
            sort_rows(&mut rows, config);

            output.print_rows(&rows);
        }

        DocAction::Show { document } => {
            let id = store.resolve_document(&document)?;
            let doc = store
                .document(id)
                .ok_or_else(|| anyhow!("No document with id {}", id))?;
            output.print_document(doc);
        }

        DocAction::Review {
            document,
            status,
            revision,
            observation_ref,
            observation_date,
            approval_date,
            return_date,
            comments,
        } => {
            let id = store.resolve_document(&document)?;
            let status = commands::parse_status(&status)?;

            let doc = store
                .document(id)
                .ok_or_else(|| anyhow!("No document with id {}", id))?;
            let rev = match revision.as_deref() {
                Some(needle) => doc
                    .revisions
                    .iter()
                    .find(|r| r.index == needle || r.id.to_string().starts_with(needle))
                    .ok_or_else(|| anyhow!("No revision '{}' on {}", needle, doc.code))?,
                None => doc
                    .current_revision()
                    .ok_or_else(|| anyhow!("Document {} has no revisions", doc.code))?,
            };
            let rev_id = rev.id;

            let mut submission = ReviewSubmission::status_only(rev, status);
            if let Some(r) = observation_ref {
                submission.observation_ref = Some(r);
            }
            if let Some(d) = observation_date {
                submission.observation_date = Some(commands::parse_date(&d)?);
            }
            if let Some(d) = approval_date {
                submission.approval_date = Some(commands::parse_date(&d)?);
            }
            if let Some(d) = return_date {
                submission.return_date = Some(commands::parse_date(&d)?);
            }
            if let Some(c) = comments {
                submission.comments = Some(c);
            }

            let outcome = store.review_revision(id, rev_id, &submission)?;
            match outcome {
                suivi_core::ReviewOutcome::Updated => {
                    output.success(&format!("Revision updated: {}", status.label()));
                }
                suivi_core::ReviewOutcome::Forked => {
                    let new_index = store
                        .document(id)
                        .and_then(|d| d.current_revision())
                        .map(|r| r.index.clone())
                        .unwrap_or_default();
                    output.success(&format!(
                        "Revision rejected; new revision Ind. {} opened",
                        new_index
                    ));
                }
            }
        }

        DocAction::EditMeta {
            document,
            code,
            name,
            lot,
            classement,
            poste,
        } => {
            let id = store.resolve_document(&document)?;
            let mut doc = store
                .document(id)
                .ok_or_else(|| anyhow!("No document with id {}", id))?
                .clone();

            if let Some(code) = code {
                doc.code = code;
            }
            if let Some(name) = name {
                doc.name = name;
            }
            if let Some(lot) = lot {
                doc.lot = lot;
            }
            if let Some(classement) = classement {
                doc.classement = classement;
            }
            if let Some(poste) = poste {
                doc.poste = poste;
            }

            store.update_document(doc)?;
            output.success("Document updated");
        }

        DocAction::Delete { document, force } => {
            let id = store.resolve_document(&document)?;
            let code = store
                .document(id)
                .map(|d| d.code.clone())
                .unwrap_or_default();

            if !force && !output.is_quiet() && !output.is_json() {
                print!("Delete document {} and all its revisions? [y/N] ", code);
                io::stdout().flush()?;
                let mut answer = String::new();
                io::stdin().read_line(&mut answer)?;
                if !matches!(answer.trim(), "y" | "Y" | "yes") {
                    output.message("Cancelled.");
                    return Ok(());
                }
            }

            // Prune the working selection together with the document
            selection_file::restore(store);
            store.delete_document(id)?;
            selection_file::save(store)?;
            output.success(&format!("Deleted {}", code));
        }

        DocAction::Search { query } => {
            let filter = RowFilter::new(StatusFilter::All, query);
            let documents = store.documents();
            let mut rows = current_view(documents);
            rows.retain(|row| filter.matches_row(row));
            sort_rows(&mut rows, None);
            output.print_rows(&rows);
        }

        DocAction::Attach {
            document,
            file,
            observation,
        } => {
            let id = store.resolve_document(&document)?;
            let bytes = std::fs::read(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "attachment".to_string());
            let mime = mime_guess::from_path(&file)
                .first_or_octet_stream()
                .to_string();
            let attachment = Attachment::new(name.clone(), mime, BASE64.encode(bytes));

            let kind = if observation {
                AttachmentKind::Observation
            } else {
                AttachmentKind::Transmittal
            };
            store.attach_to_current(id, kind, attachment)?;
            output.success(&format!("Attached {}", name));
        }

        DocAction::Remind {
            document,
            every,
            off,
        } => {
            let id = store.resolve_document(&document)?;
            if off {
                store.set_reminder(id, None)?;
                output.success("Reminder cleared");
            } else {
                let today = chrono::Local::now().date_naive();
                let reminder = ReminderConfig::new(true, every, today);
                let next = reminder
                    .next_reminder_date
                    .map(|d| d.to_string())
                    .unwrap_or_default();
                store.set_reminder(id, Some(reminder))?;
                output.success(&format!("Reminder set, next follow-up {}", next));
            }
        }
    }

    Ok(())
}
