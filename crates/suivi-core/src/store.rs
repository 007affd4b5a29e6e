//! Unified storage interface
//!
//! The `Store` owns the in-memory state (documents, bordereau history,
//! selection, settings) and coordinates persistence and the optional
//! remote mirror. All mutation goes through it: documents are replaced,
//! appended or deleted whole, never field-edited across the boundary, and
//! every change is snapshotted to disk before the call returns.
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = Store::open()?; // seeds on first run
//!
//! store.toggle_selection(doc_id)?;
//! let entry = store.finalize_slip(&form, &renderer)?;
//! ```

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::bordereau::{self, SlipEntry, SlipForm};
use crate::config::Config;
use crate::export::SlipRenderer;
use crate::lifecycle::{self, ReviewOutcome, ReviewSubmission};
use crate::models::{ApprovalStatus, Attachment, AttachmentKind, Document};
use crate::rows::{current_view, RowFilter};
use crate::selection::Selection;
use crate::settings::{Settings, SettingsProvider};
use crate::storage::{SnapshotStore, StorageError};
use crate::sync::{merge_remote, Debouncer, MirrorClient};

/// Errors raised by the bordereau finalize transaction
#[derive(Error, Debug)]
pub enum SlipError {
    /// Finalize was requested with nothing selected
    #[error("no documents selected")]
    EmptySelection,

    /// The entry was archived but the artifact could not be written.
    /// The selection is kept so the user can retry.
    #[error("slip {reference} was archived but rendering failed: {source}")]
    ExportFailed {
        reference: String,
        #[source]
        source: anyhow::Error,
    },

    /// Persisting a snapshot failed
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Unified storage interface for the tracker
pub struct Store {
    documents: Vec<Document>,
    /// Archived slips, newest first
    history: Vec<SlipEntry>,
    /// Ephemeral bordereau working set, not persisted
    selection: Selection,
    settings: SettingsProvider,
    persistence: SnapshotStore,
    /// Debounced mirror pusher, when a mirror is configured
    mirror: Option<Debouncer<Vec<Document>>>,
}

impl Store {
    /// Open the store, seeding the document set on first run
    pub fn open() -> Result<Self> {
        let config = Config::load().context("Failed to load configuration")?;
        Ok(Self::open_with_config(config))
    }

    /// Open the store with a specific configuration
    pub fn open_with_config(config: Config) -> Self {
        let persistence = SnapshotStore::new(config);
        let first_run = !persistence.documents_exist();
        let documents = persistence.load_documents();
        // Write the seed on first run so document ids stay stable
        // across processes
        if first_run {
            if let Err(e) = persistence.save_documents(&documents) {
                warn!(error = %e, "failed to persist seed snapshot");
            }
        }
        let history = persistence.load_history();
        let settings = SettingsProvider::new(persistence.load_settings());

        Self {
            documents,
            history,
            selection: Selection::new(),
            settings,
            persistence,
            mirror: None,
        }
    }

    /// Attach a debounced mirror pusher; every document change schedules it
    pub fn attach_mirror(&mut self, debouncer: Debouncer<Vec<Document>>) {
        self.mirror = Some(debouncer);
    }

    /// Detach the mirror pusher, flushing any pending snapshot
    ///
    /// A short-lived process must call this before exit or a mutation
    /// still inside the debounce window would never be pushed.
    pub async fn shutdown_mirror(&mut self) {
        if let Some(mirror) = self.mirror.take() {
            mirror.shutdown().await;
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        self.persistence.config()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn history(&self) -> &[SlipEntry] {
        &self.history
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn settings(&self) -> Settings {
        self.settings.current()
    }

    pub fn settings_provider(&self) -> &SettingsProvider {
        &self.settings
    }

    /// Replace the settings, persist them and wake subscribers
    pub fn update_settings(&mut self, settings: Settings) -> Result<(), StorageError> {
        self.persistence.save_settings(&settings)?;
        self.settings.update(settings);
        Ok(())
    }

    // ==================== Document Operations ====================

    pub fn document(&self, id: Uuid) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == id)
    }

    /// Resolve a user-supplied reference to a document id
    ///
    /// Accepts a full UUID, an unambiguous UUID prefix, or a document code
    /// (case-insensitive exact match).
    pub fn resolve_document(&self, needle: &str) -> Result<Uuid> {
        if let Ok(id) = Uuid::parse_str(needle) {
            return self
                .document(id)
                .map(|d| d.id)
                .with_context(|| format!("No document with id {}", needle));
        }

        if let Some(doc) = self
            .documents
            .iter()
            .find(|d| d.code.eq_ignore_ascii_case(needle))
        {
            return Ok(doc.id);
        }

        let matches: Vec<&Document> = self
            .documents
            .iter()
            .filter(|d| d.id.to_string().starts_with(needle))
            .collect();
        match matches.as_slice() {
            [doc] => Ok(doc.id),
            [] => anyhow::bail!("No document matches '{}'", needle),
            _ => anyhow::bail!("'{}' is ambiguous, matches {} documents", needle, matches.len()),
        }
    }

    /// Add a new document
    pub fn add_document(&mut self, document: Document) -> Result<(), StorageError> {
        info!(code = %document.code, "adding document");
        self.documents.push(document);
        self.persist_documents()
    }

    /// Replace an existing document whole
    ///
    /// Returns false when no document has the given id.
    pub fn update_document(&mut self, document: Document) -> Result<bool, StorageError> {
        let Some(slot) = self.documents.iter_mut().find(|d| d.id == document.id) else {
            return Ok(false);
        };
        *slot = document;
        self.persist_documents()?;
        Ok(true)
    }

    /// Delete a document and prune it from the working selection
    pub fn delete_document(&mut self, id: Uuid) -> Result<bool, StorageError> {
        let before = self.documents.len();
        self.documents.retain(|d| d.id != id);
        if self.documents.len() == before {
            return Ok(false);
        }
        // The selection must never point at a missing document
        self.selection.remove(id);
        info!(%id, "deleted document");
        self.persist_documents()?;
        Ok(true)
    }

    /// Apply a review submission to one revision of a document
    pub fn review_revision(
        &mut self,
        doc_id: Uuid,
        revision_id: Uuid,
        submission: &ReviewSubmission,
    ) -> Result<ReviewOutcome> {
        let doc = self
            .documents
            .iter_mut()
            .find(|d| d.id == doc_id)
            .with_context(|| format!("No document with id {}", doc_id))?;

        let outcome = lifecycle::apply_review(doc, revision_id, submission)?;
        debug!(%doc_id, ?outcome, "applied review");
        self.persist_documents()?;
        Ok(outcome)
    }

    /// Attach a file to the current revision of a document
    pub fn attach_to_current(
        &mut self,
        doc_id: Uuid,
        kind: AttachmentKind,
        attachment: Attachment,
    ) -> Result<()> {
        let doc = self
            .documents
            .iter_mut()
            .find(|d| d.id == doc_id)
            .with_context(|| format!("No document with id {}", doc_id))?;
        let rev = doc
            .current_revision_mut()
            .context("Document has no revisions")?;

        rev.add_attachment(kind, attachment)?;
        self.persist_documents()?;
        Ok(())
    }

    /// Set or clear the follow-up reminder on the current revision
    pub fn set_reminder(
        &mut self,
        doc_id: Uuid,
        reminder: Option<crate::models::ReminderConfig>,
    ) -> Result<()> {
        let doc = self
            .documents
            .iter_mut()
            .find(|d| d.id == doc_id)
            .with_context(|| format!("No document with id {}", doc_id))?;
        let rev = doc
            .current_revision_mut()
            .context("Document has no revisions")?;
        rev.reminder = reminder;
        self.persist_documents()?;
        Ok(())
    }

    // ==================== Selection Operations ====================

    /// Replace the working selection, dropping ids that no longer resolve
    pub fn restore_selection(&mut self, selection: Selection) {
        self.selection = selection;
        let stale: Vec<Uuid> = self
            .selection
            .ids()
            .iter()
            .copied()
            .filter(|id| self.document(*id).is_none())
            .collect();
        for id in stale {
            self.selection.remove(id);
        }
    }

    /// Toggle a document in the bordereau selection
    ///
    /// Returns whether the document is selected afterwards.
    pub fn toggle_selection(&mut self, id: Uuid) -> Result<bool> {
        self.document(id)
            .with_context(|| format!("No document with id {}", id))?;
        Ok(self.selection.toggle(id))
    }

    /// Add every document matching the filter to the selection
    pub fn select_filtered(&mut self, filter: &RowFilter) {
        let ids: Vec<Uuid> = self
            .documents
            .iter()
            .filter(|doc| filter.matches_document(doc))
            .map(|doc| doc.id)
            .collect();
        self.selection.insert_all(ids);
    }

    /// Add every document whose current revision has the given status
    pub fn select_by_status(&mut self, status: ApprovalStatus) {
        let ids: Vec<Uuid> = current_view(&self.documents)
            .into_iter()
            .filter(|row| row.rev.status == status)
            .map(|row| row.doc.id)
            .collect();
        self.selection.insert_all(ids);
    }

    pub fn deselect_all(&mut self) {
        self.selection.clear();
    }

    /// Set the copy count for a selected document
    pub fn set_copies(&mut self, id: Uuid, copies: u32) -> bool {
        self.selection.set_copies(id, copies)
    }

    /// Set or clear the observation note for a selected document
    pub fn set_observation(&mut self, id: Uuid, note: &str) -> bool {
        self.selection.set_observation(id, note)
    }

    // ==================== Bordereau Operations ====================

    /// Next default slip reference, from the archived history
    pub fn next_slip_reference(&self) -> String {
        bordereau::next_reference(&self.history, &self.settings.current().slip_prefix)
    }

    /// Header form prefilled from settings, dated `today`
    pub fn default_slip_form(&self, today: chrono::NaiveDate) -> SlipForm {
        let mut form = SlipForm::from_settings(&self.settings.current(), today);
        form.reference = self.next_slip_reference();
        form
    }

    /// Finalize the current selection into an archived slip
    ///
    /// Commit-then-render: the entry is archived first, then the artifact
    /// is written. A render failure keeps both the archived entry and the
    /// working selection; only a fully successful finalize clears it.
    pub fn finalize_slip(
        &mut self,
        form: &SlipForm,
        renderer: &dyn SlipRenderer,
    ) -> Result<SlipEntry, SlipError> {
        let selected: Vec<&Document> = self
            .selection
            .ids()
            .iter()
            .filter_map(|id| self.documents.iter().find(|d| d.id == *id))
            .collect();
        if selected.is_empty() {
            return Err(SlipError::EmptySelection);
        }

        let entry = SlipEntry::build(
            form,
            &selected,
            self.selection.copies_snapshot(),
            self.selection.observations_snapshot(),
        );

        self.history.insert(0, entry.clone());
        self.persistence.save_history(&self.history)?;
        info!(reference = %entry.reference, documents = entry.document_count, "archived slip");

        if let Err(source) = renderer.render(&entry) {
            return Err(SlipError::ExportFailed {
                reference: entry.reference.clone(),
                source,
            });
        }

        self.selection.clear();
        Ok(entry)
    }

    /// Delete an archived slip
    pub fn delete_slip(&mut self, id: Uuid) -> Result<bool, StorageError> {
        let before = self.history.len();
        self.history.retain(|e| e.id != id);
        if self.history.len() == before {
            return Ok(false);
        }
        self.persistence.save_history(&self.history)?;
        Ok(true)
    }

    /// Find an archived slip by id prefix or reference
    pub fn resolve_slip(&self, needle: &str) -> Result<Uuid> {
        if let Some(entry) = self
            .history
            .iter()
            .find(|e| e.reference.eq_ignore_ascii_case(needle))
        {
            return Ok(entry.id);
        }
        let matches: Vec<&SlipEntry> = self
            .history
            .iter()
            .filter(|e| e.id.to_string().starts_with(needle))
            .collect();
        match matches.as_slice() {
            [entry] => Ok(entry.id),
            [] => anyhow::bail!("No slip matches '{}'", needle),
            _ => anyhow::bail!("'{}' is ambiguous, matches {} slips", needle, matches.len()),
        }
    }

    // ==================== Sync ====================

    /// One-shot merge with the remote mirror
    ///
    /// Fetches the remote array, merges it (remote wins on workflow
    /// fields, local wins on attachments), persists, then pushes the
    /// merged state back. Returns whether the local set changed.
    pub async fn sync_once(&mut self, client: &MirrorClient) -> Result<bool> {
        let remote = client.fetch_documents().await?;
        let merged = merge_remote(&self.documents, remote);
        let changed = merged != self.documents;

        if changed {
            self.documents = merged;
            self.persistence.save_documents(&self.documents)?;
        }
        client.push_documents(&self.documents).await?;
        Ok(changed)
    }

    /// Persist the document snapshot and schedule a mirror push
    fn persist_documents(&mut self) -> Result<(), StorageError> {
        self.persistence.save_documents(&self.documents)?;
        if let Some(mirror) = &self.mirror {
            mirror.schedule(self.documents.clone());
        }
        Ok(())
    }
}
