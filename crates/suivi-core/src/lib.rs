//! Suivi Core Library
//!
//! This crate provides the core functionality for Suivi, a transmittal
//! tracker for construction documents (GED/BTP): it follows each plan
//! through its revision rounds with the reviewing parties and archives
//! the bordereaux d'envoi that accompany every submission.
//!
//! # Architecture
//!
//! - **In-memory state, JSON snapshots**: the [`Store`] owns the data and
//!   rewrites the snapshot files on every change.
//! - **Optional remote mirror**: a spreadsheet endpoint carrying the
//!   workflow fields, pushed behind a debounce; attachments stay local.
//!
//! # Quick Start
//!
//! ```text
//! let mut store = Store::open()?;
//!
//! // Select documents and archive a slip
//! store.toggle_selection(doc_id)?;
//! let form = store.default_slip_form(today);
//! let entry = store.finalize_slip(&form, &renderer)?;
//! ```
//!
//! # Modules
//!
//! - `store`: Unified storage interface (main entry point)
//! - `models`: Documents, revisions, attachments, statuses
//! - `lifecycle`: Review application, revision fork and truncation
//! - `rows`: Row projection, filtering, sorting, status counts
//! - `selection`: The bordereau working set
//! - `bordereau`: Archived slips and reference allocation
//! - `export`: Artifact cell layouts and the renderer seam
//! - `storage`: Snapshot persistence and legacy normalization
//! - `sync`: Remote mirror client, debounce, startup merge
//! - `settings`: Persisted settings and the settings provider
//! - `config`: Application configuration

pub mod bordereau;
pub mod config;
pub mod export;
pub mod lifecycle;
pub mod models;
pub mod rows;
pub mod selection;
pub mod settings;
pub mod storage;
pub mod store;
pub mod sync;

pub use bordereau::{next_reference, SlipEntry, SlipForm};
pub use config::Config;
pub use export::{slip_layout, tracking_rows, SlipRenderer, TRACKING_HEADERS};
pub use lifecycle::{apply_review, LifecycleError, ReviewOutcome, ReviewSubmission};
pub use models::{
    ApprovalStatus, Attachment, AttachmentKind, Document, ReminderConfig, Revision,
};
pub use rows::{
    current_view, flatten, sort_rows, status_counts, urgent_documents, FlatRow, RowFilter,
    SortConfig, SortDirection, SortKey, StatusCounts, StatusFilter,
};
pub use selection::Selection;
pub use settings::{Settings, SettingsProvider};
pub use storage::{SnapshotStore, StorageError};
pub use store::{SlipError, Store};
pub use sync::MirrorClient;
