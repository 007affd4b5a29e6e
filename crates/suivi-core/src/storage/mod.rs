//! Storage layer
//!
//! JSON snapshot persistence for documents, bordereau history and
//! settings, with atomic writes and a one-time normalization of snapshots
//! written by the legacy browser application.

pub mod error;
pub mod persistence;
pub mod schema;

pub use error::{StorageError, StorageResult};
pub use persistence::SnapshotStore;
pub use schema::{parse_documents, seed_documents, DocumentSnapshot, SCHEMA_VERSION};
