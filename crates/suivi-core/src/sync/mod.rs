//! Remote mirror synchronization
//!
//! The optional spreadsheet mirror holds the full document array without
//! attachment payloads. Local pushes are debounced; the one-shot startup
//! merge takes remote workflow fields and keeps local blobs. All remote
//! failures are logged and swallowed, local state stays authoritative.

pub mod client;
pub mod debounce;
pub mod merge;

pub use client::{spawn_mirror_pusher, strip_attachments, MirrorClient, SyncStatus};
pub use debounce::{debounce, Debouncer};
pub use merge::merge_remote;
