//! Snapshot persistence
//!
//! Saves and loads the three JSON snapshots (documents, bordereau history,
//! settings) in the data directory. Writes are atomic (write to a temp
//! file, then rename) so a file is never left partially written.
//!
//! Loading never fails the application: a missing or malformed document
//! snapshot falls back to the seed dataset, missing history to an empty
//! list, missing settings to the defaults. Malformed content is logged.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use tracing::warn;

use crate::bordereau::SlipEntry;
use crate::config::Config;
use crate::models::Document;
use crate::settings::Settings;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::schema::{self, DocumentSnapshot};

/// Persistence layer for the JSON snapshots
pub struct SnapshotStore {
    config: Config,
}

impl SnapshotStore {
    /// Create a new snapshot store with the given configuration
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Check if a document snapshot exists on disk
    pub fn documents_exist(&self) -> bool {
        self.config.documents_path().exists()
    }

    /// Load the document snapshot, falling back to the seed dataset
    ///
    /// A missing file means a fresh install; a malformed file is logged
    /// and replaced by the seed rather than crashing.
    pub fn load_documents(&self) -> Vec<Document> {
        let path = self.config.documents_path();
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return schema::seed_documents();
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read document snapshot, starting from seed");
                return schema::seed_documents();
            }
        };

        match schema::parse_documents(&raw) {
            Some(docs) => docs,
            None => {
                warn!(path = %path.display(), "document snapshot is malformed, starting from seed");
                schema::seed_documents()
            }
        }
    }

    /// Save the document snapshot atomically
    pub fn save_documents(&self, documents: &[Document]) -> StorageResult<()> {
        let snapshot = DocumentSnapshot::new(documents.to_vec());
        let bytes = serde_json::to_vec_pretty(&snapshot)?;
        atomic_write(&self.config.documents_path(), &bytes)
    }

    /// Load the bordereau history, newest first
    pub fn load_history(&self) -> Vec<SlipEntry> {
        let path = self.config.history_path();
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read history snapshot");
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(history) => history,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "history snapshot is malformed, starting empty");
                Vec::new()
            }
        }
    }

    /// Save the bordereau history atomically
    pub fn save_history(&self, history: &[SlipEntry]) -> StorageResult<()> {
        let bytes = serde_json::to_vec_pretty(history)?;
        atomic_write(&self.config.history_path(), &bytes)
    }

    /// Load the settings, falling back to the defaults
    pub fn load_settings(&self) -> Settings {
        let path = self.config.settings_path();
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Settings::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read settings snapshot");
                return Settings::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "settings snapshot is malformed, using defaults");
                Settings::default()
            }
        }
    }

    /// Save the settings atomically
    pub fn save_settings(&self, settings: &Settings) -> StorageResult<()> {
        let bytes = serde_json::to_vec_pretty(settings)?;
        atomic_write(&self.config.settings_path(), &bytes)
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let temp_path = path.with_extension("tmp");

    let mut file = File::create(&temp_path)
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    file.write_all(data)
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    // Sync to disk before rename
    file.sync_all()
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    fs::rename(&temp_path, path).map_err(|source| StorageError::AtomicWriteFailed {
        from: temp_path,
        to: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ApprovalStatus, Revision};
    use tempfile::TempDir;

    fn test_store(temp_dir: &TempDir) -> SnapshotStore {
        SnapshotStore::new(Config {
            data_dir: temp_dir.path().to_path_buf(),
            ..Config::default()
        })
    }

    #[test]
    fn test_fresh_install_loads_seed() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        assert!(!store.documents_exist());
        let docs = store.load_documents();
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[0].code, "GC-FND-Z1-001");
    }

    #[test]
    fn test_save_and_load_documents() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let doc = Document::new(
            "03",
            "C",
            "CVC",
            "CV-GAINE-001",
            "Plan de gaines - RDC",
            Revision::new("00", ApprovalStatus::Pending),
        );
        store.save_documents(&[doc.clone()]).unwrap();
        assert!(store.documents_exist());

        let loaded = store.load_documents();
        assert_eq!(loaded, vec![doc]);
    }

    #[test]
    fn test_malformed_documents_fall_back_to_seed() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        fs::write(store.config().documents_path(), "{ not json").unwrap();
        let docs = store.load_documents();
        assert_eq!(docs.len(), 3);
    }

    #[test]
    fn test_history_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        assert!(store.load_history().is_empty());

        let doc = Document::new(
            "01",
            "A",
            "GC",
            "GC-001",
            "Plan",
            Revision::new("00", ApprovalStatus::Pending),
        );
        let form = crate::bordereau::SlipForm::from_settings(
            &Settings::default(),
            chrono::NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        );
        let entry = SlipEntry::build(&form, &[&doc], Default::default(), Default::default());

        store.save_history(std::slice::from_ref(&entry)).unwrap();
        let loaded = store.load_history();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, entry.id);
        assert_eq!(loaded[0].documents[0].code, "GC-001");
    }

    #[test]
    fn test_settings_round_trip_and_fallback() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        // Missing file yields defaults
        assert_eq!(store.load_settings(), Settings::default());

        let mut settings = Settings::default();
        settings.project_name = "Tour Jasmin".to_string();
        store.save_settings(&settings).unwrap();
        assert_eq!(store.load_settings().project_name, "Tour Jasmin");

        // Malformed file yields defaults too
        fs::write(store.config().settings_path(), "][").unwrap();
        assert_eq!(store.load_settings(), Settings::default());
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let nested_path = temp_dir.path().join("a").join("b").join("docs.json");

        atomic_write(&nested_path, b"[]").unwrap();

        assert!(nested_path.exists());
        assert_eq!(fs::read_to_string(&nested_path).unwrap(), "[]");
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        store.save_documents(&[]).unwrap();
        assert!(!store.config().documents_path().with_extension("tmp").exists());
    }
}
