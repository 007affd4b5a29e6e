//! Remote mirror client
//!
//! HTTP client for the spreadsheet mirror endpoint: GET returns the full
//! document array, POST replaces it. Attachment payloads are stripped to
//! empty arrays before every push; the mirror carries workflow fields
//! only, the blobs stay local.

use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::models::Document;
use crate::storage::parse_documents;

/// Mirror transfer status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// No transfer in progress
    Idle,
    /// Transfer in progress
    Syncing,
    /// Last transfer failed
    Error,
}

/// HTTP client for the remote document mirror
pub struct MirrorClient {
    /// Endpoint URL
    url: String,
    http: reqwest::Client,
    /// Current transfer status
    status: watch::Sender<SyncStatus>,
    status_rx: watch::Receiver<SyncStatus>,
}

impl MirrorClient {
    /// Create a new mirror client for the given endpoint
    pub fn new(url: &str) -> Self {
        let (status_tx, status_rx) = watch::channel(SyncStatus::Idle);
        Self {
            url: url.to_string(),
            http: reqwest::Client::new(),
            status: status_tx,
            status_rx,
        }
    }

    /// Get the endpoint URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get the current status
    pub fn status(&self) -> SyncStatus {
        *self.status_rx.borrow()
    }

    /// Subscribe to status changes
    pub fn subscribe_status(&self) -> watch::Receiver<SyncStatus> {
        self.status_rx.clone()
    }

    /// Fetch the full document array from the mirror
    ///
    /// The response goes through the same normalization as a local
    /// snapshot, so a mirror still holding the legacy shape loads fine.
    pub async fn fetch_documents(&self) -> Result<Vec<Document>> {
        debug!(url = %self.url, "fetching documents from mirror");
        self.set_status(SyncStatus::Syncing);

        let result = self.do_fetch().await;
        match &result {
            Ok(docs) => {
                info!(count = docs.len(), "fetched documents from mirror");
                self.set_status(SyncStatus::Idle);
            }
            Err(e) => {
                warn!(url = %self.url, error = %e, "mirror fetch failed");
                self.set_status(SyncStatus::Error);
            }
        }
        result
    }

    async fn do_fetch(&self) -> Result<Vec<Document>> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .context("Failed to reach mirror endpoint")?
            .error_for_status()
            .context("Mirror endpoint returned an error status")?;

        let body = response
            .text()
            .await
            .context("Failed to read mirror response")?;

        parse_documents(&body).context("Mirror response is not a document array")
    }

    /// Push the full document array to the mirror, attachments stripped
    pub async fn push_documents(&self, documents: &[Document]) -> Result<()> {
        debug!(url = %self.url, count = documents.len(), "pushing documents to mirror");
        self.set_status(SyncStatus::Syncing);

        let payload = strip_attachments(documents);
        let result = self
            .http
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .context("Failed to reach mirror endpoint")
            .and_then(|r| {
                r.error_for_status()
                    .context("Mirror endpoint rejected the push")
            });

        match &result {
            Ok(_) => {
                info!(count = documents.len(), "pushed documents to mirror");
                self.set_status(SyncStatus::Idle);
            }
            Err(e) => {
                warn!(url = %self.url, error = %e, "mirror push failed");
                self.set_status(SyncStatus::Error);
            }
        }
        result.map(|_| ())
    }

    fn set_status(&self, status: SyncStatus) {
        let _ = self.status.send(status);
    }
}

/// Drive debounced snapshots into the mirror
///
/// Consumes the receiver half of a [`crate::sync::debounce`] pair and
/// pushes every emitted snapshot. Push failures are already logged by the
/// client; the loop keeps running so the next snapshot gets its chance.
/// The task ends when the sender side is dropped.
pub fn spawn_mirror_pusher(
    client: MirrorClient,
    mut rx: tokio::sync::mpsc::UnboundedReceiver<Vec<Document>>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(documents) = rx.recv().await {
            let _ = client.push_documents(&documents).await;
        }
    })
}

/// Clone the documents with all attachment arrays emptied
///
/// A mirror cell holds at most a few tens of kilobytes; base64 payloads
/// would make the endpoint fail silently.
pub fn strip_attachments(documents: &[Document]) -> Vec<Document> {
    documents
        .iter()
        .map(|doc| {
            let mut doc = doc.clone();
            for rev in &mut doc.revisions {
                rev.transmittal_files.clear();
                rev.observation_files.clear();
            }
            doc
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ApprovalStatus, Attachment, AttachmentKind, Revision};

    #[test]
    fn test_mirror_client_new() {
        let client = MirrorClient::new("http://localhost:3030/api/documents");

        assert_eq!(client.status(), SyncStatus::Idle);
        assert_eq!(client.url(), "http://localhost:3030/api/documents");
    }

    #[test]
    fn test_strip_attachments_leaves_source_intact() {
        let mut rev = Revision::new("00", ApprovalStatus::Pending);
        rev.add_attachment(
            AttachmentKind::Transmittal,
            Attachment::new("plan.pdf", "application/pdf", "JVBERi0"),
        )
        .unwrap();
        let doc = Document::new("01", "A", "GC", "GC-001", "Plan", rev);

        let stripped = strip_attachments(std::slice::from_ref(&doc));
        assert!(stripped[0].revisions[0].transmittal_files.is_empty());
        // Workflow fields survive
        assert_eq!(stripped[0].revisions[0].index, "00");
        // The local documents keep their payloads
        assert_eq!(doc.revisions[0].transmittal_files.len(), 1);
    }
}
