//! Startup merge of the remote mirror into the local snapshot
//!
//! The mirror never carries attachment payloads, so a plain replace would
//! silently drop every local blob. The merge takes the remote array as the
//! base for workflow fields and grafts the local attachment arrays back
//! onto matching revisions. Documents that exist only locally (typically
//! created while offline) are retained.

use std::collections::HashMap;

use tracing::debug;
use uuid::Uuid;

use crate::models::{Document, Revision};

/// Merge a fetched remote array into the local documents
///
/// Remote is authoritative for workflow fields and document membership
/// order; local is authoritative for attachment payloads; local-only
/// documents are appended in their local order.
pub fn merge_remote(local: &[Document], remote: Vec<Document>) -> Vec<Document> {
    let local_by_id: HashMap<Uuid, &Document> = local.iter().map(|d| (d.id, d)).collect();

    let mut merged: Vec<Document> = remote
        .into_iter()
        .map(|mut doc| {
            if let Some(local_doc) = local_by_id.get(&doc.id) {
                for rev in &mut doc.revisions {
                    if let Some(local_rev) = find_local_revision(local_doc, rev) {
                        rev.transmittal_files = local_rev.transmittal_files.clone();
                        rev.observation_files = local_rev.observation_files.clone();
                    }
                }
            }
            doc
        })
        .collect();

    let remote_ids: std::collections::HashSet<Uuid> = merged.iter().map(|d| d.id).collect();
    for doc in local {
        if !remote_ids.contains(&doc.id) {
            debug!(code = %doc.code, "retaining local-only document");
            merged.push(doc.clone());
        }
    }

    merged
}

/// Match by revision id first; a revision edited remotely keeps its id.
/// Fall back to the display label for mirrors that regenerated ids.
fn find_local_revision<'a>(local_doc: &'a Document, remote_rev: &Revision) -> Option<&'a Revision> {
    local_doc
        .revisions
        .iter()
        .find(|r| r.id == remote_rev.id)
        .or_else(|| {
            local_doc
                .revisions
                .iter()
                .find(|r| r.index == remote_rev.index)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ApprovalStatus, Attachment, AttachmentKind};
    use crate::sync::client::strip_attachments;

    fn doc_with_attachment() -> Document {
        let mut rev = Revision::new("00", ApprovalStatus::Pending);
        rev.add_attachment(
            AttachmentKind::Transmittal,
            Attachment::new("plan.pdf", "application/pdf", "JVBERi0"),
        )
        .unwrap();
        Document::new("01", "A", "GC", "GC-001", "Plan de fondation", rev)
    }

    #[test]
    fn test_remote_workflow_wins_local_attachments_survive() {
        let local = vec![doc_with_attachment()];

        // The mirror saw the revision approved, with attachments stripped
        let mut remote = strip_attachments(&local);
        remote[0].revisions[0].status = ApprovalStatus::Approved;

        let merged = merge_remote(&local, remote);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].revisions[0].status, ApprovalStatus::Approved);
        assert_eq!(merged[0].revisions[0].transmittal_files.len(), 1);
    }

    #[test]
    fn test_local_only_documents_are_retained() {
        let shared = doc_with_attachment();
        let offline_only = Document::new(
            "02",
            "B",
            "ELEC",
            "EL-001",
            "Schéma",
            Revision::new("00", ApprovalStatus::Pending),
        );
        let local = vec![shared.clone(), offline_only.clone()];

        let merged = merge_remote(&local, strip_attachments(std::slice::from_ref(&shared)));
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[1].id, offline_only.id);
    }

    #[test]
    fn test_remote_only_revision_has_no_attachments_grafted() {
        let local = vec![doc_with_attachment()];

        // Remote forked a successor revision the local side has not seen
        let mut remote = strip_attachments(&local);
        remote[0]
            .revisions
            .push(Revision::new("01", ApprovalStatus::Pending));

        let merged = merge_remote(&local, remote);
        assert_eq!(merged[0].revisions.len(), 2);
        assert_eq!(merged[0].revisions[0].transmittal_files.len(), 1);
        assert!(merged[0].revisions[1].transmittal_files.is_empty());
    }

    #[test]
    fn test_label_fallback_when_remote_regenerated_ids() {
        let local = vec![doc_with_attachment()];

        let mut remote = strip_attachments(&local);
        remote[0].revisions[0].id = Uuid::new_v4();

        let merged = merge_remote(&local, remote);
        assert_eq!(merged[0].revisions[0].transmittal_files.len(), 1);
    }
}
