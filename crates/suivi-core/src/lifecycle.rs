//! Revision lifecycle engine
//!
//! Pure logic deciding what happens when a user submits a review edit
//! against a revision: every status updates the target revision in place,
//! and REJECTED additionally forks a fresh PENDING revision with an
//! advanced index label. Non-REJECTED statuses truncate any revisions
//! left over after the target, so a rejection that was later reconsidered
//! does not leave an orphaned fork behind.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{ApprovalStatus, Document, Revision};

/// Fields a review-edit form submits for the target revision
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSubmission {
    /// Revision label after the edit
    pub index: String,
    pub transmittal_ref: String,
    pub transmittal_date: Option<NaiveDate>,
    pub observation_ref: Option<String>,
    pub observation_date: Option<NaiveDate>,
    pub approval_date: Option<NaiveDate>,
    pub return_date: Option<NaiveDate>,
    pub status: ApprovalStatus,
    pub comments: Option<String>,
}

impl ReviewSubmission {
    /// A submission that keeps the revision's current fields but sets a status
    pub fn status_only(rev: &Revision, status: ApprovalStatus) -> Self {
        Self {
            index: rev.index.clone(),
            transmittal_ref: rev.transmittal_ref.clone(),
            transmittal_date: rev.transmittal_date,
            observation_ref: rev.observation_ref.clone(),
            observation_date: rev.observation_date,
            approval_date: rev.approval_date,
            return_date: rev.return_date,
            status,
            comments: rev.comments.clone(),
        }
    }
}

/// What a review edit did to the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewOutcome {
    /// The target revision was updated in place
    Updated,
    /// The target revision was updated and a new PENDING revision forked
    Forked,
}

/// Errors from applying a review edit
#[derive(thiserror::Error, Debug)]
pub enum LifecycleError {
    #[error("revision not found: {0}")]
    RevisionNotFound(Uuid),
}

/// Apply a review edit to the revision identified by `revision_id`
///
/// See the module docs for the transition rule. On success the document's
/// current-revision pointer always lands on the revision the user should
/// work with next: the edited one, or the forked PENDING one after a
/// rejection.
pub fn apply_review(
    doc: &mut Document,
    revision_id: Uuid,
    submission: &ReviewSubmission,
) -> Result<ReviewOutcome, LifecycleError> {
    let target = doc
        .revisions
        .iter()
        .position(|r| r.id == revision_id)
        .ok_or(LifecycleError::RevisionNotFound(revision_id))?;

    {
        let rev = &mut doc.revisions[target];
        rev.index = submission.index.clone();
        rev.transmittal_ref = submission.transmittal_ref.clone();
        rev.transmittal_date = submission.transmittal_date;
        rev.observation_ref = submission.observation_ref.clone();
        rev.observation_date = submission.observation_date;
        rev.approval_date = submission.approval_date;
        rev.return_date = submission.return_date;
        rev.status = submission.status;
        rev.comments = submission.comments.clone();
    }

    if submission.status == ApprovalStatus::Rejected {
        let next = next_index_label(&submission.index);
        doc.revisions.push(Revision::new(next, ApprovalStatus::Pending));
        doc.current_revision_index = Some(doc.revisions.len() - 1);
        Ok(ReviewOutcome::Forked)
    } else {
        // Discard stale forks from an earlier rejection
        doc.revisions.truncate(target + 1);
        doc.current_revision_index = Some(target);
        Ok(ReviewOutcome::Updated)
    }
}

/// Compute the successor of a revision label
///
/// Numeric labels increment numerically and zero-pad to two digits
/// ("00" -> "01", "09" -> "10", "99" -> "100"). Alphabetic labels
/// increment as base-26 with carry, preserving case ("A" -> "B",
/// "Z" -> "AA", "az" -> "ba"). Anything else advances the final
/// character by one code point.
pub fn next_index_label(label: &str) -> String {
    if label.is_empty() {
        return "00".to_string();
    }

    if label.chars().all(|c| c.is_ascii_digit()) {
        let n: u64 = label.parse().unwrap_or(0);
        return format!("{:02}", n + 1);
    }

    if label.chars().all(|c| c.is_ascii_alphabetic()) {
        return increment_alpha(label);
    }

    // Mixed labels: advance the last character only
    let mut chars: Vec<char> = label.chars().collect();
    let last = chars.len() - 1;
    chars[last] = char::from_u32(chars[last] as u32 + 1).unwrap_or(chars[last]);
    chars.into_iter().collect()
}

/// Base-26 increment over ASCII letters, with carry
///
/// The carried-in letter takes the case of the label's first character,
/// so "Z" becomes "AA" and "z" becomes "aa".
fn increment_alpha(label: &str) -> String {
    let mut chars: Vec<char> = label.chars().collect();
    let upper = chars[0].is_ascii_uppercase();
    let mut i = chars.len();
    loop {
        if i == 0 {
            chars.insert(0, if upper { 'A' } else { 'a' });
            break;
        }
        i -= 1;
        let c = chars[i];
        if c == 'z' {
            chars[i] = 'a';
        } else if c == 'Z' {
            chars[i] = 'A';
        } else {
            chars[i] = char::from_u32(c as u32 + 1).unwrap_or(c);
            break;
        }
    }
    chars.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Attachment, AttachmentKind};

    fn pending_doc() -> Document {
        let mut rev = Revision::new("00", ApprovalStatus::Pending);
        rev.transmittal_ref = "B-001".to_string();
        rev.transmittal_date = NaiveDate::from_ymd_opt(2023, 10, 15);
        Document::new("01", "A", "GC", "GC-001", "Plan de fondation", rev)
    }

    fn submission(doc: &Document, status: ApprovalStatus) -> ReviewSubmission {
        ReviewSubmission::status_only(doc.current_revision().unwrap(), status)
    }

    #[test]
    fn test_next_index_label_numeric() {
        assert_eq!(next_index_label("00"), "01");
        assert_eq!(next_index_label("09"), "10");
        assert_eq!(next_index_label("9"), "10");
        assert_eq!(next_index_label("99"), "100");
    }

    #[test]
    fn test_next_index_label_alpha() {
        assert_eq!(next_index_label("A"), "B");
        assert_eq!(next_index_label("Z"), "AA");
        assert_eq!(next_index_label("AZ"), "BA");
        assert_eq!(next_index_label("ZZ"), "AAA");
        assert_eq!(next_index_label("z"), "aa");
    }

    #[test]
    fn test_next_index_label_mixed_and_empty() {
        // Mixed alphanumeric labels advance the last character only
        assert_eq!(next_index_label("Z9"), "Z:");
        assert_eq!(next_index_label(""), "00");
    }

    #[test]
    fn test_rejected_forks_pending_revision() {
        let mut doc = pending_doc();
        let rev_id = doc.revisions[0].id;

        let sub = submission(&doc, ApprovalStatus::Rejected);
        let outcome = apply_review(&mut doc, rev_id, &sub).unwrap();

        assert_eq!(outcome, ReviewOutcome::Forked);
        assert_eq!(doc.revisions.len(), 2);
        assert_eq!(doc.revisions[0].status, ApprovalStatus::Rejected);
        assert_eq!(doc.revisions[1].index, "01");
        assert_eq!(doc.revisions[1].status, ApprovalStatus::Pending);
        assert!(doc.revisions[1].transmittal_ref.is_empty());
        assert!(doc.revisions[1].transmittal_files.is_empty());
        assert!(doc.revisions[1].observation_files.is_empty());
        assert_eq!(doc.current_revision_index, Some(1));
    }

    #[test]
    fn test_non_rejected_updates_in_place() {
        let mut doc = pending_doc();
        let rev_id = doc.revisions[0].id;

        for status in [
            ApprovalStatus::Approved,
            ApprovalStatus::ApprovedWithComments,
            ApprovalStatus::Pending,
            ApprovalStatus::NoResponse,
        ] {
            let sub = submission(&doc, status);
            let outcome = apply_review(&mut doc, rev_id, &sub).unwrap();
            assert_eq!(outcome, ReviewOutcome::Updated);
            assert_eq!(doc.revisions.len(), 1);
            assert_eq!(doc.revisions[0].status, status);
            assert_eq!(doc.current_revision_index, Some(0));
        }
    }

    #[test]
    fn test_approval_truncates_stale_fork() {
        let mut doc = pending_doc();
        let first_id = doc.revisions[0].id;

        // Reject once: two revisions now exist
        let sub = submission(&doc, ApprovalStatus::Rejected);
        apply_review(&mut doc, first_id, &sub).unwrap();
        assert_eq!(doc.revisions.len(), 2);

        // Reconsider: approve the first revision; the fork is discarded
        let sub = ReviewSubmission::status_only(&doc.revisions[0], ApprovalStatus::Approved);
        let outcome = apply_review(&mut doc, first_id, &sub).unwrap();
        assert_eq!(outcome, ReviewOutcome::Updated);
        assert_eq!(doc.revisions.len(), 1);
        assert_eq!(doc.revisions[0].status, ApprovalStatus::Approved);
        assert_eq!(doc.current_revision_index, Some(0));
    }

    #[test]
    fn test_rejection_keeps_attachments_on_rejected_revision() {
        let mut doc = pending_doc();
        let rev_id = doc.revisions[0].id;
        doc.revisions[0]
            .add_attachment(
                AttachmentKind::Transmittal,
                Attachment::new("be.pdf", "application/pdf", "AAAA"),
            )
            .unwrap();

        let sub = submission(&doc, ApprovalStatus::Rejected);
        apply_review(&mut doc, rev_id, &sub).unwrap();

        assert_eq!(doc.revisions[0].transmittal_files.len(), 1);
        assert!(doc.revisions[1].transmittal_files.is_empty());
    }

    #[test]
    fn test_letter_index_forks_with_carry() {
        let mut doc = pending_doc();
        doc.revisions[0].index = "Z".to_string();
        let rev_id = doc.revisions[0].id;

        let sub = submission(&doc, ApprovalStatus::Rejected);
        apply_review(&mut doc, rev_id, &sub).unwrap();

        assert_eq!(doc.revisions[1].index, "AA");
    }

    #[test]
    fn test_unknown_revision_errors() {
        let mut doc = pending_doc();
        let sub = submission(&doc, ApprovalStatus::Approved);
        let err = apply_review(&mut doc, Uuid::new_v4(), &sub).unwrap_err();
        assert!(matches!(err, LifecycleError::RevisionNotFound(_)));
    }
}
