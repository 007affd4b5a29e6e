//! Data models for suivi
//!
//! Defines the core data structures: Document, Revision, Attachment,
//! and the approval status exchanged with external reviewers.
//! Field names serialize in camelCase so snapshots and the remote
//! spreadsheet mirror stay wire-compatible with existing data.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Maximum number of attachments per revision per category
pub const MAX_ATTACHMENTS: usize = 3;

/// Reviewer response status for a submitted revision
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    /// Sent for review, awaiting the reviewer's visa
    Pending,
    /// Approved without remarks
    Approved,
    /// Approved with remarks that do not require resubmission
    ApprovedWithComments,
    /// Not approved; a new revision round is required
    Rejected,
    /// The reviewer never responded
    NoResponse,
}

impl ApprovalStatus {
    /// All statuses, in display order
    pub const ALL: [ApprovalStatus; 5] = [
        ApprovalStatus::Pending,
        ApprovalStatus::Approved,
        ApprovalStatus::ApprovedWithComments,
        ApprovalStatus::Rejected,
        ApprovalStatus::NoResponse,
    ];

    /// Machine-readable identifier (also the serialized form)
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "PENDING",
            ApprovalStatus::Approved => "APPROVED",
            ApprovalStatus::ApprovedWithComments => "APPROVED_WITH_COMMENTS",
            ApprovalStatus::Rejected => "REJECTED",
            ApprovalStatus::NoResponse => "NO_RESPONSE",
        }
    }

    /// French display label used on printed artifacts
    pub fn label(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "En cours de révision",
            ApprovalStatus::Approved => "Approuvé",
            ApprovalStatus::ApprovedWithComments => "Approuvé avec réserves",
            ApprovalStatus::Rejected => "Non Approuvé",
            ApprovalStatus::NoResponse => "Sans Réponse",
        }
    }

    /// Parse from the serialized identifier (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Some(ApprovalStatus::Pending),
            "APPROVED" => Some(ApprovalStatus::Approved),
            "APPROVED_WITH_COMMENTS" => Some(ApprovalStatus::ApprovedWithComments),
            "REJECTED" => Some(ApprovalStatus::Rejected),
            "NO_RESPONSE" => Some(ApprovalStatus::NoResponse),
            _ => None,
        }
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Follow-up reminder configuration for a pending revision
///
/// Purely declarative: the next reminder date is computed once when the
/// reminder is saved. There is no background scheduler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReminderConfig {
    /// Whether the reminder is active
    pub active: bool,
    /// Follow-up frequency in days
    pub frequency_days: u32,
    /// Next planned follow-up date (absent when inactive)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_reminder_date: Option<NaiveDate>,
}

impl ReminderConfig {
    /// Build a reminder anchored at `today`
    pub fn new(active: bool, frequency_days: u32, today: NaiveDate) -> Self {
        let next_reminder_date =
            active.then(|| today + chrono::Duration::days(i64::from(frequency_days)));
        Self {
            active,
            frequency_days,
            next_reminder_date,
        }
    }
}

/// A stored attachment blob (transmittal slip scan or annotated visa note)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// Original file name
    pub name: String,
    /// MIME type, e.g. "application/pdf"
    pub mime: String,
    /// Base64-encoded file content
    pub data: String,
}

impl Attachment {
    pub fn new(
        name: impl Into<String>,
        mime: impl Into<String>,
        data: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            data: data.into(),
        }
    }

    /// Render as a `data:` URL, the shape legacy snapshots stored
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, self.data)
    }

    /// Parse a legacy `data:<mime>;base64,<payload>` URL
    pub fn from_data_url(url: &str) -> Option<Self> {
        let rest = url.strip_prefix("data:")?;
        let (mime, data) = rest.split_once(";base64,")?;
        Some(Self::new("attachment", mime, data))
    }
}

/// Which attachment list a file belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    /// Outbound transmittal slip copies
    Transmittal,
    /// Inbound annotated visa/observation notes
    Observation,
}

/// Error raised by revision mutations
#[derive(Error, Debug)]
pub enum RevisionError {
    /// Attachment list already holds the maximum number of files
    #[error("attachment limit reached: at most {MAX_ATTACHMENTS} files per category")]
    AttachmentLimit,
}

/// One revision round (indice) of a document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Revision {
    /// Unique identifier, scoped to the parent document
    pub id: Uuid,
    /// Human-facing revision label, e.g. "00", "01", "A"
    pub index: String,
    /// Outbound transmittal reference, e.g. "B-001"
    #[serde(default)]
    pub transmittal_ref: String,
    /// Date the revision was sent for review
    #[serde(default)]
    pub transmittal_date: Option<NaiveDate>,
    /// Transmittal slip attachments, at most [`MAX_ATTACHMENTS`]
    #[serde(default)]
    pub transmittal_files: Vec<Attachment>,
    /// Inbound reviewer response reference, e.g. "VISA-001"
    #[serde(default)]
    pub observation_ref: Option<String>,
    /// Date of the reviewer's response
    #[serde(default)]
    pub observation_date: Option<NaiveDate>,
    /// Annotated visa attachments, at most [`MAX_ATTACHMENTS`]
    #[serde(default)]
    pub observation_files: Vec<Attachment>,
    /// Formal approval date
    #[serde(default)]
    pub approval_date: Option<NaiveDate>,
    /// Date the reviewed documents were returned
    #[serde(default)]
    pub return_date: Option<NaiveDate>,
    /// Reviewer response status
    pub status: ApprovalStatus,
    /// Free-text remarks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    /// Follow-up reminder, if configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder: Option<ReminderConfig>,
}

impl Revision {
    /// Create a revision with the given label and status, everything else empty
    pub fn new(index: impl Into<String>, status: ApprovalStatus) -> Self {
        Self {
            id: Uuid::new_v4(),
            index: index.into(),
            transmittal_ref: String::new(),
            transmittal_date: None,
            transmittal_files: Vec::new(),
            observation_ref: None,
            observation_date: None,
            observation_files: Vec::new(),
            approval_date: None,
            return_date: None,
            status,
            comments: None,
            reminder: None,
        }
    }

    /// Append an attachment, rejecting the whole add when the cap is reached
    pub fn add_attachment(
        &mut self,
        kind: AttachmentKind,
        attachment: Attachment,
    ) -> Result<(), RevisionError> {
        let files = match kind {
            AttachmentKind::Transmittal => &mut self.transmittal_files,
            AttachmentKind::Observation => &mut self.observation_files,
        };
        if files.len() >= MAX_ATTACHMENTS {
            return Err(RevisionError::AttachmentLimit);
        }
        files.push(attachment);
        Ok(())
    }

    /// Remove the attachment at `position`, if present
    pub fn remove_attachment(&mut self, kind: AttachmentKind, position: usize) -> bool {
        let files = match kind {
            AttachmentKind::Transmittal => &mut self.transmittal_files,
            AttachmentKind::Observation => &mut self.observation_files,
        };
        if position < files.len() {
            files.remove(position);
            true
        } else {
            false
        }
    }
}

/// A tracked construction document with its full revision history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Unique identifier
    pub id: Uuid,
    /// Work-package grouping code, e.g. "01"
    pub lot: String,
    /// Single-letter document class (A plans, B notes, C tech, D admin)
    pub classement: String,
    /// Discipline code, e.g. "GC", "ELEC"
    pub poste: String,
    /// Human-readable document code, e.g. "GC-FND-Z1-001"
    pub code: String,
    /// Document title
    pub name: String,
    /// Ordered revision history, oldest first
    pub revisions: Vec<Revision>,
    /// Pointer to the active revision; out-of-range values fall back
    /// to the last element (see [`Document::current_revision`])
    #[serde(default)]
    pub current_revision_index: Option<usize>,
}

impl Document {
    /// Create a document with a single initial revision
    pub fn new(
        lot: impl Into<String>,
        classement: impl Into<String>,
        poste: impl Into<String>,
        code: impl Into<String>,
        name: impl Into<String>,
        initial: Revision,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            lot: lot.into(),
            classement: classement.into(),
            poste: poste.into(),
            code: code.into(),
            name: name.into(),
            revisions: vec![initial],
            current_revision_index: Some(0),
        }
    }

    /// Position of the active revision
    ///
    /// The single place where the pointer fallback lives: an absent or
    /// out-of-range `current_revision_index` resolves to the last element.
    /// Returns `None` only for a document with no revisions at all, which
    /// list views filter out.
    pub fn current_revision_position(&self) -> Option<usize> {
        if self.revisions.is_empty() {
            return None;
        }
        match self.current_revision_index {
            Some(i) if i < self.revisions.len() => Some(i),
            _ => Some(self.revisions.len() - 1),
        }
    }

    /// The active revision, resolved with the pointer fallback
    pub fn current_revision(&self) -> Option<&Revision> {
        self.current_revision_position().map(|i| &self.revisions[i])
    }

    /// Mutable access to the active revision
    pub fn current_revision_mut(&mut self) -> Option<&mut Revision> {
        self.current_revision_position()
            .map(move |i| &mut self.revisions[i])
    }

    /// Find a revision by its id
    pub fn revision(&self, revision_id: Uuid) -> Option<&Revision> {
        self.revisions.iter().find(|r| r.id == revision_id)
    }

    /// Status of the active revision
    pub fn current_status(&self) -> Option<ApprovalStatus> {
        self.current_revision().map(|r| r.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_revisions(n: usize) -> Document {
        let mut doc = Document::new(
            "01",
            "A",
            "GC",
            "GC-PL-001",
            "Plan de ferraillage",
            Revision::new("00", ApprovalStatus::Pending),
        );
        for i in 1..n {
            doc.revisions
                .push(Revision::new(format!("{:02}", i), ApprovalStatus::Pending));
        }
        doc
    }

    #[test]
    fn test_status_roundtrip() {
        for status in ApprovalStatus::ALL {
            assert_eq!(ApprovalStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ApprovalStatus::parse("nonsense"), None);
    }

    #[test]
    fn test_status_serializes_screaming_snake() {
        let json = serde_json::to_string(&ApprovalStatus::ApprovedWithComments).unwrap();
        assert_eq!(json, "\"APPROVED_WITH_COMMENTS\"");
    }

    #[test]
    fn test_current_revision_fallback_out_of_range() {
        let mut doc = doc_with_revisions(3);
        doc.current_revision_index = Some(99);
        assert_eq!(doc.current_revision_position(), Some(2));

        doc.current_revision_index = None;
        assert_eq!(doc.current_revision_position(), Some(2));

        doc.current_revision_index = Some(1);
        assert_eq!(doc.current_revision_position(), Some(1));
    }

    #[test]
    fn test_current_revision_empty_document() {
        let mut doc = doc_with_revisions(1);
        doc.revisions.clear();
        assert!(doc.current_revision_position().is_none());
        assert!(doc.current_revision().is_none());
    }

    #[test]
    fn test_attachment_cap() {
        let mut rev = Revision::new("00", ApprovalStatus::Pending);
        for i in 0..MAX_ATTACHMENTS {
            rev.add_attachment(
                AttachmentKind::Transmittal,
                Attachment::new(format!("f{}.pdf", i), "application/pdf", "AAAA"),
            )
            .unwrap();
        }
        let err = rev
            .add_attachment(
                AttachmentKind::Transmittal,
                Attachment::new("overflow.pdf", "application/pdf", "AAAA"),
            )
            .unwrap_err();
        assert!(matches!(err, RevisionError::AttachmentLimit));
        // Nothing partial was added
        assert_eq!(rev.transmittal_files.len(), MAX_ATTACHMENTS);
        // The observation list is independent
        rev.add_attachment(
            AttachmentKind::Observation,
            Attachment::new("visa.pdf", "application/pdf", "AAAA"),
        )
        .unwrap();
    }

    #[test]
    fn test_remove_attachment() {
        let mut rev = Revision::new("00", ApprovalStatus::Pending);
        rev.add_attachment(
            AttachmentKind::Observation,
            Attachment::new("visa.pdf", "application/pdf", "AAAA"),
        )
        .unwrap();
        assert!(!rev.remove_attachment(AttachmentKind::Observation, 5));
        assert!(rev.remove_attachment(AttachmentKind::Observation, 0));
        assert!(rev.observation_files.is_empty());
    }

    #[test]
    fn test_data_url_roundtrip() {
        let att = Attachment::new("be.pdf", "application/pdf", "SGVsbG8=");
        let url = att.to_data_url();
        assert_eq!(url, "data:application/pdf;base64,SGVsbG8=");
        let parsed = Attachment::from_data_url(&url).unwrap();
        assert_eq!(parsed.mime, "application/pdf");
        assert_eq!(parsed.data, "SGVsbG8=");
        assert!(Attachment::from_data_url("not-a-data-url").is_none());
    }

    #[test]
    fn test_reminder_next_date() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let reminder = ReminderConfig::new(true, 7, today);
        assert_eq!(
            reminder.next_reminder_date,
            Some(NaiveDate::from_ymd_opt(2024, 3, 8).unwrap())
        );
        let inactive = ReminderConfig::new(false, 7, today);
        assert!(inactive.next_reminder_date.is_none());
    }

    #[test]
    fn test_document_serialization_camel_case() {
        let doc = doc_with_revisions(1);
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains("\"currentRevisionIndex\""));
        assert!(json.contains("\"transmittalFiles\""));
        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(doc, back);
    }
}
