//! Bordereau d'envoi: header form, archived slips, reference allocation
//!
//! A finalized slip is archived as an immutable [`SlipEntry`]: the header
//! form, the included documents' display metadata, and the copies and
//! observations maps, all captured at finalize time. Later edits to the
//! source documents never alter an archived slip, and a slip can be
//! re-rendered identically from its snapshot alone.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Document;
use crate::settings::Settings;

/// Header form of a transmittal slip
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SlipForm {
    /// Slip reference, e.g. "BE-PNS-0001"; defaulted by the allocator,
    /// freely overridable
    pub reference: String,
    /// Sending date printed on the slip
    pub date: NaiveDate,
    /// Project designation
    pub project: String,
    /// Issuing department
    pub from: String,
    /// Recipient organization (stakeholder name)
    pub to: String,
    /// Contact person at the recipient ("à l'attention de")
    pub attention: String,
    /// Subject line
    pub object: String,
    /// Signatory role on the sender side
    pub sender: String,
    /// Signatory role on the recipient side
    pub recipient: String,
    pub company_name: String,
    pub company_subtitle: String,
    pub address: String,
    pub contact: String,
}

impl SlipForm {
    /// Header defaults resolved from settings, dated `today`
    ///
    /// The recipient defaults to the control-office stakeholder; the
    /// reference is left to the allocator.
    pub fn from_settings(settings: &Settings, today: NaiveDate) -> Self {
        Self {
            reference: String::new(),
            date: today,
            project: settings.project_name.clone(),
            from: "Bureau d'Études".to_string(),
            to: settings.stakeholders.control.name.clone(),
            attention: String::new(),
            object: "Soumission des plans pour exécution".to_string(),
            sender: "Chef de Projet".to_string(),
            recipient: "Client".to_string(),
            company_name: settings.company_name.clone(),
            company_subtitle: settings.company_subtitle.clone(),
            address: settings.address.clone(),
            contact: settings.contact.clone(),
        }
    }
}

/// Display metadata of one document line, captured at finalize time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SlipDocument {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    /// Revision label of the resolved current revision
    pub index: String,
    pub lot: String,
    pub poste: String,
    pub classement: String,
}

impl SlipDocument {
    /// Snapshot a document through its resolved current revision
    pub fn capture(doc: &Document) -> Self {
        let index = doc
            .current_revision()
            .map(|r| r.index.clone())
            .unwrap_or_else(|| "00".to_string());
        Self {
            id: doc.id,
            code: doc.code.clone(),
            name: doc.name.clone(),
            index,
            lot: doc.lot.clone(),
            poste: doc.poste.clone(),
            classement: doc.classement.clone(),
        }
    }
}

/// An archived transmittal slip
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SlipEntry {
    pub id: Uuid,
    pub reference: String,
    pub date: NaiveDate,
    pub recipient: String,
    pub project: String,
    pub document_count: usize,
    pub documents: Vec<SlipDocument>,
    pub observations: HashMap<Uuid, String>,
    pub copies: HashMap<Uuid, u32>,
    /// Full header form at finalize time
    pub form: SlipForm,
    /// Creation instant; history is ordered newest first
    pub timestamp: DateTime<Utc>,
}

impl SlipEntry {
    /// Build an entry from the header form and the selected documents
    pub fn build(
        form: &SlipForm,
        documents: &[&Document],
        copies: HashMap<Uuid, u32>,
        observations: HashMap<Uuid, String>,
    ) -> Self {
        let captured: Vec<SlipDocument> = documents.iter().map(|d| SlipDocument::capture(d)).collect();
        Self {
            id: Uuid::new_v4(),
            reference: form.reference.clone(),
            date: form.date,
            recipient: if form.to.is_empty() {
                "Non spécifié".to_string()
            } else {
                form.to.clone()
            },
            project: form.project.clone(),
            document_count: captured.len(),
            documents: captured,
            observations,
            copies,
            form: form.clone(),
            timestamp: Utc::now(),
        }
    }

    /// Total physical copies across all lines
    pub fn total_copies(&self) -> u32 {
        self.documents
            .iter()
            .map(|d| self.copies.get(&d.id).copied().unwrap_or(1))
            .sum()
    }

    /// History-panel search: substring over reference, recipient, date,
    /// and the included documents' code and name
    pub fn matches(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        let q = query.to_lowercase();
        self.reference.to_lowercase().contains(&q)
            || self.recipient.to_lowercase().contains(&q)
            || self.date.to_string().contains(&q)
            || self
                .documents
                .iter()
                .any(|d| d.name.to_lowercase().contains(&q) || d.code.to_lowercase().contains(&q))
    }
}

/// Compute the next default slip reference
///
/// Scans history for references of the form `{prefix}-NNNN` (exactly four
/// digits) and returns `{prefix}-{max+1}`, zero-padded to four digits.
/// Malformed or foreign-format references are ignored; with no matches the
/// sequence starts at 1. Only a default: the user may override the value
/// freely and overrides are accepted verbatim.
pub fn next_reference(history: &[SlipEntry], prefix: &str) -> String {
    let max = history
        .iter()
        .filter_map(|entry| parse_sequence(&entry.reference, prefix))
        .max()
        .unwrap_or(0);
    format!("{}-{:04}", prefix, max + 1)
}

/// Parse the NNNN sequence out of `{prefix}-NNNN`; `None` when the
/// reference does not match the pattern exactly
fn parse_sequence(reference: &str, prefix: &str) -> Option<u32> {
    let rest = reference.strip_prefix(prefix)?.strip_prefix('-')?;
    if rest.len() != 4 || !rest.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    rest.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ApprovalStatus, Revision};

    fn entry_with_ref(reference: &str) -> SlipEntry {
        SlipEntry {
            id: Uuid::new_v4(),
            reference: reference.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            recipient: "Bureau de Contrôle".to_string(),
            project: "Construction Siège Horizon".to_string(),
            document_count: 0,
            documents: Vec::new(),
            observations: HashMap::new(),
            copies: HashMap::new(),
            form: SlipForm::from_settings(
                &Settings::default(),
                NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            ),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_next_reference_skips_malformed() {
        let history = vec![
            entry_with_ref("BE-PNS-0001"),
            entry_with_ref("BE-PNS-0003"),
            entry_with_ref("BE-XYZ-01"),
        ];
        assert_eq!(next_reference(&history, "BE-PNS"), "BE-PNS-0004");
    }

    #[test]
    fn test_next_reference_empty_history_starts_at_one() {
        assert_eq!(next_reference(&[], "BE-PNS"), "BE-PNS-0001");
    }

    #[test]
    fn test_next_reference_requires_exact_four_digits() {
        let history = vec![
            entry_with_ref("BE-PNS-12"),
            entry_with_ref("BE-PNS-00123"),
            entry_with_ref("BE-PNS-00AB"),
        ];
        assert_eq!(next_reference(&history, "BE-PNS"), "BE-PNS-0001");
    }

    #[test]
    fn test_capture_uses_current_revision_label() {
        let mut doc = Document::new(
            "01",
            "A",
            "GC",
            "GC-001",
            "Plan",
            Revision::new("00", ApprovalStatus::Rejected),
        );
        doc.revisions.push(Revision::new("01", ApprovalStatus::Pending));
        doc.current_revision_index = Some(1);

        let snap = SlipDocument::capture(&doc);
        assert_eq!(snap.index, "01");
        assert_eq!(snap.code, "GC-001");
    }

    #[test]
    fn test_snapshot_is_detached_from_source() {
        let mut doc = Document::new(
            "01",
            "A",
            "GC",
            "GC-001",
            "Plan",
            Revision::new("00", ApprovalStatus::Pending),
        );
        let form = SlipForm::from_settings(
            &Settings::default(),
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
        );
        let entry = SlipEntry::build(&form, &[&doc], HashMap::new(), HashMap::new());

        doc.name = "Renamed after archive".to_string();
        assert_eq!(entry.documents[0].name, "Plan");
    }

    #[test]
    fn test_total_copies_defaults_missing_to_one() {
        let doc_a = Document::new(
            "01",
            "A",
            "GC",
            "GC-001",
            "Plan",
            Revision::new("00", ApprovalStatus::Pending),
        );
        let doc_b = Document::new(
            "01",
            "A",
            "GC",
            "GC-002",
            "Coupe",
            Revision::new("00", ApprovalStatus::Pending),
        );
        let mut copies = HashMap::new();
        copies.insert(doc_a.id, 3);

        let form = SlipForm::from_settings(
            &Settings::default(),
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
        );
        let entry = SlipEntry::build(&form, &[&doc_a, &doc_b], copies, HashMap::new());
        assert_eq!(entry.total_copies(), 4);
    }

    #[test]
    fn test_history_search_matches_nested_documents() {
        let doc = Document::new(
            "01",
            "A",
            "GC",
            "GC-FND-Z1-001",
            "Plan de fondation",
            Revision::new("00", ApprovalStatus::Pending),
        );
        let form = SlipForm::from_settings(
            &Settings::default(),
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
        );
        let mut entry = SlipEntry::build(&form, &[&doc], HashMap::new(), HashMap::new());
        entry.reference = "BE-PNS-0007".to_string();

        assert!(entry.matches("fnd-z1"));
        assert!(entry.matches("0007"));
        assert!(entry.matches("fondation"));
        assert!(entry.matches(""));
        assert!(!entry.matches("elec"));
    }
}
