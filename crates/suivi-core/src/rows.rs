//! Row projection, filtering, and sorting
//!
//! The tracking table shows the full revision history, so documents are
//! flattened into one row per (document, revision) pair. Bordereau
//! selection and the dashboard operate on the "current view" instead: one
//! row per document through the resolved current revision. Both views go
//! through [`Document::current_revision`] for the pointer fallback.

use serde::{Deserialize, Serialize};

use crate::models::{ApprovalStatus, Document, Revision};

/// One flattened (document, revision) row
#[derive(Debug, Clone)]
pub struct FlatRow<'a> {
    pub doc: &'a Document,
    pub rev: &'a Revision,
    /// Whether this revision is the last element of its document's history
    pub is_latest: bool,
}

/// Flatten the collection into history-view rows
///
/// Documents with no revisions are skipped entirely.
pub fn flatten(documents: &[Document]) -> Vec<FlatRow<'_>> {
    let mut rows = Vec::new();
    for doc in documents {
        let last = doc.revisions.len().saturating_sub(1);
        for (i, rev) in doc.revisions.iter().enumerate() {
            rows.push(FlatRow {
                doc,
                rev,
                is_latest: i == last,
            });
        }
    }
    rows
}

/// One current-view row per document, via the resolved current revision
pub fn current_view(documents: &[Document]) -> Vec<FlatRow<'_>> {
    documents
        .iter()
        .filter_map(|doc| {
            let pos = doc.current_revision_position()?;
            Some(FlatRow {
                doc,
                rev: &doc.revisions[pos],
                is_latest: pos == doc.revisions.len() - 1,
            })
        })
        .collect()
}

/// Status filter: a concrete status, or everything
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(ApprovalStatus),
}

impl StatusFilter {
    pub fn matches(&self, status: ApprovalStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(s) => *s == status,
        }
    }
}

/// Combined status + free-text filter for the tracking table
///
/// A row passes when both the status predicate and the text predicate
/// hold; the text predicate is a case-insensitive substring match over
/// code, name, lot, and poste.
#[derive(Debug, Clone, Default)]
pub struct RowFilter {
    pub status: StatusFilter,
    pub query: String,
}

impl RowFilter {
    pub fn new(status: StatusFilter, query: impl Into<String>) -> Self {
        Self {
            status,
            query: query.into(),
        }
    }

    pub fn matches_row(&self, row: &FlatRow<'_>) -> bool {
        self.status.matches(row.rev.status) && self.matches_text(row.doc)
    }

    /// Current-view document match (used by the bordereau builder, which
    /// searches code and name only, like the original selection panel)
    pub fn matches_document(&self, doc: &Document) -> bool {
        let Some(rev) = doc.current_revision() else {
            return false;
        };
        if !self.status.matches(rev.status) {
            return false;
        }
        if self.query.is_empty() {
            return true;
        }
        let q = self.query.to_lowercase();
        doc.code.to_lowercase().contains(&q) || doc.name.to_lowercase().contains(&q)
    }

    fn matches_text(&self, doc: &Document) -> bool {
        if self.query.is_empty() {
            return true;
        }
        let q = self.query.to_lowercase();
        doc.code.to_lowercase().contains(&q)
            || doc.name.to_lowercase().contains(&q)
            || doc.lot.to_lowercase().contains(&q)
            || doc.poste.to_lowercase().contains(&q)
    }
}

/// Sortable columns of the tracking table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    Lot,
    Classement,
    Poste,
    Name,
    Code,
    Index,
    TransmittalDate,
    TransmittalRef,
    ObservationDate,
    ObservationRef,
    Status,
    ApprovalDate,
    ReturnDate,
}

impl SortKey {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "lot" => SortKey::Lot,
            "classement" => SortKey::Classement,
            "poste" => SortKey::Poste,
            "name" => SortKey::Name,
            "code" => SortKey::Code,
            "index" => SortKey::Index,
            "transmittal-date" => SortKey::TransmittalDate,
            "transmittal-ref" => SortKey::TransmittalRef,
            "observation-date" => SortKey::ObservationDate,
            "observation-ref" => SortKey::ObservationRef,
            "status" => SortKey::Status,
            "approval-date" => SortKey::ApprovalDate,
            "return-date" => SortKey::ReturnDate,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Active sort: a key and a direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortConfig {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortConfig {
    /// Sort-header click behavior: same key toggles direction, a new key
    /// resets to ascending
    pub fn request(current: Option<SortConfig>, key: SortKey) -> SortConfig {
        match current {
            Some(cfg) if cfg.key == key && cfg.direction == SortDirection::Asc => SortConfig {
                key,
                direction: SortDirection::Desc,
            },
            _ => SortConfig {
                key,
                direction: SortDirection::Asc,
            },
        }
    }
}

/// Sort rows in place
///
/// With no explicit config: code ascending, ties broken by revision label
/// ascending. Both comparisons are lexicographic on the label strings;
/// "10" sorting before "2" is the historical behavior of the tracking
/// table, kept as-is. With an explicit config: a stable single-key sort,
/// missing optional fields comparing as empty strings.
pub fn sort_rows(rows: &mut [FlatRow<'_>], config: Option<SortConfig>) {
    match config {
        None => {
            rows.sort_by(|a, b| {
                a.doc
                    .code
                    .cmp(&b.doc.code)
                    .then_with(|| a.rev.index.cmp(&b.rev.index))
            });
        }
        Some(cfg) => {
            rows.sort_by(|a, b| {
                let ord = sort_value(a, cfg.key).cmp(&sort_value(b, cfg.key));
                match cfg.direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            });
        }
    }
}

fn sort_value(row: &FlatRow<'_>, key: SortKey) -> String {
    let date = |d: Option<chrono::NaiveDate>| d.map(|d| d.to_string()).unwrap_or_default();
    match key {
        SortKey::Lot => row.doc.lot.clone(),
        SortKey::Classement => row.doc.classement.clone(),
        SortKey::Poste => row.doc.poste.clone(),
        SortKey::Name => row.doc.name.clone(),
        SortKey::Code => row.doc.code.clone(),
        SortKey::Index => row.rev.index.clone(),
        SortKey::TransmittalDate => date(row.rev.transmittal_date),
        SortKey::TransmittalRef => row.rev.transmittal_ref.clone(),
        SortKey::ObservationDate => date(row.rev.observation_date),
        SortKey::ObservationRef => row.rev.observation_ref.clone().unwrap_or_default(),
        SortKey::Status => row.rev.status.as_str().to_string(),
        SortKey::ApprovalDate => date(row.rev.approval_date),
        SortKey::ReturnDate => date(row.rev.return_date),
    }
}

/// Per-status document counts over the current view
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub approved_with_comments: usize,
    pub rejected: usize,
    pub no_response: usize,
}

/// Aggregate current-revision statuses, the dashboard's headline numbers
pub fn status_counts(documents: &[Document]) -> StatusCounts {
    let mut counts = StatusCounts {
        total: documents.len(),
        ..Default::default()
    };
    for doc in documents {
        match doc.current_status() {
            Some(ApprovalStatus::Pending) => counts.pending += 1,
            Some(ApprovalStatus::Approved) => counts.approved += 1,
            Some(ApprovalStatus::ApprovedWithComments) => counts.approved_with_comments += 1,
            Some(ApprovalStatus::Rejected) => counts.rejected += 1,
            Some(ApprovalStatus::NoResponse) => counts.no_response += 1,
            None => {}
        }
    }
    counts
}

/// Documents awaiting action (PENDING or NO_RESPONSE), capped at `limit`
pub fn urgent_documents(documents: &[Document], limit: usize) -> Vec<&Document> {
    documents
        .iter()
        .filter(|d| {
            matches!(
                d.current_status(),
                Some(ApprovalStatus::Pending) | Some(ApprovalStatus::NoResponse)
            )
        })
        .take(limit)
        .collect()
}
