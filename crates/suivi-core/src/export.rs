//! Artifact data shaping
//!
//! Turns the row projection and archived slips into the flat cell layouts
//! the export artifacts print: the tracking table (one line per visible
//! revision) and the A4 transmittal slip (line table padded to a fixed
//! height, with a total row). Rendering to an actual file format happens
//! behind [`SlipRenderer`]; this module only decides what goes in which
//! cell.

use anyhow::Result;
use chrono::NaiveDate;

use crate::bordereau::SlipEntry;
use crate::rows::FlatRow;

/// Rendering seam for finalized slips
///
/// Implementations write the artifact (CSV, printer, test double); the
/// entry snapshot alone carries everything needed to render.
pub trait SlipRenderer {
    fn render(&self, entry: &SlipEntry) -> Result<()>;
}

/// Column headers of the tracking table
pub const TRACKING_HEADERS: [&str; 14] = [
    "N°",
    "Lot",
    "Poste",
    "Type",
    "Code",
    "Indice",
    "Désignation Document",
    "Date Envoi",
    "Réf Envoi",
    "Date Rép.",
    "Réf Rép.",
    "Statut",
    "Date d'envoi pour visa",
    "Date de retour",
];

/// One printed line of the tracking table, all cells as text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingRow {
    pub cells: [String; 14],
}

fn fmt_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_default()
}

/// Shape the row projection into tracking-table lines, numbered from 1
pub fn tracking_rows(rows: &[FlatRow<'_>]) -> Vec<TrackingRow> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| TrackingRow {
            cells: [
                (i + 1).to_string(),
                row.doc.lot.clone(),
                row.doc.poste.clone(),
                row.doc.classement.clone(),
                row.doc.code.clone(),
                row.rev.index.clone(),
                row.doc.name.clone(),
                fmt_date(row.rev.transmittal_date),
                row.rev.transmittal_ref.clone(),
                fmt_date(row.rev.observation_date),
                row.rev.observation_ref.clone().unwrap_or_default(),
                row.rev.status.label().to_string(),
                fmt_date(row.rev.approval_date),
                fmt_date(row.rev.return_date),
            ],
        })
        .collect()
}

/// Line count the slip table is padded to, for a stable A4 footprint
pub const SLIP_TARGET_ROWS: usize = 13;

/// One line of the slip table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlipLine {
    /// "1"-based position, empty on filler lines
    pub numero: String,
    /// "CODE - Name (Ind. XX)", empty on filler lines
    pub designation: String,
    pub copies: String,
    pub observation: String,
}

impl SlipLine {
    fn filler() -> Self {
        Self {
            numero: String::new(),
            designation: String::new(),
            copies: String::new(),
            observation: String::new(),
        }
    }

    pub fn is_filler(&self) -> bool {
        self.numero.is_empty()
    }
}

/// The slip table: document lines, filler padding, total
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlipLayout {
    pub lines: Vec<SlipLine>,
    pub total_copies: u32,
}

/// Shape an archived slip into its printed table
///
/// Always at least [`SLIP_TARGET_ROWS`] lines; a slip with more documents
/// grows past the target instead of truncating.
pub fn slip_layout(entry: &SlipEntry) -> SlipLayout {
    let mut lines: Vec<SlipLine> = entry
        .documents
        .iter()
        .enumerate()
        .map(|(i, doc)| SlipLine {
            numero: (i + 1).to_string(),
            designation: format!("{} - {} (Ind. {})", doc.code, doc.name, doc.index),
            copies: entry
                .copies
                .get(&doc.id)
                .copied()
                .unwrap_or(1)
                .to_string(),
            observation: entry.observations.get(&doc.id).cloned().unwrap_or_default(),
        })
        .collect();

    while lines.len() < SLIP_TARGET_ROWS {
        lines.push(SlipLine::filler());
    }

    SlipLayout {
        lines,
        total_copies: entry.total_copies(),
    }
}
