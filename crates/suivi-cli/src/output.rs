//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use suivi_core::{Document, FlatRow, SlipEntry, StatusCounts};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Print a document with its full revision history
    pub fn print_document(&self, doc: &Document) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:         {}", doc.id);
                println!("Code:       {}", doc.code);
                println!("Name:       {}", doc.name);
                println!("Lot:        {}", doc.lot);
                println!("Classement: {}", doc.classement);
                println!("Poste:      {}", doc.poste);

                println!();
                println!("── Révisions ({}) ──", doc.revisions.len());
                let current = doc.current_revision_position();
                for (i, rev) in doc.revisions.iter().enumerate() {
                    let marker = if Some(i) == current { "→" } else { " " };
                    let sent = rev
                        .transmittal_date
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| "-".to_string());
                    println!(
                        "{} Ind. {:<4} {:28} envoyé {}  [{}]",
                        marker,
                        rev.index,
                        rev.status.label(),
                        sent,
                        &rev.id.to_string()[..8]
                    );
                    if !rev.transmittal_files.is_empty() || !rev.observation_files.is_empty() {
                        println!(
                            "    pièces: {} transmis, {} observations",
                            rev.transmittal_files.len(),
                            rev.observation_files.len()
                        );
                    }
                    if let Some(reminder) = &rev.reminder {
                        if reminder.active {
                            let next = reminder
                                .next_reminder_date
                                .map(|d| d.to_string())
                                .unwrap_or_else(|| "-".to_string());
                            println!("    relance: tous les {} jours, prochaine {}", reminder.frequency_days, next);
                        }
                    }
                }
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(doc).unwrap());
            }
            OutputFormat::Quiet => {
                println!("{}", doc.id);
            }
        }
    }

    /// Print one line per projected row
    pub fn print_rows(&self, rows: &[FlatRow<'_>]) {
        match self.format {
            OutputFormat::Human => {
                if rows.is_empty() {
                    println!("No documents found.");
                    return;
                }
                for row in rows {
                    println!(
                        "{} | {:18} | Ind. {:3} | {:24} | {}",
                        &row.doc.id.to_string()[..8],
                        truncate(&row.doc.code, 18),
                        row.rev.index,
                        row.rev.status.label(),
                        truncate(&row.doc.name, 40)
                    );
                }
                println!("\n{} document(s)", rows.len());
            }
            OutputFormat::Json => {
                let json_rows: Vec<_> = rows
                    .iter()
                    .map(|row| {
                        serde_json::json!({
                            "id": row.doc.id,
                            "code": row.doc.code,
                            "name": row.doc.name,
                            "lot": row.doc.lot,
                            "poste": row.doc.poste,
                            "index": row.rev.index,
                            "status": row.rev.status,
                            "isLatest": row.is_latest,
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&json_rows).unwrap());
            }
            OutputFormat::Quiet => {
                for row in rows {
                    println!("{}", row.doc.id);
                }
            }
        }
    }

    /// Print the archived slip history
    pub fn print_history(&self, entries: &[SlipEntry]) {
        match self.format {
            OutputFormat::Human => {
                if entries.is_empty() {
                    println!("No archived slips.");
                    return;
                }
                for entry in entries {
                    println!(
                        "{} | {:12} | {} | {:24} | {} pièce(s)",
                        &entry.id.to_string()[..8],
                        entry.reference,
                        entry.date,
                        truncate(&entry.recipient, 24),
                        entry.document_count
                    );
                }
                println!("\n{} bordereau(x)", entries.len());
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(entries).unwrap());
            }
            OutputFormat::Quiet => {
                for entry in entries {
                    println!("{}", entry.reference);
                }
            }
        }
    }

    /// Print the status dashboard counts
    pub fn print_counts(&self, counts: &StatusCounts, urgent: &[&Document]) {
        match self.format {
            OutputFormat::Human => {
                println!("Suivi des documents:");
                println!("  En cours de révision:   {}", counts.pending);
                println!("  Approuvé:               {}", counts.approved);
                println!("  Approuvé avec réserves: {}", counts.approved_with_comments);
                println!("  Non approuvé:           {}", counts.rejected);
                println!("  Sans réponse:           {}", counts.no_response);
                println!("  Total:                  {}", counts.total);

                if !urgent.is_empty() {
                    println!();
                    println!("À relancer:");
                    for doc in urgent {
                        println!("  {} - {}", doc.code, truncate(&doc.name, 48));
                    }
                }
            }
            OutputFormat::Json => {
                let urgent_codes: Vec<&str> = urgent.iter().map(|d| d.code.as_str()).collect();
                println!(
                    "{}",
                    serde_json::json!({
                        "pending": counts.pending,
                        "approved": counts.approved,
                        "approvedWithComments": counts.approved_with_comments,
                        "rejected": counts.rejected,
                        "noResponse": counts.no_response,
                        "total": counts.total,
                        "urgent": urgent_codes,
                    })
                );
            }
            OutputFormat::Quiet => {
                println!("{}", counts.total);
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

/// Truncate a string to max length, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("court", 10), "court");
        assert_eq!(truncate("une chaîne bien trop longue", 10), "une cha...");
    }
}
