//! CSV rendering of finalized slips
//!
//! Writes an archived bordereau as a CSV file: the letterhead block, the
//! addressing lines, then the slip table padded to its fixed height with
//! the total row at the bottom.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use suivi_core::{slip_layout, SlipEntry, SlipRenderer};

/// Renders slips as `Bordereau_<reference>.csv` in a target directory
pub struct CsvSlipRenderer {
    out_dir: PathBuf,
}

impl CsvSlipRenderer {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    /// The file a given slip renders to
    pub fn output_path(&self, entry: &SlipEntry) -> PathBuf {
        self.out_dir
            .join(format!("Bordereau_{}.csv", entry.reference))
    }

    fn write_to(&self, entry: &SlipEntry, path: &Path) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;

        let form = &entry.form;
        writer.write_record([form.company_name.as_str()])?;
        writer.write_record([form.company_subtitle.as_str()])?;
        writer.write_record([form.address.as_str()])?;
        writer.write_record([form.contact.as_str()])?;
        writer.write_record::<_, &str>([])?;
        writer.write_record(["BORDEREAU D'ENVOI", entry.reference.as_str()])?;
        writer.write_record(["Date", &entry.date.to_string()])?;
        writer.write_record(["Projet", form.project.as_str()])?;
        writer.write_record(["De", form.from.as_str()])?;
        writer.write_record(["À", form.to.as_str()])?;
        writer.write_record(["À l'attention de", form.attention.as_str()])?;
        writer.write_record(["Objet", form.object.as_str()])?;
        writer.write_record::<_, &str>([])?;

        writer.write_record(["N°", "Désignation", "Nbre d'exemplaires", "Observations"])?;
        let layout = slip_layout(entry);
        for line in &layout.lines {
            writer.write_record([
                line.numero.as_str(),
                line.designation.as_str(),
                line.copies.as_str(),
                line.observation.as_str(),
            ])?;
        }
        writer.write_record(["", "Total", &layout.total_copies.to_string(), ""])?;
        writer.write_record::<_, &str>([])?;
        writer.write_record(["Expéditeur", form.sender.as_str()])?;
        writer.write_record(["Destinataire", form.recipient.as_str()])?;

        writer.flush()?;
        Ok(())
    }
}

impl SlipRenderer for CsvSlipRenderer {
    fn render(&self, entry: &SlipEntry) -> Result<()> {
        std::fs::create_dir_all(&self.out_dir)
            .with_context(|| format!("Failed to create {}", self.out_dir.display()))?;
        let path = self.output_path(entry);
        self.write_to(entry, &path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use suivi_core::{ApprovalStatus, Document, Revision, Settings, SlipForm};
    use tempfile::TempDir;

    fn sample_entry() -> SlipEntry {
        let doc = Document::new(
            "01",
            "A",
            "GC",
            "GC-FND-Z1-001",
            "Plan de fondation",
            Revision::new("00", ApprovalStatus::Pending),
        );
        let mut form = SlipForm::from_settings(
            &Settings::default(),
            NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
        );
        form.reference = "BE-PNS-0007".to_string();
        SlipEntry::build(&form, &[&doc], HashMap::new(), HashMap::new())
    }

    #[test]
    fn test_render_writes_named_file() {
        let dir = TempDir::new().unwrap();
        let renderer = CsvSlipRenderer::new(dir.path());
        let entry = sample_entry();

        renderer.render(&entry).unwrap();

        let path = dir.path().join("Bordereau_BE-PNS-0007.csv");
        assert!(path.exists());
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("BORDEREAU D'ENVOI"));
        assert!(content.contains("GC-FND-Z1-001 - Plan de fondation (Ind. 00)"));
        assert!(content.contains("Total"));
    }

    #[test]
    fn test_render_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let renderer = CsvSlipRenderer::new(dir.path().join("sorties"));
        renderer.render(&sample_entry()).unwrap();
        assert!(dir
            .path()
            .join("sorties")
            .join("Bordereau_BE-PNS-0007.csv")
            .exists());
    }
}
