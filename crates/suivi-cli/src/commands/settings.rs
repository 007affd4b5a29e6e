//! Letterhead, project and stakeholder settings

use anyhow::{anyhow, Result};
use suivi_core::{Settings, Store};

use crate::output::Output;
use crate::SettingsAction;

pub fn execute(action: SettingsAction, output: &Output) -> Result<()> {
    let mut store = Store::open()?;

    match action {
        SettingsAction::Show => {
            let settings = store.settings();
            if output.is_json() {
                println!("{}", serde_json::to_string_pretty(&settings)?);
            } else {
                println!("Entreprise:");
                println!("  company_name:      {}", settings.company_name);
                println!("  company_subtitle:  {}", settings.company_subtitle);
                println!("  address:           {}", settings.address);
                println!("  contact:           {}", settings.contact);
                println!("Projet:");
                println!("  project_code:      {}", settings.project_code);
                println!("  project_name:      {}", settings.project_name);
                println!("  default_validator: {}", settings.default_validator);
                println!("  slip_prefix:       {}", settings.slip_prefix);
                println!("Intervenants:");
                for (key, s) in [
                    ("client", &settings.stakeholders.client),
                    ("consultant", &settings.stakeholders.consultant),
                    ("control", &settings.stakeholders.control),
                ] {
                    println!("  {}: {} ({})", key, s.name, s.contacts.join(", "));
                }
            }
        }
        SettingsAction::Set { key, value } => {
            let mut settings = store.settings();
            apply(&mut settings, &key, &value)?;
            store.update_settings(settings)?;
            output.success(&format!("Set {} = {}", key, value));
        }
    }
    Ok(())
}

/// Apply one `key = value` edit to a settings snapshot
///
/// Stakeholder contacts take a comma-separated list; everything else is a
/// plain string.
fn apply(settings: &mut Settings, key: &str, value: &str) -> Result<()> {
    match key {
        "company_name" => settings.company_name = value.to_string(),
        "company_subtitle" => settings.company_subtitle = value.to_string(),
        "project_code" => settings.project_code = value.to_string(),
        "project_name" => settings.project_name = value.to_string(),
        "address" => settings.address = value.to_string(),
        "contact" => settings.contact = value.to_string(),
        "default_validator" => settings.default_validator = value.to_string(),
        "logo" => settings.logo = value.to_string(),
        "slip_prefix" => settings.slip_prefix = value.to_string(),
        "client_name" => settings.stakeholders.client.name = value.to_string(),
        "client_contacts" => settings.stakeholders.client.contacts = split_contacts(value),
        "consultant_name" => settings.stakeholders.consultant.name = value.to_string(),
        "consultant_contacts" => settings.stakeholders.consultant.contacts = split_contacts(value),
        "control_name" => settings.stakeholders.control.name = value.to_string(),
        "control_contacts" => settings.stakeholders.control.contacts = split_contacts(value),
        _ => {
            return Err(anyhow!(
                "Unknown settings key '{}' (see `suivi settings show` for the available keys)",
                key
            ))
        }
    }
    Ok(())
}

fn split_contacts(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_plain_fields() {
        let mut settings = Settings::default();
        apply(&mut settings, "slip_prefix", "BE-HZ").unwrap();
        apply(&mut settings, "project_name", "Tour Nord").unwrap();

        assert_eq!(settings.slip_prefix, "BE-HZ");
        assert_eq!(settings.project_name, "Tour Nord");
    }

    #[test]
    fn test_apply_stakeholder_contacts() {
        let mut settings = Settings::default();
        apply(&mut settings, "control_name", "Socotec").unwrap();
        apply(&mut settings, "control_contacts", "M. Trabelsi, Mme Gharbi").unwrap();

        assert_eq!(settings.stakeholders.control.name, "Socotec");
        assert_eq!(
            settings.stakeholders.control.contacts,
            vec!["M. Trabelsi".to_string(), "Mme Gharbi".to_string()]
        );
    }

    #[test]
    fn test_apply_unknown_key_rejected() {
        let mut settings = Settings::default();
        assert!(apply(&mut settings, "couleur", "bleu").is_err());
    }
}
