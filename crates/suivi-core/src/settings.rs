//! Application settings and the settings provider
//!
//! Settings hold the company identity block, the project, the stakeholder
//! directory and the slip reference prefix. They are persisted as JSON in
//! the data directory (camelCase keys, same shape as the original
//! `btp-app-settings` blob) and served through [`SettingsProvider`], which
//! lets long-lived consumers observe updates over a watch channel instead
//! of re-reading disk.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// One party in the stakeholder directory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Stakeholder {
    pub name: String,
    /// Contact persons, first one is the default "attention" line
    #[serde(default)]
    pub contacts: Vec<String>,
}

impl Stakeholder {
    pub fn new(name: impl Into<String>, contacts: &[&str]) -> Self {
        Self {
            name: name.into(),
            contacts: contacts.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Stakeholder directory: client, design office, control office
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Stakeholders {
    pub client: Stakeholder,
    pub consultant: Stakeholder,
    pub control: Stakeholder,
}

impl Default for Stakeholders {
    fn default() -> Self {
        Self {
            client: Stakeholder::new("Maître d'Ouvrage", &["M. Le Directeur Technique"]),
            consultant: Stakeholder::new("Bureau d'Études Structure", &["M. L'Ingénieur Conseil"]),
            control: Stakeholder::new("Bureau de Contrôle", &["M. Le Contrôleur Technique"]),
        }
    }
}

impl Stakeholders {
    /// Contacts of the stakeholder named `name`, empty when unknown
    pub fn contacts_for(&self, name: &str) -> &[String] {
        [&self.client, &self.consultant, &self.control]
            .into_iter()
            .find(|s| s.name == name)
            .map(|s| s.contacts.as_slice())
            .unwrap_or(&[])
    }
}

/// Persisted application settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "defaults::company_name")]
    pub company_name: String,
    #[serde(default = "defaults::company_subtitle")]
    pub company_subtitle: String,
    #[serde(default = "defaults::project_code")]
    pub project_code: String,
    #[serde(default = "defaults::project_name")]
    pub project_name: String,
    #[serde(default = "defaults::address")]
    pub address: String,
    #[serde(default = "defaults::contact")]
    pub contact: String,
    /// Default reviewing party for new submissions
    #[serde(default = "defaults::default_validator")]
    pub default_validator: String,
    /// Path to the letterhead logo, empty when unset
    #[serde(default)]
    pub logo: String,
    #[serde(default)]
    pub stakeholders: Stakeholders,
    /// Prefix of allocated slip references, e.g. "BE-PNS"
    #[serde(default = "defaults::slip_prefix")]
    pub slip_prefix: String,
}

mod defaults {
    pub fn company_name() -> String {
        "Société Bouzguenda Frères".to_string()
    }
    pub fn company_subtitle() -> String {
        "Entreprise Générale de Bâtiments".to_string()
    }
    pub fn project_code() -> String {
        "PRJ-2024-HZ".to_string()
    }
    pub fn project_name() -> String {
        "Construction Siège Horizon".to_string()
    }
    pub fn address() -> String {
        "41 Rue 8600 ZI La Charguia 1. Tunis".to_string()
    }
    pub fn contact() -> String {
        "Tél. : 70 557 900 - Fax : 70 557 999".to_string()
    }
    pub fn default_validator() -> String {
        "Bureau de Contrôle".to_string()
    }
    pub fn slip_prefix() -> String {
        "BE-PNS".to_string()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            company_name: defaults::company_name(),
            company_subtitle: defaults::company_subtitle(),
            project_code: defaults::project_code(),
            project_name: defaults::project_name(),
            address: defaults::address(),
            contact: defaults::contact(),
            default_validator: defaults::default_validator(),
            logo: String::new(),
            stakeholders: Stakeholders::default(),
            slip_prefix: defaults::slip_prefix(),
        }
    }
}

/// Serves the current settings and notifies subscribers on update
#[derive(Debug)]
pub struct SettingsProvider {
    tx: watch::Sender<Settings>,
}

impl SettingsProvider {
    pub fn new(initial: Settings) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Current settings snapshot
    pub fn current(&self) -> Settings {
        self.tx.borrow().clone()
    }

    /// Replace the settings and wake subscribers
    pub fn update(&self, settings: Settings) {
        // send_replace never fails, the sender keeps its own receiver alive
        self.tx.send_replace(settings);
    }

    /// Subscribe to settings changes
    pub fn subscribe(&self) -> watch::Receiver<Settings> {
        self.tx.subscribe()
    }
}

impl Default for SettingsProvider {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        // A partial blob from an older install still deserializes
        let settings: Settings = serde_json::from_str(r#"{"projectName":"Tour Nord"}"#).unwrap();
        assert_eq!(settings.project_name, "Tour Nord");
        assert_eq!(settings.slip_prefix, "BE-PNS");
        assert_eq!(settings.stakeholders.control.name, "Bureau de Contrôle");
    }

    #[test]
    fn test_camel_case_wire_shape() {
        let json = serde_json::to_string(&Settings::default()).unwrap();
        assert!(json.contains("\"companyName\""));
        assert!(json.contains("\"defaultValidator\""));
        assert!(!json.contains("company_name"));
    }

    #[test]
    fn test_contacts_for_unknown_stakeholder_is_empty() {
        let directory = Stakeholders::default();
        assert!(directory.contacts_for("Inconnu").is_empty());
        assert_eq!(
            directory.contacts_for("Maître d'Ouvrage"),
            ["M. Le Directeur Technique"]
        );
    }

    #[tokio::test]
    async fn test_provider_notifies_subscribers() {
        let provider = SettingsProvider::default();
        let mut rx = provider.subscribe();

        let mut updated = provider.current();
        updated.project_name = "Extension Aile Est".to_string();
        provider.update(updated);

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().project_name, "Extension Aile Est");
        assert_eq!(provider.current().project_name, "Extension Aile Est");
    }
}
