//! Configuration types for notekeep.
//!
//! Follows a builder pattern for complex configuration with validation.
//! Every engine is constructed from a [`KeeperConfig`]; nothing reads
//! process-wide defaults after construction.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Default front matter delimiter line
pub const DEFAULT_DELIMITER: &str = "---";

/// Default sentinel written by redaction
pub const DEFAULT_REDACTION: &str = "REDACTED";

/// Settings for propagating meeting dates to the people who attended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    /// Meeting notes directory, relative to the vault root
    pub meetings_dir: PathBuf,
    /// People notes directory, relative to the vault root
    pub people_dir: PathBuf,
    /// Key holding the meeting date
    pub date_key: String,
    /// Key holding the attendee links
    pub attendees_key: String,
    /// Key written on each person note
    pub contacted_key: String,
    /// JSON ledger of meetings already propagated, relative to the vault root
    pub ledger_path: PathBuf,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            meetings_dir: PathBuf::from("Meetings"),
            people_dir: PathBuf::from("People"),
            date_key: "transpired".to_string(),
            attendees_key: "attendees".to_string(),
            contacted_key: "contacted".to_string(),
            ledger_path: PathBuf::from("Extras/updated.json"),
        }
    }
}

/// Global toolkit configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeeperConfig {
    /// Path to the note vault directory
    pub vault_root: PathBuf,
    /// Line that opens and closes the metadata block
    pub delimiter: String,
    /// Value written in place of every value by redaction
    pub redaction: String,
    /// Note file extension, without the dot
    pub note_extension: String,
    /// Directory names skipped during enumeration
    pub excluded_paths: HashSet<String>,
    pub log_level: String,
    pub contacts: ContactConfig,
}

impl Default for KeeperConfig {
    fn default() -> Self {
        Self {
            vault_root: PathBuf::from("."),
            delimiter: DEFAULT_DELIMITER.to_string(),
            redaction: DEFAULT_REDACTION.to_string(),
            note_extension: "md".to_string(),
            excluded_paths: [".obsidian", ".git", ".trash"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            log_level: "info".to_string(),
            contacts: ContactConfig::default(),
        }
    }
}

impl KeeperConfig {
    /// Create a new config with builder
    pub fn builder(vault_root: impl Into<PathBuf>) -> KeeperConfigBuilder {
        KeeperConfigBuilder::new(vault_root)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.delimiter.trim().is_empty() {
            return Err(Error::config_error("Delimiter cannot be empty"));
        }

        if self.delimiter.contains('\n') || self.delimiter.contains('\r') {
            return Err(Error::config_error("Delimiter must be a single line"));
        }

        if self.note_extension.is_empty() || self.note_extension.starts_with('.') {
            return Err(Error::config_error(format!(
                "Note extension must be non-empty and given without a dot: {:?}",
                self.note_extension
            )));
        }

        if !self.vault_root.exists() {
            return Err(Error::config_error(format!(
                "Vault path does not exist: {}",
                self.vault_root.display()
            )));
        }

        if !self.vault_root.is_dir() {
            return Err(Error::config_error(format!(
                "Vault path is not a directory: {}",
                self.vault_root.display()
            )));
        }

        Ok(())
    }

    /// Save configuration to a YAML file
    pub fn save(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self)
            .map_err(|e| Error::config_error(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, yaml).map_err(|e| {
            Error::config_error(format!(
                "Failed to save config to {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Load configuration from a YAML file; absent fields take defaults
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config_error(format!(
                "Failed to load config from {}: {}",
                path.display(),
                e
            ))
        })?;

        let mut config: KeeperConfig = serde_yaml::from_str(&content)
            .map_err(|e| Error::config_error(format!("Invalid configuration: {}", e)))?;
        config.vault_root = expand_path(&config.vault_root)?;
        Ok(config)
    }
}

/// Builder for KeeperConfig
pub struct KeeperConfigBuilder {
    vault_root: PathBuf,
    delimiter: Option<String>,
    redaction: Option<String>,
    note_extension: Option<String>,
    excluded_paths: Option<HashSet<String>>,
    log_level: Option<String>,
    contacts: Option<ContactConfig>,
}

impl KeeperConfigBuilder {
    /// Create a new builder
    pub fn new(vault_root: impl Into<PathBuf>) -> Self {
        Self {
            vault_root: vault_root.into(),
            delimiter: None,
            redaction: None,
            note_extension: None,
            excluded_paths: None,
            log_level: None,
            contacts: None,
        }
    }

    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = Some(delimiter.into());
        self
    }

    pub fn redaction(mut self, redaction: impl Into<String>) -> Self {
        self.redaction = Some(redaction.into());
        self
    }

    pub fn note_extension(mut self, extension: impl Into<String>) -> Self {
        self.note_extension = Some(extension.into());
        self
    }

    pub fn exclude(mut self, name: impl Into<String>) -> Self {
        self.excluded_paths
            .get_or_insert_with(|| KeeperConfig::default().excluded_paths)
            .insert(name.into());
        self
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = Some(level.into());
        self
    }

    pub fn contacts(mut self, contacts: ContactConfig) -> Self {
        self.contacts = Some(contacts);
        self
    }

    /// Build and validate
    pub fn build(self) -> Result<KeeperConfig> {
        let defaults = KeeperConfig::default();
        let config = KeeperConfig {
            vault_root: expand_path(&self.vault_root)?,
            delimiter: self.delimiter.unwrap_or(defaults.delimiter),
            redaction: self.redaction.unwrap_or(defaults.redaction),
            note_extension: self.note_extension.unwrap_or(defaults.note_extension),
            excluded_paths: self.excluded_paths.unwrap_or(defaults.excluded_paths),
            log_level: self.log_level.unwrap_or(defaults.log_level),
            contacts: self.contacts.unwrap_or(defaults.contacts),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Expand tilde and environment variables in a path
pub fn expand_path(path: &Path) -> Result<PathBuf> {
    let path_str = path
        .to_str()
        .ok_or_else(|| Error::invalid_path("Path contains invalid UTF-8"))?;

    let expanded = shellexpand::full(path_str)
        .map_err(|e| Error::invalid_path(format!("Failed to expand path: {}", e)))?;

    Ok(PathBuf::from(expanded.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_builder() {
        let temp = TempDir::new().unwrap();
        let config = KeeperConfig::builder(temp.path())
            .redaction("[hidden]")
            .exclude("Archive")
            .build();

        assert!(config.is_ok());
        let c = config.unwrap();
        assert_eq!(c.delimiter, "---");
        assert_eq!(c.redaction, "[hidden]");
        assert!(c.excluded_paths.contains("Archive"));
        assert!(c.excluded_paths.contains(".obsidian"));
    }

    #[test]
    fn test_builder_rejects_missing_vault() {
        let result = KeeperConfig::builder("/definitely/not/a/vault/dir").build();
        assert!(matches!(result, Err(Error::ConfigError { .. })));
    }

    #[test]
    fn test_builder_rejects_dotted_extension() {
        let temp = TempDir::new().unwrap();
        let result = KeeperConfig::builder(temp.path())
            .note_extension(".md")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_rejects_multiline_delimiter() {
        let temp = TempDir::new().unwrap();
        let result = KeeperConfig::builder(temp.path())
            .delimiter("---\n---")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let config = KeeperConfig::builder(temp.path())
            .delimiter("+++")
            .build()
            .unwrap();

        let file = temp.path().join("notekeep.yaml");
        config.save(&file).unwrap();
        let loaded = KeeperConfig::load(&file).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_partial_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("notekeep.yaml");
        std::fs::write(
            &file,
            format!("vault_root: {}\nredaction: xxx\n", temp.path().display()),
        )
        .unwrap();

        let loaded = KeeperConfig::load(&file).unwrap();
        assert_eq!(loaded.redaction, "xxx");
        assert_eq!(loaded.delimiter, DEFAULT_DELIMITER);
        assert_eq!(loaded.contacts.contacted_key, "contacted");
    }
}
