//! Host configuration: runtime settings and the catalog document.
//!
//! The catalog document is a JSON list of content entries. A document that
//! cannot be parsed, or that fails validation with errors, is replaced by a
//! built-in single-entry catalog so startup never fails on configuration.
//! A user document, when present and valid, takes precedence over the
//! default one.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{has_extension, SourceKind};

pub const DEFAULT_CONTENT_EXTENSION: &str = ".riv";

/// Runtime knobs for the host. Every field has a default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostSettings {
    /// Start the render loop and state machine as soon as content is ready.
    pub auto_play: bool,
    pub content_extension: String,
    /// External files smaller than this are rejected.
    pub min_external_bytes: u64,
    pub max_external_bytes: u64,
    pub recent_limit: usize,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            auto_play: true,
            content_extension: DEFAULT_CONTENT_EXTENSION.to_string(),
            min_external_bytes: 10,
            max_external_bytes: 100 * 1024 * 1024,
            recent_limit: 10,
        }
    }
}

impl HostSettings {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogConfig {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub available_files: Vec<CatalogEntry>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub source_type: SourceKind,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default = "default_true")]
    pub is_enabled: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl CatalogEntry {
    pub fn new(display_name: &str, file_path: &str, source_type: SourceKind) -> Self {
        Self {
            display_name: display_name.to_string(),
            file_path: file_path.to_string(),
            source_type,
            is_default: false,
            is_enabled: true,
            description: String::new(),
            tags: Vec::new(),
        }
    }

    fn validate_into(&self, position: usize, extension: &str, report: &mut ValidationReport) {
        if self.display_name.trim().is_empty() {
            report.errors.push(format!("file {position}: displayName is required"));
        }
        if self.file_path.trim().is_empty() {
            report.errors.push(format!("file {position}: filePath is required"));
            return;
        }
        if self.source_type == SourceKind::Bundled {
            if self.file_path.starts_with('/') || self.file_path.contains("..") {
                report.warnings.push(format!(
                    "file {position}: bundled path should be relative without a leading slash"
                ));
            }
            if !has_extension(&self.file_path, extension) {
                report.warnings.push(format!(
                    "file {position}: path should end with the {extension} extension"
                ));
            }
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    /// One-line summary, `"Valid"` when there is nothing to report.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if self.has_errors() {
            parts.push(format!("Errors: {}", self.errors.join(", ")));
        }
        if self.has_warnings() {
            parts.push(format!("Warnings: {}", self.warnings.join(", ")));
        }
        if parts.is_empty() {
            "Valid".to_string()
        } else {
            parts.join("; ")
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration is invalid: {0}")]
    Invalid(String),
    #[error("cannot write configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot serialize configuration: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl CatalogConfig {
    pub fn validate(&self) -> ValidationReport {
        self.validate_for(DEFAULT_CONTENT_EXTENSION)
    }

    /// Validate with bundled paths checked against `extension`.
    pub fn validate_for(&self, extension: &str) -> ValidationReport {
        let mut report = ValidationReport::default();
        if self.version.trim().is_empty() {
            report.errors.push("version is required".to_string());
        }
        if self.available_files.is_empty() {
            report.warnings.push("No files configured".to_string());
            return report;
        }
        let defaults = self.available_files.iter().filter(|e| e.is_default).count();
        if defaults > 1 {
            report.warnings.push(format!(
                "Multiple default files found ({defaults}). Only the first will be used."
            ));
        }
        for (i, entry) in self.available_files.iter().enumerate() {
            entry.validate_into(i, extension, &mut report);
        }
        report
    }

    /// First enabled entry flagged default, else the first enabled entry.
    pub fn default_file(&self) -> Option<&CatalogEntry> {
        let enabled = || self.available_files.iter().filter(|e| e.is_enabled);
        enabled()
            .find(|e| e.is_default)
            .or_else(|| enabled().next())
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write the document to `path`. A configuration with validation errors
    /// is refused.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let report = self.validate();
        if report.has_errors() {
            return Err(ConfigError::Invalid(report.summary()));
        }
        fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }
}

/// Built-in catalog used when no usable document is available.
pub fn fallback_config() -> CatalogConfig {
    let mut entry = CatalogEntry::new("Data Test (Fallback)", "datatest.riv", SourceKind::Bundled);
    entry.is_default = true;
    entry.description = "Built-in catalog entry".to_string();
    entry.tags = vec!["fallback".to_string(), "demo".to_string()];
    CatalogConfig {
        version: default_version(),
        description: "Fallback configuration".to_string(),
        available_files: vec![entry],
    }
}

/// Which document a [`ConfigLoad`] came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum ConfigOrigin {
    /// The user's own catalog.
    User,
    /// The default catalog document.
    Document,
    Fallback,
}

/// Result of loading a catalog document. `report` always describes the
/// document that was read, even when the fallback replaced it.
#[derive(Clone, Debug)]
pub struct ConfigLoad {
    pub config: CatalogConfig,
    pub report: ValidationReport,
    pub origin: ConfigOrigin,
}

impl ConfigLoad {
    fn fallback(report: ValidationReport) -> Self {
        Self {
            config: fallback_config(),
            report,
            origin: ConfigOrigin::Fallback,
        }
    }
}

/// Parse and validate a catalog document.
fn parse_catalog(text: &str, settings: &HostSettings) -> Result<ConfigLoad, ValidationReport> {
    let config: CatalogConfig = serde_json::from_str(text).map_err(|e| ValidationReport {
        errors: vec![format!("malformed document: {e}")],
        warnings: Vec::new(),
    })?;
    let report = config.validate_for(&settings.content_extension);
    if report.has_errors() {
        return Err(report);
    }
    for warning in &report.warnings {
        debug!("catalog: {warning}");
    }
    Ok(ConfigLoad {
        config,
        report,
        origin: ConfigOrigin::Document,
    })
}

pub fn load_catalog_config(text: &str, settings: &HostSettings) -> ConfigLoad {
    parse_catalog(text, settings).unwrap_or_else(|report| {
        warn!("catalog document is unusable, using fallback: {}", report.summary());
        ConfigLoad::fallback(report)
    })
}

pub fn load_catalog_file(path: &Path, settings: &HostSettings) -> ConfigLoad {
    match fs::read_to_string(path) {
        Ok(text) => load_catalog_config(&text, settings),
        Err(e) => {
            warn!("cannot read catalog {}: {e}", path.display());
            ConfigLoad::fallback(ValidationReport {
                errors: vec![format!("cannot read {}: {e}", path.display())],
                warnings: Vec::new(),
            })
        }
    }
}

/// Load the user catalog at `user` if it exists and is valid, otherwise the
/// default catalog at `default` (with its fallback). A missing user file is
/// the normal case; an unusable one is logged and skipped.
pub fn load_catalog_layers(
    user: Option<&Path>,
    default: &Path,
    settings: &HostSettings,
) -> ConfigLoad {
    if let Some(path) = user {
        match fs::read_to_string(path) {
            Ok(text) => match parse_catalog(&text, settings) {
                Ok(load) => {
                    debug!("using user catalog {}", path.display());
                    return ConfigLoad {
                        origin: ConfigOrigin::User,
                        ..load
                    };
                }
                Err(report) => warn!(
                    "user catalog {} ignored: {}",
                    path.display(),
                    report.summary()
                ),
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("no user catalog at {}", path.display());
            }
            Err(e) => warn!("cannot read user catalog {}: {e}", path.display()),
        }
    }
    load_catalog_file(default, settings)
}
