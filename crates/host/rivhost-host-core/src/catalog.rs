//! Content sources and the catalog that lists them.

use std::fmt;
use std::path::{Path, PathBuf};

use hashbrown::HashMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::{CatalogConfig, HostSettings, DEFAULT_CONTENT_EXTENSION};
use crate::error::PickError;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Shipped with the application and loaded through the package loader.
    #[default]
    #[serde(alias = "package")]
    Bundled,
    /// Picked by the user from the file system.
    External,
}

impl SourceKind {
    pub fn label(self) -> &'static str {
        match self {
            SourceKind::Bundled => "Bundled Asset",
            SourceKind::External => "External File",
        }
    }
}

/// One loadable content unit.
///
/// `is_valid` is derived from `path` and the expected extension and is
/// recomputed on every mutation.
#[derive(Clone, Debug)]
pub struct FileSource {
    path: String,
    display_name: String,
    kind: SourceKind,
    extension: String,
    valid: bool,
}

impl FileSource {
    pub fn new(path: impl Into<String>, display_name: impl Into<String>, kind: SourceKind) -> Self {
        Self::with_extension(path, display_name, kind, DEFAULT_CONTENT_EXTENSION)
    }

    pub fn with_extension(
        path: impl Into<String>,
        display_name: impl Into<String>,
        kind: SourceKind,
        extension: &str,
    ) -> Self {
        let mut source = Self {
            path: path.into(),
            display_name: display_name.into(),
            kind,
            extension: normalize_extension(extension),
            valid: false,
        };
        source.revalidate();
        source
    }

    /// Bundled source named after its file.
    pub fn bundled(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = display_name_from_filename(&path);
        Self::new(path, name, SourceKind::Bundled)
    }

    /// External source named after its file.
    pub fn external(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = display_name_from_filename(&path);
        Self::new(path, name, SourceKind::External)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = path.into();
        self.revalidate();
    }

    pub fn set_kind(&mut self, kind: SourceKind) {
        self.kind = kind;
        self.revalidate();
    }

    pub fn set_display_name(&mut self, name: impl Into<String>) {
        self.display_name = name.into();
    }

    /// "Name (Bundled Asset)" / "Name (External File)".
    pub fn description(&self) -> String {
        format!("{} ({})", self.display_name, self.kind.label())
    }

    /// Lower-cased path, the identity used for de-duplication.
    pub fn key(&self) -> String {
        self.path.to_lowercase()
    }

    fn revalidate(&mut self) {
        self.valid = !self.path.trim().is_empty() && has_extension(&self.path, &self.extension);
    }
}

impl PartialEq for FileSource {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.path.to_lowercase() == other.path.to_lowercase()
    }
}

impl Eq for FileSource {}

impl fmt::Display for FileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name)
    }
}

fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim();
    if ext.starts_with('.') {
        ext.to_lowercase()
    } else {
        format!(".{}", ext.to_lowercase())
    }
}

/// Case-insensitive extension test. `extension` includes the leading dot.
pub(crate) fn has_extension(path: &str, extension: &str) -> bool {
    let want = extension.trim_start_matches('.');
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(want))
        .unwrap_or(false)
}

/// Friendly name for a content file: "vector_feathering__avatar.riv" becomes
/// "Vector Feathering Avatar".
pub fn display_name_from_filename(filename: &str) -> String {
    if filename.trim().is_empty() {
        return "Unknown File".to_string();
    }
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);
    let words: Vec<String> = stem
        .replace(['_', '-'], " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    let mut out: String = first.to_uppercase().collect();
                    out.push_str(&chars.as_str().to_lowercase());
                    out
                }
                None => String::new(),
            }
        })
        .collect();
    if words.is_empty() {
        "Unknown File".to_string()
    } else {
        words.join(" ")
    }
}

/// Human-readable byte count: "512 B", "1.5 KB", "2.0 MB", "1.2 GB".
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 3] = ["KB", "MB", "GB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut size = bytes as f64 / 1024.0;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{size:.1} {}", UNITS[unit])
}

/// A catalog slot: the source plus its listing flags.
#[derive(Clone, Debug, PartialEq)]
pub struct CatalogItem {
    pub source: FileSource,
    pub is_default: bool,
    pub enabled: bool,
    pub tags: Vec<String>,
}

impl CatalogItem {
    pub fn new(source: FileSource) -> Self {
        Self {
            source,
            is_default: false,
            enabled: true,
            tags: Vec::new(),
        }
    }

    pub fn default_flag(mut self) -> Self {
        self.is_default = true;
        self
    }
}

/// One file returned by a multi-select picker.
#[derive(Clone, Debug, PartialEq)]
pub struct PickedFile {
    pub path: PathBuf,
    pub size: u64,
}

impl PickedFile {
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            path: path.into(),
            size,
        }
    }
}

/// Outcome of an external file pick, as reported by the platform picker.
#[derive(Clone, Debug, PartialEq)]
pub enum ExternalSelection {
    Picked { path: PathBuf, size: u64 },
    /// Multi-select pick, in picker order.
    PickedMany(Vec<PickedFile>),
    Cancelled,
    Unsupported(String),
}

/// Most-recently-used sources, newest first.
#[derive(Clone, Debug)]
pub struct RecentFiles {
    items: Vec<FileSource>,
    limit: usize,
}

impl RecentFiles {
    pub fn new(limit: usize) -> Self {
        Self {
            items: Vec::new(),
            limit,
        }
    }

    pub fn push(&mut self, source: FileSource) {
        let key = source.key();
        self.items.retain(|s| s.key() != key);
        self.items.insert(0, source);
        self.items.truncate(self.limit);
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileSource> {
        self.items.iter()
    }

    pub fn most_recent(&self) -> Option<&FileSource> {
        self.items.first()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// Ordered list of known sources with a case-insensitive path index.
#[derive(Clone, Debug)]
pub struct FileSourceCatalog {
    items: Vec<CatalogItem>,
    index: HashMap<String, usize>,
    recent: RecentFiles,
    extension: String,
    min_external_bytes: u64,
    max_external_bytes: u64,
}

impl FileSourceCatalog {
    pub fn new(settings: &HostSettings) -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
            recent: RecentFiles::new(settings.recent_limit),
            extension: normalize_extension(&settings.content_extension),
            min_external_bytes: settings.min_external_bytes,
            max_external_bytes: settings.max_external_bytes,
        }
    }

    /// Build a catalog from a configuration document, keeping entry order.
    pub fn from_config(config: &CatalogConfig, settings: &HostSettings) -> Self {
        let mut catalog = Self::new(settings);
        for entry in &config.available_files {
            let source = FileSource::with_extension(
                entry.file_path.clone(),
                entry.display_name.clone(),
                entry.source_type,
                &catalog.extension,
            );
            let item = CatalogItem {
                source,
                is_default: entry.is_default,
                enabled: entry.is_enabled,
                tags: entry.tags.clone(),
            };
            if !catalog.add_entry(item) {
                debug!("catalog: duplicate entry '{}' ignored", entry.file_path);
            }
        }
        catalog
    }

    /// Append `item` unless a source with the same path is already listed.
    pub fn add_entry(&mut self, item: CatalogItem) -> bool {
        let key = item.source.key();
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key, self.items.len());
        self.items.push(item);
        true
    }

    pub fn remove_entry(&mut self, path: &str) -> Option<CatalogItem> {
        let pos = self.index.remove(&path.to_lowercase())?;
        let item = self.items.remove(pos);
        self.reindex();
        Some(item)
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (i, item) in self.items.iter().enumerate() {
            self.index.insert(item.source.key(), i);
        }
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn find(&self, path: &str) -> Option<&FileSource> {
        self.index
            .get(&path.to_lowercase())
            .map(|&i| &self.items[i].source)
    }

    /// Enabled sources in listing order.
    pub fn list_available(&self) -> Vec<FileSource> {
        self.items
            .iter()
            .filter(|item| item.enabled)
            .map(|item| item.source.clone())
            .collect()
    }

    /// First enabled source flagged default, else the first enabled source.
    pub fn get_default(&self) -> Option<FileSource> {
        let mut enabled = self.items.iter().filter(|item| item.enabled);
        let first = enabled.next()?;
        if first.is_default {
            return Some(first.source.clone());
        }
        enabled
            .find(|item| item.is_default)
            .map(|item| item.source.clone())
            .or_else(|| Some(first.source.clone()))
    }

    /// Validate an external pick and return its catalog entry, adding one if
    /// the path is not already known. A multi-select pick resolves to its
    /// first accepted file.
    pub fn resolve_external(&mut self, selection: ExternalSelection) -> Result<FileSource, PickError> {
        match selection {
            ExternalSelection::Cancelled => Err(PickError::Cancelled),
            ExternalSelection::Unsupported(reason) => Err(PickError::Unsupported(reason)),
            ExternalSelection::Picked { path, size } => self.resolve_picked(path, size),
            ExternalSelection::PickedMany(files) => self
                .resolve_external_many(files)?
                .into_iter()
                .next()
                .ok_or(PickError::Cancelled),
        }
    }

    /// Resolve every file of a multi-select pick. Rejected files are skipped
    /// with a warning and repeated paths are returned once. Fails with the
    /// first rejection when nothing is accepted.
    pub fn resolve_external_many(
        &mut self,
        files: Vec<PickedFile>,
    ) -> Result<Vec<FileSource>, PickError> {
        if files.is_empty() {
            return Err(PickError::Cancelled);
        }
        let mut accepted: Vec<FileSource> = Vec::new();
        let mut first_error = None;
        for file in files {
            match self.resolve_picked(file.path, file.size) {
                Ok(source) => {
                    if !accepted.iter().any(|s| s.key() == source.key()) {
                        accepted.push(source);
                    }
                }
                Err(e) => {
                    warn!("catalog: skipping picked file: {e}");
                    first_error.get_or_insert(e);
                }
            }
        }
        match (accepted.is_empty(), first_error) {
            (true, Some(e)) => Err(e),
            _ => Ok(accepted),
        }
    }

    fn resolve_picked(&mut self, path: PathBuf, size: u64) -> Result<FileSource, PickError> {
        let path_str = path.to_string_lossy().into_owned();
        if !has_extension(&path_str, &self.extension) {
            return Err(PickError::InvalidExtension {
                path,
                extension: self.extension.clone(),
            });
        }
        if size < self.min_external_bytes {
            return Err(PickError::TooSmall { path, size });
        }
        if size > self.max_external_bytes {
            return Err(PickError::TooLarge {
                path,
                size,
                limit: self.max_external_bytes,
            });
        }

        let source = match self.find(&path_str) {
            Some(existing) => {
                debug!("catalog: '{path_str}' already listed");
                existing.clone()
            }
            None => {
                let name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(display_name_from_filename)
                    .unwrap_or_else(|| display_name_from_filename(&path_str));
                let source = FileSource::with_extension(
                    path_str,
                    name,
                    SourceKind::External,
                    &self.extension,
                );
                let mut item = CatalogItem::new(source.clone());
                item.tags.push("external".to_string());
                self.add_entry(item);
                source
            }
        };
        self.recent.push(source.clone());
        Ok(source)
    }

    /// Stat `path` and resolve it as an external pick.
    pub fn resolve_external_path(&mut self, path: &Path) -> Result<FileSource, PickError> {
        let meta = std::fs::metadata(path).map_err(|e| PickError::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        if !meta.is_file() {
            return Err(PickError::Io {
                path: path.to_path_buf(),
                reason: "not a regular file".to_string(),
            });
        }
        self.resolve_external(ExternalSelection::Picked {
            path: path.to_path_buf(),
            size: meta.len(),
        })
    }

    pub fn recent(&self) -> &RecentFiles {
        &self.recent
    }

    pub fn note_recent(&mut self, source: &FileSource) {
        self.recent.push(source.clone());
    }

    pub fn clear_recent(&mut self) {
        self.recent.clear();
    }
}
