//! Source directory scanner.
//!
//! Lists the block definition files directly inside the source directory
//! and derives the record key for each one.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Configuration for source scanning.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Extension a file name must end with, without the dot.
    pub extension: String,
    /// Order files by name instead of raw directory-listing order.
    pub sort: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extension: "json".to_string(),
            sort: true,
        }
    }
}

impl From<&crate::config::IndexConfig> for ScanConfig {
    fn from(config: &crate::config::IndexConfig) -> Self {
        Self {
            extension: config.extension.clone(),
            sort: config.sort_keys,
        }
    }
}

/// A matching file in the source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Full path to the file.
    pub path: PathBuf,
    /// File name as listed.
    pub file_name: String,
    /// Record key: the file name without its extension.
    pub key: String,
}

/// Scanner for block definition files.
pub struct SourceScanner {
    config: ScanConfig,
    source_dir: PathBuf,
}

impl SourceScanner {
    /// Create a new scanner over `source_dir`.
    pub fn new(source_dir: PathBuf, config: ScanConfig) -> Self {
        Self { config, source_dir }
    }

    /// List all matching files.
    ///
    /// Fails if the source directory is missing or cannot be listed.
    pub fn scan(&self) -> Result<Vec<SourceFile>> {
        if !self.source_dir.is_dir() {
            anyhow::bail!(
                "Source directory not found: {}",
                self.source_dir.display()
            );
        }

        let mut walker = WalkDir::new(&self.source_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true);
        if self.config.sort {
            walker = walker.sort_by_file_name();
        }

        let mut files = Vec::new();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                // A bad entry (e.g. a dangling symlink) only loses that entry
                Err(e) if e.depth() > 0 => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
                Err(e) => {
                    return Err(e).with_context(|| {
                        format!("Failed to list {}", self.source_dir.display())
                    });
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy().to_string();
            if !self.matches(&file_name) {
                continue;
            }

            if entry.file_name().to_str().is_none() {
                warn!("Non UTF-8 file name, using lossy key: {}", file_name);
            }

            let key = record_key(&file_name, &self.config.extension);
            debug!("Found {} -> '{}'", file_name, key);

            files.push(SourceFile {
                path: entry.into_path(),
                file_name,
                key,
            });
        }

        Ok(files)
    }

    /// Check if a file name carries the configured extension.
    pub fn matches(&self, file_name: &str) -> bool {
        let suffix = format!(".{}", self.config.extension);
        file_name.ends_with(&suffix)
    }
}

/// Derive the record key from a file name.
///
/// The configured extension is stripped as a whole, so `idle.block.json`
/// with extension `block.json` yields `idle`. A name that is nothing but the
/// extension (`.json`) keeps its full name.
pub fn record_key(file_name: &str, extension: &str) -> String {
    let suffix = format!(".{}", extension);
    match file_name.strip_suffix(&suffix) {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => file_name.to_string(),
    }
}
