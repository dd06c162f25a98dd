//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.blockindex.toml` files.

use crate::models::CollisionPolicy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the anchor directory.
pub const CONFIG_FILE_NAME: &str = ".blockindex.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Input and output locations.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Indexing behaviour.
    #[serde(default)]
    pub index: IndexConfig,

    /// Run reporting.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Input and output locations, relative to the anchor directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding one JSON file per block.
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,

    /// Combined index file to write.
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            output: default_output(),
        }
    }
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("external/pz-scripts-data/data/blocks")
}

fn default_output() -> PathBuf {
    PathBuf::from("src/data/scriptBlocks.json")
}

/// Indexing behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Extension of source files, without the dot.
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Process files in name order so the output is reproducible.
    #[serde(default = "default_true")]
    pub sort_keys: bool,

    /// What to do when two parameters or two files share a key.
    #[serde(default)]
    pub collisions: CollisionPolicy,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            extension: default_extension(),
            sort_keys: true,
            collisions: CollisionPolicy::default(),
        }
    }
}

fn default_extension() -> String {
    "json".to_string()
}

fn default_true() -> bool {
    true
}

/// Run reporting settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Write a JSON run summary to this path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<PathBuf>,

    /// Exit with code 2 when any file had to be skipped.
    #[serde(default)]
    pub fail_on_error: bool,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the anchor directory.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_from_root(root: &Path) -> Result<Option<Self>> {
        let config_path = root.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Find the configuration for a run.
    ///
    /// An explicit path must exist. Otherwise the anchor directory is checked,
    /// falling back to defaults only when no file is there. A file that exists
    /// but doesn't parse is always an error.
    pub fn discover(explicit: Option<&Path>, root: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        Ok(Self::load_from_root(root)?.unwrap_or_default())
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref source) = args.source {
            self.paths.source_dir = source.clone();
        }
        if let Some(ref output) = args.output {
            self.paths.output = output.clone();
        }

        if let Some(ref extension) = args.extension {
            self.index.extension = extension.trim_start_matches('.').to_string();
        }
        if let Some(collisions) = args.collisions {
            self.index.collisions = collisions;
        }
        if args.no_sort {
            self.index.sort_keys = false;
        }

        if let Some(ref summary) = args.summary {
            self.output.summary = Some(summary.clone());
        }
        if args.fail_on_error {
            self.output.fail_on_error = true;
        }
    }

    /// Resolve relative paths against the anchor directory.
    pub fn resolve_paths(&mut self, root: &Path) {
        self.paths.source_dir = root.join(&self.paths.source_dir);
        self.paths.output = root.join(&self.paths.output);
        if let Some(ref summary) = self.output.summary {
            self.output.summary = Some(root.join(summary));
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::tests::make_args;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(
            config.paths.source_dir,
            PathBuf::from("external/pz-scripts-data/data/blocks")
        );
        assert_eq!(config.paths.output, PathBuf::from("src/data/scriptBlocks.json"));
        assert_eq!(config.index.extension, "json");
        assert!(config.index.sort_keys);
        assert_eq!(config.index.collisions, CollisionPolicy::LastWins);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[paths]
source_dir = "data/blocks"

[index]
sort_keys = false
collisions = "fail-fast"

[output]
summary = "build/summary.json"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.paths.source_dir, PathBuf::from("data/blocks"));
        assert_eq!(config.paths.output, PathBuf::from("src/data/scriptBlocks.json"));
        assert!(!config.index.sort_keys);
        assert_eq!(config.index.collisions, CollisionPolicy::FailFast);
        assert_eq!(config.output.summary, Some(PathBuf::from("build/summary.json")));
        assert!(!config.output.fail_on_error);
    }

    #[test]
    fn test_merge_with_args() {
        let mut config = Config::default();
        let mut args = make_args();
        args.source = Some(PathBuf::from("blocks"));
        args.extension = Some(".block".to_string());
        args.collisions = Some(CollisionPolicy::FailFast);
        args.no_sort = true;
        args.fail_on_error = true;

        config.merge_with_args(&args);

        assert_eq!(config.paths.source_dir, PathBuf::from("blocks"));
        assert_eq!(config.paths.output, PathBuf::from("src/data/scriptBlocks.json"));
        assert_eq!(config.index.extension, "block");
        assert_eq!(config.index.collisions, CollisionPolicy::FailFast);
        assert!(!config.index.sort_keys);
        assert!(config.output.fail_on_error);
    }

    #[test]
    fn test_resolve_paths() {
        let mut config = Config::default();
        config.output.summary = Some(PathBuf::from("summary.json"));
        config.resolve_paths(Path::new("/work"));

        assert_eq!(
            config.paths.source_dir,
            PathBuf::from("/work/external/pz-scripts-data/data/blocks")
        );
        assert_eq!(config.output.summary, Some(PathBuf::from("/work/summary.json")));
    }

    #[test]
    fn test_load_from_root() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(Config::load_from_root(dir.path()).unwrap().is_none());

        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[index]\nextension = \"block\"\n")
            .unwrap();
        let config = Config::load_from_root(dir.path()).unwrap().unwrap();
        assert_eq!(config.index.extension, "block");
    }

    #[test]
    fn test_discover_rejects_malformed_root_config() {
        let dir = tempfile::TempDir::new().unwrap();
        assert_eq!(
            Config::discover(None, dir.path()).unwrap().index.collisions,
            CollisionPolicy::LastWins
        );

        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[index]\ncollisions = \"fail-fats\"\n",
        )
        .unwrap();
        assert!(Config::discover(None, dir.path()).is_err());
    }

    #[test]
    fn test_discover_prefers_explicit_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let explicit = dir.path().join("custom.toml");
        std::fs::write(&explicit, "[index]\ncollisions = \"fail-fast\"\n").unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "not = [valid").unwrap();

        let config = Config::discover(Some(&explicit), dir.path()).unwrap();
        assert_eq!(config.index.collisions, CollisionPolicy::FailFast);

        assert!(Config::discover(Some(&dir.path().join("missing.toml")), dir.path()).is_err());
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[paths]"));
        assert!(toml_str.contains("[index]"));
        assert!(toml_str.contains("collisions = \"last-wins\""));
    }
}
