//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::CollisionPolicy;
use clap::Parser;
use std::path::PathBuf;

/// blockindex - combine per-block JSON files into one indexed JSON file
///
/// Reads every JSON file in the source directory, re-keys each record's
/// `parameters` list by lowercase parameter name, and writes all records
/// into a single object keyed by file name.
///
/// Examples:
///   blockindex
///   blockindex --root ./vscode-extension
///   blockindex --source data/blocks --output build/blocks.json
///   blockindex --collisions fail-fast --fail-on-error
///   blockindex --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Anchor directory for config lookup; relative paths resolve against it
    #[arg(long, default_value = ".", value_name = "DIR")]
    pub root: PathBuf,

    /// Directory containing one JSON file per block
    ///
    /// Default: external/pz-scripts-data/data/blocks under --root
    #[arg(short, long, value_name = "DIR", env = "BLOCKINDEX_SOURCE")]
    pub source: Option<PathBuf>,

    /// Combined index file to write
    ///
    /// Default: src/data/scriptBlocks.json under --root
    #[arg(short, long, value_name = "FILE", env = "BLOCKINDEX_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .blockindex.toml in the --root directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// How to handle parameters or files that share a key
    #[arg(long, value_name = "POLICY")]
    pub collisions: Option<CollisionPolicy>,

    /// Keep raw directory-listing order instead of sorting by file name
    #[arg(long)]
    pub no_sort: bool,

    /// Source file extension (default: json)
    #[arg(long, value_name = "EXT")]
    pub extension: Option<String>,

    /// Write a JSON run summary to this file
    #[arg(long, value_name = "FILE")]
    pub summary: Option<PathBuf>,

    /// Exit with code 2 if any source file was skipped
    #[arg(long)]
    pub fail_on_error: bool,

    /// Scan the source directory and list files without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .blockindex.toml configuration file
    #[arg(long)]
    pub init_config: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref extension) = self.extension {
            if extension.trim_start_matches('.').is_empty() {
                return Err("Extension must not be empty".to_string());
            }
        }

        if !self.root.is_dir() {
            return Err(format!(
                "Root directory does not exist: {}",
                self.root.display()
            ));
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
