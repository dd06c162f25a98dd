//! Combining source records into a single index.
//!
//! Each file is read, parsed and indexed on its own. A file that fails any
//! of those steps is logged and left out; the rest of the batch carries on.

use crate::aggregate::writer::write_index;
use crate::indexer::index_value;
use crate::models::{CollisionPolicy, CombinedIndex, FileFailure, IndexedRecord, RunSummary};
use crate::scanner::{ScanConfig, SourceFile, SourceScanner};
use anyhow::{Context, Result};
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Options controlling a run.
#[derive(Debug, Clone, Default)]
pub struct AggregateOptions {
    /// Which files to pick up and in what order.
    pub scan: ScanConfig,
    /// Collision handling for both parameter names and record keys.
    pub collisions: CollisionPolicy,
    /// Draw a progress bar while processing files.
    pub show_progress: bool,
}

/// Records that made it into the index plus the files that didn't.
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub index: CombinedIndex,
    pub failures: Vec<FileFailure>,
}

/// Drives a full source-directory-to-index conversion.
pub struct Aggregator {
    options: AggregateOptions,
}

impl Aggregator {
    /// Create a new aggregator.
    pub fn new(options: AggregateOptions) -> Self {
        Self { options }
    }

    /// Scan `source_dir`, index every matching file and write the result to `output`.
    ///
    /// A missing or unreadable source directory aborts the run. Bad files do not.
    pub fn run(&self, source_dir: &Path, output: &Path) -> Result<RunSummary> {
        let start_time = Instant::now();

        let scanner = SourceScanner::new(source_dir.to_path_buf(), self.options.scan.clone());
        let files = scanner.scan()?;
        info!("Found {} source files in {}", files.len(), source_dir.display());

        let aggregation = self.aggregate(&files);
        write_index(&aggregation.index, output)?;

        info!(
            "Wrote {} records to {}",
            aggregation.index.len(),
            output.display()
        );

        Ok(RunSummary {
            generated_at: Utc::now(),
            source_dir: source_dir.display().to_string(),
            output: output.display().to_string(),
            files_seen: files.len(),
            records_written: aggregation.index.len(),
            failures: aggregation.failures,
            duration_seconds: start_time.elapsed().as_secs_f64(),
        })
    }

    /// Index every file, collecting failures instead of stopping on them.
    pub fn aggregate(&self, files: &[SourceFile]) -> Aggregation {
        let mut aggregation = Aggregation::default();
        let progress = self.progress_bar(files.len());

        for file in files {
            progress.set_message(file.file_name.clone());

            match self.load_record(file) {
                Ok(record) => self.insert(&mut aggregation, file, record),
                Err(e) => {
                    warn!("Error reading {}: {:#}", file.file_name, e);
                    aggregation.failures.push(failure(file, format!("{:#}", e)));
                }
            }

            progress.inc(1);
        }

        progress.finish_and_clear();
        aggregation
    }

    /// Read, parse and index one file.
    pub fn load_record(&self, file: &SourceFile) -> Result<IndexedRecord> {
        let content = fs::read_to_string(&file.path)
            .with_context(|| format!("Failed to read {}", file.path.display()))?;

        let value: Value = serde_json::from_str(&content).context("Invalid JSON")?;

        let record = index_value(value, self.options.collisions)?;
        debug!(
            "Indexed '{}' with {} parameters",
            file.key,
            record.parameters().len()
        );

        Ok(record)
    }

    fn insert(&self, aggregation: &mut Aggregation, file: &SourceFile, record: IndexedRecord) {
        if aggregation.index.contains_key(&file.key) {
            match self.options.collisions {
                CollisionPolicy::LastWins => {
                    debug!("Record key '{}' redefined by {}", file.key, file.file_name);
                }
                CollisionPolicy::FailFast => {
                    let message = format!("duplicate record key `{}`", file.key);
                    warn!("Error reading {}: {}", file.file_name, message);
                    aggregation.failures.push(failure(file, message));
                    return;
                }
            }
        }

        aggregation
            .index
            .insert(file.key.clone(), Value::Object(record.into_inner()));
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.options.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb
    }
}

fn failure(file: &SourceFile, error: String) -> FileFailure {
    FileFailure {
        file: file.file_name.clone(),
        key: file.key.clone(),
        error,
    }
}
