//! Data models for the block index.
//!
//! This module contains the records read from the source directory, the
//! indexed records produced from them, and the end-of-run summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Field holding a record's parameter list (and later its parameter map).
pub const PARAMETERS_FIELD: &str = "parameters";

/// Field identifying a single parameter.
pub const NAME_FIELD: &str = "name";

/// One source JSON object describing a single block.
pub type Record = Map<String, Value>;

/// A record whose `parameters` field is an object keyed by lowercase name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct IndexedRecord(Record);

impl IndexedRecord {
    /// Wrap a record whose parameters have already been indexed.
    pub(crate) fn new(fields: Record) -> Self {
        Self(fields)
    }

    /// The parameter map of this record.
    pub fn parameters(&self) -> &Map<String, Value> {
        match self.0.get(PARAMETERS_FIELD) {
            Some(Value::Object(map)) => map,
            // new() is only reached with an object in place
            _ => unreachable!("indexed record without a parameters object"),
        }
    }

    /// Consume the record and return its fields.
    pub fn into_inner(self) -> Record {
        self.0
    }
}

/// The combined index, keyed by record key in insertion order.
pub type CombinedIndex = Map<String, Value>;

/// How to treat two entries that normalize to the same key.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionPolicy {
    /// The later entry silently replaces the earlier one
    #[default]
    LastWins,
    /// A collision is an error
    FailFast,
}

impl fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollisionPolicy::LastWins => write!(f, "last-wins"),
            CollisionPolicy::FailFast => write!(f, "fail-fast"),
        }
    }
}

/// A source file that could not be added to the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    /// File name inside the source directory.
    pub file: String,
    /// Record key the file would have produced.
    pub key: String,
    /// Human readable error.
    pub error: String,
}

/// Summary of a single aggregation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// When the run finished.
    pub generated_at: DateTime<Utc>,
    /// Directory that was scanned.
    pub source_dir: String,
    /// Index file written.
    pub output: String,
    /// Matching source files found.
    pub files_seen: usize,
    /// Records present in the written index.
    pub records_written: usize,
    /// Files excluded from the index.
    pub failures: Vec<FileFailure>,
    /// Wall-clock duration of the run.
    pub duration_seconds: f64,
}

impl RunSummary {
    /// Whether every matching file made it into the index.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
