//! Run summary generation.
//!
//! Renders the end-of-run summary for the terminal and as a JSON file.

use crate::models::{FileFailure, RunSummary};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Generate the terminal summary shown after a run.
pub fn generate_text_summary(summary: &RunSummary) -> String {
    let mut output = String::new();

    output.push_str("📊 Index Summary:\n");
    output.push_str(&format!("   Source: {}\n", summary.source_dir));
    output.push_str(&format!("   Files found: {}\n", summary.files_seen));
    output.push_str(&format!("   Records written: {}\n", summary.records_written));
    output.push_str(&format!("   Files skipped: {}\n", summary.failures.len()));
    output.push_str(&format!("   Duration: {:.2}s\n", summary.duration_seconds));

    if !summary.failures.is_empty() {
        output.push('\n');
        output.push_str(&generate_failure_list(&summary.failures));
    }

    output
}

/// List the skipped files with their errors.
pub fn generate_failure_list(failures: &[FileFailure]) -> String {
    let mut section = String::from("⚠️  Skipped files:\n");

    for failure in failures {
        section.push_str(&format!("   - {}: {}\n", failure.file, failure.error));
    }

    section
}

/// Generate the JSON summary.
pub fn generate_json_summary(summary: &RunSummary) -> Result<String> {
    serde_json::to_string_pretty(summary).map_err(Into::into)
}

/// Write the JSON summary to a file, creating parent directories.
pub fn write_json_summary(summary: &RunSummary, path: &Path) -> Result<()> {
    let content = generate_json_summary(summary)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write summary to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn create_test_summary() -> RunSummary {
        RunSummary {
            generated_at: Utc::now(),
            source_dir: "external/blocks".to_string(),
            output: "src/data/scriptBlocks.json".to_string(),
            files_seen: 3,
            records_written: 2,
            failures: vec![FileFailure {
                file: "bad.json".to_string(),
                key: "bad".to_string(),
                error: "Invalid JSON: expected value at line 1 column 1".to_string(),
            }],
            duration_seconds: 0.25,
        }
    }

    #[test]
    fn test_text_summary() {
        let text = generate_text_summary(&create_test_summary());

        assert!(text.contains("Files found: 3"));
        assert!(text.contains("Records written: 2"));
        assert!(text.contains("Files skipped: 1"));
        assert!(text.contains("bad.json: Invalid JSON"));
    }

    #[test]
    fn test_text_summary_without_failures() {
        let mut summary = create_test_summary();
        summary.failures.clear();

        let text = generate_text_summary(&summary);
        assert!(!text.contains("Skipped files"));
    }

    #[test]
    fn test_json_summary_roundtrip_fields() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("reports").join("summary.json");

        write_json_summary(&create_test_summary(), &path).unwrap();

        let parsed: RunSummary =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.records_written, 2);
        assert_eq!(parsed.failures[0].key, "bad");
    }
}
