//! Writing the combined index to disk.

use crate::models::CombinedIndex;
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Render the index as JSON with 2-space indentation.
///
/// Non-ASCII characters are written as-is and no trailing newline is added.
pub fn render_index(index: &CombinedIndex) -> Result<String> {
    serde_json::to_string_pretty(index).map_err(Into::into)
}

/// Write the index to `path`, replacing any existing file.
///
/// Missing parent directories are created. The content goes to a temporary
/// file next to the target first and is then renamed over it.
pub fn write_index(index: &CombinedIndex, path: &Path) -> Result<()> {
    let content = render_index(index)?;
    let parent = parent_dir(path);

    fs::create_dir_all(&parent)
        .with_context(|| format!("Failed to create directory {}", parent.display()))?;

    let mut tmp = NamedTempFile::new_in(&parent)
        .with_context(|| format!("Failed to create temporary file in {}", parent.display()))?;
    tmp.write_all(content.as_bytes())
        .context("Failed to write combined index")?;

    if let Some(permissions) = output_permissions(path) {
        tmp.as_file()
            .set_permissions(permissions)
            .context("Failed to set output file permissions")?;
    }

    tmp.persist(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

// Temporary files are created owner-only; match what a plain write would give.
fn output_permissions(path: &Path) -> Option<fs::Permissions> {
    fs::metadata(path)
        .map(|metadata| metadata.permissions())
        .ok()
        .or_else(default_permissions)
}

#[cfg(unix)]
fn default_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<fs::Permissions> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn index(value: Value) -> CombinedIndex {
        match value {
            Value::Object(map) => map,
            _ => panic!("index must be an object"),
        }
    }

    #[test]
    fn test_render_uses_two_space_indent() {
        let rendered = render_index(&index(json!({"walk": {"id": 2, "parameters": {}}}))).unwrap();
        assert_eq!(
            rendered,
            "{\n  \"walk\": {\n    \"id\": 2,\n    \"parameters\": {}\n  }\n}"
        );
    }

    #[test]
    fn test_render_keeps_non_ascii() {
        let rendered = render_index(&index(json!({"café": {"label": "Größe"}}))).unwrap();
        assert!(rendered.contains("café"));
        assert!(rendered.contains("Größe"));
        assert!(!rendered.contains("\\u"));
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("src").join("data").join("scriptBlocks.json");

        write_index(&index(json!({"a": {"parameters": {}}})), &path).unwrap();

        let written: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, json!({"a": {"parameters": {}}}));
    }

    #[test]
    fn test_write_overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("combined.json");
        fs::write(&path, "stale content that is much longer than the new index").unwrap();

        write_index(&CombinedIndex::new(), &path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
        let leftovers = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_new_file_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("combined.json");
        write_index(&CombinedIndex::new(), &path).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }
}
