//! Filesystem utilities.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::glob;

/// Ensure a directory exists, creating it if necessary.
///
/// An existing directory is not an error.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

fn is_glob_pattern(entry: &str) -> bool {
    entry.contains(|c: char| matches!(c, '*' | '?' | '['))
}

/// Expand configured input names relative to a base directory.
///
/// Plain names are kept as given, whether or not the file exists yet; a
/// missing file is the compiler's to report. Entries containing glob
/// metacharacters are expanded to the matching files, sorted, and made
/// relative to `base`. Configuration order is preserved between entries.
pub fn expand_inputs(base: &Path, entries: &[String]) -> Result<Vec<PathBuf>> {
    let mut results = Vec::new();

    for entry in entries {
        if !is_glob_pattern(entry) {
            results.push(PathBuf::from(entry));
            continue;
        }

        let full_pattern = base.join(entry);
        let pattern_str = full_pattern.to_string_lossy();

        let mut matched = Vec::new();
        for path in glob(&pattern_str)
            .with_context(|| format!("invalid glob pattern: {}", entry))?
        {
            match path {
                Ok(path) if path.is_file() => matched.push(relative_path(base, &path)),
                Ok(_) => {}
                Err(e) => tracing::warn!("glob error: {}", e),
            }
        }

        if matched.is_empty() {
            tracing::warn!("pattern `{}` matched no files in {}", entry, base.display());
        }

        matched.sort();
        for path in matched {
            if !results.contains(&path) {
                results.push(path);
            }
        }
    }

    Ok(results)
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}
