//! Path resolution and file IO.
//!
//! Directories are walked with gitignore rules respected; results are sorted
//! so a run always processes files in a stable order. Writes go through a
//! same-directory temp file and rename, so an interrupted run never leaves a
//! half-written source behind.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use ignore::WalkBuilder;

/// File extensions treated as Python sources
pub const PYTHON_EXTENSIONS: &[&str] = &["py", "pyi"];

/// Check if a file is a Python source we want to document
pub fn is_python_file(path: &Path) -> bool {
    let Some(extension) = path.extension() else {
        return false;
    };
    let Some(ext_str) = extension.to_str() else {
        return false;
    };
    PYTHON_EXTENSIONS.contains(&ext_str)
}

/// Compile exclude globs from the configuration
pub fn compile_excludes(patterns: &[String]) -> Result<Vec<glob::Pattern>> {
    patterns
        .iter()
        .map(|p| {
            glob::Pattern::new(p).with_context(|| format!("Invalid exclude pattern: {}", p))
        })
        .collect()
}

/// Verify every input path exists before any work starts
pub fn validate_paths(paths: &[String]) -> Result<()> {
    for raw in paths {
        let expanded = shellexpand::tilde(raw);
        let path = Path::new(expanded.as_ref());
        if !path.exists() {
            bail!("Invalid path provided: {}", path.display());
        }
    }
    Ok(())
}

/// Resolve input paths into the sorted list of Python files to process
///
/// Files are kept as-is (when they look like Python); directories are walked
/// with `.gitignore`, global gitignore and `.git/info/exclude` respected.
pub fn resolve_paths(paths: &[String], exclude: &[glob::Pattern]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for raw in paths {
        let expanded = shellexpand::tilde(raw);
        let path = PathBuf::from(expanded.as_ref());

        if path.is_file() {
            if is_python_file(&path) && !is_excluded(&path, &path, exclude) {
                files.push(path);
            }
            continue;
        }

        let walker = WalkBuilder::new(&path)
            .hidden(false)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .build();

        for entry in walker {
            let entry = entry?;
            let file = entry.path();

            if file.is_dir() {
                continue;
            }
            if is_python_file(file) && !is_excluded(file, &path, exclude) {
                files.push(file.to_path_buf());
            }
        }
    }

    // Sort and dedup for consistent processing
    files.sort();
    files.dedup();

    Ok(files)
}

/// Match a file against exclude globs, both relative to the walk root and by name
fn is_excluded(file: &Path, root: &Path, exclude: &[glob::Pattern]) -> bool {
    if exclude.is_empty() {
        return false;
    }

    let relative = file.strip_prefix(root).unwrap_or(file);
    let name = file.file_name().map(Path::new).unwrap_or(file);

    exclude
        .iter()
        .any(|p| p.matches_path(relative) || p.matches_path(name) || p.matches_path(file))
}

pub fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Write through a temp file in the same directory, then rename over the target
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
    tmp.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to replace {}", path.display()))?;

    Ok(())
}
