//! Local markdown corpus scanning.
//!
//! Both the `extract` command and the vector-store uploader operate on the
//! scraped markdown tree; this module owns the walk. Include/exclude
//! globs come from `[docs]` config and results are sorted by relative
//! path for deterministic ordering.

use anyhow::{bail, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::DocsConfig;

/// A corpus file: path relative to the corpus root, plus absolute path.
#[derive(Debug, Clone)]
pub struct CorpusFile {
    pub relative: String,
    pub absolute: PathBuf,
}

/// Scan `root` for files matching the configured include/exclude globs.
pub fn scan_corpus(root: &Path, docs: &DocsConfig) -> Result<Vec<CorpusFile>> {
    if !root.exists() {
        bail!("Corpus directory does not exist: {}", root.display());
    }

    let include_set = build_globset(&docs.include_globs)?;

    let mut default_excludes = vec!["**/.git/**".to_string(), "**/.upload-manifest.json".to_string()];
    default_excludes.extend(docs.exclude_globs.clone());
    let exclude_set = build_globset(&default_excludes)?;

    let mut files = Vec::new();

    for entry in WalkDir::new(root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative.to_string_lossy().to_string();

        if exclude_set.is_match(&rel_str) {
            continue;
        }
        if !include_set.is_match(&rel_str) {
            continue;
        }

        files.push(CorpusFile {
            relative: rel_str,
            absolute: path.to_path_buf(),
        });
    }

    // Sort for deterministic ordering
    files.sort_by(|a, b| a.relative.cmp(&b.relative));

    Ok(files)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs_config() -> DocsConfig {
        DocsConfig::default()
    }

    #[test]
    fn test_scan_filters_and_sorts() {
        let tmp = tempfile::TempDir::new().unwrap();
        let root = tmp.path();
        std::fs::create_dir_all(root.join("nested")).unwrap();
        std::fs::write(root.join("b.md"), "b").unwrap();
        std::fs::write(root.join("a.md"), "a").unwrap();
        std::fs::write(root.join("notes.txt"), "skip").unwrap();
        std::fs::write(root.join("nested/c.md"), "c").unwrap();
        std::fs::write(root.join(".upload-manifest.json"), "{}").unwrap();

        let files = scan_corpus(root, &docs_config()).unwrap();
        let rels: Vec<&str> = files.iter().map(|f| f.relative.as_str()).collect();
        assert_eq!(rels, vec!["a.md", "b.md", "nested/c.md"]);
    }

    #[test]
    fn test_scan_missing_root_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let missing = tmp.path().join("nope");
        assert!(scan_corpus(&missing, &docs_config()).is_err());
    }
}
