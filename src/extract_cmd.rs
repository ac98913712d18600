//! The `extract` command: scraped markdown → metric catalog output.
//!
//! Walks the corpus directory in path order, runs the document walker
//! over every file, and concatenates the per-document metric lists into
//! one catalog. Output formats:
//!
//! | Format | Shape |
//! |--------|-------|
//! | `json` | flat metric array |
//! | `report` | category → subcategory → metrics |
//! | `options` | per-category label/value option groups |
//!
//! With `--output` the catalog is written to a file and a summary is
//! printed; without it the JSON goes to stdout unadorned so it can be
//! piped.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::corpus::scan_corpus;
use crate::models::Metric;
use crate::report::{category_report, option_groups};
use crate::walker::extract_metrics;

pub fn run_extract(
    config: &Config,
    input: Option<PathBuf>,
    format: &str,
    active_only: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    let root = input.unwrap_or_else(|| config.docs.output_dir.clone());
    let (metrics, file_count) = extract_dir(&root, config)?;

    let json = render(&metrics, format, active_only)?;

    match output {
        Some(path) => {
            std::fs::write(&path, &json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("extract {}", root.display());
            println!("  files scanned: {}", file_count);
            println!("  metrics: {}", metrics.len());
            println!("  wrote: {}", path.display());
            println!("ok");
        }
        None => println!("{}", json),
    }

    Ok(())
}

/// Extract the combined catalog from every markdown file under `root`.
pub fn extract_dir(root: &Path, config: &Config) -> Result<(Vec<Metric>, usize)> {
    let files = scan_corpus(root, &config.docs)?;
    let mut metrics = Vec::new();

    for file in &files {
        let content = std::fs::read_to_string(&file.absolute)
            .with_context(|| format!("Failed to read {}", file.absolute.display()))?;
        metrics.extend(extract_metrics(&content));
    }

    Ok((metrics, files.len()))
}

fn render(metrics: &[Metric], format: &str, active_only: bool) -> Result<String> {
    let value = match format {
        "json" => serde_json::to_value(metrics)?,
        "report" => serde_json::to_value(category_report(metrics))?,
        "options" => serde_json::to_value(option_groups(metrics, active_only))?,
        other => bail!("Unknown format: '{}'. Must be json, report, or options.", other),
    };
    Ok(serde_json::to_string_pretty(&value)?)
}
