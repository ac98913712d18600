//! Document walker: markdown content → ordered metric list.
//!
//! Scans a document line by line, tracking heading context, and delegates
//! each ```` ```xtable ```` block to the table parser and metric extractor.
//! Metrics come back in order of appearance and are not deduplicated.
//!
//! Heading context resets cascade downward only:
//!
//! | Line | Sets | Resets |
//! |------|------|--------|
//! | `# ` | category | subcategory → `"General"`, sub-subcategory, inline header |
//! | `## ` | subcategory | sub-subcategory, inline header |
//! | `### ` | sub-subcategory | inline header |
//!
//! An inline header is a table row carrying only a label in the field
//! column (no type value); it contributes no metric but stamps the
//! subcategory of the rows that follow. Note that it persists until the
//! next heading of any level or the next inline-header row — including
//! across table blocks. That scoping is intentional and matched to the
//! upstream catalog; do not narrow it to a single table without checking
//! downstream consumers.

use crate::metric::{extract_metric, resolve_columns};
use crate::models::Metric;
use crate::table::parse_table;

const DEFAULT_CONTEXT: &str = "General";

/// Heading context carried across the line scan.
#[derive(Debug, Clone)]
struct WalkerContext {
    category: String,
    subcategory: String,
    sub_subcategory: String,
    inline_header: String,
}

impl Default for WalkerContext {
    fn default() -> Self {
        Self {
            category: DEFAULT_CONTEXT.to_string(),
            subcategory: DEFAULT_CONTEXT.to_string(),
            sub_subcategory: String::new(),
            inline_header: String::new(),
        }
    }
}

impl WalkerContext {
    /// Compose the subcategory for the next emitted metric: subcategory,
    /// then `" - "`-joined sub-subcategory, then the inline header. When
    /// the composed value is still the literal default `"General"`, the
    /// inline header replaces it outright instead of being appended.
    fn effective_subcategory(&self) -> String {
        let mut sub = self.subcategory.clone();
        if !self.sub_subcategory.is_empty() {
            sub = format!("{} - {}", sub, self.sub_subcategory);
        }
        if !self.inline_header.is_empty() {
            if sub == DEFAULT_CONTEXT {
                sub = self.inline_header.clone();
            } else {
                sub = format!("{} - {}", sub, self.inline_header);
            }
        }
        sub
    }
}

/// Extract every metric from one markdown document.
///
/// Single synchronous pass; the returned order is the order of appearance
/// in the source. Malformed rows and blocks are skipped, never errors.
pub fn extract_metrics(content: &str) -> Vec<Metric> {
    let lines: Vec<&str> = content.lines().collect();
    let mut ctx = WalkerContext::default();
    let mut metrics = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];

        if let Some(rest) = line.strip_prefix("# ") {
            ctx.category = rest.trim().to_string();
            ctx.subcategory = DEFAULT_CONTEXT.to_string();
            ctx.sub_subcategory.clear();
            ctx.inline_header.clear();
        } else if let Some(rest) = line.strip_prefix("## ") {
            ctx.subcategory = rest.trim().to_string();
            ctx.sub_subcategory.clear();
            ctx.inline_header.clear();
        } else if let Some(rest) = line.strip_prefix("### ") {
            ctx.sub_subcategory = rest.trim().to_string();
            ctx.inline_header.clear();
        } else if line.contains("```xtable") {
            // Collect lines up to (not including) the closing fence; a
            // missing fence consumes to end of document.
            let start = i + 1;
            let mut end = start;
            while end < lines.len() && !lines[end].contains("```") {
                end += 1;
            }
            let block = lines[start..end].join("\n");
            walk_table_block(&block, &mut ctx, &mut metrics);
            i = end + 1;
            continue;
        }

        i += 1;
    }

    metrics
}

/// Run one parsed table block through inline-header detection and metric
/// extraction, appending emitted metrics.
fn walk_table_block(block: &str, ctx: &mut WalkerContext, metrics: &mut Vec<Metric>) {
    let table = parse_table(block);

    for row in &table.rows {
        // Inline-header check comes first: a usable field value with an
        // empty or absent type cell is a sub-grouping label, not a metric.
        let cols = resolve_columns(&table.headers);
        let field_value = cols
            .field
            .and_then(|idx| row.get(idx))
            .map(|c| c.trim())
            .unwrap_or("");
        let type_value = cols
            .metric_type
            .and_then(|idx| row.get(idx))
            .map(|c| c.trim())
            .unwrap_or("");

        if !field_value.is_empty() && !field_value.starts_with('#') && type_value.is_empty() {
            ctx.inline_header = field_value.to_string();
            continue;
        }

        let subcategory = ctx.effective_subcategory();
        if let Some(metric) = extract_metric(row, &table.headers, &ctx.category, &subcategory) {
            metrics.push(metric);
        }
    }
}
