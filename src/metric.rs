//! Row-to-metric extraction.
//!
//! Turns one parsed table row into zero or one [`Metric`]. Column positions
//! are resolved per row by fuzzy case-insensitive substring match against
//! canonical fragments (`field`, `type`, `description`, `detail`), since
//! header lists legitimately differ per table block. Malformed rows are
//! skipped, never raised as errors; source tables are inconsistently
//! formatted and the pipeline is best-effort by design.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{DeprecationStatus, Metric};

static TO_BE_DEPRECATED_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\{-to be deprecated\}").expect("valid regex"));
static DEPRECATED_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\{-deprecated\}").expect("valid regex"));

/// Resolved column positions for one table's header list.
///
/// `None` means no header matched the fragment; consumers treat the
/// column as absent and fall back to defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndices {
    pub field: Option<usize>,
    pub metric_type: Option<usize>,
    pub description: Option<usize>,
    pub detail: Option<usize>,
}

/// Resolve column indices against a header list.
///
/// Each fragment matches the first header (scanning left to right) whose
/// lowercase text contains it. Substring matching is deliberate: headers
/// like `"Field Name{20%}"` or `"Details"` still resolve. It also means a
/// header literally named `"Subtype"` matches `type`; first-match order is
/// canonical.
pub fn resolve_columns(headers: &[String]) -> ColumnIndices {
    ColumnIndices {
        field: find_column(headers, "field"),
        metric_type: find_column(headers, "type"),
        description: find_column(headers, "description"),
        detail: find_column(headers, "detail"),
    }
}

fn find_column(headers: &[String], fragment: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.to_lowercase().contains(fragment))
}

/// Parse inline deprecation markers out of a raw field name.
///
/// `{-To be deprecated}` is checked before `{-deprecated}`; matching is
/// case-insensitive and substring-anywhere. The marker is stripped and the
/// remainder trimmed. A name without markers comes back trimmed with
/// [`DeprecationStatus::Active`].
pub fn parse_deprecation_status(raw_name: &str) -> (String, DeprecationStatus) {
    if TO_BE_DEPRECATED_MARKER.is_match(raw_name) {
        let clean = TO_BE_DEPRECATED_MARKER.replace(raw_name, "");
        return (clean.trim().to_string(), DeprecationStatus::ToBeDeprecated);
    }
    if DEPRECATED_MARKER.is_match(raw_name) {
        let clean = DEPRECATED_MARKER.replace(raw_name, "");
        return (clean.trim().to_string(), DeprecationStatus::Deprecated);
    }
    (raw_name.trim().to_string(), DeprecationStatus::Active)
}

/// Extract a metric from one table row, or `None` when the row is a
/// sub-heading or malformed.
///
/// Rejection order matters: the field column must resolve and the field
/// cell must exist before the cell's text is inspected.
pub fn extract_metric(
    row: &[String],
    headers: &[String],
    category: &str,
    subcategory: &str,
) -> Option<Metric> {
    let cols = resolve_columns(headers);

    let field_idx = cols.field?;
    let raw_field = row.get(field_idx)?;

    let field = raw_field.trim();
    if field.starts_with('#') || field.is_empty() || row.len() < 3 {
        return None;
    }

    let (name, deprecation_status) = parse_deprecation_status(field);

    Some(Metric {
        name,
        category: category.to_string(),
        subcategory: subcategory.to_string(),
        metric_type: cell_or(row, cols.metric_type, "string"),
        description: cell_or(row, cols.description, ""),
        commentary: cell_or(row, cols.detail, ""),
        deprecation_status,
    })
}

/// Fetch a cell by optional index, falling back to `default` when the
/// column is unresolved, the row is too short, or the cell is empty.
fn cell_or(row: &[String], idx: Option<usize>, default: &str) -> String {
    idx.and_then(|i| row.get(i))
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .unwrap_or(default)
        .to_string()
}
