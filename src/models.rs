//! Core data models used throughout metrics-docs.
//!
//! These types represent the parsed tables, normalized metrics, and search
//! results that flow through the catalog and retrieval pipeline.

use serde::{Deserialize, Serialize};

/// Lifecycle status derived from inline markers in a raw field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeprecationStatus {
    Active,
    Deprecated,
    ToBeDeprecated,
}

/// Normalized metric record produced by the document walker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    /// Canonical metric name, deprecation marker stripped and trimmed.
    pub name: String,
    /// Nearest preceding top-level heading; `"General"` when none seen.
    pub category: String,
    /// Subcategory composed from `##` / `###` headings and any inline
    /// header, joined with `" - "`; `"General"` when none seen.
    pub subcategory: String,
    /// Value type from the table's type column; `"string"` when absent.
    #[serde(rename = "type")]
    pub metric_type: String,
    /// Text from the description column; empty when absent.
    pub description: String,
    /// Text from the detail/details column; empty when absent.
    pub commentary: String,
    pub deprecation_status: DeprecationStatus,
}

/// Intermediate result of parsing one xtable block: ordered headers
/// (width annotations stripped) and ordered rows of cell strings.
///
/// Rows are not validated against the header length; consumers index
/// with `row.get(i)` and treat out-of-range as "field absent".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// One selectable metric in a presentation-layer option group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricOption {
    pub label: String,
    pub value: String,
}

/// Options for one category, for dropdown-style consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionGroup {
    pub label: String,
    pub options: Vec<MetricOption>,
}

/// One hit returned by the hosted vector-store search.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub title: String,
    pub score: f64,
    pub snippet: String,
}

/// A full document fetched back from the hosted store.
#[derive(Debug, Clone, Serialize)]
pub struct FetchedDocument {
    pub id: String,
    pub title: String,
    pub text: String,
}
