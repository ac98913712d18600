//! xtable pseudo-table parser.
//!
//! The vendor documentation encodes metric tables in a private fenced
//! convention:
//!
//! ```text
//! Field{20%} | Type{10%} | Description{50%} | Detail{20%}
//! ---
//! field_name | string | a description | extra detail
//! #sub_heading_rows_keep_their_marker
//! ```
//!
//! The first non-blank line is the header line, the second is a separator
//! that is discarded without inspection, and everything after is a data
//! row. Cells are pipe-delimited; empty segments (from leading/trailing
//! pipes or all-whitespace cells) are discarded, so rows may be shorter
//! than the header list. Consumers index rows defensively.
//!
//! Sub-heading rows (`#`-prefixed) are parsed like any other row; their
//! marker stays in the first cell so the metric extractor and walker can
//! filter them.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::ParsedTable;

/// Column-width annotations embedded in header cells, e.g. `{20%}` or `{20}`.
static WIDTH_ANNOTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\d+%?\}").expect("valid regex"));

/// Parse the raw text between an ```` ```xtable ```` fence and its closing
/// fence (fences excluded) into headers and rows.
///
/// A block with no non-blank lines yields an empty table: no headers, no
/// rows. A block with only a header line yields headers and no rows.
pub fn parse_table(block: &str) -> ParsedTable {
    let lines: Vec<&str> = block.lines().filter(|l| !l.trim().is_empty()).collect();

    if lines.is_empty() {
        return ParsedTable::default();
    }

    let headers: Vec<String> = lines[0]
        .split('|')
        .map(|cell| WIDTH_ANNOTATION.replace_all(cell, "").trim().to_string())
        .filter(|cell| !cell.is_empty())
        .collect();

    // lines[1] is the separator; rows start at index 2.
    let mut rows = Vec::new();
    for line in lines.iter().skip(2) {
        let cells: Vec<String> = line
            .split('|')
            .map(|cell| cell.trim().to_string())
            .filter(|cell| !cell.is_empty())
            .collect();
        if !cells.is_empty() {
            rows.push(cells);
        }
    }

    ParsedTable { headers, rows }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_table() {
        let table = parse_table(
            "Field | Type | Description\n---\nvideo_views | number | Total views\n",
        );
        assert_eq!(table.headers, vec!["Field", "Type", "Description"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0], vec!["video_views", "number", "Total views"]);
    }

    #[test]
    fn test_width_annotations_stripped_from_headers() {
        let table = parse_table("Field{20%} | Type{10} | Description{50%}\n---\na | b | c\n");
        assert_eq!(table.headers, vec!["Field", "Type", "Description"]);
    }

    #[test]
    fn test_empty_block_yields_empty_table() {
        let table = parse_table("");
        assert!(table.headers.is_empty());
        assert!(table.rows.is_empty());

        let table = parse_table("\n   \n\t\n");
        assert!(table.headers.is_empty());
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_header_only_block_yields_no_rows() {
        let table = parse_table("Field | Type\n");
        assert_eq!(table.headers, vec!["Field", "Type"]);
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_leading_and_trailing_pipes_discarded() {
        let table = parse_table("| Field | Type |\n|---|---|\n| spend | number |\n");
        assert_eq!(table.headers, vec!["Field", "Type"]);
        assert_eq!(table.rows[0], vec!["spend", "number"]);
    }

    #[test]
    fn test_separator_line_always_discarded() {
        // The separator needs no particular shape.
        let table = parse_table("Field | Type\nanything at all here\nspend | number\n");
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0], vec!["spend", "number"]);
    }

    #[test]
    fn test_subheading_row_keeps_marker() {
        let table = parse_table("Field | Type\n---\n#Legacy Fields\nspend | number\n");
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0], vec!["#Legacy Fields"]);
    }

    #[test]
    fn test_short_rows_kept_without_padding() {
        let table = parse_table("Field | Type | Description\n---\nspend | number\n");
        assert_eq!(table.rows[0].len(), 2);
        assert_eq!(table.rows[0].get(2), None);
    }

    #[test]
    fn test_blank_lines_skipped() {
        let table = parse_table("Field | Type\n\n---\n\nspend | number\n\n");
        assert_eq!(table.headers, vec!["Field", "Type"]);
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn test_all_empty_cells_row_dropped() {
        let table = parse_table("Field | Type\n---\n |  | \nspend | number\n");
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0], vec!["spend", "number"]);
    }
}
