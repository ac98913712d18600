//! Derived views over the metric catalog.
//!
//! The walker's flat metric list feeds two presentation surfaces: a
//! grouped-by-category JSON report and flattened label/value option
//! groups for dropdown-style consumers. Grouping is category then
//! subcategory; keys iterate in sorted order, which keeps reports
//! diffable across runs.

use std::collections::BTreeMap;

use crate::models::{DeprecationStatus, Metric, MetricOption, OptionGroup};

/// Metrics grouped by category, then subcategory.
pub type CategoryReport = BTreeMap<String, BTreeMap<String, Vec<Metric>>>;

/// Group metrics by category then subcategory, preserving within-group
/// order of appearance.
pub fn category_report(metrics: &[Metric]) -> CategoryReport {
    let mut report: CategoryReport = BTreeMap::new();
    for metric in metrics {
        report
            .entry(metric.category.clone())
            .or_default()
            .entry(metric.subcategory.clone())
            .or_default()
            .push(metric.clone());
    }
    report
}

/// Flatten metrics into per-category option groups.
///
/// With `active_only`, deprecated and to-be-deprecated metrics are
/// filtered out; a category whose metrics are all filtered produces no
/// group.
pub fn option_groups(metrics: &[Metric], active_only: bool) -> Vec<OptionGroup> {
    let mut groups: BTreeMap<String, Vec<MetricOption>> = BTreeMap::new();
    for metric in metrics {
        if active_only && metric.deprecation_status != DeprecationStatus::Active {
            continue;
        }
        groups
            .entry(metric.category.clone())
            .or_default()
            .push(MetricOption {
                label: format!("{} ({})", metric.name, metric.subcategory),
                value: metric.name.clone(),
            });
    }
    groups
        .into_iter()
        .map(|(label, options)| OptionGroup { label, options })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metric(name: &str, category: &str, subcategory: &str, status: DeprecationStatus) -> Metric {
        Metric {
            name: name.to_string(),
            category: category.to_string(),
            subcategory: subcategory.to_string(),
            metric_type: "number".to_string(),
            description: String::new(),
            commentary: String::new(),
            deprecation_status: status,
        }
    }

    #[test]
    fn test_report_groups_by_category_then_subcategory() {
        let metrics = vec![
            metric("spend", "Ads", "Paid", DeprecationStatus::Active),
            metric("reach", "Ads", "Organic", DeprecationStatus::Active),
            metric("views", "Video", "General", DeprecationStatus::Active),
            metric("cpc", "Ads", "Paid", DeprecationStatus::Active),
        ];
        let report = category_report(&metrics);
        assert_eq!(report.len(), 2);
        assert_eq!(report["Ads"]["Paid"].len(), 2);
        assert_eq!(report["Ads"]["Paid"][0].name, "spend");
        assert_eq!(report["Ads"]["Paid"][1].name, "cpc");
        assert_eq!(report["Video"]["General"].len(), 1);
    }

    #[test]
    fn test_report_serializes_to_grouped_json() {
        let metrics = vec![metric("spend", "Ads", "Paid", DeprecationStatus::Active)];
        let json = serde_json::to_value(category_report(&metrics)).unwrap();
        assert_eq!(json["Ads"]["Paid"][0]["name"], "spend");
        assert_eq!(json["Ads"]["Paid"][0]["deprecationStatus"], "active");
    }

    #[test]
    fn test_option_groups_all_metrics() {
        let metrics = vec![
            metric("spend", "Ads", "Paid", DeprecationStatus::Deprecated),
            metric("reach", "Ads", "Organic", DeprecationStatus::Active),
        ];
        let groups = option_groups(&metrics, false);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].label, "Ads");
        assert_eq!(groups[0].options.len(), 2);
        assert_eq!(groups[0].options[0].label, "spend (Paid)");
        assert_eq!(groups[0].options[0].value, "spend");
    }

    #[test]
    fn test_option_groups_active_only() {
        let metrics = vec![
            metric("spend", "Ads", "Paid", DeprecationStatus::Deprecated),
            metric("reach", "Ads", "Organic", DeprecationStatus::ToBeDeprecated),
            metric("views", "Video", "General", DeprecationStatus::Active),
        ];
        let groups = option_groups(&metrics, true);
        // The all-deprecated "Ads" category drops out entirely.
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].label, "Video");
        assert_eq!(groups[0].options[0].value, "views");
    }
}
