use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn mdocs_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("mdocs");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let docs_dir = root.join("docs");
    fs::create_dir_all(docs_dir.join("metrics")).unwrap();

    fs::write(
        docs_dir.join("metrics/engagement.md"),
        "\
# Engagement
## Video Metrics
```xtable
Field{20%} | Type{10%} | Description{50%} | Detail{20%}
---
video_views | number | Total views | Lifetime count
#Legacy Fields
total_comments {-deprecated} | number | Total comments | Includes replies
```
",
    )
    .unwrap();

    fs::write(
        docs_dir.join("metrics/reach.md"),
        "\
# Reach
```xtable
Field | Type | Description
---
Paid
impressions | number | Impression count
reach {-To be deprecated} | number | Unique accounts reached
```
",
    )
    .unwrap();

    // Non-markdown files are ignored by the corpus scan.
    fs::write(docs_dir.join("notes.txt"), "not markdown").unwrap();

    let config_content = format!(
        r#"[docs]
base_url = "https://docs-api.example.com"
output_dir = "{}/docs"

[server]
bind = "127.0.0.1:7331"
"#,
        root.display()
    );

    let config_path = root.join("mdocs.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_mdocs(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = mdocs_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run mdocs binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

#[test]
fn test_extract_json_catalog() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_mdocs(&config_path, &["extract"]);
    assert!(success, "extract failed: stdout={}, stderr={}", stdout, stderr);

    let metrics: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let metrics = metrics.as_array().unwrap();
    assert_eq!(metrics.len(), 4);

    // Files are scanned in path order: engagement.md before reach.md.
    assert_eq!(metrics[0]["name"], "video_views");
    assert_eq!(metrics[0]["category"], "Engagement");
    assert_eq!(metrics[0]["subcategory"], "Video Metrics");
    assert_eq!(metrics[0]["type"], "number");
    assert_eq!(metrics[0]["commentary"], "Lifetime count");
    assert_eq!(metrics[0]["deprecationStatus"], "active");

    // The #Legacy Fields sub-heading row is dropped; the deprecated
    // marker is stripped from the name.
    assert_eq!(metrics[1]["name"], "total_comments");
    assert_eq!(metrics[1]["deprecationStatus"], "deprecated");
    assert_eq!(metrics[1]["subcategory"], "Video Metrics");

    // "Paid" is an inline header: no metric, but it stamps the rows below.
    assert_eq!(metrics[2]["name"], "impressions");
    assert_eq!(metrics[2]["category"], "Reach");
    assert_eq!(metrics[2]["subcategory"], "Paid");

    assert_eq!(metrics[3]["name"], "reach");
    assert_eq!(metrics[3]["deprecationStatus"], "to_be_deprecated");
}

#[test]
fn test_extract_report_grouping() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_mdocs(&config_path, &["extract", "--format", "report"]);
    assert!(success);

    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["Engagement"]["Video Metrics"].as_array().unwrap().len(), 2);
    assert_eq!(report["Reach"]["Paid"].as_array().unwrap().len(), 2);
}

#[test]
fn test_extract_options_active_only() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_mdocs(
        &config_path,
        &["extract", "--format", "options", "--active-only"],
    );
    assert!(success);

    let groups: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let groups = groups.as_array().unwrap();
    assert_eq!(groups.len(), 2);

    // Deprecated and to-be-deprecated metrics are filtered out.
    assert_eq!(groups[0]["label"], "Engagement");
    assert_eq!(groups[0]["options"].as_array().unwrap().len(), 1);
    assert_eq!(groups[0]["options"][0]["value"], "video_views");
    assert_eq!(groups[1]["label"], "Reach");
    assert_eq!(groups[1]["options"][0]["value"], "impressions");
}

#[test]
fn test_extract_output_file_with_summary() {
    let (tmp, config_path) = setup_test_env();
    let out_path = tmp.path().join("catalog.json");

    let (stdout, _, success) = run_mdocs(
        &config_path,
        &["extract", "--output", out_path.to_str().unwrap()],
    );
    assert!(success);
    assert!(stdout.contains("files scanned: 2"));
    assert!(stdout.contains("metrics: 4"));
    assert!(stdout.contains("ok"));

    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out_path).unwrap()).unwrap();
    assert_eq!(written.as_array().unwrap().len(), 4);
}

#[test]
fn test_extract_unknown_format_fails() {
    let (_tmp, config_path) = setup_test_env();

    let (_, stderr, success) = run_mdocs(&config_path, &["extract", "--format", "csv"]);
    assert!(!success);
    assert!(stderr.contains("Unknown format"));
}

#[test]
fn test_extract_missing_input_dir_fails() {
    let (tmp, config_path) = setup_test_env();
    let missing = tmp.path().join("nope");

    let (_, stderr, success) = run_mdocs(
        &config_path,
        &["extract", "--input", missing.to_str().unwrap()],
    );
    assert!(!success);
    assert!(stderr.contains("does not exist"));
}
