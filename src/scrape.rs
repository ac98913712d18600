//! Vendor documentation downloader.
//!
//! Walks the vendor's paginated documentation tree and mirrors every
//! document into `docs.output_dir` as markdown, preserving the tree's
//! path layout. Downloads run with bounded concurrency; a failure on one
//! document is reported and skipped, the run fails only when the tree
//! listing itself cannot be fetched.
//!
//! Requires the `DOCS_API_KEY` environment variable.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::config::Config;
use crate::http::send_with_retry;

/// One page of the documentation tree listing.
#[derive(Debug, Deserialize)]
struct TreePage {
    items: Vec<TreeItem>,
    next_page: Option<u32>,
}

/// One entry in the documentation tree.
#[derive(Debug, Clone, Deserialize)]
struct TreeItem {
    id: String,
    path: String,
    #[allow(dead_code)]
    title: String,
}

/// Full document payload.
#[derive(Debug, Deserialize)]
struct DocumentPayload {
    path: String,
    markdown: String,
}

pub async fn run_scrape(config: &Config, limit: Option<usize>) -> Result<()> {
    if config.docs.base_url.is_empty() {
        bail!("docs.base_url is not configured");
    }
    let api_key =
        std::env::var("DOCS_API_KEY").map_err(|_| anyhow::anyhow!("DOCS_API_KEY not set"))?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.docs.timeout_secs))
        .build()?;

    let mut items = list_tree(&client, config, &api_key).await?;
    let listed = items.len();
    if let Some(lim) = limit {
        items.truncate(lim);
    }

    std::fs::create_dir_all(&config.docs.output_dir).with_context(|| {
        format!(
            "Failed to create output dir: {}",
            config.docs.output_dir.display()
        )
    })?;

    let semaphore = Arc::new(Semaphore::new(config.docs.max_concurrency));
    let mut tasks = JoinSet::new();

    for item in items.iter().cloned() {
        let permit_sem = semaphore.clone();
        let client = client.clone();
        let api_key = api_key.clone();
        let base_url = config.docs.base_url.clone();
        let output_dir = config.docs.output_dir.clone();
        let max_retries = config.docs.max_retries;

        tasks.spawn(async move {
            let _permit = permit_sem.acquire_owned().await.expect("semaphore open");
            let result =
                download_document(&client, &base_url, &api_key, max_retries, &item, &output_dir)
                    .await;
            (item.path, result)
        });
    }

    let mut downloaded = 0u64;
    let mut failed = 0u64;

    while let Some(joined) = tasks.join_next().await {
        let (path, result) = joined?;
        match result {
            Ok(()) => downloaded += 1,
            Err(e) => {
                failed += 1;
                println!("  failed {}: {:#}", path, e);
            }
        }
    }

    println!("scrape {}", config.docs.base_url);
    println!("  documents listed: {}", listed);
    println!("  downloaded: {}", downloaded);
    println!("  failed: {}", failed);
    println!("  output: {}", config.docs.output_dir.display());
    println!("ok");

    Ok(())
}

/// Fetch the full documentation tree, following `next_page` until the
/// listing is exhausted.
async fn list_tree(client: &reqwest::Client, config: &Config, api_key: &str) -> Result<Vec<TreeItem>> {
    let mut items = Vec::new();
    let mut page = 1u32;

    loop {
        let url = format!("{}/v1/docs/tree", config.docs.base_url);
        let response = send_with_retry(config.docs.max_retries, || {
            client
                .get(&url)
                .query(&[("page", page)])
                .header("Authorization", format!("Bearer {}", api_key))
        })
        .await
        .with_context(|| format!("Failed to list docs tree (page {})", page))?;

        let tree: TreePage = response
            .json()
            .await
            .with_context(|| "Invalid docs tree response")?;

        items.extend(tree.items);

        match tree.next_page {
            Some(next) => page = next,
            None => break,
        }
    }

    Ok(items)
}

async fn download_document(
    client: &reqwest::Client,
    base_url: &str,
    api_key: &str,
    max_retries: u32,
    item: &TreeItem,
    output_dir: &Path,
) -> Result<()> {
    let url = format!("{}/v1/docs/{}", base_url, item.id);
    let response = send_with_retry(max_retries, || {
        client
            .get(&url)
            .header("Authorization", format!("Bearer {}", api_key))
    })
    .await?;

    let doc: DocumentPayload = response
        .json()
        .await
        .with_context(|| "Invalid document response")?;

    let target = doc_target_path(output_dir, &doc.path)?;
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&target, &doc.markdown)
        .with_context(|| format!("Failed to write {}", target.display()))?;

    Ok(())
}

/// Map a sanitized document path to its on-disk markdown file. The `.md`
/// suffix is appended, not substituted, so dotted paths like `guide.v1`
/// and `guide.v2` stay distinct on disk.
fn doc_target_path(output_dir: &Path, doc_path: &str) -> Result<PathBuf> {
    let relative = sanitize_doc_path(doc_path)?;
    let mut target = output_dir.join(relative);
    let file_name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.set_file_name(format!("{}.md", file_name));
    Ok(target)
}

/// Reject absolute paths and parent-directory components so a hostile
/// tree listing cannot escape the output directory.
fn sanitize_doc_path(path: &str) -> Result<PathBuf> {
    let candidate = PathBuf::from(path);
    if candidate.components().any(|c| {
        !matches!(c, Component::Normal(_))
    }) || path.is_empty()
    {
        bail!("Unsafe document path: {:?}", path);
    }
    Ok(candidate)
}
