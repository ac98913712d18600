//! Hosted vector-search client (OpenAI vector stores API).
//!
//! The scraped markdown corpus is uploaded into a named vector store and
//! queried through the store's search endpoint; `fetch` pulls a full
//! document back by file id. Uploads are incremental: a manifest beside
//! the corpus records the content hash and file id of every uploaded
//! file, and unchanged files are skipped on re-upload.
//!
//! Requires the `OPENAI_API_KEY` environment variable. All calls carry
//! the `OpenAI-Beta: assistants=v2` header and the shared retry policy.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::{Config, VectorStoreConfig};
use crate::corpus::scan_corpus;
use crate::http::send_with_retry;
use crate::models::{FetchedDocument, SearchHit};

const MANIFEST_FILENAME: &str = ".upload-manifest.json";

/// Client bound to one resolved vector store.
pub struct VectorStoreClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    store_id: String,
    max_retries: u32,
}

/// Per-corpus upload bookkeeping, stored beside the markdown files.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UploadManifest {
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub files: BTreeMap<String, ManifestEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub sha256: String,
    pub file_id: String,
}

impl VectorStoreClient {
    /// Connect to the configured service and resolve the store named in
    /// config, creating it when absent.
    pub async fn connect(config: &Config) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY not set"))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.vector_store.timeout_secs))
            .build()?;

        let store_id = ensure_store(&client, &config.vector_store, &api_key).await?;

        Ok(Self {
            client,
            base_url: config.vector_store.base_url.clone(),
            api_key,
            store_id,
            max_retries: config.vector_store.max_retries,
        })
    }

    pub fn store_id(&self) -> &str {
        &self.store_id
    }

    /// Upload every corpus file whose content hash is new or changed.
    /// Returns (uploaded, skipped) counts and rewrites the manifest.
    pub async fn upload_dir(&self, config: &Config) -> Result<(u64, u64)> {
        let root = &config.docs.output_dir;
        let files = scan_corpus(root, &config.docs)?;
        let mut manifest = load_manifest(root)?;

        let mut uploaded = 0u64;
        let mut skipped = 0u64;

        for file in &files {
            let content = std::fs::read(&file.absolute)
                .with_context(|| format!("Failed to read {}", file.absolute.display()))?;
            let hash = sha256_hex(&content);

            if let Some(entry) = manifest.files.get(&file.relative) {
                if entry.sha256 == hash {
                    skipped += 1;
                    continue;
                }
                // Stale version in the store; detach best-effort before
                // uploading the replacement.
                self.remove_file(&entry.file_id).await;
            }

            let file_id = match self.upload_file(&file.relative, content).await {
                Ok(id) => id,
                Err(e) => {
                    // Persist what succeeded so far; otherwise files already
                    // uploaded this run would be re-uploaded (and orphaned in
                    // the hosted store) on the next attempt.
                    manifest.updated_at = Some(Utc::now());
                    let _ = save_manifest(root, &manifest);
                    return Err(e);
                }
            };
            manifest.files.insert(
                file.relative.clone(),
                ManifestEntry {
                    sha256: hash,
                    file_id,
                },
            );
            uploaded += 1;
        }

        manifest.updated_at = Some(Utc::now());
        save_manifest(root, &manifest)?;

        Ok((uploaded, skipped))
    }

    /// Upload one file and attach it to the store. Returns the file id.
    async fn upload_file(&self, filename: &str, content: Vec<u8>) -> Result<String> {
        // The multipart form is rebuilt per retry attempt.
        let upload_name = filename.replace('/', "__");
        let url = format!("{}/v1/files", self.base_url);
        let response = send_with_retry(self.max_retries, || {
            let part =
                reqwest::multipart::Part::bytes(content.clone()).file_name(upload_name.clone());
            let form = reqwest::multipart::Form::new()
                .text("purpose", "assistants")
                .part("file", part);
            self.request(reqwest::Method::POST, &url).multipart(form)
        })
        .await
        .with_context(|| format!("Failed to upload {}", filename))?;

        let json: serde_json::Value = response.json().await?;
        let file_id = json
            .get("id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow::anyhow!("Invalid file upload response: missing id"))?
            .to_string();

        let attach_url = format!("{}/v1/vector_stores/{}/files", self.base_url, self.store_id);
        let body = serde_json::json!({ "file_id": file_id });
        send_with_retry(self.max_retries, || {
            self.request(reqwest::Method::POST, &attach_url).json(&body)
        })
        .await
        .with_context(|| format!("Failed to attach {} to vector store", filename))?;

        Ok(file_id)
    }

    /// Detach and delete a previously uploaded file. Best-effort: a
    /// failure here only leaves an orphan behind in the hosted store.
    async fn remove_file(&self, file_id: &str) {
        let detach_url = format!(
            "{}/v1/vector_stores/{}/files/{}",
            self.base_url, self.store_id, file_id
        );
        let _ = send_with_retry(0, || self.request(reqwest::Method::DELETE, &detach_url)).await;

        let delete_url = format!("{}/v1/files/{}", self.base_url, file_id);
        let _ = send_with_retry(0, || self.request(reqwest::Method::DELETE, &delete_url)).await;
    }

    /// Query the store. Returns ranked hits with content snippets.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let url = format!("{}/v1/vector_stores/{}/search", self.base_url, self.store_id);
        let body = serde_json::json!({
            "query": query,
            "max_num_results": limit,
        });

        let response = send_with_retry(self.max_retries, || {
            self.request(reqwest::Method::POST, &url).json(&body)
        })
        .await
        .with_context(|| "Vector store search failed")?;

        let json: serde_json::Value = response.json().await?;
        parse_search_response(&json)
    }

    /// Fetch one document back by file id: metadata, then content.
    pub async fn fetch(&self, file_id: &str) -> Result<FetchedDocument> {
        let meta_url = format!("{}/v1/files/{}", self.base_url, file_id);
        let response = send_with_retry(self.max_retries, || {
            self.request(reqwest::Method::GET, &meta_url)
        })
        .await
        .with_context(|| format!("File not found: {}", file_id))?;
        let meta: serde_json::Value = response.json().await?;
        let title = meta
            .get("filename")
            .and_then(|v| v.as_str())
            .unwrap_or(file_id)
            .to_string();

        let content_url = format!("{}/v1/files/{}/content", self.base_url, file_id);
        let response = send_with_retry(self.max_retries, || {
            self.request(reqwest::Method::GET, &content_url)
        })
        .await
        .with_context(|| format!("Failed to fetch content for {}", file_id))?;
        let text = response.text().await?;

        Ok(FetchedDocument {
            id: file_id.to_string(),
            title,
            text,
        })
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("OpenAI-Beta", "assistants=v2")
    }
}

/// Find the store by name, creating it when absent. Returns the store id.
async fn ensure_store(
    client: &reqwest::Client,
    config: &VectorStoreConfig,
    api_key: &str,
) -> Result<String> {
    let authed = |method: reqwest::Method, url: &str| {
        client
            .request(method, url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("OpenAI-Beta", "assistants=v2")
    };

    let mut after: Option<String> = None;
    loop {
        let url = format!("{}/v1/vector_stores", config.base_url);
        let after_param = after.clone();
        let response = send_with_retry(config.max_retries, || {
            let mut req = authed(reqwest::Method::GET, &url).query(&[("limit", "100")]);
            if let Some(cursor) = &after_param {
                req = req.query(&[("after", cursor.as_str())]);
            }
            req
        })
        .await
        .with_context(|| "Failed to list vector stores")?;

        let json: serde_json::Value = response.json().await?;
        let stores = json
            .get("data")
            .and_then(|d| d.as_array())
            .ok_or_else(|| anyhow::anyhow!("Invalid vector store list response"))?;

        for store in stores {
            let name = store.get("name").and_then(|v| v.as_str()).unwrap_or("");
            if name == config.store_name {
                let id = store
                    .get("id")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| anyhow::anyhow!("Vector store entry missing id"))?;
                return Ok(id.to_string());
            }
        }

        let has_more = json.get("has_more").and_then(|v| v.as_bool()).unwrap_or(false);
        if !has_more {
            break;
        }
        after = json
            .get("last_id")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());
        if after.is_none() {
            break;
        }
    }

    // Not found — create it.
    let url = format!("{}/v1/vector_stores", config.base_url);
    let body = serde_json::json!({ "name": config.store_name });
    let response = send_with_retry(config.max_retries, || {
        authed(reqwest::Method::POST, &url).json(&body)
    })
    .await
    .with_context(|| format!("Failed to create vector store '{}'", config.store_name))?;

    let json: serde_json::Value = response.json().await?;
    json.get("id")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| anyhow::anyhow!("Invalid vector store create response: missing id"))
}

/// Parse the store's search response into [`SearchHit`]s.
///
/// Missing fields degrade to defaults instead of failing the whole
/// response; hosted-API payloads have grown fields before.
fn parse_search_response(json: &serde_json::Value) -> Result<Vec<SearchHit>> {
    let data = json
        .get("data")
        .and_then(|d| d.as_array())
        .ok_or_else(|| anyhow::anyhow!("Invalid search response: missing data array"))?;

    let mut hits = Vec::with_capacity(data.len());
    for item in data {
        let id = item
            .get("file_id")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let title = item
            .get("filename")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let score = item.get("score").and_then(|v| v.as_f64()).unwrap_or(0.0);

        let snippet = item
            .get("content")
            .and_then(|c| c.as_array())
            .map(|chunks| {
                chunks
                    .iter()
                    .filter_map(|chunk| chunk.get("text").and_then(|t| t.as_str()))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default();

        hits.push(SearchHit {
            id,
            title,
            score,
            snippet,
        });
    }

    Ok(hits)
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

fn manifest_path(root: &Path) -> PathBuf {
    root.join(MANIFEST_FILENAME)
}

pub fn load_manifest(root: &Path) -> Result<UploadManifest> {
    let path = manifest_path(root);
    if !path.exists() {
        return Ok(UploadManifest::default());
    }
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let manifest = serde_json::from_str(&content)
        .with_context(|| format!("Invalid upload manifest: {}", path.display()))?;
    Ok(manifest)
}

pub fn save_manifest(root: &Path, manifest: &UploadManifest) -> Result<()> {
    let path = manifest_path(root);
    let content = serde_json::to_string_pretty(manifest)?;
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Run the `upload` command: connect, upload the corpus, print a summary.
pub async fn run_upload(config: &Config) -> Result<()> {
    let client = VectorStoreClient::connect(config).await?;
    let (uploaded, skipped) = client.upload_dir(config).await?;

    println!("upload {}", config.vector_store.store_name);
    println!("  store id: {}", client.store_id());
    println!("  uploaded: {}", uploaded);
    println!("  skipped (unchanged): {}", skipped);
    println!("ok");

    Ok(())
}

/// Run the `search` command against the hosted store.
pub async fn run_search(config: &Config, query: &str, limit: Option<usize>) -> Result<()> {
    let limit = limit.unwrap_or(config.vector_store.search_limit);
    let client = VectorStoreClient::connect(config).await?;
    let hits = client.search(query, limit).await?;

    println!("search \"{}\"", query);
    println!("  results: {}", hits.len());
    for hit in &hits {
        println!("  [{:.3}] {} ({})", hit.score, hit.title, hit.id);
        for line in hit.snippet.lines().take(2) {
            println!("      {}", line);
        }
    }

    Ok(())
}

/// Run the `fetch` command: print one document by file id.
pub async fn run_fetch(config: &Config, file_id: &str) -> Result<()> {
    let client = VectorStoreClient::connect(config).await?;
    let doc = client.fetch(file_id).await?;

    println!("# {} ({})", doc.title, doc.id);
    println!("{}", doc.text);

    Ok(())
}
