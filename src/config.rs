use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub docs: DocsConfig,
    #[serde(default)]
    pub vector_store: VectorStoreConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Vendor documentation API and local scrape output.
#[derive(Debug, Deserialize, Clone)]
pub struct DocsConfig {
    pub base_url: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            output_dir: default_output_dir(),
            include_globs: default_include_globs(),
            exclude_globs: Vec::new(),
            max_concurrency: default_max_concurrency(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./docs")
}
fn default_include_globs() -> Vec<String> {
    vec!["**/*.md".to_string()]
}
fn default_max_concurrency() -> usize {
    4
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    5
}

/// Hosted vector-search service (OpenAI vector stores API).
#[derive(Debug, Deserialize, Clone)]
pub struct VectorStoreConfig {
    #[serde(default = "default_store_base_url")]
    pub base_url: String,
    #[serde(default = "default_store_name")]
    pub store_name: String,
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_store_base_url(),
            store_name: default_store_name(),
            search_limit: default_search_limit(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_store_base_url() -> String {
    "https://api.openai.com".to_string()
}
fn default_store_name() -> String {
    "metrics-docs".to_string()
}
fn default_search_limit() -> usize {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7331".to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.docs.max_concurrency == 0 {
        anyhow::bail!("docs.max_concurrency must be >= 1");
    }

    if config.docs.timeout_secs == 0 || config.vector_store.timeout_secs == 0 {
        anyhow::bail!("timeout_secs must be >= 1");
    }

    if config.vector_store.store_name.is_empty() {
        anyhow::bail!("vector_store.store_name must not be empty");
    }

    if config.vector_store.search_limit == 0 {
        anyhow::bail!("vector_store.search_limit must be >= 1");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_gets_defaults() {
        let config: Config = toml::from_str(
            r#"
            [docs]
            base_url = "https://docs-api.example.com"
            "#,
        )
        .unwrap();
        assert_eq!(config.docs.output_dir, PathBuf::from("./docs"));
        assert_eq!(config.docs.include_globs, vec!["**/*.md"]);
        assert_eq!(config.docs.max_concurrency, 4);
        assert_eq!(config.vector_store.store_name, "metrics-docs");
        assert_eq!(config.vector_store.search_limit, 10);
        assert_eq!(config.server.bind, "127.0.0.1:7331");
    }

    #[test]
    fn test_empty_config_is_valid_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.docs.base_url.is_empty());
        assert_eq!(config.vector_store.base_url, "https://api.openai.com");
    }

    #[test]
    fn test_load_config_rejects_zero_concurrency() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "[docs]\nbase_url = \"x\"\nmax_concurrency = 0\n",
        )
        .unwrap();
        let err = load_config(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("max_concurrency"));
    }

    #[test]
    fn test_load_config_rejects_empty_store_name() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "[vector_store]\nstore_name = \"\"\n",
        )
        .unwrap();
        let err = load_config(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("store_name"));
    }
}
