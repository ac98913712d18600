//! # metrics-docs CLI (`mdocs`)
//!
//! The `mdocs` binary drives the full pipeline: scraping the vendor
//! documentation tree, building the metric catalog, uploading the corpus
//! to the hosted vector store, querying it, and serving the MCP tools.
//!
//! ## Usage
//!
//! ```bash
//! mdocs --config ./mdocs.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `mdocs scrape` | Mirror the vendor docs tree into the output directory |
//! | `mdocs extract` | Build the metric catalog from scraped markdown |
//! | `mdocs upload` | Upload changed markdown files to the vector store |
//! | `mdocs search "<query>"` | Query the hosted vector store |
//! | `mdocs fetch <id>` | Print a full document by file id |
//! | `mdocs serve mcp` | Start the MCP-compatible HTTP server |

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use metrics_docs::{config, extract_cmd, scrape, server, vector_store};

/// metrics-docs CLI — scrape vendor metric documentation, build a
/// normalized metric catalog, and serve it via hosted vector search.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `mdocs.example.toml` for a full example. API keys come from
/// the environment: `DOCS_API_KEY` for scraping, `OPENAI_API_KEY` for the
/// vector store.
#[derive(Parser)]
#[command(
    name = "mdocs",
    about = "Scrape vendor metric docs, build a metric catalog, and serve it to LLM clients",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./mdocs.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Mirror the vendor documentation tree into the output directory.
    ///
    /// Walks the paginated tree listing, downloads every document with
    /// bounded concurrency, and writes markdown files preserving the
    /// tree's path layout. Requires `DOCS_API_KEY`.
    Scrape {
        /// Maximum number of documents to download.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Build the metric catalog from scraped markdown.
    ///
    /// Parses every xtable block, resolves heading context, and emits the
    /// normalized metric list. Runs entirely offline.
    Extract {
        /// Directory to scan (defaults to `docs.output_dir`).
        #[arg(long)]
        input: Option<PathBuf>,

        /// Output shape: `json` (flat array), `report` (grouped by
        /// category/subcategory), or `options` (label/value groups).
        #[arg(long, default_value = "json")]
        format: String,

        /// With `--format options`, keep only active metrics.
        #[arg(long)]
        active_only: bool,

        /// Write to a file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Upload changed markdown files to the hosted vector store.
    ///
    /// Resolves the configured store by name (creating it when absent)
    /// and uploads files whose content hash changed since the last run.
    /// Requires `OPENAI_API_KEY`.
    Upload,

    /// Query the hosted vector store.
    Search {
        /// The search query string.
        query: String,

        /// Maximum number of results to return.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Print a full document by its vector-store file id.
    Fetch {
        /// File id from a search result.
        id: String,
    },

    /// Start the MCP-compatible HTTP server.
    ///
    /// Exposes `search` and `fetch` tools over a JSON API for
    /// integration with Cursor, Claude, and other MCP clients.
    Serve {
        #[command(subcommand)]
        service: ServeService,
    },
}

/// Server subcommands.
#[derive(Subcommand)]
enum ServeService {
    /// Start the MCP tool server on `[server].bind`.
    Mcp,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Scrape { limit } => {
            scrape::run_scrape(&cfg, limit).await?;
        }
        Commands::Extract {
            input,
            format,
            active_only,
            output,
        } => {
            extract_cmd::run_extract(&cfg, input, &format, active_only, output)?;
        }
        Commands::Upload => {
            vector_store::run_upload(&cfg).await?;
        }
        Commands::Search { query, limit } => {
            vector_store::run_search(&cfg, &query, limit).await?;
        }
        Commands::Fetch { id } => {
            vector_store::run_fetch(&cfg, &id).await?;
        }
        Commands::Serve { service } => match service {
            ServeService::Mcp => {
                server::run_server(&cfg).await?;
            }
        },
    }

    Ok(())
}
