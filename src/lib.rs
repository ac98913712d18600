//! # metrics-docs
//!
//! Scrapes a vendor's metric documentation, builds a normalized metric
//! catalog from its "xtable" pseudo-tables, and serves the corpus to LLM
//! clients through a hosted vector store and an MCP-compatible server.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌───────────────┐   ┌────────────────┐
//! │  Vendor API  │──▶│  Markdown      │──▶│  Hosted vector │
//! │  (scrape)    │   │  corpus (fs)   │   │  store (upload)│
//! └──────────────┘   └──────┬────────┘   └───────┬────────┘
//!                           │                    │
//!                           ▼                    ▼
//!                    ┌──────────────┐     ┌──────────────┐
//!                    │   Catalog    │     │  MCP server  │
//!                    │  (extract)   │     │ search/fetch │
//!                    └──────────────┘     └──────────────┘
//! ```
//!
//! The catalog pipeline (`table` → `metric` → `walker`) is the precise
//! part: a single-threaded, synchronous transform from markdown text to
//! metric records, permissive by design — malformed rows are skipped,
//! never raised as errors.
//!
//! ## Quick Start
//!
//! ```bash
//! mdocs scrape                        # mirror the vendor docs tree
//! mdocs extract --format report       # build the metric catalog
//! mdocs upload                        # push the corpus to the vector store
//! mdocs search "video engagement"     # query the hosted store
//! mdocs serve mcp                     # start the MCP tool server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`table`] | xtable pseudo-table parsing |
//! | [`metric`] | Row-to-metric extraction and deprecation markers |
//! | [`walker`] | Heading-context document walker |
//! | [`report`] | Grouped report and option-group views |
//! | [`scrape`] | Vendor documentation downloader |
//! | [`corpus`] | Local markdown corpus scanning |
//! | [`vector_store`] | Hosted vector-search client |
//! | [`server`] | MCP HTTP server |

pub mod config;
pub mod corpus;
pub mod extract_cmd;
pub mod http;
pub mod metric;
pub mod models;
pub mod report;
pub mod scrape;
pub mod server;
pub mod table;
pub mod vector_store;
pub mod walker;
