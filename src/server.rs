//! MCP-compatible HTTP server.
//!
//! Exposes the hosted vector store to LLM clients through the two tools
//! the MCP retrieval convention expects:
//!
//! | Tool | Parameters | Behavior |
//! |------|------------|----------|
//! | `search` | `query` (required), `limit` | ranked hits from the vector store |
//! | `fetch` | `id` (required) | full document text by file id |
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/tools/list` | List tools with parameter schemas |
//! | `POST` | `/tools/{name}` | Call a tool by name |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! All error responses use the envelope
//! `{ "error": { "code": "...", "message": "..." } }` with codes
//! `bad_request` (400), `not_found` (404), `timeout` (408),
//! `tool_error` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted to support
//! browser-based clients and cross-origin MCP tool calls.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::vector_store::VectorStoreClient;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    store: Arc<VectorStoreClient>,
}

/// Starts the MCP-compatible HTTP server.
///
/// Resolves the configured vector store once at startup, binds to
/// `[server].bind`, and serves until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let store = VectorStoreClient::connect(config).await?;

    let state = AppState {
        config: Arc::new(config.clone()),
        store: Arc::new(store),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/tools/list", get(handle_list_tools))
        .route("/tools/{name}", post(handle_tool_call))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state);

    println!("MCP server listening on http://{}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g., `"bad_request"`, `"not_found"`).
    code: String,
    /// Human-readable error message.
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

fn timeout_error(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::REQUEST_TIMEOUT,
        code: "timeout".to_string(),
        message: message.into(),
    }
}

fn tool_error(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "tool_error".to_string(),
        message: message.into(),
    }
}

/// Map an upstream failure to the most appropriate HTTP status.
/// "not found" messages surface as 404 so clients can distinguish a bad
/// file id from a vector-store outage; upstream timeouts surface as 408.
fn classify_tool_error(tool_name: &str, err: anyhow::Error) -> AppError {
    let msg = format!("{:#}", err);

    if msg.contains("not found") || msg.contains("File not found") {
        not_found(format!("{}: {}", tool_name, msg))
    } else if msg.contains("timed out") {
        timeout_error(format!("{}: {}", tool_name, msg))
    } else {
        tool_error(format!("{}: {}", tool_name, msg))
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET /tools/list ============

#[derive(Serialize)]
struct ToolInfo {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Serialize)]
struct ToolListResponse {
    tools: Vec<ToolInfo>,
}

/// Returns the two built-in tools with OpenAI function-calling style
/// parameter schemas.
async fn handle_list_tools(State(state): State<AppState>) -> Json<ToolListResponse> {
    let tools = vec![
        ToolInfo {
            name: "search".to_string(),
            description: format!(
                "Search the '{}' documentation vector store",
                state.config.vector_store.store_name
            ),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Search query" },
                    "limit": { "type": "integer", "description": "Maximum number of results" }
                },
                "required": ["query"]
            }),
        },
        ToolInfo {
            name: "fetch".to_string(),
            description: "Fetch a full documentation page by its file id".to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "id": { "type": "string", "description": "File id from a search result" }
                },
                "required": ["id"]
            }),
        },
    ];

    Json(ToolListResponse { tools })
}

// ============ POST /tools/{name} ============

/// Unified tool dispatch: `search` and `fetch` proxy straight through to
/// the vector-store client.
async fn handle_tool_call(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(params): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, AppError> {
    match name.as_str() {
        "search" => {
            let query = params
                .get("query")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .trim();
            if query.is_empty() {
                return Err(bad_request("query must not be empty"));
            }
            let limit = params
                .get("limit")
                .and_then(|v| v.as_u64())
                .map(|v| v as usize)
                .unwrap_or(state.config.vector_store.search_limit);

            let hits = state
                .store
                .search(query, limit)
                .await
                .map_err(|e| classify_tool_error("search", e))?;

            Ok(Json(serde_json::json!({ "result": { "results": hits } })))
        }
        "fetch" => {
            let id = params.get("id").and_then(|v| v.as_str()).unwrap_or("").trim();
            if id.is_empty() {
                return Err(bad_request("id must not be empty"));
            }

            let doc = state
                .store
                .fetch(id)
                .await
                .map_err(|e| classify_tool_error("fetch", e))?;

            Ok(Json(serde_json::json!({ "result": doc })))
        }
        other => Err(not_found(format!("no tool registered with name: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_not_found_maps_to_404() {
        let err = classify_tool_error("fetch", anyhow::anyhow!("File not found: file-x"));
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.code, "not_found");
        assert!(err.message.contains("fetch"));
    }

    #[test]
    fn test_classify_timed_out_maps_to_408_timeout() {
        let err = classify_tool_error("search", anyhow::anyhow!("operation timed out"));
        assert_eq!(err.status, StatusCode::REQUEST_TIMEOUT);
        assert_eq!(err.code, "timeout");
    }

    #[test]
    fn test_classify_other_failures_map_to_500_tool_error() {
        let err = classify_tool_error("search", anyhow::anyhow!("connection reset by peer"));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code, "tool_error");
    }
}
