//! HTTP surface for upload and chat.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/upload` | Multipart PDF upload; ingests and returns a namespace |
//! | `POST` | `/api/chat` | One chat turn: `{ question, namespace, history }` → `{ answer }` |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! The chat surface is stateless: the client carries the conversation
//! history and sends it with every turn, so a failed turn leaves nothing
//! recorded and the same question can be retried safely.
//!
//! # Error Contract
//!
//! All error responses use one JSON shape:
//!
//! ```json
//! { "error": { "code": "invalid_request", "message": "question and namespace are required" } }
//! ```
//!
//! Codes: `invalid_request` (400), `document_load` (400),
//! `embedding_failed` / `index_unavailable` / `generation_failed` (502).
//! Capability failures carry a generic message; the cause goes to the
//! server log only.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so a browser front-end
//! can call the API directly.

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use resume_chat_core::embedding::EmbeddingProvider;
use resume_chat_core::error::RagError;
use resume_chat_core::generation::Generator;
use resume_chat_core::index::VectorIndex;
use resume_chat_core::ingest::{ingest, IngestConfig};
use resume_chat_core::models::{ChatTurn, Namespace};
use resume_chat_core::session::run_turn;

use crate::config::Config;
use crate::loader;

/// Largest accepted upload, in bytes.
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Generic message for capability failures during a turn. Nothing was
/// recorded as answered, so the client can retry the same question.
const TURN_FAILURE_MESSAGE: &str =
    "Sorry, something went wrong while answering. Please try again.";

/// Shared application state. Capability objects are constructed once at
/// startup and passed by reference into every pipeline call — there are no
/// module-level client singletons.
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    generator: Arc<dyn Generator>,
}

/// Start the HTTP server with capabilities built from `config`.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let embedder = crate::embedding::create_embedding_provider(&config.embedding)?;
    let generator = crate::generation::create_generator(&config.generation)?;
    let index = crate::index::create_index(&config.index)?;
    run_server_with_capabilities(
        config,
        Arc::from(embedder),
        Arc::from(index),
        Arc::from(generator),
    )
    .await
}

/// Like [`run_server`], but with caller-supplied capability objects.
pub async fn run_server_with_capabilities(
    config: &Config,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    generator: Arc<dyn Generator>,
) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let state = AppState {
        config: Arc::new(config.clone()),
        embedder,
        index,
        generator,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/api/upload", post(handle_upload))
        .route("/api/chat", post(handle_chat))
        .route("/health", get(handle_health))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .with_state(state);

    info!(addr = %bind_addr, "chat server listening");
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g. `"invalid_request"`).
    code: String,
    /// Human-readable error message.
    message: String,
}

/// Internal error type that converts into an HTTP response.
struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn invalid_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "invalid_request",
        message: message.into(),
    }
}

/// Map a pipeline failure to a wire error. Request-shaped failures keep
/// their message; capability failures surface the generic retry-safe
/// message and log the cause.
fn classify_error(err: RagError) -> AppError {
    match &err {
        RagError::InvalidRequest(msg) => invalid_request(msg.clone()),
        RagError::DocumentLoad(msg) => AppError {
            status: StatusCode::BAD_REQUEST,
            code: "document_load",
            message: msg.clone(),
        },
        RagError::Embedding(_) => {
            error!(%err, "embedding capability failed");
            AppError {
                status: StatusCode::BAD_GATEWAY,
                code: "embedding_failed",
                message: TURN_FAILURE_MESSAGE.to_string(),
            }
        }
        RagError::IndexWrite(_) | RagError::IndexQuery(_) => {
            error!(%err, "vector index failed");
            AppError {
                status: StatusCode::BAD_GATEWAY,
                code: "index_unavailable",
                message: TURN_FAILURE_MESSAGE.to_string(),
            }
        }
        RagError::Generation(_) => {
            error!(%err, "generation capability failed");
            AppError {
                status: StatusCode::BAD_GATEWAY,
                code: "generation_failed",
                message: TURN_FAILURE_MESSAGE.to_string(),
            }
        }
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

// ============ POST /api/upload ============

#[derive(Serialize)]
struct UploadResponse {
    namespace: String,
    message: String,
}

/// Handler for `POST /api/upload`.
///
/// Reads the first file field of the multipart body, extracts its text,
/// and ingests it. The namespace is only returned on success; a failed
/// ingestion leaves nothing the client can query.
async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| invalid_request(format!("malformed multipart body: {e}")))?
    {
        if field.file_name().is_some() || field.name() == Some("file") {
            let name = field.file_name().unwrap_or("upload.pdf").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| invalid_request(format!("failed to read upload: {e}")))?;
            file = Some((name, bytes.to_vec()));
            break;
        }
    }

    let (file_name, bytes) = file.ok_or_else(|| invalid_request("no file uploaded"))?;
    info!(file = %file_name, size = bytes.len(), "ingesting uploaded document");

    let text = loader::extract_text(&bytes).map_err(classify_error)?;

    let ingest_config = IngestConfig {
        chunk_size: state.config.chunking.chunk_size,
        chunk_overlap: state.config.chunking.chunk_overlap,
        ..IngestConfig::default()
    };
    let namespace = ingest(
        &text,
        state.embedder.as_ref(),
        state.index.as_ref(),
        &ingest_config,
    )
    .await
    .map_err(classify_error)?;

    info!(namespace = %namespace, "ingestion complete");

    Ok(Json(UploadResponse {
        namespace: namespace.to_string(),
        message: "File uploaded and processed successfully.".to_string(),
    }))
}

// ============ POST /api/chat ============

#[derive(Deserialize)]
struct ChatRequest {
    question: Option<String>,
    namespace: Option<String>,
    #[serde(default)]
    history: Vec<ChatTurn>,
}

#[derive(Serialize)]
struct ChatResponse {
    answer: String,
}

/// Handler for `POST /api/chat`.
///
/// Runs one turn of the pipeline against the request's namespace and
/// history. History is never stored server-side.
async fn handle_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let question = request.question.unwrap_or_default();
    let namespace = request.namespace.unwrap_or_default();
    if question.trim().is_empty() || namespace.trim().is_empty() {
        return Err(invalid_request("question and namespace are required"));
    }
    let namespace = Namespace::from(namespace);

    let answer = run_turn(
        state.embedder.as_ref(),
        state.index.as_ref(),
        state.generator.as_ref(),
        &namespace,
        &request.history,
        &question,
        state.config.retrieval.top_k,
    )
    .await
    .map_err(classify_error)?;

    Ok(Json(ChatResponse { answer }))
}
