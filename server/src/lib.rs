use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use docsearch_core::{
    DocId, Document, DocumentStore, MemoryStore, RankedResult, RebuildScope, SearchEngine,
    SearchError,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, AllowOrigin, CorsLayer};

pub type Engine = SearchEngine<MemoryStore>;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
}

pub fn build_app(engine: Arc<Engine>) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new()
                    .allow_origin(AllowOrigin::list(origins))
                    .allow_methods(Any)
                    .allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/documents", post(upload_document))
        .route("/api/documents/:doc_id", get(get_document))
        .route("/api/search", get(search))
        .route("/api/index/rebuild", post(rebuild_index))
        .with_state(AppState { engine })
        .layer(cors)
}

#[derive(Deserialize)]
pub struct UploadRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub status: &'static str,
    pub id: DocId,
    pub title: String,
}

async fn upload_document(
    State(state): State<AppState>,
    Json(req): Json<UploadRequest>,
) -> Result<Json<UploadResponse>, (StatusCode, String)> {
    let content = req.content.unwrap_or_default();
    if content.trim().is_empty() {
        return Err(error_response(SearchError::InvalidInput(
            "document content is required".to_string(),
        )));
    }
    let title = req.title.unwrap_or_else(|| "Untitled".to_string());

    let doc = state
        .engine
        .store()
        .create(&title, &content)
        .map_err(error_response)?;
    state
        .engine
        .rebuild(RebuildScope::OneDocument(doc.id))
        .map_err(error_response)?;

    tracing::info!(doc_id = doc.id, "document uploaded and indexed");
    Ok(Json(UploadResponse { status: "success", id: doc.id, title: doc.title }))
}

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    10
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub query_terms: Vec<String>,
    pub count: usize,
    pub search_time_seconds: f64,
    pub results: Vec<RankedResult>,
}

async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let start = Instant::now();
    let limit = params.limit.max(0) as usize;
    let outcome = state.engine.search(&params.q, limit).map_err(error_response)?;

    let search_time_seconds = round4(start.elapsed().as_secs_f64());
    tracing::info!(query = %params.q, search_time_seconds, "search complete");

    Ok(Json(SearchResponse {
        query: params.q,
        query_terms: outcome.query_terms,
        count: outcome.results.len(),
        search_time_seconds,
        results: outcome.results,
    }))
}

#[derive(Serialize)]
pub struct RebuildResponse {
    pub status: &'static str,
    pub message: String,
    pub processed: usize,
    pub failed: Vec<DocId>,
}

async fn rebuild_index(
    State(state): State<AppState>,
) -> Result<Json<RebuildResponse>, (StatusCode, String)> {
    let report = state
        .engine
        .rebuild(RebuildScope::AllDocuments)
        .map_err(error_response)?;
    Ok(Json(RebuildResponse {
        status: "success",
        message: "index rebuilt successfully".to_string(),
        processed: report.processed,
        failed: report.failed,
    }))
}

async fn get_document(
    State(state): State<AppState>,
    Path(doc_id): Path<DocId>,
) -> Result<Json<Document>, (StatusCode, String)> {
    let doc = state.engine.store().get(doc_id).map_err(error_response)?;
    Ok(Json(doc))
}

fn error_response(err: SearchError) -> (StatusCode, String) {
    let status = match err {
        SearchError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        SearchError::NotFound(_) => StatusCode::NOT_FOUND,
        SearchError::IndexInconsistency(_) => StatusCode::INTERNAL_SERVER_ERROR,
        SearchError::Dependency(_) => StatusCode::BAD_GATEWAY,
    };
    (status, err.to_string())
}

fn round4(seconds: f64) -> f64 {
    (seconds * 10_000.0).round() / 10_000.0
}
