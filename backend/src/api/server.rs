//! HTTP Server for the sales pivot API.
//!
//! # API Endpoints
//!
//! | Method | Path              | Description                          |
//! |--------|-------------------|--------------------------------------|
//! | GET    | `/health`         | Health check                         |
//! | GET    | `/api/options`    | Distinct values for each filter      |
//! | POST   | `/api/pivot`      | Filtered pivot table with shares     |
//! | POST   | `/api/reload`     | Re-read the source, swap snapshot    |
//! | GET    | `/api/logs`       | SSE stream for real-time logs        |
//! | GET    | `/static/*`       | Static assets (when configured)      |

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, Method},
    response::{sse::Event, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, path::Path, sync::Arc, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use super::logs::{log_error, log_info, log_info_indent, log_success, LOG_BROADCASTER};
use super::types::{PivotResponse, ReloadResponse};
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::models::FilterOptions;
use crate::pivot::SelectionRequest;
use crate::store::RecordStore;

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: Arc<RecordStore>,
}

impl AppState {
    pub fn new(store: RecordStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

/// Build the router. Exposed separately from [`start_server`] for testing.
pub fn router(state: AppState, static_dir: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    let mut app = Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/options", get(filter_options))
        .route("/api/pivot", post(pivot))
        .route("/api/reload", post(reload))
        .route("/api/logs", get(sse_logs))
        .with_state(state);

    if let Some(dir) = static_dir {
        app = app.nest_service("/static", ServeDir::new(dir));
    }

    app.layer(cors)
}

/// Start the HTTP server
pub async fn start_server(config: ServerConfig, store: RecordStore) -> ServerResult<()> {
    let state = AppState::new(store);
    let app = router(state, config.static_dir.as_deref());

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;

    log_success(format!("🚀 Sales pivot server running on http://localhost:{}", config.port));
    log_info_indent("POST /api/pivot   - Pivot table", 1);
    log_info_indent("GET  /api/options - Filter options", 1);
    log_info_indent("POST /api/reload  - Reload source", 1);
    log_info_indent("GET  /api/logs    - SSE log stream", 1);
    if let Some(ref dir) = config.static_dir {
        log_info_indent(format!("GET  /static      - {}", dir.display()), 1);
    }

    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health(State(state): State<AppState>) -> Json<Value> {
    let snapshot = state.store.snapshot();
    Json(json!({
        "status": "ok",
        "service": "salesboard",
        "version": env!("CARGO_PKG_VERSION"),
        "source": state.store.origin().map(ToString::to_string),
        "records": snapshot.records.len(),
        "loadedAt": snapshot.loaded_at.to_rfc3339(),
        "endpoints": {
            "pivot": "POST /api/pivot",
            "options": "GET /api/options",
            "reload": "POST /api/reload",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// Distinct filter values
async fn filter_options(State(state): State<AppState>) -> Json<FilterOptions> {
    Json(state.store.options())
}

/// Pivot query endpoint
async fn pivot(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ServerResult<Json<PivotResponse>> {
    let Json(body) = body.map_err(|e| ServerError::BadRequest(e.body_text()))?;
    let request = SelectionRequest::from_json(&body)?;
    let selection = request.to_selection()?;

    // One snapshot for the whole request, even if a reload lands meanwhile.
    let snapshot = state.store.snapshot();
    let table = crate::pivot::summarize(&snapshot.records, &selection);

    log_info(format!(
        "📊 Pivot: {} of {} records, {} groups",
        table.filtered_records,
        snapshot.records.len(),
        table.rows.len()
    ));

    Ok(Json(PivotResponse::new(table, snapshot.records.len())))
}

/// Reload the source and swap the snapshot
async fn reload(State(state): State<AppState>) -> ServerResult<Json<ReloadResponse>> {
    let store = Arc::clone(&state.store);

    let result = tokio::task::spawn_blocking(move || store.reload())
        .await
        .map_err(std::io::Error::from)?;

    let snapshot = result.inspect_err(|e| log_error(format!("Reload failed: {}", e)))?;
    Ok(Json(ReloadResponse::from(&*snapshot)))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
