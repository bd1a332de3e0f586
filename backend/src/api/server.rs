//! HTTP server for the Pulseboard dashboard.
//!
//! # API Endpoints
//!
//! | Method | Path              | Description                          |
//! |--------|-------------------|--------------------------------------|
//! | GET    | `/health`         | Health check                         |
//! | GET    | `/api/categories` | Current category set and metadata    |
//! | POST   | `/api/upload`     | Upload a CSV to replace the set      |
//! | POST   | `/api/reload`     | Re-acquire from the configured source|
//! | POST   | `/api/reset`      | Restore the built-in default set     |
//! | GET    | `/api/logs`       | SSE stream for real-time logs        |
//!
//! Each load is normalized completely before the write lock is taken, so
//! readers see either the old set or the new one, never a mix. Concurrent
//! loads are last-writer-wins.

use axum::{
    extract::{Multipart, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};
use tokio::sync::RwLock;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_error, log_info, log_success, LOG_BROADCASTER};
use super::types::{error_response, CategoriesResponse, LoadResponse};
use crate::config::Config;
use crate::dashboard::{acquire, Dashboard, LoadTrigger};
use crate::error::{LoadError, ServerResult, SourceError};
use crate::models::CategoryNode;
use crate::source::TextSource;
use crate::transform::pipeline::normalize_bytes;

type ApiError = (StatusCode, Json<Value>);

/// Shared between handlers.
#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<RwLock<Dashboard>>,
    /// Where `/api/reload` reads from
    pub source: Option<TextSource>,
}

impl AppState {
    pub fn new(dashboard: Dashboard, source: Option<TextSource>) -> Self {
        Self {
            dashboard: Arc::new(RwLock::new(dashboard)),
            source,
        }
    }
}

/// Data update listener used by every server-side load.
fn announce(categories: &[CategoryNode]) {
    let metrics: usize = categories.iter().map(|c| c.metrics.len()).sum();
    log_success(format!(
        "Dashboard updated: {} categories, {} metrics",
        categories.len(),
        metrics
    ));
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/categories", get(get_categories))
        .route("/api/upload", post(upload_csv))
        .route("/api/reload", post(reload))
        .route("/api/reset", post(reset))
        .route("/api/logs", get(sse_logs))
        .layer(cors)
        .with_state(state)
}

/// Build the state for `config`, running the startup load when a source is set.
///
/// A failed startup load is logged and the built-in set stays in place.
pub async fn initial_state(config: &Config) -> ServerResult<AppState> {
    let dashboard = Dashboard::builtin(config.normalize_options()).map_err(LoadError::from)?;
    let state = AppState::new(dashboard, config.source.clone());

    if let Some(source) = &state.source {
        log_info(format!("📥 Initial load from {}", source));
        if let Err(e) = load_from_source(&state, source, LoadTrigger::Initial).await {
            log_error(format!("{}; showing built-in data", e));
        }
    }

    Ok(state)
}

/// Start the HTTP server
pub async fn start_server(config: Config) -> ServerResult<()> {
    let port = config.port;
    let state = initial_state(&config).await?;
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("🚀 Pulseboard server running on http://localhost:{}", port);
    println!("   GET  /api/categories - Current category set");
    println!("   POST /api/upload     - Upload CSV file");
    println!("   POST /api/reload     - Reload configured source");
    println!("   POST /api/reset      - Restore default data");
    println!("   GET  /api/logs       - SSE log stream");
    println!("   GET  /health         - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn load_from_source(
    state: &AppState,
    source: &TextSource,
    trigger: LoadTrigger,
) -> Result<LoadResponse, LoadError> {
    let options = state.dashboard.read().await.options().clone();
    let result = acquire(source, &options).await?;

    let csv_info = result.csv_info.clone();
    let mut dashboard = state.dashboard.write().await;
    let info = dashboard.replace(result, trigger, &mut announce).clone();
    Ok(LoadResponse::new(info, Some(csv_info)))
}

fn bad_request(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(error_response(message)))
}

fn load_failure(err: LoadError) -> ApiError {
    log_error(err.to_string());
    let status = match err {
        LoadError::Source(SourceError::NotConfigured) => StatusCode::BAD_REQUEST,
        LoadError::Source(_) => StatusCode::BAD_GATEWAY,
        LoadError::Pipeline(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };
    (status, Json(error_response(&err.to_string())))
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "pulseboard",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "categories": "GET /api/categories",
            "upload": "POST /api/upload",
            "reload": "POST /api/reload",
            "reset": "POST /api/reset",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

async fn get_categories(State(state): State<AppState>) -> Json<CategoriesResponse> {
    let dashboard = state.dashboard.read().await;
    Json(CategoriesResponse {
        categories: dashboard.categories().to_vec(),
        info: dashboard.info().clone(),
    })
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

/// Upload CSV endpoint
async fn upload_csv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<LoadResponse>, ApiError> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(&format!("Multipart error: {}", e)))?
    {
        if field.name() == Some("file") {
            file_name = field.file_name().map(|s| s.to_string());
            file_data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| bad_request(&format!("Read error: {}", e)))?
                    .to_vec(),
            );
        }
    }

    let bytes = file_data.ok_or_else(|| bad_request("No file provided"))?;

    log_info(format!(
        "📄 Upload: {} ({} bytes)",
        file_name.as_deref().unwrap_or("unknown"),
        bytes.len()
    ));

    let options = state.dashboard.read().await.options().clone();
    let result = normalize_bytes(&bytes, &options).map_err(|e| load_failure(e.into()))?;

    let csv_info = result.csv_info.clone();
    let mut dashboard = state.dashboard.write().await;
    let info = dashboard.replace(result, LoadTrigger::Upload, &mut announce).clone();
    Ok(Json(LoadResponse::new(info, Some(csv_info))))
}

/// Re-acquire from the configured source
async fn reload(State(state): State<AppState>) -> Result<Json<LoadResponse>, ApiError> {
    let source = state
        .source
        .clone()
        .ok_or_else(|| load_failure(SourceError::NotConfigured.into()))?;

    log_info(format!("🔄 Reload from {}", source));
    load_from_source(&state, &source, LoadTrigger::Reload)
        .await
        .map(Json)
        .map_err(load_failure)
}

/// Restore the built-in set
async fn reset(State(state): State<AppState>) -> Json<LoadResponse> {
    let mut dashboard = state.dashboard.write().await;
    let info = dashboard.reset_to_default(&mut announce).clone();
    Json(LoadResponse::new(info, None))
}
