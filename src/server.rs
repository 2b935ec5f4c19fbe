//! HTTP façade over the collector.
//!
//! Stateless apart from the output directory on disk: `POST /scrape` runs a
//! collection synchronously and returns the report, the `GET` endpoints are
//! views over previously persisted report files.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::collector;
use crate::config::{Config, ScrapeOptions};
use crate::storage;

const AVAILABLE_ENDPOINTS: [&str; 4] = [
    "POST /scrape",
    "GET /results/latest",
    "GET /results",
    "GET /health",
];

/// Shared server state. The run lock serializes overlapping scrape requests
/// so two browser sessions never contend for resources; each request still
/// blocks until its own run completes.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    started_at: Instant,
    run_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            started_at: Instant::now(),
            run_lock: Arc::new(Mutex::new(())),
        }
    }
}

/// Build the axum router with all endpoints.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/scrape", post(scrape))
        .route("/results/latest", get(latest_results))
        .route("/results", get(list_results))
        .route("/health", get(health))
        .route("/", get(index))
        .fallback(not_found)
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server; creates the output directory up front.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    std::fs::create_dir_all(&config.collector.output_dir)?;

    let port = config.server.port;
    let app = router(AppState::new(config));
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("awardee collector API listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn scrape(
    State(state): State<AppState>,
    options: Option<Json<ScrapeOptions>>,
) -> (StatusCode, Json<Value>) {
    let options = options.map(|Json(o)| o).unwrap_or_default();
    info!("scrape request received: {:?}", options);

    let config = match options.apply(&state.config.collector) {
        Ok(config) => config,
        Err(e) => return error_response(e.to_string()),
    };

    let _guard = state.run_lock.lock().await;
    match collector::run(&config).await {
        Ok(report) => {
            let message = format!(
                "Found {} unique awardees",
                report.summary.total_unique_awardees
            );
            (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "data": report,
                    "timestamp": Utc::now().to_rfc3339(),
                    "message": message,
                })),
            )
        }
        Err(e) => {
            error!("scrape failed: {}", e);
            error_response(e.to_string())
        }
    }
}

async fn latest_results(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match storage::latest_report(&state.config.collector.output_dir) {
        Ok(Some(latest)) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": latest.report,
                "filename": latest.file_name,
                "lastModified": latest.modified,
            })),
        ),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "error": "No results found" })),
        ),
        Err(e) => {
            error!("failed to read latest report: {}", e);
            error_response(e.to_string())
        }
    }
}

async fn list_results(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match storage::list_reports(&state.config.collector.output_dir) {
        Ok(files) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "count": files.len(),
                "files": files,
            })),
        ),
        Err(e) => {
            error!("failed to list reports: {}", e);
            error_response(e.to_string())
        }
    }
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "sam-awardee-collector",
        "timestamp": Utc::now().to_rfc3339(),
        "uptimeSeconds": state.started_at.elapsed().as_secs(),
    }))
}

async fn index() -> Json<Value> {
    Json(json!({
        "service": "SAM.gov Awardee Collector API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "POST /scrape": "Run a collection and return the report",
            "GET /results/latest": "Get the most recent report",
            "GET /results": "List persisted report files",
            "GET /health": "Health check",
        },
        "scrapeOptions": {
            "headless": "boolean (default: true)",
            "outputDir": "string (default: ./output)",
            "jurisdictions": "array of 2-letter state codes, absent for all 50",
            "requestTimeoutMs": "number (default: 8000)",
        },
    }))
}

async fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Endpoint not found",
            "availableEndpoints": AVAILABLE_ENDPOINTS,
        })),
    )
}

fn error_response(error: String) -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "success": false,
            "error": error,
            "timestamp": Utc::now().to_rfc3339(),
        })),
    )
}
