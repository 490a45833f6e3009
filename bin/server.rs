// Venue Scoring - Web Server
// REST API with Axum over the latest scoring run

use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use venue_scoring::{
    load_records, EngineConfig, GlobalStatus, RunReport, ScoringEngine, ScoringRun, Semaphore, StrategicWeights,
    VenueOutput, VenueStatus,
};

/// Shared application state
#[derive(Clone)]
struct AppState {
    engine: Arc<ScoringEngine>,
    input: PathBuf,
    run: Arc<RwLock<ScoringRun>>,
}

impl AppState {
    /// Reload the input and re-score off the async workers, then swap the run in
    async fn refresh(&self) -> Result<RunReport> {
        let engine = Arc::clone(&self.engine);
        let input = self.input.clone();

        let run = tokio::task::spawn_blocking(move || -> Result<ScoringRun> {
            let raw = load_records(&input)?;
            Ok(engine.run(&raw))
        })
        .await
        .context("Refresh task failed to complete")??;

        let report = run.report.clone();
        *self.run.write().await = run;
        Ok(report)
    }
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Query filters for the venue list
#[derive(Debug, Default, Deserialize)]
struct VenueFilter {
    estado: Option<String>,
    municipio: Option<String>,
    tier: Option<u8>,
}

/// Summary response
#[derive(Serialize)]
struct SummaryResponse {
    run_id: String,
    processed_at: String,
    report: RunReport,
    weights: StrategicWeights,
    status_counts: StatusCounts,
}

#[derive(Serialize, Default)]
struct StatusCounts {
    green: usize,
    yellow: usize,
    red: usize,
}

impl SummaryResponse {
    fn new(run: &ScoringRun, engine: &ScoringEngine) -> Self {
        let mut status_counts = StatusCounts::default();
        for record in run.records.iter().filter(|r| r.profitability.assessed) {
            match engine.status_of(record).color {
                Semaphore::Green => status_counts.green += 1,
                Semaphore::Yellow => status_counts.yellow += 1,
                _ => status_counts.red += 1,
            }
        }

        Self {
            run_id: run.run_id.to_string(),
            processed_at: run.processed_at.to_rfc3339(),
            report: run.report.clone(),
            weights: engine.config().weights,
            status_counts,
        }
    }
}

/// Venue status response
#[derive(Serialize)]
struct StatusResponse {
    id: i64,
    name: String,
    performance: Semaphore,
    benchmark: Semaphore,
    efficiency: Semaphore,
    audit: Semaphore,
    status: GlobalStatus,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/salones - All venues, optionally filtered
async fn get_venues(State(state): State<AppState>, Query(filter): Query<VenueFilter>) -> impl IntoResponse {
    let run = state.run.read().await;
    let wanted_status = filter.estado.as_deref().map(|s| VenueStatus::parse(Some(s)));
    let municipality = filter.municipio.as_deref().map(str::to_lowercase);

    let response: Vec<VenueOutput> = run
        .records
        .iter()
        .filter(|r| wanted_status.map_or(true, |status| r.status == status))
        .filter(|r| {
            municipality.as_deref().map_or(true, |wanted| {
                r.municipality
                    .as_deref()
                    .map_or(false, |m| m.to_lowercase().contains(wanted))
            })
        })
        .filter(|r| filter.tier.map_or(true, |tier| r.priority_tier == tier))
        .map(VenueOutput::from)
        .collect();

    (StatusCode::OK, Json(ApiResponse::ok(response)))
}

/// GET /api/salones/:id - One venue
async fn get_venue(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    let run = state.run.read().await;

    match run.find(id) {
        Some(record) => (StatusCode::OK, Json(ApiResponse::ok(VenueOutput::from(record)))),
        None => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::err(format!("Venue {} not found", id))),
        ),
    }
}

/// GET /api/salones/:id/status - Global status of one venue
async fn get_venue_status(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    let run = state.run.read().await;

    match run.find(id) {
        Some(record) => {
            let output = VenueOutput::from(record);
            let response = StatusResponse {
                id: record.id,
                name: record.name.clone(),
                performance: output.performance.color,
                benchmark: output.benchmark.color,
                efficiency: output.efficiency.color,
                audit: output.contract_audit.color,
                status: state.engine.status_of(record),
            };
            (StatusCode::OK, Json(ApiResponse::ok(response)))
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::err(format!("Venue {} not found", id))),
        ),
    }
}

/// GET /api/summary - Run report plus global status counts
async fn get_summary(State(state): State<AppState>) -> impl IntoResponse {
    let run = state.run.read().await;
    Json(ApiResponse::ok(SummaryResponse::new(&run, &state.engine)))
}

/// POST /api/refresh - Reload the input file and re-run the pipeline
async fn refresh(State(state): State<AppState>) -> impl IntoResponse {
    match state.refresh().await {
        Ok(report) => (StatusCode::OK, Json(ApiResponse::ok(report))),
        Err(e) => {
            error!("Refresh failed: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::err(format!("{:#}", e))),
            )
        }
    }
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🌐 Venue Scoring - Web Server");

    let input = std::env::var("VENUE_SCORING_INPUT")
        .map(PathBuf::from)
        .context("Set VENUE_SCORING_INPUT to the venue CSV/JSON export")?;

    let config = match std::env::var("VENUE_SCORING_CONFIG") {
        Ok(path) => EngineConfig::from_file(path)?,
        Err(_) => EngineConfig::default(),
    };
    let engine = ScoringEngine::new(config).context("Invalid engine configuration")?;

    let raw = load_records(&input)?;
    let run = engine.run(&raw);
    info!("✓ Initial run over {:?}: {}", input, run.report.summary());

    // Create shared state
    let state = AppState {
        engine: Arc::new(engine),
        input,
        run: Arc::new(RwLock::new(run)),
    };

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/salones", get(get_venues))
        .route("/salones/:id", get(get_venue))
        .route("/salones/:id/status", get(get_venue_status))
        .route("/summary", get(get_summary))
        .route("/refresh", post(refresh))
        .with_state(state);

    let app = Router::new()
        .nest("/api", api_routes)
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()));

    // Start server
    let addr = std::env::var("VENUE_SCORING_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("🚀 Server running on http://{}", addr);
    info!("   API: http://{}/api/salones", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
