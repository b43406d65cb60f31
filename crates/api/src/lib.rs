//! Firewatch Dashboard API Server
//!
//! Receives smoke-detection alerts from anchor nodes over HTTP and fans them
//! out to every connected dashboard over WebSocket. Also serves the device
//! roster snapshot, health, and Prometheus metrics.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use serde::Serialize;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_governor::GovernorLayer;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod rate_limit;
mod routes;
mod settings;
mod ws;

use alert_model::Device;

pub use rate_limit::{create_governor_config, DefaultGovernorConfig, RateLimitConfig};
pub use settings::{Settings, SettingsError};

/// Broadcast channel capacity; a lagging dashboard is dropped, not queued
const BROADCAST_CAPACITY: usize = 64;

/// Application state shared across handlers
pub struct AppState {
    /// Fan-out channel to connected dashboards
    pub broadcaster: broadcast::Sender<String>,
    /// Device roster snapshot served to dashboards
    pub devices: Vec<Device>,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
    /// Alerts accepted since startup
    pub alerts_received: AtomicU64,
}

impl AppState {
    /// Create new application state with the given roster
    pub fn new(devices: Vec<Device>) -> Self {
        let (broadcaster, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            broadcaster,
            devices,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
            alerts_received: AtomicU64::new(0),
        }
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub metrics: SystemMetrics,
}

/// System metrics
#[derive(Debug, Serialize)]
pub struct SystemMetrics {
    pub device_count: usize,
    pub alerts_received: u64,
    pub connected_dashboards: usize,
}

/// Create the application router
pub fn create_router(
    state: Arc<AppState>,
    governor: Arc<rate_limit::DefaultGovernorConfig>,
) -> Router {
    // Only the intake endpoint is rate limited; dashboards poll freely
    let intake = Router::new()
        .route("/api/alert", post(routes::alerts::post_alert))
        .layer(GovernorLayer { config: governor });

    Router::new()
        .merge(intake)
        .route("/api/devices", get(routes::devices::get_devices))
        .route("/api/v1/health", get(health_handler))
        .route("/ws", get(ws::ws_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        metrics: SystemMetrics {
            device_count: state.devices.len(),
            alerts_received: state.alerts_received.load(Ordering::Relaxed),
            connected_dashboards: state.broadcaster.receiver_count(),
        },
    })
}

/// Initialize logging
pub fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

/// Run the server
pub async fn run_server(settings: Settings) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(settings.devices.clone()));
    let governor = create_governor_config(&settings.rate_limit);
    let prometheus = PrometheusBuilder::new().install_recorder()?;

    let app = create_router(Arc::clone(&state), governor)
        .route("/metrics", get(move || std::future::ready(prometheus.render())));

    info!("Starting dashboard server on {}", settings.bind_addr);

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
