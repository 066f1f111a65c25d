//! HTTP server.
//!
//! Serves the HTML pages, the biometric JSON API, proximity ingestion and
//! the simulator control endpoints on one axum router.

pub mod error;
pub mod handlers;
pub mod pages;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::app::SimulatorRunner;
use crate::config::{ApiConfig, AppConfig};
use crate::core::zones::ZoneTable;
use crate::domain::ports::ReadingStore;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// `None` when the database could not be opened at startup.
    pub store: Option<Arc<dyn ReadingStore>>,
    pub runner: Option<Arc<SimulatorRunner>>,
    pub zones: Arc<ZoneTable>,
    pub api: ApiConfig,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        store: Option<Arc<dyn ReadingStore>>,
        runner: Option<Arc<SimulatorRunner>>,
        zones: ZoneTable,
        api: ApiConfig,
    ) -> Self {
        Self {
            store,
            runner,
            zones: Arc::new(zones),
            api,
            started_at: Utc::now(),
        }
    }
}

/// Builds the full router.
pub fn router(state: AppState, enable_cors: bool) -> Router {
    let cors = if enable_cors {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    };

    Router::new()
        // 頁面
        .route("/", get(pages::index))
        .route("/dashboard", get(pages::dashboard))
        .route("/about", get(pages::about))
        .route("/health", get(health_handler))
        // 生理數據
        .route("/api/biometrics/latest", get(handlers::latest_biometrics))
        .route("/api/biometrics/history", get(handlers::biometrics_history))
        .route("/api/biometrics/health", get(handlers::biometrics_health))
        .route("/api/steps/total", get(handlers::total_steps))
        .route("/api/heart_rate/zone", get(handlers::heart_rate_zone))
        // 距離感測器
        .route("/api/sensor/proximidad", post(handlers::ingest_proximity))
        .route(
            "/api/sensor/proximidad/history",
            get(handlers::proximity_history),
        )
        // 模擬器控制
        .route("/api/simulator/status", get(handlers::simulator_status))
        .route("/api/simulator/start", post(handlers::start_simulator))
        .route("/api/simulator/stop", post(handlers::stop_simulator))
        .route("/api/simulator/reset-steps", post(handlers::reset_steps))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Health check; 503 when the store is missing or unhealthy.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let database = match &state.store {
        Some(store) => store.is_healthy().await,
        None => false,
    };
    let simulator_running = match &state.runner {
        Some(runner) => runner.is_running().await,
        None => false,
    };

    let (status, label) = if database {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };
    let uptime_secs = Utc::now()
        .signed_duration_since(state.started_at)
        .num_seconds();

    (
        status,
        Json(serde_json::json!({
            "status": label,
            "version": env!("CARGO_PKG_VERSION"),
            "database": database,
            "simulator_running": simulator_running,
            "uptime_secs": uptime_secs,
            "timestamp": Utc::now().to_rfc3339(),
        })),
    )
}

/// Tracker HTTP server instance.
pub struct TrackerServer {
    addr: String,
    enable_cors: bool,
    state: AppState,
}

impl TrackerServer {
    pub fn new(config: &AppConfig, state: AppState) -> Self {
        Self {
            addr: config.bind_address(),
            enable_cors: config.server.enable_cors,
            state,
        }
    }

    /// Binds and serves until `shutdown` resolves.
    pub async fn start<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr: SocketAddr = self
            .addr
            .parse()
            .with_context(|| format!("Invalid address: {}", self.addr))?;

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        info!("🌐 Fitness tracker listening on http://{}", addr);
        info!("📊 Dashboard available at http://{}/dashboard", addr);

        let app = router(self.state, self.enable_cors);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .context("Server error")?;

        Ok(())
    }
}
