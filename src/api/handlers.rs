//! JSON endpoints.
//!
//! - /api/biometrics/latest - newest reading
//! - /api/biometrics/history - newest readings, bounded by the history limit
//! - /api/biometrics/health - health evaluation of the newest reading
//! - /api/steps/total - cumulative steps of the newest reading
//! - /api/heart_rate/zone - zone and colour of the newest heart rate
//! - /api/sensor/proximidad - proximity ingestion and history
//! - /api/simulator/* - simulated device control

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::api::AppState;
use crate::app::SimulatorRunner;
use crate::domain::model::{BiometricReading, ProximityPayload, ProximityReading};
use crate::domain::ports::ReadingStore;
use crate::utils::validation::Validate;

type ApiResult<T> = std::result::Result<T, ApiError>;

fn store(state: &AppState) -> ApiResult<&Arc<dyn ReadingStore>> {
    state.store.as_ref().ok_or(ApiError::DatabaseUnavailable)
}

fn runner(state: &AppState) -> ApiResult<&Arc<SimulatorRunner>> {
    state.runner.as_ref().ok_or(ApiError::DatabaseUnavailable)
}

async fn latest(state: &AppState) -> ApiResult<Option<BiometricReading>> {
    Ok(store(state)?.latest_biometric().await?)
}

// ============================================================================
// Biometrics
// ============================================================================

pub async fn latest_biometrics(State(state): State<AppState>) -> ApiResult<Json<BiometricReading>> {
    latest(&state).await?.map(Json).ok_or_else(ApiError::no_data)
}

pub async fn biometrics_history(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<BiometricReading>>> {
    let history = store(&state)?
        .recent_biometrics(state.api.history_limit)
        .await?;
    Ok(Json(history))
}

pub async fn biometrics_health(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let reading = latest(&state).await?.ok_or_else(ApiError::no_data)?;

    Ok(Json(json!({
        "reading_id": reading.id,
        "timestamp": reading.timestamp,
        "zone": reading.heart_rate_zone(),
        "status": reading.health_status(),
    })))
}

pub async fn total_steps(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let steps = latest(&state).await?.map(|r| r.steps).unwrap_or(0);
    Ok(Json(json!({ "total_steps": steps })))
}

pub async fn heart_rate_zone(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let reading = latest(&state).await?.ok_or_else(ApiError::no_data)?;
    let matched = state.zones.classify(reading.heart_rate);

    Ok(Json(json!({
        "heart_rate": reading.heart_rate,
        "zone": matched.zone,
        "color": matched.color,
    })))
}

// ============================================================================
// Proximity sensor
// ============================================================================

pub async fn ingest_proximity(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ProximityPayload>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let db = store(&state)?;
    let Json(payload) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    payload.validate()?;

    let reading = ProximityReading::from_payload(payload);
    db.insert_proximity(&reading).await?;
    tracing::debug!(
        "📡 Proximity reading from {}: {:.2}cm",
        reading.sensor_id,
        reading.distance_cm
    );

    Ok((StatusCode::CREATED, Json(reading)))
}

pub async fn proximity_history(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ProximityReading>>> {
    let history = store(&state)?
        .recent_proximity(state.api.proximity_history_limit)
        .await?;
    Ok(Json(history))
}

// ============================================================================
// Simulator control
// ============================================================================

pub async fn simulator_status(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(runner(&state)?.status().await))
}

pub async fn start_simulator(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let started = runner(&state)?.start().await;
    Ok(Json(json!({ "started": started })))
}

pub async fn stop_simulator(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let stopped = runner(&state)?.stop().await;
    Ok(Json(json!({ "stopped": stopped })))
}

pub async fn reset_steps(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let runner = runner(&state)?;
    runner.reset_steps().await;
    Ok(Json(json!({ "total_steps": runner.status().await.total_steps })))
}
