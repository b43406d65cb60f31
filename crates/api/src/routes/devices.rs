//! Device Roster Route

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::AppState;
use alert_model::Device;

/// Serve the device roster snapshot. The roster is loaded at startup and
/// immutable for the life of the process.
pub async fn get_devices(State(state): State<Arc<AppState>>) -> Json<Vec<Device>> {
    Json(state.devices.clone())
}
