//! Alert Intake Route

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::AppState;
use alert_model::{Alert, AlertStatus, GeoPoint};

/// Alert payload as posted by an anchor node
#[derive(Debug, Deserialize)]
pub struct AlertIntake {
    /// Reporting device identifier
    pub node_id: String,
    /// Detection time; defaults to receipt time when the node omits it
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    /// Detection position
    pub location: GeoPoint,
    /// Detector confidence in [0, 1]
    pub confidence: f64,
    /// Base64-encoded evidence snapshot
    #[serde(default)]
    pub evidence_image: Option<String>,
}

/// Response for the intake endpoint
#[derive(Debug, Serialize)]
pub struct IntakeResponse {
    pub status: String,
    pub message: String,
}

/// Accept one alert from a node, assign its id, and broadcast it to every
/// connected dashboard. Broadcast is fire-and-forget: with no dashboard
/// connected the alert is dropped, not queued.
pub async fn post_alert(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AlertIntake>,
) -> Json<IntakeResponse> {
    let alert = Alert {
        alert_id: format!("fw-alert-{}", Uuid::new_v4()),
        node_id: payload.node_id,
        timestamp: payload.timestamp,
        location: payload.location,
        confidence: payload.confidence,
        status: AlertStatus::Pending,
        evidence_image: payload.evidence_image,
    };

    info!(
        alert_id = %alert.alert_id,
        node_id = %alert.node_id,
        confidence = alert.confidence,
        "Alert received"
    );

    state.alerts_received.fetch_add(1, Ordering::Relaxed);
    metrics::counter!("alerts_received_total").increment(1);

    match serde_json::to_string(&alert) {
        Ok(wire) => {
            // Err here only means no dashboard is connected right now
            let _ = state.broadcaster.send(wire);
        }
        Err(err) => warn!(%err, "Failed to serialize alert for broadcast"),
    }

    Json(IntakeResponse {
        status: "success".to_string(),
        message: "Alert received and broadcasted.".to_string(),
    })
}
