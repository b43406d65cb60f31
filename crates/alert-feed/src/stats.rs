//! Derived Dashboard Statistics

use std::collections::VecDeque;

use alert_model::Alert;
use serde::Serialize;

/// Confidence at or above which an alert counts as high priority
const HIGH_PRIORITY_THRESHOLD: f64 = 0.90;

/// Header statistics, recomputed on demand from the active list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedStats {
    /// Number of active alerts
    pub total: usize,
    /// Alerts with confidence >= 0.90
    pub high_priority: usize,
    /// Mean confidence as an integer percentage, 0 when empty
    pub avg_confidence: u32,
    /// Display timestamp of the newest alert, "N/A" when empty
    pub latest_alert: String,
}

pub(crate) fn compute(alerts: &VecDeque<Alert>) -> FeedStats {
    let total = alerts.len();
    let high_priority = alerts
        .iter()
        .filter(|a| a.confidence >= HIGH_PRIORITY_THRESHOLD)
        .count();

    let avg_confidence = if total > 0 {
        let sum: f64 = alerts.iter().map(|a| a.confidence).sum();
        (sum / total as f64 * 100.0).round() as u32
    } else {
        0
    };

    let latest_alert = alerts
        .front()
        .map(|a| a.display_timestamp())
        .unwrap_or_else(|| "N/A".to_string());

    FeedStats {
        total,
        high_priority,
        avg_confidence,
        latest_alert,
    }
}
