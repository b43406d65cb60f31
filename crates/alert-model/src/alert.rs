//! Alert Record Types

use crate::error::ParseError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A geographic position in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lon: f64,
}

/// Lifecycle status of an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AlertStatus {
    /// Received, awaiting operator action
    #[default]
    Pending,
    /// Confirmed by an operator
    Acknowledged,
}

/// A smoke-detection alert as delivered over the live feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    /// Unique alert identifier (server-assigned)
    pub alert_id: String,
    /// Reporting device identifier
    pub node_id: String,
    /// Server-assigned detection time
    pub timestamp: DateTime<Utc>,
    /// Detection position
    pub location: GeoPoint,
    /// Detector confidence in [0, 1]
    pub confidence: f64,
    /// Operator-facing status
    #[serde(default)]
    pub status: AlertStatus,
    /// Base64-encoded evidence snapshot, when the node attached one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence_image: Option<String>,
}

impl Alert {
    /// Decode one feed message, validating it against the alert schema.
    ///
    /// Range checks are deliberately absent: out-of-range coordinates or
    /// confidence values pass through unchanged.
    pub fn from_json(payload: &str) -> Result<Self, ParseError> {
        Ok(serde_json::from_str(payload)?)
    }

    /// Severity band of this alert
    pub fn severity(&self) -> SeverityBand {
        SeverityBand::from_confidence(self.confidence)
    }

    /// Timestamp formatted for operator display
    pub fn display_timestamp(&self) -> String {
        self.timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
    }
}

/// Presentation severity band derived from confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeverityBand {
    /// Confidence >= 0.90
    High,
    /// Confidence >= 0.80
    Medium,
    /// Needs verification
    Low,
}

impl SeverityBand {
    /// Classify a confidence value
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.90 {
            SeverityBand::High
        } else if confidence >= 0.80 {
            SeverityBand::Medium
        } else {
            SeverityBand::Low
        }
    }
}
