//! Device Registry Types

use crate::alert::GeoPoint;
use serde::{Deserialize, Deserializer, Serialize};

/// Kind of deployed sensor node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeviceKind {
    /// Smoke-detection camera node
    Camera,
    /// Radio anchor / relay node
    Anchor,
    /// Anything the roster reports that we do not model
    Other,
}

impl<'de> Deserialize<'de> for DeviceKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Unknown kinds degrade to Other instead of failing the roster
        let kind = String::deserialize(deserializer)?;
        Ok(match kind.as_str() {
            "Camera" => DeviceKind::Camera,
            "Anchor" => DeviceKind::Anchor,
            _ => DeviceKind::Other,
        })
    }
}

/// A deployed device from the roster snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    /// Unique device identifier
    pub node_id: String,
    /// Device kind
    #[serde(rename = "type")]
    pub kind: DeviceKind,
    /// Installed position
    pub location: GeoPoint,
    /// Free-form display status
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_status() -> String {
    "Monitoring".to_string()
}
