//! Evidence Detail View

use alert_model::{Alert, Device, GeoPoint};

use crate::feed::DETAIL_ZOOM;
use crate::surface::{MapSurface, MarkerKind};

/// The open evidence view for one alert.
///
/// Owns a *secondary* map surface, separate from the main viewport, showing
/// the alert plus the device roster for context. Dropping the view releases
/// the surface, so a closed view can always be reopened without colliding
/// with a stale instance.
pub struct DetailView<S> {
    alert_id: String,
    node_id: String,
    location: GeoPoint,
    confidence: f64,
    evidence_image: Option<String>,
    #[allow(dead_code)]
    surface: S,
}

impl<S: MapSurface> DetailView<S> {
    pub(crate) fn new(alert: &Alert, devices: &[Device], mut surface: S) -> Self {
        surface.add_marker(&alert.alert_id, MarkerKind::Alert, alert.location);
        for device in devices {
            surface.add_marker(&device.node_id, MarkerKind::for_device(device), device.location);
        }
        surface.focus(alert.location, DETAIL_ZOOM);

        Self {
            alert_id: alert.alert_id.clone(),
            node_id: alert.node_id.clone(),
            location: alert.location,
            confidence: alert.confidence,
            evidence_image: alert.evidence_image.clone(),
            surface,
        }
    }

    /// Id of the alert on display
    pub fn alert_id(&self) -> &str {
        &self.alert_id
    }

    /// Reporting device of the alert on display
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Position of the alert on display
    pub fn location(&self) -> GeoPoint {
        self.location
    }

    /// Detector confidence of the alert on display
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Attached evidence snapshot, when the node sent one
    pub fn evidence_image(&self) -> Option<&str> {
        self.evidence_image.as_deref()
    }
}
