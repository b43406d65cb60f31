//! Map Surface Abstraction

use alert_model::{Device, DeviceKind, GeoPoint};

/// Kind of marker to place, so surfaces can pick an icon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// Active alert location
    Alert,
    /// Camera device
    Camera,
    /// Anchor or other fixed device
    Anchor,
}

impl MarkerKind {
    /// Marker kind for a roster device
    pub fn for_device(device: &Device) -> Self {
        match device.kind {
            DeviceKind::Camera => MarkerKind::Camera,
            DeviceKind::Anchor | DeviceKind::Other => MarkerKind::Anchor,
        }
    }
}

/// Rendering-agnostic map viewport.
///
/// The feed controller only ever creates and removes markers by entity id
/// and recenters the viewport; any mapping library can implement this.
pub trait MapSurface {
    /// Place (or replace) a marker keyed by entity id
    fn add_marker(&mut self, key: &str, kind: MarkerKind, location: GeoPoint);

    /// Remove the marker with the given key, if present
    fn remove_marker(&mut self, key: &str);

    /// Center and zoom the viewport
    fn focus(&mut self, location: GeoPoint, zoom: u8);
}

/// Audible alert cue. Playback is best-effort: implementations swallow
/// playback failures rather than surfacing them to the feed.
pub trait AlertSound {
    /// Play the alert cue
    fn play(&mut self);
}

/// Surface that renders nothing, for headless feed consumers
#[derive(Debug, Default)]
pub struct NullSurface;

impl MapSurface for NullSurface {
    fn add_marker(&mut self, _key: &str, _kind: MarkerKind, _location: GeoPoint) {}
    fn remove_marker(&mut self, _key: &str) {}
    fn focus(&mut self, _location: GeoPoint, _zoom: u8) {}
}

/// Sound that stays quiet, for headless feed consumers
#[derive(Debug, Default)]
pub struct SilentSound;

impl AlertSound for SilentSound {
    fn play(&mut self) {}
}
