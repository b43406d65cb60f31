//! Alert Feed State Machine

use std::collections::VecDeque;

use alert_model::{Alert, AlertStatus, Device};
use tracing::{debug, info, warn};

use crate::detail::DetailView;
use crate::stats::{self, FeedStats};
use crate::surface::{AlertSound, MapSurface, MarkerKind};

/// Viewport zoom when jumping to a fresh alert
pub const ALERT_ZOOM: u8 = 15;
/// Viewport zoom inside the evidence detail view
pub const DETAIL_ZOOM: u8 = 14;

const TEXT_CONNECTING: &str = "Connecting...";
const TEXT_ALL_CLEAR: &str = "Connected (All Clear)";
const TEXT_RETRYING: &str = "Disconnected. Retrying...";
const TEXT_ERROR: &str = "Connection Error";

/// State of the live feed connection. Drives the status line only;
/// no other behavior is gated on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Disconnected,
    Error,
}

/// One event emitted by the live feed connector
#[derive(Debug, Clone)]
pub enum FeedEvent {
    /// Connection established
    Opened,
    /// A parsed alert arrived
    Alert(Alert),
    /// Connection closed (a reconnect attempt follows)
    Closed,
    /// Transport-level error; informational, the retry chain continues
    TransportError(String),
}

/// The alert feed controller.
///
/// Owns the newest-first alert list, the device snapshot, the connection
/// status line, and at most one open detail view. Single-owner state: all
/// mutation goes through `&mut self`, so no interior locking is needed.
pub struct AlertFeed<S: MapSurface, A: AlertSound> {
    /// Active alerts, newest first
    alerts: VecDeque<Alert>,
    /// Device roster snapshot, immutable for the session
    devices: Vec<Device>,
    /// Main map viewport
    surface: S,
    /// Audio cue
    sound: A,
    /// Live feed connection state
    status: ConnectionStatus,
    /// Operator-facing status line
    status_text: String,
    /// Open evidence view, if any
    detail: Option<DetailView<S>>,
}

impl<S: MapSurface, A: AlertSound> AlertFeed<S, A> {
    /// Create a feed bound to a map surface and an alert sound
    pub fn new(surface: S, sound: A) -> Self {
        Self {
            alerts: VecDeque::new(),
            devices: Vec::new(),
            surface,
            sound,
            status: ConnectionStatus::Connecting,
            status_text: TEXT_CONNECTING.to_string(),
            detail: None,
        }
    }

    /// Apply one connector event
    pub fn apply(&mut self, event: FeedEvent) {
        match event {
            FeedEvent::Opened => {
                info!("Live feed connected");
                self.status = ConnectionStatus::Connected;
                self.status_text = TEXT_ALL_CLEAR.to_string();
            }
            FeedEvent::Alert(alert) => self.ingest(alert),
            FeedEvent::Closed => {
                warn!("Live feed closed, reconnect pending");
                self.status = ConnectionStatus::Disconnected;
                self.status_text = TEXT_RETRYING.to_string();
            }
            FeedEvent::TransportError(reason) => {
                warn!(%reason, "Live feed transport error");
                self.status = ConnectionStatus::Error;
                self.status_text = TEXT_ERROR.to_string();
            }
        }
    }

    /// Ingest one alert: audio cue, push-front, marker, viewport jump,
    /// status line. A replayed `alert_id` is dropped so the list never
    /// holds duplicates.
    pub fn ingest(&mut self, alert: Alert) {
        if self.alerts.iter().any(|a| a.alert_id == alert.alert_id) {
            warn!(alert_id = %alert.alert_id, "Duplicate alert id, ignoring");
            return;
        }

        info!(
            alert_id = %alert.alert_id,
            node_id = %alert.node_id,
            confidence = alert.confidence,
            "Alert received"
        );

        self.sound.play();

        let key = alert.alert_id.clone();
        let node = alert.node_id.clone();
        let location = alert.location;
        self.alerts.push_front(alert);

        self.surface.add_marker(&key, MarkerKind::Alert, location);
        self.surface.focus(location, ALERT_ZOOM);
        self.status_text = format!("ALERT: {node}");
    }

    /// Mark the alert as acknowledged in place. The status line returns to
    /// all-clear even when other pending alerts remain; this mirrors the
    /// deployed dashboard and is kept as observed. Unknown ids are a no-op.
    pub fn acknowledge(&mut self, alert_id: &str) -> bool {
        match self.alerts.iter_mut().find(|a| a.alert_id == alert_id) {
            Some(alert) => {
                alert.status = AlertStatus::Acknowledged;
                self.status_text = TEXT_ALL_CLEAR.to_string();
                info!(%alert_id, "Alert acknowledged");
                true
            }
            None => {
                debug!(%alert_id, "Acknowledge for unknown alert id");
                false
            }
        }
    }

    /// Drop the alert from the active list, remove its marker, and close
    /// the detail view when it shows this alert. Unknown ids are a no-op.
    pub fn dismiss(&mut self, alert_id: &str) -> bool {
        let Some(index) = self.alerts.iter().position(|a| a.alert_id == alert_id) else {
            debug!(%alert_id, "Dismiss for unknown alert id");
            return false;
        };

        self.alerts.remove(index);
        self.surface.remove_marker(alert_id);

        if self
            .detail
            .as_ref()
            .is_some_and(|view| view.alert_id() == alert_id)
        {
            self.close_detail();
        }

        info!(%alert_id, "Alert dismissed");
        true
    }

    /// Recenter the main viewport on an existing alert
    pub fn focus_alert(&mut self, alert_id: &str) -> bool {
        match self.alerts.iter().find(|a| a.alert_id == alert_id) {
            Some(alert) => {
                self.surface.focus(alert.location, ALERT_ZOOM);
                true
            }
            None => false,
        }
    }

    /// Open the evidence view for an alert on a fresh secondary surface.
    ///
    /// Any previously open view is closed first, releasing its surface, so
    /// open-close-open never stacks a second live instance.
    pub fn open_detail(&mut self, alert_id: &str, surface: S) -> bool {
        let Some(index) = self.alerts.iter().position(|a| a.alert_id == alert_id) else {
            debug!(%alert_id, "Evidence view for unknown alert id");
            return false;
        };

        self.close_detail();
        self.detail = Some(DetailView::new(&self.alerts[index], &self.devices, surface));
        true
    }

    /// Close the evidence view and release its surface
    pub fn close_detail(&mut self) {
        if self.detail.take().is_some() {
            debug!("Evidence view closed");
        }
    }

    /// Currently open evidence view
    pub fn detail(&self) -> Option<&DetailView<S>> {
        self.detail.as_ref()
    }

    /// Load the one-shot device roster snapshot, drawing a marker per device
    pub fn load_devices(&mut self, devices: Vec<Device>) {
        for device in &devices {
            self.surface
                .add_marker(&device.node_id, MarkerKind::for_device(device), device.location);
        }
        info!(count = devices.len(), "Device snapshot loaded");
        self.devices = devices;
    }

    /// Dashboard statistics, recomputed from the current list
    pub fn stats(&self) -> FeedStats {
        stats::compute(&self.alerts)
    }

    /// Active alerts, newest first
    pub fn alerts(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.iter()
    }

    /// Number of active alerts
    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    /// Whether the active list is empty
    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    /// Loaded device snapshot
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    /// Connection state
    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// Operator-facing status line
    pub fn status_text(&self) -> &str {
        &self.status_text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alert_model::{DeviceKind, GeoPoint};
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Surface that records calls into shared handles for inspection
    #[derive(Default, Clone)]
    struct RecordingSurface {
        markers: Rc<RefCell<Vec<(String, MarkerKind)>>>,
        focused: Rc<RefCell<Vec<(GeoPoint, u8)>>>,
    }

    impl RecordingSurface {
        fn marker_keys(&self) -> Vec<String> {
            self.markers.borrow().iter().map(|(k, _)| k.clone()).collect()
        }
    }

    impl MapSurface for RecordingSurface {
        fn add_marker(&mut self, key: &str, kind: MarkerKind, _location: GeoPoint) {
            self.markers.borrow_mut().push((key.to_string(), kind));
        }

        fn remove_marker(&mut self, key: &str) {
            self.markers.borrow_mut().retain(|(k, _)| k != key);
        }

        fn focus(&mut self, location: GeoPoint, zoom: u8) {
            self.focused.borrow_mut().push((location, zoom));
        }
    }

    #[derive(Default, Clone)]
    struct CountingSound {
        plays: Rc<RefCell<usize>>,
    }

    impl AlertSound for CountingSound {
        fn play(&mut self) {
            *self.plays.borrow_mut() += 1;
        }
    }

    fn alert(id: &str, confidence: f64) -> Alert {
        Alert {
            alert_id: id.to_string(),
            node_id: format!("Camera-Node-{id}"),
            timestamp: Utc.with_ymd_and_hms(2024, 8, 14, 12, 30, 0).unwrap(),
            location: GeoPoint { lat: 34.685, lon: 33.041 },
            confidence,
            status: AlertStatus::Pending,
            evidence_image: None,
        }
    }

    fn feed() -> (
        AlertFeed<RecordingSurface, CountingSound>,
        RecordingSurface,
        CountingSound,
    ) {
        let surface = RecordingSurface::default();
        let sound = CountingSound::default();
        (
            AlertFeed::new(surface.clone(), sound.clone()),
            surface,
            sound,
        )
    }

    #[test]
    fn test_ingest_orders_newest_first() {
        let (mut feed, surface, sound) = feed();
        feed.ingest(alert("a1", 0.95));
        feed.ingest(alert("a2", 0.85));
        feed.ingest(alert("a3", 0.70));

        let ids: Vec<_> = feed.alerts().map(|a| a.alert_id.as_str()).collect();
        assert_eq!(ids, vec!["a3", "a2", "a1"]);
        assert_eq!(*sound.plays.borrow(), 3);
        assert_eq!(surface.marker_keys(), vec!["a1", "a2", "a3"]);
        assert_eq!(feed.status_text(), "ALERT: Camera-Node-a3");
    }

    #[test]
    fn test_ingest_jumps_viewport_to_alert() {
        let (mut feed, surface, _) = feed();
        feed.ingest(alert("a1", 0.95));
        let focused = surface.focused.borrow();
        assert_eq!(focused.len(), 1);
        assert_eq!(focused[0].1, ALERT_ZOOM);
    }

    #[test]
    fn test_duplicate_alert_id_is_ignored() {
        let (mut feed, _, sound) = feed();
        feed.ingest(alert("a1", 0.95));
        feed.ingest(alert("a1", 0.40));

        assert_eq!(feed.len(), 1);
        assert_eq!(feed.alerts().next().unwrap().confidence, 0.95);
        // No second audio cue for the replay
        assert_eq!(*sound.plays.borrow(), 1);
    }

    #[test]
    fn test_acknowledge_flips_status_in_place() {
        let (mut feed, _, _) = feed();
        feed.ingest(alert("a1", 0.95));
        feed.ingest(alert("a2", 0.85));

        assert!(feed.acknowledge("a1"));

        let ids: Vec<_> = feed.alerts().map(|a| a.alert_id.as_str()).collect();
        assert_eq!(ids, vec!["a2", "a1"], "order unchanged");

        let a1 = feed.alerts().find(|a| a.alert_id == "a1").unwrap();
        assert_eq!(a1.status, AlertStatus::Acknowledged);
        let a2 = feed.alerts().find(|a| a.alert_id == "a2").unwrap();
        assert_eq!(a2.status, AlertStatus::Pending);
        assert_eq!(feed.status_text(), "Connected (All Clear)");
    }

    #[test]
    fn test_acknowledge_unknown_id_is_noop() {
        let (mut feed, _, _) = feed();
        feed.ingest(alert("a1", 0.95));
        let text_before = feed.status_text().to_string();

        assert!(!feed.acknowledge("ghost"));
        assert_eq!(feed.len(), 1);
        assert_eq!(feed.status_text(), text_before);
    }

    #[test]
    fn test_dismiss_removes_entry_and_marker() {
        let (mut feed, surface, _) = feed();
        feed.ingest(alert("a1", 0.95));
        feed.ingest(alert("a2", 0.85));

        assert!(feed.dismiss("a1"));
        assert_eq!(feed.len(), 1);
        assert_eq!(surface.marker_keys(), vec!["a2"]);

        assert!(!feed.dismiss("a1"), "second dismiss is a no-op");
        assert_eq!(feed.len(), 1);
    }

    #[test]
    fn test_dismiss_closes_matching_detail_view() {
        let (mut feed, _, _) = feed();
        feed.ingest(alert("a1", 0.95));
        assert!(feed.open_detail("a1", RecordingSurface::default()));
        assert!(feed.detail().is_some());

        feed.dismiss("a1");
        assert!(feed.detail().is_none());
    }

    #[test]
    fn test_connection_events_drive_status_line() {
        let (mut feed, _, _) = feed();
        assert_eq!(feed.status(), ConnectionStatus::Connecting);
        assert_eq!(feed.status_text(), "Connecting...");

        feed.apply(FeedEvent::Opened);
        assert_eq!(feed.status(), ConnectionStatus::Connected);
        assert_eq!(feed.status_text(), "Connected (All Clear)");

        feed.apply(FeedEvent::TransportError("reset by peer".into()));
        assert_eq!(feed.status(), ConnectionStatus::Error);

        feed.apply(FeedEvent::Closed);
        assert_eq!(feed.status(), ConnectionStatus::Disconnected);
        assert_eq!(feed.status_text(), "Disconnected. Retrying...");
    }

    #[test]
    fn test_load_devices_draws_roster_markers() {
        let (mut feed, surface, _) = feed();
        feed.load_devices(vec![
            Device {
                node_id: "cam-1".into(),
                kind: DeviceKind::Camera,
                location: GeoPoint { lat: 34.7, lon: 32.9 },
                status: "Monitoring".into(),
            },
            Device {
                node_id: "anchor-1".into(),
                kind: DeviceKind::Anchor,
                location: GeoPoint { lat: 34.8, lon: 32.8 },
                status: "Monitoring".into(),
            },
        ]);

        let markers = surface.markers.borrow();
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0], ("cam-1".to_string(), MarkerKind::Camera));
        assert_eq!(markers[1], ("anchor-1".to_string(), MarkerKind::Anchor));
        assert_eq!(feed.devices().len(), 2);
    }

    #[test]
    fn test_focus_alert() {
        let (mut feed, surface, _) = feed();
        feed.ingest(alert("a1", 0.95));
        surface.focused.borrow_mut().clear();

        assert!(feed.focus_alert("a1"));
        assert_eq!(surface.focused.borrow().len(), 1);
        assert!(!feed.focus_alert("ghost"));
        assert_eq!(surface.focused.borrow().len(), 1);
    }

    proptest! {
        /// Any sequence of distinct incoming alerts leaves the list at the
        /// same length, ordered newest-first by arrival.
        #[test]
        fn prop_arrival_order_is_preserved(confidences in proptest::collection::vec(0.0f64..1.0, 0..32)) {
            let (mut feed, _, _) = feed();
            for (i, confidence) in confidences.iter().enumerate() {
                feed.ingest(alert(&format!("a{i}"), *confidence));
            }

            prop_assert_eq!(feed.len(), confidences.len());
            let ids: Vec<_> = feed.alerts().map(|a| a.alert_id.clone()).collect();
            for (offset, id) in ids.iter().enumerate() {
                let expected = format!("a{}", confidences.len() - 1 - offset);
                prop_assert_eq!(id, &expected);
            }
        }
    }
}
