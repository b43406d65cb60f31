//! Alert Feed Controller
//!
//! Maintains the live alert list and its derived state:
//! - newest-first ordering of incoming alerts
//! - acknowledge / dismiss / evidence-view actions
//! - derived statistics for the dashboard header
//! - mirroring of alert and device identity onto an abstract map surface
//!
//! Rendering is not owned here: the map is a trait, implemented by whatever
//! presentation layer hosts the feed.

mod detail;
mod feed;
mod stats;
mod surface;

pub use detail::DetailView;
pub use feed::{AlertFeed, ConnectionStatus, FeedEvent, ALERT_ZOOM, DETAIL_ZOOM};
pub use stats::FeedStats;
pub use surface::{AlertSound, MapSurface, MarkerKind, NullSurface, SilentSound};
