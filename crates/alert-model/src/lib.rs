//! Alert Domain Model
//!
//! Shared types for the alert feed: alert records, device registry entries,
//! severity classification, and boundary validation of inbound messages.

mod alert;
mod device;
mod error;

pub use alert::{Alert, AlertStatus, GeoPoint, SeverityBand};
pub use device::{Device, DeviceKind};
pub use error::ParseError;
