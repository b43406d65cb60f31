//! Live Feed Client
//!
//! Keeps the dashboard subscribed to the server-pushed alert stream:
//! - WebSocket connector with a fixed-delay, strictly sequential reconnect
//!   chain (no backoff, no attempt cap, no replay after reconnect)
//! - boundary parsing of inbound messages, dropping malformed payloads
//! - one-shot device roster snapshot over HTTP

mod connector;
mod roster;

pub use connector::{run, spawn, ConnectorError, FeedConfig, MessageStream, DEFAULT_RETRY_DELAY};
pub use roster::{fetch_devices, load_into, RosterError};
