//! Route Handlers

pub mod alerts;
pub mod devices;
