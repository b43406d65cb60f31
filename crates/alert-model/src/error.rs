//! Boundary Validation Error Types

use thiserror::Error;

/// Errors while decoding an inbound record at the trust boundary
#[derive(Debug, Error)]
pub enum ParseError {
    /// Payload is not valid JSON or does not match the schema
    #[error("Malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),
}
