//! Values API Protocol
//!
//! Paths and JSON bodies shared by the server handlers and the workload client.

use serde::{Deserialize, Serialize};

/// Collection endpoint (list, create).
pub const ENDPOINT_VALUES: &str = "/api/values";
/// Item endpoint (read, update, delete). Route syntax, not a concrete path.
pub const ENDPOINT_VALUE_BY_ID: &str = "/api/values/:id";

/// Body of POST and PUT requests.
///
/// `value` is required and must be a string; anything else is rejected
/// before it reaches the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValueEnvelope {
    pub value: String,
}

/// JSON body returned with every 4xx/5xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable machine-readable kind, e.g. `validation_error`.
    pub error: String,
    pub message: String,
}
