use serde::{Deserialize, Serialize};

/// Request payload for /query.
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    /// Free text from the caller; may be empty.
    pub query: String,
}

/// Response payload for /query.
#[derive(Debug, Serialize)]
pub struct QueryResponse {
    /// Aggregated, trimmed answer from the backend.
    pub response: String,
}
