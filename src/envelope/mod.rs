use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod codec;
#[cfg(test)]
mod tests;

/// The typed, timestamped unit of exchange over the transport.
///
/// Envelopes are immutable once constructed. `msg_type` (wire field
/// `type`) is the dispatch key; `data` is opaque to the connection layer.
/// Unknown additional wire fields are ignored on decode.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub msg_type: String,

    /// Domain-specific payload (opaque to the client)
    pub data: Value,

    /// Creation time; client-assigned for outbound envelopes,
    /// server-assigned for inbound ones
    pub timestamp: DateTime<Utc>,
}

impl Envelope {
    /// Build an envelope stamped with the current time.
    pub fn new(msg_type: &str, data: Value) -> Self {
        Self {
            msg_type: msg_type.to_string(),
            data,
            timestamp: Utc::now(),
        }
    }
}
