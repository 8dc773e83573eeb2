use crate::envelope::Envelope;
use serde_json::json;

/// Client → Server: subscribe to a channel
pub const TYPE_SUBSCRIBE: &str = "subscribe";

/// Client → Server: unsubscribe from a channel
pub const TYPE_UNSUBSCRIBE: &str = "unsubscribe";

/// Client → Server: keepalive probe
pub const TYPE_PING: &str = "ping";

/// Build a subscribe request for `channel`.
pub fn subscribe_request(channel: &str) -> Envelope {
    Envelope::new(TYPE_SUBSCRIBE, json!({ "channel": channel }))
}

/// Build an unsubscribe request for `channel`.
pub fn unsubscribe_request(channel: &str) -> Envelope {
    Envelope::new(TYPE_UNSUBSCRIBE, json!({ "channel": channel }))
}

/// Build a keepalive probe. Any reply flows through normal dispatch;
/// none is required.
pub fn ping() -> Envelope {
    Envelope::new(TYPE_PING, json!({}))
}
