use crate::envelope::Envelope;
use dashmap::DashMap;
use tokio::sync::broadcast;

/// Routes decoded envelopes to consumers.
///
/// Every envelope is delivered on the generic message stream; envelopes
/// whose type has a registered topic stream are additionally delivered
/// there. All streams are broadcast — any number of consumers may listen
/// without stealing events from each other.
pub struct Dispatcher {
    message_tx: broadcast::Sender<Envelope>,
    topics: DashMap<String, broadcast::Sender<Envelope>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        let (message_tx, _) = broadcast::channel(256);
        Self {
            message_tx,
            topics: DashMap::new(),
        }
    }

    /// Subscribe to the generic message stream (all envelopes).
    pub fn subscribe(&self) -> broadcast::Receiver<Envelope> {
        self.message_tx.subscribe()
    }

    /// Subscribe to envelopes of a single type. The topic stream is
    /// registered lazily on first use.
    pub fn subscribe_topic(&self, msg_type: &str) -> broadcast::Receiver<Envelope> {
        self.topics
            .entry(msg_type.to_string())
            .or_insert_with(|| broadcast::channel(64).0)
            .subscribe()
    }

    /// Deliver one envelope to every interested stream.
    pub fn dispatch(&self, envelope: Envelope) {
        if let Some(topic_tx) = self.topics.get(&envelope.msg_type) {
            // Ignore send errors - no subscribers is fine
            let _ = topic_tx.send(envelope.clone());
        }
        let _ = self.message_tx.send(envelope);
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
