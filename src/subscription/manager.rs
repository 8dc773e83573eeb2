use std::collections::HashSet;

/// Authoritative record of the channels the caller wants to receive.
///
/// The set outlives any single connection: it is mutated only by explicit
/// subscribe/unsubscribe calls, never as a side effect of
/// connection-state changes, and the full set is replayed to the server
/// after every successful (re)connect.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    channels: HashSet<String>,
}

impl SubscriptionManager {
    pub fn new() -> Self {
        Self {
            channels: HashSet::new(),
        }
    }

    /// Record interest in `channel`. Returns true if it was newly added.
    pub fn subscribe(&mut self, channel: &str) -> bool {
        self.channels.insert(channel.to_string())
    }

    /// Drop interest in `channel`. Returns true if it was present.
    pub fn unsubscribe(&mut self, channel: &str) -> bool {
        self.channels.remove(channel)
    }

    /// Snapshot of the full current set, for replay after a (re)connect.
    /// No ordering guarantee.
    pub fn snapshot(&self) -> Vec<String> {
        self.channels.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_is_idempotent() {
        let mut manager = SubscriptionManager::new();

        assert!(manager.subscribe("prices"));
        assert!(!manager.subscribe("prices"));
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_unsubscribe_removes_channel() {
        let mut manager = SubscriptionManager::new();

        manager.subscribe("prices");
        assert!(manager.unsubscribe("prices"));
        assert!(manager.is_empty());
    }

    #[test]
    fn test_unsubscribe_unknown_channel_is_noop() {
        let mut manager = SubscriptionManager::new();
        assert!(!manager.unsubscribe("never-subscribed"));
    }

    #[test]
    fn test_snapshot_contains_full_set() {
        let mut manager = SubscriptionManager::new();

        manager.subscribe("prices");
        manager.subscribe("trades");
        manager.subscribe("news");
        manager.unsubscribe("trades");

        let mut snapshot = manager.snapshot();
        snapshot.sort();
        assert_eq!(snapshot, vec!["news".to_string(), "prices".to_string()]);
    }
}
