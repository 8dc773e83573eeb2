use crate::config::ClientConfig;
use crate::connection::supervisor::{Command, Supervisor};
use crate::connection::ConnectionState;
use crate::dispatch::Dispatcher;
use crate::envelope::Envelope;
use crate::error::ClientError;
use crate::transport::{Transport, WsTransport};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tracing::debug;

/// Output streams and teardown flags shared between the façade and the
/// supervisor task.
pub(crate) struct Shared {
    pub(crate) state_tx: broadcast::Sender<ConnectionState>,
    pub(crate) error_tx: broadcast::Sender<ClientError>,
    pub(crate) dispatcher: Dispatcher,
    /// Set once by dispose(); gates every emission on all three streams
    disposed: AtomicBool,
    /// Set synchronously by disconnect()/dispose() so a timer completion
    /// that raced the command queue cannot act after the call returns
    halted: AtomicBool,
}

impl Shared {
    fn new() -> Self {
        let (state_tx, _) = broadcast::channel(64);
        let (error_tx, _) = broadcast::channel(64);
        Self {
            state_tx,
            error_tx,
            dispatcher: Dispatcher::new(),
            disposed: AtomicBool::new(false),
            halted: AtomicBool::new(false),
        }
    }

    pub(crate) fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    pub(crate) fn is_halted(&self) -> bool {
        self.halted.load(Ordering::SeqCst)
    }

    /// Push one error onto the error stream (dropped after dispose).
    pub(crate) fn emit_error(&self, error: ClientError) {
        if !self.is_disposed() {
            let _ = self.error_tx.send(error);
        }
    }

    /// Route one decoded envelope to consumers (dropped after dispose).
    pub(crate) fn publish(&self, envelope: Envelope) {
        if !self.is_disposed() {
            self.dispatcher.dispatch(envelope);
        }
    }
}

/// Resilient streaming client.
///
/// One `StreamClient` is constructed per logical session and supervises a
/// single transport connection: it reconnects with linear backoff after
/// failures, probes liveness while connected, and replays the full
/// subscription set after every successful (re)connect. Consumers observe
/// it exclusively through three broadcast streams — connection state,
/// messages, and errors — none of which ever throws into caller code.
pub struct StreamClient {
    shared: Arc<Shared>,
    cmd_tx: mpsc::UnboundedSender<Command>,
}

impl StreamClient {
    /// Create a client over the default WebSocket transport.
    ///
    /// Must be called within a tokio runtime: the connection supervisor
    /// task is spawned immediately, idle in the disconnected state.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, WsTransport)
    }

    /// Create a client over a caller-supplied transport.
    pub fn with_transport<T: Transport>(config: ClientConfig, transport: T) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared::new());
        let supervisor = Supervisor::new(
            Arc::new(transport),
            config,
            Arc::clone(&shared),
            cmd_rx,
        );
        tokio::spawn(supervisor.run());
        Self { shared, cmd_tx }
    }

    /// Begin connecting. No-op while already connecting or connected;
    /// from the failed state this resets the attempt counter and retries.
    pub fn connect(&self) {
        if self.shared.is_disposed() {
            return;
        }
        self.shared.halted.store(false, Ordering::SeqCst);
        let _ = self.cmd_tx.send(Command::Connect);
    }

    /// Tear the connection down. Cancels any pending reconnect and the
    /// keepalive probe and resets the attempt counter; the subscription
    /// set is preserved for the next connect.
    pub fn disconnect(&self) {
        if self.shared.is_disposed() {
            return;
        }
        self.shared.halted.store(true, Ordering::SeqCst);
        let _ = self.cmd_tx.send(Command::Disconnect);
    }

    /// Release the client permanently: disconnects, stops every timer,
    /// and silences all three output streams. Every later call on this
    /// client is a no-op.
    pub fn dispose(&self) {
        if self.shared.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.shared.halted.store(true, Ordering::SeqCst);
        let _ = self.cmd_tx.send(Command::Dispose);
    }

    /// Fire-and-forget send of a typed envelope stamped with the current
    /// time. Dropped while not connected — delivery of messages sent
    /// during an outage is not guaranteed.
    pub fn send(&self, msg_type: &str, data: Value) {
        if self.shared.is_disposed() {
            debug!(msg_type = %msg_type, "send ignored after dispose");
            return;
        }
        let _ = self.cmd_tx.send(Command::Send {
            msg_type: msg_type.to_string(),
            data,
        });
    }

    /// Record interest in `channel`. Sent to the server immediately when
    /// connected; otherwise the intent is kept for replay on the next
    /// successful connect.
    pub fn subscribe(&self, channel: &str) {
        if self.shared.is_disposed() {
            return;
        }
        let _ = self.cmd_tx.send(Command::Subscribe {
            channel: channel.to_string(),
        });
    }

    /// Drop interest in `channel`. Sent to the server only when
    /// connected.
    pub fn unsubscribe(&self, channel: &str) {
        if self.shared.is_disposed() {
            return;
        }
        let _ = self.cmd_tx.send(Command::Unsubscribe {
            channel: channel.to_string(),
        });
    }

    /// Subscribe to connection-state transitions. Fan-out safe: every
    /// receiver sees every transition, in order, without duplicates.
    pub fn subscribe_state(&self) -> broadcast::Receiver<ConnectionState> {
        self.shared.state_tx.subscribe()
    }

    /// Subscribe to the generic message stream (every decoded envelope).
    pub fn subscribe_messages(&self) -> broadcast::Receiver<Envelope> {
        self.shared.dispatcher.subscribe()
    }

    /// Subscribe to envelopes of a single type.
    pub fn subscribe_topic(&self, msg_type: &str) -> broadcast::Receiver<Envelope> {
        self.shared.dispatcher.subscribe_topic(msg_type)
    }

    /// Subscribe to the error stream. Transient transport failures,
    /// malformed frames, and reconnect exhaustion all surface here;
    /// nothing is ever thrown at the caller.
    pub fn subscribe_errors(&self) -> broadcast::Receiver<ClientError> {
        self.shared.error_tx.subscribe()
    }
}
