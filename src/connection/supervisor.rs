use crate::client::Shared;
use crate::config::ClientConfig;
use crate::connection::{ConnectionState, ReconnectDecision, ReconnectPolicy};
use crate::envelope::{codec, Envelope};
use crate::error::ClientError;
use crate::subscription::{protocol, SubscriptionManager};
use crate::transport::{Transport, TransportHandle};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Imperative operations forwarded from the façade.
pub(crate) enum Command {
    Connect,
    Disconnect,
    Dispose,
    Send { msg_type: String, data: Value },
    Subscribe { channel: String },
    Unsubscribe { channel: String },
}

/// What the supervisor does next.
enum Phase<C> {
    /// Disconnected or failed: wait for a command.
    Idle,
    /// Connecting: one bounded connection attempt.
    Attempt,
    /// Connected: pump frames, keepalive ticks, and commands.
    Session(C),
    /// Reconnecting: wait out the backoff delay.
    Backoff(Duration),
    Shutdown,
}

/// Single-task owner of the transport handle and every connection timer.
///
/// All state transitions, timer ticks, and frames are processed on this
/// one task, so observers see transitions in order and nothing races
/// teardown. The subscription set lives here too and survives every
/// disconnect; only explicit subscribe/unsubscribe commands mutate it.
pub(crate) struct Supervisor<T: Transport> {
    transport: Arc<T>,
    config: ClientConfig,
    policy: ReconnectPolicy,
    subscriptions: SubscriptionManager,
    shared: Arc<Shared>,
    cmd_rx: mpsc::UnboundedReceiver<Command>,
    state: ConnectionState,
    /// Consecutive failed attempts since the last successful connect
    attempts: u32,
}

impl<T: Transport> Supervisor<T> {
    pub(crate) fn new(
        transport: Arc<T>,
        config: ClientConfig,
        shared: Arc<Shared>,
        cmd_rx: mpsc::UnboundedReceiver<Command>,
    ) -> Self {
        let policy = ReconnectPolicy::new(
            config.base_reconnect_delay(),
            config.max_reconnect_attempts,
        );
        Self {
            transport,
            config,
            policy,
            subscriptions: SubscriptionManager::new(),
            shared,
            cmd_rx,
            state: ConnectionState::Disconnected,
            attempts: 0,
        }
    }

    pub(crate) async fn run(mut self) {
        let mut phase = Phase::Idle;
        loop {
            phase = match phase {
                Phase::Idle => self.idle().await,
                Phase::Attempt => self.attempt().await,
                Phase::Session(conn) => self.session(conn).await,
                Phase::Backoff(delay) => self.backoff(delay).await,
                Phase::Shutdown => break,
            };
        }
        debug!("connection supervisor stopped");
    }

    /// Emit a state transition, suppressing consecutive duplicates.
    fn set_state(&mut self, next: ConnectionState) {
        if self.state == next {
            return;
        }
        info!(from = %self.state, to = %next, "connection state");
        self.state = next;
        if !self.shared.is_disposed() {
            let _ = self.shared.state_tx.send(next);
        }
    }

    /// Record one failed attempt and pick the next phase from the policy.
    fn schedule_reconnect(&mut self) -> Phase<T::Handle> {
        self.attempts += 1;
        match self.policy.decide(self.attempts) {
            ReconnectDecision::Retry(delay) => {
                info!(
                    attempt = self.attempts,
                    delay_ms = delay.as_millis() as u64,
                    "scheduling reconnect"
                );
                self.set_state(ConnectionState::Reconnecting);
                Phase::Backoff(delay)
            }
            ReconnectDecision::GiveUp => {
                warn!(attempts = self.attempts, "reconnect attempts exhausted");
                self.shared.emit_error(ClientError::Exhausted {
                    attempts: self.attempts,
                });
                self.set_state(ConnectionState::Failed);
                Phase::Idle
            }
        }
    }

    /// Wait for a command while no connection work is in flight
    /// (disconnected or failed).
    async fn idle(&mut self) -> Phase<T::Handle> {
        loop {
            match self.cmd_rx.recv().await {
                None | Some(Command::Dispose) => return Phase::Shutdown,
                Some(Command::Connect) => {
                    // Explicit connect resets the attempt counter, including
                    // out of the failed state
                    self.attempts = 0;
                    self.set_state(ConnectionState::Connecting);
                    return Phase::Attempt;
                }
                Some(Command::Disconnect) => {
                    self.attempts = 0;
                    self.set_state(ConnectionState::Disconnected);
                }
                Some(Command::Subscribe { channel }) => {
                    self.subscriptions.subscribe(&channel);
                }
                Some(Command::Unsubscribe { channel }) => {
                    self.subscriptions.unsubscribe(&channel);
                }
                Some(Command::Send { msg_type, .. }) => {
                    debug!(msg_type = %msg_type, "send ignored while not connected");
                }
            }
        }
    }

    /// One connection attempt, bounded by the configured timeout.
    /// Commands keep draining while the dial is in flight; disconnect
    /// aborts the attempt.
    async fn attempt(&mut self) -> Phase<T::Handle> {
        info!(url = %self.config.url, "connecting");

        let transport = Arc::clone(&self.transport);
        let url = self.config.url.clone();
        let connect = tokio::time::timeout(self.config.connect_timeout(), async move {
            transport.connect(&url).await
        });
        tokio::pin!(connect);

        loop {
            tokio::select! {
                biased;

                cmd = self.cmd_rx.recv() => match cmd {
                    None | Some(Command::Dispose) => return Phase::Shutdown,
                    Some(Command::Disconnect) => {
                        self.attempts = 0;
                        self.set_state(ConnectionState::Disconnected);
                        return Phase::Idle;
                    }
                    Some(Command::Connect) => {
                        // Already connecting
                    }
                    Some(Command::Subscribe { channel }) => {
                        self.subscriptions.subscribe(&channel);
                    }
                    Some(Command::Unsubscribe { channel }) => {
                        self.subscriptions.unsubscribe(&channel);
                    }
                    Some(Command::Send { msg_type, .. }) => {
                        debug!(msg_type = %msg_type, "send ignored while not connected");
                    }
                },

                result = &mut connect => {
                    return match result {
                        Ok(Ok(conn)) => {
                            info!(url = %self.config.url, "connection established");
                            self.attempts = 0;
                            self.set_state(ConnectionState::Connected);
                            Phase::Session(conn)
                        }
                        Ok(Err(e)) => {
                            warn!(error = %e, "connect failed");
                            self.shared.emit_error(ClientError::Transport(e.to_string()));
                            self.schedule_reconnect()
                        }
                        Err(_) => {
                            warn!(
                                timeout_secs = self.config.connect_timeout_secs,
                                "connect attempt timed out"
                            );
                            self.shared.emit_error(ClientError::Transport(
                                "connect attempt timed out".to_string(),
                            ));
                            self.schedule_reconnect()
                        }
                    };
                },
            }
        }
    }

    /// Connected: replay the subscription set, then pump frames,
    /// keepalive ticks, and commands until the connection drops or the
    /// caller tears down.
    async fn session(&mut self, mut conn: T::Handle) -> Phase<T::Handle> {
        // Full-set replay: the server-side view is rebuilt from scratch on
        // every (re)connect, never patched with deltas
        for channel in self.subscriptions.snapshot() {
            if !self
                .send_or_report(&mut conn, &protocol::subscribe_request(&channel))
                .await
            {
                conn.close().await;
                return self.schedule_reconnect();
            }
        }
        if !self.subscriptions.is_empty() {
            info!(channels = self.subscriptions.len(), "subscription set replayed");
        }

        let period = self.config.keepalive_interval();
        let mut keepalive = interval_at(Instant::now() + period, period);
        keepalive.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                cmd = self.cmd_rx.recv() => match cmd {
                    None | Some(Command::Dispose) => {
                        conn.close().await;
                        return Phase::Shutdown;
                    }
                    Some(Command::Disconnect) => {
                        conn.close().await;
                        self.attempts = 0;
                        self.set_state(ConnectionState::Disconnected);
                        return Phase::Idle;
                    }
                    Some(Command::Connect) => {
                        // Already connected
                    }
                    Some(Command::Send { msg_type, data }) => {
                        let envelope = Envelope::new(&msg_type, data);
                        if !self.send_or_report(&mut conn, &envelope).await {
                            conn.close().await;
                            return self.schedule_reconnect();
                        }
                    }
                    Some(Command::Subscribe { channel }) => {
                        // Send only when newly added; re-subscribing an
                        // already-tracked channel is a no-op on the wire
                        if self.subscriptions.subscribe(&channel) {
                            if !self
                                .send_or_report(&mut conn, &protocol::subscribe_request(&channel))
                                .await
                            {
                                conn.close().await;
                                return self.schedule_reconnect();
                            }
                        }
                    }
                    Some(Command::Unsubscribe { channel }) => {
                        if self.subscriptions.unsubscribe(&channel) {
                            if !self
                                .send_or_report(&mut conn, &protocol::unsubscribe_request(&channel))
                                .await
                            {
                                conn.close().await;
                                return self.schedule_reconnect();
                            }
                        }
                    }
                },

                frame = conn.next_frame() => match frame {
                    Some(Ok(frame)) => self.dispatch_frame(&frame),
                    Some(Err(e)) => {
                        warn!(error = %e, "transport error");
                        self.shared.emit_error(ClientError::Transport(e.to_string()));
                        conn.close().await;
                        return self.schedule_reconnect();
                    }
                    None => {
                        warn!("connection closed by remote");
                        self.shared.emit_error(ClientError::Transport(
                            "connection closed".to_string(),
                        ));
                        return self.schedule_reconnect();
                    }
                },

                _ = keepalive.tick() => {
                    // disconnect/dispose may have halted us between this
                    // tick being queued and the command draining; the tick
                    // counts as cancelled
                    if self.shared.is_halted() {
                        continue;
                    }
                    if !self.send_or_report(&mut conn, &protocol::ping()).await {
                        conn.close().await;
                        return self.schedule_reconnect();
                    }
                },
            }
        }
    }

    /// Wait out the reconnect delay. Subscription changes keep
    /// accumulating for the next replay; disconnect cancels the wait.
    async fn backoff(&mut self, delay: Duration) -> Phase<T::Handle> {
        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                biased;

                cmd = self.cmd_rx.recv() => match cmd {
                    None | Some(Command::Dispose) => return Phase::Shutdown,
                    Some(Command::Disconnect) => {
                        self.attempts = 0;
                        self.set_state(ConnectionState::Disconnected);
                        return Phase::Idle;
                    }
                    Some(Command::Connect) => {
                        // Explicit connect skips the remaining delay and
                        // starts a fresh attempt cycle
                        self.attempts = 0;
                        self.set_state(ConnectionState::Connecting);
                        return Phase::Attempt;
                    }
                    Some(Command::Subscribe { channel }) => {
                        self.subscriptions.subscribe(&channel);
                    }
                    Some(Command::Unsubscribe { channel }) => {
                        self.subscriptions.unsubscribe(&channel);
                    }
                    Some(Command::Send { msg_type, .. }) => {
                        debug!(msg_type = %msg_type, "send ignored while not connected");
                    }
                },

                _ = &mut sleep => {
                    if self.shared.is_halted() {
                        // A disconnect or dispose raced the timer; let the
                        // queued command decide what happens next
                        return Phase::Idle;
                    }
                    self.set_state(ConnectionState::Connecting);
                    return Phase::Attempt;
                },
            }
        }
    }

    /// Decode one inbound frame and route it. A malformed frame is
    /// surfaced on the error stream and consumed; the session continues.
    fn dispatch_frame(&self, frame: &[u8]) {
        match codec::decode(frame) {
            Ok(envelope) => self.shared.publish(envelope),
            Err(e) => {
                warn!(error = %e, "dropping undecodable frame");
                self.shared.emit_error(ClientError::Codec(e.to_string()));
            }
        }
    }

    /// Encode and write one envelope. Codec failures are reported and the
    /// envelope dropped; transport failures are reported and `false`
    /// returned so the caller tears the session down.
    async fn send_or_report(&self, conn: &mut T::Handle, envelope: &Envelope) -> bool {
        let frame = match codec::encode(envelope) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(msg_type = %envelope.msg_type, error = %e, "dropping unencodable envelope");
                self.shared.emit_error(ClientError::Codec(e.to_string()));
                return true;
            }
        };
        match conn.send(frame).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "transport send failed");
                self.shared.emit_error(ClientError::Transport(e.to_string()));
                false
            }
        }
    }
}
