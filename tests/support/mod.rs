// Shared test support: a scripted in-memory transport and assertion
// helpers. Tests drive the client through the public Transport seam
// instead of a real network.

#![allow(dead_code)]

use async_trait::async_trait;
use pulse::config::ClientConfig;
use pulse::connection::ConnectionState;
use pulse::envelope::{codec, Envelope};
use pulse::transport::{Transport, TransportError, TransportHandle};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};

/// Outcome of the next scripted connect call.
#[derive(Debug, Clone, Copy)]
pub enum ConnectScript {
    /// Hand out a working in-memory connection.
    Accept,
    /// Fail immediately, like a refused connection.
    Refuse,
    /// Never resolve, to exercise the connect timeout.
    Stall,
}

type Link = mpsc::UnboundedSender<Result<Vec<u8>, TransportError>>;

/// In-memory transport driven by a per-connect script.
///
/// Outbound frames are decoded and recorded; tests inject inbound frames
/// or drop the link to simulate a mid-session connection loss. Dials
/// beyond the script are refused, so an unexpected reconnect shows up as
/// a failed attempt rather than passing silently.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<VecDeque<ConnectScript>>>,
    sent: Arc<Mutex<Vec<Envelope>>>,
    links: Arc<Mutex<Vec<Link>>>,
    dials: Arc<AtomicUsize>,
}

impl ScriptedTransport {
    pub fn new(script: impl IntoIterator<Item = ConnectScript>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into_iter().collect())),
            ..Self::default()
        }
    }

    /// Append one more scripted connect outcome.
    pub fn push_script(&self, step: ConnectScript) {
        self.script.lock().unwrap().push_back(step);
    }

    /// Number of connect calls observed so far.
    pub fn dials(&self) -> usize {
        self.dials.load(Ordering::SeqCst)
    }

    /// Every envelope written by the client, in send order.
    pub fn sent(&self) -> Vec<Envelope> {
        self.sent.lock().unwrap().clone()
    }

    /// Sent envelopes of one type only.
    pub fn sent_of_type(&self, msg_type: &str) -> Vec<Envelope> {
        self.sent()
            .into_iter()
            .filter(|e| e.msg_type == msg_type)
            .collect()
    }

    /// Push a raw inbound frame onto the most recent connection.
    pub fn inject_frame(&self, frame: Vec<u8>) {
        let links = self.links.lock().unwrap();
        links
            .last()
            .expect("no connection to inject into")
            .send(Ok(frame))
            .expect("connection already closed");
    }

    /// Push an inbound envelope onto the most recent connection.
    pub fn inject_envelope(&self, envelope: &Envelope) {
        self.inject_frame(codec::encode(envelope).unwrap());
    }

    /// Drop the most recent connection, as a mid-session network loss.
    pub fn drop_connection(&self) {
        let link = self.links.lock().unwrap().pop();
        drop(link.expect("no connection to drop"));
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    type Handle = ScriptedConnection;

    async fn connect(&self, _url: &str) -> Result<ScriptedConnection, TransportError> {
        self.dials.fetch_add(1, Ordering::SeqCst);
        let step = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(ConnectScript::Refuse);

        match step {
            ConnectScript::Refuse => {
                Err(TransportError::Connect("connection refused".to_string()))
            }
            ConnectScript::Stall => std::future::pending().await,
            ConnectScript::Accept => {
                let (link, inbound) = mpsc::unbounded_channel();
                self.links.lock().unwrap().push(link);
                Ok(ScriptedConnection {
                    inbound,
                    sent: Arc::clone(&self.sent),
                })
            }
        }
    }
}

pub struct ScriptedConnection {
    inbound: mpsc::UnboundedReceiver<Result<Vec<u8>, TransportError>>,
    sent: Arc<Mutex<Vec<Envelope>>>,
}

#[async_trait]
impl TransportHandle for ScriptedConnection {
    async fn send(&mut self, frame: Vec<u8>) -> Result<(), TransportError> {
        let envelope =
            codec::decode(&frame).map_err(|e| TransportError::Io(e.to_string()))?;
        self.sent.lock().unwrap().push(envelope);
        Ok(())
    }

    async fn next_frame(&mut self) -> Option<Result<Vec<u8>, TransportError>> {
        self.inbound.recv().await
    }

    async fn close(&mut self) {
        self.inbound.close();
    }
}

/// Client config tuned for virtual-time tests: 1s base delay, 30s
/// keepalive, 5s connect timeout.
pub fn test_config(max_reconnect_attempts: u32) -> ClientConfig {
    ClientConfig {
        url: "ws://mock.invalid/stream".to_string(),
        keepalive_interval_secs: 30,
        base_reconnect_delay_ms: 1000,
        max_reconnect_attempts,
        connect_timeout_secs: 5,
    }
}

/// Assert the next emitted connection state.
pub async fn expect_state(
    states: &mut broadcast::Receiver<ConnectionState>,
    want: ConnectionState,
) {
    let got = tokio::time::timeout(Duration::from_secs(60), states.recv())
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for state {}", want))
        .expect("state stream closed");
    assert_eq!(got, want);
}

/// Let queued commands and timer completions drain through the
/// supervisor without reaching the next keepalive tick.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(5)).await;
}
