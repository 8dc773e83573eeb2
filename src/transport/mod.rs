// Transport boundary: any bidirectional frame channel the client can
// connect over. The connection supervisor is the only component that
// touches a handle.

use async_trait::async_trait;
use std::fmt;

mod ws;

pub use ws::WsTransport;

/// Errors produced by a transport implementation.
#[derive(Debug, Clone)]
pub enum TransportError {
    /// Connection establishment failed.
    Connect(String),
    /// A send or receive on an established connection failed.
    Io(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Connect(msg) => write!(f, "connect failed: {}", msg),
            TransportError::Io(msg) => write!(f, "transport i/o error: {}", msg),
        }
    }
}

impl std::error::Error for TransportError {}

/// A way to establish connections to a streaming endpoint.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    type Handle: TransportHandle;

    /// Establish a connection to `url`.
    async fn connect(&self, url: &str) -> Result<Self::Handle, TransportError>;
}

/// An established bidirectional frame connection.
#[async_trait]
pub trait TransportHandle: Send {
    /// Write one outbound frame.
    async fn send(&mut self, frame: Vec<u8>) -> Result<(), TransportError>;

    /// Wait for the next inbound frame. `None` means the peer closed the
    /// connection.
    async fn next_frame(&mut self) -> Option<Result<Vec<u8>, TransportError>>;

    /// Close the connection. Failures during close are ignored.
    async fn close(&mut self);
}
