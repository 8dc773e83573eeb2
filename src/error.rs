use std::fmt;

/// Failures surfaced on the client's error stream.
///
/// None of these are ever raised into caller control flow; every variant
/// is pushed onto the error stream and the connection machinery decides
/// how to recover.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientError {
    /// Transport-level failure: refused or timed-out connect, mid-session
    /// error, or the peer closing the connection.
    Transport(String),
    /// A frame that could not be decoded, or an envelope that could not be
    /// encoded. The frame is dropped; the connection is unaffected.
    Codec(String),
    /// Reconnection attempts exhausted; the client entered the failed
    /// state and will not retry until an explicit connect.
    Exhausted { attempts: u32 },
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Transport(msg) => write!(f, "transport error: {}", msg),
            ClientError::Codec(msg) => write!(f, "frame codec error: {}", msg),
            ClientError::Exhausted { attempts } => {
                write!(f, "giving up after {} failed connection attempts", attempts)
            }
        }
    }
}

impl std::error::Error for ClientError {}
