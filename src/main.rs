use anyhow::Result;
use pulse::client::StreamClient;
use pulse::config::{load_config, MonitorConfig};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pulse=info".into()),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => load_config(&path)
            .map_err(|e| anyhow::anyhow!("failed to load config {}: {}", path, e))?,
        None => MonitorConfig::default(),
    };

    info!(url = %config.client.url, "pulse monitor starting");

    let client = StreamClient::new(config.client.clone());

    let mut states = client.subscribe_state();
    let mut errors = client.subscribe_errors();
    let mut messages = BroadcastStream::new(client.subscribe_messages());

    for channel in &config.channels {
        info!(channel = %channel, "subscribing");
        client.subscribe(channel);
    }
    client.connect();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                break;
            }

            result = states.recv() => match result {
                Ok(state) => info!(state = %state, "connection state"),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped = skipped, "state stream lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },

            Some(message) = messages.next() => match message {
                Ok(envelope) => {
                    info!(msg_type = %envelope.msg_type, data = %envelope.data, "message");
                }
                Err(_) => warn!("message stream lagged"),
            },

            result = errors.recv() => match result {
                Ok(error) => warn!(error = %error, "stream error"),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped = skipped, "error stream lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    client.disconnect();
    client.dispose();
    Ok(())
}
