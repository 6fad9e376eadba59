use anyhow::{Context, Result};
use async_trait::async_trait;
use companion_core::{DeviceChannel, OutboundMessage};
use tokio::io::AsyncWriteExt;

/// Writes each outbound message to stdout as one line of JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutChannel;

#[async_trait]
impl DeviceChannel for StdoutChannel {
    async fn send(&self, message: &OutboundMessage) -> Result<()> {
        let mut line = serde_json::to_string(message).context("Failed to encode watch message")?;
        line.push('\n');

        let mut out = tokio::io::stdout();
        out.write_all(line.as_bytes())
            .await
            .context("Failed to write to stdout")?;
        out.flush().await.context("Failed to flush stdout")
    }
}
