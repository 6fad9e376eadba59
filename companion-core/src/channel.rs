use async_trait::async_trait;
use std::fmt::Debug;

use crate::model::OutboundMessage;

/// Outbound half of the watch link.
#[async_trait]
pub trait DeviceChannel: Send + Sync + Debug {
    async fn send(&self, message: &OutboundMessage) -> anyhow::Result<()>;
}
