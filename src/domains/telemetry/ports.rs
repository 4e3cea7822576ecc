use crate::common::DomainResult;
use crate::domains::route::Point;
use async_trait::async_trait;

/// Outbound side of the message transport. Delivery is at-least-once and may reorder.
#[async_trait]
pub trait MessageBus: Send + Sync {
    async fn send(&self, channel: &str, payload: &str) -> DomainResult<()>;
}

/// Append-only feed of generated positions, read by an external renderer.
#[async_trait]
pub trait PositionFeed: Send {
    async fn append(&mut self, point: &Point) -> DomainResult<()>;
}

/// A message delivered by the inbound side of the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub channel: String,
    pub payload: String,
}

impl InboundMessage {
    pub fn new(channel: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            payload: payload.into(),
        }
    }
}
