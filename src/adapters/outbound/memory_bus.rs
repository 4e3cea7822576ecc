use crate::common::{DomainError, DomainResult};
use crate::domains::telemetry::{InboundMessage, MessageBus};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// In-process message bus for tests and single-process runs.
///
/// Sent messages are recorded (unless built with [`InMemoryBus::forwarding_only`]) and forwarded
/// to the channel's subscriber, if any.
#[derive(Clone)]
pub struct InMemoryBus {
    published: Arc<Mutex<Vec<InboundMessage>>>,
    subscribers: Arc<Mutex<HashMap<String, mpsc::Sender<String>>>>,
    keep_history: bool,
}

impl Default for InMemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBus {
    pub fn new() -> Self {
        Self {
            published: Arc::new(Mutex::new(Vec::new())),
            subscribers: Arc::new(Mutex::new(HashMap::new())),
            keep_history: true,
        }
    }

    /// No history, for long-running in-process pipelines.
    pub fn forwarding_only() -> Self {
        Self {
            keep_history: false,
            ..Self::new()
        }
    }

    /// Replaces any earlier subscriber of `channel`.
    pub fn subscribe(&self, channel: &str, capacity: usize) -> mpsc::Receiver<String> {
        let (tx, rx) = mpsc::channel(capacity);
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(channel.to_string(), tx);
        rx
    }

    pub fn published(&self) -> Vec<InboundMessage> {
        self.published
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn payloads(&self, channel: &str) -> Vec<String> {
        self.published()
            .into_iter()
            .filter(|m| m.channel == channel)
            .map(|m| m.payload)
            .collect()
    }
}

#[async_trait]
impl MessageBus for InMemoryBus {
    async fn send(&self, channel: &str, payload: &str) -> DomainResult<()> {
        if self.keep_history {
            self.published
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .push(InboundMessage::new(channel, payload));
        }

        let subscriber = self
            .subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(channel)
            .cloned();

        if let Some(tx) = subscriber {
            tx.send(payload.to_string()).await.map_err(|_| {
                DomainError::TransportError(format!("subscriber of channel {} has gone away", channel))
            })?;
        }
        Ok(())
    }
}
