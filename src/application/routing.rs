use crate::domains::logger::DynLogger;
use crate::domains::telemetry::InboundMessage;
use crate::domains::vehicle::ControlUpdate;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Decodes control-plane messages into parameter updates. Undecodable messages are logged and dropped.
/// Stops on shutdown, when the inbound queue closes, or when the update receiver is gone.
pub fn spawn_control_router(
    mut inbound: mpsc::Receiver<InboundMessage>,
    capacity: usize,
    logger: DynLogger,
    mut shutdown: watch::Receiver<bool>,
) -> (mpsc::Receiver<ControlUpdate>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(capacity);
    let handle = tokio::spawn(async move {
        loop {
            let message = tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                message = inbound.recv() => match message {
                    Some(message) => message,
                    None => break,
                },
            };
            match ControlUpdate::from_json(&message.payload) {
                Ok(update) => {
                    if tx.send(update).await.is_err() {
                        break;
                    }
                }
                Err(e) => logger.warn(&format!(
                    "Ignoring control message on {}: {}",
                    message.channel, e
                )),
            }
        }
    });
    (rx, handle)
}

/// Passes through the payloads of one channel; everything else is discarded.
pub fn spawn_payload_router(
    mut inbound: mpsc::Receiver<InboundMessage>,
    channel: &str,
    capacity: usize,
    mut shutdown: watch::Receiver<bool>,
) -> (mpsc::Receiver<String>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(capacity);
    let channel = channel.to_string();
    let handle = tokio::spawn(async move {
        loop {
            let message = tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                message = inbound.recv() => match message {
                    Some(message) => message,
                    None => break,
                },
            };
            if message.channel != channel {
                continue;
            }
            if tx.send(message.payload).await.is_err() {
                break;
            }
        }
    });
    (rx, handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::outbound::RecordingLogger;
    use std::sync::Arc;

    #[tokio::test]
    async fn control_router_skips_bad_json() {
        let logger = RecordingLogger::new();
        let (tx, inbound) = mpsc::channel(4);
        let (_shutdown_tx, shutdown) = watch::channel(false);
        let (mut updates, _handle) = spawn_control_router(inbound, 4, Arc::new(logger.clone()), shutdown);

        tx.send(InboundMessage::new("control", "not json")).await.unwrap();
        tx.send(InboundMessage::new("control", r#"{"AverageSpeed": 0.04}"#)).await.unwrap();

        let update = updates.recv().await.unwrap();
        assert_eq!(update.average_speed, Some(0.04));
        assert!(logger.lines().iter().any(|l| l.starts_with("WARN:Ignoring control message")));
    }

    #[tokio::test]
    async fn payload_router_filters_by_channel() {
        let (tx, inbound) = mpsc::channel(4);
        let (_shutdown_tx, shutdown) = watch::channel(false);
        let (mut payloads, handle) = spawn_payload_router(inbound, "position", 4, shutdown);

        tx.send(InboundMessage::new("control", "{}")).await.unwrap();
        tx.send(InboundMessage::new("position", "1:2")).await.unwrap();
        drop(tx);

        assert_eq!(payloads.recv().await.as_deref(), Some("1:2"));
        assert_eq!(payloads.recv().await, None);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn shutdown_stops_router_while_inbound_is_open() {
        let (_tx, inbound) = mpsc::channel::<InboundMessage>(4);
        let (shutdown_tx, shutdown) = watch::channel(false);
        let (mut updates, handle) = spawn_control_router(inbound, 4, Arc::new(RecordingLogger::new()), shutdown);

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
        assert!(updates.recv().await.is_none());
    }
}
