use crate::adapters::outbound::kafka::topic_for_channel;
use crate::common::{DomainError, DomainResult};
use crate::config::KafkaConfig;
use crate::domains::telemetry::InboundMessage;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::Message;
use std::collections::HashMap;
use tokio::sync::{mpsc, watch};

/// Inbound side of the Kafka transport: forwards payloads of the subscribed channels into a
/// local queue. Consumer errors end the subscription; the process is expected to be restarted.
pub struct KafkaSubscriber {
    consumer: StreamConsumer,
    topics: HashMap<String, String>,
}

impl KafkaSubscriber {
    pub fn new(config: &KafkaConfig, group_suffix: &str, channels: &[&str]) -> DomainResult<Self> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", config.brokers.join(","))
            .set("group.id", format!("{}-{}", config.group_id, group_suffix))
            .set("client.id", &config.client_id)
            .set("enable.partition.eof", "false")
            .set("session.timeout.ms", "6000")
            .set("enable.auto.commit", "true")
            .set("auto.offset.reset", "latest")
            .create()
            .map_err(|e| DomainError::TransportError(format!("Failed to create Kafka consumer: {}", e)))?;

        let topics: HashMap<String, String> = channels
            .iter()
            .map(|channel| (topic_for_channel(config, channel).to_string(), channel.to_string()))
            .collect();
        let topic_names: Vec<&str> = topics.keys().map(String::as_str).collect();

        consumer
            .subscribe(&topic_names)
            .map_err(|e| DomainError::TransportError(format!("Failed to subscribe to {:?}: {}", topic_names, e)))?;

        tracing::info!("Subscribed to Kafka topics {:?}", topic_names);
        Ok(Self { consumer, topics })
    }

    /// Runs until shutdown is signalled or the local receiver is dropped.
    pub async fn run(
        self,
        sink: mpsc::Sender<InboundMessage>,
        mut shutdown: watch::Receiver<bool>,
    ) -> DomainResult<()> {
        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    tracing::info!("Kafka subscriber stopping");
                    return Ok(());
                }
                received = self.consumer.recv() => {
                    let inbound = {
                        let message = received
                            .map_err(|e| DomainError::TransportError(format!("Kafka receive error: {}", e)))?;
                        let Some(payload) = message.payload() else {
                            continue;
                        };
                        let channel = self
                            .topics
                            .get(message.topic())
                            .cloned()
                            .unwrap_or_else(|| message.topic().to_string());
                        InboundMessage::new(channel, String::from_utf8_lossy(payload))
                    };

                    if sink.send(inbound).await.is_err() {
                        tracing::info!("Inbound queue closed; Kafka subscriber stopping");
                        return Ok(());
                    }
                }
            }
        }
    }
}
