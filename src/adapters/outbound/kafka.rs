use crate::common::{DomainError, DomainResult};
use crate::config::KafkaConfig;
use crate::domains::telemetry::{MessageBus, CONTROL_CHANNEL, POSITION_CHANNEL, TOTAL_DISTANCE_CHANNEL};
use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use std::time::Duration;

/// Kafka-backed outbound transport. Logical channels map onto the configured topics.
pub struct KafkaMessageBus {
    producer: FutureProducer,
    config: KafkaConfig,
    key: String,
}

impl KafkaMessageBus {
    pub fn new(config: KafkaConfig) -> DomainResult<Self> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", config.brokers.join(","))
            .set("client.id", &config.client_id)
            .set("message.timeout.ms", "5000")
            .create()
            .map_err(|e| DomainError::TransportError(format!("Failed to create Kafka producer: {}", e)))?;

        Ok(Self {
            producer,
            key: config.client_id.clone(),
            config,
        })
    }

    pub fn topic_for_channel<'a>(&'a self, channel: &'a str) -> &'a str {
        topic_for_channel(&self.config, channel)
    }
}

pub fn topic_for_channel<'a>(config: &'a KafkaConfig, channel: &'a str) -> &'a str {
    match channel {
        POSITION_CHANNEL => &config.topics.position,
        TOTAL_DISTANCE_CHANNEL => &config.topics.total_distance,
        CONTROL_CHANNEL => &config.topics.control,
        other => other,
    }
}

#[async_trait]
impl MessageBus for KafkaMessageBus {
    async fn send(&self, channel: &str, payload: &str) -> DomainResult<()> {
        let topic = self.topic_for_channel(channel);
        let record = FutureRecord::to(topic).key(&self.key).payload(payload);

        self.producer
            .send(record, Duration::from_secs(5))
            .await
            .map_err(|(e, _)| DomainError::TransportError(format!("Failed to send to Kafka topic {}: {}", topic, e)))?;

        Ok(())
    }
}
