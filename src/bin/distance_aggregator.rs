use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tracing::{info, warn};

use vehicle_telemetry::adapters::inbound::KafkaSubscriber;
use vehicle_telemetry::adapters::outbound::{DomainLoggers, KafkaMessageBus};
use vehicle_telemetry::application::{spawn_payload_router, supervise, DistanceService};
use vehicle_telemetry::common::{ApplicationError, ApplicationResult};
use vehicle_telemetry::config::{Config, TransportKind};
use vehicle_telemetry::domains::telemetry::POSITION_CHANNEL;
use vehicle_telemetry::logging::{init_tracing, level_filter};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = Config::resolve_path(std::env::args().nth(1));
    let config = Config::load(Some(&config_path))
        .with_context(|| format!("loading configuration from {}", config_path.display()))?;

    init_tracing(&config.logging.level);
    info!("Starting distance aggregator");

    if config.transport == TransportKind::Memory {
        warn!("Memory transport selected; the simulator runs its own aggregator, using Kafka here");
    }

    let loggers = DomainLoggers::init(config.logging.file.as_deref(), level_filter(&config.logging.level));

    let bus = Arc::new(KafkaMessageBus::new(config.kafka.clone())?);
    let subscriber = KafkaSubscriber::new(&config.kafka, "aggregator", &[POSITION_CHANNEL])?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (inbound_tx, inbound_rx) = mpsc::channel(256);
    let (positions, router) = spawn_payload_router(inbound_rx, POSITION_CHANNEL, 256, shutdown_rx.clone());

    let mut tasks: JoinSet<ApplicationResult<()>> = JoinSet::new();
    tasks.spawn(async move { router.await.map_err(|e| ApplicationError::Task(format!("position router: {}", e))) });
    let shutdown = shutdown_rx.clone();
    tasks.spawn(async move { Ok(subscriber.run(inbound_tx, shutdown).await?) });

    let service = DistanceService::new(
        bus,
        config.aggregator.report_interval(),
        loggers.for_component("distance"),
    );
    tasks.spawn(async move { service.run(positions, shutdown_rx).await.map(|_| ()) });

    supervise(tasks, shutdown_tx).await?;
    info!("Distance aggregator stopped");
    Ok(())
}
