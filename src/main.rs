use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tracing::info;
use uuid::Uuid;

use vehicle_telemetry::adapters::inbound::KafkaSubscriber;
use vehicle_telemetry::adapters::outbound::{CsvPositionFeed, DomainLoggers, InMemoryBus, KafkaMessageBus};
use vehicle_telemetry::application::{spawn_control_router, supervise, DistanceService, SimulationService};
use vehicle_telemetry::common::{ApplicationError, ApplicationResult};
use vehicle_telemetry::config::{Config, TransportKind};
use vehicle_telemetry::domains::route::load_waypoints;
use vehicle_telemetry::domains::telemetry::{
    InboundMessage, MessageBus, TelemetryPublisher, CONTROL_CHANNEL, POSITION_CHANNEL,
    TOTAL_DISTANCE_CHANNEL,
};
use vehicle_telemetry::domains::vehicle::VehicleController;
use vehicle_telemetry::logging::{init_tracing, level_filter};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = Config::resolve_path(std::env::args().nth(1));
    let config = Config::load(Some(&config_path))
        .with_context(|| format!("loading configuration from {}", config_path.display()))?;

    init_tracing(&config.logging.level);
    info!("Starting vehicle telemetry simulator");
    info!("Transport: {:?}", config.transport);

    let loggers = DomainLoggers::init(config.logging.file.as_deref(), level_filter(&config.logging.level));

    let graph = load_waypoints(&config.simulation.waypoints_file).with_context(|| {
        format!(
            "loading waypoints from {}",
            config.simulation.waypoints_file.display()
        )
    })?;
    info!("Loaded {} waypoints", graph.len());

    let sim = &config.simulation;
    let vehicle_logger = loggers.for_component("vehicle");
    let controller = match sim.seed {
        Some(seed) => VehicleController::seeded(
            graph,
            None,
            Some(sim.average_speed),
            Some(sim.jitter),
            seed,
            vehicle_logger,
        ),
        None => VehicleController::new(graph, Some(sim.average_speed), Some(sim.jitter), vehicle_logger),
    }?;

    let feed = CsvPositionFeed::open(&sim.feed_path)
        .await
        .with_context(|| format!("opening position feed {}", sim.feed_path.display()))?;
    info!("Appending positions to {}", feed.path().display());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut tasks: JoinSet<ApplicationResult<()>> = JoinSet::new();
    let (inbound_tx, inbound_rx) = mpsc::channel::<InboundMessage>(64);

    let bus: Arc<dyn MessageBus> = match config.transport {
        TransportKind::Kafka => {
            let bus = KafkaMessageBus::new(config.kafka.clone())?;
            // Own consumer group per instance: every simulator sees every control message.
            let group = format!("simulator-{}", Uuid::new_v4());
            let subscriber = KafkaSubscriber::new(&config.kafka, &group, &[CONTROL_CHANNEL])?;
            let shutdown = shutdown_rx.clone();
            tasks.spawn(async move { Ok(subscriber.run(inbound_tx, shutdown).await?) });
            Arc::new(bus)
        }
        TransportKind::Memory => {
            let bus = InMemoryBus::forwarding_only();
            let positions = bus.subscribe(POSITION_CHANNEL, 256);
            let distance = DistanceService::new(
                Arc::new(bus.clone()),
                config.aggregator.report_interval(),
                loggers.for_component("distance"),
            );
            let shutdown = shutdown_rx.clone();
            tasks.spawn(async move { distance.run(positions, shutdown).await.map(|_| ()) });

            // Ends once every bus handle, and with it the sender, has been dropped.
            let mut totals = bus.subscribe(TOTAL_DISTANCE_CHANNEL, 16);
            tasks.spawn(async move {
                while let Some(total) = totals.recv().await {
                    info!(total_distance = %total, "Total distance report");
                }
                Ok(())
            });

            info!("Reading control updates as JSON lines from stdin");
            std::thread::spawn(move || {
                for line in std::io::stdin().lines() {
                    let Ok(line) = line else { break };
                    if line.trim().is_empty() {
                        continue;
                    }
                    if inbound_tx.blocking_send(InboundMessage::new(CONTROL_CHANNEL, line)).is_err() {
                        break;
                    }
                }
            });
            Arc::new(bus)
        }
    };

    let (control_rx, router) = spawn_control_router(
        inbound_rx,
        16,
        loggers.for_component("control"),
        shutdown_rx.clone(),
    );
    tasks.spawn(async move { router.await.map_err(|e| ApplicationError::Task(format!("control router: {}", e))) });
    let publisher = TelemetryPublisher::new(controller, bus, Box::new(feed), loggers.for_component("publisher"));
    let simulation = SimulationService::new(publisher, sim.tick_interval(), loggers.for_component("simulation"));
    tasks.spawn(async move { simulation.run(control_rx, shutdown_rx).await.map(|_| ()) });

    supervise(tasks, shutdown_tx).await?;
    info!("Vehicle telemetry simulator stopped");
    Ok(())
}
