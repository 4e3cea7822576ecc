use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::{mpsc, watch};
use tokio_test::{assert_err, assert_ok};
use vehicle_telemetry::adapters::outbound::{init_noop_logger, CsvPositionFeed, InMemoryBus, RecordingLogger};
use vehicle_telemetry::application::{DistanceService, SimulationService};
use vehicle_telemetry::domains::route::*;
use vehicle_telemetry::domains::telemetry::*;
use vehicle_telemetry::domains::vehicle::*;
use vehicle_telemetry::{ApplicationError, DomainError};

fn road() -> WaypointGraph {
    WaypointGraph::new(vec![
        Waypoint::new("North", vec![Point::new(1.0, 0.0)]),
        Waypoint::new("South", vec![Point::new(-1.0, 0.0)]),
    ])
    .unwrap()
}

async fn publisher(bus: &InMemoryBus, dir: &TempDir, speed: f64) -> TelemetryPublisher {
    let vehicle = VehicleController::seeded(road(), Some(0), Some(speed), Some(0.0), 5, init_noop_logger()).unwrap();
    let feed = CsvPositionFeed::open(dir.path().join("positions.csv")).await.unwrap();
    TelemetryPublisher::new(vehicle, Arc::new(bus.clone()), Box::new(feed), init_noop_logger())
}

#[tokio::test]
async fn test_simulation_ticks_until_shutdown() {
    let dir = TempDir::new().unwrap();
    let bus = InMemoryBus::new();
    let service = SimulationService::new(publisher(&bus, &dir, 0.01).await, Duration::from_millis(10), init_noop_logger());

    let (_control_tx, control_rx) = mpsc::channel(4);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(service.run(control_rx, shutdown_rx));

    tokio::time::sleep(Duration::from_millis(120)).await;
    shutdown_tx.send(true).unwrap();
    let publisher = assert_ok!(handle.await.unwrap());

    let positions = bus.payloads(POSITION_CHANNEL);
    assert!(positions.len() >= 3, "only {} positions", positions.len());
    assert_eq!(publisher.published() as usize, positions.len());

    let csv = tokio::fs::read_to_string(dir.path().join("positions.csv")).await.unwrap();
    assert_eq!(csv.lines().count(), positions.len() + 1);
    assert_eq!(csv.lines().next(), Some("lng,lat"));
}

#[tokio::test]
async fn test_control_updates_reach_the_running_vehicle() {
    let dir = TempDir::new().unwrap();
    let bus = InMemoryBus::new();
    let service = SimulationService::new(publisher(&bus, &dir, 0.01).await, Duration::from_millis(10), init_noop_logger());

    let (control_tx, control_rx) = mpsc::channel(4);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Queued before the first tick.
    control_tx
        .send(ControlUpdate::default().with_average_speed(0.02))
        .await
        .unwrap();
    let handle = tokio::spawn(service.run(control_rx, shutdown_rx));

    tokio::time::sleep(Duration::from_millis(50)).await;
    control_tx
        .send(ControlUpdate::default().with_jitter(0.0001))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    shutdown_tx.send(true).unwrap();

    let publisher = assert_ok!(handle.await.unwrap());
    assert_eq!(publisher.controller().average_speed(), 0.02);
    assert_eq!(publisher.controller().jitter(), 0.0001);
}

#[tokio::test]
async fn test_distance_reports_are_cumulative_and_periodic() {
    let bus = InMemoryBus::new();
    let service = DistanceService::new(Arc::new(bus.clone()), Duration::from_millis(40), init_noop_logger());

    let (positions_tx, positions_rx) = mpsc::channel(16);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(service.run(positions_rx, shutdown_rx));

    for raw in ["0:0", "3:4"] {
        positions_tx.send(raw.to_string()).await.unwrap();
    }
    tokio::time::sleep(Duration::from_millis(100)).await;
    positions_tx.send("3:10".to_string()).await.unwrap();
    positions_tx.send("not a position".to_string()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown_tx.send(true).unwrap();

    let aggregator = assert_ok!(handle.await.unwrap());
    assert_eq!(aggregator.total_distance(), 11.0);
    assert_eq!(aggregator.rejected(), 1);

    let reports: Vec<f64> = bus
        .payloads(TOTAL_DISTANCE_CHANNEL)
        .iter()
        .map(|p| p.parse().unwrap())
        .collect();
    assert!(reports.len() >= 3, "only {} reports", reports.len());
    assert!(reports.windows(2).all(|w| w[0] <= w[1]));
    assert!(reports.contains(&5.0));
    assert_eq!(reports.last(), Some(&11.0));
}

#[tokio::test]
async fn test_generator_feeds_aggregator_over_in_memory_bus() {
    let dir = TempDir::new().unwrap();
    let bus = InMemoryBus::new();
    let positions = bus.subscribe(POSITION_CHANNEL, 64);
    let logger = RecordingLogger::new();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let distance = DistanceService::new(Arc::new(bus.clone()), Duration::from_millis(30), Arc::new(logger.clone()));
    let distance_handle = tokio::spawn(distance.run(positions, shutdown_rx.clone()));

    let simulation = SimulationService::new(publisher(&bus, &dir, 0.5).await, Duration::from_millis(5), init_noop_logger());
    let (_control_tx, control_rx) = mpsc::channel(1);
    let simulation_handle = tokio::spawn(simulation.run(control_rx, shutdown_rx));

    tokio::time::sleep(Duration::from_millis(150)).await;
    shutdown_tx.send(true).unwrap();

    let publisher = assert_ok!(simulation_handle.await.unwrap());
    let aggregator = assert_ok!(distance_handle.await.unwrap());

    // Straight back-and-forth road with no jitter: every step is at most the speed.
    assert!(aggregator.accepted() >= 1);
    assert!(aggregator.accepted() <= publisher.published());
    assert!(aggregator.total_distance() <= 0.5 * publisher.published() as f64 + 1e-9);
    assert!(publisher.controller().legs_completed() >= 1);
    assert!(!bus.payloads(TOTAL_DISTANCE_CHANNEL).is_empty());
    assert!(logger.lines().iter().any(|l| l.starts_with("INFO:Total distance")));
}

#[tokio::test]
async fn test_report_failure_stops_the_aggregator() {
    let bus = InMemoryBus::new();
    // A subscriber that is gone makes every send on that channel fail.
    drop(bus.subscribe(TOTAL_DISTANCE_CHANNEL, 1));
    let service = DistanceService::new(Arc::new(bus.clone()), Duration::from_millis(10), init_noop_logger());

    let (_positions_tx, positions_rx) = mpsc::channel(1);
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let result = service.run(positions_rx, shutdown_rx).await;

    let err = assert_err!(result);
    assert!(matches!(err, ApplicationError::Domain(DomainError::TransportError(_))));
}

#[tokio::test]
async fn test_reports_reach_a_total_distance_subscriber_without_history() {
    let bus = InMemoryBus::forwarding_only();
    let mut totals = bus.subscribe(TOTAL_DISTANCE_CHANNEL, 4);
    let service = DistanceService::new(Arc::new(bus.clone()), Duration::from_millis(10), init_noop_logger());

    let (positions_tx, positions_rx) = mpsc::channel(4);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    positions_tx.send("0:0".to_string()).await.unwrap();
    positions_tx.send("0:2".to_string()).await.unwrap();
    let handle = tokio::spawn(service.run(positions_rx, shutdown_rx));

    let first = tokio::time::timeout(Duration::from_secs(1), totals.recv()).await.unwrap();
    assert_eq!(first.as_deref(), Some("2"));
    assert!(bus.published().is_empty());

    shutdown_tx.send(true).unwrap();
    assert_ok!(handle.await.unwrap());
}
