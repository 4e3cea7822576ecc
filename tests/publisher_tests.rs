use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::{mpsc, watch};
use vehicle_telemetry::adapters::outbound::{init_noop_logger, CsvPositionFeed, InMemoryBus, RecordingLogger};
use vehicle_telemetry::application::SimulationService;
use vehicle_telemetry::domains::route::*;
use vehicle_telemetry::domains::telemetry::*;
use vehicle_telemetry::domains::vehicle::*;
use vehicle_telemetry::{ApplicationError, DomainError, DomainResult};

fn straight_road() -> WaypointGraph {
    WaypointGraph::new(vec![
        Waypoint::new("West", vec![Point::new(0.0, 0.0)]),
        Waypoint::new("East", vec![Point::new(0.0, 10.0)]),
    ])
    .unwrap()
}

/// Breadcrumbs a quarter apart, so every step at speed 0.25 snaps onto an exact point.
fn crumb_road() -> WaypointGraph {
    WaypointGraph::new(vec![
        Waypoint::new("West", vec![Point::new(0.0, 0.0), Point::new(0.0, 0.25)]),
        Waypoint::new("East", vec![Point::new(0.0, 0.5)]),
    ])
    .unwrap()
}

fn vehicle(speed: f64) -> VehicleController {
    VehicleController::seeded(straight_road(), Some(0), Some(speed), Some(0.0), 11, init_noop_logger()).unwrap()
}

async fn publisher_with(
    vehicle: VehicleController,
    bus: Arc<dyn MessageBus>,
    dir: &TempDir,
) -> TelemetryPublisher {
    let feed = CsvPositionFeed::open(dir.path().join("positions.csv")).await.unwrap();
    TelemetryPublisher::new(vehicle, bus, Box::new(feed), init_noop_logger())
}

struct FailingBus;

#[async_trait]
impl MessageBus for FailingBus {
    async fn send(&self, _channel: &str, _payload: &str) -> DomainResult<()> {
        Err(DomainError::TransportError("no route to broker".to_string()))
    }
}

struct FailingFeed;

#[async_trait]
impl PositionFeed for FailingFeed {
    async fn append(&mut self, _point: &Point) -> DomainResult<()> {
        Err(DomainError::IoError(std::io::Error::new(
            std::io::ErrorKind::Other,
            "disk full",
        )))
    }
}

#[tokio::test]
async fn test_positions_go_to_bus_and_feed() {
    let dir = TempDir::new().unwrap();
    let bus = InMemoryBus::new();
    let vehicle =
        VehicleController::seeded(crumb_road(), Some(0), Some(0.25), Some(0.0), 11, init_noop_logger()).unwrap();
    let mut publisher = publisher_with(vehicle, Arc::new(bus.clone()), &dir).await;

    for _ in 0..3 {
        publisher.tick().await.unwrap();
    }

    assert_eq!(bus.payloads(POSITION_CHANNEL), vec!["0:0", "0:0.25", "0:0.5"]);
    let csv = tokio::fs::read_to_string(dir.path().join("positions.csv")).await.unwrap();
    assert_eq!(csv, "lng,lat\n0,0\n0.25,0\n0.5,0\n");
    assert_eq!(publisher.published(), 3);
}

#[tokio::test]
async fn test_control_update_doubles_step_without_resetting_position() {
    let dir = TempDir::new().unwrap();
    let bus = InMemoryBus::new();
    let mut publisher = publisher_with(vehicle(0.02), Arc::new(bus.clone()), &dir).await;

    publisher.tick().await.unwrap();
    let before = publisher.tick().await.unwrap();
    assert!((before.lng - 0.02).abs() < 1e-12);

    publisher.on_control_update(&ControlUpdate::from_json(r#"{"AverageSpeed": 0.04}"#).unwrap());
    let after = publisher.tick().await.unwrap();

    assert!((after.lng - before.lng - 0.04).abs() < 1e-12);
    assert_eq!(publisher.controller().average_speed(), 0.04);
}

#[tokio::test]
async fn test_control_updates_are_idempotent_and_sparse() {
    let dir = TempDir::new().unwrap();
    let logger = RecordingLogger::new();
    let feed = CsvPositionFeed::open(dir.path().join("positions.csv")).await.unwrap();
    let mut publisher = TelemetryPublisher::new(
        vehicle(0.02),
        Arc::new(InMemoryBus::new()),
        Box::new(feed),
        Arc::new(logger.clone()),
    );

    // Before any position has been generated.
    let update = ControlUpdate::default().with_jitter(0.005);
    publisher.on_control_update(&update);
    publisher.on_control_update(&update);
    assert_eq!(publisher.controller().jitter(), 0.005);
    assert_eq!(publisher.controller().average_speed(), 0.02);

    publisher.on_control_update(&ControlUpdate::default().with_average_speed(0.0).with_jitter(-1.0));
    assert_eq!(publisher.controller().average_speed(), 0.02);
    assert_eq!(publisher.controller().jitter(), 0.005);
    assert!(logger.lines().iter().any(|l| l.starts_with("WARN:")));
}

#[tokio::test]
async fn test_transport_failure_is_returned_and_nothing_is_persisted() {
    let dir = TempDir::new().unwrap();
    let mut publisher = publisher_with(vehicle(0.25), Arc::new(FailingBus), &dir).await;

    let err = publisher.tick().await.unwrap_err();
    assert!(matches!(err, DomainError::TransportError(_)));
    assert_eq!(publisher.published(), 0);

    let csv = tokio::fs::read_to_string(dir.path().join("positions.csv")).await.unwrap();
    assert_eq!(csv, "lng,lat\n");
}

#[tokio::test]
async fn test_feed_write_failure_is_returned_from_tick() {
    let bus = InMemoryBus::new();
    let mut publisher =
        TelemetryPublisher::new(vehicle(0.25), Arc::new(bus.clone()), Box::new(FailingFeed), init_noop_logger());

    let err = publisher.tick().await.unwrap_err();
    assert!(matches!(err, DomainError::IoError(_)));
    assert_eq!(publisher.published(), 0);
}

#[tokio::test]
async fn test_feed_write_failure_ends_the_simulation() {
    let publisher = TelemetryPublisher::new(
        vehicle(0.25),
        Arc::new(InMemoryBus::new()),
        Box::new(FailingFeed),
        init_noop_logger(),
    );
    let service = SimulationService::new(publisher, Duration::from_millis(5), init_noop_logger());

    let (_control_tx, control_rx) = mpsc::channel(1);
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let result = service.run(control_rx, shutdown_rx).await;

    assert!(matches!(result, Err(ApplicationError::Domain(DomainError::IoError(_)))));
}

#[tokio::test]
async fn test_largest_finite_jitter_keeps_ticking() {
    let dir = TempDir::new().unwrap();
    let bus = InMemoryBus::new();
    let mut publisher = publisher_with(vehicle(0.25), Arc::new(bus.clone()), &dir).await;

    publisher.on_control_update(&ControlUpdate::from_json(r#"{"Jitter": 1.7976931348623157e308}"#).unwrap());
    assert_eq!(publisher.controller().jitter(), f64::MAX);

    for _ in 0..5 {
        publisher.tick().await.unwrap();
    }
    assert_eq!(publisher.published(), 5);
}
