use crate::common::{ApplicationResult, DomainResult};
use crate::domains::distance::DistanceAggregator;
use crate::domains::logger::DynLogger;
use crate::domains::telemetry::{encode_distance, MessageBus, TOTAL_DISTANCE_CHANNEL};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Folds incoming positions and reports the cumulative distance on its own timer.
/// Ingestion and reporting share one task, so the report never sees a half-applied update.
pub struct DistanceService {
    aggregator: DistanceAggregator,
    bus: Arc<dyn MessageBus>,
    report_interval: Duration,
    logger: DynLogger,
}

impl DistanceService {
    pub fn new(bus: Arc<dyn MessageBus>, report_interval: Duration, logger: DynLogger) -> Self {
        Self {
            aggregator: DistanceAggregator::new(),
            bus,
            report_interval,
            logger,
        }
    }

    pub fn aggregator(&self) -> &DistanceAggregator {
        &self.aggregator
    }

    /// Malformed payloads are logged and dropped; any other failure is returned.
    pub fn on_position(&mut self, raw: &str) -> DomainResult<()> {
        match self.aggregator.on_position(raw) {
            Ok(_) => Ok(()),
            Err(e) if e.is_recoverable() => {
                self.logger.warn(&format!("Dropping position message: {}", e));
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    pub async fn report(&self) -> DomainResult<()> {
        let total = self.aggregator.total_distance();
        self.bus
            .send(TOTAL_DISTANCE_CHANNEL, &encode_distance(total))
            .await
    }

    /// First report goes out one interval after start. Runs until `shutdown` turns true (or its
    /// sender is dropped); a failed report send ends the loop with the error.
    pub async fn run(
        mut self,
        mut positions: mpsc::Receiver<String>,
        mut shutdown: watch::Receiver<bool>,
    ) -> ApplicationResult<DistanceAggregator> {
        let mut report_timer = interval_at(Instant::now() + self.report_interval, self.report_interval);
        report_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut positions_open = true;

        self.logger.info(&format!(
            "Distance aggregation started, reporting every {:?}",
            self.report_interval
        ));

        loop {
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                raw = positions.recv(), if positions_open => match raw {
                    Some(raw) => self.on_position(&raw)?,
                    None => {
                        self.logger.warn("Position stream closed; still reporting the last total");
                        positions_open = false;
                    }
                },
                _ = report_timer.tick() => {
                    if let Err(e) = self.report().await {
                        self.logger.error(&format!("Distance report failed: {}", e));
                        return Err(e.into());
                    }
                    self.logger.info(&format!(
                        "Total distance {} over {} positions ({} rejected)",
                        self.aggregator.total_distance(),
                        self.aggregator.accepted(),
                        self.aggregator.rejected()
                    ));
                }
            }
        }

        Ok(self.aggregator)
    }
}
