use crate::common::ApplicationResult;
use crate::domains::logger::DynLogger;
use crate::domains::telemetry::TelemetryPublisher;
use crate::domains::vehicle::ControlUpdate;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval, MissedTickBehavior};

/// Periodic position generation. One task owns the publisher (and through it the vehicle), so a
/// control update always lands between two steps, never inside one.
pub struct SimulationService {
    publisher: TelemetryPublisher,
    tick_interval: Duration,
    logger: DynLogger,
}

impl SimulationService {
    pub fn new(publisher: TelemetryPublisher, tick_interval: Duration, logger: DynLogger) -> Self {
        Self {
            publisher,
            tick_interval,
            logger,
        }
    }

    /// Ticks until `shutdown` turns true (or its sender is dropped) and hands the publisher back.
    /// A failed publish or feed write ends the loop with the error.
    pub async fn run(
        mut self,
        mut control: mpsc::Receiver<ControlUpdate>,
        mut shutdown: watch::Receiver<bool>,
    ) -> ApplicationResult<TelemetryPublisher> {
        let mut ticker = interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut control_open = true;

        self.logger.info(&format!(
            "Simulation started, one position every {:?}",
            self.tick_interval
        ));

        loop {
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                update = control.recv(), if control_open => match update {
                    Some(update) => self.publisher.on_control_update(&update),
                    None => control_open = false,
                },
                _ = ticker.tick() => {
                    if let Err(e) = self.publisher.tick().await {
                        self.logger.error(&format!("Position publishing failed: {}", e));
                        return Err(e.into());
                    }
                }
            }
        }

        self.logger.info(&format!(
            "Simulation stopped after {} positions",
            self.publisher.published()
        ));
        Ok(self.publisher)
    }
}
