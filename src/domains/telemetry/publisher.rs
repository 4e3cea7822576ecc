use std::sync::Arc;

use super::codec::encode_position;
use super::ports::{MessageBus, PositionFeed};
use super::POSITION_CHANNEL;
use crate::common::DomainResult;
use crate::domains::logger::DynLogger;
use crate::domains::route::Point;
use crate::domains::vehicle::{ControlUpdate, VehicleController};

/// Owns the vehicle and pushes every generated position to the bus and the feed.
pub struct TelemetryPublisher {
    controller: VehicleController,
    bus: Arc<dyn MessageBus>,
    feed: Box<dyn PositionFeed>,
    logger: DynLogger,
    published: u64,
}

impl TelemetryPublisher {
    pub fn new(
        controller: VehicleController,
        bus: Arc<dyn MessageBus>,
        feed: Box<dyn PositionFeed>,
        logger: DynLogger,
    ) -> Self {
        Self {
            controller,
            bus,
            feed,
            logger,
            published: 0,
        }
    }

    pub fn controller(&self) -> &VehicleController {
        &self.controller
    }

    pub fn published(&self) -> u64 {
        self.published
    }

    /// One generation step: advance, publish, persist.
    pub async fn tick(&mut self) -> DomainResult<Point> {
        let position = self.controller.next()?;
        self.publish_position(&position).await?;
        Ok(position)
    }

    pub async fn publish_position(&mut self, p: &Point) -> DomainResult<()> {
        self.bus.send(POSITION_CHANNEL, &encode_position(p)).await?;
        self.feed.append(p).await?;
        self.published += 1;
        Ok(())
    }

    pub fn on_control_update(&mut self, update: &ControlUpdate) {
        if self.controller.apply_update(update) {
            self.logger.info(&format!(
                "Control update applied: average speed {}, jitter {}",
                self.controller.average_speed(),
                self.controller.jitter()
            ));
        } else if !update.is_empty() {
            self.logger
                .warn(&format!("Control update {:?} carried no usable values", update));
        }
    }
}
