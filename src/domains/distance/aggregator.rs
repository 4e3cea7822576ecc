use crate::common::DomainResult;
use crate::domains::route::{distance_between, Point};
use crate::domains::telemetry::decode_position;

/// Running travelled distance over a position stream, in arrival order.
///
/// Messages are neither reordered nor deduplicated: a redelivered or late position is measured
/// against whatever arrived just before it. State lives for the process only.
#[derive(Debug, Clone, Default)]
pub struct DistanceAggregator {
    total_distance: f64,
    last_position: Option<Point>,
    accepted: u64,
    rejected: u64,
}

impl DistanceAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_distance(&self) -> f64 {
        self.total_distance
    }

    pub fn last_position(&self) -> Option<Point> {
        self.last_position
    }

    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    /// Folds one raw `"<lat>:<lng>"` payload into the total and returns the distance it added.
    /// A malformed payload leaves the distance and last position untouched.
    pub fn on_position(&mut self, raw: &str) -> DomainResult<f64> {
        let point = match decode_position(raw) {
            Ok(p) => p,
            Err(e) => {
                self.rejected += 1;
                return Err(e);
            }
        };
        Ok(self.record(point))
    }

    pub fn record(&mut self, point: Point) -> f64 {
        let step = self
            .last_position
            .map(|last| distance_between(&last, &point))
            .unwrap_or(0.0);
        self.total_distance += step;
        self.last_position = Some(point);
        self.accepted += 1;
        step
    }
}
