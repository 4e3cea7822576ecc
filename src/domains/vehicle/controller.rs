use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::control::{accepted_parameter, ControlUpdate};
use crate::common::{DomainError, DomainResult};
use crate::domains::logger::DynLogger;
use crate::domains::route::{Point, Track, WaypointGraph};

pub const DEFAULT_AVERAGE_SPEED: f64 = 0.02;
pub const DEFAULT_JITTER: f64 = 0.002;

/// Drives the simulated vehicle around the waypoint graph, one leg at a time.
pub struct VehicleController {
    graph: WaypointGraph,
    origin_index: usize,
    destination_index: usize,
    average_speed: f64,
    jitter: f64,
    track: Track,
    legs_completed: u64,
    rng: StdRng,
    logger: DynLogger,
}

impl VehicleController {
    /// Starts at a uniformly random waypoint, heading for the next one in the cycle.
    ///
    /// A missing or non-positive speed falls back to the default. Jitter may start at zero for a
    /// deterministic path; only missing or negative jitter falls back.
    pub fn new(
        graph: WaypointGraph,
        average_speed: Option<f64>,
        jitter: Option<f64>,
        logger: DynLogger,
    ) -> DomainResult<Self> {
        Self::with_rng(graph, None, average_speed, jitter, StdRng::from_entropy(), logger)
    }

    /// Like [`VehicleController::new`] but reproducible: a fixed seed and an optional fixed start.
    pub fn seeded(
        graph: WaypointGraph,
        start_index: Option<usize>,
        average_speed: Option<f64>,
        jitter: Option<f64>,
        seed: u64,
        logger: DynLogger,
    ) -> DomainResult<Self> {
        Self::with_rng(
            graph,
            start_index,
            average_speed,
            jitter,
            StdRng::seed_from_u64(seed),
            logger,
        )
    }

    fn with_rng(
        graph: WaypointGraph,
        start_index: Option<usize>,
        average_speed: Option<f64>,
        jitter: Option<f64>,
        mut rng: StdRng,
        logger: DynLogger,
    ) -> DomainResult<Self> {
        if graph.len() < 2 {
            return Err(DomainError::invalid_configuration(
                "a vehicle needs at least an origin and a destination waypoint",
            ));
        }

        let origin_index = match start_index {
            Some(i) if i < graph.len() => i,
            Some(i) => {
                return Err(DomainError::invalid_configuration(format!(
                    "start index {} is outside the {} configured waypoints",
                    i,
                    graph.len()
                )))
            }
            None => rng.gen_range(0..graph.len()),
        };
        let destination_index = graph.next_index(origin_index);
        let track = build_track(&graph, origin_index, destination_index)?;

        let controller = Self {
            graph,
            origin_index,
            destination_index,
            average_speed: accepted_parameter(average_speed).unwrap_or(DEFAULT_AVERAGE_SPEED),
            jitter: jitter
                .filter(|v| v.is_finite() && *v >= 0.0)
                .unwrap_or(DEFAULT_JITTER),
            track,
            legs_completed: 0,
            rng,
            logger,
        };
        controller.log_leg_start();
        Ok(controller)
    }

    pub fn average_speed(&self) -> f64 {
        self.average_speed
    }

    pub fn jitter(&self) -> f64 {
        self.jitter
    }

    pub fn origin_index(&self) -> usize {
        self.origin_index
    }

    pub fn destination_index(&self) -> usize {
        self.destination_index
    }

    pub fn legs_completed(&self) -> u64 {
        self.legs_completed
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    /// Returns true when the value was applied.
    pub fn set_average_speed(&mut self, v: f64) -> bool {
        match accepted_parameter(Some(v)) {
            Some(v) => {
                self.average_speed = v;
                true
            }
            None => false,
        }
    }

    /// Returns true when the value was applied.
    pub fn set_jitter(&mut self, v: f64) -> bool {
        match accepted_parameter(Some(v)) {
            Some(v) => {
                self.jitter = v;
                true
            }
            None => false,
        }
    }

    /// Applies every present, accepted field of `update`; returns true if anything changed.
    pub fn apply_update(&mut self, update: &ControlUpdate) -> bool {
        let speed_changed = update
            .average_speed
            .map(|v| self.set_average_speed(v))
            .unwrap_or(false);
        let jitter_changed = update.jitter.map(|v| self.set_jitter(v)).unwrap_or(false);
        speed_changed || jitter_changed
    }

    /// Advances the current leg by one step and starts the next leg once it is finished.
    pub fn next(&mut self) -> DomainResult<Point> {
        let position = self.track.advance(self.average_speed, self.jitter, &mut self.rng);

        if self.track.is_done() {
            self.legs_completed += 1;
            self.logger.info(&format!(
                "Arrived at {} after {} legs",
                self.waypoint_name(self.destination_index),
                self.legs_completed
            ));
            self.origin_index = self.destination_index;
            self.destination_index = self.graph.next_index(self.origin_index);
            self.track = build_track(&self.graph, self.origin_index, self.destination_index)?;
            self.log_leg_start();
        }

        Ok(position)
    }

    fn waypoint_name(&self, index: usize) -> &str {
        self.graph.get(index).map(|w| w.name.as_str()).unwrap_or("?")
    }

    fn log_leg_start(&self) {
        self.logger.info(&format!(
            "Starting leg {} -> {} ({} target points)",
            self.waypoint_name(self.origin_index),
            self.waypoint_name(self.destination_index),
            self.track.targets().len()
        ));
    }
}

fn build_track(graph: &WaypointGraph, origin: usize, destination: usize) -> DomainResult<Track> {
    match (graph.get(origin), graph.get(destination)) {
        (Some(o), Some(d)) => Track::between(o, d),
        _ => Err(DomainError::invalid_configuration(format!(
            "waypoint index out of range: {} -> {}",
            origin, destination
        ))),
    }
}
