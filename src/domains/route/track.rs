use super::types::{distance_between, Point, Waypoint};
use crate::common::{DomainError, DomainResult};
use rand::Rng;

/// One leg of the route: an owned sequence of target points and a cursor moving along it.
#[derive(Debug, Clone)]
pub struct Track {
    targets: Vec<Point>,
    index: usize,
    position: Point,
}

impl Track {
    pub fn new(targets: Vec<Point>) -> DomainResult<Self> {
        let position = *targets
            .first()
            .ok_or_else(|| DomainError::invalid_configuration("a track needs at least one target point"))?;
        Ok(Self {
            targets,
            index: 0,
            position,
        })
    }

    /// Origin crumbs as listed, followed by the destination crumbs reversed.
    pub fn between(origin: &Waypoint, destination: &Waypoint) -> DomainResult<Self> {
        let targets: Vec<Point> = origin
            .breadcrumbs
            .iter()
            .chain(destination.breadcrumbs.iter().rev())
            .copied()
            .collect();
        Self::new(targets)
    }

    pub fn is_done(&self) -> bool {
        self.index >= self.targets.len()
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn targets(&self) -> &[Point] {
        &self.targets
    }

    pub fn cursor(&self) -> usize {
        self.index
    }

    /// Moves toward the current target by at most `speed`, snapping onto it when close enough.
    pub fn advance<R: Rng + ?Sized>(&mut self, speed: f64, jitter: f64, rng: &mut R) -> Point {
        let Some(target) = self.targets.get(self.index).copied() else {
            return self.position;
        };

        let d = distance_between(&self.position, &target);
        if d <= speed {
            self.position = target;
            self.index += 1;
            return self.position;
        }

        let fraction = speed / d;
        self.position.lat += (target.lat - self.position.lat) * fraction + perturbation(jitter, rng);
        self.position.lng += (target.lng - self.position.lng) * fraction + perturbation(jitter, rng);
        self.position
    }
}

/// Uniform in `[-jitter, jitter)`. Scaling a unit sample keeps huge jitter values from
/// overflowing the range width.
fn perturbation<R: Rng + ?Sized>(jitter: f64, rng: &mut R) -> f64 {
    if jitter > 0.0 {
        jitter * (2.0 * rng.gen::<f64>() - 1.0)
    } else {
        0.0
    }
}
