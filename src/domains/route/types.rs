use crate::common::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};

/// A planar coordinate. Serialized as a `[lat, lng]` pair to match the waypoint file layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Point {
    pub lat: f64,
    pub lng: f64,
}

impl Point {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Planar (not geodesic) distance.
pub fn distance_between(a: &Point, b: &Point) -> f64 {
    let d_lat = a.lat - b.lat;
    let d_lng = a.lng - b.lng;
    (d_lat * d_lat + d_lng * d_lng).sqrt()
}

impl From<(f64, f64)> for Point {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self { lat, lng }
    }
}

impl From<Point> for (f64, f64) {
    fn from(p: Point) -> Self {
        (p.lat, p.lng)
    }
}

/// A named location. Breadcrumbs are listed in the approach direction, toward the waypoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub name: String,
    pub breadcrumbs: Vec<Point>,
}

impl Waypoint {
    pub fn new(name: impl Into<String>, breadcrumbs: Vec<Point>) -> Self {
        Self {
            name: name.into(),
            breadcrumbs,
        }
    }
}

/// Immutable, validated list of waypoints the vehicle cycles through.
#[derive(Debug, Clone)]
pub struct WaypointGraph {
    waypoints: Vec<Waypoint>,
}

impl WaypointGraph {
    pub fn new(waypoints: Vec<Waypoint>) -> DomainResult<Self> {
        if waypoints.len() < 2 {
            return Err(DomainError::invalid_configuration(format!(
                "at least 2 waypoints are required, got {}",
                waypoints.len()
            )));
        }
        if let Some(empty) = waypoints.iter().find(|w| w.breadcrumbs.is_empty()) {
            return Err(DomainError::invalid_configuration(format!(
                "waypoint '{}' has no breadcrumbs",
                empty.name
            )));
        }
        Ok(Self { waypoints })
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Waypoint> {
        self.waypoints.get(index)
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Sequential cycling: the waypoint after `index`, wrapping to the first.
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.waypoints.len()
    }
}
