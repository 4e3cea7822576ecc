use std::fs;
use std::path::Path;

use super::types::{Waypoint, WaypointGraph};
use crate::common::{DomainError, DomainResult};

/// Parse a waypoint list of the form `[{"name": "...", "breadcrumbs": [[lat, lng], ...]}, ...]`.
pub fn parse_waypoints(json: &str) -> DomainResult<WaypointGraph> {
    let waypoints: Vec<Waypoint> = serde_json::from_str(json)?;
    WaypointGraph::new(waypoints)
}

/// Load and validate the waypoint file once at startup.
pub fn load_waypoints<P: AsRef<Path>>(path: P) -> DomainResult<WaypointGraph> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        DomainError::invalid_configuration(format!(
            "cannot read waypoint file {}: {}",
            path.display(),
            e
        ))
    })?;
    parse_waypoints(&content)
}
