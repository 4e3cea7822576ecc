//! Wire formats shared by the publisher and the aggregator.

use crate::common::{DomainError, DomainResult};
use crate::domains::route::Point;

/// `"<lat>:<lng>"`, no surrounding whitespace.
pub fn encode_position(p: &Point) -> String {
    format!("{}:{}", p.lat, p.lng)
}

pub fn decode_position(raw: &str) -> DomainResult<Point> {
    let (lat, lng) = raw
        .split_once(':')
        .ok_or_else(|| DomainError::parse(raw, "expected '<lat>:<lng>'"))?;
    Ok(Point::new(coordinate(raw, "latitude", lat)?, coordinate(raw, "longitude", lng)?))
}

fn coordinate(raw: &str, field: &str, text: &str) -> DomainResult<f64> {
    let value: f64 = text
        .parse()
        .map_err(|_| DomainError::parse(raw, format!("{} {:?} is not a number", field, text)))?;
    if !value.is_finite() {
        return Err(DomainError::parse(raw, format!("{} is not finite", field)));
    }
    Ok(value)
}

/// CSV row for the position feed. Longitude comes first.
pub fn encode_feed_row(p: &Point) -> String {
    format!("{},{}", p.lng, p.lat)
}

pub const FEED_HEADER: &str = "lng,lat";

pub fn encode_distance(total: f64) -> String {
    total.to_string()
}
