pub mod codec;
pub mod ports;
pub mod publisher;

pub use codec::*;
pub use ports::*;
pub use publisher::*;

pub const POSITION_CHANNEL: &str = "position";
pub const TOTAL_DISTANCE_CHANNEL: &str = "totalDistance";
pub const CONTROL_CHANNEL: &str = "control";
