pub mod distance;
pub mod logger;
pub mod route;
pub mod telemetry;
pub mod vehicle;

pub use distance::*;
pub use logger::*;
pub use route::*;
pub use telemetry::*;
pub use vehicle::*;
