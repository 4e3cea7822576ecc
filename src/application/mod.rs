pub mod distance_service;
pub mod routing;
pub mod simulation_service;
pub mod supervisor;

pub use distance_service::*;
pub use routing::*;
pub use simulation_service::*;
pub use supervisor::*;
