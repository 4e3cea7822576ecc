pub mod csv_feed;
pub mod file_logger;
pub mod kafka;
pub mod loggers;
pub mod memory_bus;

pub use csv_feed::*;
pub use file_logger::*;
pub use kafka::*;
pub use loggers::*;
pub use memory_bus::*;
