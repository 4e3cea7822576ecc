pub mod kafka_subscriber;

pub use kafka_subscriber::*;
