pub mod control;
pub mod controller;

pub use control::*;
pub use controller::*;
