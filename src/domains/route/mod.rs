pub mod loader;
pub mod track;
pub mod types;

pub use loader::*;
pub use track::*;
pub use types::*;
