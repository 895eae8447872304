pub mod database;
pub mod error;
pub mod fixtures;
pub mod memory;
pub mod service;
pub mod validation;

pub use error::{StationError, StationResult};
pub use service::StationService;
