//! Application layer - Use cases and orchestration
//!
//! Contains the map screen's state machine, the coordinator that runs it
//! against external services, and the port definitions those services
//! implement.

pub mod error;
pub mod ports;
pub mod services;

pub use error::MapError;
pub use ports::*;
pub use services::*;
