//! Domain layer for AccessRoute
//!
//! Value types shared by the map screen: coordinates, bounding boxes, place
//! candidates, accessibility overlay points and route results.
//! This layer performs no I/O.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
