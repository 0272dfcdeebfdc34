//! Value Objects - Immutable, identity-less domain primitives

mod bounding_box;
mod endpoint_role;
mod geo_point;

pub use bounding_box::BoundingBox;
pub use endpoint_role::EndpointRole;
pub use geo_point::GeoPoint;
