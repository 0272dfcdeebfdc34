//! Domain entities - map screen records produced by searches and feeds

mod overlay;
mod place;
mod route;

pub use overlay::{OverlayKind, OverlayPoint};
pub use place::{PlaceCandidate, QUICK_LOCATIONS, QuickLocation};
pub use route::RouteResult;
