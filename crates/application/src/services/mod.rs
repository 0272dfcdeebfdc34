//! Application services - map screen use cases

mod map_state;
mod map_view;
mod notice;
mod route_coordinator;

pub use map_state::{
    CURRENT_LOCATION_LABEL, EndpointPhase, EndpointSelection, LocateTicket, LocationApplied,
    MIN_QUERY_CHARS, MapState, OverlayApplied, OverlayState, OverlayTicket, REGION_LATITUDE_DELTA,
    REGION_LONGITUDE_DELTA, RouteApplied, RouteTicket, SearchApplied, SearchTicket,
};
pub use map_view::{MapMarker, MapViewModel, MarkerKind, OverlayLayerView};
pub use notice::{Notice, NoticeLevel, NoticeSource};
pub use route_coordinator::{CoordinatorConfig, RouteCoordinator, SearchOutcome};
