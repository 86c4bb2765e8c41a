//! Core domain for the fuelstop engine.
//!
//! Given a planned route and the vehicle's remaining range, the engine finds
//! fuel stations that are reachable before the tank runs dry and open when
//! the traveller gets there.
//!
//! The crate holds the pure geometry and time arithmetic (distances, the
//! empty point walk, arrival estimates, weekly opening hours) and the async
//! [`StationSearch`] that coordinates the three collaborator services.
//! Service implementations live in `fuelstop-data`; this crate performs no
//! I/O of its own.

pub mod geo_math;

mod arrival;
mod empty_point;
mod route;
mod schedule;
mod search;
mod services;
mod station;

#[doc(hidden)]
pub mod test_support;

pub use arrival::{ArrivalError, estimate_arrival, total_duration};
pub use empty_point::{
    EmptyPoint, EmptyPointLocator, LEGACY_RANGE_SCALE, RangeBudget, locate_within,
};
pub use route::{Leg, RouteError, RoutePolyline, is_valid_coordinate};
pub use schedule::{ALL_WEEKDAYS, OpenInterval, SCHEDULE_SLOTS, WeeklySchedule, schedule_slot};
pub use search::{
    AvailabilityFilter, Band, BandEvaluation, BandOutcome, BandPlanner, BandStep,
    CandidateFailure, DEFAULT_BAND_STEP_M, DEFAULT_MAX_IN_FLIGHT, DEFAULT_ORIGIN_PROXIMITY_KM,
    DEFAULT_QUERY_RADIUS_M, DEFAULT_ZOOM, DirectionsError, EtaStrategy, ResultAggregator,
    SearchConfig, SearchDiagnostics, SearchError, SearchRequest, SearchResult, StationDirections,
    StationSearch, Termination, ZoomBounds, zoom_for_radius,
};
pub use services::{
    DetailFailure, PlaceDetailService, PlaceSearchService, RoutingFailure, RoutingService,
    SearchFailure, TransportError,
};
pub use station::{CandidateStation, EvaluatedStation, PlaceCategory, StationDetails, StationId};
