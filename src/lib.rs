//! Facade crate for the fuelstop search engine.
//!
//! This crate re-exports the core search types and exposes the OSRM and
//! Overpass adapters behind the `http` feature.

#![forbid(unsafe_code)]

pub use fuelstop_core::{
    CandidateStation, EtaStrategy, EvaluatedStation, Leg, PlaceCategory, PlaceDetailService,
    PlaceSearchService, RangeBudget, RoutePolyline, RoutingFailure, RoutingService,
    SearchConfig, SearchDiagnostics, SearchError, SearchFailure, SearchRequest, SearchResult,
    StationDirections, StationId, StationSearch, Termination, TransportError, WeeklySchedule,
};

#[cfg(feature = "http")]
pub use fuelstop_data::{HttpServiceConfig, OsrmRoutingService, OverpassPlaceService};
