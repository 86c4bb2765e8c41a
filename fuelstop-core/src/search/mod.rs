//! Range-expanding search for open fuel stations along a route.
//!
//! A search proceeds in bands. Band `i` locates the empty point for the
//! caller's range with the safety offset grown by `i` steps, queries the
//! place search service around it, and checks each candidate's opening
//! hours at its estimated arrival. Bands run strictly one after another
//! because each center depends on the band index; candidates within a band
//! are evaluated concurrently and joined before the next band starts.
//!
//! Lookup failures are recovered: a failed nearby search counts as an empty
//! band and a failed candidate lookup excludes that candidate. Only invalid
//! input is reported as an error.

mod aggregate;
mod availability;
mod band;
mod config;
mod error;
mod orchestrator;
mod request;

pub use aggregate::{
    BandOutcome, ResultAggregator, SearchDiagnostics, SearchResult, zoom_for_radius,
};
pub use availability::{AvailabilityFilter, BandEvaluation};
pub use band::{Band, BandPlanner, BandStep, Termination};
pub use config::{
    DEFAULT_BAND_STEP_M, DEFAULT_MAX_IN_FLIGHT, DEFAULT_ORIGIN_PROXIMITY_KM,
    DEFAULT_QUERY_RADIUS_M, DEFAULT_ZOOM, EtaStrategy, SearchConfig, ZoomBounds,
};
pub use error::{CandidateFailure, DirectionsError, SearchError};
pub use orchestrator::{StationDirections, StationSearch};
pub use request::SearchRequest;
