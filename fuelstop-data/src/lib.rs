//! HTTP adapters for the fuelstop collaborator services.
//!
//! Responsibilities:
//! - Implement [`fuelstop_core::RoutingService`] against the OSRM Route API.
//! - Implement [`fuelstop_core::PlaceSearchService`] and
//!   [`fuelstop_core::PlaceDetailService`] against the Overpass API.
//! - Translate OSM `opening_hours` tags into weekly schedules.
//!
//! Boundaries:
//! - Do not encode search rules (live in `fuelstop-core`).
//! - Keep every request async; no blocking I/O on the executor.
//!
//! Invariants:
//! - Adapters are `Send + Sync` and hold no mutable state.
//! - Transport failures surface as [`fuelstop_core::TransportError`].

pub mod http;
pub mod opening_hours;
pub mod places;
pub mod routing;

pub use http::{DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, HttpServiceConfig, ProviderBuildError};
pub use opening_hours::{OpeningHoursError, parse_opening_hours};
pub use places::{DEFAULT_OVERPASS_URL, OverpassPlaceService};
pub use routing::{DEFAULT_OSRM_BASE_URL, OsrmRoutingService};
