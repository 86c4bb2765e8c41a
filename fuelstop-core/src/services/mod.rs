//! Collaborator services consumed by the station search.
//!
//! The search never talks to the network itself. It is handed three
//! services at construction time:
//!
//! - a [`RoutingService`] computing drivable routes,
//! - a [`PlaceSearchService`] finding stations near a point, and
//! - a [`PlaceDetailService`] returning opening hours for a station.
//!
//! Each returns its own failure type so callers can tell which lookup went
//! wrong. Transport-level problems share [`TransportError`].

mod error;
mod provider;

pub use error::{DetailFailure, RoutingFailure, SearchFailure, TransportError};
pub use provider::{PlaceDetailService, PlaceSearchService, RoutingService};
