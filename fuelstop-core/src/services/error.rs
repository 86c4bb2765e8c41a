use thiserror::Error;

use crate::StationId;

/// Failures shared by every HTTP-backed collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request timed out before receiving a response.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// The URL that was requested.
        url: String,
        /// The timeout duration in seconds.
        timeout_secs: u64,
    },
    /// The service answered with a non-success HTTP status.
    #[error("request to {url} failed with status {status}: {message}")]
    HttpStatus {
        /// The URL that was requested.
        url: String,
        /// The HTTP status code.
        status: u16,
        /// Error message from the response.
        message: String,
    },
    /// The request never reached the service.
    #[error("network error requesting {url}: {message}")]
    Network {
        /// The URL that was requested.
        url: String,
        /// Description of the network error.
        message: String,
    },
    /// The service answered but reported an error in its payload.
    #[error("service error ({code}): {message}")]
    Service {
        /// Service-specific error code.
        code: String,
        /// Error message from the service.
        message: String,
    },
    /// The response body could not be decoded.
    #[error("failed to parse response: {message}")]
    Parse {
        /// Description of the parse error.
        message: String,
    },
}

/// Errors from [`crate::RoutingService::route`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingFailure {
    /// No drivable path connects the two points.
    #[error("no drivable route found")]
    NoRoute,
    /// The service returned a route the core could not accept.
    #[error("routing service returned an invalid route: {reason}")]
    InvalidRoute {
        /// Why the route was rejected.
        reason: String,
    },
    /// The routing request itself failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Errors from [`crate::PlaceSearchService::nearby_search`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchFailure {
    /// The service refused the query, e.g. because a quota was hit.
    #[error("nearby search rejected: {reason}")]
    Rejected {
        /// Explanation supplied by the service.
        reason: String,
    },
    /// The search request itself failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Errors from [`crate::PlaceDetailService::details`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetailFailure {
    /// The service does not know the station.
    #[error("unknown station {station_id}")]
    UnknownStation {
        /// Identifier that was looked up.
        station_id: StationId,
    },
    /// The station exists but its opening hours are missing or unusable.
    #[error("station {station_id} has no usable opening hours: {reason}")]
    IncompleteSchedule {
        /// Identifier that was looked up.
        station_id: StationId,
        /// Why the schedule was rejected.
        reason: String,
    },
    /// The detail request itself failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}
