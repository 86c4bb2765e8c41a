use thiserror::Error;

use crate::{ArrivalError, DetailFailure, RoutingFailure, StationId};

use super::Termination;

/// Errors raised to callers of [`crate::StationSearch`].
///
/// Failures of individual lookups never appear here; they are recovered
/// inside the search and reported through [`crate::SearchDiagnostics`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    /// An input failed validation before any service was called.
    #[error("invalid {field}: {reason}")]
    InvalidArgument {
        /// Name of the rejected input.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
    /// The search finished without finding an open station.
    #[error("no open station found after {bands_searched} search bands ({termination})")]
    RangeExhaustedWithoutStation {
        /// Number of bands that were queried.
        bands_searched: usize,
        /// How the band loop ended.
        termination: Termination,
    },
}

impl SearchError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field,
            reason: reason.into(),
        }
    }
}

/// Why a single candidate was excluded from the result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CandidateFailure {
    /// Opening hours could not be fetched.
    #[error("detail lookup for station {station_id} failed")]
    Detail {
        /// Station that was excluded.
        station_id: StationId,
        /// Underlying detail failure.
        #[source]
        source: DetailFailure,
    },
    /// No route to the station could be computed.
    #[error("routing to station {station_id} failed")]
    Routing {
        /// Station that was excluded.
        station_id: StationId,
        /// Underlying routing failure.
        #[source]
        source: RoutingFailure,
    },
    /// The route was found but no arrival time could be derived from it.
    #[error("arrival estimate for station {station_id} failed")]
    Arrival {
        /// Station that was excluded.
        station_id: StationId,
        /// Underlying arrival failure.
        #[source]
        source: ArrivalError,
    },
}

impl CandidateFailure {
    /// Station the failure refers to.
    #[must_use]
    pub const fn station_id(&self) -> &StationId {
        match self {
            Self::Detail { station_id, .. }
            | Self::Routing { station_id, .. }
            | Self::Arrival { station_id, .. } => station_id,
        }
    }
}

/// Errors from [`crate::StationSearch::directions_to`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectionsError {
    /// The origin or station coordinate is not a valid position.
    #[error("invalid {field} coordinate")]
    InvalidCoordinate {
        /// Which endpoint was rejected.
        field: &'static str,
    },
    /// The routing service could not produce a route.
    #[error(transparent)]
    Routing(#[from] RoutingFailure),
    /// The route lacks the durations needed for an arrival estimate.
    #[error(transparent)]
    Arrival(#[from] ArrivalError),
}
