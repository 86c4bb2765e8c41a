//! Async traits for the routing, place search and place detail services.

use std::sync::Arc;

use async_trait::async_trait;
use geo::Coord;

use crate::{CandidateStation, PlaceCategory, RoutePolyline, StationDetails, StationId};

use super::error::{DetailFailure, RoutingFailure, SearchFailure};

/// Compute a drivable route between two points.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use async_trait::async_trait;
/// use geo::Coord;
/// use fuelstop_core::{Leg, RoutePolyline, RoutingFailure, RoutingService};
///
/// struct StraightLine;
///
/// #[async_trait]
/// impl RoutingService for StraightLine {
///     async fn route(
///         &self,
///         origin: Coord<f64>,
///         destination: Coord<f64>,
///     ) -> Result<RoutePolyline, RoutingFailure> {
///         RoutePolyline::new(
///             vec![origin, destination],
///             vec![Leg::with_duration(Duration::from_secs(600))],
///         )
///         .map_err(|err| RoutingFailure::InvalidRoute { reason: err.to_string() })
///     }
/// }
/// ```
#[async_trait]
pub trait RoutingService: Send + Sync {
    /// Route from `origin` to `destination`.
    ///
    /// Returns [`RoutingFailure::NoRoute`] when the points are not connected.
    async fn route(
        &self,
        origin: Coord<f64>,
        destination: Coord<f64>,
    ) -> Result<RoutePolyline, RoutingFailure>;
}

/// Find places of a category around a point.
#[async_trait]
pub trait PlaceSearchService: Send + Sync {
    /// Return every place of `category` within `radius_m` metres of `center`.
    ///
    /// An empty vector is a successful search with no matches.
    async fn nearby_search(
        &self,
        center: Coord<f64>,
        radius_m: f64,
        category: PlaceCategory,
    ) -> Result<Vec<CandidateStation>, SearchFailure>;
}

/// Look up opening hours and metadata for a single station.
#[async_trait]
pub trait PlaceDetailService: Send + Sync {
    /// Fetch details for `station_id`.
    async fn details(&self, station_id: &StationId) -> Result<StationDetails, DetailFailure>;
}

#[async_trait]
impl<T: RoutingService + ?Sized> RoutingService for Arc<T> {
    async fn route(
        &self,
        origin: Coord<f64>,
        destination: Coord<f64>,
    ) -> Result<RoutePolyline, RoutingFailure> {
        (**self).route(origin, destination).await
    }
}

#[async_trait]
impl<T: PlaceSearchService + ?Sized> PlaceSearchService for Arc<T> {
    async fn nearby_search(
        &self,
        center: Coord<f64>,
        radius_m: f64,
        category: PlaceCategory,
    ) -> Result<Vec<CandidateStation>, SearchFailure> {
        (**self).nearby_search(center, radius_m, category).await
    }
}

#[async_trait]
impl<T: PlaceDetailService + ?Sized> PlaceDetailService for Arc<T> {
    async fn details(&self, station_id: &StationId) -> Result<StationDetails, DetailFailure> {
        (**self).details(station_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{StubPlaceDetails, StubRoutingService};
    use crate::{TransportError, WeeklySchedule};
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn shared_services_delegate_to_inner_value() {
        let routing = Arc::new(StubRoutingService::hourly());
        let route = routing
            .route(Coord { x: 0.0, y: 0.0 }, Coord { x: 0.0, y: 0.1 })
            .await
            .expect("stub route");
        assert_eq!(route.vertices().len(), 2);
        assert_eq!(routing.calls(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn dyn_detail_service_reports_unknown_station() {
        let details: Arc<dyn PlaceDetailService> = Arc::new(StubPlaceDetails::new().with_station(
            "node/1",
            "Known",
            Coord { x: 0.0, y: 0.0 },
            WeeklySchedule::always_open(),
        ));
        let err = details
            .details(&StationId::from("node/2"))
            .await
            .expect_err("unknown station");
        assert_eq!(
            err,
            DetailFailure::UnknownStation {
                station_id: StationId::from("node/2"),
            }
        );
    }

    #[rstest]
    fn transport_errors_convert_into_service_failures() {
        let transport = TransportError::Parse {
            message: "truncated".to_owned(),
        };
        let failure: SearchFailure = transport.clone().into();
        assert_eq!(failure, SearchFailure::Transport(transport));
    }
}
