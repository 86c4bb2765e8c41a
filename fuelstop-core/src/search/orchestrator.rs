//! The station search entry point.

use chrono::NaiveDateTime;
use geo::Coord;
use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;

use crate::route::is_valid_coordinate;
use crate::{
    PlaceCategory, PlaceDetailService, PlaceSearchService, RoutePolyline, RoutingService,
    estimate_arrival,
};

use super::{
    AvailabilityFilter, Band, BandOutcome, BandPlanner, BandStep, DirectionsError,
    ResultAggregator, SearchConfig, SearchError, SearchRequest, SearchResult, Termination,
    zoom_for_radius,
};

/// Route and arrival time for driving to a chosen station.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StationDirections {
    /// Route from the origin to the station.
    pub route: RoutePolyline,
    /// Local arrival time at the station.
    pub estimated_arrival: NaiveDateTime,
}

/// Finds open fuel stations reachable before the vehicle runs dry.
///
/// The search owns its three collaborators and keeps no state between
/// calls, so one instance may serve many searches.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use fuelstop_core::{CandidateStation, SearchRequest, StationSearch, WeeklySchedule};
/// use fuelstop_core::test_support::{
///     StubPlaceDetails, StubPlaceSearch, StubRoutingService, meridian_route, monday_at,
/// };
///
/// let places = StubPlaceSearch::new().then_return(vec![
///     CandidateStation::new("node/7", "Ridge Fuel", Coord { x: 0.0, y: 0.25 })
///         .with_opening_hours(WeeklySchedule::always_open()),
/// ]);
/// let search = StationSearch::new(StubRoutingService::hourly(), places, StubPlaceDetails::new());
/// let request = SearchRequest {
///     route: meridian_route(45, 0.9),
///     distance_to_empty_km: 30.0,
///     search_offset_m: 5000.0,
///     origin: Coord { x: 0.0, y: 0.0 },
///     departure: monday_at(7, 0),
/// };
///
/// let runtime = tokio::runtime::Builder::new_current_thread()
///     .build()
///     .expect("runtime");
/// let result = runtime.block_on(search.find_stations(&request)).expect("valid request");
/// assert_eq!(result.stations.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct StationSearch<R, P, D> {
    routing: R,
    places: P,
    details: D,
    config: SearchConfig,
}

impl<R, P, D> StationSearch<R, P, D>
where
    R: RoutingService,
    P: PlaceSearchService,
    D: PlaceDetailService,
{
    /// Create a search with the default configuration.
    pub fn new(routing: R, places: P, details: D) -> Self {
        Self {
            routing,
            places,
            details,
            config: SearchConfig::default(),
        }
    }

    /// Create a search with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidArgument`] when `config` fails
    /// [`SearchConfig::validate`].
    pub fn with_config(
        routing: R,
        places: P,
        details: D,
        config: SearchConfig,
    ) -> Result<Self, SearchError> {
        config.validate()?;
        Ok(Self {
            routing,
            places,
            details,
            config,
        })
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Run a complete search.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidArgument`] when `request` is invalid.
    /// An empty result is not an error; see [`SearchResult::into_found`].
    pub async fn find_stations(&self, request: &SearchRequest) -> Result<SearchResult, SearchError> {
        self.find_stations_with_progress(request, &CancellationToken::new(), |_| {})
            .await
    }

    /// Run a search, reporting each band as it completes.
    ///
    /// `cancel` is checked before each band. A band already in flight runs
    /// to completion, and the stations found so far are returned with
    /// [`Termination::Cancelled`].
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidArgument`] when `request` is invalid.
    pub async fn find_stations_with_progress<F>(
        &self,
        request: &SearchRequest,
        cancel: &CancellationToken,
        mut on_band: F,
    ) -> Result<SearchResult, SearchError>
    where
        F: FnMut(&BandOutcome),
    {
        request.validate()?;
        let mut planner = BandPlanner::new(request, &self.config);
        let filter = AvailabilityFilter::new(
            &self.routing,
            &self.details,
            request.origin,
            request.departure,
        )
        .with_eta_strategy(self.config.eta_strategy)
        .with_max_in_flight(self.config.max_in_flight);

        let mut outcomes = Vec::new();
        let termination = loop {
            if cancel.is_cancelled() {
                break Termination::Cancelled;
            }
            let band = match planner.step() {
                BandStep::Search(band) => band,
                BandStep::Done(reason) => break reason,
            };
            let outcome = self.search_band(band, &filter).await;
            on_band(&outcome);
            outcomes.push(outcome);
        };

        let result = ResultAggregator::new(self.config.default_zoom).aggregate(
            planner.map_center(),
            &outcomes,
            termination,
        );
        info!(
            "station search finished ({termination}): {} open stations from {} bands",
            result.stations.len(),
            result.diagnostics.bands_searched
        );
        Ok(result)
    }

    /// Route from `origin` to a chosen station and estimate the arrival.
    ///
    /// # Errors
    ///
    /// Returns [`DirectionsError`] for invalid coordinates, routing failures
    /// or routes lacking leg durations.
    pub async fn directions_to(
        &self,
        origin: Coord<f64>,
        station_location: Coord<f64>,
        departure: NaiveDateTime,
    ) -> Result<StationDirections, DirectionsError> {
        if !is_valid_coordinate(origin) {
            return Err(DirectionsError::InvalidCoordinate { field: "origin" });
        }
        if !is_valid_coordinate(station_location) {
            return Err(DirectionsError::InvalidCoordinate { field: "station" });
        }
        let route = self.routing.route(origin, station_location).await?;
        let estimated_arrival = estimate_arrival(&route, departure)?;
        Ok(StationDirections {
            route,
            estimated_arrival,
        })
    }

    async fn search_band(&self, band: Band, filter: &AvailabilityFilter<'_, R, D>) -> BandOutcome {
        let zoom = zoom_for_radius(band.radius_m, self.config.zoom_bounds);
        let candidates = match self
            .places
            .nearby_search(
                band.center,
                self.config.query_radius_m,
                PlaceCategory::FuelStation,
            )
            .await
        {
            Ok(candidates) => candidates,
            Err(err) => {
                warn!("band {} search failed, continuing: {err}", band.index);
                return BandOutcome::failed(band, zoom, err);
            }
        };
        debug!(
            "band {} at vertex {}: {} candidates",
            band.index,
            band.vertex_index,
            candidates.len()
        );
        let evaluation = filter.evaluate(candidates, band.center).await;
        BandOutcome {
            band,
            zoom,
            stations: evaluation.evaluated,
            failures: evaluation.failures,
            search_failure: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        DelayedDetails, StubPlaceDetails, StubPlaceSearch, StubRoutingService, meridian_route,
        monday_at, open_station,
    };
    use crate::{
        CandidateStation, RangeBudget, SearchFailure, StationId, TransportError, WeeklySchedule,
    };
    use rstest::{fixture, rstest};
    use std::sync::Arc;
    use std::time::Duration;

    #[fixture]
    fn request() -> SearchRequest {
        SearchRequest {
            route: meridian_route(45, 0.9),
            distance_to_empty_km: 3.5,
            search_offset_m: 5000.0,
            origin: Coord { x: 0.0, y: 0.0 },
            departure: monday_at(7, 0),
        }
    }

    fn legacy() -> SearchConfig {
        SearchConfig::default().with_range_budget(RangeBudget::legacy())
    }

    fn outage() -> SearchFailure {
        SearchFailure::Transport(TransportError::Network {
            url: "http://places.test".to_owned(),
            message: "connection reset".to_owned(),
        })
    }

    #[rstest]
    #[tokio::test]
    async fn failed_band_does_not_abort_search(request: SearchRequest) {
        let places = Arc::new(
            StubPlaceSearch::new()
                .then_return(vec![open_station("node/0", 0.25)])
                .then_return(vec![open_station("node/1", 0.2)])
                .then_fail(outage())
                .then_return(vec![open_station("node/3", 0.13)])
                .then_return(vec![open_station("node/4", 0.09)]),
        );
        let search = StationSearch::with_config(
            StubRoutingService::hourly(),
            Arc::clone(&places),
            StubPlaceDetails::new(),
            legacy(),
        )
        .expect("valid config");

        let result = search.find_stations(&request).await.expect("search runs");

        let ids: Vec<&str> = result.stations.iter().map(|s| s.id().as_str()).collect();
        assert_eq!(ids, vec!["node/0", "node/1", "node/3", "node/4"]);
        assert_eq!(result.diagnostics.bands_searched, 5);
        assert_eq!(result.diagnostics.failed_bands, 1);
        assert_eq!(result.termination, Termination::OriginReached);
        assert_eq!(places.calls(), 5);
    }

    #[rstest]
    #[tokio::test]
    async fn band_waits_for_its_slowest_lookup(request: SearchRequest) {
        let slow_location = Coord { x: 0.0, y: 0.25 };
        let places = Arc::new(
            StubPlaceSearch::new()
                .then_return(vec![
                    CandidateStation::new("node/slow", "Slow", slow_location),
                    open_station("node/fast", 0.26),
                ])
                .then_return(vec![open_station("node/1", 0.2)]),
        );
        let details = DelayedDetails::new(StubPlaceDetails::new().with_station(
            "node/slow",
            "Slow Fuel",
            slow_location,
            WeeklySchedule::always_open(),
        ))
        .with_delay("node/slow", Duration::from_millis(50))
        .watching(Arc::clone(&places));
        let search = StationSearch::with_config(
            StubRoutingService::hourly(),
            Arc::clone(&places),
            details,
            legacy(),
        )
        .expect("valid config");

        let result = search.find_stations(&request).await.expect("search runs");

        let slow = StationId::from("node/slow");
        assert!(result.station(&slow).is_some());
        assert_eq!(search.details.searches_seen_by(&slow), Some(1));
        let ids: Vec<&str> = result.stations.iter().map(|s| s.id().as_str()).collect();
        assert_eq!(ids, vec!["node/1", "node/fast", "node/slow"]);
        assert_eq!(places.calls(), 5);
    }

    #[rstest]
    #[tokio::test]
    async fn invalid_request_fails_before_any_lookup(mut request: SearchRequest) {
        request.distance_to_empty_km = -1.0;
        let places = Arc::new(StubPlaceSearch::new());
        let search = StationSearch::new(
            StubRoutingService::hourly(),
            Arc::clone(&places),
            StubPlaceDetails::new(),
        );
        let err = search.find_stations(&request).await.expect_err("invalid");
        assert!(matches!(err, SearchError::InvalidArgument { .. }));
        assert_eq!(places.calls(), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn cancellation_stops_at_band_boundary(request: SearchRequest) {
        let search = StationSearch::with_config(
            StubRoutingService::hourly(),
            StubPlaceSearch::new().then_return(vec![open_station("node/0", 0.25)]),
            StubPlaceDetails::new(),
            legacy(),
        )
        .expect("valid config");
        let cancel = CancellationToken::new();
        let mut seen = Vec::new();

        let result = search
            .find_stations_with_progress(&request, &cancel, |outcome| {
                seen.push(outcome.band.index);
                cancel.cancel();
            })
            .await
            .expect("search runs");

        assert_eq!(seen, vec![0]);
        assert_eq!(result.termination, Termination::Cancelled);
        assert_eq!(result.stations.len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn progress_reports_bands_in_order(request: SearchRequest) {
        let search = StationSearch::with_config(
            StubRoutingService::hourly(),
            StubPlaceSearch::new(),
            StubPlaceDetails::new(),
            legacy(),
        )
        .expect("valid config");
        let mut radii = Vec::new();
        let result = search
            .find_stations_with_progress(&request, &CancellationToken::new(), |outcome| {
                radii.push(outcome.band.radius_m);
            })
            .await
            .expect("search runs");

        assert!(result.is_empty());
        assert_eq!(radii.len(), 5);
        assert!(radii.windows(2).all(|pair| matches!(pair, [a, b] if a <= b)));
    }

    #[rstest]
    #[tokio::test]
    async fn directions_include_arrival() {
        let search = StationSearch::new(
            StubRoutingService::hourly(),
            StubPlaceSearch::new(),
            StubPlaceDetails::new(),
        );
        let directions = search
            .directions_to(Coord { x: 0.0, y: 0.0 }, Coord { x: 0.0, y: 0.2 }, monday_at(7, 0))
            .await
            .expect("directions");
        assert_eq!(directions.estimated_arrival, monday_at(8, 0));
        assert_eq!(directions.route.end(), Some(Coord { x: 0.0, y: 0.2 }));
    }

    #[rstest]
    fn rejects_invalid_config() {
        let result = StationSearch::with_config(
            StubRoutingService::hourly(),
            StubPlaceSearch::new(),
            StubPlaceDetails::new(),
            SearchConfig::default().with_max_in_flight(0),
        );
        assert!(result.is_err());
    }
}
