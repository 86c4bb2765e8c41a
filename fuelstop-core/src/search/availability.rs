//! Opening-hours checks for the candidates of one band.
//!
//! Every candidate of a band is evaluated concurrently, bounded by
//! `max_in_flight`, and the band completes only once all of them have
//! finished. Lookup failures exclude the candidate and are returned
//! alongside the successful evaluations.

use std::borrow::Cow;

use chrono::NaiveDateTime;
use futures_util::future::join;
use futures_util::stream::{self, StreamExt};
use geo::Coord;
use log::warn;

use crate::{
    CandidateStation, EvaluatedStation, PlaceDetailService, RoutePolyline, RoutingFailure,
    RoutingService, estimate_arrival,
};

use super::{CandidateFailure, EtaStrategy};

/// Evaluated candidates and exclusions for one band.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BandEvaluation {
    /// Candidates with an arrival time and verdict, in search order.
    pub evaluated: Vec<EvaluatedStation>,
    /// Candidates excluded because a lookup failed, in search order.
    pub failures: Vec<CandidateFailure>,
}

/// Checks candidates against their opening hours at the estimated arrival.
#[derive(Debug)]
pub struct AvailabilityFilter<'a, R: ?Sized, D: ?Sized> {
    routing: &'a R,
    details: &'a D,
    origin: Coord<f64>,
    departure: NaiveDateTime,
    eta_strategy: EtaStrategy,
    max_in_flight: usize,
}

impl<'a, R, D> AvailabilityFilter<'a, R, D>
where
    R: RoutingService + ?Sized,
    D: PlaceDetailService + ?Sized,
{
    /// Create a filter for trips leaving `origin` at `departure`.
    pub const fn new(
        routing: &'a R,
        details: &'a D,
        origin: Coord<f64>,
        departure: NaiveDateTime,
    ) -> Self {
        Self {
            routing,
            details,
            origin,
            departure,
            eta_strategy: EtaStrategy::PerCandidate,
            max_in_flight: super::config::DEFAULT_MAX_IN_FLIGHT,
        }
    }

    /// Choose how arrival times are estimated.
    #[must_use]
    pub const fn with_eta_strategy(mut self, eta_strategy: EtaStrategy) -> Self {
        self.eta_strategy = eta_strategy;
        self
    }

    /// Bound the number of candidates evaluated at once. Zero is treated as one.
    #[must_use]
    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight.max(1);
        self
    }

    /// Evaluate every candidate of a band centred on `band_center`.
    ///
    /// Results keep the order of `candidates` regardless of which lookups
    /// finish first.
    pub async fn evaluate(
        &self,
        candidates: Vec<CandidateStation>,
        band_center: Coord<f64>,
    ) -> BandEvaluation {
        if candidates.is_empty() {
            return BandEvaluation::default();
        }
        let shared_route = match self.eta_strategy {
            EtaStrategy::PerBandCenter => Some(self.routing.route(self.origin, band_center).await),
            EtaStrategy::PerCandidate => None,
        };
        let shared_route = shared_route.as_ref();

        let mut results: Vec<(usize, Result<EvaluatedStation, CandidateFailure>)> =
            stream::iter(candidates.into_iter().enumerate())
                .map(|(position, candidate)| async move {
                    (position, self.evaluate_candidate(candidate, shared_route).await)
                })
                .buffer_unordered(self.max_in_flight)
                .collect()
                .await;
        results.sort_by_key(|(position, _)| *position);

        let mut evaluation = BandEvaluation::default();
        for (_, result) in results {
            match result {
                Ok(station) => evaluation.evaluated.push(station),
                Err(failure) => {
                    warn!("excluding station {}: {failure}", failure.station_id());
                    evaluation.failures.push(failure);
                }
            }
        }
        evaluation
    }

    /// Evaluate a single candidate.
    ///
    /// # Errors
    ///
    /// Returns a [`CandidateFailure`] when the detail lookup, the route or
    /// the arrival estimate fails.
    pub async fn evaluate_one(
        &self,
        candidate: CandidateStation,
    ) -> Result<EvaluatedStation, CandidateFailure> {
        self.evaluate_candidate(candidate, None).await
    }

    async fn evaluate_candidate(
        &self,
        candidate: CandidateStation,
        shared_route: Option<&Result<RoutePolyline, RoutingFailure>>,
    ) -> Result<EvaluatedStation, CandidateFailure> {
        let location = candidate.location;
        let needs_details = candidate.opening_hours.is_none();
        let station_id = candidate.id.clone();

        let details = async {
            if needs_details {
                self.details.details(&station_id).await.map(Some)
            } else {
                Ok(None)
            }
        };
        let route = async {
            match shared_route {
                Some(result) => result.as_ref().map(Cow::Borrowed).map_err(Clone::clone),
                None => self
                    .routing
                    .route(self.origin, location)
                    .await
                    .map(Cow::Owned),
            }
        };
        let (details, route) = join(details, route).await;

        let details = details.map_err(|source| CandidateFailure::Detail {
            station_id: station_id.clone(),
            source,
        })?;
        let route = route.map_err(|source| CandidateFailure::Routing {
            station_id: station_id.clone(),
            source,
        })?;
        let estimated_arrival = estimate_arrival(&route, self.departure)
            .map_err(|source| CandidateFailure::Arrival { station_id, source })?;

        let station = match details {
            Some(found) => candidate.with_details(found),
            None => candidate,
        };
        let is_open_at_arrival = station
            .opening_hours
            .as_ref()
            .is_some_and(|schedule| schedule.is_open_at(estimated_arrival));
        Ok(EvaluatedStation {
            station,
            estimated_arrival,
            is_open_at_arrival,
        })
    }
}
