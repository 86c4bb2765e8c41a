//! Deterministic collaborators and fixtures for unit and behaviour tests.
//!
//! The stubs never touch the network. Each records how often it was called
//! so tests can assert on lookup counts.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use geo::Coord;

use crate::geo_math::km_to_latitude_degrees;
use crate::{
    CandidateStation, DetailFailure, EvaluatedStation, Leg, OpenInterval, PlaceCategory,
    PlaceDetailService, PlaceSearchService, RoutePolyline, RoutingFailure, RoutingService,
    SearchFailure, StationDetails, StationId, WeeklySchedule,
};

/// Routing stub returning a straight two-vertex route with one leg.
#[derive(Debug, Default)]
pub struct StubRoutingService {
    duration: Option<Duration>,
    unreachable: Vec<Coord<f64>>,
    calls: AtomicUsize,
}

impl StubRoutingService {
    /// Every route takes `duration`.
    #[must_use]
    pub fn with_duration(duration: Duration) -> Self {
        Self {
            duration: Some(duration),
            ..Self::default()
        }
    }

    /// Every route takes one hour.
    #[must_use]
    pub fn hourly() -> Self {
        Self::with_duration(Duration::from_secs(3600))
    }

    /// Routes carry legs without durations.
    #[must_use]
    pub fn without_durations() -> Self {
        Self::default()
    }

    /// Fail with [`RoutingFailure::NoRoute`] for routes ending at `destination`.
    #[must_use]
    pub fn with_unreachable(mut self, destination: Coord<f64>) -> Self {
        self.unreachable.push(destination);
        self
    }

    /// Number of routes requested so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RoutingService for StubRoutingService {
    async fn route(
        &self,
        origin: Coord<f64>,
        destination: Coord<f64>,
    ) -> Result<RoutePolyline, RoutingFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unreachable.contains(&destination) {
            return Err(RoutingFailure::NoRoute);
        }
        let leg = self
            .duration
            .map_or_else(Leg::without_duration, Leg::with_duration);
        RoutePolyline::new(vec![origin, destination], vec![leg]).map_err(|err| {
            RoutingFailure::InvalidRoute {
                reason: err.to_string(),
            }
        })
    }
}

/// Place search stub replaying scripted responses, one per call.
///
/// Once the script runs out every search succeeds with no stations.
#[derive(Debug, Default)]
pub struct StubPlaceSearch {
    script: Mutex<VecDeque<Result<Vec<CandidateStation>, SearchFailure>>>,
    centers: Mutex<Vec<Coord<f64>>>,
}

impl StubPlaceSearch {
    /// A stub with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a successful response to the script.
    #[must_use]
    pub fn then_return(self, stations: Vec<CandidateStation>) -> Self {
        self.push(Ok(stations));
        self
    }

    /// Append a failing response to the script.
    #[must_use]
    pub fn then_fail(self, failure: SearchFailure) -> Self {
        self.push(Err(failure));
        self
    }

    /// Centers queried so far, in call order.
    #[must_use]
    pub fn centers(&self) -> Vec<Coord<f64>> {
        self.centers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of searches issued so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.centers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn push(&self, response: Result<Vec<CandidateStation>, SearchFailure>) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(response);
    }
}

#[async_trait]
impl PlaceSearchService for StubPlaceSearch {
    async fn nearby_search(
        &self,
        center: Coord<f64>,
        _radius_m: f64,
        _category: PlaceCategory,
    ) -> Result<Vec<CandidateStation>, SearchFailure> {
        self.centers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(center);
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Detail stub backed by a map of known stations.
#[derive(Debug, Default)]
pub struct StubPlaceDetails {
    stations: HashMap<StationId, StationDetails>,
    failing: HashSet<StationId>,
    calls: AtomicUsize,
}

impl StubPlaceDetails {
    /// A stub that knows no stations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register details for a station.
    #[must_use]
    pub fn with_station(
        mut self,
        id: impl Into<StationId>,
        name: &str,
        location: Coord<f64>,
        opening_hours: WeeklySchedule,
    ) -> Self {
        self.stations.insert(
            id.into(),
            StationDetails {
                name: name.to_owned(),
                rating: None,
                location,
                opening_hours,
            },
        );
        self
    }

    /// Report an incomplete schedule for `id`.
    #[must_use]
    pub fn with_incomplete_schedule(mut self, id: impl Into<StationId>) -> Self {
        self.failing.insert(id.into());
        self
    }

    /// Number of lookups issued so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlaceDetailService for StubPlaceDetails {
    async fn details(&self, station_id: &StationId) -> Result<StationDetails, DetailFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(station_id) {
            return Err(DetailFailure::IncompleteSchedule {
                station_id: station_id.clone(),
                reason: "no opening_hours tag".to_owned(),
            });
        }
        self.stations
            .get(station_id)
            .cloned()
            .ok_or_else(|| DetailFailure::UnknownStation {
                station_id: station_id.clone(),
            })
    }
}

#[cfg(test)]
pub use delayed::DelayedDetails;


/// A straight route north along the prime meridian from `(0, 0)`.
///
/// Vertices are `spacing_km` apart; the single leg takes one hour.
#[must_use]
pub fn meridian_route(vertex_count: u16, spacing_km: f64) -> RoutePolyline {
    let step = km_to_latitude_degrees(spacing_km);
    let vertices = (0..vertex_count)
        .map(|i| Coord {
            x: 0.0,
            y: scaled(step, i),
        })
        .collect();
    RoutePolyline::new(vertices, vec![Leg::with_duration(Duration::from_secs(3600))])
        .unwrap_or_else(|err| panic!("meridian route must be valid: {err}"))
}

#[expect(clippy::float_arithmetic, reason = "vertex offsets scale the step")]
fn scaled(step: f64, index: u16) -> f64 {
    step * f64::from(index)
}

/// A candidate on the meridian at `latitude`, open around the clock.
#[must_use]
pub fn open_station(id: &str, latitude: f64) -> CandidateStation {
    CandidateStation::new(id, id, Coord { x: 0.0, y: latitude })
        .with_opening_hours(WeeklySchedule::always_open())
}

/// An evaluated station with the given arrival and verdict.
#[must_use]
pub fn evaluated(id: &str, estimated_arrival: NaiveDateTime, is_open_at_arrival: bool) -> EvaluatedStation {
    EvaluatedStation {
        station: CandidateStation::new(id, id, Coord { x: 0.0, y: 0.1 }),
        estimated_arrival,
        is_open_at_arrival,
    }
}

/// Open Monday 08:00 to 22:00, closed every other day.
#[must_use]
pub fn monday_day_shift() -> WeeklySchedule {
    WeeklySchedule::new().with_interval(
        Weekday::Mon,
        OpenInterval::new(wall_clock(8, 0), wall_clock(22, 0)),
    )
}

/// Monday 6 May 2024 at `hour:minute`.
#[must_use]
pub fn monday_at(hour: u32, minute: u32) -> NaiveDateTime {
    on_day(6, hour, minute)
}

/// Sunday 5 May 2024 at `hour:minute`.
#[must_use]
pub fn sunday_at(hour: u32, minute: u32) -> NaiveDateTime {
    on_day(5, hour, minute)
}

fn on_day(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, day)
        .map(|date| date.and_time(wall_clock(hour, minute)))
        .unwrap_or_else(|| panic!("2024-05-{day} is a valid date"))
}

fn wall_clock(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0)
        .unwrap_or_else(|| panic!("{hour:02}:{minute:02} is not a valid time"))
}
