//! The band state machine driving the backward search.
//!
//! Each band re-runs the empty point walk with the safety offset grown by one
//! more step, so the band centers retreat from the initial empty point
//! towards the route start. The machine stops when a center comes within the
//! origin proximity, when the walk no longer finds a point, after the band
//! centred on the route start, or at a hard cap derived from route length.

use std::fmt;

use geo::Coord;

use crate::geo_math::distance_km;
use crate::{EmptyPoint, EmptyPointLocator, RoutePolyline};

use super::{SearchConfig, SearchRequest};

/// One step of the backward search.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Band {
    /// Zero-based position in the band sequence.
    pub index: usize,
    /// Empty point used as the query center.
    pub center: Coord<f64>,
    /// Route vertex the center sits on.
    pub vertex_index: usize,
    /// Safety offset used to locate the center, in metres.
    pub radius_m: f64,
}

/// Why the band loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Termination {
    /// The next center was within the origin proximity.
    OriginReached,
    /// The walk found no empty point for the grown offset.
    RouteCovered,
    /// The last band searched was centred on the route start.
    RouteStartReached,
    /// The band cap for the route length was hit.
    BandLimit,
    /// The caller cancelled the search.
    Cancelled,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::OriginReached => "origin reached",
            Self::RouteCovered => "route covered",
            Self::RouteStartReached => "route start reached",
            Self::BandLimit => "band limit reached",
            Self::Cancelled => "cancelled",
        };
        f.write_str(text)
    }
}

/// Result of advancing a [`BandPlanner`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BandStep {
    /// Query this band next.
    Search(Band),
    /// No further bands.
    Done(Termination),
}

/// Produces the sequence of bands for one search request.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use geo::Coord;
/// use fuelstop_core::{BandPlanner, BandStep, SearchConfig, SearchRequest, Termination};
/// use fuelstop_core::test_support::meridian_route;
///
/// let request = SearchRequest {
///     route: meridian_route(45, 0.9),
///     distance_to_empty_km: 30.0,
///     search_offset_m: 5000.0,
///     origin: Coord { x: 0.0, y: 0.0 },
///     departure: NaiveDate::from_ymd_opt(2024, 5, 6)
///         .and_then(|d| d.and_hms_opt(7, 0, 0))
///         .expect("timestamp"),
/// };
/// let config = SearchConfig::default();
/// let mut planner = BandPlanner::new(&request, &config);
/// let bands: Vec<_> = planner.by_ref().collect();
/// assert_eq!(bands.len(), 4);
/// assert_eq!(planner.termination(), Some(Termination::OriginReached));
/// ```
#[derive(Debug, Clone)]
pub struct BandPlanner<'a> {
    route: &'a RoutePolyline,
    origin: Coord<f64>,
    distance_to_empty_km: f64,
    locator: EmptyPointLocator,
    band_step_m: f64,
    origin_proximity_km: f64,
    band_limit: usize,
    initial: EmptyPoint,
    next_index: usize,
    next_radius_m: f64,
    termination: Option<Termination>,
}

impl<'a> BandPlanner<'a> {
    /// Prepare the bands for `request` under `config`.
    ///
    /// The initial empty point is computed eagerly. When the route is
    /// shorter than the range budget, the route's final vertex stands in for
    /// it so the first band covers the destination area.
    #[must_use]
    pub fn new(request: &'a SearchRequest, config: &SearchConfig) -> Self {
        let route = &request.route;
        let locator = EmptyPointLocator::new(config.range_budget);
        let initial = locator
            .locate(route, request.distance_to_empty_km, request.search_offset_m)
            .unwrap_or_else(|| route_end(route));
        Self {
            route,
            origin: request.origin,
            distance_to_empty_km: request.distance_to_empty_km,
            locator,
            band_step_m: config.band_step_m,
            origin_proximity_km: config.origin_proximity_km,
            band_limit: band_limit(route, config.band_step_m),
            initial,
            next_index: 0,
            next_radius_m: request.search_offset_m,
            termination: None,
        }
    }

    /// Center used to frame the final result.
    #[must_use]
    pub const fn map_center(&self) -> Coord<f64> {
        self.initial.location
    }

    /// Maximum number of bands this planner will produce.
    #[must_use]
    pub const fn band_limit(&self) -> usize {
        self.band_limit
    }

    /// Reason the planner stopped, once it has.
    #[must_use]
    pub const fn termination(&self) -> Option<Termination> {
        self.termination
    }

    /// Advance to the next band.
    pub fn step(&mut self) -> BandStep {
        if let Some(done) = self.termination {
            return BandStep::Done(done);
        }
        if self.next_index >= self.band_limit {
            return self.finish(Termination::BandLimit);
        }
        let radius_m = self.next_radius_m;
        let point = if self.next_index == 0 {
            Some(self.initial)
        } else {
            self.locator
                .locate(self.route, self.distance_to_empty_km, radius_m)
        };
        let Some(point) = point else {
            return self.finish(Termination::RouteCovered);
        };
        if distance_km(self.origin, point.location) < self.origin_proximity_km {
            return self.finish(Termination::OriginReached);
        }
        if point.is_route_start() {
            self.termination = Some(Termination::RouteStartReached);
        }
        let band = Band {
            index: self.next_index,
            center: point.location,
            vertex_index: point.vertex_index,
            radius_m,
        };
        self.next_index = self.next_index.saturating_add(1);
        self.next_radius_m = grow(radius_m, self.band_step_m);
        BandStep::Search(band)
    }

    fn finish(&mut self, reason: Termination) -> BandStep {
        self.termination = Some(reason);
        BandStep::Done(reason)
    }
}

impl Iterator for BandPlanner<'_> {
    type Item = Band;

    fn next(&mut self) -> Option<Band> {
        match self.step() {
            BandStep::Search(band) => Some(band),
            BandStep::Done(_) => None,
        }
    }
}

#[expect(clippy::float_arithmetic, reason = "radius grows by a fixed step")]
fn grow(radius_m: f64, step_m: f64) -> f64 {
    radius_m + step_m
}

fn route_end(route: &RoutePolyline) -> EmptyPoint {
    let vertices = route.vertices();
    EmptyPoint {
        location: route.end().unwrap_or_default(),
        vertex_index: vertices.len().saturating_sub(1),
        travelled_km: route.length_km(),
    }
}

/// `ceil(route_length_m / band_step_m) + 1`.
#[expect(
    clippy::float_arithmetic,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "band count derives from a finite, non-negative route length"
)]
fn band_limit(route: &RoutePolyline, band_step_m: f64) -> usize {
    let steps = (route.length_km() * 1000.0 / band_step_m).ceil();
    let whole = if steps.is_finite() && steps > 0.0 {
        steps as usize
    } else {
        0
    };
    whole.saturating_add(1)
}
