//! Locate the point along a route where the remaining range runs out.
//!
//! The locator walks the route's vertices, accumulating great-circle segment
//! lengths until the next segment would reach the range budget. The vertex at
//! the start of that segment is the empty point. Vertices are used instead of
//! interpolated points; downstream search bands span several kilometres, so
//! sub-segment precision is not needed.

use geo::Coord;

use crate::RoutePolyline;
use crate::geo_math::distance_km;

/// Scale factor for vehicles that report distance-to-empty in units of ten
/// kilometres.
pub const LEGACY_RANGE_SCALE: f64 = 10.0;

/// Converts a distance-to-empty figure and a safety offset into a range
/// budget in kilometres.
///
/// `budget_km = distance_to_empty_km * range_scale - offset_m / 1000`
///
/// # Examples
/// ```
/// use fuelstop_core::RangeBudget;
///
/// let budget = RangeBudget::default();
/// assert!((budget.budget_km(30.0, 5000.0) - 25.0).abs() < 1e-9);
///
/// let legacy = RangeBudget::legacy();
/// assert!((legacy.budget_km(1.0, 5000.0) - 5.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RangeBudget {
    /// Multiplier turning the caller's distance figure into kilometres.
    pub range_scale: f64,
}

impl Default for RangeBudget {
    fn default() -> Self {
        Self { range_scale: 1.0 }
    }
}

impl RangeBudget {
    /// Budget using an explicit scale factor.
    #[must_use]
    pub const fn with_scale(range_scale: f64) -> Self {
        Self { range_scale }
    }

    /// Budget for clients that report range in units of ten kilometres.
    #[must_use]
    pub const fn legacy() -> Self {
        Self::with_scale(LEGACY_RANGE_SCALE)
    }

    /// Range budget in kilometres, net of the safety offset.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "budget combines kilometres and metres"
    )]
    pub fn budget_km(&self, distance_to_empty_km: f64, offset_m: f64) -> f64 {
        distance_to_empty_km * self.range_scale - offset_m / 1000.0
    }
}

/// A route vertex at which the range budget is exhausted.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EmptyPoint {
    /// Coordinate of the vertex.
    pub location: Coord<f64>,
    /// Index of the vertex within the route.
    pub vertex_index: usize,
    /// Distance travelled along the route to reach the vertex, in kilometres.
    pub travelled_km: f64,
}

impl EmptyPoint {
    /// Whether the point is the route's first vertex.
    #[must_use]
    pub const fn is_route_start(&self) -> bool {
        self.vertex_index == 0
    }
}

/// Finds empty points on a route for a given [`RangeBudget`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EmptyPointLocator {
    budget: RangeBudget,
}

impl EmptyPointLocator {
    /// Create a locator using `budget` to convert range inputs.
    #[must_use]
    pub const fn new(budget: RangeBudget) -> Self {
        Self { budget }
    }

    /// Budget conversion used by this locator.
    #[must_use]
    pub const fn budget(&self) -> RangeBudget {
        self.budget
    }

    /// Locate the empty point for a distance-to-empty figure and offset.
    ///
    /// Returns `None` when the whole route is shorter than the budget, i.e.
    /// the route's end is reachable without refuelling.
    ///
    /// # Examples
    /// ```
    /// use std::time::Duration;
    /// use geo::Coord;
    /// use fuelstop_core::{EmptyPointLocator, Leg, RangeBudget, RoutePolyline};
    /// use fuelstop_core::geo_math::km_to_latitude_degrees;
    ///
    /// let step = km_to_latitude_degrees(2.0);
    /// let vertices = (0..5_u8)
    ///     .map(|i| Coord { x: 0.0, y: step * f64::from(i) })
    ///     .collect();
    /// let route = RoutePolyline::new(vertices, vec![Leg::with_duration(Duration::from_secs(600))])
    ///     .expect("valid route");
    ///
    /// let locator = EmptyPointLocator::new(RangeBudget::legacy());
    /// let empty = locator.locate(&route, 1.0, 5000.0).expect("route longer than budget");
    /// assert_eq!(empty.vertex_index, 2);
    /// ```
    #[must_use]
    pub fn locate(
        &self,
        route: &RoutePolyline,
        distance_to_empty_km: f64,
        offset_m: f64,
    ) -> Option<EmptyPoint> {
        locate_within(route, self.budget.budget_km(distance_to_empty_km, offset_m))
    }
}

/// Walk `route` and return the vertex where `budget_km` is reached.
///
/// A segment is consumed only while `travelled + segment < budget_km`; the
/// first segment failing that test yields its starting vertex. A budget of
/// zero or less therefore yields the first vertex of any route with at least
/// one segment.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "accumulates floating-point segment lengths"
)]
pub fn locate_within(route: &RoutePolyline, budget_km: f64) -> Option<EmptyPoint> {
    let mut travelled_km = 0.0;
    for (vertex_index, pair) in route.vertices().windows(2).enumerate() {
        let [from, to] = pair else {
            continue;
        };
        let segment_km = distance_km(*from, *to);
        if travelled_km + segment_km < budget_km {
            travelled_km += segment_km;
        } else {
            return Some(EmptyPoint {
                location: *from,
                vertex_index,
                travelled_km,
            });
        }
    }
    None
}
