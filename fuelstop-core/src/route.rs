//! Drivable routes returned by a routing service.
//!
//! A [`RoutePolyline`] pairs the ordered vertices of the driven path with the
//! legs that make up the trip. Routes are immutable once built.

use std::time::Duration;

use geo::Coord;
use thiserror::Error;

use crate::geo_math::distance_km;

/// One leg of a route between two waypoints.
///
/// Routing services occasionally omit per-leg durations; those legs carry
/// `None` and block arrival estimation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Leg {
    /// Driving time for the leg, when the service reported one.
    pub duration: Option<Duration>,
    /// Driving distance for the leg in metres, when reported.
    pub distance_m: Option<f64>,
}

impl Leg {
    /// Construct a leg with a known duration and no distance.
    #[must_use]
    pub const fn with_duration(duration: Duration) -> Self {
        Self {
            duration: Some(duration),
            distance_m: None,
        }
    }

    /// Construct a leg whose duration is unknown.
    #[must_use]
    pub const fn without_duration() -> Self {
        Self {
            duration: None,
            distance_m: None,
        }
    }
}

/// Errors returned by [`RoutePolyline::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The polyline had no vertices.
    #[error("route must contain at least one vertex")]
    NoVertices,
    /// The route had no legs.
    #[error("route must contain at least one leg")]
    NoLegs,
    /// A vertex was NaN, infinite or outside WGS84 bounds.
    #[error("route vertex {index} is not a valid coordinate")]
    InvalidVertex {
        /// Position of the offending vertex.
        index: usize,
    },
}

/// An ordered drivable path and its legs.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use geo::Coord;
/// use fuelstop_core::{Leg, RoutePolyline};
///
/// # fn main() -> Result<(), fuelstop_core::RouteError> {
/// let route = RoutePolyline::new(
///     vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 0.0, y: 0.01 }],
///     vec![Leg::with_duration(Duration::from_secs(90))],
/// )?;
/// assert_eq!(route.vertices().len(), 2);
/// assert!(route.length_km() > 1.0);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RoutePolyline {
    vertices: Vec<Coord<f64>>,
    legs: Vec<Leg>,
}

impl RoutePolyline {
    /// Validate and construct a route.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError`] when the route has no vertices, no legs, or a
    /// vertex outside valid latitude/longitude bounds.
    pub fn new(vertices: Vec<Coord<f64>>, legs: Vec<Leg>) -> Result<Self, RouteError> {
        if vertices.is_empty() {
            return Err(RouteError::NoVertices);
        }
        if legs.is_empty() {
            return Err(RouteError::NoLegs);
        }
        if let Some(index) = vertices.iter().position(|vertex| !is_valid_coordinate(*vertex)) {
            return Err(RouteError::InvalidVertex { index });
        }
        Ok(Self { vertices, legs })
    }

    /// Ordered vertices of the driven path.
    #[must_use]
    pub fn vertices(&self) -> &[Coord<f64>] {
        &self.vertices
    }

    /// Legs making up the trip.
    #[must_use]
    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    /// First vertex of the path.
    #[must_use]
    pub fn start(&self) -> Option<Coord<f64>> {
        self.vertices.first().copied()
    }

    /// Last vertex of the path.
    #[must_use]
    pub fn end(&self) -> Option<Coord<f64>> {
        self.vertices.last().copied()
    }

    /// Great-circle length of the polyline in kilometres.
    #[must_use]
    pub fn length_km(&self) -> f64 {
        self.vertices
            .windows(2)
            .filter_map(|pair| match pair {
                [from, to] => Some(distance_km(*from, *to)),
                _ => None,
            })
            .sum()
    }
}

/// Return `true` when `coord` is a finite WGS84 longitude/latitude pair.
#[must_use]
pub fn is_valid_coordinate(coord: Coord<f64>) -> bool {
    coord.x.is_finite()
        && coord.y.is_finite()
        && (-180.0..=180.0).contains(&coord.x)
        && (-90.0..=90.0).contains(&coord.y)
}
