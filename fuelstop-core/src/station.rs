//! Fuel stations as returned by place services and as judged by the search.

use std::fmt;

use chrono::NaiveDateTime;
use geo::Coord;

use crate::WeeklySchedule;

/// Opaque identifier assigned to a station by the place service.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct StationId(String);

impl StationId {
    /// Wrap a service identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StationId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for StationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Category of place requested from a nearby search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PlaceCategory {
    /// Fuel and charging forecourts.
    FuelStation,
}

impl PlaceCategory {
    /// Stable wire name of the category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FuelStation => "fuel_station",
        }
    }
}

/// A station returned by a nearby search, not yet checked for opening hours.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use fuelstop_core::{CandidateStation, WeeklySchedule};
///
/// let station = CandidateStation::new("node/42", "Corner Fuel", Coord { x: 0.0, y: 0.1 })
///     .with_rating(4.5)
///     .with_opening_hours(WeeklySchedule::always_open());
/// assert_eq!(station.id.as_str(), "node/42");
/// assert!(station.opening_hours.is_some());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CandidateStation {
    /// Service identifier.
    pub id: StationId,
    /// Display name.
    pub name: String,
    /// Station position.
    pub location: Coord<f64>,
    /// Average user rating, when the service provides one.
    pub rating: Option<f32>,
    /// Weekly opening hours, when already known from the search response.
    pub opening_hours: Option<WeeklySchedule>,
}

impl CandidateStation {
    /// Construct a candidate without rating or opening hours.
    pub fn new(id: impl Into<StationId>, name: impl Into<String>, location: Coord<f64>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            location,
            rating: None,
            opening_hours: None,
        }
    }

    /// Attach a rating.
    #[must_use]
    pub const fn with_rating(mut self, rating: f32) -> Self {
        self.rating = Some(rating);
        self
    }

    /// Attach opening hours.
    #[must_use]
    pub fn with_opening_hours(mut self, schedule: WeeklySchedule) -> Self {
        self.opening_hours = Some(schedule);
        self
    }

    /// Merge a detail lookup into the candidate.
    ///
    /// Detail values replace the search values; a missing detail rating keeps
    /// the rating the search returned.
    #[must_use]
    pub fn with_details(self, details: StationDetails) -> Self {
        Self {
            id: self.id,
            name: details.name,
            location: details.location,
            rating: details.rating.or(self.rating),
            opening_hours: Some(details.opening_hours),
        }
    }
}

/// Result of a place detail lookup.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StationDetails {
    /// Display name.
    pub name: String,
    /// Average user rating, when known.
    pub rating: Option<f32>,
    /// Station position.
    pub location: Coord<f64>,
    /// Weekly opening hours.
    pub opening_hours: WeeklySchedule,
}

/// A candidate annotated with its estimated arrival and openness verdict.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvaluatedStation {
    /// The candidate, with details merged in.
    pub station: CandidateStation,
    /// Estimated local arrival time.
    pub estimated_arrival: NaiveDateTime,
    /// Whether the schedule is open at `estimated_arrival`.
    pub is_open_at_arrival: bool,
}

impl EvaluatedStation {
    /// Identifier of the underlying station.
    #[must_use]
    pub const fn id(&self) -> &StationId {
        &self.station.id
    }
}
