//! Inputs for a single station search.

use chrono::NaiveDateTime;
use geo::Coord;

use crate::RoutePolyline;
use crate::route::is_valid_coordinate;

use super::SearchError;

/// Everything the search needs to know about one trip.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    /// Route from the origin towards the destination.
    pub route: RoutePolyline,
    /// Remaining range reported by the vehicle, scaled by
    /// [`crate::RangeBudget`].
    pub distance_to_empty_km: f64,
    /// Safety margin subtracted from the range, in metres.
    pub search_offset_m: f64,
    /// Where the traveller is now.
    pub origin: Coord<f64>,
    /// Local departure time.
    pub departure: NaiveDateTime,
}

impl SearchRequest {
    /// Reject inputs the search cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidArgument`] for a negative or non-finite
    /// range or offset, or an origin outside WGS84 bounds.
    pub fn validate(&self) -> Result<(), SearchError> {
        if !(self.distance_to_empty_km.is_finite() && self.distance_to_empty_km >= 0.0) {
            return Err(SearchError::invalid(
                "distance_to_empty_km",
                format!(
                    "expected a non-negative distance, got {}",
                    self.distance_to_empty_km
                ),
            ));
        }
        if !(self.search_offset_m.is_finite() && self.search_offset_m >= 0.0) {
            return Err(SearchError::invalid(
                "search_offset_m",
                format!(
                    "expected a non-negative offset, got {}",
                    self.search_offset_m
                ),
            ));
        }
        if !is_valid_coordinate(self.origin) {
            return Err(SearchError::invalid(
                "origin",
                "not a valid longitude/latitude pair",
            ));
        }
        Ok(())
    }
}
