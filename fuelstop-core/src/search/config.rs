//! Tuning knobs for [`crate::StationSearch`].

use crate::RangeBudget;

use super::SearchError;

/// Default growth of the range offset between consecutive bands, in metres.
pub const DEFAULT_BAND_STEP_M: f64 = 5000.0;

/// Default radius of each nearby-search query, in metres.
pub const DEFAULT_QUERY_RADIUS_M: f64 = 5000.0;

/// Default distance from the origin below which the search stops, in km.
pub const DEFAULT_ORIGIN_PROXIMITY_KM: f64 = 5.0;

/// Zoom used when no band was searched.
pub const DEFAULT_ZOOM: u8 = 5;

/// Default number of candidates evaluated concurrently within a band.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 8;

/// How arrival times are estimated for candidates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EtaStrategy {
    /// Route from the origin to every candidate.
    #[default]
    PerCandidate,
    /// Route once from the origin to the band center and reuse the arrival
    /// for every candidate in that band.
    PerBandCenter,
}

/// Inclusive range of valid map zoom levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ZoomBounds {
    /// Most zoomed-out level.
    pub min: u8,
    /// Most zoomed-in level.
    pub max: u8,
}

impl Default for ZoomBounds {
    fn default() -> Self {
        Self { min: 0, max: 21 }
    }
}

impl ZoomBounds {
    /// Whether `zoom` lies within the bounds.
    #[must_use]
    pub const fn contains(&self, zoom: u8) -> bool {
        self.min <= zoom && zoom <= self.max
    }
}

/// Search configuration.
///
/// # Examples
/// ```
/// use fuelstop_core::{EtaStrategy, RangeBudget, SearchConfig};
///
/// let config = SearchConfig::default()
///     .with_range_budget(RangeBudget::legacy())
///     .with_eta_strategy(EtaStrategy::PerBandCenter);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.max_in_flight, 8);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SearchConfig {
    /// Offset added per band when recomputing the band center, in metres.
    pub band_step_m: f64,
    /// Radius passed to the place search service, in metres.
    pub query_radius_m: f64,
    /// Bands closer than this to the origin end the search, in kilometres.
    pub origin_proximity_km: f64,
    /// Clamp applied to computed zoom levels.
    pub zoom_bounds: ZoomBounds,
    /// Zoom reported when no band ran.
    pub default_zoom: u8,
    /// Maximum concurrent candidate evaluations per band.
    pub max_in_flight: usize,
    /// Arrival estimation strategy.
    pub eta_strategy: EtaStrategy,
    /// Conversion from distance-to-empty to a range budget.
    pub range_budget: RangeBudget,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            band_step_m: DEFAULT_BAND_STEP_M,
            query_radius_m: DEFAULT_QUERY_RADIUS_M,
            origin_proximity_km: DEFAULT_ORIGIN_PROXIMITY_KM,
            zoom_bounds: ZoomBounds::default(),
            default_zoom: DEFAULT_ZOOM,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            eta_strategy: EtaStrategy::default(),
            range_budget: RangeBudget::default(),
        }
    }
}

impl SearchConfig {
    /// Replace the range budget conversion.
    #[must_use]
    pub const fn with_range_budget(mut self, range_budget: RangeBudget) -> Self {
        self.range_budget = range_budget;
        self
    }

    /// Replace the arrival estimation strategy.
    #[must_use]
    pub const fn with_eta_strategy(mut self, eta_strategy: EtaStrategy) -> Self {
        self.eta_strategy = eta_strategy;
        self
    }

    /// Replace the per-band concurrency limit.
    #[must_use]
    pub const fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight;
        self
    }

    /// Check every field for a usable value.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidArgument`] naming the first bad field.
    pub fn validate(&self) -> Result<(), SearchError> {
        if !(self.band_step_m.is_finite() && self.band_step_m > 0.0) {
            return Err(SearchError::invalid(
                "band_step_m",
                "must be a positive number of metres",
            ));
        }
        if !(self.query_radius_m.is_finite() && self.query_radius_m > 0.0) {
            return Err(SearchError::invalid(
                "query_radius_m",
                "must be a positive number of metres",
            ));
        }
        if !(self.origin_proximity_km.is_finite() && self.origin_proximity_km >= 0.0) {
            return Err(SearchError::invalid(
                "origin_proximity_km",
                "must be a non-negative number of kilometres",
            ));
        }
        if self.zoom_bounds.min > self.zoom_bounds.max {
            return Err(SearchError::invalid("zoom_bounds", "min exceeds max"));
        }
        if !self.zoom_bounds.contains(self.default_zoom) {
            return Err(SearchError::invalid(
                "default_zoom",
                format!(
                    "{} lies outside {}..={}",
                    self.default_zoom, self.zoom_bounds.min, self.zoom_bounds.max
                ),
            ));
        }
        if self.max_in_flight == 0 {
            return Err(SearchError::invalid("max_in_flight", "must be at least 1"));
        }
        let scale = self.range_budget.range_scale;
        if !(scale.is_finite() && scale > 0.0) {
            return Err(SearchError::invalid(
                "range_scale",
                "must be a positive finite factor",
            ));
        }
        Ok(())
    }
}
