//! Merge per-band outcomes into the final [`SearchResult`].

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use geo::Coord;

use crate::{EvaluatedStation, SearchFailure, StationId};

use super::{Band, CandidateFailure, SearchError, Termination, ZoomBounds};

/// Map zoom level for a search radius in metres.
///
/// `zoom = round(14 - log2(radius_m / 500))`, clamped to `bounds`.
/// Non-positive radii zoom all the way in.
///
/// # Examples
/// ```
/// use fuelstop_core::{ZoomBounds, zoom_for_radius};
///
/// assert_eq!(zoom_for_radius(500.0, ZoomBounds::default()), 14);
/// assert_eq!(zoom_for_radius(5000.0, ZoomBounds::default()), 11);
/// assert_eq!(zoom_for_radius(0.0, ZoomBounds::default()), 21);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "zoom is a clamped logarithm of the radius"
)]
pub fn zoom_for_radius(radius_m: f64, bounds: ZoomBounds) -> u8 {
    let raw = 14.0 - (radius_m / 500.0).log2();
    if raw.is_nan() {
        return bounds.max;
    }
    raw.round()
        .clamp(f64::from(bounds.min), f64::from(bounds.max)) as u8
}

/// Everything learned from searching one band.
#[derive(Debug, Clone, PartialEq)]
pub struct BandOutcome {
    /// The band that was searched.
    pub band: Band,
    /// Zoom level matching the band's radius.
    pub zoom: u8,
    /// Candidates with an arrival verdict, open or closed.
    pub stations: Vec<EvaluatedStation>,
    /// Candidates excluded because a lookup failed.
    pub failures: Vec<CandidateFailure>,
    /// Set when the nearby search for the band failed.
    pub search_failure: Option<SearchFailure>,
}

impl BandOutcome {
    /// Outcome of a band whose nearby search failed.
    #[must_use]
    pub const fn failed(band: Band, zoom: u8, failure: SearchFailure) -> Self {
        Self {
            band,
            zoom,
            stations: Vec::new(),
            failures: Vec::new(),
            search_failure: Some(failure),
        }
    }

    /// Stations open at their estimated arrival.
    pub fn open_stations(&self) -> impl Iterator<Item = &EvaluatedStation> {
        self.stations.iter().filter(|station| station.is_open_at_arrival)
    }
}

/// Counters describing how a search went.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchDiagnostics {
    /// Bands that were queried.
    pub bands_searched: usize,
    /// Bands whose nearby search failed.
    pub failed_bands: usize,
    /// Candidates that received an arrival verdict.
    pub candidates_evaluated: usize,
    /// Candidates excluded because a lookup failed.
    pub candidates_excluded: usize,
}

/// Final outcome of a station search.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchResult {
    /// Open stations, unique by id and ordered by id.
    pub stations: Vec<EvaluatedStation>,
    /// Center for framing the result on a map.
    pub map_center: Coord<f64>,
    /// Zoom for framing the result on a map.
    pub zoom_level: u8,
    /// Why the band loop stopped.
    pub termination: Termination,
    /// Search counters.
    pub diagnostics: SearchDiagnostics,
}

impl SearchResult {
    /// Whether no open station was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Look up a station by id.
    #[must_use]
    pub fn station(&self, id: &StationId) -> Option<&EvaluatedStation> {
        self.stations.iter().find(|station| station.id() == id)
    }

    /// Turn an empty result into an error.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::RangeExhaustedWithoutStation`] when no open
    /// station was found.
    pub fn into_found(self) -> Result<Self, SearchError> {
        if self.is_empty() {
            return Err(SearchError::RangeExhaustedWithoutStation {
                bands_searched: self.diagnostics.bands_searched,
                termination: self.termination,
            });
        }
        Ok(self)
    }
}

/// Merges band outcomes, keeping the first evaluation of each station.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultAggregator {
    default_zoom: u8,
}

impl ResultAggregator {
    /// Aggregator reporting `default_zoom` when no band ran.
    #[must_use]
    pub const fn new(default_zoom: u8) -> Self {
        Self { default_zoom }
    }

    /// Build the result from `outcomes` in band order.
    ///
    /// Only stations open at arrival are kept. A station reported by more
    /// than one band keeps its first evaluation. The zoom comes from the
    /// last band.
    #[must_use]
    pub fn aggregate(
        &self,
        map_center: Coord<f64>,
        outcomes: &[BandOutcome],
        termination: Termination,
    ) -> SearchResult {
        let mut unique: BTreeMap<StationId, EvaluatedStation> = BTreeMap::new();
        let mut diagnostics = SearchDiagnostics::default();
        for outcome in outcomes {
            diagnostics.bands_searched = diagnostics.bands_searched.saturating_add(1);
            if outcome.search_failure.is_some() {
                diagnostics.failed_bands = diagnostics.failed_bands.saturating_add(1);
            }
            diagnostics.candidates_evaluated = diagnostics
                .candidates_evaluated
                .saturating_add(outcome.stations.len());
            diagnostics.candidates_excluded = diagnostics
                .candidates_excluded
                .saturating_add(outcome.failures.len());
            for station in outcome.open_stations() {
                if let Entry::Vacant(slot) = unique.entry(station.id().clone()) {
                    slot.insert(station.clone());
                }
            }
        }
        let zoom_level = outcomes
            .last()
            .map_or(self.default_zoom, |outcome| outcome.zoom);
        SearchResult {
            stations: unique.into_values().collect(),
            map_center,
            zoom_level,
            termination,
            diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{evaluated, monday_at};
    use crate::TransportError;
    use rstest::rstest;

    fn band(index: usize, radius_m: f64) -> Band {
        Band {
            index,
            center: Coord { x: 0.0, y: 0.1 },
            vertex_index: index,
            radius_m,
        }
    }

    fn outcome(index: usize, stations: Vec<EvaluatedStation>) -> BandOutcome {
        BandOutcome {
            band: band(index, 5000.0),
            zoom: 11,
            stations,
            failures: Vec::new(),
            search_failure: None,
        }
    }

    #[rstest]
    #[case(500.0, 14)]
    #[case(1000.0, 13)]
    #[case(10_000.0, 10)]
    #[case(1.0e12, 0)]
    #[case(-5.0, 21)]
    fn zoom_is_clamped(#[case] radius_m: f64, #[case] zoom: u8) {
        assert_eq!(zoom_for_radius(radius_m, ZoomBounds::default()), zoom);
    }

    #[rstest]
    fn first_evaluation_wins_and_closed_stations_drop() {
        let first = evaluated("node/1", monday_at(8, 0), true);
        let later = evaluated("node/1", monday_at(9, 0), true);
        let closed = evaluated("node/2", monday_at(8, 0), false);
        let outcomes = vec![
            outcome(0, vec![first.clone(), closed]),
            outcome(1, vec![later]),
        ];
        let result =
            ResultAggregator::new(5).aggregate(Coord { x: 1.0, y: 2.0 }, &outcomes, Termination::OriginReached);

        assert_eq!(result.stations, vec![first]);
        assert_eq!(result.map_center, Coord { x: 1.0, y: 2.0 });
        assert_eq!(result.zoom_level, 11);
        assert_eq!(result.diagnostics.bands_searched, 2);
        assert_eq!(result.diagnostics.candidates_evaluated, 3);
    }

    #[rstest]
    fn no_bands_uses_default_zoom() {
        let result = ResultAggregator::new(5).aggregate(
            Coord { x: 0.0, y: 0.0 },
            &[],
            Termination::OriginReached,
        );
        assert_eq!(result.zoom_level, 5);
        assert!(result.is_empty());
        assert_eq!(
            result.into_found(),
            Err(SearchError::RangeExhaustedWithoutStation {
                bands_searched: 0,
                termination: Termination::OriginReached,
            })
        );
    }

    #[rstest]
    fn failed_bands_are_counted() {
        let failure = SearchFailure::Transport(TransportError::Parse {
            message: "bad json".to_owned(),
        });
        let outcomes = vec![
            BandOutcome::failed(band(0, 5000.0), 11, failure),
            outcome(1, vec![evaluated("node/3", monday_at(8, 0), true)]),
        ];
        let result = ResultAggregator::new(5).aggregate(
            Coord { x: 0.0, y: 0.0 },
            &outcomes,
            Termination::RouteCovered,
        );
        assert_eq!(result.diagnostics.failed_bands, 1);
        assert_eq!(result.stations.len(), 1);
        assert!(result.station(&StationId::from("node/3")).is_some());
    }
}
