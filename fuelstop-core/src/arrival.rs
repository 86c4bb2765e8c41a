//! Estimated arrival times from route leg durations.

use std::time::Duration;

use chrono::{NaiveDateTime, TimeDelta};
use thiserror::Error;

use crate::RoutePolyline;

/// Errors from [`estimate_arrival`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArrivalError {
    /// A leg of the route carries no duration, so no ETA can be computed.
    #[error("route leg {leg_index} has no duration")]
    IncompleteRouteData {
        /// Position of the first leg lacking a duration.
        leg_index: usize,
    },
    /// The travel time does not fit in the calendar range.
    #[error("travel time of {seconds}s overflows the calendar")]
    OutOfRange {
        /// Total travel time in whole seconds.
        seconds: u64,
    },
}

/// Total driving time across every leg of `route`.
///
/// # Errors
///
/// Returns [`ArrivalError::IncompleteRouteData`] for the first leg without a
/// duration.
pub fn total_duration(route: &RoutePolyline) -> Result<Duration, ArrivalError> {
    route
        .legs()
        .iter()
        .enumerate()
        .try_fold(Duration::ZERO, |total, (leg_index, leg)| {
            leg.duration
                .map(|duration| total.saturating_add(duration))
                .ok_or(ArrivalError::IncompleteRouteData { leg_index })
        })
}

/// Departure time plus the summed leg durations of `route`.
///
/// Times are naive local wall-clock values, matching how opening hours are
/// published.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use chrono::NaiveDate;
/// use geo::Coord;
/// use fuelstop_core::{Leg, RoutePolyline, estimate_arrival};
///
/// let route = RoutePolyline::new(
///     vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 0.0, y: 0.1 }],
///     vec![Leg::with_duration(Duration::from_secs(3600))],
/// )
/// .expect("valid route");
/// let departure = NaiveDate::from_ymd_opt(2024, 5, 6)
///     .and_then(|d| d.and_hms_opt(7, 0, 0))
///     .expect("valid timestamp");
/// let arrival = estimate_arrival(&route, departure).expect("complete route");
/// assert_eq!(arrival.format("%H:%M").to_string(), "08:00");
/// ```
///
/// # Errors
///
/// Returns [`ArrivalError::IncompleteRouteData`] when any leg lacks a
/// duration, and [`ArrivalError::OutOfRange`] when the sum overflows.
pub fn estimate_arrival(
    route: &RoutePolyline,
    departure: NaiveDateTime,
) -> Result<NaiveDateTime, ArrivalError> {
    let travel = total_duration(route)?;
    let out_of_range = || ArrivalError::OutOfRange {
        seconds: travel.as_secs(),
    };
    let delta = TimeDelta::from_std(travel).map_err(|_| out_of_range())?;
    departure.checked_add_signed(delta).ok_or_else(out_of_range)
}
