//! Great-circle distances between WGS84 coordinates.
//!
//! Coordinates follow the `geo` convention: `x` is longitude and `y` is
//! latitude, both in degrees. Distances are returned in kilometres.

use geo::Coord;

/// Mean Earth radius used by the haversine formula, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Convert degrees to radians.
///
/// # Examples
/// ```
/// use fuelstop_core::geo_math::to_radians;
///
/// assert!((to_radians(180.0) - std::f64::consts::PI).abs() < 1e-12);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "degree to radian scaling is a float multiplication"
)]
pub const fn to_radians(degrees: f64) -> f64 {
    degrees * (std::f64::consts::PI / 180.0)
}

/// Haversine distance between `a` and `b` in kilometres.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use fuelstop_core::geo_math::distance_km;
///
/// let london = Coord { x: -0.1276, y: 51.5072 };
/// let paris = Coord { x: 2.3522, y: 48.8566 };
/// let km = distance_km(london, paris);
/// assert!((km - 343.5).abs() < 2.0);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "the haversine formula is floating-point trigonometry"
)]
pub fn distance_km(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let lat_a = to_radians(a.y);
    let lat_b = to_radians(b.y);
    let delta_lat = to_radians(b.y - a.y);
    let delta_lng = to_radians(b.x - a.x);

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (delta_lng / 2.0).sin().powi(2);
    // Rounding can push `h` marginally above one for antipodal points.
    let c = 2.0 * h.clamp(0.0, 1.0).sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Degrees of latitude spanned by `km` along a meridian.
///
/// Useful for laying out test routes and fixtures on a straight north-south
/// line, where the haversine distance reduces to arc length.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "arc length to angle conversion is float division"
)]
pub const fn km_to_latitude_degrees(km: f64) -> f64 {
    km / to_radians(EARTH_RADIUS_KM)
}
