//! OSRM API response types for the Route service.
//!
//! See: <http://project-osrm.org/docs/v5.24.0/api/#route-service>

use serde::Deserialize;

/// OSRM Route API response.
#[derive(Debug, Deserialize)]
pub struct RouteResponse {
    /// Status code from OSRM.
    ///
    /// Common values:
    /// - `"Ok"` - Request was successful
    /// - `"NoRoute"` - No route between the coordinates
    /// - `"InvalidQuery"` - Invalid query parameters
    pub code: String,

    /// Optional error message when `code` is not `"Ok"`.
    pub message: Option<String>,

    /// Alternative routes, best first.
    #[serde(default)]
    pub routes: Vec<RouteObject>,
}

impl RouteResponse {
    /// Check if the response indicates success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == "Ok"
    }

    /// Whether OSRM reported that the coordinates are not connected.
    #[must_use]
    pub fn is_no_route(&self) -> bool {
        self.code == "NoRoute"
    }
}

/// One route in a Route API response.
#[derive(Debug, Deserialize)]
pub struct RouteObject {
    /// Full route geometry, requested with `geometries=geojson`.
    pub geometry: LineString,
    /// Legs between consecutive waypoints.
    #[serde(default)]
    pub legs: Vec<RouteLeg>,
}

/// GeoJSON line string with `[lon, lat]` positions.
#[derive(Debug, Deserialize)]
pub struct LineString {
    /// Ordered positions.
    pub coordinates: Vec<[f64; 2]>,
}

/// A leg between two waypoints.
#[derive(Debug, Deserialize)]
pub struct RouteLeg {
    /// Travel time in seconds.
    pub duration: Option<f64>,
    /// Travel distance in metres.
    pub distance: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialise_success_response() {
        let json = r#"{
            "code": "Ok",
            "routes": [{
                "geometry": {"type": "LineString", "coordinates": [[13.38, 52.51], [13.40, 52.52]]},
                "legs": [{"duration": 260.4, "distance": 1886.3, "summary": ""}],
                "duration": 260.4,
                "distance": 1886.3
            }],
            "waypoints": []
        }"#;

        let response: RouteResponse = serde_json::from_str(json).expect("should deserialise");

        assert!(response.is_ok());
        let route = response.routes.first().expect("should have a route");
        assert_eq!(route.geometry.coordinates.len(), 2);
        assert_eq!(route.legs.first().and_then(|leg| leg.duration), Some(260.4));
    }

    #[test]
    fn deserialise_no_route_response() {
        let json = r#"{"code": "NoRoute", "message": "Impossible route between points"}"#;

        let response: RouteResponse = serde_json::from_str(json).expect("should deserialise");

        assert!(!response.is_ok());
        assert!(response.is_no_route());
        assert!(response.routes.is_empty());
    }

    #[test]
    fn deserialise_leg_with_null_duration() {
        let json = r#"{
            "code": "Ok",
            "routes": [{"geometry": {"coordinates": [[0.0, 0.0]]}, "legs": [{"duration": null}]}]
        }"#;

        let response: RouteResponse = serde_json::from_str(json).expect("should deserialise");

        let leg = response
            .routes
            .first()
            .and_then(|route| route.legs.first())
            .expect("should have a leg");
        assert_eq!(leg.duration, None);
        assert_eq!(leg.distance, None);
    }
}
