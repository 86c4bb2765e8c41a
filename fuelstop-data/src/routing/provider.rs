//! [`RoutingService`] backed by the OSRM Route API.

use std::time::Duration;

use async_trait::async_trait;
use fuelstop_core::{
    Leg, RoutePolyline, RoutingFailure, RoutingService, TransportError, is_valid_coordinate,
};
use geo::Coord;
use url::Url;

use super::osrm::{RouteLeg, RouteResponse};
use crate::http::{HttpEndpoint, HttpServiceConfig, ProviderBuildError, decode_json};

/// Default base URL for a locally hosted OSRM instance.
pub const DEFAULT_OSRM_BASE_URL: &str = "http://localhost:5000";

const ROUTE_PROFILE: &str = "driving";

/// Driving routes from an OSRM server.
///
/// Each call issues one `route/v1/driving` request for the full GeoJSON
/// geometry and converts the first returned route into a [`RoutePolyline`].
#[derive(Debug, Clone)]
pub struct OsrmRoutingService {
    endpoint: HttpEndpoint,
}

impl OsrmRoutingService {
    /// Create a service with default timeouts for the OSRM server at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderBuildError`] when the URL is invalid or the HTTP
    /// client fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(&HttpServiceConfig::new(base_url))
    }

    /// Create a service with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderBuildError`] when the URL is invalid or the HTTP
    /// client fails to build.
    pub fn with_config(config: &HttpServiceConfig) -> Result<Self, ProviderBuildError> {
        Ok(Self {
            endpoint: HttpEndpoint::build(config)?,
        })
    }

    /// Build the Route API URL.
    ///
    /// The format is
    /// `{base_url}/route/v1/driving/{lon},{lat};{lon},{lat}?overview=full&geometries=geojson`.
    fn route_url(&self, origin: Coord<f64>, destination: Coord<f64>) -> Url {
        let coordinates = format!(
            "{},{};{},{}",
            origin.x, origin.y, destination.x, destination.y
        );
        let mut url = self
            .endpoint
            .url_with_path(["route", "v1", ROUTE_PROFILE, coordinates.as_str()]);
        url.query_pairs_mut()
            .append_pair("overview", "full")
            .append_pair("geometries", "geojson");
        url
    }
}

#[async_trait]
impl RoutingService for OsrmRoutingService {
    async fn route(
        &self,
        origin: Coord<f64>,
        destination: Coord<f64>,
    ) -> Result<RoutePolyline, RoutingFailure> {
        for (field, coord) in [("origin", origin), ("destination", destination)] {
            if !is_valid_coordinate(coord) {
                return Err(RoutingFailure::InvalidRoute {
                    reason: format!("{field} is not a valid coordinate"),
                });
            }
        }

        let url = self.route_url(origin, destination);
        let shown = url.to_string();
        let reply = self.endpoint.fetch(url).await?;
        // OSRM answers NoRoute and InvalidQuery with a 400 and a JSON body.
        match decode_json::<RouteResponse>(&reply.body) {
            Ok(response) => convert_response(response),
            Err(_) if !reply.is_success() => Err(reply.status_error(&shown).into()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Decode an OSRM Route API body into a [`RoutePolyline`].
///
/// # Errors
///
/// Returns [`RoutingFailure::NoRoute`] when OSRM found no route,
/// [`RoutingFailure::InvalidRoute`] when the geometry is unusable, and a
/// transport failure when the body is not a Route API response or reports
/// another error code.
///
/// # Examples
/// ```
/// use fuelstop_data::routing::decode_route_response;
///
/// let body = r#"{
///     "code": "Ok",
///     "routes": [{
///         "geometry": {"coordinates": [[13.38, 52.51], [13.40, 52.52]]},
///         "legs": [{"duration": 260.0, "distance": 1886.3}]
///     }]
/// }"#;
/// let route = decode_route_response(body)?;
/// assert_eq!(route.vertices().len(), 2);
/// # Ok::<(), fuelstop_core::RoutingFailure>(())
/// ```
pub fn decode_route_response(body: &str) -> Result<RoutePolyline, RoutingFailure> {
    convert_response(decode_json(body)?)
}

fn convert_response(response: RouteResponse) -> Result<RoutePolyline, RoutingFailure> {
    if response.is_no_route() {
        return Err(RoutingFailure::NoRoute);
    }
    if !response.is_ok() {
        return Err(TransportError::Service {
            code: response.code,
            message: response.message.unwrap_or_default(),
        }
        .into());
    }

    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or(RoutingFailure::NoRoute)?;
    let vertices = route
        .geometry
        .coordinates
        .into_iter()
        .map(|[x, y]| Coord { x, y })
        .collect();
    let legs = route.legs.into_iter().map(convert_leg).collect();
    RoutePolyline::new(vertices, legs).map_err(|err| RoutingFailure::InvalidRoute {
        reason: err.to_string(),
    })
}

/// Durations that are negative, NaN, infinite or beyond `Duration::MAX` are
/// treated as unknown.
fn convert_leg(leg: RouteLeg) -> Leg {
    Leg {
        duration: leg
            .duration
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok()),
        distance_m: leg
            .distance
            .filter(|metres| metres.is_finite() && *metres >= 0.0),
    }
}
