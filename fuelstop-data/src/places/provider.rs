//! Place search and detail lookups backed by the Overpass API.

use async_trait::async_trait;
use fuelstop_core::{
    CandidateStation, DetailFailure, PlaceCategory, PlaceDetailService, PlaceSearchService,
    SearchFailure, StationDetails, StationId, TransportError, is_valid_coordinate,
};
use geo::Coord;
use log::debug;
use url::Url;

use super::overpass::{Element, OverpassResponse};
use crate::http::{HttpEndpoint, HttpServiceConfig, ProviderBuildError, decode_json};
use crate::opening_hours::parse_opening_hours;

/// Public Overpass interpreter endpoint.
pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

/// Server-side query timeout passed in the `[timeout:..]` setting.
const QUERY_TIMEOUT_SECS: u64 = 25;

const FALLBACK_NAME: &str = "Fuel station";
const TOO_MANY_REQUESTS: u16 = 429;

/// Fuel stations from OpenStreetMap via an Overpass interpreter.
///
/// Implements both [`PlaceSearchService`] and [`PlaceDetailService`].
/// Nearby searches attach opening hours whenever the `opening_hours` tag
/// parses, so most candidates need no separate detail lookup.
#[derive(Debug, Clone)]
pub struct OverpassPlaceService {
    endpoint: HttpEndpoint,
}

impl OverpassPlaceService {
    /// Create a service for the interpreter at `interpreter_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderBuildError`] when the URL is invalid or the HTTP
    /// client fails to build.
    pub fn new(interpreter_url: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(&HttpServiceConfig::new(interpreter_url))
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

    fn query_url(&self, query: &str) -> Url {
        let mut url = self.endpoint.base_url().clone();
        url.query_pairs_mut().append_pair("data", query);
        url
    }
}

#[async_trait]
impl PlaceSearchService for OverpassPlaceService {
    async fn nearby_search(
        &self,
        center: Coord<f64>,
        radius_m: f64,
        category: PlaceCategory,
    ) -> Result<Vec<CandidateStation>, SearchFailure> {
        if !is_valid_coordinate(center) {
            return Err(SearchFailure::Rejected {
                reason: "search center is not a valid coordinate".to_owned(),
            });
        }
        if !(radius_m.is_finite() && radius_m > 0.0) {
            return Err(SearchFailure::Rejected {
                reason: format!("search radius must be positive, got {radius_m}"),
            });
        }

        let url = self.query_url(&nearby_query(center, radius_m, category));
        let shown = url.to_string();
        let reply = self.endpoint.fetch(url).await?;
        if reply.status == TOO_MANY_REQUESTS {
            return Err(SearchFailure::Rejected {
                reason: "Overpass rate limit reached".to_owned(),
            });
        }
        if !reply.is_success() {
            return Err(reply.status_error(&shown).into());
        }
        let stations = decode_candidates(&reply.body)?;
        debug!(
            "Overpass returned {} {} candidates within {radius_m:.0} m of ({}, {})",
            stations.len(),
            category.as_str(),
            center.y,
            center.x
        );
        Ok(stations)
    }
}

#[async_trait]
impl PlaceDetailService for OverpassPlaceService {
    async fn details(&self, station_id: &StationId) -> Result<StationDetails, DetailFailure> {
        let query = detail_query(station_id).ok_or_else(|| DetailFailure::UnknownStation {
            station_id: station_id.clone(),
        })?;
        let body = self.endpoint.get_text(self.query_url(&query)).await?;
        decode_details(station_id, &body)
    }
}

fn nearby_query(center: Coord<f64>, radius_m: f64, category: PlaceCategory) -> String {
    format!(
        "[out:json][timeout:{QUERY_TIMEOUT_SECS}];nwr{filter}(around:{radius_m:.0},{lat},{lon});out center tags;",
        filter = category_filter(category),
        lat = center.y,
        lon = center.x,
    )
}

const fn category_filter(category: PlaceCategory) -> &'static str {
    match category {
        PlaceCategory::FuelStation => r#"["amenity"="fuel"]"#,
    }
}

/// `None` unless the identifier has the `kind/number` form produced by searches.
fn detail_query(station_id: &StationId) -> Option<String> {
    let (kind, number) = station_id.as_str().split_once('/')?;
    let osm_id: u64 = number.parse().ok()?;
    matches!(kind, "node" | "way" | "relation").then(|| {
        format!("[out:json][timeout:{QUERY_TIMEOUT_SECS}];{kind}({osm_id});out center tags;")
    })
}

fn decode_response(body: &str) -> Result<OverpassResponse, TransportError> {
    let response: OverpassResponse = decode_json(body)?;
    if let Some(remark) = response.error_remark() {
        return Err(TransportError::Service {
            code: "remark".to_owned(),
            message: remark.to_owned(),
        });
    }
    Ok(response)
}

/// Decode an Overpass nearby-search body into candidate stations.
///
/// Elements without coordinates are dropped. Opening hours are attached when
/// the `opening_hours` tag parses and left for a detail lookup otherwise.
///
/// # Errors
///
/// Returns a transport failure when the body is not Overpass JSON or the
/// server flagged a runtime error.
///
/// # Examples
/// ```
/// use fuelstop_data::places::decode_candidates;
///
/// let body = r#"{"elements": [
///     {"type": "node", "id": 7, "lat": 51.5, "lon": -0.1,
///      "tags": {"amenity": "fuel", "name": "Corner Fuel", "opening_hours": "24/7"}}
/// ]}"#;
/// let stations = decode_candidates(body)?;
/// assert_eq!(stations.len(), 1);
/// assert!(stations.iter().all(|s| s.opening_hours.is_some()));
/// # Ok::<(), fuelstop_core::SearchFailure>(())
/// ```
pub fn decode_candidates(body: &str) -> Result<Vec<CandidateStation>, SearchFailure> {
    let response = decode_response(body)?;
    Ok(response.elements.iter().filter_map(candidate_from).collect())
}

fn candidate_from(element: &Element) -> Option<CandidateStation> {
    let Some(location) = element.location() else {
        debug!("skipping {} without coordinates", element.station_key());
        return None;
    };
    let station = CandidateStation::new(
        element.station_key(),
        element.display_name().unwrap_or(FALLBACK_NAME),
        location,
    );
    let Some(tag) = element.tag("opening_hours") else {
        return Some(station);
    };
    match parse_opening_hours(tag) {
        Ok(schedule) => Some(station.with_opening_hours(schedule)),
        Err(err) => {
            debug!("{}: {err}; deferring to a detail lookup", element.station_key());
            Some(station)
        }
    }
}

/// Decode an Overpass detail body for `station_id`.
///
/// # Errors
///
/// Returns [`DetailFailure::UnknownStation`] when the body does not contain
/// the station, [`DetailFailure::IncompleteSchedule`] when its
/// `opening_hours` tag is missing or unparseable, and a transport failure
/// when the body is unusable.
pub fn decode_details(station_id: &StationId, body: &str) -> Result<StationDetails, DetailFailure> {
    let response = decode_response(body)?;
    let element = response
        .elements
        .iter()
        .find(|element| element.station_key() == station_id.as_str())
        .ok_or_else(|| DetailFailure::UnknownStation {
            station_id: station_id.clone(),
        })?;
    let location = element.location().ok_or_else(|| TransportError::Parse {
        message: format!("{station_id} has no coordinates"),
    })?;
    let tag = element
        .tag("opening_hours")
        .ok_or_else(|| DetailFailure::IncompleteSchedule {
            station_id: station_id.clone(),
            reason: "no opening_hours tag".to_owned(),
        })?;
    let opening_hours =
        parse_opening_hours(tag).map_err(|err| DetailFailure::IncompleteSchedule {
            station_id: station_id.clone(),
            reason: err.to_string(),
        })?;
    Ok(StationDetails {
        name: element.display_name().unwrap_or(FALLBACK_NAME).to_owned(),
        rating: None,
        location,
        opening_hours,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;
    use fuelstop_core::WeeklySchedule;
    use rstest::{fixture, rstest};

    #[fixture]
    fn service() -> OverpassPlaceService {
        OverpassPlaceService::new("https://overpass.example.com/api/interpreter")
            .expect("service should build")
    }

    const SEARCH_BODY: &str = r#"{"elements": [
        {"type": "node", "id": 11, "lat": 51.50, "lon": -0.10,
         "tags": {"amenity": "fuel", "name": "Corner Fuel", "opening_hours": "24/7"}},
        {"type": "way", "id": 12, "center": {"lat": 51.52, "lon": -0.12},
         "tags": {"amenity": "fuel", "brand": "Shell", "opening_hours": "sunrise-sunset"}},
        {"type": "relation", "id": 13, "tags": {"amenity": "fuel"}},
        {"type": "node", "id": 14, "lat": 51.54, "lon": -0.14, "tags": {"amenity": "fuel"}}
    ]}"#;

    #[rstest]
    fn nearby_query_targets_fuel_amenities() {
        let query = nearby_query(
            Coord { x: -0.1, y: 51.5 },
            5000.0,
            PlaceCategory::FuelStation,
        );

        assert_eq!(
            query,
            r#"[out:json][timeout:25];nwr["amenity"="fuel"](around:5000,51.5,-0.1);out center tags;"#
        );
    }

    #[rstest]
    fn query_url_encodes_the_query(service: OverpassPlaceService) {
        let url = service.query_url("node(1);out;");

        assert_eq!(
            url.as_str(),
            "https://overpass.example.com/api/interpreter?data=node%281%29%3Bout%3B"
        );
    }

    #[rstest]
    #[case("node/2870129831", Some("[out:json][timeout:25];node(2870129831);out center tags;"))]
    #[case("way/12", Some("[out:json][timeout:25];way(12);out center tags;"))]
    #[case("relation/3", Some("[out:json][timeout:25];relation(3);out center tags;"))]
    #[case("area/3", None)]
    #[case("node/abc", None)]
    #[case("ChIJN1t_tDeuEmsRUsoyG83frY4", None)]
    fn detail_queries_need_osm_identifiers(#[case] id: &str, #[case] expected: Option<&str>) {
        assert_eq!(detail_query(&StationId::new(id)).as_deref(), expected);
    }

    #[rstest]
    fn candidates_keep_parsable_hours_only() {
        let stations = decode_candidates(SEARCH_BODY).expect("should decode");

        let ids: Vec<&str> = stations.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["node/11", "way/12", "node/14"]);
        let hours: Vec<bool> = stations.iter().map(|s| s.opening_hours.is_some()).collect();
        assert_eq!(hours, vec![true, false, false]);
    }

    #[rstest]
    fn candidates_fall_back_to_brand_then_default_name() {
        let stations = decode_candidates(SEARCH_BODY).expect("should decode");

        let names: Vec<&str> = stations.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Corner Fuel", "Shell", FALLBACK_NAME]);
    }

    #[rstest]
    fn error_remarks_fail_the_search() {
        let err = decode_candidates(
            r#"{"elements": [], "remark": "runtime error: Query ran out of memory"}"#,
        )
        .expect_err("should fail");

        assert!(matches!(
            err,
            SearchFailure::Transport(TransportError::Service { .. })
        ));
    }

    #[rstest]
    fn details_parse_the_schedule() {
        let body = r#"{"elements": [{"type": "node", "id": 21, "lat": 48.1, "lon": 11.5,
            "tags": {"name": "Autohof", "opening_hours": "Mo-Sa 06:00-22:00; Su off"}}]}"#;

        let details = decode_details(&StationId::new("node/21"), body).expect("should decode");

        assert_eq!(details.name, "Autohof");
        assert_eq!(details.location, Coord { x: 11.5, y: 48.1 });
        assert_eq!(details.rating, None);
        assert!(details.opening_hours.hours_on(Weekday::Sun).is_empty());
        assert_ne!(details.opening_hours, WeeklySchedule::new());
    }

    #[rstest]
    #[case(r#"{"elements": [{"type": "node", "id": 22, "lat": 1.0, "lon": 1.0, "tags": {}}]}"#)]
    #[case(r#"{"elements": [{"type": "node", "id": 22, "lat": 1.0, "lon": 1.0, "tags": {"opening_hours": "by appointment"}}]}"#)]
    fn details_without_usable_hours_are_incomplete(#[case] body: &str) {
        let err = decode_details(&StationId::new("node/22"), body).expect_err("should fail");

        assert!(matches!(err, DetailFailure::IncompleteSchedule { .. }));
    }

    #[rstest]
    fn details_for_missing_element_are_unknown() {
        let err = decode_details(&StationId::new("node/23"), r#"{"elements": []}"#)
            .expect_err("should fail");

        assert_eq!(
            err,
            DetailFailure::UnknownStation {
                station_id: StationId::new("node/23")
            }
        );
    }

    #[rstest]
    #[tokio::test]
    async fn foreign_identifiers_fail_without_a_request(service: OverpassPlaceService) {
        let err = service
            .details(&StationId::new("ChIJN1t_tDeuEmsRUsoyG83frY4"))
            .await
            .expect_err("should fail");

        assert!(matches!(err, DetailFailure::UnknownStation { .. }));
    }

    #[rstest]
    #[case(Coord { x: 0.0, y: 0.0 }, 0.0)]
    #[case(Coord { x: 0.0, y: 0.0 }, f64::NAN)]
    #[case(Coord { x: 200.0, y: 0.0 }, 5000.0)]
    #[tokio::test]
    async fn invalid_searches_are_rejected_locally(
        service: OverpassPlaceService,
        #[case] center: Coord<f64>,
        #[case] radius_m: f64,
    ) {
        let err = service
            .nearby_search(center, radius_m, PlaceCategory::FuelStation)
            .await
            .expect_err("should fail");

        assert!(matches!(err, SearchFailure::Rejected { .. }));
    }
}
