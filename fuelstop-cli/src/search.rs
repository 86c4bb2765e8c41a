//! Search command implementation for the `fuelstop` CLI.

use std::io::{BufReader, Write};
use std::sync::Arc;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::File};
use chrono::NaiveDateTime;
use clap::Parser;
use fuelstop_core::{
    BandOutcome, EtaStrategy, PlaceDetailService, PlaceSearchService, RangeBudget,
    RoutingService, SearchConfig, SearchError, SearchRequest, SearchResult, StationSearch,
    is_valid_coordinate,
};
use fuelstop_data::{
    DEFAULT_OSRM_BASE_URL, DEFAULT_OVERPASS_URL, DEFAULT_TIMEOUT_SECS, HttpServiceConfig,
    OsrmRoutingService, OverpassPlaceService,
};
use geo::Coord;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::{
    ARG_SEARCH_ETA_PER_BAND, ARG_SEARCH_MAX_IN_FLIGHT, ARG_SEARCH_OSRM_BASE_URL,
    ARG_SEARCH_OVERPASS_URL, ARG_SEARCH_RANGE_SCALE, ARG_SEARCH_REQUEST,
    ARG_SEARCH_TIMEOUT_SECS, CliError, ENV_SEARCH_REQUEST,
};

/// Safety margin applied when the request file does not set one, in metres.
const DEFAULT_SEARCH_OFFSET_M: f64 = 5000.0;

/// CLI arguments for the `search` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Route the trip described in a JSON request file through \
                 OSRM, predict where the tank runs dry and search Overpass \
                 backwards along the route for stations open on arrival.",
    about = "Search for an open fuel station along a trip"
)]
#[ortho_config(prefix = "FUELSTOP")]
pub(crate) struct SearchArgs {
    /// Path to a JSON file describing the trip.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) request_path: Option<Utf8PathBuf>,
    /// Base URL for the OSRM server (e.g. "http://localhost:5000").
    #[arg(long = ARG_SEARCH_OSRM_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) osrm_base_url: Option<String>,
    /// Overpass interpreter endpoint.
    #[arg(long = ARG_SEARCH_OVERPASS_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) overpass_url: Option<String>,
    /// Factor turning the request's distance-to-empty into kilometres.
    #[arg(long = ARG_SEARCH_RANGE_SCALE, value_name = "factor")]
    #[serde(default)]
    pub(crate) range_scale: Option<f64>,
    /// Route once per band instead of once per candidate.
    #[arg(
        long = ARG_SEARCH_ETA_PER_BAND,
        value_name = "bool",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    #[serde(default)]
    pub(crate) eta_per_band: Option<bool>,
    /// Candidates evaluated concurrently within a band.
    #[arg(long = ARG_SEARCH_MAX_IN_FLIGHT, value_name = "count")]
    #[serde(default)]
    pub(crate) max_in_flight: Option<usize>,
    /// Per-request timeout for OSRM and Overpass, in seconds.
    #[arg(long = ARG_SEARCH_TIMEOUT_SECS, value_name = "seconds")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
}

impl SearchArgs {
    pub(crate) fn into_config(self) -> Result<SearchCommandConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SearchCommandConfig::try_from(merged)
    }
}

/// Resolved `search` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SearchCommandConfig {
    /// Path to the JSON request file.
    pub(crate) request_path: Utf8PathBuf,
    /// Base URL for the OSRM route service.
    pub(crate) osrm_base_url: String,
    /// Overpass interpreter endpoint.
    pub(crate) overpass_url: String,
    /// Per-request HTTP timeout.
    pub(crate) timeout: Duration,
    /// Validated search tuning.
    pub(crate) search: SearchConfig,
}

impl SearchCommandConfig {
    fn http_config(&self, base_url: &str) -> HttpServiceConfig {
        HttpServiceConfig::new(base_url).with_timeout(self.timeout)
    }
}

impl TryFrom<SearchArgs> for SearchCommandConfig {
    type Error = CliError;

    fn try_from(args: SearchArgs) -> Result<Self, Self::Error> {
        let request_path = args.request_path.ok_or(CliError::MissingArgument {
            field: ARG_SEARCH_REQUEST,
            env: ENV_SEARCH_REQUEST,
        })?;

        let mut search = SearchConfig::default();
        if let Some(scale) = args.range_scale {
            search = search.with_range_budget(RangeBudget::with_scale(scale));
        }
        if args.eta_per_band == Some(true) {
            search = search.with_eta_strategy(EtaStrategy::PerBandCenter);
        }
        if let Some(max_in_flight) = args.max_in_flight {
            search = search.with_max_in_flight(max_in_flight);
        }
        search.validate().map_err(CliError::InvalidSearchConfig)?;
        let timeout_secs = args.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(CliError::InvalidSearchConfig(SearchError::InvalidArgument {
                field: "timeout_secs",
                reason: "must be at least one second".to_owned(),
            }));
        }

        Ok(Self {
            request_path,
            osrm_base_url: args
                .osrm_base_url
                .unwrap_or_else(|| DEFAULT_OSRM_BASE_URL.to_owned()),
            overpass_url: args
                .overpass_url
                .unwrap_or_else(|| DEFAULT_OVERPASS_URL.to_owned()),
            timeout: Duration::from_secs(timeout_secs),
            search,
        })
    }
}

/// Trip described by the request file.
///
/// ```json
/// {
///   "origin": {"x": -1.2577, "y": 51.752},
///   "destination": {"x": -0.1276, "y": 51.5072},
///   "distance_to_empty_km": 42.0,
///   "departure": "2024-05-06T07:30:00"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct TripRequest {
    /// Where the traveller is now.
    pub(crate) origin: Coord<f64>,
    /// Where the trip ends.
    pub(crate) destination: Coord<f64>,
    /// Remaining range reported by the vehicle.
    pub(crate) distance_to_empty_km: f64,
    /// Safety margin held back from the range, in metres.
    #[serde(default = "default_search_offset_m")]
    pub(crate) search_offset_m: f64,
    /// Local departure time.
    pub(crate) departure: NaiveDateTime,
}

const fn default_search_offset_m() -> f64 {
    DEFAULT_SEARCH_OFFSET_M
}

impl TripRequest {
    fn validate(&self, path: &Utf8Path) -> Result<(), CliError> {
        for (field, coord) in [("origin", self.origin), ("destination", self.destination)] {
            if !is_valid_coordinate(coord) {
                return Err(CliError::InvalidSearchRequest {
                    path: path.to_path_buf(),
                    field,
                });
            }
        }
        Ok(())
    }
}

/// Routing and place services used by one search invocation.
pub(crate) struct SearchServices {
    pub(crate) routing: Arc<dyn RoutingService>,
    pub(crate) places: Arc<dyn PlaceSearchService>,
    pub(crate) details: Arc<dyn PlaceDetailService>,
}

/// Builds the services for the current search invocation.
pub(crate) trait SearchServicesBuilder {
    fn build(&self, config: &SearchCommandConfig) -> Result<SearchServices, CliError>;
}

/// Talks to OSRM and Overpass over HTTP.
pub(crate) struct HttpSearchServicesBuilder;

impl SearchServicesBuilder for HttpSearchServicesBuilder {
    fn build(&self, config: &SearchCommandConfig) -> Result<SearchServices, CliError> {
        let routing = OsrmRoutingService::with_config(&config.http_config(&config.osrm_base_url))
            .map_err(|source| CliError::BuildRoutingService {
                base_url: config.osrm_base_url.clone(),
                source,
            })?;
        let overpass = Arc::new(
            OverpassPlaceService::with_config(&config.http_config(&config.overpass_url))
                .map_err(|source| CliError::BuildPlaceService {
                    base_url: config.overpass_url.clone(),
                    source,
                })?,
        );
        Ok(SearchServices {
            routing: Arc::new(routing),
            places: overpass.clone(),
            details: overpass,
        })
    }
}

pub(crate) fn run_search(args: SearchArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_search_with(args, &HttpSearchServicesBuilder, &mut stdout)
}

/// Run a search and print the result.
///
/// The result is written even when it is empty, so callers still see the
/// diagnostics; the empty case then surfaces as
/// [`CliError::NoStationFound`].
pub(crate) fn run_search_with(
    args: SearchArgs,
    builder: &dyn SearchServicesBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let trip = load_search_request(&config.request_path)?;
    trip.validate(&config.request_path)?;
    let services = builder.build(&config)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    let result = runtime.block_on(execute_search(&config, &trip, services))?;
    write_search_result(writer, &result)?;
    result
        .into_found()
        .map(drop)
        .map_err(CliError::NoStationFound)
}

async fn execute_search(
    config: &SearchCommandConfig,
    trip: &TripRequest,
    services: SearchServices,
) -> Result<SearchResult, CliError> {
    let route = services
        .routing
        .route(trip.origin, trip.destination)
        .await
        .map_err(CliError::RouteTrip)?;
    info!(
        "routed trip: {} vertices, {} legs",
        route.vertices().len(),
        route.legs().len()
    );
    let search = StationSearch::with_config(
        services.routing,
        services.places,
        services.details,
        config.search.clone(),
    )
    .map_err(CliError::Search)?;
    let request = SearchRequest {
        route,
        distance_to_empty_km: trip.distance_to_empty_km,
        search_offset_m: trip.search_offset_m,
        origin: trip.origin,
        departure: trip.departure,
    };
    search
        .find_stations_with_progress(&request, &CancellationToken::new(), log_band)
        .await
        .map_err(CliError::Search)
}

fn log_band(outcome: &BandOutcome) {
    match &outcome.search_failure {
        Some(failure) => info!("band {} failed: {failure}", outcome.band.index),
        None => info!(
            "band {}: {} open of {} evaluated, {} excluded",
            outcome.band.index,
            outcome.open_stations().count(),
            outcome.stations.len(),
            outcome.failures.len()
        ),
    }
}

/// Loads a JSON-encoded [`TripRequest`] from disk.
pub(crate) fn load_search_request(path: &Utf8Path) -> Result<TripRequest, CliError> {
    let file = File::open_ambient(path, ambient_authority()).map_err(|source| {
        CliError::OpenSearchRequest {
            path: path.to_path_buf(),
            source,
        }
    })?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|source| CliError::ParseSearchRequest {
        path: path.to_path_buf(),
        source,
    })
}

fn write_search_result(writer: &mut dyn Write, result: &SearchResult) -> Result<(), CliError> {
    let payload =
        serde_json::to_string_pretty(result).map_err(CliError::SerialiseSearchResult)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteSearchOutput)?;
    writer
        .write_all(b"\n")
        .map_err(CliError::WriteSearchOutput)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<SearchCommandConfig, CliError> {
    let merged = SearchArgs::merge_from_layers(layers).map_err(CliError::from)?;
    SearchCommandConfig::try_from(merged)
}
