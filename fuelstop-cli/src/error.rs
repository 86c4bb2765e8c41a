//! Error types emitted by the `fuelstop` CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use fuelstop_core::{RoutingFailure, SearchError};
use fuelstop_data::ProviderBuildError;
use thiserror::Error;

/// Errors emitted by the `fuelstop` CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Flag name of the missing option.
        field: &'static str,
        /// Environment variable that can supply it instead.
        env: &'static str,
    },
    /// The merged search tuning is unusable.
    #[error("invalid search configuration: {0}")]
    InvalidSearchConfig(#[source] SearchError),
    /// Opening the search request file failed.
    #[error("failed to open search request at {path:?}: {source}")]
    OpenSearchRequest {
        /// Request file path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// Search request JSON could not be decoded.
    #[error("failed to parse search request JSON at {path:?}: {source}")]
    ParseSearchRequest {
        /// Request file path.
        path: Utf8PathBuf,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },
    /// A request coordinate lies outside WGS84 bounds.
    #[error("search request in {path:?} has an invalid {field} coordinate")]
    InvalidSearchRequest {
        /// Request file path.
        path: Utf8PathBuf,
        /// Which coordinate was rejected.
        field: &'static str,
    },
    /// Constructing the OSRM client failed.
    #[error("failed to build routing service for {base_url:?}: {source}")]
    BuildRoutingService {
        /// Configured OSRM base URL.
        base_url: String,
        /// Underlying build error.
        #[source]
        source: ProviderBuildError,
    },
    /// Constructing the Overpass client failed.
    #[error("failed to build place service for {base_url:?}: {source}")]
    BuildPlaceService {
        /// Configured Overpass interpreter URL.
        base_url: String,
        /// Underlying build error.
        #[source]
        source: ProviderBuildError,
    },
    /// The async runtime could not be started.
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// Routing the trip from origin to destination failed.
    #[error("failed to route the trip: {0}")]
    RouteTrip(#[source] RoutingFailure),
    /// The station search rejected its input.
    #[error("station search failed: {0}")]
    Search(#[source] SearchError),
    /// The search finished without an open station.
    #[error("{0}")]
    NoStationFound(#[source] SearchError),
    /// Serialising the search result failed.
    #[error("failed to serialise search result: {0}")]
    SerialiseSearchResult(#[source] serde_json::Error),
    /// Writing the search output failed.
    #[error("failed to write search output: {0}")]
    WriteSearchOutput(#[source] std::io::Error),
}
