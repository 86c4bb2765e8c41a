//! Command-line interface for planning a fuel stop before the tank runs dry.
//!
//! `fuelstop search request.json` routes the trip described in the request
//! file through OSRM, searches Overpass backwards from the predicted empty
//! point and prints the open stations as JSON. Service endpoints and search
//! tuning layer from configuration files, `FUELSTOP_*` environment variables
//! and flags.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod search;

pub use error::CliError;

use search::{SearchArgs, run_search};

pub(crate) const ARG_SEARCH_REQUEST: &str = "request";
pub(crate) const ARG_SEARCH_OSRM_BASE_URL: &str = "osrm-base-url";
pub(crate) const ARG_SEARCH_OVERPASS_URL: &str = "overpass-url";
pub(crate) const ARG_SEARCH_RANGE_SCALE: &str = "range-scale";
pub(crate) const ARG_SEARCH_ETA_PER_BAND: &str = "eta-per-band";
pub(crate) const ARG_SEARCH_MAX_IN_FLIGHT: &str = "max-in-flight";
pub(crate) const ARG_SEARCH_TIMEOUT_SECS: &str = "timeout-secs";
pub(crate) const ENV_SEARCH_REQUEST: &str = "FUELSTOP_CMDS_SEARCH_REQUEST_PATH";

/// Run the CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when argument parsing, configuration loading, the
/// search itself or writing the result fails. A search that finishes without
/// an open station is reported as [`CliError::NoStationFound`] after the
/// result has been printed.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    init_logging(cli.verbose);
    match cli.command {
        Command::Search(args) => run_search(args),
    }
}

/// Install the process logger; `RUST_LOG` overrides the default level.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    // A logger installed by an embedding process stays in place.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init()
        .ok();
}

#[derive(Debug, Parser)]
#[command(
    name = "fuelstop",
    about = "Find an open fuel station before the tank runs dry",
    version
)]
struct Cli {
    /// Log request and band progress to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search backwards from the predicted empty point for open stations.
    Search(SearchArgs),
}

#[cfg(test)]
mod tests;
