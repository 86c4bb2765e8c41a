//! Focused unit tests covering search CLI configuration and request parsing.

use super::helpers::{temp_workspace, trip_to, write_trip, write_utf8};
use super::*;
use crate::search::{
    SearchCommandConfig, TripRequest, config_from_layers_for_test, load_search_request,
};
use camino::Utf8PathBuf;
use fuelstop_core::{EtaStrategy, LEGACY_RANGE_SCALE, SearchError};
use geo::Coord;
use rstest::rstest;
use std::time::Duration;

fn args_with_request(request_path: &str) -> SearchArgs {
    SearchArgs {
        request_path: Some(Utf8PathBuf::from(request_path)),
        ..SearchArgs::default()
    }
}

#[rstest]
fn converting_search_without_request_errors() {
    let err = SearchCommandConfig::try_from(SearchArgs::default())
        .expect_err("missing request should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_SEARCH_REQUEST);
            assert_eq!(env, ENV_SEARCH_REQUEST);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn search_config_fills_service_defaults() {
    let config = SearchCommandConfig::try_from(args_with_request("trip.json"))
        .expect("config should build");

    assert_eq!(config.request_path, Utf8PathBuf::from("trip.json"));
    assert_eq!(config.osrm_base_url, "http://localhost:5000");
    assert_eq!(config.overpass_url, "https://overpass-api.de/api/interpreter");
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert_eq!(config.search, fuelstop_core::SearchConfig::default());
}

#[rstest]
fn search_config_applies_tuning_flags() {
    let args = SearchArgs {
        range_scale: Some(LEGACY_RANGE_SCALE),
        eta_per_band: Some(true),
        max_in_flight: Some(2),
        timeout_secs: Some(5),
        ..args_with_request("trip.json")
    };

    let config = SearchCommandConfig::try_from(args).expect("config should build");

    assert_eq!(config.search.range_budget.range_scale, LEGACY_RANGE_SCALE);
    assert_eq!(config.search.eta_strategy, EtaStrategy::PerBandCenter);
    assert_eq!(config.search.max_in_flight, 2);
    assert_eq!(config.timeout, Duration::from_secs(5));
}

#[rstest]
#[case::zero_scale(SearchArgs { range_scale: Some(0.0), ..args_with_request("trip.json") }, "range_scale")]
#[case::negative_scale(SearchArgs { range_scale: Some(-2.0), ..args_with_request("trip.json") }, "range_scale")]
#[case::no_concurrency(SearchArgs { max_in_flight: Some(0), ..args_with_request("trip.json") }, "max_in_flight")]
#[case::zero_timeout(SearchArgs { timeout_secs: Some(0), ..args_with_request("trip.json") }, "timeout_secs")]
fn search_config_rejects_unusable_tuning(#[case] args: SearchArgs, #[case] expected: &str) {
    let err = SearchCommandConfig::try_from(args).expect_err("tuning should be rejected");
    match err {
        CliError::InvalidSearchConfig(SearchError::InvalidArgument { field, .. }) => {
            assert_eq!(field, expected);
        }
        other => panic!("expected InvalidSearchConfig, found {other:?}"),
    }
}

#[rstest]
fn load_search_request_decodes_json() {
    let (_tmp, root) = temp_workspace();
    let request_path = root.join("trip.json");
    let trip = trip_to(Coord { x: 0.0, y: 0.4 }, 35.0);
    write_trip(&request_path, &trip);

    let decoded = load_search_request(&request_path).expect("request should decode");
    assert_eq!(decoded, trip);
}

#[rstest]
fn load_search_request_defaults_the_offset() {
    let (_tmp, root) = temp_workspace();
    let request_path = root.join("trip.json");
    write_utf8(
        &request_path,
        br#"{
            "origin": {"x": -1.2577, "y": 51.752},
            "destination": {"x": -0.1276, "y": 51.5072},
            "distance_to_empty_km": 42.0,
            "departure": "2024-05-06T07:30:00"
        }"#,
    );

    let decoded: TripRequest = load_search_request(&request_path).expect("request should decode");
    assert_eq!(decoded.search_offset_m, 5000.0);
    assert_eq!(decoded.destination, Coord { x: -0.1276, y: 51.5072 });
}

#[rstest]
fn load_search_request_rejects_invalid_json() {
    let (_tmp, root) = temp_workspace();
    let request_path = root.join("trip.json");
    write_utf8(&request_path, b"{ not valid json");

    let err = load_search_request(&request_path).expect_err("invalid json should error");
    match err {
        CliError::ParseSearchRequest { path, .. } => assert_eq!(path, request_path),
        other => panic!("unexpected error {other:?}"),
    }
}

#[rstest]
fn load_search_request_io_error_returns_open_error() {
    let (_tmp, root) = temp_workspace();
    let request_path = root.join("absent.json");

    let err = load_search_request(&request_path).expect_err("missing request should error");
    match err {
        CliError::OpenSearchRequest { path, .. } => assert_eq!(path, request_path),
        other => panic!("expected OpenSearchRequest, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "range_scale": "ten" }));

    let err = config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    match err {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_honours_precedence() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "osrm_base_url": "http://from-file:5000",
            "overpass_url": "http://from-file/api/interpreter",
            "range_scale": 2.0,
        }),
        None,
    );
    composer.push_environment(json!({
        "request_path": "from-env.json",
        "range_scale": 10.0,
    }));
    composer.push_cli(json!({
        "overpass_url": "http://from-cli/api/interpreter",
    }));

    let config =
        config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(config.request_path, Utf8PathBuf::from("from-env.json"));
    assert_eq!(config.osrm_base_url, "http://from-file:5000");
    assert_eq!(config.overpass_url, "http://from-cli/api/interpreter");
    assert_eq!(config.search.range_budget.range_scale, 10.0);
}

#[rstest]
fn eta_flag_accepts_a_bare_switch() {
    let cli = Cli::try_parse_from(["fuelstop", "search", "trip.json", "--eta-per-band"])
        .expect("arguments should parse");
    let Command::Search(args) = cli.command;
    assert_eq!(args.eta_per_band, Some(true));
    assert_eq!(args.request_path, Some(Utf8PathBuf::from("trip.json")));
}

#[rstest]
fn serialisation_failures_name_the_search_result() {
    let source = serde_json::from_str::<u8>("not a number").expect_err("should fail to decode");
    let err = CliError::SerialiseSearchResult(source);
    assert!(
        err.to_string()
            .starts_with("failed to serialise search result: "),
        "unexpected message {err}"
    );
}
