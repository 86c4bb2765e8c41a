//! Test helpers for writing trip requests into temporary workspaces.

use camino::{Utf8Path, Utf8PathBuf};
use chrono::NaiveDate;
use geo::Coord;
use tempfile::TempDir;

use crate::search::TripRequest;

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path, contents).expect("write test file");
}

pub(super) fn temp_workspace() -> (TempDir, Utf8PathBuf) {
    let tmp = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
    (tmp, root)
}

/// A Monday morning trip north from `(0, 0)` to `destination`.
pub(super) fn trip_to(destination: Coord<f64>, distance_to_empty_km: f64) -> TripRequest {
    TripRequest {
        origin: Coord { x: 0.0, y: 0.0 },
        destination,
        distance_to_empty_km,
        search_offset_m: 5000.0,
        departure: NaiveDate::from_ymd_opt(2024, 5, 6)
            .and_then(|date| date.and_hms_opt(7, 0, 0))
            .expect("valid departure"),
    }
}

pub(super) fn write_trip(path: &Utf8Path, trip: &TripRequest) {
    let payload = serde_json::to_string_pretty(trip).expect("serialize trip");
    write_utf8(path, payload.as_bytes());
}
