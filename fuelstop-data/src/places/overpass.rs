//! Overpass API response types.
//!
//! Queries are issued with `[out:json]` and `out center tags`, so ways and
//! relations carry a `center` instead of their full geometry.
//!
//! See: <https://wiki.openstreetmap.org/wiki/Overpass_API/Output_Formats#JSON>

use std::collections::HashMap;

use geo::Coord;
use serde::Deserialize;

/// Overpass JSON response.
#[derive(Debug, Deserialize)]
pub struct OverpassResponse {
    /// Matched OSM elements.
    #[serde(default)]
    pub elements: Vec<Element>,
    /// Server remark, set when the query hit a runtime error or timeout.
    pub remark: Option<String>,
}

impl OverpassResponse {
    /// The remark when it reports a failed query.
    ///
    /// Overpass answers `200 OK` even when a query times out part-way, and
    /// flags the truncation in `remark`.
    #[must_use]
    pub fn error_remark(&self) -> Option<&str> {
        self.remark
            .as_deref()
            .filter(|remark| remark.contains("error"))
    }
}

/// A node, way or relation.
#[derive(Debug, Deserialize)]
pub struct Element {
    /// `node`, `way` or `relation`.
    #[serde(rename = "type")]
    pub kind: String,
    /// OSM identifier, unique per kind.
    pub id: u64,
    /// Latitude, present on nodes.
    pub lat: Option<f64>,
    /// Longitude, present on nodes.
    pub lon: Option<f64>,
    /// Centroid, present on ways and relations.
    pub center: Option<Center>,
    /// OSM tags.
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

/// Centroid of a way or relation.
#[derive(Debug, Deserialize)]
pub struct Center {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lon: f64,
}

impl Element {
    /// Station identifier in `kind/id` form, e.g. `node/2870129831`.
    #[must_use]
    pub fn station_key(&self) -> String {
        format!("{}/{}", self.kind, self.id)
    }

    /// Node position or way/relation centre.
    #[must_use]
    pub fn location(&self) -> Option<Coord<f64>> {
        match (self.lat, self.lon, &self.center) {
            (Some(y), Some(x), _) => Some(Coord { x, y }),
            (_, _, Some(center)) => Some(Coord {
                x: center.lon,
                y: center.lat,
            }),
            _ => None,
        }
    }

    /// Display name: `name`, then `brand`, then `operator`.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        ["name", "brand", "operator"]
            .iter()
            .find_map(|key| self.tag(key))
    }

    /// A non-empty tag value.
    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .get(key)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }
}
