//! Fuel stations from OpenStreetMap.
//!
//! [`OverpassPlaceService`] answers both nearby searches and detail lookups
//! for `amenity=fuel` features. Station identifiers take the OSM `kind/id`
//! form (`node/2870129831`), which the detail lookup relies on.
//!
//! # Example
//!
//! ```no_run
//! use fuelstop_core::{PlaceCategory, PlaceSearchService};
//! use fuelstop_data::places::{DEFAULT_OVERPASS_URL, OverpassPlaceService};
//! use geo::Coord;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let places = OverpassPlaceService::new(DEFAULT_OVERPASS_URL)?;
//! let stations = places
//!     .nearby_search(Coord { x: -1.25, y: 51.75 }, 5000.0, PlaceCategory::FuelStation)
//!     .await?;
//! for station in &stations {
//!     println!("{} {}", station.id, station.name);
//! }
//! # Ok(())
//! # }
//! ```

mod overpass;
mod provider;

pub use provider::{DEFAULT_OVERPASS_URL, OverpassPlaceService, decode_candidates, decode_details};
