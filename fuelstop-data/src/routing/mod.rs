//! Driving routes from an OSRM server.
//!
//! [`OsrmRoutingService`] implements [`fuelstop_core::RoutingService`] with
//! the OSRM Route API. Responses carry the full GeoJSON geometry so the
//! search can walk the route vertex by vertex.
//!
//! # Example
//!
//! ```no_run
//! use fuelstop_core::RoutingService;
//! use fuelstop_data::routing::OsrmRoutingService;
//! use geo::Coord;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let routing = OsrmRoutingService::new("http://localhost:5000")?;
//! let route = routing
//!     .route(Coord { x: -0.12, y: 51.50 }, Coord { x: -1.25, y: 51.75 })
//!     .await?;
//! println!("{:.1} km", route.length_km());
//! # Ok(())
//! # }
//! ```

mod osrm;
mod provider;

pub use provider::{DEFAULT_OSRM_BASE_URL, OsrmRoutingService, decode_route_response};
