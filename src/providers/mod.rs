//! Upstream data providers
//!
//! One module per third-party API, each isolating that provider's response
//! shape behind the normalized report models:
//! - Nominatim (OpenStreetMap) for geocoding
//! - National Weather Service for forecasts (U.S. coverage only)
//! - Open-Elevation for terrain
//! - Overpass API for land-cover and water-source queries
//!
//! The traits are the seams the aggregator is generic over, so tests can
//! inject in-memory fakes instead of live HTTP clients.

pub mod nominatim;
pub mod nws;
pub mod open_elevation;
pub mod overpass;

pub use nominatim::NominatimGeocoder;
pub use nws::NwsWeatherProvider;
pub use open_elevation::OpenElevationProvider;
pub use overpass::OverpassClient;

use crate::error::{ReportError, SkipReason};
use crate::models::{
    Coordinate, FuelReport, GeocodedLocation, TopographyReport, WaterSourceReport, WeatherReport,
};

/// Resolves free-text location queries to coordinates.
///
/// The only fatal provider: without a coordinate there is nothing for the
/// downstream fetchers to do.
pub trait Geocoder {
    async fn resolve(&self, query: &str) -> Result<GeocodedLocation, ReportError>;
}

/// Fetches the weather forecast for a coordinate
pub trait WeatherProvider {
    async fn fetch_weather(&self, coordinate: Coordinate) -> Result<WeatherReport, SkipReason>;
}

/// Fetches elevation and terrain data for a coordinate
pub trait ElevationProvider {
    async fn fetch_elevation(&self, coordinate: Coordinate)
    -> Result<TopographyReport, SkipReason>;
}

/// Fetches vegetation land-cover features around a coordinate
pub trait LandCoverProvider {
    async fn fetch_fuel(
        &self,
        coordinate: Coordinate,
        radius_m: u32,
    ) -> Result<FuelReport, SkipReason>;
}

/// Fetches water bodies and hydrants around a coordinate
pub trait WaterSourceProvider {
    async fn fetch_water_sources(
        &self,
        coordinate: Coordinate,
        radius_m: u32,
        hydrant_radius_m: u32,
    ) -> Result<WaterSourceReport, SkipReason>;
}
