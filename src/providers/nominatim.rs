//! Nominatim (OpenStreetMap) geocoding client

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use super::Geocoder;
use crate::config::ProvidersConfig;
use crate::error::ReportError;
use crate::models::{Coordinate, GeocodedLocation};

const SOURCE: &str = "Nominatim (OpenStreetMap)";

/// Geocoding client for the Nominatim search API
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
}

/// One place from the Nominatim search response.
/// Nominatim serializes coordinates as strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    display_name: String,
    lat: String,
    lon: String,
}

impl NominatimGeocoder {
    /// Create a new geocoder against the configured endpoint
    pub fn new(client: Client, config: &ProvidersConfig) -> Self {
        Self {
            client,
            base_url: config.geocoder_base_url.clone(),
        }
    }

    async fn search(&self, query: &str) -> Result<Vec<NominatimPlace>, ReportError> {
        let url = format!(
            "{}/search?q={}&format=json&limit=1",
            self.base_url,
            urlencoding::encode(query)
        );
        debug!("Nominatim request URL: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ReportError::upstream(format!("geocoding request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ReportError::upstream(format!(
                "geocoding request returned HTTP {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ReportError::upstream(format!("invalid geocoding response: {e}")))
    }
}

impl Geocoder for NominatimGeocoder {
    #[instrument(skip(self))]
    async fn resolve(&self, query: &str) -> Result<GeocodedLocation, ReportError> {
        let places = self.search(query).await?;

        let Some(place) = places.into_iter().next() else {
            return Err(ReportError::not_found(query));
        };

        let latitude: f64 = place
            .lat
            .parse()
            .map_err(|_| ReportError::upstream(format!("unparseable latitude: {}", place.lat)))?;
        let longitude: f64 = place
            .lon
            .parse()
            .map_err(|_| ReportError::upstream(format!("unparseable longitude: {}", place.lon)))?;

        info!(
            "Resolved '{}' to {} ({:.4}, {:.4})",
            query, place.display_name, latitude, longitude
        );

        Ok(GeocodedLocation {
            source: SOURCE.to_string(),
            name: place.display_name,
            coordinate: Coordinate::new(latitude, longitude),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_deserialization() {
        let json = r#"[{
            "display_name": "Missoula, Missoula County, Montana, United States",
            "lat": "46.8701049",
            "lon": "-113.995267"
        }]"#;
        let places: Vec<NominatimPlace> = serde_json::from_str(json).unwrap();
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].lat, "46.8701049");
        assert!(places[0].display_name.starts_with("Missoula"));
    }

    #[test]
    fn test_empty_response_deserialization() {
        let places: Vec<NominatimPlace> = serde_json::from_str("[]").unwrap();
        assert!(places.is_empty());
    }
}
