//! Open-Elevation terrain client
//!
//! One batched lookup covers the target coordinate plus four sample points
//! roughly a kilometer away; the spread of the samples drives the terrain
//! classification. The dataset is static SRTM, so responses are trusted
//! without any freshness handling.

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::ElevationProvider;
use crate::config::ProvidersConfig;
use crate::error::SkipReason;
use crate::models::{Coordinate, TerrainClass, TopographyReport};

const SOURCE: &str = "Open-Elevation API (SRTM)";

/// Offset in degrees for the relief sample points (~1 km)
const SAMPLE_OFFSET_DEG: f64 = 0.01;

/// Elevation client for the Open-Elevation lookup API
#[derive(Debug, Clone)]
pub struct OpenElevationProvider {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    results: Vec<ElevationResult>,
}

#[derive(Debug, Deserialize)]
struct ElevationResult {
    elevation: f64,
}

impl OpenElevationProvider {
    /// Create a new elevation client against the configured endpoint
    pub fn new(client: Client, config: &ProvidersConfig) -> Self {
        Self {
            client,
            base_url: config.elevation_base_url.clone(),
        }
    }

    async fn lookup(&self, points: &[Coordinate]) -> anyhow::Result<Vec<f64>> {
        let locations = points
            .iter()
            .map(|p| format!("{},{}", p.latitude, p.longitude))
            .collect::<Vec<_>>()
            .join("|");
        let url = format!("{}/api/v1/lookup?locations={}", self.base_url, locations);
        debug!("Open-Elevation request URL: {}", url);

        let response = self.client.get(&url).send().await?.error_for_status()?;
        let lookup: LookupResponse = response.json().await?;

        if lookup.results.len() != points.len() {
            anyhow::bail!(
                "expected {} elevation results, got {}",
                points.len(),
                lookup.results.len()
            );
        }

        Ok(lookup.results.into_iter().map(|r| r.elevation).collect())
    }
}

impl ElevationProvider for OpenElevationProvider {
    #[instrument(skip(self), fields(lat = coordinate.latitude, lon = coordinate.longitude))]
    async fn fetch_elevation(
        &self,
        coordinate: Coordinate,
    ) -> Result<TopographyReport, SkipReason> {
        let points = sample_points(coordinate);

        let elevations = self.lookup(&points).await.map_err(|e| {
            warn!("Open-Elevation lookup failed: {e:#}");
            SkipReason::UpstreamUnavailable
        })?;

        let elevation = elevations[0];
        let neighbors = &elevations[1..];
        let range = relief_range(neighbors);

        Ok(TopographyReport {
            source: SOURCE.to_string(),
            elevation_meters: elevation,
            elevation_feet: TopographyReport::meters_to_feet(elevation),
            elevation_range_nearby: (range * 10.0).round() / 10.0,
            terrain: TerrainClass::from_relief(range),
        })
    }
}

/// The target coordinate followed by four offset samples (N, S, E, W)
fn sample_points(center: Coordinate) -> Vec<Coordinate> {
    vec![
        center,
        Coordinate::new(center.latitude + SAMPLE_OFFSET_DEG, center.longitude),
        Coordinate::new(center.latitude - SAMPLE_OFFSET_DEG, center.longitude),
        Coordinate::new(center.latitude, center.longitude + SAMPLE_OFFSET_DEG),
        Coordinate::new(center.latitude, center.longitude - SAMPLE_OFFSET_DEG),
    ]
}

fn relief_range(elevations: &[f64]) -> f64 {
    let max = elevations.iter().copied().fold(f64::MIN, f64::max);
    let min = elevations.iter().copied().fold(f64::MAX, f64::min);
    max - min
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_points_center_first() {
        let center = Coordinate::new(46.87, -113.99);
        let points = sample_points(center);
        assert_eq!(points.len(), 5);
        assert_eq!(points[0], center);
        assert_eq!(points[1].latitude, center.latitude + SAMPLE_OFFSET_DEG);
        assert_eq!(points[2].latitude, center.latitude - SAMPLE_OFFSET_DEG);
        assert_eq!(points[3].longitude, center.longitude + SAMPLE_OFFSET_DEG);
        assert_eq!(points[4].longitude, center.longitude - SAMPLE_OFFSET_DEG);
        assert_eq!(points[1].longitude, center.longitude);
        assert_eq!(points[3].latitude, center.latitude);
    }

    #[test]
    fn test_relief_range() {
        assert_eq!(relief_range(&[980.0, 1010.0, 995.0, 1005.0]), 30.0);
        assert_eq!(relief_range(&[100.0, 100.0, 100.0, 100.0]), 0.0);
    }

    #[test]
    fn test_lookup_response_deserialization() {
        let json = r#"{"results": [
            {"latitude": 46.87, "longitude": -113.99, "elevation": 978.0},
            {"latitude": 46.88, "longitude": -113.99, "elevation": 1042.0}
        ]}"#;
        let lookup: LookupResponse = serde_json::from_str(json).unwrap();
        assert_eq!(lookup.results.len(), 2);
        assert_eq!(lookup.results[0].elevation, 978.0);
    }
}
