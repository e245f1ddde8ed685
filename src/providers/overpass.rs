//! Overpass API (OpenStreetMap) spatial query client
//!
//! One client serves both spatial sections: vegetation land cover for the
//! fuel report and hydrological features plus fire hydrants for the water
//! report. Queries are radius-constrained `around:` filters; the data is
//! community-sourced, so an empty result is a perfectly normal outcome.

use std::collections::{BTreeMap, HashMap};

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::{LandCoverProvider, WaterSourceProvider};
use crate::config::ProvidersConfig;
use crate::error::SkipReason;
use crate::models::{Coordinate, FuelReport, WaterSourceReport};

const SOURCE: &str = "OpenStreetMap via Overpass API";

/// Vegetation tags queried for the fuel report
const FUEL_SELECTORS: [(&str, &str); 6] = [
    ("natural", "wood"),
    ("landuse", "forest"),
    ("landuse", "grass"),
    ("landuse", "meadow"),
    ("natural", "grassland"),
    ("natural", "scrub"),
];

/// Spatial query client for the Overpass interpreter
#[derive(Debug, Clone)]
pub struct OverpassClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    tags: HashMap<String, String>,
}

impl OverpassClient {
    /// Create a new client against the configured interpreter endpoint
    pub fn new(client: Client, config: &ProvidersConfig) -> Self {
        Self {
            client,
            base_url: config.overpass_base_url.clone(),
        }
    }

    async fn run_query(&self, query: &str) -> anyhow::Result<Vec<OverpassElement>> {
        debug!("Overpass query: {}", query);
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("data", query)])
            .send()
            .await?
            .error_for_status()?;
        let parsed: OverpassResponse = response.json().await?;
        Ok(parsed.elements)
    }
}

impl LandCoverProvider for OverpassClient {
    #[instrument(skip(self), fields(lat = coordinate.latitude, lon = coordinate.longitude))]
    async fn fetch_fuel(
        &self,
        coordinate: Coordinate,
        radius_m: u32,
    ) -> Result<FuelReport, SkipReason> {
        let query = fuel_query(coordinate, radius_m);
        let elements = self.run_query(&query).await.map_err(|e| {
            warn!("Overpass land-cover query failed: {e:#}");
            SkipReason::UpstreamUnavailable
        })?;

        Ok(categorize_fuel(&elements))
    }
}

impl WaterSourceProvider for OverpassClient {
    #[instrument(skip(self), fields(lat = coordinate.latitude, lon = coordinate.longitude))]
    async fn fetch_water_sources(
        &self,
        coordinate: Coordinate,
        radius_m: u32,
        hydrant_radius_m: u32,
    ) -> Result<WaterSourceReport, SkipReason> {
        let query = water_query(coordinate, radius_m, hydrant_radius_m);
        let elements = self.run_query(&query).await.map_err(|e| {
            warn!("Overpass water-source query failed: {e:#}");
            SkipReason::UpstreamUnavailable
        })?;

        Ok(categorize_water(&elements))
    }
}

fn fuel_query(center: Coordinate, radius_m: u32) -> String {
    let mut query = String::from("[out:json];(");
    for (key, value) in FUEL_SELECTORS {
        query.push_str(&format!(
            "way[\"{key}\"=\"{value}\"](around:{radius_m},{lat},{lon});",
            lat = center.latitude,
            lon = center.longitude,
        ));
    }
    query.push_str(");out tags;");
    query
}

fn water_query(center: Coordinate, radius_m: u32, hydrant_radius_m: u32) -> String {
    format!(
        concat!(
            "[out:json];(",
            "way[\"natural\"=\"water\"](around:{r},{lat},{lon});",
            "way[\"waterway\"](around:{r},{lat},{lon});",
            "node[\"emergency\"=\"fire_hydrant\"](around:{hr},{lat},{lon});",
            "way[\"landuse\"=\"reservoir\"](around:{r},{lat},{lon});",
            ");out tags;"
        ),
        r = radius_m,
        hr = hydrant_radius_m,
        lat = center.latitude,
        lon = center.longitude,
    )
}

/// Count land-cover ways per fuel category and pick the dominant one.
/// Ties go to the alphabetically first category, keeping reports stable
/// across identical responses.
fn categorize_fuel(elements: &[OverpassElement]) -> FuelReport {
    let mut fuel_types: BTreeMap<String, u32> = BTreeMap::new();
    let mut total_areas = 0;

    for element in elements {
        if element.kind != "way" {
            continue;
        }
        total_areas += 1;
        let category = element
            .tags
            .get("natural")
            .or_else(|| element.tags.get("landuse"));
        if let Some(category) = category {
            *fuel_types.entry(category.clone()).or_insert(0) += 1;
        }
    }

    let mut dominant_fuel: Option<(&String, u32)> = None;
    for (category, &count) in &fuel_types {
        if dominant_fuel.is_none_or(|(_, best)| count > best) {
            dominant_fuel = Some((category, count));
        }
    }
    let dominant_fuel = dominant_fuel.map(|(category, _)| category.clone());

    FuelReport {
        source: SOURCE.to_string(),
        fuel_types,
        total_areas,
        dominant_fuel,
    }
}

/// Count water bodies per category, hydrants separately
fn categorize_water(elements: &[OverpassElement]) -> WaterSourceReport {
    let mut water_bodies: BTreeMap<String, u32> = BTreeMap::new();
    let mut fire_hydrants = 0;
    let mut total_sources = 0;

    for element in elements {
        if element.tags.get("emergency").map(String::as_str) == Some("fire_hydrant") {
            fire_hydrants += 1;
            total_sources += 1;
            continue;
        }

        let category = element
            .tags
            .get("natural")
            .or_else(|| element.tags.get("waterway"))
            .or_else(|| element.tags.get("landuse"));
        if let Some(category) = category {
            *water_bodies.entry(category.clone()).or_insert(0) += 1;
            total_sources += 1;
        }
    }

    WaterSourceReport {
        source: SOURCE.to_string(),
        water_bodies,
        fire_hydrants,
        total_sources,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn way(tags: &[(&str, &str)]) -> OverpassElement {
        OverpassElement {
            kind: "way".to_string(),
            tags: tags
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    fn node(tags: &[(&str, &str)]) -> OverpassElement {
        OverpassElement {
            kind: "node".to_string(),
            tags: tags
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_fuel_query_contains_all_selectors() {
        let query = fuel_query(Coordinate::new(46.87, -113.99), 5000);
        assert!(query.starts_with("[out:json];("));
        assert!(query.contains("way[\"natural\"=\"wood\"](around:5000,46.87,-113.99);"));
        assert!(query.contains("way[\"landuse\"=\"meadow\"]"));
        assert!(query.contains("way[\"natural\"=\"scrub\"]"));
        assert!(query.ends_with(");out tags;"));
    }

    #[test]
    fn test_water_query_uses_separate_hydrant_radius() {
        let query = water_query(Coordinate::new(46.87, -113.99), 10000, 5000);
        assert!(query.contains("way[\"natural\"=\"water\"](around:10000,46.87,-113.99);"));
        assert!(query.contains("node[\"emergency\"=\"fire_hydrant\"](around:5000,46.87,-113.99);"));
        assert!(query.contains("way[\"landuse\"=\"reservoir\"](around:10000,46.87,-113.99);"));
    }

    #[test]
    fn test_categorize_fuel() {
        let elements = vec![
            way(&[("natural", "wood")]),
            way(&[("natural", "wood")]),
            way(&[("landuse", "grass")]),
            node(&[("natural", "tree")]),
        ];
        let report = categorize_fuel(&elements);
        assert_eq!(report.total_areas, 3);
        assert_eq!(report.fuel_types.get("wood"), Some(&2));
        assert_eq!(report.fuel_types.get("grass"), Some(&1));
        assert_eq!(report.dominant_fuel.as_deref(), Some("wood"));
    }

    #[test]
    fn test_categorize_fuel_empty() {
        let report = categorize_fuel(&[]);
        assert!(report.is_empty());
        assert!(report.fuel_types.is_empty());
        assert_eq!(report.dominant_fuel, None);
    }

    #[test]
    fn test_dominant_fuel_tie_is_deterministic() {
        let elements = vec![way(&[("natural", "wood")]), way(&[("landuse", "grass")])];
        let report = categorize_fuel(&elements);
        assert_eq!(report.dominant_fuel.as_deref(), Some("grass"));
    }

    #[test]
    fn test_categorize_water() {
        let elements = vec![
            way(&[("natural", "water")]),
            way(&[("waterway", "stream")]),
            way(&[("waterway", "stream")]),
            way(&[("landuse", "reservoir")]),
            node(&[("emergency", "fire_hydrant")]),
            node(&[("emergency", "fire_hydrant")]),
        ];
        let report = categorize_water(&elements);
        assert_eq!(report.fire_hydrants, 2);
        assert_eq!(report.water_bodies.get("water"), Some(&1));
        assert_eq!(report.water_bodies.get("stream"), Some(&2));
        assert_eq!(report.water_bodies.get("reservoir"), Some(&1));
        assert_eq!(report.total_sources, 6);
    }

    #[test]
    fn test_overpass_response_deserialization() {
        let json = r#"{
            "version": 0.6,
            "elements": [
                {"type": "way", "id": 42, "tags": {"natural": "wood"}},
                {"type": "node", "id": 7, "lat": 46.8, "lon": -113.9}
            ]
        }"#;
        let response: OverpassResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.elements.len(), 2);
        assert_eq!(
            response.elements[0].tags.get("natural").map(String::as_str),
            Some("wood")
        );
        assert!(response.elements[1].tags.is_empty());
    }
}
