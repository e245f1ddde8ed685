//! Normalized report models shared by all fetchers and the aggregator
//!
//! Every upstream provider parses its own ad-hoc response shape into one of
//! these types, so the aggregation and presentation layers never see
//! provider-specific JSON.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SkipReason;

/// A latitude/longitude pair in floating-point degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// A resolved location: the geocoder's display name plus its coordinate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodedLocation {
    /// Data source attribution
    pub source: String,
    /// Full display name returned by the geocoder
    pub name: String,
    #[serde(flatten)]
    pub coordinate: Coordinate,
}

/// Outcome of one report section.
///
/// A section is either available (possibly with an empty collection inside)
/// or skipped with a machine-readable reason. Serialized with an explicit
/// `status` tag so missing data is always marked, never silently absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Section<T> {
    Available {
        #[serde(flatten)]
        data: T,
    },
    Skipped {
        reason: SkipReason,
    },
}

impl<T> Section<T> {
    #[must_use]
    pub fn available(data: T) -> Self {
        Self::Available { data }
    }

    #[must_use]
    pub fn skipped(reason: SkipReason) -> Self {
        Self::Skipped { reason }
    }

    /// Collapse a fetcher outcome into a section
    #[must_use]
    pub fn from_fetch(result: Result<T, SkipReason>) -> Self {
        match result {
            Ok(data) => Self::Available { data },
            Err(reason) => Self::Skipped { reason },
        }
    }

    /// The section data, if available
    #[must_use]
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Available { data } => Some(data),
            Self::Skipped { .. } => None,
        }
    }

    /// The skip reason, if the section was skipped
    #[must_use]
    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            Self::Available { .. } => None,
            Self::Skipped { reason } => Some(*reason),
        }
    }
}

/// One normalized NWS forecast period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPeriod {
    /// Normalized period name (Today, Tonight, Tomorrow, Tomorrow Night)
    pub name: String,
    /// Period name as the provider sent it (e.g. "Washington's Birthday")
    pub original_name: String,
    /// Temperature in the provider's unit
    pub temperature: i32,
    /// Temperature unit ("F")
    pub temperature_unit: String,
    /// Wind speed as reported, e.g. "5 to 10 mph"
    pub wind_speed: String,
    /// Cardinal wind direction, e.g. "NW"
    pub wind_direction: String,
    /// Relative humidity percentage, if the provider reported one
    pub humidity: Option<i32>,
    /// One-line forecast text
    pub short_forecast: String,
    /// Full forecast text
    pub detailed_forecast: String,
}

/// Weather section: the next few forecast periods for the coordinate.
/// Only meaningful inside the provider's coverage region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub source: String,
    pub forecast: Vec<ForecastPeriod>,
}

/// Terrain classification derived from nearby elevation relief
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainClass {
    Flat,
    GentlyRolling,
    ModeratelyHilly,
    Mountainous,
}

impl TerrainClass {
    /// Classify terrain from the elevation range of points ~1 km around the
    /// center (thresholds in meters: 10 flat, 50 rolling, 100 hilly)
    #[must_use]
    pub fn from_relief(elevation_range_m: f64) -> Self {
        if elevation_range_m < 10.0 {
            Self::Flat
        } else if elevation_range_m < 50.0 {
            Self::GentlyRolling
        } else if elevation_range_m < 100.0 {
            Self::ModeratelyHilly
        } else {
            Self::Mountainous
        }
    }

    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Flat => "Flat terrain",
            Self::GentlyRolling => "Gently rolling terrain",
            Self::ModeratelyHilly => "Moderately hilly terrain",
            Self::Mountainous => "Steep/mountainous terrain",
        }
    }
}

impl std::fmt::Display for TerrainClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// Topography section: elevation at the coordinate plus relief context.
/// Backed by a static dataset, so a successful response never goes stale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopographyReport {
    pub source: String,
    /// Elevation at the coordinate in meters
    pub elevation_meters: f64,
    /// Elevation at the coordinate in feet
    pub elevation_feet: f64,
    /// Max minus min elevation of sample points ~1 km away, in meters
    pub elevation_range_nearby: f64,
    pub terrain: TerrainClass,
}

impl TopographyReport {
    #[must_use]
    pub fn meters_to_feet(meters: f64) -> f64 {
        (meters * 3.28084 * 10.0).round() / 10.0
    }
}

/// Fuel section: counts of vegetation land-cover features near the
/// coordinate, keyed by OSM category (wood, forest, grass, meadow,
/// grassland, scrub). Community-sourced, accuracy not guaranteed.
///
/// An empty map is a valid outcome and means "no mapped features within the
/// radius", which is distinct from a skipped section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelReport {
    pub source: String,
    /// Feature count per fuel category
    pub fuel_types: BTreeMap<String, u32>,
    /// Total land-cover areas found within the search radius
    pub total_areas: u32,
    /// Most frequent fuel category, if any features were found
    pub dominant_fuel: Option<String>,
}

impl FuelReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_areas == 0
    }
}

/// Water section: water bodies and fire hydrants near the coordinate,
/// keyed by OSM category (water, stream, river, reservoir, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterSourceReport {
    pub source: String,
    /// Feature count per water body category
    pub water_bodies: BTreeMap<String, u32>,
    /// Fire hydrants within the (tighter) hydrant radius
    pub fire_hydrants: u32,
    /// Total water-related features found
    pub total_sources: u32,
}

impl WaterSourceReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_sources == 0
    }
}

/// Basic burn-condition assessment derived from the first forecast period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BurnAssessment {
    Assessed {
        concerns: Vec<String>,
        recommendation: String,
    },
    Unavailable {
        message: String,
    },
}

/// The aggregate burn-planning report.
///
/// Constructed only after a successful geocode; every data section is
/// independently skippable so a single provider outage never hides the
/// others. Stateless and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurnPlanningReport {
    pub generated_at: DateTime<Utc>,
    pub location: GeocodedLocation,
    pub weather: Section<WeatherReport>,
    pub topography: Section<TopographyReport>,
    pub fuel_sources: Section<FuelReport>,
    pub water_sources: Section<WaterSourceReport>,
    pub burn_assessment: BurnAssessment,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, TerrainClass::Flat)]
    #[case(9.9, TerrainClass::Flat)]
    #[case(10.0, TerrainClass::GentlyRolling)]
    #[case(49.9, TerrainClass::GentlyRolling)]
    #[case(50.0, TerrainClass::ModeratelyHilly)]
    #[case(99.9, TerrainClass::ModeratelyHilly)]
    #[case(100.0, TerrainClass::Mountainous)]
    #[case(850.0, TerrainClass::Mountainous)]
    fn test_terrain_classification(#[case] relief: f64, #[case] expected: TerrainClass) {
        assert_eq!(TerrainClass::from_relief(relief), expected);
    }

    #[test]
    fn test_meters_to_feet() {
        assert_eq!(TopographyReport::meters_to_feet(100.0), 328.1);
        assert_eq!(TopographyReport::meters_to_feet(0.0), 0.0);
    }

    #[test]
    fn test_section_serialization_marks_skips() {
        let section: Section<WeatherReport> = Section::skipped(SkipReason::OutOfCoverage);
        let json = serde_json::to_value(&section).unwrap();
        assert_eq!(json["status"], "skipped");
        assert_eq!(json["reason"], "OUT_OF_COVERAGE");
    }

    #[test]
    fn test_section_serialization_flattens_data() {
        let section = Section::available(FuelReport {
            source: "OpenStreetMap via Overpass API".to_string(),
            fuel_types: BTreeMap::from([("forest".to_string(), 3)]),
            total_areas: 3,
            dominant_fuel: Some("forest".to_string()),
        });
        let json = serde_json::to_value(&section).unwrap();
        assert_eq!(json["status"], "available");
        assert_eq!(json["total_areas"], 3);
        assert_eq!(json["dominant_fuel"], "forest");
    }

    #[test]
    fn test_section_accessors() {
        let ok: Section<u32> = Section::from_fetch(Ok(7));
        assert_eq!(ok.data(), Some(&7));
        assert_eq!(ok.skip_reason(), None);

        let skipped: Section<u32> = Section::from_fetch(Err(SkipReason::UpstreamUnavailable));
        assert_eq!(skipped.data(), None);
        assert_eq!(skipped.skip_reason(), Some(SkipReason::UpstreamUnavailable));
    }

    #[test]
    fn test_empty_fuel_report_is_available_not_skipped() {
        let report = FuelReport {
            source: "OpenStreetMap via Overpass API".to_string(),
            fuel_types: BTreeMap::new(),
            total_areas: 0,
            dominant_fuel: None,
        };
        assert!(report.is_empty());

        let section = Section::available(report);
        assert!(section.data().is_some());
        assert_eq!(section.skip_reason(), None);
    }

    #[test]
    fn test_coordinate_display() {
        let coord = Coordinate::new(46.81824, 8.22754);
        assert_eq!(coord.to_string(), "46.8182, 8.2275");
    }
}
