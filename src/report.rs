//! Report aggregation
//!
//! `BurnPlanner` is the orchestration core: geocode once, fan out to the
//! four data providers concurrently, and merge whatever came back into a
//! single `BurnPlanningReport`. Only geocoding can fail the whole request;
//! every other provider degrades to a skipped section.

use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use reqwest::Client;
use tracing::{info, instrument};

use crate::config::{BurnScoutConfig, SearchConfig};
use crate::error::ReportError;
use crate::models::{BurnAssessment, BurnPlanningReport, Section, WeatherReport};
use crate::providers::{
    ElevationProvider, Geocoder, LandCoverProvider, NominatimGeocoder, NwsWeatherProvider,
    OpenElevationProvider, OverpassClient, WaterSourceProvider, WeatherProvider,
};

const USER_AGENT: &str = concat!("BurnScout/", env!("CARGO_PKG_VERSION"));

/// Wind speed above which spread risk is flagged, in mph
const WIND_CONCERN_MPH: u32 = 15;

/// Relative humidity below which intensity risk is flagged, in percent
const HUMIDITY_CONCERN_PCT: i32 = 30;

/// Temperature above which fire-behavior risk is flagged, in °F
const TEMPERATURE_CONCERN_F: i32 = 85;

/// The planner backed by the real upstream providers
pub type DefaultBurnPlanner = BurnPlanner<
    NominatimGeocoder,
    NwsWeatherProvider,
    OpenElevationProvider,
    OverpassClient,
    OverpassClient,
>;

/// Orchestrates the providers into burn-planning reports.
///
/// Generic over the provider seams so tests can swap in fakes; production
/// code uses [`DefaultBurnPlanner`].
pub struct BurnPlanner<G, W, E, L, S> {
    geocoder: G,
    weather: W,
    elevation: E,
    land_cover: L,
    water: S,
    search: SearchConfig,
}

impl DefaultBurnPlanner {
    /// Build a planner with shared HTTP clients from configuration
    pub fn from_config(config: &BurnScoutConfig) -> anyhow::Result<Self> {
        let client = http_client(config.providers.timeout())?;
        // Overpass holds queries far longer than the point-lookup APIs
        let overpass_client = http_client(config.providers.overpass_timeout())?;
        let overpass = OverpassClient::new(overpass_client, &config.providers);

        Ok(Self::new(
            NominatimGeocoder::new(client.clone(), &config.providers),
            NwsWeatherProvider::new(client.clone(), &config.providers),
            OpenElevationProvider::new(client, &config.providers),
            overpass.clone(),
            overpass,
            config.search.clone(),
        ))
    }
}

fn http_client(timeout: Duration) -> anyhow::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .with_context(|| "Failed to create HTTP client")
}

impl<G, W, E, L, S> BurnPlanner<G, W, E, L, S>
where
    G: Geocoder,
    W: WeatherProvider,
    E: ElevationProvider,
    L: LandCoverProvider,
    S: WaterSourceProvider,
{
    pub fn new(geocoder: G, weather: W, elevation: E, land_cover: L, water: S, search: SearchConfig) -> Self {
        Self {
            geocoder,
            weather,
            elevation,
            land_cover,
            water,
            search,
        }
    }

    /// Build a full burn-planning report for a free-text location.
    ///
    /// Fails only on empty input or when geocoding fails; provider outages
    /// downstream surface as skipped sections in the returned report.
    #[instrument(skip(self))]
    pub async fn build_report(&self, location_text: &str) -> Result<BurnPlanningReport, ReportError> {
        let query = location_text.trim();
        if query.is_empty() {
            return Err(ReportError::validation("location query cannot be empty"));
        }

        let location = self.geocoder.resolve(query).await?;
        let coordinate = location.coordinate;

        let (weather, topography, fuel, water) = tokio::join!(
            self.weather.fetch_weather(coordinate),
            self.elevation.fetch_elevation(coordinate),
            self.land_cover.fetch_fuel(coordinate, self.search.fuel_radius_m),
            self.water.fetch_water_sources(
                coordinate,
                self.search.water_radius_m,
                self.search.hydrant_radius_m,
            ),
        );

        let weather = Section::from_fetch(weather);
        let burn_assessment = assess_burn_conditions(&weather);

        let report = BurnPlanningReport {
            generated_at: Utc::now(),
            location,
            weather,
            topography: Section::from_fetch(topography),
            fuel_sources: Section::from_fetch(fuel),
            water_sources: Section::from_fetch(water),
            burn_assessment,
        };

        info!(
            "Report for '{}': weather {}, topography {}, fuel {}, water {}",
            query,
            section_status(&report.weather),
            section_status(&report.topography),
            section_status(&report.fuel_sources),
            section_status(&report.water_sources),
        );

        Ok(report)
    }
}

fn section_status<T>(section: &Section<T>) -> &'static str {
    match section.skip_reason() {
        None => "ok",
        Some(reason) => match reason {
            crate::error::SkipReason::OutOfCoverage => "out of coverage",
            crate::error::SkipReason::UpstreamUnavailable => "unavailable",
        },
    }
}

/// Flag basic burn-condition concerns from the leading forecast period
pub fn assess_burn_conditions(weather: &Section<WeatherReport>) -> BurnAssessment {
    let Some(current) = weather.data().and_then(|w| w.forecast.first()) else {
        return BurnAssessment::Unavailable {
            message: "Unable to assess - weather data unavailable".to_string(),
        };
    };

    // A forecast whose wind figure cannot be read gives no basis for a
    // spread-risk call, so the whole assessment degrades.
    let Some(wind_mph) = parse_leading_wind_mph(&current.wind_speed) else {
        return BurnAssessment::Unavailable {
            message: format!(
                "Unable to assess conditions - unreadable wind speed '{}'",
                current.wind_speed
            ),
        };
    };

    let mut concerns = Vec::new();

    if wind_mph > WIND_CONCERN_MPH {
        concerns.push("High wind speeds - increased fire spread risk".to_string());
    }

    if let Some(humidity) = current.humidity
        && humidity < HUMIDITY_CONCERN_PCT
    {
        concerns.push("Low humidity - increased fire intensity risk".to_string());
    }

    if current.temperature > TEMPERATURE_CONCERN_F {
        concerns.push("High temperature - increased fire behavior risk".to_string());
    }

    if concerns.is_empty() {
        concerns.push("Conditions appear moderate".to_string());
    }

    BurnAssessment::Assessed {
        concerns,
        recommendation: "Consult with fire management professionals before proceeding".to_string(),
    }
}

/// Parse the leading figure out of an NWS wind string ("10 mph",
/// "5 to 10 mph")
fn parse_leading_wind_mph(wind_speed: &str) -> Option<u32> {
    wind_speed
        .split_whitespace()
        .next()?
        .chars()
        .filter(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .ok()
}
