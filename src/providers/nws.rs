//! National Weather Service (api.weather.gov) forecast client
//!
//! NWS only covers the United States. The points endpoint answers 404 for
//! coordinates outside its grid, which this client reports as an
//! out-of-coverage skip rather than a failure.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::WeatherProvider;
use crate::config::ProvidersConfig;
use crate::error::SkipReason;
use crate::models::{Coordinate, ForecastPeriod, WeatherReport};

const SOURCE: &str = "National Weather Service (NOAA)";

/// How many forecast periods to keep (today, tonight, tomorrow)
const FORECAST_PERIODS: usize = 3;

/// Hourly slots sampled per 12-hour period when backfilling humidity
const HOURLY_SLOTS_PER_PERIOD: usize = 4;

/// Weather client for the NWS API
#[derive(Debug, Clone)]
pub struct NwsWeatherProvider {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct PointsResponse {
    properties: PointsProperties,
}

#[derive(Debug, Deserialize)]
struct PointsProperties {
    forecast: String,
    #[serde(rename = "forecastHourly")]
    forecast_hourly: String,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    properties: ForecastProperties,
}

#[derive(Debug, Deserialize)]
struct ForecastProperties {
    periods: Vec<NwsPeriod>,
}

#[derive(Debug, Deserialize)]
struct NwsPeriod {
    name: String,
    #[serde(rename = "isDaytime", default)]
    is_daytime: bool,
    #[serde(default)]
    temperature: i32,
    #[serde(rename = "temperatureUnit", default)]
    temperature_unit: String,
    #[serde(rename = "windSpeed", default)]
    wind_speed: String,
    #[serde(rename = "windDirection", default)]
    wind_direction: String,
    #[serde(rename = "relativeHumidity")]
    relative_humidity: Option<QuantitativeValue>,
    #[serde(rename = "shortForecast", default)]
    short_forecast: String,
    #[serde(rename = "detailedForecast", default)]
    detailed_forecast: String,
}

#[derive(Debug, Deserialize)]
struct QuantitativeValue {
    value: Option<f64>,
}

impl NwsWeatherProvider {
    /// Create a new weather client against the configured endpoint
    pub fn new(client: Client, config: &ProvidersConfig) -> Self {
        Self {
            client,
            base_url: config.weather_base_url.clone(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> anyhow::Result<T> {
        debug!("NWS request URL: {}", url);
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }

    /// Look up the NWS grid point for a coordinate.
    /// `Ok(None)` means the coordinate is outside NWS coverage.
    async fn lookup_point(
        &self,
        coordinate: Coordinate,
    ) -> anyhow::Result<Option<PointsProperties>> {
        let url = format!(
            "{}/points/{},{}",
            self.base_url, coordinate.latitude, coordinate.longitude
        );
        debug!("NWS points URL: {}", url);

        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let points: PointsResponse = response.error_for_status()?.json().await?;
        Ok(Some(points.properties))
    }
}

impl WeatherProvider for NwsWeatherProvider {
    #[instrument(skip(self), fields(lat = coordinate.latitude, lon = coordinate.longitude))]
    async fn fetch_weather(&self, coordinate: Coordinate) -> Result<WeatherReport, SkipReason> {
        let point = self.lookup_point(coordinate).await.map_err(|e| {
            warn!("NWS point lookup failed: {e:#}");
            SkipReason::UpstreamUnavailable
        })?;

        let Some(point) = point else {
            debug!("Coordinate outside NWS coverage");
            return Err(SkipReason::OutOfCoverage);
        };

        let forecast: ForecastResponse = self.get_json(&point.forecast).await.map_err(|e| {
            warn!("NWS forecast fetch failed: {e:#}");
            SkipReason::UpstreamUnavailable
        })?;

        // The hourly feed is only needed to backfill humidity; losing it
        // does not lose the forecast.
        let hourly_periods = match self
            .get_json::<ForecastResponse>(&point.forecast_hourly)
            .await
        {
            Ok(hourly) => hourly.properties.periods,
            Err(e) => {
                warn!("NWS hourly forecast fetch failed: {e:#}");
                Vec::new()
            }
        };

        Ok(WeatherReport {
            source: SOURCE.to_string(),
            forecast: normalize_periods(forecast.properties.periods, &hourly_periods),
        })
    }
}

/// Normalize the leading forecast periods.
///
/// NWS names periods after the calendar ("Monday Night", "Washington's
/// Birthday"); the report wants stable relative names. The first period
/// anchors the sequence: a daytime lead gives Today/Tonight/Tomorrow, a
/// nighttime lead gives Tonight/Tomorrow/Tomorrow Night.
fn normalize_periods(periods: Vec<NwsPeriod>, hourly: &[NwsPeriod]) -> Vec<ForecastPeriod> {
    let mut normalized: Vec<ForecastPeriod> = Vec::new();

    for (i, period) in periods.into_iter().take(FORECAST_PERIODS).enumerate() {
        let name = match i {
            0 => {
                if period.is_daytime {
                    "Today"
                } else {
                    "Tonight"
                }
            }
            1 => {
                if normalized[0].name == "Today" {
                    "Tonight"
                } else {
                    "Tomorrow"
                }
            }
            _ => {
                if normalized[1].name == "Tonight" {
                    "Tomorrow"
                } else {
                    "Tomorrow Night"
                }
            }
        };

        let humidity = period
            .relative_humidity
            .as_ref()
            .and_then(|h| h.value)
            .or_else(|| backfill_humidity(hourly, i))
            .map(|h| h.round() as i32);

        normalized.push(ForecastPeriod {
            name: name.to_string(),
            original_name: period.name,
            temperature: period.temperature,
            temperature_unit: period.temperature_unit,
            wind_speed: period.wind_speed,
            wind_direction: period.wind_direction,
            humidity,
            short_forecast: period.short_forecast,
            detailed_forecast: period.detailed_forecast,
        });
    }

    normalized
}

/// Sample the hourly feed for the first humidity value in the slots that
/// roughly correspond to the given 12-hour period.
fn backfill_humidity(hourly: &[NwsPeriod], period_index: usize) -> Option<f64> {
    let start = period_index * HOURLY_SLOTS_PER_PERIOD;
    hourly
        .iter()
        .skip(start)
        .take(HOURLY_SLOTS_PER_PERIOD)
        .find_map(|h| h.relative_humidity.as_ref().and_then(|v| v.value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period(name: &str, is_daytime: bool, humidity: Option<f64>) -> NwsPeriod {
        NwsPeriod {
            name: name.to_string(),
            is_daytime,
            temperature: 72,
            temperature_unit: "F".to_string(),
            wind_speed: "10 mph".to_string(),
            wind_direction: "NW".to_string(),
            relative_humidity: humidity.map(|value| QuantitativeValue { value: Some(value) }),
            short_forecast: "Sunny".to_string(),
            detailed_forecast: "Sunny, with a high near 72.".to_string(),
        }
    }

    #[test]
    fn test_normalization_daytime_lead() {
        let periods = vec![
            period("This Afternoon", true, Some(40.0)),
            period("Tonight", false, Some(55.0)),
            period("Thursday", true, Some(35.0)),
        ];
        let normalized = normalize_periods(periods, &[]);
        let names: Vec<&str> = normalized.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Today", "Tonight", "Tomorrow"]);
        assert_eq!(normalized[0].original_name, "This Afternoon");
    }

    #[test]
    fn test_normalization_nighttime_lead() {
        let periods = vec![
            period("Tonight", false, None),
            period("Thursday", true, None),
            period("Thursday Night", false, None),
        ];
        let normalized = normalize_periods(periods, &[]);
        let names: Vec<&str> = normalized.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Tonight", "Tomorrow", "Tomorrow Night"]);
    }

    #[test]
    fn test_truncates_to_three_periods() {
        let periods = vec![
            period("Today", true, None),
            period("Tonight", false, None),
            period("Thursday", true, None),
            period("Thursday Night", false, None),
        ];
        assert_eq!(normalize_periods(periods, &[]).len(), 3);
    }

    #[test]
    fn test_humidity_from_period() {
        let periods = vec![period("Today", true, Some(42.6))];
        let normalized = normalize_periods(periods, &[]);
        assert_eq!(normalized[0].humidity, Some(43));
    }

    #[test]
    fn test_humidity_backfilled_from_hourly() {
        let periods = vec![period("Today", true, None), period("Tonight", false, None)];
        let hourly = vec![
            period("", true, None),
            period("", true, Some(38.0)),
            period("", true, Some(40.0)),
            period("", true, None),
            period("", false, Some(61.0)),
        ];
        let normalized = normalize_periods(periods, &hourly);
        // First period picks the first populated slot of hours 0..4,
        // second period samples hours 4..8.
        assert_eq!(normalized[0].humidity, Some(38));
        assert_eq!(normalized[1].humidity, Some(61));
    }

    #[test]
    fn test_humidity_absent_everywhere() {
        let periods = vec![period("Today", true, None)];
        let normalized = normalize_periods(periods, &[]);
        assert_eq!(normalized[0].humidity, None);
    }

    #[test]
    fn test_points_response_deserialization() {
        let json = r#"{
            "properties": {
                "forecast": "https://api.weather.gov/gridpoints/MSO/80,112/forecast",
                "forecastHourly": "https://api.weather.gov/gridpoints/MSO/80,112/forecast/hourly"
            }
        }"#;
        let points: PointsResponse = serde_json::from_str(json).unwrap();
        assert!(points.properties.forecast.ends_with("/forecast"));
        assert!(points.properties.forecast_hourly.ends_with("/hourly"));
    }

    #[test]
    fn test_period_deserialization_with_humidity_object() {
        let json = r#"{
            "name": "Tonight",
            "isDaytime": false,
            "temperature": 54,
            "temperatureUnit": "F",
            "windSpeed": "5 to 10 mph",
            "windDirection": "SW",
            "relativeHumidity": {"unitCode": "wmoUnit:percent", "value": 67},
            "shortForecast": "Mostly Clear",
            "detailedForecast": "Mostly clear, with a low around 54."
        }"#;
        let period: NwsPeriod = serde_json::from_str(json).unwrap();
        assert!(!period.is_daytime);
        assert_eq!(period.relative_humidity.unwrap().value, Some(67.0));
    }
}
