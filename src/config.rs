//! Configuration management for the `BurnScout` application
//!
//! Handles loading configuration from files and environment variables,
//! and provides validation for all configuration settings.

use crate::ReportError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure for the `BurnScout` application
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BurnScoutConfig {
    /// Upstream provider configuration
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Spatial query configuration
    #[serde(default)]
    pub search: SearchConfig,
    /// Web server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Base URLs and timeouts for the upstream data providers.
///
/// Each provider is an independent third-party API; keeping the URLs here
/// lets tests point the fetchers at a local stub server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Nominatim geocoding endpoint
    #[serde(default = "default_geocoder_base_url")]
    pub geocoder_base_url: String,
    /// National Weather Service API endpoint
    #[serde(default = "default_weather_base_url")]
    pub weather_base_url: String,
    /// Open-Elevation API endpoint
    #[serde(default = "default_elevation_base_url")]
    pub elevation_base_url: String,
    /// Overpass API interpreter endpoint
    #[serde(default = "default_overpass_base_url")]
    pub overpass_base_url: String,
    /// Per-call timeout in seconds for geocoding, weather and elevation
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// Per-call timeout in seconds for Overpass queries (slower interpreter)
    #[serde(default = "default_overpass_timeout")]
    pub overpass_timeout_seconds: u32,
}

/// Radii for the spatial land-cover and water-source queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Land-cover search radius in meters
    #[serde(default = "default_fuel_radius")]
    pub fuel_radius_m: u32,
    /// Water body search radius in meters
    #[serde(default = "default_water_radius")]
    pub water_radius_m: u32,
    /// Fire hydrant search radius in meters
    #[serde(default = "default_hydrant_radius")]
    pub hydrant_radius_m: u32,
}

/// Web server configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to bind the HTTP server to
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions
fn default_geocoder_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_weather_base_url() -> String {
    "https://api.weather.gov".to_string()
}

fn default_elevation_base_url() -> String {
    "https://api.open-elevation.com".to_string()
}

fn default_overpass_base_url() -> String {
    "https://overpass-api.de/api/interpreter".to_string()
}

fn default_timeout() -> u32 {
    10
}

fn default_overpass_timeout() -> u32 {
    30
}

fn default_fuel_radius() -> u32 {
    5000
}

fn default_water_radius() -> u32 {
    10000
}

fn default_hydrant_radius() -> u32 {
    5000
}

fn default_port() -> u16 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            geocoder_base_url: default_geocoder_base_url(),
            weather_base_url: default_weather_base_url(),
            elevation_base_url: default_elevation_base_url(),
            overpass_base_url: default_overpass_base_url(),
            timeout_seconds: default_timeout(),
            overpass_timeout_seconds: default_overpass_timeout(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            fuel_radius_m: default_fuel_radius(),
            water_radius_m: default_water_radius(),
            hydrant_radius_m: default_hydrant_radius(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl ProvidersConfig {
    /// Timeout for geocoding, weather and elevation calls
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }

    /// Timeout for Overpass spatial queries
    #[must_use]
    pub fn overpass_timeout(&self) -> Duration {
        Duration::from_secs(self.overpass_timeout_seconds.into())
    }
}

impl BurnScoutConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment variable overrides with BURNSCOUT_ prefix,
        // e.g. BURNSCOUT_SEARCH__FUEL_RADIUS_M=3000
        builder = builder.add_source(
            Environment::with_prefix("BURNSCOUT")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let config: BurnScoutConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("burnscout").join("config.toml"))
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.providers.timeout_seconds == 0 || self.providers.timeout_seconds > 300 {
            return Err(
                ReportError::config("Provider timeout must be between 1 and 300 seconds").into(),
            );
        }

        if self.providers.overpass_timeout_seconds == 0
            || self.providers.overpass_timeout_seconds > 300
        {
            return Err(
                ReportError::config("Overpass timeout must be between 1 and 300 seconds").into(),
            );
        }

        if self.search.fuel_radius_m == 0 || self.search.fuel_radius_m > 50_000 {
            return Err(
                ReportError::config("Fuel search radius must be between 1 and 50000 meters").into(),
            );
        }

        if self.search.water_radius_m == 0 || self.search.water_radius_m > 50_000 {
            return Err(ReportError::config(
                "Water search radius must be between 1 and 50000 meters",
            )
            .into());
        }

        if self.search.hydrant_radius_m == 0 || self.search.hydrant_radius_m > 50_000 {
            return Err(ReportError::config(
                "Hydrant search radius must be between 1 and 50000 meters",
            )
            .into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(ReportError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("geocoder", &self.providers.geocoder_base_url),
            ("weather", &self.providers.weather_base_url),
            ("elevation", &self.providers.elevation_base_url),
            ("overpass", &self.providers.overpass_base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ReportError::config(format!(
                    "{name} base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}
