//! `BurnScout` - location-based data aggregation for prescribed burn planning
//!
//! This library geocodes a free-text location and assembles weather,
//! topography, vegetation fuel and water-source data from public APIs into
//! a single burn-planning report that tolerates partial provider failure.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod providers;
pub mod report;
pub mod web;

// Re-export core types for public API
pub use config::BurnScoutConfig;
pub use error::{ReportError, SkipReason};
pub use models::{
    BurnAssessment, BurnPlanningReport, Coordinate, FuelReport, GeocodedLocation, Section,
    TerrainClass, TopographyReport, WaterSourceReport, WeatherReport,
};
pub use report::{BurnPlanner, DefaultBurnPlanner};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, ReportError>;
