//! Error types and handling for the `BurnScout` application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fatal errors for report construction.
///
/// Only geocoding (and configuration) can fail a report outright; every
/// downstream data source degrades to a skipped section instead.
#[derive(Error, Debug)]
pub enum ReportError {
    /// The geocoder returned zero matches for the query
    #[error("Location not found: {query}")]
    NotFound { query: String },

    /// The geocoder itself was unreachable or returned garbage
    #[error("Geocoding service unavailable: {message}")]
    Upstream { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },
}

impl ReportError {
    /// Create a new not-found error
    pub fn not_found<S: Into<String>>(query: S) -> Self {
        Self::NotFound {
            query: query.into(),
        }
    }

    /// Create a new upstream error
    pub fn upstream<S: Into<String>>(message: S) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ReportError::NotFound { query } => {
                format!("Could not find location: {query}")
            }
            ReportError::Upstream { .. } => {
                "The geocoding service is currently unreachable. Please try again later."
                    .to_string()
            }
            ReportError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            ReportError::Validation { message } => {
                format!("Invalid input: {message}")
            }
        }
    }
}

/// Why a report section has no data.
///
/// Recorded on the section itself so a consumer can tell "provider has no
/// coverage here" from "provider was down".
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkipReason {
    /// The coordinate lies outside the provider's service area
    #[error("coordinate outside provider coverage")]
    OutOfCoverage,

    /// The provider failed, timed out, or returned an unparseable response
    #[error("upstream provider unavailable")]
    UpstreamUnavailable,
}
