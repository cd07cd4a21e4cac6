//! Error types and handling for the `GoNow` recommendation engine

use thiserror::Error;

/// Main error type for the `GoNow` application
#[derive(Error, Debug)]
pub enum GoNowError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Venue or postcode catalog errors
    #[error("Catalog error: {message}")]
    Catalog { message: String },
}

impl GoNowError {
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

    /// Create a new catalog error
    pub fn catalog<S: Into<String>>(message: S) -> Self {
        Self::Catalog {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            GoNowError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            GoNowError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            GoNowError::Catalog { message } => {
                format!("Venue data could not be loaded: {message}")
            }
        }
    }
}

/// Failure kinds a search can end in.
///
/// An empty result is not an error: zero venues in range comes back as an
/// empty `Ok` list.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    /// The postcode could not be mapped to a coordinate.
    #[error("No location data for postcode '{postcode}'")]
    LocationUnknown { postcode: String },

    /// The location resolver itself failed (e.g. geocoding service down).
    #[error("Location service unavailable: {reason}")]
    LocationServiceUnavailable { reason: String },

    /// The weather gateway failed or returned malformed data.
    #[error("Weather unavailable: {reason}")]
    WeatherUnavailable { reason: String },

    /// Search radius was negative, NaN or infinite.
    #[error("Invalid search radius: {radius_km}")]
    InvalidRadius { radius_km: f64 },
}

impl SearchError {
    /// Stable machine-readable code for this failure kind
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            SearchError::LocationUnknown { .. } => "LOCATION_UNKNOWN",
            SearchError::LocationServiceUnavailable { .. } => "LOCATION_SERVICE_UNAVAILABLE",
            SearchError::WeatherUnavailable { .. } => "WEATHER_UNAVAILABLE",
            SearchError::InvalidRadius { .. } => "INVALID_RADIUS",
        }
    }

    /// Whether retrying the same request later may succeed
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SearchError::LocationServiceUnavailable { .. } | SearchError::WeatherUnavailable { .. }
        )
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            SearchError::LocationUnknown { postcode } => {
                format!("We don't have data for postcode {postcode} yet. Try a nearby postcode.")
            }
            SearchError::LocationServiceUnavailable { .. } => {
                "We couldn't look up that postcode right now. Please try again shortly.".to_string()
            }
            SearchError::WeatherUnavailable { .. } => {
                "Weather data is unavailable right now. Please try again shortly.".to_string()
            }
            SearchError::InvalidRadius { .. } => {
                "Search radius must be a positive number of kilometres.".to_string()
            }
        }
    }
}
