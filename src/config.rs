//! Configuration management for the `gonow` service
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::GoNowError;
use crate::playground::ScoringPolicy;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GoNowConfig {
    /// Weather API configuration
    pub weather: WeatherConfig,
    /// Postcode lookup configuration
    pub geocoding: GeocodingConfig,
    /// Cache configuration
    pub cache: CacheConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Default search settings
    pub defaults: DefaultsConfig,
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Data file locations
    pub catalog: CatalogConfig,
    /// Go-Now score thresholds and penalties
    pub scoring: ScoringPolicy,
}

/// Weather API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Base URL for weather API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
    /// Maximum number of retries for failed requests
    pub max_retries: u32,
    /// How long a fetched forecast stays fresh
    pub cache_ttl_minutes: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GeocodingProvider {
    /// Static postcode table
    #[default]
    Table,
    /// Open-Meteo geocoding API
    OpenMeteo,
}

/// Postcode lookup settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    pub provider: GeocodingProvider,
    pub base_url: String,
    /// ISO 3166-1 alpha-2 country results are restricted to
    pub country_code: String,
    pub timeout_seconds: u32,
    pub max_retries: u32,
}

/// Cache configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Cache directory location
    pub location: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
    /// OTLP/HTTP collector endpoint; traces and logs are exported when set
    pub otlp_endpoint: Option<String>,
}

/// Default search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Search radius in kilometers
    pub search_radius_km: f64,
    /// Maximum number of venues returned over HTTP
    pub max_results: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on a single HTTP request, weather fetch included
    pub request_timeout_seconds: u32,
}

/// Optional data file overrides; the embedded data is used when unset
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub venues_path: Option<PathBuf>,
    pub postcodes_path: Option<PathBuf>,
}

// Default value functions
fn default_weather_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

fn default_weather_timeout() -> u32 {
    30
}

fn default_weather_max_retries() -> u32 {
    3
}

fn default_weather_cache_ttl() -> u32 {
    30
}

fn default_geocoding_base_url() -> String {
    "https://geocoding-api.open-meteo.com/v1".to_string()
}

fn default_country_code() -> String {
    "AU".to_string()
}

fn default_geocoding_timeout() -> u32 {
    10
}

fn default_geocoding_max_retries() -> u32 {
    2
}

fn default_cache_location() -> String {
    dirs::cache_dir()
        .map(|dir| dir.join("gonow").to_string_lossy().into_owned())
        .unwrap_or_else(|| ".cache/gonow".to_string())
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_search_radius() -> f64 {
    15.0
}

fn default_max_results() -> u32 {
    50
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u32 {
    60
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_base_url(),
            timeout_seconds: default_weather_timeout(),
            max_retries: default_weather_max_retries(),
            cache_ttl_minutes: default_weather_cache_ttl(),
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            provider: GeocodingProvider::default(),
            base_url: default_geocoding_base_url(),
            country_code: default_country_code(),
            timeout_seconds: default_geocoding_timeout(),
            max_retries: default_geocoding_max_retries(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            location: default_cache_location(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            otlp_endpoint: None,
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            search_radius_km: default_search_radius(),
            max_results: default_max_results(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl GoNowConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        Self::load_with_env(config_path, Environment::with_prefix("GONOW"))
    }

    fn load_with_env(config_path: Option<PathBuf>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
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

        // GONOW_WEATHER__BASE_URL overrides weather.base_url
        builder = builder.add_source(
            env.prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: GoNowConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("gonow").join("config.toml"))
    }

    /// Apply default values to empty or zeroed fields
    pub fn apply_defaults(&mut self) {
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_weather_timeout();
        }
        if self.weather.cache_ttl_minutes == 0 {
            self.weather.cache_ttl_minutes = default_weather_cache_ttl();
        }
        if self.geocoding.base_url.is_empty() {
            self.geocoding.base_url = default_geocoding_base_url();
        }
        if self.geocoding.country_code.is_empty() {
            self.geocoding.country_code = default_country_code();
        }
        if self.geocoding.timeout_seconds == 0 {
            self.geocoding.timeout_seconds = default_geocoding_timeout();
        }
        if self.cache.location.is_empty() {
            self.cache.location = default_cache_location();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.logging.otlp_endpoint.as_deref().is_some_and(str::is_empty) {
            self.logging.otlp_endpoint = None;
        }
        if self.defaults.max_results == 0 {
            self.defaults.max_results = default_max_results();
        }
        if self.server.host.is_empty() {
            self.server.host = default_host();
        }
        if self.server.request_timeout_seconds == 0 {
            self.server.request_timeout_seconds = default_request_timeout();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        self.scoring
            .validate()
            .map_err(|e| GoNowError::config(format!("Invalid scoring policy: {e}")))?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.weather.timeout_seconds > 300 {
            return Err(GoNowError::config("Weather API timeout cannot exceed 300 seconds").into());
        }

        if self.weather.max_retries > 10 {
            return Err(GoNowError::config("Weather API max retries cannot exceed 10").into());
        }

        if self.weather.cache_ttl_minutes > 24 * 60 {
            return Err(GoNowError::config("Weather cache TTL cannot exceed 24 hours").into());
        }

        if self.geocoding.timeout_seconds > 300 {
            return Err(GoNowError::config("Geocoding timeout cannot exceed 300 seconds").into());
        }

        if self.geocoding.max_retries > 10 {
            return Err(GoNowError::config("Geocoding max retries cannot exceed 10").into());
        }

        let radius = self.defaults.search_radius_km;
        if !radius.is_finite() || radius <= 0.0 || radius > 500.0 {
            return Err(GoNowError::config(format!(
                "Default search radius must be in (0, 500] km, got {radius}"
            ))
            .into());
        }

        if self.defaults.max_results > 500 {
            return Err(GoNowError::config("Maximum results cannot exceed 500").into());
        }

        if self.server.port == 0 {
            return Err(GoNowError::config("Server port cannot be 0").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(GoNowError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(GoNowError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Weather API", &self.weather.base_url),
            ("Geocoding API", &self.geocoding.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(
                    GoNowError::config(format!("{name} base URL must be a valid HTTP or HTTPS URL")).into(),
                );
            }
        }

        if let Some(endpoint) = &self.logging.otlp_endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(GoNowError::config("OTLP endpoint must be a valid HTTP or HTTPS URL").into());
            }
        }

        let code = &self.geocoding.country_code;
        if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(GoNowError::config(format!(
                "Country code must be two letters, got '{code}'"
            ))
            .into());
        }

        Ok(())
    }
}
