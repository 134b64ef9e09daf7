//! Configuration management for the `EventCast` application
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::EventCastError;
use crate::scoring::{ConditionBands, ScoringEngine, ScoringMode, TrendMethod, trend};

/// Root configuration structure for the `EventCast` application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventCastConfig {
    /// Weather provider configuration
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// Scoring engine configuration
    #[serde(default)]
    pub scoring: ScoringConfig,
    /// Event store configuration
    #[serde(default)]
    pub store: StoreConfig,
    /// Email notification configuration
    #[serde(default)]
    pub notifications: NotificationsConfig,
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Weather provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Base URL for the forecast API
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// Base URL for the geocoding API
    #[serde(default = "default_geocoding_base_url")]
    pub geocoding_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_weather_timeout")]
    pub timeout_seconds: u32,
    /// Days of forecast to request
    #[serde(default = "default_forecast_days")]
    pub forecast_days: u32,
    /// Serve the nearest available sample when the requested time is not
    /// covered by the forecast window. Off unless explicitly enabled.
    #[serde(default)]
    pub allow_current_fallback: bool,
}

/// Cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache TTL in hours
    #[serde(default = "default_cache_ttl")]
    pub ttl_hours: u32,
    /// Cache directory location
    #[serde(default = "default_cache_location")]
    pub location: String,
}

/// Scoring engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Factor scoring style
    #[serde(default)]
    pub mode: ScoringMode,
    /// Condition band table
    #[serde(default)]
    pub bands: ConditionBands,
    /// Trend computation method
    #[serde(default)]
    pub trend_method: TrendMethod,
    /// Per-step change below which a trend counts as stable
    #[serde(default = "default_trend_threshold")]
    pub trend_threshold: f64,
}

/// Event store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path of the events JSON file
    #[serde(default = "default_events_path")]
    pub events_path: String,
}

/// Email notification settings.
///
/// SMTP credentials are optional; without them notifications are disabled and
/// everything else keeps working.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    /// Sender address; falls back to the SMTP username
    pub from_address: Option<String>,
    /// Score change (percentage points) that counts as significant
    #[serde(default = "default_change_threshold")]
    pub change_threshold_pct: f64,
    /// Temperature band outside which a threshold alert fires (Celsius)
    #[serde(default = "default_temperature_min")]
    pub temperature_min: f64,
    #[serde(default = "default_temperature_max")]
    pub temperature_max: f64,
    /// Wind speed above which a threshold alert fires (m/s)
    #[serde(default = "default_wind_limit")]
    pub wind_limit: f64,
    /// How far ahead of an event reminders are sent
    #[serde(default = "default_reminder_hours")]
    pub reminder_hours_before: u32,
    /// Interval between background weather checks
    #[serde(default = "default_check_interval")]
    pub check_interval_minutes: u32,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_port")]
    pub port: u16,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_weather_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

fn default_geocoding_base_url() -> String {
    "https://geocoding-api.open-meteo.com/v1".to_string()
}

fn default_weather_timeout() -> u32 {
    30
}

fn default_forecast_days() -> u32 {
    7
}

fn default_cache_ttl() -> u32 {
    6
}

fn default_cache_location() -> String {
    "~/.cache/eventcast".to_string()
}

fn default_trend_threshold() -> f64 {
    trend::DEFAULT_TREND_THRESHOLD
}

fn default_events_path() -> String {
    "events.json".to_string()
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_change_threshold() -> f64 {
    20.0
}

fn default_temperature_min() -> f64 {
    10.0
}

fn default_temperature_max() -> f64 {
    35.0
}

fn default_wind_limit() -> f64 {
    30.0
}

fn default_reminder_hours() -> u32 {
    24
}

fn default_check_interval() -> u32 {
    60
}

fn default_server_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for EventCastConfig {
    fn default() -> Self {
        Self {
            weather: WeatherConfig::default(),
            cache: CacheConfig::default(),
            scoring: ScoringConfig::default(),
            store: StoreConfig::default(),
            notifications: NotificationsConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_base_url(),
            geocoding_url: default_geocoding_base_url(),
            timeout_seconds: default_weather_timeout(),
            forecast_days: default_forecast_days(),
            allow_current_fallback: false,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_hours: default_cache_ttl(),
            location: default_cache_location(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            mode: ScoringMode::default(),
            bands: ConditionBands::default(),
            trend_method: TrendMethod::default(),
            trend_threshold: default_trend_threshold(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            events_path: default_events_path(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            smtp_host: default_smtp_host(),
            smtp_username: None,
            smtp_password: None,
            from_address: None,
            change_threshold_pct: default_change_threshold(),
            temperature_min: default_temperature_min(),
            temperature_max: default_temperature_max(),
            wind_limit: default_wind_limit(),
            reminder_hours_before: default_reminder_hours(),
            check_interval_minutes: default_check_interval(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_server_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl ScoringConfig {
    /// Build the engine this configuration describes
    #[must_use]
    pub fn engine(&self) -> ScoringEngine {
        ScoringEngine::new(
            self.mode,
            self.bands,
            self.trend_method,
            self.trend_threshold,
        )
    }
}

impl EventCastConfig {
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

        // Environment variable overrides with EVENTCAST_ prefix
        builder = builder.add_source(
            Environment::with_prefix("EVENTCAST")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let config: EventCastConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("eventcast").join("config.toml"))
    }

    /// Cache directory with a leading `~` expanded to the home directory
    #[must_use]
    pub fn cache_path(&self) -> PathBuf {
        if let Some(rest) = self.cache.location.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(&self.cache.location)
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.weather.timeout_seconds > 300 {
            return Err(
                EventCastError::config("Weather API timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.weather.forecast_days == 0 || self.weather.forecast_days > 16 {
            return Err(EventCastError::config("Forecast days must be between 1 and 16").into());
        }

        if self.cache.ttl_hours > 168 {
            return Err(
                EventCastError::config("Cache TTL cannot exceed 168 hours (1 week)").into(),
            );
        }

        if !(0.0..=100.0).contains(&self.notifications.change_threshold_pct) {
            return Err(EventCastError::config(
                "Significant-change threshold must be between 0 and 100 percentage points",
            )
            .into());
        }

        if self.notifications.temperature_min >= self.notifications.temperature_max {
            return Err(EventCastError::config(
                "Alert temperature minimum must be below the maximum",
            )
            .into());
        }

        if self.notifications.check_interval_minutes == 0 {
            return Err(
                EventCastError::config("Weather check interval must be at least 1 minute").into(),
            );
        }

        if self.scoring.trend_threshold <= 0.0 {
            return Err(EventCastError::config("Trend threshold must be positive").into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(EventCastError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(EventCastError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for url in [&self.weather.base_url, &self.weather.geocoding_url] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(EventCastError::config(
                    "Weather API base URLs must be valid HTTP or HTTPS URLs",
                )
                .into());
            }
        }

        if let Some(username) = &self.notifications.smtp_username {
            if username.is_empty() {
                return Err(EventCastError::config(
                    "SMTP username cannot be empty if provided. Either remove it or provide a valid one.",
                )
                .into());
            }
        }

        Ok(())
    }
}
