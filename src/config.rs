//! Configuration management for the `daybrief` dashboard
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::DaybriefError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Placeholder shipped in sample configs for the OpenWeatherMap key
pub const WEATHER_KEY_SENTINEL: &str = "YOUR_OPENWEATHER_API_KEY";
/// Placeholder shipped in sample configs for the NewsAPI key
pub const NEWS_KEY_SENTINEL: &str = "YOUR_NEWS_API_KEY";

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaybriefConfig {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub news: NewsConfig,
    #[serde(default)]
    pub quote: QuoteConfig,
    #[serde(default)]
    pub activity: ActivityConfig,
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Outbound HTTP settings shared by every panel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Default request budget in seconds
    #[serde(default = "default_http_timeout")]
    pub timeout_seconds: u32,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Weather panel sources
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// OpenWeatherMap key; absent or placeholder means keyless fallback only
    pub api_key: Option<String>,
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// Open-Meteo forecast endpoint
    #[serde(default = "default_weather_fallback_url")]
    pub fallback_url: String,
}

/// News panel sources
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    pub api_key: Option<String>,
    #[serde(default = "default_news_base_url")]
    pub base_url: String,
    #[serde(default = "default_news_fallback_url")]
    pub fallback_url: String,
    #[serde(default = "default_news_page_size")]
    pub page_size: u32,
    #[serde(default = "default_news_category")]
    pub default_category: String,
}

/// Quote panel sources
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteConfig {
    #[serde(default = "default_quote_base_url")]
    pub base_url: String,
    #[serde(default = "default_quote_timeout")]
    pub timeout_seconds: u32,
}

/// Activity panel source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityConfig {
    #[serde(default = "default_activity_base_url")]
    pub base_url: String,
}

/// Fallback position used when geolocation is unavailable
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    #[serde(default = "default_longitude")]
    pub longitude: f64,
    #[serde(default = "default_location_label")]
    pub label: String,
    #[serde(default = "default_geolocation_timeout")]
    pub geolocation_timeout_seconds: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Periodic full refresh interval in seconds
    #[serde(default = "default_refresh_interval")]
    pub interval_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
}

/// Logging configuration settings
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
fn default_http_timeout() -> u32 {
    8
}

fn default_user_agent() -> String {
    concat!("daybrief/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5/weather".to_string()
}

fn default_weather_fallback_url() -> String {
    "https://api.open-meteo.com/v1/forecast".to_string()
}

fn default_news_base_url() -> String {
    "https://newsapi.org/v2/top-headlines".to_string()
}

fn default_news_fallback_url() -> String {
    "https://jsonplaceholder.typicode.com/posts".to_string()
}

fn default_news_page_size() -> u32 {
    6
}

fn default_news_category() -> String {
    "general".to_string()
}

fn default_quote_base_url() -> String {
    "https://api.quotable.io/random".to_string()
}

fn default_quote_timeout() -> u32 {
    5
}

fn default_activity_base_url() -> String {
    "https://www.boredapi.com/api/activity".to_string()
}

fn default_latitude() -> f64 {
    40.7128
}

fn default_longitude() -> f64 {
    -74.0060
}

fn default_location_label() -> String {
    "New York".to_string()
}

fn default_geolocation_timeout() -> u32 {
    5
}

fn default_refresh_interval() -> u64 {
    600
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_http_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
            fallback_url: default_weather_fallback_url(),
        }
    }
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_news_base_url(),
            fallback_url: default_news_fallback_url(),
            page_size: default_news_page_size(),
            default_category: default_news_category(),
        }
    }
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_quote_base_url(),
            timeout_seconds: default_quote_timeout(),
        }
    }
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            base_url: default_activity_base_url(),
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            latitude: default_latitude(),
            longitude: default_longitude(),
            label: default_location_label(),
            geolocation_timeout_seconds: default_geolocation_timeout(),
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_refresh_interval(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
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

impl Default for DaybriefConfig {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            weather: WeatherConfig::default(),
            news: NewsConfig::default(),
            quote: QuoteConfig::default(),
            activity: ActivityConfig::default(),
            location: LocationConfig::default(),
            refresh: RefreshConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Returns the key only when it is set to something other than its placeholder.
#[must_use]
pub fn configured_key<'a>(key: Option<&'a str>, sentinel: &str) -> Option<&'a str> {
    key.map(str::trim)
        .filter(|k| !k.is_empty() && *k != sentinel)
}

impl WeatherConfig {
    #[must_use]
    pub fn credential(&self) -> Option<&str> {
        configured_key(self.api_key.as_deref(), WEATHER_KEY_SENTINEL)
    }
}

impl NewsConfig {
    #[must_use]
    pub fn credential(&self) -> Option<&str> {
        configured_key(self.api_key.as_deref(), NEWS_KEY_SENTINEL)
    }
}

impl HttpConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }
}

impl DaybriefConfig {
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

        // DAYBRIEF_WEATHER__API_KEY -> weather.api_key
        builder = builder.add_source(
            Environment::with_prefix("DAYBRIEF")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: DaybriefConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("daybrief").join("config.toml"))
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.http.timeout_seconds == 0 {
            self.http.timeout_seconds = default_http_timeout();
        }
        if self.http.user_agent.is_empty() {
            self.http.user_agent = default_user_agent();
        }
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.weather.fallback_url.is_empty() {
            self.weather.fallback_url = default_weather_fallback_url();
        }
        if self.news.base_url.is_empty() {
            self.news.base_url = default_news_base_url();
        }
        if self.news.fallback_url.is_empty() {
            self.news.fallback_url = default_news_fallback_url();
        }
        if self.news.page_size == 0 {
            self.news.page_size = default_news_page_size();
        }
        if self.news.default_category.is_empty() {
            self.news.default_category = default_news_category();
        }
        if self.quote.base_url.is_empty() {
            self.quote.base_url = default_quote_base_url();
        }
        if self.quote.timeout_seconds == 0 {
            self.quote.timeout_seconds = default_quote_timeout();
        }
        if self.activity.base_url.is_empty() {
            self.activity.base_url = default_activity_base_url();
        }
        if self.location.geolocation_timeout_seconds == 0 {
            self.location.geolocation_timeout_seconds = default_geolocation_timeout();
        }
        if self.refresh.interval_seconds == 0 {
            self.refresh.interval_seconds = default_refresh_interval();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_urls()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        for (name, secs) in [
            ("HTTP", self.http.timeout_seconds),
            ("Quote", self.quote.timeout_seconds),
            ("Geolocation", self.location.geolocation_timeout_seconds),
        ] {
            if secs == 0 || secs > 300 {
                return Err(DaybriefError::config(format!(
                    "{name} timeout must be between 1 and 300 seconds"
                ))
                .into());
            }
        }

        if self.refresh.interval_seconds < 10 {
            return Err(
                DaybriefError::config("Refresh interval must be at least 10 seconds").into(),
            );
        }

        if !(1..=100).contains(&self.news.page_size) {
            return Err(DaybriefError::config("News page size must be between 1 and 100").into());
        }

        if !(-90.0..=90.0).contains(&self.location.latitude)
            || !(-180.0..=180.0).contains(&self.location.longitude)
        {
            return Err(DaybriefError::config(format!(
                "Default location out of range: {}, {}",
                self.location.latitude, self.location.longitude
            ))
            .into());
        }

        Ok(())
    }

    fn validate_urls(&self) -> Result<()> {
        let urls = [
            ("weather.base_url", &self.weather.base_url),
            ("weather.fallback_url", &self.weather.fallback_url),
            ("news.base_url", &self.news.base_url),
            ("news.fallback_url", &self.news.fallback_url),
            ("quote.base_url", &self.quote.base_url),
            ("activity.base_url", &self.activity.base_url),
        ];
        for (name, url) in urls {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(DaybriefError::config(format!(
                    "{name} must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }
        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(DaybriefError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(DaybriefError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        Ok(())
    }
}
