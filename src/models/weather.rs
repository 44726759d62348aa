//! Weather view model and display methods

use std::fmt;

use serde::{Serialize, Serializer};

/// A reading that a source may not provide
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measure {
    Value(f64),
    Unknown,
}

impl Measure {
    #[must_use]
    pub fn from_option(value: Option<f64>) -> Self {
        value.map_or(Measure::Unknown, Measure::Value)
    }

    /// Format with a unit suffix, or the bare "unknown" marker
    #[must_use]
    pub fn with_unit(&self, unit: &str) -> String {
        match self {
            Measure::Value(v) => format!("{v}{unit}"),
            Measure::Unknown => "unknown".to_string(),
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.with_unit(""))
    }
}

impl Serialize for Measure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Measure::Value(v) => serializer.serialize_f64(*v),
            Measure::Unknown => serializer.serialize_str("unknown"),
        }
    }
}

/// Icon category shown on the weather card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherIcon {
    Sun,
    Cloud,
    CloudSun,
    Rain,
    Drizzle,
    Snow,
    Bolt,
    Smog,
}

impl WeatherIcon {
    /// Font Awesome class used by the page template
    #[must_use]
    pub fn css_class(&self) -> &'static str {
        match self {
            WeatherIcon::Sun => "fas fa-sun",
            WeatherIcon::Cloud => "fas fa-cloud",
            WeatherIcon::CloudSun => "fas fa-cloud-sun",
            WeatherIcon::Rain => "fas fa-cloud-rain",
            WeatherIcon::Drizzle => "fas fa-cloud-drizzle",
            WeatherIcon::Snow => "fas fa-snowflake",
            WeatherIcon::Bolt => "fas fa-bolt",
            WeatherIcon::Smog => "fas fa-smog",
        }
    }
}

/// Current conditions as displayed on the weather card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherView {
    /// Temperature in Celsius, rounded
    pub temperature: i32,
    /// Human-readable description of weather conditions
    pub description: String,
    /// Relative humidity in percent
    pub humidity: Measure,
    /// Wind speed in m/s
    pub wind_speed: f64,
    /// Atmospheric pressure in hPa
    pub pressure: Measure,
    /// Apparent temperature in Celsius, rounded
    pub feels_like: i32,
    pub location_label: String,
    pub icon: WeatherIcon,
}

impl WeatherView {
    /// Format temperature with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{}°C", self.temperature)
    }

    #[must_use]
    pub fn format_feels_like(&self) -> String {
        format!("{}°C", self.feels_like)
    }

    #[must_use]
    pub fn format_wind(&self) -> String {
        format!("{} m/s", self.wind_speed)
    }

    #[must_use]
    pub fn format_humidity(&self) -> String {
        self.humidity.with_unit("%")
    }

    /// Format atmospheric pressure with unit
    #[must_use]
    pub fn format_pressure(&self) -> String {
        self.pressure.with_unit(" hPa")
    }
}
