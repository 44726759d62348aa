//! Weather panel: OpenWeatherMap (keyed), Open-Meteo (keyless), sample reading

use rand::RngExt;
use tracing::instrument;

use crate::config::WeatherConfig;
use crate::http::HttpFetcher;
use crate::models::{Location, Measure, WeatherIcon, WeatherView};
use crate::resilient::{Resilient, Sourced, Tier};

#[derive(Clone, Debug)]
pub struct WeatherService {
    http: HttpFetcher,
    config: WeatherConfig,
}

impl WeatherService {
    #[must_use]
    pub fn new(http: HttpFetcher, config: WeatherConfig) -> Self {
        Self { http, config }
    }

    /// Current conditions at `location`. Never fails: the last stage is a
    /// randomized sample reading.
    #[instrument(skip(self, location), fields(lat = location.latitude, lon = location.longitude))]
    pub async fn fetch(&self, location: &Location) -> Sourced<WeatherView> {
        let key = self.config.credential();
        let primary_url = key
            .map(|key| self.primary_url(location, key))
            .unwrap_or_default();
        let fallback_url = self.fallback_url(location);
        let fallback_label = location.label.clone();

        let chain = Resilient::new("weather")
            .attempt_if(
                key.is_some(),
                Tier::Primary,
                self.http.get_json::<open_weather::CurrentResponse>(&primary_url),
                move |payload| payload.into_view(&fallback_label),
            )
            .attempt(
                Tier::Secondary,
                self.http.get_json::<open_meteo::ForecastResponse>(&fallback_url),
                |payload| Ok(payload.into_view()),
            );

        chain.run_or_sample(sample_weather).await
    }

    fn primary_url(&self, location: &Location, key: &str) -> String {
        format!(
            "{}?lat={}&lon={}&appid={}&units=metric",
            self.config.base_url,
            location.latitude,
            location.longitude,
            urlencoding::encode(key)
        )
    }

    fn fallback_url(&self, location: &Location) -> String {
        format!(
            "{}?latitude={}&longitude={}&current_weather=true&hourly=relative_humidity_2m",
            self.config.fallback_url, location.latitude, location.longitude
        )
    }
}

/// Plausible offline reading used when both sources fail
#[must_use]
pub fn sample_weather() -> WeatherView {
    const DESCRIPTIONS: [&str; 3] = ["Sunny", "Partly Cloudy", "Cloudy"];
    let mut rng = rand::rng();

    let wind_tenths: u32 = rng.random_range(0..=100);
    WeatherView {
        temperature: rng.random_range(20..=30),
        description: DESCRIPTIONS[rng.random_range(0..DESCRIPTIONS.len())].to_string(),
        humidity: Measure::Value(f64::from(rng.random_range(40u32..=80))),
        wind_speed: f64::from(wind_tenths) / 10.0,
        pressure: Measure::Value(f64::from(rng.random_range(1010u32..=1020))),
        feels_like: rng.random_range(20..=30),
        location_label: "Your Location".to_string(),
        icon: WeatherIcon::CloudSun,
    }
}

/// `OpenWeatherMap` current weather response
pub mod open_weather {
    use serde::Deserialize;

    use crate::error::FetchError;
    use crate::models::{Measure, WeatherIcon, WeatherView};

    #[derive(Debug, Deserialize)]
    pub struct CurrentResponse {
        pub main: MainReadings,
        #[serde(default)]
        pub weather: Vec<Condition>,
        pub wind: Wind,
        #[serde(default)]
        pub name: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct MainReadings {
        pub temp: f64,
        pub feels_like: f64,
        pub humidity: Option<f64>,
        pub pressure: Option<f64>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Condition {
        /// Condition group, e.g. "Rain"
        pub main: String,
        pub description: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct Wind {
        pub speed: f64,
    }

    /// Map a condition group onto an icon; unknown groups get a cloud
    #[must_use]
    pub fn condition_to_icon(main: &str) -> WeatherIcon {
        match main {
            "Clear" => WeatherIcon::Sun,
            "Clouds" => WeatherIcon::Cloud,
            "Rain" => WeatherIcon::Rain,
            "Snow" => WeatherIcon::Snow,
            "Thunderstorm" => WeatherIcon::Bolt,
            "Drizzle" => WeatherIcon::Drizzle,
            "Mist" | "Fog" => WeatherIcon::Smog,
            _ => WeatherIcon::Cloud,
        }
    }

    impl CurrentResponse {
        /// `fallback_label` is used when the response carries no place name
        pub fn into_view(self, fallback_label: &str) -> Result<WeatherView, FetchError> {
            let condition = self
                .weather
                .into_iter()
                .next()
                .ok_or_else(|| FetchError::decode("weather[0] missing"))?;

            let location_label = if self.name.trim().is_empty() {
                fallback_label.to_string()
            } else {
                self.name
            };

            Ok(WeatherView {
                temperature: self.main.temp.round() as i32,
                description: condition.description,
                humidity: Measure::from_option(self.main.humidity),
                wind_speed: self.wind.speed,
                pressure: Measure::from_option(self.main.pressure),
                feels_like: self.main.feels_like.round() as i32,
                location_label,
                icon: condition_to_icon(&condition.main),
            })
        }
    }
}

/// `OpenMeteo` forecast response with `current_weather=true`
pub mod open_meteo {
    use serde::Deserialize;

    use crate::models::{Measure, WeatherIcon, WeatherView};

    #[derive(Debug, Deserialize)]
    pub struct ForecastResponse {
        pub current_weather: CurrentWeather,
        pub hourly: Option<HourlyData>,
    }

    #[derive(Debug, Deserialize)]
    pub struct CurrentWeather {
        pub temperature: f64,
        pub windspeed: f64,
        pub weathercode: u16,
    }

    #[derive(Debug, Deserialize)]
    pub struct HourlyData {
        pub relative_humidity_2m: Option<Vec<Option<f64>>>,
    }

    /// Convert `OpenMeteo` weather code to a description
    #[must_use]
    pub fn weather_code_to_description(code: u16) -> &'static str {
        match code {
            0 => "clear sky",
            1 => "mainly clear",
            2 => "partly cloudy",
            3 => "overcast",
            45 => "fog",
            48 => "depositing rime fog",
            51 => "light drizzle",
            61 => "slight rain",
            71 => "slight snow",
            95 => "thunderstorm",
            _ => "unknown",
        }
    }

    /// Thresholds are checked in order; 78..=82 (showers) maps back to rain.
    #[must_use]
    pub fn weather_code_to_icon(code: u16) -> WeatherIcon {
        if code <= 3 {
            WeatherIcon::Sun
        } else if code <= 48 {
            WeatherIcon::Cloud
        } else if code <= 67 {
            WeatherIcon::Rain
        } else if code <= 77 {
            WeatherIcon::Snow
        } else if code <= 82 {
            WeatherIcon::Rain
        } else {
            WeatherIcon::Cloud
        }
    }

    impl ForecastResponse {
        #[must_use]
        pub fn into_view(self) -> WeatherView {
            let current = self.current_weather;
            let humidity = self
                .hourly
                .and_then(|h| h.relative_humidity_2m)
                .and_then(|values| values.into_iter().next().flatten());

            WeatherView {
                temperature: current.temperature.round() as i32,
                description: weather_code_to_description(current.weathercode).to_string(),
                humidity: Measure::from_option(humidity),
                wind_speed: current.windspeed,
                pressure: Measure::Unknown,
                feels_like: (current.temperature - 2.0).round() as i32,
                location_label: "Current Location".to_string(),
                icon: weather_code_to_icon(current.weathercode),
            }
        }
    }
}
