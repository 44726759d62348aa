//! Per-panel data pipelines
//!
//! Each service builds a [`Resilient`](crate::resilient::Resilient) chain for
//! its panel: keyed primary source, keyless secondary source, built-in sample.

pub mod activity;
pub mod news;
pub mod quote;
pub mod weather;

pub use activity::ActivityService;
pub use news::NewsService;
pub use quote::QuoteService;
pub use weather::WeatherService;

use crate::config::DaybriefConfig;
use crate::error::FetchError;
use crate::http::HttpFetcher;

/// The four panel services sharing one HTTP client
#[derive(Clone, Debug)]
pub struct Services {
    pub weather: WeatherService,
    pub news: NewsService,
    pub quote: QuoteService,
    pub activity: ActivityService,
}

impl Services {
    /// Build every service from configuration
    pub fn from_config(config: &DaybriefConfig) -> Result<Self, FetchError> {
        let http = HttpFetcher::new(&config.http)?;
        Ok(Self {
            weather: WeatherService::new(http.clone(), config.weather.clone()),
            news: NewsService::new(http.clone(), config.news.clone()),
            quote: QuoteService::new(http.clone(), config.quote.clone()),
            activity: ActivityService::new(http, config.activity.clone()),
        })
    }
}
