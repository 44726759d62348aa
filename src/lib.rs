//! `Daybrief` - a resilient personal dashboard
//!
//! Aggregates current weather, news headlines, a quote and an activity
//! suggestion from public web services. Every panel degrades independently
//! from its keyed source to a keyless one and finally to built-in samples.

pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod http;
pub mod location;
pub mod logging;
pub mod models;
pub mod render;
pub mod resilient;
pub mod services;
pub mod web;

// Re-export core types for public API
pub use config::DaybriefConfig;
pub use dashboard::{Dashboard, DashboardEvent, DashboardState, LoadReport, PanelKind, PanelSink};
pub use error::{DaybriefError, FetchError};
pub use http::HttpFetcher;
pub use location::{FixedLocation, LocationProvider, NoGeolocation};
pub use models::{Activity, Location, NewsArticle, NewsCategory, Quote, WeatherView};
pub use resilient::{Resilient, Sourced, Tier};
pub use services::Services;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, DaybriefError>;
