//! Display-ready view models, one per panel
//!
//! - Location: coordinates handed to the weather pipeline
//! - Weather: current conditions
//! - News: headline cards
//! - Quote: a single quote
//! - Activity: a suggestion with cost bucket

pub mod activity;
pub mod location;
pub mod news;
pub mod quote;
pub mod weather;

pub use activity::Activity;
pub use location::Location;
pub use news::{NewsArticle, NewsCategory};
pub use quote::Quote;
pub use weather::{Measure, WeatherIcon, WeatherView};
