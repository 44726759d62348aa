//! Activity panel: Bored API, canned suggestions

use rand::RngExt;
use serde::Deserialize;
use tracing::instrument;

use crate::config::ActivityConfig;
use crate::http::HttpFetcher;
use crate::models::Activity;
use crate::resilient::{Resilient, Sourced, Tier};

#[derive(Clone, Debug)]
pub struct ActivityService {
    http: HttpFetcher,
    config: ActivityConfig,
}

/// Bored API `activity` response
#[derive(Debug, Deserialize)]
pub struct BoredActivity {
    pub activity: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub participants: u32,
    pub price: f64,
    #[serde(default)]
    pub link: Option<String>,
}

impl From<BoredActivity> for Activity {
    fn from(value: BoredActivity) -> Self {
        Activity::new(
            value.activity,
            value.kind,
            value.participants,
            value.price,
            value.link,
        )
    }
}

impl ActivityService {
    #[must_use]
    pub fn new(http: HttpFetcher, config: ActivityConfig) -> Self {
        Self { http, config }
    }

    #[instrument(skip(self))]
    pub async fn fetch(&self) -> Sourced<Activity> {
        Resilient::new("activity")
            .attempt(
                Tier::Primary,
                self.http.get_json::<BoredActivity>(&self.config.base_url),
                |a| Ok(Activity::from(a)),
            )
            .run_or_sample(sample_activity)
            .await
    }
}

/// One of the built-in suggestions, chosen uniformly
#[must_use]
pub fn sample_activity() -> Activity {
    let samples = [
        Activity::new(
            "Read a book you've been meaning to read",
            "education",
            1,
            0.0,
            None,
        ),
        Activity::new("Go for a 30-minute walk", "recreational", 1, 0.0, None),
    ];
    let index = rand::rng().random_range(0..samples.len());
    samples[index].clone()
}
