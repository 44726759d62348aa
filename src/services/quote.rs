//! Quote panel: quotable (random endpoint), then canned quotes

use std::time::Duration;

use rand::RngExt;
use serde::Deserialize;
use tracing::instrument;

use crate::config::QuoteConfig;
use crate::http::HttpFetcher;
use crate::models::Quote;
use crate::resilient::{Resilient, Sourced, Tier};

const SAMPLE_QUOTES: [(&str, &str); 2] = [
    (
        "The only way to do great work is to love what you do.",
        "Steve Jobs",
    ),
    (
        "Life is what happens when you're busy making other plans.",
        "John Lennon",
    ),
];

#[derive(Clone, Debug)]
pub struct QuoteService {
    http: HttpFetcher,
    config: QuoteConfig,
}

/// quotable `random` response
#[derive(Debug, Deserialize)]
pub struct RandomQuote {
    pub content: String,
    pub author: Option<String>,
}

impl QuoteService {
    #[must_use]
    pub fn new(http: HttpFetcher, config: QuoteConfig) -> Self {
        Self { http, config }
    }

    #[instrument(skip(self))]
    pub async fn fetch(&self) -> Sourced<Quote> {
        let budget = Duration::from_secs(self.config.timeout_seconds.into());

        Resilient::new("quote")
            .attempt(
                Tier::Primary,
                self.http
                    .get_json_within::<RandomQuote>(&self.config.base_url, budget),
                |q| Ok(Quote::new(q.content, q.author)),
            )
            .run_or_sample(sample_quote)
            .await
    }
}

/// One of the built-in quotes, chosen uniformly
#[must_use]
pub fn sample_quote() -> Quote {
    let (content, author) = SAMPLE_QUOTES[rand::rng().random_range(0..SAMPLE_QUOTES.len())];
    Quote::new(content, Some(author.to_string()))
}
