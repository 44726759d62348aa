//! Bounded-timeout JSON fetcher shared by every panel
//!
//! The whole exchange (connect, headers, body) races a single budget. When the
//! budget elapses the request future is dropped, which aborts the connection,
//! and [`FetchError::Timeout`] is returned.

use std::time::{Duration, Instant};

use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::config::HttpConfig;
use crate::error::FetchError;

/// Query parameters whose values must never reach the logs
const SECRET_PARAMS: [&str; 3] = ["apiKey", "appid", "key"];

/// HTTP client for the external panel sources
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: Client,
    default_budget: Duration,
}

impl HttpFetcher {
    /// Create a new fetcher from the HTTP settings
    pub fn new(config: &HttpConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| FetchError::Unsupported(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            default_budget: config.timeout(),
        })
    }

    #[must_use]
    pub fn default_budget(&self) -> Duration {
        self.default_budget
    }

    /// GET `url` and decode the JSON body within the default budget
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        self.get_json_within(url, self.default_budget).await
    }

    /// GET `url` and decode the JSON body within `budget`
    #[instrument(skip(self, url), fields(url = %redact(url), budget_ms = budget.as_millis() as u64))]
    pub async fn get_json_within<T: DeserializeOwned>(
        &self,
        url: &str,
        budget: Duration,
    ) -> Result<T, FetchError> {
        let started = Instant::now();

        let outcome = tokio::time::timeout(budget, self.exchange::<T>(url)).await;

        let elapsed = started.elapsed();
        match outcome {
            Err(_) => {
                warn!("Request aborted after {:.3}s", elapsed.as_secs_f64());
                Err(FetchError::Timeout)
            }
            Ok(result) => {
                if elapsed.as_secs() > 5 {
                    warn!("Slow API response detected: {:.3}s", elapsed.as_secs_f64());
                }
                match &result {
                    Ok(_) => debug!("Request succeeded in {:.3}s", elapsed.as_secs_f64()),
                    Err(e) => debug!("Request failed in {:.3}s: {}", elapsed.as_secs_f64(), e),
                }
                result
            }
        }
    }

    async fn exchange<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::from_status(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| FetchError::decode(e.to_string()))
    }
}

/// Replace the values of credential query parameters with `***`
#[must_use]
pub fn redact(url: &str) -> String {
    let Some((base, query)) = url.split_once('?') else {
        return url.to_string();
    };

    let query = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((name, _)) if SECRET_PARAMS.contains(&name) => format!("{name}=***"),
            _ => pair.to_string(),
        })
        .collect::<Vec<_>>()
        .join("&");

    format!("{base}?{query}")
}
