//! Tiered fetch-with-fallback
//!
//! A [`Resilient`] holds an ordered list of attempts. Each attempt pairs a
//! future producing a raw payload with a transform into the view model. The
//! first attempt whose fetch and transform both succeed wins. Attempt futures
//! are lazy: an attempt that is skipped or never reached does no work.

use std::fmt;
use std::future::Future;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::FetchError;

/// Which stage of the fallback chain produced a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Primary,
    Secondary,
    Sample,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::Primary => "primary",
            Tier::Secondary => "secondary",
            Tier::Sample => "sample",
        };
        f.write_str(name)
    }
}

/// A view model tagged with the tier it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sourced<T> {
    pub value: T,
    pub tier: Tier,
}

struct Attempt<'a, T> {
    tier: Tier,
    run: Option<BoxFuture<'a, Result<T, FetchError>>>,
}

/// Ordered fallback chain for one panel
pub struct Resilient<'a, T> {
    panel: &'static str,
    attempts: Vec<Attempt<'a, T>>,
}

impl<'a, T: Send + 'a> Resilient<'a, T> {
    #[must_use]
    pub fn new(panel: &'static str) -> Self {
        Self {
            panel,
            attempts: Vec::new(),
        }
    }

    /// Append an attempt: `fetch` yields the raw payload, `transform` maps it
    /// into the view model. A transform error downgrades like a fetch error.
    #[must_use]
    pub fn attempt<P, Fut, F>(mut self, tier: Tier, fetch: Fut, transform: F) -> Self
    where
        Fut: Future<Output = Result<P, FetchError>> + Send + 'a,
        F: FnOnce(P) -> Result<T, FetchError> + Send + 'a,
        P: Send + 'a,
    {
        let run = async move { fetch.await.and_then(transform) }.boxed();
        self.attempts.push(Attempt {
            tier,
            run: Some(run),
        });
        self
    }

    /// Like [`Resilient::attempt`], but recorded as skipped when `enabled` is
    /// false (e.g. no credential configured).
    #[must_use]
    pub fn attempt_if<P, Fut, F>(self, enabled: bool, tier: Tier, fetch: Fut, transform: F) -> Self
    where
        Fut: Future<Output = Result<P, FetchError>> + Send + 'a,
        F: FnOnce(P) -> Result<T, FetchError> + Send + 'a,
        P: Send + 'a,
    {
        if enabled {
            self.attempt(tier, fetch, transform)
        } else {
            let mut this = self;
            this.attempts.push(Attempt { tier, run: None });
            this
        }
    }

    /// Try every attempt in order; fails when all of them fail
    pub async fn run(self) -> Result<Sourced<T>, FetchError> {
        try_attempts(self.panel, self.attempts).await
    }

    /// Try every attempt, then fall back to `sample`. Never fails.
    pub async fn run_or_sample<F>(self, sample: F) -> Sourced<T>
    where
        F: FnOnce() -> T,
    {
        let panel = self.panel;
        match self.run().await {
            Ok(sourced) => sourced,
            Err(_) => use_sample(panel, sample),
        }
    }
}

async fn try_attempts<T>(
    panel: &'static str,
    attempts: Vec<Attempt<'_, T>>,
) -> Result<Sourced<T>, FetchError> {
    let mut last = FetchError::Unsupported(format!("no sources configured for {panel}"));

    for attempt in attempts {
        let Some(run) = attempt.run else {
            debug!(panel, tier = %attempt.tier, "Source not configured, skipping");
            continue;
        };

        match run.await {
            Ok(value) => {
                info!(panel, tier = %attempt.tier, "Panel data loaded");
                return Ok(Sourced {
                    value,
                    tier: attempt.tier,
                });
            }
            Err(e) => {
                warn!(panel, tier = %attempt.tier, error = %e, "Source failed, falling back");
                last = e;
            }
        }
    }

    Err(FetchError::AllAttemptsFailed {
        last: Box::new(last),
    })
}

fn use_sample<T>(panel: &'static str, sample: impl FnOnce() -> T) -> Sourced<T> {
    info!(panel, "Using built-in sample data");
    Sourced {
        value: sample(),
        tier: Tier::Sample,
    }
}
