//! Best-effort device position
//!
//! Geolocation is optional: any failure, including a provider that never
//! answers, resolves to the configured default coordinate.

use std::time::Duration;

use tracing::{debug, warn};

use crate::config::LocationConfig;
use crate::error::FetchError;
use crate::models::Location;

/// Source of the current device position
pub trait LocationProvider: Send + Sync {
    fn current_position(&self) -> impl Future<Output = Result<Location, FetchError>> + Send;
}

/// Always reports the same position
#[derive(Debug, Clone)]
pub struct FixedLocation(pub Location);

impl LocationProvider for FixedLocation {
    async fn current_position(&self) -> Result<Location, FetchError> {
        Ok(self.0.clone())
    }
}

/// Host without any geolocation capability
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeolocation;

impl LocationProvider for NoGeolocation {
    async fn current_position(&self) -> Result<Location, FetchError> {
        Err(FetchError::Unsupported(
            "Geolocation is not supported".to_string(),
        ))
    }
}

impl From<&LocationConfig> for Location {
    fn from(config: &LocationConfig) -> Self {
        Location::new(config.latitude, config.longitude, config.label.clone())
    }
}

/// Ask `provider` for a position within `budget`, else return `fallback`
pub async fn locate<P: LocationProvider>(
    provider: &P,
    budget: Duration,
    fallback: &Location,
) -> Location {
    match tokio::time::timeout(budget, provider.current_position()).await {
        Ok(Ok(location)) if location.is_valid() => {
            debug!("Resolved device position: {}", location.format_coordinates());
            location
        }
        Ok(Ok(location)) => {
            warn!(
                "Geolocation returned invalid coordinates {}, using default",
                location.format_coordinates()
            );
            fallback.clone()
        }
        Ok(Err(e)) => {
            warn!("Geolocation failed: {}, using default", e);
            fallback.clone()
        }
        Err(_) => {
            warn!("Geolocation timed out after {:?}, using default", budget);
            fallback.clone()
        }
    }
}
