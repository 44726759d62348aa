//! Error types and handling for the `daybrief` dashboard

use thiserror::Error;

/// Failure of a single outbound request or of a whole panel pipeline.
///
/// Every pipeline stage downgrades these into "try the next source"; only
/// [`FetchError::AllAttemptsFailed`] ever reaches a panel.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// The request budget elapsed before a response arrived
    #[error("Request timed out")]
    Timeout,

    /// Connection could not be established
    #[error("Network error: {0}")]
    NetworkUnreachable(String),

    /// HTTP 401
    #[error("Unauthorized - check API key")]
    Unauthorized,

    /// HTTP 404
    #[error("Resource not found")]
    NotFound,

    /// HTTP 429
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Any other non-2xx status
    #[error("HTTP {0}")]
    HttpError(u16),

    /// Capability missing on this host (e.g. geolocation)
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Body was not the JSON shape the transform expects
    #[error("Invalid response: {0}")]
    Decode(String),

    /// Every configured source failed and no sample stage exists
    #[error("All sources failed: {last}")]
    AllAttemptsFailed { last: Box<FetchError> },
}

impl FetchError {
    /// Create a new decode error
    pub fn decode<S: Into<String>>(message: S) -> Self {
        Self::Decode(message.into())
    }

    /// Map a non-success HTTP status onto an error kind
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::Unauthorized,
            404 => Self::NotFound,
            429 => Self::RateLimited,
            other => Self::HttpError(other),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            FetchError::Timeout => "Request timed out. Please try again.".to_string(),
            FetchError::NetworkUnreachable(_) => {
                "Network error. Please check your internet connection.".to_string()
            }
            FetchError::Unauthorized => {
                "Invalid API key. Please check your configuration.".to_string()
            }
            FetchError::RateLimited => "Rate limit exceeded. Please try again later.".to_string(),
            FetchError::NotFound => "Resource not found".to_string(),
            FetchError::HttpError(status) => format!("HTTP {status}"),
            FetchError::Unsupported(_) | FetchError::Decode(_) => {
                "An unexpected error occurred".to_string()
            }
            FetchError::AllAttemptsFailed { last } => last.user_message(),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            FetchError::from_status(status.as_u16())
        } else {
            FetchError::NetworkUnreachable(err.to_string())
        }
    }
}

/// Application-level error type
#[derive(Error, Debug)]
pub enum DaybriefError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Web server errors
    #[error("Server error: {message}")]
    Server { message: String },
}

impl DaybriefError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new server error
    pub fn server<S: Into<String>>(message: S) -> Self {
        Self::Server {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            DaybriefError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            DaybriefError::Server { .. } => {
                "Failed to initialize the dashboard. Please refresh the page.".to_string()
            }
        }
    }
}
