//! Quote view model

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub content: String,
    pub author: String,
}

impl Quote {
    /// Build a quote, defaulting a missing or blank author to "Unknown"
    #[must_use]
    pub fn new(content: impl Into<String>, author: Option<String>) -> Self {
        let author = author
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| "Unknown".to_string());
        Self {
            content: content.into(),
            author,
        }
    }
}
