//! News headline view model

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Display budget for headlines
pub const TITLE_BUDGET: usize = 80;
/// Display budget for article summaries
pub const DESCRIPTION_BUDGET: usize = 150;
/// Maximum number of cards on the news panel
pub const MAX_ARTICLES: usize = 6;

/// Headline categories offered by the category selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsCategory {
    #[default]
    General,
    Business,
    Entertainment,
    Health,
    Science,
    Sports,
    Technology,
}

impl NewsCategory {
    pub const ALL: [NewsCategory; 7] = [
        NewsCategory::General,
        NewsCategory::Business,
        NewsCategory::Entertainment,
        NewsCategory::Health,
        NewsCategory::Science,
        NewsCategory::Sports,
        NewsCategory::Technology,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            NewsCategory::General => "general",
            NewsCategory::Business => "business",
            NewsCategory::Entertainment => "entertainment",
            NewsCategory::Health => "health",
            NewsCategory::Science => "science",
            NewsCategory::Sports => "sports",
            NewsCategory::Technology => "technology",
        }
    }

    /// Lenient parse: unknown names fall back to `general`
    #[must_use]
    pub fn parse_or_default(name: &str) -> Self {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(name))
            .unwrap_or_default()
    }
}

impl fmt::Display for NewsCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One headline card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsArticle {
    pub title: String,
    pub description: Option<String>,
    pub source_name: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub url: String,
}

impl NewsArticle {
    #[must_use]
    pub fn display_title(&self) -> String {
        truncate_text(&self.title, TITLE_BUDGET)
    }

    #[must_use]
    pub fn display_description(&self) -> String {
        let text = self
            .description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or("No description available");
        truncate_text(text, DESCRIPTION_BUDGET)
    }

    #[must_use]
    pub fn display_source(&self) -> &str {
        self.source_name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("Unknown Source")
    }

    /// e.g. `Oct 18, 02:15 PM`
    #[must_use]
    pub fn display_published(&self) -> String {
        self.published_at
            .map(|at| at.format("%b %-d, %I:%M %p").to_string())
            .unwrap_or_default()
    }
}

/// Cut `text` to `max_chars` characters, appending `...` when anything was cut.
#[must_use]
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
