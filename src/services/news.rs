//! News panel: NewsAPI top headlines (keyed), JSONPlaceholder posts (keyless),
//! canned headlines

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::instrument;

use crate::config::NewsConfig;
use crate::error::FetchError;
use crate::http::HttpFetcher;
use crate::models::news::MAX_ARTICLES;
use crate::models::{NewsArticle, NewsCategory};
use crate::resilient::{Resilient, Sourced, Tier};

/// Placeholder posts are cut to this many characters before `...` is appended
const POST_SUMMARY_CHARS: usize = 120;

#[derive(Clone, Debug)]
pub struct NewsService {
    http: HttpFetcher,
    config: NewsConfig,
}

impl NewsService {
    #[must_use]
    pub fn new(http: HttpFetcher, config: NewsConfig) -> Self {
        Self { http, config }
    }

    /// Category used when the selector has not been touched
    #[must_use]
    pub fn default_category(&self) -> NewsCategory {
        NewsCategory::parse_or_default(&self.config.default_category)
    }

    /// Up to six headlines for `category`
    #[instrument(skip(self, category), fields(category = %category))]
    pub async fn fetch(&self, category: NewsCategory) -> Sourced<Vec<NewsArticle>> {
        let key = self.config.credential();
        let limit = self.limit();
        let primary_url = key
            .map(|key| self.primary_url(category, key))
            .unwrap_or_default();
        let fallback_url = format!("{}?_limit={}", self.config.fallback_url, limit);
        let post_base = self.config.fallback_url.trim_end_matches('/').to_string();

        Resilient::new("news")
            .attempt_if(
                key.is_some(),
                Tier::Primary,
                self.http.get_json::<TopHeadlinesResponse>(&primary_url),
                move |payload| payload.into_articles(limit),
            )
            .attempt(
                Tier::Secondary,
                self.http.get_json::<Vec<PlaceholderPost>>(&fallback_url),
                move |posts| Ok(posts_to_articles(posts, &post_base, limit, Utc::now())),
            )
            .run_or_sample(sample_news)
            .await
    }

    fn limit(&self) -> usize {
        usize::try_from(self.config.page_size)
            .unwrap_or(MAX_ARTICLES)
            .min(MAX_ARTICLES)
    }

    fn primary_url(&self, category: NewsCategory, key: &str) -> String {
        format!(
            "{}?category={}&country=us&apiKey={}&pageSize={}",
            self.config.base_url,
            category.as_str(),
            urlencoding::encode(key),
            self.limit()
        )
    }
}

/// NewsAPI `top-headlines` response
#[derive(Debug, Deserialize)]
pub struct TopHeadlinesResponse {
    #[serde(default)]
    pub articles: Vec<ApiArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiArticle {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub source: Option<ApiSource>,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct ApiSource {
    pub name: Option<String>,
}

impl TopHeadlinesResponse {
    /// An empty headline list is treated as a failed source so the panel
    /// falls through to the next tier instead of rendering nothing.
    pub fn into_articles(self, limit: usize) -> Result<Vec<NewsArticle>, FetchError> {
        if self.articles.is_empty() {
            return Err(FetchError::decode("no articles in response"));
        }

        Ok(self
            .articles
            .into_iter()
            .take(limit)
            .map(|a| NewsArticle {
                title: a.title.unwrap_or_default(),
                description: a.description,
                source_name: a.source.and_then(|s| s.name),
                published_at: a.published_at,
                url: a.url.unwrap_or_default(),
            })
            .collect())
    }
}

/// JSONPlaceholder `posts` record
#[derive(Debug, Deserialize)]
pub struct PlaceholderPost {
    pub id: u64,
    pub title: String,
    pub body: String,
}

/// Synthesize headline cards from generic posts
#[must_use]
pub fn posts_to_articles(
    posts: Vec<PlaceholderPost>,
    post_base: &str,
    limit: usize,
    now: DateTime<Utc>,
) -> Vec<NewsArticle> {
    posts
        .into_iter()
        .take(limit)
        .map(|post| {
            let summary: String = post.body.chars().take(POST_SUMMARY_CHARS).collect();
            NewsArticle {
                title: post.title,
                description: Some(format!("{summary}...")),
                source_name: Some("Sample News".to_string()),
                published_at: Some(now),
                url: format!("{post_base}/{}", post.id),
            }
        })
        .collect()
}

/// Canned headlines for offline use
#[must_use]
pub fn sample_news() -> Vec<NewsArticle> {
    let now = Utc::now();
    vec![
        NewsArticle {
            title: "Headlines are unavailable right now".to_string(),
            description: Some(
                "We could not reach any news source. Fresh headlines will appear on the next refresh."
                    .to_string(),
            ),
            source_name: Some("Daybrief".to_string()),
            published_at: Some(now),
            url: "https://newsapi.org".to_string(),
        },
        NewsArticle {
            title: "Tip: add a NewsAPI key for live top stories".to_string(),
            description: Some(
                "Set DAYBRIEF_NEWS__API_KEY to enable category headlines from NewsAPI."
                    .to_string(),
            ),
            source_name: Some("Daybrief".to_string()),
            published_at: Some(now),
            url: "https://newsapi.org/register".to_string(),
        },
    ]
}
