use crate::config::schema::NewsConfig;
use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum NewsError {
    #[error(
        "News API key not configured. Please add it to the config file or set the {0} environment variable."
    )]
    MissingApiKey(String),
    #[error("Error getting news: {0}")]
    Api(String),
    #[error("Error getting news: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Error getting news: unexpected response ({0})")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Headline {
    pub title: String,
    pub source: String,
}

#[async_trait]
pub trait NewsProvider: Send + Sync {
    async fn top_headlines(&self) -> Result<Vec<Headline>, NewsError>;
}

#[derive(Debug, Deserialize)]
struct TopHeadlines {
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct Article {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    source: Option<ArticleSource>,
}

#[derive(Debug, Deserialize)]
struct ArticleSource {
    #[serde(default)]
    name: Option<String>,
}

/// Keep the first `limit` headlines of a NewsAPI body.
pub fn parse_headlines(body: serde_json::Value, limit: usize) -> Result<Vec<Headline>, NewsError> {
    if body.get("status").and_then(|s| s.as_str()) != Some("ok") {
        return Err(NewsError::Api(super::error_message(&body)));
    }
    let parsed: TopHeadlines = serde_json::from_value(body)?;
    Ok(parsed
        .articles
        .into_iter()
        .take(limit)
        .map(|article| Headline {
            title: article.title.unwrap_or_else(|| "(untitled)".to_string()),
            source: article
                .source
                .and_then(|s| s.name)
                .unwrap_or_else(|| "Unknown".to_string()),
        })
        .collect())
}

pub struct NewsApiClient {
    http: reqwest::Client,
    api_url: String,
    country: String,
    max_articles: usize,
    api_key: Option<String>,
    api_key_env: String,
}

impl NewsApiClient {
    pub fn new(http: reqwest::Client, config: &NewsConfig) -> Self {
        Self {
            http,
            api_url: config.api_url.clone(),
            country: config.country.clone(),
            max_articles: config.max_articles,
            api_key: config.api_key(),
            api_key_env: config.api_key_env.clone(),
        }
    }
}

#[async_trait]
impl NewsProvider for NewsApiClient {
    async fn top_headlines(&self) -> Result<Vec<Headline>, NewsError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| NewsError::MissingApiKey(self.api_key_env.clone()))?;

        info!(country = %self.country, "fetching top headlines");
        let body: serde_json::Value = self
            .http
            .get(&self.api_url)
            .query(&[("country", self.country.as_str()), ("apiKey", api_key)])
            .send()
            .await?
            .json()
            .await?;

        parse_headlines(body, self.max_articles)
    }
}
