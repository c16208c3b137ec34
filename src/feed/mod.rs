// src/feed/mod.rs
//! Upstream feed access: one GET per request, JSON array of post objects.

pub mod normalize;

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use metrics::counter;
use serde_json::Value;

pub use normalize::{build_corpus, normalize_posts, NormalizedLine, RawPost};

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected status code: {0}")]
    HttpStatus(u16),
    #[error("malformed feed body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("feed body is not a list (got {0})")]
    NotAList(&'static str),
}

#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch the current batch of posts, in upstream order.
    async fn fetch_posts(&self) -> Result<Vec<Value>, FeedError>;
    fn name(&self) -> &'static str;
}

/// Accept only list-shaped bodies; anything else is a fetch failure.
pub fn posts_from_body(body: Value) -> Result<Vec<Value>, FeedError> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Object(_) => Err(FeedError::NotAList("object")),
        Value::String(_) => Err(FeedError::NotAList("string")),
        Value::Number(_) => Err(FeedError::NotAList("number")),
        Value::Bool(_) => Err(FeedError::NotAList("bool")),
        Value::Null => Err(FeedError::NotAList("null")),
    }
}

/// Feed served by the relevant-posts HTTP service.
pub struct HttpFeed {
    url: String,
    client: reqwest::Client,
}

impl HttpFeed {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(url, reqwest::Client::new())
    }

    pub fn with_client(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl HttpFeed {
    async fn fetch_once(&self) -> Result<Vec<Value>, FeedError> {
        let resp = self.client.get(&self.url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FeedError::HttpStatus(status.as_u16()));
        }
        let bytes = resp.bytes().await?;
        let body: Value = serde_json::from_slice(&bytes)?;
        posts_from_body(body)
    }
}

#[async_trait]
impl FeedSource for HttpFeed {
    async fn fetch_posts(&self) -> Result<Vec<Value>, FeedError> {
        match self.fetch_once().await {
            Ok(posts) => {
                tracing::debug!(posts = posts.len(), url = %self.url, "feed fetched");
                Ok(posts)
            }
            Err(e) => {
                counter!("digest_feed_errors_total").increment(1);
                tracing::warn!(error = %e, url = %self.url, provider = "http", "feed error");
                Err(e)
            }
        }
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// In-memory feed for tests and local runs. Counts how often it was asked.
pub struct StaticFeed {
    outcome: StaticOutcome,
    fetches: AtomicUsize,
}

enum StaticOutcome {
    Posts(Vec<Value>),
    Status(u16),
}

impl StaticFeed {
    pub fn posts(posts: Vec<Value>) -> Self {
        Self {
            outcome: StaticOutcome::Posts(posts),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Always fails as if upstream answered with `status`.
    pub fn failing(status: u16) -> Self {
        Self {
            outcome: StaticOutcome::Status(status),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeedSource for StaticFeed {
    async fn fetch_posts(&self) -> Result<Vec<Value>, FeedError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            StaticOutcome::Posts(p) => Ok(p.clone()),
            StaticOutcome::Status(code) => Err(FeedError::HttpStatus(*code)),
        }
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
