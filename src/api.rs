// src/api.rs
//! HTTP surface: GET endpoints wiring feed -> normalizer -> prompt -> completion -> interpreter.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use metrics::counter;
use tracing::info;

use crate::config::ServiceConfig;
use crate::error::ApiError;
use crate::feed::{build_corpus, normalize_posts, FeedSource, HttpFeed};
use crate::interpret::{
    interpret_keywords, interpret_opportunity, interpret_relevance, interpret_summary,
    InterpretedResponse,
};
use crate::llm::{complete_observed, CompletionResult, DynCompletionClient, GeminiClient};
use crate::metrics::Metrics;
use crate::prompt::{PromptTemplate, MAX_SECTIONS};

pub const ROUTE_ASK: &str = "/ask";
pub const ROUTE_SUMMARIZE: &str = "/summarize_posts";
pub const ROUTE_SUMMARIZE_DAILY: &str = "/summarize_daily";
pub const ROUTE_SUMMARIZE_DRAMA: &str = "/summarize_drama";
pub const ROUTE_KEYWORDS: &str = "/extract_keywords";
pub const ROUTE_RELEVANCE: &str = "/check_relevance";
pub const ROUTE_OPPORTUNITY: &str = "/check_opportunity";

/// Shared, read-only per-process state. Nothing here is mutated by requests.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    pub feed: Arc<dyn FeedSource>,
    pub llm: DynCompletionClient,
}

impl AppState {
    pub fn new(
        config: ServiceConfig,
        feed: Arc<dyn FeedSource>,
        llm: DynCompletionClient,
    ) -> Self {
        Self {
            config: Arc::new(config),
            feed,
            llm,
        }
    }

    /// Production wiring: HTTP feed + Gemini.
    pub fn from_config(config: ServiceConfig) -> anyhow::Result<Self> {
        config.require_gemini()?;
        let feed = Arc::new(HttpFeed::new(config.feed_url.clone()));
        let llm = Arc::new(GeminiClient::new(
            &config.gemini.api_url,
            &config.gemini.api_key,
            &config.gemini.model,
        )?);
        info!(
            feed_url = %config.feed_url,
            model = %config.gemini.model,
            key_len = config.gemini.api_key.len(),
            "digest state ready"
        );
        Ok(Self::new(config, feed, llm))
    }
}

pub fn router(state: AppState) -> Router {
    let config = state.config.clone();
    let cors = &config.cors;
    let metrics = Metrics::init();

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route(ROUTE_ASK, get(ask).layer(cors.layer_for(ROUTE_ASK)))
        .route(
            ROUTE_SUMMARIZE,
            get(summarize_posts).layer(cors.layer_for(ROUTE_SUMMARIZE)),
        )
        .route(
            ROUTE_SUMMARIZE_DAILY,
            get(summarize_daily).layer(cors.layer_for(ROUTE_SUMMARIZE_DAILY)),
        )
        .route(
            ROUTE_SUMMARIZE_DRAMA,
            get(summarize_drama).layer(cors.layer_for(ROUTE_SUMMARIZE_DRAMA)),
        )
        .route(
            ROUTE_KEYWORDS,
            get(extract_keywords).layer(cors.layer_for(ROUTE_KEYWORDS)),
        )
        .route(
            ROUTE_RELEVANCE,
            get(check_relevance).layer(cors.layer_for(ROUTE_RELEVANCE)),
        )
        .route(
            ROUTE_OPPORTUNITY,
            get(check_opportunity).layer(cors.layer_for(ROUTE_OPPORTUNITY)),
        )
        .merge(metrics.router::<AppState>())
        .with_state(state)
}

type ApiResult = Result<Json<InterpretedResponse>, ApiError>;

/// Present and non-empty, else `MissingParameter`. Whitespace is passed through.
fn required<'a>(q: &'a HashMap<String, String>, name: &'static str) -> Result<&'a str, ApiError> {
    q.get(name)
        .map(String::as_str)
        .filter(|v| !v.is_empty())
        .ok_or(ApiError::MissingParameter(name))
}

fn sections_param(q: &HashMap<String, String>, default: usize) -> Result<usize, ApiError> {
    let Some(raw) = q.get("sections").filter(|v| !v.trim().is_empty()) else {
        return Ok(default);
    };
    let invalid = |reason: String| ApiError::InvalidParameter {
        name: "sections",
        reason,
    };
    let n: usize = raw
        .trim()
        .parse()
        .map_err(|_| invalid(format!("expected an integer, got {raw:?}")))?;
    if !(1..=MAX_SECTIONS).contains(&n) {
        return Err(invalid(format!("must be between 1 and {MAX_SECTIONS}")));
    }
    Ok(n)
}

/// One backend call; `NoContent` becomes the caller-facing "no content" error.
async fn generate(state: &AppState, prompt: &str) -> Result<String, ApiError> {
    match complete_observed(state.llm.as_ref(), prompt).await? {
        CompletionResult::Text(t) => Ok(t),
        CompletionResult::NoContent => Err(ApiError::NoContentFromModel),
    }
}

async fn summarize_feed(state: &AppState, template: PromptTemplate) -> ApiResult {
    counter!("digest_requests_total", "endpoint" => template.name()).increment(1);

    let posts = state.feed.fetch_posts().await?;
    let lines = normalize_posts(&posts);
    let corpus = build_corpus(&lines);
    info!(
        endpoint = template.name(),
        feed = state.feed.name(),
        posts = lines.len(),
        corpus_len = corpus.len(),
        "summarizing feed"
    );

    let prompt = template.render(&corpus);
    let text = generate(state, &prompt).await?;
    Ok(Json(interpret_summary(text)))
}

async fn ask(State(state): State<AppState>, Query(q): Query<HashMap<String, String>>) -> ApiResult {
    counter!("digest_requests_total", "endpoint" => "ask").increment(1);
    let question = required(&q, "question")?;
    let text = generate(&state, question).await?;
    Ok(Json(InterpretedResponse::Answer { response: text }))
}

async fn summarize_posts(State(state): State<AppState>) -> ApiResult {
    summarize_feed(&state, PromptTemplate::Summarize).await
}

async fn summarize_daily(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> ApiResult {
    let n = sections_param(&q, state.config.daily_sections)?;
    summarize_feed(&state, PromptTemplate::DailySections(n)).await
}

async fn summarize_drama(State(state): State<AppState>) -> ApiResult {
    summarize_feed(&state, PromptTemplate::Drama).await
}

async fn extract_keywords(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> ApiResult {
    counter!("digest_requests_total", "endpoint" => "keywords").increment(1);
    let text = required(&q, "text")?;
    let reply = generate(&state, &PromptTemplate::Keywords.render(text)).await?;
    Ok(Json(interpret_keywords(&reply)))
}

async fn check_relevance(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> ApiResult {
    counter!("digest_requests_total", "endpoint" => "relevance").increment(1);
    let text = required(&q, "text")?;
    let reply = generate(&state, &PromptTemplate::Relevance.render(text)).await?;
    Ok(Json(interpret_relevance(text, &reply)?))
}

async fn check_opportunity(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> ApiResult {
    counter!("digest_requests_total", "endpoint" => "opportunity").increment(1);
    let text = required(&q, "text")?;
    let reply = generate(&state, &PromptTemplate::Opportunity.render(text)).await?;
    Ok(Json(interpret_opportunity(&reply)?))
}
