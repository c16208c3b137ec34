// src/llm/gemini.rs
//! Gemini `generateContent` client (non-streaming, single user turn).

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{CompletionClient, CompletionResult};

pub const API_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

impl GenerateContentRequest {
    /// One user turn carrying the prompt as its only part.
    pub fn single_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
                role: Some(Role::User),
            }],
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidates: Option<Vec<GenerateContentCandidate>>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentCandidate {
    /// Absent when the candidate was blocked (safety, recitation...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// Only text parts matter here; other part kinds deserialize with `text: None`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    User,
    Model,
}

/// First part of the first candidate, if it has any text.
pub fn first_candidate_text(resp: &GenerateContentResponse) -> CompletionResult {
    resp.candidates
        .as_deref()
        .and_then(|c| c.first())
        .and_then(|c| c.content.as_ref())
        .and_then(|c| c.parts.first())
        .and_then(|p| p.text.as_deref())
        .filter(|t| !t.is_empty())
        .map(|t| CompletionResult::Text(t.to_string()))
        .unwrap_or(CompletionResult::NoContent)
}

pub struct GeminiClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_url: &str, api_key: &str, model: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("bluesky-digest/0.1")
            .build()
            .context("building gemini http client")?;
        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key: api_key.trim().to_string(),
            model: model.to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_url, self.model
        )
    }
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<CompletionResult> {
        let req = GenerateContentRequest::single_prompt(prompt);
        let resp = self
            .http
            .post(self.endpoint())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&req)
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("gemini generateContent request")?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!(
                "error during generateContent, status code: {}, body: {}",
                status.as_u16(),
                text
            );
        }

        let body: GenerateContentResponse = resp
            .json()
            .await
            .map_err(reqwest::Error::without_url)
            .context("decoding gemini generateContent response")?;
        Ok(first_candidate_text(&body))
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode, Uri};
    use axum::response::{IntoResponse, Response};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    fn parse(v: Value) -> GenerateContentResponse {
        serde_json::from_value(v).expect("response json")
    }

    #[test]
    fn request_is_single_user_turn() {
        let v = serde_json::to_value(GenerateContentRequest::single_prompt("hi")).unwrap();
        assert_eq!(
            v,
            json!({ "contents": [ { "parts": [ { "text": "hi" } ], "role": "user" } ] })
        );
    }

    #[test]
    fn extracts_first_part_of_first_candidate() {
        let r = parse(json!({
            "candidates": [
                { "content": { "parts": [ { "text": "first" }, { "text": "second" } ], "role": "model" } },
                { "content": { "parts": [ { "text": "other" } ], "role": "model" } }
            ]
        }));
        assert_eq!(first_candidate_text(&r), CompletionResult::Text("first".into()));
    }

    #[test]
    fn missing_or_empty_candidates_mean_no_content() {
        assert_eq!(first_candidate_text(&parse(json!({}))), CompletionResult::NoContent);
        assert_eq!(
            first_candidate_text(&parse(json!({ "candidates": [] }))),
            CompletionResult::NoContent
        );
        assert_eq!(
            first_candidate_text(&parse(json!({ "candidates": [ { "finishReason": "SAFETY" } ] }))),
            CompletionResult::NoContent
        );
        assert_eq!(
            first_candidate_text(&parse(json!({ "candidates": [ { "content": { "parts": [], "role": "model" } } ] }))),
            CompletionResult::NoContent
        );
        assert_eq!(
            first_candidate_text(&parse(json!({ "candidates": [ { "content": { "parts": [ { "text": "" } ] } } ] }))),
            CompletionResult::NoContent
        );
    }

    #[derive(Clone, Default)]
    struct Seen {
        calls: Arc<Mutex<Vec<(String, Option<String>, Value)>>>,
    }

    async fn fake_gemini(
        State(seen): State<Seen>,
        uri: Uri,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> Response {
        let key = headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        seen.calls
            .lock()
            .unwrap()
            .push((uri.to_string(), key.clone(), body));
        if key.as_deref() != Some("good-key") {
            return (StatusCode::FORBIDDEN, "API key not valid").into_response();
        }
        Json(json!({
            "candidates": [ { "content": { "parts": [ { "text": "model says hi" } ], "role": "model" } } ]
        }))
        .into_response()
    }

    async fn spawn_fake_gemini() -> (String, Seen, tokio::task::JoinHandle<()>) {
        let seen = Seen::default();
        let app = Router::new().fallback(fake_gemini).with_state(seen.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("listener should bind");
        let address = listener.local_addr().expect("local addr should exist");
        let join_handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("server should run");
        });
        (format!("http://{address}/"), seen, join_handle)
    }

    #[tokio::test]
    async fn client_posts_prompt_once_and_reads_text() {
        let (base, seen, server_task) = spawn_fake_gemini().await;
        let client = GeminiClient::new(&base, " good-key ", "gemini-test").unwrap();

        let out = client.complete("summarize this").await.unwrap();
        assert_eq!(out, CompletionResult::Text("model says hi".into()));

        let calls = seen.calls.lock().unwrap().clone();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "/v1beta/models/gemini-test:generateContent");
        assert!(!calls[0].0.contains("key="), "key must not travel in the url");
        assert_eq!(calls[0].1.as_deref(), Some("good-key"));
        assert_eq!(calls[0].2["contents"][0]["parts"][0]["text"], "summarize this");

        server_task.abort();
    }

    #[tokio::test]
    async fn backend_rejection_is_an_error_with_status() {
        let (base, seen, server_task) = spawn_fake_gemini().await;
        let client = GeminiClient::new(&base, "bad-key", DEFAULT_MODEL).unwrap();

        let err = client.complete("p").await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("403"), "got: {msg}");
        assert!(msg.contains("API key not valid"));
        // no retry
        assert_eq!(seen.calls.lock().unwrap().len(), 1);

        server_task.abort();
    }

    #[tokio::test]
    async fn transport_error_does_not_mention_the_key() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap();
        drop(listener);

        let client =
            GeminiClient::new(&format!("http://{address}"), "SECRET-KEY-123", "m").unwrap();
        let err = client.complete("p").await.unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("gemini generateContent request"), "got: {msg}");
        assert!(!msg.contains("SECRET-KEY-123"), "got: {msg}");
    }
}
