// src/llm/mod.rs
//! Completion backend abstraction: one prompt in, first candidate's text (or nothing) out.

pub mod gemini;

use std::sync::{Arc, Mutex};
use std::time::Instant;

use async_trait::async_trait;
use metrics::{counter, histogram};

pub use gemini::GeminiClient;

/// Outcome of a single successful backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionResult {
    Text(String),
    /// The backend answered, but without a usable candidate.
    NoContent,
}

/// Single-turn completion client. Implementations make exactly one backend call
/// per `complete` and never retry. Backend failures (auth, quota, transport)
/// are `Err`, distinct from `Ok(NoContent)`.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> anyhow::Result<CompletionResult>;
    fn provider_name(&self) -> &'static str;
}

pub type DynCompletionClient = Arc<dyn CompletionClient>;

/// `complete` plus latency/outcome telemetry. Never logs the prompt itself.
pub async fn complete_observed(
    client: &dyn CompletionClient,
    prompt: &str,
) -> anyhow::Result<CompletionResult> {
    let provider = client.provider_name();
    counter!("digest_completion_calls_total", "provider" => provider).increment(1);

    let t0 = Instant::now();
    let out = client.complete(prompt).await;
    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("digest_completion_ms").record(ms);

    match &out {
        Ok(CompletionResult::Text(t)) => {
            tracing::info!(provider, prompt_len = prompt.len(), reply_len = t.len(), ms, "completion ok");
        }
        Ok(CompletionResult::NoContent) => {
            counter!("digest_no_content_total").increment(1);
            tracing::warn!(provider, prompt_len = prompt.len(), ms, "completion returned no content");
        }
        Err(e) => {
            tracing::warn!(provider, error = %e, ms, "completion backend error");
        }
    }
    out
}

/// What a `ScriptedClient` answers with.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Text(String),
    NoContent,
    Fail(String),
}

/// Deterministic client for tests/local runs: fixed reply, remembers every prompt.
pub struct ScriptedClient {
    reply: ScriptedReply,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedClient {
    pub fn new(reply: ScriptedReply) -> Self {
        Self {
            reply,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn text(reply: impl Into<String>) -> Self {
        Self::new(ScriptedReply::Text(reply.into()))
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts().len()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, prompt: &str) -> anyhow::Result<CompletionResult> {
        self.prompts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(prompt.to_string());
        match &self.reply {
            ScriptedReply::Text(t) => Ok(CompletionResult::Text(t.clone())),
            ScriptedReply::NoContent => Ok(CompletionResult::NoContent),
            ScriptedReply::Fail(msg) => Err(anyhow::anyhow!("{msg}")),
        }
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}
