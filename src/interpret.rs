// src/interpret.rs
//! Turning completion text into caller-facing shapes.

use serde::Serialize;

/// Model text that does not fit the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unexpected model response: {reason}")]
pub struct InterpretationError {
    pub reason: String,
}

impl InterpretationError {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// JSON bodies returned on success. Each variant serializes to its own flat object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum InterpretedResponse {
    Summary { summary: String },
    Keywords { keywords: Vec<String> },
    Relevance { question: String, response: bool },
    Opportunity { is_opportunity: bool },
    Answer { response: String },
}

/// Comma-split, trimmed, empties dropped. Order and duplicates kept.
pub fn parse_keywords(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Substring heuristic over the lowercased, trimmed text.
///
/// `"true"` is checked before `"false"`, but text holding both (the model echoing
/// the instruction's example JSON, say) or neither is rejected instead of guessed.
pub fn parse_verdict(text: &str) -> Result<bool, InterpretationError> {
    let lowered = text.trim().to_lowercase();
    let has_true = lowered.contains("true");
    let has_false = lowered.contains("false");
    match (has_true, has_false) {
        (true, false) => Ok(true),
        (false, true) => Ok(false),
        (true, true) => Err(InterpretationError::new(
            "both \"true\" and \"false\" present",
        )),
        (false, false) => Err(InterpretationError::new(
            "neither \"true\" nor \"false\" present",
        )),
    }
}

pub fn interpret_summary(text: String) -> InterpretedResponse {
    InterpretedResponse::Summary { summary: text }
}

pub fn interpret_keywords(text: &str) -> InterpretedResponse {
    InterpretedResponse::Keywords {
        keywords: parse_keywords(text),
    }
}

pub fn interpret_relevance(
    question: &str,
    text: &str,
) -> Result<InterpretedResponse, InterpretationError> {
    Ok(InterpretedResponse::Relevance {
        question: question.to_string(),
        response: parse_verdict(text)?,
    })
}

pub fn interpret_opportunity(text: &str) -> Result<InterpretedResponse, InterpretationError> {
    Ok(InterpretedResponse::Opportunity {
        is_opportunity: parse_verdict(text)?,
    })
}
