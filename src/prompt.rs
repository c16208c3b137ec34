// src/prompt.rs
//! Instruction templates. Each template is a pure function of the subject text;
//! the subject always goes last, after a colon-delimited or quoted section marker.

/// Upper bound for the sectioned daily digest.
pub const MAX_SECTIONS: usize = 10;
pub const DEFAULT_SECTIONS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptTemplate {
    /// Newspaper-style summary of the whole corpus.
    Summarize,
    /// Daily digest split into N titled sections.
    DailySections(usize),
    /// Controversies and heated discussions only.
    Drama,
    /// Comma-separated keyword list for a single text.
    Keywords,
    /// Is this text relevant for the dev community? JSON boolean.
    Relevance,
    /// Is this text a job/business opportunity? JSON boolean.
    Opportunity,
}

impl PromptTemplate {
    pub fn name(&self) -> &'static str {
        match self {
            PromptTemplate::Summarize => "summarize",
            PromptTemplate::DailySections(_) => "summarize_daily",
            PromptTemplate::Drama => "summarize_drama",
            PromptTemplate::Keywords => "keywords",
            PromptTemplate::Relevance => "relevance",
            PromptTemplate::Opportunity => "opportunity",
        }
    }

    /// Build the full prompt. `subject` is interpolated verbatim, never trimmed or capped.
    pub fn render(&self, subject: &str) -> String {
        match self {
            PromptTemplate::Summarize => format!(
                "Write a newspaper-style summary of the most talked-about topics in these \
                 Bluesky posts from the developer community. Turn the content into a single, \
                 continuous and engaging text:\n\n{subject}"
            ),
            PromptTemplate::DailySections(n) => {
                let n = (*n).clamp(1, MAX_SECTIONS);
                let sections = if n == 1 {
                    "1 section".to_string()
                } else {
                    format!("{n} sections")
                };
                format!(
                    "Write today's digest of the developer community on Bluesky based on the \
                     posts below. Organize it into exactly {sections}, each with a short title \
                     followed by one paragraph, ordered from the most to the least discussed \
                     topic. Keep the tone of a daily newsletter:\n\n{subject}"
                )
            }
            PromptTemplate::Drama => format!(
                "Read the Bluesky posts below and write a lively summary of the drama of the \
                 day: disagreements, controversies and heated discussions in the developer \
                 community. Mention who said what when it matters. If there is no drama, say \
                 so briefly:\n\n{subject}"
            ),
            PromptTemplate::Keywords => format!(
                "Extract the main technical keywords (languages, frameworks, tools, concepts) \
                 from the text below. Answer only with the keywords separated by commas, with \
                 no numbering and no extra text.\n\nText: \"{subject}\""
            ),
            PromptTemplate::Relevance => format!(
                "Decide whether the following post is relevant to software developers \
                 (programming, tooling, careers in tech). Answer only with JSON in the format \
                 {{\"is_relevant\": true}} or {{\"is_relevant\": false}}.\n\nPost: \"{subject}\""
            ),
            PromptTemplate::Opportunity => format!(
                "Decide whether the following post announces an opportunity for developers \
                 (job opening, freelance gig, internship, call for speakers or similar). Answer \
                 only with JSON in the format {{\"is_opportunity\": true}} or \
                 {{\"is_opportunity\": false}}.\n\nPost: \"{subject}\""
            ),
        }
    }
}
