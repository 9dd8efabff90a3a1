//! Deterministic leading-sentence summaries.

use async_trait::async_trait;

use super::{SummarizationClient, SummarizationClientError, SummarizationRequest, limit_words};

/// Summarizer that keeps whole leading sentences until the lower word bound is met.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExtractiveSummarizer;

impl ExtractiveSummarizer {
    /// Construct the summarizer.
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SummarizationClient for ExtractiveSummarizer {
    async fn generate_summary(
        &self,
        request: SummarizationRequest,
    ) -> Result<String, SummarizationClientError> {
        let summary = build_extractive_summary(&request.text, request.min_words, request.max_words);
        if summary.is_empty() {
            return Err(SummarizationClientError::GenerationFailed(
                "input contains no words".into(),
            ));
        }
        Ok(summary)
    }
}

/// Accumulate sentences until at least `min_words` are collected, never exceeding `max_words`.
fn build_extractive_summary(text: &str, min_words: usize, max_words: usize) -> String {
    let mut summary: Vec<&str> = Vec::new();

    for sentence in sentences(text) {
        let words: Vec<&str> = sentence.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }
        if !summary.is_empty() && summary.len() + words.len() > max_words {
            break;
        }
        summary.extend(words);
        if summary.len() >= min_words {
            break;
        }
    }

    limit_words(&summary.join(" "), max_words)
}

/// Split on sentence terminators, keeping the terminator with its sentence.
fn sentences(text: &str) -> impl Iterator<Item = &str> {
    text.split_inclusive(['.', '!', '?'])
        .map(str::trim)
        .filter(|sentence| !sentence.is_empty())
}
