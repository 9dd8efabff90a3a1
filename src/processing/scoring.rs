//! Similarity scoring and plagiarism aggregation.

use serde::Serialize;

/// Similarity a chunk/snippet pair must exceed to count as a match.
pub const SIMILARITY_THRESHOLD: f32 = 0.7;
/// Percentage points added per match.
pub const MATCH_INCREMENT: u32 = 10;
/// Upper bound on the reported plagiarism percentage.
pub const MAX_PERCENT: u32 = 100;
/// Characters of the snippet kept in a match.
pub const SNIPPET_LIMIT: usize = 200;

/// A search result whose snippet is semantically close to a document chunk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    /// URL of the matching source, when the provider supplied one.
    pub source: Option<String>,
    /// Cosine similarity scaled to a percentage and rounded to two decimals.
    pub similarity: f64,
    /// Leading characters of the matching snippet.
    pub snippet: String,
}

impl Match {
    /// Build a match if `similarity` clears the threshold.
    pub fn evaluate(source: Option<String>, snippet: &str, similarity: f32) -> Option<Self> {
        if similarity <= SIMILARITY_THRESHOLD {
            return None;
        }
        Some(Self {
            source,
            similarity: to_percentage(similarity),
            snippet: snippet.chars().take(SNIPPET_LIMIT).collect(),
        })
    }
}

/// Running plagiarism score for one document.
#[derive(Debug, Default, Clone)]
pub struct PlagiarismTally {
    matches: Vec<Match>,
}

impl PlagiarismTally {
    /// Start an empty tally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a match, preserving insertion order.
    pub fn record(&mut self, found: Match) {
        self.matches.push(found);
    }

    /// `min(10 × matches, 100)`.
    pub fn percent(&self) -> u32 {
        let raw = u32::try_from(self.matches.len())
            .unwrap_or(u32::MAX)
            .saturating_mul(MATCH_INCREMENT);
        raw.min(MAX_PERCENT)
    }

    /// Matches recorded so far.
    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    /// Consume the tally, returning the percentage and the matches.
    pub fn finish(self) -> (u32, Vec<Match>) {
        (self.percent(), self.matches)
    }
}

/// Cosine similarity in `[-1, 1]`; zero vectors and mismatched lengths score `0`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        (dot_product / (norm_a * norm_b)).clamp(-1.0, 1.0)
    }
}

fn to_percentage(similarity: f32) -> f64 {
    (f64::from(similarity) * 100.0 * 100.0).round() / 100.0
}
