//! Local extractive reader.
//!
//! Retrieved documents are split into sentences; each sentence is scored by the share of
//! distinct query terms it contains, with the document's retrieval score as a tie breaker.
//! Sentences that contain no query term are never returned.

use super::retriever::{query_terms, retrieve, tokenize};
use super::{AnswerCandidate, CapabilityError, QaCapability};
use crate::corpus::Document;
use async_trait::async_trait;
use std::collections::HashSet;

const RETRIEVAL_WEIGHT: f32 = 0.01;

/// Deterministic span extractor that needs no external service.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExtractiveCapability;

impl ExtractiveCapability {
    /// Construct a new reader.
    pub const fn new() -> Self {
        Self
    }

    fn extract(
        corpus: &[Document],
        query: &str,
        top_k_retrieve: usize,
        top_k_read: usize,
    ) -> Vec<AnswerCandidate> {
        let terms = query_terms(query);
        if terms.is_empty() {
            return Vec::new();
        }

        let mut candidates: Vec<AnswerCandidate> = Vec::new();
        let mut seen = HashSet::new();
        for hit in retrieve(corpus, query, top_k_retrieve) {
            for sentence in split_sentences(&hit.document.content) {
                let tokens: HashSet<String> = tokenize(sentence).into_iter().collect();
                let matched = terms.iter().filter(|term| tokens.contains(*term)).count();
                if matched == 0 || !seen.insert(sentence.to_string()) {
                    continue;
                }
                let coverage = matched as f32 / terms.len() as f32;
                candidates.push(AnswerCandidate {
                    text: sentence.to_string(),
                    score: coverage + RETRIEVAL_WEIGHT * hit.score,
                    source: Some(hit.document.source.clone()),
                });
            }
        }

        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        candidates.truncate(top_k_read);
        candidates
    }
}

#[async_trait]
impl QaCapability for ExtractiveCapability {
    async fn query(
        &self,
        corpus: &[Document],
        query: &str,
        top_k_retrieve: usize,
        top_k_read: usize,
    ) -> Result<Vec<AnswerCandidate>, CapabilityError> {
        let candidates = Self::extract(corpus, query, top_k_retrieve, top_k_read);
        tracing::debug!(
            corpus = corpus.len(),
            candidates = candidates.len(),
            "Extractive reader finished"
        );
        Ok(candidates)
    }
}

/// Split text on sentence terminators and line breaks, trimming each piece.
fn split_sentences(text: &str) -> impl Iterator<Item = &str> {
    text.split_inclusive(['.', '!', '?', '\n'])
        .map(str::trim)
        .filter(|sentence| sentence.chars().any(char::is_alphanumeric))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn picks_sentence_with_most_query_terms() {
        let corpus = vec![
            Document::new(
                "The alumni office keeps records. Jane Doe graduated in 2015. John left in 2014.",
                "alumni.pdf",
            ),
            Document::new("Graduation ceremonies happen every June.", "events.pdf"),
        ];

        let answers = ExtractiveCapability::new()
            .query(&corpus, "Who graduated in 2015?", 3, 3)
            .await
            .expect("answers");

        assert_eq!(answers[0].text, "Jane Doe graduated in 2015.");
        assert_eq!(answers[0].source.as_deref().and_then(|p| p.to_str()), Some("alumni.pdf"));
        assert!(answers.len() <= 3);
    }

    #[tokio::test]
    async fn empty_corpus_has_no_candidates() {
        let answers = ExtractiveCapability::new()
            .query(&[], "anything", 3, 3)
            .await
            .expect("answers");
        assert!(answers.is_empty());
    }

    #[tokio::test]
    async fn unrelated_text_has_no_candidates() {
        let corpus = vec![Document::new("Completely unrelated content.", "x.pdf")];
        let answers = ExtractiveCapability::new()
            .query(&corpus, "graduation year", 3, 3)
            .await
            .expect("answers");
        assert!(answers.is_empty());
    }

    #[tokio::test]
    async fn read_breadth_limits_candidates() {
        let corpus = vec![Document::new("alpha one. alpha two. alpha three. alpha four.", "a.pdf")];
        let answers = ExtractiveCapability::new()
            .query(&corpus, "alpha", 3, 2)
            .await
            .expect("answers");
        assert_eq!(answers.len(), 2);
        assert_eq!(answers[0].text, "alpha one.");
    }

    #[test]
    fn sentences_split_on_terminators_and_newlines() {
        let pieces: Vec<&str> = split_sentences("One. Two?\nThree!  \n ... ").collect();
        assert_eq!(pieces, vec!["One.", "Two?", "Three!"]);
    }
}
