//! Lexical retrieval shared by the capability adapters.
//!
//! Documents are scored with a saturated term frequency weighted by inverse document
//! frequency (BM25 without length normalization). Ties keep ingestion order.

use crate::corpus::Document;
use std::collections::HashSet;

const TERM_SATURATION: f32 = 1.2;

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "did", "do", "does", "for", "from", "how",
    "in", "is", "it", "of", "on", "or", "the", "to", "was", "what", "when", "where", "which",
    "who", "whom", "why", "with",
];

/// A document selected for answer extraction.
#[derive(Debug, Clone, Copy)]
pub struct Retrieved<'a> {
    /// Selected document.
    pub document: &'a Document,
    /// Retrieval score; zero when the document was selected only as a fallback.
    pub score: f32,
}

/// Lowercased alphanumeric terms of `text`, with stop words removed.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .filter(|token| !STOP_WORDS.contains(&token.as_str()))
        .collect()
}

/// Distinct query terms in first-seen order.
pub fn query_terms(query: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    tokenize(query)
        .into_iter()
        .filter(|term| seen.insert(term.clone()))
        .collect()
}

/// Select up to `top_k` documents relevant to `query`.
///
/// Documents sharing no term with the query are only returned when nothing matches at all,
/// in which case the first `top_k` documents are returned with a zero score.
pub fn retrieve<'a>(corpus: &'a [Document], query: &str, top_k: usize) -> Vec<Retrieved<'a>> {
    if corpus.is_empty() || top_k == 0 {
        return Vec::new();
    }

    let terms = query_terms(query);
    let tokenized: Vec<Vec<String>> = corpus.iter().map(|doc| tokenize(&doc.content)).collect();
    let total = corpus.len() as f32;

    let idf: Vec<f32> = terms
        .iter()
        .map(|term| {
            let df = tokenized
                .iter()
                .filter(|tokens| tokens.iter().any(|token| token == term))
                .count() as f32;
            (1.0 + (total - df + 0.5) / (df + 0.5)).ln()
        })
        .collect();

    let mut scored: Vec<(usize, f32)> = tokenized
        .iter()
        .enumerate()
        .map(|(index, tokens)| {
            let score = terms
                .iter()
                .zip(&idf)
                .map(|(term, weight)| {
                    let tf = tokens.iter().filter(|token| *token == term).count() as f32;
                    weight * tf * (TERM_SATURATION + 1.0) / (tf + TERM_SATURATION)
                })
                .sum::<f32>();
            (index, score)
        })
        .filter(|(_, score)| *score > 0.0)
        .collect();

    if scored.is_empty() {
        return corpus
            .iter()
            .take(top_k)
            .map(|document| Retrieved {
                document,
                score: 0.0,
            })
            .collect();
    }

    // Stable sort keeps ingestion order for equal scores.
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored
        .into_iter()
        .take(top_k)
        .map(|(index, score)| Retrieved {
            document: &corpus[index],
            score,
        })
        .collect()
}
