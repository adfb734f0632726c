use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use veracity_common::EvidenceSet;

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w+\b").expect("valid regex"));

const STOP_WORDS: &[&str] = &[
    "the", "is", "at", "which", "on", "a", "an", "and", "or", "but", "in", "with", "to", "of", "for",
];
const CONFIRMATION_PHRASES: &[&str] = &["confirmed", "verified", "announced", "official", "according to"];
const DENIAL_PHRASES: &[&str] = &["false", "fake", "hoax", "denied", "debunked", "not true"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SemanticAnalysis {
    pub avg_alignment: f64,
    pub source_alignments: Vec<SourceAlignment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceAlignment {
    pub source_idx: usize,
    /// Share of the claim's content words present in the source.
    pub alignment: f64,
    pub has_confirmation: bool,
    pub has_denial: bool,
}

fn content_words(text: &str) -> HashSet<&str> {
    WORD_RE
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|w| !STOP_WORDS.contains(w))
        .collect()
}

/// Word-overlap alignment of each source with the claim.
pub(super) fn analyze(claim: &str, evidence: &EvidenceSet) -> SemanticAnalysis {
    let claim_lower = claim.to_lowercase();
    let claim_words = content_words(&claim_lower);

    let source_alignments: Vec<SourceAlignment> = evidence
        .iter()
        .enumerate()
        .map(|(source_idx, source)| {
            let text = source.searchable_text();
            let source_words = content_words(&text);
            let overlap = claim_words.intersection(&source_words).count();
            let alignment = if claim_words.is_empty() {
                0.0
            } else {
                overlap as f64 / claim_words.len() as f64
            };
            SourceAlignment {
                source_idx,
                alignment,
                has_confirmation: CONFIRMATION_PHRASES.iter().any(|p| text.contains(p)),
                has_denial: DENIAL_PHRASES.iter().any(|p| text.contains(p)),
            }
        })
        .collect();

    let avg_alignment = if source_alignments.is_empty() {
        0.0
    } else {
        source_alignments.iter().map(|a| a.alignment).sum::<f64>() / source_alignments.len() as f64
    };

    SemanticAnalysis {
        avg_alignment,
        source_alignments,
    }
}
