use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use veracity_common::EvidenceSet;

/// Numbers with an optional magnitude word or percent sign.
static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$?\d+(?:\.\d+)?\s*(?:trillion|billion|million|thousand|crore|lakh|%)?")
        .expect("valid regex")
});

const NUMBERS_RECORDED: usize = 3;
const CONFLICTS_PER_CLAIM: usize = 2;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericalVerification {
    pub has_numerical_claims: bool,
    pub claims: Vec<String>,
    pub matches: Vec<NumberMatch>,
    pub contradictions: Vec<NumberContradiction>,
    pub verification_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberMatch {
    pub claimed: String,
    pub confirmed_by: usize,
    pub total_sources: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberContradiction {
    pub claimed: String,
    pub contradicting_sources: Vec<NumberConflict>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberConflict {
    pub source_idx: usize,
    pub found_numbers: Vec<String>,
}

fn numbers_in(text: &str) -> Vec<String> {
    NUMBER_RE
        .find_iter(text)
        .map(|m| m.as_str().trim().to_string())
        .collect()
}

/// Check each quantity in the claim against every source. A source that
/// lacks the claimed quantity but states some other number is a candidate
/// contradiction.
pub(super) fn verify(claim: &str, evidence: &EvidenceSet) -> NumericalVerification {
    let claims = numbers_in(&claim.to_lowercase());
    if claims.is_empty() {
        return NumericalVerification::default();
    }

    let contents: Vec<String> = evidence.iter().map(|s| s.full_content.to_lowercase()).collect();

    let mut matches = Vec::with_capacity(claims.len());
    let mut contradictions = Vec::new();

    for claimed in &claims {
        let mut confirmed_by = 0;
        let mut conflicts = Vec::new();

        for (idx, content) in contents.iter().enumerate() {
            if content.contains(claimed.as_str()) {
                confirmed_by += 1;
                continue;
            }
            let found = numbers_in(content);
            if !found.is_empty() {
                conflicts.push(NumberConflict {
                    source_idx: idx,
                    found_numbers: found.into_iter().take(NUMBERS_RECORDED).collect(),
                });
            }
        }

        matches.push(NumberMatch {
            claimed: claimed.clone(),
            confirmed_by,
            total_sources: contents.len(),
        });

        if !conflicts.is_empty() {
            conflicts.truncate(CONFLICTS_PER_CLAIM);
            contradictions.push(NumberContradiction {
                claimed: claimed.clone(),
                contradicting_sources: conflicts,
            });
        }
    }

    let confirmations: usize = matches.iter().map(|m| m.confirmed_by).sum();
    let checks = matches.len() * contents.len();
    let verification_score = if checks > 0 {
        confirmations as f64 / checks as f64
    } else {
        0.0
    };

    NumericalVerification {
        has_numerical_claims: true,
        claims,
        matches,
        contradictions,
        verification_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::evidence;

    #[test]
    fn inactive_without_numbers() {
        let set = evidence(&[("https://a.com", "", "Rates rose 5% today")]);
        let result = verify("Rates rose sharply", &set);
        assert!(!result.has_numerical_claims);
        assert!(result.matches.is_empty());
    }

    #[test]
    fn counts_confirmations_and_conflicts() {
        let set = evidence(&[
            ("https://a.com", "", "The firm raised $2 billion in new funding."),
            ("https://b.com", "", "The firm raised $5 billion, filings show, in 2023."),
            ("https://c.com", "", "No figures were disclosed."),
        ]);
        let result = verify("Company X raised $2 billion", &set);

        assert!(result.has_numerical_claims);
        assert_eq!(result.claims, vec!["$2 billion"]);
        assert_eq!(result.matches[0].confirmed_by, 1);
        assert_eq!(result.matches[0].total_sources, 3);
        assert_eq!(result.contradictions.len(), 1);

        let conflict = &result.contradictions[0].contradicting_sources[0];
        assert_eq!(conflict.source_idx, 1);
        assert_eq!(conflict.found_numbers, vec!["$5 billion", "2023"]);
        assert!((result.verification_score - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn conflicts_capped_per_claim() {
        let set = evidence(&[
            ("https://a.com", "", "It cost 7 million."),
            ("https://b.com", "", "It cost 8 million."),
            ("https://c.com", "", "It cost 9 million."),
        ]);
        let result = verify("It cost 6 million", &set);
        assert_eq!(result.contradictions[0].contradicting_sources.len(), 2);
        assert_eq!(result.verification_score, 0.0);
    }
}
