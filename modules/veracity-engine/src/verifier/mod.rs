//! Deterministic multi-layer verification of a claim against its evidence.
//!
//! Six independent layers run over the same evidence set: source
//! credibility, entity matching, numerical agreement, word-overlap
//! alignment, explicit contradiction and temporal agreement. Their outputs
//! are combined into a consensus score that the arbiter uses to check the
//! language model's opinion.

mod contradiction;
mod entity;
mod numeric;
mod semantic;
mod temporal;

pub use contradiction::{Contradiction, ContradictionKind};
pub use entity::EntityDetails;
pub use numeric::{NumberConflict, NumberContradiction, NumberMatch, NumericalVerification};
pub use semantic::{SemanticAnalysis, SourceAlignment};
pub use temporal::TemporalVerification;

use serde::{Deserialize, Serialize};
use tracing::info;
use veracity_common::{EntityBundle, EvidenceSet};

use crate::credibility::source_credibility;

/// A source supports the claim when its alignment exceeds this.
pub const SUPPORT_ALIGNMENT: f64 = 0.6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub avg_source_credibility: f64,
    pub credibility_scores: Vec<f64>,
    pub entity_match_score: f64,
    pub entity_details: EntityDetails,
    pub numerical_verification: NumericalVerification,
    pub semantic_analysis: SemanticAnalysis,
    pub contradictions: Vec<Contradiction>,
    pub temporal_verification: TemporalVerification,
    pub supporting_sources: usize,
    pub contradicting_sources: usize,
    /// Sources neither supporting nor contradicting. Negative when several
    /// contradictions come from the same source.
    pub neutral_sources: i64,
    pub consensus_score: f64,
}

impl VerificationResult {
    pub fn has_contradictions(&self) -> bool {
        !self.contradictions.is_empty()
    }

    pub fn has_numerical_contradictions(&self) -> bool {
        !self.numerical_verification.contradictions.is_empty()
    }

    /// Indices of sources flagged as confirming the claim.
    pub fn confirming_sources(&self) -> impl Iterator<Item = usize> + '_ {
        self.semantic_analysis
            .source_alignments
            .iter()
            .filter(|a| a.has_confirmation)
            .map(|a| a.source_idx)
    }
}

/// Run every layer over `evidence` and compute consensus.
pub fn verify(
    claim: &str,
    evidence: &EvidenceSet,
    entities: &EntityBundle,
    category: Option<&str>,
) -> VerificationResult {
    let credibility_scores: Vec<f64> = evidence.iter().map(source_credibility).collect();
    let avg_source_credibility = if credibility_scores.is_empty() {
        0.5
    } else {
        credibility_scores.iter().sum::<f64>() / credibility_scores.len() as f64
    };

    let (entity_match_score, entity_details) = entity::match_entities(claim, entities, evidence);
    let numerical_verification = numeric::verify(claim, evidence);
    let semantic_analysis = semantic::analyze(claim, evidence);
    let contradictions = contradiction::detect(claim, evidence);
    let temporal_verification = temporal::verify(claim, evidence);

    let total = evidence.len();
    let supporting_sources = semantic_analysis
        .source_alignments
        .iter()
        .filter(|a| a.alignment > SUPPORT_ALIGNMENT)
        .count();
    let contradicting_sources = contradictions.len();
    let neutral_sources = total as i64 - supporting_sources as i64 - contradicting_sources as i64;
    let consensus_score = if total == 0 {
        0.0
    } else {
        supporting_sources as f64 / total as f64
    };

    info!(
        category = category.unwrap_or("all"),
        sources = total,
        credibility = avg_source_credibility,
        entity_match = entity_match_score,
        supporting = supporting_sources,
        contradicting = contradicting_sources,
        consensus = consensus_score,
        "Verification complete"
    );

    VerificationResult {
        avg_source_credibility,
        credibility_scores,
        entity_match_score,
        entity_details,
        numerical_verification,
        semantic_analysis,
        contradictions,
        temporal_verification,
        supporting_sources,
        contradicting_sources,
        neutral_sources,
        consensus_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::evidence;

    const CLAIM: &str = "Central bank raised interest rates";

    #[test]
    fn consensus_counts_aligned_sources() {
        let set = evidence(&[
            ("https://a.com", "", "The central bank raised interest rates today."),
            ("https://b.com", "", "Football results from the weekend."),
        ]);
        let result = verify(CLAIM, &set, &EntityBundle::default(), None);
        assert_eq!(result.supporting_sources, 1);
        assert_eq!(result.contradicting_sources, 0);
        assert_eq!(result.neutral_sources, 1);
        assert!((result.consensus_score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn consensus_ignores_source_order() {
        let rows = [
            ("https://a.com", "", "The central bank raised interest rates today."),
            ("https://b.com", "", "Football results from the weekend."),
            ("https://c.com", "", "Interest rates were raised by the central bank."),
        ];
        let mut reversed = rows;
        reversed.reverse();

        let forward = verify(CLAIM, &evidence(&rows), &EntityBundle::default(), None);
        let backward = verify(CLAIM, &evidence(&reversed), &EntityBundle::default(), None);
        assert_eq!(forward.consensus_score, backward.consensus_score);
        assert_eq!(forward.supporting_sources, 2);
    }

    #[test]
    fn replacing_aligned_source_lowers_consensus() {
        let aligned = evidence(&[
            ("https://a.com", "", "The central bank raised interest rates today."),
            ("https://b.com", "", "Central bank raised interest rates again."),
        ]);
        let replaced = evidence(&[
            ("https://a.com", "", "The central bank raised interest rates today."),
            ("https://b.com", "", "Weather forecast for the week."),
        ]);
        let before = verify(CLAIM, &aligned, &EntityBundle::default(), None);
        let after = verify(CLAIM, &replaced, &EntityBundle::default(), None);
        assert!(after.consensus_score < before.consensus_score);
    }

    #[test]
    fn neutral_goes_negative_with_many_contradictions() {
        let set = evidence(&[
            (
                "https://a.com",
                "",
                "paris is the capital of fashion. the mayor is alive and living well.",
            ),
            ("https://b.com", "", "the mayor is alive, officials said."),
        ]);
        let result = verify("The mayor of Paris died", &set, &EntityBundle::default(), None);
        assert_eq!(result.contradicting_sources, 2);
        assert_eq!(result.supporting_sources, 1);
        assert_eq!(result.neutral_sources, -1);
    }

    #[test]
    fn credibility_defaults_to_half_when_empty() {
        let result = verify(CLAIM, &EvidenceSet::default(), &EntityBundle::default(), None);
        assert_eq!(result.avg_source_credibility, 0.5);
        assert_eq!(result.consensus_score, 0.0);
        assert_eq!(result.neutral_sources, 0);
    }
}
