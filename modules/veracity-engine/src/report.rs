use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use veracity_common::{EntityBundle, EvidenceSet, Label, Source, Verdict};

use crate::arbiter::{DecisionBasis, Override};
use crate::extraction::clip;
use crate::verifier::VerificationResult;

/// Sources at or above this credibility count as trusted.
pub const TRUSTED_CREDIBILITY: f64 = 0.8;

const SNIPPET_CHARS: usize = 300;
const EVIDENCE_CONTENT_CHARS: usize = 5000;
const EXCERPT_CHARS: usize = 200;

/// Everything returned for one classified claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub request_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub label: Label,
    pub confidence: f64,
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_translated: Option<String>,
    pub category: String,
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
    pub sources: Vec<String>,
    pub total_sources_checked: usize,
    pub trusted_sources: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources_found: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entities_extracted: Option<EntityBundle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_layers: Option<VerificationResult>,
    pub web_evidence: Vec<WebEvidence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_analysis: Option<SourceAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_quality: Option<VerificationQuality>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision_basis: Option<DecisionBasis>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overrides_applied: Vec<Override>,
    pub processing_time_secs: f64,
}

impl ClassificationReport {
    /// Report carrying only a verdict; the pipeline fills in the rest.
    pub fn new(request_id: Uuid, verdict: Verdict, category: &str, language: &str) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
            label: verdict.label,
            confidence: verdict.confidence,
            explanation: verdict.explanation,
            label_translated: None,
            category: category.to_string(),
            language: language.to_string(),
            model_used: None,
            sources: Vec::new(),
            total_sources_checked: 0,
            trusted_sources: 0,
            sources_found: None,
            search_error: None,
            entities_extracted: None,
            verification_layers: None,
            web_evidence: Vec::new(),
            source_analysis: None,
            verification_quality: None,
            decision_basis: None,
            overrides_applied: Vec::new(),
            processing_time_secs: 0.0,
        }
    }

    /// Attach the evidence digest: source URLs, counts and per-source entries.
    pub fn with_evidence(mut self, evidence: &EvidenceSet) -> Self {
        self.sources = evidence.urls();
        self.total_sources_checked = evidence.len();
        self.trusted_sources = evidence
            .iter()
            .filter(|s| s.credibility >= TRUSTED_CREDIBILITY)
            .count();
        self.web_evidence = evidence
            .iter()
            .enumerate()
            .map(|(idx, s)| WebEvidence::from_source(idx + 1, s))
            .collect();
        self
    }
}

// --- Web evidence ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebEvidence {
    pub source_number: usize,
    pub title: String,
    pub snippet: String,
    pub full_content: String,
    pub url: String,
    pub domain: String,
    pub trusted: bool,
    pub credibility_score: f64,
    pub content_length: usize,
}

impl WebEvidence {
    fn from_source(source_number: usize, source: &Source) -> Self {
        Self {
            source_number,
            title: if source.title.is_empty() {
                "No Title".to_string()
            } else {
                source.title.clone()
            },
            snippet: clip(&source.snippet, SNIPPET_CHARS).to_string(),
            full_content: clip(&source.full_content, EVIDENCE_CONTENT_CHARS).to_string(),
            url: source.url.clone(),
            domain: source.domain.clone(),
            trusted: source.credibility >= TRUSTED_CREDIBILITY,
            credibility_score: source.credibility,
            content_length: source.full_content.chars().count(),
        }
    }
}

// --- Source analysis ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceAnalysis {
    pub contradictions: Vec<ContradictionEvidence>,
    pub confirmations: Vec<ConfirmationEvidence>,
    pub supporting_sources: usize,
    pub contradicting_sources: usize,
    pub neutral_sources: i64,
    pub claims_extracted: ClaimsExtracted,
    pub consensus_ratio: f64,
}

/// A contradiction with an excerpt of the source it came from. `source` is
/// 1-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContradictionEvidence {
    pub source: usize,
    #[serde(rename = "type")]
    pub kind: String,
    pub claimed: String,
    pub found: String,
    pub evidence: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmationEvidence {
    pub source: usize,
    #[serde(rename = "type")]
    pub kind: String,
    pub evidence: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimsExtracted {
    pub numerical_claims: Vec<String>,
    pub entities: Vec<String>,
    pub temporal_claims: Vec<String>,
}

impl SourceAnalysis {
    pub fn build(
        evidence: &EvidenceSet,
        verification: &VerificationResult,
        entities: &EntityBundle,
    ) -> Self {
        let excerpt = |idx: usize| {
            evidence
                .get(idx)
                .map(|s| clip(&s.full_content, EXCERPT_CHARS).to_string())
                .unwrap_or_default()
        };

        let contradictions = verification
            .contradictions
            .iter()
            .map(|c| ContradictionEvidence {
                source: c.source_idx + 1,
                kind: c.kind.as_str().to_string(),
                claimed: c.claimed.clone(),
                found: c.found.clone(),
                evidence: excerpt(c.source_idx),
            })
            .collect();

        let confirmations = verification
            .confirming_sources()
            .map(|idx| ConfirmationEvidence {
                source: idx + 1,
                kind: "explicit_confirmation".to_string(),
                evidence: excerpt(idx),
            })
            .collect();

        let mut seen = HashSet::new();
        let named: Vec<String> = entities
            .persons
            .iter()
            .chain(&entities.organizations)
            .filter(|e| seen.insert(e.as_str()))
            .cloned()
            .collect();

        Self {
            contradictions,
            confirmations,
            supporting_sources: verification.supporting_sources,
            contradicting_sources: verification.contradicting_sources,
            neutral_sources: verification.neutral_sources,
            claims_extracted: ClaimsExtracted {
                numerical_claims: entities.numbers.clone(),
                entities: named,
                temporal_claims: entities.dates.clone(),
            },
            consensus_ratio: verification.consensus_score,
        }
    }
}

// --- Quality ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationQuality {
    High,
    Medium,
    Low,
}

impl VerificationQuality {
    pub fn from_consensus(consensus: f64) -> Self {
        if consensus >= 0.7 {
            Self::High
        } else if consensus >= 0.5 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}
