use serde::{Deserialize, Serialize};
use veracity_common::EvidenceSet;

use crate::entities::YEAR_RE;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemporalVerification {
    pub has_temporal_claims: bool,
    pub claimed_years: Vec<String>,
    pub confirmation_rate: f64,
}

/// Fraction of sources mentioning at least one year stated in the claim.
pub(super) fn verify(claim: &str, evidence: &EvidenceSet) -> TemporalVerification {
    let claimed_years: Vec<String> = YEAR_RE
        .find_iter(claim)
        .map(|m| m.as_str().to_string())
        .collect();
    if claimed_years.is_empty() {
        return TemporalVerification::default();
    }

    let confirmations = evidence
        .iter()
        .filter(|s| claimed_years.iter().any(|y| s.full_content.contains(y.as_str())))
        .count();
    let confirmation_rate = if evidence.is_empty() {
        0.0
    } else {
        confirmations as f64 / evidence.len() as f64
    };

    TemporalVerification {
        has_temporal_claims: true,
        claimed_years,
        confirmation_rate,
    }
}
