use serde::{Deserialize, Serialize};
use veracity_common::{EntityBundle, EvidenceSet};

use crate::entities::capitalized_phrases;

const KEY_ENTITIES_REPORTED: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityDetails {
    pub key_entities: Vec<String>,
    pub source_match_ratios: Vec<f64>,
}

/// Mean share of the claim's key entities that each source mentions.
pub(super) fn match_entities(
    claim: &str,
    entities: &EntityBundle,
    evidence: &EvidenceSet,
) -> (f64, EntityDetails) {
    let mut key_entities = entities.named();
    if key_entities.is_empty() {
        key_entities = capitalized_phrases(claim);
    }
    let needles: Vec<String> = key_entities.iter().map(|e| e.to_lowercase()).collect();

    let source_match_ratios: Vec<f64> = evidence
        .iter()
        .map(|source| {
            if needles.is_empty() {
                return 0.0;
            }
            let text = source.searchable_text();
            let present = needles.iter().filter(|n| text.contains(n.as_str())).count();
            present as f64 / needles.len() as f64
        })
        .collect();

    let score = if source_match_ratios.is_empty() {
        0.0
    } else {
        source_match_ratios.iter().sum::<f64>() / source_match_ratios.len() as f64
    };

    key_entities.truncate(KEY_ENTITIES_REPORTED);
    (
        score,
        EntityDetails {
            key_entities,
            source_match_ratios,
        },
    )
}
