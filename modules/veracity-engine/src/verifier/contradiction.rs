use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;
use veracity_common::EvidenceSet;

/// `subject is [the] relationship of|in object`
static RELATIONSHIP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\w+(?:\s+\w+)*)\s+is\s+(?:the\s+)?(\w+(?:\s+\w+)*)\s+(?:of|in)\s+(\w+(?:\s+\w+)*)")
        .expect("valid regex")
});

const DEATH_KEYWORDS: &[&str] = &["died", "death", "passed away", "deceased", "dead"];
const ALIVE_KEYWORDS: &[&str] = &["alive", "living", "survived"];
const FIGURATIVE_ALIVE: &[&str] = &["hearts", "memory", "minds"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContradictionKind {
    RelationshipMismatch,
    LifeStatusContradiction,
}

impl ContradictionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContradictionKind::RelationshipMismatch => "relationship_mismatch",
            ContradictionKind::LifeStatusContradiction => "life_status_contradiction",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contradiction {
    #[serde(rename = "type")]
    pub kind: ContradictionKind,
    pub source_idx: usize,
    pub claimed: String,
    pub found: String,
}

impl Contradiction {
    fn life_status(source_idx: usize, claimed: &str, found: &str) -> Self {
        Self {
            kind: ContradictionKind::LifeStatusContradiction,
            source_idx,
            claimed: claimed.to_string(),
            found: found.to_string(),
        }
    }
}

/// Explicit contradictions between the claim and individual sources.
pub(super) fn detect(claim: &str, evidence: &EvidenceSet) -> Vec<Contradiction> {
    let claim_lower = claim.to_lowercase();
    let contents: Vec<String> = evidence.iter().map(|s| s.full_content.to_lowercase()).collect();

    let mut found = relationship_mismatches(&claim_lower, &contents);
    found.extend(life_status_conflicts(&claim_lower, &contents));
    found
}

fn relationship_mismatches(claim_lower: &str, contents: &[String]) -> Vec<Contradiction> {
    let Some(caps) = RELATIONSHIP_RE.captures(claim_lower) else {
        return Vec::new();
    };
    let subject = caps[1].trim();
    let relationship = caps[2].trim();
    let object = caps[3].trim();

    let pattern = format!(
        r"{}.*?{}.*?\s(?:of|in)\s+(\w+(?:\s+\w+)*)",
        regex::escape(subject),
        regex::escape(relationship)
    );
    let source_re = match Regex::new(&pattern) {
        Ok(re) => re,
        Err(e) => {
            debug!(error = %e, "Relationship pattern too large, skipping");
            return Vec::new();
        }
    };

    contents
        .iter()
        .enumerate()
        .filter_map(|(source_idx, content)| {
            let trailing = source_re.captures(content)?.get(1)?.as_str().trim();
            let mismatch = trailing.chars().count() > 3 && !trailing.starts_with(object);
            mismatch.then(|| Contradiction {
                kind: ContradictionKind::RelationshipMismatch,
                source_idx,
                claimed: format!("{subject} is {relationship} of {object}"),
                found: format!("{subject} is {relationship} of {trailing}"),
            })
        })
        .collect()
}

fn life_status_conflicts(claim_lower: &str, contents: &[String]) -> Vec<Contradiction> {
    let claims_death = DEATH_KEYWORDS.iter().any(|k| claim_lower.contains(k));
    let claims_alive = ALIVE_KEYWORDS.iter().any(|k| claim_lower.contains(k));
    if !claims_death && !claims_alive {
        return Vec::new();
    }

    let mut found = Vec::new();
    for (idx, content) in contents.iter().enumerate() {
        if claims_alive && DEATH_KEYWORDS.iter().any(|k| content.contains(k)) {
            found.push(Contradiction::life_status(idx, "alive", "died"));
        } else if claims_death && ALIVE_KEYWORDS.iter().any(|k| content.contains(k)) {
            let figurative = content.contains("alive in")
                && FIGURATIVE_ALIVE.iter().any(|w| content.contains(w));
            if !figurative {
                found.push(Contradiction::life_status(idx, "died", "alive"));
            }
        }
    }
    found
}
