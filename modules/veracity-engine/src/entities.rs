use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use veracity_common::EntityBundle;

const MAX_PERSONS: usize = 5;
const MAX_ORGANIZATIONS: usize = 5;
const MAX_LOCATIONS: usize = 3;
const MAX_NUMBERS: usize = 5;
const MAX_DATES: usize = 3;

static PERSON_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Z][a-z]+(?:\s+[A-Z][a-z]+){1,3})\b").expect("valid regex"));

static ORGANIZATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Z][a-z]+(?:\s+(?:Inc|Corp|Ltd|LLC|Company|Corporation|Co|Group)\.?))\b")
        .expect("valid regex")
});

static LOCATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Z][a-z]+(?:\s+[A-Z][a-z]+)?(?:\s+(?:City|State|Country|Province)))\b")
        .expect("valid regex")
});

/// Quantities with a magnitude word or percent sign; runs on lowercased text.
static QUANTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$?\d+(?:\.\d+)?\s*(?:trillion|billion|million|thousand|crore|lakh|%)")
        .expect("valid regex")
});

pub(crate) static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").expect("valid regex"));

static CAPITALIZED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*\b").expect("valid regex"));

// --- EntityExtractor trait ---

pub trait EntityExtractor: Send + Sync {
    fn extract(&self, claim: &str) -> EntityBundle;
}

/// Regex-based approximation of named-entity recognition.
#[derive(Debug, Default, Clone, Copy)]
pub struct PatternEntityExtractor;

impl EntityExtractor for PatternEntityExtractor {
    fn extract(&self, claim: &str) -> EntityBundle {
        let lowered = claim.to_lowercase();
        EntityBundle {
            persons: unique_matches(&PERSON_RE, claim, MAX_PERSONS),
            organizations: unique_matches(&ORGANIZATION_RE, claim, MAX_ORGANIZATIONS),
            locations: unique_matches(&LOCATION_RE, claim, MAX_LOCATIONS),
            numbers: QUANTITY_RE
                .find_iter(&lowered)
                .map(|m| m.as_str().trim().to_string())
                .take(MAX_NUMBERS)
                .collect(),
            dates: YEAR_RE
                .find_iter(claim)
                .map(|m| m.as_str().to_string())
                .take(MAX_DATES)
                .collect(),
        }
    }
}

/// Every capitalized phrase in `text`, in order.
pub fn capitalized_phrases(text: &str) -> Vec<String> {
    CAPITALIZED_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

fn unique_matches(re: &Regex, text: &str, cap: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    re.find_iter(text)
        .map(|m| m.as_str().to_string())
        .filter(|s| seen.insert(s.clone()))
        .take(cap)
        .collect()
}
