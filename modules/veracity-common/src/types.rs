use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::VeracityError;

// --- Limits ---

/// Longest claim accepted, in characters.
pub const MAX_CLAIM_CHARS: usize = 1000;
/// Evidence sets smaller than this never reach verification.
pub const MIN_SOURCES: usize = 2;
/// Default cap on sources kept per request.
pub const DEFAULT_MAX_SOURCES: usize = 15;

// --- Label ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Label {
    Real,
    Fake,
    Unverified,
}

impl Label {
    /// Case-insensitive parse of a model-emitted label. Anything other than
    /// the three known labels is `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "REAL" => Some(Label::Real),
            "FAKE" => Some(Label::Fake),
            "UNVERIFIED" => Some(Label::Unverified),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Real => "REAL",
            Label::Fake => "FAKE",
            Label::Unverified => "UNVERIFIED",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Claim ---

/// A statement submitted for verification. Immutable once accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    text: String,
    category: Option<String>,
    language: String,
}

impl Claim {
    pub fn new(text: impl Into<String>) -> Result<Self, VeracityError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(VeracityError::Validation("Text cannot be empty".to_string()));
        }
        let chars = text.chars().count();
        if chars > MAX_CLAIM_CHARS {
            return Err(VeracityError::Validation(format!(
                "Text too long: {chars} chars (maximum {MAX_CLAIM_CHARS})"
            )));
        }
        Ok(Self {
            text,
            category: None,
            language: "en".to_string(),
        })
    }

    /// Attach a category tag. `all` (any case) and blank tags mean no category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        let category = category.into().trim().to_lowercase();
        self.category = (!category.is_empty() && category != "all").then_some(category);
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        let language = language.into().trim().to_lowercase();
        if !language.is_empty() {
            self.language = language;
        }
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Category for display; `all` when none was set.
    pub fn category_label(&self) -> &str {
        self.category.as_deref().unwrap_or("all")
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn is_english(&self) -> bool {
        self.language == "en"
    }

    /// Same claim with its text replaced (used after translation).
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..self.clone()
        }
    }
}

// --- Search ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub url: String,
    pub title: String,
    pub snippet: String,
}

// --- Source ---

/// A web document gathered as evidence. Created once per unique URL per
/// request and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub url: String,
    pub domain: String,
    pub title: String,
    pub snippet: String,
    pub full_content: String,
    pub credibility: f64,
}

impl Source {
    pub fn new(hit: SearchResult, full_content: String, credibility: f64) -> Self {
        Self {
            domain: domain_of(&hit.url),
            url: hit.url,
            title: hit.title,
            snippet: hit.snippet,
            full_content,
            credibility,
        }
    }

    /// Lowercased `title + " " + content`, the text most layers search.
    pub fn searchable_text(&self) -> String {
        format!("{} {}", self.title, self.full_content).to_lowercase()
    }
}

/// Host of `url` with a leading `www.` removed, or `Unknown`.
pub fn domain_of(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "Unknown".to_string())
}

// --- EvidenceSet ---

/// Sources for one request: unique by URL, sorted by descending
/// credibility, capped at a budget.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvidenceSet {
    sources: Vec<Source>,
}

impl EvidenceSet {
    pub fn from_sources(sources: Vec<Source>, budget: usize) -> Self {
        let mut seen = HashSet::new();
        let mut sources: Vec<Source> = sources
            .into_iter()
            .filter(|s| seen.insert(s.url.clone()))
            .collect();
        // Stable: equal scores keep discovery order.
        sources.sort_by(|a, b| b.credibility.total_cmp(&a.credibility));
        sources.truncate(budget);
        Self { sources }
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Enough sources to run verification.
    pub fn is_sufficient(&self) -> bool {
        self.sources.len() >= MIN_SOURCES
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Source> {
        self.sources.iter()
    }

    pub fn get(&self, idx: usize) -> Option<&Source> {
        self.sources.get(idx)
    }

    pub fn urls(&self) -> Vec<String> {
        self.sources
            .iter()
            .filter(|s| !s.url.is_empty())
            .map(|s| s.url.clone())
            .collect()
    }
}

impl<'a> IntoIterator for &'a EvidenceSet {
    type Item = &'a Source;
    type IntoIter = std::slice::Iter<'a, Source>;

    fn into_iter(self) -> Self::IntoIter {
        self.sources.iter()
    }
}

// --- Entities ---

/// Approximate entities pulled from a claim by pattern matching.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityBundle {
    pub persons: Vec<String>,
    pub organizations: Vec<String>,
    pub locations: Vec<String>,
    pub numbers: Vec<String>,
    pub dates: Vec<String>,
}

impl EntityBundle {
    /// Persons, organizations and locations, in that order.
    pub fn named(&self) -> Vec<String> {
        self.persons
            .iter()
            .chain(&self.organizations)
            .chain(&self.locations)
            .cloned()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
            && self.organizations.is_empty()
            && self.locations.is_empty()
            && self.numbers.is_empty()
            && self.dates.is_empty()
    }
}

// --- Verdict ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub label: Label,
    pub confidence: f64,
    pub explanation: String,
}

impl Verdict {
    pub fn new(label: Label, confidence: f64, explanation: impl Into<String>) -> Self {
        Self {
            label,
            confidence,
            explanation: explanation.into(),
        }
    }

    pub fn unverified(explanation: impl Into<String>) -> Self {
        Self::new(Label::Unverified, 0.5, explanation)
    }
}
