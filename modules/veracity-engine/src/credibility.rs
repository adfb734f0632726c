//! Domain credibility.
//!
//! Two scorers share this module: a gather-time heuristic ([`score`]) used to
//! rank sources as they are collected, and the verifier's prior table
//! ([`domain_prior`]) used when weighing evidence. The two differ in both
//! domains and bonuses.

use veracity_common::{domain_of, Source};

// --- Gather-time tiers ---

const BASE_SCORE: f64 = 0.5;

const TIERS: &[(&[&str], f64)] = &[
    (&["reuters.com", "apnews.com", "bbc.com", "bbc.co.uk"], 0.45),
    (
        &[
            "nytimes.com",
            "theguardian.com",
            "washingtonpost.com",
            "thehindu.com",
            "indianexpress.com",
        ],
        0.40,
    ),
    (
        &[
            "cnn.com",
            "bloomberg.com",
            "forbes.com",
            "economist.com",
            "ndtv.com",
            "hindustantimes.com",
        ],
        0.35,
    ),
    (
        &["factcheck.org", "snopes.com", "politifact.com", "boomlive.in", "altnews.in"],
        0.40,
    ),
];

/// Gather-time credibility in [0, 1]: base 0.5 plus a bonus for every tier
/// whose domain list matches (substring of the lowercased host), plus small
/// bonuses for long content and a descriptive title.
pub fn score(url: &str, content: &str, title: &str) -> f64 {
    let domain = domain_of(url).to_lowercase();
    let mut score = BASE_SCORE;

    for (domains, bonus) in TIERS {
        if domains.iter().any(|d| domain.contains(d)) {
            score += bonus;
        }
    }

    let content_chars = content.chars().count();
    if content_chars > 2000 {
        score += 0.05;
    }
    if content_chars > 3000 {
        score += 0.05;
    }
    if title.chars().count() > 20 {
        score += 0.02;
    }

    score.min(1.0)
}

// --- Verifier priors ---

const DEFAULT_PRIOR: f64 = 0.5;

const DOMAIN_PRIORS: &[(&str, f64)] = &[
    // Wire services and public broadcasters
    ("reuters.com", 1.0),
    ("apnews.com", 1.0),
    ("bbc.com", 0.98),
    ("bbc.co.uk", 0.98),
    // National papers
    ("theguardian.com", 0.95),
    ("nytimes.com", 0.95),
    ("washingtonpost.com", 0.95),
    ("aljazeera.com", 0.95),
    ("thehindu.com", 0.95),
    ("indianexpress.com", 0.95),
    ("cnn.com", 0.92),
    ("timesofindia.indiatimes.com", 0.90),
    ("hindustantimes.com", 0.90),
    ("ndtv.com", 0.90),
    ("news18.com", 0.88),
    ("indiatoday.in", 0.88),
    // Business
    ("bloomberg.com", 0.92),
    ("forbes.com", 0.90),
    ("economist.com", 0.92),
    ("cnbc.com", 0.88),
    ("ft.com", 0.92),
    ("wsj.com", 0.92),
    ("moneycontrol.com", 0.85),
    ("economictimes.indiatimes.com", 0.85),
    // Sports
    ("espn.com", 0.82),
    ("espncricinfo.com", 0.82),
    ("cricbuzz.com", 0.80),
    // Reference
    ("wikipedia.org", 0.78),
    // Fact-checkers
    ("factcheck.org", 0.95),
    ("snopes.com", 0.95),
    ("politifact.com", 0.95),
    ("boomlive.in", 0.90),
    ("altnews.in", 0.90),
];

/// Prior trust for an exact domain, 0.5 when unknown.
pub fn domain_prior(domain: &str) -> f64 {
    DOMAIN_PRIORS
        .iter()
        .find(|(d, _)| *d == domain)
        .map(|(_, prior)| *prior)
        .unwrap_or(DEFAULT_PRIOR)
}

/// Verifier credibility of one source: domain prior plus content-length
/// bonuses, clamped to 1.0.
pub fn source_credibility(source: &Source) -> f64 {
    let mut score = domain_prior(&source.domain);
    let content_chars = source.full_content.chars().count();
    if content_chars > 1000 {
        score += 0.05;
    }
    if content_chars > 2000 {
        score += 0.05;
    }
    score.min(1.0)
}
