//! Test doubles for the engine's external seams: search, extraction,
//! completion and translation. Enabled by the `test-support` feature.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use ai_client::{Completion, CompletionOptions, TextCompletion};
use anyhow::Result;
use async_trait::async_trait;
use veracity_common::{EvidenceSet, SearchResult, Source, DEFAULT_MAX_SOURCES};

use crate::credibility;
use crate::extraction::ContentExtractor;
use crate::search::WebSearcher;
use crate::translate::Translator;
use crate::verifier::{
    EntityDetails, NumericalVerification, SemanticAnalysis, TemporalVerification,
    VerificationResult,
};

// --- Fixtures ---

pub fn hit(url: &str, title: &str) -> SearchResult {
    SearchResult {
        url: url.to_string(),
        title: title.to_string(),
        snippet: format!("{title} ..."),
    }
}

/// Evidence from `(url, title, content)` rows, scored the way the gatherer
/// scores them.
pub fn evidence(rows: &[(&str, &str, &str)]) -> EvidenceSet {
    let sources = rows
        .iter()
        .map(|(url, title, content)| {
            Source::new(
                hit(url, title),
                content.to_string(),
                credibility::score(url, content, title),
            )
        })
        .collect();
    EvidenceSet::from_sources(sources, DEFAULT_MAX_SOURCES)
}

/// Verification result with only the fields the arbiter reads set.
pub fn verification(credibility: f64, consensus: f64, contradicting: usize) -> VerificationResult {
    VerificationResult {
        avg_source_credibility: credibility,
        credibility_scores: Vec::new(),
        entity_match_score: 0.0,
        entity_details: EntityDetails::default(),
        numerical_verification: NumericalVerification::default(),
        semantic_analysis: SemanticAnalysis::default(),
        contradictions: Vec::new(),
        temporal_verification: TemporalVerification::default(),
        supporting_sources: 0,
        contradicting_sources: contradicting,
        neutral_sources: 0,
        consensus_score: consensus,
    }
}

// --- MockSearcher ---

/// Returns canned results per query; unknown queries return nothing.
#[derive(Clone, Default)]
pub struct MockSearcher {
    results: HashMap<String, Vec<SearchResult>>,
    failing: HashSet<String>,
    log: Arc<Mutex<Vec<String>>>,
}

impl MockSearcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_query(mut self, query: &str, results: Vec<SearchResult>) -> Self {
        self.results.insert(query.to_string(), results);
        self
    }

    pub fn failing_query(mut self, query: &str) -> Self {
        self.failing.insert(query.to_string());
        self
    }

    /// Queries issued so far, in order.
    pub fn queries(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl WebSearcher for MockSearcher {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        self.log.lock().unwrap().push(query.to_string());
        if self.failing.contains(query) {
            anyhow::bail!("MockSearcher: search failed for {query}");
        }
        let mut results = self.results.get(query).cloned().unwrap_or_default();
        results.truncate(max_results);
        Ok(results)
    }
}

// --- MockExtractor ---

/// Returns canned page text per URL; unknown URLs yield no content.
#[derive(Clone, Default)]
pub struct MockExtractor {
    pages: HashMap<String, String>,
    calls: Arc<Mutex<HashMap<String, usize>>>,
}

impl MockExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_url(mut self, url: &str, content: &str) -> Self {
        self.pages.insert(url.to_string(), content.to_string());
        self
    }

    pub fn calls_for(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }
}

#[async_trait]
impl ContentExtractor for MockExtractor {
    async fn extract(&self, url: &str) -> Result<Option<String>> {
        *self.calls.lock().unwrap().entry(url.to_string()).or_default() += 1;
        Ok(self.pages.get(url).cloned())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// --- MockCompletion ---

/// Replays queued replies in order, then repeats the fallback reply.
/// Records every prompt and option set it was called with.
pub struct MockCompletion {
    replies: Mutex<VecDeque<Result<String, String>>>,
    fallback: Result<String, String>,
    calls: Mutex<Vec<(String, CompletionOptions)>>,
}

impl MockCompletion {
    /// Always answers with `reply`.
    pub fn replying(reply: &str) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: Ok(reply.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Always fails with `error`.
    pub fn failing(error: &str) -> Self {
        Self {
            fallback: Err(error.to_string()),
            ..Self::replying("")
        }
    }

    pub fn then_reply(self, reply: &str) -> Self {
        self.replies.lock().unwrap().push_back(Ok(reply.to_string()));
        self
    }

    pub fn then_fail(self, error: &str) -> Self {
        self.replies.lock().unwrap().push_back(Err(error.to_string()));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn options_used(&self) -> Vec<CompletionOptions> {
        self.calls.lock().unwrap().iter().map(|(_, o)| o.clone()).collect()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.calls.lock().unwrap().last().map(|(p, _)| p.clone())
    }
}

#[async_trait]
impl TextCompletion for MockCompletion {
    async fn complete(&self, prompt: &str, options: &CompletionOptions) -> Result<Completion> {
        self.calls
            .lock()
            .unwrap()
            .push((prompt.to_string(), options.clone()));
        let next = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        match next {
            Ok(text) => Ok(Completion { text, usage: None }),
            Err(e) => Err(anyhow::anyhow!(e)),
        }
    }

    fn model(&self) -> &str {
        "mock-model"
    }
}

// --- MockTranslator ---

/// Translates by table lookup; unknown text passes through unchanged.
#[derive(Default)]
pub struct MockTranslator {
    table: HashMap<(String, String), String>,
    calls: Mutex<Vec<(String, String, String)>>,
}

impl MockTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate `from` into `to` when targeting `target`.
    pub fn on_text(mut self, from: &str, target: &str, to: &str) -> Self {
        self.table
            .insert((from.to_string(), target.to_string()), to.to_string());
        self
    }

    /// `(text, source, target)` of every provider call.
    pub fn calls(&self) -> Vec<(String, String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate_chunk(&self, text: &str, source: &str, target: &str) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((text.to_string(), source.to_string(), target.to_string()));
        Ok(self
            .table
            .get(&(text.to_string(), target.to_string()))
            .cloned()
            .unwrap_or_else(|| text.to_string()))
    }

    fn name(&self) -> &str {
        "mock"
    }
}
