use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};
use veracity_common::{EvidenceSet, Source, DEFAULT_MAX_SOURCES};

use crate::credibility;
use crate::extraction::{is_substantial, ContentExtractor};
use crate::search::WebSearcher;

/// Gathering tunables.
#[derive(Debug, Clone)]
pub struct GatherConfig {
    /// Sources kept per request.
    pub max_results: usize,
    /// Results requested per search query.
    pub page_size: usize,
    /// Queries tried per request.
    pub max_queries: usize,
    /// Stop issuing queries once this many sources are collected.
    pub early_exit_sources: usize,
    pub query_pause: Duration,
}

impl Default for GatherConfig {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_SOURCES,
            page_size: 20,
            max_queries: 3,
            early_exit_sources: 5,
            query_pause: Duration::from_secs(1),
        }
    }
}

/// Collects web evidence for a claim: searches, extracts full text for each
/// new hit and scores it.
pub struct EvidenceGatherer {
    searcher: Arc<dyn WebSearcher>,
    extractor: Arc<dyn ContentExtractor>,
    config: GatherConfig,
}

impl EvidenceGatherer {
    pub fn new(searcher: Arc<dyn WebSearcher>, extractor: Arc<dyn ContentExtractor>) -> Self {
        Self {
            searcher,
            extractor,
            config: GatherConfig::default(),
        }
    }

    pub fn with_config(mut self, config: GatherConfig) -> Self {
        self.config = config;
        self
    }

    pub async fn gather(&self, claim: &str, category: Option<&str>) -> EvidenceSet {
        self.gather_with_budget(claim, category, self.config.max_results).await
    }

    pub async fn gather_with_budget(
        &self,
        claim: &str,
        category: Option<&str>,
        budget: usize,
    ) -> EvidenceSet {
        let queries = build_queries(claim, category);
        let queries = &queries[..queries.len().min(self.config.max_queries)];

        let mut seen: HashSet<String> = HashSet::new();
        let mut sources: Vec<Source> = Vec::new();

        for (i, query) in queries.iter().enumerate() {
            info!(query = query.as_str(), "Searching for evidence");

            let hits = match self.searcher.search(query, self.config.page_size).await {
                Ok(hits) => hits,
                Err(e) => {
                    warn!(query = query.as_str(), error = %e, "Search failed, skipping query");
                    continue;
                }
            };

            for hit in hits {
                if hit.url.is_empty() || !seen.insert(hit.url.clone()) {
                    continue;
                }

                let content = match self.extractor.extract(&hit.url).await {
                    Ok(Some(content)) if is_substantial(&content) => content,
                    Ok(_) => {
                        debug!(url = hit.url.as_str(), "No usable content");
                        continue;
                    }
                    Err(e) => {
                        debug!(url = hit.url.as_str(), error = %e, "Extraction failed");
                        continue;
                    }
                };

                let score = credibility::score(&hit.url, &content, &hit.title);
                let source = Source::new(hit, content, score);
                info!(
                    domain = source.domain.as_str(),
                    credibility = score,
                    chars = source.full_content.chars().count(),
                    "Source collected"
                );
                sources.push(source);

                if sources.len() >= budget {
                    break;
                }
            }

            if sources.len() >= budget || sources.len() >= self.config.early_exit_sources {
                break;
            }

            if i + 1 < queries.len() && !self.config.query_pause.is_zero() {
                tokio::time::sleep(self.config.query_pause).await;
            }
        }

        let evidence = EvidenceSet::from_sources(sources, budget);
        info!(count = evidence.len(), "Evidence gathered");
        evidence
    }
}

/// Search queries for a claim, most specific first.
pub fn build_queries(claim: &str, category: Option<&str>) -> Vec<String> {
    let mut queries = vec![claim.to_string()];
    if let Some(category) = category.filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all")) {
        queries.push(format!("{claim} {category}"));
    }
    queries.push(format!("{claim} news"));
    queries.push(format!("{claim} verified"));
    queries
}
