use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::info;
use veracity_common::{SearchResult, VeracityError};

const SERPER_ENDPOINT: &str = "https://google.serper.dev/search";

// --- WebSearcher trait ---

#[async_trait]
pub trait WebSearcher: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>>;
}

// --- Serper ---

#[derive(Debug, serde::Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<SerperResult>,
}

#[derive(Debug, serde::Deserialize)]
struct SerperResult {
    #[serde(default)]
    link: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
}

impl From<SerperResult> for SearchResult {
    fn from(r: SerperResult) -> Self {
        SearchResult {
            url: r.link,
            title: r.title,
            snippet: r.snippet,
        }
    }
}

/// Google web search through serper.dev.
pub struct SerperSearcher {
    api_key: String,
    client: reqwest::Client,
}

impl SerperSearcher {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
        }
    }
}

#[async_trait]
impl WebSearcher for SerperSearcher {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        info!(query, max_results, "Serper search");

        let body = serde_json::json!({
            "q": query,
            "num": max_results,
        });

        let resp = self
            .client
            .post(SERPER_ENDPOINT)
            .header("X-API-KEY", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .context("Serper API request failed")?;

        check_status(resp.status(), query)?;

        let data: SerperResponse = resp
            .json()
            .await
            .context("Failed to parse Serper response")?;

        let results: Vec<SearchResult> = data.organic.into_iter().map(Into::into).collect();

        info!(query, count = results.len(), "Serper search complete");
        Ok(results)
    }
}

fn check_status(status: StatusCode, query: &str) -> Result<(), VeracityError> {
    if status.is_success() {
        return Ok(());
    }
    Err(VeracityError::Search(format!(
        "Serper returned HTTP {status} for query: {query}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_status_is_a_search_error() {
        let err = check_status(StatusCode::UNAUTHORIZED, "rates rose").unwrap_err();
        assert!(matches!(err, VeracityError::Search(ref m) if m.contains("401") && m.contains("rates rose")));
        assert!(check_status(StatusCode::OK, "rates rose").is_ok());
    }

    #[test]
    fn serper_response_maps_link_to_url() {
        let data: SerperResponse = serde_json::from_str(
            r#"{"searchParameters": {"q": "x"}, "organic": [
                {"title": "Rates rise", "link": "https://reuters.com/a", "snippet": "The bank...", "position": 1},
                {"link": "https://example.com/b"}
            ]}"#,
        )
        .unwrap();
        let results: Vec<SearchResult> = data.organic.into_iter().map(Into::into).collect();
        assert_eq!(results[0].url, "https://reuters.com/a");
        assert_eq!(results[0].title, "Rates rise");
        assert_eq!(results[1].title, "");
    }

    #[test]
    fn missing_organic_is_empty() {
        let data: SerperResponse = serde_json::from_str(r#"{"knowledgeGraph": {}}"#).unwrap();
        assert!(data.organic.is_empty());
    }
}
