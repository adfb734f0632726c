pub mod error;
pub mod types;

pub use error::{BrowserlessError, Result};
pub use types::{
    ElementSelector, GotoOptions, ScrapeRequest, ScrapeResponse, ScrapedElement, SelectorMatches,
    WaitForSelector,
};

use std::time::Duration;

use tracing::debug;

/// Page-load budget for a render.
pub const PAGE_LOAD_TIMEOUT: Duration = Duration::from_secs(20);
/// Extra bounded wait for the content element after load.
pub const ELEMENT_WAIT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct BrowserlessClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl BrowserlessClient {
    pub fn new(base_url: &str, token: Option<&str>) -> Self {
        // Render budget plus headroom for the round trip.
        let client = reqwest::Client::builder()
            .timeout(PAGE_LOAD_TIMEOUT + ELEMENT_WAIT_TIMEOUT + Duration::from_secs(5))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(String::from),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        let mut endpoint = format!("{}/{path}", self.base_url);
        if let Some(ref token) = self.token {
            endpoint.push_str(&format!("?token={token}"));
        }
        endpoint
    }

    /// Render `url` and return the text of every element matching each of
    /// `selectors`. Waits up to [`ELEMENT_WAIT_TIMEOUT`] for `wait_for` when given.
    pub async fn scrape(
        &self,
        url: &str,
        selectors: &[&str],
        wait_for: Option<&str>,
    ) -> Result<ScrapeResponse> {
        let request = ScrapeRequest {
            url: url.to_string(),
            elements: selectors
                .iter()
                .map(|s| ElementSelector {
                    selector: s.to_string(),
                })
                .collect(),
            goto_options: Some(GotoOptions {
                timeout: PAGE_LOAD_TIMEOUT.as_millis() as u64,
                wait_until: "networkidle2".to_string(),
            }),
            wait_for_selector: wait_for.map(|selector| WaitForSelector {
                selector: selector.to_string(),
                timeout: ELEMENT_WAIT_TIMEOUT.as_millis() as u64,
            }),
            best_attempt: true,
        };

        debug!(url, selectors = selectors.len(), "Browserless scrape request");

        let resp = self
            .client
            .post(self.endpoint("scrape"))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(BrowserlessError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.json().await?)
    }
}
