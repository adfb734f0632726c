use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use browserless_client::{BrowserlessClient, ScrapeResponse, ELEMENT_WAIT_TIMEOUT, PAGE_LOAD_TIMEOUT};
use rand::Rng;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use super::dom::{collapse_whitespace, probe_rendered, DomView, ParsedDom, CONTENT_SELECTORS};
use super::ContentExtractor;

/// Max concurrent Chromium processes. Each instance is heavy (~100MB+ RSS).
const MAX_CONCURRENT_CHROME: usize = 2;
/// Max attempts for transient Chrome launch failures.
const CHROME_MAX_ATTEMPTS: u32 = 2;
const CHROME_RETRY_BASE: Duration = Duration::from_secs(3);

// --- Backends ---

pub enum RenderBackend {
    Browserless(BrowserlessClient),
    Chrome(ChromeRenderer),
}

impl RenderBackend {
    pub fn browserless(base_url: &str, token: Option<&str>) -> Self {
        info!(base_url, "Headless rendering via Browserless");
        Self::Browserless(BrowserlessClient::new(base_url, token))
    }

    pub fn chrome(chrome_bin: &str) -> Self {
        info!(chrome_bin, max_concurrent = MAX_CONCURRENT_CHROME, "Headless rendering via local Chromium");
        Self::Chrome(ChromeRenderer::new(chrome_bin))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Browserless(_) => "browserless",
            Self::Chrome(_) => "chrome",
        }
    }
}

/// Headless browser render for script-heavy pages. Loads the page, waits a
/// bounded time for an `article` element, then probes the rendered DOM.
pub struct BrowserRenderExtractor {
    backend: RenderBackend,
}

impl BrowserRenderExtractor {
    pub fn new(backend: RenderBackend) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl ContentExtractor for BrowserRenderExtractor {
    async fn extract(&self, url: &str) -> Result<Option<String>> {
        match &self.backend {
            RenderBackend::Browserless(client) => {
                let mut selectors = vec!["article", "main"];
                selectors.extend_from_slice(CONTENT_SELECTORS);
                selectors.push("p");

                let response = client
                    .scrape(url, &selectors, Some("article"))
                    .await
                    .context("Browserless scrape request failed")?;
                Ok(probe_rendered(&ScrapedDom(response)))
            }
            RenderBackend::Chrome(chrome) => {
                let dom = chrome.dump_dom(url).await?;
                if dom.is_empty() {
                    warn!(url, "Empty DOM output");
                    return Ok(None);
                }
                Ok(probe_rendered(&ParsedDom::parse(&dom)))
            }
        }
    }

    fn name(&self) -> &str {
        "headless"
    }
}

// --- Browserless ---

/// Element texts returned by a Browserless `/scrape` call.
struct ScrapedDom(ScrapeResponse);

impl DomView for ScrapedDom {
    fn first_text(&self, selector: &str) -> Option<String> {
        self.0.texts(selector).first().map(|t| collapse_whitespace(t))
    }

    fn all_texts(&self, selector: &str) -> Vec<String> {
        self.0
            .texts(selector)
            .into_iter()
            .map(collapse_whitespace)
            .collect()
    }
}

// --- Local Chromium ---

pub struct ChromeRenderer {
    chrome_bin: String,
    semaphore: Semaphore,
}

impl ChromeRenderer {
    pub fn new(chrome_bin: &str) -> Self {
        Self {
            chrome_bin: chrome_bin.to_string(),
            semaphore: Semaphore::new(MAX_CONCURRENT_CHROME),
        }
    }

    /// Launch Chrome --dump-dom and return the serialized DOM.
    async fn dump_dom(&self, url: &str) -> Result<String> {
        let parsed = url::Url::parse(url).context("Invalid URL")?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            anyhow::bail!("Only http/https URLs are allowed, got: {}", parsed.scheme());
        }

        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| anyhow::anyhow!("Chrome semaphore closed"))?;

        let budget = PAGE_LOAD_TIMEOUT + ELEMENT_WAIT_TIMEOUT;

        for attempt in 0..CHROME_MAX_ATTEMPTS {
            let tmp_dir = tempfile::tempdir().context("Failed to create temp profile dir")?;

            let result = tokio::time::timeout(
                budget,
                tokio::process::Command::new(&self.chrome_bin)
                    .args([
                        "--headless",
                        "--no-sandbox",
                        "--disable-gpu",
                        "--disable-dev-shm-usage",
                        &format!("--user-data-dir={}", tmp_dir.path().display()),
                        &format!("--virtual-time-budget={}", ELEMENT_WAIT_TIMEOUT.as_millis()),
                        "--dump-dom",
                        url,
                    ])
                    .kill_on_drop(true)
                    .output(),
            )
            .await;

            match result {
                Ok(Ok(output)) if output.status.success() => {
                    return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
                }
                Ok(Ok(output)) => {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    if is_transient_error(&stderr) && attempt + 1 < CHROME_MAX_ATTEMPTS {
                        warn!(url, attempt = attempt + 1, "Chrome cannot fork, retrying after backoff");
                        backoff(attempt).await;
                        continue;
                    }
                    anyhow::bail!("Chrome exited with {} for {url}", output.status);
                }
                Ok(Err(e)) => anyhow::bail!("Failed to run Chrome for {url}: {e}"),
                Err(_) => anyhow::bail!("Chrome timed out after {}s for {url}", budget.as_secs()),
            }
        }

        Ok(String::new())
    }
}

fn is_transient_error(msg: &str) -> bool {
    msg.contains("Cannot fork") || msg.contains("Resource temporarily unavailable")
}

async fn backoff(attempt: u32) {
    let delay = CHROME_RETRY_BASE * 3u32.pow(attempt);
    let jitter = Duration::from_millis(rand::rng().random_range(0..1000));
    tokio::time::sleep(delay + jitter).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scraped_dom_reads_selector_texts() {
        let response: ScrapeResponse = serde_json::from_str(&format!(
            r#"{{"data": [
                {{"selector": "article", "results": [{{"text": "tiny"}}]}},
                {{"selector": ".story-body", "results": [{{"text": "{}"}}]}},
                {{"selector": "p", "results": []}}
            ]}}"#,
            "Rendered   story text. ".repeat(30)
        ))
        .unwrap();

        let text = probe_rendered(&ScrapedDom(response)).unwrap();
        assert!(text.starts_with("Rendered story text."));
        assert!(!text.contains("  "));
    }

    #[tokio::test]
    async fn chrome_rejects_non_http_urls() {
        let chrome = ChromeRenderer::new("chromium");
        assert!(chrome.dump_dom("file:///etc/passwd").await.is_err());
    }

    #[test]
    fn transient_errors_detected() {
        assert!(is_transient_error("ERROR: Cannot fork zygote"));
        assert!(!is_transient_error("net::ERR_NAME_NOT_RESOLVED"));
    }
}
