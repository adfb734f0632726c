//! Full-text extraction for evidence pages.
//!
//! Pages are run through an ordered cascade of strategies; the first one that
//! yields more than [`MIN_CONTENT_CHARS`] characters wins. Strategy failures
//! never surface to callers: an exhausted cascade is simply "no content".

mod article;
mod browser;
pub(crate) mod dom;
mod html;
mod readability;

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info};
use veracity_common::Config;

pub use article::ArticleDensityExtractor;
pub use browser::{BrowserRenderExtractor, RenderBackend};
pub use html::RawHtmlExtractor;
pub use readability::StructuredArticleExtractor;

/// Extracted text must be longer than this to count as content.
pub const MIN_CONTENT_CHARS: usize = 300;
/// Extracted text is clipped to this many characters.
pub const MAX_CONTENT_CHARS: usize = 8000;

pub(crate) const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

// --- ContentExtractor trait ---

#[async_trait]
pub trait ContentExtractor: Send + Sync {
    /// Article text for `url`, or `None` when the strategy found nothing usable.
    async fn extract(&self, url: &str) -> Result<Option<String>>;
    fn name(&self) -> &str;
}

// --- Cascade ---

pub struct ExtractionCascade {
    strategies: Vec<Box<dyn ContentExtractor>>,
}

impl ExtractionCascade {
    pub fn new(strategies: Vec<Box<dyn ContentExtractor>>) -> Self {
        Self { strategies }
    }

    /// Structured readability, article density, headless render, raw HTML.
    /// Rendering goes through Browserless when configured, local Chromium
    /// otherwise.
    pub fn from_config(config: &Config) -> Self {
        let backend = match &config.browserless_url {
            Some(base_url) => RenderBackend::browserless(base_url, config.browserless_token.as_deref()),
            None => RenderBackend::chrome(&config.chrome_bin),
        };
        info!(
            renderer = backend.name(),
            "Extraction cascade: readability -> article -> headless -> raw html"
        );
        Self::new(vec![
            Box::new(StructuredArticleExtractor::new()),
            Box::new(ArticleDensityExtractor::new()),
            Box::new(BrowserRenderExtractor::new(backend)),
            Box::new(RawHtmlExtractor::new()),
        ])
    }

    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Run strategies in order and return the first substantial text.
    pub async fn run(&self, url: &str) -> Option<String> {
        for strategy in &self.strategies {
            match strategy.extract(url).await {
                Ok(Some(text)) if is_substantial(&text) => {
                    debug!(url, strategy = strategy.name(), chars = text.chars().count(), "Extracted content");
                    return Some(clip(&text, MAX_CONTENT_CHARS).to_string());
                }
                Ok(_) => debug!(url, strategy = strategy.name(), "Too little content, trying next"),
                Err(e) => debug!(url, strategy = strategy.name(), error = %e, "Extraction failed, trying next"),
            }
        }
        debug!(url, "All extraction strategies exhausted");
        None
    }
}

#[async_trait]
impl ContentExtractor for ExtractionCascade {
    async fn extract(&self, url: &str) -> Result<Option<String>> {
        Ok(self.run(url).await)
    }

    fn name(&self) -> &str {
        "cascade"
    }
}

// --- Helpers ---

pub(crate) fn is_substantial(text: &str) -> bool {
    text.chars().count() > MIN_CONTENT_CHARS
}

/// First `max_chars` characters of `text`.
pub(crate) fn clip(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub(crate) fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(BROWSER_USER_AGENT)
        .build()
        .expect("Failed to build HTTP client")
}

/// GET `url` and return the body, failing on non-success statuses.
pub(crate) async fn fetch_html(client: &reqwest::Client, url: &str) -> Result<String> {
    let resp = client
        .get(url)
        .header(
            reqwest::header::ACCEPT,
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        )
        .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.5")
        .send()
        .await?;
    let status = resp.status();
    if !status.is_success() {
        anyhow::bail!("HTTP {status} for {url}");
    }
    Ok(resp.text().await?)
}
