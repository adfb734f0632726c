use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use spider_transformations::transformation::content::{
    transform_content_input, ReturnFormat, TransformConfig, TransformInput,
};

use super::{fetch_html, http_client, ContentExtractor};

const TIMEOUT: Duration = Duration::from_secs(15);

/// Structured article parse: Readability main-content extraction over the
/// fetched HTML, returned as plain text.
pub struct StructuredArticleExtractor {
    http: reqwest::Client,
}

impl StructuredArticleExtractor {
    pub fn new() -> Self {
        Self {
            http: http_client(TIMEOUT),
        }
    }
}

impl Default for StructuredArticleExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentExtractor for StructuredArticleExtractor {
    async fn extract(&self, url: &str) -> Result<Option<String>> {
        let html = fetch_html(&self.http, url).await?;
        let text = readable_text(html.as_bytes(), Some(url));
        Ok((!text.is_empty()).then_some(text))
    }

    fn name(&self) -> &str {
        "readability"
    }
}

/// Main content of an HTML page as plain text.
pub(crate) fn readable_text(html: &[u8], url: Option<&str>) -> String {
    let parsed_url = url.and_then(|u| url::Url::parse(u).ok());
    let config = TransformConfig {
        readability: true,
        main_content: true,
        return_format: ReturnFormat::Text,
        filter_images: true,
        filter_svg: true,
        clean_html: true,
    };
    let input = TransformInput {
        url: parsed_url.as_ref(),
        content: html,
        screenshot_bytes: None,
        encoding: None,
        selector_config: None,
        ignore_tags: None,
    };

    transform_content_input(input, &config).trim().to_string()
}
