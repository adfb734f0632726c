use std::sync::LazyLock;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};

use super::dom::{visible_text, within, NON_RENDERED_TAGS};
use super::{fetch_html, http_client, ContentExtractor};

const TIMEOUT: Duration = Duration::from_secs(10);

static CONTAINERS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("article, main, section, div").expect("valid selector"));

/// Generic article extraction: picks the container whose direct paragraph
/// children carry the most text.
pub struct ArticleDensityExtractor {
    http: reqwest::Client,
}

impl ArticleDensityExtractor {
    pub fn new() -> Self {
        Self {
            http: http_client(TIMEOUT),
        }
    }
}

impl Default for ArticleDensityExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentExtractor for ArticleDensityExtractor {
    async fn extract(&self, url: &str) -> Result<Option<String>> {
        let html = fetch_html(&self.http, url).await?;
        Ok(densest_text(&html))
    }

    fn name(&self) -> &str {
        "article"
    }
}

/// Paragraphs of the densest container, separated by blank lines.
pub(crate) fn densest_text(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    let mut best: Option<(usize, Vec<String>)> = None;
    for container in document.select(&CONTAINERS) {
        if within(container, &["nav", "footer", "header", "aside"]) {
            continue;
        }
        let paragraphs = direct_paragraphs(container);
        let score: usize = paragraphs.iter().map(|p| p.chars().count()).sum();
        if score > 0 && best.as_ref().map_or(true, |(top, _)| score > *top) {
            best = Some((score, paragraphs));
        }
    }

    best.map(|(_, paragraphs)| paragraphs.join("\n\n"))
}

fn direct_paragraphs(container: ElementRef<'_>) -> Vec<String> {
    container
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "p")
        .map(|p| visible_text(p, NON_RENDERED_TAGS))
        .filter(|text| !text.is_empty())
        .collect()
}
