use std::sync::LazyLock;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};

use super::dom::{collapse_whitespace, visible_text, within, MIN_PARAGRAPH_CHARS};
use super::{clip, fetch_html, http_client, is_substantial, ContentExtractor, MAX_CONTENT_CHARS};

const TIMEOUT: Duration = Duration::from_secs(15);

/// Page chrome dropped before any text is read.
const BOILERPLATE_TAGS: &[&str] = &[
    "script", "style", "nav", "footer", "header", "aside", "iframe", "noscript",
];

/// Class-name fragments that mark an article container.
const CONTENT_CLASSES: &[&str] = &[
    "article-body",
    "article_body",
    "article-content",
    "story-body",
    "post-content",
    "entry-content",
    "content-body",
];

static ARTICLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("article").expect("valid selector"));
static MAIN: LazyLock<Selector> = LazyLock::new(|| Selector::parse("main").expect("valid selector"));
static BLOCKS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div, section").expect("valid selector"));
static PARAGRAPHS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").expect("valid selector"));

/// Last resort: fetch the page as a browser would and read its markup
/// directly, with boilerplate stripped.
pub struct RawHtmlExtractor {
    http: reqwest::Client,
}

impl RawHtmlExtractor {
    pub fn new() -> Self {
        Self {
            http: http_client(TIMEOUT),
        }
    }
}

impl Default for RawHtmlExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentExtractor for RawHtmlExtractor {
    async fn extract(&self, url: &str) -> Result<Option<String>> {
        let html = fetch_html(&self.http, url).await?;
        Ok(markup_text(&html))
    }

    fn name(&self) -> &str {
        "raw_html"
    }
}

pub(crate) fn markup_text(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let text_of = |el: ElementRef<'_>| visible_text(el, BOILERPLATE_TAGS);
    let first = |selector: &Selector| document.select(selector).find(|el| !within(*el, BOILERPLATE_TAGS));

    let mut text = first(&ARTICLE).map(text_of).unwrap_or_default();

    if !is_substantial(&text) {
        if let Some(main) = first(&MAIN) {
            text = text_of(main);
        }
    }

    if !is_substantial(&text) {
        for class_name in CONTENT_CLASSES {
            let block = document.select(&BLOCKS).find(|el| {
                !within(*el, BOILERPLATE_TAGS)
                    && el
                        .value()
                        .attr("class")
                        .is_some_and(|c| c.to_lowercase().contains(class_name))
            });
            if let Some(block) = block {
                text = text_of(block);
                if is_substantial(&text) {
                    break;
                }
            }
        }
    }

    if !is_substantial(&text) {
        text = document
            .select(&PARAGRAPHS)
            .filter(|p| !within(*p, BOILERPLATE_TAGS))
            .map(text_of)
            .filter(|p| p.chars().count() > MIN_PARAGRAPH_CHARS)
            .collect::<Vec<_>>()
            .join(" ");
    }

    let text = collapse_whitespace(&text);
    is_substantial(&text).then(|| clip(&text, MAX_CONTENT_CHARS).to_string())
}
