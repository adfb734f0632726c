use scraper::{ElementRef, Html, Selector};

use super::{clip, is_substantial, MAX_CONTENT_CHARS, MIN_CONTENT_CHARS};

/// Never visible in a rendered page.
pub(crate) const NON_RENDERED_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Containers probed on a rendered page when neither `article` nor `main`
/// holds enough text.
pub(crate) const CONTENT_SELECTORS: &[&str] = &[
    ".article-body",
    ".article-content",
    ".story-body",
    ".post-content",
    ".entry-content",
    ".content-body",
];

/// Paragraphs shorter than this are navigation crumbs, captions and the like.
pub(crate) const MIN_PARAGRAPH_CHARS: usize = 50;

// --- Text helpers ---

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text under `el`, skipping anything nested in one of `hidden` tags.
pub(crate) fn visible_text(el: ElementRef<'_>, hidden: &[&str]) -> String {
    let parts: Vec<&str> = el
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let is_hidden = node
                .ancestors()
                .any(|a| a.value().as_element().is_some_and(|e| hidden.contains(&e.name())));
            (!is_hidden).then_some(&**text)
        })
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();
    collapse_whitespace(&parts.join(" "))
}

/// True when `el` is, or sits inside, one of `tags`.
pub(crate) fn within(el: ElementRef<'_>, tags: &[&str]) -> bool {
    tags.contains(&el.value().name())
        || el
            .ancestors()
            .any(|a| a.value().as_element().is_some_and(|e| tags.contains(&e.name())))
}

// --- Rendered page probing ---

/// Read access to a rendered page, by CSS selector.
pub(crate) trait DomView {
    /// Text of the first element matching `selector`.
    fn first_text(&self, selector: &str) -> Option<String>;
    /// Text of every element matching `selector`, in document order.
    fn all_texts(&self, selector: &str) -> Vec<String>;
}

/// Probe a rendered page for its article body: `article`, then `main`, then
/// common content containers, then all substantial paragraphs.
pub(crate) fn probe_rendered(dom: &impl DomView) -> Option<String> {
    let mut text = dom.first_text("article").unwrap_or_default();

    if !is_substantial(&text) {
        if let Some(main) = dom.first_text("main") {
            text = main;
        }
    }

    if !is_substantial(&text) {
        for selector in CONTENT_SELECTORS {
            if let Some(found) = dom.first_text(selector) {
                text = found;
                if is_substantial(&text) {
                    break;
                }
            }
        }
    }

    if !is_substantial(&text) {
        text = dom
            .all_texts("p")
            .into_iter()
            .filter(|p| p.chars().count() > MIN_PARAGRAPH_CHARS)
            .collect::<Vec<_>>()
            .join(" ");
    }

    let text = text.trim();
    (text.chars().count() > MIN_CONTENT_CHARS).then(|| clip(text, MAX_CONTENT_CHARS).to_string())
}

/// A DOM dump parsed locally.
pub(crate) struct ParsedDom {
    document: Html,
}

impl ParsedDom {
    pub(crate) fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }
}

impl DomView for ParsedDom {
    fn first_text(&self, selector: &str) -> Option<String> {
        let selector = Selector::parse(selector).ok()?;
        self.document
            .select(&selector)
            .next()
            .map(|el| visible_text(el, NON_RENDERED_TAGS))
    }

    fn all_texts(&self, selector: &str) -> Vec<String> {
        let Ok(selector) = Selector::parse(selector) else {
            return Vec::new();
        };
        self.document
            .select(&selector)
            .map(|el| visible_text(el, NON_RENDERED_TAGS))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentence(seed: &str, n: usize) -> String {
        format!("{seed} reported the figures in detail today. ").repeat(n)
    }

    #[test]
    fn visible_text_skips_scripts() {
        let doc = Html::parse_document(
            "<div id='x'><p>Hello <b>world</b></p><script>var a = 1;</script></div>",
        );
        let sel = Selector::parse("#x").unwrap();
        let el = doc.select(&sel).next().unwrap();
        assert_eq!(visible_text(el, NON_RENDERED_TAGS), "Hello world");
    }

    #[test]
    fn probe_prefers_article() {
        let html = format!(
            "<html><body><main>{}</main><article>{}</article></body></html>",
            sentence("Main", 20),
            sentence("Article", 20)
        );
        let text = probe_rendered(&ParsedDom::parse(&html)).unwrap();
        assert!(text.starts_with("Article reported"));
    }

    #[test]
    fn probe_falls_through_to_content_class() {
        let html = format!(
            "<html><body><article>tiny</article><div class='story-body'>{}</div></body></html>",
            sentence("Story", 20)
        );
        let text = probe_rendered(&ParsedDom::parse(&html)).unwrap();
        assert!(text.starts_with("Story reported"));
    }

    #[test]
    fn probe_joins_long_paragraphs() {
        let paragraphs: String = (0..10)
            .map(|i| format!("<p>{}</p><p>short {i}</p>", sentence("Paragraph", 2)))
            .collect();
        let html = format!("<html><body><div>{paragraphs}</div></body></html>");
        let text = probe_rendered(&ParsedDom::parse(&html)).unwrap();
        assert!(!text.contains("short"));
        assert!(text.chars().count() > MIN_CONTENT_CHARS);
    }

    #[test]
    fn probe_none_for_thin_pages() {
        let html = "<html><body><p>Subscribe to continue reading.</p></body></html>";
        assert!(probe_rendered(&ParsedDom::parse(html)).is_none());
    }
}
