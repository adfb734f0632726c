use serde::{Deserialize, Serialize};

// --- /scrape request ---

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeRequest {
    pub url: String,
    pub elements: Vec<ElementSelector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goto_options: Option<GotoOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_for_selector: Option<WaitForSelector>,
    /// Keep going when an awaited event (page load, selector wait) times out.
    pub best_attempt: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementSelector {
    pub selector: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GotoOptions {
    /// Navigation timeout in milliseconds.
    pub timeout: u64,
    pub wait_until: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WaitForSelector {
    pub selector: String,
    /// Wait timeout in milliseconds.
    pub timeout: u64,
}

// --- /scrape response ---

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScrapeResponse {
    #[serde(default)]
    pub data: Vec<SelectorMatches>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelectorMatches {
    #[serde(default)]
    pub selector: String,
    #[serde(default)]
    pub results: Vec<ScrapedElement>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScrapedElement {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub html: String,
}

impl ScrapeResponse {
    /// Rendered text of every element matched by `selector`, in document order.
    pub fn texts(&self, selector: &str) -> Vec<&str> {
        self.data
            .iter()
            .filter(|m| m.selector == selector)
            .flat_map(|m| m.results.iter().map(|r| r.text.as_str()))
            .collect()
    }
}
