use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};
use veracity_common::Label;

const GOOGLE_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// Longest text sent in one provider call, in characters.
pub const MAX_CHUNK_CHARS: usize = 4500;

// --- Translator trait ---

#[async_trait]
pub trait Translator: Send + Sync {
    /// One provider call for at most [`MAX_CHUNK_CHARS`] characters.
    async fn translate_chunk(&self, text: &str, source: &str, target: &str) -> Result<String>;

    fn name(&self) -> &str;

    /// Translate `text`, chunking long input. Never fails: a failed chunk
    /// keeps its original text.
    async fn translate(&self, text: &str, source: &str, target: &str) -> String {
        if (source == target && source != "auto") || text.trim().is_empty() {
            return text.to_string();
        }

        let chunks = split_chunks(text, MAX_CHUNK_CHARS);
        let mut translated = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            match self.translate_chunk(chunk, source, target).await {
                Ok(t) => translated.push(t),
                Err(e) => {
                    warn!(translator = self.name(), error = %e, "Translation failed, keeping original text");
                    translated.push(chunk.to_string());
                }
            }
        }

        info!(translator = self.name(), source, target, chunks = chunks.len(), "Translated text");
        translated.join(" ")
    }
}

fn split_chunks(text: &str, max_chars: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let end = rest
            .char_indices()
            .nth(max_chars)
            .map(|(idx, _)| idx)
            .unwrap_or(rest.len());
        chunks.push(&rest[..end]);
        rest = &rest[end..];
    }
    chunks
}

/// Localized display name of a label, for languages that have one.
pub fn localized_label(label: Label, language: &str) -> Option<&'static str> {
    match language {
        "hi" => Some(match label {
            Label::Real => "सच",
            Label::Fake => "झूठ",
            Label::Unverified => "अप्रमाणित",
        }),
        _ => None,
    }
}

// --- Noop ---

/// Returns text unchanged. Used when translation is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTranslator;

#[async_trait]
impl Translator for NoopTranslator {
    async fn translate_chunk(&self, text: &str, _source: &str, _target: &str) -> Result<String> {
        Ok(text.to_string())
    }

    fn name(&self) -> &str {
        "noop"
    }
}

// --- Google ---

/// Google Translate's keyless web endpoint.
pub struct GoogleTranslator {
    client: reqwest::Client,
    endpoint: String,
}

impl GoogleTranslator {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(15))
                .build()
                .expect("Failed to build HTTP client"),
            endpoint: GOOGLE_ENDPOINT.to_string(),
        }
    }
}

impl Default for GoogleTranslator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate_chunk(&self, text: &str, source: &str, target: &str) -> Result<String> {
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", source),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .context("Translate request failed")?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("Translate returned HTTP {status}");
        }

        let body: Value = resp.json().await.context("Failed to parse translate response")?;
        parse_google_response(&body).context("Unexpected translate response shape")
    }

    fn name(&self) -> &str {
        "google"
    }
}

/// Concatenate the translated segments of a `translate_a/single` reply:
/// `[[["translated", "original", ...], ...], ...]`.
fn parse_google_response(body: &Value) -> Option<String> {
    let segments = body.get(0)?.as_array()?;
    let text: String = segments
        .iter()
        .filter_map(|seg| seg.get(0)?.as_str())
        .collect();
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Upper-cases chunks and fails any chunk containing "!".
    #[derive(Default)]
    struct Shouting {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Translator for Shouting {
        async fn translate_chunk(&self, text: &str, _source: &str, _target: &str) -> Result<String> {
            self.calls.lock().unwrap().push(text.to_string());
            if text.contains('!') {
                anyhow::bail!("rejected");
            }
            Ok(text.to_uppercase())
        }

        fn name(&self) -> &str {
            "shouting"
        }
    }

    #[tokio::test]
    async fn same_language_and_blank_short_circuit() {
        let t = Shouting::default();
        assert_eq!(t.translate("hello", "en", "en").await, "hello");
        assert_eq!(t.translate("   ", "hi", "en").await, "   ");
        assert!(t.calls.lock().unwrap().is_empty());

        assert_eq!(t.translate("hello", "auto", "auto").await, "HELLO");
    }

    #[tokio::test]
    async fn long_text_is_chunked_and_failed_chunks_kept() {
        let t = Shouting::default();
        let text = format!("{}{}", "a".repeat(MAX_CHUNK_CHARS), "b!");
        let out = t.translate(&text, "en", "hi").await;

        assert_eq!(t.calls.lock().unwrap().len(), 2);
        assert_eq!(out, format!("{} b!", "A".repeat(MAX_CHUNK_CHARS)));
    }

    #[test]
    fn chunks_split_on_char_boundaries() {
        let text = "नमस्ते".repeat(3);
        let chunks = split_chunks(&text, 5);
        assert_eq!(chunks.concat(), text);
        assert!(chunks.iter().all(|c| c.chars().count() <= 5));
    }

    #[test]
    fn parses_google_segments() {
        let body: Value = serde_json::from_str(
            r#"[[["Hello. ","नमस्ते।",null,null,10],["How are you?","आप कैसे हैं?",null,null,10]],null,"hi"]"#,
        )
        .unwrap();
        assert_eq!(parse_google_response(&body).unwrap(), "Hello. How are you?");
        assert!(parse_google_response(&Value::Null).is_none());
    }

    #[test]
    fn hindi_labels() {
        assert_eq!(localized_label(Label::Fake, "hi"), Some("झूठ"));
        assert_eq!(localized_label(Label::Real, "en"), None);
    }
}
