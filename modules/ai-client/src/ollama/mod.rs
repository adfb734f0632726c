mod client;
pub mod gpu;
pub(crate) mod types;

pub use gpu::{detect_gpu_layers, layers_for_memory, DEFAULT_GPU_LAYERS};

use crate::error::AiError;
use crate::traits::{Completion, CompletionOptions, TextCompletion, TokenUsage};
use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use client::OllamaClient;

// =============================================================================
// Ollama Agent
// =============================================================================

#[derive(Clone)]
pub struct Ollama {
    base_url: String,
    pub(crate) model: String,
}

impl Ollama {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn client(&self) -> OllamaClient {
        OllamaClient::new(&self.base_url)
    }

    /// Names of the models installed on the server.
    pub async fn list_models(&self) -> Result<Vec<String>, AiError> {
        let tags = self.client().tags().await?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Fail unless the server is reachable and has the configured model pulled.
    pub async fn ensure_model(&self) -> Result<(), AiError> {
        let names = self.list_models().await?;
        if !names.iter().any(|n| n.contains(&self.model)) {
            return Err(AiError::ModelMissing(format!(
                "{} (run: ollama pull {})",
                self.model, self.model
            )));
        }
        info!(model = %self.model, "Ollama model available");
        Ok(())
    }
}

#[async_trait]
impl TextCompletion for Ollama {
    async fn complete(&self, prompt: &str, options: &CompletionOptions) -> Result<Completion> {
        let request = types::GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options,
        };

        let response = self.client().generate(&request).await?;

        let usage = response.eval_count.map(|generated| TokenUsage {
            prompt_tokens: response.prompt_eval_count.unwrap_or(0),
            generated_tokens: generated,
            generation_secs: response.eval_duration.unwrap_or(0) as f64 / 1e9,
        });

        if let Some(usage) = usage {
            info!(
                model = %self.model,
                tokens = usage.generated_tokens,
                secs = usage.generation_secs,
                tokens_per_sec = usage.tokens_per_sec().unwrap_or(0.0),
                "Ollama generation complete"
            );
        }

        Ok(Completion {
            text: response.response,
            usage,
        })
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_response_tolerates_missing_counters() {
        let resp: types::GenerateResponse =
            serde_json::from_str(r#"{"response": "{\"label\": \"REAL\"}", "done": true}"#).unwrap();
        assert_eq!(resp.response, "{\"label\": \"REAL\"}");
        assert!(resp.eval_count.is_none());
    }

    #[test]
    fn generate_request_serializes_options_inline() {
        let options = CompletionOptions::cpu_only();
        let request = types::GenerateRequest {
            model: "llama3.2",
            prompt: "hello",
            stream: false,
            options: &options,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["num_gpu"], 0);
        assert_eq!(json["options"]["num_predict"], 400);
    }

    #[test]
    fn tags_response_collects_names() {
        let tags: types::TagsResponse =
            serde_json::from_str(r#"{"models": [{"name": "llama3.2:latest"}, {"name": "mistral"}]}"#)
                .unwrap();
        let names: Vec<_> = tags.models.into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["llama3.2:latest", "mistral"]);
    }
}
