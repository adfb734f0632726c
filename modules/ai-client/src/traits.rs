use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// =============================================================================
// Completion Options
// =============================================================================

/// Sampling and runtime options for a single completion call.
///
/// Field names follow the Ollama `options` object so the struct can be sent
/// on the wire unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionOptions {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    /// Context window in tokens.
    pub num_ctx: u32,
    /// Maximum number of tokens to generate.
    pub num_predict: u32,
    pub num_thread: u32,
    pub repeat_penalty: f32,
    /// Hardware acceleration hint: number of layers offloaded to the GPU.
    /// `Some(0)` disables acceleration, `None` leaves it to the server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_gpu: Option<u32>,
}

impl CompletionOptions {
    /// Low-temperature options for deterministic verdicts, offloading
    /// `gpu_layers` layers to the accelerator.
    pub fn accelerated(gpu_layers: u32) -> Self {
        Self {
            temperature: 0.05,
            top_p: 0.85,
            top_k: 30,
            num_ctx: 8192,
            num_predict: 500,
            num_thread: 8,
            repeat_penalty: 1.15,
            num_gpu: Some(gpu_layers),
        }
    }

    /// Same sampling as [`CompletionOptions::accelerated`] with the GPU
    /// disabled and a smaller generation budget.
    pub fn cpu_only() -> Self {
        Self {
            num_predict: 400,
            num_thread: 2,
            num_gpu: Some(0),
            ..Self::accelerated(0)
        }
    }

    pub fn is_accelerated(&self) -> bool {
        self.num_gpu.is_some_and(|layers| layers > 0)
    }
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self::cpu_only()
    }
}

// =============================================================================
// Completion Result
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub generated_tokens: u64,
    pub generation_secs: f64,
}

impl TokenUsage {
    pub fn tokens_per_sec(&self) -> Option<f64> {
        (self.generation_secs > 0.0).then(|| self.generated_tokens as f64 / self.generation_secs)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub usage: Option<TokenUsage>,
}

// =============================================================================
// TextCompletion Trait
// =============================================================================

/// A prompt-in, text-out language model. Non-success responses and transport
/// failures are both surfaced as `Err`.
#[async_trait]
pub trait TextCompletion: Send + Sync {
    async fn complete(&self, prompt: &str, options: &CompletionOptions) -> Result<Completion>;

    /// Model identifier reported back to callers.
    fn model(&self) -> &str;
}
