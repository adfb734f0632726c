use serde::{Deserialize, Serialize};

use crate::traits::CompletionOptions;

// =============================================================================
// Generate
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub(crate) struct GenerateRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub stream: bool,
    pub options: &'a CompletionOptions,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GenerateResponse {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub prompt_eval_count: Option<u64>,
    #[serde(default)]
    pub eval_count: Option<u64>,
    /// Generation time in nanoseconds.
    #[serde(default)]
    pub eval_duration: Option<u64>,
}

// =============================================================================
// Tags
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TagsResponse {
    #[serde(default)]
    pub models: Vec<ModelTag>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ModelTag {
    #[serde(default)]
    pub name: String,
}
