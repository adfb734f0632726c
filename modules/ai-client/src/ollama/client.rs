use std::time::Duration;

use tracing::debug;

use super::types::*;
use crate::error::AiError;

const GENERATE_TIMEOUT: Duration = Duration::from_secs(600);
const TAGS_TIMEOUT: Duration = Duration::from_secs(5);

pub(crate) struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
}

impl OllamaClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn generate(&self, request: &GenerateRequest<'_>) -> Result<GenerateResponse, AiError> {
        let url = format!("{}/api/generate", self.base_url);

        debug!(model = request.model, num_gpu = ?request.options.num_gpu, "Ollama generate request");

        let response = self
            .http
            .post(&url)
            .timeout(GENERATE_TIMEOUT)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AiError::Api {
                status: status.as_u16(),
                message: crate::util::truncate_to_char_boundary(&message, 200).to_string(),
            });
        }

        decode(&response.text().await?)
    }

    pub async fn tags(&self) -> Result<TagsResponse, AiError> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self.http.get(&url).timeout(TAGS_TIMEOUT).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AiError::Api {
                status: status.as_u16(),
                message: "Ollama not responding".to_string(),
            });
        }

        decode(&response.text().await?)
    }
}

/// Decode a response body; malformed JSON is a parse error, not a network one.
fn decode<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, AiError> {
    Ok(serde_json::from_str(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_body_is_a_parse_error() {
        let err = decode::<TagsResponse>("<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, AiError::Parse(_)));
    }

    #[test]
    fn tags_body_decodes() {
        let tags: TagsResponse = decode(r#"{"models": [{"name": "llama3.2:latest"}]}"#).unwrap();
        assert_eq!(tags.models[0].name, "llama3.2:latest");
    }
}
