use std::env;

use crate::error::VeracityError;
use crate::types::DEFAULT_MAX_SOURCES;

/// Application configuration loaded from environment variables (and a `.env`
/// file when present).
#[derive(Debug, Clone)]
pub struct Config {
    // Search (only classification needs it)
    pub serper_api_key: Option<String>,

    // Language model
    pub ollama_url: String,
    pub ollama_model: String,

    // Headless rendering (Browserless when set, local Chromium otherwise)
    pub browserless_url: Option<String>,
    pub browserless_token: Option<String>,
    pub chrome_bin: String,

    // Gathering
    pub max_sources: usize,
    pub query_pause_ms: u64,

    // Translation
    pub translation_enabled: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, VeracityError> {
        dotenvy::dotenv().ok();

        let config = Self {
            serper_api_key: env::var("SERPER_API_KEY").ok().filter(|v| !v.is_empty()),
            ollama_url: env::var("OLLAMA_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            ollama_model: env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3.2".to_string()),
            browserless_url: env::var("BROWSERLESS_URL").ok().filter(|v| !v.is_empty()),
            browserless_token: env::var("BROWSERLESS_TOKEN").ok().filter(|v| !v.is_empty()),
            chrome_bin: env::var("CHROME_BIN").unwrap_or_else(|_| "chromium".to_string()),
            max_sources: parse_env("MAX_SOURCES", DEFAULT_MAX_SOURCES)?,
            query_pause_ms: parse_env("QUERY_PAUSE_MS", 1000)?,
            translation_enabled: parse_env("TRANSLATION_ENABLED", true)?,
        };

        config.log_keys();
        Ok(config)
    }

    /// The Serper key, or a configuration error naming the missing variable.
    pub fn require_serper_key(&self) -> Result<&str, VeracityError> {
        self.serper_api_key.as_deref().ok_or_else(|| {
            VeracityError::Config("SERPER_API_KEY environment variable is required".to_string())
        })
    }

    fn log_keys(&self) {
        fn preview(val: &str) -> String {
            let n = val.len().min(5);
            format!("{}...({} chars)", &val[..n], val.len())
        }
        fn preview_opt(val: &Option<String>) -> String {
            match val {
                Some(v) if !v.is_empty() => preview(v),
                _ => "<not set>".to_string(),
            }
        }

        tracing::info!("Config loaded:");
        tracing::info!("  SERPER_API_KEY: {}", preview_opt(&self.serper_api_key));
        tracing::info!("  OLLAMA_URL: {}", self.ollama_url);
        tracing::info!("  OLLAMA_MODEL: {}", self.ollama_model);
        tracing::info!("  BROWSERLESS_URL: {}", preview_opt(&self.browserless_url));
        tracing::info!("  BROWSERLESS_TOKEN: {}", preview_opt(&self.browserless_token));
        tracing::info!("  MAX_SOURCES: {}", self.max_sources);
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T, VeracityError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| VeracityError::Config(format!("{key} has an invalid value: {raw} ({e})"))),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_env_falls_back_to_default() {
        assert_eq!(parse_env("VERACITY_TEST_UNSET_KEY", 42usize).unwrap(), 42);
    }

    #[test]
    fn parse_env_rejects_garbage() {
        env::set_var("VERACITY_TEST_BAD_NUMBER", "many");
        let err = parse_env("VERACITY_TEST_BAD_NUMBER", 1usize).unwrap_err();
        env::remove_var("VERACITY_TEST_BAD_NUMBER");
        assert!(matches!(err, VeracityError::Config(ref m) if m.contains("VERACITY_TEST_BAD_NUMBER")));
    }

    fn config_without_key() -> Config {
        Config {
            serper_api_key: None,
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "llama3.2".to_string(),
            browserless_url: None,
            browserless_token: None,
            chrome_bin: "chromium".to_string(),
            max_sources: DEFAULT_MAX_SOURCES,
            query_pause_ms: 1000,
            translation_enabled: true,
        }
    }

    #[test]
    fn missing_serper_key_is_a_config_error() {
        let config = config_without_key();
        let err = config.require_serper_key().unwrap_err();
        assert!(matches!(err, VeracityError::Config(ref m) if m.contains("SERPER_API_KEY")));
    }

    #[test]
    fn serper_key_is_returned_when_set() {
        let config = Config {
            serper_api_key: Some("sk-test".to_string()),
            ..config_without_key()
        };
        assert_eq!(config.require_serper_key().unwrap(), "sk-test");
    }

    #[test]
    fn parse_env_reads_bools() {
        env::set_var("VERACITY_TEST_FLAG", "false");
        assert!(!parse_env("VERACITY_TEST_FLAG", true).unwrap());
        env::remove_var("VERACITY_TEST_FLAG");
    }
}
