//! Production wiring from configuration. Only loopback addresses are used.

use std::sync::Arc;

use veracity_common::{Config, RequestStats, VeracityError, DEFAULT_MAX_SOURCES};
use veracity_engine::FactChecker;

fn config(serper_api_key: Option<&str>) -> Config {
    Config {
        serper_api_key: serper_api_key.map(str::to_string),
        // Nothing listens on the discard port.
        ollama_url: "http://127.0.0.1:9".to_string(),
        ollama_model: "llama3.2".to_string(),
        browserless_url: None,
        browserless_token: None,
        chrome_bin: "chromium".to_string(),
        max_sources: DEFAULT_MAX_SOURCES,
        query_pause_ms: 0,
        translation_enabled: false,
    }
}

#[tokio::test]
async fn missing_search_key_fails_construction() {
    let result = FactChecker::from_config(&config(None), Arc::new(RequestStats::new())).await;
    let Err(err) = result else {
        panic!("expected a configuration error");
    };
    assert!(matches!(
        err.downcast_ref::<VeracityError>(),
        Some(VeracityError::Config(m)) if m.contains("SERPER_API_KEY")
    ));
}

#[tokio::test]
async fn unreachable_model_server_does_not_block_construction() {
    let result = FactChecker::from_config(&config(Some("sk-test")), Arc::new(RequestStats::new())).await;
    assert!(result.is_ok());
}
