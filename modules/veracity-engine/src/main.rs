use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ai_client::Ollama;
use veracity_common::{Claim, Config, RequestStats};
use veracity_engine::extraction::ExtractionCascade;
use veracity_engine::FactChecker;

#[derive(Parser)]
#[command(name = "veracity", about = "Evidence-backed claim verification")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify a claim as REAL, FAKE or UNVERIFIED
    Classify {
        text: String,
        /// Topic hint added to search queries ("all" for none)
        #[arg(long, default_value = "all")]
        category: String,
        /// Language the claim is written in
        #[arg(long, default_value = "en", value_parser = ["en", "hi"])]
        language: String,
    },
    /// Run the extraction cascade against one URL and print the text
    Extract { url: String },
    /// Check that the model server is up and the configured model is pulled
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Command::Classify {
            text,
            category,
            language,
        } => {
            let claim = Claim::new(text)?
                .with_category(category)
                .with_language(language);
            let stats = Arc::new(RequestStats::new());
            let checker = FactChecker::from_config(&config, stats.clone()).await?;

            let report = checker.classify(&claim).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
            info!(stats = ?stats.snapshot(), "Done");
        }
        Command::Extract { url } => {
            let cascade = ExtractionCascade::from_config(&config);
            let text = cascade
                .run(&url)
                .await
                .with_context(|| format!("No strategy extracted usable content from {url}"))?;
            println!("{text}");
        }
        Command::Health => {
            let ollama = Ollama::new(&config.ollama_url, &config.ollama_model);
            ollama.ensure_model().await?;
            let models = ollama.list_models().await?;
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "status": "ok",
                    "ollama_url": ollama.base_url(),
                    "model": config.ollama_model,
                    "models": models,
                }))?
            );
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout stays machine-readable. `LOG_FORMAT=json`
/// switches to structured output.
fn init_tracing() -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive("veracity=info".parse()?);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}
