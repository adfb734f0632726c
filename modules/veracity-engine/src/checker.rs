//! Request pipeline: translate, gather, verify, ask the model, arbitrate.

use std::sync::Arc;
use std::time::{Duration, Instant};

use ai_client::{
    detect_gpu_layers, truncate_to_char_boundary, CompletionOptions, Ollama, TextCompletion,
    DEFAULT_GPU_LAYERS,
};
use anyhow::Result;
use tracing::{info, warn};
use uuid::Uuid;
use veracity_common::{Claim, Config, RequestStats, Verdict, MIN_SOURCES};

use crate::arbiter::arbitrate;
use crate::entities::{EntityExtractor, PatternEntityExtractor};
use crate::extraction::ExtractionCascade;
use crate::gatherer::{EvidenceGatherer, GatherConfig};
use crate::prompt::build_prompt;
use crate::report::{ClassificationReport, SourceAnalysis, VerificationQuality};
use crate::search::SerperSearcher;
use crate::translate::{localized_label, GoogleTranslator, NoopTranslator, Translator};
use crate::verifier::verify;

const ERROR_MESSAGE_CHARS: usize = 100;

pub struct FactChecker {
    gatherer: EvidenceGatherer,
    entities: Box<dyn EntityExtractor>,
    model: Arc<dyn TextCompletion>,
    translator: Arc<dyn Translator>,
    stats: Arc<RequestStats>,
    gpu_layers: u32,
}

impl FactChecker {
    pub fn new(
        gatherer: EvidenceGatherer,
        model: Arc<dyn TextCompletion>,
        translator: Arc<dyn Translator>,
        stats: Arc<RequestStats>,
    ) -> Self {
        Self {
            gatherer,
            entities: Box::new(PatternEntityExtractor),
            model,
            translator,
            stats,
            gpu_layers: DEFAULT_GPU_LAYERS,
        }
    }

    pub fn with_gpu_layers(mut self, gpu_layers: u32) -> Self {
        self.gpu_layers = gpu_layers;
        self
    }

    pub fn with_entity_extractor(mut self, entities: Box<dyn EntityExtractor>) -> Self {
        self.entities = entities;
        self
    }

    /// Wire the production providers: Serper search, the extraction
    /// cascade, Ollama and (when enabled) Google translation.
    pub async fn from_config(config: &Config, stats: Arc<RequestStats>) -> Result<Self> {
        let searcher = Arc::new(SerperSearcher::new(config.require_serper_key()?));
        let cascade = Arc::new(ExtractionCascade::from_config(config));
        info!(strategies = ?cascade.strategy_names(), "Extraction cascade ready");

        let gatherer = EvidenceGatherer::new(searcher, cascade).with_config(GatherConfig {
            max_results: config.max_sources,
            query_pause: Duration::from_millis(config.query_pause_ms),
            ..GatherConfig::default()
        });

        let translator: Arc<dyn Translator> = if config.translation_enabled {
            Arc::new(GoogleTranslator::new())
        } else {
            Arc::new(NoopTranslator)
        };

        let model = Arc::new(Ollama::new(&config.ollama_url, &config.ollama_model));
        if let Err(e) = model.ensure_model().await {
            warn!(error = %e, "Model check failed, requests will report analysis errors");
        }
        let gpu_layers = detect_gpu_layers().await;
        info!(model = %config.ollama_model, gpu_layers, "Fact checker ready");

        Ok(Self::new(gatherer, model, translator, stats).with_gpu_layers(gpu_layers))
    }

    /// Classify one claim. Every failure mode ends in a report.
    pub async fn classify(&self, claim: &Claim) -> ClassificationReport {
        let started = Instant::now();
        let request_no = self.stats.record_request();
        let request_id = Uuid::new_v4();
        info!(%request_id, request_no, language = claim.language(), "Classifying claim");

        let english = if claim.is_english() {
            claim.clone()
        } else {
            let text = self.translator.translate(claim.text(), "auto", "en").await;
            claim.with_text(text)
        };

        let mut report = self.classify_english(request_id, &english).await;

        if !claim.is_english() {
            self.localize(&mut report, claim.language()).await;
        }

        report.processing_time_secs = started.elapsed().as_secs_f64();
        info!(
            %request_id,
            label = %report.label,
            confidence = report.confidence,
            secs = report.processing_time_secs,
            "Claim classified"
        );
        report
    }

    async fn classify_english(&self, request_id: Uuid, claim: &Claim) -> ClassificationReport {
        let category = claim.category_label();
        let language = claim.language();

        let entities = self.entities.extract(claim.text());
        let evidence = self.gatherer.gather(claim.text(), claim.category()).await;

        if !evidence.is_sufficient() {
            warn!(%request_id, found = evidence.len(), "Insufficient sources");
            self.stats.record_failure();
            let mut report = ClassificationReport::new(
                request_id,
                Verdict::unverified("Not enough credible sources to verify this claim."),
                category,
                language,
            )
            .with_evidence(&evidence);
            report.sources_found = Some(evidence.len());
            report.search_error = Some(format!(
                "Insufficient sources ({}/{MIN_SOURCES}). Cannot verify.",
                evidence.len()
            ));
            report.entities_extracted = Some(entities);
            return report;
        }

        let verification = verify(claim.text(), &evidence, &entities, claim.category());

        let prompt = build_prompt(claim.text(), claim.category(), &evidence, &verification);
        let raw = match self.complete(&prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(%request_id, error = %e, "Model unavailable");
                self.stats.record_failure();
                let message = e.to_string();
                let mut report = ClassificationReport::new(
                    request_id,
                    Verdict::unverified(format!(
                        "Analysis error: {}. Unable to verify.",
                        truncate_to_char_boundary(&message, ERROR_MESSAGE_CHARS)
                    )),
                    category,
                    language,
                )
                .with_evidence(&evidence);
                report.entities_extracted = Some(entities);
                report.verification_layers = Some(verification);
                return report;
            }
        };

        let decision = arbitrate(&raw, &verification);

        let mut report = ClassificationReport::new(request_id, decision.verdict, category, language)
            .with_evidence(&evidence);
        report.source_analysis = Some(SourceAnalysis::build(&evidence, &verification, &entities));
        report.verification_quality =
            Some(VerificationQuality::from_consensus(verification.consensus_score));
        report.decision_basis = Some(decision.basis);
        report.overrides_applied = decision.overrides;
        report.model_used = Some(self.model.model().to_string());
        report.entities_extracted = Some(entities);
        report.verification_layers = Some(verification);

        self.stats.record_success();
        report
    }

    /// One accelerated attempt, then one without acceleration.
    async fn complete(&self, prompt: &str) -> Result<String> {
        let accelerated = CompletionOptions::accelerated(self.gpu_layers);
        match self.model.complete(prompt, &accelerated).await {
            Ok(completion) => Ok(completion.text),
            Err(e) => {
                warn!(error = %e, "Accelerated completion failed, retrying on CPU");
                let completion = self
                    .model
                    .complete(prompt, &CompletionOptions::cpu_only())
                    .await?;
                Ok(completion.text)
            }
        }
    }

    async fn localize(&self, report: &mut ClassificationReport, language: &str) {
        report.explanation = self
            .translator
            .translate(&report.explanation, "en", language)
            .await;
        if let Some(error) = report.search_error.take() {
            report.search_error = Some(self.translator.translate(&error, "en", language).await);
        }
        report.label_translated = localized_label(report.label, language).map(str::to_string);
    }
}
