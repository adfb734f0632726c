//! End-to-end classification against mocked search, extraction, model and
//! translation. No network.

use std::sync::Arc;
use std::time::Duration;

use ai_client::CompletionOptions;
use veracity_common::{Claim, Label, RequestStats};
use veracity_engine::arbiter::{DecisionBasis, Override};
use veracity_engine::gatherer::{EvidenceGatherer, GatherConfig};
use veracity_engine::testing::{hit, MockCompletion, MockExtractor, MockSearcher, MockTranslator};
use veracity_engine::translate::{NoopTranslator, Translator};
use veracity_engine::FactChecker;

const FUNDING_CLAIM: &str = "Acme Corp raised $2 billion in new funding";
const DEATH_CLAIM: &str = "Famous actor Ravi Kumar died yesterday";

const REAL_REPLY: &str =
    r#"{"label": "REAL", "confidence": 0.9, "explanation": "Wire services report the round."}"#;

fn padded(lead: &str) -> String {
    format!(
        "{lead} The round was led by existing investors and will pay for expansion across \
         several markets over the coming years. Company executives described the deal as a \
         milestone and said hiring plans would be shared with staff later this quarter. \
         Analysts expect further details once regulators complete their review."
    )
}

fn funding_web() -> (MockSearcher, MockExtractor) {
    let searcher = MockSearcher::new().on_query(
        FUNDING_CLAIM,
        vec![
            hit("https://www.reuters.com/business/acme", "Acme Corp raises $2 billion"),
            hit("https://apnews.com/article/acme", "Acme Corp funding round"),
            hit("https://www.bbc.com/news/business-acme", "Acme Corp closes round"),
        ],
    );
    let extractor = MockExtractor::new()
        .on_url(
            "https://www.reuters.com/business/acme",
            &padded("Acme Corp raised $2 billion in new funding, the company confirmed on Tuesday."),
        )
        .on_url(
            "https://apnews.com/article/acme",
            &padded("Acme Corp has raised $2 billion in new funding according to a filing."),
        )
        .on_url(
            "https://www.bbc.com/news/business-acme",
            &padded("Acme Corp raised $2 billion in new funding, the firm said."),
        );
    (searcher, extractor)
}

fn death_web() -> (MockSearcher, MockExtractor) {
    let searcher = MockSearcher::new().on_query(
        DEATH_CLAIM,
        vec![
            hit("https://www.bbc.com/news/kumar", "Ravi Kumar rumours"),
            hit("https://www.thehindu.com/entertainment/kumar", "Actor shoots new film"),
        ],
    );
    let extractor = MockExtractor::new()
        .on_url(
            "https://www.bbc.com/news/kumar",
            &padded("Ravi Kumar is alive and well, his family told reporters after rumours spread online."),
        )
        .on_url(
            "https://www.thehindu.com/entertainment/kumar",
            &padded("The actor was on set in Mumbai this week filming his next project."),
        );
    (searcher, extractor)
}

fn checker(
    searcher: MockSearcher,
    extractor: MockExtractor,
    model: Arc<MockCompletion>,
    translator: Arc<dyn Translator>,
    stats: Arc<RequestStats>,
) -> FactChecker {
    let gatherer = EvidenceGatherer::new(Arc::new(searcher), Arc::new(extractor)).with_config(
        GatherConfig {
            query_pause: Duration::ZERO,
            ..GatherConfig::default()
        },
    );
    FactChecker::new(gatherer, model, translator, stats)
}

fn english(searcher: MockSearcher, extractor: MockExtractor, model: Arc<MockCompletion>) -> FactChecker {
    checker(
        searcher,
        extractor,
        model,
        Arc::new(NoopTranslator),
        Arc::new(RequestStats::new()),
    )
}

#[tokio::test]
async fn corroborated_funding_claim_is_real() {
    let (searcher, extractor) = funding_web();
    let model = Arc::new(MockCompletion::replying(REAL_REPLY));
    let checker = english(searcher, extractor, model.clone());

    let report = checker.classify(&Claim::new(FUNDING_CLAIM).unwrap()).await;

    assert_eq!(report.label, Label::Real);
    assert!((report.confidence - 0.9).abs() < 1e-9);
    assert_eq!(report.decision_basis, Some(DecisionBasis::Model));
    assert!(report.overrides_applied.is_empty());
    assert_eq!(report.total_sources_checked, 3);
    assert_eq!(report.trusted_sources, 3);
    assert_eq!(report.model_used.as_deref(), Some("mock-model"));

    let layers = report.verification_layers.as_ref().unwrap();
    assert_eq!(layers.contradicting_sources, 0);
    assert_eq!(layers.consensus_score, 1.0);
    assert!(layers.numerical_verification.contradictions.is_empty());

    let prompt = model.last_prompt().unwrap();
    assert!(prompt.contains(&format!("CLAIM: {FUNDING_CLAIM}")));
    assert!(prompt.contains("'$2 billion': confirmed by 3/3 sources"));
}

#[tokio::test]
async fn alive_source_makes_death_claim_fake() {
    let (searcher, extractor) = death_web();
    let model = Arc::new(MockCompletion::replying(
        r#"{"label": "REAL", "confidence": 0.6, "explanation": "Reports mention the actor."}"#,
    ));
    let checker = english(searcher, extractor, model);

    let report = checker.classify(&Claim::new(DEATH_CLAIM).unwrap()).await;

    assert_eq!(report.label, Label::Fake);
    assert!(report.confidence >= 0.85);
    assert_eq!(report.overrides_applied[0], Override::Contradictions);

    let analysis = report.source_analysis.as_ref().unwrap();
    assert_eq!(analysis.contradictions.len(), 1);
    assert_eq!(analysis.contradictions[0].kind, "life_status_contradiction");
    assert!(analysis.contradictions[0].evidence.contains("alive and well"));
}

#[tokio::test]
async fn single_result_is_unverified_without_calling_the_model() {
    let searcher = MockSearcher::new().on_query(
        FUNDING_CLAIM,
        vec![hit("https://www.reuters.com/business/acme", "Acme Corp raises $2 billion")],
    );
    let extractor = MockExtractor::new().on_url(
        "https://www.reuters.com/business/acme",
        &padded("Acme Corp raised $2 billion in new funding."),
    );
    let model = Arc::new(MockCompletion::replying(REAL_REPLY));
    let stats = Arc::new(RequestStats::new());
    let checker = checker(searcher.clone(), extractor, model.clone(), Arc::new(NoopTranslator), stats.clone());

    let report = checker.classify(&Claim::new(FUNDING_CLAIM).unwrap()).await;

    assert_eq!(report.label, Label::Unverified);
    assert_eq!(report.confidence, 0.5);
    assert_eq!(report.sources_found, Some(1));
    assert_eq!(
        report.search_error.as_deref(),
        Some("Insufficient sources (1/2). Cannot verify.")
    );
    assert_eq!(report.explanation, "Not enough credible sources to verify this claim.");
    assert!(report.verification_layers.is_none());
    assert_eq!(model.call_count(), 0);
    assert_eq!(searcher.queries().len(), 3);
    assert_eq!(stats.snapshot().errors, 1);
}

#[tokio::test]
async fn model_failure_retries_without_acceleration() {
    let (searcher, extractor) = funding_web();
    let model = Arc::new(MockCompletion::failing("connection refused"));
    let stats = Arc::new(RequestStats::new());
    let checker = checker(searcher, extractor, model.clone(), Arc::new(NoopTranslator), stats.clone())
        .with_gpu_layers(24);

    let report = checker.classify(&Claim::new(FUNDING_CLAIM).unwrap()).await;

    assert_eq!(report.label, Label::Unverified);
    assert_eq!(report.confidence, 0.5);
    assert_eq!(report.explanation, "Analysis error: connection refused. Unable to verify.");
    assert!(report.verification_layers.is_some());
    assert_eq!(
        model.options_used(),
        vec![CompletionOptions::accelerated(24), CompletionOptions::cpu_only()]
    );
    assert_eq!(stats.snapshot().errors, 1);
    assert_eq!(stats.snapshot().successful, 0);
}

#[tokio::test]
async fn retry_on_cpu_can_recover() {
    let (searcher, extractor) = funding_web();
    let model = Arc::new(MockCompletion::replying(REAL_REPLY).then_fail("out of memory"));
    let checker = english(searcher, extractor, model.clone());

    let report = checker.classify(&Claim::new(FUNDING_CLAIM).unwrap()).await;

    assert_eq!(report.label, Label::Real);
    assert_eq!(model.call_count(), 2);
    assert!(!model.options_used()[1].is_accelerated());
}

#[tokio::test]
async fn long_model_errors_are_truncated() {
    let (searcher, extractor) = funding_web();
    let model = Arc::new(MockCompletion::failing(&"x".repeat(300)));
    let checker = english(searcher, extractor, model);

    let report = checker.classify(&Claim::new(FUNDING_CLAIM).unwrap()).await;

    assert_eq!(
        report.explanation,
        format!("Analysis error: {}. Unable to verify.", "x".repeat(100))
    );
}

#[tokio::test]
async fn malformed_reply_falls_back_to_rules() {
    let (searcher, extractor) = funding_web();
    let model = Arc::new(MockCompletion::replying("I believe this is probably true."));
    let checker = english(searcher, extractor, model);

    let report = checker.classify(&Claim::new(FUNDING_CLAIM).unwrap()).await;

    assert_eq!(report.decision_basis, Some(DecisionBasis::RuleFallback));
    assert_eq!(report.label, Label::Real);
    assert!((report.confidence - 0.8).abs() < 1e-9);
    assert_eq!(report.explanation, "3 credible sources confirm this.");
}

#[tokio::test]
async fn counters_track_outcomes_across_requests() {
    let stats = Arc::new(RequestStats::new());

    let (searcher, extractor) = funding_web();
    let ok = checker(
        searcher,
        extractor,
        Arc::new(MockCompletion::replying(REAL_REPLY)),
        Arc::new(NoopTranslator),
        stats.clone(),
    );
    ok.classify(&Claim::new(FUNDING_CLAIM).unwrap()).await;
    ok.classify(&Claim::new(FUNDING_CLAIM).unwrap()).await;

    let empty = checker(
        MockSearcher::new(),
        MockExtractor::new(),
        Arc::new(MockCompletion::replying(REAL_REPLY)),
        Arc::new(NoopTranslator),
        stats.clone(),
    );
    empty.classify(&Claim::new("Nothing anywhere supports this").unwrap()).await;

    let snap = stats.snapshot();
    assert_eq!(snap.total_requests, 3);
    assert_eq!(snap.successful, 2);
    assert_eq!(snap.errors, 1);
    let rate = snap.success_rate.unwrap();
    assert!((rate - 200.0 / 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn hindi_claim_is_translated_both_ways() {
    let hindi_claim = "एक्मे कॉर्प ने नई फंडिंग में 2 अरब डॉलर जुटाए";
    let translator = Arc::new(
        MockTranslator::new()
            .on_text(hindi_claim, "en", FUNDING_CLAIM)
            .on_text("Wire services report the round.", "hi", "समाचार एजेंसियों ने पुष्टि की।"),
    );
    let (searcher, extractor) = funding_web();
    let checker = checker(
        searcher.clone(),
        extractor,
        Arc::new(MockCompletion::replying(REAL_REPLY)),
        translator.clone(),
        Arc::new(RequestStats::new()),
    );

    let claim = Claim::new(hindi_claim).unwrap().with_language("hi");
    let report = checker.classify(&claim).await;

    assert_eq!(searcher.queries()[0], FUNDING_CLAIM);
    assert_eq!(report.label, Label::Real);
    assert_eq!(report.label_translated.as_deref(), Some("सच"));
    assert_eq!(report.explanation, "समाचार एजेंसियों ने पुष्टि की।");
    assert_eq!(report.language, "hi");

    let calls = translator.calls();
    assert_eq!(calls[0].1, "auto");
    assert_eq!(calls[0].2, "en");
    assert_eq!(calls[1].2, "hi");
}

#[tokio::test]
async fn category_is_used_in_queries_and_report() {
    let (searcher, extractor) = funding_web();
    let checker = english(searcher.clone(), extractor, Arc::new(MockCompletion::replying(REAL_REPLY)));

    let claim = Claim::new(FUNDING_CLAIM).unwrap().with_category("Finance");
    let report = checker.classify(&claim).await;

    assert_eq!(report.category, "finance");
    assert_eq!(searcher.queries()[1], format!("{FUNDING_CLAIM} finance"));
}
