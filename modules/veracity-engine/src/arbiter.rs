//! Reconciles the language model's opinion with the verifier's signals.
//!
//! The model's reply is trusted only as far as the evidence allows: a fixed
//! sequence of overrides runs after parsing, each one able to replace the
//! label and adjust confidence. When the reply cannot be parsed the verdict
//! comes from rules over the verification result alone.

use ai_client::extract_json_object;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};
use veracity_common::{Label, Verdict};

use crate::verifier::VerificationResult;

const MIN_CONFIDENCE: f64 = 0.1;
const MAX_CONFIDENCE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionBasis {
    /// Model reply, adjusted by overrides.
    Model,
    /// Rules over the verification result; the reply was unusable.
    RuleFallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Override {
    Contradictions,
    LowCredibility,
    StrongConsensus,
    LowConsensus,
    NumericalContradictions,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub verdict: Verdict,
    pub basis: DecisionBasis,
    /// Overrides that fired, in application order.
    pub overrides: Vec<Override>,
}

/// The model's reply as parsed, before any override.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelReply {
    /// Upper-cased; may be outside the known labels.
    pub label: String,
    pub confidence: f64,
    pub explanation: String,
}

/// Parse the first `{ ... }` span of a model reply. `None` when there is no
/// object, it is not valid JSON, or the confidence is not a finite number.
pub fn parse_model_reply(raw: &str) -> Option<ModelReply> {
    let json = extract_json_object(raw)?;
    let value: Value = serde_json::from_str(json).ok()?;
    let object = value.as_object()?;

    let label = match object.get("label") {
        None | Some(Value::Null) => "UNVERIFIED".to_string(),
        Some(Value::String(s)) => s.trim().to_uppercase(),
        Some(other) => other.to_string().to_uppercase(),
    };

    let confidence = match object.get("confidence") {
        None => 0.5,
        Some(Value::Number(n)) => n.as_f64()?,
        Some(Value::String(s)) => s.trim().parse::<f64>().ok()?,
        Some(_) => return None,
    };
    if !confidence.is_finite() {
        return None;
    }

    let explanation = match object.get("explanation") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };

    Some(ModelReply {
        label,
        confidence,
        explanation,
    })
}

/// Final verdict for a raw model reply.
pub fn arbitrate(raw: &str, verification: &VerificationResult) -> Decision {
    match parse_model_reply(raw) {
        Some(reply) => apply_overrides(reply, verification),
        None => {
            debug!("Model reply unusable, deciding from verification layers");
            Decision {
                verdict: fallback_verdict(verification),
                basis: DecisionBasis::RuleFallback,
                overrides: Vec::new(),
            }
        }
    }
}

/// Apply the override sequence to a parsed reply. Later overrides see the
/// label and confidence left by earlier ones.
pub fn apply_overrides(reply: ModelReply, v: &VerificationResult) -> Decision {
    let mut label = Label::parse(&reply.label);
    let mut confidence = reply.confidence;
    let mut overrides = Vec::new();

    if v.contradicting_sources > 0 {
        label = Some(Label::Fake);
        confidence = confidence.max(0.85);
        overrides.push(Override::Contradictions);
    }

    if v.avg_source_credibility < 0.6 {
        label = Some(Label::Unverified);
        confidence = confidence.min(0.6);
        overrides.push(Override::LowCredibility);
    }

    if v.consensus_score >= 0.7 && v.avg_source_credibility >= 0.8 && label == Some(Label::Fake) {
        label = Some(Label::Real);
        confidence = 0.8;
        overrides.push(Override::StrongConsensus);
    }

    if v.consensus_score < 0.4 {
        label = Some(Label::Fake);
        confidence = confidence.max(0.7);
        overrides.push(Override::LowConsensus);
    }

    if v.has_numerical_contradictions() {
        label = Some(Label::Fake);
        confidence = confidence.max(0.9);
        overrides.push(Override::NumericalContradictions);
    }

    let label = label.unwrap_or(Label::Unverified);
    let confidence = confidence.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE);

    if !overrides.is_empty() {
        info!(model_label = %reply.label, %label, ?overrides, "Model verdict overridden");
    }

    Decision {
        verdict: Verdict::new(label, confidence, reply.explanation),
        basis: DecisionBasis::Model,
        overrides,
    }
}

/// Verdict from verification signals alone. First matching rule wins.
pub fn fallback_verdict(v: &VerificationResult) -> Verdict {
    if v.contradicting_sources > 0 {
        return Verdict::new(
            Label::Fake,
            0.85,
            format!("Found {} contradicting sources.", v.contradicting_sources),
        );
    }
    if v.consensus_score >= 0.7 && v.avg_source_credibility >= 0.8 {
        return Verdict::new(
            Label::Real,
            0.80,
            format!("{} credible sources confirm this.", v.supporting_sources),
        );
    }
    if v.consensus_score < 0.4 {
        return Verdict::new(Label::Fake, 0.70, "Low consensus among sources.");
    }
    if v.avg_source_credibility < 0.6 {
        return Verdict::new(Label::Unverified, 0.55, "Sources lack sufficient credibility.");
    }
    Verdict::new(
        Label::Unverified,
        0.50,
        "Insufficient evidence to make determination.",
    )
}
