use std::fmt::Write;

use veracity_common::EvidenceSet;

use crate::extraction::clip;
use crate::verifier::VerificationResult;

const MAX_PROMPT_SOURCES: usize = 10;
const MAX_PROMPT_CONTRADICTIONS: usize = 3;
const MAX_PROMPT_NUMBERS: usize = 3;
const SOURCE_EXCERPT_CHARS: usize = 400;

const SYSTEM_PROMPT: &str = r#"You are an EXPERT fact-checker AI. Analyze the claim against multiple sources and verification layers.

VERIFICATION FRAMEWORK:
1. Source Credibility: Higher credibility sources (0.9+) are more reliable
2. Entity Matching: Key entities should appear in multiple sources
3. Numerical Claims: Numbers must match exactly across sources
4. Semantic Alignment: Content should align with claim semantically
5. Contradictions: Any explicit contradictions indicate FAKE
6. Consensus: 70%+ sources supporting = REAL, <50% = FAKE

DECISION RULES:
- If contradictions found OR numerical mismatch → FAKE (0.85+ confidence)
- If consensus_score ≥ 0.7 AND avg_credibility ≥ 0.8 → REAL (0.8+ confidence)
- If consensus_score < 0.5 → FAKE (0.7+ confidence)
- If avg_credibility < 0.6 → UNVERIFIED (0.5-0.6 confidence)

OUTPUT JSON ONLY:
{
  "label": "REAL" or "FAKE" or "UNVERIFIED",
  "confidence": 0.0-1.0,
  "explanation": "Clear explanation with evidence"
}"#;

/// Instruction-format prompt carrying the claim, the verifier's findings and
/// excerpts of the strongest sources.
pub fn build_prompt(
    claim: &str,
    category: Option<&str>,
    evidence: &EvidenceSet,
    verification: &VerificationResult,
) -> String {
    let mut user = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(user, "CLAIM: {claim}\n");
    if let Some(category) = category {
        let _ = writeln!(user, "CATEGORY: {category}\n");
    }

    let _ = writeln!(user, "VERIFICATION SUMMARY:");
    let _ = writeln!(user, "- Source Credibility: {:.2}", verification.avg_source_credibility);
    let _ = writeln!(user, "- Entity Match Score: {:.2}", verification.entity_match_score);
    let _ = writeln!(user, "- Consensus Score: {:.2}", verification.consensus_score);
    let _ = writeln!(user, "- Supporting: {}/{}", verification.supporting_sources, evidence.len());
    let _ = writeln!(user, "- Contradicting: {}\n", verification.contradicting_sources);

    if verification.has_contradictions() {
        let _ = writeln!(user, "⚠️ CONTRADICTIONS DETECTED:");
        for c in verification.contradictions.iter().take(MAX_PROMPT_CONTRADICTIONS) {
            let _ = writeln!(
                user,
                "  - {}: Claimed '{}', Found '{}'",
                c.kind.as_str(),
                c.claimed,
                c.found
            );
        }
        user.push('\n');
    }

    let numeric = &verification.numerical_verification;
    if numeric.has_numerical_claims {
        let _ = writeln!(user, "NUMERICAL VERIFICATION (score: {:.2}):", numeric.verification_score);
        for m in numeric.matches.iter().take(MAX_PROMPT_NUMBERS) {
            let _ = writeln!(
                user,
                "  - '{}': confirmed by {}/{} sources",
                m.claimed, m.confirmed_by, m.total_sources
            );
        }
        user.push('\n');
    }

    user.push_str("SOURCES:\n");
    for (idx, source) in evidence.iter().take(MAX_PROMPT_SOURCES).enumerate() {
        let credibility = verification.credibility_scores.get(idx).copied().unwrap_or(0.5);
        let title = if source.title.is_empty() { "No title" } else { source.title.as_str() };
        let _ = write!(
            user,
            "\n[Source {}] (Credibility: {credibility:.2})\nTitle: {title}\nContent: {}...\n",
            idx + 1,
            clip(&source.full_content, SOURCE_EXCERPT_CHARS)
        );
    }

    user.push_str("\n\nBased on all evidence, is this claim REAL, FAKE, or UNVERIFIED?");

    format!("<s>[INST] {SYSTEM_PROMPT}\n\n{user} [/INST]")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::evidence;
    use crate::verifier::verify;
    use veracity_common::EntityBundle;

    #[test]
    fn prompt_carries_summary_and_sources() {
        let body = "The firm raised $2 billion. ".repeat(30);
        let set = evidence(&[
            ("https://www.reuters.com/a", "Firm raises $2 billion", body.as_str()),
            ("https://b.com/a", "", "Unrelated filler text about sports."),
        ]);
        let claim = "Company X raised $2 billion";
        let verification = verify(claim, &set, &EntityBundle::default(), Some("finance"));
        let prompt = build_prompt(claim, Some("finance"), &set, &verification);

        assert!(prompt.starts_with("<s>[INST] You are an EXPERT fact-checker AI."));
        assert!(prompt.ends_with("is this claim REAL, FAKE, or UNVERIFIED? [/INST]"));
        assert!(prompt.contains("CLAIM: Company X raised $2 billion\n\nCATEGORY: finance\n\n"));
        assert!(prompt.contains("- Supporting: "));
        assert!(prompt.contains("/2\n"));
        assert!(prompt.contains("NUMERICAL VERIFICATION (score: 0.50):"));
        assert!(prompt.contains("  - '$2 billion': confirmed by 1/2 sources"));
        assert!(prompt.contains("[Source 2] (Credibility: 0.50)\nTitle: No title\n"));
        assert!(!prompt.contains("CONTRADICTIONS DETECTED"));
    }

    #[test]
    fn source_excerpts_are_clipped() {
        let long = "a".repeat(1000);
        let set = evidence(&[("https://a.com", "T", long.as_str())]);
        let verification = verify("x", &set, &EntityBundle::default(), None);
        let prompt = build_prompt("x", None, &set, &verification);
        assert!(prompt.contains(&format!("Content: {}...\n", "a".repeat(400))));
        assert!(!prompt.contains("CATEGORY:"));
    }

    #[test]
    fn lists_at_most_three_contradictions() {
        let set = evidence(&[
            ("https://a.com", "", "he is alive"),
            ("https://b.com", "", "still alive"),
            ("https://c.com", "", "alive and well"),
            ("https://d.com", "", "survived the crash"),
        ]);
        let verification = verify("The pilot died", &set, &EntityBundle::default(), None);
        let prompt = build_prompt("The pilot died", None, &set, &verification);
        assert!(prompt.contains("⚠️ CONTRADICTIONS DETECTED:"));
        assert_eq!(prompt.matches("life_status_contradiction: Claimed 'died', Found 'alive'").count(), 3);
    }
}
