//! Scoring phase — pluggable, trait-based scorer turning candidate facts
//! into score, fit, and rationale.
//!
//! Default: `LlmScorer` (second model pass applying the rubric prompt).
//! Fallback: `HeuristicScorer` (pure-Rust, deterministic, fully testable)
//! for when the scoring-phase output is unusable but extraction succeeded.

use async_trait::async_trait;
use tracing::debug;

use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::models::evaluation::FitLevel;
use crate::screening::extract::CandidateFacts;
use crate::screening::parser::{parse_scoring_output, ScoringFields};
use crate::screening::prompts::{build_scoring_prompt, SCORING_SYSTEM};

/// Rubric weights, in percent. The defaults mirror the standard screening
/// rubric: matched skills dominate, clarity is a tiebreaker.
#[derive(Debug, Clone)]
pub struct RubricWeights {
    pub matched_skills_w: u8,
    pub experience_relevance_w: u8,
    pub qualifications_w: u8,
    pub seniority_w: u8,
    pub cv_clarity_w: u8,
    /// Skills whose absence caps the score regardless of other factors.
    pub critical_skills: Vec<String>,
}

impl Default for RubricWeights {
    fn default() -> Self {
        Self {
            matched_skills_w: 50,
            experience_relevance_w: 20,
            qualifications_w: 15,
            seniority_w: 10,
            cv_clarity_w: 5,
            critical_skills: Vec::new(),
        }
    }
}

/// The scorer seam. The pipeline holds `Arc<dyn Scorer>` so backends swap
/// without touching orchestration code.
#[async_trait]
pub trait Scorer: Send + Sync {
    async fn score(
        &self,
        facts: &CandidateFacts,
        cv_text: &str,
        rubric: &RubricWeights,
    ) -> Result<ScoringFields, AppError>;
}

/// Default scorer — one rubric-bearing LLM call, output parsed tolerantly.
/// A response without a numeric score is returned as-is (`has_score =
/// false`); the pipeline decides what that means for the candidate.
pub struct LlmScorer {
    llm: LlmClient,
}

impl LlmScorer {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Scorer for LlmScorer {
    async fn score(
        &self,
        facts: &CandidateFacts,
        _cv_text: &str,
        rubric: &RubricWeights,
    ) -> Result<ScoringFields, AppError> {
        let facts_json = serde_json::to_string_pretty(facts)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize facts: {e}")))?;
        let prompt = build_scoring_prompt(&facts_json, rubric);
        let output = self.llm.complete(&prompt, SCORING_SYSTEM).await?;
        Ok(parse_scoring_output(&output))
    }
}

/// Deterministic scorer computed from the extracted facts alone — no model
/// call. Same weights, same thresholds, same critical-skill cap as the
/// rubric prompt.
pub struct HeuristicScorer;

#[async_trait]
impl Scorer for HeuristicScorer {
    async fn score(
        &self,
        facts: &CandidateFacts,
        cv_text: &str,
        rubric: &RubricWeights,
    ) -> Result<ScoringFields, AppError> {
        Ok(compute_heuristic_score(facts, cv_text, rubric))
    }
}

const SENIORITY_KEYWORDS: &[&str] = &[
    "senior",
    "lead",
    "manager",
    "principal",
    "head",
    "director",
    "vp",
    "vice president",
    "cto",
    "ceo",
];

const PENALTY_PER_MISSING: f64 = 0.4;
const MAX_MISSING_PENALTY: f64 = 2.5;
const CRITICAL_CAP: f64 = 4.5;

/// Core heuristic:
/// 1. Component scores in [0, 1] for skills, experience, qualifications,
///    seniority, and CV clarity.
/// 2. score = 1 + weighted_sum * 9, then a flat penalty per missing skill
///    (capped) and a hard cap when a critical skill is missing.
/// 3. Clamp to [0, 10]; fit from the standard thresholds.
pub fn compute_heuristic_score(
    facts: &CandidateFacts,
    cv_text: &str,
    rubric: &RubricWeights,
) -> ScoringFields {
    let matched_count = facts.matched_skills_full.len();
    let missing_count = facts.missing_skills_full.len();
    let total_skills = matched_count + missing_count;
    let matched_ratio = if total_skills > 0 {
        matched_count as f64 / total_skills as f64
    } else {
        0.0
    };

    let summary_lower = facts.relevant_experience_summary.to_lowercase();

    let qual_score = (facts.top_qualifications_full.len() as f64 / 2.0).min(1.0);
    let ach_score = (facts.quantifiable_achievements_full.len() as f64 / 2.0).min(1.0);
    let exp_presence = if summary_lower.trim().is_empty() { 0.0 } else { 1.0 };
    let seniority_score = if SENIORITY_KEYWORDS.iter().any(|k| summary_lower.contains(k)) {
        1.0
    } else {
        0.0
    };
    let years_score = (facts.years_of_experience / 10.0).clamp(0.0, 1.0);

    let education = facts.education_level.to_lowercase();
    let edu_score = if education.contains("phd") || education.contains("doctorate") {
        1.0
    } else if education.contains("master") || education.contains("mba") {
        0.85
    } else if education.contains("bachelor") {
        0.7
    } else {
        0.5
    };

    let cv_clarity_score = match cv_text.len() {
        len if len > 2000 => 1.0,
        len if len > 800 => 0.7,
        len if len > 300 => 0.4,
        _ => 0.15,
    };

    let mw = rubric.matched_skills_w as f64 / 100.0;
    let ew = rubric.experience_relevance_w as f64 / 100.0;
    let qw = rubric.qualifications_w as f64 / 100.0;
    let sw = rubric.seniority_w as f64 / 100.0;
    let cw = rubric.cv_clarity_w as f64 / 100.0;

    let comp_exp = exp_presence * 0.4 + years_score * 0.6;
    let comp_qual = qual_score * 0.5 + ach_score * 0.3 + edu_score * 0.2;

    let weighted = matched_ratio * mw
        + comp_exp * ew
        + comp_qual * qw
        + seniority_score * sw
        + cv_clarity_score * cw;

    let mut score = 1.0 + weighted * 9.0;
    score -= (missing_count as f64 * PENALTY_PER_MISSING).min(MAX_MISSING_PENALTY);

    let missing_criticals: Vec<&str> = rubric
        .critical_skills
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .filter(|crit| {
            let crit_lower = crit.to_lowercase();
            !facts
                .matched_skills_full
                .iter()
                .any(|s| s.to_lowercase().contains(&crit_lower))
        })
        .map(|c| c as &str)
        .collect();

    if !missing_criticals.is_empty() {
        score = score.min(CRITICAL_CAP);
    }

    let score = score.clamp(0.0, 10.0);
    let fit = FitLevel::from_score(score);

    let mut rationale = vec![format!(
        "Matched {matched_count}/{total_skills} JD skills ({}%).",
        (matched_ratio * 100.0).round() as u32
    )];
    if facts.years_of_experience > 0.0 {
        rationale.push(format!("{} years experience.", facts.years_of_experience));
    }
    if !education.is_empty() && education != "unknown" {
        rationale.push(format!("Education: {}.", facts.education_level));
    }
    if !facts.top_qualifications_full.is_empty() {
        rationale.push(format!(
            "{} qualifications.",
            facts.top_qualifications_full.len()
        ));
    }
    if !facts.quantifiable_achievements_full.is_empty() {
        rationale.push(format!(
            "{} quantifiable achievements.",
            facts.quantifiable_achievements_full.len()
        ));
    }
    if missing_count > 0 {
        rationale.push(format!("Penalty for {missing_count} missing skills."));
    }
    if !missing_criticals.is_empty() {
        rationale.push(format!(
            "Critical skills missing: {} - score capped.",
            missing_criticals.join(", ")
        ));
    }

    debug!(
        "Heuristic score {:.2} ({:?}) from weighted {:.3}",
        score, fit, weighted
    );

    ScoringFields {
        score,
        has_score: true,
        fit: Some(fit),
        rationale: rationale.join(" "),
        matched_skills: facts.matched_skills_full.join(", "),
        missing_skills: facts.missing_skills_full.join(", "),
        qualifications: facts.top_qualifications_full.join(", "),
        achievements: facts.quantifiable_achievements_full.join(", "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_facts(matched: &[&str], missing: &[&str]) -> CandidateFacts {
        CandidateFacts {
            matched_skills_full: matched.iter().map(|s| s.to_string()).collect(),
            missing_skills_full: missing.iter().map(|s| s.to_string()).collect(),
            top_qualifications_full: vec!["BSc Computer Science".to_string()],
            quantifiable_achievements_full: vec!["cut costs by 20%".to_string()],
            relevant_experience_summary: "Four years as a backend engineer.".to_string(),
            years_of_experience: 4.0,
            education_level: "Bachelor's".to_string(),
        }
    }

    const LONG_CV: &str = "x";

    fn cv_text() -> String {
        LONG_CV.repeat(2500)
    }

    #[test]
    fn test_heuristic_is_deterministic() {
        let facts = make_facts(&["Python", "SQL"], &["Kubernetes"]);
        let rubric = RubricWeights::default();
        let a = compute_heuristic_score(&facts, &cv_text(), &rubric);
        let b = compute_heuristic_score(&facts, &cv_text(), &rubric);
        assert_eq!(a.score, b.score);
        assert_eq!(a.rationale, b.rationale);
    }

    #[test]
    fn test_score_always_in_range() {
        let strong = CandidateFacts {
            matched_skills_full: vec!["a".into(), "b".into(), "c".into()],
            missing_skills_full: vec![],
            top_qualifications_full: vec!["PhD".into(), "Cert".into(), "License".into()],
            quantifiable_achievements_full: vec!["x".into(), "y".into(), "z".into()],
            relevant_experience_summary: "Principal engineer, led three teams.".to_string(),
            years_of_experience: 15.0,
            education_level: "PhD".to_string(),
        };
        let weak = CandidateFacts::default();
        let rubric = RubricWeights::default();

        let high = compute_heuristic_score(&strong, &cv_text(), &rubric);
        let low = compute_heuristic_score(&weak, "", &rubric);
        assert!(high.score <= 10.0, "got {}", high.score);
        assert!(low.score >= 0.0, "got {}", low.score);
        assert!(high.score > low.score);
    }

    #[test]
    fn test_missing_skills_penalized() {
        let rubric = RubricWeights::default();
        let none_missing = compute_heuristic_score(&make_facts(&["Python"], &[]), &cv_text(), &rubric);
        let some_missing = compute_heuristic_score(
            &make_facts(&["Python"], &["SQL", "Docker"]),
            &cv_text(),
            &rubric,
        );
        assert!(some_missing.score < none_missing.score);
    }

    #[test]
    fn test_missing_penalty_is_capped() {
        let rubric = RubricWeights::default();
        let missing_10: Vec<String> = (0..10).map(|i| format!("skill{i}")).collect();
        let missing_20: Vec<String> = (0..20).map(|i| format!("skill{i}")).collect();
        let mut facts_10 = make_facts(&["Python"], &[]);
        facts_10.missing_skills_full = missing_10;
        let mut facts_20 = make_facts(&["Python"], &[]);
        facts_20.missing_skills_full = missing_20;

        let a = compute_heuristic_score(&facts_10, &cv_text(), &rubric);
        let b = compute_heuristic_score(&facts_20, &cv_text(), &rubric);
        // Both past the penalty cap; only the matched ratio differs slightly.
        assert!(b.score <= a.score);
        assert!(a.score - b.score < 1.0);
    }

    #[test]
    fn test_missing_critical_skill_caps_score_and_blocks_high_fit() {
        let rubric = RubricWeights {
            critical_skills: vec!["SQL".to_string()],
            ..RubricWeights::default()
        };
        // JD requires SQL; the résumé lacks it.
        let facts = CandidateFacts {
            matched_skills_full: vec!["Python".into(), "Django".into(), "AWS".into()],
            missing_skills_full: vec!["SQL".into()],
            top_qualifications_full: vec!["MSc".into(), "Cert".into()],
            quantifiable_achievements_full: vec!["a".into(), "b".into()],
            relevant_experience_summary: "Senior engineer with ten years of experience.".into(),
            years_of_experience: 10.0,
            education_level: "Master's".into(),
        };
        let fields = compute_heuristic_score(&facts, &cv_text(), &rubric);
        assert!(fields.score <= CRITICAL_CAP);
        assert_ne!(fields.fit, Some(FitLevel::High));
        assert!(fields.missing_skills.contains("SQL"));
        assert!(fields.rationale.contains("Critical skills missing: SQL"));
    }

    #[test]
    fn test_critical_skill_match_is_case_insensitive() {
        let rubric = RubricWeights {
            critical_skills: vec!["sql".to_string()],
            ..RubricWeights::default()
        };
        let facts = make_facts(&["PostgreSQL"], &[]);
        let fields = compute_heuristic_score(&facts, &cv_text(), &rubric);
        // "sql" is a substring of "postgresql" — treated as matched.
        assert!(!fields.rationale.contains("Critical skills missing"));
    }

    #[test]
    fn test_no_skills_at_all_scores_low() {
        let fields =
            compute_heuristic_score(&CandidateFacts::default(), "", &RubricWeights::default());
        assert_eq!(fields.fit, Some(FitLevel::Low));
        assert!(fields.score < FitLevel::MEDIUM_THRESHOLD);
    }

    #[test]
    fn test_rationale_reports_match_ratio() {
        let fields = compute_heuristic_score(
            &make_facts(&["Python"], &["SQL"]),
            &cv_text(),
            &RubricWeights::default(),
        );
        assert!(fields.rationale.contains("Matched 1/2 JD skills (50%)."));
    }

    #[test]
    fn test_heuristic_always_has_score() {
        let fields =
            compute_heuristic_score(&CandidateFacts::default(), "", &RubricWeights::default());
        assert!(fields.has_score);
        assert!(fields.fit.is_some());
    }
}
