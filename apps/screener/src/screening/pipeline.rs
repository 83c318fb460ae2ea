//! Evaluation Pipeline — orchestrates the two-phase screening per candidate.
//!
//! Flow per file: load_document → extraction pass → scoring pass → record.
//! A candidate moves Extracting → Scoring → Done, or to Failed from either
//! phase. Failure is isolated: a Failed candidate still yields a
//! default-filled record with an explanatory rationale, and the batch
//! continues. Candidates are processed one at a time — the two model calls
//! per candidate are sequentially dependent.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::llm_client::LlmClient;
use crate::loader;
use crate::models::evaluation::{CandidateEvaluation, FitLevel};
use crate::screening::extract::{CandidateFacts, FactExtractor, LlmExtractor};
use crate::screening::parser::ScoringFields;
use crate::screening::prompts::{build_analysis_prompt, ANALYSIS_SYSTEM};
use crate::screening::scoring::{HeuristicScorer, LlmScorer, RubricWeights, Scorer};

/// The phase a candidate failed in, for per-item reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Extracting,
    Scoring,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Extracting => "extraction",
            Phase::Scoring => "scoring",
        }
    }
}

/// Everything the pipeline produced for one candidate file. The evaluation
/// record is always present and always insertable.
#[derive(Debug)]
pub struct CandidateOutcome {
    pub evaluation: CandidateEvaluation,
    pub facts: Option<CandidateFacts>,
    pub analysis: Option<String>,
    pub failed_phase: Option<Phase>,
}

impl CandidateOutcome {
    pub fn succeeded(&self) -> bool {
        self.failed_phase.is_none()
    }
}

pub struct EvaluationPipeline {
    extractor: Arc<dyn FactExtractor>,
    scorer: Arc<dyn Scorer>,
    /// Optional rescue backend when the primary scorer's output is unusable.
    fallback: Option<Arc<dyn Scorer>>,
    /// Kept for the optional strengths/weaknesses analysis call.
    llm: Option<LlmClient>,
    rubric: RubricWeights,
    job_title: String,
    analyze: bool,
}

impl EvaluationPipeline {
    /// Standard wiring: LLM extractor + LLM scorer, no fallback.
    pub fn new(llm: LlmClient, job_title: String, rubric: RubricWeights) -> Self {
        Self {
            extractor: Arc::new(LlmExtractor::new(llm.clone())),
            scorer: Arc::new(LlmScorer::new(llm.clone())),
            fallback: None,
            llm: Some(llm),
            rubric,
            job_title,
            analyze: false,
        }
    }

    /// Custom wiring, used by tests and by callers swapping backends.
    pub fn from_parts(
        extractor: Arc<dyn FactExtractor>,
        scorer: Arc<dyn Scorer>,
        job_title: String,
        rubric: RubricWeights,
    ) -> Self {
        Self {
            extractor,
            scorer,
            fallback: None,
            llm: None,
            rubric,
            job_title,
            analyze: false,
        }
    }

    /// Rescues scoreless candidates with the deterministic scorer instead of
    /// marking them Failed.
    pub fn with_heuristic_fallback(mut self) -> Self {
        self.fallback = Some(Arc::new(HeuristicScorer));
        self
    }

    /// Adds the optional strengths/weaknesses analysis call per candidate.
    pub fn with_analysis(mut self) -> Self {
        self.analyze = true;
        self
    }

    /// Evaluates every file sequentially. One outcome per input file, in
    /// input order, regardless of individual failures.
    pub async fn run_batch(&self, jd_text: &str, files: &[PathBuf]) -> Vec<CandidateOutcome> {
        let mut outcomes = Vec::with_capacity(files.len());
        for (i, file) in files.iter().enumerate() {
            info!(
                "Processing {} ({}/{})",
                file.display(),
                i + 1,
                files.len()
            );
            outcomes.push(self.evaluate_file(jd_text, file).await);
        }
        outcomes
    }

    /// Evaluates a single candidate file. Never errors — failures become
    /// default-filled records.
    pub async fn evaluate_file(&self, jd_text: &str, path: &Path) -> CandidateOutcome {
        let cv_text = match loader::load_document(path) {
            Ok(text) => text,
            Err(e) => {
                warn!("Skipping scoring for {}: {e}", path.display());
                return self.failed(file_stem(path), None, Phase::Extracting, &e.to_string());
            }
        };
        let candidate_name = loader::derive_candidate_name(&cv_text, path);

        let facts = match self.extractor.extract(jd_text, &cv_text).await {
            Ok(facts) => facts,
            Err(e) => {
                warn!("Extraction pass failed for {}: {e}", path.display());
                return self.failed(candidate_name, None, Phase::Extracting, &e.to_string());
            }
        };

        let fields = match self.scorer.score(&facts, &cv_text, &self.rubric).await {
            Ok(fields) if fields.has_score => fields,
            unusable => {
                let reason = match &unusable {
                    Ok(_) => "no numeric score in model output".to_string(),
                    Err(e) => e.to_string(),
                };
                match &self.fallback {
                    Some(fb) => {
                        warn!(
                            "Scoring pass unusable for {} ({reason}); using heuristic scorer",
                            path.display()
                        );
                        match fb.score(&facts, &cv_text, &self.rubric).await {
                            Ok(fields) => fields,
                            Err(e) => {
                                return self.failed(
                                    candidate_name,
                                    Some(facts),
                                    Phase::Scoring,
                                    &e.to_string(),
                                )
                            }
                        }
                    }
                    None => {
                        warn!("Scoring pass failed for {}: {reason}", path.display());
                        return self.failed(candidate_name, Some(facts), Phase::Scoring, &reason);
                    }
                }
            }
        };

        let evaluation = self.record_from_fields(candidate_name, &fields);
        info!(
            "Scored {} -> {:.1} ({})",
            evaluation.candidate_name, evaluation.score, evaluation.fit_level
        );

        let analysis = if self.analyze {
            self.run_analysis(&facts, jd_text).await
        } else {
            None
        };

        CandidateOutcome {
            evaluation,
            facts: Some(facts),
            analysis,
            failed_phase: None,
        }
    }

    fn record_from_fields(&self, candidate_name: String, fields: &ScoringFields) -> CandidateEvaluation {
        let mut record = CandidateEvaluation::empty(&self.job_title, &candidate_name);
        record.score = fields.score;
        record.fit_level = fields
            .fit
            .unwrap_or_else(|| FitLevel::from_score(fields.score));
        record.rationale = fields.rationale.clone();
        record.matched_skills = fields.matched_skills.clone();
        record.missing_skills = fields.missing_skills.clone();
        record.qualifications = fields.qualifications.clone();
        record.achievements = fields.achievements.clone();
        record.evaluated_at = Utc::now();
        record
    }

    fn failed(
        &self,
        candidate_name: String,
        facts: Option<CandidateFacts>,
        phase: Phase,
        reason: &str,
    ) -> CandidateOutcome {
        let mut record = CandidateEvaluation::empty(&self.job_title, &candidate_name);
        record.rationale = format!(
            "Evaluation failed during {}: {reason}",
            phase.as_str()
        );
        record.evaluated_at = Utc::now();
        CandidateOutcome {
            evaluation: record,
            facts,
            analysis: None,
            failed_phase: Some(phase),
        }
    }

    async fn run_analysis(&self, facts: &CandidateFacts, jd_text: &str) -> Option<String> {
        let llm = self.llm.as_ref()?;
        let facts_json = serde_json::to_string_pretty(facts).ok()?;
        let prompt = build_analysis_prompt(&facts_json, jd_text);
        match llm.complete(&prompt, ANALYSIS_SYSTEM).await {
            Ok(text) => Some(text),
            Err(e) => {
                warn!("Strengths/weaknesses analysis failed: {e}");
                None
            }
        }
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}
