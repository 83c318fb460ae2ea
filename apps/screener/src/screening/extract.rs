//! Extraction phase — turns (JD, CV) into structured candidate facts.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::llm_client::{LlmClient, LlmError};
use crate::screening::prompts::{build_extraction_prompt, EXTRACTION_SYSTEM};

/// Structured facts extracted from one résumé. Every field defaults
/// individually so a partially-valid JSON object still deserializes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateFacts {
    #[serde(default)]
    pub matched_skills_full: Vec<String>,
    #[serde(default)]
    pub missing_skills_full: Vec<String>,
    #[serde(default)]
    pub top_qualifications_full: Vec<String>,
    #[serde(default)]
    pub quantifiable_achievements_full: Vec<String>,
    #[serde(default)]
    pub relevant_experience_summary: String,
    #[serde(default)]
    pub years_of_experience: f64,
    #[serde(default = "unknown_education")]
    pub education_level: String,
}

fn unknown_education() -> String {
    "Unknown".to_string()
}

impl Default for CandidateFacts {
    fn default() -> Self {
        Self {
            matched_skills_full: Vec::new(),
            missing_skills_full: Vec::new(),
            top_qualifications_full: Vec::new(),
            quantifiable_achievements_full: Vec::new(),
            relevant_experience_summary: String::new(),
            years_of_experience: 0.0,
            education_level: unknown_education(),
        }
    }
}

/// Seam for the extraction backend so the pipeline can be exercised without
/// a live model.
#[async_trait]
pub trait FactExtractor: Send + Sync {
    async fn extract(&self, jd_text: &str, cv_text: &str) -> Result<CandidateFacts, LlmError>;
}

/// Default extractor — one LLM call per candidate, JSON response enforced
/// by the system prompt.
pub struct LlmExtractor {
    llm: LlmClient,
}

impl LlmExtractor {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl FactExtractor for LlmExtractor {
    async fn extract(&self, jd_text: &str, cv_text: &str) -> Result<CandidateFacts, LlmError> {
        let prompt = build_extraction_prompt(jd_text, cv_text);
        self.llm.complete_json(&prompt, EXTRACTION_SYSTEM).await
    }
}
