//! Prompt constants and builders for the two screening phases.
//!
//! The extraction prompt must never mention scoring: keeping fact-gathering
//! and judgment in separate calls is what stops the model from anchoring a
//! score on extraction noise. The rubric lives exclusively in the scoring
//! prompt.

use crate::screening::scoring::RubricWeights;

/// System prompt for the extraction phase — facts only, JSON only.
pub const EXTRACTION_SYSTEM: &str = "You are a meticulous data extraction assistant. \
    You analyze a candidate's CV against a job description and extract every \
    piece of relevant information. You do NOT evaluate, rank, or filter. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Extraction prompt template. Replace `{jd_text}` and `{cv_text}` before sending.
pub const EXTRACTION_PROMPT_TEMPLATE: &str = r#"Analyze the candidate's CV against the job description (JD) and extract every single piece of relevant information. Do not perform any scoring or filtering. Your output must be a single, complete JSON object.

JSON schema (no extra fields):
{
  "matched_skills_full": ["skill"],
  "missing_skills_full": ["skill"],
  "top_qualifications_full": ["qualification"],
  "quantifiable_achievements_full": ["achievement"],
  "relevant_experience_summary": "1-2 paragraphs",
  "years_of_experience": 0,
  "education_level": "Bachelor's"
}

Instructions:
1. `matched_skills_full`: list ALL skills from the JD present in the CV.
2. `missing_skills_full`: list ALL skills from the JD not present in the CV.
3. `top_qualifications_full`: list all relevant degrees, certifications, and licenses.
4. `quantifiable_achievements_full`: find and list all achievements with numbers, percentages, currency, or metrics (e.g. "managed a team of 10", "increased revenue by 15%").
5. `relevant_experience_summary`: a 1-2 paragraph summary of the candidate's work history as it relates directly to the JD's requirements.
6. `years_of_experience`: total years of professional experience (number).
7. `education_level`: highest degree earned (e.g. Bachelor's, Master's, PhD).

JD:
{jd_text}

CV:
{cv_text}"#;

/// System prompt for the scoring phase.
pub const SCORING_SYSTEM: &str = "You are a strict HR evaluation engine. \
    You evaluate a candidate from a complete set of extracted data and \
    produce a final, summarized evaluation in a single markdown table. \
    Apply the heuristics exactly as given.";

/// Scoring prompt template. Replace the five weight placeholders and
/// `{candidate_data_json}` before sending.
pub const SCORING_PROMPT_TEMPLATE: &str = r#"Evaluate the candidate below and produce a final, summarized evaluation in a markdown table. Apply heuristics so the score is accurate and misses no critical connections.

Evaluation hierarchy heuristic:
1. Prioritize full-time experience: evaluate and score the candidate's full-time work experience first. This is the most important factor.
2. Next, consider internships: after full-time experience, evaluate relevant internships.
3. Finally, consider projects and certifications: use live projects, open-source work, and certifications as supporting evidence only.

Evaluation rubric:
* Scoring (0-10): apply a final weighted score reflecting the balance between matched and missing skills, penalizing the absence of key skills but not disproportionately if the candidate is strong elsewhere. Weights:
  - All matched skills ({matched_skills_w}%)
  - Experience summary relevance ({experience_relevance_w}%)
  - All qualifications & achievements ({qualifications_w}%)
  - Overall depth & seniority ({seniority_w}%)
  - CV clarity ({cv_clarity_w}%)
* Fit: High (>= 8), Medium (5.5 - 7.9), Low (< 5.5).
* Rationale: a single, concise, factual sentence directly explaining why the score is high or low. For low scores, explicitly name the significant missing skills.
* Matched Skills: the top 3-5 most important matched skills.
* Missing Skills: the top 3-5 most critical missing skills.
* Top Qualifications: the top 2 most impressive qualifications.
* Quantifiable Achievements: the top 2-3 most impactful achievements.

Candidate data:
{candidate_data_json}

Output: exactly one markdown table with these headers in this exact order: `Score`, `Fit`, `Rationale`, `Matched Skills`, `Missing Skills`, `Top Qualifications`, `Quantifiable Achievements`.

| Score | Fit | Rationale | Matched Skills | Missing Skills | Top Qualifications | Quantifiable Achievements |
|---|---|---|---|---|---|---|"#;

/// Appended to the scoring prompt when the rubric names critical skills.
pub const CRITICAL_SKILLS_FRAGMENT: &str = r#"

Critical skill heuristic:
* A candidate missing any of the following skills must have their score severely penalized, regardless of other factors. The score must be 4 or lower if any of these are missing: {critical_skills}."#;

/// System prompt for the optional strengths/weaknesses analysis.
pub const ANALYSIS_SYSTEM: &str = "You are an expert HR analyst. \
    You write concise, professional prose. No tables, no lists.";

/// Analysis prompt template. Replace `{candidate_data_json}` and `{jd_text}`.
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"Based on the following candidate data and JD, provide a concise, professional analysis of the candidate's strengths and weaknesses.

Instructions:
* Strengths: one paragraph (2-3 sentences) summarizing the candidate's top strengths — their most relevant skills, experience, and quantifiable achievements.
* Weaknesses: one paragraph (2-3 sentences) summarizing key weaknesses — critical missing skills, lack of relevant experience, or other significant gaps.

Candidate data:
{candidate_data_json}

JD:
{jd_text}"#;

pub fn build_extraction_prompt(jd_text: &str, cv_text: &str) -> String {
    EXTRACTION_PROMPT_TEMPLATE
        .replace("{jd_text}", jd_text)
        .replace("{cv_text}", cv_text)
}

pub fn build_scoring_prompt(candidate_data_json: &str, rubric: &RubricWeights) -> String {
    let mut prompt = SCORING_PROMPT_TEMPLATE
        .replace("{matched_skills_w}", &rubric.matched_skills_w.to_string())
        .replace(
            "{experience_relevance_w}",
            &rubric.experience_relevance_w.to_string(),
        )
        .replace("{qualifications_w}", &rubric.qualifications_w.to_string())
        .replace("{seniority_w}", &rubric.seniority_w.to_string())
        .replace("{cv_clarity_w}", &rubric.cv_clarity_w.to_string())
        .replace("{candidate_data_json}", candidate_data_json);

    if !rubric.critical_skills.is_empty() {
        prompt.push_str(
            &CRITICAL_SKILLS_FRAGMENT
                .replace("{critical_skills}", &rubric.critical_skills.join(", ")),
        );
    }

    prompt
}

pub fn build_analysis_prompt(candidate_data_json: &str, jd_text: &str) -> String {
    ANALYSIS_PROMPT_TEMPLATE
        .replace("{candidate_data_json}", candidate_data_json)
        .replace("{jd_text}", jd_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_prompt_embeds_both_documents() {
        let prompt = build_extraction_prompt("Requires 3+ years Python, SQL", "Jane Doe, Python");
        assert!(prompt.contains("Requires 3+ years Python, SQL"));
        assert!(prompt.contains("Jane Doe, Python"));
    }

    #[test]
    fn test_extraction_prompt_forbids_scoring() {
        // Phase separation: the extraction pass must instruct facts only.
        assert!(EXTRACTION_PROMPT_TEMPLATE.contains("Do not perform any scoring"));
        assert!(!EXTRACTION_PROMPT_TEMPLATE.contains("rubric"));
        assert!(!EXTRACTION_PROMPT_TEMPLATE.contains("Fit"));
    }

    #[test]
    fn test_scoring_prompt_carries_the_rubric() {
        let rubric = RubricWeights::default();
        let prompt = build_scoring_prompt("{\"matched_skills_full\": []}", &rubric);
        assert!(prompt.contains("(50%)"));
        assert!(prompt.contains("(20%)"));
        assert!(prompt.contains("(5%)"));
        assert!(prompt.contains("| Score | Fit | Rationale |"));
        assert!(prompt.contains("{\"matched_skills_full\": []}"));
    }

    #[test]
    fn test_scoring_prompt_omits_critical_block_when_none() {
        let prompt = build_scoring_prompt("{}", &RubricWeights::default());
        assert!(!prompt.contains("Critical skill heuristic"));
    }

    #[test]
    fn test_scoring_prompt_appends_critical_skills() {
        let rubric = RubricWeights {
            critical_skills: vec!["Python".to_string(), "SQL".to_string()],
            ..RubricWeights::default()
        };
        let prompt = build_scoring_prompt("{}", &rubric);
        assert!(prompt.contains("Critical skill heuristic"));
        assert!(prompt.contains("Python, SQL"));
    }

    #[test]
    fn test_analysis_prompt_embeds_inputs() {
        let prompt = build_analysis_prompt("{\"years_of_experience\": 4}", "Backend role");
        assert!(prompt.contains("years_of_experience"));
        assert!(prompt.contains("Backend role"));
        assert!(prompt.contains("Strengths"));
        assert!(prompt.contains("Weaknesses"));
    }

    #[test]
    fn test_no_placeholders_survive_substitution() {
        let rubric = RubricWeights::default();
        let prompt = build_scoring_prompt("{}", &rubric);
        for placeholder in [
            "{matched_skills_w}",
            "{experience_relevance_w}",
            "{qualifications_w}",
            "{seniority_w}",
            "{cv_clarity_w}",
            "{candidate_data_json}",
        ] {
            assert!(!prompt.contains(placeholder), "unreplaced {placeholder}");
        }
    }
}
