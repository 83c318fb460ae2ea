//! CSV rendering of a batch report — one row per evaluation, columns in
//! data-model order.

use csv::WriterBuilder;

use crate::errors::AppError;
use crate::models::evaluation::CandidateEvaluation;

const HEADERS: [&str; 10] = [
    "job_title",
    "candidate_name",
    "score",
    "fit_level",
    "rationale",
    "matched_skills",
    "missing_skills",
    "qualifications",
    "achievements",
    "evaluated_at",
];

/// Renders the evaluations as a CSV string. An empty batch yields an empty
/// string rather than a lone header row.
pub fn to_csv_string(evaluations: &[CandidateEvaluation]) -> Result<String, AppError> {
    if evaluations.is_empty() {
        return Ok(String::new());
    }

    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(HEADERS)?;

    for evaluation in evaluations {
        let score = format!("{:.2}", evaluation.score);
        let evaluated_at = evaluation.evaluated_at.to_rfc3339();
        writer.write_record([
            evaluation.job_title.as_str(),
            evaluation.candidate_name.as_str(),
            score.as_str(),
            evaluation.fit_level.as_str(),
            evaluation.rationale.as_str(),
            evaluation.matched_skills.as_str(),
            evaluation.missing_skills.as_str(),
            evaluation.qualifications.as_str(),
            evaluation.achievements.as_str(),
            evaluated_at.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("CSV writer flush failed: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("CSV output was not UTF-8: {e}")))
}
