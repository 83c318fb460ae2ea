use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

/// Coarse three-value classification summarizing a numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FitLevel {
    High,
    Medium,
    #[default]
    Low,
}

impl FitLevel {
    /// Score thresholds: >= 8.0 High, >= 5.5 Medium, else Low.
    pub const HIGH_THRESHOLD: f64 = 8.0;
    pub const MEDIUM_THRESHOLD: f64 = 5.5;

    pub fn from_score(score: f64) -> Self {
        if score >= Self::HIGH_THRESHOLD {
            FitLevel::High
        } else if score >= Self::MEDIUM_THRESHOLD {
            FitLevel::Medium
        } else {
            FitLevel::Low
        }
    }

    /// Tolerant parse — model output cells arrive with markdown emphasis
    /// and arbitrary casing ("**High**", "medium fit").
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.to_lowercase();
        if lower.contains("high") {
            Some(FitLevel::High)
        } else if lower.contains("medium") {
            Some(FitLevel::Medium)
        } else if lower.contains("low") {
            Some(FitLevel::Low)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FitLevel::High => "High",
            FitLevel::Medium => "Medium",
            FitLevel::Low => "Low",
        }
    }
}

impl fmt::Display for FitLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Clamps a parsed score into the [0, 10] range.
pub fn clamp_score(score: f64) -> f64 {
    score.clamp(0.0, 10.0)
}

/// The persisted unit of work: one record per (JD, résumé) pair.
///
/// Every field has a safe default so a partially-failed parse still yields
/// a valid, insertable record — never a null score or missing fit level.
/// Records are append-only; nothing mutates them after insertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateEvaluation {
    pub id: Uuid,
    pub job_title: String,
    pub candidate_name: String,
    pub score: f64,
    pub fit_level: FitLevel,
    pub rationale: String,
    pub matched_skills: String,
    pub missing_skills: String,
    pub qualifications: String,
    pub achievements: String,
    /// Set by the pipeline at scoring completion.
    pub evaluated_at: DateTime<Utc>,
    /// Set by the database at row insertion; None until the record is read back.
    pub created_at: Option<DateTime<Utc>>,
}

impl CandidateEvaluation {
    /// A default-filled record for the given identity. The pipeline starts
    /// from this and overwrites what the parse actually produced.
    pub fn empty(job_title: &str, candidate_name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            job_title: job_title.to_string(),
            candidate_name: candidate_name.to_string(),
            score: 0.0,
            fit_level: FitLevel::Low,
            rationale: String::new(),
            matched_skills: String::new(),
            missing_skills: String::new(),
            qualifications: String::new(),
            achievements: String::new(),
            evaluated_at: Utc::now(),
            created_at: None,
        }
    }
}

impl<'r> sqlx::FromRow<'r, PgRow> for CandidateEvaluation {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let fit: String = row.try_get("fit_level")?;
        Ok(Self {
            id: row.try_get("id")?,
            job_title: row.try_get("job_title")?,
            candidate_name: row.try_get("candidate_name")?,
            score: row.try_get("score")?,
            fit_level: FitLevel::parse(&fit).unwrap_or_default(),
            rationale: row.try_get("rationale")?,
            matched_skills: row.try_get("matched_skills")?,
            missing_skills: row.try_get("missing_skills")?,
            qualifications: row.try_get("qualifications")?,
            achievements: row.try_get("achievements")?,
            evaluated_at: row.try_get("evaluated_at")?,
            created_at: row.try_get("created_at").map(Some)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_level_defaults_to_low() {
        assert_eq!(FitLevel::default(), FitLevel::Low);
    }

    #[test]
    fn test_fit_level_thresholds() {
        assert_eq!(FitLevel::from_score(9.2), FitLevel::High);
        assert_eq!(FitLevel::from_score(8.0), FitLevel::High);
        assert_eq!(FitLevel::from_score(7.9), FitLevel::Medium);
        assert_eq!(FitLevel::from_score(5.5), FitLevel::Medium);
        assert_eq!(FitLevel::from_score(5.4), FitLevel::Low);
        assert_eq!(FitLevel::from_score(0.0), FitLevel::Low);
    }

    #[test]
    fn test_fit_level_parse_tolerates_markdown() {
        assert_eq!(FitLevel::parse("**High**"), Some(FitLevel::High));
        assert_eq!(FitLevel::parse("medium fit"), Some(FitLevel::Medium));
        assert_eq!(FitLevel::parse("LOW"), Some(FitLevel::Low));
        assert_eq!(FitLevel::parse("excellent"), None);
    }

    #[test]
    fn test_clamp_score_bounds() {
        assert_eq!(clamp_score(-3.0), 0.0);
        assert_eq!(clamp_score(12.5), 10.0);
        assert_eq!(clamp_score(7.25), 7.25);
    }

    #[test]
    fn test_empty_record_is_safe_default() {
        let record = CandidateEvaluation::empty("Backend Engineer", "jane_doe");
        assert_eq!(record.score, 0.0);
        assert_eq!(record.fit_level, FitLevel::Low);
        assert!(record.rationale.is_empty());
        assert!(record.created_at.is_none());
        assert_eq!(record.job_title, "Backend Engineer");
    }
}
