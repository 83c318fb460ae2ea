//! Report Store — append-only persistence and read paths for evaluations.

pub mod export;

use sqlx::PgPool;
use tracing::info;

use crate::models::evaluation::CandidateEvaluation;

/// Inserts one evaluation record. `created_at` is left to the database
/// default; rows are never updated afterwards.
pub async fn insert_evaluation(
    pool: &PgPool,
    evaluation: &CandidateEvaluation,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO candidate_evaluations
            (id, job_title, candidate_name, score, fit_level, rationale,
             matched_skills, missing_skills, qualifications, achievements, evaluated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(evaluation.id)
    .bind(&evaluation.job_title)
    .bind(&evaluation.candidate_name)
    .bind(evaluation.score)
    .bind(evaluation.fit_level.as_str())
    .bind(&evaluation.rationale)
    .bind(&evaluation.matched_skills)
    .bind(&evaluation.missing_skills)
    .bind(&evaluation.qualifications)
    .bind(&evaluation.achievements)
    .bind(evaluation.evaluated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Inserts a whole batch, reporting how many rows landed.
pub async fn insert_batch(
    pool: &PgPool,
    evaluations: &[CandidateEvaluation],
) -> Result<usize, sqlx::Error> {
    for evaluation in evaluations {
        insert_evaluation(pool, evaluation).await?;
    }
    info!("Persisted {} evaluation records", evaluations.len());
    Ok(evaluations.len())
}

/// All evaluations for one job title, best first.
pub async fn evaluations_by_job(
    pool: &PgPool,
    job_title: &str,
) -> Result<Vec<CandidateEvaluation>, sqlx::Error> {
    sqlx::query_as::<_, CandidateEvaluation>(
        "SELECT * FROM candidate_evaluations WHERE job_title = $1 ORDER BY score DESC",
    )
    .bind(job_title)
    .fetch_all(pool)
    .await
}

/// Most recently evaluated records across all jobs.
pub async fn recent_evaluations(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<CandidateEvaluation>, sqlx::Error> {
    sqlx::query_as::<_, CandidateEvaluation>(
        "SELECT * FROM candidate_evaluations ORDER BY evaluated_at DESC LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Top candidates by score, optionally filtered to one job title.
pub async fn top_candidates(
    pool: &PgPool,
    job_title: Option<&str>,
    limit: i64,
) -> Result<Vec<CandidateEvaluation>, sqlx::Error> {
    match job_title {
        Some(job) => {
            sqlx::query_as::<_, CandidateEvaluation>(
                "SELECT * FROM candidate_evaluations WHERE job_title = $1 \
                 ORDER BY score DESC LIMIT $2",
            )
            .bind(job)
            .bind(limit)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query_as::<_, CandidateEvaluation>(
                "SELECT * FROM candidate_evaluations ORDER BY score DESC LIMIT $1",
            )
            .bind(limit)
            .fetch_all(pool)
            .await
        }
    }
}
