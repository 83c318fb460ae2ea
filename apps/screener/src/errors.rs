use thiserror::Error;

use crate::llm_client::LlmError;
use crate::loader::LoaderError;
use crate::sheets::SheetsError;

/// Application-level error type aggregating the per-module taxonomies.
///
/// Candidate-level failures (loader, parse) never reach this type — the
/// pipeline degrades them to default-filled records. What does reach it are
/// the errors that must stop the caller: auth, network, database.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("input error: {0}")]
    Input(#[from] LoaderError),

    #[error("model API error: {0}")]
    Llm(#[from] LlmError),

    #[error("spreadsheet error: {0}")]
    Sheets(#[from] SheetsError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}
