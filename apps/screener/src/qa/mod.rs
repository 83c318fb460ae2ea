//! Q&A path — forwards natural-language questions about a fetched dataset
//! to the model. The answer passes through untouched; there is no
//! structured parse on this path.

use crate::llm_client::{LlmClient, LlmError};
use crate::sheets::dataset::SheetDataset;

pub const QA_SYSTEM: &str = "You are a data analysis assistant. \
    You answer questions about a tabular dataset the user has loaded. \
    If a question requires calculations or filtering, do the arithmetic \
    over the rows provided and explain your reasoning. If the data does \
    not contain enough information to answer, say so clearly.";

/// Q&A prompt template. Replace `{data_context}`, `{data_table}` and
/// `{question}` before sending. The full table is embedded — the summary
/// alone is not enough for the model to compute aggregates correctly.
pub const QA_PROMPT_TEMPLATE: &str = r#"You have access to the following dataset:

{data_context}

Full data:
{data_table}

User Question: {question}

Provide a clear, concise answer to the question.

Answer:"#;

pub fn build_question_prompt(dataset: &SheetDataset, question: &str) -> String {
    QA_PROMPT_TEMPLATE
        .replace("{data_context}", &dataset.summary())
        .replace("{data_table}", &dataset.to_table_string())
        .replace("{question}", question)
}

/// Answers one question about the dataset. The raw model text is the answer.
pub async fn answer_question(
    llm: &LlmClient,
    dataset: &SheetDataset,
    question: &str,
) -> Result<String, LlmError> {
    let prompt = build_question_prompt(dataset, question);
    llm.complete(&prompt, QA_SYSTEM).await
}
