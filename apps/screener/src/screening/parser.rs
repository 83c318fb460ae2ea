//! Response Parser — tolerant extraction of scoring fields from model text.
//!
//! The scoring prompt asks for a one-row markdown table, but model output
//! drifts: code fences, emphasis, missing columns, or no table at all.
//! This parser never fails — it returns a best-effort mapping with safe
//! defaults, and flags whether a numeric score was actually found so the
//! pipeline can decide whether the candidate counts as scored.

use crate::llm_client::strip_code_fences;
use crate::models::evaluation::{clamp_score, FitLevel};

/// Best-effort mapping of the scoring-phase output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoringFields {
    pub score: f64,
    /// True only when a numeric score token was located in the output.
    pub has_score: bool,
    pub fit: Option<FitLevel>,
    pub rationale: String,
    pub matched_skills: String,
    pub missing_skills: String,
    pub qualifications: String,
    pub achievements: String,
}

/// Parses the scoring-phase model output. Never fails; unmatched fields
/// keep their defaults.
pub fn parse_scoring_output(text: &str) -> ScoringFields {
    let text = strip_code_fences(text);
    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

    let mut fields = ScoringFields::default();

    if let Some((headers, cells)) = find_table_row(&lines) {
        for (header, cell) in headers.iter().zip(cells.iter()) {
            assign_field(&mut fields, header, cell);
        }
    } else {
        // Fallback: `Label: value` lines.
        for line in &lines {
            if let Some((key, value)) = line.split_once(':') {
                assign_field(&mut fields, &normalize_key(key), value.trim());
            }
        }
    }

    fields
}

/// Locates the table header row (contains '|' and 'Score') and the first
/// data row after it, returning normalized header keys and raw cells.
fn find_table_row<'a>(lines: &[&'a str]) -> Option<(Vec<String>, Vec<&'a str>)> {
    let header_idx = lines
        .iter()
        .position(|l| l.contains('|') && l.contains("Score"))?;

    let data_line = lines[header_idx + 1..]
        .iter()
        .find(|l| l.contains('|') && !is_separator_row(l))?;

    let headers: Vec<String> = lines[header_idx]
        .split('|')
        .map(|h| normalize_key(h))
        .filter(|h| !h.is_empty())
        .collect();
    let cells: Vec<&str> = data_line
        .split('|')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect();

    if headers.is_empty() || cells.is_empty() {
        return None;
    }
    Some((headers, cells))
}

/// A markdown separator row: cells made only of '-', ':' and whitespace.
fn is_separator_row(line: &str) -> bool {
    line.chars().all(|c| matches!(c, '-' | ':' | '|' | ' '))
}

/// Lowercases and strips everything but letters, digits and spaces, so
/// "**Matched Skills**" and "Matched Skills" compare equal.
fn normalize_key(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .collect::<String>()
        .trim()
        .to_lowercase()
}

fn assign_field(fields: &mut ScoringFields, key: &str, value: &str) {
    let value = value.trim().trim_matches('*').trim();
    match key {
        "score" => {
            if let Some(n) = first_number(value) {
                fields.score = clamp_score(n);
                fields.has_score = true;
            }
        }
        "fit" | "fit level" => fields.fit = FitLevel::parse(value),
        "rationale" => fields.rationale = value.to_string(),
        "matched skills" => fields.matched_skills = value.to_string(),
        "missing skills" => fields.missing_skills = value.to_string(),
        "top qualifications" | "qualifications" => fields.qualifications = value.to_string(),
        "quantifiable achievements" | "achievements" => fields.achievements = value.to_string(),
        _ => {}
    }
}

/// Finds the first decimal number in a string ("9/10" -> 9.0, "Score of 7.5" -> 7.5).
fn first_number(text: &str) -> Option<f64> {
    let mut start = None;
    let bytes = text.as_bytes();
    for (i, c) in text.char_indices() {
        match start {
            None if c.is_ascii_digit() => start = Some(i),
            Some(s) => {
                if !(c.is_ascii_digit() || (c == '.' && bytes.get(i + 1).is_some_and(u8::is_ascii_digit))) {
                    return text[s..i].parse().ok();
                }
            }
            None => {}
        }
    }
    start.and_then(|s| text[s..].parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE_OUTPUT: &str = "\
| Score | Fit | Rationale | Matched Skills | Missing Skills | Top Qualifications | Quantifiable Achievements |
|---|---|---|---|---|---|---|
| 7.5 | Medium | Strong Python but lacks SQL. | Python, Django | SQL | BSc CS | Cut costs by 20% |";

    #[test]
    fn test_parses_well_formed_table() {
        let fields = parse_scoring_output(TABLE_OUTPUT);
        assert!(fields.has_score);
        assert_eq!(fields.score, 7.5);
        assert_eq!(fields.fit, Some(FitLevel::Medium));
        assert_eq!(fields.rationale, "Strong Python but lacks SQL.");
        assert_eq!(fields.matched_skills, "Python, Django");
        assert_eq!(fields.missing_skills, "SQL");
        assert_eq!(fields.qualifications, "BSc CS");
        assert_eq!(fields.achievements, "Cut costs by 20%");
    }

    #[test]
    fn test_parses_fenced_table() {
        let fenced = format!("```\n{TABLE_OUTPUT}\n```");
        let fields = parse_scoring_output(&fenced);
        assert!(fields.has_score);
        assert_eq!(fields.score, 7.5);
    }

    #[test]
    fn test_tolerates_markdown_emphasis_in_cells() {
        let output = "\
| Score | Fit | Rationale |
|---|---|---|
| **8** | **High** | Excellent match. |";
        let fields = parse_scoring_output(output);
        assert_eq!(fields.score, 8.0);
        assert_eq!(fields.fit, Some(FitLevel::High));
    }

    #[test]
    fn test_short_data_row_leaves_trailing_defaults() {
        let output = "\
| Score | Fit | Rationale | Matched Skills |
|---|---|---|---|
| 6 | Medium |";
        let fields = parse_scoring_output(output);
        assert_eq!(fields.score, 6.0);
        assert_eq!(fields.fit, Some(FitLevel::Medium));
        assert!(fields.rationale.is_empty());
        assert!(fields.matched_skills.is_empty());
    }

    #[test]
    fn test_labeled_lines_fallback() {
        let output = "Score: 4.5\nFit: Low\nRationale: Missing SQL and Python.";
        let fields = parse_scoring_output(output);
        assert!(fields.has_score);
        assert_eq!(fields.score, 4.5);
        assert_eq!(fields.fit, Some(FitLevel::Low));
        assert_eq!(fields.rationale, "Missing SQL and Python.");
    }

    #[test]
    fn test_garbage_yields_all_defaults() {
        let fields = parse_scoring_output("I am sorry, I cannot evaluate this candidate.");
        assert!(!fields.has_score);
        assert_eq!(fields.score, 0.0);
        assert_eq!(fields.fit, None);
        assert!(fields.rationale.is_empty());
    }

    #[test]
    fn test_empty_input_never_fails() {
        let fields = parse_scoring_output("");
        assert!(!fields.has_score);
        assert_eq!(fields, ScoringFields::default());
    }

    #[test]
    fn test_score_out_of_range_is_clamped() {
        let output = "Score: 42\nFit: High";
        let fields = parse_scoring_output(output);
        assert_eq!(fields.score, 10.0);
    }

    #[test]
    fn test_first_number_variants() {
        assert_eq!(first_number("7.5"), Some(7.5));
        assert_eq!(first_number("9/10"), Some(9.0));
        assert_eq!(first_number("Score of 6"), Some(6.0));
        assert_eq!(first_number("no digits here"), None);
        assert_eq!(first_number("v2. release"), Some(2.0));
    }

    #[test]
    fn test_non_score_table_ignored() {
        // A table without a Score header falls through to labeled lines.
        let output = "| Name | Role |\n|---|---|\n| Jane | Engineer |\nScore: 3";
        let fields = parse_scoring_output(output);
        assert!(fields.has_score);
        assert_eq!(fields.score, 3.0);
    }
}
