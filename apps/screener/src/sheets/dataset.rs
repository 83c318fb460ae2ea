//! In-memory view of one fetched worksheet.

/// Tabular data loaded from a spreadsheet: a header row plus data rows,
/// every row padded or truncated to the header width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetDataset {
    /// Cache key label, e.g. "1abc..._Sheet2".
    pub key: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SheetDataset {
    /// Builds a dataset from raw API values. Returns None when there is no
    /// header row at all.
    pub fn from_values(key: impl Into<String>, mut values: Vec<Vec<String>>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let columns = values.remove(0);
        let width = columns.len();
        let rows = values
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Some(Self {
            key: key.into(),
            columns,
            rows,
        })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Human-readable summary shown to the user and embedded in Q&A prompts:
    /// shape, column names, and the first three rows as a sample.
    pub fn summary(&self) -> String {
        let mut out = vec![
            format!("Dataset: {}", self.key),
            format!("Rows: {}", self.row_count()),
            format!("Columns: {}", self.column_count()),
            String::new(),
            format!("Column Names: {}", self.columns.join(", ")),
            String::new(),
            "First 3 rows:".to_string(),
        ];
        for row in self.rows.iter().take(3) {
            out.push(format!("  {}", row.join(" | ")));
        }
        out.join("\n")
    }

    /// Full table rendering for prompt context: header plus every row.
    /// Small interactive sheets only — the Q&A prompt carries the whole
    /// table so the model can actually compute over it.
    pub fn to_table_string(&self) -> String {
        let mut out = vec![self.columns.join(" | ")];
        for row in &self.rows {
            out.push(row.join(" | "));
        }
        out.join("\n")
    }
}
