use std::path::{Path, PathBuf};

use serde::Serialize;

use super::encoding::SampleWindow;
use super::error::AttemptError;

// ---------------------------------------------------------------------------
// DataTable – the decoded CSV
// ---------------------------------------------------------------------------

/// A fully decoded delimited table: header names plus string cells.
/// Empty cells are treated as missing values downstream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataTable {
    pub headers: Vec<String>,
    /// Every row has exactly `headers.len()` cells.
    pub rows: Vec<Vec<String>>,
}

impl DataTable {
    /// Parse already-decoded text. The first record is the header row.
    ///
    /// Short rows are padded with empty cells; a row with more fields than
    /// the header fails the whole parse.
    pub fn from_csv_text(text: &str) -> Result<Self, AttemptError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_owned).collect();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(AttemptError::NoHeader);
        }

        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            if record.len() > headers.len() {
                return Err(AttemptError::RaggedRow {
                    // 1-based, counting the header line
                    line: idx + 2,
                    expected: headers.len(),
                    found: record.len(),
                });
            }
            let mut row: Vec<String> = record.iter().map(str::to_owned).collect();
            row.resize(headers.len(), String::new());
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cells of a named column, or `None` when the column is absent.
    pub fn column<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = &'a str> + 'a> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| row[idx].as_str()))
    }

    /// Concatenated cells of the top-left `window` block, row by row.
    pub fn sample_text(&self, window: SampleWindow) -> String {
        self.rows
            .iter()
            .take(window.rows)
            .flat_map(|row| row.iter().take(window.columns))
            .map(String::as_str)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Parse attempts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Ok,
    Failed(String),
}

/// The result of decoding the file under one encoding candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseAttempt {
    pub encoding: &'static str,
    pub score: f64,
    pub outcome: AttemptOutcome,
}

impl ParseAttempt {
    pub fn ok(encoding: &'static str, score: f64) -> Self {
        Self {
            encoding,
            score,
            outcome: AttemptOutcome::Ok,
        }
    }

    pub fn failed(encoding: &'static str, err: &AttemptError) -> Self {
        Self {
            encoding,
            score: 0.0,
            outcome: AttemptOutcome::Failed(err.to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.outcome == AttemptOutcome::Ok
    }

    /// `"ok"` or the failure reason, for display.
    pub fn status(&self) -> &str {
        match &self.outcome {
            AttemptOutcome::Ok => "ok",
            AttemptOutcome::Failed(reason) => reason,
        }
    }
}

// ---------------------------------------------------------------------------
// ResolvedDataset – what the loader hands to the dashboard
// ---------------------------------------------------------------------------

/// Score reported when no candidate succeeded; lower than any real score.
pub const NO_SCORE: f64 = -1.0;

#[derive(Debug, Clone)]
pub struct ResolvedDataset {
    pub path: PathBuf,
    /// Best table, or an empty one if every candidate failed.
    pub table: DataTable,
    /// Winning candidate, `None` if every candidate failed.
    pub encoding: Option<&'static str>,
    pub score: f64,
    /// One entry per candidate, in priority order.
    pub attempts: Vec<ParseAttempt>,
}

impl ResolvedDataset {
    pub fn unresolved(path: &Path, attempts: Vec<ParseAttempt>) -> Self {
        Self {
            path: path.to_path_buf(),
            table: DataTable::default(),
            encoding: None,
            score: NO_SCORE,
            attempts,
        }
    }

    /// `false` means the post-load guard must stop the page.
    pub fn is_usable(&self) -> bool {
        !self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_header_and_pads_short_rows() {
        let table = DataTable::from_csv_text("부서,업무만족도,월급여\n영업,4\n개발,3,\"3,500,000원\"\n")
            .unwrap();
        assert_eq!(table.headers, vec!["부서", "업무만족도", "월급여"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0], vec!["영업", "4", ""]);
        assert_eq!(table.rows[1][2], "3,500,000원");
    }

    #[test]
    fn long_rows_fail_the_parse() {
        let err = DataTable::from_csv_text("a,b\n1,2\n1,2,3\n").unwrap_err();
        assert!(matches!(
            err,
            AttemptError::RaggedRow {
                line: 3,
                expected: 2,
                found: 3
            }
        ));
    }

    #[test]
    fn empty_input_has_no_header() {
        assert!(matches!(
            DataTable::from_csv_text(""),
            Err(AttemptError::NoHeader)
        ));
    }

    #[test]
    fn header_only_table_is_empty() {
        let table = DataTable::from_csv_text("부서,업무만족도\n").unwrap();
        assert!(table.is_empty());
        assert_eq!(table.column_index("부서"), Some(0));
    }

    #[test]
    fn sample_text_respects_window() {
        let table = DataTable::from_csv_text("a,b,c\n가,나,다\n라,마,바\n사,아,자\n").unwrap();
        let window = SampleWindow {
            rows: 2,
            columns: 2,
        };
        assert_eq!(table.sample_text(window), "가나라마");
    }

    #[test]
    fn column_lookup() {
        let table = DataTable::from_csv_text("a,b\n1,2\n3,4\n").unwrap();
        let b: Vec<&str> = table.column("b").unwrap().collect();
        assert_eq!(b, vec!["2", "4"]);
        assert!(table.column("missing").is_none());
    }

    #[test]
    fn attempt_status_strings() {
        let ok = ParseAttempt::ok("utf-8", 0.4);
        assert!(ok.is_ok());
        assert_eq!(ok.status(), "ok");
        let failed = ParseAttempt::failed("cp949", &AttemptError::NoHeader);
        assert!(!failed.is_ok());
        assert_eq!(failed.score, 0.0);
        assert_eq!(failed.status(), "no header row");
    }
}
