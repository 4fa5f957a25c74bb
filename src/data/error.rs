use thiserror::Error;

/// Why a single encoding candidate could not produce a table.
///
/// These never reach the caller of the loader as errors; they are turned
/// into reason strings in the attempt log.
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("could not read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed byte sequence for {encoding}")]
    Malformed { encoding: &'static str },

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("line {line}: expected {expected} fields, saw {found}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("no header row")]
    NoHeader,
}
