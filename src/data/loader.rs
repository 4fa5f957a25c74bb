use std::path::Path;

use log::{debug, info, warn};

use super::encoding::{default_candidates, EncodingCandidate, SampleWindow, ScriptRange};
use super::error::AttemptError;
use super::model::{DataTable, ParseAttempt, ResolvedDataset, NO_SCORE};

// ---------------------------------------------------------------------------
// Encoding-aware loader
// ---------------------------------------------------------------------------

/// Tries every encoding candidate on the whole file and keeps the parse
/// whose sample contains the largest share of the target script.
#[derive(Debug, Clone)]
pub struct EncodingLoader {
    candidates: Vec<EncodingCandidate>,
    script: ScriptRange,
    window: SampleWindow,
}

impl Default for EncodingLoader {
    fn default() -> Self {
        Self::new(SampleWindow::default())
    }
}

impl EncodingLoader {
    pub fn new(window: SampleWindow) -> Self {
        Self {
            candidates: default_candidates(),
            script: ScriptRange::hangul(),
            window,
        }
    }

    #[cfg(test)]
    pub fn with_candidates(mut self, candidates: Vec<EncodingCandidate>) -> Self {
        self.candidates = candidates;
        self
    }

    #[cfg(test)]
    pub fn with_script(mut self, script: ScriptRange) -> Self {
        self.script = script;
        self
    }

    /// Load `path`. Never fails: per-candidate errors end up in the
    /// attempt log and an unreadable file yields an empty table.
    pub fn load(&self, path: &Path) -> ResolvedDataset {
        match std::fs::read(path) {
            Ok(bytes) => self.load_bytes(path, &bytes),
            Err(e) => {
                let err = AttemptError::from(e);
                warn!("Cannot read {}: {err}", path.display());
                let attempts = self
                    .candidates
                    .iter()
                    .map(|c| ParseAttempt::failed(c.name, &err))
                    .collect();
                ResolvedDataset::unresolved(path, attempts)
            }
        }
    }

    /// Same as [`load`](Self::load) for bytes already in memory.
    pub fn load_bytes(&self, path: &Path, bytes: &[u8]) -> ResolvedDataset {
        let mut attempts = Vec::with_capacity(self.candidates.len());
        let mut best: Option<(&'static str, DataTable)> = None;
        let mut best_score = NO_SCORE;

        for candidate in &self.candidates {
            match self.attempt(candidate, bytes) {
                Ok((table, score)) => {
                    debug!("{}: parsed {} rows, score {score:.3}", candidate.name, table.len());
                    attempts.push(ParseAttempt::ok(candidate.name, score));
                    // strict: ties keep the earlier candidate
                    if score > best_score {
                        best_score = score;
                        best = Some((candidate.name, table));
                    }
                }
                Err(err) => {
                    debug!("{}: {err}", candidate.name);
                    attempts.push(ParseAttempt::failed(candidate.name, &err));
                }
            }
        }

        match best {
            Some((encoding, table)) => {
                info!(
                    "Loaded {} ({} rows) as {encoding}, score {best_score:.3}",
                    path.display(),
                    table.len()
                );
                ResolvedDataset {
                    path: path.to_path_buf(),
                    table,
                    encoding: Some(encoding),
                    score: best_score,
                    attempts,
                }
            }
            None => {
                warn!("No encoding candidate could parse {}", path.display());
                ResolvedDataset::unresolved(path, attempts)
            }
        }
    }

    fn attempt(
        &self,
        candidate: &EncodingCandidate,
        bytes: &[u8],
    ) -> Result<(DataTable, f64), AttemptError> {
        let text = candidate.decode(bytes)?;
        let table = DataTable::from_csv_text(&text)?;
        let score = self.script.ratio(&table.sample_text(self.window));
        Ok((table, score))
    }
}
